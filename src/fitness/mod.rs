//! Fitness values and evaluated individuals.
//!
//! A [`FitnessValue`] maps target ids to heuristics in `[0, 1]` (1 means
//! covered) and carries a secondary size metric used as a tie-breaker.
//! Running an individual yields an [`Evaluation`]; the engine wraps it into
//! an immutable [`EvaluatedIndividual`].

mod evaluated;
mod value;

pub use evaluated::{ActionResult, Evaluation, EvaluatedIndividual, EvaluationId, Solution};
pub use value::{FitnessValue, TargetId, MAX_VALUE};
