//! Search-based test generation engine.
//!
//! Evolves test cases (sequences of actions whose inputs are gene trees)
//! towards covering as many coverage targets of a system under test as
//! possible:
//!
//! - **Individuals**: [`individual::TestCase`] with gene arenas, default
//!   mutation and crossover operators, and impact-weighted gene choice.
//! - **Fitness**: per-target heuristics in `[0, 1]`; a target is covered at 1.
//! - **Archive**: best individuals per target with feedback-directed
//!   sampling, used by the archive-driven algorithms.
//! - **Dependency graph**: control-dependence frontier of current goals
//!   for DynaMOSA.
//! - **Search**: GA family, evolution strategies, random baselines, MIO,
//!   MOSA, DynaMOSA, LIPS and chemical reaction optimization behind one
//!   [`search::SearchEngine`].
//! - **Budget**: action-count or wall-clock stopping criteria.
//!
//! # Architecture
//!
//! The crate knows nothing about how a system under test is driven. A
//! consumer implements [`search::SearchProblem`] (sample, evaluate, vary)
//! and gets back the archive's covering individuals as a
//! [`fitness::Solution`].

pub mod archive;
pub mod cro;
pub mod error;
pub mod fitness;
pub mod graph;
pub mod individual;
pub mod search;
pub mod time;

pub use error::{Result, SearchError};
