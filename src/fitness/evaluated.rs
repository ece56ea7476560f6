//! Evaluation outcomes.

use super::value::{FitnessValue, TargetId};
use crate::individual::{ActionId, Individual};
use std::collections::BTreeSet;

/// Raw execution result of one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionResult {
    pub action_id: ActionId,
    /// The action did not answer within its time limit.
    pub timed_out: bool,
    /// Execution of the remaining actions was stopped after this one.
    pub stopping: bool,
}

impl ActionResult {
    pub fn ok(action_id: ActionId) -> Self {
        Self {
            action_id,
            timed_out: false,
            stopping: false,
        }
    }
}

/// What a fitness function returns for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub fitness: FitnessValue,
    pub results: Vec<ActionResult>,
}

impl Evaluation {
    pub fn new(fitness: FitnessValue) -> Self {
        Self {
            fitness,
            results: Vec::new(),
        }
    }

    pub fn with_results(mut self, results: Vec<ActionResult>) -> Self {
        self.results = results;
        self
    }

    /// Number of actions that were executed.
    pub fn executed_actions(&self) -> usize {
        self.results.len()
    }
}

/// Sequence number of an evaluation; later evaluations get larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EvaluationId(pub u64);

/// Snapshot of an individual together with the outcome of running it.
///
/// Never modified after construction; archives and populations replace
/// whole values.
#[derive(Debug, Clone)]
pub struct EvaluatedIndividual<I> {
    id: EvaluationId,
    individual: I,
    fitness: FitnessValue,
    results: Vec<ActionResult>,
}

impl<I: Individual> EvaluatedIndividual<I> {
    /// Wraps an evaluation; the fitness size is taken from the individual.
    pub fn new(id: EvaluationId, individual: I, evaluation: Evaluation) -> Self {
        let mut fitness = evaluation.fitness;
        fitness.set_size(individual.size() as f64);
        Self {
            id,
            individual,
            fitness,
            results: evaluation.results,
        }
    }

    pub fn id(&self) -> EvaluationId {
        self.id
    }

    pub fn individual(&self) -> &I {
        &self.individual
    }

    pub fn fitness(&self) -> &FitnessValue {
        &self.fitness
    }

    pub fn results(&self) -> &[ActionResult] {
        &self.results
    }

    /// Sum of heuristics over every reached target.
    pub fn score(&self) -> f64 {
        self.fitness.compute_fitness_score()
    }

    pub fn size(&self) -> usize {
        self.individual.size()
    }

    pub fn has_timeout(&self) -> bool {
        self.results.iter().any(|r| r.timed_out)
    }
}

/// Final outcome of a search.
#[derive(Debug, Clone)]
pub struct Solution<I> {
    /// One individual per distinct covering witness.
    pub individuals: Vec<EvaluatedIndividual<I>>,
    /// Best heuristic per target over the whole search.
    pub overall: FitnessValue,
}

impl<I: Individual> Solution<I> {
    pub fn covered_targets(&self) -> BTreeSet<TargetId> {
        self.overall.covered_targets()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }
}
