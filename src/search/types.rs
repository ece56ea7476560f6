//! Collaborators of the search engine.
//!
//! The engine knows nothing about how individuals are built, run or varied.
//! A [`SearchProblem`] bundles those operations; [`SearchObserver`]s watch
//! what the engine does with them.

use crate::fitness::Evaluation;
use crate::graph::MethodGraph;
use crate::individual::Individual;
use rand::Rng;
use std::cell::RefCell;
use std::rc::Rc;

/// Domain operations the engine delegates to.
///
/// Every operation receives the engine's random stream so a seeded run is
/// reproducible as long as the implementation draws only from it.
pub trait SearchProblem {
    type Individual: Individual;

    /// Samples a fresh, independently executable individual.
    fn sample<R: Rng>(&mut self, rng: &mut R) -> Self::Individual;

    /// Whether the structure of `individual` may still change.
    fn can_mutate_structure(&self, _individual: &Self::Individual) -> bool {
        false
    }

    /// Runs an individual.
    ///
    /// `None` means the run was incomplete (crash, timeout of the whole
    /// system under test). The engine discards the individual and goes on.
    fn evaluate(&mut self, individual: &Self::Individual) -> Option<Evaluation>;

    /// Adds, removes or reorders parts of an individual.
    fn mutate_structure<R: Rng>(&mut self, _individual: &mut Self::Individual, _rng: &mut R) {}

    /// Perturbs the genes of an individual.
    fn mutate_genes<R: Rng>(&mut self, individual: &mut Self::Individual, rng: &mut R);

    /// Recombines two individuals in place.
    fn crossover<R: Rng>(&mut self, _a: &mut Self::Individual, _b: &mut Self::Individual, _rng: &mut R) {}

    /// Control-dependence graphs of the system under test, if known.
    fn dependency_graphs(&self) -> Vec<MethodGraph> {
        Vec::new()
    }
}

/// Hooks called by the engine.
///
/// All methods default to no-ops.
pub trait SearchObserver<I> {
    /// Called with both children after a crossover.
    fn on_crossover(&mut self, _a: &I, _b: &I) {}

    /// Called after an individual was mutated.
    fn on_mutation(&mut self, _individual: &I) {}

    /// Called at the end of every iteration with the best score so far.
    fn on_generation(&mut self, _iteration: usize, _best_score: f64) {}
}

impl<I, O: SearchObserver<I>> SearchObserver<I> for Rc<RefCell<O>> {
    fn on_crossover(&mut self, a: &I, b: &I) {
        self.borrow_mut().on_crossover(a, b);
    }

    fn on_mutation(&mut self, individual: &I) {
        self.borrow_mut().on_mutation(individual);
    }

    fn on_generation(&mut self, iteration: usize, best_score: f64) {
        self.borrow_mut().on_generation(iteration, best_score);
    }
}

/// Observer that counts operator calls and keeps the best-score series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRecorder {
    pub crossovers: usize,
    pub mutations: usize,
    pub best_scores: Vec<f64>,
}

impl SearchRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle, to pass one clone to the engine and keep the other.
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }
}

impl<I> SearchObserver<I> for SearchRecorder {
    fn on_crossover(&mut self, _a: &I, _b: &I) {
        self.crossovers += 1;
    }

    fn on_mutation(&mut self, _individual: &I) {
        self.mutations += 1;
    }

    fn on_generation(&mut self, _iteration: usize, best_score: f64) {
        self.best_scores.push(best_score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_counts() {
        let mut r = SearchRecorder::new();
        SearchObserver::<u8>::on_crossover(&mut r, &1, &2);
        SearchObserver::<u8>::on_mutation(&mut r, &1);
        SearchObserver::<u8>::on_mutation(&mut r, &1);
        SearchObserver::<u8>::on_generation(&mut r, 1, 0.5);
        assert_eq!(r.crossovers, 1);
        assert_eq!(r.mutations, 2);
        assert_eq!(r.best_scores, vec![0.5]);
    }

    #[test]
    fn test_shared_handle_sees_updates() {
        let shared = SearchRecorder::shared();
        let mut handle = Rc::clone(&shared);
        SearchObserver::<u8>::on_mutation(&mut handle, &0);
        assert_eq!(shared.borrow().mutations, 1);
    }
}
