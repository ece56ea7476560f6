//! Single-individual baselines.

use super::engine::{Population, SearchEngine};
use super::selection::SelectionStrategy;
use super::types::SearchProblem;

impl<P: SearchProblem, S: SelectionStrategy> SearchEngine<'_, P, S> {
    /// Mutates a copy of the current individual and moves to it unless it is
    /// worse.
    pub(super) fn random_walk_step(&mut self) {
        let mut population = self.take_flat();
        let Some(current) = population.pop() else {
            self.population = Population::Flat(self.sample_population(1));
            return;
        };
        let mut candidate = current.individual().clone();
        self.mutate(&mut candidate);
        let next = match self.evaluate(candidate) {
            Some(e) if e.individual.score() >= current.score() => e.individual,
            _ => current,
        };
        self.population = Population::Flat(vec![next]);
    }

    /// Samples and evaluates a fresh individual; the archive keeps the rest.
    pub(super) fn random_search_step(&mut self) {
        self.sample_and_evaluate();
    }
}

#[cfg(test)]
mod tests {
    use crate::search::engine::{Population, SearchEngine};
    use crate::search::test_support::OneMax;
    use crate::search::{Algorithm, SearchConfig, SearchRecorder, SearchRunner};
    use std::rc::Rc;

    #[test]
    fn test_random_walk_never_gets_worse() {
        let mut problem = OneMax::new(12);
        let config = SearchConfig::default()
            .with_algorithm(Algorithm::RandomWalk)
            .with_max_action_evaluations(300)
            .with_seed(9);
        let mut engine = SearchEngine::new(&mut problem, config).unwrap();
        engine.setup();
        let mut score = engine.population().best_score().unwrap();
        for _ in 0..100 {
            engine.search_once();
            assert_eq!(engine.population().len(), 1);
            let now = engine.population().best_score().unwrap();
            assert!(now >= score);
            score = now;
        }
    }

    #[test]
    fn test_random_walk_mutates_regardless_of_probability() {
        let mut problem = OneMax::new(12);
        let recorder = SearchRecorder::shared();
        let config = SearchConfig::default()
            .with_algorithm(Algorithm::RandomWalk)
            .with_mutation_probability(0.0)
            .with_max_action_evaluations(20)
            .with_seed(9);
        let mut engine = SearchEngine::new(&mut problem, config).unwrap();
        engine.add_observer(Rc::clone(&recorder));
        engine.search(None);
        // one initial sample, then one mutant per step
        assert_eq!(recorder.borrow().mutations, 19);
    }

    #[test]
    fn test_random_search_only_samples() {
        let mut problem = OneMax::new(12);
        let recorder = SearchRecorder::shared();
        let config = SearchConfig::default()
            .with_algorithm(Algorithm::RandomSearch)
            .with_max_action_evaluations(50)
            .with_seed(9);
        let mut engine = SearchEngine::new(&mut problem, config).unwrap();
        engine.add_observer(Rc::clone(&recorder));
        let result = engine.search(None);
        assert_eq!(result.iterations, 50);
        assert_eq!(recorder.borrow().mutations, 0);
        assert!(matches!(engine.population(), Population::Archive));
        assert!(!engine.archive().is_empty());
    }

    #[test]
    fn test_random_search_solution_from_archive() {
        let mut problem = OneMax::new(2);
        let config = SearchConfig::default()
            .with_algorithm(Algorithm::RandomSearch)
            .with_max_action_evaluations(200)
            .with_seed(1);
        let result = SearchRunner::run(&mut problem, &config).unwrap();
        // two bits are found by chance well within the budget
        assert_eq!(result.solution.individuals.len(), 1);
        assert!(result.solution.covered_targets().contains(&0));
    }
}
