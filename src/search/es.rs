//! Evolution strategies: (μ+λ), (μ,λ) and the 1+(λ,λ) GA.

use super::config::Algorithm;
use super::engine::{sort_best_first, Population, SearchEngine};
use super::selection::SelectionStrategy;
use super::types::SearchProblem;
use crate::fitness::EvaluatedIndividual;
use rand::Rng;

impl<P: SearchProblem, S: SelectionStrategy> SearchEngine<'_, P, S> {
    /// Each of the μ parents produces `λ / μ` mutants; the best μ of
    /// parents and offspring (μ+λ) or of the offspring alone (μ,λ) survive.
    pub(super) fn mu_lambda_step(&mut self) {
        let parents = self.take_flat();
        let mu = self.config.population_size;
        if parents.is_empty() {
            self.population = Population::Flat(self.sample_population(mu));
            return;
        }
        let per_parent = (self.config.mu_lambda_offspring / mu).max(1);

        let mut offspring = Vec::with_capacity(parents.len() * per_parent);
        'outer: for parent in &parents {
            for _ in 0..per_parent {
                if !self.time.should_continue_search() {
                    break 'outer;
                }
                let mut child = parent.individual().clone();
                if self.rng.random_bool(self.config.mutation_probability) {
                    self.mutate(&mut child);
                }
                if let Some(e) = self.evaluate(child) {
                    offspring.push(e.individual);
                }
            }
        }

        let mut survivors = match self.config.algorithm {
            Algorithm::MuCommaLambda if !offspring.is_empty() => offspring,
            Algorithm::MuCommaLambda => parents,
            _ => {
                let mut pool = parents;
                pool.extend(offspring);
                pool
            }
        };
        sort_best_first(&mut survivors);
        survivors.truncate(mu);
        self.population = Population::Flat(survivors);
    }

    /// λ mutants of the parent, paired (0,1), (2,3), … and crossed, both
    /// children evaluated. The best mutant or child replaces the parent only
    /// if strictly better.
    pub(super) fn one_plus_lambda_lambda_step(&mut self) {
        let mut population = self.take_flat();
        let Some(parent) = population.pop() else {
            self.population = Population::Flat(self.sample_population(1));
            return;
        };
        let lambda = self.config.one_plus_lambda_lambda_offspring;

        let mut mutants: Vec<EvaluatedIndividual<P::Individual>> = Vec::with_capacity(lambda);
        for _ in 0..lambda {
            let mut mutant = parent.individual().clone();
            if self.rng.random_bool(self.config.mutation_probability) {
                self.mutate(&mut mutant);
            }
            if let Some(e) = self.evaluate(mutant) {
                mutants.push(e.individual);
            }
        }

        let mut children = Vec::with_capacity(mutants.len());
        for pair in mutants.chunks_exact(2) {
            let mut x = pair[0].individual().clone();
            let mut y = pair[1].individual().clone();
            if self.rng.random_bool(self.config.crossover_probability) {
                self.crossover(&mut x, &mut y);
            }
            for child in [x, y] {
                if let Some(e) = self.evaluate(child) {
                    children.push(e.individual);
                }
            }
        }

        let best = mutants
            .into_iter()
            .chain(children)
            .reduce(|best, e| if e.score() > best.score() { e } else { best });
        let survivor = match best {
            Some(best) if best.score() > parent.score() => best,
            _ => parent,
        };
        self.population = Population::Flat(vec![survivor]);
    }
}
