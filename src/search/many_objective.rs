//! Many-objective strategies: MIO, DynaMOSA, LIPS and MOSA.
//!
//! The first three use the archive as their population. MOSA keeps an
//! explicit population ranked by [`preference_sorting`] over the targets
//! the archive has reached but not covered.

use super::adaptive;
use super::engine::{sort_best_first, Population, RankedIndividual, SearchEngine};
use super::pareto::{preference_sorting, subvector_dominance};
use super::selection::SelectionStrategy;
use super::types::SearchProblem;
use crate::fitness::{EvaluatedIndividual, FitnessValue, TargetId};
use log::debug;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::BTreeSet;

impl<P: SearchProblem, S: SelectionStrategy> SearchEngine<'_, P, S> {
    /// One MIO step, sampling archive parents among `goals` when given.
    ///
    /// Archive capacity, random-sampling probability and the number of
    /// mutations follow the used budget until the focused phase starts.
    pub(super) fn mio_step(&mut self, goals: Option<&BTreeSet<TargetId>>) {
        let used = self.time.percentage_used_budget();
        let activation = self.config.focused_search_activation_time;
        self.archive
            .set_target_limit(adaptive::archive_target_limit(self.config.archive_target_limit, used, activation));

        let p_random = adaptive::prob_random_sampling(self.config.prob_random_sampling, used, activation);
        if self.archive.is_empty() || self.rng.random_bool(p_random) {
            self.sample_and_evaluate();
            return;
        }
        let Some(parent) = self.archive.sample_for_mutation_among(goals, &mut self.rng) else {
            self.sample_and_evaluate();
            return;
        };
        let n = adaptive::number_of_mutations(self.config.max_mutations, used, activation);
        self.mutate_and_save(n, parent);
    }

    /// MIO restricted to the current frontier of the dependency graph.
    pub(super) fn dynamosa_step(&mut self) {
        let covered = self.archive.covered_targets();
        let uncovered = self.archive.not_covered_targets();
        let goals = self.graph.refresh_goals(&covered, &uncovered).clone();
        self.mio_step(Some(&goals));
    }

    /// Works on one uncovered target at a time with a fair share of the
    /// remaining budget, moving on once it is spent or the target covered.
    pub(super) fn lips_step(&mut self) {
        if self.archive.should_switch_target() {
            let uncovered: Vec<TargetId> = self.archive.not_covered_targets().into_iter().collect();
            let previous = self.archive.focused_target();
            let candidates: Vec<TargetId> = if uncovered.len() > 1 {
                uncovered.iter().copied().filter(|&t| Some(t) != previous).collect()
            } else {
                uncovered.clone()
            };
            let Some(&target) = candidates.choose(&mut self.rng) else {
                self.sample_and_evaluate();
                return;
            };
            let budget = self.archive.compute_per_target_budget(&self.time, uncovered.len());
            debug!("lips focus moves to target {target} with budget {budget}");
            self.archive.focus_on(target, budget);
        }

        let parent = self
            .archive
            .focused_target()
            .and_then(|t| self.archive.entries(t).choose(&mut self.rng).cloned());
        let before = self.time.used_budget_units();
        match parent {
            Some(parent) => {
                let mut child = parent.individual().clone();
                self.mutate(&mut child);
                self.evaluate(child);
            }
            None => {
                self.sample_and_evaluate();
            }
        }
        let consumed = self.time.used_budget_units().saturating_sub(before);
        self.archive.update_per_target_budget(consumed);
    }

    /// Ranks `individuals` and keeps the best `population_size`.
    ///
    /// Whole fronts are taken while they fit; the front that overflows is
    /// cut by decreasing sub-vector dominance distance. Once nothing is left
    /// uncovered the population is cut by score instead.
    pub(super) fn mosa_rank(
        &self,
        mut individuals: Vec<EvaluatedIndividual<P::Individual>>,
    ) -> Vec<RankedIndividual<P::Individual>> {
        let n = self.config.population_size;
        let uncovered = self.archive.not_covered_targets();
        if uncovered.is_empty() {
            sort_best_first(&mut individuals);
            individuals.truncate(n);
            return individuals
                .into_iter()
                .map(|individual| RankedIndividual {
                    individual,
                    rank: 0,
                    distance: 0,
                })
                .collect();
        }

        let fitness: Vec<&FitnessValue> = individuals.iter().map(|e| e.fitness()).collect();
        let fronts = preference_sorting(&fitness, &uncovered);
        let mut picked: Vec<(usize, usize, usize)> = Vec::with_capacity(n);
        for (rank, front) in fronts.iter().enumerate() {
            let remain = n - picked.len();
            if remain == 0 {
                break;
            }
            let distances = subvector_dominance(&fitness, front, &uncovered);
            let mut members: Vec<(usize, usize, usize)> = front
                .iter()
                .zip(distances)
                .map(|(&i, d)| (i, rank, d))
                .collect();
            if members.len() > remain {
                members.sort_by(|a, b| b.2.cmp(&a.2));
                members.truncate(remain);
            }
            picked.extend(members);
        }

        let mut slots: Vec<Option<EvaluatedIndividual<P::Individual>>> = individuals.into_iter().map(Some).collect();
        picked
            .into_iter()
            .filter_map(|(i, rank, distance)| {
                slots[i].take().map(|individual| RankedIndividual {
                    individual,
                    rank,
                    distance,
                })
            })
            .collect()
    }

    /// Tournament on (rank ascending, distance descending).
    fn mosa_tournament(&mut self, population: &[RankedIndividual<P::Individual>]) -> usize {
        let n = population.len();
        let mut winner = self.rng.random_range(0..n);
        for _ in 1..self.config.tournament_size.max(1) {
            let challenger = self.rng.random_range(0..n);
            let (c, w) = (&population[challenger], &population[winner]);
            if c.rank < w.rank || (c.rank == w.rank && c.distance > w.distance) {
                winner = challenger;
            }
        }
        winner
    }

    /// Breeds `population_size - 1` mutants plus one random individual and
    /// re-ranks the union with the current population.
    pub(super) fn mosa_step(&mut self) {
        let population = match std::mem::replace(&mut self.population, Population::Archive) {
            Population::Ranked(v) if !v.is_empty() => v,
            _ => {
                let initial = self.sample_population(self.config.population_size);
                self.population = Population::Ranked(self.mosa_rank(initial));
                return;
            }
        };

        let n = self.config.population_size;
        let mut offspring = Vec::with_capacity(n);
        while offspring.len() + 1 < n && self.time.should_continue_search() {
            let idx = self.mosa_tournament(&population);
            let mut child = population[idx].individual.individual().clone();
            self.mutate(&mut child);
            if let Some(e) = self.evaluate(child) {
                offspring.push(e.individual);
            }
        }
        if let Some(e) = self.sample_and_evaluate() {
            offspring.push(e);
        }

        let mut union: Vec<_> = population.into_iter().map(|r| r.individual).collect();
        union.extend(offspring);
        self.population = Population::Ranked(self.mosa_rank(union));
    }
}
