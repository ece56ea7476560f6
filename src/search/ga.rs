//! Genetic algorithm steps: generational (standard, breeder, monotonic),
//! steady-state and cellular.

use super::config::Algorithm;
use super::engine::{sort_best_first, Population, SearchEngine};
use super::neighborhood::Neighborhood;
use super::selection::SelectionStrategy;
use super::types::SearchProblem;
use crate::fitness::EvaluatedIndividual;
use rand::Rng;

type Evaluated<P> = EvaluatedIndividual<<P as SearchProblem>::Individual>;

impl<P: SearchProblem, S: SelectionStrategy> SearchEngine<'_, P, S> {
    pub(super) fn take_flat(&mut self) -> Vec<Evaluated<P>> {
        match std::mem::replace(&mut self.population, Population::Archive) {
            Population::Flat(v) => v,
            other => {
                self.population = other;
                Vec::new()
            }
        }
    }

    /// Replaces the whole population, keeping elites.
    ///
    /// Monotonic: a bred pair replaces its parents only if its best child
    /// beats both of them. Breeder: parents are drawn uniformly from the top
    /// truncation fraction instead of through the selection strategy.
    pub(super) fn generational_step(&mut self) {
        let mut population = self.take_flat();
        let n = self.config.population_size;
        if population.is_empty() {
            self.population = Population::Flat(self.sample_population(n));
            return;
        }
        sort_best_first(&mut population);

        let algorithm = self.config.algorithm;
        let elites = match algorithm {
            Algorithm::MonotonicGa => self.config.elites_count.max(1),
            _ => self.config.elites_count,
        }
        .min(population.len());
        let scores: Vec<f64> = population.iter().map(|e| e.score()).collect();
        let pool = if algorithm == Algorithm::BreederGa {
            let cut = (population.len() as f64 * self.config.breeder_truncation).ceil() as usize;
            cut.clamp(1, population.len())
        } else {
            population.len()
        };

        let mut next: Vec<Evaluated<P>> = population[..elites].to_vec();
        while next.len() < n && self.time.should_continue_search() {
            let (i, j) = if algorithm == Algorithm::BreederGa {
                (self.rng.random_range(0..pool), self.rng.random_range(0..pool))
            } else {
                (self.select(&scores), self.select(&scores))
            };
            let (pa, pb) = (&population[i], &population[j]);
            let (x, y) = self.breed(pa.individual(), pb.individual());
            let cx = self.evaluate_or(x, pa);
            let cy = self.evaluate_or(y, pb);

            if algorithm == Algorithm::MonotonicGa {
                let best_child = cx.score().max(cy.score());
                if best_child > pa.score() && best_child > pb.score() {
                    next.push(cx);
                    next.push(cy);
                } else {
                    next.push(pa.clone());
                    next.push(pb.clone());
                }
            } else {
                next.push(cx);
                next.push(cy);
            }
        }
        next.truncate(n);
        if next.len() < n {
            let missing = n - next.len();
            next.extend(population.iter().skip(elites).take(missing).cloned());
        }
        self.population = Population::Flat(next);
    }

    /// Breeds one pair and writes the children over their parents if the
    /// best child beats the best parent.
    pub(super) fn steady_state_step(&mut self) {
        let mut population = self.take_flat();
        if population.is_empty() {
            self.population = Population::Flat(self.sample_population(self.config.population_size));
            return;
        }
        let scores: Vec<f64> = population.iter().map(|e| e.score()).collect();
        let i = self.select(&scores);
        let j = self.select(&scores);
        let (x, y) = self.breed(population[i].individual(), population[j].individual());
        let cx = self.evaluate_or(x, &population[i]);
        let cy = self.evaluate_or(y, &population[j]);

        let best_parent = scores[i].max(scores[j]);
        if cx.score().max(cy.score()) > best_parent {
            if i == j {
                population[i] = if cy.score() > cx.score() { cy } else { cx };
            } else {
                population[i] = cx;
                population[j] = cy;
            }
        }
        self.population = Population::Flat(population);
    }

    pub(super) fn sample_grid(&mut self) -> Population<P::Individual> {
        let cells = self.sample_population(self.config.population_size);
        let neighborhood = Neighborhood::for_population(cells.len());
        Population::Grid { cells, neighborhood }
    }

    /// Every cell competes with the best of two offspring bred from its
    /// neighbourhood. Replacements are synchronous: all offspring are bred
    /// from the grid as it was at the start of the step.
    pub(super) fn cellular_step(&mut self) {
        let (cells, neighborhood) = match std::mem::replace(&mut self.population, Population::Archive) {
            Population::Grid { cells, neighborhood } if !cells.is_empty() && cells.len() == neighborhood.len() => {
                (cells, neighborhood)
            }
            _ => {
                self.population = self.sample_grid();
                return;
            }
        };

        let mut next = cells.clone();
        for (idx, slot) in next.iter_mut().enumerate() {
            if !self.time.should_continue_search() {
                break;
            }
            let hood = neighborhood.neighbors(self.config.topology, idx);
            let scores: Vec<f64> = hood.iter().map(|&c| cells[c].score()).collect();
            let a = hood[self.select(&scores)];
            let b = hood[self.select(&scores)];
            let (x, y) = self.breed(cells[a].individual(), cells[b].individual());
            let offspring = [self.evaluate(x), self.evaluate(y)]
                .into_iter()
                .flatten()
                .map(|e| e.individual)
                .reduce(|best, e| if e.score() > best.score() { e } else { best });
            if let Some(child) = offspring {
                if child.score() > cells[idx].score() {
                    *slot = child;
                }
            }
        }
        self.population = Population::Grid {
            cells: next,
            neighborhood,
        };
    }
}
