//! Per-target store of the best evaluated individuals.

use super::budget::TargetBudget;
use crate::fitness::{EvaluatedIndividual, FitnessValue, Solution, TargetId, MAX_VALUE};
use crate::individual::Individual;
use crate::time::SearchTime;
use log::debug;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// How the archive picks the target whose individuals are sampled next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeedbackDirectedSampling {
    /// Uniform choice among candidate targets.
    Random,
    /// Target sampled the fewest times since its last improvement.
    #[default]
    Last,
    /// Keep sampling the last target while it improved recently enough,
    /// otherwise move to the target that improved the quickest.
    FocusedQuickest,
}

/// Sampling counter assumed for targets that never improved.
const DEFAULT_IMPROVEMENT_INTERVAL: u32 = 10;

/// What one [`Archive::add_if_needed`] call changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveUpdate {
    /// The newcomer was stored for at least one target.
    pub added: bool,
    /// The newcomer beat the previous best of at least one target.
    pub improved: bool,
    /// Targets covered for the first time.
    pub newly_covered: Vec<TargetId>,
}

/// Bounded, per-target populations of evaluated individuals.
///
/// Each list is kept best first by heuristic (descending), then size
/// (ascending), then evaluation id (descending, so the most recent of two
/// otherwise equal entries ranks first). No two kept entries of a list
/// dominate each other. Once a target is covered its list holds exactly one
/// entry.
#[derive(Debug, Clone)]
pub struct Archive<I> {
    populations: BTreeMap<TargetId, Vec<EvaluatedIndividual<I>>>,
    target_limit: usize,
    sampling: FeedbackDirectedSampling,
    sampling_counter: BTreeMap<TargetId, u32>,
    last_improvement: BTreeMap<TargetId, u32>,
    last_chosen: Option<TargetId>,
    budget: TargetBudget,
}

fn rank<I: Individual>(target: TargetId, a: &EvaluatedIndividual<I>, b: &EvaluatedIndividual<I>) -> Ordering {
    let (ha, hb) = (a.fitness().heuristic(target), b.fitness().heuristic(target));
    hb.partial_cmp(&ha)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            a.fitness()
                .size()
                .partial_cmp(&b.fitness().size())
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| b.id().cmp(&a.id()))
}

impl<I: Individual> Archive<I> {
    pub fn new(target_limit: usize, sampling: FeedbackDirectedSampling) -> Self {
        Self {
            populations: BTreeMap::new(),
            target_limit: target_limit.max(1),
            sampling,
            sampling_counter: BTreeMap::new(),
            last_improvement: BTreeMap::new(),
            last_chosen: None,
            budget: TargetBudget::default(),
        }
    }

    pub fn target_limit(&self) -> usize {
        self.target_limit
    }

    /// Changes the per-target capacity (at least 1) and trims the lists.
    pub fn set_target_limit(&mut self, limit: usize) {
        self.target_limit = limit.max(1);
        let limit = self.target_limit;
        for list in self.populations.values_mut() {
            list.truncate(limit);
        }
    }

    /// Offers an evaluated individual for every target it reached.
    pub fn add_if_needed(&mut self, ev: &EvaluatedIndividual<I>) -> ArchiveUpdate {
        let mut update = ArchiveUpdate::default();
        let reached: Vec<(TargetId, f64)> = ev
            .fitness()
            .reached_targets()
            .filter(|&(_, v)| v > 0.0)
            .collect();

        for (target, value) in reached {
            let covers = value >= MAX_VALUE;
            let limit = self.target_limit;
            let list = self.populations.entry(target).or_default();

            if list.is_empty() {
                list.push(ev.clone());
                update.added = true;
                update.improved = true;
                if covers {
                    update.newly_covered.push(target);
                }
                self.on_improvement(target);
                continue;
            }

            let best_value = list[0].fitness().heuristic(target);
            if best_value >= MAX_VALUE {
                if !covers {
                    continue;
                }
                let current = &list[0];
                let shorter = ev.fitness().size() < current.fitness().size();
                let same_size_better = ev.fitness().size() == current.fitness().size()
                    && ev.score() > current.score();
                if shorter || same_size_better {
                    list[0] = ev.clone();
                    update.added = true;
                    update.improved = true;
                    self.on_improvement(target);
                }
                continue;
            }

            if covers {
                list.clear();
                list.push(ev.clone());
                update.added = true;
                update.improved = true;
                update.newly_covered.push(target);
                self.on_improvement(target);
                continue;
            }

            if list.iter().any(|kept| kept.fitness().dominates_on(target, ev.fitness())) {
                continue;
            }
            list.retain(|kept| !ev.fitness().dominates_on(target, kept.fitness()));
            list.push(ev.clone());
            list.sort_by(|a, b| rank(target, a, b));
            list.truncate(limit);
            if list.iter().any(|kept| kept.id() == ev.id()) {
                update.added = true;
            }
            if value > best_value {
                update.improved = true;
                self.on_improvement(target);
            }
        }

        for t in &update.newly_covered {
            debug!("target {t} covered by evaluation {}", ev.id().0);
        }
        update
    }

    fn on_improvement(&mut self, target: TargetId) {
        let counter = self.sampling_counter.get(&target).copied().unwrap_or(0);
        self.last_improvement.insert(target, counter);
        self.sampling_counter.insert(target, 0);
    }

    /// Picks an individual to mutate, favouring under-explored uncovered
    /// targets. `None` when the archive is empty.
    pub fn sample_for_mutation<R: Rng>(&mut self, rng: &mut R) -> Option<EvaluatedIndividual<I>> {
        self.sample_for_mutation_among(None, rng)
    }

    /// Like [`sample_for_mutation`](Self::sample_for_mutation), restricted
    /// to `goals` when at least one of them has entries.
    pub fn sample_for_mutation_among<R: Rng>(
        &mut self,
        goals: Option<&BTreeSet<TargetId>>,
        rng: &mut R,
    ) -> Option<EvaluatedIndividual<I>> {
        let uncovered = self.not_covered_targets();
        let mut candidates: BTreeSet<TargetId> = match goals {
            Some(g) => uncovered.intersection(g).copied().collect(),
            None => BTreeSet::new(),
        };
        if candidates.is_empty() {
            candidates = uncovered;
        }
        if candidates.is_empty() {
            candidates = self.populations.keys().copied().collect();
        }
        if candidates.is_empty() {
            return None;
        }

        let target = self.choose_target(&candidates, rng);
        *self.sampling_counter.entry(target).or_insert(0) += 1;
        self.last_chosen = Some(target);

        let list = self.populations.get(&target)?;
        let fresh: Vec<&EvaluatedIndividual<I>> = list.iter().filter(|e| !e.has_timeout()).collect();
        if fresh.is_empty() {
            list.choose(rng).cloned()
        } else {
            fresh.choose(rng).map(|e| (*e).clone())
        }
    }

    fn counter(&self, target: TargetId) -> u32 {
        self.sampling_counter.get(&target).copied().unwrap_or(0)
    }

    fn least_sampled<R: Rng>(&self, candidates: &BTreeSet<TargetId>, rng: &mut R) -> TargetId {
        let min = candidates.iter().map(|&t| self.counter(t)).min().unwrap_or(0);
        let ties: Vec<TargetId> = candidates
            .iter()
            .copied()
            .filter(|&t| self.counter(t) == min)
            .collect();
        // at least one candidate holds the minimum
        ties[rng.random_range(0..ties.len())]
    }

    fn choose_target<R: Rng>(&self, candidates: &BTreeSet<TargetId>, rng: &mut R) -> TargetId {
        let targets: Vec<TargetId> = candidates.iter().copied().collect();
        match self.sampling {
            FeedbackDirectedSampling::Random => targets[rng.random_range(0..targets.len())],
            FeedbackDirectedSampling::Last => self.least_sampled(candidates, rng),
            FeedbackDirectedSampling::FocusedQuickest => {
                if let Some(last) = self.last_chosen {
                    let interval = self
                        .last_improvement
                        .get(&last)
                        .copied()
                        .filter(|&i| i > 0)
                        .unwrap_or(DEFAULT_IMPROVEMENT_INTERVAL);
                    if candidates.contains(&last) && self.counter(last) < interval * 2 {
                        return last;
                    }
                }
                targets
                    .iter()
                    .copied()
                    .filter(|t| {
                        self.last_improvement
                            .get(t)
                            .is_some_and(|&prev| self.counter(*t) < prev * 2)
                    })
                    .min_by_key(|t| self.last_improvement.get(t).copied().unwrap_or(u32::MAX))
                    .unwrap_or_else(|| self.least_sampled(candidates, rng))
            }
        }
    }

    pub fn is_covered(&self, target: TargetId) -> bool {
        self.populations
            .get(&target)
            .and_then(|l| l.first())
            .is_some_and(|e| e.fitness().does_cover(target))
    }

    pub fn covered_targets(&self) -> BTreeSet<TargetId> {
        self.populations
            .keys()
            .copied()
            .filter(|&t| self.is_covered(t))
            .collect()
    }

    /// Reached targets that are not covered yet.
    pub fn not_covered_targets(&self) -> BTreeSet<TargetId> {
        self.populations
            .keys()
            .copied()
            .filter(|&t| !self.is_covered(t))
            .collect()
    }

    pub fn number_of_covered(&self) -> usize {
        self.covered_targets().len()
    }

    /// Best heuristic kept for a target; 0 when unknown.
    pub fn reached_heuristic(&self, target: TargetId) -> f64 {
        self.populations
            .get(&target)
            .and_then(|l| l.first())
            .map(|e| e.fitness().heuristic(target))
            .unwrap_or(0.0)
    }

    /// Whether `fitness` reaches a target with no entry yet, or covers a
    /// target that is not covered yet.
    pub fn would_reach_new_target(&self, fitness: &FitnessValue) -> bool {
        fitness.reached_targets().any(|(t, v)| {
            v > 0.0
                && match self.populations.get(&t) {
                    None => true,
                    Some(l) if l.is_empty() => true,
                    Some(_) => v >= MAX_VALUE && !self.is_covered(t),
                }
        })
    }

    pub fn entries(&self, target: TargetId) -> &[EvaluatedIndividual<I>] {
        self.populations
            .get(&target)
            .map(|l| l.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.populations.values().all(|l| l.is_empty())
    }

    pub fn sampling_counter(&self, target: TargetId) -> u32 {
        self.counter(target)
    }

    /// Distinct individuals covering at least one target, with the merged
    /// best heuristics of every kept entry.
    pub fn extract_solution(&self) -> Solution<I> {
        let mut overall = FitnessValue::new(0.0);
        for list in self.populations.values() {
            for e in list {
                overall.merge_max(e.fitness());
            }
        }
        let mut seen = BTreeSet::new();
        let mut individuals = Vec::new();
        for (&t, list) in &self.populations {
            if let Some(best) = list.first() {
                if best.fitness().does_cover(t) && seen.insert(best.id()) {
                    individuals.push(best.clone());
                }
            }
        }
        Solution {
            individuals,
            overall,
        }
    }

    pub fn clear(&mut self) {
        self.populations.clear();
        self.sampling_counter.clear();
        self.last_improvement.clear();
        self.last_chosen = None;
        self.budget = TargetBudget::default();
    }

    // ---- per-target budget ----

    /// Fair share of the remaining budget for each uncovered target.
    ///
    /// Never less than 1; `uncovered_size == 0` counts as one target.
    pub fn compute_per_target_budget(&self, time: &SearchTime, uncovered_size: usize) -> u64 {
        (time.remaining_budget_units() / uncovered_size.max(1) as u64).max(1)
    }

    /// Moves the focus to `target` with a fresh budget.
    pub fn focus_on(&mut self, target: TargetId, budget: u64) {
        self.budget.focus_on(target, budget);
    }

    /// Charges consumed budget units to the focused target.
    pub fn update_per_target_budget(&mut self, consumed: u64) {
        self.budget.consume(consumed);
    }

    pub fn focused_target(&self) -> Option<TargetId> {
        self.budget.focused()
    }

    pub fn remaining_target_budget(&self) -> u64 {
        self.budget.remaining()
    }

    /// True without a focus, once the focus budget is spent, or once the
    /// focused target is covered.
    pub fn should_switch_target(&self) -> bool {
        match self.budget.focused() {
            None => true,
            Some(t) => self.budget.is_exhausted() || self.is_covered(t),
        }
    }
}
