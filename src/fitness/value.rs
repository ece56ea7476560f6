//! Per-target heuristic values.

use std::collections::{BTreeMap, BTreeSet};

/// Identifier of a coverage target.
pub type TargetId = u32;

/// Heuristic value meaning "covered".
pub const MAX_VALUE: f64 = 1.0;

/// Outcome of running an individual: one heuristic in `[0, 1]` per reached
/// target, plus a secondary size metric that is minimized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitnessValue {
    targets: BTreeMap<TargetId, f64>,
    size: f64,
}

impl FitnessValue {
    pub fn new(size: f64) -> Self {
        Self {
            targets: BTreeMap::new(),
            size,
        }
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn set_size(&mut self, size: f64) {
        self.size = size;
    }

    /// Records a heuristic, clamped to `[0, 1]`, keeping the best seen value.
    ///
    /// NaN values are ignored.
    pub fn update_target(&mut self, target: TargetId, value: f64) {
        if value.is_nan() {
            return;
        }
        let value = value.clamp(0.0, MAX_VALUE);
        let slot = self.targets.entry(target).or_insert(0.0);
        if value > *slot {
            *slot = value;
        }
    }

    /// Heuristic of a target; 0 when it was never reached.
    pub fn heuristic(&self, target: TargetId) -> f64 {
        self.targets.get(&target).copied().unwrap_or(0.0)
    }

    pub fn does_cover(&self, target: TargetId) -> bool {
        self.heuristic(target) >= MAX_VALUE
    }

    /// Targets with a recorded value (partial or full).
    pub fn reached_targets(&self) -> impl Iterator<Item = (TargetId, f64)> + '_ {
        self.targets.iter().map(|(&t, &v)| (t, v))
    }

    pub fn covered_targets(&self) -> BTreeSet<TargetId> {
        self.targets
            .iter()
            .filter(|(_, v)| **v >= MAX_VALUE)
            .map(|(&t, _)| t)
            .collect()
    }

    /// Sum of every recorded heuristic.
    pub fn compute_fitness_score(&self) -> f64 {
        self.targets.values().sum()
    }

    /// Strictly higher heuristic on `target`.
    pub fn better_than(&self, target: TargetId, other: &FitnessValue) -> bool {
        self.heuristic(target) > other.heuristic(target)
    }

    /// Same heuristic and same size.
    pub fn equivalent(&self, target: TargetId, other: &FitnessValue) -> bool {
        self.heuristic(target) == other.heuristic(target) && self.size == other.size
    }

    /// Pareto dominance over (heuristic desc, size asc) for one target.
    pub fn dominates_on(&self, target: TargetId, other: &FitnessValue) -> bool {
        let (h, oh) = (self.heuristic(target), other.heuristic(target));
        (h >= oh && self.size <= other.size) && (h > oh || self.size < other.size)
    }

    /// At least as good as `other` on every one of `targets`.
    ///
    /// With an empty `targets` set every reached target of `other` is used.
    pub fn subsumes(&self, other: &FitnessValue, targets: &BTreeSet<TargetId>) -> bool {
        if targets.is_empty() {
            other
                .targets
                .iter()
                .all(|(&t, &v)| self.heuristic(t) >= v)
        } else {
            targets
                .iter()
                .all(|&t| self.heuristic(t) >= other.heuristic(t))
        }
    }

    /// Keeps, for every target, the higher of the two heuristics.
    pub fn merge_max(&mut self, other: &FitnessValue) {
        for (&t, &v) in &other.targets {
            self.update_target(t, v);
        }
    }
}
