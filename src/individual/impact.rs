//! History-weighted choice of which genes to mutate.
//!
//! The history is a plain value owned by the caller. Selection is a pure
//! function of that history and the targets currently pursued, so two runs
//! with the same history, targets and random stream pick the same genes.

use crate::fitness::TargetId;
use crate::individual::gene::GeneId;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};

/// Outcome counters of mutating one gene with respect to one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImpactCounter {
    pub tried: u32,
    pub improved: u32,
}

impl ImpactCounter {
    /// Fraction of tries that improved the target; 0 when never tried.
    pub fn rate(&self) -> f64 {
        if self.tried == 0 {
            0.0
        } else {
            self.improved as f64 / self.tried as f64
        }
    }
}

/// Per-gene, per-target mutation outcomes.
///
/// Genes are keyed by their dotted path (see
/// [`GeneArena::path`](crate::individual::GeneArena::path)) so that the
/// history survives copies and arena compaction.
#[derive(Debug, Clone, Default)]
pub struct MutationHistory {
    records: BTreeMap<String, BTreeMap<TargetId, ImpactCounter>>,
}

impl MutationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one mutation of `key` evaluated against `targets`.
    pub fn record(&mut self, key: &str, targets: &[TargetId], improved: &BTreeSet<TargetId>) {
        let per_target = self.records.entry(key.to_string()).or_default();
        for &t in targets {
            let counter = per_target.entry(t).or_default();
            counter.tried += 1;
            if improved.contains(&t) {
                counter.improved += 1;
            }
        }
    }

    pub fn counter(&self, key: &str, target: TargetId) -> ImpactCounter {
        self.records
            .get(key)
            .and_then(|m| m.get(&target))
            .copied()
            .unwrap_or_default()
    }

    /// Selection weight of a gene: `1 + mean improvement rate` over `targets`.
    pub fn weight(&self, key: &str, targets: &[TargetId]) -> f64 {
        if targets.is_empty() {
            return 1.0;
        }
        let sum: f64 = targets.iter().map(|&t| self.counter(key, t).rate()).sum();
        1.0 + sum / targets.len() as f64
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Picks up to `n` distinct genes by roulette over their history weights.
pub fn weighted_gene_selection<R: Rng, K: AsRef<str>>(
    history: &MutationHistory,
    candidates: &[(GeneId, K)],
    targets: &[TargetId],
    rng: &mut R,
    n: usize,
) -> Vec<GeneId> {
    let mut pool: Vec<(GeneId, f64)> = candidates
        .iter()
        .map(|(g, key)| (*g, history.weight(key.as_ref(), targets)))
        .collect();
    let mut chosen = Vec::with_capacity(n.min(pool.len()));
    while chosen.len() < n && !pool.is_empty() {
        let total: f64 = pool.iter().map(|(_, w)| w).sum();
        let mut roll = rng.random_range(0.0..total);
        let mut pick = pool.len() - 1;
        for (i, (_, w)) in pool.iter().enumerate() {
            roll -= w;
            if roll <= 0.0 {
                pick = i;
                break;
            }
        }
        chosen.push(pool.swap_remove(pick).0);
    }
    chosen
}
