//! Parent selection.
//!
//! Strategies see only the scores of the candidates (higher is better) and
//! return the index of the chosen one, so the same strategy works on a flat
//! population, a grid neighbourhood or a sorted archive slice.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use rand::Rng;
use std::collections::VecDeque;

/// Picks one index out of a list of scores.
pub trait SelectionStrategy {
    /// Returns an index into `scores`; higher scores are preferred.
    ///
    /// # Panics
    /// Implementations may panic if `scores` is empty.
    fn select<R: Rng>(&mut self, scores: &[f64], rng: &mut R) -> usize;
}

/// Built-in selection strategies.
///
/// # Examples
///
/// ```
/// use u_sbst::search::{Selection, SelectionStrategy};
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
/// let mut sel = Selection::Tournament(3);
/// let i = sel.select(&[0.1, 0.9, 0.4], &mut rng);
/// assert!(i < 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Every candidate is equally likely.
    Uniform,

    /// Pick `k` candidates with replacement, keep the best.
    ///
    /// On ties the first drawn contestant wins.
    Tournament(usize),

    /// Linear ranking: the best gets weight `n`, the worst weight 1.
    ///
    /// Reference: Baker (1985), "Adaptive Selection Methods for Genetic
    /// Algorithms"
    Rank,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(10)
    }
}

impl SelectionStrategy for Selection {
    fn select<R: Rng>(&mut self, scores: &[f64], rng: &mut R) -> usize {
        assert!(!scores.is_empty(), "cannot select from empty population");
        match *self {
            Selection::Uniform => rng.random_range(0..scores.len()),
            Selection::Tournament(k) => tournament(scores, k, rng),
            Selection::Rank => rank(scores, rng),
        }
    }
}

fn tournament<R: Rng>(scores: &[f64], k: usize, rng: &mut R) -> usize {
    let n = scores.len();
    let mut best = rng.random_range(0..n);
    for _ in 1..k.max(1) {
        let idx = rng.random_range(0..n);
        if scores[idx] > scores[best] {
            best = idx;
        }
    }
    best
}

fn rank<R: Rng>(scores: &[f64], rng: &mut R) -> usize {
    let n = scores.len();
    if n == 1 {
        return 0;
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let total = (n * (n + 1)) as f64 / 2.0;
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (position, &idx) in order.iter().enumerate() {
        cumulative += (n - position) as f64;
        if cumulative > threshold {
            return idx;
        }
    }
    order[n - 1]
}

/// Replays a fixed queue of indices.
///
/// Meant for deterministic tests of the search loop. Indices are clamped to
/// the candidate list; once the queue is exhausted index 0 is returned.
#[derive(Debug, Clone, Default)]
pub struct FixedSelection {
    queue: VecDeque<usize>,
    calls: usize,
}

impl FixedSelection {
    pub fn new(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            queue: indices.into_iter().collect(),
            calls: 0,
        }
    }

    /// Number of `select` calls so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl SelectionStrategy for FixedSelection {
    fn select<R: Rng>(&mut self, scores: &[f64], _rng: &mut R) -> usize {
        self.calls += 1;
        let idx = self.queue.pop_front().unwrap_or(0);
        idx.min(scores.len().saturating_sub(1))
    }
}

impl<S: SelectionStrategy> SelectionStrategy for &mut S {
    fn select<R: Rng>(&mut self, scores: &[f64], rng: &mut R) -> usize {
        (**self).select(scores, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_tournament_favors_best() {
        let scores = [0.1, 0.5, 0.9, 0.2];
        let mut rng = rng();
        let mut counts = [0u32; 4];
        let n = 10_000;
        for _ in 0..n {
            counts[Selection::Tournament(4).select(&scores, &mut rng)] += 1;
        }
        assert!(
            counts[2] > 6000,
            "expected best to be selected >60% of the time, got {}/{n}",
            counts[2]
        );
    }

    #[test]
    fn test_tournament_size_1_is_random() {
        let scores = [0.1, 0.5, 0.9, 0.2];
        let mut rng = rng();
        let mut counts = [0u32; 4];
        for _ in 0..10_000 {
            counts[Selection::Tournament(1).select(&scores, &mut rng)] += 1;
        }
        for &c in &counts {
            assert!(c > 1500, "expected uniform, got counts: {counts:?}");
        }
    }

    #[test]
    fn test_uniform_covers_all() {
        let scores = [0.0; 5];
        let mut rng = rng();
        let mut seen = [false; 5];
        for _ in 0..500 {
            seen[Selection::Uniform.select(&scores, &mut rng)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_rank_favors_best() {
        let scores = [0.1, 0.5, 0.9, 0.2];
        let mut rng = rng();
        let mut counts = [0u32; 4];
        for _ in 0..10_000 {
            counts[Selection::Rank.select(&scores, &mut rng)] += 1;
        }
        // weights 4, 3, 2, 1 for indices 2, 1, 3, 0
        assert!(counts[2] > counts[1]);
        assert!(counts[1] > counts[3]);
        assert!(counts[3] > counts[0]);
    }

    #[test]
    fn test_single_candidate() {
        let mut rng = rng();
        for mut sel in [Selection::Uniform, Selection::Tournament(3), Selection::Rank] {
            assert_eq!(sel.select(&[0.3], &mut rng), 0);
        }
    }

    #[test]
    fn test_fixed_selection_replays_queue() {
        let mut rng = rng();
        let mut sel = FixedSelection::new([2, 0, 9]);
        let scores = [0.0; 3];
        assert_eq!(sel.select(&scores, &mut rng), 2);
        assert_eq!(sel.select(&scores, &mut rng), 0);
        // clamped to the last candidate
        assert_eq!(sel.select(&scores, &mut rng), 2);
        // exhausted
        assert_eq!(sel.select(&scores, &mut rng), 0);
        assert_eq!(sel.calls(), 4);
    }

    #[test]
    fn test_mut_ref_delegates() {
        let mut rng = rng();
        fn pick<S: SelectionStrategy>(mut strategy: S, rng: &mut StdRng) -> usize {
            strategy.select(&[0.0, 0.0], rng)
        }
        let mut sel = FixedSelection::new([1]);
        assert_eq!(pick(&mut sel, &mut rng), 1);
        assert_eq!(sel.calls(), 1);
    }
}
