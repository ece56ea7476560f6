//! Default variation operators on [`TestCase`].
//!
//! Problems built on `TestCase` can delegate their `mutate_*` and
//! `crossover` hooks to these functions.

use super::impact::{weighted_gene_selection, MutationHistory};
use super::test_case::{ActionFilter, GeneFilter, TestCase};
use crate::fitness::TargetId;
use rand::Rng;

/// Mutates each mutable leaf with probability `1/n`, at least one leaf.
///
/// Returns the number of genes that actually changed.
pub fn mutate_genes<R: Rng>(tc: &mut TestCase, rng: &mut R) -> usize {
    let leaves = tc.mutable_leaves(GeneFilter::All);
    if leaves.is_empty() {
        return 0;
    }
    let p = 1.0 / leaves.len() as f64;
    let mut picked: Vec<_> = leaves.iter().copied().filter(|_| rng.random_bool(p)).collect();
    if picked.is_empty() {
        picked.push(leaves[rng.random_range(0..leaves.len())]);
    }
    picked
        .into_iter()
        .filter(|&g| tc.arena_mut().mutate(g, rng))
        .count()
}

/// Mutates `n` leaves chosen by their past impact on `targets`.
///
/// Returns the paths of the mutated genes so the caller can record the
/// outcome in `history` once the individual is evaluated.
pub fn mutate_genes_weighted<R: Rng>(
    tc: &mut TestCase,
    history: &MutationHistory,
    targets: &[TargetId],
    n: usize,
    rng: &mut R,
) -> Vec<String> {
    let candidates: Vec<_> = tc
        .mutable_leaves(GeneFilter::All)
        .into_iter()
        .map(|g| (g, tc.arena().path(g)))
        .collect();
    let chosen = weighted_gene_selection(history, &candidates, targets, rng, n.max(1));
    let mut keys = Vec::with_capacity(chosen.len());
    for g in chosen {
        if tc.arena_mut().mutate(g, rng) {
            keys.push(tc.arena().path(g));
        }
    }
    keys
}

/// Removes or duplicates one main action.
///
/// Does nothing on individuals whose structure is fixed. Never shrinks below
/// one action nor grows above `max_actions`.
pub fn mutate_structure<R: Rng>(tc: &mut TestCase, max_actions: usize, rng: &mut R) -> bool {
    if !tc.can_mutate_structure() {
        return false;
    }
    let ids: Vec<_> = tc
        .see_actions(ActionFilter::Main)
        .iter()
        .map(|a| a.local_id())
        .collect();
    if ids.is_empty() {
        return false;
    }
    let target = ids[rng.random_range(0..ids.len())];
    let can_remove = ids.len() > 1;
    let can_add = ids.len() < max_actions;
    match (can_remove, can_add) {
        (true, true) if rng.random_bool(0.5) => tc.remove_action(target),
        (true, false) => tc.remove_action(target),
        (_, true) => tc.duplicate_action(target).is_some(),
        (false, false) => false,
    }
}

/// Single-point crossover on the main actions of two test cases.
///
/// The tails after a random cut point are swapped; genes are copied across
/// arenas. Needs at least two main actions on both sides and returns whether
/// anything was exchanged.
pub fn crossover_actions<R: Rng>(a: &mut TestCase, b: &mut TestCase, rng: &mut R) -> bool {
    if !a.can_mutate_structure() || !b.can_mutate_structure() {
        return false;
    }
    let len = a.size().min(b.size());
    if len < 2 {
        return false;
    }
    let cut = rng.random_range(1..len);
    let snapshot_a = a.clone();
    let snapshot_b = b.clone();

    let tail_a = match import_tail(b, &snapshot_a, cut) {
        Some(t) => t,
        None => return false,
    };
    let tail_b = match import_tail(a, &snapshot_b, cut) {
        Some(t) => t,
        None => {
            *b = snapshot_b;
            return false;
        }
    };
    splice(a, cut, tail_b);
    splice(b, cut, tail_a);
    true
}

fn import_tail(into: &mut TestCase, from: &TestCase, cut: usize) -> Option<Vec<super::Action>> {
    from.see_actions(ActionFilter::Main)[cut..]
        .iter()
        .map(|action| into.import_action(from, action))
        .collect()
}

fn splice(tc: &mut TestCase, cut: usize, tail: Vec<super::Action>) {
    if let Some(main) = tc.main_group_mut() {
        main.actions.truncate(cut);
        main.actions.extend(tail);
    }
    tc.compact();
}
