//! Many-objective ranking used by MOSA.
//!
//! Every uncovered target is one objective to maximize. [`preference_sorting`]
//! puts the best individual of each target in front 0 and ranks the rest by
//! Pareto dominance; [`subvector_dominance`] replaces crowding distance,
//! which degenerates with many objectives.
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - Panichella, Kifetew & Tonella (2015), "Reformulating Branch Coverage as a
//!   Many-Objective Optimization Problem"
//! - Köppen & Yoshida (2007), "Substitute Distance Assignments in NSGA-II for
//!   Handling Many-Objective Optimization Problems"

use crate::fitness::{FitnessValue, TargetId};
use std::collections::BTreeSet;

/// Result of non-dominated sorting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NondominatedSortResult {
    /// Pareto rank for each solution (0 = front).
    pub ranks: Vec<usize>,

    /// Indices grouped by front: `fronts[0]` contains rank-0 indices, etc.
    pub fronts: Vec<Vec<usize>>,
}

#[derive(Debug, PartialEq)]
enum Dominance {
    Left,
    Right,
    Neither,
}

/// Pareto comparison where higher values are better.
fn dominance_cmp(a: &[f64], b: &[f64]) -> Dominance {
    let mut a_better = false;
    let mut b_better = false;
    for (&va, &vb) in a.iter().zip(b) {
        if va > vb {
            a_better = true;
        } else if vb > va {
            b_better = true;
        }
        if a_better && b_better {
            return Dominance::Neither;
        }
    }
    match (a_better, b_better) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        _ => Dominance::Neither,
    }
}

/// Fast non-dominated sorting over objective vectors (all maximized).
///
/// An empty input yields an empty result.
///
/// # Example
///
/// ```
/// use u_sbst::search::pareto::non_dominated_sort;
///
/// let objectives = vec![
///     vec![1.0, 0.2],
///     vec![0.6, 0.6],
///     vec![0.5, 0.5], // dominated by the second
/// ];
/// let result = non_dominated_sort(&objectives);
/// assert_eq!(result.ranks, vec![0, 0, 1]);
/// ```
pub fn non_dominated_sort(objectives: &[Vec<f64>]) -> NondominatedSortResult {
    let n = objectives.len();
    if n == 0 {
        return NondominatedSortResult::default();
    }

    let mut domination_count = vec![0usize; n];
    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut ranks = vec![0usize; n];

    for i in 0..n {
        for j in (i + 1)..n {
            match dominance_cmp(&objectives[i], &objectives[j]) {
                Dominance::Left => {
                    dominated_by[i].push(j);
                    domination_count[j] += 1;
                }
                Dominance::Right => {
                    dominated_by[j].push(i);
                    domination_count[i] += 1;
                }
                Dominance::Neither => {}
            }
        }
    }

    let mut current: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();
    let mut fronts = Vec::new();
    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            for &j in &dominated_by[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    ranks[j] = fronts.len() + 1;
                    next.push(j);
                }
            }
        }
        fronts.push(current);
        current = next;
    }

    NondominatedSortResult { ranks, fronts }
}

/// Heuristics of `fitness` on `targets`, in target order.
fn objective_vector(fitness: &FitnessValue, targets: &BTreeSet<TargetId>) -> Vec<f64> {
    targets.iter().map(|&t| fitness.heuristic(t)).collect()
}

/// Ranks individuals for many-objective search.
///
/// Front 0 holds, for every target in `uncovered`, the individual with the
/// highest heuristic on it (smaller size on ties, then lower index). The
/// remaining individuals follow in non-dominated fronts over `uncovered`.
/// With no uncovered target everything lands in a single front.
pub fn preference_sorting(fitness: &[&FitnessValue], uncovered: &BTreeSet<TargetId>) -> Vec<Vec<usize>> {
    if fitness.is_empty() {
        return Vec::new();
    }
    if uncovered.is_empty() {
        return vec![(0..fitness.len()).collect()];
    }

    let mut front_zero = BTreeSet::new();
    for &t in uncovered {
        let mut chosen = 0;
        for (i, f) in fitness.iter().enumerate().skip(1) {
            let (h, best) = (f.heuristic(t), fitness[chosen].heuristic(t));
            if h > best || (h == best && f.size() < fitness[chosen].size()) {
                chosen = i;
            }
        }
        front_zero.insert(chosen);
    }

    let remaining: Vec<usize> = (0..fitness.len()).filter(|i| !front_zero.contains(i)).collect();
    let objectives: Vec<Vec<f64>> = remaining
        .iter()
        .map(|&i| objective_vector(fitness[i], uncovered))
        .collect();

    let mut fronts = vec![front_zero.into_iter().collect::<Vec<_>>()];
    for front in non_dominated_sort(&objectives).fronts {
        fronts.push(front.into_iter().map(|k| remaining[k]).collect());
    }
    fronts
}

/// Sub-vector dominance distance of each member of `front`.
///
/// For a member `i` it is the largest, over the other members `j`, number of
/// uncovered targets on which `i` is strictly better than `j`. Returned in
/// the order of `front`.
pub fn subvector_dominance(fitness: &[&FitnessValue], front: &[usize], uncovered: &BTreeSet<TargetId>) -> Vec<usize> {
    front
        .iter()
        .map(|&i| {
            front
                .iter()
                .filter(|&&j| j != i)
                .map(|&j| {
                    uncovered
                        .iter()
                        .filter(|&&t| fitness[i].heuristic(t) > fitness[j].heuristic(t))
                        .count()
                })
                .max()
                .unwrap_or(0)
        })
        .collect()
}
