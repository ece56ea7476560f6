//! Control-dependence graph over coverage targets.
//!
//! Instrumentation reports one [`MethodGraph`] per method: its objectives,
//! the objectives reachable on entry (roots) and parent→child edges meaning
//! "the child can only be reached after the parent was exercised". The
//! graphs are unioned into one [`TargetDependencyGraph`], which exposes a
//! frontier of current goals that grows as parents get covered.

use crate::fitness::TargetId;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// Control-dependence data of one method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodGraph {
    pub objectives: Vec<TargetId>,
    pub roots: Vec<TargetId>,
    /// `(parent, child)` pairs.
    pub edges: Vec<(TargetId, TargetId)>,
}

/// Union of every registered method graph.
#[derive(Debug, Clone, Default)]
pub struct TargetDependencyGraph {
    objectives: BTreeSet<TargetId>,
    roots: BTreeSet<TargetId>,
    children: BTreeMap<TargetId, BTreeSet<TargetId>>,
    parents: BTreeMap<TargetId, BTreeSet<TargetId>>,
    current_goals: BTreeSet<TargetId>,
}

static EMPTY: BTreeSet<TargetId> = BTreeSet::new();

impl TargetDependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges method graphs into the global structure.
    ///
    /// Registering the same graph twice changes nothing. Roots and edges
    /// that mention ids outside the known objectives are skipped.
    pub fn add_graphs(&mut self, graphs: &[MethodGraph]) {
        for g in graphs {
            self.objectives.extend(g.objectives.iter().copied());
        }
        for g in graphs {
            for &r in &g.roots {
                if self.objectives.contains(&r) {
                    self.roots.insert(r);
                } else {
                    debug!("ignoring root {r} outside known objectives");
                }
            }
            for &(p, c) in &g.edges {
                if !self.objectives.contains(&p) || !self.objectives.contains(&c) {
                    debug!("ignoring edge {p} -> {c} with unknown endpoint");
                    continue;
                }
                if p == c {
                    debug!("ignoring self edge on {p}");
                    continue;
                }
                self.children.entry(p).or_default().insert(c);
                self.parents.entry(c).or_default().insert(p);
            }
        }
    }

    pub fn has_graphs(&self) -> bool {
        !self.objectives.is_empty()
    }

    pub fn objectives(&self) -> &BTreeSet<TargetId> {
        &self.objectives
    }

    pub fn roots(&self) -> &BTreeSet<TargetId> {
        &self.roots
    }

    pub fn children(&self, id: TargetId) -> &BTreeSet<TargetId> {
        self.children.get(&id).unwrap_or(&EMPTY)
    }

    pub fn parents(&self, id: TargetId) -> &BTreeSet<TargetId> {
        self.parents.get(&id).unwrap_or(&EMPTY)
    }

    /// Recomputes the frontier of goals.
    ///
    /// A graph objective is a goal when it is not covered and it is either a
    /// root or every one of its parents is covered. Uncovered targets the
    /// graph does not know about are always goals, so without any graph the
    /// frontier is exactly `uncovered`.
    pub fn refresh_goals(
        &mut self,
        covered: &BTreeSet<TargetId>,
        uncovered: &BTreeSet<TargetId>,
    ) -> &BTreeSet<TargetId> {
        let mut goals: BTreeSet<TargetId> = uncovered
            .iter()
            .copied()
            .filter(|t| !self.objectives.contains(t))
            .collect();
        for &t in &self.objectives {
            if covered.contains(&t) {
                continue;
            }
            let reachable = self.roots.contains(&t) || self.parents(t).iter().all(|p| covered.contains(p));
            if reachable {
                goals.insert(t);
            }
        }
        self.current_goals = goals;
        &self.current_goals
    }

    /// Frontier computed by the last [`refresh_goals`](Self::refresh_goals).
    pub fn current_goals(&self) -> &BTreeSet<TargetId> {
        &self.current_goals
    }

    pub fn is_goal(&self, id: TargetId) -> bool {
        self.current_goals.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[TargetId]) -> BTreeSet<TargetId> {
        ids.iter().copied().collect()
    }

    fn chain() -> MethodGraph {
        // 1 -> 2 -> 3, 1 -> 4
        MethodGraph {
            objectives: vec![1, 2, 3, 4],
            roots: vec![1],
            edges: vec![(1, 2), (2, 3), (1, 4)],
        }
    }

    #[test]
    fn test_fallback_frontier_without_graphs() {
        let mut g = TargetDependencyGraph::new();
        let uncovered = set(&[3, 8, 11]);
        assert_eq!(g.refresh_goals(&set(&[1]), &uncovered), &uncovered);
        assert!(!g.has_graphs());
    }

    #[test]
    fn test_frontier_grows_with_coverage() {
        let mut g = TargetDependencyGraph::new();
        g.add_graphs(&[chain()]);
        assert_eq!(g.refresh_goals(&set(&[]), &set(&[])), &set(&[1]));
        assert_eq!(g.refresh_goals(&set(&[1]), &set(&[])), &set(&[2, 4]));
        assert_eq!(g.refresh_goals(&set(&[1, 2]), &set(&[4])), &set(&[3, 4]));
        assert!(g.is_goal(3));
        assert_eq!(g.refresh_goals(&set(&[1, 2, 3, 4]), &set(&[])), &set(&[]));
    }

    #[test]
    fn test_non_graph_targets_stay_goals() {
        let mut g = TargetDependencyGraph::new();
        g.add_graphs(&[chain()]);
        let goals = g.refresh_goals(&set(&[]), &set(&[50, 2]));
        assert_eq!(goals, &set(&[1, 50]));
    }

    #[test]
    fn test_child_needs_all_parents() {
        let mut g = TargetDependencyGraph::new();
        g.add_graphs(&[MethodGraph {
            objectives: vec![1, 2, 3],
            roots: vec![1, 2],
            edges: vec![(1, 3), (2, 3)],
        }]);
        assert!(!g.refresh_goals(&set(&[1]), &set(&[])).contains(&3));
        assert!(g.refresh_goals(&set(&[1, 2]), &set(&[])).contains(&3));
    }

    #[test]
    fn test_add_graphs_is_idempotent() {
        let mut g = TargetDependencyGraph::new();
        g.add_graphs(&[chain()]);
        let before = (g.children(1).clone(), g.parents(3).clone(), g.roots().clone());
        g.add_graphs(&[chain(), chain()]);
        assert_eq!(before, (g.children(1).clone(), g.parents(3).clone(), g.roots().clone()));
        assert_eq!(g.children(1), &set(&[2, 4]));
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let mut g = TargetDependencyGraph::new();
        g.add_graphs(&[MethodGraph {
            objectives: vec![1, 2],
            roots: vec![1, 77],
            edges: vec![(1, 2), (1, 99), (98, 2)],
        }]);
        assert_eq!(g.roots(), &set(&[1]));
        assert_eq!(g.children(1), &set(&[2]));
        assert_eq!(g.parents(2), &set(&[1]));
        assert!(g.children(99).is_empty());
        assert!(g.parents(12345).is_empty());
    }

    #[test]
    fn test_edges_across_methods() {
        let mut g = TargetDependencyGraph::new();
        g.add_graphs(&[
            MethodGraph {
                objectives: vec![1],
                roots: vec![1],
                edges: vec![(1, 10)],
            },
            MethodGraph {
                objectives: vec![10],
                roots: vec![],
                edges: vec![],
            },
        ]);
        assert_eq!(g.children(1), &set(&[10]));
        assert_eq!(g.refresh_goals(&set(&[1]), &set(&[])), &set(&[10]));
    }
}
