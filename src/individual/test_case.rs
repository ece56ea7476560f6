//! The concrete individual: a grouped sequence of actions.

use super::action::{Action, ActionId};
use super::gene::{copy_subtree, GeneArena, GeneId};

/// Role of an action group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Set-up steps executed before the main actions (e.g. data insertion).
    Initialization,
    /// Steps whose execution is the test itself.
    Main,
}

/// How an individual was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    Random,
    Smart,
    /// Provided from outside; its structure must be left as is.
    Seeded,
}

/// Which actions (and therefore which genes) to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionFilter {
    All,
    Initialization,
    Main,
}

/// Gene enumeration uses the same filter as actions.
pub type GeneFilter = ActionFilter;

impl ActionFilter {
    fn accepts(self, kind: GroupKind) -> bool {
        match self {
            ActionFilter::All => true,
            ActionFilter::Initialization => kind == GroupKind::Initialization,
            ActionFilter::Main => kind == GroupKind::Main,
        }
    }
}

/// Ordered actions sharing a role.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionGroup {
    pub kind: GroupKind,
    pub actions: Vec<Action>,
}

/// A candidate test: initialization actions followed by main actions.
///
/// The gene arena is owned by value, so `clone()` is a deep copy.
#[derive(Debug, Clone)]
pub struct TestCase {
    arena: GeneArena,
    groups: Vec<ActionGroup>,
    sample_type: SampleType,
    next_action_id: u32,
}

impl TestCase {
    pub fn new(sample_type: SampleType) -> Self {
        Self {
            arena: GeneArena::new(),
            groups: vec![
                ActionGroup {
                    kind: GroupKind::Initialization,
                    actions: Vec::new(),
                },
                ActionGroup {
                    kind: GroupKind::Main,
                    actions: Vec::new(),
                },
            ],
            sample_type,
            next_action_id: 0,
        }
    }

    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    pub fn arena(&self) -> &GeneArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut GeneArena {
        &mut self.arena
    }

    pub fn groups(&self) -> &[ActionGroup] {
        &self.groups
    }

    /// Appends an action to the first group of the given kind.
    ///
    /// `genes` must be roots already allocated in [`arena_mut`](Self::arena_mut).
    pub fn add_action(&mut self, group: GroupKind, name: impl Into<String>, genes: Vec<GeneId>) -> ActionId {
        let id = self.fresh_id();
        let action = Action {
            local_id: id,
            name: name.into(),
            genes,
        };
        match self.groups.iter_mut().find(|g| g.kind == group) {
            Some(g) => g.actions.push(action),
            None => self.groups.push(ActionGroup {
                kind: group,
                actions: vec![action],
            }),
        }
        id
    }

    fn fresh_id(&mut self) -> ActionId {
        let id = ActionId(self.next_action_id);
        self.next_action_id += 1;
        id
    }

    pub fn see_actions(&self, filter: ActionFilter) -> Vec<&Action> {
        self.groups
            .iter()
            .filter(|g| filter.accepts(g.kind))
            .flat_map(|g| g.actions.iter())
            .collect()
    }

    /// Every gene (nested ones included) of the filtered actions.
    pub fn see_genes(&self, filter: GeneFilter) -> Vec<GeneId> {
        self.see_actions(filter)
            .into_iter()
            .flat_map(|a| a.genes.iter())
            .flat_map(|&g| self.arena.descendants(g))
            .collect()
    }

    /// Mutable value leaves of the filtered actions.
    pub fn mutable_leaves(&self, filter: GeneFilter) -> Vec<GeneId> {
        self.see_actions(filter)
            .into_iter()
            .flat_map(|a| a.genes.iter())
            .flat_map(|&g| self.arena.mutable_leaves(g))
            .collect()
    }

    /// Collapses every group into a single main group, keeping order.
    pub fn flatten(&mut self) {
        let actions: Vec<Action> = self.groups.drain(..).flat_map(|g| g.actions).collect();
        self.groups.push(ActionGroup {
            kind: GroupKind::Main,
            actions,
        });
    }

    /// Number of main actions.
    pub fn size(&self) -> usize {
        self.see_actions(ActionFilter::Main).len()
    }

    pub fn can_mutate_structure(&self) -> bool {
        self.sample_type != SampleType::Seeded
    }

    pub fn find_action(&self, id: ActionId) -> Option<&Action> {
        self.groups
            .iter()
            .flat_map(|g| g.actions.iter())
            .find(|a| a.local_id == id)
    }

    fn locate(&self, id: ActionId) -> Option<(usize, usize)> {
        self.groups.iter().enumerate().find_map(|(gi, g)| {
            g.actions
                .iter()
                .position(|a| a.local_id == id)
                .map(|ai| (gi, ai))
        })
    }

    /// Removes an action and the genes it owns.
    pub fn remove_action(&mut self, id: ActionId) -> bool {
        match self.locate(id) {
            Some((gi, ai)) => {
                self.groups[gi].actions.remove(ai);
                self.compact();
                true
            }
            None => false,
        }
    }

    /// Inserts a deep copy of an action right after it, under a fresh id.
    pub fn duplicate_action(&mut self, id: ActionId) -> Option<ActionId> {
        let (gi, ai) = self.locate(id)?;
        let source = self.groups[gi].actions[ai].clone();
        let mut genes = Vec::with_capacity(source.genes.len());
        for g in &source.genes {
            genes.push(self.arena.duplicate_subtree(*g, None)?);
        }
        let new_id = self.fresh_id();
        self.groups[gi].actions.insert(
            ai + 1,
            Action {
                local_id: new_id,
                name: source.name,
                genes,
            },
        );
        Some(new_id)
    }

    /// Copies an action of another test case into this one's arena.
    ///
    /// The copy gets a fresh local id and is not attached to any group.
    pub(crate) fn import_action(&mut self, from: &TestCase, action: &Action) -> Option<Action> {
        let mut genes = Vec::with_capacity(action.genes.len());
        for g in &action.genes {
            genes.push(copy_subtree(&from.arena, *g, &mut self.arena, None)?);
        }
        Some(Action {
            local_id: self.fresh_id(),
            name: action.name.clone(),
            genes,
        })
    }

    pub(crate) fn main_group_mut(&mut self) -> Option<&mut ActionGroup> {
        self.groups.iter_mut().find(|g| g.kind == GroupKind::Main)
    }

    /// Drops genes no action refers to anymore.
    pub(crate) fn compact(&mut self) {
        let roots: Vec<GeneId> = self
            .groups
            .iter()
            .flat_map(|g| g.actions.iter())
            .flat_map(|a| a.genes.iter().copied())
            .collect();
        let mapping = self.arena.compact(&roots);
        for action in self.groups.iter_mut().flat_map(|g| g.actions.iter_mut()) {
            for g in action.genes.iter_mut() {
                if let Some(&n) = mapping.get(g) {
                    *g = n;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::individual::gene::GeneKind;

    fn sample() -> TestCase {
        let mut tc = TestCase::new(SampleType::Random);
        let token = tc.arena_mut().add_root("token", GeneKind::Text { value: "t".into(), max_len: 4 });
        tc.add_action(GroupKind::Initialization, "insert_user", vec![token]);
        let body = tc.arena_mut().add_root("body", GeneKind::Object);
        tc.arena_mut()
            .add_child(body, "id", GeneKind::Integer { value: 1, min: 0, max: 10 })
            .unwrap();
        tc.add_action(GroupKind::Main, "post_user", vec![body]);
        let flag = tc.arena_mut().add_root("verbose", GeneKind::Boolean(false));
        tc.add_action(GroupKind::Main, "get_user", vec![flag]);
        tc
    }

    #[test]
    fn test_size_counts_main_actions() {
        let tc = sample();
        assert_eq!(tc.size(), 2);
        assert_eq!(tc.see_actions(ActionFilter::All).len(), 3);
        assert_eq!(tc.see_actions(ActionFilter::Initialization).len(), 1);
    }

    #[test]
    fn test_see_genes_includes_nested() {
        let tc = sample();
        assert_eq!(tc.see_genes(GeneFilter::Main).len(), 3);
        assert_eq!(tc.see_genes(GeneFilter::All).len(), 4);
        assert_eq!(tc.mutable_leaves(GeneFilter::Main).len(), 2);
    }

    #[test]
    fn test_flatten_keeps_order() {
        let mut tc = sample();
        tc.flatten();
        let names: Vec<&str> = tc.see_actions(ActionFilter::Main).iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["insert_user", "post_user", "get_user"]);
        assert_eq!(tc.size(), 3);
        assert_eq!(tc.groups().len(), 1);
    }

    #[test]
    fn test_seeded_structure_is_fixed() {
        assert!(!TestCase::new(SampleType::Seeded).can_mutate_structure());
        assert!(TestCase::new(SampleType::Smart).can_mutate_structure());
    }

    #[test]
    fn test_duplicate_action_is_deep() {
        let mut tc = sample();
        let post = tc.see_actions(ActionFilter::Main)[0].local_id();
        let copy = tc.duplicate_action(post).unwrap();
        assert_ne!(copy, post);
        assert_eq!(tc.size(), 3);

        let original_root = tc.find_action(post).unwrap().genes()[0];
        let copy_root = tc.find_action(copy).unwrap().genes()[0];
        assert_ne!(original_root, copy_root);
        assert!(tc.arena().subtree_eq(original_root, tc.arena(), copy_root));

        let id_gene = tc.arena().children(copy_root)[0];
        tc.arena_mut()
            .set_value(id_gene, GeneKind::Integer { value: 7, min: 0, max: 10 });
        let original_id = tc.arena().children(original_root)[0];
        assert_eq!(tc.arena().as_i64(original_id), Some(1));
    }

    #[test]
    fn test_remove_action_compacts_arena() {
        let mut tc = sample();
        let before = tc.arena().len();
        let post = tc.see_actions(ActionFilter::Main)[0].local_id();
        assert!(tc.remove_action(post));
        assert!(!tc.remove_action(post));
        assert_eq!(tc.arena().len(), before - 2);
        assert_eq!(tc.size(), 1);
        let flag = tc.see_actions(ActionFilter::Main)[0].genes()[0];
        assert_eq!(tc.arena().as_bool(flag), Some(false));
    }

    #[test]
    fn test_clone_is_independent() {
        let tc = sample();
        let mut copy = tc.clone();
        let flag = copy.see_actions(ActionFilter::Main)[1].genes()[0];
        copy.arena_mut().set_value(flag, GeneKind::Boolean(true));
        assert_eq!(tc.arena().as_bool(flag), Some(false));
    }

    #[test]
    fn test_find_unknown_action() {
        let tc = sample();
        assert!(tc.find_action(ActionId(42)).is_none());
    }
}
