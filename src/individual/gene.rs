//! Gene trees stored in an arena.
//!
//! Every gene of an individual lives in one [`GeneArena`] and is addressed
//! by a [`GeneId`] handle. A node stores its parent handle, so looking up an
//! owner is a plain index read and no reference cycles can exist. A schema
//! that refers to itself is cut with a [`GeneKind::CycleSentinel`] leaf
//! instead of an edge back to an ancestor.

use rand::distr::Alphanumeric;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};
use std::mem::discriminant;

/// Handle of a gene inside its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeneId(pub(crate) u32);

impl GeneId {
    /// Raw index of the handle.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Value (or structural role) carried by a gene.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneKind {
    Boolean(bool),
    Integer { value: i64, min: i64, max: i64 },
    Double { value: f64, min: f64, max: f64 },
    Text { value: String, max_len: usize },
    Enum { index: usize, size: usize },
    /// Composite whose children are named fields.
    Object,
    /// Composite whose children are elements.
    Array { max_size: usize },
    /// Composite with a single child that may be switched off.
    Optional { active: bool },
    /// Leaf standing in for a structure that would refer to an ancestor.
    CycleSentinel,
}

impl GeneKind {
    /// Whether the kind holds a value directly (as opposed to children).
    pub fn is_leaf_value(&self) -> bool {
        !matches!(
            self,
            GeneKind::Object | GeneKind::Array { .. } | GeneKind::CycleSentinel
        )
    }
}

#[derive(Debug, Clone)]
struct GeneNode {
    name: String,
    kind: GeneKind,
    parent: Option<GeneId>,
    children: Vec<GeneId>,
    mutable: bool,
}

/// Arena owning the gene trees of one individual.
///
/// Cloning the arena is a deep copy; handles stay valid in the clone.
#[derive(Debug, Clone, Default)]
pub struct GeneArena {
    nodes: Vec<GeneNode>,
    bindings: BTreeMap<GeneId, BTreeSet<GeneId>>,
}

impl GeneArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes, including unreachable ones awaiting [`compact`](Self::compact).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a gene without an owner.
    pub fn add_root(&mut self, name: impl Into<String>, kind: GeneKind) -> GeneId {
        self.push(name.into(), kind, None, true)
    }

    /// Adds a gene owned by `parent`.
    ///
    /// Returns `None` when `parent` is unknown or is a leaf that cannot own
    /// children.
    pub fn add_child(
        &mut self,
        parent: GeneId,
        name: impl Into<String>,
        kind: GeneKind,
    ) -> Option<GeneId> {
        let owner = self.nodes.get(parent.index())?;
        if owner.kind.is_leaf_value() && !matches!(owner.kind, GeneKind::Optional { .. }) {
            return None;
        }
        if matches!(owner.kind, GeneKind::CycleSentinel) {
            return None;
        }
        if matches!(owner.kind, GeneKind::Optional { .. }) && !owner.children.is_empty() {
            return None;
        }
        let id = self.push(name.into(), kind, Some(parent), true);
        self.nodes[parent.index()].children.push(id);
        Some(id)
    }

    /// Marks a gene (and implicitly its subtree) as immutable.
    pub fn set_immutable(&mut self, id: GeneId) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.mutable = false;
        }
    }

    fn push(&mut self, name: String, kind: GeneKind, parent: Option<GeneId>, mutable: bool) -> GeneId {
        let id = GeneId(self.nodes.len() as u32);
        self.nodes.push(GeneNode {
            name,
            kind,
            parent,
            children: Vec::new(),
            mutable,
        });
        id
    }

    pub fn kind(&self, id: GeneId) -> Option<&GeneKind> {
        self.nodes.get(id.index()).map(|n| &n.kind)
    }

    pub fn name(&self, id: GeneId) -> Option<&str> {
        self.nodes.get(id.index()).map(|n| n.name.as_str())
    }

    /// Owner of a gene; `None` for roots and unknown handles.
    pub fn parent(&self, id: GeneId) -> Option<GeneId> {
        self.nodes.get(id.index()).and_then(|n| n.parent)
    }

    pub fn children(&self, id: GeneId) -> &[GeneId] {
        self.nodes
            .get(id.index())
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Dotted name path from the root down to `id`, e.g. `person.age`.
    pub fn path(&self, id: GeneId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(c) = current {
            match self.nodes.get(c.index()) {
                Some(node) => {
                    names.push(node.name.as_str());
                    current = node.parent;
                }
                None => break,
            }
        }
        names.reverse();
        names.join(".")
    }

    /// A gene is mutable when neither it nor any owner is marked immutable.
    pub fn is_mutable(&self, id: GeneId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            match self.nodes.get(c.index()) {
                Some(node) if node.mutable => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Pre-order walk of the subtree rooted at `root` (root included).
    pub fn descendants(&self, root: GeneId) -> Vec<GeneId> {
        let mut out = Vec::new();
        if self.nodes.get(root.index()).is_none() {
            return out;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            for &c in self.children(id).iter().rev() {
                stack.push(c);
            }
        }
        out
    }

    /// Mutable value-carrying genes below `root`.
    pub fn mutable_leaves(&self, root: GeneId) -> Vec<GeneId> {
        self.descendants(root)
            .into_iter()
            .filter(|&g| {
                self.kind(g).is_some_and(|k| {
                    k.is_leaf_value() || matches!(k, GeneKind::Array { .. })
                }) && self.is_mutable(g)
            })
            .collect()
    }

    /// Replaces the value of a leaf, keeping its variant.
    ///
    /// Returns `false` (and leaves the gene untouched) on a variant mismatch,
    /// an unknown handle or an immutable gene.
    pub fn set_value(&mut self, id: GeneId, kind: GeneKind) -> bool {
        if !self.is_mutable(id) {
            return false;
        }
        match self.nodes.get_mut(id.index()) {
            Some(node) if discriminant(&node.kind) == discriminant(&kind) && kind.is_leaf_value() => {
                node.kind = kind;
                true
            }
            _ => false,
        }
    }

    pub fn as_bool(&self, id: GeneId) -> Option<bool> {
        match self.kind(id)? {
            GeneKind::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self, id: GeneId) -> Option<i64> {
        match self.kind(id)? {
            GeneKind::Integer { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Binds two genes so that their values follow each other.
    pub fn bind(&mut self, a: GeneId, b: GeneId) {
        if a == b || self.nodes.get(a.index()).is_none() || self.nodes.get(b.index()).is_none() {
            return;
        }
        self.bindings.entry(a).or_default().insert(b);
        self.bindings.entry(b).or_default().insert(a);
    }

    pub fn bound_to(&self, id: GeneId) -> impl Iterator<Item = GeneId> + '_ {
        self.bindings.get(&id).into_iter().flatten().copied()
    }

    /// Copies the value of `source` into every gene bound to it.
    ///
    /// Bindings between different value variants are skipped.
    pub fn sync_bindings(&mut self, source: GeneId) {
        let Some(kind) = self.kind(source).cloned() else {
            return;
        };
        if !kind.is_leaf_value() {
            return;
        }
        let targets: Vec<GeneId> = self.bound_to(source).collect();
        for t in targets {
            if let Some(node) = self.nodes.get_mut(t.index()) {
                if discriminant(&node.kind) == discriminant(&kind) {
                    node.kind = kind.clone();
                }
            }
        }
    }

    /// Assigns random values to every mutable gene below `root`.
    pub fn randomize<R: Rng>(&mut self, root: GeneId, rng: &mut R) {
        for id in self.descendants(root) {
            if !self.is_mutable(id) {
                continue;
            }
            let node = &mut self.nodes[id.index()];
            match &mut node.kind {
                GeneKind::Boolean(v) => *v = rng.random_bool(0.5),
                GeneKind::Integer { value, min, max } => {
                    let (lo, hi) = ordered(*min, *max);
                    *value = rng.random_range(lo..=hi)
                }
                GeneKind::Double { value, min, max } => {
                    *value = if max > min { rng.random_range(*min..=*max) } else { *min }
                }
                GeneKind::Text { value, max_len } => {
                    let len = rng.random_range(0..=*max_len);
                    *value = random_text(rng, len);
                }
                GeneKind::Enum { index, size } => {
                    if *size > 0 {
                        *index = rng.random_range(0..*size);
                    }
                }
                GeneKind::Optional { active } => *active = rng.random_bool(0.5),
                GeneKind::Object | GeneKind::Array { .. } | GeneKind::CycleSentinel => {}
            }
        }
        self.sync_bindings(root);
    }

    /// Applies a small perturbation to one gene.
    ///
    /// Arrays grow by duplicating an element or shrink by dropping the last
    /// one. Returns whether anything changed.
    pub fn mutate<R: Rng>(&mut self, id: GeneId, rng: &mut R) -> bool {
        if !self.is_mutable(id) {
            return false;
        }
        let changed = match self.nodes.get(id.index()).map(|n| n.kind.clone()) {
            None | Some(GeneKind::CycleSentinel) => false,
            Some(GeneKind::Object) => {
                let leaves: Vec<GeneId> = self
                    .mutable_leaves(id)
                    .into_iter()
                    .filter(|&g| g != id)
                    .collect();
                if leaves.is_empty() {
                    false
                } else {
                    let pick = leaves[rng.random_range(0..leaves.len())];
                    self.mutate(pick, rng)
                }
            }
            Some(GeneKind::Array { max_size }) => self.mutate_array(id, max_size, rng),
            Some(kind) => {
                let next = mutate_leaf(kind, rng);
                let node = &mut self.nodes[id.index()];
                let changed = node.kind != next;
                node.kind = next;
                changed
            }
        };
        if changed {
            self.sync_bindings(id);
        }
        changed
    }

    fn mutate_array<R: Rng>(&mut self, id: GeneId, max_size: usize, rng: &mut R) -> bool {
        let size = self.children(id).len();
        let grow = size == 0 || (size < max_size && rng.random_bool(0.5));
        if grow {
            if size == 0 {
                return false;
            }
            let template = self.children(id)[rng.random_range(0..size)];
            if let Some(copy) = self.duplicate_subtree(template, Some(id)) {
                self.nodes[id.index()].children.push(copy);
                self.randomize(copy, rng);
                return true;
            }
            false
        } else if size > 1 {
            self.nodes[id.index()].children.pop();
            true
        } else {
            false
        }
    }

    /// Copies the subtree rooted at `root` inside this arena.
    ///
    /// The copy is attached to `parent` only through its parent handle; the
    /// caller decides where it is listed.
    pub fn duplicate_subtree(&mut self, root: GeneId, parent: Option<GeneId>) -> Option<GeneId> {
        let snapshot = self.clone();
        copy_subtree(&snapshot, root, self, parent)
    }

    /// Drops every node not reachable from `roots`.
    ///
    /// Returns the old-to-new handle mapping for the surviving nodes.
    pub fn compact(&mut self, roots: &[GeneId]) -> BTreeMap<GeneId, GeneId> {
        let mut fresh = GeneArena::new();
        let mut mapping = BTreeMap::new();
        for &root in roots {
            for old in self.descendants(root) {
                let node = &self.nodes[old.index()];
                let parent = node.parent.and_then(|p| mapping.get(&p).copied());
                let new = fresh.push(node.name.clone(), node.kind.clone(), parent, node.mutable);
                if let Some(p) = parent {
                    fresh.nodes[p.index()].children.push(new);
                }
                mapping.insert(old, new);
            }
        }
        for (a, bound) in &self.bindings {
            if let Some(&na) = mapping.get(a) {
                for b in bound {
                    if let Some(&nb) = mapping.get(b) {
                        fresh.bindings.entry(na).or_default().insert(nb);
                    }
                }
            }
        }
        *self = fresh;
        mapping
    }

    /// Structural and value equality of two subtrees, possibly across arenas.
    pub fn subtree_eq(&self, a: GeneId, other: &GeneArena, b: GeneId) -> bool {
        match (self.nodes.get(a.index()), other.nodes.get(b.index())) {
            (Some(x), Some(y)) => {
                x.name == y.name
                    && x.kind == y.kind
                    && x.children.len() == y.children.len()
                    && x
                        .children
                        .iter()
                        .zip(y.children.iter())
                        .all(|(&ca, &cb)| self.subtree_eq(ca, other, cb))
            }
            _ => false,
        }
    }
}

/// Deep-copies the subtree rooted at `root` from one arena into another.
///
/// Bindings internal to the subtree are carried over; bindings pointing
/// outside of it are dropped.
pub fn copy_subtree(
    from: &GeneArena,
    root: GeneId,
    to: &mut GeneArena,
    parent: Option<GeneId>,
) -> Option<GeneId> {
    let order = from.descendants(root);
    if order.is_empty() {
        return None;
    }
    let mut mapping: BTreeMap<GeneId, GeneId> = BTreeMap::new();
    for old in &order {
        let node = &from.nodes[old.index()];
        let new_parent = if *old == root {
            parent
        } else {
            node.parent.and_then(|p| mapping.get(&p).copied())
        };
        let new = to.push(node.name.clone(), node.kind.clone(), new_parent, node.mutable);
        if *old != root {
            if let Some(p) = new_parent {
                to.nodes[p.index()].children.push(new);
            }
        }
        mapping.insert(*old, new);
    }
    for old in &order {
        for bound in from.bound_to(*old) {
            if let (Some(&na), Some(&nb)) = (mapping.get(old), mapping.get(&bound)) {
                to.bindings.entry(na).or_default().insert(nb);
            }
        }
    }
    mapping.get(&root).copied()
}

fn random_text<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| rng.sample(Alphanumeric) as char).collect()
}

/// Bounds in ascending order; reversed bounds are tolerated.
fn ordered(min: i64, max: i64) -> (i64, i64) {
    (min.min(max), min.max(max))
}

fn mutate_leaf<R: Rng>(kind: GeneKind, rng: &mut R) -> GeneKind {
    match kind {
        GeneKind::Boolean(v) => GeneKind::Boolean(!v),
        GeneKind::Integer { value, min, max } => {
            let (lo, hi) = ordered(min, max);
            let next = if rng.random_bool(0.3) {
                rng.random_range(lo..=hi)
            } else {
                let step = rng.random_range(1..=10i64);
                if rng.random_bool(0.5) {
                    value.saturating_add(step)
                } else {
                    value.saturating_sub(step)
                }
            };
            GeneKind::Integer {
                value: next.clamp(lo, hi),
                min,
                max,
            }
        }
        GeneKind::Double { value, min, max } => {
            let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
            let span = (hi - lo).max(f64::EPSILON);
            let delta = rng.random_range(-1.0..1.0) * span * 0.1;
            GeneKind::Double {
                value: (value + delta).clamp(lo, hi),
                min,
                max,
            }
        }
        GeneKind::Text { mut value, max_len } => {
            let roll: f64 = rng.random();
            if (value.is_empty() || roll < 0.3) && value.chars().count() < max_len {
                value.push(rng.sample(Alphanumeric) as char);
            } else if !value.is_empty() && roll < 0.6 {
                value.pop();
            } else if !value.is_empty() {
                let mut chars: Vec<char> = value.chars().collect();
                let i = rng.random_range(0..chars.len());
                chars[i] = rng.sample(Alphanumeric) as char;
                value = chars.into_iter().collect();
            }
            GeneKind::Text { value, max_len }
        }
        GeneKind::Enum { index, size } => {
            let next = if size > 1 {
                let shift = rng.random_range(1..size);
                (index + shift) % size
            } else {
                index
            };
            GeneKind::Enum { index: next, size }
        }
        GeneKind::Optional { active } => GeneKind::Optional { active: !active },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn person(arena: &mut GeneArena) -> GeneId {
        let root = arena.add_root("person", GeneKind::Object);
        arena
            .add_child(root, "age", GeneKind::Integer { value: 30, min: 0, max: 120 })
            .unwrap();
        arena
            .add_child(root, "name", GeneKind::Text { value: "ann".into(), max_len: 8 })
            .unwrap();
        let friend = arena
            .add_child(root, "friend", GeneKind::Optional { active: false })
            .unwrap();
        arena.add_child(friend, "person", GeneKind::CycleSentinel).unwrap();
        root
    }

    #[test]
    fn test_parent_lookup_is_a_read() {
        let mut arena = GeneArena::new();
        let root = person(&mut arena);
        let age = arena.children(root)[0];
        assert_eq!(arena.parent(age), Some(root));
        assert_eq!(arena.parent(root), None);
        assert_eq!(arena.parent(GeneId(999)), None);
    }

    #[test]
    fn test_leaf_cannot_own_children() {
        let mut arena = GeneArena::new();
        let b = arena.add_root("flag", GeneKind::Boolean(true));
        assert!(arena.add_child(b, "x", GeneKind::Boolean(false)).is_none());
        let s = arena.add_root("cycle", GeneKind::CycleSentinel);
        assert!(arena.add_child(s, "x", GeneKind::Boolean(false)).is_none());
    }

    #[test]
    fn test_optional_holds_single_child() {
        let mut arena = GeneArena::new();
        let opt = arena.add_root("opt", GeneKind::Optional { active: true });
        assert!(arena.add_child(opt, "a", GeneKind::Boolean(true)).is_some());
        assert!(arena.add_child(opt, "b", GeneKind::Boolean(true)).is_none());
    }

    #[test]
    fn test_cycle_sentinel_is_never_mutated() {
        let mut arena = GeneArena::new();
        let s = arena.add_root("cycle", GeneKind::CycleSentinel);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(!arena.mutate(s, &mut rng));
        arena.randomize(s, &mut rng);
        assert_eq!(arena.kind(s), Some(&GeneKind::CycleSentinel));
    }

    #[test]
    fn test_immutable_subtree_is_skipped() {
        let mut arena = GeneArena::new();
        let root = person(&mut arena);
        arena.set_immutable(root);
        let age = arena.children(root)[0];
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            arena.randomize(root, &mut rng);
            assert!(!arena.mutate(age, &mut rng));
        }
        assert_eq!(arena.as_i64(age), Some(30));
        assert!(!arena.set_value(age, GeneKind::Integer { value: 1, min: 0, max: 120 }));
    }

    #[test]
    fn test_deep_copy_across_arenas() {
        let mut a = GeneArena::new();
        let root = person(&mut a);
        let mut b = GeneArena::new();
        let copy = copy_subtree(&a, root, &mut b, None).unwrap();
        assert!(a.subtree_eq(root, &b, copy));

        let age_copy = b.children(copy)[0];
        assert!(b.set_value(age_copy, GeneKind::Integer { value: 99, min: 0, max: 120 }));
        assert!(!a.subtree_eq(root, &b, copy));
        assert_eq!(a.as_i64(a.children(root)[0]), Some(30));
    }

    #[test]
    fn test_binding_propagates_values() {
        let mut arena = GeneArena::new();
        let x = arena.add_root("x", GeneKind::Integer { value: 1, min: 0, max: 100 });
        let y = arena.add_root("y", GeneKind::Integer { value: 2, min: 0, max: 100 });
        let flag = arena.add_root("flag", GeneKind::Boolean(false));
        arena.bind(x, y);
        arena.bind(x, flag);
        arena.set_value(x, GeneKind::Integer { value: 42, min: 0, max: 100 });
        arena.sync_bindings(x);
        assert_eq!(arena.as_i64(y), Some(42));
        assert_eq!(arena.as_bool(flag), Some(false));
    }

    #[test]
    fn test_integer_mutation_respects_bounds() {
        let mut arena = GeneArena::new();
        let g = arena.add_root("g", GeneKind::Integer { value: 0, min: -5, max: 5 });
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            arena.mutate(g, &mut rng);
            let v = arena.as_i64(g).unwrap();
            assert!((-5..=5).contains(&v));
        }
    }

    #[test]
    fn test_reversed_bounds_do_not_panic() {
        let mut arena = GeneArena::new();
        let root = arena.add_root("r", GeneKind::Object);
        let i = arena
            .add_child(root, "i", GeneKind::Integer { value: 0, min: 5, max: -5 })
            .unwrap();
        let d = arena
            .add_child(root, "d", GeneKind::Double { value: 0.0, min: 1.0, max: -1.0 })
            .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            arena.randomize(root, &mut rng);
            arena.mutate(i, &mut rng);
            arena.mutate(d, &mut rng);
            let v = arena.as_i64(i).unwrap();
            assert!((-5..=5).contains(&v));
        }
    }

    #[test]
    fn test_array_grows_and_shrinks() {
        let mut arena = GeneArena::new();
        let arr = arena.add_root("items", GeneKind::Array { max_size: 4 });
        arena.add_child(arr, "item", GeneKind::Boolean(true)).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let mut sizes = BTreeSet::new();
        for _ in 0..100 {
            arena.mutate(arr, &mut rng);
            let n = arena.children(arr).len();
            assert!((1..=4).contains(&n));
            sizes.insert(n);
        }
        assert!(sizes.len() > 1);
    }

    #[test]
    fn test_compact_drops_unreachable_nodes() {
        let mut arena = GeneArena::new();
        let keep = person(&mut arena);
        let _drop = arena.add_root("garbage", GeneKind::Boolean(true));
        let before = arena.clone();
        let mapping = arena.compact(&[keep]);
        assert_eq!(arena.len(), before.descendants(keep).len());
        assert!(before.subtree_eq(keep, &arena, mapping[&keep]));
    }
}
