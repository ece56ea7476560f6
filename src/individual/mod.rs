//! Candidate solutions: genes, actions and test cases.
//!
//! # Components
//!
//! - [`GeneArena`]: arena of gene trees addressed by [`GeneId`] handles
//! - [`Action`]: one executable step owning root genes
//! - [`TestCase`]: the concrete individual, a grouped action sequence
//! - [`mutation`]: default variation operators on test cases
//! - [`MutationHistory`]: per-gene impact counters for weighted mutation

mod action;
mod gene;
mod impact;
pub mod mutation;
mod test_case;

pub use action::{Action, ActionId};
pub use gene::{copy_subtree, GeneArena, GeneId, GeneKind};
pub use impact::{weighted_gene_selection, ImpactCounter, MutationHistory};
pub use test_case::{ActionFilter, ActionGroup, GeneFilter, GroupKind, SampleType, TestCase};

use std::fmt::Debug;

/// What the search engine needs from a candidate solution.
///
/// Cloning must produce an independent deep copy.
pub trait Individual: Clone + Debug {
    /// Secondary minimization metric used to break fitness ties.
    fn size(&self) -> usize;
}

impl Individual for TestCase {
    fn size(&self) -> usize {
        TestCase::size(self)
    }
}
