//! Executable steps of an individual.

use super::gene::GeneId;

/// Local identifier of an action, unique inside one individual.
///
/// Execution results refer back to their action through this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionId(pub u32);

/// One executable step owning a list of root genes.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub(crate) local_id: ActionId,
    pub(crate) name: String,
    pub(crate) genes: Vec<GeneId>,
}

impl Action {
    pub fn local_id(&self) -> ActionId {
        self.local_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root genes of the action, in declaration order.
    pub fn genes(&self) -> &[GeneId] {
        &self.genes
    }
}
