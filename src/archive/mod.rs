//! Many-objective archive.
//!
//! The [`Archive`] keeps, for every reached target, a small list of the best
//! evaluated individuals and feeds archive-driven algorithms (MIO, DynaMOSA,
//! LIPS) with individuals to mutate. Sampling is feedback directed: targets
//! that have not improved for a while are sampled less.
//!
//! It also tracks the budget spent on the target LIPS is focused on.

mod budget;
mod store;

pub use store::{Archive, ArchiveUpdate, FeedbackDirectedSampling};
