//! Chemical Reaction Optimization (CRO).
//!
//! Molecules (a payload, its kinetic energy and a collision counter) react
//! under one conserved quantity: potential plus kinetic energy of every
//! molecule plus a shared container buffer.
//!
//! # Reactions
//!
//! - **On-wall ineffective collision**: one molecule is mutated in place
//! - **Decomposition**: one molecule splits into two mutated offspring
//! - **Inter-molecular ineffective collision**: two molecules are mutated
//! - **Synthesis**: two molecules fuse into the fitter crossover offspring
//!
//! # References
//!
//! - Lam & Li (2010), "Chemical-Reaction-Inspired Metaheuristic for
//!   Optimization", IEEE Transactions on Evolutionary Computation 14(3)

mod config;
mod reactor;
mod types;

pub use config::CroConfig;
pub use reactor::{CroReactor, Reaction};
pub use types::{EnergyContext, Molecule, ReactionOps};

/// Tolerance of the energy-conservation check.
pub const ENERGY_TOLERANCE: f64 = 1e-9;
