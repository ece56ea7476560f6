//! Search algorithms.
//!
//! One [`SearchEngine`] runs every algorithm. Users describe their system
//! under test by implementing [`SearchProblem`] (sampling, evaluation and
//! variation of individuals) and pick an [`Algorithm`] in [`SearchConfig`].
//!
//! # Algorithms
//!
//! - **GA family**: standard, breeder, monotonic, steady-state and cellular
//! - **Evolution strategies**: (μ+λ), (μ,λ) and the 1+(λ,λ) GA
//! - **Baselines**: random walk and random search
//! - **Many-objective**: MIO, MOSA, DynaMOSA and LIPS, all backed by the
//!   shared [`Archive`](crate::archive::Archive)
//! - **CRO**: chemical reaction optimization on top of [`crate::cro`]
//!
//! # Key Types
//!
//! - [`SearchConfig`]: algorithm choice, operator rates and budget
//! - [`SearchEngine`]: step-wise execution (`setup`, `search_once`, `search`)
//! - [`SearchRunner`]: one-call execution with optional cancellation
//! - [`SearchResult`]: solution, best individual and statistics
//!
//! # Submodules
//!
//! - [`neighborhood`]: toroidal neighbourhoods of the cellular GA
//! - [`pareto`]: non-dominated sorting and MOSA preference sorting
//! - [`adaptive`]: budget-driven schedules of MIO parameters
//!
//! # References
//!
//! - Arcuri (2018), "Test suite generation with the Many Independent
//!   Objective (MIO) algorithm", Information and Software Technology 104
//! - Panichella, Kifetew & Tonella (2018), "Automated Test Case Generation
//!   as a Many-Objective Optimisation Problem with Dynamic Selection of the
//!   Targets", IEEE TSE 44(2)
//! - Scalabrino et al. (2016), "Search-Based Testing of Procedural Programs:
//!   Iterative Single-Target or Multi-Target Approach?", SSBSE
//! - Alba & Dorronsoro (2008), *Cellular Genetic Algorithms*
//! - Doerr, Doerr & Ebel (2015), "From black-box complexity to designing new
//!   genetic algorithms", Theoretical Computer Science 567

pub mod adaptive;
mod baseline;
mod config;
pub mod engine;
mod es;
mod ga;
mod many_objective;
pub mod neighborhood;
pub mod pareto;
mod reaction;
mod selection;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{Algorithm, SearchConfig};
pub use engine::{Population, RankedIndividual, SearchEngine, SearchResult, SearchRunner};
pub use neighborhood::{grid_shape, Neighborhood, NeighborhoodTopology};
pub use reaction::ReactorState;
pub use selection::{FixedSelection, Selection, SelectionStrategy};
pub use types::{SearchObserver, SearchProblem, SearchRecorder};
