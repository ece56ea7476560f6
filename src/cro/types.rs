//! Molecules and the operations a reactor needs on their payloads.

/// A candidate solution together with its kinetic energy and the number of
/// collisions since it was created by a decomposition or synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule<S> {
    pub payload: S,
    pub kinetic_energy: f64,
    pub num_collisions: u32,
}

impl<S> Molecule<S> {
    pub fn new(payload: S, kinetic_energy: f64) -> Self {
        Self {
            payload,
            kinetic_energy,
            num_collisions: 0,
        }
    }
}

/// Shared energy buffer of a reactor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnergyContext {
    pub container: f64,
}

/// Domain operations used by the reactions.
///
/// The potential of a payload must be stable across calls: the reactor
/// assumes `potential(x)` returns the same value before and after a
/// reaction that did not replace `x`.
pub trait ReactionOps<S> {
    /// Potential energy of a payload; lower is fitter.
    fn potential(&mut self, payload: &S) -> f64;

    /// Returns a mutated copy of a payload.
    fn mutate(&mut self, payload: &S) -> S;

    /// Recombines copies of two payloads into two offspring.
    fn crossover(&mut self, first: &S, second: &S) -> (S, S);
}
