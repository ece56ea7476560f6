//! The four CRO reactions and the step that dispatches between them.
//!
//! Every accepted reaction conserves the total energy of the system, i.e.
//! the sum of potential and kinetic energies of all molecules plus the
//! container. A rejected reaction only bumps collision counters where
//! stated and otherwise leaves everything untouched.

use super::config::CroConfig;
use super::types::{EnergyContext, Molecule, ReactionOps};
use log::debug;
use rand::Rng;

/// Kind and outcome of one reactor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Decomposition { accepted: bool },
    OnWallIneffective { accepted: bool },
    Synthesis { accepted: bool },
    IntermolecularIneffective { accepted: bool },
    /// No molecule to react.
    Idle,
}

impl Reaction {
    pub fn accepted(&self) -> bool {
        match *self {
            Reaction::Decomposition { accepted }
            | Reaction::OnWallIneffective { accepted }
            | Reaction::Synthesis { accepted }
            | Reaction::IntermolecularIneffective { accepted } => accepted,
            Reaction::Idle => false,
        }
    }
}

/// Chemical reaction optimization reactor.
#[derive(Debug, Clone)]
pub struct CroReactor<R: Rng> {
    config: CroConfig,
    rng: R,
}

impl<R: Rng> CroReactor<R> {
    pub fn new(config: CroConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &CroConfig {
        &self.config
    }

    /// `(potential + kinetic) before - potential after`.
    pub fn compute_energy_surplus(before_potential: f64, before_kinetic: f64, after_potential: f64) -> f64 {
        (before_potential + before_kinetic) - after_potential
    }

    pub fn decomposition_check<S>(&self, molecule: &Molecule<S>) -> bool {
        molecule.num_collisions > self.config.decomposition_threshold
    }

    pub fn synthesis_check<S>(&self, molecule: &Molecule<S>) -> bool {
        molecule.kinetic_energy <= self.config.synthesis_threshold
    }

    /// Sum of every potential and kinetic energy plus the container.
    pub fn total_energy<S, O: ReactionOps<S>>(molecules: &[Molecule<S>], container: f64, ops: &mut O) -> f64 {
        molecules
            .iter()
            .fold(container, |acc, m| acc + ops.potential(&m.payload) + m.kinetic_energy)
    }

    /// Borrows a random share of the container to cover a deficit.
    ///
    /// Returns the surplus left after covering, or `None` (container
    /// untouched) when the share is not enough.
    fn borrow_from_container(&mut self, deficit: f64, energy: &mut EnergyContext) -> Option<f64> {
        let a: f64 = self.rng.random();
        let b: f64 = self.rng.random();
        let borrowable = a * b * energy.container;
        if deficit + borrowable >= 0.0 {
            energy.container *= 1.0 - a * b;
            Some(deficit + borrowable)
        } else {
            None
        }
    }

    /// Mutates a copy of the molecule; accepted when the surplus is
    /// non-negative. Part of the surplus leaks to the container.
    pub fn on_wall_ineffective_collision<S, O: ReactionOps<S>>(
        &mut self,
        molecule: &Molecule<S>,
        energy: &mut EnergyContext,
        ops: &mut O,
    ) -> Option<Molecule<S>> {
        let old_potential = ops.potential(&molecule.payload);
        let payload = ops.mutate(&molecule.payload);
        let new_potential = ops.potential(&payload);
        let net = Self::compute_energy_surplus(old_potential, molecule.kinetic_energy, new_potential);
        if net < 0.0 {
            return None;
        }
        let low = self.config.kinetic_energy_loss_rate;
        let retained = if low < 1.0 { self.rng.random_range(low..1.0) } else { 1.0 };
        energy.container += net * (1.0 - retained);
        Some(Molecule {
            payload,
            kinetic_energy: net * retained,
            num_collisions: molecule.num_collisions + 1,
        })
    }

    /// Splits a molecule into two mutated offspring.
    ///
    /// A deficit may be covered by borrowing from the container. On
    /// rejection the parent's collision count is incremented.
    pub fn decomposition<S, O: ReactionOps<S>>(
        &mut self,
        parent: &mut Molecule<S>,
        energy: &mut EnergyContext,
        ops: &mut O,
    ) -> Option<(Molecule<S>, Molecule<S>)> {
        let parent_potential = ops.potential(&parent.payload);
        let first = ops.mutate(&parent.payload);
        let second = ops.mutate(&parent.payload);
        let after = ops.potential(&first) + ops.potential(&second);

        let mut net = Self::compute_energy_surplus(parent_potential, parent.kinetic_energy, after);
        if net < 0.0 {
            match self.borrow_from_container(net, energy) {
                Some(covered) => net = covered,
                None => {
                    parent.num_collisions += 1;
                    return None;
                }
            }
        }
        let split: f64 = self.rng.random();
        Some((
            Molecule::new(first, net * split),
            Molecule::new(second, net * (1.0 - split)),
        ))
    }

    /// Fuses two molecules into the fitter of their crossover offspring.
    ///
    /// On rejection both parents' collision counts are incremented.
    pub fn synthesis<S, O: ReactionOps<S>>(
        &mut self,
        first: &mut Molecule<S>,
        second: &mut Molecule<S>,
        ops: &mut O,
    ) -> Option<Molecule<S>> {
        let before_potential = ops.potential(&first.payload) + ops.potential(&second.payload);
        let before_kinetic = first.kinetic_energy + second.kinetic_energy;
        let (a, b) = ops.crossover(&first.payload, &second.payload);
        let (pa, pb) = (ops.potential(&a), ops.potential(&b));
        let (fused, fused_potential) = if pa <= pb { (a, pa) } else { (b, pb) };

        let net = Self::compute_energy_surplus(before_potential, before_kinetic, fused_potential);
        if net >= 0.0 {
            Some(Molecule::new(fused, net))
        } else {
            first.num_collisions += 1;
            second.num_collisions += 1;
            None
        }
    }

    /// Mutates copies of two molecules and redistributes their energy.
    pub fn intermolecular_ineffective_collision<S, O: ReactionOps<S>>(
        &mut self,
        first: &Molecule<S>,
        second: &Molecule<S>,
        ops: &mut O,
    ) -> Option<(Molecule<S>, Molecule<S>)> {
        let before_potential = ops.potential(&first.payload) + ops.potential(&second.payload);
        let before_kinetic = first.kinetic_energy + second.kinetic_energy;
        let new_first = ops.mutate(&first.payload);
        let new_second = ops.mutate(&second.payload);
        let after = ops.potential(&new_first) + ops.potential(&new_second);

        let net = Self::compute_energy_surplus(before_potential, before_kinetic, after);
        if net < 0.0 {
            return None;
        }
        let split: f64 = self.rng.random();
        Some((
            Molecule {
                payload: new_first,
                kinetic_energy: net * split,
                num_collisions: first.num_collisions + 1,
            },
            Molecule {
                payload: new_second,
                kinetic_energy: net * (1.0 - split),
                num_collisions: second.num_collisions + 1,
            },
        ))
    }

    /// Runs one reaction on the population.
    ///
    /// Uni-molecular reactions happen when a uniform draw exceeds the
    /// molecular collision rate or when a single molecule is left.
    pub fn react<S, O: ReactionOps<S>>(
        &mut self,
        molecules: &mut Vec<Molecule<S>>,
        energy: &mut EnergyContext,
        ops: &mut O,
    ) -> Reaction {
        let n = molecules.len();
        if n == 0 {
            return Reaction::Idle;
        }
        let draw: f64 = self.rng.random();
        let reaction = if draw > self.config.molecular_collision_rate || n == 1 {
            let i = self.rng.random_range(0..n);
            if self.decomposition_check(&molecules[i]) {
                match self.decomposition(&mut molecules[i], energy, ops) {
                    Some((a, b)) => {
                        molecules.remove(i);
                        molecules.push(a);
                        molecules.push(b);
                        Reaction::Decomposition { accepted: true }
                    }
                    None => Reaction::Decomposition { accepted: false },
                }
            } else {
                match self.on_wall_ineffective_collision(&molecules[i], energy, ops) {
                    Some(m) => {
                        molecules[i] = m;
                        Reaction::OnWallIneffective { accepted: true }
                    }
                    None => Reaction::OnWallIneffective { accepted: false },
                }
            }
        } else {
            let i = self.rng.random_range(0..n);
            let mut j = self.rng.random_range(0..n - 1);
            if j >= i {
                j += 1;
            }
            let (low, high) = (i.min(j), i.max(j));
            if self.synthesis_check(&molecules[i]) && self.synthesis_check(&molecules[j]) {
                let (head, tail) = molecules.split_at_mut(high);
                match self.synthesis(&mut head[low], &mut tail[0], ops) {
                    Some(fused) => {
                        molecules[low] = fused;
                        molecules.remove(high);
                        Reaction::Synthesis { accepted: true }
                    }
                    None => Reaction::Synthesis { accepted: false },
                }
            } else {
                match self.intermolecular_ineffective_collision(&molecules[i], &molecules[j], ops) {
                    Some((a, b)) => {
                        molecules[i] = a;
                        molecules[j] = b;
                        Reaction::IntermolecularIneffective { accepted: true }
                    }
                    None => Reaction::IntermolecularIneffective { accepted: false },
                }
            }
        };
        debug!("cro reaction {reaction:?}, {} molecules", molecules.len());
        reaction
    }
}
