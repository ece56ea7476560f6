//! Chemical reaction optimization on evaluated individuals.
//!
//! Molecules carry evaluated individuals; the potential of a molecule is the
//! negated fitness score, so fitter individuals sit lower. Every payload a
//! reaction creates is evaluated right away, which keeps the potential a
//! pure function of the payload.

use super::engine::{Population, SearchEngine};
use super::selection::SelectionStrategy;
use super::types::SearchProblem;
use crate::cro::{CroReactor, EnergyContext, Molecule, ReactionOps, ENERGY_TOLERANCE};
use crate::fitness::EvaluatedIndividual;
use crate::individual::Individual;
use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Reactor, molecules and energy bookkeeping of a CRO run.
#[derive(Debug, Clone)]
pub struct ReactorState<I> {
    pub molecules: Vec<Molecule<EvaluatedIndividual<I>>>,
    pub energy: EnergyContext,
    /// Total energy right after initialization.
    pub initial_energy: f64,
    reactor: CroReactor<StdRng>,
}

impl<I: Individual> ReactorState<I> {
    /// Current total energy of molecules and container.
    pub fn total_energy(&self) -> f64 {
        self.molecules
            .iter()
            .fold(self.energy.container, |acc, m| acc + potential(&m.payload) + m.kinetic_energy)
    }

    /// Current total minus the total right after initialization.
    pub fn drift(&self) -> f64 {
        self.total_energy() - self.initial_energy
    }
}

fn potential<I: Individual>(payload: &EvaluatedIndividual<I>) -> f64 {
    -payload.score()
}

/// Lets the reactor mutate and recombine through the engine.
struct EngineOps<'e, 'a, P: SearchProblem, S: SelectionStrategy> {
    engine: &'e mut SearchEngine<'a, P, S>,
}

impl<P: SearchProblem, S: SelectionStrategy> ReactionOps<EvaluatedIndividual<P::Individual>>
    for EngineOps<'_, '_, P, S>
{
    fn potential(&mut self, payload: &EvaluatedIndividual<P::Individual>) -> f64 {
        potential(payload)
    }

    fn mutate(&mut self, payload: &EvaluatedIndividual<P::Individual>) -> EvaluatedIndividual<P::Individual> {
        let mut individual = payload.individual().clone();
        self.engine.mutate(&mut individual);
        self.engine.evaluate_or(individual, payload)
    }

    fn crossover(
        &mut self,
        first: &EvaluatedIndividual<P::Individual>,
        second: &EvaluatedIndividual<P::Individual>,
    ) -> (EvaluatedIndividual<P::Individual>, EvaluatedIndividual<P::Individual>) {
        let mut a = first.individual().clone();
        let mut b = second.individual().clone();
        if self.engine.rng.random_bool(self.engine.config.crossover_probability) {
            self.engine.crossover(&mut a, &mut b);
        } else {
            // synthesis without recombination fuses two mutants
            self.engine.mutate(&mut a);
            self.engine.mutate(&mut b);
        }
        let a = self.engine.evaluate_or(a, first);
        let b = self.engine.evaluate_or(b, second);
        (a, b)
    }
}

impl<P: SearchProblem, S: SelectionStrategy> SearchEngine<'_, P, S> {
    /// Turns a freshly sampled population into molecules.
    pub(super) fn init_reactor(&mut self) -> Population<P::Individual> {
        let initial = self.sample_population(self.config.population_size);
        let ke = self.config.cro.initial_kinetic_energy;
        let reactor = CroReactor::new(self.config.cro.clone(), StdRng::seed_from_u64(self.rng.random()));
        let mut state = ReactorState {
            molecules: initial.into_iter().map(|e| Molecule::new(e, ke)).collect(),
            energy: EnergyContext::default(),
            initial_energy: 0.0,
            reactor,
        };
        state.initial_energy = state.total_energy();
        Population::Reactor(Box::new(state))
    }

    /// One reaction. Energy drift beyond tolerance is logged, never
    /// corrected.
    pub(super) fn cro_step(&mut self) {
        let mut state = match std::mem::replace(&mut self.population, Population::Archive) {
            Population::Reactor(state) if !state.molecules.is_empty() => state,
            _ => {
                self.population = self.init_reactor();
                return;
            }
        };

        {
            let ReactorState {
                molecules,
                energy,
                reactor,
                ..
            } = &mut *state;
            let mut ops = EngineOps { engine: self };
            reactor.react(molecules, energy, &mut ops);
        }

        let drift = state.drift();
        if drift.abs() > ENERGY_TOLERANCE {
            warn!("cro energy not conserved: total drifted by {drift:e}");
        }
        self.population = Population::Reactor(state);
    }
}

#[cfg(test)]
mod tests {
    use crate::cro::CroConfig;
    use crate::search::engine::{Population, SearchEngine};
    use crate::search::test_support::{init_logger, OneMax};
    use crate::search::{Algorithm, SearchConfig, SearchRecorder, SearchRunner};
    use std::rc::Rc;

    fn cro_config() -> SearchConfig {
        SearchConfig::default()
            .with_algorithm(Algorithm::Cro)
            .with_population_size(6)
            .with_max_action_evaluations(800)
            .with_seed(21)
            .with_cro(
                CroConfig::default()
                    .with_initial_kinetic_energy(2.0)
                    .with_decomposition_threshold(5)
                    .with_synthesis_threshold(0.5),
            )
    }

    #[test]
    fn test_reactor_starts_from_population() {
        let mut problem = OneMax::new(10);
        let mut engine = SearchEngine::new(&mut problem, cro_config()).unwrap();
        engine.setup();
        match engine.population() {
            Population::Reactor(state) => {
                assert_eq!(state.molecules.len(), 6);
                assert!(state.molecules.iter().all(|m| m.kinetic_energy == 2.0));
                assert_eq!(state.energy.container, 0.0);
                assert!((state.total_energy() - state.initial_energy).abs() < 1e-12);
            }
            other => panic!("expected a reactor, got {other:?}"),
        }
    }

    #[test]
    fn test_energy_is_conserved_across_steps() {
        init_logger();
        let mut problem = OneMax::new(10);
        let mut engine = SearchEngine::new(&mut problem, cro_config()).unwrap();
        engine.setup();
        for _ in 0..200 {
            engine.search_once();
            if let Population::Reactor(state) = engine.population() {
                assert!(state.drift().abs() < 1e-6, "drift {}", state.drift());
                assert!(state.energy.container >= 0.0);
                assert!(state.molecules.iter().all(|m| m.kinetic_energy >= 0.0));
                assert!(!state.molecules.is_empty());
            } else {
                panic!("reactor population expected");
            }
        }
    }

    #[test]
    fn test_cro_mutates_through_engine() {
        let mut problem = OneMax::new(10);
        let recorder = SearchRecorder::shared();
        let mut engine = SearchEngine::new(&mut problem, cro_config()).unwrap();
        engine.add_observer(Rc::clone(&recorder));
        engine.search(None);
        assert!(recorder.borrow().mutations > 0);
    }

    #[test]
    fn test_drift_reports_raw_total() {
        let mut problem = OneMax::new(10);
        let mut engine = SearchEngine::new(&mut problem, cro_config()).unwrap();
        engine.setup();
        let Population::Reactor(state) = engine.population() else {
            panic!("reactor population expected");
        };
        let mut state = state.clone();
        assert_eq!(state.drift(), 0.0);
        state.energy.container += 0.25;
        assert!((state.drift() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_synthesis_respects_zero_crossover_probability() {
        let mut problem = OneMax::new(10);
        let recorder = SearchRecorder::shared();
        let config = cro_config().with_crossover_probability(0.0).with_cro(
            CroConfig::default()
                .with_molecular_collision_rate(1.0)
                .with_synthesis_threshold(1e9),
        );
        let mut engine = SearchEngine::new(&mut problem, config).unwrap();
        engine.add_observer(Rc::clone(&recorder));
        engine.search(None);
        assert_eq!(recorder.borrow().crossovers, 0);
        assert!(recorder.borrow().mutations > 0);
    }

    #[test]
    fn test_cro_solves_onemax() {
        let mut problem = OneMax::new(10);
        let config = cro_config().with_max_action_evaluations(10_000).with_cro(
            CroConfig::default()
                .with_initial_kinetic_energy(0.2)
                .with_decomposition_threshold(50)
                .with_synthesis_threshold(0.05),
        );
        let result = SearchRunner::run(&mut problem, &config).unwrap();
        assert_eq!(result.best.as_ref().unwrap().score(), 1.0);
        assert_eq!(result.solution.individuals.len(), 1);
    }
}
