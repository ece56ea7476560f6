//! Search configuration.
//!
//! [`SearchConfig`] holds every parameter the engine reads. It is plain
//! data: a surrounding driver builds it (or deserializes it with the `serde`
//! feature) and the engine validates it before the first evaluation.

use super::neighborhood::NeighborhoodTopology;
use crate::archive::FeedbackDirectedSampling;
use crate::cro::CroConfig;
use crate::error::{Result, SearchError};
use crate::time::StoppingCriterion;

/// The search strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    StandardGa,
    BreederGa,
    MonotonicGa,
    SteadyStateGa,
    CellularGa,
    MuPlusLambda,
    MuCommaLambda,
    OnePlusLambdaLambda,
    /// Mutates every step; `mutation_probability` is not consulted.
    RandomWalk,
    RandomSearch,
    #[default]
    Mio,
    Mosa,
    DynaMosa,
    Lips,
    Cro,
}

impl Algorithm {
    /// Generational algorithms that keep elites.
    pub fn uses_elites(self) -> bool {
        matches!(
            self,
            Algorithm::StandardGa | Algorithm::BreederGa | Algorithm::MonotonicGa
        )
    }

    /// Algorithms whose population is the archive itself.
    pub fn is_archive_driven(self) -> bool {
        matches!(self, Algorithm::Mio | Algorithm::DynaMosa | Algorithm::Lips)
    }
}

/// Configuration of a search run.
///
/// # Defaults
///
/// ```
/// use u_sbst::search::{Algorithm, SearchConfig};
///
/// let config = SearchConfig::default();
/// assert_eq!(config.algorithm, Algorithm::Mio);
/// assert_eq!(config.population_size, 30);
/// assert!(config.validate().is_ok());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_sbst::search::{Algorithm, SearchConfig};
///
/// let config = SearchConfig::default()
///     .with_algorithm(Algorithm::StandardGa)
///     .with_population_size(50)
///     .with_crossover_probability(0.8)
///     .with_max_action_evaluations(10_000)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    pub algorithm: Algorithm,

    /// Individuals kept by population-based algorithms (μ for the ES family).
    pub population_size: usize,

    /// Best individuals copied unchanged into the next generation.
    pub elites_count: usize,

    /// Contestants per tournament.
    pub tournament_size: usize,

    /// Probability of recombining a selected pair (0.0–1.0).
    pub crossover_probability: f64,

    /// Probability of mutating each bred offspring (0.0–1.0).
    ///
    /// Archive-driven algorithms and the random walk mutate every sampled
    /// individual, as mutation is their only variation operator.
    pub mutation_probability: f64,

    /// Chance that a mutation changes the structure instead of the genes,
    /// when the structure may be changed (0.0–1.0).
    pub structure_mutation_probability: f64,

    /// Fraction of the population parents are drawn from in the breeder GA.
    pub breeder_truncation: f64,

    /// λ of the (μ+λ) and (μ,λ) strategies.
    pub mu_lambda_offspring: usize,

    /// λ of the 1+(λ,λ) GA.
    pub one_plus_lambda_lambda_offspring: usize,

    /// Neighbourhood of the cellular GA.
    pub topology: NeighborhoodTopology,

    /// Per-target archive capacity at the start of the search.
    pub archive_target_limit: usize,

    /// Probability of sampling a fresh individual at the start of the search.
    pub prob_random_sampling: f64,

    /// Mutations applied per archive sample once the focused phase starts.
    pub max_mutations: usize,

    /// Fraction of the budget after which the search is fully focused.
    pub focused_search_activation_time: f64,

    pub feedback_sampling: FeedbackDirectedSampling,

    pub stopping_criterion: StoppingCriterion,

    /// Budget when stopping on action evaluations.
    pub max_action_evaluations: u64,

    /// Budget when stopping on time.
    pub max_time_seconds: u64,

    /// Random seed for reproducibility; `None` uses a random seed.
    pub seed: Option<u64>,

    pub cro: CroConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            population_size: 30,
            elites_count: 1,
            tournament_size: 10,
            crossover_probability: 0.7,
            mutation_probability: 1.0,
            structure_mutation_probability: 0.5,
            breeder_truncation: 0.5,
            mu_lambda_offspring: 60,
            one_plus_lambda_lambda_offspring: 4,
            topology: NeighborhoodTopology::default(),
            archive_target_limit: 10,
            prob_random_sampling: 0.5,
            max_mutations: 10,
            focused_search_activation_time: 0.8,
            feedback_sampling: FeedbackDirectedSampling::default(),
            stopping_criterion: StoppingCriterion::default(),
            max_action_evaluations: 1000,
            max_time_seconds: 60,
            seed: None,
            cro: CroConfig::default(),
        }
    }
}

impl SearchConfig {
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_elites_count(mut self, n: usize) -> Self {
        self.elites_count = n;
        self
    }

    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    pub fn with_crossover_probability(mut self, p: f64) -> Self {
        self.crossover_probability = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_mutation_probability(mut self, p: f64) -> Self {
        self.mutation_probability = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_structure_mutation_probability(mut self, p: f64) -> Self {
        self.structure_mutation_probability = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_breeder_truncation(mut self, fraction: f64) -> Self {
        self.breeder_truncation = fraction.clamp(0.0, 1.0);
        self
    }

    pub fn with_mu_lambda_offspring(mut self, lambda: usize) -> Self {
        self.mu_lambda_offspring = lambda;
        self
    }

    pub fn with_one_plus_lambda_lambda_offspring(mut self, lambda: usize) -> Self {
        self.one_plus_lambda_lambda_offspring = lambda;
        self
    }

    pub fn with_topology(mut self, topology: NeighborhoodTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_archive_target_limit(mut self, limit: usize) -> Self {
        self.archive_target_limit = limit;
        self
    }

    pub fn with_prob_random_sampling(mut self, p: f64) -> Self {
        self.prob_random_sampling = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_mutations(mut self, n: usize) -> Self {
        self.max_mutations = n;
        self
    }

    pub fn with_focused_search_activation_time(mut self, fraction: f64) -> Self {
        self.focused_search_activation_time = fraction.clamp(0.0, 1.0);
        self
    }

    pub fn with_feedback_sampling(mut self, sampling: FeedbackDirectedSampling) -> Self {
        self.feedback_sampling = sampling;
        self
    }

    /// Stops after `n` executed actions.
    pub fn with_max_action_evaluations(mut self, n: u64) -> Self {
        self.stopping_criterion = StoppingCriterion::ActionEvaluations;
        self.max_action_evaluations = n;
        self
    }

    /// Stops after `seconds` of wall-clock time.
    pub fn with_max_time_seconds(mut self, seconds: u64) -> Self {
        self.stopping_criterion = StoppingCriterion::Time;
        self.max_time_seconds = seconds;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_cro(mut self, cro: CroConfig) -> Self {
        self.cro = cro;
        self
    }

    /// Validates the configuration.
    ///
    /// Every check runs before any evaluation, so a bad value never fails a
    /// search half-way.
    pub fn validate(&self) -> Result<()> {
        let probabilities = [
            ("crossover_probability", self.crossover_probability),
            ("mutation_probability", self.mutation_probability),
            ("structure_mutation_probability", self.structure_mutation_probability),
            ("breeder_truncation", self.breeder_truncation),
            ("prob_random_sampling", self.prob_random_sampling),
            ("focused_search_activation_time", self.focused_search_activation_time),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(SearchError::config(format!("{name} must be in [0, 1], got {p}")));
            }
        }
        if self.population_size == 0 {
            return Err(SearchError::config("population_size must be at least 1"));
        }
        if self.tournament_size == 0 {
            return Err(SearchError::config("tournament_size must be at least 1"));
        }
        if self.algorithm.uses_elites() && self.elites_count >= self.population_size {
            return Err(SearchError::config(format!(
                "elites_count ({}) must be smaller than population_size ({})",
                self.elites_count, self.population_size
            )));
        }
        if self.algorithm == Algorithm::MonotonicGa && self.population_size < 2 {
            return Err(SearchError::config(
                "monotonic GA keeps at least one elite and needs population_size >= 2",
            ));
        }
        if self.algorithm == Algorithm::BreederGa && self.breeder_truncation <= 0.0 {
            return Err(SearchError::config("breeder_truncation must be positive"));
        }
        if matches!(self.algorithm, Algorithm::MuPlusLambda | Algorithm::MuCommaLambda)
            && self.mu_lambda_offspring < self.population_size
        {
            return Err(SearchError::config(format!(
                "mu_lambda_offspring ({}) must be at least population_size ({})",
                self.mu_lambda_offspring, self.population_size
            )));
        }
        if self.algorithm == Algorithm::OnePlusLambdaLambda && self.one_plus_lambda_lambda_offspring == 0 {
            return Err(SearchError::config("one_plus_lambda_lambda_offspring must be at least 1"));
        }
        if self.archive_target_limit == 0 {
            return Err(SearchError::config("archive_target_limit must be at least 1"));
        }
        if self.max_mutations == 0 {
            return Err(SearchError::config("max_mutations must be at least 1"));
        }
        match self.stopping_criterion {
            StoppingCriterion::ActionEvaluations if self.max_action_evaluations == 0 => {
                return Err(SearchError::config("max_action_evaluations must be positive"));
            }
            StoppingCriterion::Time if self.max_time_seconds == 0 => {
                return Err(SearchError::config("max_time_seconds must be positive"));
            }
            _ => {}
        }
        self.cro.validate()
    }
}
