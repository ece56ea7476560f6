//! The generic search loop.
//!
//! [`SearchEngine`] owns everything a run needs: configuration, random
//! stream, budget counters, archive, dependency graph, observers and the
//! population. The population is a [`Population`] value whose variant
//! depends on the algorithm; the per-algorithm steps live next to this
//! file and only differ in how they select, vary and replace.

use super::config::{Algorithm, SearchConfig};
use super::neighborhood::Neighborhood;
use super::reaction::ReactorState;
use super::selection::{Selection, SelectionStrategy};
use super::types::{SearchObserver, SearchProblem};
use crate::archive::Archive;
use crate::error::Result;
use crate::fitness::{EvaluatedIndividual, EvaluationId, Solution};
use crate::graph::TargetDependencyGraph;
use crate::individual::Individual;
use crate::time::SearchTime;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Individual of a MOSA population with its preference rank and
/// sub-vector dominance distance.
#[derive(Debug, Clone)]
pub struct RankedIndividual<I> {
    pub individual: EvaluatedIndividual<I>,
    pub rank: usize,
    pub distance: usize,
}

/// Population layout of the running algorithm.
#[derive(Debug, Clone)]
pub enum Population<I> {
    /// Unstructured list (generational and steady-state GAs, ES, random walk).
    Flat(Vec<EvaluatedIndividual<I>>),
    /// Cells on a torus (cellular GA).
    Grid {
        cells: Vec<EvaluatedIndividual<I>>,
        neighborhood: Neighborhood,
    },
    /// The archive is the population (MIO, DynaMOSA, LIPS, random search).
    Archive,
    /// Preference-sorted list (MOSA).
    Ranked(Vec<RankedIndividual<I>>),
    /// Molecules of a chemical reaction (CRO).
    Reactor(Box<ReactorState<I>>),
}

impl<I: Individual> Population<I> {
    /// Evaluated individuals currently held, in population order.
    pub fn individuals(&self) -> Vec<&EvaluatedIndividual<I>> {
        match self {
            Population::Flat(v) => v.iter().collect(),
            Population::Grid { cells, .. } => cells.iter().collect(),
            Population::Archive => Vec::new(),
            Population::Ranked(v) => v.iter().map(|r| &r.individual).collect(),
            Population::Reactor(state) => state.molecules.iter().map(|m| &m.payload).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.individuals().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest score in the population, if it holds anything.
    pub fn best_score(&self) -> Option<f64> {
        self.individuals().iter().map(|e| e.score()).reduce(f64::max)
    }
}

/// Outcome of one evaluation as seen by the loop.
pub(super) struct Evaluated<I> {
    pub(super) individual: EvaluatedIndividual<I>,
    /// The individual reached a target the archive did not know, or covered
    /// one for the first time.
    pub(super) reaches_new: bool,
}

/// Result of a search run.
#[derive(Debug, Clone)]
pub struct SearchResult<I> {
    /// Covering individuals extracted from the archive.
    pub solution: Solution<I>,

    /// Highest-scoring individual evaluated during the run.
    pub best: Option<EvaluatedIndividual<I>>,

    /// Number of `search_once` steps executed.
    pub iterations: usize,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Best population score after each step.
    pub fitness_history: Vec<f64>,

    pub evaluated_individuals: u64,
    pub evaluated_actions: u64,
}

/// Generic search engine.
///
/// # Usage
///
/// ```ignore
/// let mut problem = MyProblem::new();
/// let config = SearchConfig::default().with_seed(42);
/// let mut engine = SearchEngine::new(&mut problem, config)?;
/// let result = engine.search(None);
/// println!("covered: {:?}", result.solution.covered_targets());
/// ```
pub struct SearchEngine<'a, P: SearchProblem, S: SelectionStrategy = Selection> {
    pub(super) problem: &'a mut P,
    pub(super) config: SearchConfig,
    pub(super) selection: S,
    pub(super) rng: StdRng,
    pub(super) time: SearchTime,
    pub(super) archive: Archive<P::Individual>,
    pub(super) graph: TargetDependencyGraph,
    pub(super) observers: Vec<Box<dyn SearchObserver<P::Individual> + 'a>>,
    pub(super) population: Population<P::Individual>,
    best: Option<EvaluatedIndividual<P::Individual>>,
    next_id: u64,
    iteration: usize,
    fitness_history: Vec<f64>,
    initialized: bool,
}

impl<'a, P: SearchProblem> SearchEngine<'a, P, Selection> {
    /// Creates an engine using tournament selection of the configured size.
    pub fn new(problem: &'a mut P, config: SearchConfig) -> Result<Self> {
        let selection = Selection::Tournament(config.tournament_size);
        Self::with_selection(problem, config, selection)
    }
}

impl<'a, P: SearchProblem, S: SelectionStrategy> SearchEngine<'a, P, S> {
    /// Creates an engine with a custom selection strategy.
    ///
    /// Fails if the configuration does not validate; nothing is evaluated
    /// before that check.
    pub fn with_selection(problem: &'a mut P, config: SearchConfig, selection: S) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        let time = SearchTime::new(
            config.stopping_criterion,
            config.max_action_evaluations,
            config.max_time_seconds,
        );
        let archive = Archive::new(config.archive_target_limit, config.feedback_sampling);
        Ok(Self {
            problem,
            config,
            selection,
            rng,
            time,
            archive,
            graph: TargetDependencyGraph::new(),
            observers: Vec::new(),
            population: Population::Archive,
            best: None,
            next_id: 0,
            iteration: 0,
            fitness_history: Vec::new(),
            initialized: false,
        })
    }

    pub fn add_observer(&mut self, observer: impl SearchObserver<P::Individual> + 'a) {
        self.observers.push(Box::new(observer));
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn time(&self) -> &SearchTime {
        &self.time
    }

    pub fn archive(&self) -> &Archive<P::Individual> {
        &self.archive
    }

    pub fn graph(&self) -> &TargetDependencyGraph {
        &self.graph
    }

    pub fn population(&self) -> &Population<P::Individual> {
        &self.population
    }

    pub fn best(&self) -> Option<&EvaluatedIndividual<P::Individual>> {
        self.best.as_ref()
    }

    pub fn iterations(&self) -> usize {
        self.iteration
    }

    pub fn selection(&self) -> &S {
        &self.selection
    }

    // ---- shared steps ----

    /// Runs an individual and feeds the archive.
    ///
    /// Returns `None` without running anything when the budget is spent,
    /// and `None` after charging the budget when the run was incomplete.
    pub(super) fn evaluate(&mut self, individual: P::Individual) -> Option<Evaluated<P::Individual>> {
        if !self.time.should_continue_search() {
            return None;
        }
        let outcome = self.problem.evaluate(&individual);
        let actions = outcome
            .as_ref()
            .map(|e| e.executed_actions())
            .filter(|&n| n > 0)
            .unwrap_or_else(|| individual.size())
            .max(1);
        self.time.report_executed_individual(actions);

        let evaluation = match outcome {
            Some(e) => e,
            None => {
                debug!("evaluation {} incomplete, individual discarded", self.next_id);
                return None;
            }
        };

        let id = EvaluationId(self.next_id);
        self.next_id += 1;
        let evaluated = EvaluatedIndividual::new(id, individual, evaluation);
        let reaches_new = self.archive.would_reach_new_target(evaluated.fitness());
        let update = self.archive.add_if_needed(&evaluated);
        if update.improved {
            self.time.new_action_improvement();
        }
        for _ in &update.newly_covered {
            self.time.new_covered_target();
        }

        let better = match &self.best {
            Some(b) => evaluated.score() > b.score(),
            None => true,
        };
        if better {
            self.best = Some(evaluated.clone());
        }
        Some(Evaluated {
            individual: evaluated,
            reaches_new,
        })
    }

    /// Evaluates `individual`, falling back to `parent` when nothing came
    /// back.
    pub(super) fn evaluate_or(
        &mut self,
        individual: P::Individual,
        parent: &EvaluatedIndividual<P::Individual>,
    ) -> EvaluatedIndividual<P::Individual> {
        self.evaluate(individual)
            .map(|e| e.individual)
            .unwrap_or_else(|| parent.clone())
    }

    /// Samples and evaluates a fresh individual.
    pub(super) fn sample_and_evaluate(&mut self) -> Option<EvaluatedIndividual<P::Individual>> {
        let individual = self.problem.sample(&mut self.rng);
        self.evaluate(individual).map(|e| e.individual)
    }

    /// Samples up to `n` evaluated individuals, fewer if the budget runs out
    /// or evaluations fail.
    pub(super) fn sample_population(&mut self, n: usize) -> Vec<EvaluatedIndividual<P::Individual>> {
        let mut population = Vec::with_capacity(n);
        for _ in 0..n {
            if !self.time.should_continue_search() {
                break;
            }
            if let Some(e) = self.sample_and_evaluate() {
                population.push(e);
            }
        }
        population
    }

    /// Applies one structure or gene mutation.
    pub(super) fn mutate(&mut self, individual: &mut P::Individual) {
        let structural = self.problem.can_mutate_structure(individual)
            && self.rng.random_bool(self.config.structure_mutation_probability);
        if structural {
            self.problem.mutate_structure(individual, &mut self.rng);
        } else {
            self.problem.mutate_genes(individual, &mut self.rng);
        }
        for o in &mut self.observers {
            o.on_mutation(individual);
        }
    }

    /// Recombines copies of two parents in place.
    pub(super) fn crossover(&mut self, a: &mut P::Individual, b: &mut P::Individual) {
        self.problem.crossover(a, b, &mut self.rng);
        for o in &mut self.observers {
            o.on_crossover(a, b);
        }
    }

    /// Crossover with the configured probability, then mutation of each
    /// child with the configured probability.
    pub(super) fn breed(&mut self, a: &P::Individual, b: &P::Individual) -> (P::Individual, P::Individual) {
        let mut x = a.clone();
        let mut y = b.clone();
        if self.rng.random_bool(self.config.crossover_probability) {
            self.crossover(&mut x, &mut y);
        }
        if self.rng.random_bool(self.config.mutation_probability) {
            self.mutate(&mut x);
        }
        if self.rng.random_bool(self.config.mutation_probability) {
            self.mutate(&mut y);
        }
        (x, y)
    }

    /// Index chosen by the selection strategy over `scores`.
    pub(super) fn select(&mut self, scores: &[f64]) -> usize {
        self.selection.select(scores, &mut self.rng)
    }

    /// Mutates `current` up to `n` times, moving on from every mutant that
    /// reaches something new or is better than the current one on at least
    /// one target.
    pub(super) fn mutate_and_save(&mut self, n: usize, current: EvaluatedIndividual<P::Individual>) {
        let every_target = BTreeSet::new();
        let mut current = current;
        for _ in 0..n {
            if !self.time.should_continue_search() {
                break;
            }
            let mut candidate = current.individual().clone();
            self.mutate(&mut candidate);
            let Some(outcome) = self.evaluate(candidate) else {
                continue;
            };
            if outcome.reaches_new || !current.fitness().subsumes(outcome.individual.fitness(), &every_target) {
                current = outcome.individual;
            }
        }
    }

    // ---- loop ----

    /// Builds the initial population. Called by [`search`](Self::search);
    /// calling it again has no effect.
    pub fn setup(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        let n = self.config.population_size;
        self.population = match self.config.algorithm {
            Algorithm::StandardGa
            | Algorithm::BreederGa
            | Algorithm::MonotonicGa
            | Algorithm::SteadyStateGa
            | Algorithm::MuPlusLambda
            | Algorithm::MuCommaLambda => Population::Flat(self.sample_population(n)),
            Algorithm::OnePlusLambdaLambda | Algorithm::RandomWalk => Population::Flat(self.sample_population(1)),
            Algorithm::CellularGa => self.sample_grid(),
            Algorithm::Mosa => {
                let initial = self.sample_population(n);
                Population::Ranked(self.mosa_rank(initial))
            }
            Algorithm::DynaMosa => {
                let graphs = self.problem.dependency_graphs();
                self.graph.add_graphs(&graphs);
                debug!("registered {} dependency graphs", graphs.len());
                Population::Archive
            }
            Algorithm::Mio | Algorithm::Lips | Algorithm::RandomSearch => Population::Archive,
            Algorithm::Cro => self.init_reactor(),
        };
    }

    /// Performs one step of the configured algorithm.
    ///
    /// Every step evaluates at least one individual while budget is left.
    pub fn search_once(&mut self) {
        self.setup();
        match self.config.algorithm {
            Algorithm::StandardGa | Algorithm::BreederGa | Algorithm::MonotonicGa => self.generational_step(),
            Algorithm::SteadyStateGa => self.steady_state_step(),
            Algorithm::CellularGa => self.cellular_step(),
            Algorithm::MuPlusLambda | Algorithm::MuCommaLambda => self.mu_lambda_step(),
            Algorithm::OnePlusLambdaLambda => self.one_plus_lambda_lambda_step(),
            Algorithm::RandomWalk => self.random_walk_step(),
            Algorithm::RandomSearch => self.random_search_step(),
            Algorithm::Mio => self.mio_step(None),
            Algorithm::DynaMosa => self.dynamosa_step(),
            Algorithm::Lips => self.lips_step(),
            Algorithm::Mosa => self.mosa_step(),
            Algorithm::Cro => self.cro_step(),
        }
        self.iteration += 1;

        let best = self
            .population
            .best_score()
            .or_else(|| self.best.as_ref().map(|b| b.score()))
            .unwrap_or(0.0);
        self.fitness_history.push(best);
        let iteration = self.iteration;
        for o in &mut self.observers {
            o.on_generation(iteration, best);
        }
    }

    /// Runs until the budget is spent or `cancel` is set.
    pub fn search(&mut self, cancel: Option<Arc<AtomicBool>>) -> SearchResult<P::Individual> {
        info!(
            "starting {:?} search, budget {} {:?}",
            self.config.algorithm,
            match self.config.stopping_criterion {
                crate::time::StoppingCriterion::ActionEvaluations => self.config.max_action_evaluations,
                crate::time::StoppingCriterion::Time => self.config.max_time_seconds,
            },
            self.config.stopping_criterion
        );
        self.setup();

        let mut cancelled = false;
        while self.time.should_continue_search() {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }
            self.search_once();
        }

        let result = self.result(cancelled);
        info!(
            "search finished after {} steps: {} individuals, {} actions, {} targets covered",
            result.iterations,
            result.evaluated_individuals,
            result.evaluated_actions,
            result.solution.covered_targets().len()
        );
        result
    }

    /// Snapshot of the current outcome.
    pub fn result(&self, cancelled: bool) -> SearchResult<P::Individual> {
        SearchResult {
            solution: self.archive.extract_solution(),
            best: self.best.clone(),
            iterations: self.iteration,
            cancelled,
            fitness_history: self.fitness_history.clone(),
            evaluated_individuals: self.time.evaluated_individuals(),
            evaluated_actions: self.time.evaluated_actions(),
        }
    }
}

/// Executes a whole search in one call.
pub struct SearchRunner;

impl SearchRunner {
    /// Validates `config` and runs the configured algorithm to completion.
    pub fn run<P: SearchProblem>(problem: &mut P, config: &SearchConfig) -> Result<SearchResult<P::Individual>> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Like [`run`](Self::run), stopping before the next step once `cancel`
    /// is set.
    pub fn run_with_cancel<P: SearchProblem>(
        problem: &mut P,
        config: &SearchConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SearchResult<P::Individual>> {
        let mut engine = SearchEngine::new(problem, config.clone())?;
        Ok(engine.search(cancel))
    }
}

/// Sorts best score first; ties keep the more recent evaluation first.
pub(super) fn sort_best_first<I: Individual>(population: &mut [EvaluatedIndividual<I>]) {
    population.sort_by(|a, b| {
        b.score()
            .partial_cmp(&a.score())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.id().cmp(&a.id()))
    });
}
