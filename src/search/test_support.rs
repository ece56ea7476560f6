//! Toy problems shared by the search tests.

use super::types::SearchProblem;
use crate::fitness::{ActionResult, Evaluation, FitnessValue};
use crate::graph::MethodGraph;
use crate::individual::{mutation, ActionFilter, GeneId, GeneKind, GroupKind, SampleType, TestCase};
use rand::Rng;

/// Routes `log` output through the test harness.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn bit_string<R: Rng>(n: usize, rng: &mut R, random: bool) -> TestCase {
    let mut tc = TestCase::new(SampleType::Random);
    let genes: Vec<GeneId> = (0..n)
        .map(|i| {
            let bit = random && rng.random_bool(0.5);
            tc.arena_mut().add_root(format!("bit{i}"), GeneKind::Boolean(bit))
        })
        .collect();
    tc.add_action(GroupKind::Main, "bits", genes);
    tc
}

fn genes(tc: &TestCase) -> Vec<GeneId> {
    tc.see_actions(ActionFilter::Main)
        .iter()
        .flat_map(|a| a.genes().iter().copied())
        .collect()
}

fn bits(tc: &TestCase) -> Vec<bool> {
    genes(tc)
        .into_iter()
        .map(|g| tc.arena().as_bool(g).unwrap_or(false))
        .collect()
}

fn results(tc: &TestCase) -> Vec<ActionResult> {
    tc.see_actions(ActionFilter::Main)
        .iter()
        .map(|a| ActionResult::ok(a.local_id()))
        .collect()
}

/// Swaps every bit with probability 1/2.
fn uniform_crossover<R: Rng>(a: &mut TestCase, b: &mut TestCase, rng: &mut R) {
    for (ga, gb) in genes(a).into_iter().zip(genes(b)) {
        if !rng.random_bool(0.5) {
            continue;
        }
        let (Some(va), Some(vb)) = (a.arena().as_bool(ga), b.arena().as_bool(gb)) else {
            continue;
        };
        a.arena_mut().set_value(ga, GeneKind::Boolean(vb));
        b.arena_mut().set_value(gb, GeneKind::Boolean(va));
    }
}

/// One target whose heuristic is the fraction of set bits.
#[derive(Debug, Clone)]
pub struct OneMax {
    n: usize,
    evaluations: usize,
}

impl OneMax {
    pub fn new(n: usize) -> Self {
        Self { n, evaluations: 0 }
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }
}

impl SearchProblem for OneMax {
    type Individual = TestCase;

    fn sample<R: Rng>(&mut self, rng: &mut R) -> TestCase {
        bit_string(self.n, rng, true)
    }

    fn evaluate(&mut self, tc: &TestCase) -> Option<Evaluation> {
        self.evaluations += 1;
        let ones = bits(tc).into_iter().filter(|&b| b).count();
        let mut fitness = FitnessValue::new(tc.size() as f64);
        fitness.update_target(0, ones as f64 / self.n.max(1) as f64);
        Some(Evaluation::new(fitness).with_results(results(tc)))
    }

    fn mutate_genes<R: Rng>(&mut self, tc: &mut TestCase, rng: &mut R) {
        mutation::mutate_genes(tc, rng);
    }

    fn crossover<R: Rng>(&mut self, a: &mut TestCase, b: &mut TestCase, rng: &mut R) {
        uniform_crossover(a, b, rng);
    }
}

/// One target per bit: covered when set, half-way otherwise.
#[derive(Debug, Clone)]
pub struct MultiOneMax {
    n: usize,
    graphs: Vec<MethodGraph>,
    random_start: bool,
}

impl MultiOneMax {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            graphs: Vec::new(),
            random_start: true,
        }
    }

    pub fn with_graphs(mut self, graphs: Vec<MethodGraph>) -> Self {
        self.graphs = graphs;
        self
    }

    /// Samples all-zero strings, so nothing is covered at first.
    pub fn starting_empty(mut self) -> Self {
        self.random_start = false;
        self
    }
}

impl SearchProblem for MultiOneMax {
    type Individual = TestCase;

    fn sample<R: Rng>(&mut self, rng: &mut R) -> TestCase {
        bit_string(self.n, rng, self.random_start)
    }

    fn evaluate(&mut self, tc: &TestCase) -> Option<Evaluation> {
        let mut fitness = FitnessValue::new(tc.size() as f64);
        for (i, bit) in bits(tc).into_iter().enumerate() {
            fitness.update_target(i as u32, if bit { 1.0 } else { 0.5 });
        }
        Some(Evaluation::new(fitness).with_results(results(tc)))
    }

    fn mutate_genes<R: Rng>(&mut self, tc: &mut TestCase, rng: &mut R) {
        mutation::mutate_genes(tc, rng);
    }

    fn crossover<R: Rng>(&mut self, a: &mut TestCase, b: &mut TestCase, rng: &mut R) {
        uniform_crossover(a, b, rng);
    }

    fn dependency_graphs(&self) -> Vec<MethodGraph> {
        self.graphs.clone()
    }
}

/// Fails every `period`-th evaluation of the wrapped problem.
#[derive(Debug, Clone)]
pub struct FlakyProblem<P> {
    inner: P,
    period: usize,
    calls: usize,
    failures: usize,
}

impl<P> FlakyProblem<P> {
    pub fn new(inner: P, period: usize) -> Self {
        Self {
            inner,
            period: period.max(1),
            calls: 0,
            failures: 0,
        }
    }

    pub fn failures(&self) -> usize {
        self.failures
    }
}

impl<P: SearchProblem> SearchProblem for FlakyProblem<P> {
    type Individual = P::Individual;

    fn sample<R: Rng>(&mut self, rng: &mut R) -> Self::Individual {
        self.inner.sample(rng)
    }

    fn evaluate(&mut self, individual: &Self::Individual) -> Option<Evaluation> {
        self.calls += 1;
        if self.calls % self.period == 0 {
            self.failures += 1;
            return None;
        }
        self.inner.evaluate(individual)
    }

    fn mutate_genes<R: Rng>(&mut self, individual: &mut Self::Individual, rng: &mut R) {
        self.inner.mutate_genes(individual, rng);
    }

    fn crossover<R: Rng>(&mut self, a: &mut Self::Individual, b: &mut Self::Individual, rng: &mut R) {
        self.inner.crossover(a, b, rng);
    }
}
