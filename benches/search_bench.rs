//! Criterion benchmarks for the search algorithms.
//!
//! Uses synthetic bit-string problems (OneMax, one target per bit) to
//! measure algorithm overhead independent of any system under test.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use u_sbst::fitness::{ActionResult, Evaluation, FitnessValue};
use u_sbst::individual::{mutation, ActionFilter, GeneId, GeneKind, GroupKind, SampleType, TestCase};
use u_sbst::search::{Algorithm, SearchConfig, SearchProblem, SearchRunner};

// ===========================================================================
// Bit strings: one target per bit (covered when set) plus an overall one
// ===========================================================================

struct Bits {
    n: usize,
}

fn genes(tc: &TestCase) -> Vec<GeneId> {
    tc.see_actions(ActionFilter::Main)
        .iter()
        .flat_map(|a| a.genes().iter().copied())
        .collect()
}

impl SearchProblem for Bits {
    type Individual = TestCase;

    fn sample<R: Rng>(&mut self, rng: &mut R) -> TestCase {
        let mut tc = TestCase::new(SampleType::Random);
        let genes: Vec<GeneId> = (0..self.n)
            .map(|i| tc.arena_mut().add_root(format!("b{i}"), GeneKind::Boolean(rng.random_bool(0.5))))
            .collect();
        tc.add_action(GroupKind::Main, "bits", genes);
        tc
    }

    fn evaluate(&mut self, tc: &TestCase) -> Option<Evaluation> {
        let mut fitness = FitnessValue::new(tc.size() as f64);
        let bits: Vec<bool> = genes(tc)
            .into_iter()
            .map(|g| tc.arena().as_bool(g).unwrap_or(false))
            .collect();
        let ones = bits.iter().filter(|&&b| b).count();
        for (i, bit) in bits.iter().enumerate() {
            fitness.update_target(i as u32 + 1, if *bit { 1.0 } else { 0.5 });
        }
        fitness.update_target(0, ones as f64 / self.n as f64);
        let results = tc
            .see_actions(ActionFilter::Main)
            .iter()
            .map(|a| ActionResult::ok(a.local_id()))
            .collect();
        Some(Evaluation::new(fitness).with_results(results))
    }

    fn mutate_genes<R: Rng>(&mut self, tc: &mut TestCase, rng: &mut R) {
        mutation::mutate_genes(tc, rng);
    }

    fn crossover<R: Rng>(&mut self, a: &mut TestCase, b: &mut TestCase, rng: &mut R) {
        mutation::crossover_actions(a, b, rng);
    }
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_algorithm(c: &mut Criterion, name: &str, algorithm: Algorithm) {
    let mut group = c.benchmark_group(name);
    group.sample_size(10);

    for &n in &[20usize, 50, 100] {
        let config = SearchConfig::default()
            .with_algorithm(algorithm)
            .with_population_size(20)
            .with_max_action_evaluations(2000)
            .with_seed(42);
        group.bench_with_input(BenchmarkId::from_parameter(n), &config, |b, config| {
            b.iter(|| {
                let mut problem = Bits { n };
                let result = SearchRunner::run(black_box(&mut problem), black_box(config));
                black_box(result)
            })
        });
    }
    group.finish();
}

fn bench_mio(c: &mut Criterion) {
    bench_algorithm(c, "mio_bits", Algorithm::Mio);
}

fn bench_mosa(c: &mut Criterion) {
    bench_algorithm(c, "mosa_bits", Algorithm::Mosa);
}

fn bench_standard_ga(c: &mut Criterion) {
    bench_algorithm(c, "standard_ga_bits", Algorithm::StandardGa);
}

fn bench_cro(c: &mut Criterion) {
    bench_algorithm(c, "cro_bits", Algorithm::Cro);
}

criterion_group!(benches, bench_mio, bench_mosa, bench_standard_ga, bench_cro);
criterion_main!(benches);
