use criterion::{black_box, criterion_group, criterion_main, Criterion};
use social_harness::batch::{AttemptResult, BatchPlan, RunOutcome};
use social_harness::HarnessConfig;

fn benchmark_plan_iteration(c: &mut Criterion) {
    c.bench_function("plan_iteration_3000_by_150", |b| {
        b.iter(|| {
            let plan = BatchPlan::new(black_box(3000), black_box(150)).unwrap();
            plan.batches().map(|batch| batch.len()).sum::<usize>()
        })
    });
}

fn benchmark_outcome_accounting(c: &mut Criterion) {
    let results: Vec<AttemptResult> = (0..3000)
        .map(|i| {
            if i % 10 == 0 {
                AttemptResult::unexpected_status(500)
            } else {
                AttemptResult::success(201)
            }
        })
        .collect();

    c.bench_function("outcome_accounting_3000", |b| {
        b.iter(|| {
            let mut outcome = RunOutcome::new();
            for result in black_box(&results) {
                outcome.record(result);
            }
            outcome
        })
    });
}

fn benchmark_config_defaults(c: &mut Criterion) {
    c.bench_function("config_creation", |b| b.iter(HarnessConfig::default));
}

criterion_group!(
    benches,
    benchmark_plan_iteration,
    benchmark_outcome_accounting,
    benchmark_config_defaults
);
criterion_main!(benches);
