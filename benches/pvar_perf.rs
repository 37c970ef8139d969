use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use pvar::pvar;
use rand::{rngs::StdRng, Rng, SeedableRng};
use sysinfo::{get_current_pid, ProcessRefreshKind, System};

fn random_walk(rng: &mut StdRng, len: usize) -> Vec<f64> {
    let mut level = 0.0f64;
    (0..len)
        .map(|_| {
            level += rng.gen_range(-1.0..1.0);
            level
        })
        .collect()
}

fn rss_kib() -> u64 {
    let mut sys = System::new();
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    if let Some(p) = sys.process(get_current_pid().unwrap()) {
        p.memory() / 1024
    } else {
        0
    }
}

fn bench_pvar_perf(c: &mut Criterion) {
    let mut group = c.benchmark_group("pvar_random_walk");
    for &len in &[1_000usize, 10_000, 100_000] {
        group.bench_function(format!("walk_len_{len}"), |b| {
            b.iter_batched(
                || {
                    let mut rng = StdRng::seed_from_u64(42);
                    random_walk(&mut rng, len)
                },
                |x| {
                    let before = rss_kib();
                    let value = pvar(&x, 2.5);
                    let after = rss_kib();
                    criterion::black_box(value);
                    // record memory delta to stderr to avoid criterion noise
                    eprintln!(
                        "RSS KiB delta (pvar {len}): {}",
                        after.saturating_sub(before)
                    );
                },
                BatchSize::PerIteration,
            )
        });
    }
    group.finish();
}

fn bench_exponent_sweep(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let x = random_walk(&mut rng, 10_000);

    let mut group = c.benchmark_group("pvar_exponent_sweep");
    for &p in &[1.0f64, 2.0, 4.0] {
        group.bench_function(format!("p_{p}"), |b| {
            b.iter(|| criterion::black_box(pvar(criterion::black_box(&x), p)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pvar_perf, bench_exponent_sweep);
criterion_main!(benches);
