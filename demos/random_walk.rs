//! Example: p-variation of a seeded random walk.
//!
//! Run with:
//! `cargo run --example random_walk`

use pvar::PvarEngine;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn main() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut level = 0.0f64;
    let x: Vec<f64> = (0..10_000)
        .map(|_| {
            level += rng.gen_range(-1.0..1.0);
            level
        })
        .collect();

    let p = 2.5;
    let engine = PvarEngine::new(&x, p);
    let (value, partition) = engine.run();

    println!("walk length: {}", x.len());
    println!("p = {p}: variation = {value:.6}");
    println!(
        "optimal partition keeps {} points ({:.2}% of the walk)",
        partition.len(),
        100.0 * partition.len() as f64 / x.len() as f64
    );

    // The first few partition points, with the levels they pin down.
    for &i in partition.iter().take(8) {
        println!("  x[{i:>5}] = {:>9.4}", x[i]);
    }
    if partition.len() > 8 {
        println!("  ...");
    }
}
