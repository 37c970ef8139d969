//! Example: how the exponent trades small oscillations against large swings.
//!
//! Run with:
//! `cargo run --example oscillator`

use pvar::PvarEngine;

fn main() {
    // Fast ripple on top of one slow swell.
    let x: Vec<f64> = (0..4_096)
        .map(|i| {
            let t = i as f64;
            10.0 * (t * 0.002).sin() + 1.5 * (t * 0.8).sin()
        })
        .collect();

    println!("{:>5}  {:>14}  {:>15}", "p", "variation", "partition size");
    for p in [1.0, 1.5, 2.0, 3.0, 4.0] {
        let (value, partition) = PvarEngine::new(&x, p).run();
        println!("{p:>5}  {value:>14.4}  {:>15}", partition.len());
    }

    // At p = 1 every ripple counts; as p grows the variation concentrates on
    // the big swell and the optimal partition thins out accordingly.
}
