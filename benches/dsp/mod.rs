//! Benchmarks for low-level DSP primitives.

mod ladder;
mod reverb;

pub use ladder::bench_ladder;
pub use reverb::bench_reverb;
