//! Real-world scenario benchmarks: the voice pool on its own and complete
//! engine blocks with every voice sounding.

mod engine;
mod voices;

pub use engine::bench_engine;
pub use voices::bench_voices;
