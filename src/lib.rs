pub mod dsp;
pub mod engine; // Per-block pipeline
pub mod error;
pub mod io;
pub mod params; // Parameter catalog and lock-free store
#[cfg(feature = "serde")]
pub mod state;
pub mod synth; // Voices and polyphony

pub use engine::{EngineConfig, EngineHandle, SynthEngine};
pub use error::SynthError;

pub const MAX_BLOCK_SIZE: usize = 2048;
