use thiserror::Error;

/// Errors surfaced on the control side of the synth.
///
/// Nothing on the per-block audio path returns these; out-of-range values are
/// clamped and unplayable notes are dropped instead.
#[derive(Debug, Error)]
pub enum SynthError {
    /// A parameter key that is not part of the catalog.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// Persisted state could not be parsed; the store was left untouched.
    #[error("malformed parameter state: {0}")]
    MalformedState(String),

    /// The MIDI ring buffer had no room; the event was dropped.
    #[error("midi queue is full, dropped event")]
    QueueFull,

    /// Sample rates must be finite and positive.
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f32),

    /// Only mono and stereo output layouts are supported.
    #[error("unsupported channel layout: {channels} output channels")]
    UnsupportedLayout { channels: usize },
}

pub type Result<T> = std::result::Result<T, SynthError>;
