// Purpose: Voice management, polyphony, note events
// This layer sits below the DSP chain and produces the raw voice mix

pub mod message;
pub mod poly;
pub mod voice;
