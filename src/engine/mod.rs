//! Per-block driver: MIDI → voices → ladder filter → reverb → output gain.
//!
//! The stage order is fixed; each stage works in place on the block buffer
//! the previous stage left behind. Parameters are read from the shared store
//! once at the top of every block.

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        ladder::LadderFilter,
        reverb::{Reverb, ReverbParameters},
    },
    error::{Result, SynthError},
    io::{
        converter::db_to_gain,
        midi::{midi_channel, MidiCollector, MidiSender, DEFAULT_MIDI_CAPACITY},
        AudioBuffer,
    },
    params::{ParamId, ParameterStore},
    synth::poly::VoicePool,
};

/// Stream configuration negotiated with the host.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub max_block_size: usize,
    pub output_channels: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            max_block_size: 512,
            output_channels: 2,
        }
    }
}

impl EngineConfig {
    /// Only mono and stereo outputs at a finite, positive rate are accepted.
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(SynthError::InvalidSampleRate(self.sample_rate));
        }
        match self.output_channels {
            1 | 2 => Ok(()),
            channels => Err(SynthError::UnsupportedLayout { channels }),
        }
    }

    /// Changes that require clearing filter and reverb history.
    fn requires_reset(&self, other: &EngineConfig) -> bool {
        self.sample_rate != other.sample_rate || self.max_block_size != other.max_block_size
    }
}

/// Control-side handles for a running engine.
pub struct EngineHandle {
    pub params: Arc<ParameterStore>,
    pub midi: MidiSender,
}

pub struct SynthEngine {
    config: EngineConfig,
    params: Arc<ParameterStore>,
    midi: MidiCollector,
    voices: VoicePool,
    filter: LadderFilter,
    reverb: Reverb,
}

impl SynthEngine {
    pub fn new(
        config: EngineConfig,
        params: Arc<ParameterStore>,
        midi: MidiCollector,
    ) -> Result<Self> {
        config.validate()?;

        let mut engine = Self {
            config,
            params,
            midi,
            voices: VoicePool::new(config.sample_rate),
            filter: LadderFilter::new(config.sample_rate),
            reverb: Reverb::new(config.sample_rate),
        };
        engine.reconfigure();
        Ok(engine)
    }

    /// Engine with a fresh parameter store and MIDI queue, plus the handles
    /// the control thread needs to drive it.
    pub fn build(config: EngineConfig) -> Result<(Self, EngineHandle)> {
        let params = Arc::new(ParameterStore::new());
        let (sender, collector) = midi_channel(DEFAULT_MIDI_CAPACITY);
        let engine = Self::new(config, Arc::clone(&params), collector)?;

        Ok((
            engine,
            EngineHandle {
                params,
                midi: sender,
            },
        ))
    }

    /// Apply a new stream configuration. Call only while the stream is stopped.
    ///
    /// A sample-rate or block-size change clears filter, reverb, voices and
    /// queued MIDI; anything else is taken as is.
    pub fn prepare(&mut self, config: EngineConfig) -> Result<()> {
        config.validate()?;

        let reset = config.requires_reset(&self.config);
        self.config = config;
        if reset {
            self.reconfigure();
        }
        Ok(())
    }

    fn reconfigure(&mut self) {
        let sample_rate = self.config.sample_rate;

        self.voices.all_notes_off(false);
        self.voices.prepare(sample_rate);
        self.filter.prepare(sample_rate);
        self.reverb.prepare(sample_rate);
        self.midi.reset();
        self.apply_parameters();

        tracing::debug!(
            sample_rate,
            max_block_size = self.config.max_block_size,
            output_channels = self.config.output_channels,
            "engine reconfigured"
        );
    }

    /// Push the current parameter values into filter and reverb; returns the
    /// linear output gain.
    fn apply_parameters(&mut self) -> f32 {
        let params = &self.params;

        self.filter.set_mode(params.filter_mode());
        self.filter.set_cutoff_hz(params.get(ParamId::FilterCutoff));
        self.filter.set_resonance(params.get(ParamId::FilterResonance) / 100.0);
        self.filter.set_drive(params.get(ParamId::FilterDrive));

        self.reverb.set_parameters(ReverbParameters {
            room_size: params.get(ParamId::ReverbRoomSize),
            damping: params.get(ParamId::ReverbDamping) / 100.0,
            width: params.get(ParamId::ReverbWidth) / 100.0,
            freeze: params.get(ParamId::ReverbFreeze),
            dry_level: params.get(ParamId::ReverbDry) / 100.0,
            wet_level: params.get(ParamId::ReverbWet) / 100.0,
        });

        db_to_gain(params.get(ParamId::Output))
    }

    /// Render one block into `buffer`.
    ///
    /// Channels at or beyond `num_input_channels` are cleared first; every
    /// channel is then overwritten by the voice mix.
    pub fn process_block(&mut self, buffer: &mut AudioBuffer, num_input_channels: usize) {
        for channel in num_input_channels..buffer.num_channels() {
            buffer.clear_channel(channel);
        }

        let events = self.midi.drain_for(buffer.len());
        self.voices.render_block(events, buffer);

        let gain = self.apply_parameters();
        self.filter.process(buffer);
        self.reverb.process(buffer);
        buffer.apply_gain(gain);
    }

    /// Stop every voice and clear effect tails (stream stopped).
    pub fn release_resources(&mut self) {
        self.voices.all_notes_off(false);
        self.filter.reset();
        self.reverb.reset();
    }

    /// Extra output after input stops, as reported to the host.
    pub fn tail_length_seconds(&self) -> f64 {
        0.0
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn params(&self) -> &Arc<ParameterStore> {
        &self.params
    }

    pub fn active_voices(&self) -> usize {
        self.voices.active_voices()
    }
}
