//! BasicSynth - audio stream setup and state persistence

use std::{fs, path::PathBuf};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;

use basic_synth::{
    io::AudioBuffer,
    state::{load_state, save_state},
    EngineConfig, SynthEngine, MAX_BLOCK_SIZE,
};

use super::ui::{MeterUpdate, UiApp};

/// Meter updates buffered between audio callbacks and UI frames.
const METER_QUEUE: usize = 64;

pub struct BasicSynth {
    state_path: Option<PathBuf>,
}

impl BasicSynth {
    pub fn new(state_path: Option<PathBuf>) -> Self {
        Self { state_path }
    }

    /// Open the default output device and run the UI until the user quits.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let device_channels = config.channels() as usize;

        let engine_config = EngineConfig {
            sample_rate,
            max_block_size: MAX_BLOCK_SIZE,
            output_channels: device_channels.min(2),
        };
        let (mut engine, handle) = SynthEngine::build(engine_config)?;
        tracing::info!(sample_rate, device_channels, "audio device opened");

        let status = match &self.state_path {
            Some(path) if path.exists() => {
                let bytes = fs::read(path)
                    .wrap_err_with(|| format!("failed to read state file {}", path.display()))?;
                match load_state(&handle.params, &bytes) {
                    Ok(()) => format!("Loaded {}", path.display()),
                    Err(err) => format!("Kept defaults: {err}"),
                }
            }
            _ => "Defaults".to_string(),
        };

        let (mut meter_tx, meter_rx) = RingBuffer::<MeterUpdate>::new(METER_QUEUE);
        let mut buffer = AudioBuffer::new(engine_config.output_channels, MAX_BLOCK_SIZE);

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / device_channels;
                let mut frames_written = 0;
                let mut peak = 0.0f32;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    buffer.set_len(frames);

                    // The synth consumes no audio input
                    engine.process_block(&mut buffer, 0);

                    let start = frames_written * device_channels;
                    let end = start + frames * device_channels;
                    buffer.write_interleaved(&mut data[start..end], device_channels);

                    for channel in 0..buffer.num_channels() {
                        peak = buffer
                            .channel(channel)
                            .iter()
                            .fold(peak, |acc, &x| acc.max(x.abs()));
                    }
                    frames_written += frames;
                }

                let _ = meter_tx.push(MeterUpdate {
                    peak,
                    active_voices: engine.active_voices() as u8,
                });
            },
            |err| tracing::error!(%err, "audio stream error"),
            None,
        )?;

        stream.play()?;

        let mut app = UiApp::new(handle, meter_rx, sample_rate, status);
        let mut terminal = ratatui::init();
        let result = app.run(&mut terminal);
        ratatui::restore();
        drop(stream);

        if let Some(path) = &self.state_path {
            let bytes = save_state(app.params())?;
            fs::write(path, bytes)
                .wrap_err_with(|| format!("failed to write state file {}", path.display()))?;
            tracing::info!(path = %path.display(), "saved parameter state");
        }

        result
    }
}
