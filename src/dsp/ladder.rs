use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{dsp::flush_denormal, io::AudioBuffer};

/*
Saturating Ladder Filter
========================

Four one-pole lowpass stages in series with the output of the last stage fed
back, inverted, to the input. The feedback is what gives the ladder its
resonant peak; at full resonance the loop gain at the cutoff frequency reaches
unity and the filter starts to ring on its own.

        ┌──────────────────────────── k · s4 ◄──────────────────────┐
        ↓                                                           │
  in ─→(−)─→ tanh ─→ [pole] ─→ tanh ─→ [pole] ─→ tanh ─→ [pole] ─→ tanh ─→ [pole] ─┤
         x0          s1               s2               s3               s4

Every stage saturates its input before the pole, so no stage can leave
[-1, 1] whatever the coefficients are. This is what keeps high resonance and
high drive from blowing up.

Responses
---------
The four modes read different combinations of the same five taps
(x0, s1, s2, s3, s4):

  Lowpass 12dB   s2
  Highpass 12dB  x0 - 2 s1 + s2
  Lowpass 24dB   s4
  Highpass 24dB  x0 - 4 s1 + 6 s2 - 4 s3 + s4

The highpass taps are the binomial expansion of (1 - H)^n, where H is one
pole. Switching mode only changes which taps are read, so the stage history
carries straight across a mode change without a click.

Coefficients
------------
  g = 1 - e^(-2π fc / fs)       pole coefficient, always in (0, 1)
  k = 4 · resonance             unity loop gain at the cutoff when resonance = 1
*/

pub const MIN_CUTOFF_HZ: f32 = 20.0;
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;
pub const MIN_DRIVE: f32 = 1.0;
pub const MAX_DRIVE: f32 = 10.0;

/// Channels with their own filter history.
pub const MAX_CHANNELS: usize = 2;

/// Fraction of the input added back into the feedback path in lowpass modes.
/// Offsets the passband loss that resonance otherwise causes.
const PASSBAND_COMPENSATION: f32 = 0.5;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Lowpass12,
    Highpass12,
    Lowpass24,
    Highpass24,
}

/// Display name for each mode, indexed by the parameter step.
const MODE_NAMES: [(FilterMode, &str); 4] = [
    (FilterMode::Lowpass12, "Lowpass 12dB"),
    (FilterMode::Highpass12, "Highpass 12dB"),
    (FilterMode::Lowpass24, "Lowpass 24dB"),
    (FilterMode::Highpass24, "Highpass 24dB"),
];

impl FilterMode {
    pub const ALL: [FilterMode; 4] = [
        FilterMode::Lowpass12,
        FilterMode::Highpass12,
        FilterMode::Lowpass24,
        FilterMode::Highpass24,
    ];

    /// Parameter step (0-3) for this mode.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Mode for a parameter value, rounded to the nearest step and clamped.
    pub fn from_value(value: f32) -> Self {
        let step = if value.is_finite() { value.round().clamp(0.0, 3.0) } else { 0.0 };
        Self::ALL[step as usize]
    }

    pub fn name(self) -> &'static str {
        MODE_NAMES[self.index()].1
    }

    /// Look up a mode by display name. Unknown text falls back to `Lowpass12`.
    pub fn from_name(text: &str) -> Self {
        MODE_NAMES
            .iter()
            .find(|(_, name)| *name == text.trim())
            .map_or(FilterMode::Lowpass12, |(mode, _)| *mode)
    }

    /// Weights applied to (x0, s1, s2, s3, s4).
    fn taps(self) -> [f32; 5] {
        match self {
            FilterMode::Lowpass12 => [0.0, 0.0, 1.0, 0.0, 0.0],
            FilterMode::Highpass12 => [1.0, -2.0, 1.0, 0.0, 0.0],
            FilterMode::Lowpass24 => [0.0, 0.0, 0.0, 0.0, 1.0],
            FilterMode::Highpass24 => [1.0, -4.0, 6.0, -4.0, 1.0],
        }
    }

    fn compensation(self) -> f32 {
        match self {
            FilterMode::Lowpass12 | FilterMode::Lowpass24 => PASSBAND_COMPENSATION,
            FilterMode::Highpass12 | FilterMode::Highpass24 => 0.0,
        }
    }
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct LadderState {
    stages: [f32; 4],
}

pub struct LadderFilter {
    channels: [LadderState; MAX_CHANNELS],

    sample_rate: f32,
    cutoff_hz: f32,
    resonance: f32,
    drive: f32,
    mode: FilterMode,

    // Derived coefficients
    g: f32,
    k: f32,
    taps: [f32; 5],
    compensation: f32,
}

impl LadderFilter {
    pub fn new(sample_rate: f32) -> Self {
        let mut filter = Self {
            channels: [LadderState::default(); MAX_CHANNELS],
            sample_rate,
            cutoff_hz: 1000.0,
            resonance: 0.0,
            drive: MIN_DRIVE,
            mode: FilterMode::Lowpass12,
            g: 0.0,
            k: 0.0,
            taps: FilterMode::Lowpass12.taps(),
            compensation: FilterMode::Lowpass12.compensation(),
        };
        filter.update_cutoff();
        filter
    }

    /// New sample rate: recompute the pole and clear history.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_cutoff();
        self.reset();
    }

    /// Switch response. Stage history is kept.
    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
        self.taps = mode.taps();
        self.compensation = mode.compensation();
    }

    pub fn set_cutoff_hz(&mut self, cutoff_hz: f32) {
        let cutoff_hz = if cutoff_hz.is_nan() { MIN_CUTOFF_HZ } else { cutoff_hz };
        self.cutoff_hz = cutoff_hz.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ);
        self.update_cutoff();
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        let resonance = if resonance.is_nan() { 0.0 } else { resonance };
        self.resonance = resonance.clamp(0.0, 1.0);
        self.k = 4.0 * self.resonance;
    }

    pub fn set_drive(&mut self, drive: f32) {
        let drive = if drive.is_nan() { MIN_DRIVE } else { drive };
        self.drive = drive.clamp(MIN_DRIVE, MAX_DRIVE);
    }

    #[inline]
    fn update_cutoff(&mut self) {
        self.g = 1.0 - (-TAU * self.cutoff_hz / self.sample_rate).exp();
    }

    pub fn reset(&mut self) {
        self.channels = [LadderState::default(); MAX_CHANNELS];
    }

    /// Filter one sample of `channel`.
    #[inline]
    pub fn next_sample(&mut self, channel: usize, input: f32) -> f32 {
        let g = self.g;
        let k = self.k;
        let taps = self.taps;
        let driven = input * self.drive;
        let compensation = self.compensation;
        let s = &mut self.channels[channel].stages;

        let x0 = (driven - k * (s[3] - compensation * driven)).tanh();

        s[0] = flush_denormal(s[0] + g * (x0 - s[0]));
        s[1] = flush_denormal(s[1] + g * (s[0].tanh() - s[1]));
        s[2] = flush_denormal(s[2] + g * (s[1].tanh() - s[2]));
        s[3] = flush_denormal(s[3] + g * (s[2].tanh() - s[3]));

        taps[0] * x0 + taps[1] * s[0] + taps[2] * s[1] + taps[3] * s[2] + taps[4] * s[3]
    }

    /// Filter one channel slice in place.
    pub fn render(&mut self, channel: usize, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(channel, *sample);
        }
    }

    /// Filter every channel of `buffer` in place, each with its own history.
    pub fn process(&mut self, buffer: &mut AudioBuffer) {
        let channels = buffer.num_channels().min(MAX_CHANNELS);
        for channel in 0..channels {
            self.render(channel, buffer.channel_mut(channel));
        }
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    pub fn drive(&self) -> f32 {
        self.drive
    }
}
