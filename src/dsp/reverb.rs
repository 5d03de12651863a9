//! Reverb - Room Simulation via Delay Networks
//!
//! A stereo Schroeder/Freeverb-style network: eight damped comb filters in
//! parallel feeding four allpass filters in series, one network per channel.
//! The right channel's delays are offset by a few samples so the two tails
//! decorrelate, and the width control cross-mixes the two wet signals.
//!
//! ```text
//!           ┌──→ [Comb 1..8] ──→ Σ ──→ [Allpass 1..4] ──→ wetL ─┐
//! L + R ──→ ┤                                                    ├─ width mix ─→ L/R
//!           └──→ [Comb 1..8]'──→ Σ ──→ [Allpass 1..4]'──→ wetR ─┘
//! ```
//!
//! ## Comb Filters
//!
//! ```text
//! y[n] = x[n - delay] ;  buf[n] = x[n] + feedback * lowpass(y[n])
//! ```
//!
//! The one-pole lowpass inside the feedback path is the damping control: high
//! frequencies lose energy on every trip round the loop.
//!
//! ## Freeze
//!
//! Frozen, the comb feedback is pinned to 1.0 and nothing new is written into
//! the network, so whatever is circulating keeps going. Damping and width still
//! apply; room size has no effect until the reverb is unfrozen.

use crate::{dsp::flush_denormal, io::AudioBuffer};

/// Max comb filter delay: 50ms at 192kHz = 9600 samples
const MAX_COMB_DELAY: usize = 9600;
/// Max allpass filter delay: the longest tuning plus spread, (556 + 23) at
/// 192kHz = 2521 samples, rounded up
const MAX_ALLPASS_DELAY: usize = 2560;

/// Comb delays in samples at the 44.1kHz reference rate (mutually prime).
const COMB_TUNINGS: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];
/// Allpass delays in samples at the 44.1kHz reference rate.
const ALLPASS_TUNINGS: [usize; 4] = [556, 441, 341, 225];
/// Extra delay on the right channel's network.
const STEREO_SPREAD: usize = 23;
const REFERENCE_RATE: f32 = 44_100.0;

/// Input attenuation ahead of the eight summed combs.
const INPUT_GAIN: f32 = 0.015;
/// Brings the attenuated wet network back up to roughly unity.
const WET_SCALE: f32 = 3.0;
const ROOM_SCALE: f32 = 0.28;
const ROOM_OFFSET: f32 = 0.7;
const DAMP_SCALE: f32 = 0.4;
const ALLPASS_FEEDBACK: f32 = 0.5;

fn scale_to_rate(samples: usize, sample_rate: f32) -> usize {
    ((samples as f32 * sample_rate / REFERENCE_RATE).round() as usize).max(1)
}

/// A damped comb filter for reverb (pre-allocated, RT-safe)
pub struct CombFilter {
    buffer: Box<[f32]>,
    delay_samples: usize,
    write_pos: usize,
    feedback: f32,
    damp: f32,
    filter_state: f32,
}

impl CombFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; MAX_COMB_DELAY].into_boxed_slice(),
            delay_samples: delay_samples.clamp(1, MAX_COMB_DELAY),
            write_pos: 0,
            feedback: 0.5,
            damp: 0.5,
            filter_state: 0.0,
        }
    }

    /// Feedback up to 1.0; 1.0 is only used while frozen.
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 1.0);
    }

    pub fn set_damp(&mut self, damp: f32) {
        self.damp = damp.clamp(0.0, 1.0);
    }

    /// Set delay length (RT-safe, no allocation)
    pub fn set_delay(&mut self, delay_samples: usize) {
        self.delay_samples = delay_samples.clamp(1, MAX_COMB_DELAY);
        self.write_pos %= self.delay_samples;
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.write_pos];

        // One-pole lowpass filter for damping (absorbs high frequencies)
        self.filter_state =
            flush_denormal(output * (1.0 - self.damp) + self.filter_state * self.damp);

        self.buffer[self.write_pos] = flush_denormal(input + self.filter_state * self.feedback);
        self.write_pos = (self.write_pos + 1) % self.delay_samples;

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.filter_state = 0.0;
        self.write_pos = 0;
    }
}

/// An allpass filter for reverb diffusion (pre-allocated, RT-safe)
pub struct AllpassFilter {
    buffer: Box<[f32]>,
    delay_samples: usize,
    write_pos: usize,
    feedback: f32,
}

impl AllpassFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; MAX_ALLPASS_DELAY].into_boxed_slice(),
            delay_samples: delay_samples.clamp(1, MAX_ALLPASS_DELAY),
            write_pos: 0,
            feedback: ALLPASS_FEEDBACK,
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.9);
    }

    pub fn set_delay(&mut self, delay_samples: usize) {
        self.delay_samples = delay_samples.clamp(1, MAX_ALLPASS_DELAY);
        self.write_pos %= self.delay_samples;
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.write_pos];

        // Allpass: output = -g*input + delayed + g*delayed_output
        let output = -self.feedback * input + delayed;
        self.buffer[self.write_pos] = flush_denormal(input + self.feedback * output);
        self.write_pos = (self.write_pos + 1) % self.delay_samples;

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

/// User-facing reverb settings, all in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParameters {
    pub room_size: f32,
    pub damping: f32,
    pub width: f32,
    /// Treated as on at 0.5 and above.
    pub freeze: f32,
    pub dry_level: f32,
    pub wet_level: f32,
}

impl Default for ReverbParameters {
    fn default() -> Self {
        Self {
            room_size: 0.5,
            damping: 0.5,
            width: 1.0,
            freeze: 0.0,
            dry_level: 0.4,
            wet_level: 0.33,
        }
    }
}

impl ReverbParameters {
    pub fn is_frozen(&self) -> bool {
        self.freeze >= 0.5
    }

    fn clamped(self) -> Self {
        let unit = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self {
            room_size: unit(self.room_size),
            damping: unit(self.damping),
            width: unit(self.width),
            freeze: unit(self.freeze),
            dry_level: unit(self.dry_level),
            wet_level: unit(self.wet_level),
        }
    }
}

/// One channel's comb/allpass network.
struct ReverbChannel {
    combs: [CombFilter; 8],
    allpasses: [AllpassFilter; 4],
}

impl ReverbChannel {
    fn new(sample_rate: f32, spread: usize) -> Self {
        Self {
            combs: std::array::from_fn(|i| {
                CombFilter::new(scale_to_rate(COMB_TUNINGS[i] + spread, sample_rate))
            }),
            allpasses: std::array::from_fn(|i| {
                AllpassFilter::new(scale_to_rate(ALLPASS_TUNINGS[i] + spread, sample_rate))
            }),
        }
    }

    fn configure(&mut self, sample_rate: f32, spread: usize) {
        for (comb, &tuning) in self.combs.iter_mut().zip(COMB_TUNINGS.iter()) {
            comb.set_delay(scale_to_rate(tuning + spread, sample_rate));
        }
        for (allpass, &tuning) in self.allpasses.iter_mut().zip(ALLPASS_TUNINGS.iter()) {
            allpass.set_delay(scale_to_rate(tuning + spread, sample_rate));
        }
    }

    fn set_comb_params(&mut self, feedback: f32, damp: f32) {
        for comb in &mut self.combs {
            comb.set_feedback(feedback);
            comb.set_damp(damp);
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let mut output = 0.0;
        for comb in &mut self.combs {
            output += comb.process(input);
        }
        for allpass in &mut self.allpasses {
            output = allpass.process(output);
        }
        output
    }

    fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.reset();
        }
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
    }
}

/// Stereo algorithmic reverb with width, freeze and dry/wet mix.
pub struct Reverb {
    left: ReverbChannel,
    right: ReverbChannel,
    params: ReverbParameters,

    // Derived gains
    input_gain: f32,
    wet1: f32,
    wet2: f32,
    dry: f32,
}

impl Reverb {
    pub fn new(sample_rate: f32) -> Self {
        let mut reverb = Self {
            left: ReverbChannel::new(sample_rate, 0),
            right: ReverbChannel::new(sample_rate, STEREO_SPREAD),
            params: ReverbParameters::default(),
            input_gain: INPUT_GAIN,
            wet1: 0.0,
            wet2: 0.0,
            dry: 0.0,
        };
        reverb.set_parameters(ReverbParameters::default());
        reverb
    }

    /// Re-tune delay lengths for a new sample rate and clear the tails.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.left.configure(sample_rate, 0);
        self.right.configure(sample_rate, STEREO_SPREAD);
        self.reset();
    }

    /// Apply settings; out-of-range values are clamped.
    pub fn set_parameters(&mut self, params: ReverbParameters) {
        let params = params.clamped();
        self.params = params;

        let wet = params.wet_level * WET_SCALE;
        self.wet1 = 0.5 * wet * (1.0 + params.width);
        self.wet2 = 0.5 * wet * (1.0 - params.width);
        self.dry = params.dry_level;

        let damp = params.damping * DAMP_SCALE;
        let (feedback, input_gain) = if params.is_frozen() {
            (1.0, 0.0)
        } else {
            (params.room_size * ROOM_SCALE + ROOM_OFFSET, INPUT_GAIN)
        };
        self.input_gain = input_gain;
        self.left.set_comb_params(feedback, damp);
        self.right.set_comb_params(feedback, damp);
    }

    pub fn parameters(&self) -> ReverbParameters {
        self.params
    }

    /// Process one stereo frame.
    #[inline]
    pub fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let input = (left + right) * self.input_gain;
        let wet_l = self.left.process(input);
        let wet_r = self.right.process(input);

        (
            wet_l * self.wet1 + wet_r * self.wet2 + left * self.dry,
            wet_r * self.wet1 + wet_l * self.wet2 + right * self.dry,
        )
    }

    /// Process one mono sample through the left network.
    #[inline]
    pub fn process_mono(&mut self, sample: f32) -> f32 {
        let wet = self.left.process(sample * self.input_gain);
        wet * self.wet1 + sample * self.dry
    }

    /// Reverb `buffer` in place. Stereo uses the first two channels; a mono
    /// buffer runs through the left network only.
    pub fn process(&mut self, buffer: &mut AudioBuffer) {
        if let Some((left, right)) = buffer.stereo_mut() {
            for (l, r) in left.iter_mut().zip(right.iter_mut()) {
                (*l, *r) = self.process_stereo(*l, *r);
            }
        } else if buffer.num_channels() == 1 {
            for sample in buffer.channel_mut(0) {
                *sample = self.process_mono(*sample);
            }
        }
    }

    /// Reset all delay lines
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}
