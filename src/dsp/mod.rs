//! Signal-processing stages applied to the mixed voice signal.
//!
//! These components are allocation-free once constructed and realtime-safe.
//! They hold only their own per-channel history and coefficients; the engine
//! decides when parameters change.

/// Four-pole saturating ladder filter with 12/24dB lowpass and highpass taps.
pub mod ladder;
/// Stereo comb/allpass reverb with width and freeze.
pub mod reverb;

pub use ladder::{FilterMode, LadderFilter};
pub use reverb::{Reverb, ReverbParameters};

/// Flush values too small to hear to zero before they become subnormal.
///
/// Recursive state (comb feedback, ladder poles) decays geometrically towards
/// zero and would otherwise spend its tail in the slow subnormal range.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 {
        0.0
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1e-25), 0.0);
        assert_eq!(flush_denormal(-1e-25), 0.0);
        assert_eq!(flush_denormal(f32::MIN_POSITIVE / 2.0), 0.0);
        assert_eq!(flush_denormal(1e-6), 1e-6);
        assert_eq!(flush_denormal(-0.5), -0.5);
    }
}
