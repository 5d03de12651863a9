/// Equal-tempered MIDI note to frequency, A4 (note 69) = 440 Hz.
pub fn midi_note_to_freq(note: u8) -> f64 {
    440.0 * 2.0_f64.powf((note as f64 - 69.0) / 12.0)
}

/// Decibels to linear gain.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_pitches() {
        assert_relative_eq!(midi_note_to_freq(69), 440.0);
        assert_relative_eq!(midi_note_to_freq(81), 880.0, epsilon = 1e-9);
        assert_relative_eq!(midi_note_to_freq(60), 261.625_565, epsilon = 1e-5);
    }

    #[test]
    fn test_db_to_gain() {
        assert_relative_eq!(db_to_gain(0.0), 1.0);
        assert_relative_eq!(db_to_gain(-6.0), 0.501_187, epsilon = 1e-5);
        assert_relative_eq!(db_to_gain(-60.0), 0.001, epsilon = 1e-6);
    }
}
