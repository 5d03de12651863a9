//! Parameter catalog and the lock-free store shared by UI and audio threads.
//!
//! Every parameter is an independent `f32` held as bits in an `AtomicU32`.
//! The control side writes (clamped to the declared range), the audio side
//! reads each value once per block. No two parameters are read as a unit, so
//! relaxed single-word loads and stores are all that is needed.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::ladder::FilterMode,
    error::{Result, SynthError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamId {
    FilterMode,
    FilterCutoff,
    FilterResonance,
    FilterDrive,
    ReverbRoomSize,
    ReverbDamping,
    ReverbWidth,
    ReverbFreeze,
    ReverbDry,
    ReverbWet,
    Output,
}

pub const PARAM_COUNT: usize = 11;

/// Static description of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub id: ParamId,
    /// Stable identifier used for persistence and host automation.
    pub key: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
    pub min: f32,
    pub max: f32,
    /// Snap interval; `None` for continuous parameters.
    pub step: Option<f32>,
    pub default: f32,
}

impl ParamSpec {
    /// Clamp to range and snap to the step, if any. NaN maps to the default.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        let value = value.clamp(self.min, self.max);
        match self.step {
            Some(step) => (self.min + ((value - self.min) / step).round() * step).min(self.max),
            None => value,
        }
    }

    /// Map a value into 0.0-1.0 across the range.
    pub fn normalise(&self, value: f32) -> f32 {
        (self.clamp(value) - self.min) / (self.max - self.min)
    }

    pub fn denormalise(&self, normalised: f32) -> f32 {
        self.clamp(self.min + normalised.clamp(0.0, 1.0) * (self.max - self.min))
    }
}

const fn spec(
    id: ParamId,
    key: &'static str,
    name: &'static str,
    unit: &'static str,
    min: f32,
    max: f32,
    default: f32,
) -> ParamSpec {
    ParamSpec {
        id,
        key,
        name,
        unit,
        min,
        max,
        step: None,
        default,
    }
}

/// The full catalog, in `ParamId` order.
pub const CATALOG: [ParamSpec; PARAM_COUNT] = [
    ParamSpec {
        step: Some(1.0),
        ..spec(ParamId::FilterMode, "filter_mode", "Filter Mode", "", 0.0, 3.0, 0.0)
    },
    spec(ParamId::FilterCutoff, "filter_cutoff", "Filter Cutoff", "Hz", 20.0, 20_000.0, 1_000.0),
    spec(ParamId::FilterResonance, "filter_resonance", "Filter Resonance", "%", 0.0, 100.0, 0.0),
    spec(ParamId::FilterDrive, "filter_drive", "Filter Drive", "%", 1.0, 10.0, 1.0),
    spec(ParamId::ReverbRoomSize, "reverb_room_size", "Reverb Room Size", "", 0.0, 1.0, 0.5),
    spec(ParamId::ReverbDamping, "reverb_damping", "Reverb Damping", "%", 0.0, 100.0, 0.0),
    spec(ParamId::ReverbWidth, "reverb_width", "Reverb Width", "%", 0.0, 100.0, 0.0),
    spec(ParamId::ReverbFreeze, "reverb_freeze", "Reverb Freeze", "", 0.0, 1.0, 0.0),
    spec(ParamId::ReverbDry, "reverb_dry", "Reverb Dry Level", "%", 0.0, 100.0, 100.0),
    spec(ParamId::ReverbWet, "reverb_wet", "Reverb Wet Level", "%", 0.0, 100.0, 50.0),
    spec(ParamId::Output, "output", "Output", "dB", -60.0, 0.0, -6.0),
];

impl ParamId {
    pub const ALL: [ParamId; PARAM_COUNT] = [
        ParamId::FilterMode,
        ParamId::FilterCutoff,
        ParamId::FilterResonance,
        ParamId::FilterDrive,
        ParamId::ReverbRoomSize,
        ParamId::ReverbDamping,
        ParamId::ReverbWidth,
        ParamId::ReverbFreeze,
        ParamId::ReverbDry,
        ParamId::ReverbWet,
        ParamId::Output,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> &'static ParamSpec {
        &CATALOG[self.index()]
    }

    pub fn key(self) -> &'static str {
        self.spec().key
    }

    pub fn from_key(key: &str) -> Option<Self> {
        CATALOG.iter().find(|s| s.key == key).map(|s| s.id)
    }
}

/// Plain copy of every parameter value, keyed by parameter key.
///
/// This is the opaque unit the host shell persists; see [`crate::state`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterValues {
    pub values: BTreeMap<String, f32>,
}

impl ParameterValues {
    pub fn get(&self, id: ParamId) -> Option<f32> {
        self.values.get(id.key()).copied()
    }

    pub fn insert(&mut self, id: ParamId, value: f32) {
        self.values.insert(id.key().to_string(), value);
    }
}

/// Lock-free parameter store, one atomic per catalog entry.
#[derive(Debug)]
pub struct ParameterStore {
    values: [AtomicU32; PARAM_COUNT],
}

impl ParameterStore {
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|i| AtomicU32::new(CATALOG[i].default.to_bits())),
        }
    }

    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.values[id.index()].load(Ordering::Relaxed))
    }

    /// Store `value` clamped to the parameter's range; returns what was stored.
    pub fn set(&self, id: ParamId, value: f32) -> f32 {
        let value = id.spec().clamp(value);
        self.values[id.index()].store(value.to_bits(), Ordering::Relaxed);
        value
    }

    pub fn set_by_key(&self, key: &str, value: f32) -> Result<f32> {
        let id = ParamId::from_key(key).ok_or_else(|| SynthError::UnknownParameter(key.to_string()))?;
        Ok(self.set(id, value))
    }

    pub fn get_normalised(&self, id: ParamId) -> f32 {
        id.spec().normalise(self.get(id))
    }

    pub fn set_normalised(&self, id: ParamId, normalised: f32) -> f32 {
        self.set(id, id.spec().denormalise(normalised))
    }

    pub fn filter_mode(&self) -> FilterMode {
        FilterMode::from_value(self.get(ParamId::FilterMode))
    }

    /// Human-readable value: the mode name for `filter_mode`, value and unit otherwise.
    pub fn display_text(&self, id: ParamId) -> String {
        let value = self.get(id);
        let spec = id.spec();
        match id {
            ParamId::FilterMode => self.filter_mode().name().to_string(),
            ParamId::ReverbFreeze => (if value >= 0.5 { "On" } else { "Off" }).to_string(),
            _ if spec.unit.is_empty() => format!("{value:.2}"),
            _ => format!("{value:.1} {}", spec.unit),
        }
    }

    /// Set from text entry. `filter_mode` accepts mode names (unknown names
    /// select mode 0); other parameters parse a leading number and ignore a
    /// trailing unit. Returns `None` if nothing numeric could be read.
    pub fn set_from_text(&self, id: ParamId, text: &str) -> Option<f32> {
        if id == ParamId::FilterMode {
            let mode = FilterMode::from_name(text);
            return Some(self.set(id, mode.index() as f32));
        }

        let number: String = text
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
            .collect();
        let value = number.parse::<f32>().ok()?;
        Some(self.set(id, value))
    }

    pub fn reset_to_defaults(&self) {
        for spec in &CATALOG {
            self.set(spec.id, spec.default);
        }
    }

    pub fn snapshot(&self) -> ParameterValues {
        let mut snapshot = ParameterValues::default();
        for id in ParamId::ALL {
            snapshot.insert(id, self.get(id));
        }
        snapshot
    }

    /// Restore from a snapshot. Values are clamped, unknown keys ignored and
    /// parameters missing from the snapshot keep their current value.
    pub fn restore(&self, snapshot: &ParameterValues) {
        for (key, &value) in &snapshot.values {
            match ParamId::from_key(key) {
                Some(id) => {
                    self.set(id, value);
                }
                None => tracing::debug!(%key, "ignoring unknown parameter in snapshot"),
            }
        }
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_in_id_order() {
        for (i, spec) in CATALOG.iter().enumerate() {
            assert_eq!(spec.id.index(), i);
            assert_eq!(ParamId::from_key(spec.key), Some(spec.id));
            assert!(spec.min <= spec.default && spec.default <= spec.max);
        }
    }

    #[test]
    fn test_defaults() {
        let store = ParameterStore::new();
        assert_eq!(store.get(ParamId::FilterCutoff), 1_000.0);
        assert_eq!(store.get(ParamId::ReverbWet), 50.0);
        assert_eq!(store.get(ParamId::Output), -6.0);
        assert_eq!(store.filter_mode(), FilterMode::Lowpass12);
    }

    #[test]
    fn test_writes_are_clamped() {
        let store = ParameterStore::new();
        assert_eq!(store.set(ParamId::FilterCutoff, 50_000.0), 20_000.0);
        assert_eq!(store.set(ParamId::Output, -100.0), -60.0);
        assert_eq!(store.set(ParamId::FilterDrive, f32::NAN), 1.0);
        assert_eq!(store.get(ParamId::FilterCutoff), 20_000.0);
    }

    #[test]
    fn test_filter_mode_snaps_to_steps() {
        let store = ParameterStore::new();
        assert_eq!(store.set(ParamId::FilterMode, 1.6), 2.0);
        assert_eq!(store.filter_mode(), FilterMode::Lowpass24);
        assert_eq!(store.set(ParamId::FilterMode, 7.0), 3.0);
    }

    #[test]
    fn test_set_by_unknown_key_is_an_error() {
        let store = ParameterStore::new();
        assert!(matches!(
            store.set_by_key("filter_q", 1.0),
            Err(SynthError::UnknownParameter(_))
        ));
        assert_eq!(store.set_by_key("reverb_width", 30.0).unwrap(), 30.0);
    }

    #[test]
    fn test_filter_mode_text_mapping() {
        let store = ParameterStore::new();
        for mode in FilterMode::ALL {
            store.set_from_text(ParamId::FilterMode, mode.name());
            assert_eq!(store.display_text(ParamId::FilterMode), mode.name());
        }

        store.set_from_text(ParamId::FilterMode, "Comb 6dB");
        assert_eq!(store.get(ParamId::FilterMode), 0.0);
    }

    #[test]
    fn test_numeric_text_entry() {
        let store = ParameterStore::new();
        assert_eq!(store.set_from_text(ParamId::FilterCutoff, "440 Hz"), Some(440.0));
        assert_eq!(store.set_from_text(ParamId::Output, "-12.5dB"), Some(-12.5));
        assert_eq!(store.set_from_text(ParamId::Output, "loud"), None);
        assert_eq!(store.get(ParamId::Output), -12.5);
    }

    #[test]
    fn test_normalised_access() {
        let store = ParameterStore::new();
        store.set_normalised(ParamId::ReverbDry, 0.25);
        assert_eq!(store.get(ParamId::ReverbDry), 25.0);
        assert_eq!(store.get_normalised(ParamId::ReverbDry), 0.25);
    }

    #[test]
    fn test_snapshot_restore() {
        let store = ParameterStore::new();
        store.set(ParamId::FilterResonance, 70.0);
        store.set(ParamId::ReverbFreeze, 1.0);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.values.len(), PARAM_COUNT);

        let other = ParameterStore::new();
        other.restore(&snapshot);
        for id in ParamId::ALL {
            assert_eq!(other.get(id), store.get(id));
        }
    }

    #[test]
    fn test_restore_clamps_and_skips_unknown() {
        let store = ParameterStore::new();
        store.set(ParamId::ReverbWet, 10.0);

        let mut snapshot = ParameterValues::default();
        snapshot.insert(ParamId::FilterCutoff, 1.0);
        snapshot.values.insert("chorus_rate".to_string(), 3.0);

        store.restore(&snapshot);
        assert_eq!(store.get(ParamId::FilterCutoff), 20.0);
        assert_eq!(store.get(ParamId::ReverbWet), 10.0);
    }
}
