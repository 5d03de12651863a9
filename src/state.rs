//! Parameter state persistence.
//!
//! The state is a small JSON document holding a format version and the
//! parameter snapshot keyed by parameter id:
//!
//! ```json
//! { "version": 1, "parameters": { "filter_cutoff": 1000.0, "output": -6.0 } }
//! ```
//!
//! Loading parses the whole document before touching the store, so a
//! malformed blob leaves every parameter as it was.

use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SynthError},
    params::{ParameterStore, ParameterValues},
};

pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StateDocument {
    version: u32,
    parameters: ParameterValues,
}

/// Serialise the store's current values.
pub fn save_state(store: &ParameterStore) -> Result<Vec<u8>> {
    let document = StateDocument {
        version: STATE_VERSION,
        parameters: store.snapshot(),
    };
    serde_json::to_vec_pretty(&document).map_err(|e| SynthError::MalformedState(e.to_string()))
}

/// Restore the store from bytes produced by [`save_state`].
///
/// On a parse failure the store is untouched and `MalformedState` is returned.
pub fn load_state(store: &ParameterStore, bytes: &[u8]) -> Result<()> {
    let document: StateDocument = serde_json::from_slice(bytes).map_err(|e| {
        tracing::warn!(error = %e, "ignoring malformed parameter state");
        SynthError::MalformedState(e.to_string())
    })?;

    if document.version != STATE_VERSION {
        tracing::debug!(
            version = document.version,
            expected = STATE_VERSION,
            "loading parameter state from a different version"
        );
    }

    store.restore(&document.parameters);
    tracing::debug!(count = document.parameters.values.len(), "restored parameter state");
    Ok(())
}
