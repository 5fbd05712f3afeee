//! Session encoding
//!
//! Sessions are stored as self-describing JSON:
//!
//! ```json
//! {
//!   "start": "2024-03-09T14:05:00.123456Z",
//!   "frames": [
//!     { "time": 0.016,
//!       "transforms": {
//!         "head": { "translation": [0.0, 1.6, 0.0], "rotation": [0.0, 0.0, 0.0, 1.0] }
//!       } }
//!   ]
//! }
//! ```
//!
//! Targets are keyed by their canonical tag, never by index. Unknown fields
//! are ignored; unknown target tags make the payload corrupt.

use super::types::Session;
use crate::error::{AnchorError, Result};

/// Encode a session as compact JSON
pub fn encode(session: &Session) -> Result<Vec<u8>> {
    check_finite(session)?;
    serde_json::to_vec(session).map_err(|e| AnchorError::Serialization(e.to_string()))
}

/// Encode a session as indented JSON
pub fn encode_pretty(session: &Session) -> Result<Vec<u8>> {
    check_finite(session)?;
    serde_json::to_vec_pretty(session).map_err(|e| AnchorError::Serialization(e.to_string()))
}

/// Decode a session; any malformed payload is [`AnchorError::DataCorrupt`]
pub fn decode(bytes: &[u8]) -> Result<Session> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(AnchorError::DataCorrupt("empty payload".to_string()));
    }
    serde_json::from_slice(bytes).map_err(|e| AnchorError::DataCorrupt(e.to_string()))
}

// JSON has no representation for NaN or infinity; serde_json would write
// `null` and the file could never be read back.
fn check_finite(session: &Session) -> Result<()> {
    for (index, frame) in session.frames.iter().enumerate() {
        if !frame.time.is_finite() {
            return Err(AnchorError::Serialization(format!(
                "frame {} has non-finite time {}",
                index, frame.time
            )));
        }
        if let Some((target, _)) = frame.transforms.iter().find(|(_, t)| !t.is_finite()) {
            return Err(AnchorError::Serialization(format!(
                "frame {} has a non-finite transform for {}",
                index, target
            )));
        }
    }
    Ok(())
}
