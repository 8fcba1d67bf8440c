//! Tagged JSON message envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use queuedeck_core::error::AppError;
use queuedeck_core::result::AppResult;

/// A frame on the real-time channel: a JSON object with a mandatory
/// `type` discriminator and an open payload.
///
/// No schema versioning is assumed; consumers must ignore unknown `type`
/// values rather than treat them as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message discriminator, e.g. `"queue_updated"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Remaining payload fields.
    #[serde(flatten)]
    pub payload: serde_json::Map<String, Value>,
}

impl Envelope {
    /// Creates an envelope with an empty payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: serde_json::Map::new(),
        }
    }

    /// Adds a payload field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Looks up a payload field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Parses an inbound frame. Anything that is not a JSON object with a
    /// string `type` field is a malformed frame.
    pub fn parse(text: &str) -> AppResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| AppError::malformed_frame(format!("Unparseable frame: {e}")))
    }

    /// Serializes the envelope for the wire.
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
