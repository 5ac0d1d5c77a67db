//! JSON encoding for persisted portal records.
//!
//! The storage layer stores every collection as a single JSON document;
//! these helpers are the only place that touches `serde_json` directly.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Error type for codec encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Input was not valid JSON or did not match the expected shape.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

/// Encodes a value as compact JSON.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the value cannot be serialized.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    serde_json::to_string(value).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a value from JSON text.
///
/// # Errors
///
/// Returns `CodecError::Deserialization` if the text is not JSON or does not
/// match `T`.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, CodecError> {
    serde_json::from_str(text).map_err(|e| CodecError::Deserialization(e.to_string()))
}
