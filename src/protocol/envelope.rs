//! Wire envelope and line codec.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Protocol version sent with every request.
pub const PROTOCOL_VERSION: &str = "2.0.0";

/// `{"version": "2.0.0", "request": <payload>}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub version: String,
    pub request: T,
}

impl<T> Envelope<T> {
    /// Wrap a payload with the current protocol version.
    pub fn new(request: T) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            request,
        }
    }
}

/// Serialize `request` inside an envelope as one newline-terminated line.
pub fn encode_request<T: Serialize>(request: &T) -> Result<Vec<u8>> {
    let mut line = serde_json::to_vec(&Envelope::new(request))?;
    line.push(b'\n');
    Ok(line)
}

/// Decode one reply line into an opaque JSON value.
///
/// # Errors
///
/// - [`Error::InvalidUtf8`] if the line is not UTF-8
/// - [`Error::JsonParse`] if it is not a single JSON document (an empty line included)
pub fn decode_response(line: &[u8]) -> Result<Value> {
    let text = std::str::from_utf8(line).map_err(Error::InvalidUtf8)?;
    serde_json::from_str(text).map_err(|e| Error::json_parse(e, text.trim_end()))
}
