//! Codec trait and implementation for serializing/deserializing bodies.
//!
//! The session pipeline doesn't care HOW bodies are encoded, it just needs
//! something implementing [`Codec`]. The backend speaks JSON, so
//! [`JsonCodec`] is the only implementation today.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust values to bytes and decode bytes back.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the result owns all
/// its data and doesn't borrow from the input buffer, so the response body
/// can be dropped right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Encodes to a UTF-8 string, for stores that only hold strings.
    fn encode_to_string<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<String, ProtocolError> {
        let bytes = self.encode(value)?;
        String::from_utf8(bytes).map_err(|e| {
            ProtocolError::Encode(serde::ser::Error::custom(e.to_string()))
        })
    }
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ```rust
/// use souk_protocol::{Codec, JsonCodec, ImageRef};
///
/// let codec = JsonCodec;
/// let image = ImageRef { url: "https://cdn.example.com/a.jpg".into() };
///
/// let bytes = codec.encode(&image).unwrap();
/// let decoded: ImageRef = codec.decode(&bytes).unwrap();
/// assert_eq!(image, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
