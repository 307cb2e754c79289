use crate::error::{ErrorClass, ErrorOrigin, InternalError};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error as ThisError;

/// Max serialized bytes for a single blob (payload, bucket map, or ledger
/// cell) to keep cell loads bounded.
pub const MAX_BLOB_BYTES: usize = 1024 * 1024;

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(String),
    #[error("deserialize error: {0}")]
    Deserialize(String),
    #[error("blob exceeds max size: {len} bytes (limit {MAX_BLOB_BYTES})")]
    TooLarge { len: usize },
}

impl From<SerializeError> for InternalError {
    fn from(err: SerializeError) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Codec, err.to_string())
    }
}

/// Serialize a value into the JSON text stored in a backing cell.
pub fn serialize<T>(ty: &T) -> Result<String, SerializeError>
where
    T: Serialize,
{
    let text =
        serde_json::to_string(ty).map_err(|e| SerializeError::Serialize(e.to_string()))?;

    if text.len() > MAX_BLOB_BYTES {
        return Err(SerializeError::TooLarge { len: text.len() });
    }

    Ok(text)
}

/// Deserialize a value produced by [`serialize`].
///
/// Input size is bounded before decode.
pub fn deserialize<T>(text: &str) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    if text.len() > MAX_BLOB_BYTES {
        return Err(SerializeError::TooLarge { len: text.len() });
    }

    serde_json::from_str(text).map_err(|e| SerializeError::Deserialize(e.to_string()))
}

///
/// TESTS
///
