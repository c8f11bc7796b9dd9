//! Error types for stores and for the API client.
//!
//! # Design
//! A missing record is not an error anywhere in this crate: lookups return
//! `Option`. `StoreError::Unavailable` covers every failure to reach the
//! backend or finish an operation on it, and is fatal to the request that hit
//! it. `StoreError::Codec` means bytes in the store do not decode as the
//! expected entity (or an entity failed to encode).

use thiserror::Error;

/// Boxed source error kept for the `source()` chain.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by [`KeyValueStore`](crate::KeyValueStore) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or failed mid-operation.
    #[error("store unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A record could not be encoded to or decoded from its stored form.
    #[error("codec error for {key}: {message}")]
    Codec { key: String, message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            source: None,
        }
    }

    pub fn unavailable_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Unavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn codec(key: impl Into<String>, message: impl ToString) -> Self {
        Self::Codec {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

/// Errors returned by `TodoClient` parse and build methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a status the operation does not expect.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}
