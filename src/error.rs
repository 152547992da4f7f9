//! Centralized error handling for wirejson.
//!
//! Every failure the engine can report is a [`JsonError`]. The library never panics on
//! malformed input: structural problems, failed conversions and reflection failures are all
//! propagated through [`Result`].
//!
//! ## Error Categories
//!
//! - **Invalid Operation** ([`JsonError::InvalidOperation`]): the document is structurally
//!   broken (an object or array that never closes, a missing comma, an unterminated string) or
//!   the destination type cannot be materialized from the shape found in the input.
//! - **Conversion** ([`JsonError::Conversion`]): a literal token could not be coerced into the
//!   destination member's type.
//! - **Unsupported Map Key** ([`JsonError::UnsupportedMapKey`]): the writer met a map whose keys
//!   are not strings.
//! - **Depth Limit** ([`JsonError::DepthLimitExceeded`]): nesting went past the configured limit.
//! - **Reflection** ([`JsonError::Reflection`]): a member value could not be accessed.
//! - **I/O** ([`JsonError::Io`]): reading or writing a document on disk failed.
//!
//! Dates are the exception: an unparseable date token degrades to a sentinel value instead of
//! raising, see [`crate::date`].
//!
//! ## Structured Payloads
//!
//! The RPC layer sitting on top of this engine reports failures back to the caller as JSON.
//! [`JsonError::payload`] turns any error into an [`ErrorPayload`] that the engine can serialize
//! itself:
//!
//! ```rust
//! use wirejson::{Json, JsonError};
//!
//! let err = Json::new().deserialize::<Vec<u32>>("[1, 2").unwrap_err();
//! let body = Json::new().serialize(&err.payload())?;
//! assert!(body.starts_with(r#"{"error":"#));
//! assert!(body.ends_with(r#""kind":"InvalidOperation"}"#));
//! # Ok::<(), JsonError>(())
//! ```

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::Reflect;

/// A specialized `Result` type for wirejson operations.
pub type Result<T> = std::result::Result<T, JsonError>;

/// The master error enum covering all failure domains in wirejson.
///
/// This type is `Clone`; I/O errors are wrapped in an `Arc` so an error can be stored and
/// reported more than once.
#[derive(Debug, Clone, Error)]
pub enum JsonError {
    /// Low-level I/O failure while saving or loading a document.
    #[error("I/O error: {0}")]
    Io(#[source] Arc<io::Error>),

    /// A structural failure of the document, or a destination type that cannot hold the value
    /// found in the input.
    ///
    /// ## Common Causes
    ///
    /// - An object, array or string that never terminates
    /// - A missing `,` between two members
    /// - An array read into a type that is neither a fixed array, a collection nor a map
    /// - Characters left over after the document
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A literal token could not be converted into the destination type.
    #[error("cannot convert `{token}` into `{target}`")]
    Conversion {
        /// The token as found in the document (unescaped).
        token: String,
        /// Name of the destination type.
        target: &'static str,
    },

    /// The writer met a map whose keys do not classify as strings.
    #[error("map keys must be strings, found key of type `{0}`")]
    UnsupportedMapKey(&'static str),

    /// Nesting went deeper than the configured maximum.
    #[error("nesting depth exceeds the limit of {0}")]
    DepthLimitExceeded(usize),

    /// A member value could not be read from its owner.
    #[error("Reflection error: {0}")]
    Reflection(String),
}

impl JsonError {
    /// Creates an [`JsonError::InvalidOperation`].
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    /// Creates a [`JsonError::Conversion`] for `token` and the destination type `T`.
    pub fn conversion<T: ?Sized>(token: impl Into<String>) -> Self {
        Self::Conversion {
            token: token.into(),
            target: std::any::type_name::<T>(),
        }
    }

    /// Short, stable name of the variant. Used as the `kind` of an [`ErrorPayload`].
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "Io",
            Self::InvalidOperation(_) => "InvalidOperation",
            Self::Conversion { .. } => "Conversion",
            Self::UnsupportedMapKey(_) => "UnsupportedMapKey",
            Self::DepthLimitExceeded(_) => "DepthLimitExceeded",
            Self::Reflection(_) => "Reflection",
        }
    }

    /// Builds the structured payload reported to a remote caller.
    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            error: self.to_string(),
            kind: self.kind().to_string(),
        }
    }
}

impl From<io::Error> for JsonError {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

/// Error body returned to a remote caller: `{"error": "...", "kind": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Reflect)]
pub struct ErrorPayload {
    /// Human readable message.
    pub error: String,
    /// Variant name of the originating [`JsonError`].
    pub kind: String,
}
