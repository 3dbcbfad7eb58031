//! Error types for Scout core records.

use thiserror::Error;

/// A cluster's untyped scopes could not be decoded into [`Scopes`](crate::Scopes).
#[derive(Debug, Error)]
#[error("decode scopes failed: {0}")]
pub struct ScopeDecodeError(#[from] pub serde_json::Error);
