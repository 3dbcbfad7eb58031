//! Searcher error types.

use std::path::PathBuf;

use scout_core::Conditions;
use thiserror::Error;

/// Request-level failures returned to callers of a searcher.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("empty scheduler clusters")]
    EmptyInput,

    #[error("conditions {conditions:?} does not match any scheduler cluster")]
    NoMatch { conditions: Conditions },
}

pub type SearchResult<T> = Result<T, SearchError>;

/// An unparsable CIDR entry in a cluster's scopes.
#[derive(Debug, Error)]
#[error("invalid CIDR {cidr:?}: {source}")]
pub struct CidrError {
    pub cidr: String,
    #[source]
    pub source: ipnet::AddrParseError,
}

/// A weight table that cannot keep combined scores within `[0, 1]`.
#[derive(Debug, Error, PartialEq)]
pub enum WeightsError {
    #[error("weight {name} = {value} is outside [0, 1]")]
    OutOfRange { name: &'static str, value: f64 },

    #[error("weights sum to {0}, expected 1.0")]
    Sum(f64),
}

/// Failures while loading an alternate searcher at startup.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("plugin manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    #[error("failed to read plugin manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse plugin manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown searcher strategy: {0}")]
    UnknownStrategy(String),

    #[error("searcher strategy {0} requires [weights]")]
    MissingWeights(String),

    #[error("invalid weights: {0}")]
    InvalidWeights(#[from] WeightsError),
}

pub type PluginResult<T> = Result<T, PluginError>;
