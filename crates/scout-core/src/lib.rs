pub mod config;
pub mod error;
pub mod types;

pub use config::{LogConfig, LogFormat, ScoutConfig, SearcherConfig};
pub use error::ScopeDecodeError;
pub use types::*;
