//! scout-searcher — match clients to the scheduler clusters that suit them best.
//!
//! Given candidate clusters and a client's IP, hostname, and conditions,
//! the searcher:
//!
//! - Filters out clusters the client may not use (no active schedulers,
//!   security domain mismatch)
//! - Scores each remaining cluster on five weighted affinities
//!   (security domain, CIDR, IDC, location, cluster type)
//! - Returns the clusters ordered from best to worst match
//!
//! # Architecture
//!
//! ```text
//! Searcher (trait, chosen once at startup)
//!   ├── DefaultSearcher
//!   │     ├── filter   (eligibility rules)
//!   │     ├── scorer   (weighted sub-scores, CidrIndex)
//!   │     └── ranker   (descending score, stable)
//!   └── plugin         (searcher-plugin.toml → StrategyRegistry)
//! ```

pub mod cidr;
pub mod error;
pub mod filter;
pub mod plugin;
pub mod ranker;
pub mod scorer;
pub mod searcher;

pub use cidr::CidrIndex;
pub use error::{CidrError, PluginError, PluginResult, SearchError, SearchResult, WeightsError};
pub use filter::filter_scheduler_clusters;
pub use plugin::{PLUGIN_MANIFEST, PluginManifest, StrategyRegistry, load_plugin};
pub use ranker::{RankedCluster, rank_by, rank_scheduler_clusters};
pub use scorer::{ScoreBreakdown, ScoringWeights, evaluate, score_breakdown};
pub use searcher::{DefaultSearcher, Searcher, global, install_global, new};
