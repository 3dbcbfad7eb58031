//! The searcher contract and its built-in implementation.
//!
//! One searcher is chosen at startup: a plugin if one loads, otherwise
//! [`DefaultSearcher`]. It stays fixed for the life of the process.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use scout_core::{Conditions, SchedulerCluster};
use tracing::{info, warn};

use crate::error::{SearchError, SearchResult};
use crate::filter::filter_scheduler_clusters;
use crate::plugin::{StrategyRegistry, load_plugin};
use crate::ranker::{RankedCluster, rank_scheduler_clusters};
use crate::scorer::ScoringWeights;

/// Finds the scheduler clusters that best match a client.
pub trait Searcher: Send + Sync {
    /// Eligible clusters ordered from best to worst match.
    ///
    /// Fails with [`SearchError::EmptyInput`] when `clusters` is empty and
    /// [`SearchError::NoMatch`] when no cluster survives filtering.
    fn find_scheduler_clusters(
        &self,
        clusters: &[SchedulerCluster],
        ip: &str,
        hostname: &str,
        conditions: &Conditions,
    ) -> SearchResult<Vec<SchedulerCluster>>;

    /// Like [`find_scheduler_clusters`](Self::find_scheduler_clusters), with
    /// scores where the implementation can explain them.
    fn explain(
        &self,
        clusters: &[SchedulerCluster],
        ip: &str,
        hostname: &str,
        conditions: &Conditions,
    ) -> SearchResult<Vec<RankedCluster>> {
        let found = self.find_scheduler_clusters(clusters, ip, hostname, conditions)?;
        Ok(found
            .into_iter()
            .map(|cluster| RankedCluster {
                cluster,
                breakdown: None,
            })
            .collect())
    }
}

/// Filter, score with a weight table, and rank.
#[derive(Debug, Clone, Default)]
pub struct DefaultSearcher {
    weights: ScoringWeights,
}

impl DefaultSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }
}

impl Searcher for DefaultSearcher {
    fn find_scheduler_clusters(
        &self,
        clusters: &[SchedulerCluster],
        ip: &str,
        hostname: &str,
        conditions: &Conditions,
    ) -> SearchResult<Vec<SchedulerCluster>> {
        let ranked = self.explain(clusters, ip, hostname, conditions)?;
        Ok(ranked.into_iter().map(|r| r.cluster).collect())
    }

    fn explain(
        &self,
        clusters: &[SchedulerCluster],
        ip: &str,
        hostname: &str,
        conditions: &Conditions,
    ) -> SearchResult<Vec<RankedCluster>> {
        if clusters.is_empty() {
            return Err(SearchError::EmptyInput);
        }

        let eligible = filter_scheduler_clusters(conditions, clusters);
        if eligible.is_empty() {
            return Err(SearchError::NoMatch {
                conditions: conditions.clone(),
            });
        }

        Ok(rank_scheduler_clusters(
            eligible,
            ip,
            hostname,
            conditions,
            &self.weights,
        ))
    }
}

/// Pick the searcher for this process.
///
/// Loads the plugin in `plugin_dir` when given; any failure is logged and
/// the built-in searcher is used instead.
pub fn new(plugin_dir: Option<&Path>, registry: &StrategyRegistry) -> Arc<dyn Searcher> {
    let Some(dir) = plugin_dir else {
        info!("use default searcher");
        return Arc::new(DefaultSearcher::new());
    };

    match load_plugin(dir, registry) {
        Ok(searcher) => {
            info!(dir = %dir.display(), "use searcher plugin");
            searcher
        }
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "load searcher plugin failed");
            info!("use default searcher");
            Arc::new(DefaultSearcher::new())
        }
    }
}

static GLOBAL: OnceLock<Arc<dyn Searcher>> = OnceLock::new();

/// Install the process-wide searcher. Fails if one is already installed,
/// handing the rejected searcher back.
pub fn install_global(searcher: Arc<dyn Searcher>) -> Result<(), Arc<dyn Searcher>> {
    GLOBAL.set(searcher)
}

/// The process-wide searcher, installing [`DefaultSearcher`] if none was set.
pub fn global() -> Arc<dyn Searcher> {
    GLOBAL
        .get_or_init(|| Arc::new(DefaultSearcher::new()))
        .clone()
}
