//! Cluster ranking — orders eligible clusters from best to worst match.
//!
//! Each cluster is scored exactly once per ranking call, so its scopes are
//! decoded and its CIDR index built once rather than per comparison.

use std::cmp::Ordering;

use scout_core::{Conditions, SchedulerCluster, ScopeDecodeError, Scopes};
use tracing::{debug, error};

use crate::cidr::CidrIndex;
use crate::scorer::{ScoreBreakdown, ScoringWeights, score_with_index};

/// A cluster with the score it was ranked by.
#[derive(Debug, Clone)]
pub struct RankedCluster {
    pub cluster: SchedulerCluster,
    /// `None` when the cluster's scopes could not be decoded.
    pub breakdown: Option<ScoreBreakdown>,
}

impl RankedCluster {
    pub fn score(&self) -> Option<f64> {
        self.breakdown.map(|b| b.total)
    }
}

/// Score every cluster with `score` and sort descending.
///
/// The sort is stable: equal scores keep their input order. Clusters that
/// fail to score are logged, kept, and placed after every scored cluster.
pub fn rank_by<F>(clusters: Vec<SchedulerCluster>, mut score: F) -> Vec<RankedCluster>
where
    F: FnMut(&SchedulerCluster) -> Result<ScoreBreakdown, ScopeDecodeError>,
{
    let mut ranked: Vec<RankedCluster> = clusters
        .into_iter()
        .map(|cluster| {
            let breakdown = match score(&cluster) {
                Ok(breakdown) => Some(breakdown),
                Err(err) => {
                    error!(cluster = %cluster.name, error = %err, "cluster decode scopes failed");
                    None
                }
            };
            RankedCluster { cluster, breakdown }
        })
        .collect();

    ranked.sort_by(|a, b| compare_scores(a.score(), b.score()));
    ranked
}

/// Rank clusters with the built-in affinity scorer.
pub fn rank_scheduler_clusters(
    clusters: Vec<SchedulerCluster>,
    ip: &str,
    hostname: &str,
    conditions: &Conditions,
    weights: &ScoringWeights,
) -> Vec<RankedCluster> {
    rank_by(clusters, |cluster| {
        let scopes = Scopes::decode(&cluster.scopes)?;
        let cidrs = CidrIndex::build(&scopes.cidrs);
        let breakdown = score_with_index(ip, conditions, &scopes, &cidrs, cluster, weights);
        debug!(
            cluster = %cluster.name,
            hostname,
            score = breakdown.total,
            "evaluated scheduler cluster"
        );
        Ok(breakdown)
    })
}

/// Descending by score; unscored clusters sort last and tie with each other.
fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
