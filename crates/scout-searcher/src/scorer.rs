//! Affinity scoring for scheduler clusters.
//!
//! Evaluates a cluster against a client using a weighted combination of:
//! - **Security domain**: the client declared a domain and the cluster has rules
//! - **CIDR**: the client IP falls inside one of the cluster's networks
//! - **IDC**: the client IDC equals the cluster IDC or one of its alternatives
//! - **Location**: the client and cluster paths share a coarse-to-fine prefix
//! - **Cluster type**: the cluster is the default fallback
//!
//! Every sub-score lies in `[0, 1]`; with weights summing to 1.0 the total
//! does too.

use scout_core::{
    AFFINITY_SEPARATOR, CONDITION_IDC, CONDITION_LOCATION, CONDITION_SECURITY_DOMAIN,
    Conditions, SchedulerCluster, Scopes, SecurityRule, condition,
};
use serde::{Deserialize, Serialize};

use crate::cidr::CidrIndex;
use crate::error::WeightsError;
use crate::filter::equal_fold;

const MAX_SCORE: f64 = 1.0;
const MIN_SCORE: f64 = 0.0;

/// Location paths are compared on at most this many elements.
const MAX_ELEMENT_LEN: usize = 5;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weights for the scoring components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub security_domain: f64,
    pub cidr: f64,
    pub idc: f64,
    pub location: f64,
    pub cluster_type: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            security_domain: 0.4,
            cidr: 0.3,
            idc: 0.15,
            location: 0.1,
            cluster_type: 0.05,
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.security_domain + self.cidr + self.idc + self.location + self.cluster_type
    }

    /// Check every weight lies in `[0, 1]` and the table sums to 1.0.
    pub fn validate(&self) -> Result<(), WeightsError> {
        let named = [
            ("security_domain", self.security_domain),
            ("cidr", self.cidr),
            ("idc", self.idc),
            ("location", self.location),
            ("cluster_type", self.cluster_type),
        ];
        for (name, value) in named {
            if !(0.0..=1.0).contains(&value) {
                return Err(WeightsError::OutOfRange { name, value });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightsError::Sum(sum));
        }
        Ok(())
    }
}

/// Individual score components for debugging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub security_domain: f64,
    pub cidr: f64,
    pub idc: f64,
    pub location: f64,
    pub cluster_type: f64,
    /// Weighted sum of the components above.
    pub total: f64,
}

/// Degree of matching between a cluster and a client, in `[0, 1]`.
pub fn evaluate(
    ip: &str,
    hostname: &str,
    conditions: &Conditions,
    scopes: &Scopes,
    cluster: &SchedulerCluster,
    weights: &ScoringWeights,
) -> f64 {
    score_breakdown(ip, hostname, conditions, scopes, cluster, weights).total
}

/// Score a cluster and keep every component.
///
/// `hostname` is part of the client identity but no current affinity uses it.
pub fn score_breakdown(
    ip: &str,
    _hostname: &str,
    conditions: &Conditions,
    scopes: &Scopes,
    cluster: &SchedulerCluster,
    weights: &ScoringWeights,
) -> ScoreBreakdown {
    let cidrs = CidrIndex::build(&scopes.cidrs);
    score_with_index(ip, conditions, scopes, &cidrs, cluster, weights)
}

/// Score using a prebuilt index of the cluster's CIDRs.
pub(crate) fn score_with_index(
    ip: &str,
    conditions: &Conditions,
    scopes: &Scopes,
    cidrs: &CidrIndex,
    cluster: &SchedulerCluster,
    weights: &ScoringWeights,
) -> ScoreBreakdown {
    let security_domain = security_domain_affinity_score(
        condition(conditions, CONDITION_SECURITY_DOMAIN),
        cluster.security_rules(),
    );
    let cidr = cidr_affinity_score(ip, cidrs);
    let idc = idc_affinity_score(condition(conditions, CONDITION_IDC), &scopes.idc);
    let location =
        multi_element_affinity_score(condition(conditions, CONDITION_LOCATION), &scopes.location);
    let cluster_type = cluster_type_score(cluster);

    // Rounding can push a full match a hair past 1.0.
    let total = (weights.security_domain * security_domain
        + weights.cidr * cidr
        + weights.idc * idc
        + weights.location * location
        + weights.cluster_type * cluster_type)
        .clamp(MIN_SCORE, MAX_SCORE);

    ScoreBreakdown {
        security_domain,
        cidr,
        idc,
        location,
        cluster_type,
        total,
    }
}

/// 1.0 when the client declared a security domain and the cluster has rules.
///
/// Whether the domain actually matched was settled by the filter, so this
/// rewards clusters where a security check applied at all.
pub fn security_domain_affinity_score(security_domain: &str, rules: &[SecurityRule]) -> f64 {
    if security_domain.is_empty() || rules.is_empty() {
        return MIN_SCORE;
    }
    MAX_SCORE
}

/// 1.0 when `ip` lies inside one of the indexed networks.
pub fn cidr_affinity_score(ip: &str, cidrs: &CidrIndex) -> f64 {
    if cidrs.contains_str(ip) {
        MAX_SCORE
    } else {
        MIN_SCORE
    }
}

/// 1.0 when the client IDC matches the cluster IDC or one of its `|` alternatives.
pub fn idc_affinity_score(dst: &str, src: &str) -> f64 {
    if dst.is_empty() || src.is_empty() {
        return MIN_SCORE;
    }

    if equal_fold(dst, src) {
        return MAX_SCORE;
    }

    if src
        .split(AFFINITY_SEPARATOR)
        .any(|element| equal_fold(dst, element))
    {
        return MAX_SCORE;
    }

    MIN_SCORE
}

/// Length of the matching `|`-separated prefix, out of five elements.
///
/// A mismatch at a coarse element stops the count, so finer agreement
/// below it is ignored.
pub fn multi_element_affinity_score(dst: &str, src: &str) -> f64 {
    if dst.is_empty() || src.is_empty() {
        return MIN_SCORE;
    }

    if equal_fold(dst, src) {
        return MAX_SCORE;
    }

    let matched = dst
        .split(AFFINITY_SEPARATOR)
        .zip(src.split(AFFINITY_SEPARATOR))
        .take(MAX_ELEMENT_LEN)
        .take_while(|(d, s)| equal_fold(d, s))
        .count();

    matched as f64 / MAX_ELEMENT_LEN as f64
}

/// 1.0 for the default cluster.
pub fn cluster_type_score(cluster: &SchedulerCluster) -> f64 {
    if cluster.is_default {
        MAX_SCORE
    } else {
        MIN_SCORE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::SecurityGroup;

    fn rule(domain: &str) -> SecurityRule {
        SecurityRule {
            domain: domain.to_string(),
            ..Default::default()
        }
    }

    fn conditions(pairs: &[(&str, &str)]) -> Conditions {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn default_weights_are_valid() {
        let weights = ScoringWeights::default();
        assert_close(weights.sum(), 1.0);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_weights() {
        let weights = ScoringWeights {
            cidr: 0.5,
            ..Default::default()
        };
        assert!(matches!(weights.validate(), Err(WeightsError::Sum(_))));

        let weights = ScoringWeights {
            security_domain: 1.2,
            cidr: -0.2,
            ..Default::default()
        };
        assert_eq!(
            weights.validate(),
            Err(WeightsError::OutOfRange {
                name: "security_domain",
                value: 1.2
            })
        );

        let weights = ScoringWeights {
            idc: f64::NAN,
            ..Default::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn security_domain_rewards_applicable_check() {
        assert_eq!(security_domain_affinity_score("", &[rule("a")]), 0.0);
        assert_eq!(security_domain_affinity_score("a", &[]), 0.0);
        assert_eq!(security_domain_affinity_score("a", &[rule("a")]), 1.0);
    }

    #[test]
    fn security_domain_score_ignores_match_result() {
        // The filter already rejected mismatches; a differing rule still scores.
        assert_eq!(security_domain_affinity_score("a", &[rule("b")]), 1.0);
    }

    #[test]
    fn cidr_score() {
        let index = CidrIndex::build(["10.0.0.0/24", "bad/cidr"]);
        assert_eq!(cidr_affinity_score("10.0.0.5", &index), 1.0);
        assert_eq!(cidr_affinity_score("10.0.1.5", &index), 0.0);
        assert_eq!(cidr_affinity_score("not-an-ip", &index), 0.0);
    }

    #[test]
    fn idc_score() {
        assert_eq!(idc_affinity_score("", "x"), 0.0);
        assert_eq!(idc_affinity_score("x", ""), 0.0);
        assert_eq!(idc_affinity_score("X", "x"), 1.0);
        assert_eq!(idc_affinity_score("x", "x|y|z"), 1.0);
        assert_eq!(idc_affinity_score("Z", "x|y|z"), 1.0);
        assert_eq!(idc_affinity_score("w", "x|y|z"), 0.0);
    }

    #[test]
    fn location_score_counts_prefix_run() {
        assert_close(multi_element_affinity_score("r1|z1|rack1", "r1|z1|rack2"), 0.4);
        assert_close(multi_element_affinity_score("r1|z1|rack1", "R1|Z1|RACK1"), 1.0);
        assert_close(multi_element_affinity_score("r1", "r1|z1"), 0.2);
        assert_eq!(multi_element_affinity_score("", "r1"), 0.0);
        assert_eq!(multi_element_affinity_score("r1", ""), 0.0);
    }

    #[test]
    fn location_score_stops_at_first_mismatch() {
        // Finer levels agree but the coarse level does not.
        assert_eq!(multi_element_affinity_score("r1|z1|rack1", "r2|z1|rack1"), 0.0);
        assert_close(multi_element_affinity_score("r1|z2|rack1", "r1|z1|rack1"), 0.2);
    }

    #[test]
    fn location_score_caps_at_five_elements() {
        let client = "a|b|c|d|e|f|g";
        let cluster = "a|b|c|d|e|f|x";
        assert_close(multi_element_affinity_score(client, cluster), 1.0);
    }

    #[test]
    fn cluster_type() {
        let mut cluster = SchedulerCluster::default();
        assert_eq!(cluster_type_score(&cluster), 0.0);
        cluster.is_default = true;
        assert_eq!(cluster_type_score(&cluster), 1.0);
    }

    #[test]
    fn evaluate_combines_weighted_components() {
        let cluster = SchedulerCluster {
            security_group: Some(SecurityGroup {
                security_rules: vec![rule("corp")],
                ..Default::default()
            }),
            ..Default::default()
        };
        let scopes = Scopes {
            idc: "x|y".to_string(),
            location: "r1|z1|rack1".to_string(),
            cidrs: vec!["10.0.0.0/24".to_string()],
        };
        let conds = conditions(&[
            (CONDITION_SECURITY_DOMAIN, "corp"),
            (CONDITION_IDC, "y"),
            (CONDITION_LOCATION, "r1|z1|rack9"),
        ]);

        let breakdown = score_breakdown(
            "10.0.0.9",
            "host-1",
            &conds,
            &scopes,
            &cluster,
            &ScoringWeights::default(),
        );
        assert_eq!(breakdown.security_domain, 1.0);
        assert_eq!(breakdown.cidr, 1.0);
        assert_eq!(breakdown.idc, 1.0);
        assert_close(breakdown.location, 0.4);
        assert_eq!(breakdown.cluster_type, 0.0);
        assert_close(breakdown.total, 0.4 + 0.3 + 0.15 + 0.04);
    }

    #[test]
    fn maximal_match_scores_one() {
        let cluster = SchedulerCluster {
            is_default: true,
            security_group: Some(SecurityGroup {
                security_rules: vec![rule("corp")],
                ..Default::default()
            }),
            ..Default::default()
        };
        let scopes = Scopes {
            idc: "x".to_string(),
            location: "r1|z1".to_string(),
            cidrs: vec!["0.0.0.0/0".to_string()],
        };
        let conds = conditions(&[
            (CONDITION_SECURITY_DOMAIN, "corp"),
            (CONDITION_IDC, "x"),
            (CONDITION_LOCATION, "r1|z1"),
        ]);

        let total = evaluate("1.2.3.4", "", &conds, &scopes, &cluster, &ScoringWeights::default());
        assert_close(total, 1.0);
    }

    #[test]
    fn scores_stay_within_unit_interval() {
        let clients = [
            conditions(&[]),
            conditions(&[(CONDITION_IDC, "x"), (CONDITION_LOCATION, "a|b|c|d|e|f")]),
            conditions(&[(CONDITION_SECURITY_DOMAIN, "s"), (CONDITION_LOCATION, "a")]),
        ];
        let scopes = [
            Scopes::default(),
            Scopes {
                idc: "x|y".to_string(),
                location: "a|b|c|d|e|f".to_string(),
                cidrs: vec!["10.0.0.0/8".to_string(), "garbage".to_string()],
            },
        ];
        let clusters = [
            SchedulerCluster::default(),
            SchedulerCluster {
                is_default: true,
                security_group: Some(SecurityGroup {
                    security_rules: vec![rule("s")],
                    ..Default::default()
                }),
                ..Default::default()
            },
        ];

        for conds in &clients {
            for scope in &scopes {
                for cluster in &clusters {
                    let b = score_breakdown(
                        "10.1.1.1",
                        "h",
                        conds,
                        scope,
                        cluster,
                        &ScoringWeights::default(),
                    );
                    for value in [b.security_domain, b.cidr, b.idc, b.location, b.cluster_type, b.total] {
                        assert!((0.0..=1.0).contains(&value), "score {value} out of range: {b:?}");
                    }
                }
            }
        }
    }
}
