//! Eligibility filter — drops clusters a client may not be routed to.

use scout_core::{CONDITION_SECURITY_DOMAIN, Conditions, SchedulerCluster, condition};
use tracing::debug;

/// Keep the clusters the client can use, preserving input order.
///
/// Rules, first match decides:
/// 1. no active schedulers → excluded
/// 2. client declares no security domain → included
/// 3. default cluster → included
/// 4. cluster has no security rules → included
/// 5. included iff a rule domain equals the client's domain (case-insensitive)
pub fn filter_scheduler_clusters(
    conditions: &Conditions,
    clusters: &[SchedulerCluster],
) -> Vec<SchedulerCluster> {
    let security_domain = condition(conditions, CONDITION_SECURITY_DOMAIN);

    clusters
        .iter()
        .filter(|cluster| {
            let eligible = is_eligible(security_domain, cluster);
            if !eligible {
                debug!(cluster = %cluster.name, security_domain, "scheduler cluster filtered out");
            }
            eligible
        })
        .cloned()
        .collect()
}

fn is_eligible(security_domain: &str, cluster: &SchedulerCluster) -> bool {
    if cluster.active_scheduler_count() == 0 {
        return false;
    }

    if security_domain.is_empty() || cluster.is_default {
        return true;
    }

    let rules = cluster.security_rules();
    rules.is_empty()
        || rules
            .iter()
            .any(|rule| equal_fold(&rule.domain, security_domain))
}

/// Case-insensitive string equality.
pub(crate) fn equal_fold(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::{Scheduler, SchedulerState, SecurityGroup, SecurityRule};

    fn make_cluster(name: &str, active: usize, domains: &[&str]) -> SchedulerCluster {
        SchedulerCluster {
            name: name.to_string(),
            schedulers: (0..active).map(|_| Scheduler::default()).collect(),
            security_group: (!domains.is_empty()).then(|| SecurityGroup {
                name: format!("{name}-sg"),
                security_rules: domains
                    .iter()
                    .map(|d| SecurityRule {
                        domain: d.to_string(),
                        ..Default::default()
                    })
                    .collect(),
            }),
            ..Default::default()
        }
    }

    fn with_domain(domain: &str) -> Conditions {
        let mut conditions = Conditions::new();
        conditions.insert(CONDITION_SECURITY_DOMAIN.to_string(), domain.to_string());
        conditions
    }

    fn names(clusters: &[SchedulerCluster]) -> Vec<&str> {
        clusters.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn excludes_clusters_without_active_schedulers() {
        let mut inactive = make_cluster("inactive", 1, &[]);
        inactive.schedulers[0].state = SchedulerState::Inactive;
        let mut empty_default = make_cluster("empty-default", 0, &[]);
        empty_default.is_default = true;

        let clusters = vec![make_cluster("ok", 1, &[]), inactive, empty_default];
        let result = filter_scheduler_clusters(&Conditions::new(), &clusters);
        assert_eq!(names(&result), ["ok"]);
    }

    #[test]
    fn no_security_domain_passes_all_active() {
        let clusters = vec![
            make_cluster("a", 1, &["A"]),
            make_cluster("b", 2, &["B"]),
            make_cluster("open", 1, &[]),
        ];
        let result = filter_scheduler_clusters(&Conditions::new(), &clusters);
        assert_eq!(names(&result), ["a", "b", "open"]);

        let result = filter_scheduler_clusters(&with_domain(""), &clusters);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn security_domain_must_match_rule() {
        let clusters = vec![make_cluster("a", 1, &["A"])];

        assert!(filter_scheduler_clusters(&with_domain("B"), &clusters).is_empty());
        assert_eq!(filter_scheduler_clusters(&with_domain("A"), &clusters).len(), 1);
        assert_eq!(filter_scheduler_clusters(&with_domain("a"), &clusters).len(), 1);
    }

    #[test]
    fn default_and_open_clusters_pass_any_domain() {
        let mut fallback = make_cluster("default", 1, &["X"]);
        fallback.is_default = true;
        let clusters = vec![fallback, make_cluster("open", 1, &[]), make_cluster("a", 1, &["A"])];

        let result = filter_scheduler_clusters(&with_domain("B"), &clusters);
        assert_eq!(names(&result), ["default", "open"]);
    }

    #[test]
    fn multiple_matching_rules_include_once() {
        let clusters = vec![make_cluster("a", 1, &["corp", "CORP", "other"])];
        let result = filter_scheduler_clusters(&with_domain("Corp"), &clusters);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn equal_fold_handles_unicode() {
        assert!(!equal_fold("Straße", "STRASSE"));
        assert!(equal_fold("ÀB", "àb"));
        assert!(equal_fold("idc-A", "IDC-a"));
        assert!(!equal_fold("idc-a", "idc-b"));
    }
}
