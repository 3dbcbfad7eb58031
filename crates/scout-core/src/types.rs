//! Domain types for scheduler cluster search.
//!
//! Cluster records are supplied by an external store and are read-only
//! here. All types round-trip through JSON so records can be loaded from
//! files or API payloads without an intermediate representation.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ScopeDecodeError;

/// Client conditions supplied per request (key → value).
pub type Conditions = HashMap<String, String>;

/// Condition key for the client's security domain.
pub const CONDITION_SECURITY_DOMAIN: &str = "security_domain";

/// Condition key for the client's IDC.
pub const CONDITION_IDC: &str = "idc";

/// Condition key for the client's hierarchical location.
pub const CONDITION_LOCATION: &str = "location";

/// Separator for multi-element affinity values such as `"r1|z1|rack1"`.
pub const AFFINITY_SEPARATOR: char = '|';

/// Look up a condition, treating a missing key as the empty string.
pub fn condition<'a>(conditions: &'a Conditions, key: &str) -> &'a str {
    conditions.get(key).map(String::as_str).unwrap_or_default()
}

// ── Scheduler cluster ──────────────────────────────────────────────

/// A deployable cluster of schedulers that clients can be routed to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchedulerCluster {
    pub id: u64,
    pub name: String,
    pub bio: String,
    /// Fallback cluster that matches every client.
    pub is_default: bool,
    /// Untyped locality data, decoded on demand with [`Scopes::decode`].
    pub scopes: serde_json::Value,
    pub security_group: Option<SecurityGroup>,
    pub schedulers: Vec<Scheduler>,
}

impl SchedulerCluster {
    /// Number of schedulers currently able to serve clients.
    pub fn active_scheduler_count(&self) -> usize {
        self.schedulers
            .iter()
            .filter(|s| s.state == SchedulerState::Active)
            .count()
    }

    /// Security rules of the cluster's group, empty when it has no group.
    pub fn security_rules(&self) -> &[SecurityRule] {
        self.security_group
            .as_ref()
            .map(|g| g.security_rules.as_slice())
            .unwrap_or_default()
    }
}

/// A single scheduler instance inside a cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Scheduler {
    pub id: u64,
    pub host_name: String,
    pub ip: String,
    pub port: u16,
    pub idc: String,
    pub location: String,
    pub state: SchedulerState,
}

/// Liveness of a scheduler as reported by the store.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    #[default]
    Active,
    Inactive,
}

/// Group of security rules attached to a cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SecurityGroup {
    pub name: String,
    pub security_rules: Vec<SecurityRule>,
}

/// A security rule. `domain` is compared case-insensitively against the
/// client's declared security domain.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SecurityRule {
    pub name: String,
    pub domain: String,
    pub proxy_domain: String,
}

// ── Scopes ─────────────────────────────────────────────────────────

/// Typed view of a cluster's locality descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Scopes {
    /// Single IDC or `|`-separated alternatives.
    #[serde(deserialize_with = "null_as_default")]
    pub idc: String,
    /// Hierarchical path, `|`-separated from coarse to fine.
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cidrs: Vec<String>,
}

/// Stored scopes write unset fields as `null`; read them as empty.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Scopes {
    /// Decode untyped scope data. `null` decodes to empty scopes.
    pub fn decode(value: &serde_json::Value) -> Result<Self, ScopeDecodeError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(Scopes::deserialize(value)?)
    }
}
