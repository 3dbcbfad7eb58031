//! Range-membership index over a cluster's CIDR scopes.
//!
//! Built from CIDR strings, answers "is this IP inside any of them".
//! Unparsable entries are logged and skipped; they never abort a build.

use std::net::IpAddr;

use ipnet::IpNet;
use tracing::warn;

use crate::error::CidrError;

/// Set of IP networks supporting point-containment queries.
#[derive(Debug, Clone, Default)]
pub struct CidrIndex {
    networks: Vec<IpNet>,
}

impl CidrIndex {
    /// Build an index, skipping entries that fail to parse.
    pub fn build<I, S>(cidrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut networks = Vec::new();
        for cidr in cidrs {
            match parse_cidr(cidr.as_ref()) {
                Ok(network) => networks.push(network),
                Err(err) => warn!(error = %err, "skipping invalid CIDR"),
            }
        }

        // Overlapping and adjacent networks collapse into one entry.
        Self {
            networks: IpNet::aggregate(&networks),
        }
    }

    /// Whether `ip` falls inside any indexed network.
    pub fn contains(&self, ip: IpAddr) -> bool {
        let ip = ip.to_canonical();
        self.networks.iter().any(|network| network.contains(&ip))
    }

    /// Like [`contains`](Self::contains), but an unparsable address is never contained.
    pub fn contains_str(&self, ip: &str) -> bool {
        match ip.trim().parse::<IpAddr>() {
            Ok(ip) => self.contains(ip),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

/// Parse a single CIDR entry such as `"10.0.0.0/24"`.
pub fn parse_cidr(cidr: &str) -> Result<IpNet, CidrError> {
    cidr.trim().parse::<IpNet>().map_err(|source| CidrError {
        cidr: cidr.to_string(),
        source,
    })
}
