//! Searcher plugins — swap the searcher at startup.
//!
//! A plugin directory holds a [`PLUGIN_MANIFEST`] naming a strategy and its
//! settings:
//!
//! ```toml
//! strategy = "weighted"
//!
//! [weights]
//! security_domain = 0.2
//! cidr = 0.5
//! idc = 0.15
//! location = 0.1
//! cluster_type = 0.05
//! ```
//!
//! The strategy name is resolved in a [`StrategyRegistry`] of factories.
//! Embedders register their own strategies before the searcher is chosen.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PluginError, PluginResult};
use crate::scorer::ScoringWeights;
use crate::searcher::{DefaultSearcher, Searcher};

/// File name of the manifest inside a plugin directory.
pub const PLUGIN_MANIFEST: &str = "searcher-plugin.toml";

/// Contents of [`PLUGIN_MANIFEST`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Name of a strategy registered in the [`StrategyRegistry`].
    pub strategy: String,
    pub weights: Option<ScoringWeights>,
    /// Free-form settings for third-party strategies.
    #[serde(default)]
    pub options: HashMap<String, toml::Value>,
}

impl PluginManifest {
    pub fn from_file(path: &Path) -> PluginResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| PluginError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| PluginError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Builds a searcher from a manifest, validating its settings.
pub type StrategyFactory =
    Box<dyn Fn(&PluginManifest) -> PluginResult<Arc<dyn Searcher>> + Send + Sync>;

/// Named searcher strategies a plugin manifest can select.
///
/// The default registry knows `"default"` (the built-in searcher) and
/// `"weighted"` (the built-in algorithm with a custom weight table).
pub struct StrategyRegistry {
    factories: BTreeMap<String, StrategyFactory>,
}

impl StrategyRegistry {
    /// A registry with no strategies.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&PluginManifest) -> PluginResult<Arc<dyn Searcher>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered strategy names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Build the strategy the manifest names.
    pub fn build(&self, manifest: &PluginManifest) -> PluginResult<Arc<dyn Searcher>> {
        let factory = self
            .factories
            .get(&manifest.strategy)
            .ok_or_else(|| PluginError::UnknownStrategy(manifest.strategy.clone()))?;
        factory(manifest)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("default", |_| Ok(Arc::new(DefaultSearcher::new()) as Arc<dyn Searcher>))
            .register("weighted", weighted_strategy);
        registry
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.names())
            .finish()
    }
}

fn weighted_strategy(manifest: &PluginManifest) -> PluginResult<Arc<dyn Searcher>> {
    let weights = manifest
        .weights
        .ok_or_else(|| PluginError::MissingWeights(manifest.strategy.clone()))?;
    weights.validate()?;
    Ok(Arc::new(DefaultSearcher::with_weights(weights)))
}

/// Load the searcher described by `dir`'s manifest.
pub fn load_plugin(dir: &Path, registry: &StrategyRegistry) -> PluginResult<Arc<dyn Searcher>> {
    let path = dir.join(PLUGIN_MANIFEST);
    if !path.is_file() {
        return Err(PluginError::ManifestNotFound(path));
    }

    let manifest = PluginManifest::from_file(&path)?;
    debug!(path = %path.display(), strategy = %manifest.strategy, "parsed searcher plugin manifest");
    registry.build(&manifest)
}
