pub mod search;

use std::sync::Arc;

use scout_core::{LogConfig, LogFormat, SearcherConfig};
use scout_searcher::{DefaultSearcher, Searcher, StrategyRegistry};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Install the tracing subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(log: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log.level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
    Ok(())
}

/// Choose the searcher, giving the plugin load a bounded amount of time.
pub async fn load_searcher(config: &SearcherConfig) -> Arc<dyn Searcher> {
    let Some(dir) = config.plugin_dir.clone() else {
        return scout_searcher::new(None, &StrategyRegistry::default());
    };

    let timeout = config.plugin_load_timeout();
    let task = tokio::task::spawn_blocking(move || {
        scout_searcher::new(Some(dir.as_path()), &StrategyRegistry::default())
    });

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(searcher)) => searcher,
        Ok(Err(err)) => {
            warn!(error = %err, "searcher plugin loader failed, use default searcher");
            Arc::new(DefaultSearcher::new())
        }
        Err(_) => {
            warn!(?timeout, "searcher plugin load timed out, use default searcher");
            Arc::new(DefaultSearcher::new())
        }
    }
}
