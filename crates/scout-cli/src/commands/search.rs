//! `scout search` and `scout score`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use scout_core::{Conditions, SchedulerCluster};
use scout_searcher::{RankedCluster, ScoreBreakdown, Searcher};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// JSON file holding an array of scheduler clusters
    #[arg(long)]
    pub clusters: PathBuf,
    /// Client IP address
    #[arg(long, default_value = "")]
    pub ip: String,
    /// Client hostname
    #[arg(long, default_value = "")]
    pub hostname: String,
    /// Client condition as key=value, e.g. security_domain=corp (repeatable)
    #[arg(short = 'C', long = "condition", value_parser = parse_condition)]
    pub conditions: Vec<(String, String)>,
    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

impl SearchArgs {
    fn conditions(&self) -> Conditions {
        self.conditions.iter().cloned().collect()
    }
}

/// A ranked cluster as printed by `scout score --format json`.
#[derive(Debug, Serialize)]
struct ScoreRow<'a> {
    rank: usize,
    id: u64,
    name: &'a str,
    is_default: bool,
    breakdown: Option<ScoreBreakdown>,
}

pub fn search(searcher: &dyn Searcher, args: &SearchArgs) -> anyhow::Result<()> {
    let clusters = read_clusters(&args.clusters)?;
    let found = searcher.find_scheduler_clusters(
        &clusters,
        &args.ip,
        &args.hostname,
        &args.conditions(),
    )?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&found)?),
        _ => print!("{}", format_clusters(&found)),
    }
    Ok(())
}

pub fn score(searcher: &dyn Searcher, args: &SearchArgs) -> anyhow::Result<()> {
    let clusters = read_clusters(&args.clusters)?;
    let ranked = searcher.explain(&clusters, &args.ip, &args.hostname, &args.conditions())?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&score_rows(&ranked))?),
        _ => print!("{}", format_scores(&ranked)),
    }
    Ok(())
}

fn parse_condition(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid condition {s:?}, expected key=value"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid condition {s:?}, empty key"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn read_clusters(path: &Path) -> anyhow::Result<Vec<SchedulerCluster>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read clusters from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse clusters in {}", path.display()))
}

fn format_clusters(clusters: &[SchedulerCluster]) -> String {
    let mut out = String::new();
    for (i, cluster) in clusters.iter().enumerate() {
        let marker = if cluster.is_default { ", default" } else { "" };
        let _ = writeln!(
            out,
            "{}. {} (id {}{}, {} active schedulers)",
            i + 1,
            cluster.name,
            cluster.id,
            marker,
            cluster.active_scheduler_count()
        );
    }
    out
}

fn score_rows(ranked: &[RankedCluster]) -> Vec<ScoreRow<'_>> {
    ranked
        .iter()
        .enumerate()
        .map(|(i, r)| ScoreRow {
            rank: i + 1,
            id: r.cluster.id,
            name: &r.cluster.name,
            is_default: r.cluster.is_default,
            breakdown: r.breakdown,
        })
        .collect()
}

fn format_scores(ranked: &[RankedCluster]) -> String {
    let width = ranked
        .iter()
        .map(|r| r.cluster.name.len())
        .max()
        .unwrap_or(0)
        .max("CLUSTER".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4}  {:<width$}  {:>6}  {:>8}  {:>6}  {:>6}  {:>8}  {:>6}",
        "RANK", "CLUSTER", "TOTAL", "SECURITY", "CIDR", "IDC", "LOCATION", "TYPE"
    );
    for (i, r) in ranked.iter().enumerate() {
        let _ = match &r.breakdown {
            Some(b) => writeln!(
                out,
                "{:<4}  {:<width$}  {:>6.3}  {:>8.2}  {:>6.2}  {:>6.2}  {:>8.2}  {:>6.2}",
                i + 1,
                r.cluster.name,
                b.total,
                b.security_domain,
                b.cidr,
                b.idc,
                b.location,
                b.cluster_type
            ),
            None => writeln!(
                out,
                "{:<4}  {:<width$}  {:>6}  (no breakdown)",
                i + 1,
                r.cluster.name,
                "-"
            ),
        };
    }
    out
}
