//! CLI command implementations

use anyhow::Context;
use corescope_core::{
    decompose_with, read_edge_list, CoreDecomposition, CoreIndex, Edge, GraphError,
};
use corescope_timeline::{RevisionId, RevisionSnapshot, Script, Timeline};
use serde::Serialize;
use std::path::Path;

use crate::config::Config;

/// Final state of a replayed timeline.
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub current: RevisionId,
    pub tree: RevisionSnapshot,
    pub edges: Vec<Edge>,
    pub density: f64,
    /// `None` when the current graph has no edges.
    pub decomposition: Option<CoreDecomposition>,
}

pub fn decompose(path: &Path, config: &Config) -> anyhow::Result<()> {
    let edges = load_edges(path)?;
    let result = decompose_with(&edges, &config.decomposition)?;
    tracing::info!(
        "Decomposed {} edges into {} levels (max core {})",
        edges.len(),
        result.len(),
        result.max_core()
    );
    print_json(&result, config)
}

pub fn core_numbers(path: &Path, config: &Config) -> anyhow::Result<()> {
    let edges = load_edges(path)?;
    let index = CoreIndex::build(&edges, &config.decomposition)?;
    tracing::info!(
        "Computed core numbers for {} nodes (max core {})",
        index.node_count(),
        index.max_core()
    );
    print_json(&index.core_numbers(), config)
}

pub fn replay(script: &Path, edges: Option<&Path>, config: &Config) -> anyhow::Result<()> {
    let timeline = load_timeline(script, edges)?;
    let decomposition = match timeline.decompose(&config.decomposition) {
        Ok(result) => Some(result),
        Err(GraphError::EmptyGraph) => None,
        Err(e) => return Err(e.into()),
    };
    let report = ReplayReport {
        current: timeline.current(),
        tree: timeline.snapshot(),
        edges: timeline.current_edges(),
        density: timeline.graph().density(),
        decomposition,
    };
    print_json(&report, config)
}

pub fn plan(script: &Path, edges: Option<&Path>, to: u64, config: &Config) -> anyhow::Result<()> {
    let timeline = load_timeline(script, edges)?;
    let plan = timeline.plan_to(RevisionId(to))?;
    tracing::info!("{} step(s) from {} to {}", plan.len(), plan.from, plan.to);
    print_json(&plan, config)
}

fn load_edges(path: &Path) -> anyhow::Result<Vec<Edge>> {
    read_edge_list(path).with_context(|| format!("cannot load edges from {}", path.display()))
}

/// Seed a timeline from an optional edge list, then replay the script on it.
fn load_timeline(script: &Path, edges: Option<&Path>) -> anyhow::Result<Timeline> {
    let mut timeline = match edges {
        Some(path) => Timeline::from_edges(load_edges(path)?)?,
        None => Timeline::new(),
    };
    let text = std::fs::read_to_string(script)
        .with_context(|| format!("cannot read script {}", script.display()))?;
    let script = Script::parse(&text)?;
    script.replay(&mut timeline)?;
    tracing::info!(
        "Replayed {} command(s); {} revisions, at {}",
        script.len(),
        timeline.tree().len(),
        timeline.current()
    );
    Ok(timeline)
}

fn print_json<T: Serialize>(value: &T, config: &Config) -> anyhow::Result<()> {
    let json = if config.output.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}
