//! CoopVal CLI - cooperative surplus valuation over a dependency graph.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};

use coopval_core::{ClusterId, DependencyGraph, TaskId};
use coopval_engine::{ClusterConfig, RiskConfig, SurplusEngine};

#[derive(Parser)]
#[command(name = "coopval")]
#[command(about = "Cooperative surplus valuation engine", long_about = None)]
struct Cli {
    /// Path to the dependency graph JSON (map of task id -> impact vector)
    #[arg(long, global = true, default_value = "graph.json")]
    graph: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the discounted surplus of one or more tasks
    Evaluate {
        /// Task ids to evaluate
        #[arg(required = true)]
        tasks: Vec<String>,
        /// Dependency risk factor (>= 0)
        #[arg(long, default_value = "0.1")]
        risk_factor: f64,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the raw dependency density counts for a task
    Density {
        /// Task id
        task: String,
        /// Dependency risk factor (>= 0)
        #[arg(long, default_value = "0.1")]
        risk_factor: f64,
    },
    /// Compute a collective surplus pool over a cluster of tasks
    Cluster {
        /// Cluster identifier
        #[arg(long)]
        id: String,
        /// Member task ids
        #[arg(required = true)]
        members: Vec<String>,
        /// Dependency risk factor (>= 0)
        #[arg(long, default_value = "0.1")]
        risk_factor: f64,
        /// Synergy multiplier for internal dependencies
        #[arg(long, default_value = "0.2")]
        synergy: f64,
        /// Emit JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();
    let graph = load_graph(&cli.graph)?;
    info!("loaded graph with {} tasks from {}", graph.len(), cli.graph.display());

    match cli.command {
        Commands::Evaluate { tasks, risk_factor, json } => {
            let engine = SurplusEngine::new(RiskConfig::new(risk_factor)?);
            let task_ids: Vec<TaskId> = tasks.into_iter().map(TaskId::from).collect();
            let report = engine.evaluate_batch(Arc::new(graph), task_ids).await;

            if json {
                let body = serde_json::json!({
                    "evaluated_at": report.evaluated_at,
                    "results": report.results,
                    "failures": report.failures.iter().map(|f| {
                        serde_json::json!({
                            "task_id": f.task_id,
                            "error": f.error.to_string(),
                        })
                    }).collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("Results ({})", report.results.len());
                for r in &report.results {
                    println!(
                        "  {} | raw {:.4} | discount {:.4} | surplus {:.4} | deps {} ({} external)",
                        r.task_id,
                        r.raw_value,
                        r.discount,
                        r.discounted_value,
                        r.dependency_count,
                        r.external_count,
                    );
                }
                for f in &report.failures {
                    println!("  {} | FAILED: {}", f.task_id, f.error);
                }
            }
        }
        Commands::Density { task, risk_factor } => {
            let engine = SurplusEngine::new(RiskConfig::new(risk_factor)?);
            let task_id = TaskId::from(task);
            let density = engine.density(&graph, &task_id)?;
            println!(
                "{}: {} distinct dependencies, {} external (ratio {:.4})",
                task_id,
                density.total,
                density.external,
                density.external_ratio(),
            );
        }
        Commands::Cluster { id, members, risk_factor, synergy, json } => {
            let engine = SurplusEngine::new(RiskConfig::new(risk_factor)?);
            let member_ids: Vec<TaskId> = members.into_iter().map(TaskId::from).collect();
            let config = ClusterConfig { synergy_multiplier: synergy };
            let pool =
                engine.evaluate_cluster(&graph, ClusterId::new(id), &member_ids, config)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&pool)?);
            } else {
                println!("Cluster {} ({} members)", pool.cluster_id, pool.task_ids.len());
                println!("  total surplus:     {:.4}", pool.total_surplus);
                println!("  synergy bonus:     {:.4}", pool.synergy_bonus);
                println!("  risk discount:     {:.4}", pool.risk_discount);
                println!(
                    "  dependencies:      {} internal, {} external",
                    pool.internal_dependencies, pool.external_dependencies,
                );
                println!(
                    "  confidence:        [{:.4}, {:.4}]",
                    pool.confidence_interval.0, pool.confidence_interval.1,
                );
                let mut by_category: Vec<_> = pool.aggregated_magnitudes.iter().collect();
                by_category.sort_by(|a, b| a.0.cmp(b.0));
                for (category, magnitude) in by_category {
                    println!("  {:<18} {:.4}", format!("{category}:"), magnitude);
                }
            }
        }
    }

    Ok(())
}

/// Load and validate a dependency graph from a JSON file.
///
/// Validation happens during deserialization: a vector violating its
/// uncertainty bounds or carrying a negative weight is rejected here, at
/// the ingestion boundary, before any computation runs.
fn load_graph(path: &PathBuf) -> Result<DependencyGraph> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading graph file {}", path.display()))?;
    let graph: DependencyGraph = serde_json::from_str(&raw)
        .with_context(|| format!("parsing graph file {}", path.display()))?;
    Ok(graph)
}
