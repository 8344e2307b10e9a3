//! etp-rank: rank the components of a topology snapshot by effective
//! throughput percentage, or summarize executor placement per host.
//!
//! Commands:
//! - `rank`: validate a snapshot, flag congested components, print the ranking
//! - `nodes`: aggregate executor records into per-host node statistics

use clap::{Parser, Subcommand};
use tracing::info;

use stela_compute::{
    snapshot::load_executor_records, ClusterStatistics, EtpAnalysis, RankingSnapshot,
};
use stela_core::config::{load_dotenv, Config};
use stela_core::RankOrder;

// ── CLI ─────────────────────────────────────────────────────────────

/// Effective throughput ranking for streaming topologies.
#[derive(Parser, Debug)]
#[command(name = "etp-rank", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank the components of a topology snapshot.
    Rank {
        /// JSON file holding `{"topology": ..., "statistics": ...}`.
        #[arg(long, env = "STELA_SNAPSHOT")]
        snapshot: String,

        /// desc (most effective first) or asc. Defaults to STELA_RANK_ORDER.
        #[arg(long)]
        order: Option<RankOrder>,

        /// Print the full analysis as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Aggregate executor records into per-host statistics.
    Nodes {
        /// JSON file holding an array of executor records.
        #[arg(long)]
        records: String,

        /// Only show the N hosts with the highest emit throughput.
        #[arg(long)]
        top: Option<usize>,

        /// Print the node statistics as JSON.
        #[arg(long)]
        json: bool,
    },
}

// ── Commands ────────────────────────────────────────────────────────

fn rank(config: &Config, snapshot: &str, order: Option<RankOrder>, json: bool) -> anyhow::Result<()> {
    let snapshot = RankingSnapshot::from_file(snapshot, &config.history)?;
    let analysis = EtpAnalysis::compute(&snapshot.topology, &snapshot.statistics(), &config.ranking)?;
    let order = order.unwrap_or(config.ranking.default_order);
    let ranked = analysis.rank(order);

    if json {
        let out = serde_json::json!({
            "order": order,
            "analysis": analysis,
            "ranking": ranked,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let stats = snapshot.topology.stats();
    println!(
        "topology {} ({} components, {} edges, total parallelism {})",
        snapshot.topology.id, stats.component_count, stats.edge_count, stats.total_parallelism
    );
    println!("sink throughput: {:.2}", analysis.total_throughput);

    if ranked.is_empty() {
        println!("nothing to rank: sinks emit nothing");
    } else {
        println!("ranking ({order}):");
        for (i, r) in ranked.iter().enumerate() {
            let flag = if analysis.is_congested(r.id()) { "  [congested]" } else { "" };
            println!(
                "  {:>3}. {:<24} {:.4}  parallelism={}{}",
                i + 1,
                r.id(),
                r.score,
                r.component.parallelism,
                flag
            );
        }
    }

    let congested = analysis.congested();
    if !congested.is_empty() {
        println!("congested:");
        for (id, backlog) in congested {
            println!("  {:<24} backlog {:.2}/s", id, backlog);
        }
    }
    Ok(())
}

fn nodes(records: &str, top: Option<usize>, json: bool) -> anyhow::Result<()> {
    let mut cluster = ClusterStatistics::new();
    cluster.extend(load_executor_records(records)?);

    let nodes = cluster.busiest(top.unwrap_or(cluster.len()));
    if json {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
        return Ok(());
    }

    for node in nodes {
        println!(
            "{:<24} emit={:<10} transfer={:<10} spouts={} bolts={}",
            node.host_id(),
            node.emit_throughput(),
            node.transfer_throughput(),
            node.spouts().len(),
            node.bolts().len()
        );
    }
    Ok(())
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let config = Config::from_env();
    config.log_summary();

    let cli = Cli::parse();
    info!(command = ?cli.command, "etp-rank starting");

    match cli.command {
        Command::Rank { snapshot, order, json } => rank(&config, &snapshot, order, json),
        Command::Nodes { records, top, json } => nodes(&records, top, json),
    }
}
