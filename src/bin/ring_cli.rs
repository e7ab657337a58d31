use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ringhash::{accept_any, accept_unique, config::RingConfig, telemetry, RingHash};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "ringhash-cli")]
#[command(about = "Inspect key placement on a consistent-hashing ring", long_about = None)]
struct Cli {
    #[arg(long)]
    config_path: PathBuf,
    #[arg(long, default_value = "false")]
    json_logs: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prints the node that owns a key
    Get {
        #[arg(long)]
        key: String,
    },
    /// Prints the first `n` nodes found walking the ring from the owner of a key
    GetN {
        #[arg(long)]
        key: String,
        #[arg(long)]
        n: usize,
        /// Skip nodes that were already chosen
        #[arg(long, default_value = "false")]
        unique: bool,
    },
    /// Prints every node with its weight
    Describe,
}

#[derive(Serialize)]
struct GetResponse<'a> {
    key: &'a str,
    node: Option<&'a str>,
}

#[derive(Serialize)]
struct GetNResponse<'a> {
    key: &'a str,
    nodes: Vec<String>,
}

#[derive(Serialize)]
struct NodeDescription<'a> {
    id: &'a str,
    weight: usize,
}

#[derive(Serialize)]
struct DescribeResponse<'a> {
    nodes: Vec<NodeDescription<'a>>,
    virtual_points: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    if args.json_logs {
        telemetry::initialize_json_subscriber();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .init();
    }

    let config = RingConfig::from_path(&args.config_path)?;
    let ring: RingHash = RingHash::from_config(&config)?;

    let output = match &args.command {
        Commands::Get { key } => serde_json::to_string_pretty(&GetResponse {
            key,
            node: ring.get(key),
        })?,
        Commands::GetN { key, n, unique } => {
            let nodes = if *unique {
                ring.get_n(key, *n, Some(&accept_unique))
            } else {
                ring.get_n(key, *n, Some(&accept_any))
            };
            serde_json::to_string_pretty(&GetNResponse { key, nodes })?
        }
        Commands::Describe => {
            let mut nodes: Vec<NodeDescription> = ring
                .node_ids()
                .map(|id| NodeDescription {
                    id,
                    weight: ring.weight(id).unwrap_or_default(),
                })
                .collect();
            nodes.sort_by(|a, b| a.id.cmp(b.id));
            serde_json::to_string_pretty(&DescribeResponse {
                nodes,
                virtual_points: ring.virtual_len(),
            })?
        }
    };
    println!("{}", output);

    Ok(())
}
