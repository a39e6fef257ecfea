//! Command-line definition

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use winedition::ServerRole;

// Version is embedded at build time
const VERSION: &str = env!("WINEDITION_VERSION");

#[derive(Parser, Debug)]
#[command(name = "wineditionctl")]
#[command(about = "Identify the Windows edition and server role of a machine", long_about = None)]
#[command(version = VERSION)]
pub struct Cli {
    /// Config file (defaults to $WINEDITION_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the snapshot comes from
#[derive(Args, Debug, Clone, Default)]
pub struct SnapshotArgs {
    /// Classify a saved snapshot (JSON) instead of the live machine
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// System metric override for saved snapshots, as ID=VALUE (e.g. 89=1 for Server 2003 R2)
    #[arg(long = "metric", value_parser = parse_metric, requires = "snapshot")]
    pub metrics: Vec<(i32, i32)>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the edition, server roles and version details
    Classify {
        #[command(flatten)]
        source: SnapshotArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Exit 0 if the named edition's condition holds
    Check {
        /// Edition name, e.g. "Windows Server 2019"
        edition: String,

        #[command(flatten)]
        source: SnapshotArgs,
    },

    /// Exit 0 if the SKU carries the role (cluster, core, datacenter)
    Role {
        role: ServerRole,

        #[command(flatten)]
        source: SnapshotArgs,
    },

    /// List the active rule table in evaluation order
    Rules {
        /// Print as JSON
        #[arg(long, conflicts_with = "toml")]
        json: bool,

        /// Print as TOML, ready to paste into a config file
        #[arg(long)]
        toml: bool,
    },
}

fn parse_metric(s: &str) -> Result<(i32, i32), String> {
    let (id, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=VALUE, got {:?}", s))?;
    let id = id
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("bad metric id {:?}: {}", id, e))?;
    let value = value
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("bad metric value {:?}: {}", value, e))?;
    Ok((id, value))
}
