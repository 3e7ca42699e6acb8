use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// NETTF: a peer-to-peer LAN file and directory transfer utility.
#[derive(Debug, Parser)]
#[command(name = "nettf", version, about, long_about = None)]
pub struct Cli {
    /// Path to an optional `nettf.toml` configuration file. CLI flags always
    /// override values loaded from it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// The three top-level operations the front-end supports.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan the local subnet for other NETTF receivers.
    Discover {
        /// Per-host connect timeout, in milliseconds. Defaults to the
        /// configured `discovery_timeout_ms` (itself 500ms unless
        /// overridden by a config file).
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Listen for and accept incoming transfers.
    Receive {
        /// Address:port to bind. Defaults to `0.0.0.0:9876`.
        #[arg(long)]
        bind: Option<String>,
        /// Directory transfers are written beneath. Defaults to the current
        /// directory.
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Send a file or directory to a peer.
    Send {
        /// IPv4 address of the receiving peer.
        ipv4: std::net::Ipv4Addr,
        /// Path to the file or directory to send.
        path: PathBuf,
        /// Optional receiver-side target subdirectory.
        target_subdir: Option<String>,
    },
}
