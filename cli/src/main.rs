//! Portmedic CLI - Check and fix server port / firewall issues
//!
//! A command-line tool for scanning ports against the host's firewall
//! layers, applying safe remediation, and health-checking the control
//! panel endpoint.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "portmedic")]
#[command(author, version, about = "Check and fix server port / firewall issues")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan ports against UFW and iptables, optionally fixing blocked ones
    Scan {
        /// Specific additional port to check and fix
        #[arg(short, long)]
        port: Option<u16>,

        /// Automatically attempt to open blocked ports
        #[arg(long)]
        fix: bool,
    },

    /// Enable UFW with essential ports and sync the HestiaCP firewall
    Setup,

    /// Probe the control panel TCP port and HTTPS endpoint
    Health {
        /// Host to probe
        #[arg(long, default_value = "localhost")]
        host: String,

        /// Control panel port
        #[arg(short, long, default_value_t = 8083)]
        port: u16,
    },

    /// Manage custom service names shown in the scan table
    #[command(alias = "svc")]
    Services {
        #[command(subcommand)]
        action: ServicesAction,
    },
}

#[derive(Subcommand)]
enum ServicesAction {
    /// Add or replace the service entry for a port
    Add { port: u16, name: String },
    /// Remove the service entry for a port
    #[command(alias = "rm")]
    Remove { port: u16 },
    /// List custom service entries
    #[command(alias = "ls")]
    List,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Scan { port, fix }) => {
            commands::scan::run(port, fix, cli.json).await?;
        }
        Some(Commands::Setup) => {
            commands::setup::run().await?;
        }
        Some(Commands::Health { host, port }) => {
            let healthy = commands::health::run(&host, port, cli.json).await?;
            // Load-bearing for monitoring hooks: 0 only on full success.
            if !healthy {
                std::process::exit(1);
            }
        }
        Some(Commands::Services { action }) => match action {
            ServicesAction::Add { port, name } => commands::services::add(port, &name).await?,
            ServicesAction::Remove { port } => commands::services::remove(port).await?,
            ServicesAction::List => commands::services::list(cli.json).await?,
        },
        None => {
            // Default: report-only scan of the configured ports
            commands::scan::run(None, false, cli.json).await?;
        }
    }

    Ok(())
}
