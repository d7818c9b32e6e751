//! IPv6 Rotation Bootstrap
//!
//! Runs once at container start, before the application server.
//!
//! # Sequence
//!
//! ```text
//!   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!   │ truncate list│──▶│ network delay│──▶│  interface   │──▶│ global IPv6  │
//!   │     file     │   │              │   │  resolution  │   │ (retry loop) │
//!   └──────────────┘   └──────────────┘   └──────┬───────┘   └──────┬───────┘
//!                                                │ none              │ none
//!                                                ▼                   ▼
//!   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!   │  exec server │◀──│  write list  │◀──│ assign <p>::n│◀──│ derive /64   │
//!   │ (always runs)│   │              │   │ (log & go on)│   │   prefix     │
//!   └──────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! Network failures never stop the server from starting.

use std::net::Ipv6Addr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rand::thread_rng;

use ipv6_bootstrap::config::{self, BootstrapConfig};
use ipv6_bootstrap::lifecycle::{Bootstrap, ExecLauncher, Launcher, ServerCommand};
use ipv6_bootstrap::net::{generate_siblings, IpCommand, Prefix64};
use ipv6_bootstrap::observability::init_logging;
use ipv6_bootstrap::rotation::AddressPool;

#[derive(Parser)]
#[command(name = "ipv6-bootstrap")]
#[command(about = "Configure outbound IPv6 rotation, then start the application server", long_about = None)]
struct Cli {
    /// TOML config file (default: $IPV6_BOOTSTRAP_CONFIG or /etc/ipv6-bootstrap.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure addresses and exec the server (default)
    Run {
        /// Stop after writing the address list
        #[arg(long)]
        skip_handoff: bool,
    },
    /// Print the address list a base address would produce, without side effects
    Plan {
        #[arg(long)]
        base: Ipv6Addr,
    },
    /// Load the address list and print a shuffled rotation order
    Pool {
        /// List file to read (default: rotation.list_file)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let path = config::config_path(cli.config.as_deref());
    let (config, error) = config::load_or_fallback(&path);
    if let Some(e) = error {
        // A broken config must not keep the container down.
        eprintln!("ipv6-bootstrap: {} ({}), using defaults", e, path.display());
    }

    init_logging(&config.observability);
    tracing::info!(config = %path.display(), "ipv6-bootstrap v{} starting", env!("CARGO_PKG_VERSION"));

    let command = cli.command.unwrap_or(Commands::Run { skip_handoff: false });
    let result = match command {
        Commands::Run { skip_handoff } => run(&config, skip_handoff),
        Commands::Plan { base } => {
            plan(&config, base);
            Ok(())
        }
        Commands::Pool { file } => {
            pool(&config, file);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Bootstrap failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &BootstrapConfig, skip_handoff: bool) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::warn!(error = %e, "Cannot start async runtime, skipping IPv6 setup");
            if !skip_handoff {
                ExecLauncher.launch(&ServerCommand::from_config(&config.server))?;
            }
            return Ok(());
        }
    };
    let ops = IpCommand::new(config.network.ip_binary.clone());

    if skip_handoff {
        let report = runtime.block_on(Bootstrap::new(config, &ops).run());
        tracing::info!(
            listed = report.listed,
            failed = report.failed,
            command = %ServerCommand::from_config(&config.server),
            "Handoff skipped"
        );
        return Ok(());
    }

    // The runtime is dropped by exec; nothing else runs after this.
    runtime.block_on(ipv6_bootstrap::run_and_handoff(config, &ops, &ExecLauncher))?;
    Ok(())
}

fn plan(config: &BootstrapConfig, base: Ipv6Addr) {
    let rotation = &config.rotation;
    tracing::info!(prefix = %Prefix64::from_addr(base), "Planning rotation list");

    println!("{}", base);
    for addr in generate_siblings(
        base,
        rotation.first_suffix,
        rotation.address_count.saturating_sub(1),
    ) {
        println!("{}", addr);
    }
}

fn pool(config: &BootstrapConfig, file: Option<PathBuf>) {
    let path = file.unwrap_or_else(|| config.rotation.list_file.clone());
    let mut pool = AddressPool::load(&path);
    pool.shuffle(&mut thread_rng());

    for addr in pool.rotation() {
        println!("{}", addr);
    }
}
