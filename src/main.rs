//! Realms Loot CLI - mint, read and update Loot items on StarkNet
//!
//! Commands marshal their arguments into contract calls and hand them to the
//! nile/starknet tooling, which signs, submits and decodes.

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};

mod chain;
mod cli;
mod config;
mod error;
mod loot;
mod output;

use chain::NileInvoker;
use cli::Cli;
use config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    debug!("Starting Realms Loot CLI v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let settings = Settings::load()?;
    debug!(
        "Loaded configuration (default network: {}, contract: {})",
        settings.default_network, settings.loot.contract_alias
    );

    let invoker = NileInvoker::new(&settings);

    let mut stdout = std::io::stdout();
    if let Err(e) = cli::run(cli.command, &settings, &invoker, &mut stdout).await {
        if e.is_tooling_failure() {
            error!(
                "Contract invocation failed; check that `{}` and `{}` are installed and {:?} is the nile project",
                settings.tooling.nile_bin, settings.tooling.starknet_bin, settings.tooling.project_dir
            );
        }
        return Err(e.into());
    }

    Ok(())
}

fn init_logging(verbosity: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,realms_loot=info")),
        1 => EnvFilter::new("info,realms_loot=debug"),
        _ => EnvFilter::new("debug,realms_loot=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}
