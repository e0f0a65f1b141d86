use anyhow::{Context, Result};
use bender_config::BenderConfig;
use clap::Parser;
use tracing::debug;

use bender_cli::{
    cli::{Cli, Commands},
    commands, logging,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = BenderConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    logging::init(cli.level_override(), &config.logging)?;
    debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Check { library } => commands::check::execute(&config, &library),
        Commands::Resolve {
            library,
            component,
            set,
            format,
        } => commands::resolve::execute(&config, &library, &component, set, format),
        Commands::Update {
            library,
            component,
            set,
            write,
        } => commands::update::execute(&config, &library, &component, set, write),
    }
}
