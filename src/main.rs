//! packtag - bundle, minify and fingerprint JavaScript and CSS assets.

mod cli;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use packtag::config::PacktagConfig;
use packtag::{debug, logger};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = PacktagConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    debug!("config"; "loaded {} ({} bundles)", config.config_path.display(), config.bundle.len());

    match &cli.command {
        Commands::Build { build_args } => cli::build::run(&config, build_args),
        Commands::Watch { build_args } => cli::watch::run(&config, build_args),
        Commands::Clean { dry } => cli::clean::run(&config, *dry),
    }
}
