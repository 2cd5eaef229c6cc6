use clap::Parser;
use haitale::cli::{Cli, Commands};
use haitale::types::config::Config;
use haitale::{HaitaleError, HaitaleResult};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> HaitaleResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = if cli.config.exists() {
        Config::load(&cli.config)
            .unwrap_or_else(|_| Config::default_config())
            .with_env_overrides()
    } else {
        Config::load_or_default()
    };

    // CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let directive: Directive = format!("haitale={}", log_level)
        .parse()
        .or_else(|_| "haitale=info".parse())
        .map_err(|e| HaitaleError::config(format!("invalid log directive: {}", e)))?;
    let filter = EnvFilter::from_default_env().add_directive(directive);

    if config.general.log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Recommend { words, catalog } => {
            haitale::cli::commands::recommend(&words, &catalog, &config).await?;
        }
        Commands::Init { path } => {
            haitale::cli::commands::init(path).await?;
        }
        Commands::Doctor { catalog } => {
            haitale::cli::commands::doctor(&config, &catalog).await?;
        }
        Commands::Version => {
            haitale::cli::commands::version();
        }
    }

    Ok(())
}
