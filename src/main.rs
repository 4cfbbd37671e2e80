use anyhow::Result;
use clap::Parser;
use stepwise::cli::commands::exit_code;
use stepwise::cli::{Cli, Commands};
use stepwise::config::RuntimeConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    let verbosity = cli.verbosity();
    let config = RuntimeConfig::load(cli.config.as_deref())?;

    // Initialize logging; RUST_LOG wins over verbosity and config
    let json_logs = config.logging.json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| verbosity.to_log_level(&config.logging.level).into()),
        )
        .with(json_logs.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    match cli.command {
        Commands::Run(args) => {
            let termination = stepwise::cli::commands::run(args, &config)?;
            let code = exit_code(termination);
            if code != 0 {
                std::process::exit(code);
            }
        }
        Commands::List(args) => {
            stepwise::cli::commands::list(args)?;
        }
    }

    Ok(())
}
