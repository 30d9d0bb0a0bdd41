mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so JSON output on stdout stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Route {
            request,
            history,
            engine,
        } => commands::route::run(&request.join(" "), history.as_deref(), &engine),
        Commands::Feedback { file, engine } => commands::feedback::run(&file, &engine),
        Commands::Profiles { profiles } => commands::profiles::run(profiles.as_deref()),
        Commands::Version => commands::version::run(),
    }
}
