//! Facemark CLI - outline faces and mark facial landmarks in still images.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::annotate::AnnotateArgs;
use commands::{Cli, Commands, ExitCode};
use config::AppConfig;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load();

    let result = match cli.command {
        Some(Commands::Annotate(args)) => annotate(args, &config),
        Some(Commands::Models(ref args)) => {
            commands::models::run(args, &config).map(|()| ExitCode::Success)
        }
        None => annotate(cli.annotate, &config),
    };

    match result {
        Ok(code) => code.into(),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error.into()
        }
    }
}

fn annotate(args: AnnotateArgs, config: &AppConfig) -> anyhow::Result<ExitCode> {
    commands::annotate::run(&AnnotateArgs::with_config(args, config))
}
