//! CLI command definitions and handlers.

pub mod annotate;
pub mod models;

use clap::{Parser, Subcommand};

/// Facemark - outline faces and mark facial landmarks in still images
#[derive(Parser)]
#[command(name = "facemark")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Annotation arguments, used when no subcommand is given.
    #[command(flatten)]
    pub annotate: annotate::AnnotateArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Draw face boxes and landmarks onto an image
    Annotate(annotate::AnnotateArgs),
    /// Manage detector models
    Models(models::ModelsArgs),
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Annotated image written.
    Success = 0,
    /// Any failure other than an unavailable detector.
    Error = 1,
    /// The face detector never became operational.
    DetectorUnavailable = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
