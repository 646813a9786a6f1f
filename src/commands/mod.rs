use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for parsing, validating and inspecting CUE sheet files.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Inspect(InspectCommand),
    Validate(ValidateCommand),
}

/// Parses a cue sheet and prints its track layout.
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InspectCommand {
    /// Path of the cue sheet file
    #[arg(value_name = "INPUT_CUE")]
    pub input: PathBuf,

    /// Length in seconds of a referenced file, repeatable, applied in
    /// FILE declaration order
    #[arg(short, long = "duration", value_name = "SECONDS")]
    pub durations: Vec<f64>,

    /// Print the parsed sheet as JSON instead of a track listing
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Parses one or more cue sheets and reports any errors.
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateCommand {
    /// Paths of the cue sheet files to check
    #[arg(value_name = "INPUT_CUE", required = true)]
    pub inputs: Vec<PathBuf>,
}
