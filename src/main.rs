mod commands;
mod compose;
mod config;
mod conflict;
mod diagnostics;
mod error;
mod report;
mod scanner;
mod types;
mod verify;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Error;
use crate::types::PortAssignment;

#[derive(Parser)]
#[command(
    name = "portcheck",
    about = "Verify Docker Compose port mappings against assigned port ranges"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// First assigned range, inclusive, as START-END. Overrides the
    /// config file together with --segment2.
    #[arg(long, global = true)]
    segment1: Option<String>,

    /// Optional second assigned range, inclusive, as START-END.
    #[arg(long, global = true)]
    segment2: Option<String>,

    /// Identity the ranges belong to. Defaults to $USER when ranges
    /// are given on the command line.
    #[arg(long, global = true)]
    user: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the active port assignment
    Ranges {
        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Verify all projects and detect cross-project conflicts
    Scan {
        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Verify a single project's port usage
    Verify {
        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
        /// Project directory name under the projects directory
        project: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    return match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(2)
        },
    };
}

/// Resolve the active assignment: command-line ranges win over the
/// config file's `[assignment]` table; `--user` overrides the identity
/// in both cases.
///
/// # Errors
///
/// Returns `Error::RangeSyntax` for malformed segment flags, or
/// `Error::AssignmentMissing` when neither flags nor config provide an
/// assignment (or no identity can be determined).
fn resolve_assignment(cli: &Cli, config: &Config) -> Result<PortAssignment, Error> {
    if let Some(segment1) = &cli.segment1 {
        let (segment1_start, segment1_end) = config::parse_range(segment1)?;
        let (segment2_start, segment2_end) = match &cli.segment2 {
            None => (None, None),
            Some(segment) => {
                let (start, end) = config::parse_range(segment)?;
                (Some(start), Some(end))
            },
        };
        let identity = match &cli.user {
            None => std::env::var("USER").map_err(|_err| return Error::AssignmentMissing)?,
            Some(user) => user.clone(),
        };
        return Ok(PortAssignment {
            identity,
            segment1_end,
            segment1_start,
            segment2_end,
            segment2_start,
        });
    }

    let Some(mut assignment) = config.assignment.clone() else {
        return Err(Error::AssignmentMissing);
    };
    if let Some(user) = &cli.user {
        assignment.identity = user.clone();
    }
    return Ok(assignment);
}

/// Load config, resolve the assignment, dispatch the subcommand.
///
/// # Errors
///
/// Returns errors from config loading, assignment resolution, or the
/// dispatched command.
fn run(cli: &Cli) -> Result<ExitCode, Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let assignment = resolve_assignment(cli, &config)?;

    return match &cli.command {
        Commands::Ranges { json } => commands::ranges(*json, &assignment),
        Commands::Scan { json } => commands::scan(&root, *json, &config, &assignment),
        Commands::Verify { json, project } => {
            commands::verify(&root, project, *json, &config, &assignment)
        },
    };
}
