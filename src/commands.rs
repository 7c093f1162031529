//! Core CLI commands for portcheck: verify, scan, ranges.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;

use crate::config::Config;
use crate::conflict;
use crate::error::Error;
use crate::report;
use crate::scanner;
use crate::types::{PortAssignment, PortConflict, VerificationResult};
use crate::verify;

/// JSON payload for `scan --json`.
#[derive(serde::Serialize)]
struct ScanJson<'a> {
    /// True iff every project is valid and no cross-project conflicts exist.
    all_valid: bool,
    /// Ports claimed by more than one project.
    cross_project_conflicts: &'a [PortConflict],
    /// Per-project verification results, keyed by project name.
    projects: &'a BTreeMap<String, VerificationResult>,
}

/// JSON payload for `verify --json`.
#[derive(serde::Serialize)]
struct VerifyJson<'a> {
    /// The verified project's name.
    project: &'a str,
    /// The verification result.
    verification: &'a VerificationResult,
}

/// Print the active port assignment.
///
/// # Errors
///
/// Returns `Error::JsonSer` if JSON rendering fails.
pub fn ranges(json: bool, assignment: &PortAssignment) -> Result<ExitCode, Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(&assignment.range_info())?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("Port assignment for {}:", assignment.identity);
    println!(
        "  Segment 1: {}-{}",
        assignment.segment1_start, assignment.segment1_end,
    );
    if let (Some(start), Some(end)) = (assignment.segment2_start, assignment.segment2_end) {
        println!("  Segment 2: {start}-{end}");
    }
    println!("  Total ports: {}", assignment.total_ports());
    return Ok(ExitCode::SUCCESS);
}

/// Verify every project under the projects directory, then run the
/// cross-project pass over the aggregate.
///
/// Exit code: 0 when every project is valid and no port is shared
/// across projects, 1 otherwise.
///
/// # Errors
///
/// Returns `Error::Io` for filesystem failures other than missing
/// Compose files, or `Error::JsonSer` if JSON rendering fails.
pub fn scan(
    root: &Path,
    json: bool,
    config: &Config,
    assignment: &PortAssignment,
) -> Result<ExitCode, Error> {
    let base_dir = root.join(&config.projects_dir);
    let results = scanner::scan(&base_dir, &config.compose_file, assignment)?;
    let cross_conflicts = conflict::detect(&results);
    let all_valid = results.values().all(|r| return r.is_valid) && cross_conflicts.is_empty();

    if json {
        let payload = ScanJson {
            all_valid,
            cross_project_conflicts: &cross_conflicts,
            projects: &results,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        let rendered =
            report::render(&results, &cross_conflicts, assignment, &config.compose_file);
        print!("{rendered}");
    }

    return Ok(exit_code_for(all_valid));
}

/// Verify a single named project under the projects directory.
///
/// Exit code: 0 when the project is valid, 1 otherwise. A project
/// directory that does not exist at all is an environment error, not a
/// verification result.
///
/// # Errors
///
/// Returns `Error::ProjectNotFound` if the project directory is
/// absent, `Error::Io` for unexpected filesystem failures, or
/// `Error::JsonSer` if JSON rendering fails.
pub fn verify(
    root: &Path,
    project: &str,
    json: bool,
    config: &Config,
    assignment: &PortAssignment,
) -> Result<ExitCode, Error> {
    let project_dir = root.join(&config.projects_dir).join(project);
    if !project_dir.is_dir() {
        return Err(Error::ProjectNotFound { path: project_dir });
    }

    let result = verify::verify(&project_dir, &config.compose_file, assignment)?;

    if json {
        let payload = VerifyJson {
            project,
            verification: &result,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!("{}", report::render_single(project, &result));
    }

    return Ok(exit_code_for(result.is_valid));
}

/// Map a validity flag to the process exit code contract.
fn exit_code_for(valid: bool) -> ExitCode {
    if valid {
        return ExitCode::SUCCESS;
    }
    return ExitCode::from(1);
}
