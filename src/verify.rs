//! Single-project port verification.
//!
//! Validates one project's declared Compose ports against one
//! `PortAssignment`. Every finding is returned as data inside the
//! `VerificationResult`; the only raised errors are filesystem
//! failures other than "file missing", which indicate an environment
//! problem the engine cannot classify.

use std::collections::HashSet;
use std::path::Path;

use crate::compose::{self, ComposeError};
use crate::error::Error;
use crate::types::{
    IssueType, PortAssignment, PortConflict, PortMapping, Severity, VerificationResult,
};

/// Well-known ports flagged as risky regardless of range membership.
pub const SYSTEM_PORTS: [u16; 6] = [22, 80, 443, 3306, 5432, 27017];

/// Distinct host port count above which a consolidation warning is added.
const HIGH_PORT_USAGE_THRESHOLD: usize = 10;

/// Check every mapping for duplicates, range membership, and system
/// port usage. The seen-ports set is local to this call — the engine
/// carries no state between verifications.
fn check_port_assignments(
    port_mappings: &[PortMapping],
    assignment: &PortAssignment,
    used_ports: &mut HashSet<u16>,
) -> Vec<PortConflict> {
    let mut conflicts = Vec::new();
    let assigned_ports = assignment.all_ports();

    for mapping in port_mappings {
        let host_port = mapping.host_port;

        // First occurrence claims the port; later ones are flagged.
        if used_ports.contains(&host_port) {
            conflicts.push(PortConflict {
                description: format!("Port {host_port} is used by multiple services"),
                issue_type: IssueType::Duplicate,
                port: host_port,
                service_name: mapping.service_name.clone(),
                severity: Severity::Error,
                suggestion: Some(format!(
                    "Use a different port from your assigned range: {}",
                    assignment.formatted_ranges(),
                )),
            });
        } else {
            used_ports.insert(host_port);
        }

        if !assignment.contains(host_port) {
            conflicts.push(PortConflict {
                description: format!("Port {host_port} is not in your assigned range"),
                issue_type: IssueType::OutOfRange,
                port: host_port,
                service_name: mapping.service_name.clone(),
                severity: Severity::Error,
                suggestion: Some(suggest_alternative_port(
                    host_port,
                    &assigned_ports,
                    used_ports,
                )),
            });
        }

        // May coexist with an out-of-range conflict for the same port.
        if SYSTEM_PORTS.contains(&host_port) {
            conflicts.push(PortConflict {
                description: format!(
                    "Port {host_port} is a common system port that may cause conflicts"
                ),
                issue_type: IssueType::SystemPort,
                port: host_port,
                service_name: mapping.service_name.clone(),
                severity: Severity::Warning,
                suggestion: Some(format!(
                    "Use a port from your assigned range: {}",
                    assignment.formatted_ranges(),
                )),
            });
        }
    }

    return conflicts;
}

/// Assemble display suggestions from the error-severity conflicts.
fn generate_suggestions(conflicts: &[PortConflict], assignment: &PortAssignment) -> Vec<String> {
    let mut suggestions = Vec::new();
    let error_conflicts: Vec<&PortConflict> = conflicts
        .iter()
        .filter(|c| return c.severity == Severity::Error)
        .collect();

    if error_conflicts.is_empty() {
        suggestions.push("Port configuration looks good! You can run docker compose up".to_string());
        return suggestions;
    }

    suggestions.push("Fix port assignment errors before running docker compose up".to_string());
    suggestions.push(format!(
        "Your assigned port ranges: {}",
        assignment.formatted_ranges(),
    ));
    for conflict in &error_conflicts {
        if let Some(suggestion) = &conflict.suggestion {
            suggestions.push(format!("{}: {suggestion}", conflict.service_name));
        }
    }

    return suggestions;
}

/// Assemble display warnings: a high-usage note plus one line per
/// warning-severity conflict.
fn generate_warnings(distinct_ports: usize, conflicts: &[PortConflict]) -> Vec<String> {
    let mut warnings = Vec::new();

    if distinct_ports > HIGH_PORT_USAGE_THRESHOLD {
        warnings.push(format!(
            "Using {distinct_ports} ports - consider consolidating services"
        ));
    }

    for conflict in conflicts {
        if conflict.severity == Severity::Warning {
            warnings.push(format!("{}: {}", conflict.service_name, conflict.description));
        }
    }

    return warnings;
}

/// Result used when the Compose file does not exist. Still a normal
/// `VerificationResult` — the caller sees no error.
fn missing_file_result(compose_file: &str, assignment: &PortAssignment) -> VerificationResult {
    return VerificationResult {
        assigned_range_info: assignment.range_info(),
        conflicts: vec![PortConflict {
            description: format!("{compose_file} file not found"),
            issue_type: IssueType::MissingFile,
            port: 0,
            service_name: String::new(),
            severity: Severity::Error,
            suggestion: Some(format!(
                "Create a {compose_file} file in the project directory"
            )),
        }],
        is_valid: false,
        port_mappings: Vec::new(),
        suggestions: vec![format!("Create a {compose_file} file to define your services")],
        total_ports_used: 0,
        warnings: vec![format!("No {compose_file} file found")],
    };
}

/// Result used when the file exists but cannot be decoded. The parse
/// failure is carried as data, never as a raised error.
fn parse_error_result(
    compose_file: &str,
    reason: &ComposeError,
    assignment: &PortAssignment,
) -> VerificationResult {
    return VerificationResult {
        assigned_range_info: assignment.range_info(),
        conflicts: vec![PortConflict {
            description: format!("Failed to parse {compose_file}: {reason}"),
            issue_type: IssueType::ParseError,
            port: 0,
            service_name: String::new(),
            severity: Severity::Error,
            suggestion: Some(format!("Check {compose_file} syntax and format")),
        }],
        is_valid: false,
        port_mappings: Vec::new(),
        suggestions: vec![format!(
            "Check {compose_file} syntax with 'docker compose config'"
        )],
        total_ports_used: 0,
        warnings: vec![format!("Failed to parse {compose_file}: {reason}")],
    };
}

/// Suggest the nearest unused assigned port to an out-of-range port.
/// Ties on distance resolve toward the lower port value. "Unused"
/// means not already consumed earlier in this same verification pass.
fn suggest_alternative_port(
    invalid_port: u16,
    assigned_ports: &[u16],
    used_ports: &HashSet<u16>,
) -> String {
    let mut closest: Option<u16> = None;

    for &port in assigned_ports {
        if used_ports.contains(&port) {
            continue;
        }
        let better = match closest {
            None => true,
            Some(best) => {
                let candidate_distance = port.abs_diff(invalid_port);
                let best_distance = best.abs_diff(invalid_port);
                candidate_distance < best_distance
                    || (candidate_distance == best_distance && port < best)
            },
        };
        if better {
            closest = Some(port);
        }
    }

    return match closest {
        None => {
            "No available ports in your assigned range. Consider removing unused services."
                .to_string()
        },
        Some(port) => format!("Try using port {port} instead (available in your range)"),
    };
}

/// Verify one project directory against an assignment.
///
/// `compose_file` is the file name looked up inside `project_dir`,
/// normally `docker-compose.yml`.
///
/// # Errors
///
/// Returns `Error::Io` only for filesystem failures other than the
/// Compose file being absent. Missing files, undecodable YAML, and all
/// semantic violations are reported inside the returned result.
pub fn verify(
    project_dir: &Path,
    compose_file: &str,
    assignment: &PortAssignment,
) -> Result<VerificationResult, Error> {
    let compose_path = project_dir.join(compose_file);

    if !compose_path.exists() {
        return Ok(missing_file_result(compose_file, assignment));
    }

    let port_mappings = match compose::parse_compose_file(&compose_path) {
        Err(ComposeError::Io(e)) => return Err(Error::Io(e)),
        Err(reason) => return Ok(parse_error_result(compose_file, &reason, assignment)),
        Ok(mappings) => mappings,
    };

    let mut used_ports: HashSet<u16> = HashSet::new();
    let conflicts = check_port_assignments(&port_mappings, assignment, &mut used_ports);

    let distinct_ports = used_ports.len();
    let warnings = generate_warnings(distinct_ports, &conflicts);
    let suggestions = generate_suggestions(&conflicts, assignment);
    let is_valid = conflicts.iter().all(|c| return c.severity != Severity::Error);

    return Ok(VerificationResult {
        assigned_range_info: assignment.range_info(),
        conflicts,
        is_valid,
        port_mappings,
        suggestions,
        total_ports_used: distinct_ports,
        warnings,
    });
}
