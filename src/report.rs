//! Deterministic text rendering of verification results.
//!
//! The report is diffable across runs: project sections follow the
//! name-sorted result map, cross-project conflicts ascend by port, and
//! the closing suggestion list is deduplicated in first-seen order.
//! Status words instead of icons, one fact per line.

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::types::{PortAssignment, PortConflict, Severity, VerificationResult};

/// Render the full report: summary, assigned ranges, cross-project
/// conflicts, per-project detail, deduplicated suggestions.
pub fn render(
    results: &std::collections::BTreeMap<String, VerificationResult>,
    cross_conflicts: &[PortConflict],
    assignment: &PortAssignment,
    compose_file: &str,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Port Verification Report");
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(out);

    if results.is_empty() {
        let _ = writeln!(out, "No projects found with a {compose_file} file");
        return out;
    }

    render_summary(&mut out, results);
    render_assigned_ranges(&mut out, assignment);
    render_cross_conflicts(&mut out, cross_conflicts);
    render_project_details(&mut out, results);
    render_suggestions(&mut out, results);

    return out;
}

/// Assigned range block for the requesting identity.
fn render_assigned_ranges(out: &mut String, assignment: &PortAssignment) {
    let _ = writeln!(out, "Assigned ranges for {}:", assignment.identity);
    let _ = writeln!(out, "  {}", assignment.formatted_ranges());
    let _ = writeln!(out, "  Total available: {} ports", assignment.total_ports());
    let _ = writeln!(out);
}

/// Cross-project conflict block. Omitted entirely when empty.
fn render_cross_conflicts(out: &mut String, cross_conflicts: &[PortConflict]) {
    if cross_conflicts.is_empty() {
        return;
    }
    let _ = writeln!(out, "Cross-project conflicts:");
    for conflict in cross_conflicts {
        let _ = writeln!(out, "  {}", conflict.description);
        if let Some(suggestion) = &conflict.suggestion {
            let _ = writeln!(out, "    -> {suggestion}");
        }
    }
    let _ = writeln!(out);
}

/// Per-project sections: status word, conflicts, ports in use.
fn render_project_details(
    out: &mut String,
    results: &std::collections::BTreeMap<String, VerificationResult>,
) {
    let _ = writeln!(out, "Project details:");
    for (project_name, result) in results {
        let status = if result.is_valid { "VALID  " } else { "INVALID" };
        let _ = writeln!(
            out,
            "  {status} {project_name} ({} ports)",
            result.total_ports_used,
        );

        for conflict in &result.conflicts {
            let _ = writeln!(
                out,
                "    {} {}: {}",
                severity_label(conflict.severity),
                conflict.service_name,
                conflict.description,
            );
            if let Some(suggestion) = &conflict.suggestion {
                let _ = writeln!(out, "      -> {suggestion}");
            }
        }

        let mut ports: Vec<u16> = result
            .port_mappings
            .iter()
            .map(|m| return m.host_port)
            .collect();
        ports.sort_unstable();
        ports.dedup();
        if !ports.is_empty() {
            let joined = ports
                .iter()
                .map(|p| return p.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "    Ports in use: {joined}");
        }
    }
    let _ = writeln!(out);
}

/// Render one project's verification in full detail: status, assigned
/// ranges, every mapping, conflicts grouped by severity, suggestions.
pub fn render_single(project_name: &str, result: &VerificationResult) -> String {
    let mut out = String::new();
    let status = if result.is_valid { "VALID" } else { "INVALID" };
    let _ = writeln!(out, "Project: {project_name}");
    let _ = writeln!(out, "Status: {status}");
    let _ = writeln!(out, "Ports used: {}", result.total_ports_used);
    let _ = writeln!(out);

    let info = &result.assigned_range_info;
    let _ = writeln!(out, "Assigned ranges for {}:", info.identity);
    let _ = writeln!(out, "  {}", info.formatted_ranges);
    let _ = writeln!(out, "  Total available: {} ports", info.total_ports);
    let _ = writeln!(out);

    if !result.port_mappings.is_empty() {
        let _ = writeln!(out, "Port mappings:");
        for mapping in &result.port_mappings {
            let _ = writeln!(
                out,
                "  {}: {} -> {} ({})",
                mapping.service_name, mapping.host_port, mapping.container_port, mapping.protocol,
            );
        }
        let _ = writeln!(out);
    }

    render_single_conflicts(&mut out, result, Severity::Error, "Errors:");
    render_single_conflicts(&mut out, result, Severity::Warning, "Warnings:");

    if !result.suggestions.is_empty() {
        let _ = writeln!(out, "Suggestions:");
        for suggestion in &result.suggestions {
            let _ = writeln!(out, "  - {suggestion}");
        }
    }

    return out;
}

/// One severity bucket of a single-project rendering. Omitted when empty.
fn render_single_conflicts(
    out: &mut String,
    result: &VerificationResult,
    severity: Severity,
    heading: &str,
) {
    let matching: Vec<&PortConflict> = result
        .conflicts
        .iter()
        .filter(|c| return c.severity == severity)
        .collect();
    if matching.is_empty() {
        return;
    }

    let _ = writeln!(out, "{heading}");
    for conflict in matching {
        let _ = writeln!(out, "  {}: {}", conflict.service_name, conflict.description);
        if let Some(suggestion) = &conflict.suggestion {
            let _ = writeln!(out, "    -> {suggestion}");
        }
    }
    let _ = writeln!(out);
}

/// Closing suggestion list across all projects, first-seen order,
/// duplicates dropped.
fn render_suggestions(
    out: &mut String,
    results: &std::collections::BTreeMap<String, VerificationResult>,
) {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut lines: Vec<&str> = Vec::new();
    for result in results.values() {
        for suggestion in &result.suggestions {
            if seen.insert(suggestion.as_str()) {
                lines.push(suggestion.as_str());
            }
        }
    }

    if lines.is_empty() {
        return;
    }

    let _ = writeln!(out, "Suggestions:");
    for line in lines {
        let _ = writeln!(out, "  - {line}");
    }
}

/// Overall project and port counts.
fn render_summary(
    out: &mut String,
    results: &std::collections::BTreeMap<String, VerificationResult>,
) {
    let total_projects = results.len();
    let valid_projects = results.values().filter(|r| return r.is_valid).count();
    let total_ports: usize = results
        .values()
        .map(|r| return r.total_ports_used)
        .fold(0, usize::saturating_add);

    let _ = writeln!(out, "Summary:");
    let _ = writeln!(out, "  Projects: {valid_projects}/{total_projects} valid");
    let _ = writeln!(out, "  Total ports used: {total_ports}");
    let _ = writeln!(out);
}

/// Fixed-width severity column label.
fn severity_label(severity: Severity) -> &'static str {
    return match severity {
        Severity::Error => "error  ",
        Severity::Info => "info   ",
        Severity::Warning => "warning",
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::types::{IssueType, PortMapping, Protocol};

    /// Single-segment assignment covering 9000-9010.
    fn assignment() -> PortAssignment {
        return PortAssignment {
            identity: "stud01".to_string(),
            segment1_end: 9010,
            segment1_start: 9000,
            segment2_end: None,
            segment2_start: None,
        };
    }

    /// A valid one-service result publishing `host`.
    fn valid_result(host: u16) -> VerificationResult {
        return VerificationResult {
            assigned_range_info: assignment().range_info(),
            conflicts: Vec::new(),
            is_valid: true,
            port_mappings: vec![PortMapping {
                container_port: 80,
                host_port: host,
                protocol: Protocol::Tcp,
                raw_mapping: format!("{host}:80"),
                service_name: "web".to_string(),
            }],
            suggestions: vec![
                "Port configuration looks good! You can run docker compose up".to_string(),
            ],
            total_ports_used: 1,
            warnings: Vec::new(),
        };
    }

    #[test]
    fn empty_results_report_no_projects() {
        let results = BTreeMap::new();
        let report = render(&results, &[], &assignment(), "docker-compose.yml");
        assert!(report.contains("No projects found with a docker-compose.yml file"));
    }

    #[test]
    fn rendering_is_stable_across_calls() {
        let mut results = BTreeMap::new();
        results.insert("alpha".to_string(), valid_result(9000));
        results.insert("beta".to_string(), valid_result(9001));

        let first = render(&results, &[], &assignment(), "docker-compose.yml");
        let second = render(&results, &[], &assignment(), "docker-compose.yml");
        assert_eq!(first, second);
        assert!(first.contains("Projects: 2/2 valid"));
    }

    #[test]
    fn repeated_suggestions_are_deduplicated() {
        let mut results = BTreeMap::new();
        results.insert("alpha".to_string(), valid_result(9000));
        results.insert("beta".to_string(), valid_result(9001));

        let report = render(&results, &[], &assignment(), "docker-compose.yml");
        let occurrences = report.matches("Port configuration looks good!").count();
        assert_eq!(occurrences, 1);
    }

    #[test]
    fn status_words_reflect_validity() {
        let mut invalid = valid_result(9999);
        invalid.is_valid = false;
        invalid.conflicts.push(PortConflict {
            description: "Port 9999 is not in your assigned range".to_string(),
            issue_type: IssueType::OutOfRange,
            port: 9999,
            service_name: "web".to_string(),
            severity: Severity::Error,
            suggestion: Some("Try using port 9000 instead (available in your range)".to_string()),
        });

        let mut results = BTreeMap::new();
        results.insert("alpha".to_string(), valid_result(9000));
        results.insert("beta".to_string(), invalid);

        let report = render(&results, &[], &assignment(), "docker-compose.yml");
        assert!(report.contains("VALID   alpha (1 ports)"));
        assert!(report.contains("INVALID beta (1 ports)"));
        assert!(report.contains("-> Try using port 9000 instead"));
        assert!(report.contains("Projects: 1/2 valid"));
    }
}
