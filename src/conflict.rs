//! Cross-project conflict detection.
//!
//! Finds host ports claimed by more than one scanned project. A port
//! duplicated only within a single project is the verifier's business
//! (`IssueType::Duplicate`) and is not re-reported here.

use std::collections::BTreeMap;

use crate::types::{IssueType, PortConflict, Severity, VerificationResult};

/// Claims of one host port across the scanned set, as
/// `(project, service)` pairs in scan order.
type PortClaims<'a> = Vec<(&'a str, &'a str)>;

/// Detect ports published by more than one project.
///
/// Results arrive keyed by project name in a `BTreeMap`, so the claim
/// index and the emitted conflicts are deterministic: ascending port
/// order, claims in project-name order.
pub fn detect(results: &BTreeMap<String, VerificationResult>) -> Vec<PortConflict> {
    let mut claims_by_port: BTreeMap<u16, PortClaims<'_>> = BTreeMap::new();

    for (project_name, result) in results {
        for mapping in &result.port_mappings {
            claims_by_port
                .entry(mapping.host_port)
                .or_default()
                .push((project_name, &mapping.service_name));
        }
    }

    let mut conflicts = Vec::new();

    for (port, claims) in &claims_by_port {
        let mut projects: Vec<&str> = claims.iter().map(|(project, _)| return *project).collect();
        projects.dedup();
        if projects.len() < 2 {
            continue;
        }

        let joined = claims
            .iter()
            .map(|(project, service)| return format!("{project}/{service}"))
            .collect::<Vec<_>>()
            .join(", ");

        conflicts.push(PortConflict {
            description: format!("Port {port} is used by multiple projects: {joined}"),
            issue_type: IssueType::CrossProjectConflict,
            port: *port,
            service_name: joined,
            severity: Severity::Error,
            suggestion: Some(
                "Change port assignments in one of the conflicting projects".to_string(),
            ),
        });
    }

    return conflicts;
}
