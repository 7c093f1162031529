/// Core domain types for port assignments, mappings, conflicts, and results.
use std::fmt;
use std::fmt::Write as _;

/// Closed set of problems the verifier can report. Serialized in
/// snake_case so JSON output matches the report vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    /// A host port claimed by more than one scanned project.
    CrossProjectConflict,
    /// A host port declared more than once within a single project.
    Duplicate,
    /// The Compose file does not exist in the project directory.
    MissingFile,
    /// A host port outside the assigned ranges.
    OutOfRange,
    /// The Compose file exists but is not decodable YAML, or its top
    /// level is not a mapping.
    ParseError,
    /// A well-known system port that is risky to publish regardless of
    /// range membership.
    SystemPort,
}

/// One identity's allocation of one or two disjoint inclusive port
/// ranges. Constructed once per invocation from a trusted source and
/// never mutated; the verifier trusts the segments to be disjoint.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PortAssignment {
    /// Opaque identity key, typically a login id.
    pub identity: String,
    /// Inclusive upper bound of the first segment.
    pub segment1_end: u16,
    /// Inclusive lower bound of the first segment.
    pub segment1_start: u16,
    /// Inclusive upper bound of the optional second segment.
    pub segment2_end: Option<u16>,
    /// Inclusive lower bound of the optional second segment.
    pub segment2_start: Option<u16>,
}

impl PortAssignment {
    /// Every assigned port: segment 1 ascending, then segment 2
    /// ascending. Insertion order matters — nearest-port suggestions
    /// scan this sequence and ties resolve toward earlier entries.
    pub fn all_ports(&self) -> Vec<u16> {
        let mut ports: Vec<u16> = (self.segment1_start..=self.segment1_end).collect();
        if let (Some(start), Some(end)) = (self.segment2_start, self.segment2_end) {
            ports.extend(start..=end);
        }
        return ports;
    }

    /// Whether `port` falls inside either assigned segment.
    pub fn contains(&self, port: u16) -> bool {
        if (self.segment1_start..=self.segment1_end).contains(&port) {
            return true;
        }
        if let (Some(start), Some(end)) = (self.segment2_start, self.segment2_end) {
            return (start..=end).contains(&port);
        }
        return false;
    }

    /// Assigned ranges rendered for display: `"A-B"` or `"A-B, C-D"`.
    pub fn formatted_ranges(&self) -> String {
        let mut out = format!("{}-{}", self.segment1_start, self.segment1_end);
        if let (Some(start), Some(end)) = (self.segment2_start, self.segment2_end) {
            let _ = write!(out, ", {start}-{end}");
        }
        return out;
    }

    /// Whether a second segment is assigned.
    pub fn has_two_segments(&self) -> bool {
        return self.segment2_start.is_some() && self.segment2_end.is_some();
    }

    /// Whether the assigned ports form one unbroken run — a single
    /// segment, or a second segment starting right after the first.
    pub fn is_continuous(&self) -> bool {
        let Some(start) = self.segment2_start else {
            return true;
        };
        return u32::from(start) == u32::from(self.segment1_end).saturating_add(1);
    }

    /// Snapshot of this assignment for embedding in results.
    pub fn range_info(&self) -> RangeInfo {
        return RangeInfo {
            formatted_ranges: self.formatted_ranges(),
            has_two_segments: self.has_two_segments(),
            identity: self.identity.clone(),
            segment1_end: self.segment1_end,
            segment1_start: self.segment1_start,
            segment2_end: self.segment2_end,
            segment2_start: self.segment2_start,
            total_ports: self.total_ports(),
        };
    }

    /// How many ports are assigned in total.
    pub fn total_ports(&self) -> usize {
        let mut count =
            usize::from(self.segment1_end.saturating_sub(self.segment1_start)).saturating_add(1);
        if let (Some(start), Some(end)) = (self.segment2_start, self.segment2_end) {
            count = count
                .saturating_add(usize::from(end.saturating_sub(start)))
                .saturating_add(1);
        }
        return count;
    }
}

impl fmt::Display for PortAssignment {
    /// `"<identity>: A-B[, C-D] (<n> ports)"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(
            f,
            "{}: {} ({} ports)",
            self.identity,
            self.formatted_ranges(),
            self.total_ports(),
        );
    }
}

/// One detected problem. `port` is `0` for whole-file problems such as
/// a missing or unparseable Compose file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PortConflict {
    /// Human-readable explanation of the problem.
    pub description: String,
    /// Which kind of problem this is.
    pub issue_type: IssueType,
    /// The host port involved, or `0` for file-level problems.
    pub port: u16,
    /// The Compose service key. For cross-project conflicts this is a
    /// comma-joined list of `project/service` pairs.
    pub service_name: String,
    /// How serious the problem is. Only `Error` invalidates a project.
    pub severity: Severity,
    /// Optional remediation hint.
    pub suggestion: Option<String>,
}

/// One published port of one service, as declared in a Compose file.
/// Produced fresh per parse, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PortMapping {
    /// The port inside the container.
    pub container_port: u16,
    /// The port bound on the Docker host.
    pub host_port: u16,
    /// The declared transport protocol.
    pub protocol: Protocol,
    /// Original textual or structural form, kept for diagnostics.
    pub raw_mapping: String,
    /// The Compose service key this mapping belongs to.
    pub service_name: String,
}

/// Transport protocol of a published port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// The Compose default when no suffix is given.
    #[default]
    Tcp,
    /// Declared with a `/udp` suffix or `protocol: udp`.
    Udp,
}

impl fmt::Display for Protocol {
    /// Lowercase wire form, matching Compose syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
        };
    }
}

/// Snapshot of the assignment a verification ran against, embedded in
/// every `VerificationResult` so reports are self-contained.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RangeInfo {
    /// Display form of the assigned ranges.
    pub formatted_ranges: String,
    /// Whether a second segment is assigned.
    pub has_two_segments: bool,
    /// The identity the ranges belong to.
    pub identity: String,
    /// Inclusive upper bound of the first segment.
    pub segment1_end: u16,
    /// Inclusive lower bound of the first segment.
    pub segment1_start: u16,
    /// Inclusive upper bound of the optional second segment.
    pub segment2_end: Option<u16>,
    /// Inclusive lower bound of the optional second segment.
    pub segment2_start: Option<u16>,
    /// Total number of assigned ports.
    pub total_ports: usize,
}

/// How serious a conflict is. Only `Error` makes a project invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Invalidates the project.
    Error,
    /// Informational only.
    Info,
    /// Reported but does not invalidate the project.
    Warning,
}

/// Everything the verifier found for one project. Always returned as
/// data — verification failures never cross this boundary as errors.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VerificationResult {
    /// Snapshot of the assignment this result was produced against.
    pub assigned_range_info: RangeInfo,
    /// Every detected problem, in detection order.
    pub conflicts: Vec<PortConflict>,
    /// True iff no conflict has `Severity::Error`.
    pub is_valid: bool,
    /// Every parsed mapping, in file order.
    pub port_mappings: Vec<PortMapping>,
    /// Remediation hints assembled for display.
    pub suggestions: Vec<String>,
    /// Count of distinct host ports found.
    pub total_ports_used: usize,
    /// Human-readable lines for warning-severity findings.
    pub warnings: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    /// A two-segment assignment with a gap between the segments.
    fn split_assignment() -> PortAssignment {
        return PortAssignment {
            identity: "stud01".to_string(),
            segment1_end: 8002,
            segment1_start: 8000,
            segment2_end: Some(8101),
            segment2_start: Some(8100),
        };
    }

    #[test]
    fn adjacent_second_segment_is_continuous() {
        let assignment = PortAssignment {
            identity: "stud03".to_string(),
            segment1_end: 8004,
            segment1_start: 8000,
            segment2_end: Some(8009),
            segment2_start: Some(8005),
        };
        assert!(assignment.is_continuous());
        assert!(!split_assignment().is_continuous());
    }

    #[test]
    fn all_ports_keeps_segment_order() {
        let assignment = split_assignment();
        assert_eq!(assignment.all_ports(), vec![8000, 8001, 8002, 8100, 8101]);
        assert_eq!(assignment.total_ports(), 5);
    }

    #[test]
    fn contains_covers_both_segments() {
        let assignment = split_assignment();
        assert!(assignment.contains(8001));
        assert!(assignment.contains(8101));
        assert!(!assignment.contains(8050));
    }

    #[test]
    fn display_includes_both_ranges() {
        let assignment = split_assignment();
        assert_eq!(
            assignment.to_string(),
            "stud01: 8000-8002, 8100-8101 (5 ports)"
        );
    }

    #[test]
    fn single_segment_is_continuous() {
        let assignment = PortAssignment {
            identity: "stud02".to_string(),
            segment1_end: 8010,
            segment1_start: 8000,
            segment2_end: None,
            segment2_start: None,
        };
        assert!(assignment.is_continuous());
        assert!(!assignment.has_two_segments());
        assert_eq!(assignment.formatted_ranges(), "8000-8010");
    }
}
