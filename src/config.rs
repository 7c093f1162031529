use std::path::Path;

use crate::error::Error;
use crate::types::PortAssignment;

/// Project configuration loaded from `.portcheck.toml`.
/// Everything has a default so the tool works in a bare directory;
/// the assignment table is optional because ranges usually arrive via
/// CLI flags.
pub struct Config {
    /// Optional default port assignment.
    pub assignment: Option<PortAssignment>,
    /// Compose file name looked up inside each project directory.
    pub compose_file: String,
    /// Directory containing the project subdirectories.
    pub projects_dir: String,
}

/// Raw TOML structure for `.portcheck.toml`.
#[derive(serde::Deserialize)]
struct PortcheckTomlConfig {
    #[serde(default)]
    assignment: Option<RawAssignment>,
    #[serde(default = "default_compose_file")]
    compose_file: String,
    #[serde(default = "default_projects_dir")]
    projects_dir: String,
}

/// Raw `[assignment]` table: ranges as `"START-END"` strings.
#[derive(serde::Deserialize)]
struct RawAssignment {
    identity: String,
    segment1: String,
    #[serde(default)]
    segment2: Option<String>,
}

/// Default Compose file name, matching what Docker Compose itself
/// looks for first.
fn default_compose_file() -> String {
    return "docker-compose.yml".to_string();
}

/// Default projects directory relative to the working directory.
fn default_projects_dir() -> String {
    return "projects".to_string();
}

impl Config {
    /// Load config from `.portcheck.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist. Returns an error if
    /// the file exists but is malformed — never silently falls back to
    /// defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// `Error::TomlDe` if the TOML is malformed, or
    /// `Error::RangeSyntax` if an assignment range is not `START-END`.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(".portcheck.toml");
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::defaults()),
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: PortcheckTomlConfig = toml::from_str(&content)?;
        let assignment = match raw.assignment {
            None => None,
            Some(table) => Some(build_assignment(&table)?),
        };

        return Ok(Self {
            assignment,
            compose_file: raw.compose_file,
            projects_dir: raw.projects_dir,
        });
    }

    /// Config used when no `.portcheck.toml` exists.
    fn defaults() -> Self {
        return Self {
            assignment: None,
            compose_file: default_compose_file(),
            projects_dir: default_projects_dir(),
        };
    }
}

/// Build a `PortAssignment` from the raw `[assignment]` table.
///
/// # Errors
///
/// Returns `Error::RangeSyntax` if either segment fails to parse.
fn build_assignment(raw: &RawAssignment) -> Result<PortAssignment, Error> {
    let (segment1_start, segment1_end) = parse_range(&raw.segment1)?;
    let (segment2_start, segment2_end) = match &raw.segment2 {
        None => (None, None),
        Some(segment) => {
            let (start, end) = parse_range(segment)?;
            (Some(start), Some(end))
        },
    };

    return Ok(PortAssignment {
        identity: raw.identity.clone(),
        segment1_end,
        segment1_start,
        segment2_end,
        segment2_start,
    });
}

/// Parse an inclusive `"START-END"` range string.
///
/// # Errors
///
/// Returns `Error::RangeSyntax` when the separator is missing, a bound
/// is not a port number, or the bounds are reversed.
pub fn parse_range(value: &str) -> Result<(u16, u16), Error> {
    let Some((start_str, end_str)) = value.split_once('-') else {
        return Err(Error::RangeSyntax {
            reason: "expected START-END".to_string(),
            value: value.to_string(),
        });
    };

    let start: u16 = start_str.trim().parse().map_err(|_err| {
        return Error::RangeSyntax {
            reason: format!("`{start_str}` is not a port number"),
            value: value.to_string(),
        };
    })?;
    let end: u16 = end_str.trim().parse().map_err(|_err| {
        return Error::RangeSyntax {
            reason: format!("`{end_str}` is not a port number"),
            value: value.to_string(),
        };
    })?;

    if start > end {
        return Err(Error::RangeSyntax {
            reason: format!("start {start} is greater than end {end}"),
            value: value.to_string(),
        });
    }

    return Ok((start, end));
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn absent_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.compose_file, "docker-compose.yml");
        assert_eq!(config.projects_dir, "projects");
        assert!(config.assignment.is_none());
    }

    #[test]
    fn assignment_table_builds_port_assignment() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".portcheck.toml"),
            "projects_dir = \"work\"\n\n[assignment]\nidentity = \"stud01\"\nsegment1 = \"8000-8019\"\nsegment2 = \"8100-8109\"\n",
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.projects_dir, "work");
        let assignment = config.assignment.unwrap();
        assert_eq!(assignment.identity, "stud01");
        assert_eq!(assignment.segment1_start, 8000);
        assert_eq!(assignment.segment1_end, 8019);
        assert_eq!(assignment.segment2_start, Some(8100));
        assert_eq!(assignment.segment2_end, Some(8109));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(".portcheck.toml"), "projects_dir = [not toml").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn reversed_range_is_rejected() {
        assert!(parse_range("9000-8000").is_err());
        assert!(parse_range("8000").is_err());
        assert!(parse_range("8000-xyz").is_err());
        assert_eq!(parse_range("8000-8019").unwrap(), (8000, 8019));
    }
}
