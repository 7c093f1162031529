//! Multi-project scanning.
//!
//! Walks the immediate children of a base directory and verifies every
//! subdirectory that contains a Compose file at its root. Other
//! directories and plain files are skipped silently — arbitrary
//! non-project folders may coexist under the base directory.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Error;
use crate::types::{PortAssignment, VerificationResult};
use crate::verify;

/// Verify every project under `base_dir`, keyed by directory base name.
///
/// Name-sorted iteration keeps the result map and everything derived
/// from it stable across runs. A missing base directory yields an
/// empty map, not an error.
///
/// # Errors
///
/// Returns `Error::Io` if the base directory cannot be listed or a
/// project verification hits a filesystem failure other than a missing
/// Compose file.
pub fn scan(
    base_dir: &Path,
    compose_file: &str,
    assignment: &PortAssignment,
) -> Result<BTreeMap<String, VerificationResult>, Error> {
    let mut results = BTreeMap::new();

    if !base_dir.exists() {
        return Ok(results);
    }

    for entry in std::fs::read_dir(base_dir)? {
        let entry = entry?;
        let project_dir = entry.path();

        if !project_dir.is_dir() || !project_dir.join(compose_file).is_file() {
            continue;
        }

        let project_name = entry.file_name().to_string_lossy().into_owned();
        let result = verify::verify(&project_dir, compose_file, assignment)?;
        results.insert(project_name, result);
    }

    return Ok(results);
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

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

    /// Create `<base>/<name>/docker-compose.yml` with the given body.
    fn add_project(base: &Path, name: &str, body: &str) {
        let dir = base.join(name);
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("docker-compose.yml"), body).unwrap();
    }

    #[test]
    fn missing_base_directory_yields_empty_map() {
        let base = tempfile::TempDir::new().unwrap();
        let absent = base.path().join("nope");
        let results = scan(&absent, "docker-compose.yml", &assignment()).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn skips_directories_without_compose_file() {
        let base = tempfile::TempDir::new().unwrap();
        add_project(
            base.path(),
            "alpha",
            "services:\n  web:\n    ports:\n      - \"9000:80\"\n",
        );
        std::fs::create_dir(base.path().join("notes")).unwrap();
        std::fs::write(base.path().join("stray.txt"), "not a project").unwrap();

        let results = scan(base.path(), "docker-compose.yml", &assignment()).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results.contains_key("alpha"));
        // The compose-less directory is excluded entirely, not reported
        // as a missing-file result.
        assert!(!results.contains_key("notes"));
    }

    #[test]
    fn keys_are_sorted_by_project_name() {
        let base = tempfile::TempDir::new().unwrap();
        for name in ["zeta", "alpha", "mid"] {
            add_project(
                base.path(),
                name,
                "services:\n  web:\n    ports: []\n",
            );
        }

        let results = scan(base.path(), "docker-compose.yml", &assignment()).unwrap();
        let keys: Vec<&String> = results.keys().collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }
}
