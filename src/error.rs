/// Crate-level error types for portcheck.
///
/// Verification findings are never errors — they travel as
/// `PortConflict` data inside a `VerificationResult`. The variants
/// here cover environment problems the engine cannot classify:
/// unreadable directories, malformed configuration, missing
/// assignment, unknown project names.
use std::path::PathBuf;

/// All errors carry enough context to produce a useful diagnostic
/// without a debugger.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No port assignment was supplied via flags or config.
    #[error("no port assignment configured")]
    AssignmentMissing,

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization of results failed.
    #[error("json serialize: {0}")]
    JsonSer(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// A named project directory does not exist under the projects root.
    #[error("project not found: {}", path.display())]
    ProjectNotFound {
        /// Expected location of the project directory.
        path: PathBuf,
    },

    /// A segment flag or config value is not of the form `START-END`.
    #[error("invalid port range `{value}`: {reason}")]
    RangeSyntax {
        /// Why the value was rejected.
        reason: String,
        /// The offending input.
        value: String,
    },

    /// TOML deserialization of the config file failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
