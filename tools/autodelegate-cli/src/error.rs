//! CLI Error Types
//!
//! Clear, actionable error messages for the `autodelegate` binary.

use std::path::{Path, PathBuf};

use autodelegate_codegen::CodegenError;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI-specific errors with helpful messages and hints
#[derive(Debug, Error)]
pub enum CliError {
    /// The snapshot file does not exist
    #[error("Snapshot not found: {}\n  Hint: pass --snapshot <file> pointing at a compilation snapshot (TOML)", path.display())]
    SnapshotNotFound { path: PathBuf },

    /// The compilation reported error diagnostics
    #[error("Generation failed: {errors} error(s) reported\n  Hint: fix the diagnostics above and retry")]
    GenerationFailed { errors: usize },

    /// The generator aborted
    #[error("{}", .0.chain())]
    Codegen(#[from] CodegenError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create a snapshot not found error
    pub fn snapshot_not_found(path: &Path) -> Self {
        Self::SnapshotNotFound {
            path: path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_hints() {
        let err = CliError::snapshot_not_found(Path::new("missing.toml"));
        let text = err.to_string();
        assert!(text.starts_with("Snapshot not found: missing.toml"));
        assert!(text.contains("Hint: pass --snapshot"));

        let err = CliError::GenerationFailed { errors: 2 };
        assert!(err.to_string().contains("2 error(s) reported"));
    }

    #[test]
    fn codegen_errors_keep_their_cause() {
        let err = CliError::from(CodegenError::RoundLimit { rounds: 4 });
        assert_eq!(err.to_string(), "compilation did not settle after 4 rounds");
    }
}
