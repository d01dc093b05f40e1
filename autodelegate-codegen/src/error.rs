//! Error types for the code generator
//!
//! Per-type problems in user code are reported as [`Diagnostic`]s and never
//! surface here. [`CodegenError`] covers faults that abort the compilation:
//! unreadable input, emission failures and internal inconsistencies.
//!
//! [`Diagnostic`]: crate::diagnostics::Diagnostic

use std::error::Error as _;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for generator operations.
pub type CodegenResult<T> = Result<T, CodegenError>;

#[derive(Debug, Error)]
pub enum CodegenError {
    /// Writing a generated source failed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot file is not valid TOML or does not match the schema.
    #[error("failed to parse snapshot: {0}")]
    Snapshot(#[from] toml::de::Error),

    /// The snapshot parsed but describes an impossible program.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// A type could not be parsed from its textual form.
    #[error("invalid type name `{0}`")]
    InvalidTypeName(String),

    /// The same class was emitted twice in one compilation.
    #[error("attempt to recreate a file for type {name}")]
    DuplicateOutput { name: String },

    /// The symbol table contradicts a specification that already validated.
    #[error("internal error while generating {type_name}: {reason}")]
    Internal { type_name: String, reason: String },

    /// The host kept producing new sources.
    #[error("compilation did not settle after {rounds} rounds")]
    RoundLimit { rounds: usize },
}

impl CodegenError {
    pub fn internal(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Internal {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_snapshot(reason: impl Into<String>) -> Self {
        Self::InvalidSnapshot(reason.into())
    }

    /// This error followed by every underlying cause, one per line.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            out.push_str("\n  caused by: ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_includes_io_cause() {
        let err = CodegenError::Io {
            path: PathBuf::from("out/foo/AutoDelegate_C.java"),
            source: std::io::Error::other("disk full"),
        };
        let chain = err.chain();
        assert!(chain.starts_with("failed to write out/foo/AutoDelegate_C.java"));
        assert!(chain.contains("caused by: disk full"), "{chain}");
    }

    #[test]
    fn duplicate_output_message() {
        let err = CodegenError::DuplicateOutput {
            name: "foo.bar.AutoDelegate_C".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "attempt to recreate a file for type foo.bar.AutoDelegate_C"
        );
    }
}
