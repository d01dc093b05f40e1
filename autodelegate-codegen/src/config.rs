//! Generator configuration
//!
//! Read from the `[options]` table of a snapshot; every field has a default so
//! the table may be omitted entirely.

use serde::{Deserialize, Serialize};

use crate::names::ClassName;

/// Identity written into `@Generated`.
pub const GENERATOR_NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Java release the generated sources target.
    pub release: u32,
    /// Annotate generated classes with `@Generated`.
    pub generated_annotation: bool,
    /// Rounds a compilation may run before it is considered stuck.
    pub max_rounds: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            release: 17,
            generated_annotation: true,
            max_rounds: 16,
        }
    }
}

impl GeneratorConfig {
    /// The `@Generated` annotation type to use, if any.
    ///
    /// Java 9 moved it from `javax.annotation` to `javax.annotation.processing`.
    pub fn generated_annotation_type(&self) -> Option<ClassName> {
        if !self.generated_annotation {
            return None;
        }
        let package = if self.release > 8 {
            "javax.annotation.processing"
        } else {
            "javax.annotation"
        };
        ClassName::new(package, vec!["Generated".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config: GeneratorConfig = toml::from_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.release, 17);
    }

    #[test]
    fn generated_annotation_follows_release() {
        let modern = GeneratorConfig::default();
        assert_eq!(
            modern.generated_annotation_type().unwrap().qualified(),
            "javax.annotation.processing.Generated"
        );
        let java8 = GeneratorConfig {
            release: 8,
            ..Default::default()
        };
        assert_eq!(
            java8.generated_annotation_type().unwrap().qualified(),
            "javax.annotation.Generated"
        );
        let none = GeneratorConfig {
            generated_annotation: false,
            ..Default::default()
        };
        assert!(none.generated_annotation_type().is_none());
    }

    #[test]
    fn partial_table() {
        let config: GeneratorConfig = toml::from_str("release = 11").unwrap();
        assert_eq!(config.release, 11);
        assert!(config.generated_annotation);
        assert_eq!(config.max_rounds, 16);
    }
}
