//! The `@AutoDelegate` annotation payload
//!
//! Values are kept exactly as written (type names as text). Resolution against
//! the symbol table happens in [`crate::validate`].

use serde::{Deserialize, Serialize};

/// Contents of one `@AutoDelegate` annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateMetadata {
    /// Interfaces to implement by forwarding, in declaration order.
    #[serde(default)]
    pub delegates: Vec<DelegateEntry>,
    /// Class to extend; the root object type when absent.
    #[serde(default)]
    pub extend: Option<String>,
}

/// One entry of [`DelegateMetadata::delegates`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateEntry {
    /// Type the delegate field holds, as written.
    pub interface: String,
    /// Field name; synthesised from the interface name when absent.
    #[serde(default)]
    pub name: Option<String>,
}

impl DelegateEntry {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            name: None,
        }
    }

    pub fn named(interface: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            name: Some(name.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_delegates_and_extend() {
        let meta: DelegateMetadata = toml::from_str(
            r#"
extend = "foo.bar.S"

[[delegates]]
interface = "foo.bar.I"

[[delegates]]
interface = "baz.qux.I"
name = "other"
"#,
        )
        .unwrap();
        assert_eq!(meta.extend.as_deref(), Some("foo.bar.S"));
        assert_eq!(
            meta.delegates,
            vec![
                DelegateEntry::new("foo.bar.I"),
                DelegateEntry::named("baz.qux.I", "other"),
            ]
        );
    }

    #[test]
    fn everything_is_optional() {
        let meta: DelegateMetadata = toml::from_str("").unwrap();
        assert!(meta.delegates.is_empty());
        assert!(meta.extend.is_none());
    }
}
