//! Diagnostics reported against annotated types
//!
//! Every problem found in user code becomes a [`Diagnostic`] attached to the
//! most specific location known: the offending `@AutoDelegate` entry when
//! there is one, the annotated type otherwise.

use std::fmt;

use serde::Serialize;

use crate::names::ClassName;

/// Severity of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fails the compilation; the type is not generated.
    Error,
    /// Advisory; generation went ahead.
    Warning,
}

/// Stable identifier of each kind of problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    /// The annotated declaration is not a plain class.
    WrongType,
    /// A nested annotated class is private.
    Private,
    /// A nested annotated class needs an enclosing instance.
    Inner,
    /// The annotated class does not extend its generated base class.
    SuperClassMismatch,
    /// A delegate entry does not name an interface.
    NotInterface,
    /// The `extend` entry does not name a class.
    ExtendNotClass,
    /// An explicit field name is not a Java identifier.
    InvalidName,
    /// The same interface is delegated to twice.
    DuplicateInterface,
    /// Two delegates use the same field name.
    DuplicateName,
    /// A referenced type never appeared.
    Undefined,
    /// The generator itself failed.
    InternalException,
    /// A method signature is reachable through more than one interface.
    AmbiguousMethod,
}

impl DiagnosticCode {
    /// Tag printed in front of the message, e.g. `AutoDelegateWrongType`.
    pub fn tag(&self) -> &'static str {
        match self {
            DiagnosticCode::WrongType => "AutoDelegateWrongType",
            DiagnosticCode::Private => "AutoDelegatePrivate",
            DiagnosticCode::Inner => "AutoDelegateInner",
            DiagnosticCode::SuperClassMismatch => "AutoDelegateSuperClass",
            DiagnosticCode::NotInterface => "AutoDelegateInterface",
            DiagnosticCode::ExtendNotClass => "AutoDelegateExtend",
            DiagnosticCode::InvalidName => "AutoDelegateInvalidName",
            DiagnosticCode::DuplicateInterface => "AutoDelegateDuplicateInterface",
            DiagnosticCode::DuplicateName => "AutoDelegateDuplicateName",
            DiagnosticCode::Undefined => "AutoDelegateUndefined",
            DiagnosticCode::InternalException => "AutoDelegateException",
            DiagnosticCode::AmbiguousMethod => "AutoDelegateAmbiguousMethod",
        }
    }
}

/// Where a diagnostic points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Location {
    /// The annotated type declaration.
    Type { ty: ClassName },
    /// The `index`-th entry of the annotation's `delegates` list.
    Delegate { ty: ClassName, index: usize },
    /// The annotation's `extend` entry.
    Extend { ty: ClassName },
}

impl Location {
    /// The annotated type this location belongs to.
    pub fn ty(&self) -> &ClassName {
        match self {
            Location::Type { ty } | Location::Delegate { ty, .. } | Location::Extend { ty } => ty,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Type { ty } => write!(f, "{ty}"),
            Location::Delegate { ty, index } => write!(f, "{ty}@AutoDelegate.delegates[{index}]"),
            Location::Extend { ty } => write!(f, "{ty}@AutoDelegate.extend"),
        }
    }
}

/// A single reported problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub location: Location,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, message: impl Into<String>, location: Location) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            location,
        }
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>, location: Location) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            location,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
        };
        write!(
            f,
            "[{}] {}: [{}] {}",
            tag,
            self.location,
            self.code.tag(),
            self.message
        )
    }
}

/// Receives diagnostics as they are found.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// A [`DiagnosticSink`] that keeps everything in report order.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any error-severity diagnostic was reported.
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(Diagnostic::is_error)
    }

    /// Diagnostics carrying `code`.
    pub fn with_code(&self, code: DiagnosticCode) -> Vec<&Diagnostic> {
        self.entries.iter().filter(|d| d.code == code).collect()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c() -> ClassName {
        ClassName::best_guess("foo.bar.C").unwrap()
    }

    #[test]
    fn display_format() {
        let d = Diagnostic::error(
            DiagnosticCode::NotInterface,
            "@AutoDelegate class can only delegate to interfaces",
            Location::Delegate { ty: c(), index: 1 },
        );
        assert_eq!(
            d.to_string(),
            "[ERROR] foo.bar.C@AutoDelegate.delegates[1]: [AutoDelegateInterface] \
             @AutoDelegate class can only delegate to interfaces"
        );
    }

    #[test]
    fn warnings_are_not_errors() {
        let mut sink = Diagnostics::new();
        sink.report(Diagnostic::warning(
            DiagnosticCode::AmbiguousMethod,
            "m() is inherited from two interfaces",
            Location::Type { ty: c() },
        ));
        assert!(!sink.has_errors());
        sink.report(Diagnostic::error(
            DiagnosticCode::Undefined,
            "undefined",
            Location::Type { ty: c() },
        ));
        assert!(sink.has_errors());
        assert_eq!(sink.with_code(DiagnosticCode::Undefined).len(), 1);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn location_belongs_to_type() {
        assert_eq!(Location::Extend { ty: c() }.ty(), &c());
        assert_eq!(
            Location::Extend { ty: c() }.to_string(),
            "foo.bar.C@AutoDelegate.extend"
        );
    }
}
