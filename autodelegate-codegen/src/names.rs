//! Java naming helpers
//!
//! Class and type names as the generator sees them, the deterministic name of
//! the generated base class, identifier checks and a collision-avoiding name
//! allocator for delegate fields and constructor parameters.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::CodegenError;

/// Prefix of every generated class name.
pub const GENERATED_PREFIX: &str = "AutoDelegate_";

/// Suffix of synthesised delegate field names.
const DEFAULT_FIELD_SUFFIX: &str = "_unlikelyToConflictWithExistingMember";

/// Reserved words and literals that can never be used as identifiers.
const JAVA_KEYWORDS: &[&str] = &[
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "try",
    "void",
    "volatile",
    "while",
    "true",
    "false",
    "null",
    "_",
];

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "short", "int", "long", "char", "float", "double",
];

// ── ClassName ────────────────────────────────────────────────────────────────

/// A fully qualified class name, split into package and the chain of simple
/// names from the top-level class down to the named (possibly nested) class.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassName {
    package: String,
    simple_names: Vec<String>,
}

impl ClassName {
    /// Build a class name from its package and simple-name chain.
    ///
    /// Returns `None` when the chain is empty or contains an empty segment.
    pub fn new(package: impl Into<String>, simple_names: Vec<String>) -> Option<Self> {
        if simple_names.is_empty() || simple_names.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self {
            package: package.into(),
            simple_names,
        })
    }

    /// Guess package and nesting from a dotted name using the Java naming
    /// convention: leading lower-case segments form the package, the first
    /// segment starting with an upper-case letter starts the class chain.
    ///
    /// ```
    /// # use autodelegate_codegen::ClassName;
    /// let name = ClassName::best_guess("foo.bar.Enclosing.C").unwrap();
    /// assert_eq!(name.package(), "foo.bar");
    /// assert_eq!(name.simple_names(), ["Enclosing", "C"]);
    /// ```
    pub fn best_guess(name: &str) -> Option<Self> {
        let segments: Vec<&str> = name.trim().split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        let first_class = segments
            .iter()
            .position(|s| s.chars().next().is_some_and(char::is_uppercase))
            .unwrap_or(segments.len() - 1);
        let package = segments[..first_class].join(".");
        let simple_names = segments[first_class..]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self::new(package, simple_names)
    }

    /// Package name, empty for the unnamed package.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Simple names from the top-level class down to this class.
    pub fn simple_names(&self) -> &[String] {
        &self.simple_names
    }

    /// Simple name of this class.
    pub fn simple_name(&self) -> &str {
        // Non-empty by construction.
        self.simple_names.last().map(String::as_str).unwrap_or("")
    }

    /// The class this one is nested in, if any.
    pub fn enclosing(&self) -> Option<ClassName> {
        if self.simple_names.len() < 2 {
            return None;
        }
        Some(Self {
            package: self.package.clone(),
            simple_names: self.simple_names[..self.simple_names.len() - 1].to_vec(),
        })
    }

    /// The outermost class of the nesting chain.
    pub fn top_level(&self) -> ClassName {
        Self {
            package: self.package.clone(),
            simple_names: vec![self.simple_names[0].clone()],
        }
    }

    /// A top-level class in the same package.
    pub fn peer(&self, simple_name: impl Into<String>) -> ClassName {
        Self {
            package: self.package.clone(),
            simple_names: vec![simple_name.into()],
        }
    }

    /// Whether this class is nested in another one.
    pub fn is_nested(&self) -> bool {
        self.simple_names.len() > 1
    }

    /// Name relative to the package, e.g. `Enclosing.C`.
    pub fn relative(&self) -> String {
        self.simple_names.join(".")
    }

    /// Fully qualified, dotted name.
    pub fn qualified(&self) -> String {
        if self.package.is_empty() {
            self.relative()
        } else {
            format!("{}.{}", self.package, self.relative())
        }
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

impl Serialize for ClassName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Name of the class generated for `annotated`: a top-level peer of its
/// outermost class, named after the whole nesting chain.
///
/// ```
/// # use autodelegate_codegen::{names::generated_name, ClassName};
/// let c = ClassName::best_guess("foo.bar.Enclosing.C").unwrap();
/// assert_eq!(generated_name(&c).qualified(), "foo.bar.AutoDelegate_Enclosing_C");
/// ```
pub fn generated_name(annotated: &ClassName) -> ClassName {
    annotated.peer(format!(
        "{GENERATED_PREFIX}{}",
        annotated.simple_names().join("_")
    ))
}

/// Suggested field name for a delegate whose interface has the given simple name.
pub fn default_field_name(interface: &ClassName) -> String {
    format!("__{}{DEFAULT_FIELD_SUFFIX}", interface.simple_name())
}

// ── Identifiers ──────────────────────────────────────────────────────────────

/// Whether `name` can be used as a Java field or parameter name.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_' || first == '$') {
        return false;
    }
    if !chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
        return false;
    }
    !JAVA_KEYWORDS.contains(&name)
}

/// Hands out unique identifiers, suffixing suggestions with `_` until they
/// no longer clash with a reserved or previously allocated name.
#[derive(Debug, Default, Clone)]
pub struct NameAllocator {
    taken: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as used. Returns `false` if it was already taken.
    pub fn reserve(&mut self, name: impl Into<String>) -> bool {
        self.taken.insert(name.into())
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Allocate a fresh name derived from `suggestion`.
    pub fn allocate(&mut self, suggestion: &str) -> String {
        let mut name: String = suggestion
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '_' || c == '$' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if name.chars().next().map_or(true, |c| c.is_numeric()) {
            name.insert(0, '_');
        }
        while !is_valid_identifier(&name) || self.taken.contains(&name) {
            name.push('_');
        }
        self.taken.insert(name.clone());
        name
    }
}

// ── TypeName ─────────────────────────────────────────────────────────────────

/// A Java type as written in a member signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeName {
    Void,
    Primitive(String),
    Declared {
        class: ClassName,
        args: Vec<TypeName>,
    },
    Array(Box<TypeName>),
    Wildcard {
        bound: Option<(WildcardBound, Box<TypeName>)>,
    },
}

/// Direction of a bounded wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    Extends,
    Super,
}

impl TypeName {
    /// A declared, non-parameterised type.
    pub fn class(class: ClassName) -> Self {
        TypeName::Declared {
            class,
            args: Vec::new(),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeName::Void)
    }

    /// The class of a plain declared type, `None` for anything else.
    pub fn as_class(&self) -> Option<&ClassName> {
        match self {
            TypeName::Declared { class, args } if args.is_empty() => Some(class),
            _ => None,
        }
    }

    /// Every class referenced anywhere in this type, in reading order.
    pub fn referenced_classes(&self) -> Vec<&ClassName> {
        let mut out = Vec::new();
        self.collect_classes(&mut out);
        out
    }

    fn collect_classes<'a>(&'a self, out: &mut Vec<&'a ClassName>) {
        match self {
            TypeName::Void | TypeName::Primitive(_) => {}
            TypeName::Declared { class, args } => {
                out.push(class);
                for arg in args {
                    arg.collect_classes(out);
                }
            }
            TypeName::Array(component) => component.collect_classes(out),
            TypeName::Wildcard { bound } => {
                if let Some((_, ty)) = bound {
                    ty.collect_classes(out);
                }
            }
        }
    }

    /// Write this type, naming each class through `class_name`.
    pub fn write_with(
        &self,
        out: &mut impl fmt::Write,
        class_name: &dyn Fn(&ClassName) -> String,
    ) -> fmt::Result {
        match self {
            TypeName::Void => out.write_str("void"),
            TypeName::Primitive(name) => out.write_str(name),
            TypeName::Declared { class, args } => {
                out.write_str(&class_name(class))?;
                if !args.is_empty() {
                    out.write_char('<')?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.write_str(", ")?;
                        }
                        arg.write_with(out, class_name)?;
                    }
                    out.write_char('>')?;
                }
                Ok(())
            }
            TypeName::Array(component) => {
                component.write_with(out, class_name)?;
                out.write_str("[]")
            }
            TypeName::Wildcard { bound } => {
                out.write_char('?')?;
                match bound {
                    Some((WildcardBound::Extends, ty)) => {
                        out.write_str(" extends ")?;
                        ty.write_with(out, class_name)
                    }
                    Some((WildcardBound::Super, ty)) => {
                        out.write_str(" super ")?;
                        ty.write_with(out, class_name)
                    }
                    None => Ok(()),
                }
            }
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_with(f, &|class| class.qualified())
    }
}

impl Serialize for TypeName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for TypeName {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = TypeParser {
            src: s,
            rest: s.trim_start(),
        };
        let ty = parser.parse_type()?;
        if !parser.rest.trim().is_empty() {
            return Err(parser.error());
        }
        Ok(ty)
    }
}

/// Recursive-descent parser for type text such as
/// `java.util.Map<java.lang.String, ? extends foo.Bar>[]`.
struct TypeParser<'a> {
    src: &'a str,
    rest: &'a str,
}

impl<'a> TypeParser<'a> {
    fn error(&self) -> CodegenError {
        CodegenError::InvalidTypeName(self.src.to_string())
    }

    fn eat(&mut self, token: char) -> bool {
        if let Some(rest) = self.rest.strip_prefix(token) {
            self.rest = rest.trim_start();
            true
        } else {
            false
        }
    }

    fn word(&mut self) -> Option<&'a str> {
        let end = self
            .rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$' || c == '.'))
            .unwrap_or(self.rest.len());
        if end == 0 {
            return None;
        }
        let (word, rest) = self.rest.split_at(end);
        self.rest = rest.trim_start();
        Some(word)
    }

    fn parse_type(&mut self) -> Result<TypeName, CodegenError> {
        let mut ty = if self.eat('?') {
            self.parse_wildcard()?
        } else {
            let word = self.word().ok_or_else(|| self.error())?.to_string();
            match word.as_str() {
                "void" => TypeName::Void,
                w if PRIMITIVES.contains(&w) => TypeName::Primitive(word),
                _ => {
                    let class = ClassName::best_guess(&word).ok_or_else(|| self.error())?;
                    let mut args = Vec::new();
                    if self.eat('<') {
                        loop {
                            args.push(self.parse_type()?);
                            if self.eat('>') {
                                break;
                            }
                            if !self.eat(',') {
                                return Err(self.error());
                            }
                        }
                    }
                    TypeName::Declared { class, args }
                }
            }
        };
        while self.eat('[') {
            if !self.eat(']') || ty.is_void() {
                return Err(self.error());
            }
            ty = TypeName::Array(Box::new(ty));
        }
        Ok(ty)
    }

    fn parse_wildcard(&mut self) -> Result<TypeName, CodegenError> {
        let save = self.rest;
        let bound = match self.word() {
            Some("extends") => Some(WildcardBound::Extends),
            Some("super") => Some(WildcardBound::Super),
            _ => {
                self.rest = save;
                None
            }
        };
        match bound {
            Some(kind) => Ok(TypeName::Wildcard {
                bound: Some((kind, Box::new(self.parse_type()?))),
            }),
            None => Ok(TypeName::Wildcard { bound: None }),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
