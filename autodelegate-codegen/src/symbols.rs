//! Symbol model
//!
//! The view of the host compiler's symbol table the generator works against:
//! declared types with their members, and the resolution of annotation values
//! that may name types which do not exist yet in the current round.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::metadata::DelegateMetadata;
use crate::names::{ClassName, TypeName};

/// Kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
}

impl TypeKind {
    /// Keyword-ish label used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Annotation => "annotation type",
            TypeKind::Record => "record",
        }
    }
}

/// Declaration modifiers the generator cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Default,
}

/// A parameter of a method or constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSymbol {
    pub name: String,
    pub ty: TypeName,
}

/// Identity of a method for override purposes: name plus parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodSignature {
    pub name: String,
    pub parameter_types: Vec<String>,
}

impl std::fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.parameter_types.join(", "))
    }
}

/// A method member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSymbol {
    pub name: String,
    pub return_type: TypeName,
    pub parameters: Vec<ParameterSymbol>,
    /// Last parameter is variable-arity.
    pub varargs: bool,
    pub thrown: Vec<TypeName>,
    pub modifiers: Vec<Modifier>,
    /// Type that declares this method.
    pub declared_in: ClassName,
}

impl MethodSymbol {
    pub fn signature(&self) -> MethodSignature {
        MethodSignature {
            name: self.name.clone(),
            parameter_types: self.parameters.iter().map(|p| p.ty.to_string()).collect(),
        }
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(&Modifier::Static)
    }

    pub fn is_private(&self) -> bool {
        self.modifiers.contains(&Modifier::Private)
    }
}

/// A constructor member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorSymbol {
    pub parameters: Vec<ParameterSymbol>,
    pub varargs: bool,
    pub thrown: Vec<TypeName>,
    pub modifiers: Vec<Modifier>,
}

/// The superclass clause of a declaration as the compiler currently sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuperclassRef {
    /// Interfaces and annotation types have no superclass.
    None,
    /// A type that exists in this round.
    Resolved(ClassName),
    /// A name that does not resolve (yet), as written.
    Unresolved(String),
}

/// A declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: ClassName,
    pub kind: TypeKind,
    pub modifiers: Vec<Modifier>,
    pub superclass: SuperclassRef,
    /// Directly implemented (classes) or extended (interfaces) interfaces.
    pub interfaces: Vec<ClassName>,
    pub methods: Vec<MethodSymbol>,
    pub constructors: Vec<ConstructorSymbol>,
    /// The `@AutoDelegate` annotation, when present.
    pub metadata: Option<DelegateMetadata>,
}

impl TypeDecl {
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// Outcome of resolving an annotation value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// A declared type visible in this round.
    Resolved(&'a TypeDecl),
    /// A well-formed name with no declaration yet.
    Unresolved,
    /// A value that can never denote a declared type (primitive, array, `void`).
    NotDeclared,
}

/// The host compiler's symbol table for the current round.
pub trait SymbolTable {
    /// Declaration of `name`, if visible in this round.
    fn lookup(&self, name: &ClassName) -> Option<&TypeDecl>;

    /// The universal root type every class extends.
    fn root_type(&self) -> ClassName;

    /// Resolve a type named in annotation metadata.
    fn resolve(&self, value: &str) -> Resolution<'_> {
        let Ok(ty) = value.parse::<TypeName>() else {
            return Resolution::NotDeclared;
        };
        match ty.as_class() {
            Some(class) => match self.lookup(class) {
                Some(decl) => Resolution::Resolved(decl),
                None => Resolution::Unresolved,
            },
            None => Resolution::NotDeclared,
        }
    }

    /// All methods that are members of `ty`: its own declarations, then those
    /// inherited from super-interfaces depth-first in declaration order, then
    /// the root type's. A declaration hides any later one with the same
    /// signature.
    fn all_methods(&self, ty: &TypeDecl) -> Vec<MethodSymbol> {
        fn walk<T: SymbolTable + ?Sized>(
            symbols: &T,
            ty: &TypeDecl,
            visited: &mut HashSet<ClassName>,
            seen: &mut HashSet<MethodSignature>,
            out: &mut Vec<MethodSymbol>,
        ) {
            if !visited.insert(ty.name.clone()) {
                return;
            }
            for method in &ty.methods {
                if seen.insert(method.signature()) {
                    out.push(method.clone());
                }
            }
            for parent in &ty.interfaces {
                if let Some(decl) = symbols.lookup(parent) {
                    walk(symbols, decl, visited, seen, out);
                }
            }
        }

        let mut visited = HashSet::new();
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        walk(self, ty, &mut visited, &mut seen, &mut out);
        if let Some(root) = self.lookup(&self.root_type()) {
            walk(self, root, &mut visited, &mut seen, &mut out);
        }
        out
    }
}
