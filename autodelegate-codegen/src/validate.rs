//! `@AutoDelegate` validator
//!
//! Turns an annotated type and its metadata into a [`DelegationSpec`], or
//! explains why it cannot (yet). Structural checks are independent and all of
//! them run, so a type gets every applicable error in one go. A metadata value
//! that does not resolve in this round defers the whole type instead.

use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, Location};
use crate::metadata::{DelegateEntry, DelegateMetadata};
use crate::model::{Delegate, DelegationSpec};
use crate::names::{default_field_name, generated_name, is_valid_identifier, ClassName, NameAllocator};
use crate::symbols::{Modifier, Resolution, SuperclassRef, SymbolTable, TypeDecl, TypeKind};

/// Outcome of validating one annotated type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Everything checks out.
    Spec(DelegationSpec),
    /// Some referenced type does not exist yet; try again next round.
    Deferred,
    /// Errors were reported; the type is never retried.
    Invalid,
}

/// Validate `ty` against the current round's symbols, reporting errors to `sink`.
pub fn validate(ty: &TypeDecl, symbols: &dyn SymbolTable, sink: &mut dyn DiagnosticSink) -> Validation {
    let mut errors: Vec<Diagnostic> = Vec::new();
    let target = generated_name(&ty.name);

    check_kind(ty, &mut errors);
    check_nesting(ty, symbols, &mut errors);
    check_superclass(ty, &target, &mut errors);

    let metadata = ty.metadata.clone().unwrap_or_default();
    let parsed = parse_metadata(ty, &metadata, symbols, &mut errors);

    if !errors.is_empty() {
        debug!(ty = %ty.name, errors = errors.len(), "invalid @AutoDelegate type");
        for error in errors {
            sink.report(error);
        }
        return Validation::Invalid;
    }

    match parsed {
        Some((delegates, extend)) => {
            Validation::Spec(DelegationSpec::new(ty.name.clone(), target, extend, delegates))
        }
        None => Validation::Deferred,
    }
}

// ── Structural checks ─────────────────────────────────────────────────────────

fn check_kind(ty: &TypeDecl, errors: &mut Vec<Diagnostic>) {
    if ty.kind != TypeKind::Class {
        errors.push(Diagnostic::error(
            DiagnosticCode::WrongType,
            format!(
                "@AutoDelegate only applies to classes, not to {} {}",
                ty.kind.label(),
                ty.name.simple_name()
            ),
            type_location(ty),
        ));
    }
}

fn check_nesting(ty: &TypeDecl, symbols: &dyn SymbolTable, errors: &mut Vec<Diagnostic>) {
    let Some(enclosing) = ty.name.enclosing() else {
        return;
    };
    if ty.has_modifier(Modifier::Private) {
        errors.push(Diagnostic::error(
            DiagnosticCode::Private,
            "@AutoDelegate class must not be private",
            type_location(ty),
        ));
    }
    // Member types of interfaces are implicitly static.
    let implicitly_static = symbols
        .lookup(&enclosing)
        .is_some_and(|decl| matches!(decl.kind, TypeKind::Interface | TypeKind::Annotation));
    if !ty.has_modifier(Modifier::Static) && !implicitly_static {
        errors.push(Diagnostic::error(
            DiagnosticCode::Inner,
            "Nested @AutoDelegate class must be static",
            type_location(ty),
        ));
    }
}

fn check_superclass(ty: &TypeDecl, target: &ClassName, errors: &mut Vec<Diagnostic>) {
    match &ty.superclass {
        SuperclassRef::None | SuperclassRef::Unresolved(_) => {}
        SuperclassRef::Resolved(name) if name == target => {}
        SuperclassRef::Resolved(name) => errors.push(Diagnostic::error(
            DiagnosticCode::SuperClassMismatch,
            format!(
                "@AutoDelegate super class must be the to-be-generated class {}, found {}",
                target.simple_name(),
                name
            ),
            type_location(ty),
        )),
    }
}

// ── Metadata ──────────────────────────────────────────────────────────────────

/// An interface entry that resolved and is not a duplicate.
struct Accepted<'m> {
    interface: ClassName,
    entry: &'m DelegateEntry,
}

/// Resolve the annotation payload. `None` means a referenced type is not
/// available yet; errors found before that point are kept.
fn parse_metadata(
    ty: &TypeDecl,
    metadata: &DelegateMetadata,
    symbols: &dyn SymbolTable,
    errors: &mut Vec<Diagnostic>,
) -> Option<(Vec<Delegate>, ClassName)> {
    let mut accepted: Vec<Accepted<'_>> = Vec::new();
    let mut explicit_names: Vec<&str> = Vec::new();

    for (index, entry) in metadata.delegates.iter().enumerate() {
        let location = Location::Delegate {
            ty: ty.name.clone(),
            index,
        };
        let interface = match symbols.resolve(&entry.interface) {
            Resolution::Unresolved => {
                debug!(ty = %ty.name, value = %entry.interface, "deferring, delegate does not resolve yet");
                return None;
            }
            Resolution::NotDeclared => {
                errors.push(not_interface(&entry.interface, location.clone()));
                None
            }
            Resolution::Resolved(decl) if decl.kind != TypeKind::Interface => {
                errors.push(not_interface(&decl.name.qualified(), location.clone()));
                None
            }
            Resolution::Resolved(decl) => Some(decl.name.clone()),
        };

        if let Some(name) = &entry.name {
            if !is_valid_identifier(name) {
                errors.push(Diagnostic::error(
                    DiagnosticCode::InvalidName,
                    format!("@AutoDelegate field name `{name}` is not a valid Java identifier"),
                    location.clone(),
                ));
            } else if explicit_names.contains(&name.as_str()) {
                errors.push(Diagnostic::error(
                    DiagnosticCode::DuplicateName,
                    format!("@AutoDelegate field name `{name}` is already used by another delegate"),
                    location.clone(),
                ));
            } else {
                explicit_names.push(name);
            }
        }

        let Some(interface) = interface else {
            continue;
        };
        if accepted.iter().any(|a| a.interface == interface) {
            errors.push(Diagnostic::error(
                DiagnosticCode::DuplicateInterface,
                format!("@AutoDelegate already delegates to {interface}"),
                location,
            ));
            continue;
        }
        accepted.push(Accepted {
            interface,
            entry,
        });
    }

    let extend = match &metadata.extend {
        None => symbols.root_type(),
        Some(value) => {
            let location = Location::Extend {
                ty: ty.name.clone(),
            };
            match symbols.resolve(value) {
                Resolution::Unresolved => {
                    debug!(ty = %ty.name, value = %value, "deferring, extend does not resolve yet");
                    return None;
                }
                Resolution::Resolved(decl) if decl.kind == TypeKind::Class => decl.name.clone(),
                Resolution::Resolved(decl) => {
                    errors.push(extend_not_class(&decl.name.qualified(), location));
                    symbols.root_type()
                }
                Resolution::NotDeclared => {
                    errors.push(extend_not_class(value, location));
                    symbols.root_type()
                }
            }
        }
    };

    Some((allocate_fields(&accepted), extend))
}

/// Explicit names are reserved first so synthesised ones never take them,
/// whatever their position.
fn allocate_fields(accepted: &[Accepted<'_>]) -> Vec<Delegate> {
    let mut names = NameAllocator::new();
    for a in accepted {
        if let Some(name) = &a.entry.name {
            names.reserve(name.clone());
        }
    }
    accepted
        .iter()
        .map(|a| Delegate {
            interface: a.interface.clone(),
            field_name: match &a.entry.name {
                Some(name) => name.clone(),
                None => names.allocate(&default_field_name(&a.interface)),
            },
        })
        .collect()
}

fn type_location(ty: &TypeDecl) -> Location {
    Location::Type {
        ty: ty.name.clone(),
    }
}

fn not_interface(value: &str, location: Location) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::NotInterface,
        format!("@AutoDelegate class can only delegate to interfaces, {value} is not an interface"),
        location,
    )
}

fn extend_not_class(value: &str, location: Location) -> Diagnostic {
    Diagnostic::error(
        DiagnosticCode::ExtendNotClass,
        format!("@AutoDelegate super class must be a class, {value} is not a class"),
        location,
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
