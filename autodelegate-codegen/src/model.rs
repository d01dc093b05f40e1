//! Validated specifications and the generated class model
//!
//! [`DelegationSpec`] is what validation proves about an annotated type.
//! [`ClassModel`] is the data-only description of the class to generate;
//! rendering it to Java text is the job of [`crate::java`].

use serde::Serialize;

use crate::names::{ClassName, TypeName};

// ── DelegationSpec ───────────────────────────────────────────────────────────

/// One interface to forward to, with the field that holds the delegate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delegate {
    pub interface: ClassName,
    pub field_name: String,
}

/// A fully validated `@AutoDelegate` request.
///
/// Only [`crate::validate::validate`] creates these: every delegate names an
/// interface, `extend_type` names a class, and interfaces and field names
/// are unique and in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelegationSpec {
    annotated: ClassName,
    target_name: ClassName,
    extend_type: ClassName,
    delegates: Vec<Delegate>,
}

impl DelegationSpec {
    pub(crate) fn new(
        annotated: ClassName,
        target_name: ClassName,
        extend_type: ClassName,
        delegates: Vec<Delegate>,
    ) -> Self {
        Self {
            annotated,
            target_name,
            extend_type,
            delegates,
        }
    }

    /// The user's annotated class.
    pub fn annotated(&self) -> &ClassName {
        &self.annotated
    }

    /// The class to generate.
    pub fn target_name(&self) -> &ClassName {
        &self.target_name
    }

    pub fn extend_type(&self) -> &ClassName {
        &self.extend_type
    }

    pub fn delegates(&self) -> &[Delegate] {
        &self.delegates
    }
}

// ── ClassModel ───────────────────────────────────────────────────────────────

/// A `private final` field holding one delegate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldModel {
    pub name: String,
    pub ty: ClassName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterModel {
    pub name: String,
    pub ty: TypeName,
}

/// A generated constructor: delegate parameters first, then the forwarded
/// super-constructor's parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstructorModel {
    pub parameters: Vec<ParameterModel>,
    pub varargs: bool,
    pub thrown: Vec<TypeName>,
    /// Parameter names passed to `super(...)`, in order.
    pub super_arguments: Vec<String>,
    /// Fields assigned from the parameter of the same name, in order.
    pub assigned_fields: Vec<String>,
}

/// A generated `@Override` forwarding to one delegate field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodModel {
    pub name: String,
    pub return_type: TypeName,
    pub parameters: Vec<ParameterModel>,
    pub varargs: bool,
    pub thrown: Vec<TypeName>,
    /// Field whose method is called.
    pub delegate_field: String,
}

impl MethodModel {
    /// Whether the forwarded call's result is returned.
    pub fn returns_value(&self) -> bool {
        !self.return_type.is_void()
    }
}

/// Everything needed to render the generated abstract class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassModel {
    pub name: ClassName,
    pub superclass: ClassName,
    pub interfaces: Vec<ClassName>,
    pub fields: Vec<FieldModel>,
    pub constructors: Vec<ConstructorModel>,
    pub methods: Vec<MethodModel>,
}

impl ClassModel {
    /// Methods with the given name, in generation order.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodModel> {
        self.methods.iter().filter(move |m| m.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldModel> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Every class the model refers to, in reading order, duplicates included.
    pub fn referenced_classes(&self) -> Vec<&ClassName> {
        let mut out = vec![&self.superclass];
        out.extend(self.interfaces.iter());
        out.extend(self.fields.iter().map(|f| &f.ty));
        for ctor in &self.constructors {
            for p in &ctor.parameters {
                out.extend(p.ty.referenced_classes());
            }
            for t in &ctor.thrown {
                out.extend(t.referenced_classes());
            }
        }
        for method in &self.methods {
            out.extend(method.return_type.referenced_classes());
            for p in &method.parameters {
                out.extend(p.ty.referenced_classes());
            }
            for t in &method.thrown {
                out.extend(t.referenced_classes());
            }
        }
        out
    }
}
