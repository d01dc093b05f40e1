//! Class model synthesis
//!
//! Builds the [`ClassModel`] for a validated [`DelegationSpec`] from the
//! symbols of the current round: one field per delegate, one constructor per
//! constructor of the extended class, and one forwarding method per unique
//! interface method signature.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{CodegenError, CodegenResult};
use crate::model::{ClassModel, ConstructorModel, DelegationSpec, FieldModel, MethodModel, ParameterModel};
use crate::names::{ClassName, NameAllocator, TypeName};
use crate::symbols::{ConstructorSymbol, MethodSignature, MethodSymbol, SymbolTable, TypeDecl, TypeKind};

/// Outcome of synthesising one spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Synthesis {
    Generated(Synthesized),
    /// A super-interface of some delegate is not visible yet.
    Deferred,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesized {
    pub model: ClassModel,
    /// Signatures reachable through more than one delegate interface.
    pub collisions: Vec<SignatureCollision>,
}

/// A method signature declared by several delegate interfaces. Only the
/// first interface in declaration order is forwarded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureCollision {
    pub signature: MethodSignature,
    pub chosen: ClassName,
    pub shadowed: Vec<ClassName>,
}

/// Synthesise the class model for `spec`.
///
/// Fails with [`CodegenError::Internal`] if the symbols contradict the validated request,
/// e.g. a delegate that no longer names a visible interface.
pub fn synthesize(spec: &DelegationSpec, symbols: &dyn SymbolTable) -> CodegenResult<Synthesis> {
    let type_name = spec.annotated().qualified();

    let mut interfaces = Vec::with_capacity(spec.delegates().len());
    for delegate in spec.delegates() {
        let decl = symbols.lookup(&delegate.interface).ok_or_else(|| {
            CodegenError::internal(&type_name, format!("delegate {} is not visible", delegate.interface))
        })?;
        if decl.kind != TypeKind::Interface {
            return Err(CodegenError::internal(
                &type_name,
                format!("delegate {} is not an interface", delegate.interface),
            ));
        }
        if let Some(missing) = missing_super_interface(decl, symbols) {
            debug!(ty = %type_name, interface = %delegate.interface, %missing, "deferring, super-interface not visible yet");
            return Ok(Synthesis::Deferred);
        }
        interfaces.push(decl);
    }

    let extend = symbols.lookup(spec.extend_type()).ok_or_else(|| {
        CodegenError::internal(&type_name, format!("super class {} is not visible", spec.extend_type()))
    })?;
    if extend.kind != TypeKind::Class {
        return Err(CodegenError::internal(
            &type_name,
            format!("super class {} is not a class", spec.extend_type()),
        ));
    }

    let fields: Vec<FieldModel> = spec
        .delegates()
        .iter()
        .map(|d| FieldModel {
            name: d.field_name.clone(),
            ty: d.interface.clone(),
        })
        .collect();

    let constructors = extend
        .constructors
        .iter()
        .map(|ctor| forward_constructor(ctor, &fields))
        .collect();

    let (methods, collisions) = forward_methods(spec, &interfaces, symbols);

    let model = ClassModel {
        name: spec.target_name().clone(),
        superclass: spec.extend_type().clone(),
        interfaces: spec.delegates().iter().map(|d| d.interface.clone()).collect(),
        fields,
        constructors,
        methods,
    };
    debug!(
        ty = %type_name,
        constructors = model.constructors.len(),
        methods = model.methods.len(),
        "synthesized class model"
    );
    Ok(Synthesis::Generated(Synthesized { model, collisions }))
}

/// First super-interface (transitively) with no visible declaration.
fn missing_super_interface(decl: &TypeDecl, symbols: &dyn SymbolTable) -> Option<ClassName> {
    let mut visited = HashSet::new();
    let mut stack = vec![decl];
    while let Some(current) = stack.pop() {
        if !visited.insert(current.name.clone()) {
            continue;
        }
        for parent in &current.interfaces {
            match symbols.lookup(parent) {
                Some(parent) => stack.push(parent),
                None => return Some(parent.clone()),
            }
        }
    }
    None
}

/// Delegate parameters first, then the super constructor's own parameters,
/// renamed where they would shadow a delegate parameter.
fn forward_constructor(ctor: &ConstructorSymbol, fields: &[FieldModel]) -> ConstructorModel {
    let mut names = NameAllocator::new();
    for field in fields {
        names.reserve(field.name.clone());
    }

    let mut parameters: Vec<ParameterModel> = fields
        .iter()
        .map(|f| ParameterModel {
            name: f.name.clone(),
            ty: TypeName::class(f.ty.clone()),
        })
        .collect();
    let mut super_arguments = Vec::with_capacity(ctor.parameters.len());
    for param in &ctor.parameters {
        let name = names.allocate(&param.name);
        super_arguments.push(name.clone());
        parameters.push(ParameterModel {
            name,
            ty: param.ty.clone(),
        });
    }

    ConstructorModel {
        parameters,
        varargs: ctor.varargs,
        thrown: ctor.thrown.clone(),
        super_arguments,
        assigned_fields: fields.iter().map(|f| f.name.clone()).collect(),
    }
}

fn forward_methods(
    spec: &DelegationSpec,
    interfaces: &[&TypeDecl],
    symbols: &dyn SymbolTable,
) -> (Vec<MethodModel>, Vec<SignatureCollision>) {
    let root = symbols.root_type();
    let mut methods = Vec::new();
    // signature -> index into `collisions`, or None while only one owner is known
    let mut owners: HashMap<MethodSignature, (ClassName, Option<usize>)> = HashMap::new();
    let mut collisions: Vec<SignatureCollision> = Vec::new();

    for (delegate, interface) in spec.delegates().iter().zip(interfaces) {
        // Hiding within one interface is already resolved by `all_methods`.
        for method in symbols.all_methods(interface) {
            if !is_forwardable(&method, &root) {
                continue;
            }
            let signature = method.signature();
            match owners.get_mut(&signature) {
                Some((chosen, slot)) => {
                    let index = *slot.get_or_insert_with(|| {
                        collisions.push(SignatureCollision {
                            signature: signature.clone(),
                            chosen: chosen.clone(),
                            shadowed: Vec::new(),
                        });
                        collisions.len() - 1
                    });
                    collisions[index].shadowed.push(delegate.interface.clone());
                }
                None => {
                    owners.insert(signature, (delegate.interface.clone(), None));
                    methods.push(forward_method(&method, &delegate.field_name));
                }
            }
        }
    }
    (methods, collisions)
}

fn is_forwardable(method: &MethodSymbol, root: &ClassName) -> bool {
    !method.is_static() && !method.is_private() && method.declared_in != *root
}

fn forward_method(method: &MethodSymbol, field: &str) -> MethodModel {
    MethodModel {
        name: method.name.clone(),
        return_type: method.return_type.clone(),
        parameters: method
            .parameters
            .iter()
            .map(|p| ParameterModel {
                name: p.name.clone(),
                ty: p.ty.clone(),
            })
            .collect(),
        varargs: method.varargs,
        thrown: method.thrown.clone(),
        delegate_field: field.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Delegate;
    use crate::snapshot::Snapshot;

    const TYPES_TOML: &str = r#"
[[types]]
name = "foo.bar.I"
kind = "interface"

[[types.methods]]
name = "i"

[[types]]
name = "baz.qux.I"
kind = "interface"

[[types.methods]]
name = "i"
returns = "boolean"
parameters = [{ name = "p", type = "int" }]

[[types]]
name = "foo.bar.S"
kind = "class"

[[types.constructors]]
parameters = [{ name = "p1", type = "int" }]

[[types.constructors]]
parameters = [{ name = "p1", type = "int" }, { name = "p2", type = "boolean" }]

[[types]]
name = "foo.bar.Base"
kind = "interface"

[[types.methods]]
name = "describe"
returns = "java.lang.String"

[[types.methods]]
name = "of"
returns = "foo.bar.Base"
modifiers = ["static"]

[[types.methods]]
name = "helper"
modifiers = ["private"]

[[types.methods]]
name = "toString"
returns = "java.lang.String"

[[types]]
name = "foo.bar.Derived"
kind = "interface"
interfaces = ["foo.bar.Base", "java.lang.AutoCloseable"]

[[types.methods]]
name = "describe"
returns = "java.lang.String"
throws = ["java.io.IOException"]

[[types]]
name = "java.lang.AutoCloseable"
kind = "interface"

[[types.methods]]
name = "close"
throws = ["java.lang.Exception"]

[[types]]
name = "foo.bar.Runner"
kind = "interface"

[[types.methods]]
name = "run"

[[types.methods]]
name = "format"
returns = "java.lang.String"
varargs = true
parameters = [{ name = "args", type = "java.lang.Object[]" }]

[[types]]
name = "foo.bar.OtherRunner"
kind = "interface"

[[types.methods]]
name = "run"

[[types]]
name = "foo.bar.Orphan"
kind = "interface"
interfaces = ["foo.bar.Later"]

[[types]]
name = "foo.bar.Later"
kind = "interface"
round = 2

[[types]]
name = "foo.bar.Named"
kind = "class"

[[types.constructors]]
parameters = [{ name = "delegate", type = "java.lang.String" }, { name = "rest", type = "int[]" }]
varargs = true
throws = ["java.io.IOException"]
"#;

    fn class(name: &str) -> ClassName {
        ClassName::best_guess(name).unwrap()
    }

    fn spec(extend: &str, delegates: &[(&str, &str)]) -> DelegationSpec {
        DelegationSpec::new(
            class("foo.bar.C"),
            class("foo.bar.AutoDelegate_C"),
            class(extend),
            delegates
                .iter()
                .map(|(interface, field)| Delegate {
                    interface: class(interface),
                    field_name: field.to_string(),
                })
                .collect(),
        )
    }

    fn generated(spec: &DelegationSpec) -> Synthesized {
        let snapshot = Snapshot::from_toml(TYPES_TOML).unwrap();
        match synthesize(spec, &snapshot).unwrap() {
            Synthesis::Generated(s) => s,
            Synthesis::Deferred => panic!("unexpected deferral"),
        }
    }

    #[test]
    fn simple_case() {
        let out = generated(&spec("java.lang.Object", &[("foo.bar.I", "i")]));
        let model = out.model;
        assert_eq!(model.name.qualified(), "foo.bar.AutoDelegate_C");
        assert_eq!(model.interfaces, [class("foo.bar.I")]);
        assert_eq!(model.fields.len(), 1);
        assert_eq!(model.constructors.len(), 1);
        let ctor = &model.constructors[0];
        assert_eq!(ctor.parameters.len(), 1);
        assert!(ctor.super_arguments.is_empty());
        assert_eq!(ctor.assigned_fields, ["i"]);
        assert_eq!(model.methods.len(), 1);
        assert_eq!(model.methods[0].name, "i");
        assert_eq!(model.methods[0].delegate_field, "i");
        assert!(!model.methods[0].returns_value());
        assert!(out.collisions.is_empty());
    }

    #[test]
    fn multiple_interfaces_and_extend() {
        let model = generated(&spec("foo.bar.S", &[("foo.bar.I", "a"), ("baz.qux.I", "b")])).model;
        assert_eq!(model.constructors.len(), 2);
        for ctor in &model.constructors {
            let names: Vec<&str> = ctor.parameters.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(&names[..2], ["a", "b"]);
            assert_eq!(ctor.super_arguments, names[2..]);
        }
        assert_eq!(model.constructors[1].super_arguments, ["p1", "p2"]);

        assert_eq!(model.methods.len(), 2);
        assert_eq!(model.methods[0].delegate_field, "a");
        assert_eq!(model.methods[1].delegate_field, "b");
        assert!(model.methods[1].returns_value());
    }

    #[test]
    fn flattens_inherited_members_and_skips_excluded() {
        let model = generated(&spec("java.lang.Object", &[("foo.bar.Derived", "d")])).model;
        let names: Vec<&str> = model.methods.iter().map(|m| m.name.as_str()).collect();
        // Base.toString is declared by the interface itself, so it is forwarded.
        assert_eq!(names, ["describe", "toString", "close"]);

        let describe = model.methods_named("describe").next().unwrap();
        assert_eq!(describe.thrown.len(), 1);
        assert_eq!(describe.thrown[0].to_string(), "java.io.IOException");
        assert!(model.methods.iter().all(|m| m.name != "equals" && m.name != "hashCode"));
    }

    #[test]
    fn shared_signature_forwards_to_first_interface() {
        let out = generated(&spec(
            "java.lang.Object",
            &[("foo.bar.Runner", "first"), ("foo.bar.OtherRunner", "second")],
        ));
        let runs: Vec<&MethodModel> = out.model.methods_named("run").collect();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].delegate_field, "first");

        assert_eq!(out.collisions.len(), 1);
        let collision = &out.collisions[0];
        assert_eq!(collision.signature.to_string(), "run()");
        assert_eq!(collision.chosen, class("foo.bar.Runner"));
        assert_eq!(collision.shadowed, [class("foo.bar.OtherRunner")]);
    }

    #[test]
    fn varargs_methods_keep_their_arity() {
        let model = generated(&spec("java.lang.Object", &[("foo.bar.Runner", "r")])).model;
        let format = model.methods_named("format").next().unwrap();
        assert!(format.varargs);
        assert_eq!(format.parameters[0].ty.to_string(), "java.lang.Object[]");
    }

    #[test]
    fn constructor_parameters_renamed_around_fields() {
        let model = generated(&spec("foo.bar.Named", &[("foo.bar.I", "delegate")])).model;
        let ctor = &model.constructors[0];
        let names: Vec<&str> = ctor.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["delegate", "delegate_", "rest"]);
        assert_eq!(ctor.super_arguments, ["delegate_", "rest"]);
        assert_eq!(ctor.assigned_fields, ["delegate"]);
        assert!(ctor.varargs);
        assert_eq!(ctor.thrown[0].to_string(), "java.io.IOException");
    }

    #[test]
    fn missing_super_interface_defers() {
        let snapshot = Snapshot::from_toml(TYPES_TOML).unwrap();
        let spec = spec("java.lang.Object", &[("foo.bar.Orphan", "o")]);
        assert_eq!(synthesize(&spec, &snapshot).unwrap(), Synthesis::Deferred);

        let mut snapshot = snapshot;
        snapshot.set_round(2);
        assert!(matches!(
            synthesize(&spec, &snapshot).unwrap(),
            Synthesis::Generated(_)
        ));
    }

    #[test]
    fn contradicting_symbols_are_internal_errors() {
        let snapshot = Snapshot::from_toml(TYPES_TOML).unwrap();
        let err = synthesize(&spec("java.lang.Object", &[("foo.bar.S", "s")]), &snapshot).unwrap_err();
        assert!(matches!(err, CodegenError::Internal { .. }));
        assert!(err.to_string().contains("foo.bar.S is not an interface"));

        let err = synthesize(&spec("foo.bar.Missing", &[("foo.bar.I", "i")]), &snapshot).unwrap_err();
        assert!(err.to_string().contains("foo.bar.Missing is not visible"));
    }
}
