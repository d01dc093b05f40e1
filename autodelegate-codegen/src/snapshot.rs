//! In-memory symbol table loaded from TOML
//!
//! A snapshot describes the types of a compilation: declarations with their
//! members, `@AutoDelegate` payloads, and the round in which each type first
//! becomes visible. Generated classes are registered back so that later
//! rounds can resolve them, as the host compiler would after parsing the
//! emitted sources.
//!
//! ```toml
//! [options]
//! release = 17
//!
//! [[types]]
//! name = "foo.bar.I"
//! kind = "interface"
//!
//! [[types.methods]]
//! name = "i"
//!
//! [[types]]
//! name = "foo.bar.C"
//! kind = "class"
//! extends = "foo.bar.AutoDelegate_C"
//!
//! [[types.auto_delegate.delegates]]
//! interface = "foo.bar.I"
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::error::{CodegenError, CodegenResult};
use crate::metadata::DelegateMetadata;
use crate::model::{ClassModel, ParameterModel};
use crate::names::{ClassName, TypeName};
use crate::symbols::{
    ConstructorSymbol, MethodSymbol, Modifier, ParameterSymbol, SuperclassRef, SymbolTable,
    TypeDecl, TypeKind,
};

/// Qualified name of the root object type.
pub const ROOT_TYPE: &str = "java.lang.Object";

// ── File schema ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    options: GeneratorConfig,
    #[serde(default)]
    types: Vec<TypeDef>,
}

/// One `[[types]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDef {
    /// Qualified name, nested classes dotted after their enclosing class.
    pub name: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Superclass as written; classes without one extend the root type.
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
    #[serde(default)]
    pub constructors: Vec<ConstructorDef>,
    /// First round in which the type is visible (default 1).
    #[serde(default = "first_round")]
    pub round: usize,
    #[serde(default)]
    pub auto_delegate: Option<DelegateMetadata>,
}

/// One `[[types.methods]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    #[serde(default = "void")]
    pub returns: String,
    #[serde(default)]
    pub parameters: Vec<ParamDef>,
    #[serde(default)]
    pub varargs: bool,
    #[serde(default)]
    pub throws: Vec<String>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

/// One `[[types.constructors]]` entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstructorDef {
    #[serde(default)]
    pub parameters: Vec<ParamDef>,
    #[serde(default)]
    pub varargs: bool,
    #[serde(default)]
    pub throws: Vec<String>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

fn first_round() -> usize {
    1
}

fn void() -> String {
    "void".to_string()
}

// ── Snapshot ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Entry {
    /// Superclass as written, re-resolved whenever visibility changes.
    extends: Option<String>,
    round: usize,
    decl: TypeDecl,
}

/// A compilation's types, queried one round at a time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    options: GeneratorConfig,
    entries: Vec<Entry>,
    index: HashMap<ClassName, usize>,
    root: ClassName,
    round: usize,
}

impl Snapshot {
    /// Parse a snapshot from TOML.
    pub fn from_toml(s: &str) -> CodegenResult<Self> {
        let file: SnapshotFile = toml::from_str(s)?;
        Self::new(file.types, file.options)
    }

    /// Build a snapshot from type definitions; starts at round 1.
    pub fn new(types: Vec<TypeDef>, options: GeneratorConfig) -> CodegenResult<Self> {
        let root = ClassName::best_guess(ROOT_TYPE)
            .ok_or_else(|| CodegenError::invalid_snapshot("bad root type name"))?;
        let mut snapshot = Self {
            options,
            entries: Vec::new(),
            index: HashMap::new(),
            root: root.clone(),
            round: 1,
        };
        for def in types {
            let entry = convert(def, &root)?;
            snapshot.insert(entry)?;
        }
        if !snapshot.index.contains_key(&root) {
            snapshot.insert(root_entry(&root))?;
        }
        snapshot.refresh();
        Ok(snapshot)
    }

    pub fn options(&self) -> &GeneratorConfig {
        &self.options
    }

    /// Current round, starting at 1.
    pub fn round(&self) -> usize {
        self.round
    }

    /// Move to `round`, making the types that appear in it visible.
    pub fn set_round(&mut self, round: usize) {
        self.round = round.max(1);
        self.refresh();
    }

    /// Whether some types only become visible after the current round.
    pub fn has_later_rounds(&self) -> bool {
        self.entries.iter().any(|e| e.round > self.round)
    }

    /// Annotated types that become visible in `round`, in declaration order.
    pub fn annotated_in_round(&self, round: usize) -> Vec<ClassName> {
        self.entries
            .iter()
            .filter(|e| e.decl.metadata.is_some())
            .filter(|e| e.round == round || (round <= 1 && e.round <= 1))
            .map(|e| e.decl.name.clone())
            .collect()
    }

    /// Make a generated class visible from the current round on.
    pub fn register_generated(&mut self, model: &ClassModel) -> CodegenResult<()> {
        let entry = Entry {
            extends: Some(model.superclass.qualified()),
            round: self.round,
            decl: generated_decl(model),
        };
        if self.index.contains_key(&entry.decl.name) {
            return Err(CodegenError::DuplicateOutput {
                name: entry.decl.name.qualified(),
            });
        }
        self.insert(entry)?;
        self.refresh();
        Ok(())
    }

    fn insert(&mut self, entry: Entry) -> CodegenResult<()> {
        if self.index.contains_key(&entry.decl.name) {
            return Err(CodegenError::invalid_snapshot(format!(
                "type {} is declared twice",
                entry.decl.name
            )));
        }
        self.index.insert(entry.decl.name.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    fn is_visible(&self, entry: &Entry) -> bool {
        entry.round <= self.round
    }

    /// Re-resolve every superclass clause against the visible types.
    fn refresh(&mut self) {
        let resolved: Vec<SuperclassRef> = self
            .entries
            .iter()
            .map(|entry| self.resolve_superclass(entry))
            .collect();
        for (entry, superclass) in self.entries.iter_mut().zip(resolved) {
            entry.decl.superclass = superclass;
        }
    }

    fn resolve_superclass(&self, entry: &Entry) -> SuperclassRef {
        if entry.decl.kind != TypeKind::Class || entry.decl.name == self.root {
            return SuperclassRef::None;
        }
        let Some(written) = &entry.extends else {
            return SuperclassRef::Resolved(self.root.clone());
        };
        match ClassName::best_guess(written) {
            Some(name) if self.lookup(&name).is_some() => SuperclassRef::Resolved(name),
            _ => SuperclassRef::Unresolved(written.clone()),
        }
    }
}

impl SymbolTable for Snapshot {
    fn lookup(&self, name: &ClassName) -> Option<&TypeDecl> {
        let entry = &self.entries[*self.index.get(name)?];
        self.is_visible(entry).then_some(&entry.decl)
    }

    fn root_type(&self) -> ClassName {
        self.root.clone()
    }
}

// ── Conversion ───────────────────────────────────────────────────────────────

fn class_name(name: &str) -> CodegenResult<ClassName> {
    ClassName::best_guess(name).ok_or_else(|| CodegenError::InvalidTypeName(name.to_string()))
}

fn parameters(defs: &[ParamDef], varargs: bool, owner: &str) -> CodegenResult<Vec<ParameterSymbol>> {
    let params = defs
        .iter()
        .map(|p| -> CodegenResult<ParameterSymbol> {
            Ok(ParameterSymbol {
                name: p.name.clone(),
                ty: p.ty.parse()?,
            })
        })
        .collect::<CodegenResult<Vec<_>>>()?;
    if varargs && !matches!(params.last(), Some(ParameterSymbol { ty: TypeName::Array(_), .. })) {
        return Err(CodegenError::invalid_snapshot(format!(
            "{owner} is varargs but its last parameter is not an array"
        )));
    }
    Ok(params)
}

fn types(names: &[String]) -> CodegenResult<Vec<TypeName>> {
    names.iter().map(|t| t.parse()).collect()
}

fn convert(def: TypeDef, root: &ClassName) -> CodegenResult<Entry> {
    let name = class_name(&def.name)?;

    let methods = def
        .methods
        .iter()
        .map(|m| -> CodegenResult<MethodSymbol> {
            let mut modifiers = m.modifiers.clone();
            // Interface members are implicitly public.
            if def.kind == TypeKind::Interface
                && !modifiers.contains(&Modifier::Private)
                && !modifiers.contains(&Modifier::Public)
            {
                modifiers.push(Modifier::Public);
            }
            Ok(MethodSymbol {
                name: m.name.clone(),
                return_type: m.returns.parse()?,
                parameters: parameters(&m.parameters, m.varargs, &format!("{name}.{}", m.name))?,
                varargs: m.varargs,
                thrown: types(&m.throws)?,
                modifiers,
                declared_in: name.clone(),
            })
        })
        .collect::<CodegenResult<Vec<_>>>()?;

    let mut constructors = def
        .constructors
        .iter()
        .map(|c| -> CodegenResult<ConstructorSymbol> {
            Ok(ConstructorSymbol {
                parameters: parameters(&c.parameters, c.varargs, &format!("constructor of {name}"))?,
                varargs: c.varargs,
                thrown: types(&c.throws)?,
                modifiers: c.modifiers.clone(),
            })
        })
        .collect::<CodegenResult<Vec<_>>>()?;
    if constructors.is_empty() && matches!(def.kind, TypeKind::Class | TypeKind::Enum | TypeKind::Record)
    {
        // The implicit default constructor.
        constructors.push(ConstructorSymbol {
            parameters: Vec::new(),
            varargs: false,
            thrown: Vec::new(),
            modifiers: Vec::new(),
        });
    }

    let interfaces = def
        .interfaces
        .iter()
        .map(|i| class_name(i.as_str()))
        .collect::<CodegenResult<Vec<_>>>()?;

    if def.kind != TypeKind::Class && def.extends.is_some() && name != *root {
        return Err(CodegenError::invalid_snapshot(format!(
            "{name} is an {} and cannot extend a class",
            def.kind.label()
        )));
    }

    Ok(Entry {
        extends: def.extends,
        round: def.round.max(1),
        decl: TypeDecl {
            name,
            kind: def.kind,
            modifiers: def.modifiers,
            superclass: SuperclassRef::None,
            interfaces,
            methods,
            constructors,
            metadata: def.auto_delegate,
        },
    })
}

fn root_entry(root: &ClassName) -> Entry {
    let object = TypeName::class(root.clone());
    let method = |name: &str, return_type: TypeName, parameters: Vec<ParameterSymbol>| MethodSymbol {
        name: name.to_string(),
        return_type,
        parameters,
        varargs: false,
        thrown: Vec::new(),
        modifiers: vec![Modifier::Public],
        declared_in: root.clone(),
    };
    let string = ClassName::new("java.lang", vec!["String".to_string()]).map(TypeName::class);
    let mut methods = vec![
        method(
            "equals",
            TypeName::Primitive("boolean".to_string()),
            vec![ParameterSymbol {
                name: "obj".to_string(),
                ty: object,
            }],
        ),
        method("hashCode", TypeName::Primitive("int".to_string()), Vec::new()),
    ];
    if let Some(string) = string {
        methods.push(method("toString", string, Vec::new()));
    }
    Entry {
        extends: None,
        round: 1,
        decl: TypeDecl {
            name: root.clone(),
            kind: TypeKind::Class,
            modifiers: vec![Modifier::Public],
            superclass: SuperclassRef::None,
            interfaces: Vec::new(),
            methods,
            constructors: vec![ConstructorSymbol {
                parameters: Vec::new(),
                varargs: false,
                thrown: Vec::new(),
                modifiers: vec![Modifier::Public],
            }],
            metadata: None,
        },
    }
}

/// The declaration the host compiler would read back from a generated source.
fn generated_decl(model: &ClassModel) -> TypeDecl {
    let params = |ps: &[ParameterModel]| {
        ps.iter()
            .map(|p| ParameterSymbol {
                name: p.name.clone(),
                ty: p.ty.clone(),
            })
            .collect::<Vec<_>>()
    };
    TypeDecl {
        name: model.name.clone(),
        kind: TypeKind::Class,
        modifiers: vec![Modifier::Abstract],
        superclass: SuperclassRef::Resolved(model.superclass.clone()),
        interfaces: model.interfaces.clone(),
        methods: model
            .methods
            .iter()
            .map(|m| MethodSymbol {
                name: m.name.clone(),
                return_type: m.return_type.clone(),
                parameters: params(&m.parameters),
                varargs: m.varargs,
                thrown: m.thrown.clone(),
                modifiers: vec![Modifier::Public],
                declared_in: model.name.clone(),
            })
            .collect(),
        constructors: model
            .constructors
            .iter()
            .map(|c| ConstructorSymbol {
                parameters: params(&c.parameters),
                varargs: c.varargs,
                thrown: c.thrown.clone(),
                modifiers: Vec::new(),
            })
            .collect(),
        metadata: None,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Resolution;

    const SAMPLE_TOML: &str = r#"
[options]
release = 11

[[types]]
name = "foo.bar.Base"
kind = "interface"

[[types.methods]]
name = "close"
throws = ["java.io.IOException"]

[[types.methods]]
name = "describe"
returns = "java.lang.String"

[[types]]
name = "foo.bar.I"
kind = "interface"
interfaces = ["foo.bar.Base"]

[[types.methods]]
name = "describe"
returns = "java.lang.String"

[[types.methods]]
name = "of"
returns = "foo.bar.I"
modifiers = ["static"]

[[types.methods]]
name = "format"
returns = "java.lang.String"
varargs = true
parameters = [{ name = "args", type = "java.lang.Object[]" }]

[[types]]
name = "foo.bar.S"
kind = "class"

[[types.constructors]]
parameters = [{ name = "p1", type = "int" }]

[[types]]
name = "foo.bar.Plain"
kind = "class"

[[types]]
name = "foo.bar.C"
kind = "class"
extends = "foo.bar.AutoDelegate_C"

[types.auto_delegate]
extend = "foo.bar.S"

[[types.auto_delegate.delegates]]
interface = "foo.bar.I"

[[types]]
name = "foo.bar.Late"
kind = "interface"
round = 2
"#;

    fn snapshot() -> Snapshot {
        Snapshot::from_toml(SAMPLE_TOML).unwrap()
    }

    fn name(s: &str) -> ClassName {
        ClassName::best_guess(s).unwrap()
    }

    #[test]
    fn parses_options() {
        assert_eq!(snapshot().options().release, 11);
    }

    #[test]
    fn root_type_is_implicit() {
        let s = snapshot();
        let root = s.lookup(&s.root_type()).unwrap();
        assert_eq!(root.kind, TypeKind::Class);
        assert_eq!(root.constructors.len(), 1);
        assert_eq!(root.superclass, SuperclassRef::None);
    }

    #[test]
    fn classes_get_default_constructor() {
        let s = snapshot();
        let plain = s.lookup(&name("foo.bar.Plain")).unwrap();
        assert_eq!(plain.constructors.len(), 1);
        assert!(plain.constructors[0].parameters.is_empty());
        assert_eq!(plain.superclass, SuperclassRef::Resolved(s.root_type()));
        let explicit = s.lookup(&name("foo.bar.S")).unwrap();
        assert_eq!(explicit.constructors.len(), 1);
        assert_eq!(explicit.constructors[0].parameters[0].name, "p1");
    }

    #[test]
    fn missing_superclass_is_unresolved() {
        let s = snapshot();
        let c = s.lookup(&name("foo.bar.C")).unwrap();
        assert_eq!(
            c.superclass,
            SuperclassRef::Unresolved("foo.bar.AutoDelegate_C".to_string())
        );
        assert!(c.metadata.is_some());
    }

    #[test]
    fn later_round_types_are_hidden_until_their_round() {
        let mut s = snapshot();
        assert!(s.lookup(&name("foo.bar.Late")).is_none());
        assert!(s.has_later_rounds());
        assert_eq!(s.resolve("foo.bar.Late"), Resolution::Unresolved);
        s.set_round(2);
        assert!(s.lookup(&name("foo.bar.Late")).is_some());
        assert!(!s.has_later_rounds());
    }

    #[test]
    fn resolve_distinguishes_non_declared_values() {
        let s = snapshot();
        assert!(matches!(s.resolve("foo.bar.I"), Resolution::Resolved(d) if d.kind == TypeKind::Interface));
        assert_eq!(s.resolve("foo.bar.Missing"), Resolution::Unresolved);
        assert_eq!(s.resolve("int"), Resolution::NotDeclared);
        assert_eq!(s.resolve("foo.bar.I[]"), Resolution::NotDeclared);
        assert_eq!(s.resolve("void"), Resolution::NotDeclared);
    }

    #[test]
    fn all_methods_flattens_and_hides() {
        let s = snapshot();
        let i = s.lookup(&name("foo.bar.I")).unwrap();
        let methods = s.all_methods(i);
        let names: Vec<(&str, String)> = methods
            .iter()
            .map(|m| (m.name.as_str(), m.declared_in.qualified()))
            .collect();
        assert_eq!(
            names,
            [
                ("describe", "foo.bar.I".to_string()),
                ("of", "foo.bar.I".to_string()),
                ("format", "foo.bar.I".to_string()),
                ("close", "foo.bar.Base".to_string()),
                ("equals", ROOT_TYPE.to_string()),
                ("hashCode", ROOT_TYPE.to_string()),
                ("toString", ROOT_TYPE.to_string()),
            ]
        );
        assert!(methods[1].is_static());
        assert!(methods[2].varargs);
    }

    #[test]
    fn registering_generated_class_resolves_superclass() {
        let mut s = snapshot();
        let model = ClassModel {
            name: name("foo.bar.AutoDelegate_C"),
            superclass: name("foo.bar.S"),
            interfaces: vec![name("foo.bar.I")],
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
        };
        s.register_generated(&model).unwrap();
        let c = s.lookup(&name("foo.bar.C")).unwrap();
        assert_eq!(c.superclass, SuperclassRef::Resolved(model.name.clone()));
        assert!(matches!(
            s.register_generated(&model),
            Err(CodegenError::DuplicateOutput { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_declarations() {
        let toml = r#"
[[types]]
name = "foo.I"
kind = "interface"

[[types]]
name = "foo.I"
kind = "interface"
"#;
        assert!(matches!(
            Snapshot::from_toml(toml),
            Err(CodegenError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn rejects_varargs_without_array() {
        let toml = r#"
[[types]]
name = "foo.I"
kind = "interface"

[[types.methods]]
name = "m"
varargs = true
parameters = [{ name = "x", type = "int" }]
"#;
        assert!(Snapshot::from_toml(toml).is_err());
    }

    #[test]
    fn annotated_types_by_round() {
        let s = snapshot();
        assert_eq!(s.annotated_in_round(1), vec![name("foo.bar.C")]);
        assert!(s.annotated_in_round(2).is_empty());
    }
}
