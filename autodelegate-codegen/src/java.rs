//! Java source renderer
//!
//! Turns a [`ClassModel`] into the text of one compilation unit. The output is
//! deterministic: imports are sorted, members appear in model order, and
//! indentation is two spaces.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::{GeneratorConfig, GENERATOR_NAME};
use crate::model::{ClassModel, ConstructorModel, MethodModel, ParameterModel};
use crate::names::{ClassName, TypeName};
use crate::snapshot::ROOT_TYPE;

const INDENT: &str = "  ";

/// A rendered compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JavaFile {
    pub class_name: ClassName,
    pub source: String,
}

impl JavaFile {
    /// Path of the file relative to a source root, e.g. `foo/bar/AutoDelegate_C.java`.
    pub fn relative_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in self.class_name.package().split('.').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.push(format!("{}.java", self.class_name.simple_names()[0]));
        path
    }
}

/// Render `model` as Java source.
pub fn render(model: &ClassModel, config: &GeneratorConfig) -> JavaFile {
    let generated = config.generated_annotation_type();
    // The class itself claims its simple name.
    let mut referenced = vec![&model.name];
    referenced.extend(model.referenced_classes());
    referenced.extend(generated.iter());
    let imports = Imports::new(model.name.package(), &referenced);

    let mut w = SourceWriter::default();
    if !model.name.package().is_empty() {
        w.line(format!("package {};", model.name.package()));
        w.blank();
    }
    if !imports.imports.is_empty() {
        for import in &imports.imports {
            w.line(format!("import {import};"));
        }
        w.blank();
    }

    if let Some(generated) = &generated {
        w.line(format!("@{}(\"{GENERATOR_NAME}\")", imports.name(generated)));
    }
    let mut header = format!("abstract class {}", model.name.simple_name());
    if model.superclass.qualified() != ROOT_TYPE {
        header.push_str(&format!(" extends {}", imports.name(&model.superclass)));
    }
    if !model.interfaces.is_empty() {
        let interfaces: Vec<String> = model.interfaces.iter().map(|i| imports.name(i)).collect();
        header.push_str(&format!(" implements {}", interfaces.join(", ")));
    }
    w.line(format!("{header} {{"));
    w.indent += 1;

    for field in &model.fields {
        w.line(format!("private final {} {};", imports.name(&field.ty), field.name));
    }

    for ctor in &model.constructors {
        w.blank();
        write_constructor(&mut w, &imports, model.name.simple_name(), ctor);
    }

    for method in &model.methods {
        w.blank();
        write_method(&mut w, &imports, method);
    }

    w.indent -= 1;
    w.line("}");

    JavaFile {
        class_name: model.name.clone(),
        source: w.out,
    }
}

fn write_constructor(w: &mut SourceWriter, imports: &Imports, name: &str, ctor: &ConstructorModel) {
    w.line(format!(
        "{name}({}){} {{",
        parameter_list(imports, &ctor.parameters, ctor.varargs),
        throws_clause(imports, &ctor.thrown)
    ));
    w.indent += 1;
    w.line(format!("super({});", ctor.super_arguments.join(", ")));
    for field in &ctor.assigned_fields {
        w.line(format!("this.{field} = {field};"));
    }
    w.indent -= 1;
    w.line("}");
}

fn write_method(w: &mut SourceWriter, imports: &Imports, method: &MethodModel) {
    w.line("@Override");
    w.line(format!(
        "public {} {}({}){} {{",
        imports.type_name(&method.return_type),
        method.name,
        parameter_list(imports, &method.parameters, method.varargs),
        throws_clause(imports, &method.thrown)
    ));
    w.indent += 1;
    let arguments: Vec<&str> = method.parameters.iter().map(|p| p.name.as_str()).collect();
    let call = format!("this.{}.{}({})", method.delegate_field, method.name, arguments.join(", "));
    if method.returns_value() {
        w.line(format!("return {call};"));
    } else {
        w.line(format!("{call};"));
    }
    w.indent -= 1;
    w.line("}");
}

fn parameter_list(imports: &Imports, parameters: &[ParameterModel], varargs: bool) -> String {
    let last = parameters.len().saturating_sub(1);
    parameters
        .iter()
        .enumerate()
        .map(|(i, p)| match &p.ty {
            TypeName::Array(component) if varargs && i == last => {
                format!("{}... {}", imports.type_name(component), p.name)
            }
            ty => format!("{} {}", imports.type_name(ty), p.name),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn throws_clause(imports: &Imports, thrown: &[TypeName]) -> String {
    if thrown.is_empty() {
        return String::new();
    }
    let types: Vec<String> = thrown.iter().map(|t| imports.type_name(t)).collect();
    format!(" throws {}", types.join(", "))
}

// ── Imports ───────────────────────────────────────────────────────────────────

/// Decides which classes are written by simple name.
struct Imports {
    /// Top-level classes written by their simple name.
    short: HashSet<ClassName>,
    /// Sorted `import` targets.
    imports: BTreeSet<String>,
}

impl Imports {
    fn new(package: &str, referenced: &[&ClassName]) -> Self {
        let mut by_simple: HashMap<&str, Vec<ClassName>> = HashMap::new();
        for class in referenced {
            // Type variables and unnamed-package classes are always written bare.
            if class.package().is_empty() {
                continue;
            }
            let top = class.top_level();
            let group = by_simple.entry(class.simple_names()[0].as_str()).or_default();
            if !group.contains(&top) {
                group.push(top);
            }
        }

        let mut short = HashSet::new();
        let mut imports = BTreeSet::new();
        for group in by_simple.into_values() {
            let winner = if group.len() == 1 {
                group.into_iter().next()
            } else {
                group.into_iter().find(|c| c.package() == package)
            };
            let Some(winner) = winner else {
                continue;
            };
            if winner.package() != package && winner.package() != "java.lang" {
                imports.insert(winner.qualified());
            }
            short.insert(winner);
        }
        Self { short, imports }
    }

    fn name(&self, class: &ClassName) -> String {
        if class.package().is_empty() || self.short.contains(&class.top_level()) {
            class.relative()
        } else {
            class.qualified()
        }
    }

    fn type_name(&self, ty: &TypeName) -> String {
        Rendered { ty, imports: self }.to_string()
    }
}

struct Rendered<'a> {
    ty: &'a TypeName,
    imports: &'a Imports,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.ty.write_with(f, &|class| self.imports.name(class))
    }
}

#[derive(Default)]
struct SourceWriter {
    out: String,
    indent: usize,
}

impl SourceWriter {
    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldModel;

    fn class(name: &str) -> ClassName {
        ClassName::best_guess(name).unwrap()
    }

    fn ty(text: &str) -> TypeName {
        text.parse().unwrap()
    }

    fn param(name: &str, text: &str) -> ParameterModel {
        ParameterModel {
            name: name.to_string(),
            ty: ty(text),
        }
    }

    fn simple_model() -> ClassModel {
        let field = "__I_unlikelyToConflictWithExistingMember";
        ClassModel {
            name: class("foo.bar.AutoDelegate_C"),
            superclass: class("java.lang.Object"),
            interfaces: vec![class("foo.bar.I")],
            fields: vec![FieldModel {
                name: field.to_string(),
                ty: class("foo.bar.I"),
            }],
            constructors: vec![ConstructorModel {
                parameters: vec![param(field, "foo.bar.I")],
                varargs: false,
                thrown: vec![],
                super_arguments: vec![],
                assigned_fields: vec![field.to_string()],
            }],
            methods: vec![MethodModel {
                name: "i".to_string(),
                return_type: TypeName::Void,
                parameters: vec![],
                varargs: false,
                thrown: vec![],
                delegate_field: field.to_string(),
            }],
        }
    }

    #[test]
    fn renders_simple_case() {
        let file = render(&simple_model(), &GeneratorConfig::default());
        let expected = "\
package foo.bar;

import javax.annotation.processing.Generated;

@Generated(\"autodelegate-codegen\")
abstract class AutoDelegate_C implements I {
  private final I __I_unlikelyToConflictWithExistingMember;

  AutoDelegate_C(I __I_unlikelyToConflictWithExistingMember) {
    super();
    this.__I_unlikelyToConflictWithExistingMember = __I_unlikelyToConflictWithExistingMember;
  }

  @Override
  public void i() {
    this.__I_unlikelyToConflictWithExistingMember.i();
  }
}
";
        assert_eq!(file.source, expected);
        assert_eq!(file.relative_path(), PathBuf::from("foo/bar/AutoDelegate_C.java"));
    }

    #[test]
    fn java8_uses_legacy_generated() {
        let config = GeneratorConfig {
            release: 8,
            ..Default::default()
        };
        let file = render(&simple_model(), &config);
        assert!(file.source.contains("import javax.annotation.Generated;"));

        let config = GeneratorConfig {
            generated_annotation: false,
            ..Default::default()
        };
        let file = render(&simple_model(), &config);
        assert!(!file.source.contains("Generated"));
        assert!(file.source.starts_with("package foo.bar;\n\nabstract class"));
    }

    #[test]
    fn clashing_simple_names_are_qualified() {
        let mut model = simple_model();
        model.superclass = class("foo.bar.S");
        model.interfaces.push(class("baz.qux.I"));
        model.methods.push(MethodModel {
            name: "i".to_string(),
            return_type: ty("boolean"),
            parameters: vec![param("p", "int")],
            varargs: false,
            thrown: vec![],
            delegate_field: "other".to_string(),
        });
        let file = render(&model, &GeneratorConfig::default());
        assert!(file
            .source
            .contains("abstract class AutoDelegate_C extends S implements I, baz.qux.I {"));
        assert!(file.source.contains("  public boolean i(int p) {\n    return this.other.i(p);\n"));
        assert!(!file.source.contains("import baz.qux.I;"));
    }

    #[test]
    fn nested_types_use_enclosing_name() {
        let mut model = simple_model();
        model.name = class("foo.bar.AutoDelegate_Enclosing_C");
        model.superclass = class("foo.bar.Enclosing.S");
        model.interfaces = vec![class("foo.bar.Enclosing.I")];
        let file = render(&model, &GeneratorConfig::default());
        assert!(file
            .source
            .contains("abstract class AutoDelegate_Enclosing_C extends Enclosing.S implements Enclosing.I {"));
    }

    #[test]
    fn imports_other_packages_and_renders_signatures() {
        let mut model = simple_model();
        model.methods = vec![MethodModel {
            name: "format".to_string(),
            return_type: ty("java.util.List<java.lang.String>"),
            parameters: vec![param("pattern", "java.lang.String"), param("args", "java.lang.Object[]")],
            varargs: true,
            thrown: vec![ty("java.io.IOException")],
            delegate_field: "f".to_string(),
        }];
        model.constructors[0].parameters.push(param("values", "int[]"));
        model.constructors[0].varargs = true;
        model.constructors[0].super_arguments = vec!["values".to_string()];
        let file = render(&model, &GeneratorConfig::default());

        assert!(file.source.contains(
            "import java.io.IOException;\nimport java.util.List;\nimport javax.annotation.processing.Generated;\n"
        ));
        assert!(!file.source.contains("import java.lang"));
        assert!(file.source.contains(
            "public List<String> format(String pattern, Object... args) throws IOException {"
        ));
        assert!(file.source.contains("return this.f.format(pattern, args);"));
        assert!(file.source.contains("(I __I_unlikelyToConflictWithExistingMember, int... values) {"));
        assert!(file.source.contains("super(values);"));
    }

    #[test]
    fn unnamed_package_has_no_package_line() {
        let mut model = simple_model();
        model.name = class("AutoDelegate_C");
        let file = render(&model, &GeneratorConfig::default());
        assert!(file
            .source
            .starts_with("import foo.bar.I;\nimport javax.annotation.processing.Generated;\n"));
        assert!(file.source.contains("abstract class AutoDelegate_C implements I {"));
        assert_eq!(file.relative_path(), PathBuf::from("AutoDelegate_C.java"));
    }
}
