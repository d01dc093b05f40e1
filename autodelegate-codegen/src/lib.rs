//! AutoDelegate Codegen - delegating base classes for `@AutoDelegate` types
//!
//! A class annotated with `@AutoDelegate` names interfaces it wants to
//! implement by forwarding to stored delegates, and optionally a class to
//! extend. This library generates the abstract base class it then extends:
//!
//! - **Validation** - the annotation is checked against the compiler's
//!   symbols and turned into a [`DelegationSpec`] (see [`validate()`])
//! - **Synthesis** - the spec becomes a data-only [`ClassModel`] of fields,
//!   constructors and forwarding methods (see [`synthesize()`])
//! - **Rendering** - the model is written out as Java source (see [`render`])
//!
//! The [`RoundCoordinator`] drives these steps across compilation rounds,
//! deferring types whose metadata names classes that do not exist yet. The
//! [`Compilation`] host runs the rounds over an in-memory [`Snapshot`] of the
//! program.
//!
//! # Usage
//!
//! ```rust
//! use autodelegate_codegen::{Compilation, Diagnostics, MemoryEmitter};
//!
//! let toml = r#"
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
//! "#;
//!
//! let mut compilation = Compilation::from_toml(toml).unwrap();
//! let mut emitter = MemoryEmitter::new();
//! let mut diagnostics = Diagnostics::new();
//! compilation.run(&mut emitter, &mut diagnostics).unwrap();
//!
//! assert!(!diagnostics.has_errors());
//! let source = emitter.source("foo.bar.AutoDelegate_C").unwrap();
//! assert!(source.contains("abstract class AutoDelegate_C implements I"));
//! ```

pub mod config;
pub mod coordinator;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod host;
pub mod java;
pub mod metadata;
pub mod model;
pub mod names;
pub mod snapshot;
pub mod symbols;
pub mod synthesize;
pub mod validate;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use config::{GeneratorConfig, GENERATOR_NAME};
pub use coordinator::{PassReport, PassState, RoundCoordinator};
pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, Diagnostics, Location, Severity};
pub use emit::{Emitter, FsEmitter, MemoryEmitter, WrittenFile};
pub use error::{CodegenError, CodegenResult};
pub use host::{Compilation, CompilationSummary};
pub use java::{render, JavaFile};
pub use metadata::{DelegateEntry, DelegateMetadata};
pub use model::{
    ClassModel, ConstructorModel, Delegate, DelegationSpec, FieldModel, MethodModel, ParameterModel,
};
pub use names::{generated_name, is_valid_identifier, ClassName, NameAllocator, TypeName};
pub use snapshot::{Snapshot, TypeDef};
pub use symbols::{Resolution, SymbolTable, TypeDecl, TypeKind};
pub use synthesize::{synthesize, SignatureCollision, Synthesis, Synthesized};
pub use validate::{validate, Validation};
