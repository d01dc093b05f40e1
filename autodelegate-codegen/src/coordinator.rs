//! Round coordinator
//!
//! Drives validation, synthesis and emission over the annotated types of each
//! pass. Types whose metadata names something that does not exist yet are
//! remembered by name in [`PassState`] and retried in the next pass; whatever
//! is still pending when the host announces the final pass is reported as
//! undefined.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, error, info, warn};

use crate::config::GeneratorConfig;
use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, Location};
use crate::emit::Emitter;
use crate::error::CodegenResult;
use crate::java::render;
use crate::model::DelegationSpec;
use crate::names::ClassName;
use crate::synthesize::{synthesize, Synthesis};
use crate::symbols::{Resolution, SymbolTable};
use crate::validate::{validate, Validation};

/// State carried from one pass to the next.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassState {
    /// Types waiting for a referenced type to appear, by name.
    deferred: BTreeSet<ClassName>,
    /// Types generated so far in this compilation.
    emitted: BTreeSet<ClassName>,
}

impl PassState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deferred(&self) -> impl Iterator<Item = &ClassName> {
        self.deferred.iter()
    }

    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    pub fn emitted(&self) -> impl Iterator<Item = &ClassName> {
        self.emitted.iter()
    }
}

/// What happened to each candidate of one pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// Generated class names, in processing order.
    pub generated: Vec<ClassName>,
    /// Annotated types retried next pass.
    pub deferred: Vec<ClassName>,
    /// Annotated types rejected with errors.
    pub invalid: Vec<ClassName>,
}

impl PassReport {
    pub fn made_progress(&self) -> bool {
        !self.generated.is_empty()
    }
}

pub struct RoundCoordinator {
    config: GeneratorConfig,
}

impl RoundCoordinator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Process the previously deferred types plus `annotated`.
    ///
    /// Deferred names that no longer resolve are dropped. An internal fault is
    /// reported against its type and then returned; the pass stops there.
    pub fn run_pass(
        &self,
        state: &mut PassState,
        annotated: &[ClassName],
        symbols: &dyn SymbolTable,
        emitter: &mut dyn Emitter,
        sink: &mut dyn DiagnosticSink,
    ) -> CodegenResult<PassReport> {
        let pending = std::mem::take(&mut state.deferred);
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for name in pending.into_iter().chain(annotated.iter().cloned()) {
            if state.emitted.contains(&name) || !seen.insert(name.clone()) {
                continue;
            }
            match symbols.lookup(&name) {
                Some(decl) => candidates.push(decl),
                None => debug!(ty = %name, "annotated type vanished, dropping"),
            }
        }

        let mut report = PassReport::default();
        for ty in candidates {
            debug!(ty = %ty.name, "processing @AutoDelegate type");
            let spec = match validate(ty, symbols, sink) {
                Validation::Spec(spec) => spec,
                Validation::Deferred => {
                    state.deferred.insert(ty.name.clone());
                    report.deferred.push(ty.name.clone());
                    continue;
                }
                Validation::Invalid => {
                    report.invalid.push(ty.name.clone());
                    continue;
                }
            };

            match self.generate(&spec, symbols, emitter, sink) {
                Ok(Some(generated)) => {
                    state.emitted.insert(ty.name.clone());
                    report.generated.push(generated);
                }
                Ok(None) => {
                    state.deferred.insert(ty.name.clone());
                    report.deferred.push(ty.name.clone());
                }
                Err(err) => {
                    let trace = err.chain();
                    error!(ty = %ty.name, error = %trace, "failed to generate delegate class");
                    sink.report(Diagnostic::error(
                        DiagnosticCode::InternalException,
                        format!("@AutoDelegate processing failed: {trace}"),
                        Location::Type {
                            ty: ty.name.clone(),
                        },
                    ));
                    return Err(err);
                }
            }
        }
        Ok(report)
    }

    /// Synthesise, render and emit one spec. `None` means synthesis deferred.
    fn generate(
        &self,
        spec: &DelegationSpec,
        symbols: &dyn SymbolTable,
        emitter: &mut dyn Emitter,
        sink: &mut dyn DiagnosticSink,
    ) -> CodegenResult<Option<ClassName>> {
        let synthesized = match synthesize(spec, symbols)? {
            Synthesis::Generated(synthesized) => synthesized,
            Synthesis::Deferred => return Ok(None),
        };
        for collision in &synthesized.collisions {
            let shadowed: Vec<String> = collision.shadowed.iter().map(ClassName::qualified).collect();
            warn!(ty = %spec.annotated(), signature = %collision.signature, "method reachable through several delegates");
            sink.report(Diagnostic::warning(
                DiagnosticCode::AmbiguousMethod,
                format!(
                    "{} is declared by {} and {}; forwarding to {}",
                    collision.signature,
                    collision.chosen,
                    shadowed.join(", "),
                    collision.chosen
                ),
                Location::Type {
                    ty: spec.annotated().clone(),
                },
            ));
        }

        let file = render(&synthesized.model, &self.config);
        emitter.emit(&synthesized.model, &file)?;
        info!(ty = %spec.annotated(), generated = %synthesized.model.name, "generated delegate class");
        Ok(Some(synthesized.model.name))
    }

    /// The host will not produce new types: everything still deferred names a
    /// type that never appeared.
    pub fn on_final_pass(&self, state: PassState, symbols: &dyn SymbolTable, sink: &mut dyn DiagnosticSink) {
        for name in state.deferred {
            let metadata = symbols
                .lookup(&name)
                .and_then(|decl| decl.metadata.clone())
                .unwrap_or_default();
            let mut seen = HashSet::new();
            let missing: Vec<&str> = metadata
                .delegates
                .iter()
                .map(|d| d.interface.as_str())
                .chain(metadata.extend.as_deref())
                .filter(|value| matches!(symbols.resolve(value), Resolution::Unresolved))
                .filter(|value| seen.insert(*value))
                .collect();
            let message = if missing.is_empty() {
                "@AutoDelegate references types that were never generated".to_string()
            } else {
                format!("@AutoDelegate references undefined types: {}", missing.join(", "))
            };
            warn!(ty = %name, "type still deferred after final pass");
            sink.report(Diagnostic::error(
                DiagnosticCode::Undefined,
                message,
                Location::Type { ty: name },
            ));
        }
    }
}
