//! In-memory compilation host
//!
//! Plays the part of the compiler: it runs rounds over a [`Snapshot`], hands
//! each round's newly visible annotated types to the [`RoundCoordinator`],
//! makes generated classes visible to the following rounds, and announces the
//! final pass once a round generates nothing and no later types remain.

use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::coordinator::{PassState, RoundCoordinator};
use crate::diagnostics::DiagnosticSink;
use crate::emit::Emitter;
use crate::error::{CodegenError, CodegenResult};
use crate::java::JavaFile;
use crate::model::ClassModel;
use crate::names::ClassName;
use crate::snapshot::Snapshot;

/// Result of a finished compilation. Diagnostics go to the caller's sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationSummary {
    /// Generated classes in generation order.
    pub generated: Vec<ClassName>,
    /// Processing rounds run, not counting the final pass.
    pub rounds: usize,
}

pub struct Compilation {
    snapshot: Snapshot,
    config: GeneratorConfig,
}

impl Compilation {
    /// A compilation configured by the snapshot's own options.
    pub fn new(snapshot: Snapshot) -> Self {
        let config = snapshot.options().clone();
        Self { snapshot, config }
    }

    pub fn from_toml(s: &str) -> CodegenResult<Self> {
        Ok(Self::new(Snapshot::from_toml(s)?))
    }

    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Run every round to completion.
    ///
    /// Fails on the first internal fault (already reported to `sink`) or when
    /// the rounds do not settle within `max_rounds`.
    pub fn run(
        &mut self,
        emitter: &mut dyn Emitter,
        sink: &mut dyn DiagnosticSink,
    ) -> CodegenResult<CompilationSummary> {
        let coordinator = RoundCoordinator::new(self.config.clone());
        let mut state = PassState::new();
        let mut summary = CompilationSummary::default();

        loop {
            let round = summary.rounds + 1;
            if round > self.config.max_rounds {
                return Err(CodegenError::RoundLimit {
                    rounds: self.config.max_rounds,
                });
            }
            self.snapshot.set_round(round);
            let annotated = self.snapshot.annotated_in_round(round);
            debug!(round, annotated = annotated.len(), "starting round");

            let mut recorder = Recorder {
                inner: &mut *emitter,
                models: Vec::new(),
            };
            let report =
                coordinator.run_pass(&mut state, &annotated, &self.snapshot, &mut recorder, sink)?;
            for model in &recorder.models {
                self.snapshot.register_generated(model)?;
            }
            summary.rounds = round;
            summary.generated.extend(report.generated.iter().cloned());

            if !report.made_progress() && !self.snapshot.has_later_rounds() {
                break;
            }
        }

        coordinator.on_final_pass(state, &self.snapshot, sink);
        info!(
            rounds = summary.rounds,
            generated = summary.generated.len(),
            "compilation finished"
        );
        Ok(summary)
    }
}

/// Forwards to the real emitter and remembers what was generated so it can be
/// registered with the snapshot after the pass.
struct Recorder<'e> {
    inner: &'e mut dyn Emitter,
    models: Vec<ClassModel>,
}

impl Emitter for Recorder<'_> {
    fn emit(&mut self, model: &ClassModel, file: &JavaFile) -> CodegenResult<()> {
        self.inner.emit(model, file)?;
        self.models.push(model.clone());
        Ok(())
    }
}
