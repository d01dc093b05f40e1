//! `autodelegate generate` subcommand
//!
//! Reads a compilation snapshot, runs every processing round and writes the
//! generated `AutoDelegate_*` classes under the output source root.
//!
//! # Usage
//!
//! ```text
//! autodelegate generate --snapshot app.toml               # write sources
//! autodelegate generate --snapshot app.toml --check       # validate only (CI)
//! autodelegate generate --snapshot app.toml --dry-run     # print sources to stdout
//! autodelegate generate --snapshot app.toml --model       # print class models as JSON
//! autodelegate generate --snapshot app.toml --release 8   # target Java 8
//! ```

use crate::error::{CliError, CliResult};
use anyhow::Context;
use autodelegate_codegen::{
    CodegenResult, Compilation, CompilationSummary, Diagnostics, FsEmitter, GeneratorConfig,
    MemoryEmitter, Severity, Snapshot,
};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Generate delegate base classes from a compilation snapshot
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Path to the compilation snapshot (TOML)
    #[arg(long, default_value = "autodelegate.toml")]
    pub snapshot: PathBuf,

    /// Source root the generated files are written under
    #[arg(long, default_value = "build/generated/sources/autodelegate")]
    pub out: PathBuf,

    /// Run the compilation without writing files (exit 1 if errors found)
    #[arg(long)]
    pub check: bool,

    /// Print generated sources to stdout instead of writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Print the generated class models as JSON instead of sources
    #[arg(long)]
    pub model: bool,

    /// Java release to target (overrides the snapshot's options)
    #[arg(long)]
    pub release: Option<u32>,

    /// Do not annotate generated classes with @Generated
    #[arg(long)]
    pub no_generated_annotation: bool,
}

impl GenerateCommand {
    pub fn execute(self) -> CliResult<()> {
        // ── Read snapshot ──────────────────────────────────────────────────
        let snapshot_path = &self.snapshot;
        if !snapshot_path.exists() {
            return Err(CliError::snapshot_not_found(snapshot_path));
        }

        let toml_src = std::fs::read_to_string(snapshot_path)
            .with_context(|| format!("reading {}", snapshot_path.display()))?;

        let snapshot = Snapshot::from_toml(&toml_src)
            .with_context(|| format!("parsing {}", snapshot_path.display()))?;

        let config = self.config(snapshot.options());
        debug!(snapshot = %snapshot_path.display(), release = config.release, "loaded snapshot");
        let mut compilation = Compilation::new(snapshot).with_config(config);
        let mut diagnostics = Diagnostics::new();

        // ── In-memory modes ────────────────────────────────────────────────
        if self.check || self.dry_run || self.model {
            let mut emitter = MemoryEmitter::new();
            let outcome = compilation.run(&mut emitter, &mut diagnostics);
            let summary = finish(&diagnostics, snapshot_path, outcome)?;

            if self.check {
                println!(
                    "{} {} validated successfully, {} class(es) would be generated",
                    "✓".green(),
                    snapshot_path.display(),
                    summary.generated.len()
                );
            } else if self.model {
                let models: Vec<_> = emitter.models().collect();
                println!("{}", serde_json::to_string_pretty(&models)?);
            } else {
                for file in emitter.files() {
                    println!("{}  {}", "──".dimmed(), self.out.join(file.relative_path()).display());
                    print!("{}", file.source);
                }
            }
            return Ok(());
        }

        // ── Write files ────────────────────────────────────────────────────
        let mut emitter = FsEmitter::new(&self.out);
        let outcome = compilation.run(&mut emitter, &mut diagnostics);
        let summary = finish(&diagnostics, snapshot_path, outcome)?;

        for file in emitter.written() {
            if file.changed {
                println!("  {} {} written", "→".cyan(), file.path.display());
            } else {
                println!("  {} {} unchanged", "·".dimmed(), file.path.display());
            }
        }
        println!(
            "{} {} class(es) generated in {} round(s)",
            "✓".green(),
            summary.generated.len(),
            summary.rounds
        );

        Ok(())
    }

    /// Snapshot options with command-line overrides applied.
    fn config(&self, base: &GeneratorConfig) -> GeneratorConfig {
        let mut config = base.clone();
        if let Some(release) = self.release {
            config.release = release;
        }
        if self.no_generated_annotation {
            config.generated_annotation = false;
        }
        config
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Print diagnostics, then fail on an aborted compilation or any error.
fn finish(
    diagnostics: &Diagnostics,
    snapshot_path: &Path,
    outcome: CodegenResult<CompilationSummary>,
) -> CliResult<CompilationSummary> {
    let errors = print_diagnostics(diagnostics, snapshot_path);
    let summary = outcome?;
    if errors > 0 {
        return Err(CliError::GenerationFailed { errors });
    }
    Ok(summary)
}

/// Print diagnostics and return the number of errors.
fn print_diagnostics(diagnostics: &Diagnostics, snapshot_path: &Path) -> usize {
    let mut errors = 0;
    for d in diagnostics {
        match d.severity {
            Severity::Error => {
                eprintln!("{} [{}] [{}] {}", "✗".red(), d.location, d.code.tag(), d.message);
                errors += 1;
            }
            Severity::Warning => {
                eprintln!("{} [{}] [{}] {}", "!".yellow(), d.location, d.code.tag(), d.message);
            }
        }
    }
    if !diagnostics.is_empty() {
        eprintln!("  in: {}", snapshot_path.display());
    }
    errors
}
