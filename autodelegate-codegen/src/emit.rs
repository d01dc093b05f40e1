//! Emitters: where rendered sources go
//!
//! A compilation never creates the same class twice; an emitter refuses a
//! second file for a name it has already written.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{CodegenError, CodegenResult};
use crate::java::JavaFile;
use crate::model::ClassModel;
use crate::names::ClassName;

/// Persists generated sources.
pub trait Emitter {
    fn emit(&mut self, model: &ClassModel, file: &JavaFile) -> CodegenResult<()>;
}

/// Keeps generated sources and models in memory, keyed by class name.
#[derive(Debug, Default, Clone)]
pub struct MemoryEmitter {
    files: BTreeMap<ClassName, JavaFile>,
    models: BTreeMap<ClassName, ClassModel>,
}

impl MemoryEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &ClassName) -> Option<&JavaFile> {
        self.files.get(name)
    }

    /// Source of the class with the given qualified name.
    pub fn source(&self, qualified: &str) -> Option<&str> {
        let name = ClassName::best_guess(qualified)?;
        self.files.get(&name).map(|f| f.source.as_str())
    }

    pub fn model(&self, name: &ClassName) -> Option<&ClassModel> {
        self.models.get(name)
    }

    pub fn files(&self) -> impl Iterator<Item = &JavaFile> {
        self.files.values()
    }

    pub fn models(&self) -> impl Iterator<Item = &ClassModel> {
        self.models.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Emitter for MemoryEmitter {
    fn emit(&mut self, model: &ClassModel, file: &JavaFile) -> CodegenResult<()> {
        if self.files.contains_key(&file.class_name) {
            return Err(CodegenError::DuplicateOutput {
                name: file.class_name.qualified(),
            });
        }
        self.files.insert(file.class_name.clone(), file.clone());
        self.models.insert(model.name.clone(), model.clone());
        Ok(())
    }
}

/// A file written by [`FsEmitter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    /// `false` when the file already had identical contents.
    pub changed: bool,
}

/// Writes `<root>/<package path>/<Name>.java`, creating directories as needed.
/// Files whose contents would not change are left untouched.
#[derive(Debug)]
pub struct FsEmitter {
    root: PathBuf,
    written: BTreeMap<ClassName, WrittenFile>,
}

impl FsEmitter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files emitted so far, in class-name order.
    pub fn written(&self) -> impl Iterator<Item = &WrittenFile> {
        self.written.values()
    }
}

impl Emitter for FsEmitter {
    fn emit(&mut self, _model: &ClassModel, file: &JavaFile) -> CodegenResult<()> {
        if self.written.contains_key(&file.class_name) {
            return Err(CodegenError::DuplicateOutput {
                name: file.class_name.qualified(),
            });
        }
        let path = self.root.join(file.relative_path());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CodegenError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let existing = std::fs::read_to_string(&path).ok();
        let changed = existing.as_deref() != Some(file.source.as_str());
        if changed {
            std::fs::write(&path, &file.source).map_err(|source| CodegenError::Io {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), "wrote generated source");
        } else {
            debug!(path = %path.display(), "generated source unchanged");
        }
        self.written
            .insert(file.class_name.clone(), WrittenFile { path, changed });
        Ok(())
    }
}
