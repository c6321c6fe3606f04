//! Output units accumulated during a run and flushed once at the end

use crate::CodegenError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Named text buffers keyed by path relative to the output root.
///
/// Units are only ever appended to. Nothing touches the filesystem until
/// [`MultiEmitter::flush`], which consumes the emitter so each path is
/// written at most once per run.
#[derive(Debug, Default)]
pub struct MultiEmitter {
    units: BTreeMap<PathBuf, String>,
}

impl MultiEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text to a unit, creating it if needed
    pub fn append(&mut self, path: impl Into<PathBuf>, text: &str) {
        self.units.entry(path.into()).or_default().push_str(text);
    }

    pub fn unit(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.units.get(path.as_ref()).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.units.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Write every unit below `root`, returning the written paths in order
    pub fn flush(self, root: &Path) -> Result<Vec<PathBuf>, CodegenError> {
        info!("Flush {} output units to {}", self.units.len(), root.display());
        let mut written = Vec::with_capacity(self.units.len());
        for (relative, content) in self.units {
            let path = root.join(&relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            debug!("writing {}", path.display());
            std::fs::write(&path, content)?;
            written.push(path);
        }
        Ok(written)
    }
}
