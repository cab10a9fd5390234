//! Artifact sinks.
//!
//! Generators never write to a sink directly. They stage artifacts in
//! [`StagedArtifacts`] and the pass runner commits the staged set once the
//! pass has finished, so a failed pass leaves nothing half-written.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, trace};

use crate::emit::SourceArtifact;
use crate::error::{CodegenError, CodegenResult};

/// Receives named text artifacts. Hint names are unique per sink.
pub trait ArtifactSink {
    fn add_source(&mut self, artifact: SourceArtifact) -> CodegenResult<()>;
}

/// Keeps artifacts in memory, in the order they were added.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Vec<SourceArtifact>,
    names: HashSet<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> &[SourceArtifact] {
        &self.artifacts
    }

    pub fn get(&self, hint_name: &str) -> Option<&SourceArtifact> {
        self.artifacts.iter().find(|a| a.hint_name == hint_name)
    }

    pub fn hint_names(&self) -> Vec<&str> {
        self.artifacts.iter().map(|a| a.hint_name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn into_artifacts(self) -> Vec<SourceArtifact> {
        self.artifacts
    }
}

impl ArtifactSink for MemorySink {
    fn add_source(&mut self, artifact: SourceArtifact) -> CodegenResult<()> {
        if !self.names.insert(artifact.hint_name.clone()) {
            return Err(CodegenError::DuplicateArtifact(artifact.hint_name));
        }
        self.artifacts.push(artifact);
        Ok(())
    }
}

/// Writes each artifact to `{dir}/{hint_name}`.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    written: HashSet<String>,
}

impl DirectorySink {
    /// Creates the directory if it does not exist yet.
    pub fn create<P: AsRef<Path>>(dir: P) -> CodegenResult<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            written: HashSet::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> usize {
        self.written.len()
    }
}

impl ArtifactSink for DirectorySink {
    fn add_source(&mut self, artifact: SourceArtifact) -> CodegenResult<()> {
        if artifact.hint_name.contains(['/', '\\']) || artifact.hint_name.starts_with('.') {
            return Err(CodegenError::Configuration(format!(
                "hint name '{}' is not a plain file name",
                artifact.hint_name
            )));
        }
        if self.written.contains(&artifact.hint_name) {
            return Err(CodegenError::DuplicateArtifact(artifact.hint_name));
        }

        let path = self.dir.join(&artifact.hint_name);
        fs::write(&path, artifact.text.as_bytes())?;
        trace!("Sink: wrote {}", path.display());
        self.written.insert(artifact.hint_name);
        Ok(())
    }
}

/// Artifacts produced by a pass that has not finished yet.
#[derive(Debug, Default)]
pub struct StagedArtifacts {
    artifacts: Vec<SourceArtifact>,
    names: HashSet<String>,
}

impl StagedArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `artifact`, rejecting a hint name staged earlier in the pass.
    pub fn stage(&mut self, artifact: SourceArtifact) -> CodegenResult<()> {
        if !self.names.insert(artifact.hint_name.clone()) {
            return Err(CodegenError::DuplicateArtifact(artifact.hint_name));
        }
        self.artifacts.push(artifact);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Hands every staged artifact to `sink`, in staging order.
    pub fn commit(self, sink: &mut dyn ArtifactSink) -> CodegenResult<usize> {
        let count = self.artifacts.len();
        for artifact in self.artifacts {
            sink.add_source(artifact)?;
        }
        debug!("Sink: committed {count} artifacts");
        Ok(count)
    }
}
