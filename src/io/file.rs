use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::info;

use crate::error::StoreError;
use crate::model::Workspace;

/// Source of workspace snapshots and sink for committed changes.
pub trait WorkspaceStore {
    fn load(&self) -> Result<Workspace, StoreError>;
    fn save(&self, workspace: &Workspace) -> Result<(), StoreError>;
}

/// A workspace kept in a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WorkspaceStore for JsonFileStore {
    fn load(&self) -> Result<Workspace, StoreError> {
        let json = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let workspace: Workspace = serde_json::from_str(&json)?;
        workspace.settings.validate()?;
        info!(
            path = %self.path.display(),
            projects = workspace.projects.len(),
            events = workspace.events.len(),
            "workspace loaded"
        );
        Ok(workspace)
    }

    fn save(&self, workspace: &Workspace) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(workspace)?;
        std::fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), "workspace saved");
        Ok(())
    }
}

/// An in-memory workspace, for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryStore {
    workspace: Mutex<Workspace>,
}

impl MemoryStore {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            workspace: Mutex::new(workspace),
        }
    }

    /// Copy of what was last saved.
    pub fn snapshot(&self) -> Workspace {
        match self.workspace.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl WorkspaceStore for MemoryStore {
    fn load(&self) -> Result<Workspace, StoreError> {
        let workspace = self.snapshot();
        workspace.settings.validate()?;
        Ok(workspace)
    }

    fn save(&self, workspace: &Workspace) -> Result<(), StoreError> {
        let mut guard = match self.workspace.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = workspace.clone();
        Ok(())
    }
}
