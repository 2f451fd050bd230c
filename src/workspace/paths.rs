use super::WorkspaceError;
use crate::shared::{BuildId, ProjectId};
use std::fs;
use std::path::PathBuf;

pub const STATE_DIR_NAME: &str = ".fwbench";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    pub root: PathBuf,
}

impl WorkspacePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR_NAME)
    }

    pub fn state_file(&self) -> PathBuf {
        self.state_dir().join("state.json")
    }

    pub fn workspace_log_path(&self) -> PathBuf {
        self.state_dir().join("logs/workspace.log")
    }

    pub fn manifest_dir(&self) -> PathBuf {
        self.root.join("manifest")
    }

    pub fn manifest_file(&self) -> PathBuf {
        self.manifest_dir().join("west.yml")
    }

    pub fn venv_dir(&self) -> PathBuf {
        self.root.join(".venv")
    }

    pub fn venv_pip(&self) -> PathBuf {
        self.venv_dir().join("bin/pip")
    }

    pub fn board_roots(&self) -> Vec<PathBuf> {
        vec![self.root.join("zephyr/boards"), self.root.join("boards")]
    }

    pub fn project_dir(&self, id: &ProjectId) -> PathBuf {
        self.root.join(id.as_str())
    }

    pub fn build_dir(&self, id: &BuildId) -> PathBuf {
        self.root.join("builds").join(id.as_str())
    }

    pub fn required_directories(&self) -> Vec<PathBuf> {
        vec![self.state_dir(), self.state_dir().join("logs")]
    }
}

pub fn bootstrap_workspace_root(paths: &WorkspacePaths) -> Result<(), WorkspaceError> {
    for path in paths.required_directories() {
        fs::create_dir_all(&path).map_err(|source| WorkspaceError::CreateDir {
            path: path.display().to_string(),
            source,
        })?;
    }
    Ok(())
}
