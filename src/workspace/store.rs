use super::{bootstrap_workspace_root, WorkspaceError, WorkspacePaths, WorkspaceState};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
pub struct WorkspaceStore {
    paths: WorkspacePaths,
    state: Mutex<WorkspaceState>,
}

impl WorkspaceStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, WorkspaceError> {
        let paths = WorkspacePaths::new(root);
        bootstrap_workspace_root(&paths)?;
        let state = load_workspace_state(&paths)?;
        Ok(Self {
            paths,
            state: Mutex::new(state),
        })
    }

    pub fn paths(&self) -> &WorkspacePaths {
        &self.paths
    }

    pub fn snapshot(&self) -> WorkspaceState {
        self.lock().clone()
    }

    pub fn mutate<T, E>(
        &self,
        apply: impl FnOnce(&mut WorkspaceState) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<WorkspaceError>,
    {
        let mut guard = self.lock();
        let mut scratch = guard.clone();
        let value = apply(&mut scratch)?;
        if scratch != *guard {
            save_workspace_state(&self.paths, &scratch).map_err(E::from)?;
            *guard = scratch;
        }
        Ok(value)
    }

    fn lock(&self) -> MutexGuard<'_, WorkspaceState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub fn load_workspace_state(paths: &WorkspacePaths) -> Result<WorkspaceState, WorkspaceError> {
    let path = paths.state_file();
    if !path.exists() {
        return Ok(WorkspaceState::default());
    }
    let raw = fs::read_to_string(&path).map_err(|source| WorkspaceError::ReadState {
        path: path.display().to_string(),
        source,
    })?;
    let state: WorkspaceState =
        serde_json::from_str(&raw).map_err(|source| WorkspaceError::ParseState {
            path: path.display().to_string(),
            source,
        })?;
    state.validate(&path)?;
    Ok(state)
}

pub fn save_workspace_state(
    paths: &WorkspacePaths,
    state: &WorkspaceState,
) -> Result<(), WorkspaceError> {
    let path = paths.state_file();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| WorkspaceError::CreateDir {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let encoded =
        serde_json::to_vec_pretty(state).map_err(|source| WorkspaceError::ParseState {
            path: path.display().to_string(),
            source,
        })?;
    atomic_write_state(&path, &encoded).map_err(|source| WorkspaceError::WriteState {
        path: path.display().to_string(),
        source,
    })
}

static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

fn atomic_write_state(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("state path has no parent"))?;
    let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
    let tmp_path = parent.join(format!(".state.tmp-{}-{seq}", std::process::id()));

    {
        let mut file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&tmp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
    }

    fs::rename(&tmp_path, path)?;
    sync_parent_dir(parent)
}

#[cfg(unix)]
fn sync_parent_dir(parent: &Path) -> std::io::Result<()> {
    fs::File::open(parent)?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent_dir(_parent: &Path) -> std::io::Result<()> {
    Ok(())
}
