use super::error::{io_error, OrchestrationError};
use crate::workspace::WorkspacePaths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestRepository {
    pub name: String,
    pub url: String,
    pub revision: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspaceManifest {
    pub template: String,
    pub default_board: String,
    #[serde(default)]
    pub repositories: Vec<ManifestRepository>,
}

pub fn default_repositories() -> Vec<ManifestRepository> {
    vec![ManifestRepository {
        name: "zephyr".to_string(),
        url: "https://github.com/zephyrproject-rtos/zephyr".to_string(),
        revision: "main".to_string(),
    }]
}

pub fn write_manifest(
    paths: &WorkspacePaths,
    manifest: &WorkspaceManifest,
) -> Result<PathBuf, OrchestrationError> {
    let dir = paths.manifest_dir();
    fs::create_dir_all(&dir).map_err(|source| io_error(&dir, source))?;
    let path = paths.manifest_file();
    let body =
        serde_yaml::to_string(manifest).map_err(|source| OrchestrationError::ManifestEncode {
            path: path.display().to_string(),
            source,
        })?;
    fs::write(&path, body).map_err(|source| io_error(&path, source))?;
    Ok(path)
}

pub fn load_manifest(paths: &WorkspacePaths) -> Option<WorkspaceManifest> {
    let path = paths.manifest_file();
    let raw = fs::read_to_string(path).ok()?;
    serde_yaml::from_str(&raw).ok()
}

pub fn manifest_is_valid(paths: &WorkspacePaths) -> bool {
    load_manifest(paths).is_some()
}
