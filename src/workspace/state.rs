use super::WorkspaceError;
use crate::shared::{BuildId, ProjectId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ActiveSetupState {
    pub west_updated: bool,
    pub python_environment_setup: bool,
    pub packages_installed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProjectOrigin {
    Template { template: String },
    Imported { from: PathBuf },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    pub source_path: PathBuf,
    pub origin: ProjectOrigin,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationProfile {
    Debug,
    Speed,
    Size,
}

impl OptimizationProfile {
    pub const ALL: [Self; 3] = [Self::Debug, Self::Speed, Self::Size];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Speed => "speed",
            Self::Size => "size",
        }
    }

    pub fn build_flag(self) -> &'static str {
        match self {
            Self::Debug => "-DCONFIG_DEBUG_OPTIMIZATIONS=y",
            Self::Speed => "-DCONFIG_SPEED_OPTIMIZATIONS=y",
            Self::Size => "-DCONFIG_SIZE_OPTIMIZATIONS=y",
        }
    }
}

impl std::fmt::Display for OptimizationProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub id: BuildId,
    pub project_id: ProjectId,
    pub board: String,
    pub optimization: OptimizationProfile,
    #[serde(default)]
    pub extra_board_search_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct WorkspaceState {
    pub initial_setup_complete: bool,
    #[serde(default)]
    pub setup: ActiveSetupState,
    #[serde(default)]
    pub projects: BTreeMap<ProjectId, Project>,
    #[serde(default)]
    pub build_configurations: BTreeMap<BuildId, BuildConfiguration>,
    #[serde(default)]
    pub external_board_roots: Vec<PathBuf>,
    #[serde(default)]
    pub active_project: Option<ProjectId>,
    #[serde(default)]
    pub active_build: Option<BuildId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SetupStage {
    Manifest,
    DependencySync,
    PythonEnvironment,
    PackageInstall,
}

impl SetupStage {
    pub const ALL: [Self; 4] = [
        Self::Manifest,
        Self::DependencySync,
        Self::PythonEnvironment,
        Self::PackageInstall,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manifest => "manifest",
            Self::DependencySync => "dependency_sync",
            Self::PythonEnvironment => "python_environment",
            Self::PackageInstall => "package_install",
        }
    }

    pub fn predecessor(self) -> Option<Self> {
        match self {
            Self::Manifest => None,
            Self::DependencySync => Some(Self::Manifest),
            Self::PythonEnvironment => Some(Self::DependencySync),
            Self::PackageInstall => Some(Self::PythonEnvironment),
        }
    }
}

impl std::fmt::Display for SetupStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WorkspaceState {
    pub fn stage_complete(&self, stage: SetupStage) -> bool {
        match stage {
            SetupStage::Manifest => self.initial_setup_complete,
            SetupStage::DependencySync => self.setup.west_updated,
            SetupStage::PythonEnvironment => self.setup.python_environment_setup,
            SetupStage::PackageInstall => self.setup.packages_installed,
        }
    }

    pub fn ready_for(&self, stage: SetupStage) -> bool {
        stage
            .predecessor()
            .map(|predecessor| self.stage_complete(predecessor))
            .unwrap_or(true)
    }

    pub fn mark_stage_complete(&mut self, stage: SetupStage) {
        match stage {
            SetupStage::Manifest => self.initial_setup_complete = true,
            SetupStage::DependencySync => self.setup.west_updated = true,
            SetupStage::PythonEnvironment => self.setup.python_environment_setup = true,
            SetupStage::PackageInstall => self.setup.packages_installed = true,
        }
    }

    pub fn first_incomplete_stage(&self) -> Option<SetupStage> {
        SetupStage::ALL
            .into_iter()
            .find(|stage| !self.stage_complete(*stage))
    }

    pub fn setup_complete(&self) -> bool {
        self.first_incomplete_stage().is_none()
    }

    pub fn validate(&self, state_path: &Path) -> Result<(), WorkspaceError> {
        for (build, config) in &self.build_configurations {
            if !self.projects.contains_key(config.project_id.as_str()) {
                return Err(WorkspaceError::DanglingProjectReference {
                    path: state_path.display().to_string(),
                    build: build.to_string(),
                    project: config.project_id.to_string(),
                });
            }
        }
        Ok(())
    }
}
