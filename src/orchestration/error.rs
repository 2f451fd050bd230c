use crate::process::ProcessError;
use crate::prompt::PromptError;
use crate::workspace::{SetupStage, WorkspaceError};

#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    #[error("`{operation}` requires the `{missing}` setup stage to be complete")]
    PreconditionNotMet {
        operation: String,
        missing: SetupStage,
    },
    #[error("{kind} `{id}` already exists")]
    DuplicateIdentifier { kind: &'static str, id: String },
    #[error("invalid {kind}: {reason}")]
    InvalidIdentifier { kind: &'static str, reason: String },
    #[error("unknown project `{id}`")]
    UnknownProject { id: String },
    #[error("unknown build configuration `{id}`")]
    UnknownBuildConfiguration { id: String },
    #[error("folder {path} is not a valid project root: {reason}")]
    InvalidProjectFolder { path: String, reason: String },
    #[error("operation cancelled")]
    Cancelled,
    #[error("manifest setup failed with exit code {exit_code}: {stderr}")]
    SetupFailed { exit_code: i32, stderr: String },
    #[error("dependency sync failed with exit code {exit_code}: {stderr}")]
    DependencySyncFailed { exit_code: i32, stderr: String },
    #[error("environment setup failed with exit code {exit_code}: {stderr}")]
    EnvironmentSetupFailed { exit_code: i32, stderr: String },
    #[error("package install failed: {reason}")]
    PackageInstallFailed { reason: String },
    #[error("sdk install failed with exit code {exit_code}: {stderr}")]
    SdkInstallFailed { exit_code: i32, stderr: String },
    #[error("failed to encode manifest {path}: {source}")]
    ManifestEncode {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("external tool failure: {0}")]
    Tool(#[from] ProcessError),
    #[error("workspace state failure: {0}")]
    Workspace(#[from] WorkspaceError),
    #[error("prompt failure: {0}")]
    Prompt(#[from] PromptError),
}

pub(crate) fn io_error(path: &std::path::Path, source: std::io::Error) -> OrchestrationError {
    OrchestrationError::Io {
        path: path.display().to_string(),
        source,
    }
}
