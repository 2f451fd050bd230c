pub mod boards;
pub mod build;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod project;
pub mod sdk;
pub mod templates;

pub use boards::{
    board_search_roots, discover_boards, BoardDefinition, BOARD_DESCRIPTOR_FILE,
    BOARD_SCAN_MAX_DEPTH,
};
pub use build::{build_invocation, BuildConfigurator, BuildExecutor, BuildOutcome};
pub use error::OrchestrationError;
pub use manifest::{
    default_repositories, load_manifest, manifest_is_valid, write_manifest, ManifestRepository,
    WorkspaceManifest,
};
pub use pipeline::{
    dependency_sync_invocation, find_requirements_manifest, package_install_invocation,
    python_env_invocation, remote_init_invocation, wait_for_stage, DependencyReport, RetryPolicy,
    SetupPipeline, SetupReport, ToolBinaries, SETUP_BOARDS, SETUP_TEMPLATES,
};
pub use project::ProjectScaffolder;
pub use sdk::{sdk_install_invocation, SdkInstallMode, SdkInstallReport, ToolchainInstaller, TOOLCHAIN_TARGETS};
pub use templates::{
    template_by_name, template_files, ProjectTemplate, PROJECT_DESCRIPTOR_FILE, PROJECT_TEMPLATES,
};
