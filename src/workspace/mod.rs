pub mod error;
pub mod logging;
pub mod paths;
pub mod state;
pub mod store;

pub use error::WorkspaceError;
pub use logging::append_workspace_log;
pub use paths::{bootstrap_workspace_root, WorkspacePaths, STATE_DIR_NAME};
pub use state::{
    ActiveSetupState, BuildConfiguration, OptimizationProfile, Project, ProjectOrigin, SetupStage,
    WorkspaceState,
};
pub use store::{load_workspace_state, save_workspace_state, WorkspaceStore};
