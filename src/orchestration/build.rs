use super::boards::{board_search_roots, discover_boards};
use super::error::OrchestrationError;
use super::pipeline::{require_setup_complete, ToolBinaries};
use crate::process::{run_process, ProcessRequest};
use crate::prompt::{PromptError, Prompter};
use crate::shared::BuildId;
use crate::workspace::{
    append_workspace_log, BuildConfiguration, OptimizationProfile, Project, WorkspacePaths,
    WorkspaceStore,
};
use std::path::PathBuf;

const SELECT_OTHER_FOLDER: &str = "Select other board folder...";

pub struct BuildConfigurator<'a> {
    store: &'a WorkspaceStore,
    prompter: &'a dyn Prompter,
}

impl<'a> BuildConfigurator<'a> {
    pub fn new(store: &'a WorkspaceStore, prompter: &'a dyn Prompter) -> Self {
        Self { store, prompter }
    }

    pub fn add_build_configuration(
        &self,
        project_id: &str,
    ) -> Result<BuildConfiguration, OrchestrationError> {
        let state = self.store.snapshot();
        let Some(project) = state.projects.get(project_id) else {
            return Err(OrchestrationError::UnknownProject {
                id: project_id.to_string(),
            });
        };
        require_setup_complete(&state, "add-build")?;

        let mut session_roots: Vec<PathBuf> = Vec::new();
        let board = loop {
            let roots = board_search_roots(self.store.paths(), &state, &session_roots);
            let boards = discover_boards(&roots);
            let mut options: Vec<String> =
                boards.iter().map(|board| board.name.clone()).collect();
            options.push(SELECT_OTHER_FOLDER.to_string());

            let Some(choice) = self.prompter.select_one("Target board", &options)? else {
                return Err(OrchestrationError::Cancelled);
            };
            if choice == boards.len() {
                let Some(folder) = self.prompter.select_folder("Board definitions folder")?
                else {
                    return Err(OrchestrationError::Cancelled);
                };
                session_roots.push(folder);
                continue;
            }
            let Some(board) = boards.get(choice) else {
                return Err(OrchestrationError::Prompt(PromptError::Terminal(format!(
                    "selection index {choice} out of range"
                ))));
            };
            break board.clone();
        };

        let profile_options: Vec<String> = OptimizationProfile::ALL
            .iter()
            .map(|profile| profile.as_str().to_string())
            .collect();
        let Some(profile_index) = self
            .prompter
            .select_one("Optimization profile", &profile_options)?
        else {
            return Err(OrchestrationError::Cancelled);
        };
        let Some(optimization) = OptimizationProfile::ALL.get(profile_index).copied() else {
            return Err(OrchestrationError::Prompt(PromptError::Terminal(format!(
                "selection index {profile_index} out of range"
            ))));
        };

        let Some(raw_id) = self.prompter.input_text("Build configuration name")? else {
            return Err(OrchestrationError::Cancelled);
        };
        let id = BuildId::parse(&raw_id).map_err(|reason| OrchestrationError::InvalidIdentifier {
            kind: "build name",
            reason,
        })?;

        let config = BuildConfiguration {
            id: id.clone(),
            project_id: project.id.clone(),
            board: board.name.clone(),
            optimization,
            extra_board_search_paths: session_roots.clone(),
        };
        self.store.mutate(|state| {
            if state.build_configurations.contains_key(id.as_str()) {
                return Err(OrchestrationError::DuplicateIdentifier {
                    kind: "build configuration",
                    id: id.to_string(),
                });
            }
            if !state.projects.contains_key(config.project_id.as_str()) {
                return Err(OrchestrationError::UnknownProject {
                    id: config.project_id.to_string(),
                });
            }
            for root in &session_roots {
                if !state.external_board_roots.contains(root) {
                    state.external_board_roots.push(root.clone());
                }
            }
            state.build_configurations.insert(id.clone(), config.clone());
            state.active_build = Some(id.clone());
            Ok(())
        })?;
        append_workspace_log(
            self.store.paths(),
            "info",
            "build.configuration.added",
            &format!(
                "id={id} project={} board={} profile={optimization}",
                config.project_id, config.board
            ),
        );
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub build: BuildId,
    pub board: String,
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

pub struct BuildExecutor<'a> {
    store: &'a WorkspaceStore,
    tools: ToolBinaries,
}

impl<'a> BuildExecutor<'a> {
    pub fn new(store: &'a WorkspaceStore, tools: ToolBinaries) -> Self {
        Self { store, tools }
    }

    pub fn build(&self, build_id: &str) -> Result<BuildOutcome, OrchestrationError> {
        let state = self.store.snapshot();
        let Some(config) = state.build_configurations.get(build_id) else {
            return Err(OrchestrationError::UnknownBuildConfiguration {
                id: build_id.to_string(),
            });
        };
        require_setup_complete(&state, "build")?;
        let Some(project) = state.projects.get(config.project_id.as_str()) else {
            return Err(OrchestrationError::UnknownProject {
                id: config.project_id.to_string(),
            });
        };

        let request = build_invocation(&self.tools, self.store.paths(), config, project);
        let output = run_process(&request)?;
        append_workspace_log(
            self.store.paths(),
            if output.success() { "info" } else { "error" },
            if output.success() {
                "build.complete"
            } else {
                "build.failed"
            },
            &format!("id={build_id} exit_code={}", output.exit_code),
        );
        Ok(BuildOutcome {
            build: config.id.clone(),
            board: config.board.clone(),
            success: output.success(),
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

pub fn build_invocation(
    tools: &ToolBinaries,
    paths: &WorkspacePaths,
    config: &BuildConfiguration,
    project: &Project,
) -> ProcessRequest {
    ProcessRequest::new(
        tools.west.clone(),
        vec![
            "build".to_string(),
            "--board".to_string(),
            config.board.clone(),
            "--build-dir".to_string(),
            paths.build_dir(&config.id).display().to_string(),
            project.source_path.display().to_string(),
            "--".to_string(),
            config.optimization.build_flag().to_string(),
        ],
        paths.root.clone(),
    )
}
