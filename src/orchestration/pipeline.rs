use super::error::OrchestrationError;
use super::manifest::{default_repositories, write_manifest, WorkspaceManifest};
use crate::process::{run_process, ProcessOutput, ProcessRequest};
use crate::prompt::{choice_label, Prompter};
use crate::workspace::{
    append_workspace_log, load_workspace_state, SetupStage, WorkspacePaths, WorkspaceState,
    WorkspaceStore,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

pub const SETUP_TEMPLATES: [&str; 3] = ["minimal", "application", "sample"];
pub const SETUP_BOARDS: [&str; 4] = ["stm32", "nrf52dk", "esp32", "native_sim"];

const CONTINUATION_STAGES: [SetupStage; 3] = [
    SetupStage::DependencySync,
    SetupStage::PythonEnvironment,
    SetupStage::PackageInstall,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolBinaries {
    pub west: String,
    pub python: String,
}

impl Default for ToolBinaries {
    fn default() -> Self {
        Self {
            west: "west".to_string(),
            python: "python3".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetupReport {
    pub stages_run: Vec<SetupStage>,
    pub stages_skipped: Vec<SetupStage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyReport {
    pub initial_setup_complete: bool,
    pub west_updated: bool,
    pub python_environment_setup: bool,
    pub packages_installed: bool,
    pub next_stage: Option<SetupStage>,
}

pub struct SetupPipeline<'a> {
    store: &'a WorkspaceStore,
    prompter: &'a dyn Prompter,
    tools: ToolBinaries,
}

impl<'a> SetupPipeline<'a> {
    pub fn new(store: &'a WorkspaceStore, prompter: &'a dyn Prompter, tools: ToolBinaries) -> Self {
        Self {
            store,
            prompter,
            tools,
        }
    }

    pub fn setup_standard(&self) -> Result<SetupReport, OrchestrationError> {
        let mut report = SetupReport::default();
        if self.store.snapshot().initial_setup_complete {
            report.stages_skipped.push(SetupStage::Manifest);
        } else {
            let template_options: Vec<String> =
                SETUP_TEMPLATES.iter().map(|t| t.to_string()).collect();
            let Some(template_index) = self
                .prompter
                .select_one("Project template", &template_options)?
            else {
                return Err(OrchestrationError::Cancelled);
            };
            let template = choice_label(&template_options, template_index)?.to_string();

            let board_options: Vec<String> = SETUP_BOARDS.iter().map(|b| b.to_string()).collect();
            let Some(board_index) = self.prompter.select_one("Default board", &board_options)?
            else {
                return Err(OrchestrationError::Cancelled);
            };
            let default_board = choice_label(&board_options, board_index)?.to_string();

            let manifest = WorkspaceManifest {
                template: template.clone(),
                default_board,
                repositories: default_repositories(),
            };
            write_manifest(self.store.paths(), &manifest)?;
            self.store.mutate(|state| {
                state.mark_stage_complete(SetupStage::Manifest);
                Ok::<_, OrchestrationError>(())
            })?;
            append_workspace_log(
                self.store.paths(),
                "info",
                "setup.manifest.created",
                &format!("template={template} board={}", manifest.default_board),
            );
            report.stages_run.push(SetupStage::Manifest);
        }
        self.resume_from_flags(&mut report)?;
        Ok(report)
    }

    pub fn setup_from_remote_manifest(
        &self,
        url: Option<&str>,
    ) -> Result<SetupReport, OrchestrationError> {
        let mut report = SetupReport::default();
        if self.store.snapshot().initial_setup_complete {
            report.stages_skipped.push(SetupStage::Manifest);
        } else {
            let url = match url.map(str::trim).filter(|value| !value.is_empty()) {
                Some(value) => value.to_string(),
                None => {
                    let Some(value) = self.prompter.input_text("Manifest repository URL")? else {
                        return Err(OrchestrationError::Cancelled);
                    };
                    value
                }
            };
            let request = remote_init_invocation(&self.tools, self.store.paths(), &url);
            let output = run_process(&request)?;
            if !output.success() {
                append_workspace_log(
                    self.store.paths(),
                    "error",
                    "setup.manifest.remote_failed",
                    &format!("url={url} exit_code={}", output.exit_code),
                );
                return Err(OrchestrationError::SetupFailed {
                    exit_code: output.exit_code,
                    stderr: output.stderr,
                });
            }
            self.store.mutate(|state| {
                state.mark_stage_complete(SetupStage::Manifest);
                Ok::<_, OrchestrationError>(())
            })?;
            append_workspace_log(
                self.store.paths(),
                "info",
                "setup.manifest.cloned",
                &format!("url={url}"),
            );
            report.stages_run.push(SetupStage::Manifest);
        }
        self.resume_from_flags(&mut report)?;
        Ok(report)
    }

    pub fn check_dependencies(&self) -> DependencyReport {
        let state = self.store.snapshot();
        DependencyReport {
            initial_setup_complete: state.initial_setup_complete,
            west_updated: state.setup.west_updated,
            python_environment_setup: state.setup.python_environment_setup,
            packages_installed: state.setup.packages_installed,
            next_stage: state.first_incomplete_stage(),
        }
    }

    fn resume_from_flags(&self, report: &mut SetupReport) -> Result<(), OrchestrationError> {
        for stage in CONTINUATION_STAGES {
            let state = self.store.snapshot();
            if state.stage_complete(stage) {
                report.stages_skipped.push(stage);
                continue;
            }
            if !state.ready_for(stage) {
                return Err(OrchestrationError::PreconditionNotMet {
                    operation: "setup".to_string(),
                    missing: stage.predecessor().unwrap_or(SetupStage::Manifest),
                });
            }
            self.run_stage(stage)?;
            report.stages_run.push(stage);
        }
        Ok(())
    }

    fn run_stage(&self, stage: SetupStage) -> Result<(), OrchestrationError> {
        let paths = self.store.paths();
        let request = match stage {
            SetupStage::Manifest => {
                return Err(OrchestrationError::PreconditionNotMet {
                    operation: "setup".to_string(),
                    missing: SetupStage::Manifest,
                })
            }
            SetupStage::DependencySync => dependency_sync_invocation(&self.tools, paths),
            SetupStage::PythonEnvironment => python_env_invocation(&self.tools, paths),
            SetupStage::PackageInstall => package_install_invocation(&self.tools, paths)?,
        };
        let output = run_process(&request)?;
        if !output.success() {
            append_workspace_log(
                paths,
                "error",
                &format!("setup.{stage}.failed"),
                &format!("exit_code={}", output.exit_code),
            );
            return Err(stage_failure(stage, &output));
        }
        self.store.mutate(|state| {
            state.mark_stage_complete(stage);
            Ok::<_, OrchestrationError>(())
        })?;
        append_workspace_log(
            paths,
            "info",
            &format!("setup.{stage}.complete"),
            &request.command_form(),
        );
        Ok(())
    }
}

pub(crate) fn require_setup_complete(
    state: &WorkspaceState,
    operation: &str,
) -> Result<(), OrchestrationError> {
    if let Some(missing) = state.first_incomplete_stage() {
        return Err(OrchestrationError::PreconditionNotMet {
            operation: operation.to_string(),
            missing,
        });
    }
    Ok(())
}

fn stage_failure(stage: SetupStage, output: &ProcessOutput) -> OrchestrationError {
    match stage {
        SetupStage::Manifest => OrchestrationError::SetupFailed {
            exit_code: output.exit_code,
            stderr: output.stderr.clone(),
        },
        SetupStage::DependencySync => OrchestrationError::DependencySyncFailed {
            exit_code: output.exit_code,
            stderr: output.stderr.clone(),
        },
        SetupStage::PythonEnvironment => OrchestrationError::EnvironmentSetupFailed {
            exit_code: output.exit_code,
            stderr: output.stderr.clone(),
        },
        SetupStage::PackageInstall => OrchestrationError::PackageInstallFailed {
            reason: format!("exit code {}: {}", output.exit_code, output.stderr),
        },
    }
}

pub fn remote_init_invocation(
    tools: &ToolBinaries,
    paths: &WorkspacePaths,
    url: &str,
) -> ProcessRequest {
    ProcessRequest::new(
        tools.west.clone(),
        vec![
            "init".to_string(),
            "-m".to_string(),
            url.to_string(),
            ".".to_string(),
        ],
        paths.root.clone(),
    )
}

pub fn dependency_sync_invocation(tools: &ToolBinaries, paths: &WorkspacePaths) -> ProcessRequest {
    ProcessRequest::new(
        tools.west.clone(),
        vec!["update".to_string()],
        paths.root.clone(),
    )
}

pub fn python_env_invocation(tools: &ToolBinaries, paths: &WorkspacePaths) -> ProcessRequest {
    ProcessRequest::new(
        tools.python.clone(),
        vec![
            "-m".to_string(),
            "venv".to_string(),
            paths.venv_dir().display().to_string(),
        ],
        paths.root.clone(),
    )
}

pub fn package_install_invocation(
    tools: &ToolBinaries,
    paths: &WorkspacePaths,
) -> Result<ProcessRequest, OrchestrationError> {
    let Some(requirements) = find_requirements_manifest(paths) else {
        return Err(OrchestrationError::PackageInstallFailed {
            reason: format!(
                "no requirements manifest found under {}",
                paths.root.display()
            ),
        });
    };
    let pip = paths.venv_pip();
    let (binary, mut args) = if pip.is_file() {
        (pip.display().to_string(), Vec::new())
    } else {
        (
            tools.python.clone(),
            vec!["-m".to_string(), "pip".to_string()],
        )
    };
    args.push("install".to_string());
    args.push("-r".to_string());
    args.push(requirements.display().to_string());
    Ok(ProcessRequest::new(binary, args, paths.root.clone()))
}

pub fn find_requirements_manifest(paths: &WorkspacePaths) -> Option<PathBuf> {
    let preferred = paths.root.join("zephyr/scripts/requirements.txt");
    if preferred.is_file() {
        return Some(preferred);
    }
    let mut found = Vec::new();
    collect_requirements(&paths.root, 0, &mut found);
    found.sort();
    found.into_iter().next()
}

fn collect_requirements(dir: &Path, depth: usize, found: &mut Vec<PathBuf>) {
    if depth > 3 {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if path.is_dir() {
            if name.starts_with('.') || name == "builds" {
                continue;
            }
            collect_requirements(&path, depth + 1, found);
        } else if name == "requirements.txt" {
            found.push(path);
        }
    }
}

pub fn wait_for_stage(store: &WorkspaceStore, stage: SetupStage, policy: RetryPolicy) -> bool {
    for attempt in 0..policy.max_attempts {
        let state = load_workspace_state(store.paths()).unwrap_or_else(|_| store.snapshot());
        if state.stage_complete(stage) {
            return true;
        }
        if attempt + 1 < policy.max_attempts {
            thread::sleep(policy.delay);
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn dependency_sync_runs_west_update_at_root() {
        let tools = ToolBinaries::default();
        let paths = WorkspacePaths::new("/ws");
        let request = dependency_sync_invocation(&tools, &paths);
        assert_eq!(request.binary, "west");
        assert_eq!(request.args, vec!["update"]);
        assert_eq!(request.cwd, PathBuf::from("/ws"));
    }

    #[test]
    fn python_env_targets_workspace_venv() {
        let tools = ToolBinaries::default();
        let paths = WorkspacePaths::new("/ws");
        let request = python_env_invocation(&tools, &paths);
        assert_eq!(request.binary, "python3");
        assert_eq!(request.args, vec!["-m", "venv", "/ws/.venv"]);
    }

    #[test]
    fn remote_init_passes_manifest_url() {
        let tools = ToolBinaries::default();
        let paths = WorkspacePaths::new("/ws");
        let request = remote_init_invocation(&tools, &paths, "https://example.com/manifest.git");
        assert_eq!(
            request.args,
            vec!["init", "-m", "https://example.com/manifest.git", "."]
        );
    }

    #[test]
    fn package_install_without_requirements_fails() {
        let dir = tempdir().expect("tempdir");
        let tools = ToolBinaries::default();
        let paths = WorkspacePaths::new(dir.path());
        let err = package_install_invocation(&tools, &paths).expect_err("missing requirements");
        assert!(matches!(
            err,
            OrchestrationError::PackageInstallFailed { .. }
        ));
    }

    #[test]
    fn requirements_discovery_prefers_zephyr_scripts() {
        let dir = tempdir().expect("tempdir");
        let paths = WorkspacePaths::new(dir.path());
        fs::create_dir_all(dir.path().join("modules/app")).expect("mkdir");
        fs::write(dir.path().join("modules/app/requirements.txt"), "click\n").expect("write");
        fs::create_dir_all(dir.path().join("zephyr/scripts")).expect("mkdir");
        fs::write(
            dir.path().join("zephyr/scripts/requirements.txt"),
            "pyelftools\n",
        )
        .expect("write");

        let found = find_requirements_manifest(&paths).expect("found");
        assert_eq!(found, dir.path().join("zephyr/scripts/requirements.txt"));
    }

    #[test]
    fn requirements_discovery_skips_dot_directories() {
        let dir = tempdir().expect("tempdir");
        let paths = WorkspacePaths::new(dir.path());
        fs::create_dir_all(dir.path().join(".venv/lib")).expect("mkdir");
        fs::write(dir.path().join(".venv/lib/requirements.txt"), "x\n").expect("write");
        assert_eq!(find_requirements_manifest(&paths), None);
    }
}
