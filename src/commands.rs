use crate::orchestration::{
    BuildConfigurator, BuildExecutor, DependencyReport, OrchestrationError, ProjectScaffolder,
    SetupPipeline, SetupReport, SdkInstallReport, ToolBinaries, ToolchainInstaller,
};
use crate::prompt::{ConsolePrompter, Prompter};
use crate::workspace::{BuildConfiguration, Project, ProjectOrigin, WorkspaceState, WorkspaceStore};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    CheckDependencies,
    SetupStandard,
    SetupFromRemoteManifest,
    InstallSdk,
    CreateProject,
    AddProject,
    AddBuild,
    Build,
    Status,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "check-dependencies" => CliVerb::CheckDependencies,
        "setup-standard" => CliVerb::SetupStandard,
        "setup-from-remote-manifest" => CliVerb::SetupFromRemoteManifest,
        "install-sdk" => CliVerb::InstallSdk,
        "create-project" => CliVerb::CreateProject,
        "add-project" => CliVerb::AddProject,
        "add-build" => CliVerb::AddBuild,
        "build" => CliVerb::Build,
        "status" => CliVerb::Status,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  check-dependencies                   Show bootstrap stage progress".to_string(),
        "  setup-standard                       Scaffold a local manifest and run the bootstrap"
            .to_string(),
        "  setup-from-remote-manifest [url]     Initialize from a remote manifest and bootstrap"
            .to_string(),
        "  install-sdk                          Install the SDK (full or selected toolchains)"
            .to_string(),
        "  create-project                       Create a project from a built-in template"
            .to_string(),
        "  add-project                          Register an existing project folder".to_string(),
        "  add-build [project]                  Add a build configuration for a project"
            .to_string(),
        "  build [name]                         Run the build for a configuration".to_string(),
        "  status                               Show workspace state".to_string(),
    ]
}

pub fn help_text() -> String {
    cli_help_lines().join("\n")
}

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let prompter = ConsolePrompter::new();
    run_cli_with_prompter(args, &prompter)
}

pub fn run_cli_with_prompter(
    args: Vec<String>,
    prompter: &dyn Prompter,
) -> Result<String, String> {
    let Some(first) = args.first() else {
        return Ok(help_text());
    };
    match parse_cli_verb(first) {
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{first}`\n\n{}", help_text())),
        verb => {
            let store = WorkspaceStore::open(workspace_root()).map_err(|err| err.to_string())?;
            let tools = tool_binaries_from_env();
            dispatch(verb, &args[1..], &store, prompter, &tools)
        }
    }
}

fn workspace_root() -> PathBuf {
    if let Some(root) = std::env::var_os("FWBENCH_WORKSPACE_ROOT") {
        return PathBuf::from(root);
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn tool_binaries_from_env() -> ToolBinaries {
    let mut tools = ToolBinaries::default();
    if let Ok(west) = std::env::var("FWBENCH_WEST") {
        if !west.is_empty() {
            tools.west = west;
        }
    }
    if let Ok(python) = std::env::var("FWBENCH_PYTHON") {
        if !python.is_empty() {
            tools.python = python;
        }
    }
    tools
}

fn dispatch(
    verb: CliVerb,
    rest: &[String],
    store: &WorkspaceStore,
    prompter: &dyn Prompter,
    tools: &ToolBinaries,
) -> Result<String, String> {
    match verb {
        CliVerb::CheckDependencies => {
            let report = SetupPipeline::new(store, prompter, tools.clone()).check_dependencies();
            Ok(render_dependency_report(&report))
        }
        CliVerb::SetupStandard => finish(
            SetupPipeline::new(store, prompter, tools.clone())
                .setup_standard()
                .map(|report| render_setup_report(&report)),
        ),
        CliVerb::SetupFromRemoteManifest => {
            let url = rest.first().map(String::as_str);
            finish(
                SetupPipeline::new(store, prompter, tools.clone())
                    .setup_from_remote_manifest(url)
                    .map(|report| render_setup_report(&report)),
            )
        }
        CliVerb::InstallSdk => finish(
            ToolchainInstaller::new(store, prompter, tools.clone())
                .install_sdk()
                .map(|report| render_sdk_report(&report)),
        ),
        CliVerb::CreateProject => finish(
            ProjectScaffolder::new(store, prompter)
                .create_project()
                .map(|project| render_project(&project, "created")),
        ),
        CliVerb::AddProject => finish(
            ProjectScaffolder::new(store, prompter)
                .add_existing_project()
                .map(|project| render_project(&project, "registered")),
        ),
        CliVerb::AddBuild => {
            let project_id = match rest.first().cloned() {
                Some(value) => value,
                None => match store.snapshot().active_project {
                    Some(id) => id.to_string(),
                    None => {
                        return Err(
                            "no project specified and no active project; pass a project name"
                                .to_string(),
                        )
                    }
                },
            };
            finish(
                BuildConfigurator::new(store, prompter)
                    .add_build_configuration(&project_id)
                    .map(|config| render_build_configuration(&config)),
            )
        }
        CliVerb::Build => {
            let build_id = match rest.first().cloned() {
                Some(value) => value,
                None => match store.snapshot().active_build {
                    Some(id) => id.to_string(),
                    None => {
                        return Err(
                            "no build configuration specified and no active build; pass a build name"
                                .to_string(),
                        )
                    }
                },
            };
            finish(BuildExecutor::new(store, tools.clone()).build(&build_id).map(
                |outcome| {
                    if outcome.success {
                        format!("build `{}` for board {} succeeded", outcome.build, outcome.board)
                    } else {
                        format!(
                            "build `{}` for board {} failed with exit code {}\n{}",
                            outcome.build, outcome.board, outcome.exit_code, outcome.stderr
                        )
                    }
                },
            ))
        }
        CliVerb::Status => Ok(render_status(&store.snapshot())),
        CliVerb::Help | CliVerb::Unknown => Ok(help_text()),
    }
}

fn finish(result: Result<String, OrchestrationError>) -> Result<String, String> {
    match result {
        Ok(output) => Ok(output),
        Err(OrchestrationError::Cancelled) => {
            Ok("operation cancelled; no changes were made".to_string())
        }
        Err(err) => Err(err.to_string()),
    }
}

fn flag_mark(value: bool) -> &'static str {
    if value {
        "[x]"
    } else {
        "[ ]"
    }
}

fn render_dependency_report(report: &DependencyReport) -> String {
    let mut lines = vec![
        format!("{} manifest", flag_mark(report.initial_setup_complete)),
        format!("{} dependency sync", flag_mark(report.west_updated)),
        format!(
            "{} python environment",
            flag_mark(report.python_environment_setup)
        ),
        format!("{} package install", flag_mark(report.packages_installed)),
    ];
    match report.next_stage {
        Some(stage) => lines.push(format!("next stage: {stage}")),
        None => lines.push("workspace setup is complete".to_string()),
    }
    lines.join("\n")
}

fn render_setup_report(report: &SetupReport) -> String {
    let run: Vec<String> = report.stages_run.iter().map(|s| s.to_string()).collect();
    let skipped: Vec<String> = report
        .stages_skipped
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut lines = Vec::new();
    if run.is_empty() {
        lines.push("all setup stages were already complete".to_string());
    } else {
        lines.push(format!("stages completed: {}", run.join(", ")));
    }
    if !skipped.is_empty() {
        lines.push(format!("stages skipped: {}", skipped.join(", ")));
    }
    lines.join("\n")
}

fn render_sdk_report(report: &SdkInstallReport) -> String {
    format!("sdk install finished ({})", report.mode.describe())
}

fn render_project(project: &Project, action: &str) -> String {
    format!(
        "{action} project `{}` at {}",
        project.id,
        project.source_path.display()
    )
}

fn render_build_configuration(config: &BuildConfiguration) -> String {
    format!(
        "added build configuration `{}` (project {}, board {}, profile {})",
        config.id, config.project_id, config.board, config.optimization
    )
}

fn render_status(state: &WorkspaceState) -> String {
    let mut lines = vec![
        "Setup:".to_string(),
        format!("  {} manifest", flag_mark(state.initial_setup_complete)),
        format!("  {} dependency sync", flag_mark(state.setup.west_updated)),
        format!(
            "  {} python environment",
            flag_mark(state.setup.python_environment_setup)
        ),
        format!(
            "  {} package install",
            flag_mark(state.setup.packages_installed)
        ),
    ];

    lines.push(format!("Projects ({}):", state.projects.len()));
    for (id, project) in &state.projects {
        let origin = match &project.origin {
            ProjectOrigin::Template { template } => format!("template {template}"),
            ProjectOrigin::Imported { from } => format!("imported from {}", from.display()),
        };
        let marker = if state.active_project.as_ref() == Some(id) {
            "*"
        } else {
            " "
        };
        lines.push(format!("  {marker} {id} ({origin})"));
    }

    lines.push(format!(
        "Build configurations ({}):",
        state.build_configurations.len()
    ));
    for (id, config) in &state.build_configurations {
        let marker = if state.active_build.as_ref() == Some(id) {
            "*"
        } else {
            " "
        };
        lines.push(format!(
            "  {marker} {id} -> {} ({}, {})",
            config.project_id, config.board, config.optimization
        ));
    }
    lines.join("\n")
}
