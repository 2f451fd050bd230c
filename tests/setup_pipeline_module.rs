use fwbench::orchestration::{
    manifest_is_valid, OrchestrationError, RetryPolicy, SetupPipeline, ToolBinaries,
};
use fwbench::prompt::ScriptedPrompter;
use fwbench::workspace::{SetupStage, WorkspacePaths, WorkspaceStore};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).expect("write script");
    let mut perms = fs::metadata(path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod");
}

fn install_mock_tools(tools_dir: &Path) -> (ToolBinaries, PathBuf) {
    let log = tools_dir.join("invocations.log");
    let west = tools_dir.join("west-mock");
    write_script(
        &west,
        &format!(
            "#!/bin/sh\n\
             echo \"west $@\" >> \"{log}\"\n\
             case \"$1\" in\n\
               init) if [ -f \"{dir}/fail-init\" ]; then echo \"init failed\" >&2; exit 1; fi ;;\n\
               update) if [ -f \"{dir}/fail-update\" ]; then echo \"sync failed\" >&2; exit 1; fi ;;\n\
               sdk) if [ -f \"{dir}/fail-sdk\" ]; then echo \"sdk failed\" >&2; exit 1; fi ;;\n\
               build) if [ -f \"{dir}/fail-build\" ]; then echo \"build failed\" >&2; exit 7; fi ;;\n\
             esac\n\
             exit 0\n",
            log = log.display(),
            dir = tools_dir.display(),
        ),
    );
    let python = tools_dir.join("python-mock");
    write_script(
        &python,
        &format!(
            "#!/bin/sh\n\
             echo \"python $@\" >> \"{log}\"\n\
             if [ \"$2\" = \"venv\" ]; then\n\
               if [ -f \"{dir}/fail-venv\" ]; then echo \"venv failed\" >&2; exit 1; fi\n\
               mkdir -p \"$3\"\n\
             fi\n\
             if [ \"$2\" = \"pip\" ]; then\n\
               if [ -f \"{dir}/fail-pip\" ]; then echo \"pip failed\" >&2; exit 1; fi\n\
             fi\n\
             exit 0\n",
            log = log.display(),
            dir = tools_dir.display(),
        ),
    );
    (
        ToolBinaries {
            west: west.display().to_string(),
            python: python.display().to_string(),
        },
        log,
    )
}

fn invocation_lines(log: &Path) -> Vec<String> {
    fs::read_to_string(log)
        .map(|raw| raw.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

fn seed_requirements(root: &Path) {
    fs::create_dir_all(root.join("zephyr/scripts")).expect("mkdir");
    fs::write(
        root.join("zephyr/scripts/requirements.txt"),
        "west\npyelftools\n",
    )
    .expect("write");
}

fn standard_prompts() -> ScriptedPrompter {
    let prompter = ScriptedPrompter::new();
    prompter.queue_selection(Some(0));
    prompter.queue_selection(Some(0));
    prompter
}

#[test]
fn standard_setup_runs_all_stages_and_records_flags() {
    let workspace = tempdir().expect("tempdir");
    let tools_dir = tempdir().expect("tempdir");
    seed_requirements(workspace.path());
    let (tools, log) = install_mock_tools(tools_dir.path());
    let store = WorkspaceStore::open(workspace.path()).expect("open");
    let prompter = standard_prompts();

    let pipeline = SetupPipeline::new(&store, &prompter, tools);
    let report = pipeline.setup_standard().expect("setup");

    assert_eq!(
        report.stages_run,
        vec![
            SetupStage::Manifest,
            SetupStage::DependencySync,
            SetupStage::PythonEnvironment,
            SetupStage::PackageInstall,
        ]
    );
    let state = store.snapshot();
    assert!(state.initial_setup_complete);
    assert!(state.setup.west_updated);
    assert!(state.setup.python_environment_setup);
    assert!(state.setup.packages_installed);
    assert!(manifest_is_valid(&WorkspacePaths::new(workspace.path())));

    let lines = invocation_lines(&log);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("west update"));
    assert!(lines[1].contains("venv"));
    assert!(lines[2].contains("pip install -r"));
}

#[test]
fn completed_setup_invokes_no_external_processes() {
    let workspace = tempdir().expect("tempdir");
    let tools_dir = tempdir().expect("tempdir");
    seed_requirements(workspace.path());
    let (tools, log) = install_mock_tools(tools_dir.path());
    let store = WorkspaceStore::open(workspace.path()).expect("open");

    let prompter = standard_prompts();
    SetupPipeline::new(&store, &prompter, tools.clone())
        .setup_standard()
        .expect("setup");
    let lines_after_first = invocation_lines(&log).len();

    let silent = ScriptedPrompter::new();
    let report = SetupPipeline::new(&store, &silent, tools)
        .setup_standard()
        .expect("re-run");
    assert!(report.stages_run.is_empty());
    assert_eq!(report.stages_skipped.len(), 4);
    assert_eq!(invocation_lines(&log).len(), lines_after_first);
    assert!(silent.transcript().is_empty());
}

#[test]
fn dependency_sync_failure_leaves_flag_unset_and_resumes_there() {
    let workspace = tempdir().expect("tempdir");
    let tools_dir = tempdir().expect("tempdir");
    seed_requirements(workspace.path());
    let (tools, log) = install_mock_tools(tools_dir.path());
    let store = WorkspaceStore::open(workspace.path()).expect("open");

    fs::write(tools_dir.path().join("fail-update"), "").expect("marker");
    let prompter = standard_prompts();
    let err = SetupPipeline::new(&store, &prompter, tools.clone())
        .setup_standard()
        .expect_err("sync fails");
    assert!(matches!(
        err,
        OrchestrationError::DependencySyncFailed { exit_code: 1, .. }
    ));
    let state = store.snapshot();
    assert!(state.initial_setup_complete);
    assert!(!state.setup.west_updated);

    fs::remove_file(tools_dir.path().join("fail-update")).expect("unmark");
    let silent = ScriptedPrompter::new();
    let report = SetupPipeline::new(&store, &silent, tools)
        .setup_standard()
        .expect("resume");
    assert_eq!(
        report.stages_run,
        vec![
            SetupStage::DependencySync,
            SetupStage::PythonEnvironment,
            SetupStage::PackageInstall,
        ]
    );
    assert_eq!(report.stages_skipped, vec![SetupStage::Manifest]);

    let update_count = invocation_lines(&log)
        .iter()
        .filter(|line| line.starts_with("west update"))
        .count();
    assert_eq!(update_count, 2);
}

#[test]
fn environment_failure_resumes_at_environment_stage() {
    let workspace = tempdir().expect("tempdir");
    let tools_dir = tempdir().expect("tempdir");
    seed_requirements(workspace.path());
    let (tools, log) = install_mock_tools(tools_dir.path());
    let store = WorkspaceStore::open(workspace.path()).expect("open");

    fs::write(tools_dir.path().join("fail-venv"), "").expect("marker");
    let prompter = standard_prompts();
    let err = SetupPipeline::new(&store, &prompter, tools.clone())
        .setup_standard()
        .expect_err("venv fails");
    assert!(matches!(
        err,
        OrchestrationError::EnvironmentSetupFailed { .. }
    ));
    let state = store.snapshot();
    assert!(state.setup.west_updated);
    assert!(!state.setup.python_environment_setup);

    fs::remove_file(tools_dir.path().join("fail-venv")).expect("unmark");
    let silent = ScriptedPrompter::new();
    let report = SetupPipeline::new(&store, &silent, tools)
        .setup_standard()
        .expect("resume");
    assert_eq!(
        report.stages_run,
        vec![SetupStage::PythonEnvironment, SetupStage::PackageInstall]
    );

    let update_count = invocation_lines(&log)
        .iter()
        .filter(|line| line.starts_with("west update"))
        .count();
    assert_eq!(update_count, 1);
}

#[test]
fn package_install_failure_resumes_at_package_stage() {
    let workspace = tempdir().expect("tempdir");
    let tools_dir = tempdir().expect("tempdir");
    seed_requirements(workspace.path());
    let (tools, _log) = install_mock_tools(tools_dir.path());
    let store = WorkspaceStore::open(workspace.path()).expect("open");

    fs::write(tools_dir.path().join("fail-pip"), "").expect("marker");
    let prompter = standard_prompts();
    let err = SetupPipeline::new(&store, &prompter, tools.clone())
        .setup_standard()
        .expect_err("pip fails");
    assert!(matches!(
        err,
        OrchestrationError::PackageInstallFailed { .. }
    ));
    assert!(!store.snapshot().setup.packages_installed);

    fs::remove_file(tools_dir.path().join("fail-pip")).expect("unmark");
    let silent = ScriptedPrompter::new();
    let report = SetupPipeline::new(&store, &silent, tools)
        .setup_standard()
        .expect("resume");
    assert_eq!(report.stages_run, vec![SetupStage::PackageInstall]);
    assert!(store.snapshot().setup.packages_installed);
}

#[test]
fn cancelling_template_prompt_changes_nothing() {
    let workspace = tempdir().expect("tempdir");
    let tools_dir = tempdir().expect("tempdir");
    let (tools, log) = install_mock_tools(tools_dir.path());
    let store = WorkspaceStore::open(workspace.path()).expect("open");

    let prompter = ScriptedPrompter::new();
    prompter.queue_selection(None);
    let err = SetupPipeline::new(&store, &prompter, tools)
        .setup_standard()
        .expect_err("cancelled");
    assert!(matches!(err, OrchestrationError::Cancelled));
    assert!(!store.snapshot().initial_setup_complete);
    assert!(invocation_lines(&log).is_empty());
}

#[test]
fn remote_setup_failure_is_retryable() {
    let workspace = tempdir().expect("tempdir");
    let tools_dir = tempdir().expect("tempdir");
    seed_requirements(workspace.path());
    let (tools, log) = install_mock_tools(tools_dir.path());
    let store = WorkspaceStore::open(workspace.path()).expect("open");
    let url = "https://example.com/fw-manifest.git";

    fs::write(tools_dir.path().join("fail-init"), "").expect("marker");
    let prompter = ScriptedPrompter::new();
    let err = SetupPipeline::new(&store, &prompter, tools.clone())
        .setup_from_remote_manifest(Some(url))
        .expect_err("init fails");
    assert!(matches!(err, OrchestrationError::SetupFailed { .. }));
    assert!(!store.snapshot().initial_setup_complete);

    fs::remove_file(tools_dir.path().join("fail-init")).expect("unmark");
    let report = SetupPipeline::new(&store, &prompter, tools)
        .setup_from_remote_manifest(Some(url))
        .expect("retry");
    assert_eq!(report.stages_run.len(), 4);
    assert!(store.snapshot().setup.packages_installed);

    let init_lines: Vec<String> = invocation_lines(&log)
        .into_iter()
        .filter(|line| line.starts_with("west init"))
        .collect();
    assert_eq!(init_lines.len(), 2);
    assert!(init_lines[0].contains(url));
}

#[test]
fn remote_setup_prompts_for_url_when_absent() {
    let workspace = tempdir().expect("tempdir");
    let tools_dir = tempdir().expect("tempdir");
    seed_requirements(workspace.path());
    let (tools, log) = install_mock_tools(tools_dir.path());
    let store = WorkspaceStore::open(workspace.path()).expect("open");

    let prompter = ScriptedPrompter::new();
    prompter.queue_text(Some("https://example.com/other.git"));
    SetupPipeline::new(&store, &prompter, tools)
        .setup_from_remote_manifest(None)
        .expect("setup");
    assert!(prompter
        .transcript()
        .iter()
        .any(|line| line.starts_with("input_text")));
    assert!(invocation_lines(&log)
        .iter()
        .any(|line| line.contains("https://example.com/other.git")));
}

#[test]
fn cancelled_url_prompt_aborts_remote_setup() {
    let workspace = tempdir().expect("tempdir");
    let tools_dir = tempdir().expect("tempdir");
    let (tools, log) = install_mock_tools(tools_dir.path());
    let store = WorkspaceStore::open(workspace.path()).expect("open");

    let prompter = ScriptedPrompter::new();
    prompter.queue_text(None);
    let err = SetupPipeline::new(&store, &prompter, tools)
        .setup_from_remote_manifest(None)
        .expect_err("cancelled");
    assert!(matches!(err, OrchestrationError::Cancelled));
    assert!(invocation_lines(&log).is_empty());
}

#[test]
fn check_dependencies_reports_next_stage() {
    let workspace = tempdir().expect("tempdir");
    let tools_dir = tempdir().expect("tempdir");
    let (tools, _log) = install_mock_tools(tools_dir.path());
    let store = WorkspaceStore::open(workspace.path()).expect("open");
    let prompter = ScriptedPrompter::new();

    let report = SetupPipeline::new(&store, &prompter, tools).check_dependencies();
    assert!(!report.initial_setup_complete);
    assert_eq!(report.next_stage, Some(SetupStage::Manifest));
}

#[test]
fn wait_for_stage_observes_completed_flag() {
    let workspace = tempdir().expect("tempdir");
    let store = WorkspaceStore::open(workspace.path()).expect("open");
    let policy = RetryPolicy {
        max_attempts: 2,
        delay: Duration::from_millis(10),
    };
    assert!(!fwbench::orchestration::wait_for_stage(
        &store,
        SetupStage::Manifest,
        policy
    ));

    store
        .mutate(|state| {
            state.mark_stage_complete(SetupStage::Manifest);
            Ok::<_, fwbench::workspace::WorkspaceError>(())
        })
        .expect("mutate");
    assert!(fwbench::orchestration::wait_for_stage(
        &store,
        SetupStage::Manifest,
        policy
    ));
}
