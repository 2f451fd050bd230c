use super::error::OrchestrationError;
use super::pipeline::{require_setup_complete, ToolBinaries};
use crate::process::{run_process, ProcessRequest};
use crate::prompt::Prompter;
use crate::workspace::{append_workspace_log, WorkspacePaths, WorkspaceStore};

pub const TOOLCHAIN_TARGETS: [&str; 5] = [
    "arm-zephyr-eabi",
    "aarch64-zephyr-elf",
    "riscv64-zephyr-elf",
    "x86_64-zephyr-elf",
    "xtensa-espressif_esp32_zephyr-elf",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkInstallMode {
    Automatic,
    AllToolchains,
    Selected(Vec<String>),
}

impl SdkInstallMode {
    pub fn describe(&self) -> String {
        match self {
            Self::Automatic => "automatic full install".to_string(),
            Self::AllToolchains => "all toolchains".to_string(),
            Self::Selected(targets) => format!("selected toolchains: {}", targets.join(", ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkInstallReport {
    pub mode: SdkInstallMode,
    pub stdout: String,
}

pub struct ToolchainInstaller<'a> {
    store: &'a WorkspaceStore,
    prompter: &'a dyn Prompter,
    tools: ToolBinaries,
}

impl<'a> ToolchainInstaller<'a> {
    pub fn new(store: &'a WorkspaceStore, prompter: &'a dyn Prompter, tools: ToolBinaries) -> Self {
        Self {
            store,
            prompter,
            tools,
        }
    }

    pub fn install_sdk(&self) -> Result<SdkInstallReport, OrchestrationError> {
        require_setup_complete(&self.store.snapshot(), "install-sdk")?;

        let mode_options = vec![
            "Automatic (install the full SDK)".to_string(),
            "Select specific toolchains".to_string(),
        ];
        let Some(mode_index) = self.prompter.select_one("SDK install mode", &mode_options)? else {
            return Err(OrchestrationError::Cancelled);
        };

        let mode = if mode_index == 0 {
            SdkInstallMode::Automatic
        } else {
            let scope_options = vec![
                "Install all toolchains".to_string(),
                "Select specific toolchains".to_string(),
            ];
            let Some(scope_index) = self.prompter.select_one("Toolchain scope", &scope_options)?
            else {
                return Err(OrchestrationError::Cancelled);
            };
            if scope_index == 0 {
                SdkInstallMode::AllToolchains
            } else {
                let targets: Vec<String> =
                    TOOLCHAIN_TARGETS.iter().map(|t| t.to_string()).collect();
                let Some(picked) = self
                    .prompter
                    .select_many("Toolchains to install", &targets)?
                else {
                    return Err(OrchestrationError::Cancelled);
                };
                if picked.is_empty() {
                    return Err(OrchestrationError::Cancelled);
                }
                let selected: Vec<String> = picked
                    .into_iter()
                    .filter_map(|index| targets.get(index).cloned())
                    .collect();
                if selected.is_empty() {
                    return Err(OrchestrationError::Cancelled);
                }
                SdkInstallMode::Selected(selected)
            }
        };

        let request = sdk_install_invocation(&self.tools, self.store.paths(), &mode);
        let output = run_process(&request)?;
        if !output.success() {
            append_workspace_log(
                self.store.paths(),
                "error",
                "sdk.install.failed",
                &format!("mode={} exit_code={}", mode.describe(), output.exit_code),
            );
            return Err(OrchestrationError::SdkInstallFailed {
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }
        append_workspace_log(
            self.store.paths(),
            "info",
            "sdk.install.complete",
            &mode.describe(),
        );
        Ok(SdkInstallReport {
            mode,
            stdout: output.stdout,
        })
    }
}

pub fn sdk_install_invocation(
    tools: &ToolBinaries,
    paths: &WorkspacePaths,
    mode: &SdkInstallMode,
) -> ProcessRequest {
    let mut args = vec!["sdk".to_string(), "install".to_string()];
    if let SdkInstallMode::Selected(targets) = mode {
        for target in targets {
            args.push("-t".to_string());
            args.push(target.clone());
        }
    }
    ProcessRequest::new(tools.west.clone(), args, paths.root.clone())
}
