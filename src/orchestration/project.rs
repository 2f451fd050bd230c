use super::error::{io_error, OrchestrationError};
use super::pipeline::require_setup_complete;
use super::templates::{template_files, PROJECT_DESCRIPTOR_FILE, PROJECT_TEMPLATES};
use crate::prompt::{PromptError, Prompter};
use crate::shared::{now_secs, ProjectId};
use crate::workspace::{append_workspace_log, Project, ProjectOrigin, WorkspaceStore};
use std::fs;

pub struct ProjectScaffolder<'a> {
    store: &'a WorkspaceStore,
    prompter: &'a dyn Prompter,
}

impl<'a> ProjectScaffolder<'a> {
    pub fn new(store: &'a WorkspaceStore, prompter: &'a dyn Prompter) -> Self {
        Self { store, prompter }
    }

    pub fn create_project(&self) -> Result<Project, OrchestrationError> {
        require_setup_complete(&self.store.snapshot(), "create-project")?;

        let options: Vec<String> = PROJECT_TEMPLATES
            .iter()
            .map(|template| format!("{}: {}", template.name, template.summary))
            .collect();
        let Some(template_index) = self.prompter.select_one("Project template", &options)? else {
            return Err(OrchestrationError::Cancelled);
        };
        let Some(template) = PROJECT_TEMPLATES.get(template_index).copied() else {
            return Err(OrchestrationError::Prompt(PromptError::Terminal(format!(
                "selection index {template_index} out of range"
            ))));
        };

        let Some(raw_name) = self.prompter.input_text("Project name")? else {
            return Err(OrchestrationError::Cancelled);
        };
        let id = ProjectId::parse(&raw_name).map_err(|reason| {
            OrchestrationError::InvalidIdentifier {
                kind: "project name",
                reason,
            }
        })?;
        if self.store.snapshot().projects.contains_key(id.as_str()) {
            return Err(OrchestrationError::DuplicateIdentifier {
                kind: "project",
                id: id.to_string(),
            });
        }

        let dir = self.store.paths().project_dir(&id);
        if dir.exists() {
            return Err(OrchestrationError::DuplicateIdentifier {
                kind: "project folder",
                id: id.to_string(),
            });
        }
        for (relative, contents) in template_files(template, id.as_str()) {
            let target = dir.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
            }
            fs::write(&target, contents).map_err(|source| io_error(&target, source))?;
        }

        let project = Project {
            id: id.clone(),
            source_path: dir,
            origin: ProjectOrigin::Template {
                template: template.name.to_string(),
            },
            created_at: now_secs(),
        };
        self.register(project.clone())?;
        append_workspace_log(
            self.store.paths(),
            "info",
            "project.created",
            &format!("id={id} template={}", template.name),
        );
        Ok(project)
    }

    pub fn add_existing_project(&self) -> Result<Project, OrchestrationError> {
        require_setup_complete(&self.store.snapshot(), "add-project")?;

        let Some(folder) = self.prompter.select_folder("Project folder")? else {
            return Err(OrchestrationError::Cancelled);
        };
        if !folder.is_dir() {
            return Err(OrchestrationError::InvalidProjectFolder {
                path: folder.display().to_string(),
                reason: "folder does not exist".to_string(),
            });
        }
        if !folder.join(PROJECT_DESCRIPTOR_FILE).is_file() {
            return Err(OrchestrationError::InvalidProjectFolder {
                path: folder.display().to_string(),
                reason: format!("missing {PROJECT_DESCRIPTOR_FILE}"),
            });
        }
        let Some(name) = folder.file_name().and_then(|value| value.to_str()) else {
            return Err(OrchestrationError::InvalidProjectFolder {
                path: folder.display().to_string(),
                reason: "folder has no usable name".to_string(),
            });
        };
        let id = ProjectId::parse(name).map_err(|reason| OrchestrationError::InvalidIdentifier {
            kind: "project name",
            reason,
        })?;

        let project = Project {
            id: id.clone(),
            source_path: folder.clone(),
            origin: ProjectOrigin::Imported { from: folder },
            created_at: now_secs(),
        };
        self.register(project.clone())?;
        append_workspace_log(
            self.store.paths(),
            "info",
            "project.imported",
            &format!("id={id} path={}", project.source_path.display()),
        );
        Ok(project)
    }

    fn register(&self, project: Project) -> Result<(), OrchestrationError> {
        let id = project.id.clone();
        self.store.mutate(|state| {
            if state.projects.contains_key(id.as_str()) {
                return Err(OrchestrationError::DuplicateIdentifier {
                    kind: "project",
                    id: id.to_string(),
                });
            }
            state.projects.insert(id.clone(), project.clone());
            state.active_project = Some(id.clone());
            Ok(())
        })
    }
}
