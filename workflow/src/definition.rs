use crate::context::ContextSlot;
use crate::tasks::PromptTask;
use crate::tasks::RequireTask;
use crate::tasks::SelectTask;
use crate::workflow::Workflow;
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// A workflow declared in a YAML or TOML file.
#[derive(Debug, Deserialize)]
pub struct WorkflowDefinition {
    #[serde(skip)]
    pub source_path: PathBuf,
    #[serde(flatten)]
    pub workflow: WorkflowSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default = "default_true")]
    pub break_on_cancel: bool,
    #[serde(default)]
    pub break_on_skip: bool,
    /// Run against a context of its own, defaulted from the caller's.
    #[serde(default)]
    pub isolated: bool,
    /// Slots copied back to the caller's context on completion. Requires
    /// `isolated`.
    #[serde(default)]
    pub write_back: Vec<ContextSlot>,
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskSpec {
    Select {
        slot: ContextSlot,
        #[serde(default)]
        name: Option<String>,
        #[serde(default = "default_true")]
        required: bool,
    },
    Prompt {
        name: String,
        #[serde(default)]
        message: Option<String>,
        #[serde(default = "default_true")]
        required: bool,
    },
    Require {
        slots: Vec<ContextSlot>,
    },
    Workflow(WorkflowSpec),
}

fn default_true() -> bool {
    true
}

impl WorkflowDefinition {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read workflow definition {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut definition: WorkflowDefinition = match ext.as_str() {
            "yml" | "yaml" => {
                serde_yaml::from_str(&contents).context("parse workflow definition")?
            }
            "toml" | "tml" => toml::from_str(&contents).context("parse workflow definition")?,
            _ => serde_yaml::from_str(&contents)
                .or_else(|_| toml::from_str(&contents))
                .context("parse workflow definition (yaml or toml)")?,
        };
        definition.source_path = path.to_path_buf();
        let name = definition.workflow_name();
        definition.workflow.validate(&name)?;
        Ok(definition)
    }

    pub fn definition_dir(&self) -> PathBuf {
        self.source_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn workflow_name(&self) -> String {
        if let Some(name) = &self.workflow.name {
            return name.clone();
        }
        self.source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("workflow")
            .to_string()
    }

    pub fn build(&self) -> Workflow {
        self.workflow.build(&self.workflow_name())
    }
}

impl WorkflowSpec {
    fn validate(&self, name: &str) -> anyhow::Result<()> {
        if self.tasks.is_empty() {
            anyhow::bail!("workflow {name} must contain at least one task");
        }
        if !self.write_back.is_empty() && !self.isolated {
            anyhow::bail!("workflow {name} writes back context slots but is not isolated");
        }
        for (index, task) in self.tasks.iter().enumerate() {
            if let TaskSpec::Workflow(nested) = task {
                let nested_name = nested.name.clone().unwrap_or_else(|| format!("{name}[{index}]"));
                nested.validate(&nested_name)?;
            }
        }
        Ok(())
    }

    fn build(&self, name: &str) -> Workflow {
        let mut workflow = Workflow::new(name)
            .required(self.required)
            .break_on_cancel(self.break_on_cancel)
            .break_on_skip(self.break_on_skip);
        if self.isolated {
            workflow = workflow.with_context(Default::default());
        }
        if !self.write_back.is_empty() {
            workflow = workflow.write_back(&self.write_back);
        }
        for (index, task) in self.tasks.iter().enumerate() {
            workflow = match task {
                TaskSpec::Select {
                    slot,
                    name,
                    required,
                } => {
                    let mut select = SelectTask::new(*slot).required(*required);
                    if let Some(name) = name {
                        select = select.named(name);
                    }
                    workflow.with_task(select)
                }
                TaskSpec::Prompt {
                    name,
                    message,
                    required,
                } => {
                    let message = message.as_deref().unwrap_or(name);
                    workflow.with_task(PromptTask::new(name, message).required(*required))
                }
                TaskSpec::Require { slots } => workflow.with_task(RequireTask::new(slots)),
                TaskSpec::Workflow(nested) => {
                    let nested_name = nested.name.clone().unwrap_or_else(|| format!("{name}[{index}]"));
                    workflow.with_task(nested.build(&nested_name))
                }
            };
        }
        workflow
    }
}
