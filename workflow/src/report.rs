use crate::context::TaskContext;
use crate::task::TaskState;
use anyhow::Context;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Journal entry for one task of a workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub name: String,
    pub state: TaskState,
    pub note: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: TaskState::Idle,
            note: None,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn mark_running(&mut self) {
        self.state = TaskState::Running;
        if self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
        self.note = None;
    }

    pub fn mark_finished(&mut self, state: TaskState, note: Option<String>) {
        self.state = state;
        self.note = note;
        self.finished_at = Some(Utc::now());
    }
}

/// The persisted outcome of a workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub workflow_name: String,
    pub outcome: TaskState,
    pub tasks: Vec<TaskRecord>,
    pub context: TaskContext,
}

impl RunReport {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read run report {}", path.display()))?;
        let report: RunReport = serde_json::from_str(&data).context("parse run report json")?;
        Ok(report)
    }

    /// Writes the report via a temporary file so readers never see a
    /// partial report.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let tmp_path = tmp_path(path);
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(&tmp_path, data)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to persist {}", path.display()))?;
        Ok(())
    }

    pub fn task(&self, name: &str) -> Option<&TaskRecord> {
        self.tasks.iter().find(|task| task.name == name)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let mut file_name = path
        .file_name()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    file_name.push(".tmp");
    tmp.set_file_name(file_name);
    tmp
}
