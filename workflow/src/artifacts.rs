use anyhow::Context;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Directory name, relative to a workflow definition, where run reports are
/// kept unless another directory is given.
pub const DEFAULT_ARTIFACTS_DIR: &str = ".vpms/runs";

/// Where the reports of workflow runs are written.
#[derive(Debug, Clone)]
pub struct ArtifactDir {
    root: PathBuf,
}

impl ArtifactDir {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The explicit directory if given, else the default next to the
    /// definition.
    pub fn resolve(definition_dir: &Path, explicit: Option<PathBuf>) -> Self {
        Self::new(explicit.unwrap_or_else(|| definition_dir.join(DEFAULT_ARTIFACTS_DIR)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_root(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))
    }

    pub fn report_file(&self, workflow_name: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize(workflow_name)))
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}
