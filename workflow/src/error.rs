use crate::context::ContextSlot;
use thiserror::Error;

/// Failures raised by a task while starting or resuming.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("no {0} in the task context")]
    MissingContext(ContextSlot),

    #[error("task {0} has already been started")]
    AlreadyStarted(String),

    #[error("task {0} is not waiting for input")]
    NotWaiting(String),

    #[error("task {task} cannot accept {input}")]
    UnexpectedInput { task: String, input: String },

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failures that end a workflow run. Each one is surfaced to the error
/// handler and the workflow reports `Cancelled`.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("required task {task} was skipped")]
    RequiredTaskSkipped { task: String },

    #[error("task {task} failed: {source}")]
    TaskFailed {
        task: String,
        #[source]
        source: TaskError,
    },

    #[error("nested workflow {workflow} failed: {cause}")]
    NestedWorkflowFailed { workflow: String, cause: String },
}

pub type Result<T> = std::result::Result<T, TaskError>;
