use crate::context::Reference;
use crate::context::TaskContext;
use crate::error::Result;
use crate::error::TaskError;
use crate::error::WorkflowError;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;
use tracing::error;

/// Lifecycle of a task. The three terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Idle,
    Running,
    Completed,
    Skipped,
    Cancelled,
}

/// The terminal outcome a task reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskEventType {
    Completed,
    Skipped,
    Cancelled,
}

impl From<TaskEventType> for TaskState {
    fn from(event: TaskEventType) -> Self {
        match event {
            TaskEventType::Completed => TaskState::Completed,
            TaskEventType::Skipped => TaskState::Skipped,
            TaskEventType::Cancelled => TaskState::Cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEvent {
    pub task: String,
    pub kind: TaskEventType,
}

/// Where a task stands after being started or resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Waiting for the host to deliver a [`TaskInput`].
    Suspended,
    Finished(TaskEventType),
}

/// A user action delivered to a suspended task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskInput {
    Ok,
    Skip,
    Cancel,
    Select(Reference),
}

impl fmt::Display for TaskInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskInput::Ok => write!(f, "ok"),
            TaskInput::Skip => write!(f, "skip"),
            TaskInput::Cancel => write!(f, "cancel"),
            TaskInput::Select(reference) => write!(f, "select {reference}"),
        }
    }
}

/// A unit of work within a workflow.
///
/// `start` either finishes immediately or returns [`Step::Suspended`]; a
/// suspended task is driven to a terminal state by later calls to `resume`.
pub trait Task {
    fn name(&self) -> &str;

    /// A required task that is skipped aborts its workflow.
    fn is_required(&self) -> bool {
        true
    }

    fn state(&self) -> TaskState;

    fn start(&mut self, context: &mut TaskContext) -> Result<Step>;

    fn resume(&mut self, input: TaskInput, context: &mut TaskContext) -> Result<Step>;

    /// What a suspended task is waiting for, for display by the host.
    fn prompt(&self) -> Option<String> {
        None
    }

    /// The error that ended the task, when it finished `Cancelled` because
    /// of a failure rather than a user decision.
    fn failure(&self) -> Option<&WorkflowError> {
        None
    }
}

/// Observes terminal task events.
pub trait TaskListener {
    fn on_event(&mut self, event: &TaskEvent);
}

impl<F: FnMut(&TaskEvent)> TaskListener for F {
    fn on_event(&mut self, event: &TaskEvent) {
        self(event)
    }
}

/// Forwards events onto a channel, for hosts that consume them from an
/// event loop.
#[derive(Debug, Clone)]
pub struct ChannelListener(pub UnboundedSender<TaskEvent>);

impl TaskListener for ChannelListener {
    fn on_event(&mut self, event: &TaskEvent) {
        // A dropped receiver means nobody is listening any more.
        let _ = self.0.send(event.clone());
    }
}

/// Displays errors that end a workflow run.
pub trait ErrorHandler {
    fn handle(&mut self, workflow: &str, error: &WorkflowError);
}

impl<F: FnMut(&str, &WorkflowError)> ErrorHandler for F {
    fn handle(&mut self, workflow: &str, error: &WorkflowError) {
        self(workflow, error)
    }
}

/// Logs surfaced errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrorHandler;

impl ErrorHandler for LogErrorHandler {
    fn handle(&mut self, workflow: &str, err: &WorkflowError) {
        error!(workflow, error = %err, "workflow failed");
    }
}

/// Checks and performs the `Idle -> Running` transition.
pub(crate) fn begin(state: &mut TaskState, name: &str) -> Result<()> {
    if *state != TaskState::Idle {
        return Err(TaskError::AlreadyStarted(name.to_string()));
    }
    *state = TaskState::Running;
    Ok(())
}

/// Fails unless the task is suspended in `Running`.
pub(crate) fn ensure_waiting(state: TaskState, name: &str) -> Result<()> {
    if state != TaskState::Running {
        return Err(TaskError::NotWaiting(name.to_string()));
    }
    Ok(())
}

pub(crate) fn finish(state: &mut TaskState, event: TaskEventType) -> Step {
    *state = event.into();
    Step::Finished(event)
}
