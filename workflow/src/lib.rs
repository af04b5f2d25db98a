//! Sequential task runner for multi-step front-desk workflows.
//!
//! A [`Workflow`] runs its [`Task`]s in order against a shared
//! [`TaskContext`]. Tasks either finish immediately or suspend until the host
//! resumes them with a [`TaskInput`]; a workflow is itself a task, so
//! workflows nest.

mod artifacts;
mod context;
mod definition;
mod error;
mod report;
mod task;
pub mod tasks;
mod workflow;

pub use artifacts::ArtifactDir;
pub use artifacts::DEFAULT_ARTIFACTS_DIR;
pub use context::ContextSlot;
pub use context::ParseReferenceError;
pub use context::Reference;
pub use context::TaskContext;
pub use definition::TaskSpec;
pub use definition::WorkflowDefinition;
pub use definition::WorkflowSpec;
pub use error::Result;
pub use error::TaskError;
pub use error::WorkflowError;
pub use report::RunReport;
pub use report::TaskRecord;
pub use task::ChannelListener;
pub use task::ErrorHandler;
pub use task::LogErrorHandler;
pub use task::Step;
pub use task::Task;
pub use task::TaskEvent;
pub use task::TaskEventType;
pub use task::TaskInput;
pub use task::TaskListener;
pub use task::TaskState;
pub use workflow::CancelToken;
pub use workflow::Workflow;
pub use workflow::WorkflowStatus;
