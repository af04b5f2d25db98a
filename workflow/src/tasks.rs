//! Built-in leaf tasks.

use crate::context::ContextSlot;
use crate::context::TaskContext;
use crate::error::Result;
use crate::error::TaskError;
use crate::task;
use crate::task::Step;
use crate::task::Task;
use crate::task::TaskEventType;
use crate::task::TaskInput;
use crate::task::TaskState;
use std::fmt;

type Action = Box<dyn FnMut(&mut TaskContext) -> Result<()>>;

/// Runs a closure against the context and completes immediately.
pub struct SynchronousTask {
    name: String,
    action: Action,
    state: TaskState,
}

impl SynchronousTask {
    pub fn new<F>(name: &str, action: F) -> Self
    where
        F: FnMut(&mut TaskContext) -> Result<()> + 'static,
    {
        Self {
            name: name.to_string(),
            action: Box::new(action),
            state: TaskState::Idle,
        }
    }
}

impl Task for SynchronousTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> TaskState {
        self.state
    }

    fn start(&mut self, context: &mut TaskContext) -> Result<Step> {
        task::begin(&mut self.state, &self.name)?;
        (self.action)(context)?;
        Ok(task::finish(&mut self.state, TaskEventType::Completed))
    }

    fn resume(&mut self, _input: TaskInput, _context: &mut TaskContext) -> Result<Step> {
        Err(TaskError::NotWaiting(self.name.clone()))
    }
}

impl fmt::Debug for SynchronousTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynchronousTask")
            .field("name", &self.name)
            .field("state", &self.state)
            .finish()
    }
}

/// Fails to start unless every listed slot has a value.
#[derive(Debug)]
pub struct RequireTask {
    name: String,
    slots: Vec<ContextSlot>,
    state: TaskState,
}

impl RequireTask {
    pub fn new(slots: &[ContextSlot]) -> Self {
        let names: Vec<String> = slots.iter().map(ToString::to_string).collect();
        Self {
            name: format!("require {}", names.join(", ")),
            slots: slots.to_vec(),
            state: TaskState::Idle,
        }
    }
}

impl Task for RequireTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> TaskState {
        self.state
    }

    fn start(&mut self, context: &mut TaskContext) -> Result<Step> {
        task::begin(&mut self.state, &self.name)?;
        if let Some(missing) = self.slots.iter().find(|slot| context.get(**slot).is_none()) {
            return Err(TaskError::MissingContext(*missing));
        }
        Ok(task::finish(&mut self.state, TaskEventType::Completed))
    }

    fn resume(&mut self, _input: TaskInput, _context: &mut TaskContext) -> Result<Step> {
        Err(TaskError::NotWaiting(self.name.clone()))
    }
}

/// Waits for the user to select an object for a context slot.
///
/// A selection is stored in the slot and completes the task. `Ok` without a
/// selection is accepted only when the slot already has a value.
#[derive(Debug)]
pub struct SelectTask {
    name: String,
    slot: ContextSlot,
    required: bool,
    state: TaskState,
}

impl SelectTask {
    pub fn new(slot: ContextSlot) -> Self {
        Self {
            name: format!("select {slot}"),
            slot,
            required: true,
            state: TaskState::Idle,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

impl Task for SelectTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn state(&self) -> TaskState {
        self.state
    }

    fn start(&mut self, _context: &mut TaskContext) -> Result<Step> {
        task::begin(&mut self.state, &self.name)?;
        Ok(Step::Suspended)
    }

    fn resume(&mut self, input: TaskInput, context: &mut TaskContext) -> Result<Step> {
        task::ensure_waiting(self.state, &self.name)?;
        let event = match input {
            TaskInput::Select(reference) => {
                context.set(self.slot, Some(reference));
                TaskEventType::Completed
            }
            TaskInput::Ok if context.get(self.slot).is_some() => TaskEventType::Completed,
            TaskInput::Skip => TaskEventType::Skipped,
            TaskInput::Cancel => TaskEventType::Cancelled,
            input @ TaskInput::Ok => {
                return Err(TaskError::UnexpectedInput {
                    task: self.name.clone(),
                    input: input.to_string(),
                });
            }
        };
        Ok(task::finish(&mut self.state, event))
    }

    fn prompt(&self) -> Option<String> {
        let skip = if self.required { "" } else { ", skip" };
        Some(format!("select a {} (select archetype:id{skip}, cancel)", self.slot))
    }
}

/// Waits for the user to confirm, skip or cancel.
#[derive(Debug)]
pub struct PromptTask {
    name: String,
    message: String,
    required: bool,
    state: TaskState,
}

impl PromptTask {
    pub fn new(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            message: message.to_string(),
            required: true,
            state: TaskState::Idle,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

impl Task for PromptTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn state(&self) -> TaskState {
        self.state
    }

    fn start(&mut self, _context: &mut TaskContext) -> Result<Step> {
        task::begin(&mut self.state, &self.name)?;
        Ok(Step::Suspended)
    }

    fn resume(&mut self, input: TaskInput, _context: &mut TaskContext) -> Result<Step> {
        task::ensure_waiting(self.state, &self.name)?;
        let event = match input {
            TaskInput::Ok => TaskEventType::Completed,
            TaskInput::Skip => TaskEventType::Skipped,
            TaskInput::Cancel => TaskEventType::Cancelled,
            input @ TaskInput::Select(_) => {
                return Err(TaskError::UnexpectedInput {
                    task: self.name.clone(),
                    input: input.to_string(),
                });
            }
        };
        Ok(task::finish(&mut self.state, event))
    }

    fn prompt(&self) -> Option<String> {
        let options = if self.required { "ok, cancel" } else { "ok, skip, cancel" };
        Some(format!("{} ({options})", self.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Reference;
    use crate::workflow::Workflow;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[test]
    fn select_stores_the_selection() {
        let mut task = SelectTask::new(ContextSlot::Patient);
        let mut context = TaskContext::new();
        assert_eq!(task.start(&mut context).expect("start"), Step::Suspended);
        let fido = Reference::new("party.patientpet", 5).named("Fido");
        let step = task
            .resume(TaskInput::Select(fido.clone()), &mut context)
            .expect("resume");
        assert_eq!(step, Step::Finished(TaskEventType::Completed));
        assert_eq!(context.patient(), Some(&fido));
        assert_eq!(task.state(), TaskState::Completed);
    }

    #[test]
    fn select_rejects_ok_without_a_value() {
        let mut task = SelectTask::new(ContextSlot::Customer);
        let mut context = TaskContext::new();
        task.start(&mut context).expect("start");
        assert_matches!(
            task.resume(TaskInput::Ok, &mut context),
            Err(TaskError::UnexpectedInput { .. })
        );
        assert_eq!(task.state(), TaskState::Running);
        assert_eq!(
            task.resume(TaskInput::Skip, &mut context).expect("skip"),
            Step::Finished(TaskEventType::Skipped)
        );
    }

    #[test]
    fn rejected_input_keeps_workflow_waiting() {
        let mut workflow = Workflow::new("check-in")
            .with_task(SelectTask::new(ContextSlot::Customer))
            .with_task(PromptTask::new("print", "Print documents?"));
        let mut context = TaskContext::new();
        assert_eq!(workflow.start(&mut context).expect("start"), Step::Suspended);
        assert_matches!(
            workflow.resume(TaskInput::Ok, &mut context),
            Err(TaskError::UnexpectedInput { .. })
        );
        let customer = Reference::new("party.customerperson", 1);
        assert_eq!(
            workflow
                .resume(TaskInput::Select(customer), &mut context)
                .expect("select"),
            Step::Suspended
        );
        assert_eq!(
            workflow.prompt().as_deref(),
            Some("Print documents? (ok, cancel)")
        );
        assert_eq!(
            workflow.resume(TaskInput::Ok, &mut context).expect("ok"),
            Step::Finished(TaskEventType::Completed)
        );
    }

    #[test]
    fn require_fails_on_missing_slot() {
        let mut task = RequireTask::new(&[ContextSlot::Customer, ContextSlot::Till]);
        let mut context =
            TaskContext::new().with(ContextSlot::Customer, Reference::new("party.customerperson", 1));
        assert_eq!(task.name(), "require customer, till");
        assert_matches!(
            task.start(&mut context),
            Err(TaskError::MissingContext(ContextSlot::Till))
        );
    }

    #[test]
    fn synchronous_task_updates_context() {
        let mut task = SynchronousTask::new("clear patient", |context| {
            context.set_patient(None);
            Ok(())
        });
        let mut context =
            TaskContext::new().with(ContextSlot::Patient, Reference::new("party.patientpet", 2));
        assert_eq!(
            task.start(&mut context).expect("start"),
            Step::Finished(TaskEventType::Completed)
        );
        assert_eq!(context.patient(), None);
    }
}
