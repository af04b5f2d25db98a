use crate::context::ContextSlot;
use crate::context::TaskContext;
use crate::error::Result;
use crate::error::TaskError;
use crate::error::WorkflowError;
use crate::report::RunReport;
use crate::report::TaskRecord;
use crate::task;
use crate::task::ErrorHandler;
use crate::task::LogErrorHandler;
use crate::task::Step;
use crate::task::Task;
use crate::task::TaskEvent;
use crate::task::TaskEventType;
use crate::task::TaskInput;
use crate::task::TaskListener;
use crate::task::TaskState;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Requests that a workflow stop before its next task starts.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStatus {
    Idle,
    Running { index: usize, of: usize },
    AllCompleted,
    Aborted(TaskEventType),
}

/// What the scheduler does after a child task reports.
enum Flow {
    Suspend,
    Next,
    Stop(TaskEventType),
}

/// An ordered sequence of tasks run against a shared context. A workflow is
/// itself a [`Task`] and can be nested inside another workflow.
///
/// Children are started strictly in order, each only after its predecessor
/// reached a terminal state. What a child's terminal state does to the
/// workflow:
///
/// * `Completed`: the next task starts; after the last, the workflow
///   completes.
/// * `Skipped`: a required task aborts the workflow with an error and
///   `Cancelled`; otherwise `break_on_skip` stops it with `Skipped`, or the
///   next task starts.
/// * `Cancelled`: `break_on_cancel` (the default) stops it with `Cancelled`;
///   otherwise the next task starts.
///
/// A task that fails to start or resume is fatal: the error is surfaced and
/// the workflow reports `Cancelled`. So is a nested workflow that ended on a
/// surfaced error, whatever `break_on_cancel` says.
pub struct Workflow {
    name: String,
    tasks: Vec<Box<dyn Task>>,
    required: bool,
    break_on_cancel: bool,
    break_on_skip: bool,
    /// The workflow's own context. When unset, tasks run directly against
    /// the context the workflow is started with.
    context: Option<TaskContext>,
    write_back: Vec<ContextSlot>,
    state: TaskState,
    current: usize,
    cancel: CancelToken,
    listener: Option<Box<dyn TaskListener>>,
    errors: Box<dyn ErrorHandler>,
    error: Option<WorkflowError>,
    records: Vec<TaskRecord>,
}

impl Workflow {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tasks: Vec::new(),
            required: true,
            break_on_cancel: true,
            break_on_skip: false,
            context: None,
            write_back: Vec::new(),
            state: TaskState::Idle,
            current: 0,
            cancel: CancelToken::default(),
            listener: None,
            errors: Box::new(LogErrorHandler),
            error: None,
            records: Vec::new(),
        }
    }

    /// Appends a task. Only valid before the workflow starts.
    pub fn add_task(&mut self, task: impl Task + 'static) -> Result<()> {
        if self.state != TaskState::Idle {
            return Err(TaskError::AlreadyStarted(self.name.clone()));
        }
        self.tasks.push(Box::new(task));
        Ok(())
    }

    pub fn with_task(mut self, task: impl Task + 'static) -> Self {
        self.tasks.push(Box::new(task));
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn break_on_cancel(mut self, break_on_cancel: bool) -> Self {
        self.break_on_cancel = break_on_cancel;
        self
    }

    pub fn break_on_skip(mut self, break_on_skip: bool) -> Self {
        self.break_on_skip = break_on_skip;
        self
    }

    /// Runs tasks against `context` instead of the caller's. On start, its
    /// empty slots are defaulted from the caller's context.
    pub fn with_context(mut self, context: TaskContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Slots copied back into the caller's context when the workflow
    /// completes. Gives the workflow its own context if it has none.
    pub fn write_back(mut self, slots: &[ContextSlot]) -> Self {
        self.write_back = slots.to_vec();
        if self.context.is_none() {
            self.context = Some(TaskContext::new());
        }
        self
    }

    pub fn with_listener(mut self, listener: impl TaskListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn with_error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.errors = Box::new(handler);
        self
    }

    /// Stops the workflow at the next scheduling point. The running task is
    /// not interrupted.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn status(&self) -> WorkflowStatus {
        match self.state {
            TaskState::Idle => WorkflowStatus::Idle,
            TaskState::Running => WorkflowStatus::Running {
                index: self.current,
                of: self.tasks.len(),
            },
            TaskState::Completed => WorkflowStatus::AllCompleted,
            TaskState::Skipped => WorkflowStatus::Aborted(TaskEventType::Skipped),
            TaskState::Cancelled => WorkflowStatus::Aborted(TaskEventType::Cancelled),
        }
    }

    pub fn context(&self) -> Option<&TaskContext> {
        self.context.as_ref()
    }

    /// The error that ended the last run, if any.
    pub fn last_error(&self) -> Option<&WorkflowError> {
        self.error.as_ref()
    }

    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Snapshot of the run. `caller` is reported when the workflow has no
    /// context of its own.
    pub fn report(&self, caller: &TaskContext) -> RunReport {
        RunReport {
            workflow_name: self.name.clone(),
            outcome: self.state,
            tasks: self.records.clone(),
            context: self.context.clone().unwrap_or_else(|| caller.clone()),
        }
    }

    /// Runs `f` against the context tasks should see, then applies write-back
    /// if the workflow completed.
    fn in_context<R>(
        &mut self,
        caller: &mut TaskContext,
        f: impl FnOnce(&mut Self, &mut TaskContext) -> R,
    ) -> R {
        let mut own = self.context.take();
        let result = match own.as_mut() {
            Some(context) => f(self, context),
            None => f(self, caller),
        };
        if self.state == TaskState::Completed {
            if let Some(context) = own.as_ref() {
                context.write_back(caller, &self.write_back);
            }
        }
        self.context = own;
        result
    }

    /// Starts tasks from `current` until one suspends or the workflow ends.
    fn run(&mut self, context: &mut TaskContext) -> Step {
        loop {
            if self.cancel.is_cancelled() {
                info!(workflow = %self.name, "workflow cancelled before task {}", self.current);
                return self.finish(TaskEventType::Cancelled);
            }
            let Some(task) = self.tasks.get_mut(self.current) else {
                return self.finish(TaskEventType::Completed);
            };
            debug!(workflow = %self.name, task = task.name(), index = self.current, "starting task");
            let mut record = TaskRecord::new(task.name());
            record.mark_running();
            self.records.push(record);
            let result = task.start(context);
            match self.settle(result) {
                Flow::Suspend => return Step::Suspended,
                Flow::Next => self.current += 1,
                Flow::Stop(event) => return self.finish(event),
            }
        }
    }

    /// Applies the workflow's policies to the current task's result.
    fn settle(&mut self, result: Result<Step>) -> Flow {
        let Some(task) = self.tasks.get(self.current) else {
            return Flow::Stop(TaskEventType::Cancelled);
        };
        let name = task.name().to_string();
        let required = task.is_required();
        let failure = task.failure().map(ToString::to_string);
        match result {
            Ok(Step::Suspended) => Flow::Suspend,
            Ok(Step::Finished(event)) => {
                debug!(workflow = %self.name, task = %name, ?event, "task finished");
                match event {
                    TaskEventType::Completed => {
                        self.record_finished(TaskState::Completed, None);
                        Flow::Next
                    }
                    TaskEventType::Skipped if required => {
                        self.record_finished(TaskState::Skipped, Some("required task skipped".into()));
                        self.surface(WorkflowError::RequiredTaskSkipped { task: name });
                        Flow::Stop(TaskEventType::Cancelled)
                    }
                    TaskEventType::Skipped => {
                        self.record_finished(TaskState::Skipped, None);
                        if self.break_on_skip {
                            warn!(workflow = %self.name, task = %name, "task skipped, stopping workflow");
                            Flow::Stop(TaskEventType::Skipped)
                        } else {
                            Flow::Next
                        }
                    }
                    TaskEventType::Cancelled if failure.is_some() => {
                        let cause = failure.unwrap_or_default();
                        self.record_finished(TaskState::Cancelled, Some(cause.clone()));
                        self.surface(WorkflowError::NestedWorkflowFailed {
                            workflow: name,
                            cause,
                        });
                        Flow::Stop(TaskEventType::Cancelled)
                    }
                    TaskEventType::Cancelled => {
                        self.record_finished(TaskState::Cancelled, None);
                        if self.break_on_cancel {
                            warn!(workflow = %self.name, task = %name, "task cancelled, stopping workflow");
                            Flow::Stop(TaskEventType::Cancelled)
                        } else {
                            Flow::Next
                        }
                    }
                }
            }
            Err(err) => {
                self.record_finished(TaskState::Cancelled, Some(err.to_string()));
                self.surface(WorkflowError::TaskFailed {
                    task: name,
                    source: err,
                });
                Flow::Stop(TaskEventType::Cancelled)
            }
        }
    }

    fn record_finished(&mut self, state: TaskState, note: Option<String>) {
        if let Some(record) = self.records.last_mut() {
            record.mark_finished(state, note);
        }
    }

    fn surface(&mut self, err: WorkflowError) {
        self.errors.handle(&self.name, &err);
        self.error = Some(err);
    }

    fn finish(&mut self, event: TaskEventType) -> Step {
        let step = task::finish(&mut self.state, event);
        info!(workflow = %self.name, outcome = ?event, "workflow finished");
        if let Some(listener) = self.listener.as_mut() {
            listener.on_event(&TaskEvent {
                task: self.name.clone(),
                kind: event,
            });
        }
        step
    }
}

impl Task for Workflow {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn state(&self) -> TaskState {
        self.state
    }

    fn start(&mut self, context: &mut TaskContext) -> Result<Step> {
        task::begin(&mut self.state, &self.name)?;
        self.current = 0;
        self.error = None;
        self.records.clear();
        if let Some(own) = self.context.as_mut() {
            own.default_from(context);
        }
        info!(workflow = %self.name, tasks = self.tasks.len(), "starting workflow");
        Ok(self.in_context(context, Self::run))
    }

    fn resume(&mut self, input: TaskInput, context: &mut TaskContext) -> Result<Step> {
        task::ensure_waiting(self.state, &self.name)?;
        self.in_context(context, |workflow, context| {
            let Some(task) = workflow.tasks.get_mut(workflow.current) else {
                return Ok(workflow.finish(TaskEventType::Completed));
            };
            // Rejected input leaves the task waiting.
            let result = match task.resume(input, context) {
                Err(err @ TaskError::UnexpectedInput { .. }) => return Err(err),
                other => other,
            };
            Ok(match workflow.settle(result) {
                Flow::Suspend => Step::Suspended,
                Flow::Next => {
                    workflow.current += 1;
                    workflow.run(context)
                }
                Flow::Stop(event) => workflow.finish(event),
            })
        })
    }

    fn prompt(&self) -> Option<String> {
        if self.state != TaskState::Running {
            return None;
        }
        self.tasks.get(self.current).and_then(|task| task.prompt())
    }

    fn failure(&self) -> Option<&WorkflowError> {
        self.error.as_ref()
    }
}

impl fmt::Debug for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workflow")
            .field("name", &self.name)
            .field("tasks", &self.tasks.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("required", &self.required)
            .field("break_on_cancel", &self.break_on_cancel)
            .field("break_on_skip", &self.break_on_skip)
            .field("state", &self.state)
            .field("current", &self.current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Reference;
    use crate::task::ChannelListener;
    use crate::tasks::RequireTask;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Reports a fixed outcome, immediately or when resumed.
    struct Scripted {
        name: String,
        outcome: TaskEventType,
        suspend: bool,
        required: bool,
        state: TaskState,
        log: Log,
        on_start: Option<Box<dyn FnMut(&mut TaskContext)>>,
    }

    impl Scripted {
        fn new(name: &str, outcome: TaskEventType, log: &Log) -> Self {
            Self {
                name: name.to_string(),
                outcome,
                suspend: false,
                required: true,
                state: TaskState::Idle,
                log: Rc::clone(log),
                on_start: None,
            }
        }

        fn completes(name: &str, log: &Log) -> Self {
            Self::new(name, TaskEventType::Completed, log)
        }

        fn suspended(mut self) -> Self {
            self.suspend = true;
            self
        }

        fn optional(mut self) -> Self {
            self.required = false;
            self
        }

        fn on_start(mut self, f: impl FnMut(&mut TaskContext) + 'static) -> Self {
            self.on_start = Some(Box::new(f));
            self
        }
    }

    impl Task for Scripted {
        fn name(&self) -> &str {
            &self.name
        }

        fn is_required(&self) -> bool {
            self.required
        }

        fn state(&self) -> TaskState {
            self.state
        }

        fn start(&mut self, context: &mut TaskContext) -> Result<Step> {
            task::begin(&mut self.state, &self.name)?;
            self.log.borrow_mut().push(self.name.clone());
            if let Some(f) = self.on_start.as_mut() {
                f(context);
            }
            if self.suspend {
                return Ok(Step::Suspended);
            }
            Ok(task::finish(&mut self.state, self.outcome))
        }

        fn resume(&mut self, _input: TaskInput, _context: &mut TaskContext) -> Result<Step> {
            task::ensure_waiting(self.state, &self.name)?;
            Ok(task::finish(&mut self.state, self.outcome))
        }
    }

    struct Failing;

    impl Task for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn state(&self) -> TaskState {
            TaskState::Idle
        }

        fn start(&mut self, _context: &mut TaskContext) -> Result<Step> {
            Err(TaskError::Failed("printer offline".into()))
        }

        fn resume(&mut self, _input: TaskInput, _context: &mut TaskContext) -> Result<Step> {
            Err(TaskError::NotWaiting("failing".into()))
        }
    }

    fn log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn started(log: &Log) -> Vec<String> {
        log.borrow().clone()
    }

    #[test]
    fn completes_after_all_tasks_in_order() {
        let log = log();
        let mut workflow = Workflow::new("invoice")
            .with_task(Scripted::completes("t1", &log))
            .with_task(Scripted::completes("t2", &log))
            .with_task(Scripted::completes("t3", &log));
        let mut context = TaskContext::new();
        let step = workflow.start(&mut context).expect("start");
        assert_eq!(step, Step::Finished(TaskEventType::Completed));
        assert_eq!(workflow.status(), WorkflowStatus::AllCompleted);
        assert_eq!(started(&log), vec!["t1", "t2", "t3"]);
        assert!(workflow.records().iter().all(|r| r.state == TaskState::Completed));
    }

    #[test]
    fn optional_skip_continues() {
        let log = log();
        let mut workflow = Workflow::new("check-out")
            .with_task(Scripted::completes("t1", &log))
            .with_task(Scripted::new("t2", TaskEventType::Skipped, &log).optional())
            .with_task(Scripted::completes("t3", &log));
        let step = workflow.start(&mut TaskContext::new()).expect("start");
        assert_eq!(step, Step::Finished(TaskEventType::Completed));
        assert_eq!(started(&log), vec!["t1", "t2", "t3"]);
        assert_eq!(workflow.records()[1].state, TaskState::Skipped);
    }

    #[test]
    fn required_skip_aborts() {
        let log = log();
        let errors = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&errors);
        let mut workflow = Workflow::new("check-in")
            .with_task(Scripted::new("t1", TaskEventType::Skipped, &log))
            .with_task(Scripted::completes("t2", &log))
            .with_error_handler(move |_: &str, err: &WorkflowError| {
                seen.borrow_mut().push(err.to_string());
            });
        let step = workflow.start(&mut TaskContext::new()).expect("start");
        assert_eq!(step, Step::Finished(TaskEventType::Cancelled));
        assert_eq!(started(&log), vec!["t1"]);
        assert_eq!(errors.borrow().as_slice(), ["required task t1 was skipped"]);
        assert_matches!(
            workflow.last_error(),
            Some(WorkflowError::RequiredTaskSkipped { task }) if task == "t1"
        );
    }

    #[test]
    fn break_on_skip_reports_skipped() {
        let log = log();
        let mut workflow = Workflow::new("customer task")
            .break_on_skip(true)
            .with_task(Scripted::new("select work list", TaskEventType::Skipped, &log).optional())
            .with_task(Scripted::completes("edit task", &log));
        let step = workflow.start(&mut TaskContext::new()).expect("start");
        assert_eq!(step, Step::Finished(TaskEventType::Skipped));
        assert_eq!(workflow.status(), WorkflowStatus::Aborted(TaskEventType::Skipped));
        assert_eq!(started(&log), vec!["select work list"]);
        assert!(workflow.last_error().is_none());
    }

    #[test]
    fn cancel_breaks_by_default() {
        let log = log();
        let mut workflow = Workflow::new("payment")
            .with_task(Scripted::new("t1", TaskEventType::Cancelled, &log))
            .with_task(Scripted::completes("t2", &log));
        let step = workflow.start(&mut TaskContext::new()).expect("start");
        assert_eq!(step, Step::Finished(TaskEventType::Cancelled));
        assert_eq!(started(&log), vec!["t1"]);
    }

    #[test]
    fn cancel_continues_without_break_on_cancel() {
        let log = log();
        let mut workflow = Workflow::new("payment")
            .break_on_cancel(false)
            .with_task(Scripted::completes("t1", &log))
            .with_task(Scripted::new("t2", TaskEventType::Cancelled, &log))
            .with_task(Scripted::completes("t3", &log));
        let step = workflow.start(&mut TaskContext::new()).expect("start");
        assert_eq!(step, Step::Finished(TaskEventType::Completed));
        assert_eq!(started(&log), vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn cancel_takes_effect_between_tasks() {
        let log = log();
        let mut workflow = Workflow::new("consult")
            .with_task(Scripted::completes("t1", &log).suspended())
            .with_task(Scripted::completes("t2", &log));
        let mut context = TaskContext::new();
        assert_eq!(workflow.start(&mut context).expect("start"), Step::Suspended);

        workflow.cancel();
        assert_eq!(
            workflow.status(),
            WorkflowStatus::Running { index: 0, of: 2 }
        );
        let step = workflow.resume(TaskInput::Ok, &mut context).expect("resume");
        assert_eq!(step, Step::Finished(TaskEventType::Cancelled));
        assert_eq!(workflow.records()[0].state, TaskState::Completed);
        assert_eq!(started(&log), vec!["t1"]);
    }

    #[test]
    fn task_may_cancel_its_own_workflow() {
        let log = log();
        let mut workflow = Workflow::new("consult");
        let token = workflow.cancel_token();
        workflow
            .add_task(Scripted::completes("t1", &log).on_start(move |_| token.cancel()))
            .expect("add");
        workflow.add_task(Scripted::completes("t2", &log)).expect("add");
        let step = workflow.start(&mut TaskContext::new()).expect("start");
        assert_eq!(step, Step::Finished(TaskEventType::Cancelled));
        assert_eq!(started(&log), vec!["t1"]);
    }

    #[test]
    fn start_failure_is_fatal() {
        let log = log();
        let mut workflow = Workflow::new("print")
            .with_task(Failing)
            .with_task(Scripted::completes("t2", &log));
        let step = workflow.start(&mut TaskContext::new()).expect("start");
        assert_eq!(step, Step::Finished(TaskEventType::Cancelled));
        assert!(started(&log).is_empty());
        assert_eq!(
            workflow.records()[0].note.as_deref(),
            Some("printer offline")
        );
        assert_matches!(workflow.last_error(), Some(WorkflowError::TaskFailed { .. }));
    }

    #[test]
    fn tasks_cannot_be_added_after_start() {
        let log = log();
        let mut workflow = Workflow::new("w").with_task(Scripted::completes("t1", &log).suspended());
        workflow.start(&mut TaskContext::new()).expect("start");
        assert_matches!(
            workflow.add_task(Scripted::completes("t2", &log)),
            Err(TaskError::AlreadyStarted(_))
        );
        assert_matches!(
            workflow.start(&mut TaskContext::new()),
            Err(TaskError::AlreadyStarted(_))
        );
    }

    #[test]
    fn context_defaults_from_parent_and_writes_back() {
        let log = log();
        let c1 = Reference::new("party.customerperson", 1);
        let c2 = Reference::new("party.customerperson", 2);
        let seen = Rc::new(RefCell::new(None));
        let observed = Rc::clone(&seen);
        let replacement = c2.clone();
        let mut workflow = Workflow::new("check-in")
            .with_context(TaskContext::new())
            .write_back(&[ContextSlot::Customer])
            .with_task(Scripted::completes("read", &log).on_start(move |context| {
                *observed.borrow_mut() = context.customer().cloned();
            }))
            .with_task(
                Scripted::completes("select", &log)
                    .suspended()
                    .on_start(move |context| context.set_customer(Some(replacement.clone()))),
            );
        let mut parent = TaskContext::new().with(ContextSlot::Customer, c1.clone());

        assert_eq!(workflow.start(&mut parent).expect("start"), Step::Suspended);
        assert_eq!(seen.borrow().as_ref(), Some(&c1));
        // Not written back until the workflow completes.
        assert_eq!(parent.customer(), Some(&c1));

        let step = workflow.resume(TaskInput::Ok, &mut parent).expect("resume");
        assert_eq!(step, Step::Finished(TaskEventType::Completed));
        assert_eq!(parent.customer(), Some(&c2));
    }

    #[test]
    fn nested_workflow_forwards_events() {
        let log = log();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let inner = Workflow::new("inner")
            .with_listener(ChannelListener(tx.clone()))
            .with_task(Scripted::completes("a", &log).suspended())
            .with_task(Scripted::completes("b", &log));
        let mut outer = Workflow::new("outer")
            .with_listener(ChannelListener(tx))
            .with_task(Scripted::completes("first", &log))
            .with_task(inner)
            .with_task(Scripted::completes("last", &log));
        let mut context = TaskContext::new();

        assert_eq!(outer.start(&mut context).expect("start"), Step::Suspended);
        assert!(rx.try_recv().is_err());
        let step = outer.resume(TaskInput::Ok, &mut context).expect("resume");
        assert_eq!(step, Step::Finished(TaskEventType::Completed));
        assert_eq!(started(&log), vec!["first", "a", "b", "last"]);

        let events: Vec<TaskEvent> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(
            events,
            vec![
                TaskEvent { task: "inner".into(), kind: TaskEventType::Completed },
                TaskEvent { task: "outer".into(), kind: TaskEventType::Completed },
            ]
        );
    }

    #[test]
    fn nested_failure_reaches_outer_error_handler() {
        let log = log();
        let errors = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&errors);
        let inner = Workflow::new("inner")
            .with_error_handler(|_: &str, _: &WorkflowError| {})
            .with_task(RequireTask::new(&[ContextSlot::Till]));
        let mut outer = Workflow::new("outer")
            .break_on_cancel(false)
            .with_task(inner)
            .with_task(Scripted::completes("after", &log))
            .with_error_handler(move |workflow: &str, err: &WorkflowError| {
                seen.borrow_mut().push(format!("{workflow}: {err}"));
            });

        let step = outer.start(&mut TaskContext::new()).expect("start");
        assert_eq!(step, Step::Finished(TaskEventType::Cancelled));
        assert!(started(&log).is_empty());
        assert_eq!(
            errors.borrow().as_slice(),
            ["outer: nested workflow inner failed: task require till failed: no till in the task context"]
        );
        assert_matches!(
            outer.last_error(),
            Some(WorkflowError::NestedWorkflowFailed { workflow, .. }) if workflow == "inner"
        );
        assert_eq!(
            outer.records()[0].note.as_deref(),
            Some("task require till failed: no till in the task context")
        );
    }

    #[test]
    fn resume_requires_a_running_workflow() {
        let mut workflow = Workflow::new("idle");
        assert_matches!(
            workflow.resume(TaskInput::Ok, &mut TaskContext::new()),
            Err(TaskError::NotWaiting(_))
        );
    }
}
