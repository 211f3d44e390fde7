//! Cooperative task runner.
//!
//! The editor host is single-threaded: the only execution budget the
//! pipeline gets is one callback per editor tick. Work is therefore
//! sliced into [`Task`]s, resumable state machines advanced one step per
//! tick, and the runner keeps the whole schedule moving without ever
//! blocking the host.
//!
//! A step may delegate to a sub-task. The runner then parks the parent
//! at the *front* of the queue and runs the sub-task to completion
//! first, so delegation is a depth-first descent: nothing else
//! interleaves with a frame's own delay or sub-sequence.

use crate::error::SceneError;
use scenegen_host::EditorHost;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, error, info};

/// Outcome of advancing a task by one step.
pub enum Step {
    /// The task has more work; call `step` again next tick
    Continue,

    /// Run the given sub-task to completion, then resume this task
    Delegate(Box<dyn Task>),

    /// The task finished normally and must not be stepped again
    Done,
}

/// A resumable unit of work advanced one step per host tick.
///
/// Tasks own their state machine; the runner owns the schedule. A step
/// should do at most one attempt's worth of synchronous work. Errors
/// are fatal to the whole run, so a task should only fail on real
/// faults, never on rejected samples.
pub trait Task {
    /// Name used in failure and completion logs.
    fn name(&self) -> &str;

    /// Advances the task by one step.
    fn step(&mut self, host: &mut dyn EditorHost) -> Result<Step, SceneError>;
}

/// Whether the runner still has work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerStatus {
    /// A task is active or queued; keep ticking
    Running,

    /// The queue drained; ticking again is a no-op
    Finished,
}

/// Schedules tasks over host ticks, strictly sequentially.
///
/// At most one task is ever current, so tasks may freely share mutable
/// state between themselves. There is no mid-task cancellation and no
/// per-task error recovery: a failing step clears the schedule's current
/// slot and propagates, halting the run.
#[derive(Default)]
pub struct TaskRunner {
    queue: VecDeque<Box<dyn Task>>,
    current: Option<Box<dyn Task>>,
    finished_logged: bool,
}

impl TaskRunner {
    /// Creates an empty runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task to the back of the schedule.
    pub fn push(&mut self, task: Box<dyn Task>) {
        self.queue.push_back(task);
    }

    /// Returns how many tasks are waiting (not counting the current one).
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the runner has neither a current nor a queued task.
    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.queue.is_empty()
    }

    /// Advances the schedule by one step.
    ///
    /// Call once per host tick. Returns [`RunnerStatus::Finished`] once
    /// the queue has drained; an `Err` means the current task failed and
    /// the run must stop.
    pub fn tick(&mut self, host: &mut dyn EditorHost) -> Result<RunnerStatus, SceneError> {
        if self.current.is_none() {
            match self.queue.pop_front() {
                Some(task) => {
                    debug!(task = task.name(), "task started");
                    self.current = Some(task);
                }
                None => {
                    if !self.finished_logged {
                        info!("all tasks complete");
                        self.finished_logged = true;
                    }
                    return Ok(RunnerStatus::Finished);
                }
            }
        }

        // Unwrap is safe: the branch above either set `current` or returned.
        let mut task = self.current.take().unwrap();
        match task.step(host) {
            Ok(Step::Continue) => {
                self.current = Some(task);
            }
            Ok(Step::Delegate(sub)) => {
                debug!(parent = task.name(), sub = sub.name(), "task delegated");
                self.queue.push_front(task);
                self.current = Some(sub);
            }
            Ok(Step::Done) => {
                debug!(task = task.name(), "task finished");
            }
            Err(e) => {
                error!(task = task.name(), error = %e, "task failed, halting run");
                return Err(e);
            }
        }

        Ok(RunnerStatus::Running)
    }
}

/// Suspends its parent for a fixed span of host time.
///
/// The deadline is armed on the first step, so queue time does not count
/// against the delay.
pub struct DelayTask {
    name: String,
    duration: Duration,
    deadline: Option<Duration>,
}

impl DelayTask {
    /// Creates a delay of the given duration.
    pub fn new(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            duration,
            deadline: None,
        }
    }
}

impl Task for DelayTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn step(&mut self, host: &mut dyn EditorHost) -> Result<Step, SceneError> {
        let deadline = *self
            .deadline
            .get_or_insert_with(|| host.now() + self.duration);
        if host.now() >= deadline {
            Ok(Step::Done)
        } else {
            Ok(Step::Continue)
        }
    }
}
