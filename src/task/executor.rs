//! Cooperative executor
//!
//! Tasks are woken through a lock-free queue of task ids, so wakers may be
//! fired from interrupt context. Each call to [`Executor::run_ready_tasks`]
//! is one bounded round: every task that was ready when the round started
//! is polled once, highest priority first.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::task::Wake;
use alloc::vec::Vec;
use core::cmp::Reverse;
use core::task::{Context, Poll, Waker};
use crossbeam_queue::ArrayQueue;
use log::{debug, info, warn};
use thiserror::Error;

use super::{Task, TaskId};

/// Maximum number of tasks waiting in the ready queue
pub const READY_QUEUE_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// No room to queue the new task's first poll
    #[error("ready queue full, task '{0}' not spawned")]
    QueueFull(&'static str),
}

pub struct Executor {
    tasks: BTreeMap<TaskId, Task>,
    task_queue: Arc<ArrayQueue<TaskId>>,
    waker_cache: BTreeMap<TaskId, Waker>,
}

impl Executor {
    pub fn new() -> Self {
        Executor {
            tasks: BTreeMap::new(),
            task_queue: Arc::new(ArrayQueue::new(READY_QUEUE_CAPACITY)),
            waker_cache: BTreeMap::new(),
        }
    }

    /// Add a task and queue its first poll.
    pub fn spawn(&mut self, task: Task) -> Result<TaskId, SpawnError> {
        let task_id = task.id;
        if self.task_queue.push(task_id).is_err() {
            return Err(SpawnError::QueueFull(task.config.name));
        }
        info!(
            "task '{}' created (stack {} words, priority {})",
            task.config.name, task.config.stack_size, task.config.priority
        );
        self.tasks.insert(task_id, task);
        Ok(task_id)
    }

    /// Poll every task that is ready at the start of the round, once.
    ///
    /// Returns the number of tasks polled.
    pub fn run_ready_tasks(&mut self) -> usize {
        let Self {
            tasks,
            task_queue,
            waker_cache,
        } = self;

        let mut ready: Vec<TaskId> = Vec::with_capacity(task_queue.len());
        for _ in 0..task_queue.len() {
            match task_queue.pop() {
                Some(task_id) => {
                    if !ready.contains(&task_id) {
                        ready.push(task_id);
                    }
                }
                None => break,
            }
        }
        ready.sort_by_key(|id| Reverse(tasks.get(id).map_or(0, |t| t.config.priority)));

        let mut polled = 0;
        for task_id in ready {
            let task = match tasks.get_mut(&task_id) {
                Some(task) => task,
                None => continue, // task no longer exists
            };
            let waker = waker_cache
                .entry(task_id)
                .or_insert_with(|| TaskWaker::new(task_id, task_queue.clone()));
            let mut context = Context::from_waker(waker);
            polled += 1;
            match task.poll(&mut context) {
                Poll::Ready(()) => {
                    debug!("task '{}' finished", task.config.name);
                    // task done -> remove it and its cached waker
                    tasks.remove(&task_id);
                    waker_cache.remove(&task_id);
                }
                Poll::Pending => {}
            }
        }
        polled
    }

    /// Run forever, calling `idle` whenever no task is ready.
    pub fn run(&mut self, mut idle: impl FnMut()) -> ! {
        loop {
            self.run_ready_tasks();
            if self.task_queue.is_empty() {
                idle();
            }
        }
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_idle(&self) -> bool {
        self.task_queue.is_empty()
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

struct TaskWaker {
    task_id: TaskId,
    task_queue: Arc<ArrayQueue<TaskId>>,
}

impl TaskWaker {
    fn new(task_id: TaskId, task_queue: Arc<ArrayQueue<TaskId>>) -> Waker {
        Waker::from(Arc::new(TaskWaker {
            task_id,
            task_queue,
        }))
    }

    fn wake_task(&self) {
        if self.task_queue.push(self.task_id).is_err() {
            warn!("ready queue full, wake-up dropped");
        }
    }
}

impl Wake for TaskWaker {
    fn wake(self: Arc<Self>) {
        self.wake_task();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.wake_task();
    }
}
