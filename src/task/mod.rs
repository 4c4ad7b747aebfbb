use core::{future::Future, pin::Pin};
use alloc::boxed::Box;
use core::task::{Context, Poll};
use core::sync::atomic::{AtomicU64, Ordering};

pub mod executor;
pub mod semaphore;
pub mod timer;

/// Lowest task priority; the executor idles below it.
pub const IDLE_PRIORITY: u8 = 0;

/// Nominal stack size for the smallest task, in words.
///
/// Async tasks share one stack, but the figure is kept with each task so a
/// port onto a stackful scheduler knows what to reserve.
pub const MINIMAL_STACK_SIZE: usize = 128;

/// Creation parameters for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskConfig {
    /// Name shown in logs
    pub name: &'static str,
    /// Requested stack size in words
    pub stack_size: usize,
    /// Higher runs first within a scheduling round
    pub priority: u8,
}

impl TaskConfig {
    pub const fn new(name: &'static str, stack_size: usize, priority: u8) -> Self {
        Self { name, stack_size, priority }
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self::new("task", MINIMAL_STACK_SIZE, IDLE_PRIORITY + 1)
    }
}

pub struct Task {
    id: TaskId,
    config: TaskConfig,
    future: Pin<Box<dyn Future<Output = ()>>>,
}

impl Task {
    pub fn new(future: impl Future<Output = ()> + 'static) -> Task {
        Task::with_config(TaskConfig::default(), future)
    }

    pub fn with_config(config: TaskConfig, future: impl Future<Output = ()> + 'static) -> Task {
        Task {
            id: TaskId::new(),
            config,
            future: Box::pin(future),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    fn poll(&mut self, context: &mut Context) -> Poll<()> {
        self.future.as_mut().poll(context)
    }
}

impl TaskId {
    fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        TaskId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Yields execution to allow other tasks to run
///
/// This creates a future that returns Poll::Pending once, then Poll::Ready
/// on the next poll, effectively yielding to the scheduler.
pub async fn yield_now() {
    struct YieldNow {
        yielded: bool,
    }

    impl Future for YieldNow {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.yielded {
                Poll::Ready(())
            } else {
                self.yielded = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    YieldNow { yielded: false }.await
}
