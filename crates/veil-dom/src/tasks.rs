//! Deferred task queue.
//!
//! [§ 8.1.7 Event loops](https://html.spec.whatwg.org/multipage/webappapis.html#event-loops)
//!
//! "An event loop has one or more task queues." This is the single queue the
//! host exposes: work deferred with `setTimeout(fn, 0)` lands here and runs
//! on the next turn, never synchronously with the code that queued it.

use std::collections::VecDeque;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// FIFO of tasks waiting for the next turn of the event loop.
#[derive(Default)]
pub struct TaskQueue {
    queue: VecDeque<Task>,
}

impl TaskQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task for the next turn.
    pub fn push(&mut self, task: Task) {
        self.queue.push_back(task);
    }

    /// Remove every task queued so far, in order.
    ///
    /// Tasks queued while the returned batch runs belong to the following turn.
    pub fn take_turn(&mut self) -> Vec<Task> {
        self.queue.drain(..).collect()
    }

    /// Number of tasks waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
