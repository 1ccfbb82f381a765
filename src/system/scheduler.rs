//! Single-threaded task queue for UI-owned state.
//!
//! Background threads never touch a screen directly. They enqueue closures
//! through a [`SchedulerHandle`], and the UI thread drains them once per frame
//! with exclusive access to the target. Tasks run in the exact order they
//! were enqueued.

use crossbeam_channel::{Receiver, Sender, unbounded};

/// Deferred unit of work executed against the scheduler's target.
pub type Task<T> = Box<dyn FnOnce(&mut T) + Send>;

/// Owner side of the queue. Lives next to (or inside) the target it serves.
pub struct Scheduler<T> {
    tx: Sender<Task<T>>,
    rx: Receiver<Task<T>>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Returns a cloneable, thread-safe handle for enqueueing tasks.
    pub fn handle(&self) -> SchedulerHandle<T> {
        SchedulerHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn enqueue(&self, task: impl FnOnce(&mut T) + Send + 'static) {
        // The receiver lives in `self`, so this send cannot fail.
        let _ = self.tx.send(Box::new(task));
    }

    pub fn pending_count(&self) -> usize {
        self.rx.len()
    }

    /// Takes every task queued so far.
    ///
    /// Tasks enqueued while the returned batch is running land in the next
    /// batch, so one frame never loops on work it produces itself.
    pub fn take_pending(&self) -> Vec<Task<T>> {
        self.rx.try_iter().collect()
    }

    /// Runs the queued batch against `target`. Returns the number of tasks run.
    pub fn run(&self, target: &mut T) -> usize {
        let tasks = self.take_pending();
        let count = tasks.len();
        for task in tasks {
            task(target);
        }
        count
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer side of a [`Scheduler`]. `Send` regardless of `T`.
pub struct SchedulerHandle<T> {
    tx: Sender<Task<T>>,
}

impl<T> SchedulerHandle<T> {
    /// Queues `task` for the next drain.
    ///
    /// Returns `false` when the scheduler has been dropped; the task is
    /// discarded in that case.
    pub fn enqueue(&self, task: impl FnOnce(&mut T) + Send + 'static) -> bool {
        self.tx.send(Box::new(task)).is_ok()
    }
}

impl<T> Clone for SchedulerHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_tasks_run_in_enqueue_order() {
        let scheduler: Scheduler<Vec<u32>> = Scheduler::new();
        let handle = scheduler.handle();
        for i in 0..5 {
            handle.enqueue(move |log: &mut Vec<u32>| log.push(i));
        }

        let mut log = Vec::new();
        assert_eq!(scheduler.run(&mut log), 5);
        assert_eq!(log, vec![0, 1, 2, 3, 4]);
        assert_eq!(scheduler.run(&mut log), 0);
    }

    #[test]
    fn test_enqueue_from_worker_thread() {
        let scheduler: Scheduler<Vec<&'static str>> = Scheduler::new();
        let handle = scheduler.handle();

        thread::spawn(move || {
            handle.enqueue(|log| log.push("first"));
            handle.enqueue(|log| log.push("second"));
        })
        .join()
        .unwrap();

        assert_eq!(scheduler.pending_count(), 2);
        let mut log = Vec::new();
        scheduler.run(&mut log);
        assert_eq!(log, vec!["first", "second"]);
    }

    #[test]
    fn test_enqueue_after_drop_is_rejected() {
        let scheduler: Scheduler<u32> = Scheduler::new();
        let handle = scheduler.handle();
        drop(scheduler);
        assert!(!handle.enqueue(|n| *n += 1));
    }
}
