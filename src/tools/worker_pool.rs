//! A fixed-size pool of worker threads fed from one FIFO queue.
//!
//! The queue is a `VecDeque` behind a mutex, with a condition variable to wake
//! idle workers. Tasks are taken from the front of the queue, so they start in
//! the order they were submitted. Work that a later step depends on goes
//! through `submit` or `run_synchronously`, which hand back a completion
//! handle the caller blocks on.
//!
//! Shutdown marks the pool stopped, wakes every worker, and joins them. Each
//! worker keeps pulling tasks until the queue is empty, so nothing already
//! queued is abandoned.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use log::{debug, error, trace, warn};

use crate::error::{HuffError, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct PoolState {
    tasks: VecDeque<Job>,
    running: bool,
}

struct Shared {
    state: Mutex<PoolState>,
    notifier: Condvar,
}

impl Shared {
    /// Jobs never run while the lock is held, so a poisoned lock still guards a
    /// consistent queue.
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fixed-size thread pool. Dropping the pool shuts it down.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    size: usize,
}

/// Completion handle for a task handed to [`WorkerPool::submit`].
pub struct TaskHandle<T> {
    result: Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Block until the task has finished and return what it produced.
    pub fn join(self) -> Result<T> {
        // The sender only disappears without sending if the task unwound.
        self.result.recv().map_err(|_| HuffError::WorkerPanicked)
    }
}

impl WorkerPool {
    /// Start a pool with `size` workers (at least one).
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let shared = Arc::new(Shared {
            state: Mutex::new(PoolState {
                tasks: VecDeque::new(),
                running: true,
            }),
            notifier: Condvar::new(),
        });

        let workers = (0..size)
            .map(|id| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || worker_loop(&shared, id))
            })
            .collect();

        debug!("Started worker pool with {} threads", size);
        Self {
            shared,
            workers,
            size,
        }
    }

    /// Pool sized to the machine's available parallelism.
    pub fn with_available_parallelism() -> Self {
        Self::new(thread::available_parallelism().map_or(1, |n| n.get()))
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Queue a task without waiting for it. Returns false (and drops the task)
    /// if the pool has already been shut down.
    pub fn dispatch<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut state = self.shared.lock();
            if !state.running {
                warn!("Failed to dispatch task - pool has already stopped");
                return false;
            }
            state.tasks.push_back(Box::new(task));
        }
        self.shared.notifier.notify_one();
        true
    }

    /// Queue a task and return a handle that yields its result.
    pub fn submit<F, T>(&self, task: F) -> Result<TaskHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(1);
        let queued = self.dispatch(move || {
            // The handle may have been dropped; the result is simply discarded then.
            let _ = tx.send(task());
        });
        if queued {
            Ok(TaskHandle { result: rx })
        } else {
            Err(HuffError::PoolStopped)
        }
    }

    /// Run a task on the pool and block the caller until it has finished.
    pub fn run_synchronously<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.submit(task)?.join()
    }

    /// Stop accepting work, let the workers drain the queue, and join them.
    /// Calling this more than once is harmless.
    pub fn shutdown(&mut self) {
        {
            let mut state = self.shared.lock();
            if !state.running && self.workers.is_empty() {
                return;
            }
            state.running = false;
        }
        self.shared.notifier.notify_all();

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("A pool worker exited abnormally");
            }
        }
        debug!("Worker pool shut down");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: &Shared, id: usize) {
    loop {
        let task = {
            let state = shared.lock();
            let mut state = shared
                .notifier
                .wait_while(state, |s| s.running && s.tasks.is_empty())
                .unwrap_or_else(PoisonError::into_inner);
            match state.tasks.pop_front() {
                Some(task) => task,
                // Stopped and nothing left to drain.
                None => return,
            }
        };
        trace!("Worker {} picked up a task", id);
        if catch_unwind(AssertUnwindSafe(task)).is_err() {
            error!("Task panicked on worker {}", id);
        }
    }
}

#[cfg(test)]
mod test {
    use super::WorkerPool;
    use crate::error::HuffError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[test]
    fn run_synchronously_test() {
        let pool = WorkerPool::new(2);
        let answer = pool.run_synchronously(|| 6 * 7).unwrap();
        assert_eq!(answer, 42);
    }

    #[test]
    fn sync_task_finishes_before_return_test() {
        let pool = WorkerPool::new(4);
        let done = Arc::new(AtomicUsize::new(0));
        let flag = Arc::clone(&done);
        pool.run_synchronously(move || {
            std::thread::sleep(Duration::from_millis(50));
            flag.store(1, Ordering::SeqCst);
        })
        .unwrap();
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fifo_order_test() {
        let mut pool = WorkerPool::new(1);
        let seen = Arc::new(Mutex::new(Vec::new()));
        for i in 0..50 {
            let seen = Arc::clone(&seen);
            assert!(pool.dispatch(move || seen.lock().unwrap().push(i)));
        }
        pool.shutdown();
        let seen = seen.lock().unwrap();
        assert_eq!(*seen, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn shutdown_drains_queue_test() {
        let mut pool = WorkerPool::new(2);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..200 {
            let counter = Arc::clone(&counter);
            pool.dispatch(move || {
                std::thread::sleep(Duration::from_micros(100));
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 200);
    }

    #[test]
    fn dispatch_after_shutdown_test() {
        let mut pool = WorkerPool::new(2);
        pool.shutdown();
        assert!(!pool.dispatch(|| {}));
        assert!(matches!(
            pool.run_synchronously(|| 1),
            Err(HuffError::PoolStopped)
        ));
        // A second shutdown is a no-op.
        pool.shutdown();
    }

    #[test]
    fn panicking_task_test() {
        let pool = WorkerPool::new(1);
        let result = pool.run_synchronously(|| -> u8 { panic!("boom") });
        assert!(matches!(result, Err(HuffError::WorkerPanicked)));
        // The worker survives and keeps serving the queue.
        assert_eq!(pool.run_synchronously(|| 3).unwrap(), 3);
    }

    #[test]
    fn zero_size_pool_test() {
        let pool = WorkerPool::new(0);
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.run_synchronously(|| "ok").unwrap(), "ok");
    }
}
