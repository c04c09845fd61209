//! Thread pools used by the server to service admitted connections.
//!
//! The pool is a seam: the server only needs [`ThreadPool::spawn`], so the
//! choice of pool (spawn-per-job, shared queue, or rayon) is made once in the
//! server binary and can be swapped without touching the serving loop.

use crate::Result;

/// A pool of threads that jobs (closures) can be spawned onto
pub trait ThreadPool {
    /// Creates a new thread pool, immediately spawning the specified number
    /// of threads.
    ///
    /// Returns an error if any thread fails to spawn; any threads spawned
    /// before the failure are dropped with the pool.
    fn new(threads: u32) -> Result<Self>
    where
        Self: Sized;

    /// Spawns a function into the thread pool.
    ///
    /// Spawning always succeeds, but if the function panics the thread pool
    /// continues to operate with the same number of threads; the pool is not
    /// shrunk by panicking jobs.
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static;
}

mod naive;
mod rayon_pool;
mod shared_queue;

pub use self::naive::NaiveThreadPool;
pub use self::rayon_pool::RayonThreadPool;
pub use self::shared_queue::SharedQueueThreadPool;
