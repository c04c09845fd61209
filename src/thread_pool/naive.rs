use super::ThreadPool;
use crate::Result;
use std::thread;

/// a trivial "pool" that spawns a fresh OS thread for every job instead of
/// reusing a fixed set of workers
pub struct NaiveThreadPool;

impl ThreadPool for NaiveThreadPool {
    fn new(_threads: u32) -> Result<Self> {
        Ok(NaiveThreadPool)
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        thread::spawn(job);
    }
}
