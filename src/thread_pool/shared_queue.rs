use super::ThreadPool;
use crate::Result;
use crossbeam::channel::{self, Receiver, Sender};
use std::thread;
use tracing::{debug, error};

/// A thread pool implemented with a shared job queue (i.e. channel).
///
/// This implementation uses the MPMC [`channel`] provided by the crossbeam
/// crate as a single producer, multiple consumer queue: the pool itself is
/// the producer and the worker threads are the consumers.
///
/// A worker that panics while running a job is replaced with a fresh thread,
/// so a misbehaving connection handler cannot drain the pool. If replacing a
/// worker fails at the OS level the failure is logged and the pool shrinks;
/// spawning onto a pool whose workers are all gone panics.
///
/// [`channel`]: https://docs.rs/crossbeam/0.8.1/crossbeam/channel/index.html
pub struct SharedQueueThreadPool {
    /// the sending part of the job channel
    tx: Sender<Box<dyn FnOnce() + Send + 'static>>,
}

impl ThreadPool for SharedQueueThreadPool {
    /// create a new thread pool with the given number of `threads`, each one
    /// holding a handle to the receiving end of the job channel
    fn new(threads: u32) -> Result<Self> {
        let (tx, rx) = channel::unbounded::<Box<dyn FnOnce() + Send + 'static>>();
        for _ in 0..threads {
            let worker = Worker(rx.clone());
            thread::Builder::new().spawn(move || run_jobs(worker))?;
        }
        Ok(SharedQueueThreadPool { tx })
    }

    /// Spawns a function into the thread pool.
    ///
    /// # Panics
    ///
    /// Panics if the thread pool has no threads left.
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx
            .send(Box::new(job))
            .expect("there are no threads in the pool");
    }
}

/// The receiving side of the job queue, owned by one worker thread.
/// Its Drop impl is what replaces a worker that panicked mid-job.
#[derive(Clone)]
struct Worker(Receiver<Box<dyn FnOnce() + Send + 'static>>);

impl Drop for Worker {
    fn drop(&mut self) {
        if thread::panicking() {
            debug!("worker panicked, spawning a replacement");
            let worker = self.clone();
            if let Err(e) = thread::Builder::new().spawn(move || run_jobs(worker)) {
                error!("failed to spawn replacement worker: {}", e);
            }
        }
    }
}

/// pulls jobs off the queue and runs them until the pool is dropped
fn run_jobs(worker: Worker) {
    loop {
        match worker.0.recv() {
            Ok(job) => job(),
            Err(_) => {
                debug!("worker exiting, the thread pool was destroyed");
                break;
            }
        }
    }
}
