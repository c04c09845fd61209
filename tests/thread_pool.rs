use crossbeam_utils::sync::WaitGroup;
use dictkv::{NaiveThreadPool, RayonThreadPool, SharedQueueThreadPool, ThreadPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const JOBS: usize = 20;

fn pool_runs_all_jobs<P: ThreadPool>() {
    let pool = P::new(4).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    let wg = WaitGroup::new();

    for _ in 0..JOBS {
        let counter = Arc::clone(&counter);
        let wg = wg.clone();
        pool.spawn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(wg);
        });
    }

    wg.wait();
    assert_eq!(counter.load(Ordering::SeqCst), JOBS);
}

#[test]
fn naive_pool_runs_all_jobs() {
    pool_runs_all_jobs::<NaiveThreadPool>();
}

#[test]
fn shared_queue_pool_runs_all_jobs() {
    pool_runs_all_jobs::<SharedQueueThreadPool>();
}

#[test]
fn rayon_pool_runs_all_jobs() {
    pool_runs_all_jobs::<RayonThreadPool>();
}

#[test]
fn shared_queue_pool_survives_a_panicking_job() {
    let pool = SharedQueueThreadPool::new(1).unwrap();

    pool.spawn(|| panic!("job panicked on purpose"));
    // let the panicked worker die and its replacement come up
    std::thread::sleep(Duration::from_millis(100));

    let counter = Arc::new(AtomicUsize::new(0));
    let wg = WaitGroup::new();
    for _ in 0..JOBS {
        let counter = Arc::clone(&counter);
        let wg = wg.clone();
        pool.spawn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(wg);
        });
    }

    wg.wait();
    assert_eq!(counter.load(Ordering::SeqCst), JOBS);
}
