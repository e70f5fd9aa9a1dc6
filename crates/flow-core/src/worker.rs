//! Per-artifact job execution
//!
//! Jobs are independent of each other; all jobs for one artifact id are
//! bundled into a single job so same-id work stays ordered. Workers pull
//! from a shared queue and stop taking work once a job fails or the run is
//! cancelled. Jobs already running are allowed to finish.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::{Error, Result};

/// Shared stop flag, raised on interrupt or on the first failed job.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the flag is raised.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Run `work` over every job with up to `parallelism` worker threads and
/// return the outputs in job order.
///
/// The first error stops scheduling and is returned once in-flight jobs
/// have finished. With a parallelism of 1 jobs run inline on the caller's
/// thread.
pub fn run_jobs<J, T, F>(jobs: Vec<J>, parallelism: usize, cancel: &CancelToken, work: F) -> Result<Vec<T>>
where
    J: Send,
    T: Send,
    F: Fn(J) -> Result<T> + Sync,
{
    if parallelism <= 1 || jobs.len() <= 1 {
        let mut outputs = Vec::with_capacity(jobs.len());
        for job in jobs {
            cancel.check()?;
            outputs.push(work(job)?);
        }
        return Ok(outputs);
    }

    let total = jobs.len();
    let queue: Mutex<VecDeque<(usize, J)>> = Mutex::new(jobs.into_iter().enumerate().collect());
    let results: Mutex<Vec<Option<T>>> = Mutex::new((0..total).map(|_| None).collect());
    let first_error: Mutex<Option<(usize, Error)>> = Mutex::new(None);
    // Local stop flag so a failure does not cancel the caller's token
    let stop = AtomicBool::new(false);

    thread::scope(|scope| {
        for _ in 0..parallelism.min(total) {
            scope.spawn(|| {
                loop {
                    if stop.load(Ordering::SeqCst) || cancel.is_cancelled() {
                        break;
                    }
                    let next = queue.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
                    let Some((index, job)) = next else {
                        break;
                    };
                    match work(job) {
                        Ok(output) => {
                            results.lock().unwrap_or_else(|e| e.into_inner())[index] = Some(output);
                        }
                        Err(e) => {
                            stop.store(true, Ordering::SeqCst);
                            let mut slot = first_error.lock().unwrap_or_else(|e| e.into_inner());
                            // Keep the earliest job's error for a stable report
                            if slot.as_ref().is_none_or(|(i, _)| index < *i) {
                                *slot = Some((index, e));
                            }
                        }
                    }
                }
            });
        }
    });

    if let Some((_, e)) = first_error.into_inner().unwrap_or_else(|e| e.into_inner()) {
        return Err(e);
    }
    cancel.check()?;

    results
        .into_inner()
        .unwrap_or_else(|e| e.into_inner())
        .into_iter()
        .map(|r| r.ok_or(Error::Cancelled))
        .collect()
}
