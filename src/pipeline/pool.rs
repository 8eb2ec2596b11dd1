//! Bounded worker pool with per-job failure isolation.

use super::PipelineError;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// An explicitly constructed thread pool.
///
/// Jobs run to completion independently; an error or panic in one is
/// captured as that job's result.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// `None` sizes the pool to the available parallelism.
    pub fn new(workers: Option<usize>) -> Result<Self, PipelineError> {
        let mut builder = rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("cache-code-updater-{i}"));
        if let Some(n) = workers {
            builder = builder.num_threads(n);
        }
        Ok(Self {
            pool: builder.build()?,
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `job` over every input; results come back in input order.
    pub fn run<I, T, F>(&self, inputs: &[I], job: F) -> Vec<Result<T, PipelineError>>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> anyhow::Result<T> + Sync,
    {
        self.pool.install(|| {
            inputs
                .par_iter()
                .map(|input| match catch_unwind(AssertUnwindSafe(|| job(input))) {
                    Ok(Ok(value)) => Ok(value),
                    Ok(Err(source)) => Err(PipelineError::JobFailed { source }),
                    Err(payload) => Err(PipelineError::JobPanicked {
                        message: panic_message(payload.as_ref()),
                    }),
                })
                .collect()
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
