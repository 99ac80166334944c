//! Bounded concurrent execution of validations
//!
//! Each validation runs on tokio's blocking pool while holding one of
//! `workers` semaphore permits. Results are delivered through the
//! `JoinSet` completion stream, so `on_complete` sees items in the order
//! they finish, while the returned vector keeps submission order.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};

use crate::validator::{Cancellation, Validator};
use crate::{Error, Item, Result};

/// Worker count used when none is configured: the host's available parallelism.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Runs a validator over many names with bounded parallelism.
#[derive(Debug, Clone)]
pub struct Runner {
    workers: usize,
    timeout: Option<Duration>,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(default_workers())
    }
}

impl Runner {
    /// Create a runner with `workers` concurrent validations (at least one).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            timeout: None,
        }
    }

    /// Fail the run when a single validation takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Validate every name, calling `on_complete` once per item as it finishes.
    ///
    /// The first error from a validation or from `on_complete` aborts the
    /// run: queued validations that have not started are skipped, running
    /// ones see their [`Cancellation`] raised, and the error is returned
    /// without any partial results.
    pub async fn run_all<F>(
        &self,
        names: &[String],
        validator: Arc<dyn Validator>,
        mut on_complete: F,
    ) -> Result<Vec<Item>>
    where
        F: FnMut(&Item) -> Result<()>,
    {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let cancel = Cancellation::new();
        let mut tasks = JoinSet::new();
        let mut dispatched: HashMap<Id, &str> = HashMap::with_capacity(names.len());

        for (index, name) in names.iter().enumerate() {
            let unit = Unit {
                name: name.clone(),
                validator: Arc::clone(&validator),
                semaphore: Arc::clone(&semaphore),
                cancel: cancel.clone(),
                timeout: self.timeout,
            };
            let handle = tasks.spawn(async move { (index, unit.execute().await) });
            dispatched.insert(handle.id(), name);
        }

        let mut slots: Vec<Option<Item>> = (0..names.len()).map(|_| None).collect();

        while let Some(joined) = tasks.join_next_with_id().await {
            let failure = match joined {
                Ok((_, (index, Ok(Some(item))))) => match on_complete(&item) {
                    Ok(()) => {
                        slots[index] = Some(item);
                        continue;
                    }
                    Err(e) => e,
                },
                Ok((_, (_, Ok(None)))) => continue,
                Ok((_, (_, Err(e)))) => e,
                Err(e) => worker_failure(&dispatched, e),
            };

            tracing::debug!(error = %failure, "Aborting run");
            cancel.cancel();
            tasks.abort_all();
            return Err(failure);
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

/// Name the unit behind a task that panicked or was aborted.
fn worker_failure(dispatched: &HashMap<Id, &str>, error: JoinError) -> Error {
    Error::WorkerFailed {
        name: dispatched
            .get(&error.id())
            .map_or_else(|| "<unknown>".to_string(), |name| name.to_string()),
        reason: error.to_string(),
    }
}

/// One dispatched validation.
struct Unit {
    name: String,
    validator: Arc<dyn Validator>,
    semaphore: Arc<Semaphore>,
    cancel: Cancellation,
    timeout: Option<Duration>,
}

impl Unit {
    /// `Ok(None)` means the run was cancelled before this unit started.
    async fn execute(self) -> Result<Option<Item>> {
        let _permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|e| Error::WorkerFailed {
                name: self.name.clone(),
                reason: e.to_string(),
            })?;

        if self.cancel.is_cancelled() {
            return Ok(None);
        }

        tracing::debug!(name = %self.name, "Dispatching validation");
        let validator = Arc::clone(&self.validator);
        let name = self.name.clone();
        let cancel = self.cancel.clone();
        let handle =
            tokio::task::spawn_blocking(move || validator.validate_cancellable(&name, &cancel));

        let joined = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, handle).await.map_err(|_| {
                Error::ValidationTimeout {
                    name: self.name.clone(),
                    elapsed: limit,
                }
            })?,
            None => handle.await,
        };

        let item = joined.map_err(|e| Error::WorkerFailed {
            name: self.name.clone(),
            reason: e.to_string(),
        })??;

        tracing::debug!(name = %self.name, passed = item.passed(), "Validation finished");
        Ok(Some(item))
    }
}
