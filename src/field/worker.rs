use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

use crate::error::{CoverageError, Result};
use crate::field::{FieldCache, FieldRequest, Grid};

/// Result of one background computation
#[derive(Debug)]
pub struct FieldUpdate {
    /// Generation of the request that produced this field
    pub generation: u64,
    pub result: Result<Arc<Grid>>,
}

struct Job {
    generation: u64,
    request: FieldRequest,
}

/// Background field computation with debouncing
///
/// Requests arriving within the debounce window of each other are coalesced
/// and only the newest one is computed. A result whose request was
/// superseded while it was computing is discarded, so consumers only ever
/// see the latest state. Intermediate renders can keep using
/// [`FieldWorker::latest`].
pub struct FieldWorker {
    requests: Option<Sender<Job>>,
    updates: Receiver<FieldUpdate>,
    generation: Arc<AtomicU64>,
    fresh: Arc<Mutex<Option<Arc<Grid>>>>,
    handle: Option<JoinHandle<()>>,
}

impl FieldWorker {
    pub fn spawn(debounce: Duration) -> Result<Self> {
        let (request_tx, request_rx) = unbounded();
        let (update_tx, update_rx) = unbounded();
        let generation = Arc::new(AtomicU64::new(0));
        let fresh = Arc::new(Mutex::new(None));

        let worker_generation = Arc::clone(&generation);
        let worker_fresh = Arc::clone(&fresh);
        let handle = std::thread::Builder::new()
            .name("field-worker".into())
            .spawn(move || {
                run_worker(
                    request_rx,
                    update_tx,
                    debounce,
                    worker_generation,
                    worker_fresh,
                )
            })?;

        log::info!("Field worker started (debounce {:?})", debounce);

        Ok(Self {
            requests: Some(request_tx),
            updates: update_rx,
            generation,
            fresh,
            handle: Some(handle),
        })
    }

    /// Queue a recomputation; returns the request's generation
    pub fn submit(&self, request: FieldRequest) -> Result<u64> {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.requests
            .as_ref()
            .ok_or(CoverageError::WorkerStopped)?
            .send(Job {
                generation,
                request,
            })
            .map_err(|_| CoverageError::WorkerStopped)?;
        Ok(generation)
    }

    /// Channel of completed computations
    pub fn updates(&self) -> &Receiver<FieldUpdate> {
        &self.updates
    }

    /// Generation of the most recent submission
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Last successfully computed field
    pub fn latest(&self) -> Option<Arc<Grid>> {
        lock_fresh(&self.fresh).clone()
    }
}

fn lock_fresh(fresh: &Mutex<Option<Arc<Grid>>>) -> MutexGuard<'_, Option<Arc<Grid>>> {
    fresh.lock().unwrap_or_else(|poisoned| {
        log::warn!("Field worker state was poisoned, recovering");
        poisoned.into_inner()
    })
}

impl Drop for FieldWorker {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Field worker panicked");
            }
        }
    }
}

fn run_worker(
    requests: Receiver<Job>,
    updates: Sender<FieldUpdate>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    fresh: Arc<Mutex<Option<Arc<Grid>>>>,
) {
    let mut cache = FieldCache::new();

    while let Ok(mut job) = requests.recv() {
        // Coalesce a burst into its newest request. Concurrent submitters
        // may deliver generations out of order.
        loop {
            match requests.recv_timeout(debounce) {
                Ok(other) if other.generation > job.generation => job = other,
                Ok(other) => {
                    log::trace!("Dropping out-of-order request {}", other.generation);
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }

        let result = cache.get_or_compute(&job.request);

        if job.generation != generation.load(Ordering::Acquire) {
            log::debug!("Discarding field for superseded request {}", job.generation);
            continue;
        }

        if let Ok(grid) = &result {
            *lock_fresh(&fresh) = Some(Arc::clone(grid));
        } else {
            cache.invalidate();
        }

        let update = FieldUpdate {
            generation: job.generation,
            result,
        };
        if updates.send(update).is_err() {
            break;
        }
    }

    log::debug!("Field worker stopped");
}
