//! Polling synchronizer
//!
//! Runs one polling loop per tracked job. Every tick sends a status request
//! tagged with a sequence number; [`PollingSynchronizer::apply`] is the only
//! way a response reaches the store, and it drops anything older than what
//! was already applied.

use anyhow::Result;
use parking_lot::Mutex;
use playtrack_client::{ConsoleClient, StatusSource};
use playtrack_core::dto::status::StatusSnapshot;
use playtrack_core::{JobId, JobStateStore, JobStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::scheduler::SyncEvent;
use crate::scheduler::gate::SequenceGate;

/// Store handle shared between the synchronizer and its readers
pub type SharedStore = Arc<Mutex<JobStateStore>>;

const EVENT_CAPACITY: usize = 256;

struct Tracked {
    hosts: Vec<String>,
    token: CancellationToken,
    gate: SequenceGate,
}

#[derive(Default)]
struct Registry {
    jobs: HashMap<JobId, Tracked>,
    /// Last sequence number handed out, across all jobs
    sequence: u64,
}

struct Inner {
    store: SharedStore,
    source: Arc<dyn StatusSource>,
    registry: Mutex<Registry>,
    events: broadcast::Sender<SyncEvent>,
}

/// Keeps tracked jobs in the store up to date
///
/// Cloning is cheap; clones share the same loops, store and channel.
#[derive(Clone)]
pub struct PollingSynchronizer {
    inner: Arc<Inner>,
}

impl PollingSynchronizer {
    /// Creates a synchronizer writing into `store` and reading from `source`
    pub fn new(store: SharedStore, source: Arc<dyn StatusSource>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                store,
                source,
                registry: Mutex::new(Registry::default()),
                events,
            }),
        }
    }

    /// Creates a synchronizer talking to the console described by `config`
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        config.validate()?;
        let client = ConsoleClient::with_timeout(&config.console_url, config.request_timeout)?;
        let store = Arc::new(Mutex::new(JobStateStore::with_mode(config.output_mode)));
        Ok(Self::new(store, Arc::new(client)))
    }

    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.inner.store)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.inner.events.subscribe()
    }

    pub fn is_tracking(&self, job_id: &JobId) -> bool {
        self.inner.registry.lock().jobs.contains_key(job_id)
    }

    /// Ids of all jobs currently being polled, sorted
    pub fn tracked_jobs(&self) -> Vec<JobId> {
        let mut ids: Vec<JobId> = self.inner.registry.lock().jobs.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Starts polling `job_id` every `interval`
    ///
    /// Returns false without doing anything if the job is already tracked.
    /// Must be called from within a tokio runtime.
    pub fn start_tracking(&self, job_id: &JobId, hosts: &[String], interval: Duration) -> bool {
        let token = {
            let mut registry = self.inner.registry.lock();
            if registry.jobs.contains_key(job_id) {
                debug!("Job {} is already tracked", job_id);
                return false;
            }

            self.inner.store.lock().register(job_id, hosts);

            let token = CancellationToken::new();
            let floor = registry.sequence;
            registry.jobs.insert(
                job_id.clone(),
                Tracked {
                    hosts: hosts.to_vec(),
                    token: token.clone(),
                    gate: SequenceGate::new(floor),
                },
            );
            token
        };

        info!("Tracking job {} (interval: {:?})", job_id, interval);

        let this = self.clone();
        let job_id = job_id.clone();
        tokio::spawn(async move {
            this.poll_loop(job_id, token, interval).await;
        });
        true
    }

    /// Stops polling `job_id`; responses still in flight are discarded
    ///
    /// Returns false if the job was not tracked.
    pub fn stop_tracking(&self, job_id: &JobId) -> bool {
        let Some(tracked) = self.inner.registry.lock().jobs.remove(job_id) else {
            return false;
        };
        tracked.token.cancel();

        let status = self
            .inner
            .store
            .lock()
            .get(job_id)
            .map(|state| state.status)
            .unwrap_or(JobStatus::Pending);
        info!("Stopped tracking job {}", job_id);
        self.publish(SyncEvent::Stopped {
            job_id: job_id.clone(),
            status,
        });
        true
    }

    /// Stops every polling loop
    pub fn shutdown(&self) {
        for job_id in self.tracked_jobs() {
            self.stop_tracking(&job_id);
        }
    }

    /// Hands out the sequence number for the next request of `job_id`
    ///
    /// Returns `None` if the job is not tracked.
    pub fn issue(&self, job_id: &JobId) -> Option<u64> {
        let mut registry = self.inner.registry.lock();
        if !registry.jobs.contains_key(job_id) {
            return None;
        }
        registry.sequence += 1;
        Some(registry.sequence)
    }

    /// Applies the response to request `seq` of `job_id`
    ///
    /// The response is dropped if the job is no longer tracked or a newer
    /// response was already applied. A terminal status is stored and then
    /// ends tracking. Returns true if the response reached the store.
    pub fn apply(&self, job_id: &JobId, seq: u64, snapshot: &StatusSnapshot) -> bool {
        let mut registry = self.inner.registry.lock();
        let Some(tracked) = registry.jobs.get_mut(job_id) else {
            debug!("Discarding response #{} for untracked job {}", seq, job_id);
            return false;
        };
        if !tracked.gate.admit(seq) {
            debug!(
                "Discarding stale response #{} for job {} (last applied #{})",
                seq,
                job_id,
                tracked.gate.last_applied()
            );
            return false;
        }

        let outcome = self
            .inner
            .store
            .lock()
            .ingest(job_id, &tracked.hosts, snapshot);

        if outcome.changed {
            debug!(
                "Job {} updated to revision {} ({}, {}%)",
                job_id, outcome.revision, outcome.status, outcome.progress
            );
            self.publish(SyncEvent::Updated {
                job_id: job_id.clone(),
                revision: outcome.revision,
                status: outcome.status,
                progress: outcome.progress,
            });
        }

        if outcome.is_terminal() {
            if let Some(tracked) = registry.jobs.remove(job_id) {
                tracked.token.cancel();
            }
            info!("Job {} finished with status {}", job_id, outcome.status);
            self.publish(SyncEvent::Stopped {
                job_id: job_id.clone(),
                status: outcome.status,
            });
        }

        true
    }

    fn publish(&self, event: SyncEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }

    async fn poll_loop(self, job_id: JobId, token: CancellationToken, interval: Duration) {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let Some(seq) = self.issue(&job_id) else {
                break;
            };
            debug!("Polling job {} (request #{})", job_id, seq);
            self.spawn_fetch(job_id.clone(), seq, token.clone());
        }

        debug!("Polling loop for job {} ended", job_id);
    }

    /// Sends one status request without blocking the loop on its response
    fn spawn_fetch(&self, job_id: JobId, seq: u64, token: CancellationToken) {
        let this = self.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                result = this.inner.source.fetch_status(&job_id) => result,
            };

            match result {
                Ok(snapshot) => {
                    this.apply(&job_id, seq, &snapshot);
                }
                Err(e) => {
                    if token.is_cancelled() {
                        return;
                    }
                    warn!("Failed to fetch status for job {}: {}", job_id, e);
                    this.publish(SyncEvent::FetchFailed {
                        job_id,
                        message: e.to_string(),
                    });
                }
            }
        });
    }
}
