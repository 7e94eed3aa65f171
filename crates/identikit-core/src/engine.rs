//! Generation engine: drives one identity generation attempt from
//! submission to a terminal result, publishing progress snapshots for the
//! view layer while hiding whether the backend supports async task polling.
//!
//! Two paths cover the two backend shapes:
//!
//! - **Polling**: start a task, fetch its progress every second, and fetch
//!   the result once the task reports `completed`. A transient progress
//!   fetch error does not abort the attempt; the next tick retries. A hard
//!   ceiling bounds the whole attempt.
//! - **Simulated**: for backends that only offer the blocking call, a fixed
//!   five-step progress sequence runs concurrently with that call so the UI
//!   contract (a progress stream) holds either way.
//!
//! The engine owns the progress observable (a `watch` channel) and clears
//! it on every exit path, including cancellation via [`GenerationEngine::reset`].

use crate::client::IdentityBackend;
use crate::config::GenerationMode;
use crate::error::GenerationError;
use crate::types::{GeneratedIdentity, GenerationProgress, GenerationStatus, GenerationStep};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Fixed cadence for task progress polls.
const POLL_INTERVAL: Duration = Duration::from_millis(1000);
/// Hard ceiling on a polling attempt, measured from the start of polling.
const POLL_CEILING: Duration = Duration::from_millis(300_000);
/// How long the terminal 100% snapshot stays visible before it is cleared.
const COMPLETION_HOLD: Duration = Duration::from_millis(500);
/// Inter-step delay bounds for the simulated sequence.
const SIM_DELAY_MIN_MS: u64 = 800;
const SIM_DELAY_MAX_MS: u64 = 1200;

const DEFAULT_FAILURE_MESSAGE: &str = "Failed to generate identity. Please try again.";

/// The five snapshots published on the simulated path, in order.
const SIM_SEQUENCE: [(GenerationStep, u8); 5] = [
    (GenerationStep::Analyzing, 10),
    (GenerationStep::Bio, 30),
    (GenerationStep::Image, 50),
    (GenerationStep::Voice, 75),
    (GenerationStep::Finalizing, 90),
];

/// Orchestrates one generation attempt at a time.
///
/// At most one attempt is live per engine; a second `generate` while one is
/// in flight is rejected with [`GenerationError::Busy`] rather than racing
/// two progress publishers.
pub struct GenerationEngine {
    backend: Arc<dyn IdentityBackend>,
    mode: GenerationMode,
    /// Auto-mode probe verdict, fixed after the first attempt.
    async_supported: OnceLock<bool>,
    progress_tx: watch::Sender<Option<GenerationProgress>>,
    in_flight: AtomicBool,
    cancel: Notify,
}

/// Releases the busy flag and clears the progress observable on every exit
/// path out of an attempt, panics and cancellation included.
struct FlightGuard<'a> {
    engine: &'a GenerationEngine,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.engine.progress_tx.send_replace(None);
        self.engine.in_flight.store(false, Ordering::SeqCst);
    }
}

impl GenerationEngine {
    pub fn new(backend: Arc<dyn IdentityBackend>, mode: GenerationMode) -> Self {
        let (progress_tx, _) = watch::channel(None);
        Self {
            backend,
            mode,
            async_supported: OnceLock::new(),
            progress_tx,
            in_flight: AtomicBool::new(false),
            cancel: Notify::new(),
        }
    }

    /// Subscribe to progress snapshots. `None` means no attempt is live (or
    /// the last one reached a terminal state).
    pub fn subscribe(&self) -> watch::Receiver<Option<GenerationProgress>> {
        self.progress_tx.subscribe()
    }

    /// Current snapshot, if an attempt is publishing.
    pub fn progress(&self) -> Option<GenerationProgress> {
        self.progress_tx.borrow().clone()
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Drive one generation attempt to a terminal result.
    ///
    /// The caller keeps ownership of the returned identity; the engine keeps
    /// nothing but the (now cleared) progress observable.
    pub async fn generate(
        &self,
        description: &str,
    ) -> Result<GeneratedIdentity, GenerationError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(GenerationError::Busy);
        }
        let _guard = FlightGuard { engine: self };

        tokio::select! {
            result = self.run_attempt(description) => result,
            _ = self.cancel.notified() => {
                info!("generation attempt cancelled by reset");
                Err(GenerationError::Cancelled)
            }
        }
    }

    /// Cancel any in-flight attempt and clear the progress observable.
    /// Idempotent; safe to call from any state.
    pub fn reset(&self) {
        self.cancel.notify_waiters();
        self.progress_tx.send_replace(None);
    }

    async fn run_attempt(
        &self,
        description: &str,
    ) -> Result<GeneratedIdentity, GenerationError> {
        self.publish(GenerationProgress::new(
            GenerationStatus::Pending,
            GenerationStep::Analyzing,
            0,
        ));

        match self.mode {
            GenerationMode::Sync => self.run_simulated(description).await,
            GenerationMode::Poll => {
                let task = self.backend.start_generation(description).await?;
                self.run_polling(&task.task_id).await
            }
            GenerationMode::Auto => {
                if self.async_supported.get() == Some(&false) {
                    return self.run_simulated(description).await;
                }
                match self.backend.start_generation(description).await {
                    Ok(task) => {
                        let _ = self.async_supported.set(true);
                        self.run_polling(&task.task_id).await
                    }
                    Err(err) => {
                        if self.async_supported.set(false).is_ok() {
                            info!(error = %err, "async start unavailable; using simulated progress from now on");
                        }
                        self.run_simulated(description).await
                    }
                }
            }
        }
    }

    async fn run_polling(&self, task_id: &str) -> Result<GeneratedIdentity, GenerationError> {
        debug!(task_id, "polling generation task");
        match tokio::time::timeout(POLL_CEILING, self.poll_until_terminal(task_id)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(task_id, ceiling_secs = POLL_CEILING.as_secs(), "generation task timed out");
                Err(GenerationError::TimedOut(POLL_CEILING))
            }
        }
    }

    async fn poll_until_terminal(
        &self,
        task_id: &str,
    ) -> Result<GeneratedIdentity, GenerationError> {
        let mut ticks = tokio::time::interval(POLL_INTERVAL);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of an interval completes immediately; consume it so
        // the first fetch lands one full interval after the task started.
        ticks.tick().await;

        loop {
            ticks.tick().await;
            let snapshot = match self.backend.generation_progress(task_id).await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    // The progress endpoint is allowed to be flaky; the task
                    // keeps running server-side, so retry on the next tick.
                    warn!(task_id, error = %err, "progress fetch failed; retrying");
                    continue;
                }
            };

            match snapshot.status {
                GenerationStatus::Completed => {
                    self.publish(snapshot);
                    let identity = self.backend.generation_result(task_id).await?;
                    return Ok(identity);
                }
                GenerationStatus::Failed => {
                    let message = snapshot
                        .message
                        .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
                    return Err(GenerationError::Failed(message));
                }
                _ => self.publish(snapshot),
            }
        }
    }

    async fn run_simulated(
        &self,
        description: &str,
    ) -> Result<GeneratedIdentity, GenerationError> {
        debug!("running blocking generation with simulated progress");
        // Both the snapshot sequence and the real call must finish before we
        // report a terminal state.
        let (outcome, ()) = tokio::join!(
            self.backend.generate_identity(description),
            self.simulate_steps()
        );
        let identity = outcome?;

        self.publish(
            GenerationProgress::new(GenerationStatus::Completed, GenerationStep::Finalizing, 100)
                .with_message("Complete!"),
        );
        tokio::time::sleep(COMPLETION_HOLD).await;
        Ok(identity)
    }

    async fn simulate_steps(&self) {
        for (step, percent) in SIM_SEQUENCE {
            self.publish(
                GenerationProgress::new(GenerationStatus::Processing, step, percent)
                    .with_message(step.label()),
            );
            let delay = rand::thread_rng().gen_range(SIM_DELAY_MIN_MS..=SIM_DELAY_MAX_MS);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    fn publish(&self, snapshot: GenerationProgress) {
        self.progress_tx.send_replace(Some(snapshot));
    }
}
