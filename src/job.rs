//! Background hash jobs.
//!
//! A [`HashJob`] runs one [`DigestEngine`] computation on its own worker
//! thread. The caller gets a [`JobHandle`] back immediately and hears about
//! the job through two independent channels:
//!
//! - a [`ProgressSink`], told `true` when the scan starts and `false` once the
//!   engine returns (on every exit path), and
//! - a [`ResultSink`], handed the outcome exactly once, after the progress
//!   sink has seen `false`.
//!
//! Both sinks are invoked on the worker thread. Receivers that live on
//! another context (a UI event loop, an async task) must marshal the values
//! back themselves, e.g. by forwarding into a channel.

use crate::error::HashError;
use crate::file_ops::{CancelToken, DigestEngine};
use crate::models::{Algorithm, DigestResult, JobState};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use tokio::sync::oneshot;

/// What a job delivers to its [`ResultSink`].
pub type JobOutcome = Result<DigestResult, HashError>;

/// Receives the single terminal event of a job. Consumed on delivery.
pub trait ResultSink: Send + 'static {
    fn on_complete(self, outcome: JobOutcome);
}

impl<F> ResultSink for F
where
    F: FnOnce(JobOutcome) + Send + 'static,
{
    fn on_complete(self, outcome: JobOutcome) {
        self(outcome)
    }
}

/// Receives busy/idle transitions.
pub trait ProgressSink: Send + 'static {
    fn on_progress(&self, active: bool);
}

impl<F> ProgressSink for F
where
    F: Fn(bool) + Send + 'static,
{
    fn on_progress(&self, active: bool) {
        self(active)
    }
}

/// Progress sink for callers without a busy indicator.
pub fn no_progress(_active: bool) {}

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique, increasing job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl JobId {
    fn next() -> Self {
        JobId(NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Emits `on_progress(false)` when dropped, so the stop transition fires
/// on success, error and unwind alike.
struct ActiveGuard<'a, P: ProgressSink>(&'a P);

impl<P: ProgressSink> Drop for ActiveGuard<'_, P> {
    fn drop(&mut self) {
        self.0.on_progress(false);
    }
}

/// One pending digest computation.
#[derive(Debug)]
pub struct HashJob {
    id: JobId,
    engine: DigestEngine,
    path: PathBuf,
    algorithm: Algorithm,
}

impl HashJob {
    pub fn new(engine: &DigestEngine, path: impl Into<PathBuf>, algorithm: Algorithm) -> Self {
        Self {
            id: JobId::next(),
            engine: engine.clone(),
            path: path.into(),
            algorithm,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Spawn the worker and return without waiting for it.
    ///
    /// If the thread cannot be spawned the error is returned here and
    /// neither sink is ever called.
    pub fn start<R, P>(self, on_complete: R, on_progress: P) -> io::Result<JobHandle>
    where
        R: ResultSink,
        P: ProgressSink,
    {
        let id = self.id;
        let state = Arc::new(Mutex::new(JobState::Pending));
        let cancel = CancelToken::new();
        let (done_tx, done_rx) = oneshot::channel();

        let worker = Worker {
            job: self,
            state: Arc::clone(&state),
            cancel: cancel.clone(),
        };
        thread::Builder::new()
            .name(format!("hash-job-{}", id.get()))
            .spawn(move || {
                let final_state = worker.run(on_complete, on_progress);
                let _ = done_tx.send(final_state);
            })?;

        Ok(JobHandle {
            id,
            state,
            cancel,
            done: done_rx,
        })
    }
}

struct Worker {
    job: HashJob,
    state: Arc<Mutex<JobState>>,
    cancel: CancelToken,
}

impl Worker {
    fn run<R: ResultSink, P: ProgressSink>(self, on_complete: R, on_progress: P) -> JobState {
        let HashJob {
            id,
            engine,
            path,
            algorithm,
        } = &self.job;
        set_state(&self.state, JobState::Running);
        tracing::debug!(job = %id, path = %path.display(), %algorithm, "hash job started");

        let outcome = {
            on_progress.on_progress(true);
            let _active = ActiveGuard(&on_progress);
            engine.compute_cancellable(path, *algorithm, &self.cancel)
        };

        let final_state = match &outcome {
            Ok(_) => JobState::Completed,
            Err(HashError::Cancelled { .. }) => JobState::Cancelled,
            Err(e) => {
                tracing::warn!(job = %id, error = %e, "hash job failed");
                JobState::Failed
            }
        };

        on_complete.on_complete(outcome);
        set_state(&self.state, final_state);
        tracing::debug!(job = %id, state = ?final_state, "hash job finished");
        final_state
    }
}

fn set_state(state: &Mutex<JobState>, next: JobState) {
    *state.lock().unwrap_or_else(PoisonError::into_inner) = next;
}

/// Caller-side handle to a running job.
#[derive(Debug)]
pub struct JobHandle {
    id: JobId,
    state: Arc<Mutex<JobState>>,
    cancel: CancelToken,
    done: oneshot::Receiver<JobState>,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn state(&self) -> JobState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask the worker to stop at the next block boundary. The result sink
    /// then receives `HashError::Cancelled` unless the scan already finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once the result has been delivered.
    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// Block until the worker is done. Must not be called from inside an
    /// async runtime; use [`finished`](Self::finished) there.
    pub fn wait(self) -> JobState {
        self.done.blocking_recv().unwrap_or(JobState::Failed)
    }

    pub async fn finished(self) -> JobState {
        self.done.await.unwrap_or(JobState::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn job_ids_increase() {
        let engine = DigestEngine::new();
        let a = HashJob::new(&engine, "a", Algorithm::Md5);
        let b = HashJob::new(&engine, "b", Algorithm::Md5);
        assert!(b.id() > a.id());
    }

    #[test]
    fn guard_signals_stop_on_drop() {
        let (tx, rx) = mpsc::channel();
        let sink = move |active: bool| {
            let _ = tx.send(active);
        };
        {
            let _guard = ActiveGuard(&sink);
        }
        assert_eq!(rx.try_recv(), Ok(false));
    }

    #[test]
    fn unsupported_algorithm_is_delivered_not_panicked() {
        let (tx, rx) = mpsc::channel();
        let handle = HashJob::new(&DigestEngine::new(), "whatever", Algorithm::Pbkdf2Hmac)
            .start(
                move |outcome: JobOutcome| {
                    let _ = tx.send(outcome);
                },
                no_progress,
            )
            .unwrap();
        assert_eq!(handle.wait(), JobState::Failed);
        let err = rx.recv().unwrap().unwrap_err();
        assert!(err.is_configuration());
    }
}
