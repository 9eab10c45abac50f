//! Bounded callback dispatch queue.
//!
//! Webhook handlers must acknowledge well inside the provider's timeout
//! budget, so processing runs off the request path. Instead of detaching
//! anonymous tasks from inside handlers, every parsed callback is submitted
//! to this queue and consumed by one dispatcher task with an explicit
//! lifecycle: started in `main`, drained on shutdown, each job's failure
//! logged with its task id.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use songforge_provider::{CoverCallback, MusicCallback};

use super::{cover_stage, music_stage, CallbackContext};

/// A parsed webhook body awaiting processing.
#[derive(Debug)]
pub enum CallbackJob {
    Music(MusicCallback),
    Cover(CoverCallback),
}

/// Error type for queue submission failures (fast-path visible).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The queue is at capacity; the caller should surface a 500 so the
    /// provider redelivers later.
    #[error("Callback queue is full")]
    QueueFull,

    /// The dispatcher has shut down.
    #[error("Callback dispatcher is not running")]
    Closed,
}

/// Cloneable submission handle held in `AppState`.
#[derive(Clone)]
pub struct CallbackSender {
    tx: mpsc::Sender<CallbackJob>,
}

impl CallbackSender {
    /// Submit a job without waiting. Fails fast when the queue is full so
    /// the webhook response is never delayed by backpressure.
    pub fn enqueue(&self, job: CallbackJob) -> Result<(), DispatchError> {
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DispatchError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DispatchError::Closed,
        })
    }
}

/// The consuming side: one long-running task owning the stage processors.
pub struct CallbackDispatcher;

impl CallbackDispatcher {
    /// Spawn the dispatcher task.
    ///
    /// Returns the submission handle and the join handle. Cancellation
    /// stops intake and drains whatever is already queued before exiting.
    pub fn start(
        ctx: CallbackContext,
        capacity: usize,
        cancel: CancellationToken,
    ) -> (CallbackSender, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<CallbackJob>(capacity);

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        rx.close();
                        while let Some(job) = rx.recv().await {
                            Self::process(&ctx, job).await;
                        }
                        break;
                    }
                    maybe_job = rx.recv() => match maybe_job {
                        Some(job) => Self::process(&ctx, job).await,
                        None => break,
                    },
                }
            }
            tracing::info!("Callback dispatcher stopped");
        });

        (CallbackSender { tx }, handle)
    }

    /// Run one job through its stage processor, logging any escalated error.
    async fn process(ctx: &CallbackContext, job: CallbackJob) {
        match job {
            CallbackJob::Music(callback) => {
                let task_id = callback.data.task_id.clone().unwrap_or_default();
                if let Err(e) = music_stage::process(ctx, callback).await {
                    tracing::error!(task_id, error = %e, "Music callback processing failed");
                }
            }
            CallbackJob::Cover(callback) => {
                let task_id = callback.data.task_id.clone().unwrap_or_default();
                if let Err(e) = cover_stage::process(ctx, callback).await {
                    tracing::error!(task_id, error = %e, "Cover callback processing failed");
                }
            }
        }
    }
}
