// --- File: crates/slidelink_client/src/poller.rs ---
//! The polling state machine.
//!
//! `Idle -> Polling -> {Success, TimedOut, Failed}` plus an explicit
//! `Cancelled` terminal for a user who navigates away. The first probe goes
//! out immediately on entering `Polling`; after that probes run at a fixed
//! interval until a terminal outcome or the max-wait deadline. `NotLinked`
//! is the only outcome that keeps the loop alive.

use crate::api::{ClientError, ExchangeApi, ExchangeOutcome};
use slidelink_common::models::IssuedToken;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Timing knobs for the poller.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Gap between consecutive exchange probes.
    pub interval: Duration,
    /// Total wait before the poller gives up with `TimedOut`.
    pub max_wait: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2500),
            max_wait: Duration::from_secs(300),
        }
    }
}

/// Where the state machine currently is. Observable via
/// [`PairingPoller::subscribe`] so the pairing screen can render progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling,
    Success,
    TimedOut,
    Cancelled,
    Failed,
}

/// Why a poll run failed. None of these are worth retrying against the same
/// code; the UI offers a fresh registration instead.
#[derive(Debug, Clone)]
pub enum PollFailure {
    /// The code is unknown, expired or already redeemed.
    NotFound,
    /// The server refused the request (parameters or device mismatch).
    Rejected(String),
    /// The transport broke underneath us.
    Transport(String),
}

/// Final result of one poll run.
#[derive(Debug)]
pub enum PollOutcome {
    Success(IssuedToken),
    TimedOut,
    Cancelled,
    Failed(PollFailure),
}

/// Handle the caller keeps to abort a running poll.
#[derive(Debug, Clone)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    /// Stop the poll. Idempotent; safe to call after the poll finished.
    pub fn cancel(&self) {
        let _ = self.0.send(true);
    }
}

/// Create a cancellation pair for [`PairingPoller::run`].
pub fn cancel_pair() -> (CancelHandle, watch::Receiver<bool>) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(tx), rx)
}

/// Polls the exchange endpoint until the pairing resolves.
pub struct PairingPoller {
    api: Arc<dyn ExchangeApi>,
    config: PollConfig,
    state: watch::Sender<PollState>,
}

impl PairingPoller {
    pub fn new(api: Arc<dyn ExchangeApi>, config: PollConfig) -> Self {
        let (state, _) = watch::channel(PollState::Idle);
        Self { api, config, state }
    }

    /// Observe state transitions, e.g. to drive the pairing screen.
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.subscribe()
    }

    fn set_state(&self, state: PollState) {
        let _ = self.state.send(state);
    }

    fn finish(&self, outcome: PollOutcome) -> PollOutcome {
        self.set_state(match &outcome {
            PollOutcome::Success(_) => PollState::Success,
            PollOutcome::TimedOut => PollState::TimedOut,
            PollOutcome::Cancelled => PollState::Cancelled,
            PollOutcome::Failed(_) => PollState::Failed,
        });
        outcome
    }

    /// Run the poll loop to completion.
    ///
    /// Returns as soon as the exchange succeeds, turns terminal, the
    /// max-wait deadline passes, or `cancel` fires. After return no further
    /// network calls are made.
    pub async fn run(
        &self,
        device_id: &str,
        code: &str,
        mut cancel: watch::Receiver<bool>,
    ) -> PollOutcome {
        let deadline = Instant::now() + self.config.max_wait;
        self.set_state(PollState::Polling);

        loop {
            if *cancel.borrow() {
                debug!("Pairing poll cancelled before probe");
                return self.finish(PollOutcome::Cancelled);
            }

            match self.api.exchange(device_id, code).await {
                Ok(ExchangeOutcome::Issued(token)) => {
                    info!("Pairing complete, token received");
                    return self.finish(PollOutcome::Success(token));
                }
                Ok(ExchangeOutcome::NotLinked) => {
                    debug!("Code not linked yet, continuing to poll");
                }
                Ok(ExchangeOutcome::NotFound) => {
                    warn!("Pairing code no longer exists, giving up");
                    return self.finish(PollOutcome::Failed(PollFailure::NotFound));
                }
                Ok(ExchangeOutcome::Rejected(message)) => {
                    warn!("Exchange rejected: {}", message);
                    return self.finish(PollOutcome::Failed(PollFailure::Rejected(message)));
                }
                Err(err) => {
                    warn!("Exchange transport failed: {}", err);
                    return self.finish(PollOutcome::Failed(transport_failure(err)));
                }
            }

            let next_probe = Instant::now() + self.config.interval;
            tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => {
                    debug!("Pairing poll cancelled while waiting");
                    return self.finish(PollOutcome::Cancelled);
                }
                _ = tokio::time::sleep_until(deadline) => {
                    info!("Pairing poll exceeded max wait, timing out");
                    return self.finish(PollOutcome::TimedOut);
                }
                _ = tokio::time::sleep_until(next_probe) => {}
            }
        }
    }
}

fn transport_failure(err: ClientError) -> PollFailure {
    PollFailure::Transport(err.to_string())
}

/// Resolves when cancellation is signalled. If the handle is dropped
/// without cancelling, pends forever so the poll keeps running.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
