//! Wait engine - polls one operation until it reaches a target status
//!
//! The engine applies `delay` once before the first poll, then polls at a fixed
//! `min_poll_interval` cadence. The timeout is measured from the start of the
//! wait, and it also bounds the initial delay and any poll still in flight.

use std::future::Future;

use log::{debug, warn};
use tokio::time::{Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::error::WaitError;
use crate::poller::{PollResult, Poller};
use crate::spec::{StatusClass, WaitSpec};

/// Where an engine is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Pending,
    Target,
    Failed,
    TimedOut,
    Cancelled,
}

impl WaitState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WaitState::Pending)
    }
}

enum Race<T> {
    Done(T),
    Deadline,
    Cancelled,
}

/// `None` means the timeout is too large to represent, so the wait has no deadline
async fn race<F: Future>(
    fut: F,
    deadline: Option<Instant>,
    cancel: &CancellationToken,
) -> Race<F::Output> {
    let expired = async {
        match deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Race::Cancelled,
        _ = expired => Race::Deadline,
        out = fut => Race::Done(out),
    }
}

/// Polling state machine for a single wait
///
/// Created per wait and dropped afterwards. Independent engines share nothing,
/// so any number can run concurrently.
pub struct WaitEngine<'a, P: Poller> {
    poller: &'a P,
    spec: &'a WaitSpec,
    activity: String,
    cancel: CancellationToken,
    state: WaitState,
    last_status: String,
    polls: u32,
}

impl<'a, P: Poller> WaitEngine<'a, P> {
    /// `activity` only appears in error messages (e.g. "Creating Network")
    pub fn new(poller: &'a P, spec: &'a WaitSpec, activity: impl Into<String>) -> Self {
        Self {
            poller,
            spec,
            activity: activity.into(),
            cancel: CancellationToken::new(),
            state: WaitState::Pending,
            last_status: String::new(),
            polls: 0,
        }
    }

    /// Abort the wait when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn state(&self) -> WaitState {
        self.state
    }

    /// Number of completed polls
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Last status seen, empty if the operation was never visible
    pub fn last_status(&self) -> &str {
        &self.last_status
    }

    /// Poll until the operation reaches a target status
    ///
    /// On success the last fetched result is returned as is. A target status
    /// does not mean the vendor mutation succeeded: check `terminal_error`, or
    /// use [`wait_for_operation`] which does it for you.
    pub async fn wait_for_state(&mut self) -> Result<PollResult<P::Operation>, WaitError> {
        if let Err(e) = self.spec.validate() {
            self.state = WaitState::Failed;
            return Err(e.into());
        }

        let deadline = Instant::now().checked_add(self.spec.timeout);
        let cancel = self.cancel.clone();
        let poller = self.poller;

        if !self.spec.delay.is_zero() {
            debug!(
                "Waiting {:?} before polling for {}",
                self.spec.delay, self.activity
            );
            self.pause(sleep(self.spec.delay), deadline, &cancel).await?;
        }

        loop {
            if cancel.is_cancelled() {
                return Err(self.cancelled());
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(self.timed_out());
            }

            let polled = match race(poller.poll(), deadline, &cancel).await {
                Race::Done(polled) => polled,
                Race::Deadline => return Err(self.timed_out()),
                Race::Cancelled => return Err(self.cancelled()),
            };
            self.polls += 1;

            match polled {
                Err(source) => {
                    self.state = WaitState::Failed;
                    return Err(WaitError::Transport {
                        activity: self.activity.clone(),
                        source,
                    });
                }
                Ok(None) => {
                    debug!(
                        "Operation for {} not visible yet (poll {})",
                        self.activity, self.polls
                    );
                }
                Ok(Some(result)) => {
                    debug!(
                        "Got {:?} when waiting for {} (poll {})",
                        result.status, self.activity, self.polls
                    );
                    match self.spec.classify(&result.status) {
                        StatusClass::Target => {
                            self.state = WaitState::Target;
                            self.last_status = result.status.clone();
                            return Ok(result);
                        }
                        StatusClass::Pending => {
                            self.last_status = result.status;
                        }
                        StatusClass::Unexpected => {
                            warn!(
                                "Unexpected state {:?} while waiting for {}",
                                result.status, self.activity
                            );
                            self.state = WaitState::Failed;
                            return Err(WaitError::UnexpectedStatus {
                                activity: self.activity.clone(),
                                status: result.status,
                                target: self.spec.target_description(),
                            });
                        }
                    }
                }
            }

            self.pause(sleep(self.spec.min_poll_interval), deadline, &cancel)
                .await?;
        }
    }

    async fn pause<F: Future<Output = ()>>(
        &mut self,
        sleeping: F,
        deadline: Option<Instant>,
        cancel: &CancellationToken,
    ) -> Result<(), WaitError> {
        match race(sleeping, deadline, cancel).await {
            Race::Done(()) => Ok(()),
            Race::Deadline => Err(self.timed_out()),
            Race::Cancelled => Err(self.cancelled()),
        }
    }

    fn timed_out(&mut self) -> WaitError {
        warn!(
            "Timed out after {:?} waiting for {} (last state: {:?})",
            self.spec.timeout, self.activity, self.last_status
        );
        self.state = WaitState::TimedOut;
        WaitError::Timeout {
            activity: self.activity.clone(),
            last_status: self.last_status.clone(),
            target: self.spec.target_description(),
            timeout: self.spec.timeout,
        }
    }

    fn cancelled(&mut self) -> WaitError {
        debug!("Wait for {} cancelled", self.activity);
        self.state = WaitState::Cancelled;
        WaitError::Cancelled {
            activity: self.activity.clone(),
            last_status: self.last_status.clone(),
        }
    }
}

/// Wait for an operation and fail if its payload carries an error
pub async fn wait_for_operation<P: Poller>(
    poller: &P,
    spec: &WaitSpec,
    activity: &str,
) -> Result<P::Operation, WaitError> {
    let result = WaitEngine::new(poller, spec, activity)
        .wait_for_state()
        .await?;
    into_operation(result)
}

/// Same as [`wait_for_operation`], aborting when `token` is cancelled
pub async fn wait_for_operation_with_cancellation<P: Poller>(
    poller: &P,
    spec: &WaitSpec,
    activity: &str,
    token: CancellationToken,
) -> Result<P::Operation, WaitError> {
    let result = WaitEngine::new(poller, spec, activity)
        .with_cancellation(token)
        .wait_for_state()
        .await?;
    into_operation(result)
}

fn into_operation<T>(result: PollResult<T>) -> Result<T, WaitError> {
    match result.terminal_error {
        Some(error) => Err(WaitError::Operation(error)),
        None => Ok(result.operation),
    }
}
