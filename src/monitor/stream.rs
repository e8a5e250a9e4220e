//! Verdict subscriptions.
//!
//! Each subscriber owns a bounded channel fed with a [`StepReport`] per
//! non-silent step.

use std::fmt;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ExecutionError, PropmanError, PropmanResult};

use super::count::{decimal, VerdictCount};

/// Identifier of a verdict subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new random subscription id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a subscriber receives after each non-silent monitoring step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// One-based index of the step since construction or the last reset.
    pub step: u64,
    /// Verdict counts of the step.
    pub verdicts: VerdictCount,
    /// Paths alive after the step, summed over all states.
    #[serde(with = "decimal")]
    pub live_paths: BigUint,
}

/// Receiving end of a verdict subscription.
///
/// Dropping the stream unsubscribes: the monitor prunes it on its next
/// non-silent step.
#[derive(Debug)]
pub struct VerdictStream {
    subscription_id: SubscriptionId,
    rx: Receiver<StepReport>,
}

impl VerdictStream {
    pub(crate) const fn new(subscription_id: SubscriptionId, rx: Receiver<StepReport>) -> Self {
        Self {
            subscription_id,
            rx,
        }
    }

    /// The subscription id backing this stream.
    #[must_use]
    pub const fn subscription_id(&self) -> SubscriptionId {
        self.subscription_id
    }

    /// Receive the next report (blocking).
    pub fn recv(&self) -> PropmanResult<StepReport> {
        self.rx.recv().map_err(|_| disconnected())
    }

    /// Receive a report if one is queued.
    pub fn try_recv(&self) -> PropmanResult<Option<StepReport>> {
        match self.rx.try_recv() {
            Ok(report) => Ok(Some(report)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(disconnected()),
        }
    }

    /// Receive the next report with a timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> PropmanResult<StepReport> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => PropmanError::Execution(ExecutionError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
            RecvTimeoutError::Disconnected => disconnected(),
        })
    }

    /// Reports queued and not yet received.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

fn disconnected() -> PropmanError {
    PropmanError::Execution(ExecutionError::Disconnected {
        path: "verdict_stream".to_string(),
    })
}
