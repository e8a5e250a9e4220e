//! Lifted monitoring of multi-event traces.
//!
//! A [`MultiMonitor`] runs a propositional machine over every single-event
//! trace compatible with a stream of multi-events at once, counting paths
//! per state instead of enumerating them. Counts are unbounded integers.
//! Verdicts can also be consumed as a stream of [`StepReport`]s, and an
//! [`AccessControlledMonitor`] places an access proxy in front of the
//! monitor.

/// Path and verdict counters.
pub mod count;
/// Entropy of a verdict distribution.
pub mod entropy;
/// The lifting algorithm.
pub mod lifting;
/// Proxy-then-monitor composition.
pub mod pipeline;
/// Subscriber stream handle.
pub mod stream;

pub use count::{PathCount, VerdictCount};
pub use entropy::entropy;
pub use lifting::{classify, MonitorConfig, MultiMonitor};
pub use pipeline::AccessControlledMonitor;
pub use stream::{StepReport, SubscriptionId, VerdictStream};
