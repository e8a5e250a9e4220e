//! The lifting algorithm.
//!
//! A monitoring step distributes the paths ending in each state over the
//! transitions the input event enables there, multiplying by the number of
//! candidate valuations each transition consumes. Paths with nowhere to go
//! are dropped.

use std::collections::HashSet;

use crossbeam_channel::{bounded, Sender, TrySendError};
use num_bigint::BigUint;
use tracing::{debug, trace, warn};

use crate::error::{ExecutionError, PropmanResult, ValidationError};
use crate::machine::{MachineState, PropositionalMachine};
use crate::multi_event::MultiEvent;
use crate::troolean::Troolean;
use crate::valuation::Valuation;

use super::count::{PathCount, VerdictCount};
use super::stream::{StepReport, SubscriptionId, VerdictStream};

/// Monitor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Reject machines with overlapping sibling conditions at construction.
    pub validate_determinism: bool,
    /// Largest multi-event accepted by `push`, in valuations.
    ///
    /// Symbolic events are measured by `MultiEvent::enumeration_cost`
    /// (`3^n` over their domain), so oversized inputs are rejected before
    /// any enumeration.
    pub max_input_valuations: Option<usize>,
    /// Capacity of each verdict subscription channel.
    pub stream_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            validate_determinism: true,
            max_input_valuations: None,
            stream_capacity: 1024,
        }
    }
}

/// Classifies a transition output as a verdict.
///
/// Only the distinguished total and empty events are decided; every other
/// output, including no output at all, is inconclusive.
#[must_use]
pub fn classify(output: Option<&MultiEvent>) -> Troolean {
    match output {
        Some(e) if e.is_all() => Troolean::True,
        Some(e) if e.is_nothing() => Troolean::False,
        _ => Troolean::Inconclusive,
    }
}

/// Lifts a propositional machine to traces of multi-events.
///
/// Instead of following one run, the monitor tracks how many single-event
/// traces compatible with the input end in each state, and reports how many
/// of them produced each verdict during the last step.
///
/// # Examples
///
/// ```
/// use propman::{MachineBuilder, MultiEvent, MultiEventFunction, MultiMonitor, Formula};
///
/// let machine = MachineBuilder::new()
///     .when(0, MultiEvent::symbolic(Formula::var("a")), MultiEventFunction::nu(), 0)
///     .otherwise(0, MultiEventFunction::empty(), 0)
///     .build()
///     .unwrap();
/// let mut monitor = MultiMonitor::new(machine).unwrap();
///
/// let factory = propman::MultiEventFactory::new(["a"]);
/// let verdicts = monitor.push(&factory.read_from_valuations("T,F,?")).unwrap().unwrap();
/// assert_eq!(verdicts.to_string(), "{T=1,F=2,?=0}");
/// ```
#[derive(Debug)]
pub struct MultiMonitor<S = u32> {
    machine: PropositionalMachine<S>,
    initial: S,
    config: MonitorConfig,
    sigma: PathCount<S>,
    verdicts: VerdictCount,
    step: u64,
    subscribers: Vec<(SubscriptionId, Sender<StepReport>)>,
    dropped_reports: u64,
}

impl<S: MachineState> MultiMonitor<S> {
    /// Creates a monitor with the default configuration.
    pub fn new(machine: PropositionalMachine<S>) -> PropmanResult<Self> {
        Self::with_config(machine, MonitorConfig::default())
    }

    /// Creates a monitor; the machine must have an initial state.
    pub fn with_config(machine: PropositionalMachine<S>, config: MonitorConfig) -> PropmanResult<Self> {
        let initial = machine
            .initial_state()
            .cloned()
            .ok_or(ValidationError::MissingInitialState)?;
        if config.validate_determinism {
            machine.validate_determinism()?;
        }
        Ok(Self {
            sigma: PathCount::single(initial.clone()),
            machine,
            initial,
            config,
            verdicts: VerdictCount::new(),
            step: 0,
            subscribers: Vec::new(),
            dropped_reports: 0,
        })
    }

    /// The lifted machine.
    #[must_use]
    pub const fn machine(&self) -> &PropositionalMachine<S> {
        &self.machine
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Paths currently ending in each state.
    #[must_use]
    pub const fn sigma(&self) -> &PathCount<S> {
        &self.sigma
    }

    /// Verdict counts of the last step; empty after a silent step.
    #[must_use]
    pub const fn verdicts(&self) -> &VerdictCount {
        &self.verdicts
    }

    /// Number of non-silent steps since construction or the last reset.
    #[must_use]
    pub const fn step(&self) -> u64 {
        self.step
    }

    /// Restores a single path in the initial state and clears the verdicts.
    pub fn reset(&mut self) {
        self.sigma = PathCount::single(self.initial.clone());
        self.verdicts = VerdictCount::new();
        self.step = 0;
    }

    /// Processes one multi-event.
    ///
    /// Returns `Ok(None)` when no transition fired anywhere. Such a step
    /// still runs to completion: every path is at a dead end, so the path
    /// counts and verdicts become empty. An input rejected by
    /// `max_input_valuations` leaves the monitor untouched.
    pub fn push(&mut self, event: &MultiEvent) -> PropmanResult<Option<VerdictCount>> {
        if let Some(limit) = self.config.max_input_valuations {
            let cost = event.enumeration_cost();
            if cost > limit {
                return Err(ExecutionError::InputTooLarge {
                    valuations: cost,
                    limit,
                }
                .into());
            }
        }
        let input = event.valuations();

        let mut next = PathCount::new();
        let mut beta = VerdictCount::new();
        let mut fired = false;
        // Intersections are shared by equal conditions across states.
        let mut common_cache: Vec<(&MultiEvent, HashSet<Valuation>)> = Vec::new();

        for (state, count) in self.sigma.iter() {
            let mut remaining = input.clone();
            let mut otherwise = None;

            for t in self.machine.transitions_for(state) {
                let Some(condition) = t.condition() else {
                    otherwise = Some(t);
                    continue;
                };
                let idx = match common_cache.iter().position(|(c, _)| *c == condition) {
                    Some(idx) => idx,
                    None => {
                        common_cache.push((condition, event.intersection(condition)));
                        common_cache.len() - 1
                    }
                };
                let common = &common_cache[idx].1;
                if common.is_empty() {
                    continue;
                }
                let paths = count * BigUint::from(common.len());
                remaining.retain(|v| !common.contains(v));
                let verdict = classify(t.function().apply(event).as_ref());
                trace!(from = ?state, to = ?t.destination(), %paths, ?verdict, "transition fired");
                next.increment(t.destination(), &paths);
                beta.increment(verdict, &paths);
                fired = true;
            }

            if let Some(t) = otherwise {
                if !remaining.is_empty() {
                    let paths = count * BigUint::from(remaining.len());
                    let verdict = classify(t.function().apply(event).as_ref());
                    trace!(from = ?state, to = ?t.destination(), %paths, ?verdict, "otherwise fired");
                    next.increment(t.destination(), &paths);
                    beta.increment(verdict, &paths);
                    fired = true;
                }
            }
        }

        self.sigma = next;
        self.verdicts = beta.clone();

        if !fired {
            debug!(step = self.step, valuations = input.len(), "silent step, all paths dropped");
            return Ok(None);
        }

        self.step += 1;
        debug!(step = self.step, valuations = input.len(), verdicts = %beta, "monitor step");
        self.publish(&beta);
        Ok(Some(beta))
    }

    /// Opens a verdict stream receiving a report after every non-silent step.
    pub fn subscribe(&mut self) -> VerdictStream {
        let id = SubscriptionId::new();
        let (tx, rx) = bounded(self.config.stream_capacity);
        self.subscribers.push((id, tx));
        VerdictStream::new(id, rx)
    }

    /// Live verdict subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Reports dropped because a subscriber's channel was full.
    #[must_use]
    pub const fn dropped_reports(&self) -> u64 {
        self.dropped_reports
    }

    fn publish(&mut self, verdicts: &VerdictCount) {
        if self.subscribers.is_empty() {
            return;
        }
        let report = StepReport {
            step: self.step,
            verdicts: verdicts.clone(),
            live_paths: self.sigma.total(),
        };
        let mut dropped = 0;
        self.subscribers.retain(|(id, tx)| match tx.try_send(report.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(subscription = %id, step = report.step, "verdict subscriber lagging, report dropped");
                dropped += 1;
                true
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!(subscription = %id, "verdict subscriber gone");
                false
            }
        });
        self.dropped_reports += dropped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::factory::MultiEventFactory;
    use crate::formula::Formula;
    use crate::function::MultiEventFunction;
    use crate::machine::MachineBuilder;

    fn machine() -> PropositionalMachine {
        let factory = MultiEventFactory::new(["a", "b"]);
        MachineBuilder::new()
            .when(0, factory.read_from_valuations("TF"), MultiEventFunction::epsilon(), 1)
            .when(0, factory.read_from_valuations("FT"), MultiEventFunction::epsilon(), 2)
            .otherwise(0, MultiEventFunction::epsilon(), 0)
            .otherwise(1, MultiEventFunction::nu(), 1)
            .otherwise(2, MultiEventFunction::empty(), 2)
            .build()
            .unwrap()
    }

    fn push(monitor: &mut MultiMonitor, text: &str) -> Option<VerdictCount> {
        let factory = MultiEventFactory::new(["a", "b"]);
        monitor.push(&factory.read_from_valuations(text)).unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(Some(&MultiEvent::all())), Troolean::True);
        assert_eq!(classify(Some(&MultiEvent::nothing())), Troolean::False);
        assert_eq!(classify(None), Troolean::Inconclusive);
        assert_eq!(
            classify(Some(&MultiEvent::symbolic(Formula::var("a")))),
            Troolean::Inconclusive
        );
    }

    #[test]
    fn test_single_valuation_steps() {
        let mut monitor = MultiMonitor::new(machine()).unwrap();
        assert_eq!(push(&mut monitor, "TF"), Some(VerdictCount::from_counts(0, 0, 1)));
        assert_eq!(monitor.sigma().get(&1), BigUint::from(1u32));
        assert_eq!(push(&mut monitor, "TF"), Some(VerdictCount::from_counts(1, 0, 0)));
        assert_eq!(monitor.step(), 2);
    }

    #[test]
    fn test_remaining_is_reset_per_state() {
        let mut monitor = MultiMonitor::new(machine()).unwrap();
        assert_eq!(push(&mut monitor, "TF,FF"), Some(VerdictCount::from_counts(0, 0, 2)));
        assert_eq!(push(&mut monitor, "TF,FT"), Some(VerdictCount::from_counts(2, 0, 2)));
        assert_eq!(monitor.sigma().total(), BigUint::from(4u32));
    }

    #[test]
    fn test_silent_step_drops_stuck_paths() {
        let stuck = MachineBuilder::new()
            .when(0, MultiEvent::symbolic(Formula::var("a")), MultiEventFunction::nu(), 0)
            .build()
            .unwrap();
        let mut monitor = MultiMonitor::new(stuck).unwrap();
        let factory = MultiEventFactory::new(["a"]);
        assert_eq!(monitor.push(&factory.read_from_valuations("F")).unwrap(), None);
        assert_eq!(monitor.step(), 0);
        assert_eq!(monitor.sigma().total(), BigUint::from(0u32));
        assert!(monitor.sigma().is_empty());

        // The dead path does not come back on an input it would have accepted.
        assert_eq!(monitor.push(&factory.read_from_valuations("T")).unwrap(), None);
        assert!(monitor.verdicts().is_zero());
    }

    #[test]
    fn test_silent_step_clears_previous_verdicts() {
        let machine = MachineBuilder::new()
            .when(0, MultiEvent::symbolic(Formula::var("a")), MultiEventFunction::nu(), 1)
            .build()
            .unwrap();
        let mut monitor = MultiMonitor::new(machine).unwrap();
        let factory = MultiEventFactory::new(["a"]);
        let t = factory.read_from_valuations("T");

        assert_eq!(monitor.push(&t).unwrap(), Some(VerdictCount::from_counts(1, 0, 0)));
        assert_eq!(monitor.verdicts(), &VerdictCount::from_counts(1, 0, 0));
        // State 1 has no transitions at all.
        assert_eq!(monitor.push(&t).unwrap(), None);
        assert!(monitor.verdicts().is_zero());
        assert!(monitor.sigma().is_empty());
        assert_eq!(monitor.step(), 1);

        monitor.reset();
        assert_eq!(monitor.push(&t).unwrap(), Some(VerdictCount::from_counts(1, 0, 0)));
    }

    #[test]
    fn test_input_limit_checked_before_enumeration() {
        let config = MonitorConfig {
            max_input_valuations: Some(1000),
            ..MonitorConfig::default()
        };
        let mut monitor = MultiMonitor::with_config(machine(), config).unwrap();
        // 3^30 candidate valuations; enumerating them would not finish.
        let wide = Formula::and((0..30).map(|i| Formula::var(format!("x{i}"))));
        let err = monitor.push(&MultiEvent::symbolic(wide)).unwrap_err();
        assert!(matches!(
            err,
            crate::error::PropmanError::Execution(ExecutionError::InputTooLarge { limit: 1000, .. })
        ));
        assert_eq!(monitor.sigma(), &PathCount::single(0));

        let narrow = MultiEvent::symbolic(Formula::var("a"));
        assert!(monitor.push(&narrow).is_ok());
    }

    #[test]
    fn test_shared_condition_across_states() {
        let a = MultiEvent::symbolic(Formula::var("a"));
        let machine = MachineBuilder::new()
            .when(0, a.clone(), MultiEventFunction::epsilon(), 1)
            .otherwise(0, MultiEventFunction::epsilon(), 2)
            .when(1, a.clone(), MultiEventFunction::nu(), 1)
            .otherwise(1, MultiEventFunction::empty(), 1)
            .when(2, a, MultiEventFunction::nu(), 2)
            .otherwise(2, MultiEventFunction::empty(), 2)
            .build()
            .unwrap();
        let mut monitor = MultiMonitor::new(machine).unwrap();
        let factory = MultiEventFactory::new(["a"]);

        let e = factory.read_from_valuations("T,F");
        assert_eq!(monitor.push(&e).unwrap(), Some(VerdictCount::from_counts(0, 0, 2)));
        assert_eq!(monitor.push(&e).unwrap(), Some(VerdictCount::from_counts(2, 2, 0)));
        assert_eq!(monitor.sigma().get(&1), BigUint::from(2u32));
        assert_eq!(monitor.sigma().get(&2), BigUint::from(2u32));
    }

    #[test]
    fn test_input_limit() {
        let config = MonitorConfig {
            max_input_valuations: Some(1),
            ..MonitorConfig::default()
        };
        let mut monitor = MultiMonitor::with_config(machine(), config).unwrap();
        let factory = MultiEventFactory::new(["a", "b"]);
        let err = monitor.push(&factory.read_from_valuations("TF,FT")).unwrap_err();
        assert!(err.is_execution());
        assert_eq!(monitor.sigma().get(&0), BigUint::from(1u32));
    }

    #[test]
    fn test_rejects_nondeterministic_machine() {
        let overlapping = MachineBuilder::new()
            .when(0, MultiEvent::symbolic(Formula::var("a")), MultiEventFunction::nu(), 0)
            .when(0, MultiEvent::all(), MultiEventFunction::empty(), 0)
            .build()
            .unwrap();
        assert!(MultiMonitor::new(overlapping.clone()).unwrap_err().is_validation());

        let config = MonitorConfig {
            validate_determinism: false,
            ..MonitorConfig::default()
        };
        assert!(MultiMonitor::with_config(overlapping, config).is_ok());
    }

    #[test]
    fn test_reset() {
        let mut monitor = MultiMonitor::new(machine()).unwrap();
        push(&mut monitor, "TF,FT");
        monitor.reset();
        assert_eq!(monitor.sigma(), &PathCount::single(0));
        assert!(monitor.verdicts().is_zero());
        assert_eq!(monitor.step(), 0);
    }

    #[test]
    fn test_subscribers_receive_reports() {
        let config = MonitorConfig {
            stream_capacity: 1,
            ..MonitorConfig::default()
        };
        let mut monitor = MultiMonitor::with_config(machine(), config).unwrap();
        let stream = monitor.subscribe();
        let gone = monitor.subscribe();
        drop(gone);

        push(&mut monitor, "TF,FT");
        assert_eq!(monitor.subscriber_count(), 1);
        push(&mut monitor, "TF");
        assert_eq!(monitor.dropped_reports(), 1);

        let report = stream.try_recv().unwrap().unwrap();
        assert_eq!(report.step, 1);
        assert_eq!(report.verdicts, VerdictCount::from_counts(0, 0, 2));
        assert_eq!(report.live_paths, BigUint::from(2u32));
        assert_eq!(stream.try_recv().unwrap(), None);
    }
}
