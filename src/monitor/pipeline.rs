//! Monitoring through an access proxy.

use crate::error::PropmanResult;
use crate::machine::{MachineState, MachineStep, PropositionalMachine};
use crate::multi_event::MultiEvent;

use super::count::VerdictCount;
use super::lifting::{MonitorConfig, MultiMonitor};

/// A monitor observing a system through an access proxy.
///
/// The proxy is an ordinary propositional machine run on single events. Its
/// outputs, typically made coarser by blurring or merging variables the
/// observer may not see, are fed to a lifted monitor.
#[derive(Debug)]
pub struct AccessControlledMonitor<P = u32, S = u32> {
    proxy: PropositionalMachine<P>,
    monitor: MultiMonitor<S>,
}

impl<P: MachineState, S: MachineState> AccessControlledMonitor<P, S> {
    /// Creates a pipeline with the default monitor configuration.
    pub fn new(proxy: PropositionalMachine<P>, monitor: PropositionalMachine<S>) -> PropmanResult<Self> {
        Self::with_config(proxy, monitor, MonitorConfig::default())
    }

    /// Creates a pipeline; `config` applies to the lifted monitor.
    pub fn with_config(
        proxy: PropositionalMachine<P>,
        monitor: PropositionalMachine<S>,
        config: MonitorConfig,
    ) -> PropmanResult<Self> {
        Ok(Self {
            proxy,
            monitor: MultiMonitor::with_config(monitor, config)?,
        })
    }

    /// The access proxy.
    #[must_use]
    pub const fn proxy(&self) -> &PropositionalMachine<P> {
        &self.proxy
    }

    /// The lifted monitor.
    #[must_use]
    pub const fn monitor(&self) -> &MultiMonitor<S> {
        &self.monitor
    }

    /// Mutable access to the lifted monitor, e.g. to subscribe.
    pub fn monitor_mut(&mut self) -> &mut MultiMonitor<S> {
        &mut self.monitor
    }

    /// Runs the proxy on `event` and the monitor on the proxy's output.
    ///
    /// Returns `Ok(None)` when the proxy is stuck, emits nothing, or the
    /// monitor step is silent.
    pub fn push(&mut self, event: &MultiEvent) -> PropmanResult<Option<VerdictCount>> {
        match self.proxy.compute(event) {
            MachineStep::Moved {
                output: Some(observed),
                ..
            } => self.monitor.push(&observed),
            MachineStep::Moved { output: None, .. } => Ok(None),
            MachineStep::Stuck => {
                tracing::debug!(state = ?self.proxy.current_state(), "access proxy stuck");
                Ok(None)
            }
        }
    }

    /// Resets both the proxy and the monitor.
    pub fn reset(&mut self) {
        self.proxy.reset();
        self.monitor.reset();
    }
}
