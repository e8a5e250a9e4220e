//! # propman - Monitoring under partial observability
//!
//! `propman` evaluates propositional machines over traces in which each
//! step is only known up to a set of candidate valuations, a *multi-event*.
//! Variables take three-valued (Kleene) values, and the monitor reports,
//! after each step, how many of the single-event traces compatible with
//! the input yield each verdict.
//!
//! ## Core Concepts
//!
//! - **Troolean**: true, false or inconclusive
//! - **Valuation**: an assignment of trooleans to named variables
//! - **Formula**: a propositional formula evaluated under Kleene logic
//! - **MultiEvent**: an explicit or formula-defined set of valuations
//! - **PropositionalMachine**: a deterministic automaton over multi-events
//! - **MultiMonitor**: path counting over all compatible traces at once
//!
//! ## Usage
//!
//! ```rust
//! use propman::{MachineBuilder, MultiEventFactory, MultiEventFunction, MultiMonitor};
//!
//! let factory = MultiEventFactory::new(["a", "b"]);
//! let machine = MachineBuilder::new()
//!     .when(0, factory.read_from_valuations("TF"), MultiEventFunction::epsilon(), 1)
//!     .when(0, factory.read_from_valuations("FT"), MultiEventFunction::epsilon(), 2)
//!     .otherwise(0, MultiEventFunction::epsilon(), 0)
//!     .otherwise(1, MultiEventFunction::nu(), 1)
//!     .otherwise(2, MultiEventFunction::empty(), 2)
//!     .build()?;
//!
//! let mut monitor = MultiMonitor::new(machine)?;
//! monitor.push(&factory.read_from_valuations("TF,FT"))?;
//! let verdicts = monitor.push(&factory.read_from_valuations("TF"))?;
//! assert_eq!(verdicts.map(|v| v.to_string()).as_deref(), Some("{T=1,F=1,?=0}"));
//! # Ok::<(), propman::PropmanError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Logic and events
pub mod error;
pub mod formula;
pub mod multi_event;
pub mod troolean;
pub mod valuation;

// Machines and monitoring
pub mod factory;
pub mod function;
pub mod machine;
pub mod monitor;
pub mod wire;

// Re-export primary types at crate root for convenience
pub use error::{ExecutionError, PropmanError, PropmanResult, ValidationError};
pub use factory::MultiEventFactory;
pub use formula::Formula;
pub use function::MultiEventFunction;
pub use machine::{Guard, MachineBuilder, MachineState, MachineStep, PropositionalMachine, Transition};
pub use monitor::{
    entropy, AccessControlledMonitor, MonitorConfig, MultiMonitor, PathCount, StepReport,
    SubscriptionId, VerdictCount, VerdictStream,
};
pub use multi_event::MultiEvent;
pub use troolean::Troolean;
pub use valuation::{Valuation, ValuationIterator};
