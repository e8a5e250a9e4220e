//! Propositional machines: deterministic automata over multi-events.
//!
//! Each transition is guarded either by a multi-event condition or by the
//! "otherwise" wildcard, and is labelled with a `MultiEventFunction`
//! producing the machine's output. When the machine drives a single trace,
//! the first ordinary transition whose condition intersects the input is
//! taken, falling back to the otherwise transition.
//!
//! Determinism (no input valuation fires two ordinary transitions of the
//! same state) is a precondition. `compute` does not check it;
//! [`PropositionalMachine::validate_determinism`] does.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::{PropmanResult, ValidationError};
use crate::function::MultiEventFunction;
use crate::multi_event::MultiEvent;

/// Bounds required of machine state identifiers.
pub trait MachineState: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> MachineState for T {}

/// What must hold for a transition to fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "condition", rename_all = "snake_case")]
pub enum Guard {
    /// Fires on inputs intersecting the condition.
    When(MultiEvent),
    /// Fires on inputs no ordinary transition of the state accepts.
    Otherwise,
}

/// A transition of a propositional machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition<S> {
    guard: Guard,
    function: MultiEventFunction,
    destination: S,
}

impl<S> Transition<S> {
    /// An ordinary transition guarded by `condition`.
    #[must_use]
    pub const fn new(destination: S, condition: MultiEvent, function: MultiEventFunction) -> Self {
        Self {
            guard: Guard::When(condition),
            function,
            destination,
        }
    }

    /// The wildcard transition taken when no ordinary transition matches.
    #[must_use]
    pub const fn otherwise(destination: S, function: MultiEventFunction) -> Self {
        Self {
            guard: Guard::Otherwise,
            function,
            destination,
        }
    }

    /// The guard of this transition.
    #[must_use]
    pub const fn guard(&self) -> &Guard {
        &self.guard
    }

    /// The condition of an ordinary transition; `None` for otherwise.
    #[must_use]
    pub const fn condition(&self) -> Option<&MultiEvent> {
        match &self.guard {
            Guard::When(c) => Some(c),
            Guard::Otherwise => None,
        }
    }

    /// Returns true for the otherwise transition.
    #[must_use]
    pub const fn is_otherwise(&self) -> bool {
        matches!(self.guard, Guard::Otherwise)
    }

    /// The function producing the transition's output.
    #[must_use]
    pub const fn function(&self) -> &MultiEventFunction {
        &self.function
    }

    /// The target state.
    #[must_use]
    pub const fn destination(&self) -> &S {
        &self.destination
    }
}

impl<S: fmt::Debug> fmt::Display for Transition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.guard {
            Guard::When(c) => write!(f, "{c}")?,
            Guard::Otherwise => write!(f, "*")?,
        }
        write!(f, " / {} -> {:?}", self.function, self.destination)
    }
}

/// Outcome of driving the machine with one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineStep<S> {
    /// No transition matched; the state is unchanged.
    Stuck,
    /// A transition was taken. `output` is `None` when the machine emits
    /// nothing for this step.
    Moved {
        destination: S,
        output: Option<MultiEvent>,
    },
}

/// A propositional machine with an explicitly stored transition relation.
#[derive(Debug, Clone)]
pub struct PropositionalMachine<S = u32> {
    initial: Option<S>,
    current: Option<S>,
    delta: HashMap<S, Vec<Transition<S>>>,
}

impl<S> Default for PropositionalMachine<S> {
    fn default() -> Self {
        Self {
            initial: None,
            current: None,
            delta: HashMap::new(),
        }
    }
}

impl<S: MachineState> PropositionalMachine<S> {
    /// Creates an empty machine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a builder.
    #[must_use]
    pub fn builder() -> MachineBuilder<S> {
        MachineBuilder::new()
    }

    /// Adds a transition from `source`.
    ///
    /// The first call fixes the initial state unless one was set already.
    /// A second otherwise transition on the same state is rejected.
    pub fn add_transition(
        &mut self,
        source: S,
        transition: Transition<S>,
    ) -> Result<&mut Self, ValidationError> {
        let outgoing = self.delta.entry(source.clone()).or_default();
        if transition.is_otherwise() && outgoing.iter().any(Transition::is_otherwise) {
            return Err(ValidationError::DuplicateOtherwise {
                state: format!("{source:?}"),
            });
        }
        outgoing.push(transition);
        if self.initial.is_none() {
            self.initial = Some(source.clone());
            self.current = Some(source);
        }
        Ok(self)
    }

    /// Overrides the initial state and moves the machine there.
    pub fn set_initial_state(&mut self, state: S) -> &mut Self {
        self.initial = Some(state.clone());
        self.current = Some(state);
        self
    }

    /// State the machine starts in, fixed by the first transition added.
    #[must_use]
    pub const fn initial_state(&self) -> Option<&S> {
        self.initial.as_ref()
    }

    /// State reached by the last `compute`.
    #[must_use]
    pub const fn current_state(&self) -> Option<&S> {
        self.current.as_ref()
    }

    /// Outgoing transitions of a state; empty for unknown states.
    #[must_use]
    pub fn transitions_for(&self, state: &S) -> &[Transition<S>] {
        self.delta.get(state).map_or(&[], Vec::as_slice)
    }

    /// States with at least one outgoing transition.
    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.delta.keys()
    }

    /// Number of states with outgoing transitions.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.delta.len()
    }

    /// Total number of transitions.
    #[must_use]
    pub fn transition_count(&self) -> usize {
        self.delta.values().map(Vec::len).sum()
    }

    /// Moves the machine back to its initial state.
    pub fn reset(&mut self) {
        self.current = self.initial.clone();
    }

    /// Drives the machine with one input event.
    pub fn compute(&mut self, input: &MultiEvent) -> MachineStep<S> {
        let Some(state) = self.current.as_ref() else {
            return MachineStep::Stuck;
        };
        let transitions = self.transitions_for(state);
        let taken = transitions
            .iter()
            .find(|t| t.condition().is_some_and(|c| input.intersects(c)))
            .or_else(|| transitions.iter().find(|t| t.is_otherwise()));
        let Some(t) = taken else {
            return MachineStep::Stuck;
        };

        let output = t.function.apply(input);
        let destination = t.destination.clone();
        tracing::trace!(from = ?state, to = ?destination, "machine transition");
        self.current = Some(destination.clone());
        MachineStep::Moved {
            destination,
            output,
        }
    }

    /// Checks that no two ordinary transitions of a state share a valuation.
    pub fn validate_determinism(&self) -> Result<(), ValidationError> {
        for (state, transitions) in &self.delta {
            let guarded: Vec<(usize, &MultiEvent)> = transitions
                .iter()
                .enumerate()
                .filter_map(|(i, t)| t.condition().map(|c| (i, c)))
                .collect();
            for (k, (first, c1)) in guarded.iter().enumerate() {
                for (second, c2) in &guarded[k + 1..] {
                    let common = c1.intersection(c2);
                    if let Some(witness) = common.iter().min() {
                        return Err(ValidationError::NondeterministicTransitions {
                            state: format!("{state:?}"),
                            first: *first,
                            second: *second,
                            witness: witness.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Drops every state not reachable from the initial state.
    pub fn remove_unreachable_states(&mut self) {
        let Some(initial) = self.initial.clone() else {
            return;
        };
        let mut seen: HashSet<S> = HashSet::new();
        let mut to_visit = VecDeque::from([initial]);
        while let Some(current) = to_visit.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            for t in self.transitions_for(&current) {
                if !seen.contains(&t.destination) {
                    to_visit.push_back(t.destination.clone());
                }
            }
        }
        self.delta.retain(|s, _| seen.contains(s));
    }
}

impl PropositionalMachine<u32> {
    /// Builds a single-state machine whose transitions all loop on state 0.
    ///
    /// A `None` condition stands for the otherwise transition. Such a
    /// machine models stateless rewriting of an event trace.
    pub fn stateless<I>(conditions: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (Option<MultiEvent>, MultiEventFunction)>,
    {
        let mut machine = Self::new();
        for (condition, function) in conditions {
            let t = match condition {
                Some(c) => Transition::new(0, c, function),
                None => Transition::otherwise(0, function),
            };
            machine.add_transition(0, t)?;
        }
        Ok(machine)
    }
}

/// Builder for `PropositionalMachine`.
///
/// # Examples
///
/// ```
/// use propman::{MachineBuilder, MultiEvent, MultiEventFunction, Formula};
///
/// let machine = MachineBuilder::new()
///     .when(0, MultiEvent::symbolic(Formula::var("a")), MultiEventFunction::epsilon(), 1)
///     .otherwise(0, MultiEventFunction::epsilon(), 0)
///     .otherwise(1, MultiEventFunction::nu(), 1)
///     .build()
///     .unwrap();
/// assert_eq!(machine.initial_state(), Some(&0));
/// assert_eq!(machine.transition_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MachineBuilder<S> {
    initial: Option<S>,
    transitions: Vec<(S, Transition<S>)>,
    check_determinism: bool,
}

impl<S: MachineState> MachineBuilder<S> {
    /// Creates an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial: None,
            transitions: Vec::new(),
            check_determinism: false,
        }
    }

    /// Overrides the initial state.
    #[must_use]
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Adds an ordinary transition `source --[condition / function]--> destination`.
    #[must_use]
    pub fn when(
        mut self,
        source: S,
        condition: MultiEvent,
        function: MultiEventFunction,
        destination: S,
    ) -> Self {
        self.transitions
            .push((source, Transition::new(destination, condition, function)));
        self
    }

    /// Adds the otherwise transition of `source`.
    #[must_use]
    pub fn otherwise(mut self, source: S, function: MultiEventFunction, destination: S) -> Self {
        self.transitions
            .push((source, Transition::otherwise(destination, function)));
        self
    }

    /// Adds a prebuilt transition.
    #[must_use]
    pub fn transition(mut self, source: S, transition: Transition<S>) -> Self {
        self.transitions.push((source, transition));
        self
    }

    /// Runs `validate_determinism` as part of `build`.
    #[must_use]
    pub fn check_determinism(mut self, check: bool) -> Self {
        self.check_determinism = check;
        self
    }

    /// Builds the machine.
    pub fn build(self) -> PropmanResult<PropositionalMachine<S>> {
        let mut machine = PropositionalMachine::new();
        for (source, t) in self.transitions {
            machine.add_transition(source, t)?;
        }
        if let Some(initial) = self.initial {
            machine.set_initial_state(initial);
        }
        if machine.initial_state().is_none() {
            return Err(ValidationError::MissingInitialState.into());
        }
        if self.check_determinism {
            machine.validate_determinism()?;
        }
        Ok(machine)
    }
}

impl<S: MachineState> Default for MachineBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
