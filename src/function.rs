//! Functions labelling machine transitions.
//!
//! A transition turns its input multi-event into an output multi-event,
//! or into no output at all when the machine stays silent for that step.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::multi_event::MultiEvent;
use crate::troolean::Troolean;
use crate::valuation::Valuation;

/// A function from multi-events to optional multi-events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MultiEventFunction {
    /// Outputs the input unchanged.
    Identity,

    /// Outputs a fixed event, or nothing when `event` is `None`.
    Constant {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        event: Option<MultiEvent>,
    },

    /// Removes any certainty about `variable`.
    ///
    /// For every valuation where `variable` is true (resp. false), the
    /// output also contains the same valuation with `variable` false
    /// (resp. true). Valuations where it is inconclusive are kept as is.
    Blur {
        variable: String,
    },

    /// Makes two variables indistinguishable.
    ///
    /// For every valuation, the output also contains the same valuation
    /// with the values of `first` and `second` swapped.
    Merge {
        first: String,
        second: String,
    },
}

impl MultiEventFunction {
    /// The constant function emitting the total multi-event (verdict true).
    #[must_use]
    pub const fn nu() -> Self {
        Self::Constant {
            event: Some(MultiEvent::all()),
        }
    }

    /// The constant function emitting the empty multi-event (verdict false).
    #[must_use]
    pub const fn empty() -> Self {
        Self::Constant {
            event: Some(MultiEvent::nothing()),
        }
    }

    /// The constant function emitting nothing.
    #[must_use]
    pub const fn epsilon() -> Self {
        Self::Constant { event: None }
    }

    /// Blurs `variable`.
    #[must_use]
    pub fn blur(variable: impl Into<String>) -> Self {
        Self::Blur {
            variable: variable.into(),
        }
    }

    /// Merges `first` and `second`.
    #[must_use]
    pub fn merge(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::Merge {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Applies the function; `None` means the machine emits no output.
    #[must_use]
    pub fn apply(&self, input: &MultiEvent) -> Option<MultiEvent> {
        match self {
            Self::Identity => Some(input.clone()),
            Self::Constant { event } => event.clone(),
            Self::Blur { variable } => {
                let vals = input.valuations();
                let mut out: HashSet<Valuation> = vals.clone();
                for v in vals {
                    let flipped = match v.get(variable) {
                        Troolean::True => Troolean::False,
                        Troolean::False => Troolean::True,
                        Troolean::Inconclusive => continue,
                    };
                    out.insert(v.with(variable.clone(), flipped));
                }
                Some(MultiEvent::concrete(out))
            }
            Self::Merge { first, second } => {
                let vals = input.valuations();
                let mut out: HashSet<Valuation> = vals.clone();
                for v in vals {
                    let (x, y) = (v.get(first), v.get(second));
                    out.insert(v.with(first.clone(), y).with(second.clone(), x));
                }
                Some(MultiEvent::concrete(out))
            }
        }
    }
}

impl fmt::Display for MultiEventFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => write!(f, "id"),
            Self::Constant { event: None } => write!(f, "ε"),
            Self::Constant { event: Some(e) } if e.is_all() => write!(f, "ν"),
            Self::Constant { event: Some(e) } if e.is_nothing() => write!(f, "∅"),
            Self::Constant { event: Some(e) } => write!(f, "{e}"),
            Self::Blur { variable } => write!(f, "blur({variable})"),
            Self::Merge { first, second } => write!(f, "merge({first},{second})"),
        }
    }
}
