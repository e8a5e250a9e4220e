//! Multi-events: sets of simultaneous candidate valuations.
//!
//! A multi-event is either *concrete*, an explicit set of valuations, or
//! *symbolic*, the set of valuations that make a formula true over the
//! formula's own domain. Intersections between any two multi-events are
//! computed as sets of valuations and do not depend on operand order.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::formula::Formula;
use crate::troolean::Troolean;
use crate::valuation::{Valuation, ValuationIterator};

/// A set of valuations treated as a single event.
///
/// # Examples
///
/// ```
/// use propman::{Formula, MultiEvent, Troolean, Valuation};
///
/// let tf = Valuation::new().with("a", Troolean::True).with("b", Troolean::False);
/// let ff = Valuation::new().with("a", Troolean::False).with("b", Troolean::False);
/// let event = MultiEvent::concrete([tf.clone(), ff]);
///
/// let a_holds = MultiEvent::symbolic(Formula::var("a"));
/// let common = event.intersection(&a_holds);
/// assert_eq!(common.len(), 1);
/// assert!(common.contains(&tf));
///
/// assert_eq!(event.intersection(&MultiEvent::all()).len(), 2);
/// assert!(event.intersection(&MultiEvent::nothing()).is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MultiEvent {
    /// An explicit set of valuations sharing one domain.
    Concrete {
        valuations: HashSet<Valuation>,
    },
    /// The valuations satisfying a formula.
    Symbolic {
        formula: Formula,
    },
}

impl MultiEvent {
    /// The symbolic multi-event containing every valuation (total uncertainty).
    #[must_use]
    pub const fn all() -> Self {
        Self::Symbolic {
            formula: Formula::top(),
        }
    }

    /// The symbolic multi-event containing no valuation.
    #[must_use]
    pub const fn nothing() -> Self {
        Self::Symbolic {
            formula: Formula::bottom(),
        }
    }

    /// Creates a concrete multi-event; duplicate valuations collapse.
    #[must_use]
    pub fn concrete(valuations: impl IntoIterator<Item = Valuation>) -> Self {
        Self::Concrete {
            valuations: valuations.into_iter().collect(),
        }
    }

    /// Creates a concrete multi-event holding a single valuation.
    #[must_use]
    pub fn single(valuation: Valuation) -> Self {
        Self::concrete([valuation])
    }

    /// Creates a symbolic multi-event.
    #[must_use]
    pub const fn symbolic(formula: Formula) -> Self {
        Self::Symbolic { formula }
    }

    /// Materializes every valuation over `variables` as a concrete event.
    #[must_use]
    pub fn concrete_all<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::concrete(ValuationIterator::new(variables))
    }

    /// Returns true for the symbolic `all()` constant.
    #[must_use]
    pub fn is_all(&self) -> bool {
        self.symbolic_constant() == Some(Troolean::True)
    }

    /// Returns true for the symbolic `nothing()` constant.
    #[must_use]
    pub fn is_nothing(&self) -> bool {
        self.symbolic_constant() == Some(Troolean::False)
    }

    fn symbolic_constant(&self) -> Option<Troolean> {
        match self {
            Self::Symbolic { formula } => formula.as_constant(),
            Self::Concrete { .. } => None,
        }
    }

    /// The formula of a symbolic event.
    #[must_use]
    pub const fn formula(&self) -> Option<&Formula> {
        match self {
            Self::Symbolic { formula } => Some(formula),
            Self::Concrete { .. } => None,
        }
    }

    /// Every valuation represented by this event.
    ///
    /// Symbolic events enumerate all `3^n` valuations of their domain, so
    /// the cost is exponential in the number of variables.
    #[must_use]
    pub fn valuations(&self) -> HashSet<Valuation> {
        match self {
            Self::Concrete { valuations } => valuations.clone(),
            Self::Symbolic { formula } => satisfying(formula, formula.domain(), |_| true),
        }
    }

    /// Number of valuations represented by this event.
    #[must_use]
    pub fn cardinality(&self) -> usize {
        match self {
            Self::Concrete { valuations } => valuations.len(),
            Self::Symbolic { .. } => self.valuations().len(),
        }
    }

    /// Number of valuations examined when this event is enumerated.
    ///
    /// Exact for concrete events. For symbolic events it is `3^n` over the
    /// formula's domain (saturating), which bounds the cardinality and is
    /// computed without enumerating anything.
    #[must_use]
    pub fn enumeration_cost(&self) -> usize {
        match self {
            Self::Concrete { valuations } => valuations.len(),
            Self::Symbolic { formula } if formula.as_constant().is_some() => 1,
            Self::Symbolic { formula } => u32::try_from(formula.domain().len())
                .ok()
                .and_then(|n| 3usize.checked_pow(n))
                .unwrap_or(usize::MAX),
        }
    }

    /// Variables of this event.
    ///
    /// A concrete event takes the domain of any member (all members share
    /// one); an empty concrete event has an empty domain.
    #[must_use]
    pub fn domain(&self) -> BTreeSet<String> {
        match self {
            Self::Concrete { valuations } => valuations
                .iter()
                .next()
                .map(Valuation::domain)
                .unwrap_or_default(),
            Self::Symbolic { formula } => formula.domain(),
        }
    }

    /// The valuations common to both events.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> HashSet<Valuation> {
        match (self, other) {
            (Self::Concrete { valuations: mine }, Self::Concrete { valuations: theirs }) => {
                mine.intersection(theirs).cloned().collect()
            }
            (Self::Concrete { valuations }, Self::Symbolic { formula })
            | (Self::Symbolic { formula }, Self::Concrete { valuations }) => {
                filter_true(valuations, formula)
            }
            (Self::Symbolic { formula: f }, Self::Symbolic { formula: g }) => {
                symbolic_intersection(f, g)
            }
        }
    }

    /// Returns true if the events share at least one valuation.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        !self.intersection(other).is_empty()
    }
}

fn filter_true(valuations: &HashSet<Valuation>, formula: &Formula) -> HashSet<Valuation> {
    match formula.as_constant() {
        Some(Troolean::True) => valuations.clone(),
        Some(_) => HashSet::new(),
        None => valuations
            .iter()
            .filter(|v| formula.evaluate(v) == Troolean::True)
            .cloned()
            .collect(),
    }
}

fn symbolic_intersection(f: &Formula, g: &Formula) -> HashSet<Valuation> {
    match (f.as_constant(), g.as_constant()) {
        (Some(Troolean::True), _) => satisfying(g, g.domain(), |_| true),
        (_, Some(Troolean::True)) => satisfying(f, f.domain(), |_| true),
        (Some(_), _) | (_, Some(_)) => HashSet::new(),
        (None, None) => {
            let mut domain = f.domain();
            domain.extend(g.domain());
            satisfying(f, domain, |v| g.evaluate(v) == Troolean::True)
        }
    }
}

/// Valuations over `domain` making `formula` true and passing `also`.
fn satisfying(
    formula: &Formula,
    domain: BTreeSet<String>,
    also: impl Fn(&Valuation) -> bool,
) -> HashSet<Valuation> {
    if formula.as_constant().is_some_and(|c| c != Troolean::True) {
        return HashSet::new();
    }
    ValuationIterator::new(domain)
        .filter(|v| formula.evaluate(v) == Troolean::True && also(v))
        .collect()
}

impl Default for MultiEvent {
    fn default() -> Self {
        Self::concrete([])
    }
}

impl From<Formula> for MultiEvent {
    fn from(formula: Formula) -> Self {
        Self::symbolic(formula)
    }
}

impl From<Valuation> for MultiEvent {
    fn from(valuation: Valuation) -> Self {
        Self::single(valuation)
    }
}

impl fmt::Display for MultiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete { valuations } => {
                let mut sorted: Vec<&Valuation> = valuations.iter().collect();
                sorted.sort();
                write!(f, "[")?;
                for (i, v) in sorted.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Self::Symbolic { formula } => write!(f, "{formula}"),
        }
    }
}
