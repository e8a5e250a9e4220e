//! Valuations: assignments of three-valued values to named variables.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::troolean::Troolean;

/// A mapping from variable names to three-valued values.
///
/// Equality and hashing are by content. Entries are kept in name order so
/// that two valuations built in different orders compare equal and print
/// identically.
///
/// # Examples
///
/// ```
/// use propman::{Troolean, Valuation};
///
/// let v = Valuation::new()
///     .with("a", Troolean::True)
///     .with("b", Troolean::Inconclusive);
/// assert_eq!(v.get("a"), Troolean::True);
/// assert_eq!(v.get("zzz"), Troolean::Inconclusive);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Valuation(BTreeMap<String, Troolean>);

impl Valuation {
    /// Creates an empty valuation.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insertion.
    #[must_use]
    pub fn with(mut self, variable: impl Into<String>, value: Troolean) -> Self {
        self.0.insert(variable.into(), value);
        self
    }

    /// Sets the value of a variable, returning the previous one.
    pub fn insert(&mut self, variable: impl Into<String>, value: Troolean) -> Option<Troolean> {
        self.0.insert(variable.into(), value)
    }

    /// Value of a variable; variables absent from the valuation are inconclusive.
    #[must_use]
    pub fn get(&self, variable: &str) -> Troolean {
        self.0.get(variable).copied().unwrap_or(Troolean::Inconclusive)
    }

    /// Returns true if the variable has an explicit entry.
    #[must_use]
    pub fn contains(&self, variable: &str) -> bool {
        self.0.contains_key(variable)
    }

    /// Variables with an explicit entry.
    #[must_use]
    pub fn domain(&self) -> BTreeSet<String> {
        self.0.keys().cloned().collect()
    }

    /// Number of explicit entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for a valuation without entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Troolean)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Determines if `self` is a partial order of `other`.
    ///
    /// This holds when, for every variable of either valuation, `self`
    /// either agrees with `other` or is inconclusive. The relation is
    /// reflexive but not symmetric: `{a=T, b=?}` is a partial order of
    /// `{a=T, b=F}`, not the other way around.
    #[must_use]
    pub fn is_partial_order(&self, other: &Self) -> bool {
        self.0
            .keys()
            .chain(other.0.keys())
            .all(|name| {
                let mine = self.get(name);
                mine == Troolean::Inconclusive || mine == other.get(name)
            })
    }

    /// Determines if this valuation is optimal within a set: no other
    /// member of the set is a partial order of it.
    #[must_use]
    pub fn is_optimal(&self, valuations: &HashSet<Self>) -> bool {
        valuations
            .iter()
            .filter(|v| *v != self)
            .all(|v| !v.is_partial_order(self))
    }
}

impl FromIterator<(String, Troolean)> for Valuation {
    fn from_iter<I: IntoIterator<Item = (String, Troolean)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<(&'a str, Troolean)> for Valuation {
    fn from_iter<I: IntoIterator<Item = (&'a str, Troolean)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

impl fmt::Display for Valuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        write!(f, "}}")
    }
}

/// Enumerates every three-valued valuation over a domain.
///
/// The first variable changes fastest. An empty domain yields exactly one
/// (empty) valuation, so the iterator always produces `3^n` items.
#[derive(Debug, Clone)]
pub struct ValuationIterator {
    variables: Vec<String>,
    digits: Vec<usize>,
    done: bool,
}

impl ValuationIterator {
    /// Creates an iterator over the given domain.
    #[must_use]
    pub fn new<I, S>(domain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variables: Vec<String> = domain.into_iter().map(Into::into).collect();
        let digits = vec![0; variables.len()];
        Self {
            variables,
            digits,
            done: false,
        }
    }

    fn advance(&mut self) {
        for digit in &mut self.digits {
            *digit += 1;
            if *digit < Troolean::ALL.len() {
                return;
            }
            *digit = 0;
        }
        self.done = true;
    }
}

impl Iterator for ValuationIterator {
    type Item = Valuation;

    fn next(&mut self) -> Option<Valuation> {
        if self.done {
            return None;
        }
        let valuation = self
            .variables
            .iter()
            .zip(&self.digits)
            .map(|(name, &d)| (name.clone(), Troolean::ALL[d]))
            .collect();
        self.advance();
        Some(valuation)
    }
}
