//! Three-valued (Kleene) logic.
//!
//! A `Troolean` is either decided (`True`/`False`) or `Inconclusive`.
//! The connectives follow strong Kleene semantics: a decided operand can
//! settle the result on its own, otherwise the result stays inconclusive.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A three-valued truth value.
///
/// # Examples
///
/// ```
/// use propman::Troolean;
///
/// assert_eq!(Troolean::True.and(Troolean::Inconclusive), Troolean::Inconclusive);
/// assert_eq!(Troolean::False.and(Troolean::Inconclusive), Troolean::False);
/// assert_eq!(Troolean::True.or(Troolean::Inconclusive), Troolean::True);
/// assert_eq!(Troolean::Inconclusive.not(), Troolean::Inconclusive);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Troolean {
    /// Decided true.
    True,
    /// Decided false.
    False,
    /// Not (yet) decided.
    Inconclusive,
}

impl Troolean {
    /// All three values, in enumeration order.
    pub const ALL: [Self; 3] = [Self::True, Self::False, Self::Inconclusive];

    /// Returns true for `True` and `False`.
    #[must_use]
    pub const fn is_decided(self) -> bool {
        !matches!(self, Self::Inconclusive)
    }

    /// Kleene conjunction.
    #[must_use]
    pub const fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::True, Self::True) => Self::True,
            _ => Self::Inconclusive,
        }
    }

    /// Kleene disjunction.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::True, _) | (_, Self::True) => Self::True,
            (Self::False, Self::False) => Self::False,
            _ => Self::Inconclusive,
        }
    }

    /// Kleene negation.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub const fn not(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Inconclusive => Self::Inconclusive,
        }
    }

    /// Kleene implication, `!self | other`.
    #[must_use]
    pub const fn implies(self, other: Self) -> Self {
        self.not().or(other)
    }

    /// Compares two values by informativeness.
    ///
    /// `Inconclusive` is below both decided values; `True` and `False` are
    /// incomparable, so `None` is returned for that pair.
    #[must_use]
    pub fn cmp_information(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (a, b) if a == b => Some(Ordering::Equal),
            (Self::Inconclusive, _) => Some(Ordering::Less),
            (_, Self::Inconclusive) => Some(Ordering::Greater),
            _ => None,
        }
    }

    /// Reads a value from its one-character encoding.
    ///
    /// `T`, `1` and `⊤` are true, `?` is inconclusive, anything else is false.
    #[must_use]
    pub const fn from_char(c: char) -> Self {
        match c {
            'T' | '1' | '⊤' => Self::True,
            '?' => Self::Inconclusive,
            _ => Self::False,
        }
    }

    /// One-character encoding, inverse of [`Troolean::from_char`].
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::True => 'T',
            Self::False => 'F',
            Self::Inconclusive => '?',
        }
    }
}

impl Default for Troolean {
    fn default() -> Self {
        Self::Inconclusive
    }
}

impl From<bool> for Troolean {
    fn from(v: bool) -> Self {
        if v {
            Self::True
        } else {
            Self::False
        }
    }
}

impl fmt::Display for Troolean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
