//! Path and verdict counters.
//!
//! Counts are unbounded: the number of traces compatible with a stream of
//! multi-events grows as the product of the events' sizes.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::troolean::Troolean;

/// Number of trace paths currently ending in each machine state.
///
/// States with no paths are absent.
#[derive(Debug, Clone)]
pub struct PathCount<S> {
    counts: HashMap<S, BigUint>,
}

impl<S: Eq + Hash> PartialEq for PathCount<S> {
    fn eq(&self, other: &Self) -> bool {
        self.counts == other.counts
    }
}

impl<S: Eq + Hash> Eq for PathCount<S> {}

impl<S> Default for PathCount<S> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }
}

impl<S: Clone + Eq + Hash> PathCount<S> {
    /// An empty count.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A count holding exactly one path, in `state`.
    #[must_use]
    pub fn single(state: S) -> Self {
        let mut count = Self::new();
        count.counts.insert(state, BigUint::one());
        count
    }

    /// Adds `paths` to the count of `state`. Adding zero is a no-op.
    pub fn increment(&mut self, state: &S, paths: &BigUint) {
        if paths.is_zero() {
            return;
        }
        match self.counts.get_mut(state) {
            Some(c) => *c += paths,
            None => {
                self.counts.insert(state.clone(), paths.clone());
            }
        }
    }

    /// Paths ending in `state`; zero for absent states.
    #[must_use]
    pub fn get(&self, state: &S) -> BigUint {
        self.counts.get(state).cloned().unwrap_or_default()
    }

    /// Paths over all states.
    #[must_use]
    pub fn total(&self) -> BigUint {
        self.counts.values().sum()
    }

    /// Returns true when no path is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// States with their path counts.
    pub fn iter(&self) -> impl Iterator<Item = (&S, &BigUint)> {
        self.counts.iter()
    }
}

/// Paths attributed to each verdict during one monitoring step.
///
/// Counts are serialized as decimal strings so that values beyond 64 bits
/// survive JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerdictCount {
    #[serde(rename = "true", with = "decimal")]
    true_paths: BigUint,
    #[serde(rename = "false", with = "decimal")]
    false_paths: BigUint,
    #[serde(rename = "inconclusive", with = "decimal")]
    inconclusive_paths: BigUint,
}

impl VerdictCount {
    /// All counts zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a count from small values.
    #[must_use]
    pub fn from_counts(true_paths: u64, false_paths: u64, inconclusive_paths: u64) -> Self {
        Self {
            true_paths: true_paths.into(),
            false_paths: false_paths.into(),
            inconclusive_paths: inconclusive_paths.into(),
        }
    }

    /// Paths that produced `verdict`.
    #[must_use]
    pub const fn get(&self, verdict: Troolean) -> &BigUint {
        match verdict {
            Troolean::True => &self.true_paths,
            Troolean::False => &self.false_paths,
            Troolean::Inconclusive => &self.inconclusive_paths,
        }
    }

    /// Adds `paths` to the count of `verdict`.
    pub fn increment(&mut self, verdict: Troolean, paths: &BigUint) {
        let slot = match verdict {
            Troolean::True => &mut self.true_paths,
            Troolean::False => &mut self.false_paths,
            Troolean::Inconclusive => &mut self.inconclusive_paths,
        };
        *slot += paths;
    }

    /// Paths over all verdicts.
    #[must_use]
    pub fn total(&self) -> BigUint {
        &self.true_paths + &self.false_paths + &self.inconclusive_paths
    }

    /// Returns true when every count is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.true_paths.is_zero() && self.false_paths.is_zero() && self.inconclusive_paths.is_zero()
    }
}

impl fmt::Display for VerdictCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{T={},F={},?={}}}",
            self.true_paths, self.false_paths, self.inconclusive_paths
        )
    }
}

pub(crate) mod decimal {
    use num_bigint::BigUint;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_str_radix(10))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let s = String::deserialize(deserializer)?;
        BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| de::Error::custom(format!("invalid decimal count: {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_count_increment() {
        let mut count = PathCount::single(0u32);
        count.increment(&0, &BigUint::from(2u32));
        count.increment(&5, &BigUint::from(3u32));
        count.increment(&9, &BigUint::zero());
        assert_eq!(count.get(&0), BigUint::from(3u32));
        assert_eq!(count.get(&5), BigUint::from(3u32));
        assert_eq!(count.get(&9), BigUint::zero());
        assert_eq!(count.total(), BigUint::from(6u32));
        assert_eq!(count.iter().count(), 2);
    }

    #[test]
    fn test_path_count_equality_ignores_zero_increments() {
        let mut left = PathCount::single("s0");
        left.increment(&"s1", &BigUint::zero());
        let mut right = PathCount::new();
        right.increment(&"s0", &BigUint::one());
        assert_eq!(left, right);

        right.increment(&"s1", &BigUint::one());
        assert_ne!(left, right);
        assert_ne!(PathCount::<&str>::new(), left);
    }

    #[test]
    fn test_verdict_count_display() {
        let mut verdicts = VerdictCount::new();
        verdicts.increment(Troolean::True, &BigUint::from(2u32));
        verdicts.increment(Troolean::Inconclusive, &BigUint::one());
        assert_eq!(verdicts.to_string(), "{T=2,F=0,?=1}");
        assert_eq!(verdicts, VerdictCount::from_counts(2, 0, 1));
        assert_eq!(verdicts.total(), BigUint::from(3u32));
        assert!(!verdicts.is_zero());
        assert!(VerdictCount::new().is_zero());
    }

    #[test]
    fn test_verdict_count_serializes_big_values() {
        let big = BigUint::from(u64::MAX) * BigUint::from(u64::MAX);
        let mut verdicts = VerdictCount::new();
        verdicts.increment(Troolean::False, &big);
        let json = serde_json::to_string(&verdicts).unwrap();
        assert!(json.contains(&format!("\"false\":\"{big}\"")));
        let back: VerdictCount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, verdicts);

        let bad = r#"{"true":"x","false":"0","inconclusive":"0"}"#;
        assert!(serde_json::from_str::<VerdictCount>(bad).is_err());
    }
}
