//! Reading and writing multi-events in textual form.
//!
//! Two encodings are supported. A valuation list is a comma-separated list
//! of fixed-width tokens with one character per variable, in the factory's
//! variable order (`"TF,F?"`). A formula uses the syntax accepted by
//! [`Formula::parse`] (`"a & !b"`).

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{PropmanError, PropmanResult, ValidationError};
use crate::formula::Formula;
use crate::multi_event::MultiEvent;
use crate::troolean::Troolean;
use crate::valuation::Valuation;

static VALUATION_LIST: OnceLock<Regex> = OnceLock::new();

fn valuation_list_pattern() -> PropmanResult<&'static Regex> {
    if let Some(re) = VALUATION_LIST.get() {
        return Ok(re);
    }
    let compiled = Regex::new(r"^[TF10?⊤⊥,\s]*$")
        .map_err(|e| PropmanError::internal(format!("invalid valuation pattern: {e}")))?;
    Ok(VALUATION_LIST.get_or_init(|| compiled))
}

/// Builds multi-events over a fixed, ordered set of variables.
///
/// # Examples
///
/// ```
/// use propman::{MultiEventFactory, Troolean};
///
/// let factory = MultiEventFactory::new(["a", "b"]);
/// let v = factory.read_valuation("T?").unwrap();
/// assert_eq!(v.get("a"), Troolean::True);
/// assert_eq!(v.get("b"), Troolean::Inconclusive);
/// assert!(factory.read_valuation("TTT").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiEventFactory {
    variables: Vec<String>,
}

impl MultiEventFactory {
    /// Creates a factory; token characters map to `variables` by position.
    pub fn new<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variables: variables.into_iter().map(Into::into).collect(),
        }
    }

    /// Variables in token order.
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Reads one fixed-width token.
    ///
    /// Returns `None` when the token length (in characters) differs from
    /// the number of variables.
    #[must_use]
    pub fn read_valuation(&self, token: &str) -> Option<Valuation> {
        if token.chars().count() != self.variables.len() {
            return None;
        }
        Some(
            self.variables
                .iter()
                .zip(token.chars())
                .map(|(name, c)| (name.clone(), Troolean::from_char(c)))
                .collect(),
        )
    }

    /// Reads a comma-separated list of tokens into a concrete multi-event.
    ///
    /// Tokens of the wrong length are skipped.
    #[must_use]
    pub fn read_from_valuations(&self, text: &str) -> MultiEvent {
        let valuations: HashSet<Valuation> = text
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .filter_map(|t| {
                let v = self.read_valuation(t);
                if v.is_none() {
                    tracing::debug!(token = t, "skipping token of wrong length");
                }
                v
            })
            .collect();
        MultiEvent::concrete(valuations)
    }

    /// Parses a formula into a symbolic multi-event.
    ///
    /// Every variable of the formula must belong to the factory.
    pub fn read_from_formula(&self, text: &str) -> Result<MultiEvent, ValidationError> {
        let formula = Formula::parse(text)?;
        if let Some(unknown) = formula
            .domain()
            .into_iter()
            .find(|name| !self.variables.contains(name))
        {
            return Err(ValidationError::UnknownVariable { name: unknown });
        }
        Ok(MultiEvent::symbolic(formula))
    }

    /// Reads either encoding, guessing which one from the characters used.
    ///
    /// Text made only of `T`, `F`, `1`, `0`, `?`, `⊤`, `⊥`, commas and
    /// whitespace is read as a valuation list; anything else as a formula.
    /// The guess is ambiguous: the formula `?` and formulas over variables
    /// named `T` or `F` read as valuation lists, while tokens using other
    /// false characters (`"xy"`) go to the formula parser. Use
    /// [`Self::read_from_valuations`] or [`Self::read_from_formula`] when
    /// the encoding is known.
    pub fn read_from_string(&self, text: &str) -> PropmanResult<MultiEvent> {
        if valuation_list_pattern()?.is_match(text) {
            Ok(self.read_from_valuations(text))
        } else {
            Ok(self.read_from_formula(text)?)
        }
    }

    /// Writes a valuation as a token in the factory's variable order.
    #[must_use]
    pub fn write_valuation(&self, valuation: &Valuation) -> String {
        self.variables
            .iter()
            .map(|name| valuation.get(name).as_char())
            .collect()
    }

    /// Writes a multi-event as a sorted, comma-separated token list.
    ///
    /// Symbolic events are enumerated first.
    #[must_use]
    pub fn write_event(&self, event: &MultiEvent) -> String {
        let mut tokens: Vec<String> = event
            .valuations()
            .iter()
            .map(|v| self.write_valuation(v))
            .collect();
        tokens.sort();
        tokens.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::troolean::Troolean::{False as F, Inconclusive as I, True as T};

    fn ab(a: Troolean, b: Troolean) -> Valuation {
        [("a", a), ("b", b)].into_iter().collect()
    }

    #[test]
    fn test_read_valuation_characters() {
        let factory = MultiEventFactory::new(["a", "b"]);
        assert_eq!(factory.read_valuation("1x"), Some(ab(T, F)));
        assert_eq!(factory.read_valuation("⊤?"), Some(ab(T, I)));
        assert_eq!(factory.read_valuation("T"), None);
        assert_eq!(factory.read_valuation(""), None);
    }

    #[test]
    fn test_read_from_valuations_skips_bad_tokens() {
        let factory = MultiEventFactory::new(["a", "b"]);
        let e = factory.read_from_valuations("TF, FT,TTT,F");
        assert_eq!(e.valuations(), HashSet::from([ab(T, F), ab(F, T)]));
    }

    #[test]
    fn test_read_from_formula() {
        let factory = MultiEventFactory::new(["a", "b"]);
        let e = factory.read_from_formula("a & !b").unwrap();
        assert_eq!(e.valuations(), HashSet::from([ab(T, F)]));

        let err = factory.read_from_formula("a & c").unwrap_err();
        assert_eq!(err, ValidationError::UnknownVariable { name: "c".to_string() });
        assert!(matches!(
            factory.read_from_formula("a &"),
            Err(ValidationError::MalformedFormula { .. })
        ));
    }

    #[test]
    fn test_read_from_string_guesses_encoding() {
        let factory = MultiEventFactory::new(["a", "b"]);
        let listed = factory.read_from_string("TF,FT").unwrap();
        assert!(listed.formula().is_none());
        assert_eq!(listed.cardinality(), 2);

        let symbolic = factory.read_from_string("a | b").unwrap();
        assert!(symbolic.formula().is_some());

        assert!(factory.read_from_string("a | z").unwrap_err().is_validation());
    }

    #[test]
    fn test_write_event_is_sorted() {
        let factory = MultiEventFactory::new(["a", "b"]);
        let e = MultiEvent::concrete([ab(T, F), ab(F, I)]);
        assert_eq!(factory.write_event(&e), "F?,TF");
        assert_eq!(factory.write_valuation(&Valuation::new()), "??");
        assert_eq!(factory.read_from_valuations(&factory.write_event(&e)), e);
    }

    #[test]
    fn test_read_from_string_ambiguous_inputs() {
        let single = MultiEventFactory::new(["a"]);
        // `?` is a one-character valuation token, not the constant formula.
        let e = single.read_from_string("?").unwrap();
        assert_eq!(e.valuations(), HashSet::from([Valuation::new().with("a", I)]));

        let tf = MultiEventFactory::new(["T", "F"]);
        assert!(tf.read_from_string("TF").unwrap().formula().is_none());
        assert!(tf.read_from_formula("T & F").unwrap().formula().is_some());

        let factory = MultiEventFactory::new(["a", "b"]);
        assert!(factory.read_from_string("xy").unwrap_err().is_validation());
        assert_eq!(factory.read_from_valuations("xy").valuations(), HashSet::from([ab(F, F)]));
    }
}
