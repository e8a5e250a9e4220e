//! Propositional formulas over three-valued variables.
//!
//! A `Formula` is an immutable tree of Kleene connectives whose leaves are
//! named variables or constants. It is built once and evaluated many times
//! against `Valuation`s.
//!
//! Formulas can also be read from text:
//!
//! ```text
//! formula := implies
//! implies := or ( "->" implies )?
//! or      := and ( ("|" | "∨") and )*
//! and     := unary ( ("&" | "∧") unary )*
//! unary   := ("!" | "¬") unary | atom
//! atom    := "(" formula ")" | "true" | "⊤" | "false" | "⊥" | "?" | ident
//! ```

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::troolean::Troolean;
use crate::valuation::Valuation;

/// A three-valued propositional formula.
///
/// # Examples
///
/// ```
/// use propman::{Formula, Troolean, Valuation};
///
/// let phi = Formula::and([Formula::var("a"), Formula::not(Formula::var("b"))]);
/// let v = Valuation::new().with("a", Troolean::True).with("b", Troolean::False);
/// assert_eq!(phi.evaluate(&v), Troolean::True);
/// assert_eq!(phi.evaluate(&Valuation::new()), Troolean::Inconclusive);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Formula {
    /// A fixed truth value.
    Constant {
        /// The value.
        value: Troolean,
    },
    /// A propositional variable, inconclusive when unassigned.
    Variable {
        /// Variable name.
        name: String,
    },
    /// Kleene negation.
    Not {
        /// The negated formula.
        operand: Box<Formula>,
    },
    /// Conjunction of any number of operands; empty is `True`.
    And {
        /// Conjuncts.
        operands: Vec<Formula>,
    },
    /// Disjunction of any number of operands; empty is `False`.
    Or {
        /// Disjuncts.
        operands: Vec<Formula>,
    },
    /// Kleene implication, `!antecedent | consequent`.
    Implies {
        /// Left-hand side.
        antecedent: Box<Formula>,
        /// Right-hand side.
        consequent: Box<Formula>,
    },
}

impl Formula {
    /// The constant `True` formula.
    #[must_use]
    pub const fn top() -> Self {
        Self::Constant {
            value: Troolean::True,
        }
    }

    /// The constant `False` formula.
    #[must_use]
    pub const fn bottom() -> Self {
        Self::Constant {
            value: Troolean::False,
        }
    }

    /// A constant formula.
    #[must_use]
    pub const fn constant(value: Troolean) -> Self {
        Self::Constant { value }
    }

    /// A variable reference.
    #[must_use]
    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable { name: name.into() }
    }

    /// Negation of `operand`.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(operand: Self) -> Self {
        Self::Not {
            operand: Box::new(operand),
        }
    }

    /// Conjunction of `operands`.
    #[must_use]
    pub fn and(operands: impl IntoIterator<Item = Self>) -> Self {
        Self::And {
            operands: operands.into_iter().collect(),
        }
    }

    /// Disjunction of `operands`.
    #[must_use]
    pub fn or(operands: impl IntoIterator<Item = Self>) -> Self {
        Self::Or {
            operands: operands.into_iter().collect(),
        }
    }

    /// Implication from `antecedent` to `consequent`.
    #[must_use]
    pub fn implies(antecedent: Self, consequent: Self) -> Self {
        Self::Implies {
            antecedent: Box::new(antecedent),
            consequent: Box::new(consequent),
        }
    }

    /// Returns the constant value if this formula is a bare constant.
    #[must_use]
    pub const fn as_constant(&self) -> Option<Troolean> {
        match self {
            Self::Constant { value } => Some(*value),
            _ => None,
        }
    }

    /// Evaluates the formula on a valuation.
    ///
    /// Total: variables missing from the valuation are inconclusive.
    #[must_use]
    pub fn evaluate(&self, valuation: &Valuation) -> Troolean {
        match self {
            Self::Constant { value } => *value,
            Self::Variable { name } => valuation.get(name),
            Self::Not { operand } => operand.evaluate(valuation).not(),
            Self::And { operands } => operands
                .iter()
                .fold(Troolean::True, |acc, f| acc.and(f.evaluate(valuation))),
            Self::Or { operands } => operands
                .iter()
                .fold(Troolean::False, |acc, f| acc.or(f.evaluate(valuation))),
            Self::Implies {
                antecedent,
                consequent,
            } => antecedent
                .evaluate(valuation)
                .implies(consequent.evaluate(valuation)),
        }
    }

    /// Set of variable names appearing as leaves.
    #[must_use]
    pub fn domain(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_domain(&mut out);
        out
    }

    fn collect_domain(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Constant { .. } => {}
            Self::Variable { name } => {
                out.insert(name.clone());
            }
            Self::Not { operand } => operand.collect_domain(out),
            Self::And { operands } | Self::Or { operands } => {
                for f in operands {
                    f.collect_domain(out);
                }
            }
            Self::Implies {
                antecedent,
                consequent,
            } => {
                antecedent.collect_domain(out);
                consequent.collect_domain(out);
            }
        }
    }

    /// Enumerates the valuations over `variables` that make this formula true.
    ///
    /// Each variable ranges over `{True, Inconclusive}` only; the search is
    /// exponential in `variables.len()`.
    #[must_use]
    pub fn all_true_valuations<S: AsRef<str>>(&self, variables: &[S]) -> HashSet<Valuation> {
        let mut values = vec![Troolean::Inconclusive; variables.len()];
        let mut out = HashSet::new();
        self.enumerate_true(variables, &mut values, 0, &mut out);
        out
    }

    fn enumerate_true<S: AsRef<str>>(
        &self,
        variables: &[S],
        values: &mut [Troolean],
        i: usize,
        out: &mut HashSet<Valuation>,
    ) {
        if i == values.len() {
            let v: Valuation = variables
                .iter()
                .zip(values.iter())
                .map(|(name, value)| (name.as_ref(), *value))
                .collect();
            if self.evaluate(&v) == Troolean::True {
                out.insert(v);
            }
            return;
        }
        for value in [Troolean::Inconclusive, Troolean::True] {
            values[i] = value;
            self.enumerate_true(variables, values, i + 1, out);
        }
    }

    /// Parses a formula from text.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let mut parser = Parser::new(input);
        let formula = parser.parse_implies()?;
        parser.skip_ws();
        if let Some((offset, c)) = parser.peek() {
            return Err(ValidationError::MalformedFormula {
                offset,
                reason: format!("unexpected '{c}'"),
            });
        }
        Ok(formula)
    }

    const fn is_compound(&self) -> bool {
        matches!(self, Self::And { .. } | Self::Or { .. } | Self::Implies { .. })
    }
}

impl FromStr for Formula {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn child(f: &mut fmt::Formatter<'_>, formula: &Formula) -> fmt::Result {
            if formula.is_compound() {
                write!(f, "({formula})")
            } else {
                write!(f, "{formula}")
            }
        }

        fn joined(f: &mut fmt::Formatter<'_>, operands: &[Formula], op: &str) -> fmt::Result {
            for (i, operand) in operands.iter().enumerate() {
                if i > 0 {
                    write!(f, " {op} ")?;
                }
                child(f, operand)?;
            }
            Ok(())
        }

        match self {
            Self::Constant { value } => match value {
                Troolean::True => write!(f, "true"),
                Troolean::False => write!(f, "false"),
                Troolean::Inconclusive => write!(f, "?"),
            },
            Self::Variable { name } => write!(f, "{name}"),
            Self::Not { operand } => {
                write!(f, "!")?;
                child(f, operand)
            }
            Self::And { operands } if operands.is_empty() => write!(f, "true"),
            Self::Or { operands } if operands.is_empty() => write!(f, "false"),
            Self::And { operands } => joined(f, operands, "&"),
            Self::Or { operands } => joined(f, operands, "|"),
            Self::Implies {
                antecedent,
                consequent,
            } => {
                child(f, antecedent)?;
                write!(f, " -> ")?;
                child(f, consequent)
            }
        }
    }
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
    len: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.char_indices().collect(),
            pos: 0,
            len: input.len(),
        }
    }

    fn skip_ws(&mut self) {
        while self.chars.get(self.pos).is_some_and(|(_, c)| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn offset(&self) -> usize {
        self.peek().map_or(self.len, |(o, _)| o)
    }

    fn error(&self, reason: impl Into<String>) -> ValidationError {
        ValidationError::MalformedFormula {
            offset: self.offset(),
            reason: reason.into(),
        }
    }

    /// Consumes `token` if it comes next (after whitespace).
    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        let mut i = self.pos;
        for expected in token.chars() {
            match self.chars.get(i) {
                Some((_, c)) if *c == expected => i += 1,
                _ => return false,
            }
        }
        self.pos = i;
        true
    }

    fn parse_implies(&mut self) -> Result<Formula, ValidationError> {
        let lhs = self.parse_or()?;
        if self.eat("->") {
            let rhs = self.parse_implies()?;
            return Ok(Formula::implies(lhs, rhs));
        }
        Ok(lhs)
    }

    fn parse_or(&mut self) -> Result<Formula, ValidationError> {
        let mut operands = vec![self.parse_and()?];
        while self.eat("|") || self.eat("∨") {
            operands.push(self.parse_and()?);
        }
        Ok(if operands.len() == 1 {
            operands.remove(0)
        } else {
            Formula::Or { operands }
        })
    }

    fn parse_and(&mut self) -> Result<Formula, ValidationError> {
        let mut operands = vec![self.parse_unary()?];
        while self.eat("&") || self.eat("∧") {
            operands.push(self.parse_unary()?);
        }
        Ok(if operands.len() == 1 {
            operands.remove(0)
        } else {
            Formula::And { operands }
        })
    }

    fn parse_unary(&mut self) -> Result<Formula, ValidationError> {
        if self.eat("!") || self.eat("¬") {
            return Ok(Formula::not(self.parse_unary()?));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Formula, ValidationError> {
        self.skip_ws();
        if self.eat("(") {
            let inner = self.parse_implies()?;
            if !self.eat(")") {
                return Err(self.error("expected ')'"));
            }
            return Ok(inner);
        }
        if self.eat("⊤") {
            return Ok(Formula::top());
        }
        if self.eat("⊥") {
            return Ok(Formula::bottom());
        }
        if self.eat("?") {
            return Ok(Formula::constant(Troolean::Inconclusive));
        }

        let start = self.pos;
        while self
            .chars
            .get(self.pos)
            .is_some_and(|(_, c)| c.is_alphanumeric() || *c == '_')
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(match self.peek() {
                Some((_, c)) => self.error(format!("unexpected '{c}'")),
                None => self.error("unexpected end of input"),
            });
        }
        let name: String = self.chars[start..self.pos].iter().map(|(_, c)| *c).collect();
        Ok(match name.as_str() {
            "true" => Formula::top(),
            "false" => Formula::bottom(),
            _ => Formula::var(name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn val(pairs: &[(&str, Troolean)]) -> Valuation {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_evaluate_missing_is_inconclusive() {
        let phi = Formula::var("x");
        assert_eq!(phi.evaluate(&Valuation::new()), Troolean::Inconclusive);
    }

    #[test]
    fn test_evaluate_connectives() {
        let phi = Formula::and([Formula::var("a"), Formula::not(Formula::var("b"))]);
        assert_eq!(
            phi.evaluate(&val(&[("a", Troolean::True), ("b", Troolean::False)])),
            Troolean::True
        );
        assert_eq!(
            phi.evaluate(&val(&[("a", Troolean::True), ("b", Troolean::True)])),
            Troolean::False
        );
        assert_eq!(
            phi.evaluate(&val(&[("a", Troolean::False), ("b", Troolean::Inconclusive)])),
            Troolean::False
        );
        assert_eq!(
            phi.evaluate(&val(&[("a", Troolean::True), ("b", Troolean::Inconclusive)])),
            Troolean::Inconclusive
        );
    }

    #[test]
    fn test_empty_and_or() {
        assert_eq!(Formula::and([]).evaluate(&Valuation::new()), Troolean::True);
        assert_eq!(Formula::or([]).evaluate(&Valuation::new()), Troolean::False);
    }

    #[test]
    fn test_domain() {
        let phi = Formula::implies(
            Formula::or([Formula::var("a"), Formula::top()]),
            Formula::not(Formula::var("c")),
        );
        let domain: Vec<String> = phi.domain().into_iter().collect();
        assert_eq!(domain, vec!["a".to_string(), "c".to_string()]);
        assert!(Formula::top().domain().is_empty());
    }

    #[test]
    fn test_all_true_valuations_of_disjunction() {
        // (a & c) | b over a, b, c: with values in {T, ?}, the formula is
        // true exactly when b is T or both a and c are T.
        let phi = Formula::or([
            Formula::and([Formula::var("a"), Formula::var("c")]),
            Formula::var("b"),
        ]);
        let vals = phi.all_true_valuations(&["a", "b", "c"]);
        assert_eq!(vals.len(), 5);
        assert!(vals.contains(&val(&[
            ("a", Troolean::Inconclusive),
            ("b", Troolean::True),
            ("c", Troolean::Inconclusive),
        ])));
        assert!(vals.contains(&val(&[
            ("a", Troolean::True),
            ("b", Troolean::Inconclusive),
            ("c", Troolean::True),
        ])));
        for v in &vals {
            assert_eq!(phi.evaluate(v), Troolean::True);
            assert!(v.iter().all(|(_, value)| value != Troolean::False));
        }
    }

    #[test]
    fn test_all_true_valuations_contradiction() {
        assert!(Formula::bottom().all_true_valuations(&["a"]).is_empty());
        assert_eq!(Formula::top().all_true_valuations::<&str>(&[]).len(), 1);
    }

    #[test]
    fn test_parse_precedence() {
        let phi: Formula = "a & !b | c".parse().unwrap();
        let expected = Formula::or([
            Formula::and([Formula::var("a"), Formula::not(Formula::var("b"))]),
            Formula::var("c"),
        ]);
        assert_eq!(phi, expected);
    }

    #[test]
    fn test_parse_implication_is_right_associative() {
        let phi = Formula::parse("a -> b -> c").unwrap();
        let expected = Formula::implies(
            Formula::var("a"),
            Formula::implies(Formula::var("b"), Formula::var("c")),
        );
        assert_eq!(phi, expected);
    }

    #[test]
    fn test_parse_constants_and_unicode() {
        assert_eq!(Formula::parse("true").unwrap(), Formula::top());
        assert_eq!(Formula::parse(" ⊥ ").unwrap(), Formula::bottom());
        assert_eq!(
            Formula::parse("?").unwrap(),
            Formula::constant(Troolean::Inconclusive)
        );
        assert_eq!(
            Formula::parse("¬a ∧ b").unwrap(),
            Formula::and([Formula::not(Formula::var("a")), Formula::var("b")])
        );
    }

    #[test]
    fn test_parse_errors() {
        let err = Formula::parse("(a & b").unwrap_err();
        assert!(matches!(err, ValidationError::MalformedFormula { offset: 6, .. }));

        let err = Formula::parse("a &").unwrap_err();
        assert!(matches!(err, ValidationError::MalformedFormula { .. }));

        let err = Formula::parse("a b").unwrap_err();
        assert!(matches!(err, ValidationError::MalformedFormula { offset: 2, .. }));

        assert!(Formula::parse("").is_err());
    }

    #[test]
    fn test_display_roundtrips_through_parser() {
        let phi = Formula::implies(
            Formula::or([
                Formula::and([Formula::var("a"), Formula::var("c")]),
                Formula::var("b"),
            ]),
            Formula::not(Formula::var("d")),
        );
        let text = phi.to_string();
        assert_eq!(text, "((a & c) | b) -> !d");
        assert_eq!(Formula::parse(&text).unwrap(), phi);
    }

    #[test]
    fn test_serialization() {
        let phi = Formula::not(Formula::var("a"));
        let json = serde_json::to_string(&phi).unwrap();
        let back: Formula = serde_json::from_str(&json).unwrap();
        assert_eq!(back, phi);
    }
}
