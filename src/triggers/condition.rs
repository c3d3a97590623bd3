//! Effect gating conditions.
//!
//! A condition is a small boolean expression over a narrow read-only
//! view of the game: the active player's index and energy. Card data
//! usually ships conditions as loose nested arrays,
//! `[field, op, value]` for a comparison and `[left, "and"|"or", right]`
//! for a combination; [`Condition::from_json`] decodes those into the
//! typed AST.
//!
//! Evaluation fails closed: an unknown field or a condition that could
//! not be decoded evaluates to `false` and is reported with `warn!`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::core::{EngineError, GameState};

/// Comparison operator of a leaf condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Ge,
    Le,
}

impl CompareOp {
    /// Parse an operator token (`==`, `!=`, `>=`, `<=` and word forms).
    pub fn parse(token: &str) -> Result<Self, EngineError> {
        match token.trim().to_ascii_lowercase().as_str() {
            "==" | "=" | "eq" => Ok(CompareOp::Eq),
            "!=" | "<>" | "ne" => Ok(CompareOp::Ne),
            ">=" | "ge" => Ok(CompareOp::Ge),
            "<=" | "le" => Ok(CompareOp::Le),
            other => Err(EngineError::MalformedCondition(format!("unknown operator {other:?}"))),
        }
    }

    #[must_use]
    pub fn compare(self, left: i64, right: i64) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
            CompareOp::Ge => left >= right,
            CompareOp::Le => left <= right,
        }
    }
}

/// A gating condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// `field op value`
    Leaf { field: String, op: CompareOp, value: i64 },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    /// A condition that could not be decoded. Always false.
    Malformed(String),
}

impl Condition {
    /// A comparison leaf.
    pub fn leaf(field: impl Into<String>, op: CompareOp, value: i64) -> Self {
        Self::Leaf { field: field.into(), op, value }
    }

    #[must_use]
    pub fn and(self, other: Condition) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: Condition) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Decode the nested-array form.
    ///
    /// ```
    /// use serde_json::json;
    /// use vanguard_sim::triggers::{CompareOp, Condition};
    ///
    /// let cond = Condition::from_json(&json!([["energy", ">=", 3], "and", ["active_player", "==", 0]])).unwrap();
    /// assert_eq!(
    ///     cond,
    ///     Condition::leaf("energy", CompareOp::Ge, 3).and(Condition::leaf("active_player", CompareOp::Eq, 0))
    /// );
    /// ```
    pub fn from_json(value: &Value) -> Result<Self, EngineError> {
        let items = value
            .as_array()
            .ok_or_else(|| EngineError::MalformedCondition(format!("expected an array, got {value}")))?;

        if items.len() != 3 {
            return Err(EngineError::MalformedCondition(format!(
                "expected 3 elements, got {}",
                items.len()
            )));
        }

        // [left, "and"|"or", right] when both sides are themselves arrays
        if items[0].is_array() && items[2].is_array() {
            let combinator = items[1].as_str().unwrap_or_default().to_ascii_lowercase();
            let left = Self::from_json(&items[0])?;
            let right = Self::from_json(&items[2])?;
            return match combinator.as_str() {
                "and" => Ok(left.and(right)),
                "or" => Ok(left.or(right)),
                other => Err(EngineError::MalformedCondition(format!(
                    "unknown combinator {other:?}"
                ))),
            };
        }

        let field = items[0]
            .as_str()
            .ok_or_else(|| EngineError::MalformedCondition(format!("field must be a string: {}", items[0])))?;
        let op = items[1]
            .as_str()
            .ok_or_else(|| EngineError::MalformedCondition(format!("operator must be a string: {}", items[1])))
            .and_then(CompareOp::parse)?;
        let value = items[2]
            .as_i64()
            .ok_or_else(|| EngineError::MalformedCondition(format!("value must be an integer: {}", items[2])))?;

        Ok(Self::leaf(field, op, value))
    }

    /// Decode, turning any failure into an always-false `Malformed`.
    #[must_use]
    pub fn from_json_lenient(value: &Value) -> Self {
        match Self::from_json(value) {
            Ok(condition) => condition,
            Err(err) => {
                warn!(%err, "condition could not be decoded; it will never hold");
                Self::Malformed(err.to_string())
            }
        }
    }
}

/// Values a condition can read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConditionContext {
    /// Index of the active player.
    pub active_player: i64,
    /// Energy of the active player.
    pub energy: i64,
}

impl ConditionContext {
    #[must_use]
    pub fn from_state(state: &GameState) -> Self {
        Self {
            active_player: state.active.index() as i64,
            energy: state.active_player().energy,
        }
    }

    /// Resolve a field path. Case and separators are ignored and only
    /// the last dotted segment counts, so `"player.activePlayer"`,
    /// `"active_player"` and `"ACTIVE-PLAYER"` are the same field.
    #[must_use]
    pub fn field(&self, path: &str) -> Option<i64> {
        let last = path.rsplit('.').next().unwrap_or(path);
        let normalized: String = last
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "activeplayer" => Some(self.active_player),
            "energy" => Some(self.energy),
            _ => None,
        }
    }
}

/// Evaluates conditions.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Evaluate an optional condition; absence means always true.
    #[must_use]
    pub fn holds(condition: Option<&Condition>, ctx: &ConditionContext) -> bool {
        condition.map_or(true, |c| Self::evaluate(c, ctx))
    }

    /// Check if a condition is satisfied.
    ///
    /// Both sides of a combination are evaluated before combining, so
    /// every malformed part is reported.
    #[must_use]
    pub fn evaluate(condition: &Condition, ctx: &ConditionContext) -> bool {
        match condition {
            Condition::Leaf { field, op, value } => match ctx.field(field) {
                Some(actual) => op.compare(actual, *value),
                None => {
                    warn!(field = %field, "unknown condition field; treating as false");
                    false
                }
            },
            Condition::And(left, right) => {
                let l = Self::evaluate(left, ctx);
                let r = Self::evaluate(right, ctx);
                l && r
            }
            Condition::Or(left, right) => {
                let l = Self::evaluate(left, ctx);
                let r = Self::evaluate(right, ctx);
                l || r
            }
            Condition::Malformed(reason) => {
                warn!(%reason, "malformed condition; treating as false");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> ConditionContext {
        ConditionContext { active_player: 1, energy: 4 }
    }

    #[test]
    fn test_leaf_operators() {
        let c = ctx();
        assert!(ConditionEvaluator::evaluate(&Condition::leaf("energy", CompareOp::Ge, 4), &c));
        assert!(!ConditionEvaluator::evaluate(&Condition::leaf("energy", CompareOp::Ge, 5), &c));
        assert!(ConditionEvaluator::evaluate(&Condition::leaf("energy", CompareOp::Le, 4), &c));
        assert!(ConditionEvaluator::evaluate(&Condition::leaf("active_player", CompareOp::Eq, 1), &c));
        assert!(ConditionEvaluator::evaluate(&Condition::leaf("activePlayer", CompareOp::Ne, 0), &c));
    }

    #[test]
    fn test_combinators() {
        let c = ctx();
        let yes = Condition::leaf("energy", CompareOp::Eq, 4);
        let no = Condition::leaf("energy", CompareOp::Eq, 0);

        assert!(!ConditionEvaluator::evaluate(&yes.clone().and(no.clone()), &c));
        assert!(ConditionEvaluator::evaluate(&yes.clone().or(no.clone()), &c));
        assert!(ConditionEvaluator::evaluate(&no.or(yes), &c));
    }

    #[test]
    fn test_absent_condition_holds() {
        assert!(ConditionEvaluator::holds(None, &ctx()));
    }

    #[test]
    fn test_unknown_field_fails_closed() {
        let cond = Condition::leaf("life", CompareOp::Ge, 0);
        assert!(!ConditionEvaluator::evaluate(&cond, &ctx()));
    }

    #[test]
    fn test_decode_leaf_and_nested() {
        let cond = Condition::from_json(&json!(["energy", ">=", 2])).unwrap();
        assert_eq!(cond, Condition::leaf("energy", CompareOp::Ge, 2));

        let cond = Condition::from_json(&json!([
            ["energy", "<=", 1],
            "or",
            [["active_player", "==", 1], "and", ["energy", "!=", 0]]
        ]))
        .unwrap();
        assert!(ConditionEvaluator::evaluate(&cond, &ctx()));
    }

    #[test]
    fn test_decode_malformed() {
        for bad in [
            json!("energy"),
            json!(["energy", ">="]),
            json!(["energy", ">>", 1]),
            json!([["energy", "==", 1], "xor", ["energy", "==", 2]]),
            json!([1, "==", 1]),
        ] {
            assert!(matches!(
                Condition::from_json(&bad),
                Err(EngineError::MalformedCondition(_))
            ));
            assert!(!ConditionEvaluator::evaluate(&Condition::from_json_lenient(&bad), &ctx()));
        }
    }
}
