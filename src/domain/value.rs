//! Runtime values produced by the evaluator.
//!
//! Series carry one `f64` per bar with NaN as "undefined"; booleans inside a
//! series are encoded as 1.0 / 0.0. Operations between a series and a scalar
//! broadcast the scalar; series of unequal length are aligned on their newest bar.

use crate::domain::ast::{BinaryOp, Literal, UnaryOp};
use crate::domain::indicator::Outputs;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value: unknown function, missing variable, failed lookup.
    Na,
    Number(f64),
    Bool(bool),
    Text(String),
    Series(Vec<f64>),
    /// Named outputs of a multi-output indicator, primary first.
    Tuple(Outputs),
}

fn truthy(x: f64) -> bool {
    !x.is_nan() && x != 0.0
}

pub(crate) fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

impl From<&Literal> for Value {
    fn from(lit: &Literal) -> Self {
        match lit {
            Literal::Number(n) => Value::Number(*n),
            Literal::Text(s) => Value::Text(s.clone()),
            Literal::Bool(b) => Value::Bool(*b),
        }
    }
}

impl Value {
    /// Interpret a textual override (`true`, `14`, `close`).
    pub fn parse_literal(text: &str) -> Value {
        let trimmed = text.trim();
        match trimmed {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => match trimmed.parse::<f64>() {
                Ok(n) => Value::Number(n),
                Err(_) => Value::Text(trimmed.to_string()),
            },
        }
    }

    pub fn is_na(&self) -> bool {
        matches!(self, Value::Na)
    }

    /// Truthiness for control flow; a series is judged by its newest element.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Na => false,
            Value::Number(n) => truthy(*n),
            Value::Bool(b) => *b,
            Value::Text(s) => !s.is_empty(),
            Value::Series(values) => values.last().copied().is_some_and(truthy),
            Value::Tuple(outputs) => outputs
                .first()
                .and_then(|(_, values)| values.last().copied())
                .is_some_and(truthy),
        }
    }

    /// Truthiness at bar `index`; scalars are constant across bars.
    pub fn truthy_at(&self, index: usize) -> bool {
        match self {
            Value::Series(values) => values.get(index).copied().is_some_and(truthy),
            Value::Tuple(outputs) => outputs
                .first()
                .and_then(|(_, values)| values.get(index).copied())
                .is_some_and(truthy),
            other => other.is_truthy(),
        }
    }

    /// Scalar reading: the value itself, or the newest element of a series.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => Some(flag(*b)),
            Value::Series(values) => values.last().copied(),
            Value::Tuple(outputs) => outputs.first().and_then(|(_, v)| v.last().copied()),
            Value::Na | Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric column of `len` bars; scalars are broadcast.
    pub fn to_series(&self, len: usize) -> Option<Vec<f64>> {
        match self {
            Value::Number(n) => Some(vec![*n; len]),
            Value::Bool(b) => Some(vec![flag(*b); len]),
            Value::Series(values) => Some(values.clone()),
            Value::Tuple(outputs) => outputs.first().map(|(_, v)| v.clone()),
            Value::Na | Value::Text(_) => None,
        }
    }

    /// A tuple collapses to its primary output; everything else is unchanged.
    pub fn primary(self) -> Value {
        match self {
            Value::Tuple(mut outputs) if !outputs.is_empty() => {
                Value::Series(outputs.swap_remove(0).1)
            }
            Value::Tuple(_) => Value::Na,
            other => other,
        }
    }

    pub fn component(&self, name: &str) -> Option<Value> {
        match self {
            Value::Tuple(outputs) => outputs
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| Value::Series(v.clone())),
            _ => None,
        }
    }

    /// Keep the oldest `end` bars of a series-shaped value.
    pub fn truncate(self, end: usize) -> Value {
        match self {
            Value::Series(mut values) => {
                values.truncate(end);
                Value::Series(values)
            }
            Value::Tuple(outputs) => Value::Tuple(
                outputs
                    .into_iter()
                    .map(|(name, mut values)| {
                        values.truncate(end);
                        (name, values)
                    })
                    .collect(),
            ),
            other => other,
        }
    }

    fn scalar(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => Some(flag(*b)),
            _ => None,
        }
    }
}

fn apply(op: BinaryOp, a: f64, b: f64) -> f64 {
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        // floored modulo: the result takes the divisor's sign
        BinaryOp::Mod => a - b * (a / b).floor(),
        BinaryOp::Eq => flag(a == b),
        BinaryOp::Ne => flag(!a.is_nan() && !b.is_nan() && a != b),
        BinaryOp::Gt => flag(a > b),
        BinaryOp::Lt => flag(a < b),
        BinaryOp::Ge => flag(a >= b),
        BinaryOp::Le => flag(a <= b),
        BinaryOp::And => flag(truthy(a) && truthy(b)),
        BinaryOp::Or => flag(truthy(a) || truthy(b)),
    }
}

fn produces_bool(op: BinaryOp) -> bool {
    op.is_comparison() || matches!(op, BinaryOp::And | BinaryOp::Or)
}

/// Element `i` of a column right-aligned into a window of `len` bars.
fn aligned(values: &[f64], len: usize, i: usize) -> f64 {
    let pad = len - values.len();
    if i < pad { f64::NAN } else { values[i - pad] }
}

pub fn binary(op: BinaryOp, left: Value, right: Value) -> Value {
    let left = left.primary();
    let right = right.primary();

    match (&left, &right) {
        (Value::Na, _) | (_, Value::Na) => return Value::Na,
        (Value::Text(a), Value::Text(b)) => {
            return match op {
                BinaryOp::Eq => Value::Bool(a == b),
                BinaryOp::Ne => Value::Bool(a != b),
                _ => Value::Na,
            };
        }
        (Value::Text(_), _) | (_, Value::Text(_)) => {
            return match op {
                BinaryOp::Eq => Value::Bool(false),
                BinaryOp::Ne => Value::Bool(true),
                _ => Value::Na,
            };
        }
        _ => {}
    }

    let out = zip_with(left, right, |a, b| apply(op, a, b));
    match out {
        Value::Number(n) if produces_bool(op) => Value::Bool(truthy(n)),
        other => other,
    }
}

/// Combine two numeric values element-wise, broadcasting scalars.
pub fn zip_with<F>(left: Value, right: Value, f: F) -> Value
where
    F: Fn(f64, f64) -> f64,
{
    let left = left.primary();
    let right = right.primary();
    if let (Some(a), Some(b)) = (left.scalar(), right.scalar()) {
        return Value::Number(f(a, b));
    }
    let len = match (&left, &right) {
        (Value::Series(a), Value::Series(b)) => a.len().max(b.len()),
        (Value::Series(a), _) | (_, Value::Series(a)) => a.len(),
        _ => return Value::Na,
    };
    let (Some(a), Some(b)) = (left.to_series(len), right.to_series(len)) else {
        return Value::Na;
    };
    Value::Series(
        (0..len)
            .map(|i| f(aligned(&a, len, i), aligned(&b, len, i)))
            .collect(),
    )
}

/// Apply `f` to every element of a numeric value.
pub fn map_with<F>(value: Value, f: F) -> Value
where
    F: Fn(f64) -> f64,
{
    match value.primary() {
        Value::Number(n) => Value::Number(f(n)),
        Value::Bool(b) => Value::Number(f(flag(b))),
        Value::Series(values) => Value::Series(values.into_iter().map(f).collect()),
        _ => Value::Na,
    }
}

pub fn unary(op: UnaryOp, operand: Value) -> Value {
    match (op, operand.primary()) {
        (_, Value::Na) | (_, Value::Text(_)) | (_, Value::Tuple(_)) => Value::Na,
        (UnaryOp::Neg, Value::Number(n)) => Value::Number(-n),
        (UnaryOp::Neg, Value::Bool(b)) => Value::Number(-flag(b)),
        (UnaryOp::Neg, Value::Series(values)) => {
            Value::Series(values.into_iter().map(|x| -x).collect())
        }
        (UnaryOp::Not, Value::Number(n)) if n.is_nan() => Value::Na,
        (UnaryOp::Not, Value::Number(n)) => Value::Bool(!truthy(n)),
        (UnaryOp::Not, Value::Bool(b)) => Value::Bool(!b),
        (UnaryOp::Not, Value::Series(values)) => Value::Series(
            values
                .into_iter()
                .map(|x| if x.is_nan() { f64::NAN } else { flag(!truthy(x)) })
                .collect(),
        ),
    }
}
