// File: src/interpreter/value.rs
//
// Runtime value types for the Rockstar language.
//
// Rockstar is dynamically typed: a variable can hold a number, a boolean, a
// string, or null (the result of a function that never gives anything back).
// The coercion rules for arithmetic, comparison and truthiness all live here.

use crate::ast::{Direction, Literal, Operator};
use crate::errors::RuntimeError;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Largest string a repetition may build
const MAX_STRING_BYTES: usize = 1 << 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Null,
}

/// Numeric view of a value; booleans count as 0 and 1
#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(f) => f,
        }
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Int(n) => Value::Int(*n),
            Literal::Float(f) => Value::Float(*f),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Str(s) => Value::Str(s.clone()),
        }
    }
}

impl Value {
    fn as_number(&self) -> Option<Number> {
        match self {
            Value::Int(n) => Some(Number::Int(*n)),
            Value::Float(f) => Some(Number::Float(*f)),
            Value::Bool(b) => Some(Number::Int(i64::from(*b))),
            Value::Str(_) | Value::Null => None,
        }
    }

    /// Zero, false, the empty string and null are false; everything else is true
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
            Value::Null => false,
        }
    }

    /// Language-level equality.
    ///
    /// Numbers and booleans compare numerically with each other, strings by
    /// content, null only equals null. Values of other differing kinds are
    /// never equal.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Null, Value::Null) => true,
            _ => match (self.as_number(), other.as_number()) {
                (Some(Number::Int(a)), Some(Number::Int(b))) => a == b,
                (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
                _ => false,
            },
        }
    }

    fn compare(&self, op: Operator, other: &Value) -> Result<Option<Ordering>, RuntimeError> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
            _ => match (self.as_number(), other.as_number()) {
                (Some(Number::Int(a)), Some(Number::Int(b))) => Ok(Some(a.cmp(&b))),
                (Some(a), Some(b)) => Ok(a.as_f64().partial_cmp(&b.as_f64())),
                _ => Err(self.invalid(op, other)),
            },
        }
    }

    /// Applies a binary operator with this value on the left
    pub fn apply(&self, op: Operator, other: &Value) -> Result<Value, RuntimeError> {
        let ordered = |accept: fn(Ordering) -> bool| -> Result<Value, RuntimeError> {
            Ok(Value::Bool(self.compare(op, other)?.is_some_and(accept)))
        };

        match op {
            Operator::Add => self.add(other),
            Operator::Sub => self.arithmetic(op, other, i64::checked_sub, |a, b| a - b),
            Operator::Mul => self.mul(other),
            Operator::Div => self.div(other),
            Operator::Eq => Ok(Value::Bool(self.loose_eq(other))),
            Operator::Neq => Ok(Value::Bool(!self.loose_eq(other))),
            Operator::Lt => ordered(Ordering::is_lt),
            Operator::Leq => ordered(Ordering::is_le),
            Operator::Gt => ordered(Ordering::is_gt),
            Operator::Geq => ordered(Ordering::is_ge),
        }
    }

    fn add(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (self, other) {
            (Value::Str(_), _) | (_, Value::Str(_)) => Ok(Value::Str(format!("{}{}", self, other))),
            _ => self.arithmetic(Operator::Add, other, i64::checked_add, |a, b| a + b),
        }
    }

    fn mul(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (self, other) {
            (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) if *n >= 0 => {
                let count = usize::try_from(*n).ok();
                match count.zip(count.and_then(|c| s.len().checked_mul(c))) {
                    Some((count, total)) if total <= MAX_STRING_BYTES => Ok(Value::Str(s.repeat(count))),
                    _ => Err(RuntimeError::StringTooLong { len: s.len(), count: *n }),
                }
            }
            _ => self.arithmetic(Operator::Mul, other, i64::checked_mul, |a, b| a * b),
        }
    }

    fn div(&self, other: &Value) -> Result<Value, RuntimeError> {
        let (Some(a), Some(b)) = (self.as_number(), other.as_number()) else {
            return Err(self.invalid(Operator::Div, other));
        };
        if b.as_f64() == 0.0 {
            return Err(RuntimeError::DivisionByZero);
        }
        Ok(Value::Float(a.as_f64() / b.as_f64()))
    }

    /// Integer arithmetic stays integral until it overflows or meets a float
    fn arithmetic(
        &self,
        op: Operator,
        other: &Value,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> Result<Value, RuntimeError> {
        match (self.as_number(), other.as_number()) {
            (Some(Number::Int(a)), Some(Number::Int(b))) => Ok(int_op(a, b)
                .map(Value::Int)
                .unwrap_or_else(|| Value::Float(float_op(a as f64, b as f64)))),
            (Some(a), Some(b)) => Ok(Value::Float(float_op(a.as_f64(), b.as_f64()))),
            _ => Err(self.invalid(op, other)),
        }
    }

    /// Moves half a step in the turn direction, then rounds with the tie going
    /// the same way: `4.2` turns up to 5 and down to 4, `5` turns down to 4.
    pub fn turned(&self, direction: Direction) -> Option<Value> {
        let n = self.as_number()?.as_f64();
        let rounded = match direction {
            Direction::Up => (n + 0.5 + 0.5).floor(),
            Direction::Down => (n - 0.5 - 0.5).ceil(),
        };
        Some(Value::Int(rounded as i64))
    }

    /// How a value is shown in error messages: strings keep quotes
    pub fn describe(&self) -> String {
        match self {
            Value::Str(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }

    fn invalid(&self, op: Operator, other: &Value) -> RuntimeError {
        RuntimeError::InvalidOperands {
            op: op.to_string(),
            left: self.describe(),
            right: other.describe(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{}", s),
            Value::Null => write!(f, "null"),
        }
    }
}
