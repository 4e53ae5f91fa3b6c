//! Numeric and equality primitives used by ADD and EQ.
//!
//! Integers overflow into [`BigInt`] and big results that fit back into an
//! `i64` are narrowed again, so `Int` and `BigInt` never hold the same number.

use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::error::{VmError, VmResult};
use crate::value::Value;

fn normalize(n: BigInt) -> Value {
    match n.to_i64() {
        Some(small) => Value::Int(small),
        None => Value::BigInt(Arc::new(n)),
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::BigInt(n) => n.to_f64(),
        Value::Float(n) => Some(*n),
        _ => None,
    }
}

/// `a + b` over the numeric variants.
///
/// # Examples
///
/// ```
/// use core_types::{numbers, Value};
///
/// assert_eq!(numbers::add(&Value::Int(40), &Value::Int(2)), Ok(Value::Int(42)));
/// assert_eq!(numbers::add(&Value::Int(1), &Value::Float(0.5)), Ok(Value::Float(1.5)));
/// ```
pub fn add(a: &Value, b: &Value) -> VmResult<Value> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(match x.checked_add(*y) {
            Some(sum) => Value::Int(sum),
            None => normalize(BigInt::from(*x) + BigInt::from(*y)),
        }),
        (Value::BigInt(x), Value::BigInt(y)) => Ok(normalize(x.as_ref() + y.as_ref())),
        (Value::BigInt(x), Value::Int(y)) | (Value::Int(y), Value::BigInt(x)) => {
            Ok(normalize(x.as_ref() + BigInt::from(*y)))
        }
        (Value::Float(_), _) | (_, Value::Float(_)) => match (as_float(a), as_float(b)) {
            (Some(x), Some(y)) => Ok(Value::Float(x + y)),
            (None, _) => Err(VmError::type_mismatch("number", a)),
            (_, None) => Err(VmError::type_mismatch("number", b)),
        },
        (Value::Int(_) | Value::BigInt(_), _) => Err(VmError::type_mismatch("number", b)),
        _ => Err(VmError::type_mismatch("number", a)),
    }
}

/// Value equality as seen by EQ; always yields a boolean value.
pub fn eq(a: &Value, b: &Value) -> Value {
    Value::Bool(values_equal(a, b))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::BigInt(y)) | (Value::BigInt(y), Value::Int(x)) => {
            y.as_ref() == &BigInt::from(*x)
        }
        (Value::Float(_), Value::Int(_) | Value::BigInt(_))
        | (Value::Int(_) | Value::BigInt(_), Value::Float(_)) => as_float(a) == as_float(b),
        _ => a == b,
    }
}
