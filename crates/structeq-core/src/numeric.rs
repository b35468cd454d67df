//! Numeric equivalence across widths.
//!
//! Exact types (`i64`, `u64`, `Decimal`) compare by exact decimal value, so
//! `Int(1) == Decimal(1.00)`. As soon as either side is floating-point both
//! sides are compared as `f64` with a relative tolerance; near zero, where
//! relative error is meaningless, an absolute threshold of
//! `epsilon * f64::MIN_POSITIVE` applies instead.
use std::str::FromStr;

use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};

use crate::value::Number;

/// Default relative tolerance for floating-point comparison.
pub const DEFAULT_EPSILON: f64 = 1e-15;

/// Returns `true` if `a` and `b` are numerically equivalent.
pub fn numbers_equal(a: &Number, b: &Number, epsilon: f64) -> bool {
    if a.is_floating() || b.is_floating() {
        return match (finite_or_special_f64(a), finite_or_special_f64(b)) {
            (Some(x), Some(y)) => nearly_equal(x, y, epsilon),
            _ => false,
        };
    }
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x == y,
        (Number::UInt(x), Number::UInt(y)) => x == y,
        (Number::Int(x), Number::UInt(y)) | (Number::UInt(y), Number::Int(x)) => {
            i128::from(*x) == i128::from(*y)
        }
        _ => to_decimal(a) == to_decimal(b),
    }
}

/// Parses `text` as a decimal number and compares it with `number`.
///
/// Used for the string/number cross-matching option. Text that does not
/// parse as a number never matches.
pub fn text_matches_number(text: &str, number: &Number, epsilon: f64) -> bool {
    match BigDecimal::from_str(text) {
        Ok(parsed) => numbers_equal(&Number::Decimal(parsed), number, epsilon),
        Err(_) => false,
    }
}

/// Relative/absolute-threshold floating comparison.
///
/// Two NaNs are equal (so that every value equals itself); infinities are
/// equal only to an infinity of the same sign.
pub fn nearly_equal(a: f64, b: f64, epsilon: f64) -> bool {
    if a == b {
        return true;
    }
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    if a.is_infinite() || b.is_infinite() {
        return false;
    }
    let diff = (a - b).abs();
    let norm = a.abs() + b.abs();
    if a == 0.0 || b == 0.0 || norm < f64::MIN_POSITIVE {
        return diff < epsilon * f64::MIN_POSITIVE;
    }
    diff / norm.min(f64::MAX) < epsilon
}

/// Exact decimal value of an exact-typed number.
pub(crate) fn to_decimal(n: &Number) -> BigDecimal {
    match n {
        Number::Int(v) => BigDecimal::from(*v),
        Number::UInt(v) => BigDecimal::from(*v),
        Number::Decimal(d) => d.clone(),
        Number::F32(v) => BigDecimal::from_f64(f64::from(*v)).unwrap_or_default(),
        Number::F64(v) => BigDecimal::from_f64(*v).unwrap_or_default(),
    }
}

/// `f64` view of a number. Decimals outside the finite `f64` range yield
/// `None` and therefore never equal a floating-point operand; genuine float
/// infinities and NaN pass through.
pub(crate) fn finite_or_special_f64(n: &Number) -> Option<f64> {
    match n {
        Number::Int(v) => Some(*v as f64),
        Number::UInt(v) => Some(*v as f64),
        Number::F32(v) => Some(f64::from(*v)),
        Number::F64(v) => Some(*v),
        Number::Decimal(d) => d.to_f64().filter(|f| f.is_finite()),
    }
}
