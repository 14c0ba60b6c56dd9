// Copyright 2025 Veld Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Arithmetic operators
//!
//! Plain numeric arithmetic evaluates as doubles. `+` and `-` additionally
//! understand dates, durations and (for `+`) string concatenation:
//!
//! - Date + Duration = Date, Date - Duration = Date
//! - Date - Date = Duration
//! - Duration +/- Duration = Duration
//!
//! Null operands make the result Null; Error operands propagate; anything
//! else that cannot be coerced to a number becomes an Error value.

use crate::core::value::Num;
use crate::core::{Kind, Value};
use crate::functions::{DisplayStyle, ScalarFunction};

pub fn add() -> ScalarFunction {
    ScalarFunction::new("add", 2, 2, eval_add).with_style(DisplayStyle::Infix("+"))
}

pub fn subtract() -> ScalarFunction {
    ScalarFunction::new("subtract", 2, 2, eval_subtract).with_style(DisplayStyle::Infix("-"))
}

pub fn multiply() -> ScalarFunction {
    ScalarFunction::new("multiply", 2, 2, eval_multiply).with_style(DisplayStyle::Infix("*"))
}

pub fn divide() -> ScalarFunction {
    ScalarFunction::new("divide", 2, 2, eval_divide).with_style(DisplayStyle::Infix("/"))
}

pub fn modulus() -> ScalarFunction {
    ScalarFunction::new("modulus", 2, 2, eval_modulus).with_style(DisplayStyle::Infix("%"))
}

pub fn power() -> ScalarFunction {
    ScalarFunction::new("power", 2, 2, eval_power).with_style(DisplayStyle::Infix("^"))
}

pub fn negate() -> ScalarFunction {
    ScalarFunction::new("negate", 1, 1, eval_negate).with_style(DisplayStyle::Prefix("-"))
}

/// Unnamed bracket group; evaluation is identity
pub fn brackets() -> ScalarFunction {
    ScalarFunction::new("brackets", 1, 1, |args| args[0].clone()).with_style(DisplayStyle::Paren)
}

/// The `+` semantics as a standalone combine, shared with `sum`
pub(crate) fn add_values(a: &Value, b: &Value) -> Value {
    if a.is_null() || b.is_null() {
        return Value::Null;
    }
    match (a.kind(), b.kind()) {
        (Kind::String, _) | (_, Kind::String) | (Kind::Xml, _) | (_, Kind::Xml) => {
            // Numeric strings coerce like numbers; concatenation is the
            // fallback when either side has no numeric value
            if a.has_numeric_value() && b.has_numeric_value() {
                return numeric_op(a, b, "+", |x, y| x + y);
            }
            let mut out = a.to_string();
            out.push_str(&b.to_string());
            Value::string(out)
        }
        (Kind::Date, Kind::Duration) | (Kind::Duration, Kind::Date) => {
            let (Some(x), Some(y)) = (a.as_long(), b.as_long()) else {
                return Value::error("unable to add date and duration");
            };
            match x.checked_add(y) {
                Some(ms) => Value::Date(ms),
                None => Value::error("date arithmetic overflow"),
            }
        }
        (Kind::Duration, Kind::Duration) => {
            let (Some(x), Some(y)) = (a.as_long(), b.as_long()) else {
                return Value::error("unable to add durations");
            };
            match x.checked_add(y) {
                Some(ms) => Value::Duration(ms),
                None => Value::error("duration arithmetic overflow"),
            }
        }
        (Kind::Date, Kind::Date) => Value::error("unable to add two dates"),
        _ => numeric_op(a, b, "+", |x, y| x + y),
    }
}

fn eval_add(args: &[Value]) -> Value {
    add_values(&args[0], &args[1])
}

fn eval_subtract(args: &[Value]) -> Value {
    let (a, b) = (&args[0], &args[1]);
    if a.is_null() || b.is_null() {
        return Value::Null;
    }
    match (a.kind(), b.kind()) {
        (Kind::Date, Kind::Date) => {
            let (Some(x), Some(y)) = (a.as_long(), b.as_long()) else {
                return Value::error("unable to subtract dates");
            };
            match x.checked_sub(y) {
                Some(ms) => Value::Duration(ms),
                None => Value::error("date arithmetic overflow"),
            }
        }
        (Kind::Date, Kind::Duration) => {
            let (Some(x), Some(y)) = (a.as_long(), b.as_long()) else {
                return Value::error("unable to subtract duration from date");
            };
            match x.checked_sub(y) {
                Some(ms) => Value::Date(ms),
                None => Value::error("date arithmetic overflow"),
            }
        }
        (Kind::Duration, Kind::Duration) => {
            let (Some(x), Some(y)) = (a.as_long(), b.as_long()) else {
                return Value::error("unable to subtract durations");
            };
            match x.checked_sub(y) {
                Some(ms) => Value::Duration(ms),
                None => Value::error("duration arithmetic overflow"),
            }
        }
        _ => numeric_op(a, b, "-", |x, y| x - y),
    }
}

fn eval_multiply(args: &[Value]) -> Value {
    binary_numeric(args, "*", |x, y| x * y)
}

fn eval_divide(args: &[Value]) -> Value {
    let (a, b) = (&args[0], &args[1]);
    if a.is_null() || b.is_null() {
        return Value::Null;
    }
    if b.as_double() == Some(0.0) {
        return Value::error("division by zero");
    }
    numeric_op(a, b, "/", |x, y| x / y)
}

fn eval_modulus(args: &[Value]) -> Value {
    let (a, b) = (&args[0], &args[1]);
    if a.is_null() || b.is_null() {
        return Value::Null;
    }
    if b.as_double() == Some(0.0) {
        return Value::error("modulus by zero");
    }
    numeric_op(a, b, "%", |x, y| x % y)
}

fn eval_power(args: &[Value]) -> Value {
    binary_numeric(args, "^", f64::powf)
}

fn eval_negate(args: &[Value]) -> Value {
    let v = &args[0];
    if v.is_null() {
        return Value::Null;
    }
    match v {
        Value::Byte(b) => Value::Byte(b.wrapping_neg()),
        Value::Short(s) => Value::Short(s.wrapping_neg()),
        Value::Integer(i) => Value::Integer(i.wrapping_neg()),
        Value::Long(l) => Value::Long(l.wrapping_neg()),
        Value::Float(f) => Value::Float(-f),
        Value::Double(d) => Value::Double(-d),
        Value::Duration(ms) => Value::Duration(ms.wrapping_neg()),
        other => match other.numeric() {
            Some(Num::Long(l)) => Value::Long(l.wrapping_neg()),
            Some(Num::Double(d)) => Value::Double(-d),
            None => Value::error(format!("unable to negate {} value", other.kind())),
        },
    }
}

fn binary_numeric(args: &[Value], sym: &str, f: fn(f64, f64) -> f64) -> Value {
    let (a, b) = (&args[0], &args[1]);
    if a.is_null() || b.is_null() {
        return Value::Null;
    }
    numeric_op(a, b, sym, f)
}

fn numeric_op(a: &Value, b: &Value, sym: &str, f: fn(f64, f64) -> f64) -> Value {
    match (a.as_double(), b.as_double()) {
        (Some(x), Some(y)) => {
            let result = f(x, y);
            if result.is_finite() {
                Value::Double(result)
            } else {
                Value::error(format!("'{sym}' produced a non-finite result"))
            }
        }
        _ => {
            let kind = if a.as_double().is_none() { a.kind() } else { b.kind() };
            Value::error(format!("unable to evaluate '{sym}' on {kind} value"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval2(f: fn(&[Value]) -> Value, a: Value, b: Value) -> Value {
        f(&[a, b])
    }

    #[test]
    fn test_add_numbers() {
        assert_eq!(eval2(eval_add, Value::Long(2), Value::Long(3)), Value::Double(5.0));
        assert_eq!(
            eval2(eval_add, Value::Double(1.5), Value::string("2.5")),
            Value::Double(4.0)
        );
    }

    #[test]
    fn test_add_strings_concatenates() {
        assert_eq!(
            eval2(eval_add, Value::string("abc"), Value::string("def")),
            Value::string("abcdef")
        );
        assert_eq!(
            eval2(eval_add, Value::string("n="), Value::Long(3)),
            Value::string("n=3")
        );
    }

    #[test]
    fn test_add_null() {
        assert!(eval2(eval_add, Value::Null, Value::Long(1)).is_null());
    }

    #[test]
    fn test_date_and_duration() {
        assert_eq!(
            eval2(eval_add, Value::Date(1000), Value::Duration(500)),
            Value::Date(1500)
        );
        assert_eq!(
            eval2(eval_subtract, Value::Date(1500), Value::Duration(500)),
            Value::Date(1000)
        );
        assert_eq!(
            eval2(eval_subtract, Value::Date(1500), Value::Date(1000)),
            Value::Duration(500)
        );
        assert_eq!(
            eval2(eval_add, Value::Duration(100), Value::Duration(200)),
            Value::Duration(300)
        );
        assert!(eval2(eval_add, Value::Date(1), Value::Date(2)).is_error());
    }

    #[test]
    fn test_divide_and_modulus_by_zero() {
        assert!(eval2(eval_divide, Value::Long(1), Value::Long(0)).is_error());
        assert!(eval2(eval_modulus, Value::Long(8), Value::Long(0)).is_error());
        assert_eq!(eval2(eval_modulus, Value::Long(8), Value::Long(3)), Value::Double(2.0));
    }

    #[test]
    fn test_power() {
        assert_eq!(eval2(eval_power, Value::Long(2), Value::Long(10)), Value::Double(1024.0));
    }

    #[test]
    fn test_negate() {
        assert_eq!(eval_negate(&[Value::Long(3)]), Value::Long(-3));
        assert_eq!(eval_negate(&[Value::Double(1.5)]), Value::Double(-1.5));
        assert_eq!(eval_negate(&[Value::string("4")]), Value::Long(-4));
        assert!(eval_negate(&[Value::Null]).is_null());
        assert!(eval_negate(&[Value::string("abc")]).is_error());
    }

    #[test]
    fn test_non_numeric_operand() {
        let out = eval2(eval_multiply, Value::string("abc"), Value::Long(2));
        assert!(out.is_error());
    }
}
