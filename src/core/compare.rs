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

//! Kind-aware comparison of [`Value`] instances
//!
//! The comparator is total-ish and degrades gracefully across kinds:
//! numeric kinds compare numerically, numeric-looking strings compare
//! numerically against numbers, and lexical string comparison is the final
//! fallback. Null and Error sort after every real value.
//!
//! The numeric rules are load-bearing for sort stability downstream:
//! integers compare as longs when neither operand has a fractional part,
//! and double comparison treats values within a relative tolerance of
//! `1e-5` as equal. Do not tighten either rule.

use std::cmp::Ordering;

use super::value::{Kind, Value};

/// Relative tolerance used when comparing values as doubles
const DOUBLE_TOLERANCE: f64 = 1e-5;

/// How to compare a particular pair of kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    AsBoolean,
    AsLong,
    AsDouble,
    AsDoubleThenString,
    AsLongThenString,
    AsString,
}

/// Compare two values, case-sensitive for string comparisons
pub fn compare(a: &Value, b: &Value) -> Ordering {
    compare_with(a, b, true)
}

/// Compare two values, case-insensitive for string comparisons
pub fn compare_insensitive(a: &Value, b: &Value) -> Ordering {
    compare_with(a, b, false)
}

fn compare_with(a: &Value, b: &Value, case_sensitive: bool) -> Ordering {
    // Null sorts after everything, Error after everything but Null.
    // Two Nulls or two Errors are equal.
    match (a.is_null(), b.is_null()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    match (a.is_error(), b.is_error()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    if a.kind() == b.kind() {
        return compare_same_kind(a, b, case_sensitive);
    }

    if a.has_numeric_value() && b.has_numeric_value() {
        // Mixed numeric-ish kinds, possibly a numeric string against a
        // number. Longs avoid the precision problems doubles bring, so use
        // them whenever neither side has a fractional part.
        if !a.has_fractional_part() && !b.has_fractional_part() {
            return cmp_as_long(a, b);
        }
        return cmp_as_double_with_tolerance(a, b);
    }

    match pair_strategy(a.kind(), b.kind()) {
        Some(Strategy::AsBoolean) => cmp_opt(a.as_boolean(), b.as_boolean()),
        Some(Strategy::AsLong) => cmp_as_long(a, b),
        Some(Strategy::AsDouble) => cmp_as_double_with_tolerance(a, b),
        Some(Strategy::AsDoubleThenString) => cmp_as_double_with_tolerance(a, b)
            .then_with(|| cmp_strings(a, b, case_sensitive)),
        Some(Strategy::AsLongThenString) => {
            cmp_as_long(a, b).then_with(|| cmp_strings(a, b, case_sensitive))
        }
        Some(Strategy::AsString) | None => cmp_strings(a, b, case_sensitive),
    }
}

fn compare_same_kind(a: &Value, b: &Value, case_sensitive: bool) -> Ordering {
    match (a, b) {
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::Byte(x), Value::Byte(y)) => x.cmp(y),
        (Value::Short(x), Value::Short(y)) => x.cmp(y),
        (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
        (Value::Long(x), Value::Long(y)) => x.cmp(y),
        // Same tolerance as the cross-kind path, so `=` behaves the same
        // whether or not both sides are already doubles
        (Value::Float(_), Value::Float(_)) | (Value::Double(_), Value::Double(_)) => {
            cmp_as_double_with_tolerance(a, b)
        }
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (Value::Duration(x), Value::Duration(y)) => x.cmp(y),
        // Numeric-looking strings compare numerically against each other,
        // then lexically as the tiebreak
        (Value::Str(_), Value::Str(_)) => {
            if a.has_numeric_value() && b.has_numeric_value() {
                cmp_as_double_with_tolerance(a, b).then_with(|| cmp_strings(a, b, case_sensitive))
            } else {
                cmp_strings(a, b, case_sensitive)
            }
        }
        _ => cmp_strings(a, b, case_sensitive),
    }
}

/// Fixed pairwise table of cross-kind comparators, reproduced from the
/// original rules. Pairs are symmetric; absent entries fall back to lexical
/// string comparison at the call site.
fn pair_strategy(k1: Kind, k2: Kind) -> Option<Strategy> {
    use Kind::*;
    let lookup = |a: Kind, b: Kind| -> Option<Strategy> {
        match (a, b) {
            (Boolean, Long) | (Boolean, Integer) | (Boolean, Byte) | (Boolean, Short) => {
                Some(Strategy::AsLong)
            }
            (Boolean, String) => Some(Strategy::AsBoolean),

            // May be comparing "1.23" with 10
            (String, Long) | (String, Integer) | (String, Byte) | (String, Short)
            | (String, Double) | (String, Float) => Some(Strategy::AsDoubleThenString),
            (Xml, Long) | (Xml, Integer) | (Xml, Double) | (Xml, Float) => {
                Some(Strategy::AsDoubleThenString)
            }

            (Duration, Long) | (Duration, Integer) | (Duration, Byte) | (Duration, Short)
            | (Duration, Float) | (Duration, Double) => Some(Strategy::AsLong),
            (Duration, String) => Some(Strategy::AsLongThenString),

            (Date, Long) | (Date, Integer) | (Date, Byte) | (Date, Short) | (Date, Float)
            | (Date, Double) => Some(Strategy::AsLong),
            (Date, String) => Some(Strategy::AsLongThenString),

            (Error, String) => Some(Strategy::AsString),
            (Null, String) => Some(Strategy::AsString),
            _ => None,
        }
    };
    lookup(k1, k2).or_else(|| lookup(k2, k1))
}

fn cmp_as_long(a: &Value, b: &Value) -> Ordering {
    cmp_opt(a.as_long(), b.as_long())
}

/// Double comparison treating values within a relative tolerance as equal
fn cmp_as_double_with_tolerance(a: &Value, b: &Value) -> Ordering {
    match (a.as_double(), b.as_double()) {
        (Some(d1), Some(d2)) => {
            if (d1 - d2).abs() < DOUBLE_TOLERANCE * d2.abs() {
                Ordering::Equal
            } else {
                cmp_doubles(d1, d2)
            }
        }
        (x, y) => cmp_opt(x, y),
    }
}

/// Compare two doubles with NaN ordered last
fn cmp_doubles(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn cmp_strings(a: &Value, b: &Value, case_sensitive: bool) -> Ordering {
    let s1 = a.as_string().unwrap_or_default();
    let s2 = b.as_string().unwrap_or_default();
    if case_sensitive {
        s1.cmp(&s2)
    } else {
        s1.to_lowercase().cmp(&s2.to_lowercase())
    }
}

/// Compare options with None ordered last
fn cmp_opt<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
