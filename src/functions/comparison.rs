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

//! Comparison operators
//!
//! All six operators defer to the shared value comparator, so `'10' > 9`
//! compares numerically and near-equal doubles compare equal within
//! tolerance. Error operands propagate.

use std::cmp::Ordering;

use crate::core::compare::compare;
use crate::core::Value;
use crate::functions::{DisplayStyle, ScalarFunction};

pub fn equals() -> ScalarFunction {
    ScalarFunction::new("equals", 2, 2, eval_equals).with_style(DisplayStyle::Infix("="))
}

pub fn not_equals() -> ScalarFunction {
    ScalarFunction::new("notEquals", 2, 2, eval_not_equals).with_style(DisplayStyle::Infix("!="))
}

pub fn greater_than() -> ScalarFunction {
    ScalarFunction::new("greaterThan", 2, 2, eval_greater_than)
        .with_style(DisplayStyle::Infix(">"))
}

pub fn greater_than_or_equal_to() -> ScalarFunction {
    ScalarFunction::new("greaterThanOrEqualTo", 2, 2, eval_greater_than_or_equal_to)
        .with_style(DisplayStyle::Infix(">="))
}

pub fn less_than() -> ScalarFunction {
    ScalarFunction::new("lessThan", 2, 2, eval_less_than).with_style(DisplayStyle::Infix("<"))
}

pub fn less_than_or_equal_to() -> ScalarFunction {
    ScalarFunction::new("lessThanOrEqualTo", 2, 2, eval_less_than_or_equal_to)
        .with_style(DisplayStyle::Infix("<="))
}

fn eval_equals(args: &[Value]) -> Value {
    Value::Boolean(compare(&args[0], &args[1]) == Ordering::Equal)
}

fn eval_not_equals(args: &[Value]) -> Value {
    Value::Boolean(compare(&args[0], &args[1]) != Ordering::Equal)
}

fn eval_greater_than(args: &[Value]) -> Value {
    Value::Boolean(compare(&args[0], &args[1]) == Ordering::Greater)
}

fn eval_greater_than_or_equal_to(args: &[Value]) -> Value {
    Value::Boolean(compare(&args[0], &args[1]) != Ordering::Less)
}

fn eval_less_than(args: &[Value]) -> Value {
    Value::Boolean(compare(&args[0], &args[1]) == Ordering::Less)
}

fn eval_less_than_or_equal_to(args: &[Value]) -> Value {
    Value::Boolean(compare(&args[0], &args[1]) != Ordering::Greater)
}
