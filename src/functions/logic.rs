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

//! Boolean functions: `if`, `not`, `and`, `or`, `true`, `false`
//!
//! `if` evaluates its condition first and only reads the selected branch,
//! so an Error in the untaken branch never surfaces.

use std::fmt;

use crate::core::{Error, Result, Value};
use crate::executor::{Generator, GroupData, SlotRegistry, StaticGenerator, StoredValues};
use crate::expr::param::Param;
use crate::functions::{
    any_aggregate, any_requires_child_data, check_arity, literal_args, write_call, Function,
    ScalarFunction,
};

pub fn r#true() -> ScalarFunction {
    ScalarFunction::new("true", 0, 0, |_| Value::Boolean(true))
}

pub fn r#false() -> ScalarFunction {
    ScalarFunction::new("false", 0, 0, |_| Value::Boolean(false))
}

pub fn not() -> ScalarFunction {
    ScalarFunction::new("not", 1, 1, eval_not)
}

pub fn and() -> ScalarFunction {
    ScalarFunction::new("and", 2, usize::MAX, eval_and)
}

pub fn or() -> ScalarFunction {
    ScalarFunction::new("or", 2, usize::MAX, eval_or)
}

fn eval_not(args: &[Value]) -> Value {
    match args[0].as_boolean() {
        Some(b) => Value::Boolean(!b),
        None => non_boolean(&args[0]),
    }
}

fn eval_and(args: &[Value]) -> Value {
    for arg in args {
        match arg.as_boolean() {
            Some(true) => {}
            Some(false) => return Value::Boolean(false),
            None => return non_boolean(arg),
        }
    }
    Value::Boolean(true)
}

fn eval_or(args: &[Value]) -> Value {
    for arg in args {
        match arg.as_boolean() {
            Some(true) => return Value::Boolean(true),
            Some(false) => {}
            None => return non_boolean(arg),
        }
    }
    Value::Boolean(false)
}

fn non_boolean(v: &Value) -> Value {
    Value::error(format!("unable to convert {} value to a boolean", v.kind()))
}

/// `if(condition, then, else)` with lazy branch evaluation
pub struct IfFunction {
    params: Vec<Param>,
    folded: Option<Value>,
}

impl IfFunction {
    pub fn new() -> Self {
        Self {
            params: Vec::new(),
            folded: None,
        }
    }
}

impl Default for IfFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IfFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, "if", &self.params)
    }
}

impl Function for IfFunction {
    fn name(&self) -> &str {
        "if"
    }

    fn set_params(&mut self, params: Vec<Param>) -> Result<()> {
        check_arity("if", 3, 3, params.len())?;
        if let Some(args) = literal_args(&params) {
            let folded = select_branch(&args[0], &args[1], &args[2]);
            // A literal-only call that produces an Error is a user mistake
            // we can report at compile time
            if let Some(message) = folded.error_message() {
                return Err(Error::invalid_argument("if", message));
            }
            self.folded = Some(folded);
        }
        self.params = params;
        Ok(())
    }

    fn register_slots(&mut self, registry: &mut SlotRegistry) {
        if self.folded.is_none() {
            for param in &mut self.params {
                param.register_slots(registry);
            }
        }
    }

    fn make_generator(&self) -> Box<dyn Generator> {
        if let Some(folded) = &self.folded {
            return Box::new(StaticGenerator::new(folded.clone()));
        }
        Box::new(IfGenerator {
            condition: self.params[0].make_generator(),
            then_branch: self.params[1].make_generator(),
            else_branch: self.params[2].make_generator(),
        })
    }

    fn has_aggregate(&self) -> bool {
        any_aggregate(&self.params)
    }

    fn requires_child_data(&self) -> bool {
        any_requires_child_data(&self.params)
    }
}

struct IfGenerator {
    condition: Box<dyn Generator>,
    then_branch: Box<dyn Generator>,
    else_branch: Box<dyn Generator>,
}

impl Generator for IfGenerator {
    fn apply_row(&self, row: &[Value], storage: &mut StoredValues) {
        // Both branches must see every row; which one is read is decided
        // at evaluation time
        self.condition.apply_row(row, storage);
        self.then_branch.apply_row(row, storage);
        self.else_branch.apply_row(row, storage);
    }

    fn evaluate(&self, storage: &StoredValues, group: Option<&dyn GroupData>) -> Value {
        let condition = self.condition.evaluate(storage, group);
        if condition.is_error() {
            return condition;
        }
        match condition.as_boolean() {
            Some(true) => self.then_branch.evaluate(storage, group),
            Some(false) => self.else_branch.evaluate(storage, group),
            None => non_boolean(&condition),
        }
    }

    fn merge(&self, target: &mut StoredValues, source: &StoredValues) {
        self.condition.merge(target, source);
        self.then_branch.merge(target, source);
        self.else_branch.merge(target, source);
    }
}

fn select_branch(condition: &Value, then_value: &Value, else_value: &Value) -> Value {
    if condition.is_error() {
        return condition.clone();
    }
    match condition.as_boolean() {
        Some(true) => then_value.clone(),
        Some(false) => else_value.clone(),
        None => non_boolean(condition),
    }
}
