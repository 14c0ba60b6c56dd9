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

//! String functions
//!
//! `match` and `replace` take regular expressions; a literal pattern is
//! compiled once at parse time and a bad literal pattern fails the parse.
//! Dynamic patterns compile through the shared pattern cache and a bad
//! pattern becomes an Error value.

use std::fmt;

use regex::Regex;

use crate::core::{Error, Result, Value};
use crate::executor::{
    compile_pattern, Generator, GroupData, SlotRegistry, StaticGenerator, StoredValues,
};
use crate::expr::param::Param;
use crate::functions::{
    any_aggregate, any_requires_child_data, check_arity, literal_args, write_call, Function,
    ScalarFunction,
};

pub fn concat() -> ScalarFunction {
    ScalarFunction::new("concat", 1, usize::MAX, eval_concat)
}

pub fn string_length() -> ScalarFunction {
    ScalarFunction::new("stringLength", 1, 1, eval_string_length)
}

pub fn upper_case() -> ScalarFunction {
    ScalarFunction::new("upperCase", 1, 1, eval_upper_case)
}

pub fn lower_case() -> ScalarFunction {
    ScalarFunction::new("lowerCase", 1, 1, eval_lower_case)
}

pub fn substring() -> ScalarFunction {
    ScalarFunction::new("substring", 3, 3, eval_substring)
}

fn eval_concat(args: &[Value]) -> Value {
    // Null arguments contribute nothing
    let mut out = String::new();
    for arg in args {
        if let Some(s) = arg.as_string() {
            out.push_str(&s);
        }
    }
    Value::string(out)
}

fn eval_string_length(args: &[Value]) -> Value {
    match args[0].as_string() {
        Some(s) => Value::Long(s.chars().count() as i64),
        None => Value::Null,
    }
}

fn eval_upper_case(args: &[Value]) -> Value {
    match args[0].as_string() {
        Some(s) => Value::string(s.to_uppercase()),
        None => Value::Null,
    }
}

fn eval_lower_case(args: &[Value]) -> Value {
    match args[0].as_string() {
        Some(s) => Value::string(s.to_lowercase()),
        None => Value::Null,
    }
}

fn eval_substring(args: &[Value]) -> Value {
    let Some(s) = args[0].as_string() else {
        return Value::Null;
    };
    let (Some(start), Some(end)) = (args[1].as_long(), args[2].as_long()) else {
        return Value::error("substring positions must be numbers");
    };
    let chars: Vec<char> = s.chars().collect();
    let start = start.max(0) as usize;
    let end = (end.max(0) as usize).min(chars.len());
    if start >= end {
        return Value::string("");
    }
    Value::string(chars[start..end].iter().collect::<String>())
}

#[derive(Clone, Copy)]
enum RegexMode {
    /// `match(input, pattern)` - full-string match
    Match,
    /// `replace(input, pattern, replacement)` - replace all matches
    Replace,
}

pub fn r#match() -> RegexFunction {
    RegexFunction::new("match", RegexMode::Match, 2)
}

pub fn replace() -> RegexFunction {
    RegexFunction::new("replace", RegexMode::Replace, 3)
}

/// A function taking a regular expression argument
pub struct RegexFunction {
    name: &'static str,
    mode: RegexMode,
    arity: usize,
    params: Vec<Param>,
    /// Compiled form of a literal pattern
    regex: Option<Regex>,
    folded: Option<Value>,
}

impl RegexFunction {
    fn new(name: &'static str, mode: RegexMode, arity: usize) -> Self {
        Self {
            name,
            mode,
            arity,
            params: Vec::new(),
            regex: None,
            folded: None,
        }
    }

    fn apply(&self, args: &[Value]) -> Value {
        apply_regex(self.name, self.mode, self.regex.as_ref(), args)
    }
}

fn apply_regex(name: &str, mode: RegexMode, regex: Option<&Regex>, args: &[Value]) -> Value {
    if let Some(err) = args.iter().find(|v| v.is_error()) {
        return err.clone();
    }
    let Some(input) = args[0].as_string() else {
        return Value::Null;
    };
    let regex = match regex {
        Some(regex) => regex.clone(),
        None => {
            let Some(pattern) = args[1].as_string() else {
                return Value::error(format!("{name}: pattern is null"));
            };
            match compile_for(&mode, &pattern) {
                Ok(regex) => regex,
                Err(message) => return Value::error(format!("{name}: {message}")),
            }
        }
    };
    match mode {
        RegexMode::Match => Value::Boolean(regex.is_match(&input)),
        RegexMode::Replace => {
            let Some(replacement) = args[2].as_string() else {
                return Value::error("replace: replacement is null");
            };
            Value::string(regex.replace_all(&input, replacement.as_str()).into_owned())
        }
    }
}

/// Full-string semantics for `match`; `replace` uses the pattern as given
fn compile_for(mode: &RegexMode, pattern: &str) -> std::result::Result<Regex, String> {
    match mode {
        RegexMode::Match => compile_pattern(&format!("^(?:{pattern})$")),
        RegexMode::Replace => compile_pattern(pattern),
    }
}

impl fmt::Display for RegexFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, self.name, &self.params)
    }
}

impl Function for RegexFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn set_params(&mut self, params: Vec<Param>) -> Result<()> {
        check_arity(self.name, self.arity, self.arity, params.len())?;
        // A literal pattern compiles now and a bad one fails the parse
        if let Param::Value(pattern) = &params[1] {
            let Some(pattern) = pattern.as_string() else {
                return Err(Error::invalid_argument(self.name, "pattern must be a string"));
            };
            match compile_for(&self.mode, &pattern) {
                Ok(regex) => self.regex = Some(regex),
                Err(message) => return Err(Error::invalid_argument(self.name, message)),
            }
        }
        self.params = params;
        if let Some(args) = literal_args(&self.params) {
            let folded = self.apply(&args);
            if let Some(message) = folded.error_message() {
                return Err(Error::invalid_argument(self.name, message));
            }
            self.folded = Some(folded);
        }
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
        Box::new(RegexGenerator {
            children: self.params.iter().map(Param::make_generator).collect(),
            name: self.name,
            mode: self.mode,
            regex: self.regex.clone(),
        })
    }

    fn has_aggregate(&self) -> bool {
        any_aggregate(&self.params)
    }

    fn requires_child_data(&self) -> bool {
        any_requires_child_data(&self.params)
    }
}

struct RegexGenerator {
    children: Vec<Box<dyn Generator>>,
    name: &'static str,
    mode: RegexMode,
    regex: Option<Regex>,
}

impl Generator for RegexGenerator {
    fn apply_row(&self, row: &[Value], storage: &mut StoredValues) {
        for child in &self.children {
            child.apply_row(row, storage);
        }
    }

    fn evaluate(&self, storage: &StoredValues, group: Option<&dyn GroupData>) -> Value {
        let args: Vec<Value> = self
            .children
            .iter()
            .map(|child| child.evaluate(storage, group))
            .collect();
        apply_regex(self.name, self.mode, self.regex.as_ref(), &args)
    }

    fn merge(&self, target: &mut StoredValues, source: &StoredValues) {
        for child in &self.children {
            child.merge(target, source);
        }
    }
}
