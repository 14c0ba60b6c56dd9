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

//! Function implementations
//!
//! Every callable in the language implements [`Function`]. A function is
//! configured once at compile time (`set_params`, `register_slots`) and then
//! asked for a [`Generator`] that does the per-row work. Functions whose
//! arguments are all literals fold to a constant at compile time.

pub mod aggregate;
pub mod arithmetic;
pub mod comparison;
pub mod date;
pub mod logic;
pub mod registry;
pub mod selection;
pub mod string;
pub mod value;
pub mod window;

use std::fmt;

use crate::core::{Error, Result, Value};
use crate::executor::{Generator, GroupData, SlotRegistry, StaticGenerator, StoredValues};
use crate::expr::param::Param;

pub use registry::{global_registry, FunctionRegistry};

/// A callable in the expression language
///
/// Lifecycle: the parser constructs the function by name, calls
/// [`set_params`](Function::set_params) with the parsed arguments, the
/// expression compiler calls [`register_slots`](Function::register_slots)
/// once, and execution uses the generator from
/// [`make_generator`](Function::make_generator).
pub trait Function: fmt::Display + Send + Sync {
    /// Canonical name, used in error messages
    fn name(&self) -> &str;

    /// Accept the parsed arguments; arity and argument errors surface here
    fn set_params(&mut self, params: Vec<Param>) -> Result<()>;

    /// Allocate accumulator slots for this function and its children
    fn register_slots(&mut self, registry: &mut SlotRegistry);

    /// Build the runnable form; called after `register_slots`
    fn make_generator(&self) -> Box<dyn Generator>;

    /// Whether this function itself folds many rows into one value
    fn is_aggregate(&self) -> bool {
        false
    }

    /// Whether this function or any descendant is an aggregate
    fn has_aggregate(&self) -> bool;

    /// Whether evaluation needs access to the group's child rows
    fn requires_child_data(&self) -> bool {
        false
    }
}

/// Check an argument count against a function's arity; `usize::MAX` as the
/// upper bound means unbounded
pub(crate) fn check_arity(name: &str, min: usize, max: usize, got: usize) -> Result<()> {
    if got < min && max == usize::MAX {
        return Err(Error::invalid_argument(
            name,
            format!("expects at least {min} arguments, got {got}"),
        ));
    }
    if got < min || got > max {
        return Err(Error::arity(name, min, max, got));
    }
    Ok(())
}

/// The literal values of `params` if every param is a literal
pub(crate) fn literal_args(params: &[Param]) -> Option<Vec<Value>> {
    params
        .iter()
        .map(|p| match p {
            Param::Value(v) => Some(v.clone()),
            _ => None,
        })
        .collect()
}

pub(crate) fn any_aggregate(params: &[Param]) -> bool {
    params.iter().any(Param::has_aggregate)
}

pub(crate) fn any_requires_child_data(params: &[Param]) -> bool {
    params.iter().any(Param::requires_child_data)
}

/// Reject aggregate arguments; used by aggregates themselves
pub(crate) fn reject_nested_aggregate(name: &str, params: &[Param]) -> Result<()> {
    if any_aggregate(params) {
        return Err(Error::invalid_argument(
            name,
            "aggregate functions cannot be nested inside an aggregate",
        ));
    }
    Ok(())
}

/// Render `name(p1, p2, ...)`
pub(crate) fn write_call(f: &mut fmt::Formatter<'_>, name: &str, params: &[Param]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{param}")?;
    }
    write!(f, ")")
}

/// How a function renders back to expression text
#[derive(Debug, Clone, Copy)]
pub(crate) enum DisplayStyle {
    /// `name(a, b)`
    Call,
    /// `a<sym>b`
    Infix(&'static str),
    /// `<sym>a`
    Prefix(&'static str),
    /// `(a)`
    Paren,
}

/// A stateless function evaluated row-by-row over its argument values
///
/// Covers the bulk of the catalog: operators, casts, string functions, and
/// anything else that needs no accumulator of its own. When
/// `propagate_errors` is set (the default) an Error argument
/// short-circuits evaluation.
pub(crate) struct ScalarFunction {
    name: &'static str,
    min_args: usize,
    max_args: usize,
    eval: fn(&[Value]) -> Value,
    propagate_errors: bool,
    style: DisplayStyle,
    params: Vec<Param>,
    folded: Option<Value>,
}

impl ScalarFunction {
    pub fn new(
        name: &'static str,
        min_args: usize,
        max_args: usize,
        eval: fn(&[Value]) -> Value,
    ) -> Self {
        Self {
            name,
            min_args,
            max_args,
            eval,
            propagate_errors: true,
            style: DisplayStyle::Call,
            params: Vec::new(),
            folded: None,
        }
    }

    pub fn with_style(mut self, style: DisplayStyle) -> Self {
        self.style = style;
        self
    }

    /// A scalar function that sees Error arguments instead of
    /// short-circuiting on them
    pub fn raw(
        name: &'static str,
        min_args: usize,
        max_args: usize,
        eval: fn(&[Value]) -> Value,
    ) -> Self {
        Self {
            propagate_errors: false,
            ..Self::new(name, min_args, max_args, eval)
        }
    }

    fn eval_args(&self, args: &[Value]) -> Value {
        if self.propagate_errors {
            if let Some(err) = args.iter().find(|v| v.is_error()) {
                return err.clone();
            }
        }
        (self.eval)(args)
    }
}

impl fmt::Display for ScalarFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style {
            DisplayStyle::Call => write_call(f, self.name, &self.params),
            DisplayStyle::Infix(sym) if self.params.len() == 2 => {
                write!(f, "{}{}{}", self.params[0], sym, self.params[1])
            }
            DisplayStyle::Prefix(sym) if self.params.len() == 1 => {
                write!(f, "{}{}", sym, self.params[0])
            }
            DisplayStyle::Paren if self.params.len() == 1 => {
                write!(f, "({})", self.params[0])
            }
            _ => write_call(f, self.name, &self.params),
        }
    }
}

impl Function for ScalarFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn set_params(&mut self, params: Vec<Param>) -> Result<()> {
        check_arity(self.name, self.min_args, self.max_args, params.len())?;
        if let Some(args) = literal_args(&params) {
            let folded = self.eval_args(&args);
            // A literal-only call that produces an Error is a user mistake
            // we can report at compile time
            if self.propagate_errors {
                if let Some(message) = folded.error_message() {
                    return Err(Error::invalid_argument(self.name, message));
                }
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
        Box::new(ScalarGenerator {
            children: self.params.iter().map(Param::make_generator).collect(),
            eval: self.eval,
            propagate_errors: self.propagate_errors,
        })
    }

    fn has_aggregate(&self) -> bool {
        any_aggregate(&self.params)
    }

    fn requires_child_data(&self) -> bool {
        any_requires_child_data(&self.params)
    }
}

struct ScalarGenerator {
    children: Vec<Box<dyn Generator>>,
    eval: fn(&[Value]) -> Value,
    propagate_errors: bool,
}

impl Generator for ScalarGenerator {
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
        if self.propagate_errors {
            if let Some(err) = args.iter().find(|v| v.is_error()) {
                return err.clone();
            }
        }
        (self.eval)(&args)
    }

    fn merge(&self, target: &mut StoredValues, source: &StoredValues) {
        for child in &self.children {
            child.merge(target, source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_as_string(args: &[Value]) -> Value {
        match args[0].as_string() {
            Some(s) => Value::string(s),
            None => Value::Null,
        }
    }

    #[test]
    fn test_arity_error_text() {
        let mut f = ScalarFunction::new("stringLength", 1, 1, first_as_string);
        let err = f.set_params(vec![]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "function 'stringLength' expects between 1 and 1 arguments, got 0"
        );
    }

    #[test]
    fn test_literal_folding() {
        let mut f = ScalarFunction::new("probe", 1, 1, first_as_string);
        f.set_params(vec![Param::Value(Value::Long(5))]).unwrap();
        let mut registry = SlotRegistry::new();
        f.register_slots(&mut registry);
        assert_eq!(registry.slot_count(), 0);
        let storage = registry.create_storage();
        let gen = f.make_generator();
        assert_eq!(gen.evaluate(&storage, None), Value::string("5"));
    }

    #[test]
    fn test_literal_error_promoted() {
        fn always_error(_: &[Value]) -> Value {
            Value::error("boom")
        }
        let mut f = ScalarFunction::new("probe", 1, 1, always_error);
        let err = f.set_params(vec![Param::Value(Value::Long(1))]).unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_error_propagation() {
        let mut f = ScalarFunction::new("probe", 1, 1, first_as_string);
        f.set_params(vec![Param::Value(Value::error("upstream"))])
            .unwrap_err();
        // A non-literal error flows through at runtime instead
        let mut g = ScalarFunction::new("probe", 1, 1, first_as_string);
        let mut inner = ScalarFunction::raw("err", 0, 0, |_| Value::error("upstream"));
        inner.set_params(vec![]).unwrap();
        g.set_params(vec![Param::Function(Box::new(inner))]).unwrap();
        let mut registry = SlotRegistry::new();
        g.register_slots(&mut registry);
        let storage = registry.create_storage();
        let out = g.make_generator().evaluate(&storage, None);
        assert_eq!(out.error_message(), Some("upstream"));
    }
}
