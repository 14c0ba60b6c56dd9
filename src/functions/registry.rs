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

//! Function registry
//!
//! Maps function names (case-insensitive) and operator symbols to
//! factories. The global registry is built once on first use; fresh
//! function instances are created per call site because functions hold
//! their parameters.

use std::sync::OnceLock;

use ahash::AHashMap;

use crate::expr::context::ExpressionContext;
use crate::functions::{
    aggregate, arithmetic, comparison, date, logic, selection, string, value, window, Function,
};

type Factory = fn(&ExpressionContext) -> Box<dyn Function>;

/// Registry of function factories keyed by lowercase name
pub struct FunctionRegistry {
    factories: AHashMap<String, Factory>,
}

impl FunctionRegistry {
    fn register(&mut self, names: &[&str], factory: Factory) {
        for name in names {
            self.factories.insert(name.to_lowercase(), factory);
        }
    }

    /// Create a fresh instance of the named function
    pub fn create(&self, ctx: &ExpressionContext, name: &str) -> Option<Box<dyn Function>> {
        self.factories.get(&name.to_lowercase()).map(|f| f(ctx))
    }

    /// Whether a function with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn build() -> Self {
        let mut r = FunctionRegistry {
            factories: AHashMap::new(),
        };

        // Arithmetic operators
        r.register(&["add", "+"], |_| Box::new(arithmetic::add()));
        r.register(&["subtract", "-"], |_| Box::new(arithmetic::subtract()));
        r.register(&["multiply", "*"], |_| Box::new(arithmetic::multiply()));
        r.register(&["divide", "/"], |_| Box::new(arithmetic::divide()));
        r.register(&["modulus", "%"], |_| Box::new(arithmetic::modulus()));
        r.register(&["power", "^"], |_| Box::new(arithmetic::power()));
        r.register(&["negate"], |_| Box::new(arithmetic::negate()));
        r.register(&["brackets"], |_| Box::new(arithmetic::brackets()));

        // Comparison operators
        r.register(&["equals", "="], |_| Box::new(comparison::equals()));
        r.register(&["notEquals", "!="], |_| Box::new(comparison::not_equals()));
        r.register(&["greaterThan", ">"], |_| Box::new(comparison::greater_than()));
        r.register(&["greaterThanOrEqualTo", ">="], |_| {
            Box::new(comparison::greater_than_or_equal_to())
        });
        r.register(&["lessThan", "<"], |_| Box::new(comparison::less_than()));
        r.register(&["lessThanOrEqualTo", "<="], |_| {
            Box::new(comparison::less_than_or_equal_to())
        });

        // Logic
        r.register(&["if"], |_| Box::new(logic::IfFunction::new()));
        r.register(&["not"], |_| Box::new(logic::not()));
        r.register(&["and"], |_| Box::new(logic::and()));
        r.register(&["or"], |_| Box::new(logic::or()));
        r.register(&["true"], |_| Box::new(logic::r#true()));
        r.register(&["false"], |_| Box::new(logic::r#false()));

        // Aggregates
        r.register(&["count"], |_| Box::new(aggregate::CountFunction::new()));
        r.register(&["sum"], |_| Box::new(aggregate::sum()));
        r.register(&["min"], |_| Box::new(aggregate::min()));
        r.register(&["max"], |_| Box::new(aggregate::max()));
        r.register(&["average", "mean"], |_| {
            Box::new(aggregate::AverageFunction::new())
        });
        r.register(&["distinct"], |ctx| {
            Box::new(aggregate::DistinctFunction::new(ctx.max_string_length()))
        });
        r.register(&["joining"], |ctx| {
            Box::new(aggregate::JoiningFunction::new(ctx.max_string_length()))
        });

        // Selectors
        r.register(&["nth"], |_| Box::new(selection::nth()));
        r.register(&["top"], |_| Box::new(selection::top()));
        r.register(&["bottom"], |_| Box::new(selection::bottom()));

        // Strings
        r.register(&["concat"], |_| Box::new(string::concat()));
        r.register(&["stringLength"], |_| Box::new(string::string_length()));
        r.register(&["upperCase"], |_| Box::new(string::upper_case()));
        r.register(&["lowerCase"], |_| Box::new(string::lower_case()));
        r.register(&["substring"], |_| Box::new(string::substring()));
        r.register(&["replace"], |_| Box::new(string::replace()));
        r.register(&["match"], |_| Box::new(string::r#match()));

        // Values and casts
        r.register(&["null"], |_| Box::new(value::null()));
        r.register(&["err"], |_| Box::new(value::err()));
        r.register(&["typeOf"], |_| Box::new(value::type_of()));
        r.register(&["toBoolean"], |_| Box::new(value::to_boolean()));
        r.register(&["toDouble"], |_| Box::new(value::to_double()));
        r.register(&["toInteger"], |_| Box::new(value::to_integer()));
        r.register(&["toLong"], |_| Box::new(value::to_long()));
        r.register(&["toString"], |_| Box::new(value::to_string()));
        r.register(&["param"], |ctx| Box::new(value::param(ctx)));
        r.register(&["params"], |ctx| Box::new(value::params(ctx)));
        r.register(&["lookup"], |ctx| Box::new(value::lookup(ctx)));
        r.register(&["random"], |_| Box::new(value::RandomFunction::new()));

        // Dates
        r.register(&["parseDate"], |ctx| Box::new(date::parse_date(ctx)));
        r.register(&["formatDate"], |ctx| Box::new(date::format_date(ctx)));

        // Windowing
        r.register(&["period"], |_| Box::new(window::PeriodFunction::new()));

        r
    }
}

static REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

/// The process-wide function registry
pub fn global_registry() -> &'static FunctionRegistry {
    REGISTRY.get_or_init(FunctionRegistry::build)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let ctx = ExpressionContext::new();
        let registry = global_registry();
        assert!(registry.create(&ctx, "UPPERCASE").is_some());
        assert!(registry.create(&ctx, "uppercase").is_some());
        assert!(registry.create(&ctx, "upperCase").is_some());
        assert!(registry.create(&ctx, "noSuchFunction").is_none());
    }

    #[test]
    fn test_operator_aliases() {
        let ctx = ExpressionContext::new();
        let registry = global_registry();
        for symbol in ["+", "-", "*", "/", "%", "^", "=", "!=", ">", ">=", "<", "<="] {
            assert!(registry.create(&ctx, symbol).is_some(), "missing {symbol}");
        }
    }

    #[test]
    fn test_instances_are_fresh() {
        let ctx = ExpressionContext::new();
        let registry = global_registry();
        let a = registry.create(&ctx, "count").unwrap();
        let b = registry.create(&ctx, "count").unwrap();
        // Distinct allocations
        assert_ne!(
            Box::as_ref(&a) as *const dyn Function as *const u8,
            Box::as_ref(&b) as *const dyn Function as *const u8
        );
    }

    #[test]
    fn test_names_listed() {
        let names = global_registry().names();
        assert!(names.iter().any(|n| *n == "sum"));
        assert!(names.iter().any(|n| *n == "parsedate"));
    }
}
