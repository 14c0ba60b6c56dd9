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

//! # Veld
//!
//! An embeddable expression language for streaming aggregation. Expressions
//! compile once against a [`FieldIndex`], then run as [`Generator`] trees
//! that fold row batches into per-group storage arenas which can be merged
//! across partial result sets.
//!
//! ## Features
//!
//! - Infix arithmetic and comparison with function-call syntax for
//!   everything else, e.g. `sum(${value}) / count()`
//! - A closed [`Value`] type with explicit coercion rules; row-level
//!   failures travel as Error values instead of aborting the query
//! - Mergeable aggregates (`sum`, `count`, `average`, `min`, `max`,
//!   `distinct`, `joining`) whose partial states combine exactly as if
//!   all rows had been seen by one instance
//! - Group row selectors (`nth`, `top`, `bottom`) and windowed
//!   aggregation over iteration-tagged batches (`period`)
//! - Constant subtrees fold at compile time
//!
//! ## Example
//!
//! ```
//! use veld::{Expression, ExpressionContext, ExpressionParser, FieldIndex, Value};
//!
//! # fn main() -> veld::Result<()> {
//! let ctx = ExpressionContext::new();
//! let fields = FieldIndex::new();
//! let parser = ExpressionParser::new();
//!
//! let expression = parser
//!     .parse(&ctx, &fields, "sum(${value}) + 10")?
//!     .ok_or_else(|| veld::Error::parse("blank expression", "", 0))?;
//!
//! let generator = expression.make_generator();
//! let mut storage = expression.create_storage();
//! generator.apply_row(&[Value::Long(3)], &mut storage);
//! generator.apply_row(&[Value::Long(4)], &mut storage);
//!
//! assert_eq!(generator.evaluate(&storage, None), Value::Double(17.0));
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod executor;
pub mod expr;
pub mod functions;
pub mod parser;

pub use crate::core::{Error, FieldIndex, Kind, Result, Value};
pub use crate::executor::{Generator, GroupData, RowGroupData, StoredValues};
pub use crate::expr::{Expression, ExpressionContext, FieldRef, Param};
pub use crate::functions::{global_registry, Function, FunctionRegistry};
pub use crate::parser::ExpressionParser;

/// Parse an expression string with a fresh default context
///
/// Convenience for callers that need no parameters, custom limits or
/// lookup hooks. Returns `None` for blank input.
pub fn parse(fields: &FieldIndex, input: &str) -> Result<Option<Expression>> {
    ExpressionParser::new().parse(&ExpressionContext::new(), fields, input)
}
