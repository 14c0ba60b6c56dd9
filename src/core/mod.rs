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

//! Core types for Veld
//!
//! - [`Value`] / [`Kind`] - the closed runtime value type and its kinds
//! - [`compare`] - kind-aware value comparison
//! - [`FieldIndex`] - field name to row position symbol table
//! - [`Error`] / [`Result`] - compile-time error channel

pub mod compare;
pub mod error;
pub mod field_index;
pub mod value;

pub use error::{Error, Result};
pub use field_index::FieldIndex;
pub use value::{
    format_date_millis, format_double, format_duration_millis, parse_date_millis,
    parse_duration_millis, Kind, Value,
};

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::cmp::Ordering;

    /// Values found through the field index compare the way the sort layer
    /// expects, including mixed numeric strings
    #[test]
    fn test_field_values_sortable() {
        let index = FieldIndex::new();
        index.create("score");
        let mut values = vec![
            Value::string("10"),
            Value::Long(2),
            Value::Double(7.5),
            Value::Null,
            Value::string("abc"),
        ];
        values.sort_by(|a, b| compare::compare(a, b));
        // Null is last
        assert!(values.last().unwrap().is_null());
        assert_eq!(compare::compare(&values[0], &values[1]), Ordering::Less);
    }
}
