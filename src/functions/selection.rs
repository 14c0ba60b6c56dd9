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

//! Selector functions: `nth`, `top`, `bottom`
//!
//! Selectors evaluate their argument against individual child rows of a
//! group instead of a folded accumulator, so they require the engine to
//! retain per-row storages. Without group data they fall back to the
//! value of the latest row.

use std::fmt;

use crate::core::{Result, Value};
use crate::executor::{Generator, GroupData, SlotRegistry, StoredValues};
use crate::expr::param::Param;
use crate::functions::aggregate::{literal_string, literal_usize};
use crate::functions::{check_arity, reject_nested_aggregate, write_call, Function};

enum SelectorMode {
    /// 1-based row position
    Nth { pos: u64 },
    /// First `limit` rows joined
    Top { delimiter: String, limit: usize },
    /// Last `limit` rows joined, in row order
    Bottom { delimiter: String, limit: usize },
}

pub fn nth() -> SelectorFunction {
    SelectorFunction::new("nth")
}

pub fn top() -> SelectorFunction {
    SelectorFunction::new("top")
}

pub fn bottom() -> SelectorFunction {
    SelectorFunction::new("bottom")
}

/// A function that selects among the child rows of a group
pub struct SelectorFunction {
    name: &'static str,
    params: Vec<Param>,
    mode: Option<SelectorMode>,
}

impl SelectorFunction {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            params: Vec::new(),
            mode: None,
        }
    }
}

impl fmt::Display for SelectorFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, self.name, &self.params)
    }
}

impl Function for SelectorFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn set_params(&mut self, params: Vec<Param>) -> Result<()> {
        match self.name {
            "nth" => {
                check_arity(self.name, 2, 2, params.len())?;
                let pos = literal_usize(self.name, &params[1])?;
                if pos == 0 {
                    return Err(crate::core::Error::invalid_argument(
                        self.name,
                        "position is 1-based",
                    ));
                }
                self.mode = Some(SelectorMode::Nth { pos: pos as u64 });
            }
            _ => {
                check_arity(self.name, 3, 3, params.len())?;
                let delimiter = literal_string(self.name, &params[1])?;
                let limit = literal_usize(self.name, &params[2])?;
                self.mode = Some(if self.name == "top" {
                    SelectorMode::Top { delimiter, limit }
                } else {
                    SelectorMode::Bottom { delimiter, limit }
                });
            }
        }
        reject_nested_aggregate(self.name, &params)?;
        self.params = params;
        Ok(())
    }

    fn register_slots(&mut self, registry: &mut SlotRegistry) {
        if let Some(param) = self.params.first_mut() {
            param.register_slots(registry);
        }
    }

    fn make_generator(&self) -> Box<dyn Generator> {
        Box::new(SelectorGenerator {
            child: self.params[0].make_generator(),
            mode: match self.mode.as_ref() {
                Some(SelectorMode::Nth { pos }) => SelectorMode::Nth { pos: *pos },
                Some(SelectorMode::Top { delimiter, limit }) => SelectorMode::Top {
                    delimiter: delimiter.clone(),
                    limit: *limit,
                },
                Some(SelectorMode::Bottom { delimiter, limit }) => SelectorMode::Bottom {
                    delimiter: delimiter.clone(),
                    limit: *limit,
                },
                // set_params always runs first
                None => SelectorMode::Nth { pos: 1 },
            },
        })
    }

    fn is_aggregate(&self) -> bool {
        true
    }

    fn has_aggregate(&self) -> bool {
        true
    }

    fn requires_child_data(&self) -> bool {
        true
    }
}

struct SelectorGenerator {
    child: Box<dyn Generator>,
    mode: SelectorMode,
}

impl SelectorGenerator {
    fn join_rows<'a>(
        &self,
        rows: impl Iterator<Item = &'a StoredValues>,
        delimiter: &str,
    ) -> Value {
        let mut out = String::new();
        for row in rows {
            let value = self.child.evaluate(row, None);
            if value.is_null() {
                continue;
            }
            if !out.is_empty() {
                out.push_str(delimiter);
            }
            out.push_str(&value.to_string());
        }
        Value::string(out)
    }
}

impl Generator for SelectorGenerator {
    fn apply_row(&self, row: &[Value], storage: &mut StoredValues) {
        self.child.apply_row(row, storage);
    }

    fn evaluate(&self, storage: &StoredValues, group: Option<&dyn GroupData>) -> Value {
        let Some(group) = group else {
            // No child rows retained; degrade to the latest value
            return self.child.evaluate(storage, None);
        };
        match &self.mode {
            SelectorMode::Nth { pos } => match group.row(pos - 1) {
                Some(row) => self.child.evaluate(row, None),
                None => Value::Null,
            },
            SelectorMode::Top { delimiter, limit } => {
                let take = (*limit as u64).min(group.row_count());
                self.join_rows((0..take).filter_map(|i| group.row(i)), delimiter)
            }
            SelectorMode::Bottom { delimiter, limit } => {
                let count = group.row_count();
                let start = count.saturating_sub(*limit as u64);
                self.join_rows((start..count).filter_map(|i| group.row(i)), delimiter)
            }
        }
    }

    fn merge(&self, target: &mut StoredValues, source: &StoredValues) {
        self.child.merge(target, source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::RowGroupData;
    use crate::expr::param::FieldRef;

    fn compile(name: &'static str, extra: Vec<Param>) -> (Box<dyn Generator>, SlotRegistry) {
        let mut f = SelectorFunction::new(name);
        let mut params = vec![Param::Field(FieldRef::new("val", 0))];
        params.extend(extra);
        f.set_params(params).unwrap();
        let mut registry = SlotRegistry::new();
        f.register_slots(&mut registry);
        (f.make_generator(), registry)
    }

    fn group_of(gen: &dyn Generator, registry: &SlotRegistry, n: i64) -> RowGroupData {
        let mut group = RowGroupData::new();
        for i in 1..=n {
            let mut storage = registry.create_storage();
            gen.apply_row(&[Value::Long(i)], &mut storage);
            group.push(storage);
        }
        group
    }

    #[test]
    fn test_nth_is_one_based() {
        let (gen, registry) = compile("nth", vec![Param::Value(Value::Long(7))]);
        let group = group_of(gen.as_ref(), &registry, 10);
        let storage = registry.create_storage();
        assert_eq!(gen.evaluate(&storage, Some(&group)), Value::Long(7));
    }

    #[test]
    fn test_nth_out_of_range_is_null() {
        let (gen, registry) = compile("nth", vec![Param::Value(Value::Long(7))]);
        let group = group_of(gen.as_ref(), &registry, 3);
        let storage = registry.create_storage();
        assert!(gen.evaluate(&storage, Some(&group)).is_null());
    }

    #[test]
    fn test_no_group_falls_back_to_latest() {
        let (gen, registry) = compile("nth", vec![Param::Value(Value::Long(7))]);
        let mut storage = registry.create_storage();
        gen.apply_row(&[Value::Long(300)], &mut storage);
        assert_eq!(gen.evaluate(&storage, None), Value::Long(300));
    }

    #[test]
    fn test_top() {
        let (gen, registry) = compile(
            "top",
            vec![Param::Value(Value::string(",")), Param::Value(Value::Long(3))],
        );
        let group = group_of(gen.as_ref(), &registry, 10);
        let storage = registry.create_storage();
        assert_eq!(gen.evaluate(&storage, Some(&group)), Value::string("1,2,3"));
    }

    #[test]
    fn test_top_small_group() {
        let (gen, registry) = compile(
            "top",
            vec![Param::Value(Value::string(",")), Param::Value(Value::Long(3))],
        );
        let group = group_of(gen.as_ref(), &registry, 2);
        let storage = registry.create_storage();
        assert_eq!(gen.evaluate(&storage, Some(&group)), Value::string("1,2"));
    }

    #[test]
    fn test_bottom_keeps_row_order() {
        let (gen, registry) = compile(
            "bottom",
            vec![Param::Value(Value::string(",")), Param::Value(Value::Long(3))],
        );
        let group = group_of(gen.as_ref(), &registry, 10);
        let storage = registry.create_storage();
        assert_eq!(gen.evaluate(&storage, Some(&group)), Value::string("8,9,10"));
    }

    #[test]
    fn test_nth_rejects_zero() {
        let mut f = SelectorFunction::new("nth");
        let err = f
            .set_params(vec![
                Param::Field(FieldRef::new("val", 0)),
                Param::Value(Value::Long(0)),
            ])
            .unwrap_err();
        assert!(err.to_string().contains("1-based"));
    }
}
