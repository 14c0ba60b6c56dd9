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

//! Generators - the execution protocol for compiled expressions
//!
//! A [`Generator`] is the runnable form of one node in a compiled expression
//! tree. Generators hold no per-row state of their own; everything mutable
//! lives in the [`StoredValues`] arena so the same generator can serve many
//! groups concurrently.

use crate::core::Value;
use crate::executor::group::GroupData;
use crate::executor::storage::{FieldSlot, StoredValues};

/// Runnable node of a compiled expression tree
///
/// The engine drives every generator through the same three calls:
/// - [`apply_row`](Generator::apply_row) folds one row into the group state
/// - [`evaluate`](Generator::evaluate) reads the current result out of the
///   state without mutating it
/// - [`merge`](Generator::merge) combines the state of two partial groups,
///   producing the same result as if all rows had been applied to one
pub trait Generator: Send + Sync {
    /// Fold one row of field values into the group state
    fn apply_row(&self, row: &[Value], storage: &mut StoredValues);

    /// Read the current result; `group` carries the per-row storages of the
    /// whole group for generators that select among child rows
    fn evaluate(&self, storage: &StoredValues, group: Option<&dyn GroupData>) -> Value;

    /// Fold the state of `source` into `target`
    fn merge(&self, target: &mut StoredValues, source: &StoredValues);
}

/// Generator for a constant value
pub struct StaticGenerator {
    value: Value,
}

impl StaticGenerator {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl Generator for StaticGenerator {
    fn apply_row(&self, _row: &[Value], _storage: &mut StoredValues) {}

    fn evaluate(&self, _storage: &StoredValues, _group: Option<&dyn GroupData>) -> Value {
        self.value.clone()
    }

    fn merge(&self, _target: &mut StoredValues, _source: &StoredValues) {}
}

/// Generator for a field reference
///
/// Caches the latest row's value for its position in a field-cache slot so
/// that evaluation after the row stream has finished still sees a value.
pub struct FieldGenerator {
    pos: usize,
    slot: FieldSlot,
}

impl FieldGenerator {
    pub fn new(pos: usize, slot: FieldSlot) -> Self {
        Self { pos, slot }
    }
}

impl Generator for FieldGenerator {
    fn apply_row(&self, row: &[Value], storage: &mut StoredValues) {
        let value = row.get(self.pos).cloned().unwrap_or(Value::Null);
        storage.set_field(self.slot, value);
    }

    fn evaluate(&self, storage: &StoredValues, _group: Option<&dyn GroupData>) -> Value {
        storage.field(self.slot).clone()
    }

    fn merge(&self, target: &mut StoredValues, source: &StoredValues) {
        // Keep whichever side saw a row
        if target.field(self.slot).is_null() && !source.field(self.slot).is_null() {
            let value = source.field(self.slot).clone();
            target.set_field(self.slot, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::storage::SlotRegistry;

    #[test]
    fn test_static_generator() {
        let registry = SlotRegistry::new();
        let mut storage = registry.create_storage();
        let gen = StaticGenerator::new(Value::Long(7));
        gen.apply_row(&[Value::Long(1)], &mut storage);
        assert_eq!(gen.evaluate(&storage, None), Value::Long(7));
    }

    #[test]
    fn test_field_generator_caches_latest_row() {
        let mut registry = SlotRegistry::new();
        let slot = registry.field_slot();
        let mut storage = registry.create_storage();
        let gen = FieldGenerator::new(0, slot);
        gen.apply_row(&[Value::Long(1)], &mut storage);
        gen.apply_row(&[Value::Long(2)], &mut storage);
        assert_eq!(gen.evaluate(&storage, None), Value::Long(2));
    }

    #[test]
    fn test_field_generator_missing_position() {
        let mut registry = SlotRegistry::new();
        let slot = registry.field_slot();
        let mut storage = registry.create_storage();
        let gen = FieldGenerator::new(3, slot);
        gen.apply_row(&[Value::Long(1)], &mut storage);
        assert!(gen.evaluate(&storage, None).is_null());
    }

    #[test]
    fn test_field_generator_merge_fills_null() {
        let mut registry = SlotRegistry::new();
        let slot = registry.field_slot();
        let gen = FieldGenerator::new(0, slot);

        let mut target = registry.create_storage();
        let mut source = registry.create_storage();
        gen.apply_row(&[Value::string("x")], &mut source);

        gen.merge(&mut target, &source);
        assert_eq!(gen.evaluate(&target, None), Value::string("x"));
    }
}
