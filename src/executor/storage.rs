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

//! Accumulator slots and per-group storage
//!
//! A [`SlotRegistry`] is filled once per compiled expression tree by a
//! registration walk; slot indices are assigned in traversal order and stay
//! stable for the tree's lifetime. A [`StoredValues`] instance is the
//! per-group arena of typed cells addressed by those indices. Two unrelated
//! stateful generators never alias the same slot.
//!
//! All reads and writes go through the typed slot handles so the cell
//! layout can change without touching function logic.

use crate::core::Value;

/// The kind of state a slot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// A running value
    Value,
    /// A running count
    Count,
    /// An ordered list of values
    ValueList,
    /// An ordered list of strings
    StringList,
    /// An ordered list of doubles
    DoubleList,
    /// A per-group random seed
    RandomSeed,
    /// The cached current-row value of a field reference
    FieldCache,
}

/// Handle to a running-value slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueSlot(usize);

/// Handle to a counter slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountSlot(usize);

/// Handle to a value-list slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueListSlot(usize);

/// Handle to a string-list slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringListSlot(usize);

/// Handle to a double-list slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleListSlot(usize);

/// Handle to a random-seed slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSlot(usize);

/// Handle to a field-cache slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot(usize);

/// Registry of slot allocations for one compiled expression tree
#[derive(Debug, Default)]
pub struct SlotRegistry {
    kinds: Vec<SlotKind>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: SlotKind) -> usize {
        let index = self.kinds.len();
        self.kinds.push(kind);
        index
    }

    pub fn value_slot(&mut self) -> ValueSlot {
        ValueSlot(self.push(SlotKind::Value))
    }

    pub fn count_slot(&mut self) -> CountSlot {
        CountSlot(self.push(SlotKind::Count))
    }

    pub fn value_list_slot(&mut self) -> ValueListSlot {
        ValueListSlot(self.push(SlotKind::ValueList))
    }

    pub fn string_list_slot(&mut self) -> StringListSlot {
        StringListSlot(self.push(SlotKind::StringList))
    }

    pub fn double_list_slot(&mut self) -> DoubleListSlot {
        DoubleListSlot(self.push(SlotKind::DoubleList))
    }

    pub fn seed_slot(&mut self) -> SeedSlot {
        SeedSlot(self.push(SlotKind::RandomSeed))
    }

    pub fn field_slot(&mut self) -> FieldSlot {
        FieldSlot(self.push(SlotKind::FieldCache))
    }

    /// Number of slots allocated so far
    pub fn slot_count(&self) -> usize {
        self.kinds.len()
    }

    /// Instantiate an empty storage arena for one group of rows
    pub fn create_storage(&self) -> StoredValues {
        let cells = self
            .kinds
            .iter()
            .map(|kind| match kind {
                SlotKind::Value | SlotKind::FieldCache => Cell::Value(Value::Null),
                SlotKind::Count => Cell::Count(0),
                SlotKind::ValueList => Cell::ValueList(Vec::new()),
                SlotKind::StringList => Cell::StringList(Vec::new()),
                SlotKind::DoubleList => Cell::DoubleList(Vec::new()),
                SlotKind::RandomSeed => Cell::Seed(rand::random::<u64>()),
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();
        StoredValues { cells, iteration: 0 }
    }
}

/// One typed cell of per-group state
#[derive(Debug, Clone)]
enum Cell {
    Value(Value),
    Count(u64),
    ValueList(Vec<Value>),
    StringList(Vec<String>),
    DoubleList(Vec<f64>),
    Seed(u64),
}

/// Per-group mutable storage: a fixed arena of typed cells
///
/// Created per group of rows being aggregated, mutated row-by-row and by
/// merges, and discarded once the group's final value has been read.
#[derive(Debug, Clone)]
pub struct StoredValues {
    cells: Box<[Cell]>,
    /// Window/iteration tag of the rows currently being applied; consulted
    /// by masking generators only
    iteration: u32,
}

impl StoredValues {
    /// The window/iteration tag of the current row batch
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Set the window/iteration tag before applying a batch of rows
    pub fn set_iteration(&mut self, iteration: u32) {
        self.iteration = iteration;
    }

    pub fn value(&self, slot: ValueSlot) -> &Value {
        match &self.cells[slot.0] {
            Cell::Value(v) => v,
            _ => &Value::Null,
        }
    }

    pub fn set_value(&mut self, slot: ValueSlot, value: Value) {
        self.cells[slot.0] = Cell::Value(value);
    }

    pub fn field(&self, slot: FieldSlot) -> &Value {
        match &self.cells[slot.0] {
            Cell::Value(v) => v,
            _ => &Value::Null,
        }
    }

    pub fn set_field(&mut self, slot: FieldSlot, value: Value) {
        self.cells[slot.0] = Cell::Value(value);
    }

    pub fn count(&self, slot: CountSlot) -> u64 {
        match &self.cells[slot.0] {
            Cell::Count(n) => *n,
            _ => 0,
        }
    }

    pub fn increment(&mut self, slot: CountSlot) {
        self.add_count(slot, 1);
    }

    pub fn add_count(&mut self, slot: CountSlot, n: u64) {
        if let Cell::Count(count) = &mut self.cells[slot.0] {
            *count = count.saturating_add(n);
        }
    }

    pub fn value_list(&self, slot: ValueListSlot) -> &[Value] {
        match &self.cells[slot.0] {
            Cell::ValueList(list) => list,
            _ => &[],
        }
    }

    pub fn value_list_mut(&mut self, slot: ValueListSlot) -> &mut Vec<Value> {
        if !matches!(self.cells[slot.0], Cell::ValueList(_)) {
            self.cells[slot.0] = Cell::ValueList(Vec::new());
        }
        match &mut self.cells[slot.0] {
            Cell::ValueList(list) => list,
            _ => unreachable!(),
        }
    }

    pub fn string_list(&self, slot: StringListSlot) -> &[String] {
        match &self.cells[slot.0] {
            Cell::StringList(list) => list,
            _ => &[],
        }
    }

    pub fn string_list_mut(&mut self, slot: StringListSlot) -> &mut Vec<String> {
        if !matches!(self.cells[slot.0], Cell::StringList(_)) {
            self.cells[slot.0] = Cell::StringList(Vec::new());
        }
        match &mut self.cells[slot.0] {
            Cell::StringList(list) => list,
            _ => unreachable!(),
        }
    }

    pub fn double_list(&self, slot: DoubleListSlot) -> &[f64] {
        match &self.cells[slot.0] {
            Cell::DoubleList(list) => list,
            _ => &[],
        }
    }

    pub fn double_list_mut(&mut self, slot: DoubleListSlot) -> &mut Vec<f64> {
        if !matches!(self.cells[slot.0], Cell::DoubleList(_)) {
            self.cells[slot.0] = Cell::DoubleList(Vec::new());
        }
        match &mut self.cells[slot.0] {
            Cell::DoubleList(list) => list,
            _ => unreachable!(),
        }
    }

    pub fn seed(&self, slot: SeedSlot) -> u64 {
        match &self.cells[slot.0] {
            Cell::Seed(s) => *s,
            _ => 0,
        }
    }
}
