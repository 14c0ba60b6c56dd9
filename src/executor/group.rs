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

//! Access to the child rows of a group for selector functions
//!
//! Selectors such as `nth`, `top` and `bottom` need to reach individual
//! child rows rather than a folded accumulator. The engine exposes the
//! per-row storages of a group through [`GroupData`]; rows keep the order
//! in which they were added.

use crate::executor::storage::StoredValues;

/// Read access to the per-row storages of one group
pub trait GroupData {
    /// Number of rows in the group
    fn row_count(&self) -> u64;

    /// The storage captured for the row at `pos` (zero-based)
    fn row(&self, pos: u64) -> Option<&StoredValues>;
}

/// Group data backed by a vector of row storages
#[derive(Default)]
pub struct RowGroupData {
    rows: Vec<StoredValues>,
}

impl RowGroupData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: StoredValues) {
        self.rows.push(row);
    }
}

impl GroupData for RowGroupData {
    fn row_count(&self) -> u64 {
        self.rows.len() as u64
    }

    fn row(&self, pos: u64) -> Option<&StoredValues> {
        usize::try_from(pos).ok().and_then(|i| self.rows.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::executor::storage::SlotRegistry;

    #[test]
    fn test_rows_keep_insertion_order() {
        let mut registry = SlotRegistry::new();
        let slot = registry.value_slot();

        let mut group = RowGroupData::new();
        for i in 0..3 {
            let mut storage = registry.create_storage();
            storage.set_value(slot, Value::Long(i));
            group.push(storage);
        }

        assert_eq!(group.row_count(), 3);
        assert_eq!(group.row(0).unwrap().value(slot), &Value::Long(0));
        assert_eq!(group.row(2).unwrap().value(slot), &Value::Long(2));
        assert!(group.row(3).is_none());
    }
}
