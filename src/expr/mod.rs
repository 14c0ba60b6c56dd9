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

//! Compiled expressions
//!
//! - [`Expression`] - a parsed, slot-bound expression tree
//! - [`Param`] - one node of the tree
//! - [`ExpressionContext`] - shared compile-time configuration

pub mod context;
pub mod param;

use std::fmt;

use crate::executor::{Generator, SlotRegistry, StoredValues};

pub use context::ExpressionContext;
pub use param::{FieldRef, Param};

/// A compiled expression: the parsed tree plus its slot allocations
///
/// Compilation binds every stateful node to a slot, so every storage arena
/// created from the same expression has the same layout and merging two
/// partial groups is slot-by-slot.
pub struct Expression {
    root: Param,
    slots: SlotRegistry,
}

impl Expression {
    pub(crate) fn new(mut root: Param) -> Self {
        let mut slots = SlotRegistry::new();
        root.register_slots(&mut slots);
        Self { root, slots }
    }

    /// Whether any node of the tree is an aggregate
    pub fn has_aggregate(&self) -> bool {
        self.root.has_aggregate()
    }

    /// Whether evaluation needs the group's child rows
    pub fn requires_child_data(&self) -> bool {
        self.root.requires_child_data()
    }

    /// Number of accumulator slots the expression uses
    pub fn slot_count(&self) -> usize {
        self.slots.slot_count()
    }

    /// Build the runnable form of the expression
    pub fn make_generator(&self) -> Box<dyn Generator> {
        self.root.make_generator()
    }

    /// Create an empty storage arena for one group
    pub fn create_storage(&self) -> StoredValues {
        self.slots.create_storage()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expression({self})")
    }
}
