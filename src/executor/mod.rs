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

//! Execution layer
//!
//! - [`Generator`] - the apply-row / evaluate / merge protocol
//! - [`SlotRegistry`] / [`StoredValues`] - typed accumulator slots
//! - [`GroupData`] - child-row access for selector functions
//! - [`compile_pattern`] - shared regex cache

pub mod generator;
pub mod group;
pub mod pattern_cache;
pub mod storage;

pub use generator::{FieldGenerator, Generator, StaticGenerator};
pub use group::{GroupData, RowGroupData};
pub use pattern_cache::compile_pattern;
pub use storage::{
    CountSlot, DoubleListSlot, FieldSlot, SeedSlot, SlotKind, SlotRegistry, StoredValues,
    StringListSlot, ValueListSlot, ValueSlot,
};
