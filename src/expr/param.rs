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

//! Function arguments
//!
//! A [`Param`] is one argument of a function call: a literal value, a field
//! reference, or a nested function. The root of a compiled expression is
//! itself a `Param`.

use std::fmt;

use crate::core::{Kind, Value};
use crate::executor::{FieldGenerator, FieldSlot, Generator, SlotRegistry, StaticGenerator};
use crate::functions::Function;

/// One argument of a function call
pub enum Param {
    /// A literal value
    Value(Value),
    /// A `${name}` field reference
    Field(FieldRef),
    /// A nested function call
    Function(Box<dyn Function>),
}

/// A field reference bound to a row position
pub struct FieldRef {
    name: String,
    pos: usize,
    slot: Option<FieldSlot>,
}

impl FieldRef {
    pub fn new(name: impl Into<String>, pos: usize) -> Self {
        Self {
            name: name.into(),
            pos,
            slot: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pos(&self) -> usize {
        self.pos
    }
}

impl Param {
    pub fn has_aggregate(&self) -> bool {
        match self {
            Param::Value(_) | Param::Field(_) => false,
            Param::Function(f) => f.has_aggregate(),
        }
    }

    pub fn requires_child_data(&self) -> bool {
        match self {
            Param::Value(_) | Param::Field(_) => false,
            Param::Function(f) => f.requires_child_data(),
        }
    }

    /// Allocate slots for this subtree; must run exactly once before
    /// [`make_generator`](Param::make_generator)
    pub fn register_slots(&mut self, registry: &mut SlotRegistry) {
        match self {
            Param::Value(_) => {}
            Param::Field(field) => {
                if field.slot.is_none() {
                    field.slot = Some(registry.field_slot());
                }
            }
            Param::Function(f) => f.register_slots(registry),
        }
    }

    pub fn make_generator(&self) -> Box<dyn Generator> {
        match self {
            Param::Value(v) => Box::new(StaticGenerator::new(v.clone())),
            Param::Field(field) => match field.slot {
                Some(slot) => Box::new(FieldGenerator::new(field.pos, slot)),
                // Slots are always registered before generators are built;
                // an unbound field would be a compiler bug, surfaced as an
                // Error value rather than a panic
                None => Box::new(StaticGenerator::new(Value::error(format!(
                    "field '{}' is not bound",
                    field.name
                )))),
            },
            Param::Function(f) => f.make_generator(),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Value(v) => write_literal(f, v),
            Param::Field(field) => write!(f, "${{{}}}", field.name),
            Param::Function(func) => write!(f, "{func}"),
        }
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Param({self})")
    }
}

/// Render a literal the way it would appear in an expression string
fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value.kind() {
        Kind::String => {
            write!(f, "'")?;
            for c in value.to_string().chars() {
                match c {
                    '\'' => write!(f, "\\'")?,
                    '\\' => write!(f, "\\\\")?,
                    c => write!(f, "{c}")?,
                }
            }
            write!(f, "'")
        }
        _ => write!(f, "{value}"),
    }
}
