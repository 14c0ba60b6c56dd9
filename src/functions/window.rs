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

//! Windowed aggregation: the `period` mask
//!
//! `period(expr, n)` lets one expression aggregate only the rows of window
//! iteration `n`. The engine tags each storage arena with the iteration of
//! the batch being applied (see [`StoredValues::set_iteration`]); rows with
//! a different tag pass through this mask untouched, so a table can show
//! `period(count(), 0)` next to `period(count(), 1)` from one row stream.
//!
//! [`StoredValues::set_iteration`]: crate::executor::StoredValues::set_iteration

use std::fmt;

use crate::core::{Result, Value};
use crate::executor::{Generator, GroupData, SlotRegistry, StoredValues};
use crate::expr::param::Param;
use crate::functions::aggregate::literal_usize;
use crate::functions::{check_arity, write_call, Function};

/// `period(expr, iteration)`
pub struct PeriodFunction {
    params: Vec<Param>,
    iteration: u32,
}

impl PeriodFunction {
    pub fn new() -> Self {
        Self {
            params: Vec::new(),
            iteration: 0,
        }
    }
}

impl Default for PeriodFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PeriodFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, "period", &self.params)
    }
}

impl Function for PeriodFunction {
    fn name(&self) -> &str {
        "period"
    }

    fn set_params(&mut self, params: Vec<Param>) -> Result<()> {
        check_arity("period", 2, 2, params.len())?;
        let iteration = literal_usize("period", &params[1])?;
        self.iteration = u32::try_from(iteration).map_err(|_| {
            crate::core::Error::invalid_argument("period", "iteration out of range")
        })?;
        self.params = params;
        Ok(())
    }

    fn register_slots(&mut self, registry: &mut SlotRegistry) {
        if let Some(param) = self.params.first_mut() {
            param.register_slots(registry);
        }
    }

    fn make_generator(&self) -> Box<dyn Generator> {
        Box::new(PeriodGenerator {
            child: self.params[0].make_generator(),
            iteration: self.iteration,
        })
    }

    fn is_aggregate(&self) -> bool {
        self.params.first().is_some_and(Param::has_aggregate)
    }

    fn has_aggregate(&self) -> bool {
        self.params.first().is_some_and(Param::has_aggregate)
    }

    fn requires_child_data(&self) -> bool {
        self.params.first().is_some_and(Param::requires_child_data)
    }
}

struct PeriodGenerator {
    child: Box<dyn Generator>,
    iteration: u32,
}

impl Generator for PeriodGenerator {
    fn apply_row(&self, row: &[Value], storage: &mut StoredValues) {
        if storage.iteration() == self.iteration {
            self.child.apply_row(row, storage);
        }
    }

    fn evaluate(&self, storage: &StoredValues, group: Option<&dyn GroupData>) -> Value {
        self.child.evaluate(storage, group)
    }

    fn merge(&self, target: &mut StoredValues, source: &StoredValues) {
        self.child.merge(target, source);
    }
}
