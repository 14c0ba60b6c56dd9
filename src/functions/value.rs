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

//! Value functions: literals, casts, query parameters and lookups

use std::fmt;
use std::sync::Arc;

use crate::core::{Kind, Result, Value};
use crate::executor::{Generator, GroupData, SeedSlot, SlotRegistry, StoredValues};
use crate::expr::context::{ExpressionContext, StateLookup};
use crate::expr::param::Param;
use crate::functions::aggregate::literal_string;
use crate::functions::{
    any_aggregate, any_requires_child_data, check_arity, write_call, Function, ScalarFunction,
};

pub fn null() -> ScalarFunction {
    ScalarFunction::new("null", 0, 0, |_| Value::Null)
}

pub fn err() -> ScalarFunction {
    ScalarFunction::raw("err", 0, 0, |_| Value::error("err() was called"))
}

pub fn type_of() -> ScalarFunction {
    ScalarFunction::raw("typeOf", 1, 1, |args| Value::string(args[0].kind().name()))
}

pub fn to_boolean() -> ScalarFunction {
    ScalarFunction::new("toBoolean", 1, 1, |args| {
        cast(&args[0], Kind::Boolean, |v| v.as_boolean().map(Value::Boolean))
    })
}

pub fn to_double() -> ScalarFunction {
    ScalarFunction::new("toDouble", 1, 1, |args| {
        cast(&args[0], Kind::Double, |v| v.as_double().map(Value::Double))
    })
}

pub fn to_integer() -> ScalarFunction {
    ScalarFunction::new("toInteger", 1, 1, |args| {
        cast(&args[0], Kind::Integer, |v| v.as_integer().map(Value::Integer))
    })
}

pub fn to_long() -> ScalarFunction {
    ScalarFunction::new("toLong", 1, 1, |args| {
        cast(&args[0], Kind::Long, |v| v.as_long().map(Value::Long))
    })
}

pub fn to_string() -> ScalarFunction {
    ScalarFunction::new("toString", 1, 1, |args| {
        cast(&args[0], Kind::String, |v| v.as_string().map(Value::string))
    })
}

fn cast(v: &Value, target: Kind, convert: fn(&Value) -> Option<Value>) -> Value {
    if v.is_null() {
        return Value::Null;
    }
    match convert(v) {
        Some(out) => out,
        None => Value::error(format!(
            "unable to convert {} value to {}",
            v.kind(),
            target
        )),
    }
}

/// `param('key')` - the value of a named query parameter, folded at parse
/// time
pub fn param(ctx: &ExpressionContext) -> ParamFunction {
    ParamFunction {
        ctx: ctx.clone(),
        params: Vec::new(),
        value: Value::Null,
    }
}

pub struct ParamFunction {
    ctx: ExpressionContext,
    params: Vec<Param>,
    value: Value,
}

impl fmt::Display for ParamFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, "param", &self.params)
    }
}

impl Function for ParamFunction {
    fn name(&self) -> &str {
        "param"
    }

    fn set_params(&mut self, params: Vec<Param>) -> Result<()> {
        check_arity("param", 1, 1, params.len())?;
        let key = literal_string("param", &params[0])?;
        self.value = match self.ctx.param(&key) {
            Some(value) => Value::string(value),
            None => Value::Null,
        };
        self.params = params;
        Ok(())
    }

    fn register_slots(&mut self, _registry: &mut SlotRegistry) {}

    fn make_generator(&self) -> Box<dyn Generator> {
        Box::new(crate::executor::StaticGenerator::new(self.value.clone()))
    }

    fn has_aggregate(&self) -> bool {
        false
    }
}

/// `params()` - all query parameters rendered as `key="value"` pairs
pub fn params(ctx: &ExpressionContext) -> ParamsFunction {
    let rendered = ctx
        .sorted_params()
        .iter()
        .map(|(k, v)| format!("{k}=\"{v}\""))
        .collect::<Vec<_>>()
        .join(" ");
    ParamsFunction {
        value: Value::string(rendered),
    }
}

pub struct ParamsFunction {
    value: Value,
}

impl fmt::Display for ParamsFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "params()")
    }
}

impl Function for ParamsFunction {
    fn name(&self) -> &str {
        "params"
    }

    fn set_params(&mut self, params: Vec<Param>) -> Result<()> {
        check_arity("params", 0, 0, params.len())
    }

    fn register_slots(&mut self, _registry: &mut SlotRegistry) {}

    fn make_generator(&self) -> Box<dyn Generator> {
        Box::new(crate::executor::StaticGenerator::new(self.value.clone()))
    }

    fn has_aggregate(&self) -> bool {
        false
    }
}

/// `lookup(map, key)` - external state lookup through the context hook
pub fn lookup(ctx: &ExpressionContext) -> LookupFunction {
    LookupFunction {
        hook: ctx.state_lookup().cloned(),
        params: Vec::new(),
    }
}

pub struct LookupFunction {
    hook: Option<Arc<StateLookup>>,
    params: Vec<Param>,
}

impl fmt::Display for LookupFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, "lookup", &self.params)
    }
}

impl Function for LookupFunction {
    fn name(&self) -> &str {
        "lookup"
    }

    fn set_params(&mut self, params: Vec<Param>) -> Result<()> {
        check_arity("lookup", 2, 2, params.len())?;
        self.params = params;
        Ok(())
    }

    fn register_slots(&mut self, registry: &mut SlotRegistry) {
        for param in &mut self.params {
            param.register_slots(registry);
        }
    }

    fn make_generator(&self) -> Box<dyn Generator> {
        Box::new(LookupGenerator {
            map: self.params[0].make_generator(),
            key: self.params[1].make_generator(),
            hook: self.hook.clone(),
        })
    }

    fn has_aggregate(&self) -> bool {
        any_aggregate(&self.params)
    }

    fn requires_child_data(&self) -> bool {
        any_requires_child_data(&self.params)
    }
}

struct LookupGenerator {
    map: Box<dyn Generator>,
    key: Box<dyn Generator>,
    hook: Option<Arc<StateLookup>>,
}

impl Generator for LookupGenerator {
    fn apply_row(&self, row: &[Value], storage: &mut StoredValues) {
        self.map.apply_row(row, storage);
        self.key.apply_row(row, storage);
    }

    fn evaluate(&self, storage: &StoredValues, group: Option<&dyn GroupData>) -> Value {
        let Some(hook) = &self.hook else {
            return Value::error("lookup: no state lookup is configured");
        };
        let map = self.map.evaluate(storage, group);
        let key = self.key.evaluate(storage, group);
        if map.is_error() {
            return map;
        }
        if key.is_error() {
            return key;
        }
        let (Some(map), Some(key)) = (map.as_string(), key.as_string()) else {
            return Value::Null;
        };
        match hook(&map, &key) {
            Some(value) => Value::string(value),
            None => Value::Null,
        }
    }

    fn merge(&self, target: &mut StoredValues, source: &StoredValues) {
        self.map.merge(target, source);
        self.key.merge(target, source);
    }
}

/// `random()` - a per-group value in `[0, 1)` derived from a stored seed,
/// stable across evaluation and merge
pub struct RandomFunction {
    slot: Option<SeedSlot>,
}

impl RandomFunction {
    pub fn new() -> Self {
        Self { slot: None }
    }
}

impl Default for RandomFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RandomFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "random()")
    }
}

impl Function for RandomFunction {
    fn name(&self) -> &str {
        "random"
    }

    fn set_params(&mut self, params: Vec<Param>) -> Result<()> {
        check_arity("random", 0, 0, params.len())
    }

    fn register_slots(&mut self, registry: &mut SlotRegistry) {
        self.slot = Some(registry.seed_slot());
    }

    fn make_generator(&self) -> Box<dyn Generator> {
        Box::new(RandomGenerator { slot: self.slot })
    }

    fn has_aggregate(&self) -> bool {
        false
    }
}

struct RandomGenerator {
    slot: Option<SeedSlot>,
}

impl Generator for RandomGenerator {
    fn apply_row(&self, _row: &[Value], _storage: &mut StoredValues) {}

    fn evaluate(&self, storage: &StoredValues, _group: Option<&dyn GroupData>) -> Value {
        let seed = match self.slot {
            Some(slot) => storage.seed(slot),
            None => 0,
        };
        Value::Double(unit_double(seed))
    }

    fn merge(&self, _target: &mut StoredValues, _source: &StoredValues) {
        // The target group keeps its own seed
    }
}

/// Map a seed to `[0, 1)` (splitmix64 finalizer)
fn unit_double(seed: u64) -> f64 {
    let mut z = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64
}
