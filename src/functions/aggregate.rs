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

//! Aggregate functions
//!
//! Aggregates fold many rows into one value through accumulator slots, and
//! merging the slots of two partial groups gives the same result as
//! applying all rows to one group.
//!
//! `sum`, `min`, `max` and `average` double as row-level functions when
//! given more than one argument: `min(${a}, ${b}, 1)` is the smallest of
//! the three values on each row.

use std::cmp::Ordering;
use std::fmt;

use crate::core::compare::compare;
use crate::core::{Result, Value};
use crate::executor::{
    CountSlot, Generator, GroupData, SlotRegistry, StoredValues, StringListSlot, ValueSlot,
};
use crate::expr::param::Param;
use crate::functions::arithmetic::add_values;
use crate::functions::{check_arity, reject_nested_aggregate, write_call, Function};

/// Combine a running value with a new one: Error dominates, Null is
/// replaced, otherwise `combine` decides
pub(crate) fn fold_running(
    cur: &Value,
    new: &Value,
    combine: fn(&Value, &Value) -> Value,
) -> Value {
    if cur.is_error() {
        return cur.clone();
    }
    if new.is_error() {
        return new.clone();
    }
    if cur.is_null() {
        return new.clone();
    }
    if new.is_null() {
        return cur.clone();
    }
    combine(cur, new)
}

fn min_combine(a: &Value, b: &Value) -> Value {
    if compare(b, a) == Ordering::Less {
        b.clone()
    } else {
        a.clone()
    }
}

fn max_combine(a: &Value, b: &Value) -> Value {
    if compare(b, a) == Ordering::Greater {
        b.clone()
    } else {
        a.clone()
    }
}

pub fn sum() -> RunningAggregate {
    RunningAggregate::new("sum", add_values)
}

pub fn min() -> RunningAggregate {
    RunningAggregate::new("min", min_combine)
}

pub fn max() -> RunningAggregate {
    RunningAggregate::new("max", max_combine)
}

/// An aggregate defined by a pairwise combine over its input values
///
/// With one argument it folds that argument across rows; with several it
/// folds them within each row instead and is not an aggregate.
pub struct RunningAggregate {
    name: &'static str,
    combine: fn(&Value, &Value) -> Value,
    params: Vec<Param>,
    slot: Option<ValueSlot>,
}

impl RunningAggregate {
    fn new(name: &'static str, combine: fn(&Value, &Value) -> Value) -> Self {
        Self {
            name,
            combine,
            params: Vec::new(),
            slot: None,
        }
    }

    fn grouped(&self) -> bool {
        self.params.len() == 1
    }
}

impl fmt::Display for RunningAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, self.name, &self.params)
    }
}

impl Function for RunningAggregate {
    fn name(&self) -> &str {
        self.name
    }

    fn set_params(&mut self, params: Vec<Param>) -> Result<()> {
        check_arity(self.name, 1, usize::MAX, params.len())?;
        if params.len() == 1 {
            reject_nested_aggregate(self.name, &params)?;
        }
        self.params = params;
        Ok(())
    }

    fn register_slots(&mut self, registry: &mut SlotRegistry) {
        if self.grouped() {
            self.slot = Some(registry.value_slot());
        }
        for param in &mut self.params {
            param.register_slots(registry);
        }
    }

    fn make_generator(&self) -> Box<dyn Generator> {
        if self.grouped() {
            return Box::new(RunningGenerator {
                child: self.params[0].make_generator(),
                slot: self.slot,
                combine: self.combine,
            });
        }
        Box::new(RowwiseGenerator {
            children: self.params.iter().map(Param::make_generator).collect(),
            combine: self.combine,
        })
    }

    fn is_aggregate(&self) -> bool {
        self.grouped()
    }

    fn has_aggregate(&self) -> bool {
        self.grouped() || self.params.iter().any(Param::has_aggregate)
    }

    fn requires_child_data(&self) -> bool {
        self.params.iter().any(Param::requires_child_data)
    }
}

struct RunningGenerator {
    child: Box<dyn Generator>,
    slot: Option<ValueSlot>,
    combine: fn(&Value, &Value) -> Value,
}

impl Generator for RunningGenerator {
    fn apply_row(&self, row: &[Value], storage: &mut StoredValues) {
        let Some(slot) = self.slot else { return };
        self.child.apply_row(row, storage);
        let new = self.child.evaluate(storage, None);
        let folded = fold_running(storage.value(slot), &new, self.combine);
        storage.set_value(slot, folded);
    }

    fn evaluate(&self, storage: &StoredValues, _group: Option<&dyn GroupData>) -> Value {
        match self.slot {
            Some(slot) => storage.value(slot).clone(),
            None => Value::Null,
        }
    }

    fn merge(&self, target: &mut StoredValues, source: &StoredValues) {
        let Some(slot) = self.slot else { return };
        self.child.merge(target, source);
        let folded = fold_running(target.value(slot), source.value(slot), self.combine);
        target.set_value(slot, folded);
    }
}

struct RowwiseGenerator {
    children: Vec<Box<dyn Generator>>,
    combine: fn(&Value, &Value) -> Value,
}

impl Generator for RowwiseGenerator {
    fn apply_row(&self, row: &[Value], storage: &mut StoredValues) {
        for child in &self.children {
            child.apply_row(row, storage);
        }
    }

    fn evaluate(&self, storage: &StoredValues, group: Option<&dyn GroupData>) -> Value {
        let mut cur = Value::Null;
        for child in &self.children {
            let next = child.evaluate(storage, group);
            cur = fold_running(&cur, &next, self.combine);
            if cur.is_error() {
                return cur;
            }
        }
        cur
    }

    fn merge(&self, target: &mut StoredValues, source: &StoredValues) {
        for child in &self.children {
            child.merge(target, source);
        }
    }
}

/// `count()` - the number of rows applied to the group
pub struct CountFunction {
    slot: Option<CountSlot>,
}

impl CountFunction {
    pub fn new() -> Self {
        Self { slot: None }
    }
}

impl Default for CountFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CountFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "count()")
    }
}

impl Function for CountFunction {
    fn name(&self) -> &str {
        "count"
    }

    fn set_params(&mut self, params: Vec<Param>) -> Result<()> {
        check_arity("count", 0, 0, params.len())
    }

    fn register_slots(&mut self, registry: &mut SlotRegistry) {
        self.slot = Some(registry.count_slot());
    }

    fn make_generator(&self) -> Box<dyn Generator> {
        Box::new(CountGenerator { slot: self.slot })
    }

    fn is_aggregate(&self) -> bool {
        true
    }

    fn has_aggregate(&self) -> bool {
        true
    }
}

struct CountGenerator {
    slot: Option<CountSlot>,
}

impl Generator for CountGenerator {
    fn apply_row(&self, _row: &[Value], storage: &mut StoredValues) {
        if let Some(slot) = self.slot {
            storage.increment(slot);
        }
    }

    fn evaluate(&self, storage: &StoredValues, _group: Option<&dyn GroupData>) -> Value {
        match self.slot {
            Some(slot) => Value::Long(storage.count(slot) as i64),
            None => Value::Long(0),
        }
    }

    fn merge(&self, target: &mut StoredValues, source: &StoredValues) {
        if let Some(slot) = self.slot {
            target.add_count(slot, source.count(slot));
        }
    }
}

/// `average(field)` / `mean(field)` - running sum and count
///
/// Also works row-level with several arguments.
pub struct AverageFunction {
    params: Vec<Param>,
    sum_slot: Option<ValueSlot>,
    count_slot: Option<CountSlot>,
}

impl AverageFunction {
    pub fn new() -> Self {
        Self {
            params: Vec::new(),
            sum_slot: None,
            count_slot: None,
        }
    }

    fn grouped(&self) -> bool {
        self.params.len() == 1
    }
}

impl Default for AverageFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AverageFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, "average", &self.params)
    }
}

impl Function for AverageFunction {
    fn name(&self) -> &str {
        "average"
    }

    fn set_params(&mut self, params: Vec<Param>) -> Result<()> {
        check_arity("average", 1, usize::MAX, params.len())?;
        if params.len() == 1 {
            reject_nested_aggregate("average", &params)?;
        }
        self.params = params;
        Ok(())
    }

    fn register_slots(&mut self, registry: &mut SlotRegistry) {
        if self.grouped() {
            self.sum_slot = Some(registry.value_slot());
            self.count_slot = Some(registry.count_slot());
        }
        for param in &mut self.params {
            param.register_slots(registry);
        }
    }

    fn make_generator(&self) -> Box<dyn Generator> {
        if self.grouped() {
            return Box::new(AverageGenerator {
                child: self.params[0].make_generator(),
                sum_slot: self.sum_slot,
                count_slot: self.count_slot,
            });
        }
        Box::new(RowwiseAverageGenerator {
            children: self.params.iter().map(Param::make_generator).collect(),
        })
    }

    fn is_aggregate(&self) -> bool {
        self.grouped()
    }

    fn has_aggregate(&self) -> bool {
        self.grouped() || self.params.iter().any(Param::has_aggregate)
    }

    fn requires_child_data(&self) -> bool {
        self.params.iter().any(Param::requires_child_data)
    }
}

struct AverageGenerator {
    child: Box<dyn Generator>,
    sum_slot: Option<ValueSlot>,
    count_slot: Option<CountSlot>,
}

impl Generator for AverageGenerator {
    fn apply_row(&self, row: &[Value], storage: &mut StoredValues) {
        let (Some(sum_slot), Some(count_slot)) = (self.sum_slot, self.count_slot) else {
            return;
        };
        self.child.apply_row(row, storage);
        let new = self.child.evaluate(storage, None);
        if new.is_null() {
            return;
        }
        let folded = fold_running(storage.value(sum_slot), &new, add_values);
        storage.set_value(sum_slot, folded);
        if !new.is_error() {
            storage.increment(count_slot);
        }
    }

    fn evaluate(&self, storage: &StoredValues, _group: Option<&dyn GroupData>) -> Value {
        let (Some(sum_slot), Some(count_slot)) = (self.sum_slot, self.count_slot) else {
            return Value::Null;
        };
        let sum = storage.value(sum_slot);
        if sum.is_error() {
            return sum.clone();
        }
        let count = storage.count(count_slot);
        if count == 0 {
            return Value::Null;
        }
        match sum.as_double() {
            Some(total) => Value::Double(total / count as f64),
            None => Value::error("unable to average non-numeric values"),
        }
    }

    fn merge(&self, target: &mut StoredValues, source: &StoredValues) {
        let (Some(sum_slot), Some(count_slot)) = (self.sum_slot, self.count_slot) else {
            return;
        };
        self.child.merge(target, source);
        let folded = fold_running(target.value(sum_slot), source.value(sum_slot), add_values);
        target.set_value(sum_slot, folded);
        target.add_count(count_slot, source.count(count_slot));
    }
}

struct RowwiseAverageGenerator {
    children: Vec<Box<dyn Generator>>,
}

impl Generator for RowwiseAverageGenerator {
    fn apply_row(&self, row: &[Value], storage: &mut StoredValues) {
        for child in &self.children {
            child.apply_row(row, storage);
        }
    }

    fn evaluate(&self, storage: &StoredValues, group: Option<&dyn GroupData>) -> Value {
        let mut sum = Value::Null;
        let mut count = 0u64;
        for child in &self.children {
            let next = child.evaluate(storage, group);
            if next.is_error() {
                return next;
            }
            if next.is_null() {
                continue;
            }
            sum = fold_running(&sum, &next, add_values);
            count += 1;
        }
        if count == 0 {
            return Value::Null;
        }
        match sum.as_double() {
            Some(total) => Value::Double(total / count as f64),
            None => Value::error("unable to average non-numeric values"),
        }
    }

    fn merge(&self, target: &mut StoredValues, source: &StoredValues) {
        for child in &self.children {
            child.merge(target, source);
        }
    }
}

/// `distinct(field, [delimiter])` - sorted unique values joined as a string
pub struct DistinctFunction {
    params: Vec<Param>,
    delimiter: String,
    slot: Option<StringListSlot>,
    max_chars: usize,
}

impl DistinctFunction {
    pub fn new(max_chars: usize) -> Self {
        Self {
            params: Vec::new(),
            delimiter: ",".to_string(),
            slot: None,
            max_chars,
        }
    }
}

impl fmt::Display for DistinctFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, "distinct", &self.params)
    }
}

impl Function for DistinctFunction {
    fn name(&self) -> &str {
        "distinct"
    }

    fn set_params(&mut self, params: Vec<Param>) -> Result<()> {
        check_arity("distinct", 1, 2, params.len())?;
        reject_nested_aggregate("distinct", &params)?;
        if let Some(param) = params.get(1) {
            self.delimiter = literal_string("distinct", param)?;
        }
        self.params = params;
        Ok(())
    }

    fn register_slots(&mut self, registry: &mut SlotRegistry) {
        self.slot = Some(registry.string_list_slot());
        if let Some(param) = self.params.first_mut() {
            param.register_slots(registry);
        }
    }

    fn make_generator(&self) -> Box<dyn Generator> {
        Box::new(DistinctGenerator {
            child: self.params[0].make_generator(),
            delimiter: self.delimiter.clone(),
            slot: self.slot,
            max_chars: self.max_chars,
        })
    }

    fn is_aggregate(&self) -> bool {
        true
    }

    fn has_aggregate(&self) -> bool {
        true
    }
}

struct DistinctGenerator {
    child: Box<dyn Generator>,
    delimiter: String,
    slot: Option<StringListSlot>,
    max_chars: usize,
}

impl DistinctGenerator {
    fn insert(&self, storage: &mut StoredValues, item: String) {
        let Some(slot) = self.slot else { return };
        let max_chars = self.max_chars;
        let delim_len = self.delimiter.len();
        let list = storage.string_list_mut(slot);
        if let Err(pos) = list.binary_search(&item) {
            if joined_len(list, delim_len) + item.len() + delim_len <= max_chars {
                list.insert(pos, item);
            }
        }
    }
}

impl Generator for DistinctGenerator {
    fn apply_row(&self, row: &[Value], storage: &mut StoredValues) {
        self.child.apply_row(row, storage);
        let value = self.child.evaluate(storage, None);
        if value.is_null() || value.is_error() {
            return;
        }
        self.insert(storage, value.to_string());
    }

    fn evaluate(&self, storage: &StoredValues, _group: Option<&dyn GroupData>) -> Value {
        match self.slot {
            Some(slot) => Value::string(storage.string_list(slot).join(&self.delimiter)),
            None => Value::Null,
        }
    }

    fn merge(&self, target: &mut StoredValues, source: &StoredValues) {
        let Some(slot) = self.slot else { return };
        self.child.merge(target, source);
        let items: Vec<String> = source.string_list(slot).to_vec();
        for item in items {
            self.insert(target, item);
        }
    }
}

/// `joining(field, [delimiter], [limit])` - values joined in arrival order
pub struct JoiningFunction {
    params: Vec<Param>,
    delimiter: String,
    limit: usize,
    slot: Option<StringListSlot>,
    max_chars: usize,
}

impl JoiningFunction {
    pub fn new(max_chars: usize) -> Self {
        Self {
            params: Vec::new(),
            delimiter: ",".to_string(),
            limit: usize::MAX,
            slot: None,
            max_chars,
        }
    }
}

impl fmt::Display for JoiningFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, "joining", &self.params)
    }
}

impl Function for JoiningFunction {
    fn name(&self) -> &str {
        "joining"
    }

    fn set_params(&mut self, params: Vec<Param>) -> Result<()> {
        check_arity("joining", 1, 3, params.len())?;
        reject_nested_aggregate("joining", &params)?;
        if let Some(param) = params.get(1) {
            self.delimiter = literal_string("joining", param)?;
        }
        if let Some(param) = params.get(2) {
            self.limit = literal_usize("joining", param)?;
        }
        self.params = params;
        Ok(())
    }

    fn register_slots(&mut self, registry: &mut SlotRegistry) {
        self.slot = Some(registry.string_list_slot());
        if let Some(param) = self.params.first_mut() {
            param.register_slots(registry);
        }
    }

    fn make_generator(&self) -> Box<dyn Generator> {
        Box::new(JoiningGenerator {
            child: self.params[0].make_generator(),
            delimiter: self.delimiter.clone(),
            limit: self.limit,
            slot: self.slot,
            max_chars: self.max_chars,
        })
    }

    fn is_aggregate(&self) -> bool {
        true
    }

    fn has_aggregate(&self) -> bool {
        true
    }
}

struct JoiningGenerator {
    child: Box<dyn Generator>,
    delimiter: String,
    limit: usize,
    slot: Option<StringListSlot>,
    max_chars: usize,
}

impl JoiningGenerator {
    fn push(&self, storage: &mut StoredValues, item: String) {
        let Some(slot) = self.slot else { return };
        let max_chars = self.max_chars;
        let limit = self.limit;
        let delim_len = self.delimiter.len();
        let list = storage.string_list_mut(slot);
        if list.len() < limit && joined_len(list, delim_len) + item.len() + delim_len <= max_chars
        {
            list.push(item);
        }
    }
}

impl Generator for JoiningGenerator {
    fn apply_row(&self, row: &[Value], storage: &mut StoredValues) {
        self.child.apply_row(row, storage);
        let value = self.child.evaluate(storage, None);
        if value.is_null() || value.is_error() {
            return;
        }
        self.push(storage, value.to_string());
    }

    fn evaluate(&self, storage: &StoredValues, _group: Option<&dyn GroupData>) -> Value {
        match self.slot {
            Some(slot) => Value::string(storage.string_list(slot).join(&self.delimiter)),
            None => Value::Null,
        }
    }

    fn merge(&self, target: &mut StoredValues, source: &StoredValues) {
        let Some(slot) = self.slot else { return };
        self.child.merge(target, source);
        let items: Vec<String> = source.string_list(slot).to_vec();
        for item in items {
            self.push(target, item);
        }
    }
}

/// Character length of `list` once joined with a delimiter of `delim_len`
fn joined_len(list: &[String], delim_len: usize) -> usize {
    let items: usize = list.iter().map(String::len).sum();
    items + delim_len * list.len().saturating_sub(1)
}

pub(crate) fn literal_string(name: &str, param: &Param) -> Result<String> {
    match param {
        Param::Value(v) if !v.is_null() && !v.is_error() => Ok(v.to_string()),
        _ => Err(crate::core::Error::invalid_argument(
            name,
            "expected a literal string argument",
        )),
    }
}

pub(crate) fn literal_usize(name: &str, param: &Param) -> Result<usize> {
    match param {
        Param::Value(v) => v
            .as_long()
            .and_then(|l| usize::try_from(l).ok())
            .ok_or_else(|| {
                crate::core::Error::invalid_argument(name, "expected a literal whole number")
            }),
        _ => Err(crate::core::Error::invalid_argument(
            name,
            "expected a literal whole number",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::param::FieldRef;

    fn compile(mut f: impl Function) -> (Box<dyn Generator>, SlotRegistry) {
        let mut registry = SlotRegistry::new();
        f.register_slots(&mut registry);
        (f.make_generator(), registry)
    }

    fn field_param() -> Param {
        Param::Field(FieldRef::new("val", 0))
    }

    #[test]
    fn test_sum_over_rows() {
        let mut f = sum();
        f.set_params(vec![field_param()]).unwrap();
        assert!(f.is_aggregate());
        let (gen, registry) = compile(f);
        let mut storage = registry.create_storage();
        for i in [1i64, 2, 3] {
            gen.apply_row(&[Value::Long(i)], &mut storage);
        }
        assert_eq!(gen.evaluate(&storage, None), Value::Double(6.0));
    }

    #[test]
    fn test_sum_skips_null_and_keeps_error() {
        let mut f = sum();
        f.set_params(vec![field_param()]).unwrap();
        let (gen, registry) = compile(f);
        let mut storage = registry.create_storage();
        gen.apply_row(&[Value::Long(1)], &mut storage);
        gen.apply_row(&[Value::Null], &mut storage);
        gen.apply_row(&[Value::Long(2)], &mut storage);
        assert_eq!(gen.evaluate(&storage, None), Value::Double(3.0));

        gen.apply_row(&[Value::error("bad row")], &mut storage);
        gen.apply_row(&[Value::Long(5)], &mut storage);
        assert!(gen.evaluate(&storage, None).is_error());
    }

    #[test]
    fn test_merge_equals_union() {
        let mut f = sum();
        f.set_params(vec![field_param()]).unwrap();
        let (gen, registry) = compile(f);

        let mut left = registry.create_storage();
        let mut right = registry.create_storage();
        let mut whole = registry.create_storage();
        for i in [1i64, 2] {
            gen.apply_row(&[Value::Long(i)], &mut left);
            gen.apply_row(&[Value::Long(i)], &mut whole);
        }
        for i in [3i64, 4] {
            gen.apply_row(&[Value::Long(i)], &mut right);
            gen.apply_row(&[Value::Long(i)], &mut whole);
        }
        gen.merge(&mut left, &right);
        assert_eq!(gen.evaluate(&left, None), gen.evaluate(&whole, None));
    }

    #[test]
    fn test_min_max() {
        for (f, expected) in [(min(), 1i64), (max(), 9i64)] {
            let mut f = f;
            f.set_params(vec![field_param()]).unwrap();
            let (gen, registry) = compile(f);
            let mut storage = registry.create_storage();
            for i in [3i64, 1, 9, 4] {
                gen.apply_row(&[Value::Long(i)], &mut storage);
            }
            assert_eq!(gen.evaluate(&storage, None), Value::Long(expected));
        }
    }

    #[test]
    fn test_min_rowwise() {
        let mut f = min();
        f.set_params(vec![
            field_param(),
            Param::Value(Value::Long(5)),
            Param::Value(Value::Long(2)),
        ])
        .unwrap();
        assert!(!f.is_aggregate());
        let (gen, registry) = compile(f);
        let mut storage = registry.create_storage();
        gen.apply_row(&[Value::Long(7)], &mut storage);
        assert_eq!(gen.evaluate(&storage, None), Value::Long(2));
    }

    #[test]
    fn test_count() {
        let mut f = CountFunction::new();
        f.set_params(vec![]).unwrap();
        let (gen, registry) = compile(f);
        let mut a = registry.create_storage();
        let mut b = registry.create_storage();
        for _ in 0..3 {
            gen.apply_row(&[], &mut a);
        }
        gen.apply_row(&[], &mut b);
        gen.merge(&mut a, &b);
        assert_eq!(gen.evaluate(&a, None), Value::Long(4));
    }

    #[test]
    fn test_average() {
        let mut f = AverageFunction::new();
        f.set_params(vec![field_param()]).unwrap();
        let (gen, registry) = compile(f);
        let mut storage = registry.create_storage();
        for i in [1i64, 2, 3, 4] {
            gen.apply_row(&[Value::Long(i)], &mut storage);
        }
        assert_eq!(gen.evaluate(&storage, None), Value::Double(2.5));
    }

    #[test]
    fn test_average_empty_group_is_null() {
        let mut f = AverageFunction::new();
        f.set_params(vec![field_param()]).unwrap();
        let (gen, registry) = compile(f);
        let storage = registry.create_storage();
        assert!(gen.evaluate(&storage, None).is_null());
    }

    #[test]
    fn test_average_merge_weighted() {
        let mut f = AverageFunction::new();
        f.set_params(vec![field_param()]).unwrap();
        let (gen, registry) = compile(f);
        let mut left = registry.create_storage();
        let mut right = registry.create_storage();
        gen.apply_row(&[Value::Long(1)], &mut left);
        for i in [2i64, 3, 6] {
            gen.apply_row(&[Value::Long(i)], &mut right);
        }
        gen.merge(&mut left, &right);
        assert_eq!(gen.evaluate(&left, None), Value::Double(3.0));
    }

    #[test]
    fn test_distinct_sorted_unique() {
        let mut f = DistinctFunction::new(1000);
        f.set_params(vec![field_param()]).unwrap();
        let (gen, registry) = compile(f);
        let mut storage = registry.create_storage();
        for s in ["b", "a", "b", "c", "a"] {
            gen.apply_row(&[Value::string(s)], &mut storage);
        }
        assert_eq!(gen.evaluate(&storage, None), Value::string("a,b,c"));
    }

    #[test]
    fn test_distinct_merge_is_set_union() {
        let mut f = DistinctFunction::new(1000);
        f.set_params(vec![field_param()]).unwrap();
        let (gen, registry) = compile(f);
        let mut left = registry.create_storage();
        let mut right = registry.create_storage();
        for s in ["b", "a"] {
            gen.apply_row(&[Value::string(s)], &mut left);
        }
        for s in ["c", "a"] {
            gen.apply_row(&[Value::string(s)], &mut right);
        }
        gen.merge(&mut left, &right);
        assert_eq!(gen.evaluate(&left, None), Value::string("a,b,c"));
    }

    #[test]
    fn test_distinct_respects_char_cap() {
        let mut f = DistinctFunction::new(7);
        f.set_params(vec![field_param()]).unwrap();
        let (gen, registry) = compile(f);
        let mut storage = registry.create_storage();
        for s in ["aaa", "bbb", "ccc"] {
            gen.apply_row(&[Value::string(s)], &mut storage);
        }
        // Third item would exceed the cap once delimiters are counted
        assert_eq!(gen.evaluate(&storage, None), Value::string("aaa,bbb"));
    }

    #[test]
    fn test_joining_keeps_order_and_limit() {
        let mut f = JoiningFunction::new(1000);
        f.set_params(vec![
            field_param(),
            Param::Value(Value::string("|")),
            Param::Value(Value::Long(3)),
        ])
        .unwrap();
        let (gen, registry) = compile(f);
        let mut storage = registry.create_storage();
        for s in ["z", "y", "x", "w"] {
            gen.apply_row(&[Value::string(s)], &mut storage);
        }
        assert_eq!(gen.evaluate(&storage, None), Value::string("z|y|x"));
    }

    #[test]
    fn test_joining_delimiter_must_be_literal() {
        let mut f = JoiningFunction::new(1000);
        let err = f
            .set_params(vec![field_param(), field_param()])
            .unwrap_err();
        assert!(err.to_string().contains("literal"));
    }

    #[test]
    fn test_nested_aggregate_rejected() {
        let mut inner = sum();
        inner.set_params(vec![field_param()]).unwrap();
        let mut outer = sum();
        let err = outer
            .set_params(vec![Param::Function(Box::new(inner))])
            .unwrap_err();
        assert!(err.to_string().contains("nested"));
    }
}
