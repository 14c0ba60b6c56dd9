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

//! Date functions: `parseDate` and `formatDate`
//!
//! Patterns use chrono's strftime syntax. Without a pattern, `parseDate`
//! accepts the standard ISO forms and `formatDate` renders ISO-8601 UTC
//! with millisecond precision. The zone argument (or the context's default
//! offset) shifts parsing and rendering; it accepts `Z`, `+HHMM`,
//! `-HHMM` and `+HH:MM` forms.

use std::fmt;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::core::{format_date_millis, parse_date_millis, Error, Result, Value};
use crate::executor::{Generator, GroupData, SlotRegistry, StaticGenerator, StoredValues};
use crate::expr::context::ExpressionContext;
use crate::expr::param::Param;
use crate::functions::{
    any_aggregate, any_requires_child_data, check_arity, literal_args, write_call, Function,
};

#[derive(Clone, Copy)]
enum DateMode {
    Parse,
    Format,
}

pub fn parse_date(ctx: &ExpressionContext) -> DateFunction {
    DateFunction::new("parseDate", DateMode::Parse, ctx.date_time_offset())
}

pub fn format_date(ctx: &ExpressionContext) -> DateFunction {
    DateFunction::new("formatDate", DateMode::Format, ctx.date_time_offset())
}

/// `parseDate(value, [pattern], [zone])` / `formatDate(value, [pattern], [zone])`
pub struct DateFunction {
    name: &'static str,
    mode: DateMode,
    default_offset: Option<FixedOffset>,
    params: Vec<Param>,
    folded: Option<Value>,
}

impl DateFunction {
    fn new(name: &'static str, mode: DateMode, default_offset: Option<FixedOffset>) -> Self {
        Self {
            name,
            mode,
            default_offset,
            params: Vec::new(),
            folded: None,
        }
    }

    fn apply(&self, args: &[Value]) -> Value {
        if let Some(err) = args.iter().find(|v| v.is_error()) {
            return err.clone();
        }
        if args[0].is_null() {
            return Value::Null;
        }
        let offset = match args.get(2) {
            Some(zone) => match zone.as_string().as_deref().map(parse_offset) {
                Some(Some(offset)) => Some(offset),
                Some(None) => {
                    return Value::error(format!("{}: unrecognised zone '{}'", self.name, zone))
                }
                None => self.default_offset,
            },
            None => self.default_offset,
        };
        let pattern = args.get(1).and_then(Value::as_string);
        match self.mode {
            DateMode::Parse => parse_value(self.name, &args[0], pattern.as_deref(), offset),
            DateMode::Format => format_value(self.name, &args[0], pattern.as_deref(), offset),
        }
    }
}

fn parse_value(
    name: &str,
    value: &Value,
    pattern: Option<&str>,
    offset: Option<FixedOffset>,
) -> Value {
    if let Value::Date(ms) = value {
        return Value::Date(*ms);
    }
    let Some(text) = value.as_string() else {
        return Value::error(format!("{name}: unable to read value as text"));
    };
    match pattern {
        None => match parse_date_millis(&text) {
            Some(ms) => Value::Date(ms),
            None => Value::error(format!("{name}: unable to parse date '{text}'")),
        },
        Some(pattern) => {
            let naive = NaiveDateTime::parse_from_str(&text, pattern)
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(&text, pattern)
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                });
            let Some(naive) = naive else {
                return Value::error(format!(
                    "{name}: unable to parse date '{text}' with pattern '{pattern}'"
                ));
            };
            let ms = match offset {
                Some(offset) => match offset.from_local_datetime(&naive).single() {
                    Some(dt) => dt.timestamp_millis(),
                    None => return Value::error(format!("{name}: ambiguous local time")),
                },
                None => Utc.from_utc_datetime(&naive).timestamp_millis(),
            };
            Value::Date(ms)
        }
    }
}

fn format_value(
    name: &str,
    value: &Value,
    pattern: Option<&str>,
    offset: Option<FixedOffset>,
) -> Value {
    let Some(ms) = value.as_long() else {
        return Value::error(format!(
            "{name}: unable to read {} value as a date",
            value.kind()
        ));
    };
    let Some(utc) = Utc.timestamp_millis_opt(ms).single() else {
        return Value::error(format!("{name}: instant out of range"));
    };
    match (pattern, offset) {
        (None, None) => Value::string(format_date_millis(ms)),
        (pattern, offset) => {
            let pattern = pattern.unwrap_or("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let rendered = match offset {
                Some(offset) => utc.with_timezone(&offset).format(pattern).to_string(),
                None => utc.format(pattern).to_string(),
            };
            Value::string(rendered)
        }
    }
}

/// Parse a zone argument: `Z`, `UTC`, `+HHMM`, `-HHMM` or `+HH:MM`
fn parse_offset(zone: &str) -> Option<FixedOffset> {
    let zone = zone.trim();
    if zone.eq_ignore_ascii_case("z") || zone.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match zone.as_bytes().first()? {
        b'+' => (1, &zone[1..]),
        b'-' => (-1, &zone[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl fmt::Display for DateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, self.name, &self.params)
    }
}

impl Function for DateFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn set_params(&mut self, params: Vec<Param>) -> Result<()> {
        check_arity(self.name, 1, 3, params.len())?;
        if let Some(args) = literal_args(&params) {
            let folded = self.apply(&args);
            if let Some(message) = folded.error_message() {
                return Err(Error::invalid_argument(self.name, message));
            }
            self.folded = Some(folded);
        }
        self.params = params;
        Ok(())
    }

    fn register_slots(&mut self, registry: &mut SlotRegistry) {
        if self.folded.is_none() {
            for param in &mut self.params {
                param.register_slots(registry);
            }
        }
    }

    fn make_generator(&self) -> Box<dyn Generator> {
        if let Some(folded) = &self.folded {
            return Box::new(StaticGenerator::new(folded.clone()));
        }
        Box::new(DateGenerator {
            children: self.params.iter().map(Param::make_generator).collect(),
            function: DateFunction::new(self.name, self.mode, self.default_offset),
        })
    }

    fn has_aggregate(&self) -> bool {
        any_aggregate(&self.params)
    }

    fn requires_child_data(&self) -> bool {
        any_requires_child_data(&self.params)
    }
}

struct DateGenerator {
    children: Vec<Box<dyn Generator>>,
    function: DateFunction,
}

impl Generator for DateGenerator {
    fn apply_row(&self, row: &[Value], storage: &mut StoredValues) {
        for child in &self.children {
            child.apply_row(row, storage);
        }
    }

    fn evaluate(&self, storage: &StoredValues, group: Option<&dyn GroupData>) -> Value {
        let args: Vec<Value> = self
            .children
            .iter()
            .map(|child| child.evaluate(storage, group))
            .collect();
        self.function.apply(&args)
    }

    fn merge(&self, target: &mut StoredValues, source: &StoredValues) {
        for child in &self.children {
            child.merge(target, source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(f: &DateFunction, args: &[Value]) -> Value {
        f.apply(args)
    }

    #[test]
    fn test_parse_iso_without_pattern() {
        let ctx = ExpressionContext::new();
        let f = parse_date(&ctx);
        assert_eq!(
            eval(&f, &[Value::string("2014-02-22T12:12:12.888Z")]),
            Value::Date(1_393_071_132_888)
        );
    }

    #[test]
    fn test_parse_with_pattern() {
        let ctx = ExpressionContext::new();
        let f = parse_date(&ctx);
        assert_eq!(
            eval(
                &f,
                &[
                    Value::string("2014 02 22"),
                    Value::string("%Y %m %d"),
                ]
            ),
            Value::Date(1_393_027_200_000)
        );
    }

    #[test]
    fn test_parse_with_zone() {
        let ctx = ExpressionContext::new();
        let f = parse_date(&ctx);
        let utc = eval(
            &f,
            &[
                Value::string("2014-02-22 00:00:00"),
                Value::string("%Y-%m-%d %H:%M:%S"),
                Value::string("Z"),
            ],
        );
        let shifted = eval(
            &f,
            &[
                Value::string("2014-02-22 00:00:00"),
                Value::string("%Y-%m-%d %H:%M:%S"),
                Value::string("+0400"),
            ],
        );
        let (Some(a), Some(b)) = (utc.as_long(), shifted.as_long()) else {
            panic!("expected dates, got {utc} and {shifted}");
        };
        assert_eq!(a - b, 4 * 3600 * 1000);
    }

    #[test]
    fn test_parse_failure_is_error() {
        let ctx = ExpressionContext::new();
        let f = parse_date(&ctx);
        assert!(eval(&f, &[Value::string("not a date")]).is_error());
    }

    #[test]
    fn test_format_default_iso() {
        let ctx = ExpressionContext::new();
        let f = format_date(&ctx);
        assert_eq!(
            eval(&f, &[Value::Date(1_393_071_132_888)]),
            Value::string("2014-02-22T12:12:12.888Z")
        );
    }

    #[test]
    fn test_format_with_pattern_and_zone() {
        let ctx = ExpressionContext::new();
        let f = format_date(&ctx);
        assert_eq!(
            eval(
                &f,
                &[
                    Value::Date(1_393_071_132_888),
                    Value::string("%Y/%m/%d %H:%M"),
                    Value::string("+0100"),
                ]
            ),
            Value::string("2014/02/22 13:12")
        );
    }

    #[test]
    fn test_null_passes_through() {
        let ctx = ExpressionContext::new();
        assert!(eval(&parse_date(&ctx), &[Value::Null]).is_null());
        assert!(eval(&format_date(&ctx), &[Value::Null]).is_null());
    }

    #[test]
    fn test_parse_offset_forms() {
        assert_eq!(parse_offset("Z"), FixedOffset::east_opt(0));
        assert_eq!(parse_offset("+0400"), FixedOffset::east_opt(4 * 3600));
        assert_eq!(parse_offset("-05:30"), FixedOffset::east_opt(-(5 * 3600 + 30 * 60)));
        assert_eq!(parse_offset("nonsense"), None);
    }
}
