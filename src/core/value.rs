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

//! Value type for Veld - the closed set of runtime value variants
//!
//! Every variant reports its [`Kind`] and exposes best-effort conversions
//! that return `None` instead of failing when a conversion is not
//! meaningful. Values are created once and safe to share: `Str` and `Xml`
//! payloads live behind `Arc` so cloning during row processing is cheap,
//! and derived forms (the parsed numeric value of a string, the textual
//! rendering of raw XML bytes) are computed lazily and memoized on the
//! shared payload.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Date formats accepted when parsing a string into a Date value.
/// Order matters - more specific formats first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z", // RFC3339 with fractional seconds
    "%Y-%m-%dT%H:%M:%S%:z",    // RFC3339
    "%Y-%m-%dT%H:%M:%S%.fZ",   // RFC3339 UTC with fractional seconds
    "%Y-%m-%dT%H:%M:%SZ",      // RFC3339 UTC
    "%Y-%m-%dT%H:%M:%S%.f",    // ISO without timezone
    "%Y-%m-%dT%H:%M:%S",       // ISO without timezone or fraction
    "%Y-%m-%d %H:%M:%S%.f",    // SQL-style with fractional seconds
    "%Y-%m-%d %H:%M:%S",       // SQL-style
];

/// Millisecond multipliers for duration suffixes
const DURATION_UNITS: &[(&str, i64)] = &[
    ("ms", 1),
    ("s", 1_000),
    ("m", 60_000),
    ("h", 3_600_000),
    ("d", 86_400_000),
    ("w", 604_800_000),
];

/// The kind of a runtime value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    String,
    Date,
    Duration,
    Error,
    Xml,
}

impl Kind {
    /// Human-readable kind name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Byte => "byte",
            Kind::Short => "short",
            Kind::Integer => "integer",
            Kind::Long => "long",
            Kind::Float => "float",
            Kind::Double => "double",
            Kind::String => "string",
            Kind::Date => "date",
            Kind::Duration => "duration",
            Kind::Error => "error",
            Kind::Xml => "xml",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric form recovered from a string payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Num {
    Long(i64),
    Double(f64),
}

/// Shared string payload with a memoized numeric parse.
///
/// The numeric form is resolved at most once per payload, no matter how many
/// Value clones share it.
#[derive(Debug)]
pub struct StrBuf {
    text: Box<str>,
    numeric: OnceLock<Option<Num>>,
}

impl StrBuf {
    fn new(text: impl Into<String>) -> Self {
        StrBuf {
            text: text.into().into_boxed_str(),
            numeric: OnceLock::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn numeric(&self) -> Option<Num> {
        *self.numeric.get_or_init(|| parse_string_numeric(&self.text))
    }
}

/// Shared XML payload with a memoized textual rendering
#[derive(Debug)]
pub struct XmlBuf {
    bytes: Box<[u8]>,
    text: OnceLock<String>,
}

impl XmlBuf {
    fn new(bytes: impl Into<Vec<u8>>) -> Self {
        XmlBuf {
            bytes: bytes.into().into_boxed_slice(),
            text: OnceLock::new(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lazy textual rendering, computed on first use
    pub fn text(&self) -> &str {
        self.text
            .get_or_init(|| String::from_utf8_lossy(&self.bytes).into_owned())
    }
}

/// A runtime value - a closed, immutable, tagged union
///
/// `Date` and `Duration` both carry millisecond counts (`Date` as an epoch
/// instant, `Duration` as a span). `Error` carries a message and is
/// infectious: most operations receiving an Error input propagate it
/// instead of computing.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(Arc<StrBuf>),
    /// Epoch millis instant
    Date(i64),
    /// Millisecond span
    Duration(i64),
    Error(Arc<str>),
    /// Raw bytes with lazy textual rendering
    Xml(Arc<XmlBuf>),
}

impl Value {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a string value
    pub fn string(text: impl Into<String>) -> Self {
        Value::Str(Arc::new(StrBuf::new(text)))
    }

    /// Create an error value carrying a message
    pub fn error(message: impl Into<String>) -> Self {
        Value::Error(Arc::from(message.into().as_str()))
    }

    /// Create an XML value from raw bytes
    pub fn xml(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Xml(Arc::new(XmlBuf::new(bytes)))
    }

    // =========================================================================
    // Type accessors
    // =========================================================================

    /// Returns the kind of this value
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Boolean(_) => Kind::Boolean,
            Value::Byte(_) => Kind::Byte,
            Value::Short(_) => Kind::Short,
            Value::Integer(_) => Kind::Integer,
            Value::Long(_) => Kind::Long,
            Value::Float(_) => Kind::Float,
            Value::Double(_) => Kind::Double,
            Value::Str(_) => Kind::String,
            Value::Date(_) => Kind::Date,
            Value::Duration(_) => Kind::Duration,
            Value::Error(_) => Kind::Error,
            Value::Xml(_) => Kind::Xml,
        }
    }

    /// Returns true if this value is Null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this value is an Error
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Returns true if a numeric form can be recovered from this value
    pub fn has_numeric_value(&self) -> bool {
        match self {
            Value::Boolean(_)
            | Value::Byte(_)
            | Value::Short(_)
            | Value::Integer(_)
            | Value::Long(_)
            | Value::Float(_)
            | Value::Double(_)
            | Value::Date(_)
            | Value::Duration(_) => true,
            Value::Str(s) => s.numeric().is_some(),
            Value::Null | Value::Error(_) | Value::Xml(_) => false,
        }
    }

    /// Returns true if the numeric form of this value has a fractional part
    pub fn has_fractional_part(&self) -> bool {
        match self {
            Value::Float(f) => f.fract() != 0.0,
            Value::Double(d) => d.fract() != 0.0,
            Value::Str(s) => matches!(s.numeric(), Some(Num::Double(d)) if d.fract() != 0.0),
            _ => false,
        }
    }

    // =========================================================================
    // Best-effort conversions - None instead of failure
    // =========================================================================

    /// Extract as i64
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Null | Value::Error(_) | Value::Xml(_) => None,
            Value::Boolean(b) => Some(if *b { 1 } else { 0 }),
            Value::Byte(v) => Some(*v as i64),
            Value::Short(v) => Some(*v as i64),
            Value::Integer(v) => Some(*v as i64),
            Value::Long(v) => Some(*v),
            Value::Float(v) => Some(*v as i64),
            Value::Double(v) => Some(*v as i64),
            Value::Str(s) => s.numeric().map(|n| match n {
                Num::Long(l) => l,
                Num::Double(d) => d as i64,
            }),
            Value::Date(ms) => Some(*ms),
            Value::Duration(ms) => Some(*ms),
        }
    }

    /// Extract as i32
    pub fn as_integer(&self) -> Option<i32> {
        self.as_long().and_then(|l| i32::try_from(l).ok())
    }

    /// Extract as f64
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Null | Value::Error(_) | Value::Xml(_) => None,
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Byte(v) => Some(*v as f64),
            Value::Short(v) => Some(*v as f64),
            Value::Integer(v) => Some(*v as f64),
            Value::Long(v) => Some(*v as f64),
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            Value::Str(s) => s.numeric().map(|n| match n {
                Num::Long(l) => l as f64,
                Num::Double(d) => d,
            }),
            Value::Date(ms) => Some(*ms as f64),
            Value::Duration(ms) => Some(*ms as f64),
        }
    }

    /// Extract as f32
    pub fn as_float(&self) -> Option<f32> {
        self.as_double().map(|d| d as f32)
    }

    /// Extract as boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Str(s) => {
                let t = s.text();
                if t.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if t.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    s.numeric().map(|n| match n {
                        Num::Long(l) => l != 0,
                        Num::Double(d) => d != 0.0,
                    })
                }
            }
            Value::Null | Value::Error(_) | Value::Xml(_) => None,
            _ => self.as_double().map(|d| d != 0.0),
        }
    }

    /// Extract as String
    ///
    /// `Null` has no string form; `Error` renders with its `Err:` prefix so
    /// error values have a stable lexical position when compared as strings.
    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Extract the message of an Error value
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Value::Error(m) => Some(m),
            _ => None,
        }
    }

    pub(crate) fn numeric(&self) -> Option<Num> {
        match self {
            Value::Boolean(b) => Some(Num::Long(if *b { 1 } else { 0 })),
            Value::Byte(v) => Some(Num::Long(*v as i64)),
            Value::Short(v) => Some(Num::Long(*v as i64)),
            Value::Integer(v) => Some(Num::Long(*v as i64)),
            Value::Long(v) => Some(Num::Long(*v)),
            Value::Float(v) => Some(Num::Double(*v as f64)),
            Value::Double(v) => Some(Num::Double(*v)),
            Value::Str(s) => s.numeric(),
            Value::Date(ms) | Value::Duration(ms) => Some(Num::Long(*ms)),
            Value::Null | Value::Error(_) | Value::Xml(_) => None,
        }
    }
}

// =========================================================================
// Trait implementations
// =========================================================================

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", format_double(*v as f64)),
            Value::Double(v) => write!(f, "{}", format_double(*v)),
            Value::Str(s) => write!(f, "{}", s.text()),
            Value::Date(ms) => write!(f, "{}", format_date_millis(*ms)),
            Value::Duration(ms) => write!(f, "{}", format_duration_millis(*ms)),
            Value::Error(m) => write!(f, "Err: {}", m),
            Value::Xml(x) => write!(f, "{}", x.text()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a.text() == b.text(),
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Xml(a), Value::Xml(b)) => a.bytes() == b.bytes(),
            // Numeric kinds compare by numeric value so Long(5) == Double(5.0)
            (a, b) => match (a.numeric_only(), b.numeric_only()) {
                (Some(x), Some(y)) => num_eq(x, y),
                _ => false,
            },
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Equal values must hash the same: numeric kinds hash as f64 bits so
        // Long(5) and Double(5.0) collide.
        match self {
            Value::Null => 0u8.hash(state),
            Value::Boolean(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Value::Str(s) => {
                2u8.hash(state);
                s.text().hash(state);
            }
            Value::Date(ms) => {
                3u8.hash(state);
                ms.hash(state);
            }
            Value::Duration(ms) => {
                4u8.hash(state);
                ms.hash(state);
            }
            Value::Error(m) => {
                5u8.hash(state);
                m.hash(state);
            }
            Value::Xml(x) => {
                6u8.hash(state);
                x.bytes().hash(state);
            }
            other => {
                7u8.hash(state);
                match other.numeric_only() {
                    Some(Num::Long(l)) => (l as f64).to_bits().hash(state),
                    Some(Num::Double(d)) => d.to_bits().hash(state),
                    None => {}
                }
            }
        }
    }
}

impl Value {
    /// Numeric form of the strictly numeric kinds only. Unlike
    /// [`Value::numeric`] this does not coerce booleans, strings or
    /// millisecond kinds, so equality stays per-variant for those.
    fn numeric_only(&self) -> Option<Num> {
        match self {
            Value::Byte(_)
            | Value::Short(_)
            | Value::Integer(_)
            | Value::Long(_)
            | Value::Float(_)
            | Value::Double(_) => self.numeric(),
            _ => None,
        }
    }
}

fn num_eq(a: Num, b: Num) -> bool {
    match (a, b) {
        (Num::Long(x), Num::Long(y)) => x == y,
        (Num::Double(x), Num::Double(y)) => {
            if x.is_nan() && y.is_nan() {
                true
            } else {
                x == y
            }
        }
        (Num::Long(x), Num::Double(y)) | (Num::Double(y), Num::Long(x)) => y == x as f64,
    }
}

// =========================================================================
// From implementations for convenient construction
// =========================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::string(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::string(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

// =========================================================================
// Helper functions
// =========================================================================

/// Recover a numeric form from a string: recognized date string first
/// (epoch millis), then duration string (millis), then plain numeric
/// literal. First success wins; total failure yields None without error.
fn parse_string_numeric(s: &str) -> Option<Num> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(ms) = parse_date_millis(s) {
        return Some(Num::Long(ms));
    }
    if let Some(ms) = parse_duration_millis(s) {
        return Some(Num::Long(ms));
    }
    if let Ok(l) = s.parse::<i64>() {
        return Some(Num::Long(l));
    }
    s.parse::<f64>().ok().filter(|d| d.is_finite()).map(Num::Double)
}

/// Parse a date/time string into epoch millis
pub fn parse_date_millis(s: &str) -> Option<i64> {
    let s = s.trim();
    // A date string needs a date shape, not just digits
    if !s.contains('-') || s.len() < 10 {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc).timestamp_millis());
        }
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&ndt).timestamp_millis());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let datetime = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&datetime).timestamp_millis());
    }
    None
}

/// Parse a duration string such as `500ms`, `30s`, `10m`, `2h`, `7d`, `1w`
pub fn parse_duration_millis(s: &str) -> Option<i64> {
    let s = s.trim();
    // Longest suffix first so "ms" wins over "s"
    for (suffix, multiplier) in DURATION_UNITS {
        if let Some(number) = s.strip_suffix(suffix) {
            if number.is_empty() {
                return None;
            }
            if let Ok(n) = number.parse::<i64>() {
                return n.checked_mul(*multiplier);
            }
            if let Ok(d) = number.parse::<f64>() {
                return Some((d * *multiplier as f64) as i64);
            }
            return None;
        }
    }
    None
}

/// Render epoch millis as an ISO-8601 instant with millisecond precision
pub fn format_date_millis(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        None => ms.to_string(),
    }
}

/// Render a millisecond span using the largest exact unit
pub fn format_duration_millis(ms: i64) -> String {
    for (suffix, multiplier) in DURATION_UNITS.iter().rev() {
        if ms != 0 && ms % multiplier == 0 {
            return format!("{}{}", ms / multiplier, suffix);
        }
    }
    format!("{}ms", ms)
}

/// Format a double consistently: integer-like values without a decimal,
/// otherwise the shortest round-trip representation
pub fn format_double(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        let s = format!("{:?}", v);
        if s.contains('.') && !s.contains('e') && !s.contains('E') {
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            s
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Value::Null.kind(), Kind::Null);
        assert_eq!(Value::Boolean(true).kind(), Kind::Boolean);
        assert_eq!(Value::Long(1).kind(), Kind::Long);
        assert_eq!(Value::Double(1.5).kind(), Kind::Double);
        assert_eq!(Value::string("x").kind(), Kind::String);
        assert_eq!(Value::Date(0).kind(), Kind::Date);
        assert_eq!(Value::Duration(0).kind(), Kind::Duration);
        assert_eq!(Value::error("bad").kind(), Kind::Error);
        assert_eq!(Value::xml(b"<a/>".to_vec()).kind(), Kind::Xml);
    }

    #[test]
    fn test_as_long() {
        assert_eq!(Value::Long(42).as_long(), Some(42));
        assert_eq!(Value::Integer(42).as_long(), Some(42));
        assert_eq!(Value::Double(3.7).as_long(), Some(3));
        assert_eq!(Value::Boolean(true).as_long(), Some(1));
        assert_eq!(Value::Boolean(false).as_long(), Some(0));
        assert_eq!(Value::string("42").as_long(), Some(42));
        assert_eq!(Value::Date(1000).as_long(), Some(1000));
        assert_eq!(Value::Duration(1000).as_long(), Some(1000));
        assert_eq!(Value::Null.as_long(), None);
        assert_eq!(Value::error("x").as_long(), None);
        assert_eq!(Value::string("not a number").as_long(), None);
    }

    #[test]
    fn test_as_double() {
        assert_eq!(Value::Double(3.5).as_double(), Some(3.5));
        assert_eq!(Value::Long(42).as_double(), Some(42.0));
        assert_eq!(Value::string("3.5").as_double(), Some(3.5));
        assert_eq!(Value::Boolean(true).as_double(), Some(1.0));
        assert_eq!(Value::Null.as_double(), None);
    }

    #[test]
    fn test_as_boolean() {
        assert_eq!(Value::Boolean(true).as_boolean(), Some(true));
        assert_eq!(Value::Long(1).as_boolean(), Some(true));
        assert_eq!(Value::Long(0).as_boolean(), Some(false));
        assert_eq!(Value::string("true").as_boolean(), Some(true));
        assert_eq!(Value::string("FALSE").as_boolean(), Some(false));
        assert_eq!(Value::string("1").as_boolean(), Some(true));
        assert_eq!(Value::string("maybe").as_boolean(), None);
        assert_eq!(Value::Null.as_boolean(), None);
    }

    #[test]
    fn test_string_numeric_parse_order() {
        // Plain numeric literal
        assert_eq!(Value::string("123").as_long(), Some(123));
        // Duration string
        assert_eq!(Value::string("2s").as_long(), Some(2000));
        assert_eq!(Value::string("1w").as_long(), Some(604_800_000));
        // Date string wins over everything
        let v = Value::string("2014-02-22T12:12:12.888Z");
        assert_eq!(v.as_long(), Some(1_393_071_132_888));
    }

    #[test]
    fn test_string_numeric_memoized() {
        let v = Value::string("3.25");
        // Same answer on repeat calls, computed once on the shared payload
        assert_eq!(v.as_double(), Some(3.25));
        let clone = v.clone();
        assert_eq!(clone.as_double(), Some(3.25));
    }

    #[test]
    fn test_fractional_part() {
        assert!(Value::Double(1.5).has_fractional_part());
        assert!(!Value::Double(2.0).has_fractional_part());
        assert!(Value::string("1.5").has_fractional_part());
        assert!(!Value::string("15").has_fractional_part());
        assert!(!Value::Long(7).has_fractional_part());
    }

    #[test]
    fn test_equality() {
        assert_eq!(Value::Long(5), Value::Long(5));
        assert_eq!(Value::Long(5), Value::Double(5.0));
        assert_eq!(Value::Integer(5), Value::Long(5));
        assert_ne!(Value::Long(5), Value::Double(5.5));
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Null, Value::Long(0));
        assert_eq!(Value::error("a"), Value::error("a"));
        assert_ne!(Value::error("a"), Value::error("b"));
        // Strings stay per-variant: "1" is not Long(1)
        assert_ne!(Value::string("1"), Value::Long(1));
    }

    #[test]
    fn test_hash_consistent_with_eq() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(Value::Long(5));
        set.insert(Value::Double(5.0)); // equal to Long(5), must not duplicate
        set.insert(Value::Long(6));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Long(42).to_string(), "42");
        assert_eq!(Value::Double(3.5).to_string(), "3.5");
        assert_eq!(Value::Double(4.0).to_string(), "4");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::error("boom").to_string(), "Err: boom");
        assert_eq!(Value::Duration(2000).to_string(), "2s");
        assert_eq!(
            Value::Date(1_393_071_132_888).to_string(),
            "2014-02-22T12:12:12.888Z"
        );
    }

    #[test]
    fn test_xml_lazy_text() {
        let v = Value::xml(b"<doc>hi</doc>".to_vec());
        assert_eq!(v.to_string(), "<doc>hi</doc>");
        assert_eq!(v.as_string(), Some("<doc>hi</doc>".to_string()));
    }

    #[test]
    fn test_parse_duration_millis() {
        assert_eq!(parse_duration_millis("500ms"), Some(500));
        assert_eq!(parse_duration_millis("30s"), Some(30_000));
        assert_eq!(parse_duration_millis("10m"), Some(600_000));
        assert_eq!(parse_duration_millis("2h"), Some(7_200_000));
        assert_eq!(parse_duration_millis("1.5s"), Some(1500));
        assert_eq!(parse_duration_millis("s"), None);
        assert_eq!(parse_duration_millis("10"), None);
    }

    #[test]
    fn test_parse_date_millis() {
        assert_eq!(
            parse_date_millis("2014-02-22T12:12:12.888Z"),
            Some(1_393_071_132_888)
        );
        assert_eq!(parse_date_millis("2014-02-22"), Some(1_393_027_200_000));
        assert_eq!(parse_date_millis("not a date"), None);
        // Bare numbers are not dates
        assert_eq!(parse_date_millis("12345678901"), None);
    }

    #[test]
    fn test_coercion_round_trip() {
        for v in [
            Value::Long(42),
            Value::Integer(7),
            Value::Double(3.25),
            Value::Byte(-4),
            Value::Short(300),
        ] {
            let d = v.as_double().unwrap();
            assert!((Value::Double(d).as_double().unwrap() - d).abs() < 1e-9);
        }
        // Integer-literal strings recover the exact integer
        assert_eq!(Value::string("9007199254740993").as_long(), Some(9007199254740993));
    }
}
