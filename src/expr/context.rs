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

//! Compile-time context shared by all functions of one expression
//!
//! Carries the named query parameters, output size limits, the default
//! time zone offset for date functions and the optional external state
//! lookup hook. Built once per query and shared behind an `Arc`.

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use chrono::FixedOffset;

/// Hook for `lookup(map, key)`; returns `None` when the key is absent
pub type StateLookup = dyn Fn(&str, &str) -> Option<String> + Send + Sync;

/// Default cap on strings produced by collection functions
pub const DEFAULT_MAX_STRING_LENGTH: usize = 1000;

/// Shared configuration for expression compilation and evaluation
#[derive(Clone)]
pub struct ExpressionContext {
    max_string_length: usize,
    date_time_offset: Option<FixedOffset>,
    params: AHashMap<String, String>,
    state_lookup: Option<Arc<StateLookup>>,
}

impl Default for ExpressionContext {
    fn default() -> Self {
        Self {
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            date_time_offset: None,
            params: AHashMap::new(),
            state_lookup: None,
        }
    }
}

impl fmt::Debug for ExpressionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionContext")
            .field("max_string_length", &self.max_string_length)
            .field("date_time_offset", &self.date_time_offset)
            .field("params", &self.params)
            .field("state_lookup", &self.state_lookup.is_some())
            .finish()
    }
}

impl ExpressionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap on strings produced by `distinct`, `joining`, `top` and friends
    pub fn max_string_length(&self) -> usize {
        self.max_string_length
    }

    pub fn with_max_string_length(mut self, max: usize) -> Self {
        self.max_string_length = max;
        self
    }

    /// Default zone offset for `parseDate` / `formatDate`; UTC when unset
    pub fn date_time_offset(&self) -> Option<FixedOffset> {
        self.date_time_offset
    }

    pub fn with_date_time_offset(mut self, offset: FixedOffset) -> Self {
        self.date_time_offset = Some(offset);
        self
    }

    /// Value of a named query parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// All query parameters, sorted by key
    pub fn sorted_params(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        entries.sort_unstable_by_key(|(k, _)| *k);
        entries
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in params {
            self.params.insert(k.into(), v.into());
        }
        self
    }

    /// External map lookup hook used by `lookup`
    pub fn state_lookup(&self) -> Option<&Arc<StateLookup>> {
        self.state_lookup.as_ref()
    }

    pub fn with_state_lookup(mut self, lookup: Arc<StateLookup>) -> Self {
        self.state_lookup = Some(lookup);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let ctx = ExpressionContext::new();
        assert_eq!(ctx.max_string_length(), DEFAULT_MAX_STRING_LENGTH);
        assert!(ctx.date_time_offset().is_none());
        assert!(ctx.param("user").is_none());
    }

    #[test]
    fn test_params_sorted() {
        let ctx = ExpressionContext::new()
            .with_param("b", "2")
            .with_param("a", "1");
        assert_eq!(ctx.param("a"), Some("1"));
        assert_eq!(ctx.sorted_params(), vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_state_lookup() {
        let ctx = ExpressionContext::new().with_state_lookup(Arc::new(|map, key| {
            (map == "users" && key == "7").then(|| "alice".to_string())
        }));
        let lookup = ctx.state_lookup().unwrap();
        assert_eq!(lookup("users", "7"), Some("alice".to_string()));
        assert_eq!(lookup("users", "8"), None);
    }
}
