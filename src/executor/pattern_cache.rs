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

//! Process-wide LRU cache of compiled regular expressions
//!
//! Pattern-matching functions compile their pattern at most once per
//! process; repeated evaluation with the same dynamic pattern reuses the
//! compiled form. Compile failures are cached too so a bad pattern does
//! not recompile on every row.

use std::num::NonZeroUsize;
use std::sync::OnceLock;

use lru::LruCache;
use parking_lot::Mutex;
use regex::Regex;

/// Maximum number of cached patterns
const MAX_PATTERNS: usize = 1024;

struct PatternCache {
    cache: Mutex<LruCache<String, Result<Regex, String>>>,
}

static PATTERN_CACHE: OnceLock<PatternCache> = OnceLock::new();

fn cache() -> &'static PatternCache {
    PATTERN_CACHE.get_or_init(|| PatternCache {
        cache: Mutex::new(LruCache::new(
            NonZeroUsize::new(MAX_PATTERNS).unwrap_or(NonZeroUsize::MIN),
        )),
    })
}

/// Compile a pattern through the cache
///
/// `Regex` clones share the compiled program, so handing out clones is
/// cheap. The error string is the formatted compile error.
pub fn compile_pattern(pattern: &str) -> Result<Regex, String> {
    let mut guard = cache().cache.lock();
    if let Some(entry) = guard.get(pattern) {
        return entry.clone();
    }
    let compiled = Regex::new(pattern).map_err(|e| e.to_string());
    if compiled.is_err() {
        log::debug!("pattern '{}' failed to compile", pattern);
    }
    guard.put(pattern.to_string(), compiled.clone());
    compiled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_and_reuse() {
        let a = compile_pattern("^ab+c$").unwrap();
        let b = compile_pattern("^ab+c$").unwrap();
        assert!(a.is_match("abbc"));
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_bad_pattern_cached() {
        assert!(compile_pattern("(unclosed").is_err());
        assert!(compile_pattern("(unclosed").is_err());
    }
}
