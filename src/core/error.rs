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

//! Error types for Veld
//!
//! Only compile-time failures surface as [`Error`]. Anything that goes wrong
//! while evaluating a row (bad coercion, arithmetic overflow, failed lookup)
//! is represented as an Error-kind [`crate::core::Value`] instead and flows
//! through the generator tree as data.

use thiserror::Error;

/// Result type alias for Veld operations
pub type Result<T> = std::result::Result<T, Error>;

/// Compile-time error raised while parsing or binding an expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Structurally invalid token sequence, unknown function, malformed
    /// literal. Carries the offending token text and its source position.
    #[error("parse error at '{token}' (position {position}): {message}")]
    Parse {
        message: String,
        token: String,
        position: usize,
    },

    /// Argument count outside the function's declared bounds
    #[error("function '{name}' expects between {min} and {max} arguments, got {got}")]
    Arity {
        name: String,
        min: usize,
        max: usize,
        got: usize,
    },

    /// Static validation of a bound argument failed, e.g. an invalid or
    /// empty regex literal, or an odd argument count for a pairwise function
    #[error("invalid argument for function '{name}': {message}")]
    InvalidArgument { name: String, message: String },
}

impl Error {
    /// Create a parse error for an offending token
    pub fn parse(message: impl Into<String>, token: impl Into<String>, position: usize) -> Self {
        Error::Parse {
            message: message.into(),
            token: token.into(),
            position,
        }
    }

    /// Create an arity error naming the function and both bounds
    pub fn arity(name: impl Into<String>, min: usize, max: usize, got: usize) -> Self {
        Error::Arity {
            name: name.into(),
            min,
            max,
            got,
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = Error::parse("unexpected comma", ",", 7);
        assert_eq!(
            err.to_string(),
            "parse error at ',' (position 7): unexpected comma"
        );
    }

    #[test]
    fn test_arity_error_display() {
        let err = Error::arity("substring", 3, 3, 2);
        assert_eq!(
            err.to_string(),
            "function 'substring' expects between 3 and 3 arguments, got 2"
        );
    }
}
