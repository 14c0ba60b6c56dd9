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

//! Expression parsing pipeline
//!
//! - [`lexer`] - source text to tokens
//! - [`structure`] - tokens to a bracket-grouped node tree
//! - [`parser`] - node tree to a compiled [`Expression`]
//!
//! [`Expression`]: crate::expr::Expression

pub mod lexer;
pub mod parser;
pub mod structure;
pub mod token;

pub use parser::ExpressionParser;
pub use token::{Keyword, Node, Token, TokenType};
