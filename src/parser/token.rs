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

//! Token and node types for the expression grammar

use std::fmt;

/// Lexical token classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Comma,
    /// `^`
    Order,
    /// `/`
    Division,
    /// `*`
    Multiplication,
    /// `%`
    Modulus,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `=`
    Equals,
    /// `!=`
    NotEquals,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqualTo,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqualTo,
    /// `(`
    OpenBracket,
    /// `)`
    CloseBracket,
    /// Single-quoted string literal (text is unescaped)
    String,
    /// Numeric literal
    Number,
    /// `${name}` field reference (text is the bare name)
    Field,
    /// Bare identifier
    Word,
}

/// Arithmetic operator types, in binding order (tightest first)
pub const BODMAS_TYPES: [TokenType; 6] = [
    TokenType::Order,
    TokenType::Division,
    TokenType::Multiplication,
    TokenType::Modulus,
    TokenType::Plus,
    TokenType::Minus,
];

/// Equality operator types, in resolution order
pub const EQUALITY_TYPES: [TokenType; 6] = [
    TokenType::Equals,
    TokenType::NotEquals,
    TokenType::GreaterThan,
    TokenType::GreaterThanOrEqualTo,
    TokenType::LessThan,
    TokenType::LessThanOrEqualTo,
];

impl TokenType {
    /// The source text of an operator type
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            TokenType::Comma => Some(","),
            TokenType::Order => Some("^"),
            TokenType::Division => Some("/"),
            TokenType::Multiplication => Some("*"),
            TokenType::Modulus => Some("%"),
            TokenType::Plus => Some("+"),
            TokenType::Minus => Some("-"),
            TokenType::Equals => Some("="),
            TokenType::NotEquals => Some("!="),
            TokenType::GreaterThan => Some(">"),
            TokenType::GreaterThanOrEqualTo => Some(">="),
            TokenType::LessThan => Some("<"),
            TokenType::LessThanOrEqualTo => Some("<="),
            TokenType::OpenBracket => Some("("),
            TokenType::CloseBracket => Some(")"),
            _ => None,
        }
    }

    /// Whether this type is a binary arithmetic operator
    pub fn is_bodmas(&self) -> bool {
        BODMAS_TYPES.contains(self)
    }
}

/// One lexical token with its position in the source string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    pub text: String,
    /// Byte offset of the token's first character in the source
    pub position: usize,
}

impl Token {
    pub fn new(token_type: TokenType, text: impl Into<String>, position: usize) -> Self {
        Self {
            token_type,
            text: text.into(),
            position,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token_type.symbol() {
            Some(symbol) => f.write_str(symbol),
            None => f.write_str(&self.text),
        }
    }
}

/// Logical keywords that take bracketed argument lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Not,
    And,
    Or,
}

impl Keyword {
    pub fn parse(word: &str) -> Option<Keyword> {
        match word.to_lowercase().as_str() {
            "not" => Some(Keyword::Not),
            "and" => Some(Keyword::And),
            "or" => Some(Keyword::Or),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Keyword::Not => "not",
            Keyword::And => "and",
            Keyword::Or => "or",
        }
    }
}

/// Node of the grouped token tree the structure builder produces
#[derive(Debug, Clone)]
pub enum Node {
    /// A plain token
    Token(Token),
    /// `name(...)` - a named call; `token` is the name word
    FunctionGroup { token: Token, children: Vec<Node> },
    /// `(...)` - a bare bracket group; `token` is the opening bracket
    TokenGroup { token: Token, children: Vec<Node> },
    /// `not(...)`, `and(...)`, `or(...)`
    KeywordGroup {
        token: Token,
        keyword: Keyword,
        children: Vec<Node>,
    },
}

impl Node {
    /// The token to cite in error messages for this node
    pub fn token(&self) -> &Token {
        match self {
            Node::Token(t) => t,
            Node::FunctionGroup { token, .. } => token,
            Node::TokenGroup { token, .. } => token,
            Node::KeywordGroup { token, .. } => token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_symbols() {
        assert_eq!(TokenType::NotEquals.symbol(), Some("!="));
        assert_eq!(TokenType::Order.symbol(), Some("^"));
        assert_eq!(TokenType::Word.symbol(), None);
    }

    #[test]
    fn test_bodmas_membership() {
        assert!(TokenType::Plus.is_bodmas());
        assert!(TokenType::Order.is_bodmas());
        assert!(!TokenType::Equals.is_bodmas());
        assert!(!TokenType::Comma.is_bodmas());
    }

    #[test]
    fn test_keyword_parse() {
        assert_eq!(Keyword::parse("NOT"), Some(Keyword::Not));
        assert_eq!(Keyword::parse("And"), Some(Keyword::And));
        assert_eq!(Keyword::parse("xor"), None);
    }
}
