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

//! Lexer for the expression language
//!
//! Splits an expression string into [`Token`]s. String literals use single
//! quotes with `\'` and `\\` escapes; field references are `${name}`;
//! everything else is numbers, identifiers and operator characters.
//! Whitespace separates tokens and is dropped.

use crate::core::{Error, Result};
use crate::parser::token::{Token, TokenType};

/// Tokenize an expression string
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => {
                i += 1;
            }
            '\'' => {
                let (token, next) = lex_string(&chars, i)?;
                tokens.push(token);
                i = next;
            }
            '$' if chars.get(i + 1) == Some(&'{') => {
                let (token, next) = lex_field(&chars, i)?;
                tokens.push(token);
                i = next;
            }
            c if c.is_ascii_digit() => {
                let (token, next) = lex_number(&chars, i);
                tokens.push(token);
                i = next;
            }
            c if c.is_alphabetic() || c == '_' => {
                let (token, next) = lex_word(&chars, i);
                tokens.push(token);
                i = next;
            }
            _ => {
                let (token, next) = lex_operator(&chars, i)?;
                tokens.push(token);
                i = next;
            }
        }
    }

    Ok(tokens)
}

fn lex_string(chars: &[char], start: usize) -> Result<(Token, usize)> {
    let mut text = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' if matches!(chars.get(i + 1), Some('\'') | Some('\\')) => {
                text.push(chars[i + 1]);
                i += 2;
            }
            '\'' => {
                return Ok((Token::new(TokenType::String, text, start), i + 1));
            }
            c => {
                text.push(c);
                i += 1;
            }
        }
    }
    Err(Error::parse("unterminated string literal", "'", start))
}

fn lex_field(chars: &[char], start: usize) -> Result<(Token, usize)> {
    let mut name = String::new();
    let mut i = start + 2;
    while i < chars.len() {
        match chars[i] {
            '}' => {
                if name.is_empty() {
                    return Err(Error::parse("empty field reference", "${}", start));
                }
                return Ok((Token::new(TokenType::Field, name, start), i + 1));
            }
            c => {
                name.push(c);
                i += 1;
            }
        }
    }
    Err(Error::parse("unterminated field reference", "${", start))
}

fn lex_number(chars: &[char], start: usize) -> (Token, usize) {
    let mut i = start;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    // Fractional part; a bare trailing dot is not consumed
    if chars.get(i) == Some(&'.') && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    // Exponent
    if matches!(chars.get(i), Some('e') | Some('E')) {
        let mut j = i + 1;
        if matches!(chars.get(j), Some('+') | Some('-')) {
            j += 1;
        }
        if chars.get(j).is_some_and(|c| c.is_ascii_digit()) {
            i = j;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
        }
    }
    let text: String = chars[start..i].iter().collect();
    (Token::new(TokenType::Number, text, start), i)
}

fn lex_word(chars: &[char], start: usize) -> (Token, usize) {
    let mut i = start;
    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
        i += 1;
    }
    let text: String = chars[start..i].iter().collect();
    (Token::new(TokenType::Word, text, start), i)
}

fn lex_operator(chars: &[char], start: usize) -> Result<(Token, usize)> {
    let c = chars[start];
    let next = chars.get(start + 1).copied();

    let (token_type, len) = match (c, next) {
        ('>', Some('=')) => (TokenType::GreaterThanOrEqualTo, 2),
        ('<', Some('=')) => (TokenType::LessThanOrEqualTo, 2),
        ('!', Some('=')) => (TokenType::NotEquals, 2),
        ('>', _) => (TokenType::GreaterThan, 1),
        ('<', _) => (TokenType::LessThan, 1),
        ('=', _) => (TokenType::Equals, 1),
        ('+', _) => (TokenType::Plus, 1),
        ('-', _) => (TokenType::Minus, 1),
        ('*', _) => (TokenType::Multiplication, 1),
        ('/', _) => (TokenType::Division, 1),
        ('%', _) => (TokenType::Modulus, 1),
        ('^', _) => (TokenType::Order, 1),
        ('(', _) => (TokenType::OpenBracket, 1),
        (')', _) => (TokenType::CloseBracket, 1),
        (',', _) => (TokenType::Comma, 1),
        _ => {
            return Err(Error::parse(
                "unexpected character",
                c.to_string(),
                start,
            ));
        }
    };

    let text: String = chars[start..start + len].iter().collect();
    Ok((Token::new(token_type, text, start), start + len))
}
