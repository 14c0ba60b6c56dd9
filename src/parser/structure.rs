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

//! Structure builder - groups a flat token stream into a bracket tree
//!
//! A word immediately followed by `(` becomes a [`Node::FunctionGroup`]
//! (or a [`Node::KeywordGroup`] for `not`/`and`/`or`); a bare `(` becomes a
//! [`Node::TokenGroup`]. Brackets must balance.

use std::iter::Peekable;
use std::vec::IntoIter;

use crate::core::{Error, Result};
use crate::parser::token::{Keyword, Node, Token, TokenType};

/// Group a token stream into a tree of bracketed nodes
pub fn build(tokens: Vec<Token>) -> Result<Vec<Node>> {
    let mut iter = tokens.into_iter().peekable();
    build_children(&mut iter, None)
}

fn build_children(
    iter: &mut Peekable<IntoIter<Token>>,
    open: Option<&Token>,
) -> Result<Vec<Node>> {
    let mut nodes = Vec::new();

    while let Some(token) = iter.next() {
        match token.token_type {
            TokenType::Word => {
                if iter
                    .peek()
                    .is_some_and(|next| next.token_type == TokenType::OpenBracket)
                {
                    // Consume the bracket and recurse for the argument list
                    let bracket = iter.next();
                    debug_assert!(bracket.is_some());
                    let children = build_children(iter, Some(&token))?;
                    nodes.push(match Keyword::parse(&token.text) {
                        Some(keyword) => Node::KeywordGroup {
                            token,
                            keyword,
                            children,
                        },
                        None => Node::FunctionGroup { token, children },
                    });
                } else {
                    nodes.push(Node::Token(token));
                }
            }
            TokenType::OpenBracket => {
                let children = build_children(iter, Some(&token))?;
                nodes.push(Node::TokenGroup { token, children });
            }
            TokenType::CloseBracket => {
                if open.is_some() {
                    return Ok(nodes);
                }
                return Err(Error::parse(
                    "unmatched closing bracket",
                    token.text,
                    token.position,
                ));
            }
            _ => nodes.push(Node::Token(token)),
        }
    }

    match open {
        Some(token) => Err(Error::parse(
            "unclosed bracket",
            token.text.clone(),
            token.position,
        )),
        None => Ok(nodes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    fn parse(input: &str) -> Result<Vec<Node>> {
        build(tokenize(input)?)
    }

    #[test]
    fn test_function_group() {
        let nodes = parse("sum(${a})").unwrap();
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            Node::FunctionGroup { token, children } => {
                assert_eq!(token.text, "sum");
                assert_eq!(children.len(), 1);
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn test_token_group() {
        let nodes = parse("(1+2)*3").unwrap();
        assert_eq!(nodes.len(), 3);
        assert!(matches!(nodes[0], Node::TokenGroup { .. }));
        assert!(matches!(nodes[1], Node::Token(_)));
    }

    #[test]
    fn test_keyword_group() {
        let nodes = parse("not(true())").unwrap();
        match &nodes[0] {
            Node::KeywordGroup { keyword, .. } => assert_eq!(*keyword, Keyword::Not),
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn test_bare_word_stays_token() {
        let nodes = parse("true").unwrap();
        assert!(matches!(&nodes[0], Node::Token(t) if t.text == "true"));
    }

    #[test]
    fn test_nested_groups() {
        let nodes = parse("max(sum(${a}), (1+2))").unwrap();
        match &nodes[0] {
            Node::FunctionGroup { children, .. } => {
                assert!(matches!(children[0], Node::FunctionGroup { .. }));
                assert!(matches!(children[1], Node::Token(_))); // comma
                assert!(matches!(children[2], Node::TokenGroup { .. }));
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn test_unclosed_bracket() {
        let err = parse("sum(${a}").unwrap_err();
        assert!(err.to_string().contains("unclosed bracket"));
    }

    #[test]
    fn test_unmatched_close() {
        let err = parse("1+2)").unwrap_err();
        assert!(err.to_string().contains("unmatched closing bracket"));
    }
}
