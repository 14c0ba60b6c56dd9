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

//! Expression parser
//!
//! Resolves a grouped token tree into a [`Expression`] in five passes:
//!
//! 1. bracketed groups resolve bottom-up into function calls
//! 2. argument lists split on commas
//! 3. equality operators split their operand lists, scanning operator
//!    types in a fixed order
//! 4. unary `+`/`-` fold into their operand (negating literals in place)
//! 5. remaining arithmetic reduces operand/operator/operand triples,
//!    tightest-binding operator type first, leftmost occurrence first
//!
//! Every error cites the offending token and its position in the source.

use crate::core::{Error, FieldIndex, Result, Value};
use crate::expr::param::{FieldRef, Param};
use crate::expr::{Expression, ExpressionContext};
use crate::functions::global_registry;
use crate::parser::lexer::tokenize;
use crate::parser::structure::build;
use crate::parser::token::{Node, Token, TokenType, BODMAS_TYPES, EQUALITY_TYPES};

/// Parser for expression strings
#[derive(Default)]
pub struct ExpressionParser;

/// A partially resolved element of an operand list
enum Item {
    /// An operator or unconverted leaf token
    Token(Token),
    /// A resolved parameter
    Param(Param),
}

impl ExpressionParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse an expression string; blank input yields `None`
    pub fn parse(
        &self,
        ctx: &ExpressionContext,
        fields: &FieldIndex,
        input: &str,
    ) -> Result<Option<Expression>> {
        log::trace!("parse() - {input}");

        if input.trim().is_empty() {
            return Ok(None);
        }
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Ok(None);
        }
        let nodes = build(tokens)?;
        let items = process_nodes(ctx, fields, nodes)?;
        if items.is_empty() {
            return Ok(None);
        }

        // Stray commas cannot appear outside an argument list
        for item in &items {
            if let Item::Token(token) = item {
                if token.token_type == TokenType::Comma {
                    return Err(token_err("unexpected token found", token));
                }
            }
        }

        let root = get_param(ctx, fields, items)?;
        Ok(Some(Expression::new(root)))
    }
}

/// Resolve groups into functions, leaving plain tokens in place
fn process_nodes(
    ctx: &ExpressionContext,
    fields: &FieldIndex,
    nodes: Vec<Node>,
) -> Result<Vec<Item>> {
    let mut items = Vec::with_capacity(nodes.len());
    for node in nodes {
        items.push(match node {
            Node::FunctionGroup { token, children } => {
                let name = token.text.clone();
                Item::Param(resolve_function(ctx, fields, &token, &name, children)?)
            }
            Node::KeywordGroup {
                token,
                keyword,
                children,
            } => Item::Param(resolve_function(ctx, fields, &token, keyword.name(), children)?),
            Node::TokenGroup { token, children } => {
                Item::Param(resolve_function(ctx, fields, &token, "brackets", children)?)
            }
            Node::Token(token) => Item::Token(token),
        });
    }
    Ok(items)
}

/// Create a function by name and feed it its comma-separated arguments
fn resolve_function(
    ctx: &ExpressionContext,
    fields: &FieldIndex,
    token: &Token,
    name: &str,
    children: Vec<Node>,
) -> Result<Param> {
    log::trace!("resolve_function() - {name}");

    let Some(mut function) = global_registry().create(ctx, name) else {
        return Err(token_err(&format!("unknown function '{name}'"), token));
    };
    let params = get_params(ctx, fields, children)?;
    function
        .set_params(params)
        .map_err(|e| token_err(&e.to_string(), token))?;
    Ok(Param::Function(function))
}

/// Split an argument list on top-level commas
fn get_params(
    ctx: &ExpressionContext,
    fields: &FieldIndex,
    children: Vec<Node>,
) -> Result<Vec<Param>> {
    let mut params = Vec::new();
    let mut pending: Vec<Item> = Vec::new();
    let mut last_comma: Option<Token> = None;

    for node in children {
        if let Node::Token(token) = &node {
            if token.token_type == TokenType::Comma {
                if pending.is_empty() {
                    return Err(token_err("unexpected comma", token));
                }
                params.push(get_param(ctx, fields, std::mem::take(&mut pending))?);
                last_comma = Some(token.clone());
                continue;
            }
        }
        pending.extend(process_nodes(ctx, fields, vec![node])?);
        last_comma = None;
    }

    if let Some(token) = last_comma {
        return Err(token_err("unexpected trailing comma", &token));
    }
    if !pending.is_empty() {
        params.push(get_param(ctx, fields, pending)?);
    }
    Ok(params)
}

/// Resolve one operand list into a single parameter
fn get_param(ctx: &ExpressionContext, fields: &FieldIndex, items: Vec<Item>) -> Result<Param> {
    if items.len() == 1 {
        let mut items = items;
        return convert_item(ctx, fields, items.remove(0));
    }
    apply_equality(ctx, fields, items)
}

/// Operator types are scanned in a fixed order; the first type present
/// anywhere wins, then its leftmost occurrence splits the list
fn find_operator(items: &[Item], types: &[TokenType]) -> Option<usize> {
    for ty in types {
        for (i, item) in items.iter().enumerate() {
            if let Item::Token(token) = item {
                if token.token_type == *ty {
                    return Some(i);
                }
            }
        }
    }
    None
}

fn apply_equality(
    ctx: &ExpressionContext,
    fields: &FieldIndex,
    mut items: Vec<Item>,
) -> Result<Param> {
    log::trace!("apply_equality() - {} items", items.len());

    let Some(index) = find_operator(&items, &EQUALITY_TYPES) else {
        return apply_bodmas(ctx, fields, items);
    };

    let Item::Token(token) = &items[index] else {
        unreachable!()
    };
    if index == items.len() - 1 {
        return Err(token_err("unexpected trailing equality", token));
    }
    if index == 0 {
        return Err(token_err("no parameter before equality", token));
    }

    let right: Vec<Item> = items.split_off(index + 1);
    let Some(Item::Token(token)) = items.pop() else {
        unreachable!()
    };
    let left = items;

    let left_param = apply_equality(ctx, fields, left)?;
    let right_param = apply_equality(ctx, fields, right)?;
    make_operator(ctx, &token, left_param, right_param)
}

fn apply_bodmas(
    ctx: &ExpressionContext,
    fields: &FieldIndex,
    items: Vec<Item>,
) -> Result<Param> {
    log::trace!("apply_bodmas() - {} items", items.len());

    let mut items = apply_signs(ctx, fields, items)?;

    // Reduce operand/operator/operand triples until no operators remain;
    // the leftmost occurrence of the tightest-binding type goes first
    while let Some(index) = find_operator(&items, &BODMAS_TYPES) {
        let Item::Token(token) = &items[index] else {
            unreachable!()
        };
        if index == 0 {
            return Err(token_err("unexpected leading operator", token));
        }
        if index == items.len() - 1 {
            return Err(token_err("unexpected trailing operator", token));
        }

        // Convert left before right so field positions are assigned in
        // source order
        let left = convert_item(ctx, fields, items.remove(index - 1))?;
        let Item::Token(token) = items.remove(index - 1) else {
            unreachable!()
        };
        let right = convert_item(ctx, fields, items.remove(index - 1))?;
        let function = make_operator(ctx, &token, left, right)?;
        items.insert(index - 1, Item::Param(function));
    }

    match items.len() {
        0 => Err(Error::parse("empty expression", "", 0)),
        1 => {
            let mut items = items;
            convert_item(ctx, fields, items.remove(0))
        }
        _ => Err(match &items[1] {
            Item::Token(token) => token_err("unexpected token without joining operator", token),
            Item::Param(param) => Error::parse(
                "unexpected token without joining operator",
                param.to_string(),
                0,
            ),
        }),
    }
}

/// Fold unary `+`/`-` into the operand that follows
fn apply_signs(
    ctx: &ExpressionContext,
    fields: &FieldIndex,
    mut items: Vec<Item>,
) -> Result<Vec<Item>> {
    loop {
        let mut found: Option<usize> = None;
        for i in 1..items.len() {
            if is_bodmas_token(&items[i]) {
                continue;
            }
            let Item::Token(prev) = &items[i - 1] else {
                continue;
            };
            if prev.token_type != TokenType::Plus && prev.token_type != TokenType::Minus {
                continue;
            }
            // A sign is unary when nothing or another operator precedes it
            let unary = i == 1 || is_bodmas_token(&items[i - 2]);
            if unary {
                found = Some(i);
                break;
            }
        }

        let Some(i) = found else {
            return Ok(items);
        };
        let operand = items.remove(i);
        let Item::Token(sign) = items.remove(i - 1) else {
            unreachable!()
        };
        let param = convert_item(ctx, fields, operand)?;
        let param = if sign.token_type == TokenType::Minus {
            negate_param(ctx, &sign, param)?
        } else {
            param
        };
        items.insert(i - 1, Item::Param(param));
    }
}

/// Negate a parameter: numeric literals in place, everything else through
/// the `negate` function
fn negate_param(ctx: &ExpressionContext, sign: &Token, param: Param) -> Result<Param> {
    if let Param::Value(value) = param {
        let negated = match value {
            Value::Byte(v) => Value::Byte(-v),
            Value::Short(v) => Value::Short(-v),
            Value::Integer(v) => Value::Integer(-v),
            Value::Long(v) => Value::Long(-v),
            Value::Float(v) => Value::Float(-v),
            Value::Double(v) => Value::Double(-v),
            Value::Duration(ms) => Value::Duration(-ms),
            other => {
                return Err(token_err(
                    &format!("illegal negation of {} value", other.kind()),
                    sign,
                ))
            }
        };
        return Ok(Param::Value(negated));
    }

    let Some(mut negate) = global_registry().create(ctx, "negate") else {
        return Err(token_err("unknown function 'negate'", sign));
    };
    negate
        .set_params(vec![param])
        .map_err(|e| token_err(&e.to_string(), sign))?;
    Ok(Param::Function(negate))
}

/// Build the binary function behind an operator token
fn make_operator(
    ctx: &ExpressionContext,
    token: &Token,
    left: Param,
    right: Param,
) -> Result<Param> {
    let symbol = token.to_string();
    let Some(mut function) = global_registry().create(ctx, &symbol) else {
        return Err(token_err(&format!("unknown function '{symbol}'"), token));
    };
    function
        .set_params(vec![left, right])
        .map_err(|e| token_err(&e.to_string(), token))?;
    Ok(Param::Function(function))
}

/// Convert a leaf into a parameter
fn convert_item(_ctx: &ExpressionContext, fields: &FieldIndex, item: Item) -> Result<Param> {
    match item {
        Item::Param(param) => Ok(param),
        Item::Token(token) => match token.token_type {
            TokenType::Number => parse_number(&token),
            TokenType::String => Ok(Param::Value(Value::string(token.text))),
            TokenType::Field => {
                let pos = fields.create(&token.text);
                Ok(Param::Field(FieldRef::new(token.text, pos)))
            }
            TokenType::Word => {
                if token.text.eq_ignore_ascii_case("true") {
                    Ok(Param::Value(Value::Boolean(true)))
                } else if token.text.eq_ignore_ascii_case("false") {
                    Ok(Param::Value(Value::Boolean(false)))
                } else {
                    Err(token_err("unexpected token", &token))
                }
            }
            _ => Err(token_err("unexpected token", &token)),
        },
    }
}

/// Integer literals stay Long; anything with a fraction or exponent
/// becomes Double
fn parse_number(token: &Token) -> Result<Param> {
    if let Ok(l) = token.text.parse::<i64>() {
        return Ok(Param::Value(Value::Long(l)));
    }
    match token.text.parse::<f64>() {
        Ok(d) if d.is_finite() => Ok(Param::Value(Value::Double(d))),
        _ => Err(token_err("unable to parse number", token)),
    }
}

fn is_bodmas_token(item: &Item) -> bool {
    matches!(item, Item::Token(token) if token.token_type.is_bodmas())
}

fn token_err(message: &str, token: &Token) -> Error {
    Error::parse(message, token.to_string(), token.position)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Option<Expression>> {
        let ctx = ExpressionContext::new();
        let fields = FieldIndex::new();
        ExpressionParser::new().parse(&ctx, &fields, input)
    }

    fn eval(input: &str) -> Value {
        let expression = parse(input).unwrap().unwrap();
        let storage = expression.create_storage();
        expression.make_generator().evaluate(&storage, None)
    }

    #[test]
    fn test_blank_input_is_none() {
        assert!(parse("").unwrap().is_none());
        assert!(parse("   ").unwrap().is_none());
    }

    #[test]
    fn test_literals() {
        assert_eq!(eval("42"), Value::Long(42));
        assert_eq!(eval("3.5"), Value::Double(3.5));
        assert_eq!(eval("'hello'"), Value::string("hello"));
        assert_eq!(eval("true"), Value::Boolean(true));
    }

    #[test]
    fn test_operator_precedence() {
        assert_eq!(eval("2+3*4"), Value::Double(14.0));
        assert_eq!(eval("(2+3)*4"), Value::Double(20.0));
        assert_eq!(eval("8%3"), Value::Double(2.0));
        assert_eq!(eval("2^10"), Value::Double(1024.0));
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(eval("1-2-3"), Value::Double(-4.0));
        assert_eq!(eval("16/4/2"), Value::Double(2.0));
    }

    #[test]
    fn test_unary_signs() {
        assert_eq!(eval("-3+5"), Value::Double(2.0));
        assert_eq!(eval("1+-2"), Value::Double(-1.0));
        assert_eq!(eval("--2"), Value::Long(2));
        assert_eq!(eval("+5"), Value::Long(5));
        assert_eq!(eval("-(2+3)"), Value::Double(-5.0));
    }

    #[test]
    fn test_equality_operators() {
        assert_eq!(eval("1<2"), Value::Boolean(true));
        assert_eq!(eval("1>=2"), Value::Boolean(false));
        assert_eq!(eval("1+1=2"), Value::Boolean(true));
        assert_eq!(eval("'abc'!='def'"), Value::Boolean(true));
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(eval("upperCase('abc')"), Value::string("ABC"));
        assert_eq!(eval("concat('a', 'b', 'c')"), Value::string("abc"));
        assert_eq!(eval("if(1<2, 'yes', 'no')"), Value::string("yes"));
        assert_eq!(eval("not(true())"), Value::Boolean(false));
    }

    #[test]
    fn test_nested_arithmetic_in_call() {
        assert_eq!(eval("substring('Hello', 0, 1+1)"), Value::string("He"));
    }

    #[test]
    fn test_error_positions_cited() {
        let err = parse("1 + + ").unwrap_err();
        match err {
            Error::Parse { position, .. } => assert!(position > 0),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_function() {
        let err = parse("noSuchThing(1)").unwrap_err();
        assert!(err.to_string().contains("unknown function"));
    }

    #[test]
    fn test_comma_errors() {
        assert!(parse("concat(,'a')").is_err());
        assert!(parse("concat('a',,'b')").is_err());
        assert!(parse("concat('a','b',)").is_err());
    }

    #[test]
    fn test_trailing_operator() {
        let err = parse("1+").unwrap_err();
        assert!(err.to_string().contains("trailing operator"));
    }

    #[test]
    fn test_no_parameter_before_equality() {
        let err = parse("=1").unwrap_err();
        assert!(err.to_string().contains("no parameter before equality"));
    }

    #[test]
    fn test_stray_comma_at_top_level() {
        assert!(parse("1,2").is_err());
    }

    #[test]
    fn test_arity_error_carries_function_text() {
        let err = parse("stringLength('a', 'b')").unwrap_err();
        assert!(err.to_string().contains("stringLength"));
    }

    #[test]
    fn test_display_round_trip() {
        let expression = parse("sum(${val})+count()").unwrap().unwrap();
        assert_eq!(expression.to_string(), "sum(${val})+count()");
    }

    #[test]
    fn test_field_positions_assigned() {
        let ctx = ExpressionContext::new();
        let fields = FieldIndex::new();
        let parser = ExpressionParser::new();
        parser.parse(&ctx, &fields, "${b}+${a}").unwrap().unwrap();
        assert_eq!(fields.get("b"), Some(0));
        assert_eq!(fields.get("a"), Some(1));
        // Re-parsing reuses positions
        parser.parse(&ctx, &fields, "${a}").unwrap().unwrap();
        assert_eq!(fields.get("a"), Some(1));
    }

    #[test]
    fn test_keyword_groups() {
        assert_eq!(eval("and(1<2, 2<3)"), Value::Boolean(true));
        assert_eq!(eval("or(1>2, 2>3)"), Value::Boolean(false));
        assert_eq!(eval("not(1>2)"), Value::Boolean(true));
    }

    #[test]
    fn test_static_fold_of_literal_tree() {
        let expression = parse("1+2*3").unwrap().unwrap();
        // No slots are needed for a constant expression
        assert_eq!(expression.slot_count(), 0);
    }
}
