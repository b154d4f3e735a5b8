// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! Free text filter expressions (`field op value`) and the flattened
//! `field__op` parameter keys the events endpoint takes.

use regex::Regex;

use super::operator::Operator;

lazy_static! {
    static ref PATTERNS: Vec<(Operator, Regex)> = Operator::PARSE_ORDER
        .iter()
        .map(|op| {
            let symbol = regex::escape(op.symbol());
            let pattern = if op.is_word() {
                format!(r"(?i)^(.+?)\s+{symbol}\s+(.*)$")
            } else {
                format!(r"^(.+?)\s*{symbol}\s*(.*)$")
            };
            (*op, Regex::new(&pattern).unwrap())
        })
        .collect();
}

/// A complete `field op value` expression. The value may be empty while
/// the user is still typing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub key: String,
    pub operator: Operator,
    pub value: String,
}

/// Parse a free text expression.
///
/// Operators are tried in priority order and the first one whose pattern
/// matches wins. Only leading whitespace is dropped before matching, so a
/// word operator followed by the space the user typed after it
/// (`name contains `) already parses with an empty value.
///
/// Returns `None` if no operator is present, in which case the input is
/// still a field name candidate.
pub fn parse_input(input: &str) -> Option<Expression> {
    let input = input.trim_start();
    for (operator, pattern) in PATTERNS.iter() {
        if let Some(c) = pattern.captures(input) {
            let key = c.get(1).map_or("", |m| m.as_str()).trim();
            let value = c.get(2).map_or("", |m| m.as_str()).trim();
            if key.is_empty() {
                continue;
            }
            return Some(Expression {
                key: key.to_string(),
                operator: *operator,
                value: value.to_string(),
            });
        }
    }
    None
}

/// The text form of an expression, as put back into the input box when a
/// chip is edited.
pub fn format_expression(key: &str, operator: Operator, value: &str) -> String {
    format!("{} {} {}", key, operator.symbol(), value)
}

/// Build the query parameter key for a field and operator. Equality is
/// the bare field name.
pub fn build_filter_key(field: &str, operator: Operator) -> String {
    if operator == Operator::Eq {
        field.to_string()
    } else {
        format!("{}__{}", field, operator.name())
    }
}

/// Split a query parameter key into field and operator.
pub fn parse_filter_key(key: &str) -> (String, Operator) {
    for op in Operator::SUFFIX_ORDER {
        let suffix = format!("__{}", op.name());
        if let Some(field) = key.strip_suffix(&suffix) {
            if !field.is_empty() {
                return (field.to_string(), op);
            }
        }
    }
    (key.to_string(), Operator::Eq)
}
