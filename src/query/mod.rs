// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

pub mod input;
pub mod operator;
pub mod parser;
pub mod suggest;

pub use input::{ChipSelection, InputEvent, Key, QueryInput};
pub use operator::Operator;
pub use parser::{build_filter_key, format_expression, parse_filter_key, parse_input, Expression};
pub use suggest::{Suggestion, SuggestionKind};

/// A finalized filter term in the query input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryChip {
    pub key: String,
    pub operator: Operator,
    pub value: String,
    pub display_key: String,
}

impl QueryChip {
    pub fn new(key: &str, operator: Operator, value: &str) -> Self {
        Self {
            key: key.to_string(),
            operator,
            value: value.to_string(),
            display_key: key.to_string(),
        }
    }

    /// The text put back into the input box when the chip is edited.
    pub fn to_expression(&self) -> String {
        format_expression(&self.display_key, self.operator, &self.value)
    }
}

impl From<Expression> for QueryChip {
    fn from(expr: Expression) -> Self {
        Self {
            display_key: expr.key.clone(),
            key: expr.key,
            operator: expr.operator,
            value: expr.value,
        }
    }
}

impl std::fmt::Display for QueryChip {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {} {}", self.display_key, self.operator.symbol(), self.value)
    }
}
