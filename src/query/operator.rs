// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// Filter operators understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    Contains,
    StartsWith,
    EndsWith,
    In,
}

impl Operator {
    /// Every operator, in the order a typed expression is matched
    /// against. Longer symbols come first so that `!=` is not read as
    /// a key ending in `!` followed by `=`, and `>=` is not read as `>`.
    pub const PARSE_ORDER: [Operator; 10] = [
        Operator::Neq,
        Operator::Gte,
        Operator::Lte,
        Operator::Eq,
        Operator::Gt,
        Operator::Lt,
        Operator::Contains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::In,
    ];

    /// Order in which `__<op>` suffixes are checked on a parameter key.
    pub(crate) const SUFFIX_ORDER: [Operator; 10] = [
        Operator::Neq,
        Operator::Lte,
        Operator::Gte,
        Operator::Lt,
        Operator::Gt,
        Operator::Contains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::In,
        Operator::Eq,
    ];

    /// Name as used on the wire and in `field__<name>` parameter keys.
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Lt => "lt",
            Operator::Gt => "gt",
            Operator::Lte => "lte",
            Operator::Gte => "gte",
            Operator::Contains => "contains",
            Operator::StartsWith => "startswith",
            Operator::EndsWith => "endswith",
            Operator::In => "in",
        }
    }

    /// The token typed in a free text expression.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Neq => "!=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Lte => "<=",
            Operator::Gte => ">=",
            Operator::Contains => "contains",
            Operator::StartsWith => "startswith",
            Operator::EndsWith => "endswith",
            Operator::In => "in",
        }
    }

    /// Human description shown next to the symbol in suggestions.
    pub fn description(&self) -> &'static str {
        match self {
            Operator::Eq => "equals",
            Operator::Neq => "not equals",
            Operator::Lt => "less than",
            Operator::Gt => "greater than",
            Operator::Lte => "less or equal",
            Operator::Gte => "greater or equal",
            Operator::Contains => "contains",
            Operator::StartsWith => "starts with",
            Operator::EndsWith => "ends with",
            Operator::In => "in list",
        }
    }

    /// Short label used by the structured filter editors.
    pub fn label(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Neq => "≠",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Lte => "<=",
            Operator::Gte => ">=",
            Operator::Contains => "contains",
            Operator::StartsWith => "starts with",
            Operator::EndsWith => "ends with",
            Operator::In => "in",
        }
    }

    /// Word operators must be surrounded by whitespace, otherwise a key
    /// such as `data.ping` would split on its `in`.
    pub fn is_word(&self) -> bool {
        matches!(
            self,
            Operator::Contains | Operator::StartsWith | Operator::EndsWith | Operator::In
        )
    }

    pub fn from_name(name: &str) -> Option<Operator> {
        Self::PARSE_ORDER
            .iter()
            .find(|op| op.name() == name)
            .copied()
    }

    /// Accepts either the wire name or the typed symbol.
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        Self::PARSE_ORDER
            .iter()
            .find(|op| op.symbol().eq_ignore_ascii_case(symbol) || op.name() == symbol)
            .copied()
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::str::FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s).ok_or_else(|| format!("unknown operator: {s}"))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_order_prefers_longer_symbols() {
        let position = |op: Operator| Operator::PARSE_ORDER.iter().position(|o| *o == op).unwrap();
        assert!(position(Operator::Neq) < position(Operator::Eq));
        assert!(position(Operator::Gte) < position(Operator::Gt));
        assert!(position(Operator::Gte) < position(Operator::Eq));
        assert!(position(Operator::Lte) < position(Operator::Lt));
        assert!(position(Operator::Eq) < position(Operator::Contains));
    }

    #[test]
    fn test_lookup() {
        assert_eq!(Operator::from_name("startswith"), Some(Operator::StartsWith));
        assert_eq!(Operator::from_name("="), None);
        assert_eq!("!=".parse::<Operator>(), Ok(Operator::Neq));
        assert_eq!("gte".parse::<Operator>(), Ok(Operator::Gte));
        assert_eq!("CONTAINS".parse::<Operator>(), Ok(Operator::Contains));
        assert!("~".parse::<Operator>().is_err());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Operator::EndsWith).unwrap(), "\"endswith\"");
        let op: Operator = serde_json::from_str("\"lte\"").unwrap();
        assert_eq!(op, Operator::Lte);
    }

    #[test]
    fn test_word_operators() {
        assert!(Operator::Contains.is_word());
        assert!(Operator::In.is_word());
        assert!(!Operator::Gte.is_word());
    }
}
