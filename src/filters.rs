// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! Filter models for the events page and the analytics pages.
//!
//! The events endpoint takes filters as flattened query parameters
//! (`field` or `field__op`), built from the chips of a [`QueryInput`].
//! Analytics requests take a structured list of [`AnalyticsFilter`]
//! edited through [`AnalyticsFilters`], which offers a smaller set of
//! operators and permits the same field more than once.

use crate::prelude::*;
use crate::query::{build_filter_key, parse_filter_key, InputEvent, QueryChip, QueryInput};
use crate::query::suggest::LabelCache;
use crate::types::{AnalyticsFilter, Label, Operator};

pub const DEFAULT_LIMIT: u32 = 100;

pub const LIMIT_CHOICES: [u32; 5] = [25, 50, 100, 250, 500];

/// Event query parameters that are not field filters.
pub const RESERVED_PARAMS: [&str; 5] = ["level", "limit", "offset", "from", "to"];

/// One `field op value` constraint of an event query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTerm {
    pub field: String,
    pub operator: Operator,
    pub value: String,
}

impl FilterTerm {
    pub fn new(field: &str, operator: Operator, value: &str) -> Self {
        Self {
            field: field.to_string(),
            operator,
            value: value.to_string(),
        }
    }

    pub fn param_key(&self) -> String {
        build_filter_key(&self.field, self.operator)
    }
}

impl From<&QueryChip> for FilterTerm {
    fn from(chip: &QueryChip) -> Self {
        Self::new(&chip.key, chip.operator, &chip.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub level: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: u32,
    pub offset: u32,
    pub filters: Vec<FilterTerm>,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            level: None,
            from: None,
            to: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
            filters: vec![],
        }
    }
}

impl EventQuery {
    /// The query string parameters, in order. Empty values are left out.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![];
        let mut push = |key: &str, value: &str| {
            if !value.is_empty() {
                params.push((key.to_string(), value.to_string()));
            }
        };
        push("level", self.level.as_deref().unwrap_or(""));
        push("from", self.from.as_deref().unwrap_or(""));
        push("to", self.to.as_deref().unwrap_or(""));
        push("limit", &self.limit.to_string());
        push("offset", &self.offset.to_string());
        for term in &self.filters {
            push(&term.param_key(), &term.value);
        }
        params
    }

    /// Rebuild a query from flattened parameters.
    pub fn from_params<'a, I>(params: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut query = Self::default();
        for (key, value) in params {
            if value.is_empty() {
                continue;
            }
            match key {
                "level" => query.level = Some(value.to_string()),
                "from" => query.from = Some(value.to_string()),
                "to" => query.to = Some(value.to_string()),
                "limit" => match value.parse() {
                    Ok(limit) => query.limit = limit,
                    Err(_) => warn!("Ignoring invalid limit: {}", value),
                },
                "offset" => match value.parse() {
                    Ok(offset) => query.offset = offset,
                    Err(_) => warn!("Ignoring invalid offset: {}", value),
                },
                _ => {
                    let (field, operator) = parse_filter_key(key);
                    query.set_filter(FilterTerm::new(&field, operator, value));
                }
            }
        }
        query
    }

    /// Add a filter, replacing one with the same parameter key.
    pub fn set_filter(&mut self, term: FilterTerm) {
        let key = term.param_key();
        if let Some(existing) = self.filters.iter_mut().find(|t| t.param_key() == key) {
            *existing = term;
        } else {
            self.filters.push(term);
        }
    }

    pub fn to_chips(&self) -> Vec<QueryChip> {
        self.filters
            .iter()
            .filter(|t| !t.value.is_empty() && !RESERVED_PARAMS.contains(&t.field.as_str()))
            .map(|t| QueryChip::new(&t.field, t.operator, &t.value))
            .collect()
    }

    /// A copy of this query with its filters replaced by the chips. The
    /// reserved parameters are kept.
    pub fn with_chips(&self, chips: &[QueryChip]) -> Self {
        let mut query = Self {
            filters: vec![],
            ..self.clone()
        };
        for chip in chips {
            query.set_filter(chip.into());
        }
        query
    }
}

/// The events page filter bar: the query input plus the level and limit
/// selectors.
#[derive(Debug, Default)]
pub struct EventFilters {
    query: EventQuery,
    pub input: QueryInput,
}

impl EventFilters {
    pub fn new(query: EventQuery) -> Self {
        let input = QueryInput::with_chips(query.to_chips());
        Self { query, input }
    }

    pub fn query(&self) -> &EventQuery {
        &self.query
    }

    /// Replace the query from outside, resetting the chips.
    pub fn set_query(&mut self, query: EventQuery) {
        self.input.set_chips(query.to_chips());
        self.query = query;
    }

    pub fn set_level(&mut self, level: Option<&str>) {
        self.query.level = level.filter(|l| !l.is_empty()).map(str::to_string);
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.query.limit = limit;
    }

    pub fn set_offset(&mut self, offset: u32) {
        self.query.offset = offset;
    }

    /// Feed an input event back into the query. Returns true if the
    /// filters changed.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        if let InputEvent::ChipsChanged = event {
            self.query = self.query.with_chips(self.input.chips());
            true
        } else {
            false
        }
    }

    /// The service the user filtered on, which scopes data key lookups.
    pub fn current_service(&self) -> Option<&str> {
        self.input.service()
    }
}

/// Fields offered by the structured filter editors, with their labels.
pub const ANALYTICS_FIELDS: [(&str, &str); 7] = [
    ("service", "Service"),
    ("env", "Environment"),
    ("name", "Event Name"),
    ("level", "Level"),
    ("user_id", "User ID"),
    ("trace_id", "Trace ID"),
    ("job_id", "Job ID"),
];

/// Operators offered by the structured filter editors.
pub const ANALYTICS_OPERATORS: [Operator; 6] = [
    Operator::Eq,
    Operator::Neq,
    Operator::Contains,
    Operator::StartsWith,
    Operator::EndsWith,
    Operator::In,
];

/// The filter being composed in a structured editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDraft {
    pub field: String,
    pub operator: Operator,
    pub value: String,
}

impl Default for FilterDraft {
    fn default() -> Self {
        Self {
            field: "service".to_string(),
            operator: Operator::Eq,
            value: String::new(),
        }
    }
}

impl FilterDraft {
    pub fn new(field: &str, operator: Operator, value: &str) -> Self {
        Self {
            field: field.to_string(),
            operator,
            value: value.to_string(),
        }
    }
}

/// Label values offered for a field in the structured editors. The
/// widget editor also completes event names.
pub fn value_suggestions<'a>(labels: &'a LabelCache, field: &str, with_names: bool) -> &'a [String] {
    let label = match field {
        "service" => Label::Service,
        "level" => Label::Level,
        "env" => Label::Env,
        "name" if with_names => Label::Name,
        _ => return &[],
    };
    labels.get(label.as_str()).unwrap_or(&[])
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticsFilters {
    filters: Vec<AnalyticsFilter>,
    pub draft: FilterDraft,
}

impl AnalyticsFilters {
    pub fn new(filters: Vec<AnalyticsFilter>) -> Self {
        Self {
            filters,
            draft: FilterDraft::default(),
        }
    }

    pub fn filters(&self) -> &[AnalyticsFilter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Set the draft operator; operators outside the editor's menu are
    /// refused.
    pub fn set_operator(&mut self, operator: Operator) -> bool {
        if ANALYTICS_OPERATORS.contains(&operator) {
            self.draft.operator = operator;
            true
        } else {
            false
        }
    }

    /// Add the draft as a filter. A draft with a blank value is ignored.
    /// Returns true if a filter was added.
    pub fn add(&mut self) -> bool {
        let value = self.draft.value.trim();
        if value.is_empty() {
            return false;
        }
        self.filters.push(AnalyticsFilter::new(
            &self.draft.field,
            self.draft.operator,
            value,
        ));
        self.draft = FilterDraft::default();
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<AnalyticsFilter> {
        if index < self.filters.len() {
            Some(self.filters.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;
    use crate::query::Key;

    #[test]
    fn test_params_skip_empty() {
        let query = EventQuery {
            level: Some("error".to_string()),
            from: Some(String::new()),
            filters: vec![
                FilterTerm::new("service", Operator::Eq, "users"),
                FilterTerm::new("name", Operator::Contains, "login"),
                FilterTerm::new("env", Operator::Eq, ""),
            ],
            ..Default::default()
        };
        let params = query.to_params();
        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["level", "limit", "offset", "service", "name__contains"]);
        assert_eq!(params[1].1, "100");
    }

    #[test]
    fn test_from_params() {
        let query = EventQuery::from_params(vec![
            ("level", "warn"),
            ("limit", "25"),
            ("offset", "bogus"),
            ("data.duration__gte", "100"),
            ("service", "users"),
            ("env", ""),
        ]);
        assert_eq!(query.level.as_deref(), Some("warn"));
        assert_eq!(query.limit, 25);
        assert_eq!(query.offset, 0);
        assert_eq!(
            query.filters,
            vec![
                FilterTerm::new("data.duration", Operator::Gte, "100"),
                FilterTerm::new("service", Operator::Eq, "users"),
            ]
        );
    }

    #[test]
    fn test_chips_round_trip_keeps_reserved() {
        let query = EventQuery {
            level: Some("error".to_string()),
            limit: 50,
            offset: 100,
            filters: vec![FilterTerm::new("service", Operator::Eq, "users")],
            ..Default::default()
        };
        let mut chips = query.to_chips();
        assert_eq!(chips, vec![QueryChip::new("service", Operator::Eq, "users")]);

        chips.push(QueryChip::new("data.count", Operator::Lt, "5"));
        let updated = query.with_chips(&chips);
        assert_eq!(updated.level.as_deref(), Some("error"));
        assert_eq!(updated.limit, 50);
        assert_eq!(updated.offset, 100);
        assert_eq!(updated.filters[1].param_key(), "data.count__lt");
    }

    #[test]
    fn test_event_filters_follow_chips() {
        let mut filters = EventFilters::new(EventQuery::from_params(vec![("service", "users")]));
        assert_eq!(filters.current_service(), Some("users"));

        filters.input.set_text("env = prod");
        filters.input.handle_key(Key::Escape);
        let event = filters.input.handle_key(Key::Enter);
        assert!(filters.handle(&event));
        assert_eq!(filters.query().filters.len(), 2);

        filters.input.handle_key(Key::Backspace);
        let event = filters.input.handle_key(Key::Backspace);
        assert!(filters.handle(&event));
        assert_eq!(
            filters.query().filters,
            vec![FilterTerm::new("service", Operator::Eq, "users")]
        );

        filters.set_level(Some(""));
        assert!(filters.query().level.is_none());

        filters.set_query(EventQuery::default());
        assert!(filters.input.chips().is_empty());
        assert_eq!(filters.current_service(), None);
    }

    #[test]
    fn test_analytics_filters_editor() {
        let mut editor = AnalyticsFilters::default();
        assert!(!editor.add());

        editor.draft.value = "  users ".to_string();
        assert!(editor.add());
        assert_eq!(editor.filters()[0], AnalyticsFilter::new("service", Operator::Eq, "users"));
        assert_eq!(editor.draft, FilterDraft::default());

        // Duplicate fields are fine here.
        editor.draft.value = "billing".to_string();
        assert!(editor.set_operator(Operator::Neq));
        assert!(!editor.set_operator(Operator::Gte));
        assert!(editor.add());
        assert_eq!(editor.filters().len(), 2);
        assert_eq!(editor.filters()[1].operator, Operator::Neq);

        assert_eq!(editor.remove(0).unwrap().value, "users");
        assert!(editor.remove(5).is_none());
        assert_eq!(editor.filters().len(), 1);
    }

    #[test]
    fn test_value_suggestions() {
        let mut values = HashMap::new();
        values.insert(Label::Name, vec!["login".to_string()]);
        values.insert(Label::Level, vec!["error".to_string()]);
        let labels = LabelCache::new(values);
        assert_eq!(value_suggestions(&labels, "level", false), &["error".to_string()]);
        assert!(value_suggestions(&labels, "name", false).is_empty());
        assert_eq!(value_suggestions(&labels, "name", true), &["login".to_string()]);
        assert!(value_suggestions(&labels, "trace_id", true).is_empty());
    }
}
