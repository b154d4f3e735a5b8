// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! Autocomplete for the query input.
//!
//! Suggestions move through three stages driven by the parse state of
//! the text: field names, then operators once a known field is followed
//! by a space, then values once an operator is present. Values for the
//! labels are answered from a cache loaded once; values for `data.*`
//! keys are looked up remotely with a debounce.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::operator::Operator;
use super::parser::{parse_input, Expression};
use crate::client::Backend;
use crate::prelude::*;
use crate::types::Label;

/// Fields offered before anything is typed. `data.` is a prefix that
/// opens up the known payload keys.
pub const FIELD_KEYS: [&str; 7] = [
    "service",
    "env",
    "name",
    "trace_id",
    "request_id",
    "job_id",
    DATA_PREFIX,
];

pub const DATA_PREFIX: &str = "data.";

pub const MAX_VALUE_SUGGESTIONS: usize = 10;

pub const VALUE_DEBOUNCE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Field,
    Operator,
    Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub value: String,
    pub display: String,
    pub description: Option<String>,
}

impl Suggestion {
    fn field(value: &str) -> Self {
        Self {
            kind: SuggestionKind::Field,
            value: value.to_string(),
            display: value.to_string(),
            description: None,
        }
    }

    fn operator(op: Operator) -> Self {
        Self {
            kind: SuggestionKind::Operator,
            value: op.symbol().to_string(),
            display: op.symbol().to_string(),
            description: Some(op.description().to_string()),
        }
    }

    fn value(value: &str) -> Self {
        Self {
            kind: SuggestionKind::Value,
            value: value.to_string(),
            display: value.to_string(),
            description: None,
        }
    }
}

/// Strip a case-insensitive `data.` prefix.
pub(crate) fn strip_data_prefix(s: &str) -> Option<&str> {
    match s.get(..DATA_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(DATA_PREFIX) => Some(&s[DATA_PREFIX.len()..]),
        _ => None,
    }
}

/// Case-insensitive substring filter, capped.
pub(crate) fn filter_values(values: &[String], partial: &str) -> Vec<Suggestion> {
    let partial = partial.to_lowercase();
    values
        .iter()
        .filter(|v| v.to_lowercase().contains(&partial))
        .take(MAX_VALUE_SUGGESTIONS)
        .map(|v| Suggestion::value(v))
        .collect()
}

/// Narrow already fetched value suggestions to the live partial.
pub(crate) fn narrow_values(values: &[Suggestion], partial: &str) -> Vec<Suggestion> {
    let partial = partial.to_lowercase();
    values
        .iter()
        .filter(|s| s.value.to_lowercase().contains(&partial))
        .cloned()
        .collect()
}

/// Label values loaded once and never invalidated.
#[derive(Debug, Clone, Default)]
pub struct LabelCache {
    values: HashMap<Label, Vec<String>>,
}

impl LabelCache {
    pub fn new(values: HashMap<Label, Vec<String>>) -> Self {
        Self { values }
    }

    /// Load every label concurrently. If any lookup fails the cache is
    /// left empty; suggestion failures are never surfaced to the user.
    pub async fn load<B: Backend + ?Sized>(backend: &B) -> Self {
        let result = futures::try_join!(
            backend.label_values(Label::Service),
            backend.label_values(Label::Env),
            backend.label_values(Label::Name),
            backend.label_values(Label::Level),
        );
        match result {
            Ok((services, envs, names, levels)) => {
                let mut values = HashMap::new();
                values.insert(Label::Service, services);
                values.insert(Label::Env, envs);
                values.insert(Label::Name, names);
                values.insert(Label::Level, levels);
                Self { values }
            }
            Err(err) => {
                error!("Failed to load labels: {}", err);
                Self::default()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        Label::ALL
            .iter()
            .find(|label| label.as_str() == key)
            .and_then(|label| self.values.get(label))
            .map(|v| v.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The outcome of computing suggestions for the current text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestions {
    /// Suggestions computed synchronously.
    Ready(Vec<Suggestion>),
    /// Values must be looked up remotely for the given `data.*` key.
    Remote { key: String, partial: String },
}

/// Synchronous half of the autocomplete engine.
#[derive(Debug, Clone, Default)]
pub struct Suggester {
    pub labels: LabelCache,
    pub data_keys: Vec<String>,
}

impl Suggester {
    pub fn new(labels: LabelCache, data_keys: Vec<String>) -> Self {
        Self { labels, data_keys }
    }

    /// If the text is a known field followed by a space, with no
    /// operator yet, return that field.
    pub fn field_awaiting_operator(&self, text: &str) -> Option<String> {
        if !text.ends_with(' ') || parse_input(text).is_some() {
            return None;
        }
        let trimmed = text.trim();
        let is_static = trimmed != DATA_PREFIX && FIELD_KEYS.contains(&trimmed);
        let is_data_key = strip_data_prefix(trimmed)
            .map(|key| self.data_keys.iter().any(|k| k == key))
            .unwrap_or(false);
        if is_static || is_data_key {
            Some(trimmed.to_string())
        } else {
            None
        }
    }

    pub fn suggest(&self, text: &str, used_keys: &HashSet<String>) -> Suggestions {
        if self.field_awaiting_operator(text).is_some() {
            return Suggestions::Ready(
                Operator::PARSE_ORDER
                    .iter()
                    .map(|op| Suggestion::operator(*op))
                    .collect(),
            );
        }

        match parse_input(text) {
            None => Suggestions::Ready(self.suggest_fields(text.trim(), used_keys)),
            Some(Expression { key, value, .. }) => {
                if strip_data_prefix(&key).is_some() {
                    Suggestions::Remote {
                        key,
                        partial: value,
                    }
                } else if let Some(values) = self.labels.get(&key) {
                    Suggestions::Ready(filter_values(values, &value))
                } else {
                    Suggestions::Ready(vec![])
                }
            }
        }
    }

    fn suggest_fields(&self, partial: &str, used_keys: &HashSet<String>) -> Vec<Suggestion> {
        if let Some(data_part) = strip_data_prefix(partial) {
            let data_part = data_part.to_lowercase();
            return self
                .data_keys
                .iter()
                .filter(|k| k.to_lowercase().starts_with(&data_part))
                .map(|k| format!("{DATA_PREFIX}{k}"))
                .filter(|k| !used_keys.contains(k))
                .map(|k| Suggestion::field(&k))
                .collect();
        }
        let partial = partial.to_lowercase();
        FIELD_KEYS
            .iter()
            .filter(|f| f.starts_with(&partial) && !used_keys.contains(**f))
            .map(|f| Suggestion::field(f))
            .collect()
    }
}

/// The parse context a remote value lookup belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueContext {
    /// Full field key, including the `data.` prefix.
    pub key: String,
    pub service: Option<String>,
}

/// A scheduled, debounced remote value lookup.
#[derive(Debug)]
pub struct ValueRequest {
    pub generation: u64,
    pub context: ValueContext,
    pub partial: String,
    cancel: CancellationToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueResponse {
    pub generation: u64,
    pub context: ValueContext,
    pub suggestions: Vec<Suggestion>,
}

impl ValueRequest {
    /// Wait out the debounce, then look the values up. Returns `None` if
    /// a newer keystroke cancelled the request before the timer fired.
    /// A zero debounce skips the timer.
    pub async fn run<B: Backend + ?Sized>(
        self,
        backend: &B,
        debounce: Duration,
    ) -> Option<ValueResponse> {
        if debounce.is_zero() {
            if self.cancel.is_cancelled() {
                trace!("Value lookup {} superseded", self.generation);
                return None;
            }
        } else {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    trace!("Value lookup {} superseded", self.generation);
                    return None;
                }
                _ = tokio::time::sleep(debounce) => {}
            }
        }

        let data_key = strip_data_prefix(&self.context.key).unwrap_or(&self.context.key);
        let suggestions = match backend
            .data_values(data_key, self.context.service.as_deref())
            .await
        {
            Ok(values) => filter_values(&values, &self.partial),
            Err(err) => {
                error!("Failed to fetch data values: {}", err);
                vec![]
            }
        };
        Some(ValueResponse {
            generation: self.generation,
            context: self.context,
            suggestions,
        })
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Issues value lookups and decides which results may still be shown.
///
/// Every schedule cancels the pending debounce timer. A result that
/// completes anyway is only accepted if it belongs to the latest request
/// and its context still matches the live one.
#[derive(Debug, Default)]
pub struct ValueScheduler {
    generation: u64,
    pending: Option<CancellationToken>,
}

impl ValueScheduler {
    pub fn schedule(&mut self, context: ValueContext, partial: &str) -> ValueRequest {
        self.cancel();
        self.generation += 1;
        let cancel = CancellationToken::new();
        self.pending = Some(cancel.clone());
        ValueRequest {
            generation: self.generation,
            context,
            partial: partial.to_string(),
            cancel,
        }
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }

    /// The generation of the most recently scheduled lookup.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn accept(&self, response: &ValueResponse, live: Option<&ValueContext>) -> bool {
        if live != Some(&response.context) {
            debug!(
                "Discarding values for {}, input context changed",
                response.context.key
            );
            return false;
        }
        if response.generation != self.generation() {
            debug!(
                "Discarding values for {} from superseded lookup {}",
                response.context.key, response.generation
            );
            return false;
        }
        true
    }
}

/// Load the payload keys known for a service scope. Failures are logged
/// and yield `None` so the caller can keep what it had.
pub async fn load_data_keys<B: Backend + ?Sized>(
    backend: &B,
    service: Option<&str>,
) -> Option<Vec<String>> {
    match backend.data_keys(service).await {
        Ok(keys) => Some(keys),
        Err(err) => {
            error!("Failed to load data keys: {}", err);
            None
        }
    }
}
