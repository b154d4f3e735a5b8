// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! The query input: a text box plus a row of filter chips.
//!
//! The input is driven by key events. While no chip is selected keys edit
//! the text and move through suggestions. Left or Backspace on an empty
//! text box selects the last chip, after which keys move between chips,
//! open one for editing, or delete it.

use std::collections::HashSet;

use super::parser::parse_input;
use super::suggest::{
    load_data_keys, narrow_values, strip_data_prefix, LabelCache, Suggester, Suggestion, SuggestionKind,
    Suggestions, ValueContext, ValueRequest, ValueResponse, ValueScheduler,
};
use super::QueryChip;
use crate::client::Backend;
use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Enter,
    Backspace,
    Delete,
    Escape,
    Char(char),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChipSelection {
    #[default]
    Idle,
    Selected(usize),
}

/// What the owner of the input has to do after an event.
#[derive(Debug)]
pub enum InputEvent {
    None,
    /// The chip list changed and filters should be rebuilt.
    ChipsChanged,
    /// Enter on an empty input: run the query.
    Search,
    /// Run this lookup and hand the result to [`QueryInput::apply_values`].
    FetchValues(ValueRequest),
}

impl InputEvent {
    pub fn is_none(&self) -> bool {
        matches!(self, InputEvent::None)
    }
}

#[derive(Debug, Default)]
pub struct QueryInput {
    text: String,
    chips: Vec<QueryChip>,
    selection: ChipSelection,
    show_suggestions: bool,
    highlighted: usize,
    suggester: Suggester,
    /// Service scope the data keys were loaded for.
    data_keys_scope: Option<Option<String>>,
    remote: Option<(ValueContext, Vec<Suggestion>)>,
    scheduler: ValueScheduler,
}

impl QueryInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chips(chips: Vec<QueryChip>) -> Self {
        Self {
            chips,
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn chips(&self) -> &[QueryChip] {
        &self.chips
    }

    pub fn selection(&self) -> ChipSelection {
        self.selection
    }

    pub fn suggestions_visible(&self) -> bool {
        self.show_suggestions
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn suggester(&self) -> &Suggester {
        &self.suggester
    }

    /// Replace the chips from outside, eg. when filters are reset.
    pub fn set_chips(&mut self, chips: Vec<QueryChip>) {
        self.chips = chips;
        if let ChipSelection::Selected(i) = self.selection {
            if i >= self.chips.len() {
                self.selection = ChipSelection::Idle;
            }
        }
    }

    pub fn used_keys(&self) -> HashSet<String> {
        self.chips.iter().map(|c| c.key.clone()).collect()
    }

    /// The service filter value, which scopes data key lookups.
    pub fn service(&self) -> Option<&str> {
        self.chips
            .iter()
            .find(|c| c.key == "service")
            .map(|c| c.value.as_str())
    }

    pub fn set_labels(&mut self, labels: LabelCache) {
        self.suggester.labels = labels;
    }

    pub fn set_data_keys(&mut self, keys: Vec<String>) {
        self.suggester.data_keys = keys;
    }

    pub async fn load_labels<B: Backend + ?Sized>(&mut self, backend: &B) {
        self.suggester.labels = LabelCache::load(backend).await;
    }

    /// Reload the known data keys if the service scope changed since
    /// they were last loaded.
    pub async fn sync_data_keys<B: Backend + ?Sized>(&mut self, backend: &B) {
        let scope = self.service().map(str::to_string);
        if self.data_keys_scope.as_ref() == Some(&scope) {
            return;
        }
        if let Some(keys) = load_data_keys(backend, scope.as_deref()).await {
            self.suggester.data_keys = keys;
        }
        self.data_keys_scope = Some(scope);
    }

    /// The remote lookup context of the current text, if it is a `data.*`
    /// expression.
    fn value_context(&self) -> Option<ValueContext> {
        let expr = parse_input(&self.text)?;
        strip_data_prefix(&expr.key)?;
        Some(ValueContext {
            key: expr.key,
            service: self.service().map(str::to_string),
        })
    }

    /// All suggestions for the current text, visible or not. Fetched
    /// values are narrowed to the value typed so far, which may be ahead
    /// of the lookup that produced them.
    pub fn suggestions(&self) -> Vec<Suggestion> {
        match self.suggester.suggest(&self.text, &self.used_keys()) {
            Suggestions::Ready(list) => list,
            Suggestions::Remote { key, partial } => match &self.remote {
                Some((context, list))
                    if context.key == key && context.service.as_deref() == self.service() =>
                {
                    narrow_values(list, &partial)
                }
                _ => vec![],
            },
        }
    }

    pub fn visible_suggestions(&self) -> Vec<Suggestion> {
        if self.show_suggestions {
            self.suggestions()
        } else {
            vec![]
        }
    }

    /// Replace the text, as on every change to the text box.
    pub fn set_text(&mut self, text: &str) -> InputEvent {
        self.selection = ChipSelection::Idle;
        self.show_suggestions = true;
        self.highlighted = 0;
        self.replace_text(text.to_string())
    }

    fn replace_text(&mut self, text: String) -> InputEvent {
        self.text = text;
        match self.value_context() {
            Some(context) => {
                let partial = parse_input(&self.text)
                    .map(|expr| expr.value)
                    .unwrap_or_default();
                if self.remote.as_ref().map(|(c, _)| c) != Some(&context) {
                    self.remote = None;
                }
                InputEvent::FetchValues(self.scheduler.schedule(context, &partial))
            }
            None => {
                self.scheduler.cancel();
                self.remote = None;
                InputEvent::None
            }
        }
    }

    /// Accept a completed value lookup. Returns false if the result was
    /// stale and discarded.
    pub fn apply_values(&mut self, response: ValueResponse) -> bool {
        let live = self.value_context();
        if !self.scheduler.accept(&response, live.as_ref()) {
            return false;
        }
        self.remote = Some((response.context, response.suggestions));
        true
    }

    pub fn focus(&mut self) {
        self.show_suggestions = true;
    }

    pub fn click_outside(&mut self) {
        self.show_suggestions = false;
        self.selection = ChipSelection::Idle;
    }

    /// Clicking a chip opens it for editing.
    pub fn click_chip(&mut self, index: usize) -> InputEvent {
        self.edit_chip(index)
    }

    /// The remove button on a chip.
    pub fn remove_chip(&mut self, index: usize) -> InputEvent {
        if index >= self.chips.len() {
            return InputEvent::None;
        }
        self.chips.remove(index);
        self.selection = ChipSelection::Idle;
        InputEvent::ChipsChanged
    }

    fn edit_chip(&mut self, index: usize) -> InputEvent {
        if index >= self.chips.len() {
            return InputEvent::None;
        }
        let chip = self.chips.remove(index);
        self.text = chip.to_expression();
        self.scheduler.cancel();
        self.remote = None;
        self.selection = ChipSelection::Idle;
        self.show_suggestions = false;
        InputEvent::ChipsChanged
    }

    fn commit(&mut self, chip: QueryChip) -> InputEvent {
        debug!("Adding filter chip: {}", chip);
        self.chips.push(chip);
        self.text.clear();
        self.scheduler.cancel();
        self.remote = None;
        self.show_suggestions = false;
        self.highlighted = 0;
        InputEvent::ChipsChanged
    }

    pub fn select_suggestion(&mut self, suggestion: &Suggestion) -> InputEvent {
        match suggestion.kind {
            SuggestionKind::Field => {
                self.show_suggestions = true;
                self.highlighted = 0;
                self.replace_text(format!("{} ", suggestion.value))
            }
            SuggestionKind::Operator => {
                let field = self.text.trim().to_string();
                self.show_suggestions = true;
                self.highlighted = 0;
                self.replace_text(format!("{} {} ", field, suggestion.value))
            }
            SuggestionKind::Value => {
                let Some(expr) = parse_input(&self.text) else {
                    return InputEvent::None;
                };
                if self.chips.iter().any(|c| c.key == expr.key) {
                    debug!("Ignoring duplicate filter on {}", expr.key);
                    return InputEvent::None;
                }
                self.commit(QueryChip::new(&expr.key, expr.operator, &suggestion.value))
            }
        }
    }

    pub fn handle_key(&mut self, key: Key) -> InputEvent {
        match self.selection {
            ChipSelection::Selected(index) => self.handle_chip_key(index, key),
            ChipSelection::Idle => self.handle_text_key(key),
        }
    }

    fn handle_chip_key(&mut self, index: usize, key: Key) -> InputEvent {
        match key {
            Key::Left => {
                self.selection = ChipSelection::Selected(index.saturating_sub(1));
                InputEvent::None
            }
            Key::Right => {
                self.selection = if index + 1 >= self.chips.len() {
                    ChipSelection::Idle
                } else {
                    ChipSelection::Selected(index + 1)
                };
                InputEvent::None
            }
            Key::Enter => self.edit_chip(index),
            Key::Backspace | Key::Delete => {
                if index < self.chips.len() {
                    self.chips.remove(index);
                }
                self.selection = if index > 0 && !self.chips.is_empty() {
                    ChipSelection::Selected(index - 1)
                } else {
                    ChipSelection::Idle
                };
                InputEvent::ChipsChanged
            }
            Key::Escape => {
                self.selection = ChipSelection::Idle;
                InputEvent::None
            }
            Key::Char(c) => {
                // Typing starts fresh text input; the chip stays.
                let mut text = self.text.clone();
                text.push(c);
                self.set_text(&text)
            }
            Key::Up | Key::Down => InputEvent::None,
        }
    }

    fn handle_text_key(&mut self, key: Key) -> InputEvent {
        match key {
            Key::Down => {
                let count = self.visible_suggestions().len();
                self.highlighted = (self.highlighted + 1).min(count.saturating_sub(1));
                InputEvent::None
            }
            Key::Up => {
                self.highlighted = self.highlighted.saturating_sub(1);
                InputEvent::None
            }
            Key::Left | Key::Backspace if self.text.is_empty() && !self.chips.is_empty() => {
                self.selection = ChipSelection::Selected(self.chips.len() - 1);
                InputEvent::None
            }
            Key::Backspace => {
                let mut text = self.text.clone();
                if text.pop().is_none() {
                    return InputEvent::None;
                }
                self.set_text(&text)
            }
            Key::Enter => self.enter(),
            Key::Escape => {
                self.show_suggestions = false;
                InputEvent::None
            }
            Key::Char(c) => {
                let mut text = self.text.clone();
                text.push(c);
                self.set_text(&text)
            }
            Key::Left | Key::Right | Key::Delete => InputEvent::None,
        }
    }

    fn enter(&mut self) -> InputEvent {
        let suggestions = self.visible_suggestions();
        if !suggestions.is_empty() {
            let index = self.highlighted.min(suggestions.len() - 1);
            return self.select_suggestion(&suggestions[index]);
        }

        // Manual entry for a fully typed expression.
        if let Some(expr) = parse_input(&self.text) {
            if !expr.value.is_empty() && !self.chips.iter().any(|c| c.key == expr.key) {
                return self.commit(expr.into());
            }
        } else if self.text.trim().is_empty() {
            return InputEvent::Search;
        }
        InputEvent::None
    }
}
