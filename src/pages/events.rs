// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use crate::client::Backend;
use crate::filters::{EventFilters, EventQuery};
use crate::prelude::*;
use crate::types::{Event, Pagination};

#[derive(Debug, Default)]
pub struct EventsPage {
    pub filters: EventFilters,
    events: Vec<Event>,
    pagination: Option<Pagination>,
    loading: bool,
    error: Option<String>,
}

impl EventsPage {
    pub fn new(query: EventQuery) -> Self {
        Self {
            filters: EventFilters::new(query),
            ..Default::default()
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch the events for the current query. On failure the error is
    /// recorded and the previously shown events are kept.
    pub async fn refresh<B: Backend + ?Sized>(&mut self, backend: &B) -> bool {
        self.loading = true;
        self.error = None;
        let result = backend.events(self.filters.query()).await;
        self.loading = false;
        match result {
            Ok(response) => {
                self.pagination = response.pagination.clone();
                self.events = response.into_data();
                debug!("Fetched {} events", self.events.len());
                true
            }
            Err(err) => {
                warn!("Failed to fetch events: {}", err);
                self.error = Some(err.to_string());
                false
            }
        }
    }

    /// Advance a page if the backend reported a next page. Returns true if
    /// the offset moved and a refresh is due.
    pub fn next_page(&mut self) -> bool {
        if !self.pagination.as_ref().is_some_and(Pagination::has_next) {
            return false;
        }
        let query = self.filters.query();
        let offset = query.offset.saturating_add(query.limit);
        self.filters.set_offset(offset);
        true
    }

    pub fn previous_page(&mut self) -> bool {
        if !self
            .pagination
            .as_ref()
            .is_some_and(Pagination::has_previous)
        {
            return false;
        }
        let query = self.filters.query();
        let offset = query.offset.saturating_sub(query.limit);
        self.filters.set_offset(offset);
        true
    }

    /// Number of events shown on this page.
    pub fn shown(&self) -> usize {
        self.events.len().min(self.filters.query().limit as usize)
    }

    pub fn summary(&self) -> String {
        match &self.pagination {
            Some(pagination) => format!("Showing {} of {} events", self.shown(), pagination.count),
            None => format!("{} events", self.events.len()),
        }
    }
}
