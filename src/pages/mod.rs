// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

//! Page controllers. Each owns the state of one view: its filters, the
//! fetched data and the loading and error flags, and knows which
//! requests to issue when something changes.

pub mod analytics;
pub mod dashboard;
pub mod events;
pub mod health;

pub use analytics::{AnalyticsData, AnalyticsPage};
pub use dashboard::{Dashboard, WidgetData, WidgetState};
pub use events::EventsPage;
pub use health::{HealthMonitor, HealthStatus};
