// SPDX-FileCopyrightText: (C) 2025 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use std::time::Duration;

use crate::client::Backend;
use crate::prelude::*;
use crate::types::HealthResponse;

pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, PartialEq)]
pub enum HealthStatus {
    #[default]
    Connecting,
    Online(HealthResponse),
    Offline(String),
}

#[derive(Debug, Default)]
pub struct HealthMonitor {
    status: HealthStatus,
}

impl HealthMonitor {
    pub fn status(&self) -> &HealthStatus {
        &self.status
    }

    pub async fn poll<B: Backend + ?Sized>(&mut self, backend: &B) -> &HealthStatus {
        self.status = match backend.health().await {
            Ok(health) => {
                trace!("Backend health: {:?}", health);
                HealthStatus::Online(health)
            }
            Err(err) => {
                debug!("Health check failed: {}", err);
                HealthStatus::Offline(err.to_string())
            }
        };
        &self.status
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::MockBackend;

    #[tokio::test]
    async fn test_poll() {
        let backend = MockBackend::default();
        let mut monitor = HealthMonitor::default();
        assert_eq!(monitor.status(), &HealthStatus::Connecting);

        assert!(matches!(monitor.poll(&backend).await, HealthStatus::Online(_)));

        backend.fail("health");
        assert!(matches!(monitor.poll(&backend).await, HealthStatus::Offline(_)));

        backend.recover("health");
        assert!(matches!(monitor.poll(&backend).await, HealthStatus::Online(_)));
    }
}
