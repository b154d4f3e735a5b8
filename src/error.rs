// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors returned by the API client.
///
/// Controllers never propagate these past their own state; they store
/// the display string as the user visible error message.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("API error: {} {}", .status.as_u16(), .status.canonical_reason().unwrap_or(""))]
    Status {
        status: reqwest::StatusCode,
        text: String,
    },

    /// Transport level failure (connect, TLS, body read).
    #[error("request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(err) => err.status(),
            _ => None,
        }
    }
}
