use std::path::PathBuf;

use console::{Emoji, style};
use reqwest::{Response, StatusCode};
use thiserror::Error;

use crate::translate;

static WARNING: Emoji = Emoji("⚠️  ", "");
static NO_ENTRY: Emoji = Emoji("⛔ ", "");
static LOCK: Emoji = Emoji("🔒 ", "");

#[derive(Debug, Error)]
pub enum PlatformError {
    /// Non-2xx answer from the platform. Renders as `HTTP <status>: <detail>`.
    #[error("HTTP {status}: {detail}")]
    Rejected { status: u16, detail: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PlatformError {
    pub fn status(&self) -> Option<u16> {
        match self {
            PlatformError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// User-facing text for deploy and build calls. Rejections go through the
    /// translator; transport and local I/O failures are shown as-is.
    pub fn friendly(&self) -> String {
        self.render(true)
    }

    /// User-facing text for every other command. Rejection details are shown
    /// untranslated, since the translator only knows about `deploy` flags.
    pub fn describe(&self) -> String {
        self.render(false)
    }

    fn render(&self, translated: bool) -> String {
        match self {
            PlatformError::Rejected { status: 401, .. } => format!(
                "{}Not authenticated. Please log in again with {}.",
                LOCK,
                style(format!("{} login", env!("CARGO_PKG_NAME"))).bold()
            ),
            PlatformError::Rejected {
                status: 503,
                detail,
            } => format!(
                "{}{}",
                WARNING,
                style(format!("Service temporarily unavailable: {detail}")).yellow()
            ),
            PlatformError::Rejected { .. } if translated => translate::translate(&self.to_string()),
            _ => self.to_string(),
        }
    }
}

/// Passes successful responses through and turns everything else into
/// [`PlatformError::Rejected`].
pub async fn check_response(response: Response) -> Result<Response, PlatformError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    log::debug!("platform rejected request with {status}: {body}");
    Err(PlatformError::Rejected {
        status: status.as_u16(),
        detail: extract_detail(status, &body),
    })
}

/// Pulls the human-readable part out of an error body. A string `detail` (or
/// `reason`) field is used directly; structured bodies such as field-level
/// validation lists are kept raw so nothing is lost.
fn extract_detail(status: StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["detail", "reason"] {
            if let Some(text) = value.get(field).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    body.to_string()
}

/// Wraps an error for display at the top level, the way every command reports failures.
pub fn rejected(message: impl std::fmt::Display) -> anyhow::Error {
    anyhow::anyhow!("{}{}", NO_ENTRY, style(message).red())
}
