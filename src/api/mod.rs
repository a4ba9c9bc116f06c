use anyhow::{Context, Result};
use reqwest::{Client, Response};
use tracing::debug;
use url::Url;

use crate::models::{ChatReply, ChatRequest, Personalization, ScheduleData};

// ─── Error types ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

// ─── Client ─────────────────────────────────────────────────────────────────

/// HTTP client for the study-planning server. Cheap to clone; clones share
/// the underlying connection pool, which is what the background tasks rely
/// on.
#[derive(Debug, Clone)]
pub struct PlannerClient {
    client: Client,
    base_url: Url,
}

impl PlannerClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid server URL: {base_url}"))?;

        let client = Client::builder()
            .user_agent("studyplan-tui/0.1.0")
            .build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Bad endpoint path: {path}"))
    }

    async fn get(&self, path: &str) -> Result<Response, PlannerError> {
        let url = self.endpoint(path).map_err(PlannerError::Other)?;
        debug!(%url, "GET");
        let resp = self.client.get(url).send().await?;
        Self::check_status(resp).await
    }

    async fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, PlannerError> {
        let url = self.endpoint(path).map_err(PlannerError::Other)?;
        debug!(%url, "POST");
        let resp = self.client.post(url).json(body).send().await?;
        Self::check_status(resp).await
    }

    async fn check_status(resp: Response) -> Result<Response, PlannerError> {
        let status = resp.status();
        if status.is_client_error() || status.is_server_error() {
            let message = resp.text().await.unwrap_or_default();
            return Err(PlannerError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }

    // ── Endpoints ───────────────────────────────────────────────────────

    /// Fetch the full schedule document. The whole document is returned on
    /// every call; the server does no partial updates.
    pub async fn get_schedule(&self) -> Result<ScheduleData, PlannerError> {
        let resp = self.get("/get_schedule").await?;
        Ok(resp.json().await?)
    }

    /// Send a chat message. `year` is the currently selected year, which
    /// the server uses to anchor relative dates in the message.
    pub async fn send_chat(&self, message: &str, year: &str) -> Result<ChatReply, PlannerError> {
        let body = ChatRequest { message, year };
        let resp = self.post_json("/chat", &body).await?;
        Ok(resp.json().await?)
    }

    /// Persist preferences and study windows. The generated plan may change
    /// server-side as a result, so callers refresh afterwards.
    pub async fn save_personalization(
        &self,
        payload: &Personalization,
    ) -> Result<ChatReply, PlannerError> {
        let resp = self.post_json("/save_personalization", payload).await?;
        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rejects_invalid_url() {
        assert!(PlannerClient::new("not a url").is_err());
        assert!(PlannerClient::new("http://localhost:5000").is_ok());
    }

    #[test]
    fn test_endpoint_joins_against_base() {
        let client = PlannerClient::new("http://localhost:5000").unwrap();
        let url = client.endpoint("/get_schedule").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/get_schedule");
    }

    #[test]
    fn test_api_error_display_carries_status() {
        let err = PlannerError::Api {
            status: 500,
            message: "internal server error".into(),
        };
        assert_eq!(err.to_string(), "HTTP 500: internal server error");
    }
}
