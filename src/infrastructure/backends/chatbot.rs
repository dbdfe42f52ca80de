#[cfg(test)]
#[path = "chatbot_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendPrompt;
use crate::domain::models::BackendResponse;
use crate::domain::models::HistoryEntry;
use crate::domain::models::SessionName;
use crate::domain::models::SessionStats;
use crate::domain::models::ERROR_CONNECT;
use crate::domain::models::ERROR_NO_RESPONSE;
use crate::domain::models::ERROR_SERVER;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GenerateRequest {
    prompt: String,
    session_id: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    message_type: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StatsResponse {
    stats: SessionStats,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CleanupRequest {
    days_old: u32,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CleanupResponse {
    deleted_count: u64,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct HistoryRequest {
    session_id: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    history: Option<Vec<String>>,
}

/// Pulls a readable `detail` out of an error body. FastAPI style validation
/// errors carry a list there, which is not shown.
/// Text shown for a failed generate call. A JSON body supplies its `detail`,
/// while a body that isn't JSON is treated like an unreachable server.
fn failure_text(body: &str) -> String {
    let value = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value,
        Err(_) => return ERROR_CONNECT.to_string(),
    };

    return value
        .get("detail")
        .and_then(|detail| return detail.as_str())
        .map(|detail| return detail.trim())
        .filter(|detail| return !detail.is_empty())
        .map(|detail| return detail.to_string())
        .unwrap_or_else(|| return ERROR_SERVER.to_string());
}

/// HTTP client for the chatbot API.
pub struct Chatbot {
    url: String,
    timeout: String,
}

impl Default for Chatbot {
    fn default() -> Chatbot {
        return Chatbot {
            url: Config::get(ConfigKey::ApiURL),
            timeout: Config::get(ConfigKey::BackendHealthCheckTimeout),
        };
    }
}

impl Chatbot {
    fn endpoint(&self, path: &str) -> String {
        return format!("{url}/api/{path}", url = self.url.trim_end_matches('/'));
    }
}

#[async_trait]
impl Backend for Chatbot {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Chatbot API URL is not defined");
        }

        let res = reqwest::Client::new()
            .get(self.endpoint("health"))
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "Chatbot API is not reachable");
                bail!("Chatbot API is not reachable at {}", self.url);
            }
        };

        let status = res.status().as_u16();
        if status >= 400 {
            tracing::error!(status = status, "Chatbot API health check failed");
            bail!("Chatbot API health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn generate(&self, prompt: BackendPrompt) -> BackendResponse {
        let session_id = prompt.session_id.to_string();
        let req = GenerateRequest {
            prompt: prompt.text,
            session_id: prompt.session_id,
        };

        let res = reqwest::Client::new()
            .post(self.endpoint("generate/"))
            .json(&req)
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "Failed to reach the generate endpoint");
                return BackendResponse::failure(&session_id, ERROR_CONNECT);
            }
        };

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = body, "Generate request failed");
            return BackendResponse::failure(&session_id, &failure_text(&body));
        }

        let data = match res.json::<GenerateResponse>().await {
            Ok(data) => data,
            Err(err) => {
                tracing::error!(error = ?err, "Failed to decode generate response");
                return BackendResponse::failure(&session_id, ERROR_CONNECT);
            }
        };

        let text = data
            .response
            .filter(|text| return !text.is_empty())
            .unwrap_or_else(|| return ERROR_NO_RESPONSE.to_string());

        return BackendResponse {
            session_id,
            text,
            message_type: data.message_type,
            code: data.code.filter(|code| return !code.trim().is_empty()),
            failed: false,
        };
    }

    #[allow(clippy::implicit_return)]
    async fn session_stats(&self) -> Result<SessionStats> {
        let res = reqwest::Client::new()
            .get(self.endpoint("session_stats/"))
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Failed to fetch session stats");
            bail!("Failed to fetch session stats");
        }

        return Ok(res.json::<StatsResponse>().await?.stats);
    }

    #[allow(clippy::implicit_return)]
    async fn cleanup_sessions(&self, days_old: u32) -> Result<u64> {
        let res = reqwest::Client::new()
            .post(self.endpoint("cleanup_sessions/"))
            .json(&CleanupRequest { days_old })
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Failed to cleanup sessions");
            bail!("Failed to cleanup sessions");
        }

        return Ok(res.json::<CleanupResponse>().await?.deleted_count);
    }

    #[allow(clippy::implicit_return)]
    async fn session_names(&self) -> Result<Vec<SessionName>> {
        let res = reqwest::Client::new()
            .get(self.endpoint("session_names/"))
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Failed to fetch session names");
            bail!("Failed to fetch session names");
        }

        return Ok(res.json::<Vec<SessionName>>().await?);
    }

    #[allow(clippy::implicit_return)]
    async fn history(&self, session_id: &str) -> Result<Vec<HistoryEntry>> {
        let res = reqwest::Client::new()
            .post(self.endpoint("get_history/"))
            .json(&HistoryRequest {
                session_id: session_id.to_string(),
            })
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Failed to fetch history");
            bail!("Failed to fetch history");
        }

        let lines = res.json::<HistoryResponse>().await?.history.unwrap_or_default();
        return Ok(lines
            .iter()
            .map(|line| return HistoryEntry::parse(line))
            .collect());
    }

    #[allow(clippy::implicit_return)]
    async fn delete_session(&self, session_id: &str) -> Result<()> {
        let res = reqwest::Client::new()
            .delete(self.endpoint(&format!("sessions/{session_id}")))
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Failed to delete session");
            bail!("Failed to delete session.");
        }

        return Ok(());
    }
}
