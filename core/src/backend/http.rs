use super::{Backend, BackendError, BackendInfo};
use crate::tools::{ApiReply, ChatReply, OsintReport, ToolRequest, ToolResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

const CLIENT_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

/// Backend reached over HTTP, all endpoints relative to one base URL
pub struct HttpBackend {
    info: BackendInfo,
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, BackendError> {
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Configuration(format!(
                "{} cannot be used as a base URL",
                base_url
            )));
        }
        // The dispatch timeout fires first; this only bounds direct callers
        let client = reqwest::Client::builder()
            .timeout(timeout + CLIENT_TIMEOUT_SLACK)
            .build()
            .map_err(|e| BackendError::Configuration(format!("http client: {}", e)))?;
        Ok(Self {
            info: BackendInfo {
                name: "Lisbeth HTTP backend".to_string(),
                description: "Security assistant service over JSON/HTTP".to_string(),
                endpoint: base_url.to_string(),
            },
            client,
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::Configuration(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<ApiReply<T>, BackendError> {
        let url = self.endpoint(segments)?;
        debug!("GET {}", url);
        let resp = self
            .client
            .get(url)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(request_error)?;
        decode(resp).await
    }

    async fn post<T: DeserializeOwned>(&self, segments: &[&str], body: &Value) -> Result<ApiReply<T>, BackendError> {
        let url = self.endpoint(segments)?;
        debug!("POST {}", url);
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(request_error)?;
        decode(resp).await
    }

    async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<ApiReply<T>, BackendError> {
        let url = self.endpoint(segments)?;
        debug!("DELETE {}", url);
        let resp = self.client.delete(url).send().await.map_err(request_error)?;
        decode(resp).await
    }
}

fn request_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Network(format!("request timed out: {}", e))
    } else {
        BackendError::Network(format!("request error: {}", e))
    }
}

/// Decode a response body into the endpoint's reply shape.
///
/// Error statuses still carry JSON most of the time; `{ error }` and
/// `{ message }` bodies become application-level failures.
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<ApiReply<T>, BackendError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| BackendError::Network(format!("read error: {}", e)))?;

    if status.is_success() {
        return serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()));
    }

    let Ok(value) = serde_json::from_str::<Value>(&body) else {
        return Err(BackendError::Status { status: status.as_u16() });
    };
    let error = value
        .get("error")
        .or_else(|| value.get("message"))
        .and_then(Value::as_str);
    match error {
        Some(error) => Ok(ApiReply::Failure { error: error.to_string() }),
        None => Err(BackendError::Status { status: status.as_u16() }),
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn send(&self, request: ToolRequest) -> Result<ToolResult, BackendError> {
        let result = match request {
            ToolRequest::CheckPassword { password } => {
                ToolResult::Password(self.post(&["check-password"], &json!({ "password": password })).await?)
            }
            ToolRequest::CheckEmail { email } => {
                ToolResult::Email(self.post(&["check-email"], &json!({ "email": email })).await?)
            }
            ToolRequest::SecurityNews => ToolResult::News(self.get(&["security-news"]).await?),
            ToolRequest::Surveillance => ToolResult::Surveillance(self.get(&["surveillance"]).await?),
            ToolRequest::Search { message, user_id } => {
                let reply: ApiReply<ChatReply> = self
                    .post(&["chat"], &json!({ "message": message, "user_id": user_id }))
                    .await?;
                ToolResult::Osint(reply.map(OsintReport::from))
            }
            ToolRequest::Chat { message, user_id } => ToolResult::Chat(
                self.post(&["chat"], &json!({ "message": message, "user_id": user_id }))
                    .await?,
            ),
            ToolRequest::UserMemory { user_id } => {
                ToolResult::Memory(self.get(&["user-memory", user_id.as_str()]).await?)
            }
            ToolRequest::ClearMemory { user_id } => {
                ToolResult::MemoryCleared(self.delete(&["clear-memory", user_id.as_str()]).await?)
            }
        };
        Ok(result)
    }

    fn info(&self) -> BackendInfo {
        self.info.clone()
    }
}
