//! REST client for the task backend
//!
//! Thin JSON wrapper over `reqwest`: every request carries a JSON content type,
//! responses are decoded as JSON when possible and kept as text otherwise, and
//! any non-2xx status becomes a [`ClientError::Status`] carrying the backend's
//! message.

use crate::config::ApiBase;
use crate::task::{Task, TaskDraft, TaskId};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const FALLBACK_ERROR: &str = "Request failed";

/// Username and password sent to the auth endpoints as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Body that is a JSON string or not JSON at all.
    Text(String),
    Json(Value),
}

impl Reply {
    pub fn parse(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::String(s)) => Reply::Text(s),
            Ok(value) => Reply::Json(value),
            Err(_) => Reply::Text(body.to_string()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(s) => Some(s),
            Reply::Json(_) => None,
        }
    }

    /// Message reported for a failed request.
    pub fn error_message(&self) -> String {
        match self {
            Reply::Text(s) => s.clone(),
            Reply::Json(value) => value
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(FALLBACK_ERROR)
                .to_string(),
        }
    }

    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        match self {
            Reply::Json(value) => {
                serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
            }
            Reply::Text(text) => Err(ClientError::Decode(format!(
                "expected a JSON body, got '{}'",
                text
            ))),
        }
    }
}

/// Backend operations used by the screens.
pub trait TaskApi {
    fn register(&self, credentials: &Credentials) -> Result<Reply, ClientError>;
    fn login(&self, credentials: &Credentials) -> Result<Reply, ClientError>;
    fn list_tasks(&self, username: &str) -> Result<Vec<Task>, ClientError>;
    fn create_task(&self, username: &str, draft: &TaskDraft) -> Result<Task, ClientError>;
    fn update_task(&self, username: &str, id: &TaskId, draft: &TaskDraft)
        -> Result<Task, ClientError>;
    fn delete_task(&self, username: &str, id: &TaskId) -> Result<(), ClientError>;
}

/// HTTP implementation of [`TaskApi`].
pub struct ApiClient {
    client: Client,
    base: ApiBase,
}

impl ApiClient {
    pub fn new(base: ApiBase, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base))
    }

    pub fn with_client(client: Client, base: ApiBase) -> Self {
        Self { client, base }
    }

    pub fn base(&self) -> &ApiBase {
        &self.base
    }

    pub fn get(&self, path: &str) -> Result<Reply, ClientError> {
        self.request::<()>(Method::GET, path, None)
    }

    pub fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Reply, ClientError> {
        self.request(Method::POST, path, Some(body))
    }

    pub fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<Reply, ClientError> {
        self.request(Method::PUT, path, Some(body))
    }

    pub fn del(&self, path: &str) -> Result<Reply, ClientError> {
        self.request::<()>(Method::DELETE, path, None)
    }

    fn request<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Reply, ClientError> {
        let url = self.base.join(path);
        tracing::debug!(%method, %url, "sending request");

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(|e| ClientError::Encode(e.to_string()))?;
            builder = builder.body(bytes);
        }

        let response = builder.send()?;
        let status = response.status();
        let text = response.text()?;
        let reply = Reply::parse(&text);

        if status.is_success() {
            tracing::debug!(%method, %url, status = status.as_u16(), "request succeeded");
            Ok(reply)
        } else {
            let message = reply.error_message();
            tracing::warn!(%method, %url, status = status.as_u16(), %message, "request rejected");
            Err(ClientError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

pub fn tasks_path(username: &str) -> String {
    format!("/tasks?username={}", urlencoding::encode(username))
}

pub fn task_path(id: &TaskId, username: &str) -> String {
    format!(
        "/tasks/{}?username={}",
        urlencoding::encode(&id.to_string()),
        urlencoding::encode(username)
    )
}

impl TaskApi for ApiClient {
    fn register(&self, credentials: &Credentials) -> Result<Reply, ClientError> {
        self.post("/auth/register", credentials)
    }

    fn login(&self, credentials: &Credentials) -> Result<Reply, ClientError> {
        self.post("/auth/login", credentials)
    }

    fn list_tasks(&self, username: &str) -> Result<Vec<Task>, ClientError> {
        self.get(&tasks_path(username))?.into_json()
    }

    fn create_task(&self, username: &str, draft: &TaskDraft) -> Result<Task, ClientError> {
        self.post(&tasks_path(username), draft)?.into_json()
    }

    fn update_task(
        &self,
        username: &str,
        id: &TaskId,
        draft: &TaskDraft,
    ) -> Result<Task, ClientError> {
        self.put(&task_path(id, username), draft)?.into_json()
    }

    fn delete_task(&self, username: &str, id: &TaskId) -> Result<(), ClientError> {
        self.del(&task_path(id, username)).map(|_| ())
    }
}

/// Errors that can occur when talking to the backend
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response; displays as the backend's own message.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Failed to encode request body: {0}")]
    Encode(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}
