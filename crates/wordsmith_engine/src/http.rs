use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;
use wordsmith_core::wizard::{CheckResponse, DataSource, ProjectInput, SavedProject};
use wordsmith_core::{
    Accepted, FieldError, PollError, ProcedureRequest, RemoteFailure, RemoteStatus,
    SchemaColumn, SubmissionError,
};
use wordsmith_logging::{ws_debug, ws_info};

use crate::api::{ProcedureApi, ProjectApi};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("invalid base url {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("server error: http status {0}")]
    Server(u16),
    #[error(transparent)]
    Rejected(SubmissionError),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<ApiError> for SubmissionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Rejected(rejection) => rejection,
            other => SubmissionError::new(other.to_string()),
        }
    }
}

impl From<ApiError> for PollError {
    fn from(err: ApiError) -> Self {
        PollError::new(err.to_string())
    }
}

/// Every response body is wrapped as `{"data": ..., "message": ...}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum WireStatus {
    Idle,
    Pending,
    Success,
    Failed,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: WireStatus,
    data: Option<serde_json::Value>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DatasetCheckBody {
    #[serde(default)]
    columns: Vec<SchemaColumn>,
}

#[derive(Debug, Deserialize)]
struct ProjectBody {
    id: String,
}

/// JSON-over-HTTP client for the Wordsmith server.
#[derive(Debug, Clone)]
pub struct HttpApi {
    base: Url,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let base = parse_base_url(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(settings.connect_timeout_ms))
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl {
                url: self.base.to_string(),
                message: "cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn procedure_url(&self, request: &ProcedureRequest, status: bool) -> Result<Url, ApiError> {
        let mut segments = vec!["projects", request.project_id(), request.kind().segment()];
        if status {
            segments.push("status");
        }
        self.endpoint(segments)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<(StatusCode, Vec<u8>), ApiError> {
        ws_debug!("{method} {url}");
        let mut builder = self.client.request(method, url);
        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(|err| ApiError::Decode(err.to_string()))?;
            builder = builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(bytes);
        }
        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Ok((status, bytes.to_vec()))
    }

    /// Sends a mutation and decodes the envelope. 4xx answers become
    /// field-level rejections.
    async fn mutate<B, T>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<Envelope<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (status, bytes) = self.send(method, url, Some(body)).await?;
        if status.is_client_error() {
            return Err(ApiError::Rejected(rejection(status, &bytes)));
        }
        if !status.is_success() {
            return Err(ApiError::Server(status.as_u16()));
        }
        decode(&bytes)
    }
}

#[async_trait::async_trait]
impl ProcedureApi for HttpApi {
    async fn submit(&self, request: &ProcedureRequest) -> Result<Accepted, SubmissionError> {
        let url = self.procedure_url(request, false)?;
        let body: serde_json::Map<String, serde_json::Value> = request
            .params()
            .into_iter()
            .map(|(name, value)| (name.to_string(), serde_json::Value::from(value)))
            .collect();
        ws_info!("submitting {request}");
        let envelope: Envelope<serde_json::Value> = self.mutate(Method::POST, url, &body).await?;
        Ok(Accepted {
            message: envelope.message,
        })
    }

    async fn poll(&self, request: &ProcedureRequest) -> Result<RemoteStatus, PollError> {
        let mut url = self.procedure_url(request, true)?;
        let params = request.params();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        let (status, bytes) = self.send::<()>(Method::GET, url, None).await?;
        if !status.is_success() {
            return Err(ApiError::Server(status.as_u16()).into());
        }
        let envelope: Envelope<StatusBody> = decode(&bytes)?;
        let body = envelope
            .data
            .ok_or_else(|| ApiError::Decode("status response without data".to_string()))?;
        Ok(remote_status(body))
    }
}

#[async_trait::async_trait]
impl ProjectApi for HttpApi {
    async fn check_project_id(&self, project_id: &str) -> Result<CheckResponse, SubmissionError> {
        let url = self.endpoint(["projects", "check-project-id"])?;
        let body = serde_json::json!({ "projectId": project_id });
        let envelope: Envelope<serde_json::Value> = self.mutate(Method::POST, url, &body).await?;
        Ok(CheckResponse {
            message: envelope.message,
            columns: Vec::new(),
        })
    }

    async fn check_dataset(&self, source: &DataSource) -> Result<CheckResponse, SubmissionError> {
        let url = self.endpoint(["projects", "check-dataset"])?;
        let envelope: Envelope<DatasetCheckBody> = self.mutate(Method::POST, url, source).await?;
        Ok(CheckResponse {
            message: envelope.message,
            columns: envelope.data.map(|data| data.columns).unwrap_or_default(),
        })
    }

    async fn create_project(&self, input: &ProjectInput) -> Result<SavedProject, SubmissionError> {
        let url = self.endpoint(["projects"])?;
        let envelope: Envelope<ProjectBody> = self.mutate(Method::POST, url, input).await?;
        saved_project(envelope, &input.project_id)
    }

    async fn update_project(
        &self,
        project_id: &str,
        input: &ProjectInput,
    ) -> Result<SavedProject, SubmissionError> {
        let url = self.endpoint(["projects", project_id])?;
        let envelope: Envelope<ProjectBody> = self.mutate(Method::PUT, url, input).await?;
        saved_project(envelope, project_id)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let invalid = |message: String| ApiError::InvalidBaseUrl {
        url: raw.to_string(),
        message,
    };
    let url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("cannot be a base".to_string()));
    }
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    Ok(url)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|err| ApiError::Decode(err.to_string()))
}

fn rejection(status: StatusCode, bytes: &[u8]) -> SubmissionError {
    let body: ErrorBody = serde_json::from_slice(bytes).unwrap_or_default();
    SubmissionError {
        message: body.message.unwrap_or_else(|| status.to_string()),
        field_errors: body
            .errors
            .into_iter()
            .map(|(field, message)| FieldError { field, message })
            .collect(),
    }
}

fn remote_status(body: StatusBody) -> RemoteStatus {
    match body.status {
        WireStatus::Idle => RemoteStatus::NotStarted,
        WireStatus::Pending => RemoteStatus::Running,
        WireStatus::Success => RemoteStatus::Succeeded(body.data.unwrap_or_default()),
        WireStatus::Failed => RemoteStatus::Failed(RemoteFailure {
            message: body
                .error
                .unwrap_or_else(|| "procedure failed".to_string()),
            detail: body.data,
        }),
    }
}

fn saved_project(
    envelope: Envelope<ProjectBody>,
    fallback_id: &str,
) -> Result<SavedProject, SubmissionError> {
    Ok(SavedProject {
        project_id: envelope
            .data
            .map(|data| data.id)
            .unwrap_or_else(|| fallback_id.to_string()),
        message: envelope.message,
    })
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    ApiError::Network(err.to_string())
}
