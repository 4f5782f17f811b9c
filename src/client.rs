//! Background-removal service client
//!
//! Implements the submit → poll → fetch protocol against the external
//! removal service. The HTTP surface lives behind the [`RemovalTransport`]
//! trait so the protocol state machine can be exercised against a scripted
//! transport in tests; [`HttpTransport`] is the reqwest-backed production
//! implementation.

use crate::config::{ApiKeyProvider, RemovalServiceConfig};
use crate::error::{MockproofError, Result};
use crate::types::{CutoutImage, StatusResponse, SubmitResponse, TaskStatus, Upload};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Header carrying the service credential
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Multipart field name for the submitted image
pub const UPLOAD_FIELD: &str = "file";

/// A raw response from one of the service endpoints
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Construct a response from status and body
    #[must_use]
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Whether the status code is in the 2xx range
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as text, lossily
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Endpoint-level transport for the removal service.
///
/// One method per wire endpoint. Implementations surface network-level
/// failures as the error variant matching their stage; HTTP-level status
/// handling stays in [`RemovalClient`].
#[async_trait]
pub trait RemovalTransport: Send + Sync {
    /// `GET /` — liveness/auth pre-flight
    async fn check_service(&self, api_key: &str) -> Result<ApiResponse>;

    /// `POST /remove-background` — multipart submit of the raw image
    async fn submit_image(
        &self,
        api_key: &str,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<ApiResponse>;

    /// `GET /task-status/{task_id}`
    async fn task_status(&self, api_key: &str, task_id: &str) -> Result<ApiResponse>;

    /// `GET /get-result/{task_id}`
    async fn fetch_result(&self, api_key: &str, task_id: &str) -> Result<ApiResponse>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build the transport from service configuration
    ///
    /// # Errors
    /// - HTTP client construction failure
    pub fn new(config: &RemovalServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                MockproofError::connectivity(format!("failed to create HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            base_url: config.base_url().to_owned(),
        })
    }

    async fn read_response(
        response: reqwest::Response,
        on_error: fn(String) -> MockproofError,
    ) -> Result<ApiResponse> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| on_error(format!("failed to read response body: {e}")))?;
        Ok(ApiResponse::new(status, body.to_vec()))
    }
}

#[async_trait]
impl RemovalTransport for HttpTransport {
    async fn check_service(&self, api_key: &str) -> Result<ApiResponse> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|e| MockproofError::connectivity(e.to_string()))?;
        Self::read_response(response, MockproofError::Connectivity).await
    }

    async fn submit_image(
        &self,
        api_key: &str,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<ApiResponse> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_owned());
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);
        let response = self
            .client
            .post(format!("{}/remove-background", self.base_url))
            .header(API_KEY_HEADER, api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| MockproofError::upload(0, e.to_string()))?;
        Self::read_response(response, |msg| MockproofError::upload(0, msg)).await
    }

    async fn task_status(&self, api_key: &str, task_id: &str) -> Result<ApiResponse> {
        let response = self
            .client
            .get(format!("{}/task-status/{}", self.base_url, task_id))
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|e| MockproofError::status_check(e.to_string()))?;
        Self::read_response(response, MockproofError::StatusCheck).await
    }

    async fn fetch_result(&self, api_key: &str, task_id: &str) -> Result<ApiResponse> {
        let response = self
            .client
            .get(format!("{}/get-result/{}", self.base_url, task_id))
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|e| MockproofError::retrieval(e.to_string()))?;
        Self::read_response(response, MockproofError::Retrieval).await
    }
}

/// Client for the asynchronous background-removal job API
pub struct RemovalClient {
    transport: Arc<dyn RemovalTransport>,
    keys: Arc<dyn ApiKeyProvider>,
    config: RemovalServiceConfig,
}

impl RemovalClient {
    /// Create a client backed by [`HttpTransport`]
    ///
    /// # Errors
    /// - Invalid configuration
    /// - HTTP client construction failure
    pub fn new(config: RemovalServiceConfig, keys: Arc<dyn ApiKeyProvider>) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(HttpTransport::new(&config)?);
        Ok(Self {
            transport,
            keys,
            config,
        })
    }

    /// Create a client with an injected transport (used by tests and by hosts
    /// that tunnel requests through their own backend)
    ///
    /// # Errors
    /// - Invalid configuration
    pub fn with_transport(
        config: RemovalServiceConfig,
        keys: Arc<dyn ApiKeyProvider>,
        transport: Arc<dyn RemovalTransport>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            keys,
            config,
        })
    }

    /// Service configuration in effect
    #[must_use]
    pub fn config(&self) -> &RemovalServiceConfig {
        &self.config
    }

    /// Run one upload through the full removal protocol and return its cutout.
    ///
    /// Stages, in order: credential resolution, pre-flight `GET /`, multipart
    /// submit, bounded status polling at the configured interval, result
    /// fetch. Each stage failure maps to its own error variant; the pre-flight
    /// failing means the image is never submitted.
    ///
    /// # Errors
    /// - [`MockproofError::MissingCredential`] before any network call
    /// - [`MockproofError::Connectivity`] on pre-flight failure
    /// - [`MockproofError::Upload`] on a rejected submission
    /// - [`MockproofError::StatusCheck`] on a failed poll request
    /// - [`MockproofError::ProcessingFailed`] on a non-"completed" terminal status
    /// - [`MockproofError::Timeout`] when the poll budget is exhausted
    /// - [`MockproofError::Retrieval`] on a failed result fetch
    /// - [`MockproofError::Image`] when the fetched payload does not decode
    #[instrument(skip(self, upload), fields(filename = %upload.filename))]
    pub async fn submit(&self, upload: &Upload) -> Result<CutoutImage> {
        let api_key = self.keys.api_key()?;

        let preflight = self.transport.check_service(&api_key).await?;
        if !preflight.is_success() {
            return Err(MockproofError::connectivity(format!(
                "pre-flight check returned HTTP {}",
                preflight.status
            )));
        }
        debug!("pre-flight check passed");

        let submitted = self
            .transport
            .submit_image(&api_key, upload.bytes.clone(), &upload.filename)
            .await?;
        if !submitted.is_success() {
            return Err(MockproofError::upload(
                submitted.status,
                submitted.body_text(),
            ));
        }
        let SubmitResponse { task_id } =
            serde_json::from_slice(&submitted.body).map_err(|e| {
                MockproofError::upload(
                    submitted.status,
                    format!("response missing task_id: {e}"),
                )
            })?;
        info!(task_id = %task_id, "image submitted for background removal");

        self.poll_until_complete(&api_key, &task_id).await?;

        let result = self.transport.fetch_result(&api_key, &task_id).await?;
        if !result.is_success() {
            return Err(MockproofError::retrieval(format!(
                "result fetch returned HTTP {}",
                result.status
            )));
        }
        info!(task_id = %task_id, bytes = result.body.len(), "cutout retrieved");

        CutoutImage::from_bytes(task_id, upload.filename.clone(), result.body)
    }

    /// Poll the task-status endpoint until the job leaves "processing".
    ///
    /// Waits `poll_interval` between polls and gives up after
    /// `max_poll_attempts` consecutive "processing" responses.
    async fn poll_until_complete(&self, api_key: &str, task_id: &str) -> Result<()> {
        let mut attempts: u32 = 0;
        loop {
            let response = self.transport.task_status(api_key, task_id).await?;
            if !response.is_success() {
                return Err(MockproofError::status_check(format!(
                    "status check returned HTTP {}",
                    response.status
                )));
            }
            let parsed: StatusResponse = serde_json::from_slice(&response.body)
                .map_err(|e| MockproofError::status_check(format!("malformed status body: {e}")))?;

            match TaskStatus::from_status_str(&parsed.status) {
                TaskStatus::Completed => return Ok(()),
                TaskStatus::Terminal(status) => {
                    return Err(MockproofError::processing_failed(status));
                },
                TaskStatus::Processing => {
                    attempts += 1;
                    if attempts >= self.config.max_poll_attempts {
                        return Err(MockproofError::Timeout {
                            attempts,
                            interval_ms: self.config.poll_interval.as_millis() as u64,
                        });
                    }
                    debug!(task_id = %task_id, attempts, "task still processing");
                    tokio::time::sleep(self.config.poll_interval).await;
                },
            }
        }
    }
}
