//! Authenticated Request Gateway.
//!
//! Every outbound call goes through [`Gateway`]. It reads the bearer token from the
//! [`SessionProvider`] at call time, sends the request exactly once, and turns the
//! response into either the caller's schema type or an [`ApiError`].

use reqwest::{Method, multipart};
use serde::{Serialize, de::DeserializeOwned};
use tracing::Instrument;
use uuid::Uuid;

use crate::auth::{TokenFreshness, inspect_access_token};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::models::Upload;
use crate::session::SessionProvider;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// RequestBody
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartForm),
}

impl RequestBody {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))
    }
}

/// FormPart
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, upload: Upload },
}

/// MultipartForm
///
/// Owned description of a `multipart/form-data` body. Converted into a reqwest form only
/// when the request is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(mut self, name: impl Into<String>, upload: Upload) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            upload,
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    fn into_reqwest(self) -> Result<multipart::Form, ApiError> {
        let mut form = multipart::Form::new();
        for part in self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name, value),
                FormPart::File { name, upload } => {
                    let file = multipart::Part::bytes(upload.bytes)
                        .file_name(upload.file_name)
                        .mime_str(&upload.mime_type)
                        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
                    form.part(name, file)
                }
            };
        }
        Ok(form)
    }
}

/// Gateway
///
/// Cheap to clone; clones share the underlying connection pool and session provider.
#[derive(Clone)]
pub struct Gateway {
    client: reqwest::Client,
    base_url: String,
    session: SessionProvider,
}

impl Gateway {
    /// Builds the HTTP client. No retry or backoff layer is installed: every call is sent
    /// once, so a non-idempotent POST is never duplicated.
    pub fn new(config: &ClientConfig, session: SessionProvider) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SessionProvider {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// send
    ///
    /// Authenticated call decoded into `T`. Fails with `Unauthenticated` before any I/O
    /// when there is no usable token.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<T, ApiError> {
        let token = self.bearer()?;
        let bytes = self.dispatch(method, path, Some(&token), body).await?;
        decode(path, &bytes)
    }

    /// execute
    ///
    /// Authenticated call whose response body is ignored (DELETE and similar).
    pub async fn execute(&self, method: Method, path: &str, body: RequestBody) -> Result<(), ApiError> {
        let token = self.bearer()?;
        self.dispatch(method, path, Some(&token), body).await?;
        Ok(())
    }

    /// Unauthenticated call for the login, registration and logout endpoints.
    pub async fn send_anonymous<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<T, ApiError> {
        let bytes = self.dispatch(method, path, None, body).await?;
        decode(path, &bytes)
    }

    /// Call authenticated with a token that is not yet part of the session (the login
    /// flow resolves the role before persisting anything).
    pub(crate) async fn send_with_token<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: RequestBody,
    ) -> Result<T, ApiError> {
        let bytes = self.dispatch(method, path, Some(token), body).await?;
        decode(path, &bytes)
    }

    fn bearer(&self) -> Result<String, ApiError> {
        let token = self
            .session
            .current()
            .and_then(|session| session.access_token)
            .ok_or(ApiError::Unauthenticated)?;

        if inspect_access_token(&token) == TokenFreshness::Expired {
            tracing::info!("access token expired, request not sent");
            return Err(ApiError::Unauthenticated);
        }
        Ok(token)
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: RequestBody,
    ) -> Result<Vec<u8>, ApiError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "api_request",
            method = %method,
            path = %path,
            req_id = %request_id,
        );

        async move {
            let mut request = self
                .client
                .request(method, self.url(path))
                .header(REQUEST_ID_HEADER, request_id.to_string());

            if let Some(token) = token {
                request = request.bearer_auth(token);
            }

            request = match body {
                RequestBody::Empty => request,
                RequestBody::Json(value) => request.json(&value),
                RequestBody::Multipart(form) => request.multipart(form.into_reqwest()?),
            };

            let response = request.send().await.map_err(|e| {
                tracing::warn!(error = %e, "request could not be delivered");
                ApiError::from(e)
            })?;

            let status = response.status();
            if !status.is_success() {
                tracing::warn!(status = status.as_u16(), "request failed");
                return Err(ApiError::RequestFailed {
                    status: status.as_u16(),
                });
            }

            let bytes = response.bytes().await?;
            tracing::debug!(status = status.as_u16(), len = bytes.len(), "request succeeded");
            Ok::<Vec<u8>, ApiError>(bytes.to_vec())
        }
        .instrument(span)
        .await
    }
}

/// Decodes a 2xx body against the caller's schema. An empty body (204) is read as JSON
/// `null`, which `()` and `Option<T>` accept.
fn decode<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> Result<T, ApiError> {
    let body: &[u8] = if bytes.is_empty() { b"null" } else { bytes };
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(path, error = %e, "response does not match schema");
        ApiError::MalformedResponse {
            path: path.to_string(),
            reason: e.to_string(),
        }
    })
}
