use std::sync::Arc;

use http::{Method, StatusCode, header};
use reqwest::RequestBuilder;
use reqwest::multipart::Form;
use serde::Serialize;

use crate::config::types::ApiConfig;
use crate::error::{ClientError, Result};
use crate::session::SessionHandle;

use super::response::ApiResponse;

/// Authenticated gateway to the tracker service.
///
/// Cheap to clone; every clone shares the same HTTP connection pool and the
/// same [`SessionHandle`]. The bearer token is read from the session at the
/// moment each request is built, so a 401 observed through any clone (and
/// the session clear it triggers) is seen by all of them.
#[derive(Clone)]
pub struct TransportClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    session: Arc<SessionHandle>,
}

impl std::fmt::Debug for TransportClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl TransportClient {
    pub fn new(config: &ApiConfig, session: Arc<SessionHandle>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::transport(format!("building HTTP client: {e}")))?;
        let base_url = config.normalized_base_url();
        tracing::debug!("transport: base url {base_url}");
        Ok(Self {
            http,
            base_url: base_url.into(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionHandle> {
        &self.session
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.execute(Method::GET, path, self.request(Method::GET, path)).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse> {
        let req = with_json(self.request(Method::POST, path), body);
        self.execute(Method::POST, path, req).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse> {
        let req = with_json(self.request(Method::PUT, path), body);
        self.execute(Method::PUT, path, req).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.execute(Method::DELETE, path, self.request(Method::DELETE, path)).await
    }

    /// POST a `multipart/form-data` body (file uploads). reqwest sets the
    /// content type and boundary; the bearer token is attached as usual.
    pub async fn post_multipart(&self, path: &str, form: Form) -> Result<ApiResponse> {
        let req = self.request(Method::POST, path).multipart(form);
        self.execute(Method::POST, path, req).await
    }

    /// Start a request against `path`, with the token as it is right now.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let req = self
            .http
            .request(method, &url)
            .header(header::ACCEPT, "application/json");
        match self.session.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send one request.
    ///
    /// - No response at all → `Transport`.
    /// - 401 → the session is cleared, then `Unauthorized`. No retry.
    /// - Anything else is returned as-is; mapping non-2xx into the error
    ///   taxonomy is the caller's job (it knows the fallback message and
    ///   which entity was addressed).
    async fn execute(
        &self,
        method: Method,
        path: &str,
        req: RequestBuilder,
    ) -> Result<ApiResponse> {
        let resp = req
            .send()
            .await
            .inspect_err(|e| tracing::debug!("transport: {method} {path} failed: {e}"))?;
        let status = resp.status();
        tracing::debug!("transport: {method} {path} -> {}", status.as_u16());

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("transport: {method} {path} unauthorized, clearing session");
            // The in-memory session is already gone even if the store fails.
            let _ = self.session.clear();
            return Err(ClientError::Unauthorized);
        }

        let bytes = resp.bytes().await?;
        Ok(ApiResponse::new(status, bytes.to_vec()))
    }
}

fn with_json<B: Serialize + ?Sized>(req: RequestBuilder, body: Option<&B>) -> RequestBuilder {
    match body {
        Some(body) => req.json(body),
        None => req,
    }
}
