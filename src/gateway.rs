// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request gateway: every backend call goes through here.
//!
//! Handles:
//! - Attaching the current bearer credential
//! - Refresh-and-retry on `401 Unauthorized` (at most one retry per request)
//! - Mapping non-success responses to [`ClientError::Api`]

use crate::auth::coordinator::RefreshCoordinator;
use crate::auth::store::CredentialStore;
use crate::endpoints;
use crate::error::{ClientError, Result};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, RwLock};

/// The `Authorization` header attached to every outgoing request by default.
///
/// Shared between the gateway (reader) and the credential store (writer).
#[derive(Clone, Default)]
pub struct DefaultAuthorization {
    bearer: Arc<RwLock<Option<String>>>,
}

impl DefaultAuthorization {
    pub fn set_bearer(&self, token: &str) {
        *self
            .bearer
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.to_string());
    }

    pub fn clear(&self) {
        *self
            .bearer
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    /// Current default bearer token, if any.
    pub fn bearer(&self) -> Option<String> {
        self.bearer
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// A replayable backend request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    /// Overrides the default header; set when the request is replayed.
    bearer: Option<String>,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(
            serde_json::to_value(body).map_err(|e| ClientError::Validation(e.to_string()))?,
        );
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Mark the request as already replayed once; a 401 will not be retried.
    pub fn mark_retried(mut self) -> Self {
        self.retried = true;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }
}

/// HTTP client wrapper with refresh-and-retry on authorization failure.
pub struct RequestGateway {
    http: reqwest::Client,
    base_url: String,
    authorization: DefaultAuthorization,
    store: Arc<CredentialStore>,
    coordinator: Arc<RefreshCoordinator>,
}

impl RequestGateway {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        authorization: DefaultAuthorization,
        store: Arc<CredentialStore>,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            authorization,
            store,
            coordinator,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn authorization(&self) -> &DefaultAuthorization {
        &self.authorization
    }

    /// Fail fast with [`ClientError::NotAuthenticated`] when no credential is
    /// stored. Used before calls the backend would reject anyway.
    pub fn require_credential(&self) -> Result<String> {
        self.store
            .access_token()
            .ok_or(ClientError::NotAuthenticated)
    }

    /// Send a request, returning the successful response.
    pub async fn send(&self, mut request: ApiRequest) -> Result<reqwest::Response> {
        let (response, sent_with) = self.dispatch(&request).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check_response(response).await;
        }

        if endpoints::is_auth_endpoint(&request.path) {
            tracing::debug!(path = %request.path, "401 from auth endpoint, not intercepting");
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::UnauthorizedEndpoint {
                path: request.path,
                body,
            });
        }

        if request.retried {
            return Err(ClientError::AlreadyRetried(request.path));
        }

        let token = self.recover_credential(sent_with.as_deref()).await?;

        request.retried = true;
        request.bearer = Some(token);
        tracing::debug!(path = %request.path, method = %request.method, "Retrying with renewed credential");

        let (response, _) = self.dispatch(&request).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(path = %request.path, "Still unauthorized after retry");
            return Err(ClientError::AlreadyRetried(request.path));
        }
        check_response(response).await
    }

    /// Send a request and parse the JSON response body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("JSON parse error: {}", e)))
    }

    /// Send a request whose response body is irrelevant (e.g. `204 No Content`).
    pub async fn send_empty(&self, request: ApiRequest) -> Result<()> {
        self.send(request).await.map(|_| ())
    }

    /// Obtain a token to replay an unauthorized request with.
    ///
    /// Joins an in-flight refresh if there is one. If the credential changed
    /// since the request was sent, the newer token is used without another
    /// refresh; otherwise a refresh is started.
    async fn recover_credential(&self, sent_with: Option<&str>) -> Result<String> {
        if !self.coordinator.is_refreshing() {
            if let Some(current) = self.store.access_token() {
                if sent_with != Some(current.as_str()) {
                    tracing::debug!("Credential renewed while request was in flight");
                    return Ok(current);
                }
            }
        }

        self.coordinator.refresh().await
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<(reqwest::Response, Option<String>)> {
        let url = format!("{}{}", self.base_url, request.path);
        let bearer = request
            .bearer
            .clone()
            .or_else(|| self.authorization.bearer());

        let mut builder = self.http.request(request.method.clone(), &url);
        if let Some(token) = bearer.as_deref() {
            builder = builder.bearer_auth(token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::debug!(url = %url, error = %e, "Request failed to send");
            ClientError::Transport(e.to_string())
        })?;

        Ok((response, bearer))
    }
}

/// Check response status and return error if not successful.
pub(crate) async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Api {
        status: status.as_u16(),
        body,
    })
}
