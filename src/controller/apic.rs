// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! REST transport to the fabric controller.
//!
//! Objects are addressed as `/api/mo/<dn>.json`:
//!
//! - `GET` reads an object; an empty `imdata` array means it does not exist
//! - `POST` with a `{class: {attributes}}` body creates or modifies it
//! - `DELETE` removes it and its subtree
//!
//! Sessions are opened with `POST /api/aaaLogin.json` and carried in the
//! session cookie. An expired session (401/403) triggers one re-login.

use std::time::Duration;

use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use super::retry::{with_retry, RetryPolicy};
use super::{Controller, ControllerError, ManagedObject};
use crate::constants::CONTROLLER_SESSION_COOKIE;
use crate::metrics;

/// Connection settings of an [`ApicClient`].
#[derive(Debug, Clone)]
pub struct ApicConfig {
    /// Base URL, e.g. `https://apic.example.net`
    pub base_url: String,
    /// Login user
    pub username: String,
    /// Login password
    pub password: String,
    /// Per-request timeout
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ImData {
    #[serde(default)]
    imdata: Vec<Value>,
}

/// Controller client speaking the REST object API.
pub struct ApicClient {
    http: HttpClient,
    config: ApicConfig,
    token: RwLock<Option<String>>,
}

impl ApicClient {
    /// Build a client. No request is made until the first call.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: ApicConfig) -> Result<Self, ControllerError> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ControllerError::Transport(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            http,
            config,
            token: RwLock::new(None),
        })
    }

    fn object_url(&self, dn: &str) -> String {
        format!(
            "{}/api/mo/{dn}.json",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Open a session and cache its token.
    async fn login(&self) -> Result<String, ControllerError> {
        let url = format!(
            "{}/api/aaaLogin.json",
            self.config.base_url.trim_end_matches('/')
        );
        let body = json!({
            "aaaUser": {
                "attributes": {"name": self.config.username, "pwd": self.config.password}
            }
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ControllerError::Transport(format!("Failed to send login to {url}: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ControllerError::Transport(format!("Failed to read login response: {e}")))?;
        if !status.is_success() {
            error!(status = %status, "Controller login failed");
            return Err(ControllerError::Rejected {
                dn: "aaaLogin".to_string(),
                status: status.as_u16(),
                text,
            });
        }

        let token = serde_json::from_str::<ImData>(&text)
            .ok()
            .and_then(|data| {
                data.imdata
                    .first()
                    .and_then(|entry| entry.pointer("/aaaLogin/attributes/token"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .ok_or_else(|| ControllerError::Transport("login response carries no token".to_string()))?;

        info!(user = %self.config.username, "Opened controller session");
        *self.token.write().await = Some(token.clone());
        Ok(token)
    }

    async fn session_token(&self) -> Result<String, ControllerError> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }
        self.login().await
    }

    /// One request with retry on transient failures and one re-login on an expired session.
    async fn controller_request(
        &self,
        method: Method,
        dn: &str,
        body: Option<&Value>,
    ) -> Result<String, ControllerError> {
        let operation = format!("{method} {dn}");
        let policy = RetryPolicy::controller();
        let result = with_retry(&policy, &operation, || {
            self.controller_request_once(method.clone(), dn, body)
        })
        .await;

        let result = match result {
            Err(ControllerError::Rejected { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16()
                    || status == StatusCode::FORBIDDEN.as_u16() =>
            {
                debug!(dn = %dn, "Controller session expired, logging in again");
                *self.token.write().await = None;
                with_retry(&policy, &operation, || {
                    self.controller_request_once(method.clone(), dn, body)
                })
                .await
            }
            other => other,
        };

        metrics::record_controller_call(method.as_str(), &result);
        result
    }

    /// Internal implementation of controller requests without retry logic.
    async fn controller_request_once(
        &self,
        method: Method,
        dn: &str,
        body: Option<&Value>,
    ) -> Result<String, ControllerError> {
        let token = self.session_token().await?;
        let url = self.object_url(dn);

        debug!(method = %method, url = %url, "HTTP request to controller");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(
                reqwest::header::COOKIE,
                format!("{CONTROLLER_SESSION_COOKIE}={token}"),
            );
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ControllerError::Transport(format!("Failed to send request to {url}: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ControllerError::Transport(format!("Failed to read response body: {e}")))?;

        if status == StatusCode::NOT_FOUND {
            return Err(ControllerError::NotFound { dn: dn.to_string() });
        }
        if !status.is_success() {
            error!(
                method = %method,
                url = %url,
                status = %status,
                error = %text,
                "Controller request failed"
            );
            return Err(ControllerError::Rejected {
                dn: dn.to_string(),
                status: status.as_u16(),
                text,
            });
        }

        Ok(text)
    }
}

#[async_trait::async_trait]
impl Controller for ApicClient {
    async fn read(&self, dn: &str) -> Result<ManagedObject, ControllerError> {
        let text = self.controller_request(Method::GET, dn, None).await?;
        let data: ImData = serde_json::from_str(&text)
            .map_err(|e| ControllerError::Transport(format!("malformed read response: {e}")))?;
        match data.imdata.first() {
            Some(entry) => ManagedObject::from_payload(entry),
            None => Err(ControllerError::NotFound { dn: dn.to_string() }),
        }
    }

    async fn create(&self, object: &ManagedObject) -> Result<(), ControllerError> {
        let payload = object.to_payload();
        self.controller_request(Method::POST, &object.dn, Some(&payload))
            .await?;
        info!(dn = %object.dn, class = %object.class, "Created controller object");
        Ok(())
    }

    async fn delete(&self, dn: &str) -> Result<(), ControllerError> {
        match self.controller_request(Method::DELETE, dn, None).await {
            Ok(_) | Err(ControllerError::NotFound { .. }) => {
                info!(dn = %dn, "Deleted controller object");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[path = "apic_tests.rs"]
mod apic_tests;
