//! vSphere Automation REST client with session-based authentication.
//!
//! Communicates with vCenter via `https://{host}/api/...`.
//! Manages session lifecycle (create / delete) and provides typed helpers.

use crate::error::{VmwareError, VmwareErrorKind, VmwareResult};
use crate::types::{VapiError, VsphereConfig};

use reqwest::{Client, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};

const SESSION_HEADER: &str = "vmware-api-session-id";

/// vSphere REST API client.
pub struct VsphereClient {
    client: Client,
    base_url: String,
    session_id: Option<String>,
    config: VsphereConfig,
}

impl VsphereClient {
    /// Build a new client from config (does NOT create a session yet).
    pub fn new(config: &VsphereConfig) -> VmwareResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VmwareError::connection(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            session_id: None,
            config: config.clone(),
        })
    }

    /// Base URL for API calls.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether we have an active session.
    pub fn is_connected(&self) -> bool {
        self.session_id.is_some()
    }

    // ── Session management ──────────────────────────────────────────

    /// Create a new API session (POST /api/session).
    pub async fn login(&mut self) -> VmwareResult<()> {
        let url = format!("{}/api/session", self.base_url);
        debug!(host = %self.config.host, user = %self.config.username, "creating REST session");

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.config.username, Some(self.config.password.expose_secret()))
            .send()
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(VmwareError::auth("Invalid credentials"));
        }

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VmwareError::api(
                status.as_u16(),
                format!("Login failed: {}", vapi_message(&body)),
            ));
        }

        // Session ID comes back as a quoted JSON string
        let session_id: String = resp.json().await.map_err(|e| {
            VmwareError::parse(format!("Failed to parse session response: {e}"))
        })?;

        self.session_id = Some(session_id);
        Ok(())
    }

    /// Delete the current session (DELETE /api/session).
    pub async fn logout(&mut self) -> VmwareResult<()> {
        if let Some(ref sid) = self.session_id {
            let url = format!("{}/api/session", self.base_url);
            let _ = self
                .client
                .delete(&url)
                .header(SESSION_HEADER, sid.as_str())
                .send()
                .await;
        }
        self.session_id = None;
        Ok(())
    }

    // ── HTTP helpers ────────────────────────────────────────────────

    fn require_session(&self) -> VmwareResult<&str> {
        self.session_id
            .as_deref()
            .ok_or_else(|| VmwareError::auth("Not logged in, no active session"))
    }

    /// GET a JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> VmwareResult<T> {
        let sid = self.require_session()?;
        let url = format!("{}{}", self.base_url, path);
        trace!(%url, "GET");
        let resp = self
            .client
            .get(&url)
            .header(SESSION_HEADER, sid)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        Self::parse_response(resp).await
    }

    /// POST with JSON body, return parsed response.
    pub async fn post<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> VmwareResult<T> {
        let sid = self.require_session()?;
        let url = format!("{}{}", self.base_url, path);
        trace!(%url, "POST");
        let resp = self
            .client
            .post(&url)
            .header(SESSION_HEADER, sid)
            .json(body)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        Self::parse_response(resp).await
    }

    /// PATCH with JSON body.
    pub async fn patch<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> VmwareResult<()> {
        let sid = self.require_session()?;
        let url = format!("{}{}", self.base_url, path);
        trace!(%url, "PATCH");
        let resp = self
            .client
            .patch(&url)
            .header(SESSION_HEADER, sid)
            .json(body)
            .send()
            .await?;
        Self::check_status(resp).await?;
        Ok(())
    }

    /// DELETE, ignoring response body.
    pub async fn delete(&self, path: &str) -> VmwareResult<()> {
        let sid = self.require_session()?;
        let url = format!("{}{}", self.base_url, path);
        trace!(%url, "DELETE");
        let resp = self
            .client
            .delete(&url)
            .header(SESSION_HEADER, sid)
            .send()
            .await?;
        Self::check_status(resp).await?;
        Ok(())
    }

    // ── Internal helpers ────────────────────────────────────────────

    async fn check_status(resp: Response) -> VmwareResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let code = status.as_u16();
        let body = resp.text().await.unwrap_or_default();
        let message = vapi_message(&body);

        match status {
            StatusCode::UNAUTHORIZED => Err(VmwareError::auth(format!("Session expired or invalid: {message}"))),
            StatusCode::FORBIDDEN => Err(VmwareError::new(VmwareErrorKind::AccessDenied, message)),
            StatusCode::NOT_FOUND => Err(VmwareError::not_found(message)),
            _ => Err(VmwareError::api(code, message)),
        }
    }

    async fn parse_response<T: DeserializeOwned>(resp: Response) -> VmwareResult<T> {
        let text = resp.text().await.map_err(|e| {
            VmwareError::parse(format!("Failed to read response body: {e}"))
        })?;

        if text.is_empty() {
            // Some endpoints return an empty body for success
            return serde_json::from_str("null").map_err(|e| {
                VmwareError::parse(format!("Cannot deserialise empty response: {e}"))
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            VmwareError::parse(format!("JSON parse error: {e}, body: {}", truncate(&text, 500)))
        })
    }
}

/// Native error text from a vAPI error body, or the raw body when it is not one.
pub fn vapi_message(body: &str) -> String {
    serde_json::from_str::<VapiError>(body)
        .ok()
        .and_then(|e| e.message())
        .unwrap_or_else(|| truncate(body, 500).to_string())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
