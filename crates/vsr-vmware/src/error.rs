//! Error types for the vSphere directory client.

use std::fmt;

/// Categorised error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmwareErrorKind {
    /// vCenter / ESXi unreachable or session expired
    ConnectionError,
    /// Authentication failed (401 / InvalidLogin)
    AuthenticationError,
    /// Resource not found (404 / ManagedObjectNotFound)
    NotFound,
    /// HTTP / REST API error with status code
    ApiError(u16),
    /// Timeout
    Timeout,
    /// Permission denied (403 / NoPermission)
    AccessDenied,
    /// Host rejected a configuration change (vim `HostConfigFault`)
    ConfigFault,
    /// Any other vim25 SOAP fault
    SoapFault,
    /// JSON / XML parse error
    ParseError,
    /// Generic
    Other,
}

/// Crate error type carrying a kind + human-readable message.
///
/// `message` holds the server's native text where one was returned, so callers
/// can surface it verbatim.
#[derive(Debug, Clone)]
pub struct VmwareError {
    pub kind: VmwareErrorKind,
    pub message: String,
}

impl VmwareError {
    pub fn new(kind: VmwareErrorKind, msg: impl Into<String>) -> Self {
        Self { kind, message: msg.into() }
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::ConnectionError, msg)
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::AuthenticationError, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::NotFound, msg)
    }

    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::ApiError(status), msg)
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::ParseError, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::Timeout, msg)
    }

    pub fn config_fault(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::ConfigFault, msg)
    }

    pub fn soap_fault(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::SoapFault, msg)
    }
}

impl fmt::Display for VmwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

impl std::error::Error for VmwareError {}

impl From<reqwest::Error> for VmwareError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(format!("HTTP timeout: {e}"))
        } else if e.is_connect() {
            Self::connection(format!("Connection failed: {e}"))
        } else {
            Self::new(VmwareErrorKind::Other, format!("HTTP error: {e}"))
        }
    }
}

impl From<serde_json::Error> for VmwareError {
    fn from(e: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {e}"))
    }
}

impl From<quick_xml::Error> for VmwareError {
    fn from(e: quick_xml::Error) -> Self {
        Self::parse(format!("XML parse error: {e}"))
    }
}

/// Convenience alias.
pub type VmwareResult<T> = Result<T, VmwareError>;
