//! Shared types for vSphere host and tag management.

use crate::error::{VmwareError, VmwareErrorKind, VmwareResult};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Connection / Config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Top-level configuration for connecting to a vCenter / ESXi host.
#[derive(Debug, Clone)]
pub struct VsphereConfig {
    /// vCenter or ESXi hostname / IP (e.g. "vcenter.lab.local")
    pub host: String,
    /// Port (default 443)
    pub port: u16,
    /// Username (e.g. "administrator@vsphere.local")
    pub username: String,
    /// Password
    pub password: SecretString,
    /// Skip TLS certificate verification (self-signed labs)
    pub insecure: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

fn default_port() -> u16 { 443 }
fn default_timeout() -> u64 { 30 }

impl VsphereConfig {
    pub fn new(host: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            username: username.into(),
            password: SecretString::new(password.into()),
            insecure: false,
            timeout_secs: default_timeout(),
        }
    }

    /// `https://{host}:{port}`
    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.host, self.port)
    }

    /// Reject host values that cannot form an HTTPS URL.
    pub fn validate(&self) -> VmwareResult<()> {
        if self.host.trim().is_empty() {
            return Err(VmwareError::new(VmwareErrorKind::Other, "vCenter hostname is empty"));
        }
        let url = url::Url::parse(&self.base_url())
            .map_err(|e| VmwareError::new(VmwareErrorKind::Other, format!("Invalid vCenter address '{}': {e}", self.host)))?;
        if url.host_str().is_none() || url.path() != "/" {
            return Err(VmwareError::new(
                VmwareErrorKind::Other,
                format!("Invalid vCenter address '{}'", self.host),
            ));
        }
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Managed object references
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// vim25 managed-object reference (e.g. `HostSystem:host-42`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl MoRef {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self { kind: kind.into(), value: value.into() }
    }
}

impl fmt::Display for MoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Hosts
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum HostConnectionState {
    Connected,
    Disconnected,
    NotResponding,
    #[serde(other)]
    Unknown,
}

impl Default for HostConnectionState {
    fn default() -> Self { Self::Unknown }
}

impl HostConnectionState {
    /// Parse the vim25 `HostSystemConnectionState` string.
    pub fn from_vim(s: &str) -> Self {
        match s {
            "connected" => Self::Connected,
            "disconnected" => Self::Disconnected,
            "notResponding" => Self::NotResponding,
            _ => Self::Unknown,
        }
    }
}

/// An ESXi host as seen through the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedHost {
    pub name: String,
    pub moref: MoRef,
    pub connection_state: HostConnectionState,
    /// `configManager.graphicsManager`; absent on hosts without graphics support
    pub graphics_manager: Option<MoRef>,
    /// `configManager.serviceSystem`
    pub service_system: Option<MoRef>,
}

impl ManagedHost {
    pub fn is_connected(&self) -> bool {
        self.connection_state == HostConnectionState::Connected
    }
}

/// A cluster and its member hosts, in the order vCenter reports them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterInfo {
    pub name: String,
    pub moref: MoRef,
    pub hosts: Vec<MoRef>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Graphics
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `HostGraphicsConfigGraphicsType`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum GraphicsType {
    Shared,
    SharedDirect,
    /// Any value this client does not know; never equal to a desired value.
    #[serde(skip_deserializing)]
    Other,
}

impl GraphicsType {
    pub fn from_vim(s: &str) -> Self {
        match s {
            "shared" => Self::Shared,
            "sharedDirect" => Self::SharedDirect,
            _ => Self::Other,
        }
    }

    pub fn as_vim(&self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::SharedDirect => "sharedDirect",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for GraphicsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_vim())
    }
}

/// `HostGraphicsConfigSharedPassthruAssignmentPolicy`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AssignmentPolicy {
    Consolidation,
    Performance,
    #[serde(skip_deserializing)]
    Other,
}

impl AssignmentPolicy {
    pub fn from_vim(s: &str) -> Self {
        match s {
            "consolidation" => Self::Consolidation,
            "performance" => Self::Performance,
            _ => Self::Other,
        }
    }

    pub fn as_vim(&self) -> &'static str {
        match self {
            Self::Consolidation => "consolidation",
            Self::Performance => "performance",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for AssignmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_vim())
    }
}

/// Per-device graphics type override (`HostGraphicsConfigDeviceType`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceGraphicsType {
    pub device_id: String,
    pub graphics_type: String,
}

/// `HostGraphicsConfig` as read from / written to the graphics manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphicsConfig {
    pub host_default_graphics_type: GraphicsType,
    pub shared_passthru_assignment_policy: AssignmentPolicy,
    /// Carried through unchanged on update.
    #[serde(default)]
    pub device_types: Vec<DeviceGraphicsType>,
}

impl GraphicsConfig {
    pub fn new(graphics_type: GraphicsType, policy: AssignmentPolicy) -> Self {
        Self {
            host_default_graphics_type: graphics_type,
            shared_passthru_assignment_policy: policy,
            device_types: Vec::new(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Tagging
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Tag detail (GET /api/cis/tagging/tag/{id}).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: String,
    #[serde(default)]
    pub used_by: Vec<String>,
}

/// Category detail (GET /api/cis/tagging/category/{id}).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cardinality: Option<String>,
    #[serde(default)]
    pub associable_types: Vec<String>,
    #[serde(default)]
    pub used_by: Vec<String>,
}

/// Body of POST /api/cis/tagging/tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCreateSpec {
    pub name: String,
    pub description: String,
    pub category_id: String,
}

/// Body of PATCH /api/cis/tagging/tag/{id}. Only the description is mutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagUpdateSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// vAPI error body returned by the REST API on failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VapiError {
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub messages: Vec<VapiMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VapiMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub default_message: String,
}

impl VapiError {
    /// All `default_message`s joined by a space, the way the SDK renders them.
    pub fn message(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .map(|m| m.default_message.as_str())
            .filter(|m| !m.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}
