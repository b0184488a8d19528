//! Directory Client traits.
//!
//! Read access and mutation are separate traits so a caller can be handed
//! read-only access (check mode) without any way to reach a mutating call.
//! Implementations must be `Send + Sync`.

use crate::error::VmwareResult;
use crate::types::*;

/// Read access to ESXi hosts.
#[async_trait::async_trait]
pub trait HostDirectory: Send + Sync {
    /// Member hosts of a cluster in cluster order; `None` if no such cluster.
    async fn hosts_in_cluster(&self, cluster_name: &str) -> VmwareResult<Option<Vec<ManagedHost>>>;

    /// Hosts with exactly these names, in the given order. Unknown names are
    /// left out.
    async fn hosts_by_name(&self, names: &[String]) -> VmwareResult<Vec<ManagedHost>>;

    /// Live graphics configuration of a host.
    async fn graphics_config(&self, host: &ManagedHost) -> VmwareResult<GraphicsConfig>;
}

/// Mutating calls against ESXi hosts.
#[async_trait::async_trait]
pub trait HostMutator: Send + Sync {
    /// Replace the host's graphics configuration. May fail with
    /// [`VmwareErrorKind::ConfigFault`](crate::error::VmwareErrorKind::ConfigFault).
    async fn update_graphics_config(&self, host: &ManagedHost, config: &GraphicsConfig) -> VmwareResult<()>;

    /// Restart a host service by ID (e.g. `xorg`).
    async fn restart_service(&self, host: &ManagedHost, service_id: &str) -> VmwareResult<()>;
}

/// Read access to the tagging service.
#[async_trait::async_trait]
pub trait TagDirectory: Send + Sync {
    /// Every tag with details, in service enumeration order.
    async fn list_tags(&self) -> VmwareResult<Vec<TagInfo>>;

    /// Every category with details.
    async fn list_categories(&self) -> VmwareResult<Vec<CategoryInfo>>;
}

/// Mutating calls against the tagging service.
#[async_trait::async_trait]
pub trait TagMutator: Send + Sync {
    /// Create a tag and return its ID (may be empty if the service returned none).
    async fn create_tag(&self, spec: &TagCreateSpec) -> VmwareResult<String>;

    async fn update_tag(&self, tag_id: &str, spec: &TagUpdateSpec) -> VmwareResult<()>;

    async fn delete_tag(&self, tag_id: &str) -> VmwareResult<()>;
}
