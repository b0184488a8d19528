//! Aggregate service façade.
//!
//! `VsphereService` owns the SOAP client (host inventory / graphics) and the
//! REST client (tagging) and implements every Directory Client trait on top
//! of them. Each side is logged in on demand, so a tag run never opens a
//! SOAP session and vice versa.

use crate::directory::{HostDirectory, HostMutator, TagDirectory, TagMutator};
use crate::error::{VmwareError, VmwareResult};
use crate::host::HostManager;
use crate::soap::SoapClient;
use crate::tagging::TagManager;
use crate::types::*;
use crate::vsphere::VsphereClient;

use tracing::info;

/// Top-level service that aggregates the vSphere subsystems.
pub struct VsphereService {
    config: VsphereConfig,
    soap: Option<SoapClient>,
    rest: Option<VsphereClient>,
}

impl VsphereService {
    /// Create a new (disconnected) service.
    pub fn new(config: VsphereConfig) -> Self {
        Self { config, soap: None, rest: None }
    }

    pub fn config(&self) -> &VsphereConfig {
        &self.config
    }

    /// Whether any session is open.
    pub fn is_connected(&self) -> bool {
        self.soap.as_ref().map(|c| c.is_connected()).unwrap_or(false)
            || self.rest.as_ref().map(|c| c.is_connected()).unwrap_or(false)
    }

    fn require_soap(&self) -> VmwareResult<&SoapClient> {
        self.soap
            .as_ref()
            .filter(|c| c.is_connected())
            .ok_or_else(|| VmwareError::connection("Not connected to the vSphere SDK endpoint"))
    }

    fn require_rest(&self) -> VmwareResult<&VsphereClient> {
        self.rest
            .as_ref()
            .filter(|c| c.is_connected())
            .ok_or_else(|| VmwareError::connection("Not connected to the vSphere REST API"))
    }

    // ── Connection ──────────────────────────────────────────────────

    /// Open a vim25 SOAP session (host inventory, graphics, services).
    pub async fn connect_inventory(&mut self) -> VmwareResult<()> {
        let mut client = SoapClient::new(&self.config)?;
        client.login().await?;
        info!(host = %self.config.host, "connected to vSphere SDK endpoint");
        self.soap = Some(client);
        Ok(())
    }

    /// Open a REST session (tagging).
    pub async fn connect_tagging(&mut self) -> VmwareResult<()> {
        let mut client = VsphereClient::new(&self.config)?;
        client.login().await?;
        info!(host = %self.config.host, "connected to vSphere REST API");
        self.rest = Some(client);
        Ok(())
    }

    /// Close every open session.
    pub async fn disconnect(&mut self) -> VmwareResult<()> {
        if let Some(mut client) = self.soap.take() {
            let _ = client.logout().await;
        }
        if let Some(mut client) = self.rest.take() {
            let _ = client.logout().await;
        }
        Ok(())
    }
}

// ── Hosts ───────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl HostDirectory for VsphereService {
    async fn hosts_in_cluster(&self, cluster_name: &str) -> VmwareResult<Option<Vec<ManagedHost>>> {
        let c = self.require_soap()?;
        HostManager::new(c).hosts_in_cluster(cluster_name).await
    }

    async fn hosts_by_name(&self, names: &[String]) -> VmwareResult<Vec<ManagedHost>> {
        let c = self.require_soap()?;
        HostManager::new(c).hosts_by_name(names).await
    }

    async fn graphics_config(&self, host: &ManagedHost) -> VmwareResult<GraphicsConfig> {
        let c = self.require_soap()?;
        HostManager::new(c).graphics_config(host).await
    }
}

#[async_trait::async_trait]
impl HostMutator for VsphereService {
    async fn update_graphics_config(&self, host: &ManagedHost, config: &GraphicsConfig) -> VmwareResult<()> {
        let c = self.require_soap()?;
        HostManager::new(c).update_graphics_config(host, config).await
    }

    async fn restart_service(&self, host: &ManagedHost, service_id: &str) -> VmwareResult<()> {
        let c = self.require_soap()?;
        HostManager::new(c).restart_service(host, service_id).await
    }
}

// ── Tags ────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl TagDirectory for VsphereService {
    async fn list_tags(&self) -> VmwareResult<Vec<TagInfo>> {
        let c = self.require_rest()?;
        TagManager::new(c).list_tags().await
    }

    async fn list_categories(&self) -> VmwareResult<Vec<CategoryInfo>> {
        let c = self.require_rest()?;
        TagManager::new(c).list_categories().await
    }
}

#[async_trait::async_trait]
impl TagMutator for VsphereService {
    async fn create_tag(&self, spec: &TagCreateSpec) -> VmwareResult<String> {
        let c = self.require_rest()?;
        TagManager::new(c).create_tag(spec).await
    }

    async fn update_tag(&self, tag_id: &str, spec: &TagUpdateSpec) -> VmwareResult<()> {
        let c = self.require_rest()?;
        TagManager::new(c).update_tag(tag_id, spec).await
    }

    async fn delete_tag(&self, tag_id: &str) -> VmwareResult<()> {
        let c = self.require_rest()?;
        TagManager::new(c).delete_tag(tag_id).await
    }
}
