//! ESXi host inventory, graphics configuration and service control via vim25.

use crate::error::{VmwareError, VmwareResult};
use crate::soap::{method_call, moref_array, xml_escape, ObjectContent, SoapClient, XmlNode};
use crate::types::*;
use tracing::{debug, warn};

const HOST_PATHS: &[&str] = &[
    "name",
    "runtime.connectionState",
    "configManager.graphicsManager",
    "configManager.serviceSystem",
];

const CLUSTER_PATHS: &[&str] = &["name", "host"];

/// ESXi host operations.
pub struct HostManager<'a> {
    client: &'a SoapClient,
}

impl<'a> HostManager<'a> {
    pub fn new(client: &'a SoapClient) -> Self {
        Self { client }
    }

    // ── List / Find ─────────────────────────────────────────────────

    /// List all ESXi hosts in the inventory.
    pub async fn list_hosts(&self) -> VmwareResult<Vec<ManagedHost>> {
        let objects = self.collect("HostSystem", HOST_PATHS).await?;
        Ok(objects.iter().filter_map(host_from_object).collect())
    }

    /// List all clusters with their member hosts.
    pub async fn list_clusters(&self) -> VmwareResult<Vec<ClusterInfo>> {
        let objects = self.collect("ClusterComputeResource", CLUSTER_PATHS).await?;
        Ok(objects.iter().filter_map(cluster_from_object).collect())
    }

    /// Hosts of the named cluster in cluster order, or `None` when no cluster
    /// has that name.
    pub async fn hosts_in_cluster(&self, cluster_name: &str) -> VmwareResult<Option<Vec<ManagedHost>>> {
        let clusters = self.list_clusters().await?;
        let Some(cluster) = clusters.into_iter().find(|c| c.name == cluster_name) else {
            return Ok(None);
        };

        let all = self.list_hosts().await?;
        let hosts = cluster
            .hosts
            .iter()
            .filter_map(|r| all.iter().find(|h| &h.moref == r).cloned())
            .collect();
        Ok(Some(hosts))
    }

    /// Hosts matching `names` exactly, in the order the names were given.
    /// Unknown names are skipped; duplicates collapse to one entry.
    pub async fn hosts_by_name(&self, names: &[String]) -> VmwareResult<Vec<ManagedHost>> {
        let all = self.list_hosts().await?;
        let mut found: Vec<ManagedHost> = Vec::new();
        for name in names {
            if found.iter().any(|h| &h.name == name) {
                continue;
            }
            match all.iter().find(|h| &h.name == name) {
                Some(h) => found.push(h.clone()),
                None => debug!(host = %name, "no host system with this name"),
            }
        }
        Ok(found)
    }

    // ── Graphics ────────────────────────────────────────────────────

    /// Read `HostGraphicsManager.graphicsConfig`.
    pub async fn graphics_config(&self, host: &ManagedHost) -> VmwareResult<GraphicsConfig> {
        let manager = graphics_manager(host)?;
        let obj = self
            .client
            .retrieve_object_properties(&manager, &["graphicsConfig"])
            .await?
            .ok_or_else(|| VmwareError::not_found(format!("Graphics manager of host {} not found", host.name)))?;
        let val = obj
            .prop("graphicsConfig")
            .ok_or_else(|| VmwareError::not_found(format!("Host {} reports no graphics configuration", host.name)))?;
        Ok(graphics_config_from_xml(val))
    }

    /// HostGraphicsManager.UpdateGraphicsConfig.
    pub async fn update_graphics_config(
        &self,
        host: &ManagedHost,
        config: &GraphicsConfig,
    ) -> VmwareResult<()> {
        let manager = graphics_manager(host)?;
        let args = graphics_config_to_xml(config);
        self.client
            .call(&method_call("UpdateGraphicsConfig", &manager, &args))
            .await?;
        Ok(())
    }

    // ── Services ────────────────────────────────────────────────────

    /// HostServiceSystem.RestartService (e.g. `xorg`).
    pub async fn restart_service(&self, host: &ManagedHost, service_id: &str) -> VmwareResult<()> {
        let system = host
            .service_system
            .as_ref()
            .ok_or_else(|| VmwareError::not_found(format!("Host {} has no service system", host.name)))?;
        let args = format!("<id>{}</id>", xml_escape(service_id));
        self.client
            .call(&method_call("RestartService", system, &args))
            .await?;
        Ok(())
    }

    // ── Internal ────────────────────────────────────────────────────

    async fn collect(&self, kind: &str, paths: &[&str]) -> VmwareResult<Vec<ObjectContent>> {
        let view = self.client.create_container_view(kind).await?;
        let result = self.client.retrieve_view_properties(&view, kind, paths).await;
        if let Err(e) = self.client.destroy_view(&view).await {
            warn!(%view, "failed to destroy container view: {e}");
        }
        result
    }
}

fn graphics_manager(host: &ManagedHost) -> VmwareResult<MoRef> {
    host.graphics_manager
        .clone()
        .ok_or_else(|| VmwareError::not_found(format!("Host {} has no graphics manager", host.name)))
}

fn host_from_object(obj: &ObjectContent) -> Option<ManagedHost> {
    Some(ManagedHost {
        name: obj.prop_text("name")?.to_string(),
        moref: obj.obj.clone(),
        connection_state: obj
            .prop_text("runtime.connectionState")
            .map(HostConnectionState::from_vim)
            .unwrap_or_default(),
        graphics_manager: obj.prop("configManager.graphicsManager").and_then(XmlNode::moref),
        service_system: obj.prop("configManager.serviceSystem").and_then(XmlNode::moref),
    })
}

fn cluster_from_object(obj: &ObjectContent) -> Option<ClusterInfo> {
    Some(ClusterInfo {
        name: obj.prop_text("name")?.to_string(),
        moref: obj.obj.clone(),
        hosts: obj.prop("host").map(moref_array).unwrap_or_default(),
    })
}

/// Parse a `HostGraphicsConfig` value element.
pub fn graphics_config_from_xml(val: &XmlNode) -> GraphicsConfig {
    GraphicsConfig {
        host_default_graphics_type: GraphicsType::from_vim(
            val.child_text("hostDefaultGraphicsType").unwrap_or_default(),
        ),
        shared_passthru_assignment_policy: AssignmentPolicy::from_vim(
            val.child_text("sharedPassthruAssignmentPolicy").unwrap_or_default(),
        ),
        device_types: val
            .children_named("deviceType")
            .filter_map(|d| {
                Some(DeviceGraphicsType {
                    device_id: d.child_text("deviceId")?.to_string(),
                    graphics_type: d.child_text("graphicsType")?.to_string(),
                })
            })
            .collect(),
    }
}

/// Serialise a `HostGraphicsConfig` as the `config` argument of UpdateGraphicsConfig.
pub fn graphics_config_to_xml(config: &GraphicsConfig) -> String {
    let devices: String = config
        .device_types
        .iter()
        .map(|d| {
            format!(
                "<deviceType><deviceId>{}</deviceId><graphicsType>{}</graphicsType></deviceType>",
                xml_escape(&d.device_id),
                xml_escape(&d.graphics_type),
            )
        })
        .collect();
    format!(
        "<config><hostDefaultGraphicsType>{}</hostDefaultGraphicsType>\
         <sharedPassthruAssignmentPolicy>{}</sharedPassthruAssignmentPolicy>{}</config>",
        config.host_default_graphics_type.as_vim(),
        config.shared_passthru_assignment_policy.as_vim(),
        devices,
    )
}
