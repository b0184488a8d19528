//! In-memory directory for tests and dry demos.
//!
//! `SimulatedDirectory` implements every Directory Client trait against a
//! small inventory held behind a tokio `Mutex`. Faults can be injected per
//! host or for the tagging service, and every call is recorded so tests can
//! assert on exactly what was issued.

use crate::directory::{HostDirectory, HostMutator, TagDirectory, TagMutator};
use crate::error::{VmwareError, VmwareResult};
use crate::types::*;
use tokio::sync::Mutex;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Call log
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One recorded call against the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryCall {
    HostsInCluster(String),
    HostsByName(Vec<String>),
    GraphicsConfig(String),
    UpdateGraphicsConfig { host: String, config: GraphicsConfig },
    RestartService { host: String, service_id: String },
    ListTags,
    ListCategories,
    CreateTag(TagCreateSpec),
    UpdateTag { tag_id: String, spec: TagUpdateSpec },
    DeleteTag(String),
}

impl DirectoryCall {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::UpdateGraphicsConfig { .. }
                | Self::RestartService { .. }
                | Self::CreateTag(_)
                | Self::UpdateTag { .. }
                | Self::DeleteTag(_)
        )
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  State
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct SimHost {
    host: ManagedHost,
    config: GraphicsConfig,
    update_fault: Option<VmwareError>,
    restart_fault: Option<VmwareError>,
}

#[derive(Default)]
struct SimState {
    hosts: Vec<SimHost>,
    clusters: Vec<(String, Vec<String>)>,
    tags: Vec<TagInfo>,
    categories: Vec<CategoryInfo>,
    next_tag: u64,
    created_tag_id: Option<String>,
    tag_fault: Option<VmwareError>,
    calls: Vec<DirectoryCall>,
}

impl SimState {
    fn host(&self, name: &str) -> VmwareResult<&SimHost> {
        self.hosts
            .iter()
            .find(|h| h.host.name == name)
            .ok_or_else(|| VmwareError::not_found(format!("The object 'vim.HostSystem:{name}' has already been deleted or has not been completely created")))
    }

    fn host_mut(&mut self, name: &str) -> VmwareResult<&mut SimHost> {
        self.hosts
            .iter_mut()
            .find(|h| h.host.name == name)
            .ok_or_else(|| VmwareError::not_found(format!("The object 'vim.HostSystem:{name}' has already been deleted or has not been completely created")))
    }

    fn tag_fault(&self) -> VmwareResult<()> {
        match &self.tag_fault {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

/// In-memory vSphere inventory.
#[derive(Default)]
pub struct SimulatedDirectory {
    state: Mutex<SimState>,
}

impl SimulatedDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Setup ───────────────────────────────────────────────────────

    /// Add a host with its live graphics configuration.
    pub fn with_host(
        mut self,
        name: impl Into<String>,
        connection_state: HostConnectionState,
        config: GraphicsConfig,
    ) -> Self {
        let state = self.state.get_mut();
        let n = state.hosts.len() + 10;
        state.hosts.push(SimHost {
            host: ManagedHost {
                name: name.into(),
                moref: MoRef::new("HostSystem", format!("host-{n}")),
                connection_state,
                graphics_manager: Some(MoRef::new("HostGraphicsManager", format!("graphicsManager-{n}"))),
                service_system: Some(MoRef::new("HostServiceSystem", format!("serviceSystem-{n}"))),
            },
            config,
            update_fault: None,
            restart_fault: None,
        });
        self
    }

    /// Add a cluster whose members are the named hosts, in this order.
    pub fn with_cluster(mut self, name: impl Into<String>, hosts: &[&str]) -> Self {
        self.state
            .get_mut()
            .clusters
            .push((name.into(), hosts.iter().map(|h| h.to_string()).collect()));
        self
    }

    /// Make `UpdateGraphicsConfig` on this host fail.
    pub fn with_update_fault(mut self, host: &str, fault: VmwareError) -> Self {
        if let Some(h) = self.state.get_mut().hosts.iter_mut().find(|h| h.host.name == host) {
            h.update_fault = Some(fault);
        }
        self
    }

    /// Make `RestartService` on this host fail.
    pub fn with_restart_fault(mut self, host: &str, fault: VmwareError) -> Self {
        if let Some(h) = self.state.get_mut().hosts.iter_mut().find(|h| h.host.name == host) {
            h.restart_fault = Some(fault);
        }
        self
    }

    pub fn with_category(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.state.get_mut().categories.push(CategoryInfo {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            cardinality: Some("MULTIPLE".into()),
            associable_types: Vec::new(),
            used_by: Vec::new(),
        });
        self
    }

    pub fn with_tag(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category_id: impl Into<String>,
    ) -> Self {
        self.state.get_mut().tags.push(TagInfo {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category_id: category_id.into(),
            used_by: Vec::new(),
        });
        self
    }

    /// Force the ID returned by `create_tag` (an empty string simulates a
    /// service that answered without one).
    pub fn with_created_tag_id(mut self, id: impl Into<String>) -> Self {
        self.state.get_mut().created_tag_id = Some(id.into());
        self
    }

    /// Make every mutating tagging call fail.
    pub fn with_tag_fault(mut self, fault: VmwareError) -> Self {
        self.state.get_mut().tag_fault = Some(fault);
        self
    }

    // ── Inspection ──────────────────────────────────────────────────

    /// Every call issued so far, in order.
    pub async fn calls(&self) -> Vec<DirectoryCall> {
        self.state.lock().await.calls.clone()
    }

    /// Only the mutating calls issued so far.
    pub async fn mutations(&self) -> Vec<DirectoryCall> {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.is_mutation())
            .cloned()
            .collect()
    }

    /// Current graphics configuration of a host.
    pub async fn host_config(&self, name: &str) -> Option<GraphicsConfig> {
        let state = self.state.lock().await;
        state.hosts.iter().find(|h| h.host.name == name).map(|h| h.config.clone())
    }

    /// Current tags.
    pub async fn tags(&self) -> Vec<TagInfo> {
        self.state.lock().await.tags.clone()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Trait impls
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl HostDirectory for SimulatedDirectory {
    async fn hosts_in_cluster(&self, cluster_name: &str) -> VmwareResult<Option<Vec<ManagedHost>>> {
        let mut state = self.state.lock().await;
        state.calls.push(DirectoryCall::HostsInCluster(cluster_name.to_string()));
        let Some((_, members)) = state.clusters.iter().find(|(n, _)| n == cluster_name) else {
            return Ok(None);
        };
        let hosts = members
            .iter()
            .filter_map(|m| state.hosts.iter().find(|h| &h.host.name == m))
            .map(|h| h.host.clone())
            .collect();
        Ok(Some(hosts))
    }

    async fn hosts_by_name(&self, names: &[String]) -> VmwareResult<Vec<ManagedHost>> {
        let mut state = self.state.lock().await;
        state.calls.push(DirectoryCall::HostsByName(names.to_vec()));
        let mut found: Vec<ManagedHost> = Vec::new();
        for name in names {
            if found.iter().any(|h| &h.name == name) {
                continue;
            }
            if let Some(h) = state.hosts.iter().find(|h| &h.host.name == name) {
                found.push(h.host.clone());
            }
        }
        Ok(found)
    }

    async fn graphics_config(&self, host: &ManagedHost) -> VmwareResult<GraphicsConfig> {
        let mut state = self.state.lock().await;
        state.calls.push(DirectoryCall::GraphicsConfig(host.name.clone()));
        Ok(state.host(&host.name)?.config.clone())
    }
}

#[async_trait::async_trait]
impl HostMutator for SimulatedDirectory {
    async fn update_graphics_config(&self, host: &ManagedHost, config: &GraphicsConfig) -> VmwareResult<()> {
        let mut state = self.state.lock().await;
        state.calls.push(DirectoryCall::UpdateGraphicsConfig {
            host: host.name.clone(),
            config: config.clone(),
        });
        let sim = state.host_mut(&host.name)?;
        if let Some(fault) = &sim.update_fault {
            return Err(fault.clone());
        }
        sim.config = config.clone();
        Ok(())
    }

    async fn restart_service(&self, host: &ManagedHost, service_id: &str) -> VmwareResult<()> {
        let mut state = self.state.lock().await;
        state.calls.push(DirectoryCall::RestartService {
            host: host.name.clone(),
            service_id: service_id.to_string(),
        });
        match &state.host(&host.name)?.restart_fault {
            Some(fault) => Err(fault.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl TagDirectory for SimulatedDirectory {
    async fn list_tags(&self) -> VmwareResult<Vec<TagInfo>> {
        let mut state = self.state.lock().await;
        state.calls.push(DirectoryCall::ListTags);
        Ok(state.tags.clone())
    }

    async fn list_categories(&self) -> VmwareResult<Vec<CategoryInfo>> {
        let mut state = self.state.lock().await;
        state.calls.push(DirectoryCall::ListCategories);
        Ok(state.categories.clone())
    }
}

#[async_trait::async_trait]
impl TagMutator for SimulatedDirectory {
    async fn create_tag(&self, spec: &TagCreateSpec) -> VmwareResult<String> {
        let mut state = self.state.lock().await;
        state.calls.push(DirectoryCall::CreateTag(spec.clone()));
        state.tag_fault()?;

        if !state.categories.iter().any(|c| c.id == spec.category_id) {
            return Err(VmwareError::api(
                404,
                format!("Category with id {} does not exist.", spec.category_id),
            ));
        }
        if state
            .tags
            .iter()
            .any(|t| t.name == spec.name && t.category_id == spec.category_id)
        {
            return Err(VmwareError::api(
                400,
                format!("Tag with name {} already exists in category {}.", spec.name, spec.category_id),
            ));
        }

        state.next_tag += 1;
        let id = match &state.created_tag_id {
            Some(id) => id.clone(),
            None => format!("urn:vmomi:InventoryServiceTag:sim-{}:GLOBAL", state.next_tag),
        };
        if !id.is_empty() {
            state.tags.push(TagInfo {
                id: id.clone(),
                name: spec.name.clone(),
                description: spec.description.clone(),
                category_id: spec.category_id.clone(),
                used_by: Vec::new(),
            });
        }
        Ok(id)
    }

    async fn update_tag(&self, tag_id: &str, spec: &TagUpdateSpec) -> VmwareResult<()> {
        let mut state = self.state.lock().await;
        state.calls.push(DirectoryCall::UpdateTag {
            tag_id: tag_id.to_string(),
            spec: spec.clone(),
        });
        state.tag_fault()?;
        let tag = state
            .tags
            .iter_mut()
            .find(|t| t.id == tag_id)
            .ok_or_else(|| VmwareError::api(404, format!("Tag with id {tag_id} does not exist.")))?;
        if let Some(d) = &spec.description {
            tag.description = d.clone();
        }
        Ok(())
    }

    async fn delete_tag(&self, tag_id: &str) -> VmwareResult<()> {
        let mut state = self.state.lock().await;
        state.calls.push(DirectoryCall::DeleteTag(tag_id.to_string()));
        state.tag_fault()?;
        let before = state.tags.len();
        state.tags.retain(|t| t.id != tag_id);
        if state.tags.len() == before {
            return Err(VmwareError::api(404, format!("Tag with id {tag_id} does not exist.")));
        }
        Ok(())
    }
}
