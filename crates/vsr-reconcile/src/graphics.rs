//! Host graphics reconciler.
//!
//! Brings `hostDefaultGraphicsType` and `sharedPassthruAssignmentPolicy` of a
//! set of ESXi hosts to a desired pair of values, optionally restarting X.Org
//! afterwards so the change takes effect. Hosts are handled one at a time in
//! resolution order.

use crate::diff::Changes;
use crate::error::{ReconcileError, ReconcileResult};
use crate::outcome::{BatchFailure, EntityOutcome, EntityResults, Execution, FailurePolicy, HostBatchReport};
use tracing::{debug, error, info, warn};
use vsr_vmware::types::{AssignmentPolicy, GraphicsConfig, GraphicsType, ManagedHost};
use vsr_vmware::{HostDirectory, HostMutator};

/// Service restarted after a graphics change.
pub const XORG_SERVICE: &str = "xorg";

pub const MSG_IN_SYNC: &str = "All Host Graphics Settings already configured";
pub const MSG_NO_HOSTS: &str = "Failed to find host system.";

/// Which hosts to manage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostTarget {
    /// Every member of the named cluster.
    Cluster(String),
    /// Hosts with exactly these names.
    Hosts(Vec<String>),
}

/// Desired state for a host graphics run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicsParams {
    pub target: HostTarget,
    pub graphics_type: GraphicsType,
    pub assignment_policy: AssignmentPolicy,
    pub restart_xorg: bool,
    pub on_host_error: FailurePolicy,
}

/// What needs doing on one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostPlan {
    /// Host is not connected; nothing can be read or changed.
    Unreachable,
    /// Live configuration already matches.
    InSync,
    /// The config to send, and which fields differ.
    Change { config: GraphicsConfig, changes: Changes },
}

/// Resolve the target set to hosts, in cluster or argument order.
pub async fn resolve_hosts<D>(directory: &D, target: &HostTarget) -> ReconcileResult<Vec<ManagedHost>>
where
    D: HostDirectory + ?Sized,
{
    let hosts = match target {
        HostTarget::Cluster(name) => directory
            .hosts_in_cluster(name)
            .await?
            .ok_or_else(|| ReconcileError::Resolution(format!("Unable to find cluster '{name}'")))?,
        HostTarget::Hosts(names) => {
            let hosts = directory.hosts_by_name(names).await?;
            for name in names {
                if !hosts.iter().any(|h| &h.name == name) {
                    warn!(host = %name, "host system not found, skipping");
                }
            }
            hosts
        }
    };

    if hosts.is_empty() {
        return Err(ReconcileError::Resolution(MSG_NO_HOSTS.to_string()));
    }
    Ok(hosts)
}

/// Compare one host's live configuration with the desired values.
pub async fn plan_host<D>(directory: &D, host: &ManagedHost, params: &GraphicsParams) -> ReconcileResult<HostPlan>
where
    D: HostDirectory + ?Sized,
{
    if !host.is_connected() {
        return Ok(HostPlan::Unreachable);
    }

    let live = directory.graphics_config(host).await?;
    let changes = Changes::new()
        .field("hostDefaultGraphicsType", &live.host_default_graphics_type, &params.graphics_type)
        .field(
            "sharedPassthruAssignmentPolicy",
            &live.shared_passthru_assignment_policy,
            &params.assignment_policy,
        );
    if changes.is_empty() {
        return Ok(HostPlan::InSync);
    }

    let mut config = live;
    config.host_default_graphics_type = params.graphics_type;
    config.shared_passthru_assignment_policy = params.assignment_policy;
    Ok(HostPlan::Change { config, changes })
}

/// A failed apply. `applied` is set when the new settings were stored and
/// only the X.Org restart failed.
struct ApplyFault {
    msg: String,
    applied: bool,
}

/// Drives one host graphics run.
pub struct GraphicsReconciler<'a, D: ?Sized> {
    directory: &'a D,
    params: &'a GraphicsParams,
}

impl<'a, D> GraphicsReconciler<'a, D>
where
    D: HostDirectory + ?Sized,
{
    pub fn new(directory: &'a D, params: &'a GraphicsParams) -> Self {
        Self { directory, params }
    }

    /// Run the batch. On failure the error carries every per-host outcome
    /// recorded so far.
    pub async fn reconcile<M>(&self, exec: Execution<'_, M>) -> Result<HostBatchReport, BatchFailure>
    where
        M: HostMutator + ?Sized,
    {
        let hosts = resolve_hosts(self.directory, &self.params.target).await?;
        info!(
            hosts = hosts.len(),
            check_mode = exec.is_check_mode(),
            "reconciling host graphics settings"
        );

        let mut results = EntityResults::new();
        for host in &hosts {
            let plan = match plan_host(self.directory, host, self.params).await {
                Ok(plan) => plan,
                Err(e) => return Err(BatchFailure::new(e, results)),
            };

            let outcome = match plan {
                HostPlan::Unreachable => {
                    warn!(host = %host.name, state = ?host.connection_state, "host not connected, skipping");
                    EntityOutcome::unchanged(format!("Host {} is disconnected and cannot be changed", host.name))
                }
                HostPlan::InSync => {
                    debug!(host = %host.name, "graphics settings already in desired state");
                    EntityOutcome::unchanged(MSG_IN_SYNC)
                }
                HostPlan::Change { config, changes } => {
                    debug!(host = %host.name, changes = %changes.summary(), "graphics settings differ");
                    match exec {
                        Execution::CheckMode => EntityOutcome::unchanged(self.preview_message()),
                        Execution::Apply(mutator) => match self.apply(mutator, host, &config).await {
                            Ok(()) => {
                                info!(host = %host.name, changes = %changes.summary(), "graphics settings changed");
                                EntityOutcome::changed(self.applied_message())
                            }
                            Err(ApplyFault { msg, applied }) => {
                                error!(host = %host.name, applied, "{msg}");
                                match self.params.on_host_error {
                                    FailurePolicy::FailFast => {
                                        return Err(BatchFailure::new(ReconcileError::ServiceFault(msg), results));
                                    }
                                    FailurePolicy::Continue if applied => EntityOutcome::changed_then_failed(msg),
                                    FailurePolicy::Continue => EntityOutcome::failed(msg),
                                }
                            }
                        },
                    }
                }
            };
            results.insert(host.name.clone(), outcome);
        }

        let failed = results.failed_count();
        if failed > 0 {
            let msg = format!(
                "Failed to configure host graphics settings on {failed} of {} host(s)",
                hosts.len()
            );
            return Err(BatchFailure::new(ReconcileError::ServiceFault(msg), results));
        }
        Ok(HostBatchReport::from_results(results))
    }

    /// Update the configuration, then restart X.Org if asked.
    async fn apply<M>(&self, mutator: &M, host: &ManagedHost, config: &GraphicsConfig) -> Result<(), ApplyFault>
    where
        M: HostMutator + ?Sized,
    {
        let fail = |applied: bool| {
            move |e: vsr_vmware::VmwareError| ApplyFault {
                msg: format!(
                    "Failed to configure host graphics settings for host {} due to: {}",
                    host.name, e.message
                ),
                applied,
            }
        };
        mutator.update_graphics_config(host, config).await.map_err(fail(false))?;
        if self.params.restart_xorg {
            mutator.restart_service(host, XORG_SERVICE).await.map_err(fail(true))?;
        }
        Ok(())
    }

    fn settings(&self) -> String {
        format!(
            "hostDefaultGraphicsType = '{}', sharedPassthruAssignmentPolicy = '{}'",
            self.params.graphics_type, self.params.assignment_policy
        )
    }

    fn preview_message(&self) -> String {
        let restart = if self.params.restart_xorg { "would be" } else { "would not be" };
        format!(
            "New host graphics settings would be changed to: {}. X.Org {restart} restarted.",
            self.settings()
        )
    }

    fn applied_message(&self) -> String {
        let restart = if self.params.restart_xorg { "was" } else { "was not" };
        format!(
            "New host graphics settings changed to: {}. X.Org {restart} restarted.",
            self.settings()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsr_vmware::simulated::DirectoryCall;
    use vsr_vmware::types::{DeviceGraphicsType, HostConnectionState};
    use vsr_vmware::{SimulatedDirectory, VmwareError};

    fn cfg(t: GraphicsType, p: AssignmentPolicy) -> GraphicsConfig {
        GraphicsConfig::new(t, p)
    }

    fn params(target: HostTarget) -> GraphicsParams {
        GraphicsParams {
            target,
            graphics_type: GraphicsType::SharedDirect,
            assignment_policy: AssignmentPolicy::Performance,
            restart_xorg: true,
            on_host_error: FailurePolicy::FailFast,
        }
    }

    fn hosts(names: &[&str]) -> HostTarget {
        HostTarget::Hosts(names.iter().map(|n| n.to_string()).collect())
    }

    fn lab() -> SimulatedDirectory {
        SimulatedDirectory::new()
            .with_host(
                "esxi01",
                HostConnectionState::Connected,
                cfg(GraphicsType::SharedDirect, AssignmentPolicy::Performance),
            )
            .with_host(
                "esxi02",
                HostConnectionState::Connected,
                cfg(GraphicsType::Shared, AssignmentPolicy::Performance),
            )
            .with_host(
                "esxi03",
                HostConnectionState::Disconnected,
                cfg(GraphicsType::Shared, AssignmentPolicy::Consolidation),
            )
            .with_host(
                "esxi04",
                HostConnectionState::Connected,
                cfg(GraphicsType::Shared, AssignmentPolicy::Consolidation),
            )
            .with_cluster("gpu", &["esxi04", "esxi01", "esxi02"])
            .with_cluster("empty", &[])
    }

    #[tokio::test]
    async fn matching_config_is_left_alone() {
        let dir = lab();
        let p = params(hosts(&["esxi01"]));
        let report = GraphicsReconciler::new(&dir, &p)
            .reconcile(Execution::Apply(&dir))
            .await
            .unwrap();

        assert!(!report.changed);
        assert_eq!(report.results.get("esxi01").unwrap(), &EntityOutcome::unchanged(MSG_IN_SYNC));
        assert!(dir.mutations().await.is_empty());
    }

    #[tokio::test]
    async fn check_mode_previews_without_mutating() {
        let dir = lab();
        let p = params(hosts(&["esxi02"]));
        let report = GraphicsReconciler::new(&dir, &p)
            .reconcile::<SimulatedDirectory>(Execution::CheckMode)
            .await
            .unwrap();

        assert!(!report.changed);
        let out = report.results.get("esxi02").unwrap();
        assert!(!out.changed);
        assert_eq!(
            out.msg,
            "New host graphics settings would be changed to: hostDefaultGraphicsType = 'sharedDirect', \
             sharedPassthruAssignmentPolicy = 'performance'. X.Org would be restarted."
        );
        assert!(dir.mutations().await.is_empty());
    }

    #[tokio::test]
    async fn check_mode_preview_mentions_no_restart() {
        let dir = lab();
        let mut p = params(hosts(&["esxi02"]));
        p.restart_xorg = false;
        let report = GraphicsReconciler::new(&dir, &p)
            .reconcile::<SimulatedDirectory>(Execution::CheckMode)
            .await
            .unwrap();
        assert!(report.results.get("esxi02").unwrap().msg.ends_with("X.Org would not be restarted."));
    }

    #[tokio::test]
    async fn apply_updates_and_restarts_xorg() {
        let dir = lab();
        let p = params(hosts(&["esxi02"]));
        let report = GraphicsReconciler::new(&dir, &p)
            .reconcile(Execution::Apply(&dir))
            .await
            .unwrap();

        assert!(report.changed);
        let out = report.results.get("esxi02").unwrap();
        assert!(out.changed);
        assert!(out.msg.starts_with("New host graphics settings changed to: hostDefaultGraphicsType = 'sharedDirect'"));
        assert!(out.msg.ends_with("X.Org was restarted."));

        let mutations = dir.mutations().await;
        assert_eq!(mutations.len(), 2);
        assert_eq!(
            mutations[1],
            DirectoryCall::RestartService { host: "esxi02".into(), service_id: "xorg".into() }
        );
        assert_eq!(
            dir.host_config("esxi02").await.unwrap().host_default_graphics_type,
            GraphicsType::SharedDirect
        );
    }

    #[tokio::test]
    async fn apply_without_restart_issues_single_update() {
        let dir = lab();
        let mut p = params(hosts(&["esxi02"]));
        p.restart_xorg = false;
        let report = GraphicsReconciler::new(&dir, &p)
            .reconcile(Execution::Apply(&dir))
            .await
            .unwrap();

        assert!(report.results.get("esxi02").unwrap().msg.ends_with("X.Org was not restarted."));
        let mutations = dir.mutations().await;
        assert_eq!(mutations.len(), 1);
        assert!(matches!(mutations[0], DirectoryCall::UpdateGraphicsConfig { .. }));
    }

    #[tokio::test]
    async fn device_overrides_survive_update() {
        let mut live = cfg(GraphicsType::Shared, AssignmentPolicy::Consolidation);
        live.device_types.push(DeviceGraphicsType {
            device_id: "0000:3b:00.0".into(),
            graphics_type: "sharedDirect".into(),
        });
        let dir = SimulatedDirectory::new().with_host("esxi09", HostConnectionState::Connected, live);
        let p = params(hosts(&["esxi09"]));
        GraphicsReconciler::new(&dir, &p)
            .reconcile(Execution::Apply(&dir))
            .await
            .unwrap();

        let after = dir.host_config("esxi09").await.unwrap();
        assert_eq!(after.shared_passthru_assignment_policy, AssignmentPolicy::Performance);
        assert_eq!(after.device_types.len(), 1);
    }

    #[tokio::test]
    async fn disconnected_host_is_reported_not_failed() {
        let dir = lab();
        let p = params(hosts(&["esxi03", "esxi02"]));
        let report = GraphicsReconciler::new(&dir, &p)
            .reconcile(Execution::Apply(&dir))
            .await
            .unwrap();

        assert_eq!(
            report.results.get("esxi03").unwrap().msg,
            "Host esxi03 is disconnected and cannot be changed"
        );
        assert!(report.results.get("esxi02").unwrap().changed);
        assert!(report.changed);
        assert!(!dir
            .calls()
            .await
            .contains(&DirectoryCall::GraphicsConfig("esxi03".into())));
    }

    #[tokio::test]
    async fn cluster_hosts_processed_in_cluster_order() {
        let dir = lab();
        let p = params(HostTarget::Cluster("gpu".into()));
        let report = GraphicsReconciler::new(&dir, &p)
            .reconcile(Execution::Apply(&dir))
            .await
            .unwrap();
        assert_eq!(report.results.names(), vec!["esxi04", "esxi01", "esxi02"]);
        assert!(report.changed);
    }

    #[tokio::test]
    async fn unknown_cluster_is_a_resolution_error() {
        let dir = lab();
        let p = params(HostTarget::Cluster("nope".into()));
        let err = GraphicsReconciler::new(&dir, &p)
            .reconcile(Execution::Apply(&dir))
            .await
            .unwrap_err();
        assert!(matches!(err.error, ReconcileError::Resolution(_)));
        assert!(err.results.is_empty());
    }

    #[tokio::test]
    async fn empty_cluster_finds_no_host() {
        let dir = lab();
        let p = params(HostTarget::Cluster("empty".into()));
        let err = GraphicsReconciler::new(&dir, &p)
            .reconcile(Execution::Apply(&dir))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), MSG_NO_HOSTS);
    }

    #[tokio::test]
    async fn unknown_host_names_are_skipped() {
        let dir = lab();
        let p = params(hosts(&["ghost", "esxi01"]));
        let report = GraphicsReconciler::new(&dir, &p)
            .reconcile(Execution::Apply(&dir))
            .await
            .unwrap();
        assert_eq!(report.results.names(), vec!["esxi01"]);

        let p = params(hosts(&["ghost"]));
        let err = GraphicsReconciler::new(&dir, &p)
            .reconcile(Execution::Apply(&dir))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), MSG_NO_HOSTS);
    }

    #[tokio::test]
    async fn config_fault_aborts_the_batch() {
        let dir = lab().with_update_fault("esxi04", VmwareError::config_fault("A general system error occurred: vGPU busy"));
        let p = params(HostTarget::Cluster("gpu".into()));
        let err = GraphicsReconciler::new(&dir, &p)
            .reconcile(Execution::Apply(&dir))
            .await
            .unwrap_err();

        assert!(matches!(err.error, ReconcileError::ServiceFault(_)));
        assert_eq!(
            err.to_string(),
            "Failed to configure host graphics settings for host esxi04 due to: A general system error occurred: vGPU busy"
        );
        // esxi02 comes later in the cluster and must not have been touched.
        assert!(!dir
            .calls()
            .await
            .contains(&DirectoryCall::GraphicsConfig("esxi02".into())));
        assert!(err.results.is_empty());
    }

    #[tokio::test]
    async fn fail_fast_keeps_earlier_results() {
        let dir = lab().with_update_fault("esxi02", VmwareError::config_fault("bad"));
        let p = params(hosts(&["esxi01", "esxi02", "esxi04"]));
        let err = GraphicsReconciler::new(&dir, &p)
            .reconcile(Execution::Apply(&dir))
            .await
            .unwrap_err();
        assert_eq!(err.results.names(), vec!["esxi01"]);
        assert!(dir.host_config("esxi04").await.unwrap().host_default_graphics_type == GraphicsType::Shared);
    }

    #[tokio::test]
    async fn restart_fault_is_reported_like_update_fault() {
        let dir = lab().with_restart_fault("esxi02", VmwareError::soap_fault("Service xorg not running"));
        let p = params(hosts(&["esxi02"]));
        let err = GraphicsReconciler::new(&dir, &p)
            .reconcile(Execution::Apply(&dir))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to configure host graphics settings for host esxi02 due to: Service xorg not running"
        );
    }

    #[tokio::test]
    async fn restart_fault_after_update_still_counts_as_changed() {
        let dir = lab().with_restart_fault("esxi02", VmwareError::soap_fault("Service xorg not running"));
        let mut p = params(hosts(&["esxi02", "esxi04"]));
        p.on_host_error = FailurePolicy::Continue;
        let err = GraphicsReconciler::new(&dir, &p)
            .reconcile(Execution::Apply(&dir))
            .await
            .unwrap_err();

        let esxi02 = err.results.get("esxi02").unwrap();
        assert!(esxi02.changed);
        assert!(esxi02.failed);
        assert_eq!(
            esxi02.msg,
            "Failed to configure host graphics settings for host esxi02 due to: Service xorg not running"
        );
        assert_eq!(
            dir.host_config("esxi02").await.unwrap().host_default_graphics_type,
            GraphicsType::SharedDirect
        );
        assert!(err.results.get("esxi04").unwrap().changed);
    }

    #[tokio::test]
    async fn continue_policy_finishes_batch_then_fails() {
        let dir = lab().with_update_fault("esxi04", VmwareError::config_fault("bad"));
        let mut p = params(HostTarget::Cluster("gpu".into()));
        p.on_host_error = FailurePolicy::Continue;
        let err = GraphicsReconciler::new(&dir, &p)
            .reconcile(Execution::Apply(&dir))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to configure host graphics settings on 1 of 3 host(s)");
        assert_eq!(err.results.len(), 3);
        assert!(err.results.get("esxi04").unwrap().failed);
        assert!(!err.results.get("esxi04").unwrap().changed);
        assert!(err.results.get("esxi02").unwrap().changed);
        assert_eq!(
            dir.host_config("esxi02").await.unwrap().host_default_graphics_type,
            GraphicsType::SharedDirect
        );
    }

    #[tokio::test]
    async fn other_live_value_always_differs() {
        let dir = SimulatedDirectory::new().with_host(
            "esxi05",
            HostConnectionState::Connected,
            cfg(GraphicsType::Other, AssignmentPolicy::Performance),
        );
        let p = params(hosts(&["esxi05"]));
        let host = resolve_hosts(&dir, &p.target).await.unwrap().remove(0);
        let plan = plan_host(&dir, &host, &p).await.unwrap();
        match plan {
            HostPlan::Change { changes, .. } => assert_eq!(changes.fields()[0].field, "hostDefaultGraphicsType"),
            other => panic!("unexpected plan {other:?}"),
        }
    }
}
