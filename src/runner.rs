//! Connect, reconcile, report.

use crate::cli::ModuleKind;
use crate::config;
use crate::error::AppError;
use crate::params::{self, ModuleArgs};
use crate::report::{RunOutcome, EXIT_FAILED};
use tracing::{info, warn};
use vsr_reconcile::{Execution, GraphicsParams, GraphicsReconciler, TagParams, TagReconciler};
use vsr_vmware::types::VsphereConfig;
use vsr_vmware::{HostDirectory, HostMutator, TagDirectory, TagMutator, VmwareError, VsphereService};

/// Host graphics run against any directory.
pub async fn run_host_graphics<D>(directory: &D, params: &GraphicsParams, check_mode: bool) -> RunOutcome
where
    D: HostDirectory + HostMutator,
{
    let exec = if check_mode { Execution::CheckMode } else { Execution::Apply(directory) };
    match GraphicsReconciler::new(directory, params).reconcile(exec).await {
        Ok(report) => RunOutcome::success(&report),
        Err(failure) => RunOutcome::failure(&failure.error.to_string(), Some(&failure.results), EXIT_FAILED),
    }
}

/// Tag run against any directory.
pub async fn run_tag<D>(directory: &D, params: &TagParams, check_mode: bool) -> RunOutcome
where
    D: TagDirectory + TagMutator,
{
    let exec = if check_mode { Execution::CheckMode } else { Execution::Apply(directory) };
    match TagReconciler::new(directory, params).reconcile(exec).await {
        Ok(report) => RunOutcome::success(&report),
        Err(e) => RunOutcome::failure(&e.to_string(), None, EXIT_FAILED),
    }
}

enum Prepared {
    HostGraphics(GraphicsParams),
    Tag(TagParams),
}

/// Validate the argument document. Module options are checked before the
/// connection so a bad option never costs a login.
fn prepare(module: ModuleKind, args_text: &str, force_check: bool) -> Result<(Prepared, VsphereConfig, bool), AppError> {
    let ModuleArgs { check_mode, connection, module: options } = params::split_args(params::parse_document(args_text)?)?;
    let prepared = match module {
        ModuleKind::HostGraphics => Prepared::HostGraphics(params::host_graphics_params(options)?),
        ModuleKind::Tag => Prepared::Tag(params::tag_params(options)?),
    };
    let config = config::resolve_from_environment(connection)?;
    Ok((prepared, config, force_check || check_mode))
}

fn connect_failure(config: &VsphereConfig, e: &VmwareError) -> RunOutcome {
    RunOutcome::failure(
        &format!(
            "Unable to connect to vCenter or ESXi API at {} on TCP/{}: {}",
            config.host, config.port, e.message
        ),
        None,
        EXIT_FAILED,
    )
}

/// Full module run: parse arguments, open the right session, reconcile,
/// log out.
pub async fn execute(module: ModuleKind, args_text: &str, force_check: bool) -> RunOutcome {
    let (prepared, config, check_mode) = match prepare(module, args_text, force_check) {
        Ok(p) => p,
        Err(e) => return RunOutcome::from_app_error(&e),
    };
    info!(module = module.name(), host = %config.host, check_mode, "starting run");

    let mut service = VsphereService::new(config);
    let connected = match &prepared {
        Prepared::HostGraphics(_) => service.connect_inventory().await,
        Prepared::Tag(_) => service.connect_tagging().await,
    };
    if let Err(e) = connected {
        return connect_failure(service.config(), &e);
    }

    let outcome = match &prepared {
        Prepared::HostGraphics(p) => run_host_graphics(&service, p, check_mode).await,
        Prepared::Tag(p) => run_tag(&service, p, check_mode).await,
    };

    if let Err(e) = service.disconnect().await {
        warn!("failed to close session: {e}");
    }
    info!(module = module.name(), exit_code = outcome.exit_code, "run finished");
    outcome
}
