//! # vsr-reconcile: idempotent vSphere reconcilers
//!
//! Each reconciler reads live state through the read-only directory traits,
//! computes a plan, and only touches a mutator when handed
//! [`Execution::Apply`]. Check mode therefore cannot reach a mutating call.
//!
//! ## Modules
//!
//! - **error**: Fatal error taxonomy
//! - **outcome**: Per-entity outcomes, reports, failure policy, execution mode
//! - **diff**: Field-level change detection
//! - **graphics**: ESXi host graphics settings
//! - **tag**: vSphere tags

pub mod error;
pub mod outcome;
pub mod diff;
pub mod graphics;
pub mod tag;

pub use error::{ReconcileError, ReconcileResult};
pub use graphics::{GraphicsParams, GraphicsReconciler, HostTarget};
pub use outcome::{BatchFailure, EntityOutcome, EntityResults, Execution, FailurePolicy, HostBatchReport, TagReport, TagStatus};
pub use tag::{TagParams, TagReconciler, TagState};
