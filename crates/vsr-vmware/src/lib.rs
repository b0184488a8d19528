//! # vsr-vmware: vSphere Directory Client
//!
//! Everything the reconcilers need to read and mutate vCenter / ESXi state,
//! behind a small set of async traits.
//!
//! ## Modules
//!
//! - **types**: Shared data structures (hosts, graphics config, tags, categories)
//! - **error**: Crate-specific error types
//! - **vsphere**: vSphere Automation REST client with session-based auth
//! - **soap**: vim25 SOAP transport (`/sdk`) and response parsing
//! - **host**: ESXi host inventory, graphics manager, service restarts (SOAP)
//! - **tagging**: Tag / category CRUD (REST)
//! - **directory**: Read / mutate traits consumed by the reconcilers
//! - **service**: Aggregate façade implementing the directory traits
//! - **simulated**: In-memory directory for tests and offline runs

pub mod types;
pub mod error;
pub mod vsphere;
pub mod soap;
pub mod host;
pub mod tagging;
pub mod directory;
pub mod service;
pub mod simulated;

pub use directory::{HostDirectory, HostMutator, TagDirectory, TagMutator};
pub use error::{VmwareError, VmwareErrorKind, VmwareResult};
pub use service::VsphereService;
pub use simulated::{DirectoryCall, SimulatedDirectory};
