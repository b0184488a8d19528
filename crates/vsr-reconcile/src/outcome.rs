//! Per-entity outcomes, aggregate reports, failure policy and execution mode.

use crate::error::ReconcileError;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Per-entity outcome
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Result of reconciling a single managed entity.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct EntityOutcome {
    pub changed: bool,
    pub msg: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
}

impl EntityOutcome {
    pub fn unchanged(msg: impl Into<String>) -> Self {
        Self { changed: false, msg: msg.into(), failed: false }
    }

    pub fn changed(msg: impl Into<String>) -> Self {
        Self { changed: true, msg: msg.into(), failed: false }
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Self { changed: false, msg: msg.into(), failed: true }
    }

    /// The entity was modified before a later step failed.
    pub fn changed_then_failed(msg: impl Into<String>) -> Self {
        Self { changed: true, msg: msg.into(), failed: true }
    }
}

/// Outcomes keyed by entity name, kept in insertion order.
///
/// Serialises as a JSON object whose keys appear in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityResults {
    entries: Vec<(String, EntityOutcome)>,
}

impl EntityResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome; a later outcome for the same name replaces the
    /// earlier one in place.
    pub fn insert(&mut self, name: impl Into<String>, outcome: EntityOutcome) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = outcome,
            None => self.entries.push((name, outcome)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&EntityOutcome> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, o)| o)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityOutcome)> {
        self.entries.iter().map(|(n, o)| (n.as_str(), o))
    }

    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|(n, _)| n).collect()
    }

    pub fn any_changed(&self) -> bool {
        self.entries.iter().any(|(_, o)| o.changed)
    }

    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.failed).count()
    }
}

impl Serialize for EntityResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, outcome) in self.iter() {
            map.serialize_entry(name, outcome)?;
        }
        map.end()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Reports
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Successful host batch.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HostBatchReport {
    pub changed: bool,
    pub results: EntityResults,
}

impl HostBatchReport {
    pub fn from_results(results: EntityResults) -> Self {
        Self { changed: results.any_changed(), results }
    }
}

/// A fatal batch error together with whatever per-host outcomes were
/// collected before (or despite) it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{error}")]
pub struct BatchFailure {
    #[source]
    pub error: ReconcileError,
    pub results: EntityResults,
}

impl BatchFailure {
    pub fn new(error: ReconcileError, results: EntityResults) -> Self {
        Self { error, results }
    }
}

impl From<ReconcileError> for BatchFailure {
    fn from(error: ReconcileError) -> Self {
        Self::new(error, EntityResults::new())
    }
}

/// `tag_status` of a tag report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TagStatus {
    pub msg: String,
    pub tag_id: String,
}

/// Result of a tag reconciliation. `tag_status` is absent when nothing
/// existed and nothing was wanted.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TagReport {
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_status: Option<TagStatus>,
}

impl TagReport {
    pub fn new(changed: bool, msg: impl Into<String>, tag_id: impl Into<String>) -> Self {
        Self {
            changed,
            tag_status: Some(TagStatus { msg: msg.into(), tag_id: tag_id.into() }),
        }
    }

    pub fn untouched() -> Self {
        Self { changed: false, tag_status: None }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Policy / execution mode
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// What to do when a mutation against one host fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the batch at the first failing host.
    #[default]
    FailFast,
    /// Record the failure, finish the batch, then fail overall.
    Continue,
}

/// Whether mutations may be issued.
///
/// Only `Apply` carries a handle to the mutator, so check-mode code paths
/// have nothing to call a mutation on.
pub enum Execution<'a, M: ?Sized> {
    CheckMode,
    Apply(&'a M),
}

impl<'a, M: ?Sized> Execution<'a, M> {
    pub fn is_check_mode(&self) -> bool {
        matches!(self, Self::CheckMode)
    }
}

impl<'a, M: ?Sized> Clone for Execution<'a, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, M: ?Sized> Copy for Execution<'a, M> {}
