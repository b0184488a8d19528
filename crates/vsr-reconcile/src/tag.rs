//! Tag reconciler.
//!
//! Transition table over (desired, observed):
//!
//! | desired \ observed | present            | absent  |
//! |--------------------|--------------------|---------|
//! | present            | update description | create  |
//! | absent             | delete             | nothing |

use crate::diff::Changes;
use crate::error::{ReconcileError, ReconcileResult};
use crate::outcome::{Execution, TagReport};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};
use vsr_vmware::types::{TagCreateSpec, TagInfo, TagUpdateSpec};
use vsr_vmware::{TagDirectory, TagMutator, VmwareError};

/// Desired presence of the tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagState {
    #[default]
    Present,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagParams {
    pub tag_name: String,
    pub tag_description: String,
    pub category_id: Option<String>,
    pub state: TagState,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Lookup
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Tags indexed by name and by (name, category). Only the first tag in
/// enumeration order is kept under each key.
#[derive(Debug, Default)]
pub struct TagIndex {
    tags: Vec<TagInfo>,
    by_name: HashMap<String, usize>,
    by_name_category: HashMap<(String, String), usize>,
}

impl TagIndex {
    pub fn build(tags: Vec<TagInfo>) -> Self {
        let mut by_name = HashMap::new();
        let mut by_name_category = HashMap::new();
        for (i, t) in tags.iter().enumerate() {
            by_name.entry(t.name.clone()).or_insert(i);
            by_name_category
                .entry((t.name.clone(), t.category_id.clone()))
                .or_insert(i);
        }
        Self { tags, by_name, by_name_category }
    }

    /// First tag named `name`, restricted to `category_id` when given.
    pub fn find(&self, name: &str, category_id: Option<&str>) -> Option<&TagInfo> {
        let idx = match category_id {
            Some(c) => self.by_name_category.get(&(name.to_string(), c.to_string())),
            None => self.by_name.get(name),
        };
        idx.map(|&i| &self.tags[i])
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Plan
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagAction {
    Create(TagCreateSpec),
    Update { tag: TagInfo, spec: TagUpdateSpec },
    Unchanged(TagInfo),
    Delete(TagInfo),
    /// Absent and not wanted.
    Nothing,
}

/// Work out the transition for `params`. Only reads from the directory.
pub async fn plan<D>(directory: &D, params: &TagParams) -> ReconcileResult<TagAction>
where
    D: TagDirectory + ?Sized,
{
    let index = TagIndex::build(directory.list_tags().await?);
    let observed = index.find(&params.tag_name, params.category_id.as_deref()).cloned();
    debug!(
        tag = %params.tag_name,
        tags = index.len(),
        found = observed.is_some(),
        "looked up tag"
    );

    let action = match (params.state, observed) {
        (TagState::Present, Some(tag)) => {
            let changes = Changes::new().field("description", tag.description.as_str(), params.tag_description.as_str());
            if changes.is_empty() {
                TagAction::Unchanged(tag)
            } else {
                debug!(tag = %tag.name, changes = %changes.summary(), "tag differs");
                let spec = TagUpdateSpec { description: Some(params.tag_description.clone()) };
                TagAction::Update { tag, spec }
            }
        }
        (TagState::Present, None) => {
            let category_id = params.category_id.as_deref().ok_or_else(|| {
                ReconcileError::Resolution("'category_id' is required parameter while creating tag.".into())
            })?;
            let categories = directory.list_categories().await?;
            if !categories.iter().any(|c| c.id == category_id) {
                return Err(ReconcileError::Resolution(format!(
                    "Unable to find category specified using 'category_id' - {category_id}"
                )));
            }
            TagAction::Create(TagCreateSpec {
                name: params.tag_name.clone(),
                description: params.tag_description.clone(),
                category_id: category_id.to_string(),
            })
        }
        (TagState::Absent, Some(tag)) => TagAction::Delete(tag),
        (TagState::Absent, None) => TagAction::Nothing,
    };
    Ok(action)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Reconciler
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct TagReconciler<'a, D: ?Sized> {
    directory: &'a D,
    params: &'a TagParams,
}

impl<'a, D> TagReconciler<'a, D>
where
    D: TagDirectory + ?Sized,
{
    pub fn new(directory: &'a D, params: &'a TagParams) -> Self {
        Self { directory, params }
    }

    pub async fn reconcile<M>(&self, exec: Execution<'_, M>) -> ReconcileResult<TagReport>
    where
        M: TagMutator + ?Sized,
    {
        let action = plan(self.directory, self.params).await?;
        let name = &self.params.tag_name;

        let mutator = match (exec, &action) {
            (_, TagAction::Nothing) => return Ok(TagReport::untouched()),
            (_, TagAction::Unchanged(tag)) => {
                return Ok(TagReport::new(false, format!("Tag {name} is unchanged."), &tag.id));
            }
            (Execution::CheckMode, _) => return Ok(preview(name, &action)),
            (Execution::Apply(m), _) => m,
        };

        match action {
            TagAction::Create(spec) => {
                let id = mutator.create_tag(&spec).await.map_err(fault)?;
                if id.is_empty() {
                    return Ok(TagReport::new(false, "No tag created", ""));
                }
                info!(tag = %name, tag_id = %id, category_id = %spec.category_id, "tag created");
                Ok(TagReport::new(true, format!("Tag '{name}' created."), id))
            }
            TagAction::Update { tag, spec } => {
                mutator.update_tag(&tag.id, &spec).await.map_err(fault)?;
                info!(tag = %name, tag_id = %tag.id, "tag updated");
                Ok(TagReport::new(true, format!("Tag {name} updated."), tag.id))
            }
            TagAction::Delete(tag) => {
                mutator.delete_tag(&tag.id).await.map_err(fault)?;
                info!(tag = %name, tag_id = %tag.id, "tag deleted");
                Ok(TagReport::new(true, format!("Tag '{name}' deleted."), tag.id))
            }
            TagAction::Unchanged(_) | TagAction::Nothing => Ok(TagReport::untouched()),
        }
    }
}

fn fault(e: VmwareError) -> ReconcileError {
    ReconcileError::ServiceFault(e.message)
}

fn preview(name: &str, action: &TagAction) -> TagReport {
    match action {
        TagAction::Create(_) => TagReport::new(false, format!("Tag '{name}' would be created."), ""),
        TagAction::Update { tag, .. } => TagReport::new(false, format!("Tag {name} would be updated."), &tag.id),
        TagAction::Delete(tag) => TagReport::new(false, format!("Tag '{name}' would be deleted."), &tag.id),
        TagAction::Unchanged(tag) => TagReport::new(false, format!("Tag {name} is unchanged."), &tag.id),
        TagAction::Nothing => TagReport::untouched(),
    }
}
