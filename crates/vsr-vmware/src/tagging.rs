//! Tag and category management via the vSphere Automation REST API.

use crate::error::VmwareResult;
use crate::types::*;
use crate::vsphere::VsphereClient;

const TAG_PATH: &str = "/api/cis/tagging/tag";
const CATEGORY_PATH: &str = "/api/cis/tagging/category";

/// Tagging operations.
pub struct TagManager<'a> {
    client: &'a VsphereClient,
}

impl<'a> TagManager<'a> {
    pub fn new(client: &'a VsphereClient) -> Self {
        Self { client }
    }

    // ── Tags ────────────────────────────────────────────────────────

    /// IDs of every tag, in service order.
    pub async fn list_tag_ids(&self) -> VmwareResult<Vec<String>> {
        self.client.get::<Vec<String>>(TAG_PATH).await
    }

    /// Full details of a tag.
    pub async fn get_tag(&self, tag_id: &str) -> VmwareResult<TagInfo> {
        self.client.get::<TagInfo>(&format!("{TAG_PATH}/{tag_id}")).await
    }

    /// Every tag with details, in the order the service lists their IDs.
    pub async fn list_tags(&self) -> VmwareResult<Vec<TagInfo>> {
        let ids = self.list_tag_ids().await?;
        let mut tags = Vec::with_capacity(ids.len());
        for id in ids {
            tags.push(self.get_tag(&id).await?);
        }
        Ok(tags)
    }

    /// Create a tag; returns the new tag ID.
    pub async fn create_tag(&self, spec: &TagCreateSpec) -> VmwareResult<String> {
        let id: Option<String> = self.client.post(TAG_PATH, spec).await?;
        Ok(id.unwrap_or_default())
    }

    /// Update a tag's mutable fields.
    pub async fn update_tag(&self, tag_id: &str, spec: &TagUpdateSpec) -> VmwareResult<()> {
        self.client.patch(&format!("{TAG_PATH}/{tag_id}"), spec).await
    }

    /// Delete a tag.
    pub async fn delete_tag(&self, tag_id: &str) -> VmwareResult<()> {
        self.client.delete(&format!("{TAG_PATH}/{tag_id}")).await
    }

    // ── Categories ──────────────────────────────────────────────────

    pub async fn list_category_ids(&self) -> VmwareResult<Vec<String>> {
        self.client.get::<Vec<String>>(CATEGORY_PATH).await
    }

    pub async fn get_category(&self, category_id: &str) -> VmwareResult<CategoryInfo> {
        self.client
            .get::<CategoryInfo>(&format!("{CATEGORY_PATH}/{category_id}"))
            .await
    }

    /// Every category with details.
    pub async fn list_categories(&self) -> VmwareResult<Vec<CategoryInfo>> {
        let ids = self.list_category_ids().await?;
        let mut categories = Vec::with_capacity(ids.len());
        for id in ids {
            categories.push(self.get_category(&id).await?);
        }
        Ok(categories)
    }
}
