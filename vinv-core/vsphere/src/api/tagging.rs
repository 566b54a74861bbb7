//! 标签 API (REST)

use std::collections::HashMap;

use reqwest::Method;
use serde_json::json;
use tracing::info;

use crate::client::VsphereClient;
use crate::error::Result;
use crate::models::{AttachedObjects, AttachedTags, DynamicId, ManagedObjectReference, Tag, TagCategory};

const TAGGING_BASE: &str = "/api/cis/tagging";

/// 标签 API
pub struct TaggingApi<'a> {
    client: &'a VsphereClient,
}

impl<'a> TaggingApi<'a> {
    /// 创建新的标签 API 实例
    pub(crate) fn new(client: &'a VsphereClient) -> Self {
        Self { client }
    }

    /// 查询全部标签 ID
    pub async fn list_tag_ids(&self) -> Result<Vec<String>> {
        info!("查询标签列表");
        self.client
            .rest_request(Method::GET, &format!("{}/tag", TAGGING_BASE), None::<&()>)
            .await
    }

    /// 查询全部标签详情
    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        let ids = self.list_tag_ids().await?;
        let mut tags = Vec::with_capacity(ids.len());
        for id in &ids {
            tags.push(self.get_tag(id).await?);
        }
        Ok(tags)
    }

    /// 查询标签详情
    pub async fn get_tag(&self, tag_id: &str) -> Result<Tag> {
        info!("查询标签详情: {}", tag_id);
        self.client
            .rest_request(
                Method::GET,
                &format!("{}/tag/{}", TAGGING_BASE, urlencoding::encode(tag_id)),
                None::<&()>,
            )
            .await
    }

    /// 查询标签分类
    pub async fn get_category(&self, category_id: &str) -> Result<TagCategory> {
        info!("查询标签分类: {}", category_id);
        self.client
            .rest_request(
                Method::GET,
                &format!("{}/category/{}", TAGGING_BASE, urlencoding::encode(category_id)),
                None::<&()>,
            )
            .await
    }

    /// 查询对象上挂载的标签，标签 ID 解析为标签详情
    pub async fn list_attached_tags_on_objects(
        &self,
        objects: &[ManagedObjectReference],
    ) -> Result<Vec<AttachedTags>> {
        if objects.is_empty() {
            return Ok(Vec::new());
        }
        info!("查询 {} 个对象的标签", objects.len());

        let object_ids: Vec<DynamicId> = objects.iter().map(DynamicId::from).collect();
        let body = json!({ "object_ids": object_ids });
        let mut attached: Vec<AttachedTags> = self
            .client
            .rest_request(
                Method::POST,
                &format!(
                    "{}/tag-association?action=list-attached-tags-on-objects",
                    TAGGING_BASE
                ),
                Some(&body),
            )
            .await?;

        let mut cache: HashMap<String, Tag> = HashMap::new();
        for entry in &mut attached {
            for tag_id in &entry.tag_ids {
                if !cache.contains_key(tag_id) {
                    let tag = self.get_tag(tag_id).await?;
                    cache.insert(tag_id.clone(), tag);
                }
                if let Some(tag) = cache.get(tag_id) {
                    entry.tags.push(tag.clone());
                }
            }
        }
        Ok(attached)
    }

    /// 查询挂载了指定标签的对象
    pub async fn list_attached_objects_on_tags(
        &self,
        tag_ids: &[String],
    ) -> Result<Vec<AttachedObjects>> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }
        info!("查询 {} 个标签的挂载对象", tag_ids.len());

        let body = json!({ "tag_ids": tag_ids });
        self.client
            .rest_request(
                Method::POST,
                &format!(
                    "{}/tag-association?action=list-attached-objects-on-tags",
                    TAGGING_BASE
                ),
                Some(&body),
            )
            .await
    }
}
