//! 标签相关记录 (REST 标签接口)

use serde::{Deserialize, Serialize};

use super::ManagedObjectReference;

/// 标签
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: String,
    #[serde(default)]
    pub used_by: Vec<String>,
}

/// 标签分类
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// SINGLE / MULTIPLE
    #[serde(default)]
    pub cardinality: String,
    #[serde(default)]
    pub associable_types: Vec<String>,
}

/// 标签接口使用的对象标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DynamicId {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

impl From<&ManagedObjectReference> for DynamicId {
    fn from(obj: &ManagedObjectReference) -> Self {
        Self {
            kind: obj.kind.clone(),
            id: obj.value.clone(),
        }
    }
}

impl From<&DynamicId> for ManagedObjectReference {
    fn from(id: &DynamicId) -> Self {
        ManagedObjectReference::new(id.kind.clone(), id.id.clone())
    }
}

/// 对象上挂载的标签
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedTags {
    pub object_id: DynamicId,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    /// 已解析的标签详情
    #[serde(default, skip_deserializing)]
    pub tags: Vec<Tag>,
}

/// 挂载了某个标签的对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedObjects {
    pub tag_id: String,
    #[serde(default)]
    pub object_ids: Vec<DynamicId>,
}
