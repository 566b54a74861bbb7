//! 数据存储与第一类磁盘 (FCD) 记录

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use super::{FromProperties, ManagedObjectReference, ObjectKind, PropertyBag};
use crate::error::Result;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DatastoreSummaryDto {
    datastore: Option<ManagedObjectReference>,
    name: Option<String>,
    url: Option<String>,
    capacity: Option<i64>,
    free_space: Option<i64>,
    uncommitted: Option<i64>,
    accessible: Option<bool>,
    #[serde(rename = "type")]
    fs_type: Option<String>,
    maintenance_mode: Option<String>,
}

/// 数据存储概况
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatastoreSummary {
    pub reference: ManagedObjectReference,
    pub name: String,
    /// 文件系统类型 (VMFS / NFS / vsan ...)
    pub fs_type: Option<String>,
    pub url: Option<String>,
    /// 容量 (字节)
    pub capacity: Option<i64>,
    /// 可用空间 (字节)
    pub free_space: Option<i64>,
    pub uncommitted: Option<i64>,
    pub accessible: Option<bool>,
    pub maintenance_mode: Option<String>,
}

impl DatastoreSummary {
    pub fn used_space(&self) -> Option<i64> {
        Some(self.capacity? - self.free_space?)
    }
}

impl FromProperties for DatastoreSummary {
    const KIND: ObjectKind = ObjectKind::Datastore;
    const PATHS: &'static [&'static str] = &["summary"];

    fn from_properties(obj: &ManagedObjectReference, bag: &PropertyBag) -> Result<Self> {
        let summary: DatastoreSummaryDto = bag.decode("summary")?.unwrap_or_default();

        Ok(Self {
            reference: summary.datastore.unwrap_or_else(|| obj.clone()),
            name: summary.name.unwrap_or_else(|| obj.value.clone()),
            fs_type: summary.fs_type,
            url: summary.url,
            capacity: summary.capacity,
            free_space: summary.free_space,
            uncommitted: summary.uncommitted,
            accessible: summary.accessible,
            maintenance_mode: summary.maintenance_mode,
        })
    }
}

/// 虚拟存储对象 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct VStorageObjectId {
    pub id: String,
}

impl VStorageObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Serialize for VStorageObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ID", 2)?;
        state.serialize_field("_typeName", "ID")?;
        state.serialize_field("id", &self.id)?;
        state.end()
    }
}

impl std::fmt::Display for VStorageObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// 磁盘后端
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_typeName")]
pub enum DiskBacking {
    #[serde(rename = "BaseConfigInfoDiskFileBackingInfo", rename_all = "camelCase")]
    DiskFile {
        #[serde(default)]
        datastore: Option<ManagedObjectReference>,
        #[serde(default)]
        file_path: Option<String>,
        #[serde(default)]
        backing_object_id: Option<String>,
        #[serde(rename = "deltaSizeInMB", default)]
        delta_size_mb: Option<i64>,
        #[serde(default)]
        provisioning_type: Option<String>,
    },

    #[serde(rename = "BaseConfigInfoRawDiskMappingBackingInfo", rename_all = "camelCase")]
    RawDiskMapping {
        #[serde(default)]
        datastore: Option<ManagedObjectReference>,
        #[serde(default)]
        file_path: Option<String>,
        #[serde(default)]
        backing_object_id: Option<String>,
        #[serde(default)]
        lun_uuid: Option<String>,
        #[serde(default)]
        compatibility_mode: Option<String>,
    },

    #[serde(other)]
    Other,
}

impl DiskBacking {
    pub fn datastore(&self) -> Option<&ManagedObjectReference> {
        match self {
            DiskBacking::DiskFile { datastore, .. }
            | DiskBacking::RawDiskMapping { datastore, .. } => datastore.as_ref(),
            DiskBacking::Other => None,
        }
    }

    pub fn file_path(&self) -> Option<&str> {
        match self {
            DiskBacking::DiskFile { file_path, .. }
            | DiskBacking::RawDiskMapping { file_path, .. } => file_path.as_deref(),
            DiskBacking::Other => None,
        }
    }

    pub fn backing_object_id(&self) -> Option<&str> {
        match self {
            DiskBacking::DiskFile {
                backing_object_id, ..
            }
            | DiskBacking::RawDiskMapping {
                backing_object_id, ..
            } => backing_object_id.as_deref(),
            DiskBacking::Other => None,
        }
    }

    /// 后端种类简称
    pub fn kind(&self) -> &'static str {
        match self {
            DiskBacking::DiskFile { .. } => "file",
            DiskBacking::RawDiskMapping { .. } => "rdm",
            DiskBacking::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VStorageObjectDto {
    pub config: VStorageObjectConfigDto,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VStorageObjectConfigDto {
    pub id: VStorageObjectId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(rename = "capacityInMB", default)]
    pub capacity_mb: Option<i64>,
    #[serde(default)]
    pub consumption_type: Vec<String>,
    #[serde(default)]
    pub backing: Option<DiskBacking>,
}

/// 第一类磁盘
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirstClassDisk {
    pub id: VStorageObjectId,
    pub name: String,
    pub create_time: Option<DateTime<Utc>>,
    pub capacity_mb: Option<i64>,
    pub consumption_types: Vec<String>,
    pub backing: Option<DiskBacking>,
}

impl FirstClassDisk {
    pub(crate) fn from_dto(dto: VStorageObjectDto) -> Self {
        let config = dto.config;
        Self {
            name: config.name.unwrap_or_else(|| config.id.id.clone()),
            id: config.id,
            create_time: config.create_time,
            capacity_mb: config.capacity_mb,
            consumption_types: config.consumption_type,
            backing: config.backing,
        }
    }

    pub fn datastore(&self) -> Option<&ManagedObjectReference> {
        self.backing.as_ref().and_then(DiskBacking::datastore)
    }

    pub fn delta_size_mb(&self) -> Option<i64> {
        match &self.backing {
            Some(DiskBacking::DiskFile { delta_size_mb, .. }) => *delta_size_mb,
            _ => None,
        }
    }

    pub fn provisioning_type(&self) -> Option<&str> {
        match &self.backing {
            Some(DiskBacking::DiskFile {
                provisioning_type, ..
            }) => provisioning_type.as_deref(),
            _ => None,
        }
    }
}
