//! vSphere 清单数据模型
//!
//! **数据来源**: VI/JSON 属性收集器与 REST 标签接口 (实时查询，无本地持久化)
//!
//! 每条记录只对应一个对象引用和一次查询，不做跨查询合并。

pub mod compute;
pub mod host;
pub mod network;
pub mod storage;
pub mod tag;
pub mod vm;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Result, VsphereError};

pub use compute::{ClusterInfo, DatacenterInfo};
pub use host::{HostHardware, HostSummary};
pub use network::{
    DistributedPortgroup, DistributedSwitch, DvsConfig, DvsPortSetting, NetworkInfo, NumericRange,
    VlanSpec,
};
pub use storage::{DatastoreSummary, DiskBacking, FirstClassDisk, VStorageObjectId};
pub use tag::{AttachedObjects, AttachedTags, DynamicId, Tag, TagCategory};
pub use vm::VmSummary;

/// 托管对象引用
///
/// 由服务端分配的不透明标识，客户端只用它查询属性，从不修改。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub struct ManagedObjectReference {
    /// 对象类型，如 `HostSystem`
    #[serde(rename = "type")]
    pub kind: String,

    /// 对象 ID，如 `host-10`
    pub value: String,
}

impl ManagedObjectReference {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// 是否为指定类型
    pub fn is(&self, kind: ObjectKind) -> bool {
        self.kind == kind.as_str()
    }
}

impl Serialize for ManagedObjectReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ManagedObjectReference", 3)?;
        state.serialize_field("_typeName", "ManagedObjectReference")?;
        state.serialize_field("type", &self.kind)?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}

impl fmt::Display for ManagedObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

/// 清单对象类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Folder,
    Datacenter,
    ClusterComputeResource,
    HostSystem,
    Datastore,
    Network,
    VirtualMachine,
    DistributedVirtualSwitch,
    DistributedVirtualPortgroup,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 9] = [
        ObjectKind::Folder,
        ObjectKind::Datacenter,
        ObjectKind::ClusterComputeResource,
        ObjectKind::HostSystem,
        ObjectKind::Datastore,
        ObjectKind::Network,
        ObjectKind::VirtualMachine,
        ObjectKind::DistributedVirtualSwitch,
        ObjectKind::DistributedVirtualPortgroup,
    ];

    /// 服务端使用的类型名
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Folder => "Folder",
            ObjectKind::Datacenter => "Datacenter",
            ObjectKind::ClusterComputeResource => "ClusterComputeResource",
            ObjectKind::HostSystem => "HostSystem",
            ObjectKind::Datastore => "Datastore",
            ObjectKind::Network => "Network",
            ObjectKind::VirtualMachine => "VirtualMachine",
            ObjectKind::DistributedVirtualSwitch => "DistributedVirtualSwitch",
            ObjectKind::DistributedVirtualPortgroup => "DistributedVirtualPortgroup",
        }
    }

    /// 中文显示名
    pub fn display_name(&self) -> &'static str {
        match self {
            ObjectKind::Folder => "文件夹",
            ObjectKind::Datacenter => "数据中心",
            ObjectKind::ClusterComputeResource => "集群",
            ObjectKind::HostSystem => "主机",
            ObjectKind::Datastore => "数据存储",
            ObjectKind::Network => "网络",
            ObjectKind::VirtualMachine => "虚拟机",
            ObjectKind::DistributedVirtualSwitch => "分布式交换机",
            ObjectKind::DistributedVirtualPortgroup => "分布式端口组",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = VsphereError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let alias = match lower.as_str() {
            "folder" => Some(ObjectKind::Folder),
            "dc" | "datacenter" => Some(ObjectKind::Datacenter),
            "cluster" | "clustercomputeresource" => Some(ObjectKind::ClusterComputeResource),
            "host" | "hostsystem" => Some(ObjectKind::HostSystem),
            "ds" | "datastore" => Some(ObjectKind::Datastore),
            "network" | "net" => Some(ObjectKind::Network),
            "vm" | "virtualmachine" => Some(ObjectKind::VirtualMachine),
            "dvs" | "vds" | "distributedvirtualswitch" => {
                Some(ObjectKind::DistributedVirtualSwitch)
            }
            "dvpg" | "portgroup" | "distributedvirtualportgroup" => {
                Some(ObjectKind::DistributedVirtualPortgroup)
            }
            _ => None,
        };
        alias.ok_or_else(|| VsphereError::Config(format!("未知的对象类型: {}", s)))
    }
}

/// 产品信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AboutInfo {
    pub name: String,
    pub full_name: String,
    pub vendor: String,
    pub version: String,
    pub build: String,
    pub api_type: String,
    pub api_version: String,
    pub instance_uuid: Option<String>,
}

/// 服务实例内容 (ServiceInstance.content)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContent {
    pub root_folder: ManagedObjectReference,
    pub property_collector: ManagedObjectReference,
    pub view_manager: Option<ManagedObjectReference>,
    pub session_manager: Option<ManagedObjectReference>,
    #[serde(rename = "vStorageObjectManager")]
    pub v_storage_object_manager: Option<ManagedObjectReference>,
    #[serde(default)]
    pub about: AboutInfo,
}

/// 登录会话信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSession {
    pub key: String,
    pub user_name: String,
    pub full_name: String,
    pub login_time: Option<String>,
}

/// 单个对象的属性快照
///
/// 键为属性路径，值为服务端返回的原始 JSON。`missing` 记录服务端
/// 报告无法读取的路径，对应的列在输出中留空。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PropertyBag {
    values: BTreeMap<String, Value>,
    missing: Vec<String>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, value: Value) {
        self.values.insert(path.into(), value);
    }

    pub fn mark_missing(&mut self, path: impl Into<String>) {
        self.missing.push(path.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 已获取的属性路径
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// 服务端报告缺失的属性路径
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    /// 读取属性值，自动拆开 `{"_typeName": "string", "_value": ...}` 包装
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.values.get(path).map(unwrap_primitive)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(Value::as_i64)
    }

    /// 按类型解码属性，属性不存在时返回 `None`
    pub fn decode<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        match self.get(path) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => serde_json::from_value(v.clone())
                .map(Some)
                .map_err(|e| VsphereError::Parse(format!("属性 {} 解码失败: {}", path, e))),
        }
    }

    /// 转为单元格文本
    pub fn display(&self, path: &str) -> String {
        self.get(path).map(display_value).unwrap_or_default()
    }
}

/// 拆开 VI/JSON 对 any 类型原始值的包装
pub fn unwrap_primitive(value: &Value) -> &Value {
    match value {
        Value::Object(map) if map.contains_key("_value") => &map["_value"],
        other => other,
    }
}

/// 把属性值渲染为单行文本
pub fn display_value(value: &Value) -> String {
    match unwrap_primitive(value) {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(","),
        Value::Object(map) => {
            if map.get("_typeName").and_then(Value::as_str) == Some("ManagedObjectReference") {
                if let Ok(moref) = serde_json::from_value::<ManagedObjectReference>(
                    Value::Object(map.clone()),
                ) {
                    return moref.to_string();
                }
            }
            let mut stripped = map.clone();
            stripped.remove("_typeName");
            Value::Object(stripped).to_string()
        }
    }
}

/// 可从属性快照解码的类型化记录
pub trait FromProperties: Sized {
    /// 记录对应的对象类型
    const KIND: ObjectKind;

    /// 需要获取的属性路径
    const PATHS: &'static [&'static str];

    fn from_properties(obj: &ManagedObjectReference, bag: &PropertyBag) -> Result<Self>;
}
