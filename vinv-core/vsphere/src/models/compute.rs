//! 数据中心与集群记录

use serde::Serialize;

use super::{FromProperties, ManagedObjectReference, ObjectKind, PropertyBag};
use crate::error::Result;

/// 数据中心
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatacenterInfo {
    pub reference: ManagedObjectReference,
    pub name: String,
}

impl FromProperties for DatacenterInfo {
    const KIND: ObjectKind = ObjectKind::Datacenter;
    const PATHS: &'static [&'static str] = &["name"];

    fn from_properties(obj: &ManagedObjectReference, bag: &PropertyBag) -> Result<Self> {
        Ok(Self {
            reference: obj.clone(),
            name: name_or_id(obj, bag),
        })
    }
}

/// 计算集群
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterInfo {
    pub reference: ManagedObjectReference,
    pub name: String,
}

impl FromProperties for ClusterInfo {
    const KIND: ObjectKind = ObjectKind::ClusterComputeResource;
    const PATHS: &'static [&'static str] = &["name"];

    fn from_properties(obj: &ManagedObjectReference, bag: &PropertyBag) -> Result<Self> {
        Ok(Self {
            reference: obj.clone(),
            name: name_or_id(obj, bag),
        })
    }
}

pub(crate) fn name_or_id(obj: &ManagedObjectReference, bag: &PropertyBag) -> String {
    bag.get_str("name")
        .map(str::to_string)
        .unwrap_or_else(|| obj.value.clone())
}
