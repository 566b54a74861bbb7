//! 网络、分布式交换机与端口组记录
//!
//! 交换机配置、端口设置和 VLAN 规格在服务端都是多态数据对象，这里按
//! `_typeName` 判别为枚举，未识别的子类型落到 `Other`。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::compute::name_or_id;
use super::{FromProperties, ManagedObjectReference, ObjectKind, PropertyBag};
use crate::error::Result;

/// 标准网络
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkInfo {
    pub reference: ManagedObjectReference,
    pub name: String,
}

impl FromProperties for NetworkInfo {
    const KIND: ObjectKind = ObjectKind::Network;
    const PATHS: &'static [&'static str] = &["name"];

    fn from_properties(obj: &ManagedObjectReference, bag: &PropertyBag) -> Result<Self> {
        Ok(Self {
            reference: obj.clone(),
            name: name_or_id(obj, bag),
        })
    }
}

/// 数值区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericRange {
    pub start: i64,
    pub end: i64,
}

/// VLAN 规格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_typeName")]
pub enum VlanSpec {
    #[serde(rename = "VmwareDistributedVirtualSwitchVlanIdSpec")]
    VlanId {
        #[serde(rename = "vlanId", default)]
        vlan_id: i64,
        #[serde(default)]
        inherited: bool,
    },

    #[serde(rename = "VmwareDistributedVirtualSwitchTrunkVlanSpec")]
    Trunk {
        #[serde(rename = "vlanId", default)]
        ranges: Vec<NumericRange>,
        #[serde(default)]
        inherited: bool,
    },

    #[serde(rename = "VmwareDistributedVirtualSwitchPvlanSpec")]
    Pvlan {
        #[serde(rename = "pvlanId", default)]
        pvlan_id: i64,
        #[serde(default)]
        inherited: bool,
    },

    #[serde(other)]
    Other,
}

impl VlanSpec {
    /// 策略是否继承自上级
    pub fn inherited(&self) -> Option<bool> {
        match self {
            VlanSpec::VlanId { inherited, .. }
            | VlanSpec::Trunk { inherited, .. }
            | VlanSpec::Pvlan { inherited, .. } => Some(*inherited),
            VlanSpec::Other => None,
        }
    }
}

impl fmt::Display for VlanSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VlanSpec::VlanId { vlan_id, .. } => write!(f, "vlan {}", vlan_id),
            VlanSpec::Trunk { ranges, .. } => {
                let parts: Vec<String> = ranges
                    .iter()
                    .map(|r| {
                        if r.start == r.end {
                            r.start.to_string()
                        } else {
                            format!("{}-{}", r.start, r.end)
                        }
                    })
                    .collect();
                write!(f, "trunk {}", parts.join(","))
            }
            VlanSpec::Pvlan { pvlan_id, .. } => write!(f, "pvlan {}", pvlan_id),
            VlanSpec::Other => f.write_str("-"),
        }
    }
}

/// 端口默认设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_typeName")]
pub enum DvsPortSetting {
    #[serde(rename = "VMwareDVSPortSetting")]
    Vmware {
        #[serde(default)]
        vlan: Option<VlanSpec>,
    },

    #[serde(other)]
    Other,
}

impl DvsPortSetting {
    pub fn vlan(&self) -> Option<&VlanSpec> {
        match self {
            DvsPortSetting::Vmware { vlan } => vlan.as_ref(),
            DvsPortSetting::Other => None,
        }
    }
}

/// 分布式交换机配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_typeName")]
pub enum DvsConfig {
    #[serde(rename = "VMwareDVSConfigInfo", rename_all = "camelCase")]
    Vmware {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        config_version: Option<String>,
        #[serde(default)]
        switch_ip_address: Option<String>,
        #[serde(default)]
        num_ports: Option<i64>,
        #[serde(default)]
        default_port_config: Option<DvsPortSetting>,
    },

    #[serde(rename = "DVSConfigInfo", rename_all = "camelCase")]
    Generic {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        config_version: Option<String>,
        #[serde(default)]
        num_ports: Option<i64>,
    },

    #[serde(other)]
    Other,
}

impl DvsConfig {
    pub fn name(&self) -> Option<&str> {
        match self {
            DvsConfig::Vmware { name, .. } | DvsConfig::Generic { name, .. } => name.as_deref(),
            DvsConfig::Other => None,
        }
    }

    pub fn config_version(&self) -> Option<&str> {
        match self {
            DvsConfig::Vmware { config_version, .. }
            | DvsConfig::Generic { config_version, .. } => config_version.as_deref(),
            DvsConfig::Other => None,
        }
    }

    pub fn num_ports(&self) -> Option<i64> {
        match self {
            DvsConfig::Vmware { num_ports, .. } | DvsConfig::Generic { num_ports, .. } => {
                *num_ports
            }
            DvsConfig::Other => None,
        }
    }

    pub fn switch_ip_address(&self) -> Option<&str> {
        match self {
            DvsConfig::Vmware {
                switch_ip_address, ..
            } => switch_ip_address.as_deref(),
            _ => None,
        }
    }

    pub fn default_vlan(&self) -> Option<&VlanSpec> {
        match self {
            DvsConfig::Vmware {
                default_port_config: Some(setting),
                ..
            } => setting.vlan(),
            _ => None,
        }
    }
}

/// 分布式交换机
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributedSwitch {
    pub reference: ManagedObjectReference,
    pub name: String,
    pub config_status: Option<String>,
    pub overall_status: Option<String>,
    pub config: Option<DvsConfig>,
}

impl FromProperties for DistributedSwitch {
    const KIND: ObjectKind = ObjectKind::DistributedVirtualSwitch;
    const PATHS: &'static [&'static str] = &["name", "config", "configStatus", "overallStatus"];

    fn from_properties(obj: &ManagedObjectReference, bag: &PropertyBag) -> Result<Self> {
        let config: Option<DvsConfig> = bag.decode("config")?;
        let name = bag
            .get_str("name")
            .or_else(|| config.as_ref().and_then(DvsConfig::name))
            .map(str::to_string)
            .unwrap_or_else(|| obj.value.clone());

        Ok(Self {
            reference: obj.clone(),
            name,
            config_status: bag.get_str("configStatus").map(str::to_string),
            overall_status: bag.get_str("overallStatus").map(str::to_string),
            config,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PortgroupConfigInfo {
    name: Option<String>,
    num_ports: Option<i64>,
    #[serde(rename = "type")]
    binding: Option<String>,
    default_port_config: Option<DvsPortSetting>,
}

/// 分布式端口组
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributedPortgroup {
    pub reference: ManagedObjectReference,
    pub name: String,
    pub num_ports: Option<i64>,
    /// 端口绑定方式 (earlyBinding / ephemeral)
    pub binding: Option<String>,
    pub port_setting: Option<DvsPortSetting>,
}

impl DistributedPortgroup {
    pub fn vlan(&self) -> Option<&VlanSpec> {
        self.port_setting.as_ref().and_then(DvsPortSetting::vlan)
    }
}

impl FromProperties for DistributedPortgroup {
    const KIND: ObjectKind = ObjectKind::DistributedVirtualPortgroup;
    const PATHS: &'static [&'static str] = &["name", "config"];

    fn from_properties(obj: &ManagedObjectReference, bag: &PropertyBag) -> Result<Self> {
        let config: PortgroupConfigInfo = bag.decode("config")?.unwrap_or_default();
        let name = bag
            .get_str("name")
            .map(str::to_string)
            .or(config.name)
            .unwrap_or_else(|| obj.value.clone());

        Ok(Self {
            reference: obj.clone(),
            name,
            num_ports: config.num_ports,
            binding: config.binding,
            port_setting: config.default_port_config,
        })
    }
}
