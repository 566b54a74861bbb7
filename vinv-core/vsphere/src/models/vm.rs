//! 虚拟机记录

use serde::{Deserialize, Serialize};

use super::{FromProperties, ManagedObjectReference, ObjectKind, PropertyBag};
use crate::error::Result;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VirtualMachineSummary {
    vm: Option<ManagedObjectReference>,
    config: Option<VmConfigSummary>,
    runtime: Option<VmRuntimeInfo>,
    guest: Option<VmGuestSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VmConfigSummary {
    name: Option<String>,
    template: Option<bool>,
    vm_path_name: Option<String>,
    #[serde(rename = "memorySizeMB")]
    memory_size_mb: Option<i64>,
    cpu_reservation: Option<i64>,
    memory_reservation: Option<i64>,
    num_cpu: Option<i64>,
    guest_id: Option<String>,
    guest_full_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VmRuntimeInfo {
    host: Option<ManagedObjectReference>,
    power_state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VmGuestSummary {
    guest_id: Option<String>,
    guest_full_name: Option<String>,
    host_name: Option<String>,
    ip_address: Option<String>,
    hw_version: Option<String>,
}

/// 虚拟机概况
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VmSummary {
    pub reference: ManagedObjectReference,
    pub name: String,
    pub template: bool,
    /// 来宾系统 ID（优先取 VMware Tools 上报值）
    pub guest_id: Option<String>,
    pub guest_full_name: Option<String>,
    pub num_cpu: Option<i64>,
    /// CPU 预留 (MHz)
    pub cpu_reservation: Option<i64>,
    pub memory_mb: Option<i64>,
    /// 内存预留 (MB)
    pub memory_reservation: Option<i64>,
    pub power_state: Option<String>,
    pub hw_version: Option<String>,
    pub ip_address: Option<String>,
    pub guest_host_name: Option<String>,
    pub vm_path: Option<String>,
    /// 运行所在主机
    pub host: Option<ManagedObjectReference>,
}

impl FromProperties for VmSummary {
    const KIND: ObjectKind = ObjectKind::VirtualMachine;
    const PATHS: &'static [&'static str] = &["summary"];

    fn from_properties(obj: &ManagedObjectReference, bag: &PropertyBag) -> Result<Self> {
        let summary: VirtualMachineSummary = bag.decode("summary")?.unwrap_or_default();
        let config = summary.config.unwrap_or_default();
        let runtime = summary.runtime.unwrap_or_default();
        let guest = summary.guest.unwrap_or_default();

        Ok(Self {
            reference: summary.vm.unwrap_or_else(|| obj.clone()),
            name: config.name.unwrap_or_else(|| obj.value.clone()),
            template: config.template.unwrap_or(false),
            guest_id: guest.guest_id.or(config.guest_id),
            guest_full_name: guest.guest_full_name.or(config.guest_full_name),
            num_cpu: config.num_cpu,
            cpu_reservation: config.cpu_reservation,
            memory_mb: config.memory_size_mb,
            memory_reservation: config.memory_reservation,
            power_state: runtime.power_state,
            hw_version: guest.hw_version,
            ip_address: guest.ip_address,
            guest_host_name: guest.host_name,
            vm_path: config.vm_path_name,
            host: runtime.host,
        })
    }
}
