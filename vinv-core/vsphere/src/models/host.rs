//! 主机记录

use serde::{Deserialize, Serialize};

use super::{FromProperties, ManagedObjectReference, ObjectKind, PropertyBag};
use crate::error::Result;

const BYTES_PER_MB: i64 = 1024 * 1024;

/// HostListSummary (VI/JSON)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct HostListSummary {
    host: Option<ManagedObjectReference>,
    hardware: Option<HostHardwareSummary>,
    config: Option<HostConfigSummary>,
    quick_stats: Option<HostQuickStats>,
    overall_status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct HostHardwareSummary {
    vendor: Option<String>,
    model: Option<String>,
    memory_size: Option<i64>,
    cpu_mhz: Option<i64>,
    num_cpu_cores: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct HostConfigSummary {
    name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct HostQuickStats {
    /// MHz
    overall_cpu_usage: Option<i64>,
    /// MB
    overall_memory_usage: Option<i64>,
}

/// 主机 CPU / 内存概况
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostSummary {
    pub reference: ManagedObjectReference,
    pub name: String,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub cpu_mhz: Option<i64>,
    pub num_cpu_cores: Option<i64>,
    /// 已用 CPU (MHz)
    pub used_cpu_mhz: Option<i64>,
    /// 内存总量 (字节)
    pub memory_bytes: Option<i64>,
    /// 已用内存 (MB)
    pub used_memory_mb: Option<i64>,
    pub overall_status: Option<String>,
}

impl HostSummary {
    /// 总 CPU = 主频 × 核数
    pub fn total_cpu_mhz(&self) -> Option<i64> {
        Some(self.cpu_mhz? * self.num_cpu_cores?)
    }

    pub fn free_cpu_mhz(&self) -> Option<i64> {
        Some(self.total_cpu_mhz()? - self.used_cpu_mhz?)
    }

    pub fn used_memory_bytes(&self) -> Option<i64> {
        self.used_memory_mb.map(|mb| mb * BYTES_PER_MB)
    }

    pub fn free_memory_bytes(&self) -> Option<i64> {
        Some(self.memory_bytes? - self.used_memory_bytes()?)
    }
}

impl FromProperties for HostSummary {
    const KIND: ObjectKind = ObjectKind::HostSystem;
    const PATHS: &'static [&'static str] = &["summary"];

    fn from_properties(obj: &ManagedObjectReference, bag: &PropertyBag) -> Result<Self> {
        let summary: HostListSummary = bag.decode("summary")?.unwrap_or_default();
        let hardware = summary.hardware.unwrap_or_default();
        let stats = summary.quick_stats.unwrap_or_default();
        let name = summary
            .config
            .and_then(|c| c.name)
            .unwrap_or_else(|| obj.value.clone());

        Ok(Self {
            reference: summary.host.unwrap_or_else(|| obj.clone()),
            name,
            vendor: hardware.vendor,
            model: hardware.model,
            cpu_mhz: hardware.cpu_mhz,
            num_cpu_cores: hardware.num_cpu_cores,
            used_cpu_mhz: stats.overall_cpu_usage,
            memory_bytes: hardware.memory_size,
            used_memory_mb: stats.overall_memory_usage,
            overall_status: summary.overall_status,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct HostSystemInfo {
    vendor: Option<String>,
    model: Option<String>,
    uuid: Option<String>,
}

/// 主机硬件信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostHardware {
    pub reference: ManagedObjectReference,
    pub name: String,
    pub uuid: Option<String>,
    pub vendor: Option<String>,
    pub model: Option<String>,
    /// 本主机的 PCI 设备数
    pub pci_device_count: usize,
}

impl FromProperties for HostHardware {
    const KIND: ObjectKind = ObjectKind::HostSystem;
    const PATHS: &'static [&'static str] =
        &["name", "hardware.systemInfo", "hardware.pciDevice"];

    fn from_properties(obj: &ManagedObjectReference, bag: &PropertyBag) -> Result<Self> {
        let info: HostSystemInfo = bag.decode("hardware.systemInfo")?.unwrap_or_default();
        let pci_device_count = bag
            .get("hardware.pciDevice")
            .and_then(|v| v.as_array())
            .map_or(0, Vec::len);

        Ok(Self {
            reference: obj.clone(),
            name: bag
                .get_str("name")
                .map(str::to_string)
                .unwrap_or_else(|| obj.value.clone()),
            uuid: info.uuid,
            vendor: info.vendor,
            model: info.model,
            pci_device_count,
        })
    }
}
