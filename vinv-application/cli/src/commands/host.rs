//! 主机查询命令

use anyhow::{Context, Result};
use vinv_vsphere::{HostHardware, HostSummary, VsphereClient};

use super::common::{finish, CommandContext};
use super::output::{cell, format_bytes, output_formatted, TableRow};

impl TableRow for HostSummary {
    fn headers() -> Vec<&'static str> {
        vec![
            "Name",
            "Used CPU",
            "Total CPU",
            "Free CPU",
            "Used Memory",
            "Total Memory",
            "Free Memory",
        ]
    }

    fn row(&self) -> Vec<String> {
        let mhz = |v: Option<i64>| cell(v.map(|v| format!("{} MHz", v)));
        let bytes = |v: Option<i64>| cell(v.map(format_bytes));
        vec![
            self.name.clone(),
            mhz(self.used_cpu_mhz),
            mhz(self.total_cpu_mhz()),
            mhz(self.free_cpu_mhz()),
            bytes(self.used_memory_bytes()),
            bytes(self.memory_bytes),
            bytes(self.free_memory_bytes()),
        ]
    }
}

impl TableRow for HostHardware {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "UUID", "Vendor", "Model", "PCI Devices"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            cell(self.uuid.as_deref()),
            cell(self.vendor.as_deref()),
            cell(self.model.as_deref()),
            self.pci_device_count.to_string(),
        ]
    }
}

pub async fn handle(action: crate::HostAction, ctx: &CommandContext) -> Result<()> {
    let client = ctx.connect().await?;
    let result = match action {
        crate::HostAction::List => list_hosts(&client, ctx).await,
        crate::HostAction::Pci => list_pci(&client, ctx).await,
    };
    finish(&client, result).await
}

async fn list_hosts(client: &VsphereClient, ctx: &CommandContext) -> Result<()> {
    let scope = ctx.scope(client).await?;
    let hosts = client
        .inventory()
        .retrieve_all::<HostSummary>(scope.as_ref())
        .await
        .context("获取主机列表失败")?;
    output_formatted(&hosts, ctx.format(), None)
}

async fn list_pci(client: &VsphereClient, ctx: &CommandContext) -> Result<()> {
    let scope = ctx.scope(client).await?;
    let mut hosts = client
        .inventory()
        .retrieve_all::<HostHardware>(scope.as_ref())
        .await
        .context("获取主机硬件信息失败")?;
    sort_by_model(&mut hosts);
    output_formatted(&hosts, ctx.format(), None)
}

/// 按型号排序，型号相同时按名称
fn sort_by_model(hosts: &mut [HostHardware]) {
    hosts.sort_by(|a, b| a.model.cmp(&b.model).then_with(|| a.name.cmp(&b.name)));
}
