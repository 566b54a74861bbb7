//! 虚拟机查询命令

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use vinv_vsphere::{ManagedObjectReference, VmSummary, VsphereClient};

use super::common::{finish, CommandContext};
use super::output::{cell, output_formatted, TableRow};

const POWERED_ON: &str = "poweredOn";

impl TableRow for VmSummary {
    fn headers() -> Vec<&'static str> {
        vec![
            "Name",
            "Guest",
            "CPU",
            "CPU Rsv",
            "Mem(MB)",
            "Mem Rsv",
            "State",
            "HW Version",
            "IP Address",
            "VM Path",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            cell(self.guest_full_name.as_deref().or(self.guest_id.as_deref())),
            cell(self.num_cpu),
            cell(self.cpu_reservation),
            cell(self.memory_mb),
            cell(self.memory_reservation),
            cell(self.power_state.as_deref()),
            cell(self.hw_version.as_deref()),
            cell(self.ip_address.as_deref()),
            cell(self.vm_path.as_deref()),
        ]
    }
}

/// 虚拟机与所在主机
#[derive(Debug, Serialize)]
struct VmPlacement {
    vm: String,
    guest: Option<String>,
    hw_version: Option<String>,
    ip_address: Option<String>,
    host: Option<String>,
}

impl TableRow for VmPlacement {
    fn headers() -> Vec<&'static str> {
        vec!["VM", "Guest", "HW Version", "IP Address", "ESXi Host"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.vm.clone(),
            cell(self.guest.as_deref()),
            cell(self.hw_version.as_deref()),
            cell(self.ip_address.as_deref()),
            cell(self.host.as_deref()),
        ]
    }
}

pub async fn handle(action: crate::VmAction, ctx: &CommandContext) -> Result<()> {
    let client = ctx.connect().await?;
    let result = match action {
        crate::VmAction::List { powered_on } => list_vms(&client, ctx, powered_on).await,
        crate::VmAction::Placement { names } => show_placement(&client, ctx, &names).await,
    };
    finish(&client, result).await
}

async fn retrieve_vms(client: &VsphereClient, ctx: &CommandContext) -> Result<Vec<VmSummary>> {
    let scope = ctx.scope(client).await?;
    client
        .inventory()
        .retrieve_all::<VmSummary>(scope.as_ref())
        .await
        .context("获取虚拟机列表失败")
}

async fn list_vms(client: &VsphereClient, ctx: &CommandContext, powered_on: bool) -> Result<()> {
    let vms = retrieve_vms(client, ctx).await?;

    let only_running = |vm: &VmSummary| vm.power_state.as_deref() == Some(POWERED_ON);
    let filter: Option<&dyn Fn(&VmSummary) -> bool> = if powered_on {
        Some(&only_running)
    } else {
        None
    };
    output_formatted(&vms, ctx.format(), filter)
}

async fn show_placement(
    client: &VsphereClient,
    ctx: &CommandContext,
    names: &[String],
) -> Result<()> {
    let vms: Vec<VmSummary> = retrieve_vms(client, ctx)
        .await?
        .into_iter()
        .filter(|vm| names.is_empty() || names.contains(&vm.name))
        .collect();

    // 主机引用去重后一次性获取名称
    let hosts: Vec<ManagedObjectReference> = vms
        .iter()
        .filter_map(|vm| vm.host.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let bags = client
        .property()
        .fetch_properties(&hosts, &["name"])
        .await
        .context("获取主机名称失败")?;
    let host_names: HashMap<ManagedObjectReference, String> = bags
        .iter()
        .filter_map(|(host, bag)| bag.get_str("name").map(|n| (host.clone(), n.to_string())))
        .collect();

    let placements = join_hosts(vms, &host_names);
    output_formatted(&placements, ctx.format(), None)
}

/// 按运行主机引用关联主机名称
fn join_hosts(
    vms: Vec<VmSummary>,
    host_names: &HashMap<ManagedObjectReference, String>,
) -> Vec<VmPlacement> {
    vms.into_iter()
        .map(|vm| VmPlacement {
            host: vm
                .host
                .as_ref()
                .map(|h| host_names.get(h).cloned().unwrap_or_else(|| h.value.clone())),
            vm: vm.name,
            guest: vm.guest_full_name.or(vm.guest_id),
            hw_version: vm.hw_version,
            ip_address: vm.ip_address,
        })
        .collect()
}
