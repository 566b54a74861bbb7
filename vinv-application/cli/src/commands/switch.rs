//! 分布式交换机查询命令

use anyhow::{Context, Result};
use vinv_vsphere::{DistributedPortgroup, DistributedSwitch, VsphereClient};

use super::common::{finish, CommandContext};
use super::output::{cell, output_formatted, TableRow};

impl TableRow for DistributedSwitch {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "Version", "Ports", "Switch IP", "Default VLAN", "Config", "Status"]
    }

    fn row(&self) -> Vec<String> {
        let config = self.config.as_ref();
        vec![
            self.name.clone(),
            cell(config.and_then(|c| c.config_version())),
            cell(config.and_then(|c| c.num_ports())),
            cell(config.and_then(|c| c.switch_ip_address())),
            cell(config.and_then(|c| c.default_vlan())),
            cell(self.config_status.as_deref()),
            cell(self.overall_status.as_deref()),
        ]
    }
}

impl TableRow for DistributedPortgroup {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "Ports", "Binding", "VLAN", "Inherited"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            cell(self.num_ports),
            cell(self.binding.as_deref()),
            cell(self.vlan()),
            cell(self.vlan().and_then(|v| v.inherited())),
        ]
    }
}

pub async fn handle(action: crate::SwitchAction, ctx: &CommandContext) -> Result<()> {
    let client = ctx.connect().await?;
    let result = match action {
        crate::SwitchAction::List => list_switches(&client, ctx).await,
        crate::SwitchAction::Portgroups => list_portgroups(&client, ctx).await,
    };
    finish(&client, result).await
}

async fn list_switches(client: &VsphereClient, ctx: &CommandContext) -> Result<()> {
    let scope = ctx.scope(client).await?;
    let switches = client
        .inventory()
        .retrieve_all::<DistributedSwitch>(scope.as_ref())
        .await
        .context("获取分布式交换机列表失败")?;
    output_formatted(&switches, ctx.format(), None)
}

async fn list_portgroups(client: &VsphereClient, ctx: &CommandContext) -> Result<()> {
    let scope = ctx.scope(client).await?;
    let portgroups = client
        .inventory()
        .retrieve_all::<DistributedPortgroup>(scope.as_ref())
        .await
        .context("获取分布式端口组列表失败")?;
    output_formatted(&portgroups, ctx.format(), None)
}
