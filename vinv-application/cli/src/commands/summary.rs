//! 清单概览命令
//!
//! 依次列出主机、数据存储与网络；未指定数据中心时覆盖整个清单。

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use vinv_vsphere::{DatastoreSummary, HostSummary, NetworkInfo, VsphereClient};

use super::common::{finish, CommandContext};
use super::output::{output_formatted, print_json, print_yaml};
use crate::config::OutputFormat;

#[derive(Serialize)]
struct InventorySummary {
    scope: String,
    hosts: Vec<HostSummary>,
    datastores: Vec<DatastoreSummary>,
    networks: Vec<NetworkInfo>,
}

pub async fn handle(ctx: &CommandContext) -> Result<()> {
    let client = ctx.connect().await?;
    let result = show_summary(&client, ctx).await;
    finish(&client, result).await
}

async fn show_summary(client: &VsphereClient, ctx: &CommandContext) -> Result<()> {
    let scope = ctx.scope(client).await?;
    let scope = scope.as_ref();
    let inventory = client.inventory();

    let summary = InventorySummary {
        hosts: inventory
            .retrieve_all::<HostSummary>(scope)
            .await
            .context("获取主机列表失败")?,
        datastores: inventory
            .retrieve_all::<DatastoreSummary>(scope)
            .await
            .context("获取数据存储列表失败")?,
        networks: inventory
            .retrieve_all::<NetworkInfo>(scope)
            .await
            .context("获取网络列表失败")?,
        scope: ctx.scope_label().to_string(),
    };

    match ctx.format() {
        OutputFormat::Json => print_json(&[summary]),
        OutputFormat::Yaml => print_yaml(&[summary]),
        OutputFormat::Table => {
            println!("{} {}\n", "范围:".bold(), summary.scope.cyan().bold());

            println!("{}", format!("主机 ({})", summary.hosts.len()).bold());
            output_formatted(&summary.hosts, OutputFormat::Table, None)?;

            println!("\n{}", format!("数据存储 ({})", summary.datastores.len()).bold());
            output_formatted(&summary.datastores, OutputFormat::Table, None)?;

            println!("\n{}", format!("网络 ({})", summary.networks.len()).bold());
            output_formatted(&summary.networks, OutputFormat::Table, None)
        }
    }
}
