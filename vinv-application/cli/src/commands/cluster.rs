//! 集群查询命令

use anyhow::{Context, Result};
use colored::Colorize;
use vinv_vsphere::{ClusterInfo, VsphereClient};

use super::common::{finish, CommandContext};
use super::output::{output_formatted, TableRow};
use crate::config::OutputFormat;

impl TableRow for ClusterInfo {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "Reference"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.name.clone(), self.reference.value.clone()]
    }
}

pub async fn handle(action: crate::ClusterAction, ctx: &CommandContext) -> Result<()> {
    let client = ctx.connect().await?;
    let result = match action {
        crate::ClusterAction::List => list_clusters(&client, ctx).await,
        crate::ClusterAction::Default => show_default(&client, ctx).await,
    };
    finish(&client, result).await
}

async fn list_clusters(client: &VsphereClient, ctx: &CommandContext) -> Result<()> {
    let scope = ctx.scope(client).await?;
    let clusters = client
        .inventory()
        .retrieve_all::<ClusterInfo>(scope.as_ref())
        .await
        .context("获取集群列表失败")?;
    output_formatted(&clusters, ctx.format(), None)
}

async fn show_default(client: &VsphereClient, ctx: &CommandContext) -> Result<()> {
    let dc = ctx.datacenter(client).await?;
    let cluster = client
        .inventory()
        .default_cluster(&dc.reference)
        .await
        .with_context(|| format!("查找数据中心 {} 的默认集群失败", dc.name))?;

    match ctx.format() {
        OutputFormat::Table => {
            println!("{} 集群: {}", "✓".green().bold(), cluster.name.cyan().bold());
            println!("  数据中心: {}", dc.name.yellow());
            println!("  引用:     {}", cluster.reference.to_string().yellow());
            Ok(())
        }
        format => output_formatted(&[cluster], format, None),
    }
}
