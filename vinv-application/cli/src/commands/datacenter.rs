//! 数据中心查询命令

use anyhow::{Context, Result};
use colored::Colorize;
use vinv_vsphere::{DatacenterInfo, VsphereClient};

use super::common::{finish, CommandContext};
use super::output::{output_formatted, TableRow};
use crate::config::OutputFormat;

impl TableRow for DatacenterInfo {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "Reference"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.name.clone(), self.reference.value.clone()]
    }
}

pub async fn handle(action: crate::DatacenterAction, ctx: &CommandContext) -> Result<()> {
    let client = ctx.connect().await?;
    let result = match action {
        crate::DatacenterAction::Default => show_default(&client, ctx).await,
        crate::DatacenterAction::List => list_datacenters(&client, ctx).await,
    };
    finish(&client, result).await
}

async fn show_default(client: &VsphereClient, ctx: &CommandContext) -> Result<()> {
    let dc = ctx.datacenter(client).await?;

    match ctx.format() {
        OutputFormat::Table => {
            println!("{} 数据中心: {}", "✓".green().bold(), dc.name.cyan().bold());
            println!("  引用: {}", dc.reference.to_string().yellow());
            Ok(())
        }
        format => output_formatted(&[dc], format, None),
    }
}

async fn list_datacenters(client: &VsphereClient, ctx: &CommandContext) -> Result<()> {
    let datacenters = client
        .inventory()
        .datacenters()
        .await
        .context("获取数据中心列表失败")?;
    output_formatted(&datacenters, ctx.format(), None)
}
