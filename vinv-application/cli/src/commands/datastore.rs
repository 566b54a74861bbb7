//! 数据存储查询命令

use anyhow::{Context, Result};
use vinv_vsphere::{DatastoreSummary, VsphereClient};

use super::common::{finish, CommandContext};
use super::output::{cell, format_bytes, output_formatted, TableRow};

impl TableRow for DatastoreSummary {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "Type", "Capacity", "Free"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            cell(self.fs_type.as_deref()),
            cell(self.capacity.map(format_bytes)),
            cell(self.free_space.map(format_bytes)),
        ]
    }
}

pub async fn handle(action: crate::DatastoreAction, ctx: &CommandContext) -> Result<()> {
    let client = ctx.connect().await?;
    let result = match action {
        crate::DatastoreAction::List => list_datastores(&client, ctx).await,
    };
    finish(&client, result).await
}

async fn list_datastores(client: &VsphereClient, ctx: &CommandContext) -> Result<()> {
    let scope = ctx.scope(client).await?;
    let datastores = client
        .inventory()
        .retrieve_all::<DatastoreSummary>(scope.as_ref())
        .await
        .context("获取数据存储列表失败")?;
    output_formatted(&datastores, ctx.format(), None)
}
