//! 网络查询命令

use anyhow::{Context, Result};
use vinv_vsphere::{NetworkInfo, VsphereClient};

use super::common::{finish, CommandContext};
use super::output::{output_formatted, TableRow};

impl TableRow for NetworkInfo {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "Reference"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.name.clone(), self.reference.to_string()]
    }
}

pub async fn handle(action: crate::NetworkAction, ctx: &CommandContext) -> Result<()> {
    let client = ctx.connect().await?;
    let result = match action {
        crate::NetworkAction::List => list_networks(&client, ctx).await,
    };
    finish(&client, result).await
}

async fn list_networks(client: &VsphereClient, ctx: &CommandContext) -> Result<()> {
    let scope = ctx.scope(client).await?;
    let networks = client
        .inventory()
        .retrieve_all::<NetworkInfo>(scope.as_ref())
        .await
        .context("获取网络列表失败")?;
    output_formatted(&networks, ctx.format(), None)
}
