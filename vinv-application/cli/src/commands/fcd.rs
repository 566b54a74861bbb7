//! 第一类磁盘 (FCD) 查询命令

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;
use vinv_vsphere::{DatastoreSummary, FirstClassDisk, ManagedObjectReference, VsphereClient};

use super::common::{finish, CommandContext};
use super::output::{cell, output_formatted, TableRow};

/// 数据存储上的磁盘
#[derive(Debug, Serialize)]
struct DatastoreDisk {
    datastore: String,
    #[serde(flatten)]
    disk: FirstClassDisk,
}

impl TableRow for DatastoreDisk {
    fn headers() -> Vec<&'static str> {
        vec![
            "Datastore",
            "Name",
            "ID",
            "Capacity(MB)",
            "Created",
            "Backing",
            "Provisioning",
            "File Path",
        ]
    }

    fn row(&self) -> Vec<String> {
        let disk = &self.disk;
        let backing = disk.backing.as_ref();
        vec![
            self.datastore.clone(),
            disk.name.clone(),
            disk.id.to_string(),
            cell(disk.capacity_mb),
            cell(disk.create_time.map(|t| t.format("%Y-%m-%d %H:%M:%S"))),
            cell(backing.map(|b| b.kind())),
            cell(disk.provisioning_type()),
            cell(backing.and_then(|b| b.file_path())),
        ]
    }
}

pub async fn handle(action: crate::FcdAction, ctx: &CommandContext) -> Result<()> {
    let client = ctx.connect().await?;
    let result = match action {
        crate::FcdAction::List { datastore } => {
            list_disks(&client, ctx, datastore.as_deref()).await
        }
    };
    finish(&client, result).await
}

async fn list_disks(
    client: &VsphereClient,
    ctx: &CommandContext,
    datastore: Option<&str>,
) -> Result<()> {
    let dc = ctx.datacenter(client).await?;
    let datastores = client
        .inventory()
        .retrieve_all::<DatastoreSummary>(Some(&dc.reference))
        .await
        .context("获取数据存储列表失败")?;

    let targets = disk_targets(datastores, datastore)
        .with_context(|| format!("数据中心 {} 中没有可查询的数据存储", dc.name))?;

    let refs: Vec<ManagedObjectReference> = targets.iter().map(|ds| ds.reference.clone()).collect();
    let names: HashMap<ManagedObjectReference, String> = targets
        .into_iter()
        .map(|ds| (ds.reference, ds.name))
        .collect();

    // 单个数据存储失败时已在库内跳过
    let disks = client
        .vstorage()
        .list_disks_across(&refs)
        .await
        .context("列出第一类磁盘失败")?;

    let rows: Vec<DatastoreDisk> = disks
        .into_iter()
        .map(|(reference, disk)| DatastoreDisk {
            datastore: names
                .get(&reference)
                .cloned()
                .unwrap_or_else(|| reference.value.clone()),
            disk,
        })
        .collect();

    output_formatted(&rows, ctx.format(), None)
}

/// 选出需要列磁盘的数据存储，按名称排序并跳过不可访问的
fn disk_targets(
    mut datastores: Vec<DatastoreSummary>,
    name: Option<&str>,
) -> Result<Vec<DatastoreSummary>> {
    if let Some(name) = name {
        datastores.retain(|ds| ds.name == name);
        if datastores.is_empty() {
            anyhow::bail!("未找到数据存储 {}", name);
        }
    }

    datastores.retain(|ds| {
        if ds.accessible == Some(false) {
            warn!("数据存储 {} 不可访问，跳过", ds.name);
            return false;
        }
        true
    });
    datastores.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(datastores)
}
