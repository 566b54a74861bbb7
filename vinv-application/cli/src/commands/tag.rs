//! 标签查询命令

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use vinv_vsphere::{AttachedObjects, ManagedObjectReference, Tag, VmSummary, VsphereClient};

use super::common::{finish, CommandContext};
use super::output::{output_formatted, TableRow};

/// 标签及其挂载对象
#[derive(Debug, Serialize)]
struct TagEntry {
    name: String,
    category: String,
    description: String,
    objects: Vec<ManagedObjectReference>,
}

impl TableRow for TagEntry {
    fn headers() -> Vec<&'static str> {
        vec!["Tag", "Category", "Description", "Attached Objects"]
    }

    fn row(&self) -> Vec<String> {
        let objects: Vec<String> = self.objects.iter().map(|o| o.to_string()).collect();
        vec![
            self.name.clone(),
            self.category.clone(),
            self.description.clone(),
            objects.join(", "),
        ]
    }
}

/// 虚拟机上的标签
#[derive(Debug, Serialize)]
struct VmTags {
    vm: String,
    tags: Vec<String>,
}

impl TableRow for VmTags {
    fn headers() -> Vec<&'static str> {
        vec!["VM", "Tags"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.vm.clone(), self.tags.join(", ")]
    }
}

pub async fn handle(action: crate::TagAction, ctx: &CommandContext) -> Result<()> {
    let client = ctx.connect().await?;
    let result = match action {
        crate::TagAction::List => list_tags(&client, ctx).await,
        crate::TagAction::Vms => list_vm_tags(&client, ctx).await,
    };
    finish(&client, result).await
}

async fn list_tags(client: &VsphereClient, ctx: &CommandContext) -> Result<()> {
    let tagging = client.tagging();
    let tags = tagging.list_tags().await.context("获取标签列表失败")?;

    let tag_ids: Vec<String> = tags.iter().map(|t| t.id.clone()).collect();
    let attached = tagging
        .list_attached_objects_on_tags(&tag_ids)
        .await
        .context("获取标签挂载对象失败")?;

    let mut categories: HashMap<String, String> = HashMap::new();
    for tag in &tags {
        if !categories.contains_key(&tag.category_id) {
            let category = tagging
                .get_category(&tag.category_id)
                .await
                .with_context(|| format!("获取标签分类 {} 失败", tag.category_id))?;
            categories.insert(tag.category_id.clone(), category.name);
        }
    }

    let entries = build_entries(tags, &attached, &categories);
    output_formatted(&entries, ctx.format(), None)
}

fn build_entries(
    tags: Vec<Tag>,
    attached: &[AttachedObjects],
    categories: &HashMap<String, String>,
) -> Vec<TagEntry> {
    tags.into_iter()
        .map(|tag| {
            let objects = attached
                .iter()
                .filter(|a| a.tag_id == tag.id)
                .flat_map(|a| a.object_ids.iter().map(ManagedObjectReference::from))
                .collect();
            TagEntry {
                category: categories
                    .get(&tag.category_id)
                    .cloned()
                    .unwrap_or_else(|| tag.category_id.clone()),
                name: tag.name,
                description: tag.description,
                objects,
            }
        })
        .collect()
}

async fn list_vm_tags(client: &VsphereClient, ctx: &CommandContext) -> Result<()> {
    let scope = ctx.scope(client).await?;
    let vms = client
        .inventory()
        .retrieve_all::<VmSummary>(scope.as_ref())
        .await
        .context("获取虚拟机列表失败")?;

    let refs: Vec<ManagedObjectReference> = vms.iter().map(|vm| vm.reference.clone()).collect();
    let attached = client
        .tagging()
        .list_attached_tags_on_objects(&refs)
        .await
        .context("获取虚拟机标签失败")?;

    let mut tags_by_vm: HashMap<ManagedObjectReference, Vec<String>> = HashMap::new();
    for entry in attached {
        let names = entry.tags.into_iter().map(|t| t.name);
        tags_by_vm
            .entry(ManagedObjectReference::from(&entry.object_id))
            .or_default()
            .extend(names);
    }

    let rows: Vec<VmTags> = vms
        .into_iter()
        .map(|vm| VmTags {
            tags: tags_by_vm.remove(&vm.reference).unwrap_or_default(),
            vm: vm.name,
        })
        .collect();
    output_formatted(&rows, ctx.format(), None)
}
