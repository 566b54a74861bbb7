//! 通用属性查询命令
//!
//! 输出一列对象标识，外加每个属性路径一列。

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use vinv_vsphere::{ManagedObjectReference, ObjectKind, PropertyBag, VsphereClient};

use super::common::{finish, CommandContext};
use super::output::{print_empty, print_json, print_yaml, render_table};
use crate::config::OutputFormat;

/// 标识列标题
const IDENTITY_HEADER: &str = "Reference";

#[derive(Debug, Serialize)]
struct ObjectProperties {
    reference: ManagedObjectReference,
    properties: BTreeMap<String, Value>,
}

pub async fn handle(kind: &str, paths: &[String], ctx: &CommandContext) -> Result<()> {
    let kind: ObjectKind = kind.parse().context("无法识别的对象类型")?;

    let client = ctx.connect().await?;
    let result = show_properties(&client, ctx, kind, paths).await;
    finish(&client, result).await
}

async fn show_properties(
    client: &VsphereClient,
    ctx: &CommandContext,
    kind: ObjectKind,
    paths: &[String],
) -> Result<()> {
    let scope = ctx.scope(client).await?;

    let refs = client
        .inventory()
        .list_objects(kind, scope.as_ref())
        .await
        .with_context(|| format!("列出{}失败", kind.display_name()))?;

    let path_refs: Vec<&str> = paths.iter().map(String::as_str).collect();
    let bags = client
        .property()
        .fetch_properties(&refs, &path_refs)
        .await
        .context("获取属性失败")?;

    match ctx.format() {
        OutputFormat::Table if refs.is_empty() => print_empty(),
        OutputFormat::Table => {
            let (headers, rows) = build_table(&refs, paths, &bags);
            print!("{}", render_table(&headers, &rows));
        }
        OutputFormat::Json => print_json(&collect_objects(&refs, paths, &bags))?,
        OutputFormat::Yaml => print_yaml(&collect_objects(&refs, paths, &bags))?,
    }
    Ok(())
}

/// 标识列 + 每个属性路径一列，行顺序与引用顺序一致
fn build_table(
    refs: &[ManagedObjectReference],
    paths: &[String],
    bags: &HashMap<ManagedObjectReference, PropertyBag>,
) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers = vec![IDENTITY_HEADER.to_string()];
    headers.extend(paths.iter().cloned());

    let empty = PropertyBag::new();
    let rows = refs
        .iter()
        .map(|obj| {
            let bag = bags.get(obj).unwrap_or(&empty);
            let mut row = vec![obj.value.clone()];
            row.extend(paths.iter().map(|p| bag.display(p)));
            row
        })
        .collect();

    (headers, rows)
}

fn collect_objects(
    refs: &[ManagedObjectReference],
    paths: &[String],
    bags: &HashMap<ManagedObjectReference, PropertyBag>,
) -> Vec<ObjectProperties> {
    refs.iter()
        .map(|obj| {
            let properties = paths
                .iter()
                .map(|p| {
                    let value = bags
                        .get(obj)
                        .and_then(|bag| bag.get(p))
                        .cloned()
                        .unwrap_or(Value::Null);
                    (p.clone(), value)
                })
                .collect();
            ObjectProperties {
                reference: obj.clone(),
                properties,
            }
        })
        .collect()
}
