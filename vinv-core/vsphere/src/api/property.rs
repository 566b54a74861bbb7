//! 属性获取 API
//!
//! 一次 `RetrievePropertiesEx` 请求覆盖整批对象引用；服务端分页时
//! 沿 `token` 继续读取。任何故障都使整批失败，不返回部分结果。

use std::collections::{BTreeSet, HashMap};

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::client::VsphereClient;
use crate::error::Result;
use crate::models::{FromProperties, ManagedObjectReference, PropertyBag};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RetrieveResult {
    objects: Vec<ObjectContent>,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectContent {
    obj: ManagedObjectReference,
    #[serde(default)]
    prop_set: Vec<DynamicProperty>,
    #[serde(default)]
    missing_set: Vec<MissingProperty>,
}

#[derive(Debug, Deserialize)]
struct DynamicProperty {
    name: String,
    #[serde(default)]
    val: Value,
}

#[derive(Debug, Deserialize)]
struct MissingProperty {
    path: String,
}

/// 属性获取 API
pub struct PropertyApi<'a> {
    client: &'a VsphereClient,
}

impl<'a> PropertyApi<'a> {
    /// 创建新的属性获取 API 实例
    pub(crate) fn new(client: &'a VsphereClient) -> Self {
        Self { client }
    }

    /// 批量获取属性
    ///
    /// 空引用集直接返回空表，不发起请求。
    pub async fn fetch_properties(
        &self,
        refs: &[ManagedObjectReference],
        paths: &[&str],
    ) -> Result<HashMap<ManagedObjectReference, PropertyBag>> {
        let mut bags = HashMap::new();
        if refs.is_empty() {
            debug!("引用集为空，跳过属性获取");
            return Ok(bags);
        }

        let content = self.client.service_content().await?;
        let collector = content.property_collector;
        info!("获取属性: {} 个对象, 路径 {:?}", refs.len(), paths);

        let body = build_retrieve_request(refs, paths, self.client.config().max_objects);
        let mut page: Option<RetrieveResult> = self
            .client
            .vim_invoke(&collector, "RetrievePropertiesEx", &body)
            .await?;

        let mut pages = 1;
        while let Some(result) = page.take() {
            collect_objects(&mut bags, result.objects);

            let Some(token) = result.token else { break };
            pages += 1;
            debug!("继续读取属性分页 #{}", pages);
            page = self
                .client
                .vim_invoke(
                    &collector,
                    "ContinueRetrievePropertiesEx",
                    &json!({ "token": token }),
                )
                .await?;
        }

        debug!("属性获取完成: {} 个对象, {} 页", bags.len(), pages);
        Ok(bags)
    }

    /// 获取并解码为类型化记录，顺序与输入一致
    pub async fn retrieve<T: FromProperties>(
        &self,
        refs: &[ManagedObjectReference],
    ) -> Result<Vec<T>> {
        let bags = self.fetch_properties(refs, T::PATHS).await?;

        let mut records = Vec::with_capacity(refs.len());
        for obj in refs {
            match bags.get(obj) {
                Some(bag) => records.push(T::from_properties(obj, bag)?),
                None => warn!("结果中缺少对象 {}，已跳过", obj),
            }
        }
        Ok(records)
    }
}

fn build_retrieve_request(
    refs: &[ManagedObjectReference],
    paths: &[&str],
    max_objects: Option<u32>,
) -> Value {
    let kinds: BTreeSet<&str> = refs.iter().map(|r| r.kind.as_str()).collect();
    let prop_set: Vec<Value> = kinds
        .into_iter()
        .map(|kind| {
            json!({
                "_typeName": "PropertySpec",
                "type": kind,
                "pathSet": paths,
            })
        })
        .collect();
    let object_set: Vec<Value> = refs
        .iter()
        .map(|obj| {
            json!({
                "_typeName": "ObjectSpec",
                "obj": obj,
                "skip": false,
            })
        })
        .collect();

    let mut options = json!({ "_typeName": "RetrieveOptions" });
    if let Some(max) = max_objects {
        options["maxObjects"] = json!(max);
    }

    json!({
        "specSet": [{
            "_typeName": "PropertyFilterSpec",
            "propSet": prop_set,
            "objectSet": object_set,
        }],
        "options": options,
    })
}

fn collect_objects(
    bags: &mut HashMap<ManagedObjectReference, PropertyBag>,
    objects: Vec<ObjectContent>,
) {
    for object in objects {
        let mut bag = PropertyBag::new();
        for prop in object.prop_set {
            bag.insert(prop.name, prop.val);
        }
        for missing in object.missing_set {
            debug!("{} 缺少属性 {}", object.obj, missing.path);
            bag.mark_missing(missing.path);
        }
        bags.insert(object.obj, bag);
    }
}
