//! 清单定位 API

use serde_json::json;
use tracing::{debug, info, warn};

use crate::client::VsphereClient;
use crate::error::{Result, VsphereError};
use crate::models::{
    ClusterInfo, DatacenterInfo, FromProperties, ManagedObjectReference, ObjectKind,
};

/// 清单定位 API
pub struct InventoryApi<'a> {
    client: &'a VsphereClient,
}

impl<'a> InventoryApi<'a> {
    /// 创建新的清单定位 API 实例
    pub(crate) fn new(client: &'a VsphereClient) -> Self {
        Self { client }
    }

    /// 列出指定类型的全部对象引用
    ///
    /// 在 `scope` 容器（缺省为根文件夹）上递归创建容器视图，读取后销毁。
    /// 返回顺序与服务端一致。
    pub async fn list_objects(
        &self,
        kind: ObjectKind,
        scope: Option<&ManagedObjectReference>,
    ) -> Result<Vec<ManagedObjectReference>> {
        let content = self.client.service_content().await?;
        let view_manager = content
            .view_manager
            .ok_or_else(|| VsphereError::NotSupported("服务端未提供 ViewManager".to_string()))?;
        let container = scope.cloned().unwrap_or(content.root_folder);
        info!("列出{}: 容器 {}", kind.display_name(), container);

        let view: ManagedObjectReference = self
            .client
            .vim_invoke(
                &view_manager,
                "CreateContainerView",
                &json!({
                    "container": container,
                    "type": [kind.as_str()],
                    "recursive": true,
                }),
            )
            .await?;

        let refs = self
            .client
            .vim_property::<Option<Vec<ManagedObjectReference>>>(&view, "view")
            .await;

        // 读取失败时也要销毁视图
        if let Err(e) = self
            .client
            .vim_invoke::<_, ()>(&view, "DestroyView", &json!({}))
            .await
        {
            warn!("销毁容器视图 {} 失败: {}", view, e);
        }

        let refs = refs?.unwrap_or_default();
        debug!("{} 共 {} 个", kind, refs.len());
        Ok(refs)
    }

    /// 列出对象并解码为类型化记录
    pub async fn retrieve_all<T: FromProperties>(
        &self,
        scope: Option<&ManagedObjectReference>,
    ) -> Result<Vec<T>> {
        let refs = self.list_objects(T::KIND, scope).await?;
        self.client.property().retrieve::<T>(&refs).await
    }

    /// 全部数据中心
    pub async fn datacenters(&self) -> Result<Vec<DatacenterInfo>> {
        self.retrieve_all::<DatacenterInfo>(None).await
    }

    /// 默认数据中心
    ///
    /// 清单中恰好有一个数据中心时返回它；没有时返回 `NotFound`，
    /// 多于一个时返回 `MultipleFound`。
    pub async fn default_datacenter(&self) -> Result<DatacenterInfo> {
        info!("查找默认数据中心");
        let datacenters = self.datacenters().await?;
        exactly_one(datacenters, ObjectKind::Datacenter, |dc| dc.name.as_str())
    }

    /// 按名称查找数据中心
    pub async fn find_datacenter(&self, name: &str) -> Result<DatacenterInfo> {
        info!("查找数据中心: {}", name);
        self.datacenters()
            .await?
            .into_iter()
            .find(|dc| dc.name == name)
            .ok_or_else(|| VsphereError::NotFound(format!("数据中心 {}", name)))
    }

    /// 解析查询范围：给定名称时按名称查找，否则取默认数据中心
    pub async fn resolve_scope(&self, name: Option<&str>) -> Result<DatacenterInfo> {
        match name {
            Some(name) => self.find_datacenter(name).await,
            None => self.default_datacenter().await,
        }
    }

    /// 数据中心内的默认集群，规则同默认数据中心
    pub async fn default_cluster(&self, scope: &ManagedObjectReference) -> Result<ClusterInfo> {
        info!("查找默认集群: {}", scope);
        let clusters = self.retrieve_all::<ClusterInfo>(Some(scope)).await?;
        exactly_one(clusters, ObjectKind::ClusterComputeResource, |c| c.name.as_str())
    }
}

fn exactly_one<T>(
    mut items: Vec<T>,
    kind: ObjectKind,
    name: impl Fn(&T) -> &str,
) -> Result<T> {
    match items.len() {
        0 => Err(VsphereError::NotFound(format!(
            "未找到{}",
            kind.display_name()
        ))),
        1 => Ok(items.remove(0)),
        _ => {
            let names: Vec<&str> = items.iter().map(|i| name(i)).collect();
            Err(VsphereError::MultipleFound(format!(
                "{} 个{} ({})，请显式指定",
                names.len(),
                kind.display_name(),
                names.join(", ")
            )))
        }
    }
}
