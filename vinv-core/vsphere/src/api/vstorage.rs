//! 第一类磁盘 (FCD) API

use serde_json::json;
use tracing::{info, warn};

use crate::client::VsphereClient;
use crate::error::{Result, VsphereError};
use crate::models::storage::VStorageObjectDto;
use crate::models::{FirstClassDisk, ManagedObjectReference, VStorageObjectId};

/// 第一类磁盘 API
pub struct VStorageApi<'a> {
    client: &'a VsphereClient,
}

impl<'a> VStorageApi<'a> {
    /// 创建新的第一类磁盘 API 实例
    pub(crate) fn new(client: &'a VsphereClient) -> Self {
        Self { client }
    }

    async fn manager(&self) -> Result<ManagedObjectReference> {
        self.client
            .service_content()
            .await?
            .v_storage_object_manager
            .ok_or_else(|| {
                VsphereError::NotSupported("服务端未提供 VStorageObjectManager".to_string())
            })
    }

    /// 列出数据存储上的磁盘 ID
    pub async fn list(&self, datastore: &ManagedObjectReference) -> Result<Vec<VStorageObjectId>> {
        let manager = self.manager().await?;
        info!("列出第一类磁盘: {}", datastore);
        let ids: Option<Vec<VStorageObjectId>> = self
            .client
            .vim_invoke(&manager, "ListVStorageObject", &json!({ "datastore": datastore }))
            .await?;
        Ok(ids.unwrap_or_default())
    }

    /// 读取单个磁盘
    pub async fn retrieve(
        &self,
        datastore: &ManagedObjectReference,
        id: &VStorageObjectId,
    ) -> Result<FirstClassDisk> {
        let manager = self.manager().await?;
        info!("读取第一类磁盘: {} @ {}", id, datastore);
        let dto: VStorageObjectDto = self
            .client
            .vim_invoke(
                &manager,
                "RetrieveVStorageObject",
                &json!({ "id": id, "datastore": datastore }),
            )
            .await?;
        Ok(FirstClassDisk::from_dto(dto))
    }

    /// 列出并读取数据存储上的全部磁盘
    pub async fn list_disks(&self, datastore: &ManagedObjectReference) -> Result<Vec<FirstClassDisk>> {
        let ids = self.list(datastore).await?;
        let mut disks = Vec::with_capacity(ids.len());
        for id in &ids {
            disks.push(self.retrieve(datastore, id).await?);
        }
        Ok(disks)
    }

    /// 依次列出多个数据存储上的磁盘
    ///
    /// 单个数据存储读取失败时记录警告并跳过；服务端不支持第一类磁盘时
    /// 整体返回 `NotSupported`。
    pub async fn list_disks_across(
        &self,
        datastores: &[ManagedObjectReference],
    ) -> Result<Vec<(ManagedObjectReference, FirstClassDisk)>> {
        self.manager().await?;

        let mut disks = Vec::new();
        for datastore in datastores {
            match self.list_disks(datastore).await {
                Ok(found) => disks.extend(found.into_iter().map(|d| (datastore.clone(), d))),
                Err(e) => warn!("跳过数据存储 {}: {}", datastore, e),
            }
        }
        Ok(disks)
    }
}
