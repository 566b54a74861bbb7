//! 公共工具函数模块
//!
//! 提供各命令模块共享的功能，包括：
//! - vSphere 客户端创建和登录
//! - 命令结束时登出会话
//! - 查询范围解析

use anyhow::{Context, Result};
use tracing::warn;
use vinv_vsphere::{DatacenterInfo, Endpoint, ManagedObjectReference, VsphereClient};

use crate::config::{OutputFormat, VinvConfig, VsphereSettings};

/// 命令执行上下文
pub struct CommandContext {
    pub config: VinvConfig,
}

impl CommandContext {
    pub fn new(config: VinvConfig) -> Self {
        Self { config }
    }

    /// 输出格式
    pub fn format(&self) -> OutputFormat {
        self.config.output.format
    }

    /// 创建客户端并登录
    pub async fn connect(&self) -> Result<VsphereClient> {
        create_client(&self.config.vsphere).await
    }

    /// 列表查询范围
    ///
    /// 未指定数据中心时返回 `None`，即从根文件夹遍历整个清单。
    pub async fn scope(&self, client: &VsphereClient) -> Result<Option<ManagedObjectReference>> {
        match self.config.vsphere.datacenter {
            Some(_) => Ok(Some(self.datacenter(client).await?.reference)),
            None => Ok(None),
        }
    }

    /// 范围说明，用于表格标题
    pub fn scope_label(&self) -> &str {
        self.config.vsphere.datacenter.as_deref().unwrap_or("全部清单")
    }

    /// 解析数据中心：显式指定的数据中心，或唯一的默认数据中心
    pub async fn datacenter(&self, client: &VsphereClient) -> Result<DatacenterInfo> {
        let name = self.config.vsphere.datacenter.as_deref();
        client
            .inventory()
            .resolve_scope(name)
            .await
            .with_context(|| match name {
                Some(name) => format!("查找数据中心 {} 失败", name),
                None => "查找默认数据中心失败".to_string(),
            })
    }
}

/// 创建并登录 vSphere 客户端
///
/// 登录失败时直接返回错误，不会继续执行后续查询。
pub async fn create_client(settings: &VsphereSettings) -> Result<VsphereClient> {
    let endpoint = Endpoint::parse(&settings.url).context("解析 vCenter 地址失败")?;

    let client = VsphereClient::new(endpoint, settings.client_config())
        .context("创建 vSphere 客户端失败")?;

    client
        .login(&settings.username, &settings.password)
        .await
        .context("vSphere 登录失败")?;

    Ok(client)
}

/// 登出并返回命令结果
///
/// 登出失败只记录警告，不覆盖命令本身的结果。
pub async fn finish<T>(client: &VsphereClient, result: Result<T>) -> Result<T> {
    if let Err(e) = client.logout().await {
        warn!("登出失败: {}", e);
    }
    result
}
