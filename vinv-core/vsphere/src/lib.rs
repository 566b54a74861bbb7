//! vSphere 清单客户端
//!
//! 通过 VI/JSON 与 Automation REST 接口只读访问 vCenter 清单。
//!
//! # 功能
//!
//! - **会话建立** (`VsphereClient`): 解析地址、登录、登出、产品信息
//! - **清单定位** (`InventoryApi`): 默认数据中心/集群、按类型列出对象
//! - **属性获取** (`PropertyApi`): 单次请求批量获取属性并解码为类型化记录
//! - **标签查询** (`TaggingApi`): 标签、分类与挂载关系
//! - **第一类磁盘** (`VStorageApi`): 按数据存储列出与读取 FCD
//!
//! # 示例
//!
//! ```ignore
//! use vinv_vsphere::{ClientConfig, Endpoint, HostSummary, VsphereClient};
//!
//! let endpoint = Endpoint::parse("https://vcsa.lab.local/sdk")?;
//! let client = VsphereClient::new(endpoint, ClientConfig::default())?;
//! client.login("administrator@vsphere.local", "password").await?;
//!
//! let dc = client.inventory().default_datacenter().await?;
//! let hosts = client
//!     .inventory()
//!     .retrieve_all::<HostSummary>(Some(&dc.reference))
//!     .await?;
//!
//! client.logout().await?;
//! ```

pub mod api;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod models;

pub use client::{ClientConfig, VsphereClient, DEFAULT_API_RELEASE, SESSION_HEADER};
pub use endpoint::Endpoint;
pub use error::{Result, VsphereError};

// 导出 API 模块
pub use api::{InventoryApi, PropertyApi, TaggingApi, VStorageApi};

// 导出数据模型
pub use models::{
    display_value, unwrap_primitive,

    // 基础模型
    AboutInfo, FromProperties, ManagedObjectReference, ObjectKind, PropertyBag, ServiceContent,
    UserSession,

    // 清单记录
    ClusterInfo, DatacenterInfo, DatastoreSummary, HostHardware, HostSummary, NetworkInfo,
    VmSummary,

    // 分布式交换机
    DistributedPortgroup, DistributedSwitch, DvsConfig, DvsPortSetting, NumericRange, VlanSpec,

    // 第一类磁盘
    DiskBacking, FirstClassDisk, VStorageObjectId,

    // 标签
    AttachedObjects, AttachedTags, DynamicId, Tag, TagCategory,
};
