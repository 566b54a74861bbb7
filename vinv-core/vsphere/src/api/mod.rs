//! vSphere API 模块
//!
//! 所有 API 都借用同一个 [`VsphereClient`](crate::VsphereClient)：
//! - 清单定位 (InventoryApi)
//! - 属性获取 (PropertyApi)
//! - 标签查询 (TaggingApi)
//! - 第一类磁盘 (VStorageApi)

pub mod inventory;
pub mod property;
pub mod tagging;
pub mod vstorage;

pub use inventory::InventoryApi;
pub use property::PropertyApi;
pub use tagging::TaggingApi;
pub use vstorage::VStorageApi;
