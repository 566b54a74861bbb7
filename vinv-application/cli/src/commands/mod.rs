//! CLI 命令处理模块

pub mod cluster;
pub mod common; // 公共工具函数
pub mod datacenter;
pub mod datastore;
pub mod fcd;
pub mod host;
pub mod login;
pub mod network;
pub mod output; // 通用输出格式化
pub mod props;
pub mod summary;
pub mod switch;
pub mod tag;
pub mod vm;
