//! vSphere 客户端错误定义

use serde::Deserialize;
use thiserror::Error;

/// vSphere 客户端错误类型
#[derive(Error, Debug)]
pub enum VsphereError {
    #[error("URL 无效: {0}")]
    InvalidUrl(String),

    #[error("HTTP 错误: {0}")]
    Http(String),

    #[error("超时错误: {0}")]
    Timeout(String),

    #[error("认证错误: {0}")]
    Auth(String),

    #[error("未登录，请先建立会话")]
    NotLoggedIn,

    #[error("API 错误 [{0}]: {1}")]
    Api(u16, String),

    #[error("服务端故障 {type_name}: {message}")]
    Fault { type_name: String, message: String },

    #[error("资源不存在: {0}")]
    NotFound(String),

    #[error("存在多个候选对象，无法确定默认值: {0}")]
    MultipleFound(String),

    #[error("服务端不支持: {0}")]
    NotSupported(String),

    #[error("解析错误: {0}")]
    Parse(String),

    #[error("配置错误: {0}")]
    Config(String),
}

/// vSphere 客户端结果类型
pub type Result<T> = std::result::Result<T, VsphereError>;

impl From<reqwest::Error> for VsphereError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Http(e.to_string())
        }
    }
}

impl From<serde_json::Error> for VsphereError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// VI/JSON 故障响应体
///
/// 方法调用失败时服务端返回 HTTP 500，响应体是带 `_typeName` 的 MethodFault。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VimFault {
    #[serde(rename = "_typeName")]
    pub type_name: String,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub fault_message: Vec<LocalizableMessage>,

    /// ManagedObjectNotFound 携带的对象引用
    #[serde(default)]
    pub obj: Option<crate::models::ManagedObjectReference>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LocalizableMessage {
    #[serde(default)]
    pub key: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

impl VimFault {
    fn describe(&self) -> String {
        if let Some(msg) = self.message.as_deref().filter(|m| !m.is_empty()) {
            return msg.to_string();
        }
        let joined: Vec<&str> = self
            .fault_message
            .iter()
            .filter_map(|m| m.message.as_deref().or(m.key.as_deref()))
            .collect();
        if joined.is_empty() {
            self.type_name.clone()
        } else {
            joined.join("; ")
        }
    }

    /// 按故障类型归类为客户端错误
    pub fn into_error(self) -> VsphereError {
        match self.type_name.as_str() {
            "InvalidLogin" | "NotAuthenticated" | "NoPermission" => {
                VsphereError::Auth(self.describe())
            }
            "ManagedObjectNotFound" => {
                let target = self
                    .obj
                    .as_ref()
                    .map(|o| o.to_string())
                    .unwrap_or_else(|| self.describe());
                VsphereError::NotFound(target)
            }
            "NotSupported" | "NotImplemented" => VsphereError::NotSupported(self.describe()),
            _ => VsphereError::Fault {
                message: self.describe(),
                type_name: self.type_name,
            },
        }
    }
}
