//! vSphere 客户端核心实现
//!
//! 同时维护两条会话：VI/JSON 会话用于清单与属性查询，REST 会话只在
//! 首次访问标签接口时按需建立。两者都通过 `vmware-api-session-id`
//! 请求头携带令牌。

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::{InventoryApi, PropertyApi, TaggingApi, VStorageApi};
use crate::endpoint::Endpoint;
use crate::error::{Result, VimFault, VsphereError};
use crate::models::{AboutInfo, ManagedObjectReference, ServiceContent, UserSession};

/// 会话令牌请求头
pub const SESSION_HEADER: &str = "vmware-api-session-id";

/// 默认 VI/JSON 版本
pub const DEFAULT_API_RELEASE: &str = "8.0.1.0";

/// vSphere 客户端配置
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 连接超时（秒）
    pub connect_timeout: u64,

    /// 请求超时（秒）
    pub request_timeout: u64,

    /// 是否验证 SSL 证书
    pub verify_ssl: bool,

    /// VI/JSON 接口版本
    pub api_release: String,

    /// 属性收集器单页最大对象数，`None` 时由服务端决定
    pub max_objects: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: 10,
            request_timeout: 60,
            verify_ssl: true,
            api_release: DEFAULT_API_RELEASE.to_string(),
            max_objects: None,
        }
    }
}

#[derive(Clone)]
struct Credentials {
    username: String,
    password: String,
}

/// vSphere 客户端
pub struct VsphereClient {
    /// 目标端点
    endpoint: Endpoint,

    /// HTTP 客户端
    http_client: Client,

    /// VI/JSON 会话令牌
    session_id: Arc<RwLock<Option<String>>>,

    /// REST 会话令牌
    rest_session_id: Arc<RwLock<Option<String>>>,

    /// 登录凭据，供 REST 会话按需建立
    credentials: Arc<RwLock<Option<Credentials>>>,

    /// 服务实例内容
    content: Arc<RwLock<Option<ServiceContent>>>,

    /// 配置
    config: ClientConfig,
}

impl VsphereClient {
    /// 创建新的 vSphere 客户端（不发起任何请求）
    pub fn new(endpoint: Endpoint, config: ClientConfig) -> Result<Self> {
        if !config.verify_ssl {
            warn!("已关闭证书校验: {}", endpoint.host());
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| VsphereError::Http(e.to_string()))?;

        Ok(Self {
            endpoint,
            http_client,
            session_id: Arc::new(RwLock::new(None)),
            rest_session_id: Arc::new(RwLock::new(None)),
            credentials: Arc::new(RwLock::new(None)),
            content: Arc::new(RwLock::new(None)),
            config,
        })
    }

    /// 目标端点
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// 客户端配置
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 登录
    ///
    /// # Arguments
    /// * `username` - 用户名，为空时使用 URL 内嵌的用户名
    /// * `password` - 密码，为空时使用 URL 内嵌的密码
    pub async fn login(&self, username: &str, password: &str) -> Result<UserSession> {
        let (username, password) = self.endpoint.credentials(username, password);
        if username.is_empty() {
            return Err(VsphereError::Auth("未提供用户名".to_string()));
        }
        info!("vSphere 登录: {}@{}", username, self.endpoint.host());

        // 重新登录前释放旧会话
        if self.is_logged_in().await {
            if let Err(e) = self.logout().await {
                warn!("注销旧会话失败: {}", e);
            }
        }

        let content = self.service_content().await?;
        let session_manager = content
            .session_manager
            .clone()
            .ok_or_else(|| VsphereError::NotSupported("服务端未提供 SessionManager".to_string()))?;

        let url = self.vim_url(&session_manager, "Login");
        debug!("VI/JSON 请求: POST {}", url);
        let body = serde_json::json!({
            "userName": username,
            "password": password,
        });
        let response = self.http_client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let token = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| VsphereError::Auth("响应中缺少会话令牌".to_string()))?;
        let text = response.text().await?;
        let session: UserSession = decode_body(&text)?;

        *self.session_id.write().await = Some(token);
        *self.credentials.write().await = Some(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        });

        info!("vSphere 登录成功: {}", content.about.full_name);
        Ok(session)
    }

    /// 注销登出
    ///
    /// 没有会话时直接返回；无论服务端是否响应成功，本地令牌都会被清除。
    pub async fn logout(&self) -> Result<()> {
        let rest_token = self.rest_session_id.write().await.take();
        let token = self.session_id.write().await.take();
        *self.credentials.write().await = None;

        if let Some(rest_token) = rest_token {
            let url = format!("{}/api/session", self.endpoint.origin());
            debug!("REST 请求: DELETE {}", url);
            let result = self
                .http_client
                .delete(&url)
                .header(SESSION_HEADER, rest_token)
                .send()
                .await;
            if let Err(e) = result {
                warn!("REST 会话注销失败: {}", e);
            }
        }

        let Some(token) = token else {
            debug!("无活动会话，跳过登出");
            return Ok(());
        };

        info!("vSphere 登出");
        let session_manager = self
            .content
            .read()
            .await
            .as_ref()
            .and_then(|c| c.session_manager.clone());
        let Some(session_manager) = session_manager else {
            return Ok(());
        };

        let url = self.vim_url(&session_manager, "Logout");
        debug!("VI/JSON 请求: POST {}", url);
        let response = self
            .http_client
            .post(&url)
            .header(SESSION_HEADER, token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(())
    }

    /// 是否持有会话
    pub async fn is_logged_in(&self) -> bool {
        self.session_id.read().await.is_some()
    }

    /// 产品信息
    pub async fn about(&self) -> Result<AboutInfo> {
        Ok(self.service_content().await?.about)
    }

    /// 服务实例内容，首次访问时读取并缓存
    pub async fn service_content(&self) -> Result<ServiceContent> {
        if let Some(content) = self.content.read().await.as_ref() {
            return Ok(content.clone());
        }

        let url = format!(
            "{}/ServiceInstance/ServiceInstance/content",
            self.vim_base()
        );
        debug!("VI/JSON 请求: GET {}", url);
        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        let text = response.text().await?;
        let content: ServiceContent = decode_body(&text)?;

        *self.content.write().await = Some(content.clone());
        Ok(content)
    }

    /// 获取清单定位 API
    pub fn inventory(&self) -> InventoryApi<'_> {
        InventoryApi::new(self)
    }

    /// 获取属性获取 API
    pub fn property(&self) -> PropertyApi<'_> {
        PropertyApi::new(self)
    }

    /// 获取标签 API
    pub fn tagging(&self) -> TaggingApi<'_> {
        TaggingApi::new(self)
    }

    /// 获取第一类磁盘 API
    pub fn vstorage(&self) -> VStorageApi<'_> {
        VStorageApi::new(self)
    }

    fn vim_base(&self) -> String {
        format!(
            "{}{}/vim25/{}",
            self.endpoint.origin(),
            self.endpoint.path().trim_end_matches('/'),
            self.config.api_release
        )
    }

    fn vim_url(&self, obj: &ManagedObjectReference, member: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.vim_base(),
            obj.kind,
            urlencoding::encode(&obj.value),
            member
        )
    }

    async fn session_token(&self) -> Result<String> {
        self.session_id
            .read()
            .await
            .clone()
            .ok_or(VsphereError::NotLoggedIn)
    }

    /// 调用托管对象方法
    pub(crate) async fn vim_invoke<B: Serialize, R: DeserializeOwned>(
        &self,
        obj: &ManagedObjectReference,
        method: &str,
        body: &B,
    ) -> Result<R> {
        let token = self.session_token().await?;
        let url = self.vim_url(obj, method);
        debug!("VI/JSON 请求: POST {}", url);

        let request = self
            .http_client
            .post(&url)
            .header(SESSION_HEADER, token)
            .json(body);
        Self::send(request).await
    }

    /// 读取托管对象属性
    pub(crate) async fn vim_property<R: DeserializeOwned>(
        &self,
        obj: &ManagedObjectReference,
        property: &str,
    ) -> Result<R> {
        let token = self.session_token().await?;
        let url = self.vim_url(obj, property);
        debug!("VI/JSON 请求: GET {}", url);

        let request = self.http_client.get(&url).header(SESSION_HEADER, token);
        Self::send(request).await
    }

    /// 发送 REST 请求，必要时先建立 REST 会话
    pub(crate) async fn rest_request<B: Serialize, R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<R> {
        let token = self.rest_token().await?;
        let url = format!("{}{}", self.endpoint.origin(), path);
        debug!("REST 请求: {} {}", method, url);

        let mut request = self
            .http_client
            .request(method, &url)
            .header(SESSION_HEADER, token);
        if let Some(body) = body {
            request = request.json(body);
        }
        Self::send(request).await
    }

    async fn rest_token(&self) -> Result<String> {
        if let Some(token) = self.rest_session_id.read().await.as_ref() {
            return Ok(token.clone());
        }

        let credentials = self
            .credentials
            .read()
            .await
            .clone()
            .ok_or(VsphereError::NotLoggedIn)?;

        let url = format!("{}/api/session", self.endpoint.origin());
        debug!("REST 请求: POST {}", url);
        let response = self
            .http_client
            .post(&url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        let text = response.text().await?;
        let token: String = decode_body(&text)?;

        info!("REST 会话已建立");
        *self.rest_session_id.write().await = Some(token.clone());
        Ok(token)
    }

    async fn send<R: DeserializeOwned>(request: RequestBuilder) -> Result<R> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        let text = response.text().await?;
        decode_body(&text)
    }

    async fn error_from_response(response: Response) -> VsphereError {
        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "无法读取错误响应".to_string());
        warn!("API 请求失败: {} - {}", status, text);
        classify_failure(status, &text)
    }
}

/// 按状态码与响应体归类失败
pub(crate) fn classify_failure(status: StatusCode, body: &str) -> VsphereError {
    if let Ok(fault) = serde_json::from_str::<VimFault>(body) {
        return fault.into_error();
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => VsphereError::Auth(format!(
            "{}: {}",
            status,
            body.trim()
        )),
        StatusCode::NOT_FOUND => VsphereError::NotFound(body.trim().to_string()),
        _ => VsphereError::Api(status.as_u16(), body.to_string()),
    }
}

/// 解码响应体，空响应视为 `null`
fn decode_body<R: DeserializeOwned>(text: &str) -> Result<R> {
    let trimmed = text.trim();
    let source = if trimmed.is_empty() { "null" } else { trimmed };
    serde_json::from_str(source).map_err(|e| VsphereError::Parse(format!("{}: {}", e, trimmed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(raw: &str) -> VsphereClient {
        VsphereClient::new(Endpoint::parse(raw).unwrap(), ClientConfig::default()).unwrap()
    }

    #[test]
    fn test_vsphere_client_creation() {
        let client = client("vcsa.lab.local");
        assert_eq!(client.config().api_release, DEFAULT_API_RELEASE);
    }

    #[test]
    fn test_vim_url_layout() {
        let client = client("https://vcsa.lab.local/sdk");
        let obj = ManagedObjectReference::new("ContainerView", "session[52]view-1");
        assert_eq!(
            client.vim_url(&obj, "view"),
            "https://vcsa.lab.local/sdk/vim25/8.0.1.0/ContainerView/session%5B52%5Dview-1/view"
        );
    }

    #[test]
    fn test_classify_failure() {
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, ""),
            VsphereError::Auth(_)
        ));
        assert!(matches!(
            classify_failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"_typeName":"InvalidLogin","faultMessage":[]}"#
            ),
            VsphereError::Auth(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_GATEWAY, "upstream down"),
            VsphereError::Api(502, _)
        ));
    }

    #[test]
    fn test_empty_body_decodes_as_unit() {
        let unit: () = decode_body("").unwrap();
        assert_eq!(unit, ());
        let none: Option<String> = decode_body("  ").unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_calls_without_session_are_rejected() {
        let client = client("vcsa.lab.local");
        let obj = ManagedObjectReference::new("Folder", "group-d1");
        let result: Result<serde_json::Value> = client.vim_property(&obj, "childEntity").await;
        assert!(matches!(result, Err(VsphereError::NotLoggedIn)));
        assert!(!client.is_logged_in().await);
        assert!(client.logout().await.is_ok());
    }
}
