//! CLI 配置管理
//!
//! **数据来源** (优先级由低到高): 默认值 → 配置文件 → 环境变量 → 命令行参数
//!
//! 配置文件按 `VINV_CONFIG` → `./vinv.toml` → `~/.config/vinv/config.toml`
//! 的顺序查找，支持 TOML / YAML / JSON。

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use vinv_vsphere::{ClientConfig, DEFAULT_API_RELEASE};

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

/// CLI 配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VinvConfig {
    /// vCenter 连接
    #[serde(default)]
    pub vsphere: VsphereSettings,

    /// 输出设置
    #[serde(default)]
    pub output: OutputSettings,
}

/// vCenter 连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VsphereSettings {
    /// 服务地址，如 `https://vcsa.lab.local/sdk`
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// 忽略证书校验错误
    #[serde(default = "default_insecure")]
    pub insecure: bool,

    /// 连接超时（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// 请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    #[serde(default = "default_api_release")]
    pub api_release: String,

    /// 属性收集器单页最大对象数
    #[serde(default)]
    pub max_objects: Option<u32>,

    /// 默认数据中心名称
    #[serde(default)]
    pub datacenter: Option<String>,
}

/// 输出配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_insecure() -> bool {
    true
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    60
}

fn default_api_release() -> String {
    DEFAULT_API_RELEASE.to_string()
}

impl Default for VsphereSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            insecure: default_insecure(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            api_release: default_api_release(),
            max_objects: None,
            datacenter: None,
        }
    }
}

impl VsphereSettings {
    /// 转换为客户端配置
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
            verify_ssl: !self.insecure,
            api_release: self.api_release.clone(),
            max_objects: self.max_objects,
        }
    }
}

impl VinvConfig {
    /// 从多个源加载配置 (优先级: 环境变量 > 配置文件 > 默认值)
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                let expanded = shellexpand::tilde(path).into_owned();
                Self::load_from_file(Path::new(&expanded))?
            }
            None => match Self::find_config_file() {
                Some(path) => {
                    tracing::debug!("加载配置文件: {:?}", path);
                    Self::load_from_file(&path)?
                }
                None => {
                    tracing::debug!("未找到配置文件，使用默认值");
                    Self::default()
                }
            },
        };

        config.apply_env_vars()?;
        Ok(config)
    }

    /// 从指定文件加载配置，按扩展名选择解析器
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {:?}", path))?;

        let config = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => toml::from_str(&content)
                .with_context(|| format!("解析 TOML 配置失败: {:?}", path))?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("解析 YAML 配置失败: {:?}", path))?,
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("解析 JSON 配置失败: {:?}", path))?,
            _ => anyhow::bail!("不支持的配置文件格式: {:?}", path),
        };

        Ok(config)
    }

    /// 查找配置文件 (按优先级搜索)
    fn find_config_file() -> Option<PathBuf> {
        // 1. 环境变量指定的路径
        if let Ok(path) = env::var("VINV_CONFIG") {
            let p = PathBuf::from(shellexpand::tilde(&path).into_owned());
            if p.exists() {
                return Some(p);
            }
        }

        // 2. 当前目录
        let local = PathBuf::from("./vinv.toml");
        if local.exists() {
            return Some(local);
        }

        // 3. 用户配置目录
        let user = dirs::home_dir()?.join(".config").join("vinv").join("config.toml");
        user.exists().then_some(user)
    }

    /// 从环境变量覆盖配置
    fn apply_env_vars(&mut self) -> Result<()> {
        self.apply_env_with(|key| env::var(key).ok())
    }

    fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let vsphere = &mut self.vsphere;

        if let Some(url) = lookup("GOVMOMI_URL") {
            vsphere.url = url;
        }
        if let Some(username) = lookup("GOVMOMI_USERNAME") {
            vsphere.username = username;
        }
        if let Some(password) = lookup("GOVMOMI_PASSWORD") {
            vsphere.password = password;
        }
        if let Some(insecure) = lookup("GOVMOMI_INSECURE") {
            vsphere.insecure = parse_bool(&insecure)
                .with_context(|| format!("GOVMOMI_INSECURE 取值无效: {}", insecure))?;
        }
        if let Some(datacenter) = lookup("GOVMOMI_DATACENTER") {
            vsphere.datacenter = Some(datacenter);
        }

        Ok(())
    }

    /// 验证配置
    pub fn validate(&self) -> Result<()> {
        if self.vsphere.url.trim().is_empty() {
            anyhow::bail!("未配置 vCenter 地址 (GOVMOMI_URL、配置文件或 --url)");
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
