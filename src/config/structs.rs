use std::path::Path;

use serde::{Deserialize, Serialize};

use super::types::SystemType;
use crate::errors::{KvLinkError, Result};

/// 应用配置（部署期固定，运行期只读）
///
/// 启动时加载一次，之后以 `Arc<AppConfig>` 的形式显式传入各组件。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub pages: PagesConfig,
}

impl AppConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：KVL，分隔符：__
    /// 示例：KVL__FEATURES__VISIT_COUNT=true
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        use config::{Config, Environment, File};

        let path = path.as_ref();
        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::from(path).required(false))
            // 2. 从环境变量覆盖
            .add_source(
                Environment::with_prefix("KVL")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("keys.protected")
                    .try_parsing(true),
            );

        let config = builder.build()?.try_deserialize::<AppConfig>()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.keys.key_length == 0 {
            return Err(KvLinkError::Config(
                "keys.key_length must be greater than 0".to_string(),
            ));
        }
        if self.keys.max_attempts == 0 {
            return Err(KvLinkError::Config(
                "keys.max_attempts must be greater than 0".to_string(),
            ));
        }
        if self.keys.password_key.is_empty() {
            return Err(KvLinkError::Config(
                "keys.password_key cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("# Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| KvLinkError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// KV 存储后端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// memory | file | redis
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    #[serde(default = "default_file_path")]
    pub file_path: String,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    #[serde(default = "default_redis_key_prefix")]
    pub redis_key_prefix: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 功能开关
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// 使用结果页展示最终值，而不是直接 302 跳转
    #[serde(default)]
    pub result_page: bool,
    /// 为所有响应附加跨域头
    #[serde(default = "default_true")]
    pub cors: bool,
    /// 同一个值复用同一个短 key
    #[serde(default)]
    pub unique_link: bool,
    /// 允许用户自定义 key
    #[serde(default = "default_true")]
    pub custom_link: bool,
    /// 允许覆盖已存在的 key
    #[serde(default)]
    pub overwrite_kv: bool,
    /// 阅后即焚：成功访问一次后删除
    #[serde(default)]
    pub snapchat_mode: bool,
    /// 记录访问次数（`<key>-count`）
    #[serde(default)]
    pub visit_count: bool,
    /// 允许 qryall 遍历全部 KV
    #[serde(default = "default_true")]
    pub load_kv: bool,
    #[serde(default)]
    pub system_type: SystemType,
}

/// key 相关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysConfig {
    /// 存放管理密码的 key
    #[serde(default = "default_password_key")]
    pub password_key: String,
    /// 静态受保护 key 列表
    #[serde(default = "default_protected_keys")]
    pub protected: Vec<String>,
    #[serde(default = "default_key_length")]
    pub key_length: usize,
    /// 随机 key 冲突时的最大尝试次数
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// 页面模板配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesConfig {
    /// 访问根路径时的跳转目标
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    /// 管理控制台模板（URL 或本地路径），`__PASSWORD__` 会被替换
    #[serde(default = "default_index_html")]
    pub index_html: String,
    /// 结果页模板（URL 或本地路径），`{__FINAL_LINK__}` 会被替换
    #[serde(default = "default_result_html")]
    pub result_html: String,
    #[serde(default = "default_page_cache_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

// ============================================================
// Default value functions
// ============================================================

fn default_true() -> bool {
    true
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_storage_backend() -> String {
    "file".to_string()
}

fn default_file_path() -> String {
    "links.json".to_string()
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_redis_key_prefix() -> String {
    "kvlinker:".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_password_key() -> String {
    "password".to_string()
}

fn default_protected_keys() -> Vec<String> {
    vec!["password".to_string()]
}

fn default_key_length() -> usize {
    6
}

fn default_max_attempts() -> u32 {
    10
}

fn default_fallback_url() -> String {
    "https://baidu.com".to_string()
}

fn default_index_html() -> String {
    "https://Rupan3sei.github.io/shorturl-ui/index.html".to_string()
}

fn default_result_html() -> String {
    "https://Rupan3sei.github.io/shorturl-ui/result.html".to_string()
}

fn default_page_cache_ttl() -> u64 {
    300
}

fn default_fetch_timeout() -> u64 {
    5
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            file_path: default_file_path(),
            redis_url: default_redis_url(),
            redis_key_prefix: default_redis_key_prefix(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            result_page: false,
            cors: true,
            unique_link: false,
            custom_link: true,
            overwrite_kv: false,
            snapchat_mode: false,
            visit_count: false,
            load_kv: true,
            system_type: SystemType::default(),
        }
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            password_key: default_password_key(),
            protected: default_protected_keys(),
            key_length: default_key_length(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            fallback_url: default_fallback_url(),
            index_html: default_index_html(),
            result_html: default_result_html(),
            cache_ttl_secs: default_page_cache_ttl(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_public_deployment() {
        let config = AppConfig::default();
        assert!(!config.features.result_page);
        assert!(config.features.cors);
        assert!(config.features.custom_link);
        assert!(!config.features.overwrite_kv);
        assert!(config.features.load_kv);
        assert_eq!(config.features.system_type, SystemType::ShortUrl);
        assert_eq!(config.keys.key_length, 6);
        assert_eq!(config.keys.protected, vec!["password".to_string()]);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[features]
visit_count = true
system_type = "imghost"

[keys]
protected = ["password", "admin"]
"#,
        )
        .expect("write config");

        let config = AppConfig::load(&path).expect("config should load");
        assert!(config.features.visit_count);
        assert_eq!(config.features.system_type, SystemType::ImgHost);
        assert_eq!(config.keys.protected.len(), 2);
        // 未写入的字段使用默认值
        assert!(config.features.custom_link);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load("definitely-missing-kvlinker.toml").expect("defaults");
        assert_eq!(config.keys.password_key, "password");
    }

    #[test]
    fn test_zero_key_length_rejected() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[keys]\nkey_length = 0\n").expect("write config");
        assert!(matches!(
            AppConfig::load(&path),
            Err(KvLinkError::Config(_))
        ));
    }

    #[test]
    fn test_sample_config_round_trips() {
        let sample = AppConfig::generate_sample_config();
        let parsed: AppConfig = toml::from_str(&sample).expect("sample should parse");
        assert_eq!(parsed.storage.backend, "file");
    }
}
