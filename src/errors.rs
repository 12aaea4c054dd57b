use std::fmt;

use crate::storage::StorageError;

/// 所有请求期与启动期错误
///
/// 请求期错误在 handler 中被转换为协议响应体（`status: 500`），
/// 永远不会越过请求边界。
#[derive(Debug, Clone)]
pub enum KvLinkError {
    InvalidBody(String),
    InvalidPassword,
    InvalidUrl(String),
    KeyProtected(String),
    KeyExists(String),
    KeyNotFound(String),
    WriteLimitExceeded(String),
    KeyGenerationExhausted { attempts: u32 },
    InvalidCommand(String),
    ConfigDisabled,
    LoadListFailed(String),
    LookupFailed(String),
    InvalidContent(String),
    PageFetch(String),
    Storage(StorageError),
    Config(String),
    Io(String),
}

impl KvLinkError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            KvLinkError::InvalidBody(_) => "E001",
            KvLinkError::InvalidPassword => "E002",
            KvLinkError::InvalidUrl(_) => "E003",
            KvLinkError::KeyProtected(_) => "E004",
            KvLinkError::KeyExists(_) => "E005",
            KvLinkError::KeyNotFound(_) => "E006",
            KvLinkError::WriteLimitExceeded(_) => "E007",
            KvLinkError::KeyGenerationExhausted { .. } => "E008",
            KvLinkError::InvalidCommand(_) => "E009",
            KvLinkError::ConfigDisabled => "E010",
            KvLinkError::LoadListFailed(_) => "E011",
            KvLinkError::LookupFailed(_) => "E012",
            KvLinkError::InvalidContent(_) => "E013",
            KvLinkError::PageFetch(_) => "E014",
            KvLinkError::Storage(_) => "E015",
            KvLinkError::Config(_) => "E016",
            KvLinkError::Io(_) => "E017",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            KvLinkError::InvalidBody(_) => "Invalid Body",
            KvLinkError::InvalidPassword => "Invalid Password",
            KvLinkError::InvalidUrl(_) => "Invalid URL",
            KvLinkError::KeyProtected(_) => "Key Protected",
            KvLinkError::KeyExists(_) => "Key Exists",
            KvLinkError::KeyNotFound(_) => "Key Not Found",
            KvLinkError::WriteLimitExceeded(_) => "Write Limit Exceeded",
            KvLinkError::KeyGenerationExhausted { .. } => "Key Generation Exhausted",
            KvLinkError::InvalidCommand(_) => "Invalid Command",
            KvLinkError::ConfigDisabled => "Config Disabled",
            KvLinkError::LoadListFailed(_) => "Load List Failed",
            KvLinkError::LookupFailed(_) => "Lookup Failed",
            KvLinkError::InvalidContent(_) => "Invalid Content",
            KvLinkError::PageFetch(_) => "Page Fetch Failed",
            KvLinkError::Storage(_) => "Storage Error",
            KvLinkError::Config(_) => "Configuration Error",
            KvLinkError::Io(_) => "IO Error",
        }
    }

    /// 协议响应体中的 `error` 字段
    ///
    /// 这些字符串是现有 API 客户端依赖的兼容契约，不要修改。
    pub fn protocol_message(&self) -> &'static str {
        match self {
            KvLinkError::InvalidBody(_) => "Error: Invalid JSON body.",
            KvLinkError::InvalidPassword => "Error: Invalid password.",
            KvLinkError::InvalidUrl(_) => "Error: Url illegal.",
            KvLinkError::KeyProtected(_) => "Error: Key in protect_keylist.",
            KvLinkError::KeyExists(_) => "Error: Specific key existed.",
            KvLinkError::KeyNotFound(_) => "Error: Key not exist.",
            KvLinkError::WriteLimitExceeded(_) | KvLinkError::KeyGenerationExhausted { .. } => {
                "Error: Reach the KV write limitation."
            }
            KvLinkError::InvalidCommand(_) => "Error: Invalid cmd.",
            KvLinkError::ConfigDisabled => "Error: Config.load_kv false.",
            KvLinkError::LoadListFailed(_) => "Error: Load keyList failed.",
            KvLinkError::Storage(e) if e.is_write_side() => "Error: Reach the KV write limitation.",
            KvLinkError::LookupFailed(_)
            | KvLinkError::InvalidContent(_)
            | KvLinkError::PageFetch(_)
            | KvLinkError::Storage(_)
            | KvLinkError::Config(_)
            | KvLinkError::Io(_) => "Error: Lookup failed.",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> String {
        match self {
            KvLinkError::InvalidBody(msg) => msg.clone(),
            KvLinkError::InvalidPassword => "password mismatch".to_string(),
            KvLinkError::InvalidUrl(url) => format!("illegal url: {}", url),
            KvLinkError::KeyProtected(key) => format!("key is protected: {}", key),
            KvLinkError::KeyExists(key) => format!("key already exists: {}", key),
            KvLinkError::KeyNotFound(key) => format!("key not found: {}", key),
            KvLinkError::WriteLimitExceeded(msg) => msg.clone(),
            KvLinkError::KeyGenerationExhausted { attempts } => {
                format!("no free key after {} attempts", attempts)
            }
            KvLinkError::InvalidCommand(cmd) => format!("unknown command: {}", cmd),
            KvLinkError::ConfigDisabled => "qryall is disabled by features.load_kv".to_string(),
            KvLinkError::LoadListFailed(msg) => msg.clone(),
            KvLinkError::LookupFailed(msg) => msg.clone(),
            KvLinkError::InvalidContent(msg) => msg.clone(),
            KvLinkError::PageFetch(msg) => msg.clone(),
            KvLinkError::Storage(e) => e.to_string(),
            KvLinkError::Config(msg) => msg.clone(),
            KvLinkError::Io(msg) => msg.clone(),
        }
    }

    /// 格式化为彩色输出（用于 CLI 模式）
    #[cfg(feature = "cli")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 把写路径上的存储错误归类为写入上限错误
    pub fn from_write(err: StorageError) -> Self {
        KvLinkError::WriteLimitExceeded(err.to_string())
    }

    /// 把读路径上的存储错误归类为查询失败
    pub fn from_read(err: StorageError) -> Self {
        KvLinkError::LookupFailed(err.to_string())
    }
}

impl fmt::Display for KvLinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for KvLinkError {}

impl From<StorageError> for KvLinkError {
    fn from(err: StorageError) -> Self {
        KvLinkError::Storage(err)
    }
}

impl From<std::io::Error> for KvLinkError {
    fn from(err: std::io::Error) -> Self {
        KvLinkError::Io(err.to_string())
    }
}

impl From<config::ConfigError> for KvLinkError {
    fn from(err: config::ConfigError) -> Self {
        KvLinkError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KvLinkError>;
