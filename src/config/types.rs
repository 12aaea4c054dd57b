//! 配置类型定义模块

use serde::{Deserialize, Serialize};

/// 内容服务模式
///
/// 决定解析出的值被当作跳转目标、图片数据还是直接展示的文本。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SystemType {
    /// 短链接：302 跳转到存储的 URL
    ShortUrl,
    /// 图床：存储值为 `data:<mime>;base64,<payload>`
    ImgHost,
    /// 其他（pastebin、journal ...）：原样返回存储值
    Other(String),
}

impl SystemType {
    /// 只有 shorturl 模式要求 `add` 的值必须是合法 URL
    pub fn requires_url(&self) -> bool {
        matches!(self, SystemType::ShortUrl)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ShortUrl => "shorturl",
            Self::ImgHost => "imghost",
            Self::Other(name) => name,
        }
    }
}

impl Default for SystemType {
    fn default() -> Self {
        Self::ShortUrl
    }
}

impl std::fmt::Display for SystemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for SystemType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "shorturl" => Self::ShortUrl,
            "imghost" => Self::ImgHost,
            _ => Self::Other(value),
        }
    }
}

impl From<SystemType> for String {
    fn from(value: SystemType) -> Self {
        value.as_str().to_string()
    }
}
