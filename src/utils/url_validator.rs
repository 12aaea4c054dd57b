//! URL 验证模块
//!
//! shorturl 模式下 `add` 的值必须以 `http(s)://` 开头，紧跟一个形如
//! `label.label` 的主机名前缀。规则很宽松：只检查主机名开头，之后的
//! 字符（端口、结尾的点、路径里的任意字符）都不做限制。

/// URL 验证错误
#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    InvalidProtocol(String),
    InvalidHost(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::InvalidProtocol(proto) => write!(
                f,
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                proto
            ),
            Self::InvalidHost(host) => write!(f, "Invalid host: {}", host),
        }
    }
}

impl std::error::Error for UrlValidationError {}

#[inline]
fn is_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// 从 `s` 开头取一个非空的 `[A-Za-z0-9_-]+` 标签，返回剩余部分
fn take_label(s: &str) -> Option<&str> {
    let end = s.find(|c: char| !is_label_char(c)).unwrap_or(s.len());
    (end > 0).then(|| &s[end..])
}

/// 验证 URL
///
/// 检查项目：
/// 1. 以 `http://` 或 `https://` 开头（小写，与旧版客户端行为一致）
/// 2. authority 中不含 userinfo（`@`）
/// 3. 主机名以 `[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+` 开头（仅 ASCII）
pub fn validate_url(url: &str) -> Result<(), UrlValidationError> {
    if url.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    else {
        let proto = url
            .split(':')
            .next()
            .map(|s| format!("{}:", s))
            .unwrap_or_default();
        return Err(UrlValidationError::InvalidProtocol(proto));
    };

    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if authority.contains('@') {
        return Err(UrlValidationError::InvalidHost(authority.to_string()));
    }

    let host_ok = take_label(rest)
        .and_then(|after| after.strip_prefix('.'))
        .and_then(take_label)
        .is_some();
    if !host_ok {
        return Err(UrlValidationError::InvalidHost(authority.to_string()));
    }

    Ok(())
}

/// 便捷判断
pub fn is_valid_url(url: &str) -> bool {
    validate_url(url).is_ok()
}
