//! API 模块常量定义

/// JSON 响应的 Content-Type
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// HTML 响应的 Content-Type
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// 跨域头（features.cors 开启时附加到所有响应）
pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "POST, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type";
