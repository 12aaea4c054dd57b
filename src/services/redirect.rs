//! GET resolution policy
//!
//! Turns a request path + query into a transport-free [`Resolution`]; the
//! HTTP layer only renders it. Side effects (visit counter, snapshot delete)
//! happen here, before the response shape is decided.

use std::sync::Arc;

use tracing::{debug, trace};

use super::link_store::LinkStore;
use super::protected::AccessContext;
use crate::config::{AppConfig, SystemType};
use crate::errors::{KvLinkError, Result};
use crate::utils::data_uri::{DecodedBlob, decode_data_uri};
use crate::utils::is_content_digest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// 空路径：跳转到默认地址
    Fallback(String),
    /// 路径等于密码：返回管理控制台
    AdminConsole { password: String },
    NotFound,
    /// shorturl：302 跳转
    Redirect(String),
    /// 结果页，值替换进模板
    ResultPage(String),
    /// imghost：二进制内容
    Blob(DecodedBlob),
    /// 其他模式：原样返回
    Content(String),
}

pub struct RedirectResolver {
    links: Arc<LinkStore>,
    config: Arc<AppConfig>,
}

impl RedirectResolver {
    pub fn new(links: Arc<LinkStore>, config: Arc<AppConfig>) -> Self {
        Self { links, config }
    }

    /// 取路径的第一段并做百分号解码
    pub fn key_from_path(path: &str) -> String {
        let segment = path.split('/').nth(1).unwrap_or_default();
        urlencoding::decode(segment)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| segment.to_string())
    }

    pub async fn resolve(&self, path: &str, query: Option<&str>) -> Result<Resolution> {
        let key = Self::key_from_path(path);

        if key.is_empty() {
            return Ok(Resolution::Fallback(self.config.pages.fallback_url.clone()));
        }

        let ctx = AccessContext::load(self.links.store().as_ref(), &self.config.keys)
            .await
            .map_err(KvLinkError::from_read)?;

        if ctx.is_console_path(&key) {
            debug!("Serving admin console");
            return Ok(Resolution::AdminConsole {
                password: key,
            });
        }

        // 反向索引不能被直接访问
        if is_content_digest(&key) {
            trace!("Reverse-index key requested: {}", key);
            return Ok(Resolution::NotFound);
        }

        let value = match self.links.read(ctx.protected(), &key).await? {
            Some(value) if !value.is_empty() => value,
            _ => {
                trace!("Key not found: {}", key);
                return Ok(Resolution::NotFound);
            }
        };

        self.links.record_visit(&key).await?;
        self.links.consume_if_snapshot(&key).await?;

        let value = match query.filter(|q| !q.is_empty()) {
            Some(q) => format!("{}?{}", value, q),
            None => value,
        };

        if self.config.features.result_page {
            return Ok(Resolution::ResultPage(value));
        }

        match &self.config.features.system_type {
            SystemType::ShortUrl => Ok(Resolution::Redirect(value)),
            SystemType::ImgHost => decode_data_uri(&value)
                .map(Resolution::Blob)
                .map_err(|e| KvLinkError::InvalidContent(format!("{}: {}", key, e))),
            SystemType::Other(_) => Ok(Resolution::Content(value)),
        }
    }
}
