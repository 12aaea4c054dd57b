//! HTML 页面模板
//!
//! 管理控制台和结果页模板可以是远程 URL，也可以是本地文件。
//! 模板内容缓存在 moka 中，过期后重新拉取。

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{trace, warn};
use ureq::Agent;

use crate::config::PagesConfig;
use crate::errors::{KvLinkError, Result};

/// 控制台模板中的密码占位符
pub const PASSWORD_PLACEHOLDER: &str = "__PASSWORD__";
/// 结果页模板中的最终链接占位符
pub const FINAL_LINK_PLACEHOLDER: &str = "{__FINAL_LINK__}";

pub const NOT_FOUND_HTML: &str = r#"<!DOCTYPE html>
<html>
  <body>
    <h1>404 Not Found.</h1>
    <p>The url you visit is not found.</p>
  </body>
</html>"#;

pub struct PageRenderer {
    config: PagesConfig,
    agent: Agent,
    cache: Cache<String, Arc<String>>,
}

impl PageRenderer {
    pub fn new(config: PagesConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.fetch_timeout_secs)))
            .build()
            .into();
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(config.cache_ttl_secs.max(1)))
            .max_capacity(16)
            .build();

        Self {
            config,
            agent,
            cache,
        }
    }

    /// 渲染管理控制台
    pub async fn admin_console(&self, password: &str) -> Result<String> {
        let template = self.template(&self.config.index_html).await?;
        Ok(template.replace(PASSWORD_PLACEHOLDER, password))
    }

    /// 渲染结果页
    pub async fn result_page(&self, final_link: &str) -> Result<String> {
        let template = self.template(&self.config.result_html).await?;
        Ok(template.replace(FINAL_LINK_PLACEHOLDER, final_link))
    }

    async fn template(&self, source: &str) -> Result<Arc<String>> {
        let agent = self.agent.clone();
        let owned = source.to_string();

        self.cache
            .try_get_with(owned.clone(), async move {
                trace!("Page template cache miss: {}", owned);
                Self::load(agent, owned).await.map(Arc::new)
            })
            .await
            .map_err(|e| (*e).clone())
    }

    async fn load(agent: Agent, source: String) -> Result<String> {
        if source.starts_with("http://") || source.starts_with("https://") {
            // ureq 是同步客户端，放到阻塞线程池里执行
            tokio::task::spawn_blocking(move || Self::fetch_sync(&agent, &source))
                .await
                .map_err(|e| KvLinkError::PageFetch(e.to_string()))?
        } else {
            tokio::fs::read_to_string(&source).await.map_err(|e| {
                warn!("Failed to read page template {}: {}", source, e);
                KvLinkError::PageFetch(format!("{}: {}", source, e))
            })
        }
    }

    fn fetch_sync(agent: &Agent, url: &str) -> Result<String> {
        let response = agent.get(url).call().map_err(|e| {
            warn!("Page template request to \"{}\" failed: {}", url, e);
            KvLinkError::PageFetch(format!("{}: {}", url, e))
        })?;

        response
            .into_body()
            .read_to_string()
            .map_err(|e| KvLinkError::PageFetch(format!("{}: {}", url, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn renderer_for(dir: &TempDir) -> PageRenderer {
        let index = dir.path().join("index.html");
        let result = dir.path().join("result.html");
        std::fs::write(&index, "<a href=\"/__PASSWORD__\">__PASSWORD__</a>").unwrap();
        std::fs::write(&result, "<p>{__FINAL_LINK__}</p>").unwrap();

        PageRenderer::new(PagesConfig {
            index_html: index.display().to_string(),
            result_html: result.display().to_string(),
            ..PagesConfig::default()
        })
    }

    #[tokio::test]
    async fn test_admin_console_substitutes_every_placeholder() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer_for(&dir);

        let html = renderer.admin_console("s3cret").await.unwrap();
        assert_eq!(html, "<a href=\"/s3cret\">s3cret</a>");
    }

    #[tokio::test]
    async fn test_result_page_substitution() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer_for(&dir);

        let html = renderer.result_page("https://example.com?a=1").await.unwrap();
        assert_eq!(html, "<p>https://example.com?a=1</p>");
    }

    #[tokio::test]
    async fn test_missing_template_is_page_fetch_error() {
        let renderer = PageRenderer::new(PagesConfig {
            index_html: "/definitely/missing/index.html".to_string(),
            ..PagesConfig::default()
        });

        assert!(matches!(
            renderer.admin_console("p").await,
            Err(KvLinkError::PageFetch(_))
        ));
    }
}
