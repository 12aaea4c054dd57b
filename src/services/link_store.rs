//! Link management service
//!
//! Domain wrapper over [`KvStore`]: custom / unique / random creation,
//! protected-key enforcement, visit counters and snapshot deletion.
//!
//! Nothing here is atomic across keys. Custom-key existence checks, the
//! unique-link reverse index and counter increments are all
//! read-then-write; concurrent writers to the same key can lose updates.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, trace};

use super::key_generator::KeyGenerator;
use super::protected::ProtectedKeySet;
use crate::config::{AppConfig, FeatureConfig};
use crate::errors::{KvLinkError, Result};
use crate::storage::KvStore;
use crate::utils::{content_digest, is_content_digest};

/// 访问计数 key 的后缀
pub const COUNTER_SUFFIX: &str = "-count";

/// qryall 返回的单个条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KvEntry {
    pub key: String,
    pub value: Option<String>,
}

pub struct LinkStore {
    store: Arc<dyn KvStore>,
    generator: KeyGenerator,
    features: FeatureConfig,
}

impl LinkStore {
    pub fn new(store: Arc<dyn KvStore>, config: &AppConfig) -> Self {
        let generator = KeyGenerator::new(
            Arc::clone(&store),
            config.keys.key_length,
            config.keys.max_attempts,
        );
        Self {
            store,
            generator,
            features: config.features.clone(),
        }
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    pub fn counter_key(key: &str) -> String {
        format!("{}{}", key, COUNTER_SUFFIX)
    }

    pub fn is_counter_key(key: &str) -> bool {
        key.ends_with(COUNTER_SUFFIX)
    }

    /// 使用用户指定的 key
    pub async fn create_custom(
        &self,
        protected: &ProtectedKeySet,
        key: &str,
        value: &str,
        allow_overwrite: bool,
    ) -> Result<String> {
        if protected.is_protected(key) {
            return Err(KvLinkError::KeyProtected(key.to_string()));
        }

        if !allow_overwrite {
            let existing = self
                .store
                .get(key)
                .await
                .map_err(KvLinkError::from_write)?;
            if existing.is_some() {
                return Err(KvLinkError::KeyExists(key.to_string()));
            }
        }

        self.store
            .put(key, value)
            .await
            .map_err(KvLinkError::from_write)?;
        info!("Created custom key: {}", key);
        Ok(key.to_string())
    }

    /// unique_link 模式：相同的值复用同一个 key
    pub async fn create_unique(&self, value: &str) -> Result<String> {
        let digest = content_digest(value);

        if let Some(existing) = self
            .store
            .get(&digest)
            .await
            .map_err(KvLinkError::from_write)?
            .filter(|k| !k.is_empty())
        {
            debug!("Reusing key {} for identical value", existing);
            return Ok(existing);
        }

        let key = self.create_random(value).await?;
        self.store
            .put(&digest, &key)
            .await
            .map_err(KvLinkError::from_write)?;
        Ok(key)
    }

    /// 随机 key，不去重
    pub async fn create_random(&self, value: &str) -> Result<String> {
        let key = self.generator.generate().await.map_err(|e| match e {
            KvLinkError::LookupFailed(msg) => KvLinkError::WriteLimitExceeded(msg),
            other => other,
        })?;

        self.store
            .put(&key, value)
            .await
            .map_err(KvLinkError::from_write)?;
        info!("Created random key: {}", key);
        Ok(key)
    }

    /// 删除链接（及其访问计数）；删除不存在的 key 不是错误
    pub async fn delete(&self, protected: &ProtectedKeySet, key: &str) -> Result<()> {
        if protected.is_protected(key) {
            return Err(KvLinkError::KeyProtected(key.to_string()));
        }

        self.store
            .delete(key)
            .await
            .map_err(KvLinkError::from_write)?;

        if self.features.visit_count {
            self.store
                .delete(&Self::counter_key(key))
                .await
                .map_err(KvLinkError::from_write)?;
        }

        info!("Deleted key: {}", key);
        Ok(())
    }

    /// 读取值；受保护的 key 与不存在的 key 不作区分
    pub async fn read(&self, protected: &ProtectedKeySet, key: &str) -> Result<Option<String>> {
        if protected.is_protected(key) {
            trace!("Read of protected key masked as missing");
            return Ok(None);
        }

        self.store.get(key).await.map_err(KvLinkError::from_read)
    }

    /// 全量遍历：过滤受保护 key、访问计数和反向索引
    ///
    /// N 个 key 需要 1 次 list + N 次顺序读取，只适合小规模部署。
    pub async fn list_visible(&self, protected: &ProtectedKeySet) -> Result<Vec<KvEntry>> {
        let keys = self
            .store
            .list()
            .await
            .map_err(|e| KvLinkError::LoadListFailed(e.to_string()))?;

        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            if protected.is_protected(&key) || Self::is_counter_key(&key) || is_content_digest(&key)
            {
                continue;
            }

            let value = self
                .store
                .get(&key)
                .await
                .map_err(|e| KvLinkError::LoadListFailed(e.to_string()))?;
            entries.push(KvEntry { key, value });
        }

        Ok(entries)
    }

    /// 记录一次访问；计数值损坏时重置为 1
    pub async fn record_visit(&self, key: &str) -> Result<()> {
        if !self.features.visit_count {
            return Ok(());
        }

        let counter_key = Self::counter_key(key);
        let current = self
            .store
            .get(&counter_key)
            .await
            .map_err(KvLinkError::from_read)?;

        let next = match current.as_deref().and_then(parse_counter) {
            Some(count) => count.saturating_add(1),
            None => 1,
        };

        self.store
            .put(&counter_key, &next.to_string())
            .await
            .map_err(KvLinkError::from_write)?;
        trace!("Visit count for {} -> {}", key, next);
        Ok(())
    }

    /// 阅后即焚：成功读取后删除链接
    pub async fn consume_if_snapshot(&self, key: &str) -> Result<()> {
        if !self.features.snapchat_mode {
            return Ok(());
        }

        self.store
            .delete(key)
            .await
            .map_err(KvLinkError::from_write)?;
        debug!("Snapshot link consumed: {}", key);
        Ok(())
    }
}

/// 解析计数值，取开头的十进制数字（与旧数据的宽松格式兼容）
/// 解析计数器的前导整数（可带符号），其后的非数字字符忽略
fn parse_counter(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['+', '-']));
    let digits_end = trimmed[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed.len(), |i| sign_len + i);
    trimmed[..digits_end].parse().ok()
}
