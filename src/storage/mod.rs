//! Key-value storage abstraction
//!
//! [`KvStore`] is a flat string→string namespace with `get/put/delete/list`.
//! Links, visit counters, reverse-index entries and the admin password all
//! live side by side in it. No multi-key transactions are offered: every
//! caller has to assume check-then-write sequences can interleave.
//!
//! Backends:
//! - [`MemoryStore`]: in-process, used by tests and ephemeral deployments
//! - [`FileStore`]: JSON file, single-node durable store
//! - [`RedisStore`]: Redis, shared durable store

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::StorageConfig;
use crate::errors::{KvLinkError, Result};

pub mod file;
pub mod memory;
pub mod redis;

pub use self::file::FileStore;
pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// 存储层错误
#[derive(Debug, Clone)]
pub enum StorageError {
    Read(String),
    Write(String),
    Delete(String),
    List(String),
    Connection(String),
    Serialization(String),
}

impl StorageError {
    /// 写路径错误（写入、删除）在协议上统一报告为写入上限
    pub fn is_write_side(&self) -> bool {
        matches!(self, StorageError::Write(_) | StorageError::Delete(_))
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Read(msg) => write!(f, "storage read failed: {}", msg),
            StorageError::Write(msg) => write!(f, "storage write failed: {}", msg),
            StorageError::Delete(msg) => write!(f, "storage delete failed: {}", msg),
            StorageError::List(msg) => write!(f, "storage list failed: {}", msg),
            StorageError::Connection(msg) => write!(f, "storage connection failed: {}", msg),
            StorageError::Serialization(msg) => write!(f, "storage serialization failed: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// 外部 KV 存储
#[async_trait]
pub trait KvStore: Send + Sync {
    /// 读取 key，不存在时返回 `Ok(None)`
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// 写入（覆盖）key
    async fn put(&self, key: &str, value: &str) -> StorageResult<()>;

    /// 删除 key，幂等：删除不存在的 key 不是错误
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// 列出全部 key
    async fn list(&self) -> StorageResult<Vec<String>>;

    fn backend_name(&self) -> &'static str;
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &StorageConfig) -> Result<Arc<dyn KvStore>> {
        let store: Arc<dyn KvStore> = match config.backend.as_str() {
            "memory" => Arc::new(MemoryStore::new()),
            "file" => Arc::new(FileStore::open(&config.file_path).await?),
            "redis" => {
                Arc::new(RedisStore::connect(&config.redis_url, &config.redis_key_prefix).await?)
            }
            other => {
                return Err(KvLinkError::Config(format!(
                    "Unknown storage backend: '{}'. Valid: memory, file, redis",
                    other
                )));
            }
        };

        info!("Using storage backend: {}", store.backend_name());
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_factory_rejects_unknown_backend() {
        let config = StorageConfig {
            backend: "etcd".to_string(),
            ..StorageConfig::default()
        };
        let err = StorageFactory::create(&config).await.err().expect("should fail");
        assert!(matches!(err, KvLinkError::Config(_)));
    }

    #[tokio::test]
    async fn test_factory_builds_memory_backend() {
        let config = StorageConfig {
            backend: "memory".to_string(),
            ..StorageConfig::default()
        };
        let store = StorageFactory::create(&config).await.expect("memory store");
        assert_eq!(store.backend_name(), "memory");
    }

    #[test]
    fn test_write_side_classification() {
        assert!(StorageError::Write("x".into()).is_write_side());
        assert!(StorageError::Delete("x".into()).is_write_side());
        assert!(!StorageError::Read("x".into()).is_write_side());
        assert!(!StorageError::List("x".into()).is_write_side());
    }
}
