use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::{debug, error, trace};

use super::{KvStore, StorageError, StorageResult};

/// SCAN 每批返回的 key 数量提示
const SCAN_BATCH: usize = 500;

/// Redis KV 存储
///
/// 所有 key 加上 `key_prefix` 前缀，与同一实例上的其他数据隔离。
/// `ConnectionManager` 断线后自动重连，clone 开销很小。
pub struct RedisStore {
    connection: ConnectionManager,
    key_prefix: String,
}

impl RedisStore {
    pub async fn connect(url: &str, key_prefix: &str) -> StorageResult<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            error!("Invalid Redis URL: {}", e);
            StorageError::Connection(e.to_string())
        })?;

        let connection = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to connect to Redis server: {}", e);
            StorageError::Connection(e.to_string())
        })?;

        debug!("RedisStore connected with prefix: '{}'", key_prefix);
        Ok(Self {
            connection,
            key_prefix: key_prefix.to_string(),
        })
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    fn scan_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.key_prefix.len() + 1);
        for ch in self.key_prefix.chars() {
            if matches!(ch, '*' | '?' | '[' | ']' | '\\') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('*');
        pattern
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn
            .get(self.make_key(key))
            .await
            .map_err(|e| StorageError::Read(e.to_string()))?;
        trace!("Redis GET {} -> {}", key, value.is_some());
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn
            .set(self.make_key(key), value)
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn
            .del(self.make_key(key))
            .await
            .map_err(|e| StorageError::Delete(e.to_string()))?;
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        let mut conn = self.connection.clone();
        let pattern = self.scan_pattern();
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| StorageError::List(e.to_string()))?;

            keys.extend(
                batch
                    .into_iter()
                    .filter_map(|k| k.strip_prefix(&self.key_prefix).map(str::to_string)),
            );

            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN 可能重复返回同一个 key
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
