use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use super::{KvStore, StorageError, StorageResult};

/// JSON 文件 KV 存储
///
/// 全量数据常驻内存，每次修改都整体重写文件（先写临时文件再 rename）。
/// 写锁覆盖内存修改和落盘，同一进程内的写入是串行的。
pub struct FileStore {
    file_path: PathBuf,
    data: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    pub async fn open(file_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let file_path = file_path.into();
        let data = Self::load_from_file(&file_path).await?;
        info!(
            "FileStore loaded {} entries from {}",
            data.len(),
            file_path.display()
        );

        Ok(Self {
            file_path,
            data: RwLock::new(data),
        })
    }

    async fn load_from_file(path: &PathBuf) -> StorageResult<BTreeMap<String, String>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                error!("解析存储文件失败: {}", e);
                StorageError::Serialization(format!("{}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("存储文件不存在，创建空的存储: {}", path.display());
                let empty = BTreeMap::new();
                Self::write_file(path, &empty).await?;
                Ok(empty)
            }
            Err(e) => Err(StorageError::Connection(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn write_file(path: &PathBuf, data: &BTreeMap<String, String>) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;

        debug!("FileStore flushed {} entries", data.len());
        Ok(())
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self.data.write().await;
        let previous = data.insert(key.to_string(), value.to_string());

        if let Err(e) = Self::write_file(&self.file_path, &data).await {
            // 落盘失败时回滚内存状态，保持与文件一致
            match previous {
                Some(old) => data.insert(key.to_string(), old),
                None => data.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut data = self.data.write().await;
        let Some(previous) = data.remove(key) else {
            return Ok(());
        };

        if let Err(e) = Self::write_file(&self.file_path, &data).await {
            data.insert(key.to_string(), previous);
            return Err(StorageError::Delete(e.to_string()));
        }
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        Ok(self.data.read().await.keys().cloned().collect())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("links.json");

        let store = FileStore::open(&path).await.unwrap();
        assert!(path.exists());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("links.json");

        {
            let store = FileStore::open(&path).await.unwrap();
            store.put("abc", "https://example.com").await.unwrap();
            store.put("gone", "x").await.unwrap();
            store.delete("gone").await.unwrap();
        }

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get("abc").await.unwrap().as_deref(),
            Some("https://example.com")
        );
        assert_eq!(reopened.get("gone").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupted_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("links.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            FileStore::open(&path).await,
            Err(StorageError::Serialization(_))
        ));
    }
}
