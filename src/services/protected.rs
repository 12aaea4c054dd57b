//! Protected keys and the shared-secret gate
//!
//! A protected key is never readable, writable or listable through the
//! public API: the statically configured names plus whatever value the
//! password currently has. The set is rebuilt for every request from the
//! freshly read password and is never persisted.

use std::collections::HashSet;

use subtle::ConstantTimeEq;

use crate::config::KeysConfig;
use crate::storage::{KvStore, StorageResult};

#[derive(Debug, Clone, Default)]
pub struct ProtectedKeySet {
    keys: HashSet<String>,
}

impl ProtectedKeySet {
    pub fn new(static_keys: &[String], password: Option<&str>) -> Self {
        let mut keys: HashSet<String> = static_keys.iter().cloned().collect();
        // 控制台路径也要保护；空密码不算
        if let Some(pwd) = password.filter(|p| !p.is_empty()) {
            keys.insert(pwd.to_string());
        }
        Self { keys }
    }

    pub fn is_protected(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

/// 单次请求的访问上下文
#[derive(Debug, Clone)]
pub struct AccessContext {
    password: Option<String>,
    protected: ProtectedKeySet,
}

impl AccessContext {
    pub fn new(keys: &KeysConfig, password: Option<String>) -> Self {
        let mut protected = ProtectedKeySet::new(&keys.protected, password.as_deref());
        // 存放密码的 key 总是受保护，即使没有出现在静态列表中
        protected.keys.insert(keys.password_key.clone());
        Self {
            password,
            protected,
        }
    }

    /// 从存储中读取当前密码并构建上下文
    pub async fn load(store: &dyn KvStore, keys: &KeysConfig) -> StorageResult<Self> {
        let password = store.get(&keys.password_key).await?;
        Ok(Self::new(keys, password))
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn protected(&self) -> &ProtectedKeySet {
        &self.protected
    }

    pub fn is_protected(&self, key: &str) -> bool {
        self.protected.is_protected(key)
    }

    /// 校验请求携带的密码
    ///
    /// 未配置密码时，只有同样未携带密码的请求才能通过。
    pub fn password_matches(&self, supplied: Option<&str>) -> bool {
        match (self.password.as_deref(), supplied) {
            (Some(stored), Some(given)) => stored.as_bytes().ct_eq(given.as_bytes()).into(),
            (None, None) => true,
            _ => false,
        }
    }

    /// 路径段是否就是控制台入口
    pub fn is_console_path(&self, segment: &str) -> bool {
        match self.password.as_deref() {
            Some(pwd) if !pwd.is_empty() => pwd.as_bytes().ct_eq(segment.as_bytes()).into(),
            _ => false,
        }
    }
}
