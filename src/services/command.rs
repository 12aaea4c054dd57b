//! JSON command protocol (`add` / `del` / `qry` / `qryall`)
//!
//! Every outcome is a [`CommandResponse`]; the in-body `status` (200/500) is
//! the protocol signal and is independent of the HTTP status, which stays
//! 200 for every command response.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use serde_repr::Serialize_repr;
use tracing::{debug, error, warn};

use super::link_store::{KvEntry, LinkStore};
use super::protected::AccessContext;
use crate::config::AppConfig;
use crate::errors::{KvLinkError, Result};
use crate::utils::is_content_digest;
use crate::utils::url_validator::validate_url;

/// 请求体
///
/// 字段可以是任意 JSON 值：`cmd` / `url` / `key` 的标量会转换为字符串
/// （数组和对象取其 JSON 文本），`null` 与缺省等价。`password` 保留原始值，
/// 非字符串的密码永远不匹配。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandRequest {
    pub cmd: Option<String>,
    pub url: Option<String>,
    pub key: Option<String>,
    pub password: Option<Value>,
}

impl CommandRequest {
    /// 从任意 JSON 值构造；非对象的 JSON 视为空请求
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::default();
        };

        Self {
            cmd: map.remove("cmd").and_then(value_to_string),
            url: map.remove("url").and_then(value_to_string),
            key: map.remove("key").and_then(value_to_string),
            password: map.remove("password").filter(|v| !v.is_null()),
        }
    }
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// 响应体中的状态码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr)]
#[repr(u16)]
pub enum ApiStatus {
    Ok = 200,
    Failed = 500,
}

/// 响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResponse {
    pub status: ApiStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kvlist: Option<Vec<KvEntry>>,
}

impl CommandResponse {
    fn ok_key(key: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Ok,
            key: Some(key.into()),
            url: None,
            error: String::new(),
            kvlist: None,
        }
    }

    fn ok_value(key: impl Into<String>, value: String) -> Self {
        Self {
            url: Some(value),
            ..Self::ok_key(key)
        }
    }

    fn ok_list(entries: Vec<KvEntry>) -> Self {
        Self {
            status: ApiStatus::Ok,
            key: None,
            url: None,
            error: String::new(),
            kvlist: Some(entries),
        }
    }

    /// 把错误转换为协议响应
    ///
    /// `InvalidUrl` 回显 url，qryall 相关错误不带 key，其余错误回显 key。
    pub fn failure(err: &KvLinkError, key: &str) -> Self {
        let (key, url) = match err {
            KvLinkError::InvalidUrl(url) => (None, Some(url.clone())),
            KvLinkError::ConfigDisabled | KvLinkError::LoadListFailed(_) => (None, None),
            KvLinkError::KeyProtected(k)
            | KvLinkError::KeyExists(k)
            | KvLinkError::KeyNotFound(k) => (Some(k.clone()), None),
            _ => (Some(key.to_string()), None),
        };

        Self {
            status: ApiStatus::Failed,
            key,
            url,
            error: err.protocol_message().to_string(),
            kvlist: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ApiStatus::Ok
    }
}

pub struct CommandDispatcher {
    links: Arc<LinkStore>,
    config: Arc<AppConfig>,
}

impl CommandDispatcher {
    pub fn new(links: Arc<LinkStore>, config: Arc<AppConfig>) -> Self {
        Self { links, config }
    }

    /// 处理原始请求体
    pub async fn dispatch_raw(&self, body: &[u8]) -> CommandResponse {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => self.dispatch(CommandRequest::from_value(value)).await,
            Err(e) => {
                debug!("Rejected command body: {}", e);
                CommandResponse::failure(&KvLinkError::InvalidBody(e.to_string()), "")
            }
        }
    }

    /// 校验密码并分发命令
    pub async fn dispatch(&self, request: CommandRequest) -> CommandResponse {
        let ctx = match AccessContext::load(self.links.store().as_ref(), &self.config.keys).await
        {
            Ok(ctx) => ctx,
            Err(e) => {
                error!("Failed to load password: {}", e);
                return CommandResponse::failure(&KvLinkError::from_read(e), "");
            }
        };

        let password_ok = match &request.password {
            None => ctx.password_matches(None),
            Some(Value::String(given)) => ctx.password_matches(Some(given)),
            Some(_) => false,
        };
        if !password_ok {
            warn!("Command rejected: invalid password");
            return CommandResponse::failure(&KvLinkError::InvalidPassword, "");
        }

        let key = request.key.clone().unwrap_or_default();
        let cmd = request.cmd.as_deref().unwrap_or_default();
        debug!("Dispatching command '{}'", cmd);

        let result = match cmd {
            "add" => self.add(&ctx, &request).await.map(CommandResponse::ok_key),
            "del" => self
                .delete(&ctx, &key)
                .await
                .map(|_| CommandResponse::ok_key(key.clone())),
            "qry" => self
                .query(&ctx, &key)
                .await
                .map(|value| CommandResponse::ok_value(key.clone(), value)),
            "qryall" => self.query_all(&ctx).await.map(CommandResponse::ok_list),
            other => Err(KvLinkError::InvalidCommand(other.to_string())),
        };

        result.unwrap_or_else(|e| {
            match &e {
                KvLinkError::WriteLimitExceeded(_)
                | KvLinkError::KeyGenerationExhausted { .. }
                | KvLinkError::LookupFailed(_)
                | KvLinkError::LoadListFailed(_) => error!("Command '{}' failed: {}", cmd, e),
                _ => debug!("Command '{}' rejected: {}", cmd, e),
            }
            // 未知命令的响应不回显 key
            let echo = if matches!(e, KvLinkError::InvalidCommand(_)) {
                ""
            } else {
                key.as_str()
            };
            CommandResponse::failure(&e, echo)
        })
    }

    async fn add(&self, ctx: &AccessContext, request: &CommandRequest) -> Result<String> {
        let features = &self.config.features;
        let value = request.url.clone().unwrap_or_default();

        if features.system_type.requires_url()
            && let Err(e) = validate_url(&value)
        {
            debug!("Rejected url: {}", e);
            return Err(KvLinkError::InvalidUrl(value));
        }

        match request.key.as_deref() {
            Some(key) if features.custom_link && !key.is_empty() => {
                self.links
                    .create_custom(ctx.protected(), key, &value, features.overwrite_kv)
                    .await
            }
            _ if features.unique_link => self.links.create_unique(&value).await,
            _ => self.links.create_random(&value).await,
        }
    }

    async fn delete(&self, ctx: &AccessContext, key: &str) -> Result<()> {
        self.links.delete(ctx.protected(), key).await
    }

    async fn query(&self, ctx: &AccessContext, key: &str) -> Result<String> {
        if ctx.is_protected(key) {
            return Err(KvLinkError::KeyProtected(key.to_string()));
        }
        // 反向索引不对外暴露
        if is_content_digest(key) {
            return Err(KvLinkError::KeyNotFound(key.to_string()));
        }

        self.links
            .read(ctx.protected(), key)
            .await?
            .ok_or_else(|| KvLinkError::KeyNotFound(key.to_string()))
    }

    async fn query_all(&self, ctx: &AccessContext) -> Result<Vec<KvEntry>> {
        if !self.config.features.load_kv {
            return Err(KvLinkError::ConfigDisabled);
        }
        self.links.list_visible(ctx.protected()).await
    }
}
