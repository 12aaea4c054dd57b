//! 管理员密码 CLI 命令
//!
//! 密码以明文保存在存储中的 `keys.password_key` 下，命令 API 和控制台路径都直接与它比较。

use std::io::{self, BufRead};

use colored::Colorize;

use crate::cli::CliError;
use crate::config::KeysConfig;
use crate::storage::KvStore;

/// 从参数或 stdin 获取密码
fn read_password(value: Option<String>, stdin: bool) -> Result<String, CliError> {
    let password = if stdin {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| CliError::CommandError(format!("Failed to read from stdin: {}", e)))?;
        line.trim().to_string()
    } else {
        value.ok_or_else(|| {
            CliError::ParseError("No password provided. Pass it as an argument or use --stdin".into())
        })?
    };

    if password.is_empty() {
        return Err(CliError::ParseError("Password cannot be empty".into()));
    }
    // 路径段不能包含 '/'，否则控制台无法通过 GET 访问
    if password.contains('/') {
        return Err(CliError::ParseError("Password cannot contain '/'".into()));
    }
    Ok(password)
}

pub async fn password_set(
    store: &dyn KvStore,
    keys: &KeysConfig,
    value: Option<String>,
    stdin: bool,
) -> Result<(), CliError> {
    let password = read_password(value, stdin)?;

    // 新密码会成为受保护 key，已存在同名链接时拒绝
    if let Some(existing) = store.get(&password).await?
        && !existing.is_empty()
    {
        return Err(CliError::CommandError(
            "A link with the same key already exists; choose another password".into(),
        ));
    }

    store.put(&keys.password_key, &password).await?;
    println!("{} Admin password updated", "✓".green().bold());
    Ok(())
}

pub async fn password_clear(store: &dyn KvStore, keys: &KeysConfig) -> Result<(), CliError> {
    store.delete(&keys.password_key).await?;
    println!(
        "{} Admin password removed; the command API now accepts requests without a password",
        "!".yellow().bold()
    );
    Ok(())
}

pub async fn password_show(store: &dyn KvStore, keys: &KeysConfig) -> Result<(), CliError> {
    match store.get(&keys.password_key).await? {
        Some(p) if !p.is_empty() => println!(
            "{} Admin password is configured ({} characters)",
            "✓".green().bold(),
            p.chars().count()
        ),
        _ => println!("{} No admin password configured", "!".yellow().bold()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn test_set_show_clear() {
        let store = MemoryStore::new();
        let keys = KeysConfig::default();

        password_set(&store, &keys, Some("s3cret".into()), false)
            .await
            .unwrap();
        assert_eq!(
            store.get("password").await.unwrap().as_deref(),
            Some("s3cret")
        );
        password_show(&store, &keys).await.unwrap();

        password_clear(&store, &keys).await.unwrap();
        assert_eq!(store.get("password").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_rejects_invalid_passwords() {
        let store = MemoryStore::new();
        let keys = KeysConfig::default();

        assert!(password_set(&store, &keys, None, false).await.is_err());
        assert!(password_set(&store, &keys, Some(String::new()), false).await.is_err());
        assert!(password_set(&store, &keys, Some("a/b".into()), false).await.is_err());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_set_rejects_password_shadowing_link() {
        let store = MemoryStore::new();
        let keys = KeysConfig::default();
        store.put("abc", "https://example.com").await.unwrap();

        assert!(password_set(&store, &keys, Some("abc".into()), false).await.is_err());
        assert_eq!(store.get("password").await.unwrap(), None);
    }
}
