//! Command API integration tests
//!
//! Drives `POST /` through the real router over an in-memory store.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::App;
use async_trait::async_trait;
use serde_json::{Value, json};

use kvlinker::api::configure_routes;
use kvlinker::api::middleware::cors_headers;
use kvlinker::config::{AppConfig, FeatureConfig};
use kvlinker::runtime::build_state;
use kvlinker::storage::{KvStore, MemoryStore, StorageError, StorageResult};

// =============================================================================
// Test Setup
// =============================================================================

fn config_with(features: FeatureConfig) -> Arc<AppConfig> {
    Arc::new(AppConfig {
        features,
        ..AppConfig::default()
    })
}

async fn store_with_password() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.put("password", "p").await.unwrap();
    store
}

macro_rules! init_app {
    ($config:expr, $store:expr) => {
        test::init_service(
            App::new()
                .wrap(cors_headers($config.features.cors))
                .app_data(build_state($config.clone(), $store.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

macro_rules! command {
    ($app:expr, $body:expr) => {{
        let req = TestRequest::post().uri("/").set_json($body).to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body
    }};
}

// =============================================================================
// End-to-end scenarios
// =============================================================================

#[actix_rt::test]
async fn test_add_random_key_then_redirect() {
    let store = store_with_password().await;
    let config = config_with(FeatureConfig::default());
    let app = init_app!(config, store);

    let body = command!(
        app,
        json!({"cmd": "add", "url": "https://example.com", "password": "p"})
    );
    assert_eq!(body["status"], 200);
    assert_eq!(body["error"], "");
    let key = body["key"].as_str().unwrap().to_string();
    assert_eq!(key.len(), 6);

    let req = TestRequest::get().uri(&format!("/{}", key)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get("Location").unwrap(),
        "https://example.com"
    );
}

#[actix_rt::test]
async fn test_custom_key_twice_without_overwrite() {
    let store = store_with_password().await;
    let config = config_with(FeatureConfig::default());
    let app = init_app!(config, store);

    let add = json!({"cmd": "add", "key": "mylink", "url": "https://example.com", "password": "p"});
    let first = command!(app, add.clone());
    assert_eq!(first, json!({"status": 200, "key": "mylink", "error": ""}));

    let second = command!(app, add);
    assert_eq!(
        second,
        json!({"status": 500, "key": "mylink", "error": "Error: Specific key existed."})
    );
}

#[actix_rt::test]
async fn test_custom_key_overwrite_enabled() {
    let store = store_with_password().await;
    let config = config_with(FeatureConfig {
        overwrite_kv: true,
        ..FeatureConfig::default()
    });
    let app = init_app!(config, store);

    for url in ["https://a.example.com", "https://b.example.com"] {
        let body = command!(
            app,
            json!({"cmd": "add", "key": "mylink", "url": url, "password": "p"})
        );
        assert_eq!(body["status"], 200);
    }
    assert_eq!(
        store.get("mylink").await.unwrap().as_deref(),
        Some("https://b.example.com")
    );
}

#[actix_rt::test]
async fn test_qryall_lists_only_visible_links() {
    let store = store_with_password().await;
    store.put("mylink", "https://example.com").await.unwrap();
    store.put("mylink-count", "3").await.unwrap();
    let config = config_with(FeatureConfig::default());
    let app = init_app!(config, store);

    let body = command!(app, json!({"cmd": "qryall", "password": "p"}));
    assert_eq!(
        body,
        json!({
            "status": 200,
            "error": "",
            "kvlist": [{"key": "mylink", "value": "https://example.com"}]
        })
    );
}

// =============================================================================
// Round trip and protection
// =============================================================================

#[actix_rt::test]
async fn test_add_query_delete_round_trip() {
    let store = store_with_password().await;
    let config = config_with(FeatureConfig::default());
    let app = init_app!(config, store);

    let pairs = [
        ("abc", "https://example.com/a"),
        ("你好", "https://example.com/b?x=1"),
        ("a-b_c", "http://sub.example.org/path"),
    ];

    for (key, url) in pairs {
        let body = command!(
            app,
            json!({"cmd": "add", "key": key, "url": url, "password": "p"})
        );
        assert_eq!(body["status"], 200, "add {}", key);

        let body = command!(app, json!({"cmd": "qry", "key": key, "password": "p"}));
        assert_eq!(
            body,
            json!({"status": 200, "error": "", "key": key, "url": url})
        );

        let body = command!(app, json!({"cmd": "del", "key": key, "password": "p"}));
        assert_eq!(body, json!({"status": 200, "key": key, "error": ""}));

        let body = command!(app, json!({"cmd": "qry", "key": key, "password": "p"}));
        assert_eq!(
            body,
            json!({"status": 500, "key": key, "error": "Error: Key not exist."})
        );
    }
}

#[actix_rt::test]
async fn test_protected_keys_rejected() {
    let store = store_with_password().await;
    let config = config_with(FeatureConfig::default());
    let app = init_app!(config, store);

    // 静态保护 key 和当前密码值
    for key in ["password", "p"] {
        for cmd in ["add", "del", "qry"] {
            let body = command!(
                app,
                json!({"cmd": cmd, "key": key, "url": "https://example.com", "password": "p"})
            );
            assert_eq!(
                body,
                json!({"status": 500, "key": key, "error": "Error: Key in protect_keylist."})
            );
        }
    }

    // qryall 同样不暴露
    let body = command!(app, json!({"cmd": "qryall", "password": "p"}));
    assert_eq!(body["kvlist"], json!([]));

    let req = TestRequest::get().uri("/password").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert_eq!(store.get("password").await.unwrap().as_deref(), Some("p"));
}

#[actix_rt::test]
async fn test_wrong_password_and_invalid_body() {
    let store = store_with_password().await;
    let config = config_with(FeatureConfig::default());
    let app = init_app!(config, store);

    let body = command!(
        app,
        json!({"cmd": "add", "url": "https://example.com", "password": "wrong"})
    );
    assert_eq!(
        body,
        json!({"status": 500, "key": "", "error": "Error: Invalid password."})
    );

    let req = TestRequest::post()
        .uri("/")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{broken")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Error: Invalid JSON body.");

    assert_eq!(store.len(), 1);
}

#[actix_rt::test]
async fn test_non_string_fields() {
    let store = store_with_password().await;
    store.put("42", "https://example.com/n").await.unwrap();
    let config = config_with(FeatureConfig::default());
    let app = init_app!(config, store);

    // 非字符串密码视为不匹配
    let body = command!(
        app,
        json!({"cmd": "add", "url": "https://example.com", "password": 123})
    );
    assert_eq!(
        body,
        json!({"status": 500, "key": "", "error": "Error: Invalid password."})
    );

    let body = command!(app, json!({"cmd": "qry", "key": 42, "password": "p"}));
    assert_eq!(
        body,
        json!({"status": 200, "error": "", "key": "42", "url": "https://example.com/n"})
    );
}

#[actix_rt::test]
async fn test_invalid_url_echoes_url() {
    let store = store_with_password().await;
    let config = config_with(FeatureConfig::default());
    let app = init_app!(config, store);

    for url in ["ftp://example.com", "example.com", "https://localhost"] {
        let body = command!(app, json!({"cmd": "add", "url": url, "password": "p"}));
        assert_eq!(
            body,
            json!({"status": 500, "url": url, "error": "Error: Url illegal."})
        );
    }
}

#[actix_rt::test]
async fn test_unique_link_returns_same_key() {
    let store = store_with_password().await;
    let config = config_with(FeatureConfig {
        unique_link: true,
        ..FeatureConfig::default()
    });
    let app = init_app!(config, store);

    let add = json!({"cmd": "add", "url": "https://example.com", "password": "p"});
    let first = command!(app, add.clone());
    let second = command!(app, add);
    assert_eq!(first["status"], 200);
    assert_eq!(first["key"], second["key"]);

    // password + 链接 + 反向索引
    assert_eq!(store.len(), 3);

    let body = command!(app, json!({"cmd": "qryall", "password": "p"}));
    assert_eq!(body["kvlist"].as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_qryall_disabled_by_config() {
    let store = store_with_password().await;
    let config = config_with(FeatureConfig {
        load_kv: false,
        ..FeatureConfig::default()
    });
    let app = init_app!(config, store);

    let body = command!(app, json!({"cmd": "qryall", "password": "p"}));
    assert_eq!(
        body,
        json!({"status": 500, "error": "Error: Config.load_kv false."})
    );
}

// =============================================================================
// Transport details
// =============================================================================

#[actix_rt::test]
async fn test_json_content_type_and_cors_headers() {
    let store = store_with_password().await;
    let config = config_with(FeatureConfig::default());
    let app = init_app!(config, store);

    let req = TestRequest::post()
        .uri("/")
        .set_json(json!({"cmd": "qryall", "password": "p"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let headers = resp.headers();
    assert_eq!(
        headers.get("Content-Type").unwrap(),
        "application/json; charset=UTF-8"
    );
    assert_eq!(headers.get("Access-Control-Allow-Origin").unwrap(), "*");
    assert_eq!(
        headers.get("Access-Control-Allow-Methods").unwrap(),
        "POST, OPTIONS"
    );
    assert_eq!(
        headers.get("Access-Control-Allow-Headers").unwrap(),
        "Content-Type"
    );
}

#[actix_rt::test]
async fn test_options_preflight() {
    let store = Arc::new(MemoryStore::new());
    let config = config_with(FeatureConfig::default());
    let app = init_app!(config, store);

    let req = TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/anything")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        resp.headers().get("Access-Control-Allow-Origin").unwrap(),
        "*"
    );
    let body = test::read_body(resp).await;
    assert!(body.is_empty());
}

#[actix_rt::test]
async fn test_cors_disabled_omits_headers() {
    let store = store_with_password().await;
    let config = config_with(FeatureConfig {
        cors: false,
        ..FeatureConfig::default()
    });
    let app = init_app!(config, store);

    let req = TestRequest::post()
        .uri("/")
        .set_json(json!({"cmd": "qryall", "password": "p"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.headers().get("Access-Control-Allow-Origin").is_none());
}

// =============================================================================
// Store failures
// =============================================================================

/// 所有操作都失败的存储
struct BrokenStore;

#[async_trait]
impl KvStore for BrokenStore {
    async fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Read("unavailable".into()))
    }

    async fn put(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Write("unavailable".into()))
    }

    async fn delete(&self, _key: &str) -> StorageResult<()> {
        Err(StorageError::Delete("unavailable".into()))
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        Err(StorageError::List("unavailable".into()))
    }

    fn backend_name(&self) -> &'static str {
        "broken"
    }
}

#[actix_rt::test]
async fn test_store_failure_is_reported_in_body() {
    let store: Arc<dyn KvStore> = Arc::new(BrokenStore);
    let config = config_with(FeatureConfig::default());
    let app = init_app!(config, store);

    let req = TestRequest::post()
        .uri("/")
        .set_json(json!({"cmd": "qry", "key": "abc"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 500);
    assert_eq!(body["error"], "Error: Lookup failed.");

    let req = TestRequest::get().uri("/abc").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
