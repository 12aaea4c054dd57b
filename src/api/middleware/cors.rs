//! 跨域头
//!
//! 所有响应都带固定的三条跨域头，不做 Origin 校验；
//! 预检请求由 `PreflightService` 直接返回 204。

use actix_web::middleware::{Condition, DefaultHeaders};

use crate::api::constants::{CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS, CORS_ALLOW_ORIGIN};

pub fn cors_headers(enabled: bool) -> Condition<DefaultHeaders> {
    Condition::new(
        enabled,
        DefaultHeaders::new()
            .add(("Access-Control-Allow-Origin", CORS_ALLOW_ORIGIN))
            .add(("Access-Control-Allow-Methods", CORS_ALLOW_METHODS))
            .add(("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS)),
    )
}
