//! HTTP surface
//!
//! - `POST /*`    JSON command API
//! - `OPTIONS /*` CORS preflight (204)
//! - `GET /<key>` resolution

pub mod constants;
pub mod middleware;
pub mod services;

use actix_web::http::Method;
use actix_web::web;

use services::{CommandService, PreflightService, RedirectService};

/// 注册全部路由
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{tail:.*}")
            .route(web::post().to(CommandService::handle_command))
            .route(web::method(Method::OPTIONS).to(PreflightService::handle_preflight))
            .route(web::get().to(RedirectService::handle_redirect)),
    );
}
