use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::trace;

use crate::api::constants::JSON_CONTENT_TYPE;
use crate::services::{AppState, CommandResponse};

pub struct CommandService;

impl CommandService {
    /// 命令 API
    ///
    /// HTTP 状态始终为 200，成功与否看响应体中的 `status`。
    pub async fn handle_command(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
        trace!("Received command request ({} bytes)", body.len());
        let response = state.dispatcher.dispatch_raw(&body).await;
        Self::json_response(&response)
    }

    fn json_response(response: &CommandResponse) -> HttpResponse {
        HttpResponse::build(StatusCode::OK)
            .insert_header(("Content-Type", JSON_CONTENT_TYPE))
            .json(response)
    }
}
