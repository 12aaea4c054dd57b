use actix_web::{HttpResponse, Responder};
use tracing::trace;

pub struct PreflightService;

impl PreflightService {
    /// CORS 预检：只返回跨域头
    pub async fn handle_preflight() -> impl Responder {
        trace!("Preflight request");
        HttpResponse::NoContent().finish()
    }
}
