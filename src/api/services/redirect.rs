use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::{debug, error};

use crate::api::constants::HTML_CONTENT_TYPE;
use crate::errors::KvLinkError;
use crate::services::pages::NOT_FOUND_HTML;
use crate::services::{AppState, Resolution};

pub struct RedirectService;

impl RedirectService {
    pub async fn handle_redirect(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
        let query = req.query_string();
        let query = (!query.is_empty()).then_some(query);

        match state.resolver.resolve(req.path(), query).await {
            Ok(resolution) => Self::render(&state, resolution).await,
            Err(e) => {
                error!("Resolution of {} failed: {}", req.path(), e);
                Self::error_response(&e)
            }
        }
    }

    async fn render(state: &AppState, resolution: Resolution) -> HttpResponse {
        match resolution {
            Resolution::Fallback(url) | Resolution::Redirect(url) => Self::found(&url),
            Resolution::AdminConsole { password } => {
                match state.pages.admin_console(&password).await {
                    Ok(html) => Self::html(StatusCode::OK, html),
                    Err(e) => Self::error_response(&e),
                }
            }
            Resolution::ResultPage(value) => match state.pages.result_page(&value).await {
                Ok(html) => Self::html(StatusCode::OK, html),
                Err(e) => Self::error_response(&e),
            },
            Resolution::NotFound => Self::not_found_response(),
            Resolution::Blob(blob) => HttpResponse::build(StatusCode::OK)
                .insert_header(("Content-Type", blob.content_type))
                .body(blob.bytes),
            Resolution::Content(value) => Self::html(StatusCode::OK, value),
        }
    }

    #[inline]
    fn found(location: &str) -> HttpResponse {
        debug!("302 -> {}", location);
        HttpResponse::build(StatusCode::FOUND)
            .insert_header(("Location", location))
            .finish()
    }

    #[inline]
    fn html(status: StatusCode, body: String) -> HttpResponse {
        HttpResponse::build(status)
            .insert_header(("Content-Type", HTML_CONTENT_TYPE))
            .body(body)
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        Self::html(StatusCode::NOT_FOUND, NOT_FOUND_HTML.to_string())
    }

    fn error_response(err: &KvLinkError) -> HttpResponse {
        let status = match err {
            KvLinkError::PageFetch(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        HttpResponse::build(status)
            .insert_header(("Content-Type", "text/plain; charset=UTF-8"))
            .body(status.canonical_reason().unwrap_or("Error"))
    }
}
