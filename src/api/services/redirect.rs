use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, error, trace};

use crate::errors::SnaplinkError;
use crate::storage::{MappingStore, RequestContext};
use crate::utils::is_resolvable_code;

/// Headers consulted, in order, for a coarse location label
const LOCATION_HEADERS: [&str; 3] = ["x-coarse-location", "cf-ipcountry", "x-country-code"];

pub struct RedirectService {}

impl RedirectService {
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        store: web::Data<Arc<MappingStore>>,
    ) -> HttpResponse {
        let code = path.into_inner();

        if !is_resolvable_code(&code) {
            // 非法短码，直接 404（不进 store、不记日志）
            trace!("Invalid short code rejected: {}", &code);
            return Self::not_found_response();
        }

        let ctx = Self::request_context(&req);
        match store.resolve(&code, &ctx) {
            Ok(record) => Self::finish_redirect(&record.destination_url),
            Err(SnaplinkError::NotFound(_)) => {
                debug!("Redirect link not found: {}", &code);
                Self::not_found_response()
            }
            Err(SnaplinkError::Expired(_)) => {
                debug!("Redirect link expired: {}", &code);
                Self::expired_response()
            }
            Err(e) => {
                error!("Unexpected error during redirect lookup: {}", e);
                Self::error_response()
            }
        }
    }

    /// 从请求头提取来源与粗粒度位置
    pub fn request_context(req: &HttpRequest) -> RequestContext {
        let source = header_value(req, "user-agent").unwrap_or(RequestContext::UNKNOWN_SOURCE);
        let location = LOCATION_HEADERS
            .iter()
            .find_map(|name| header_value(req, name))
            .unwrap_or(RequestContext::UNKNOWN_LOCATION);

        RequestContext::new(source, location)
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .body("Not Found")
    }

    #[inline]
    fn expired_response() -> HttpResponse {
        HttpResponse::build(StatusCode::GONE)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .body("This link has expired")
    }

    #[inline]
    fn error_response() -> HttpResponse {
        HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .body("Internal Server Error")
    }

    fn finish_redirect(target: &str) -> HttpResponse {
        HttpResponse::build(StatusCode::TEMPORARY_REDIRECT)
            .insert_header(("Location", target))
            .insert_header(("Cache-Control", "no-store"))
            .finish()
    }
}

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Redirect 路由配置
pub fn redirect_routes() -> actix_web::Scope {
    web::scope("").route("/{code}", web::get().to(RedirectService::handle_redirect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_request_context_from_headers() {
        let req = TestRequest::default()
            .insert_header(("User-Agent", "Mozilla/5.0"))
            .insert_header(("CF-IPCountry", "DE"))
            .to_http_request();
        let ctx = RedirectService::request_context(&req);
        assert_eq!(ctx.source, "Mozilla/5.0");
        assert_eq!(ctx.location, "DE");
    }

    #[test]
    fn test_request_context_prefers_explicit_location() {
        let req = TestRequest::default()
            .insert_header(("X-Coarse-Location", "Europe"))
            .insert_header(("CF-IPCountry", "DE"))
            .to_http_request();
        let ctx = RedirectService::request_context(&req);
        assert_eq!(ctx.location, "Europe");
        assert_eq!(ctx.source, RequestContext::UNKNOWN_SOURCE);
    }

    #[test]
    fn test_request_context_defaults() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(RedirectService::request_context(&req), RequestContext::default());
    }
}
