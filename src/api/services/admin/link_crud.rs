//! 链接创建与查询

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::{info, trace};

use crate::api::services::LinkSettings;
use crate::errors::SnaplinkError;
use crate::storage::{CreateMappingRequest, MappingStore};

use super::helpers::{created_response, error_from_snaplink, success_response};
use super::types::{LinkListResponse, LinkResponse, PostNewLink};

/// POST /api/links
pub async fn post_link(
    payload: web::Json<PostNewLink>,
    store: web::Data<Arc<MappingStore>>,
    settings: web::Data<LinkSettings>,
) -> impl Responder {
    let payload = payload.into_inner();
    trace!("API: create request for {}", payload.url);

    let validity_minutes = match payload
        .validity_minutes()
        .and_then(|v| check_reserved(payload.shortcode.as_deref()).map(|_| v))
    {
        Ok(v) => v,
        Err(e) => {
            // 在进入 store 之前就被拒绝，这里补记一条 ERROR 事件
            store.report_error(
                &e,
                json!({
                    "longUrl": payload.url,
                    "validMinutes": payload.validity,
                    "shortcode": payload.shortcode,
                }),
            );
            return error_from_snaplink(&e);
        }
    };

    let request = CreateMappingRequest {
        destination_url: payload.url,
        validity_minutes,
        requested_code: payload.shortcode,
    };

    match store.create(request) {
        Ok(record) => {
            let short_url = settings.short_url(&record.short_code);
            info!("API: created {} -> {}", short_url, record.destination_url);
            created_response(LinkResponse::from_record(record, short_url, store.now()))
        }
        Err(e) => error_from_snaplink(&e),
    }
}

/// Codes shadowed by the service's own top-level routes
const RESERVED_CODES: [&str; 2] = ["health", "api"];

fn check_reserved(code: Option<&str>) -> Result<(), SnaplinkError> {
    match code.map(str::trim) {
        Some(code) if RESERVED_CODES.iter().any(|r| r.eq_ignore_ascii_case(code)) => {
            Err(SnaplinkError::invalid_code_format(format!(
                "Short code '{}' conflicts with reserved routes",
                code
            )))
        }
        _ => Ok(()),
    }
}

/// GET /api/links
pub async fn get_all_links(
    store: web::Data<Arc<MappingStore>>,
    settings: web::Data<LinkSettings>,
) -> impl Responder {
    let now = store.now();
    let links: Vec<LinkResponse> = store
        .list()
        .into_iter()
        .map(|record| {
            let short_url = settings.short_url(&record.short_code);
            LinkResponse::from_record(record, short_url, now)
        })
        .collect();

    let expired = links.iter().filter(|l| l.expired).count();
    trace!("API: listing {} links ({} expired)", links.len(), expired);

    success_response(LinkListResponse {
        total: links.len(),
        active: links.len() - expired,
        expired,
        links,
    })
}

/// GET /api/links/{code}
pub async fn get_link(
    path: web::Path<String>,
    store: web::Data<Arc<MappingStore>>,
    settings: web::Data<LinkSettings>,
) -> HttpResponse {
    let code = path.into_inner();
    match store.get(&code) {
        Some(record) => {
            let short_url = settings.short_url(&record.short_code);
            success_response(LinkResponse::from_record(record, short_url, store.now()))
        }
        None => error_from_snaplink(&SnaplinkError::not_found(format!(
            "Short code '{}' not found",
            code
        ))),
    }
}
