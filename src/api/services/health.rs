use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::storage::MappingStore;

use super::admin::success_response;

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime: i64,
    pub links_count: usize,
}

pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        store: web::Data<Arc<MappingStore>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        trace!("Received health check request");

        let now = Utc::now();
        let uptime = (now - app_start_time.start_datetime).num_seconds().max(0);

        success_response(HealthResponse {
            status: "healthy".to_string(),
            timestamp: now,
            uptime,
            links_count: store.len(),
        })
    }

    pub async fn liveness_check() -> HttpResponse {
        HttpResponse::NoContent().finish()
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("/live", web::get().to(HealthService::liveness_check))
}
