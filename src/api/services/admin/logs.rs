//! 访问日志查看

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use tracing::info;

use crate::analytics::MemorySink;

use super::error_code::ErrorCode;
use super::helpers::{error_response, success_response};

fn log_disabled() -> HttpResponse {
    error_response(
        StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::ServiceUnavailable,
        "In-memory access log is disabled",
    )
}

/// GET /api/logs
pub async fn get_logs(memory: Option<web::Data<Arc<MemorySink>>>) -> HttpResponse {
    match memory {
        Some(memory) => success_response(memory.entries()),
        None => log_disabled(),
    }
}

/// DELETE /api/logs
pub async fn clear_logs(memory: Option<web::Data<Arc<MemorySink>>>) -> HttpResponse {
    match memory {
        Some(memory) => {
            let cleared = memory.len();
            memory.clear();
            info!("API: cleared {} access log entries", cleared);
            success_response(serde_json::json!({ "cleared": cleared }))
        }
        None => log_disabled(),
    }
}
