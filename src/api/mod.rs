//! HTTP 接口层
//!
//! 只做请求解析与响应渲染，所有映射逻辑都在 `MappingStore` 内。

pub mod services;

use actix_web::web;

/// Register every route in the order actix needs them
///
/// The redirect catch-all must come last.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(services::health_routes())
        .service(services::admin::routes::api_routes())
        .service(services::redirect_routes());
}
