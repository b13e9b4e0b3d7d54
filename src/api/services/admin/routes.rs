//! API 路由配置

use actix_web::web;

use super::link_crud::{get_all_links, get_link, post_link};
use super::logs::{clear_logs, get_logs};

/// 链接路由 `/links`
///
/// - GET /links - 获取所有链接（含已过期）
/// - POST /links - 创建链接
/// - GET /links/{code} - 获取单个链接（不计点击）
pub fn links_routes() -> actix_web::Scope {
    web::scope("/links")
        .route("", web::get().to(get_all_links))
        .route("", web::post().to(post_link))
        .route("/{code}", web::get().to(get_link))
}

/// 访问日志路由 `/logs`
pub fn logs_routes() -> actix_web::Scope {
    web::scope("/logs")
        .route("", web::get().to(get_logs))
        .route("", web::delete().to(clear_logs))
}

/// `/api` 下的全部路由
pub fn api_routes() -> actix_web::Scope {
    web::scope("/api")
        .service(links_routes())
        .service(logs_routes())
}
