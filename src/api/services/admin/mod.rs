//! 管理 API
//!
//! - 链接创建、列表、单条查询
//! - 访问日志查看与清空

pub mod error_code;
mod helpers;
mod link_crud;
mod logs;
pub mod routes;
mod types;

pub use types::*;

pub use helpers::{
    created_response, error_from_snaplink, error_response, json_response, success_response,
};

pub use error_code::ErrorCode;

pub use link_crud::{get_all_links, get_link, post_link};
pub use logs::{clear_logs, get_logs};
