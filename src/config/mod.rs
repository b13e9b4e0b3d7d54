//! 配置模块
//!
//! 静态配置从 `config.toml` 与 `SL__*` 环境变量加载，进程内通过
//! `get_config()` 共享。

mod r#impl;
mod structs;

pub use r#impl::{get_config, init_config, init_config_from};
pub use structs::*;
