//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::SnaplinkError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字。按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 3000-3099: 链接错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    InternalServerError = 1005,
    ServiceUnavailable = 1030,

    // 链接错误 3000-3099
    LinkNotFound = 3000,
    LinkAlreadyExists = 3001,
    LinkInvalidUrl = 3002,
    LinkInvalidValidity = 3003,
    LinkInvalidCode = 3004,
    LinkExpired = 3005,
    LinkCodeExhausted = 3006,
}

impl From<&SnaplinkError> for ErrorCode {
    fn from(err: &SnaplinkError) -> Self {
        match err {
            SnaplinkError::InvalidUrl(_) => ErrorCode::LinkInvalidUrl,
            SnaplinkError::InvalidValidity(_) => ErrorCode::LinkInvalidValidity,
            SnaplinkError::InvalidCodeFormat(_) => ErrorCode::LinkInvalidCode,
            SnaplinkError::CodeConflict(_) => ErrorCode::LinkAlreadyExists,
            SnaplinkError::NotFound(_) => ErrorCode::LinkNotFound,
            SnaplinkError::Expired(_) => ErrorCode::LinkExpired,
            SnaplinkError::GeneratorExhausted(_) => ErrorCode::LinkCodeExhausted,
            SnaplinkError::Config(_)
            | SnaplinkError::FileOperation(_)
            | SnaplinkError::Serialization(_) => ErrorCode::InternalServerError,
        }
    }
}
