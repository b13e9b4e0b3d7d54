//! API 类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SnaplinkError};
use crate::storage::{ClickEvent, MappingRecord, parse_validity};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

/// POST /api/links 请求体
///
/// `validity` 接受数字或数字字符串（表单输入），空串表示默认有效期。
#[derive(Deserialize, Clone, Debug)]
pub struct PostNewLink {
    pub url: String,
    #[serde(default)]
    pub validity: Option<serde_json::Value>,
    #[serde(default)]
    pub shortcode: Option<String>,
}

impl PostNewLink {
    /// Normalize the loosely-typed validity field into minutes
    pub fn validity_minutes(&self) -> Result<Option<i64>> {
        use serde_json::Value;

        match &self.validity {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(minutes) if minutes > 0 => Ok(Some(minutes)),
                _ => Err(SnaplinkError::invalid_validity(format!(
                    "Validity must be a positive number, got {}",
                    n
                ))),
            },
            Some(Value::String(s)) => parse_validity(s),
            Some(other) => Err(SnaplinkError::invalid_validity(format!(
                "Validity must be a positive number, got {}",
                other
            ))),
        }
    }
}

/// 单条链接的完整视图（含点击明细）
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LinkResponse {
    pub short_code: String,
    pub short_url: String,
    pub destination_url: String,
    pub created_at: DateTime<Utc>,
    pub validity_minutes: i64,
    pub expires_at: DateTime<Utc>,
    pub expired: bool,
    pub click_count: u64,
    pub click_events: Vec<ClickEvent>,
}

impl LinkResponse {
    pub fn from_record(record: MappingRecord, short_url: String, now: DateTime<Utc>) -> Self {
        Self {
            expired: record.is_expired_at(now),
            short_code: record.short_code,
            short_url,
            destination_url: record.destination_url,
            created_at: record.created_at,
            validity_minutes: record.validity_minutes,
            expires_at: record.expires_at,
            click_count: record.click_count,
            click_events: record.click_events,
        }
    }
}

/// GET /api/links 响应
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LinkListResponse {
    pub total: usize,
    pub active: usize,
    pub expired: usize,
    pub links: Vec<LinkResponse>,
}
