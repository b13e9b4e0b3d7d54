use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SnaplinkError};

/// 单次成功解析的点击记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub timestamp: DateTime<Utc>,
    /// User-Agent 或其他来源描述
    pub source: String,
    /// 粗粒度地理位置（大洲 / 国家）
    pub location: String,
}

/// Request-side details attached to a click
///
/// The click timestamp always comes from the store's clock so that it is
/// consistent with the expiry decision made in the same critical section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub source: String,
    pub location: String,
}

impl RequestContext {
    pub const UNKNOWN_SOURCE: &'static str = "unknown";
    pub const UNKNOWN_LOCATION: &'static str = "Unknown";

    pub fn new(source: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            location: location.into(),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(Self::UNKNOWN_SOURCE, Self::UNKNOWN_LOCATION)
    }
}

/// 短码映射记录
///
/// `click_count == click_events.len()` holds at all times; both only change
/// together inside the store's per-record lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRecord {
    pub short_code: String,
    pub destination_url: String,
    pub created_at: DateTime<Utc>,
    pub validity_minutes: i64,
    pub expires_at: DateTime<Utc>,
    pub click_count: u64,
    pub click_events: Vec<ClickEvent>,
}

impl MappingRecord {
    /// Build a fresh record, rejecting validity windows that overflow the
    /// timestamp range
    pub fn new(
        short_code: String,
        destination_url: String,
        created_at: DateTime<Utc>,
        validity_minutes: i64,
    ) -> Result<Self> {
        let expires_at = compute_expires_at(created_at, validity_minutes)?;
        Ok(Self {
            short_code,
            destination_url,
            created_at,
            validity_minutes,
            expires_at,
            click_count: 0,
            click_events: Vec::new(),
        })
    }

    /// Inclusive boundary: a resolution exactly at `expires_at` is still valid
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub(crate) fn record_click(&mut self, timestamp: DateTime<Utc>, ctx: &RequestContext) {
        self.click_events.push(ClickEvent {
            timestamp,
            source: ctx.source.clone(),
            location: ctx.location.clone(),
        });
        self.click_count += 1;
    }
}

/// 创建映射的请求
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateMappingRequest {
    pub destination_url: String,
    /// None = 使用默认有效期
    pub validity_minutes: Option<i64>,
    /// None 或空串 = 自动生成
    pub requested_code: Option<String>,
}

impl CreateMappingRequest {
    pub fn new(destination_url: impl Into<String>) -> Self {
        Self {
            destination_url: destination_url.into(),
            ..Default::default()
        }
    }

    pub fn with_validity(mut self, minutes: i64) -> Self {
        self.validity_minutes = Some(minutes);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.requested_code = Some(code.into());
        self
    }
}

/// `created_at + validity_minutes`, failing with `InvalidValidity` on
/// non-positive or out-of-range windows
pub fn compute_expires_at(created_at: DateTime<Utc>, validity_minutes: i64) -> Result<DateTime<Utc>> {
    if validity_minutes <= 0 {
        return Err(SnaplinkError::invalid_validity(format!(
            "Validity must be a positive number of minutes, got {}",
            validity_minutes
        )));
    }
    TimeDelta::try_minutes(validity_minutes)
        .and_then(|delta| created_at.checked_add_signed(delta))
        .ok_or_else(|| {
            SnaplinkError::invalid_validity(format!(
                "Validity of {} minutes is out of range",
                validity_minutes
            ))
        })
}

/// Parse validity typed into a form field
///
/// Blank input means "use the default"; anything else must be a positive
/// integer.
pub fn parse_validity(raw: &str) -> Result<Option<i64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<i64>() {
        Ok(minutes) if minutes > 0 => Ok(Some(minutes)),
        Ok(minutes) => Err(SnaplinkError::invalid_validity(format!(
            "Validity must be a positive number, got {}",
            minutes
        ))),
        Err(_) => Err(SnaplinkError::invalid_validity(format!(
            "Validity must be a positive number, got '{}'",
            raw
        ))),
    }
}
