//! 访问日志
//!
//! 存储层在完成状态变更之后向这里投递结构化事件；投递是非阻塞的，
//! 写入由独立线程完成，sink 失败只记录告警，不影响主流程。

pub mod manager;
pub mod sink;

pub use manager::AccessLog;
pub use sink::{AccessLogSink, JsonLinesSink, MemorySink, TracingSink};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// 访问事件类型
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum AccessEventType {
    Create,
    Click,
    Error,
}

/// 单条访问事件 `{ts, type, event, payload}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessEvent {
    pub ts: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: AccessEventType,
    pub event: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl AccessEvent {
    pub fn new(
        ts: DateTime<Utc>,
        kind: AccessEventType,
        event: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            ts,
            kind,
            event: event.into(),
            payload,
        }
    }

    pub fn create(ts: DateTime<Utc>, payload: serde_json::Value) -> Self {
        Self::new(ts, AccessEventType::Create, "mapping", payload)
    }

    pub fn click(ts: DateTime<Utc>, payload: serde_json::Value) -> Self {
        Self::new(ts, AccessEventType::Click, "increment", payload)
    }

    pub fn error(ts: DateTime<Utc>, event: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::new(ts, AccessEventType::Error, event, payload)
    }
}
