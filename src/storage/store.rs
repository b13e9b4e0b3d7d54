//! 短码映射存储
//!
//! - 键空间使用 DashMap，`entry()` 提供按分片加锁的 insert-if-absent
//! - 每条记录有独立的 Mutex，点击计数只锁单条记录
//! - 任何锁内都不做 I/O，访问日志在释放锁之后投递

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use serde_json::json;
use tracing::{debug, info, trace, warn};

use super::models::{CreateMappingRequest, MappingRecord, RequestContext};
use crate::analytics::{AccessEvent, AccessLog};
use crate::config::StoreConfig;
use crate::errors::{Result, SnaplinkError};
use crate::system::{Clock, SystemClock};
use crate::utils::url_validator::{validate_url, validation_error_message};
use crate::utils::{CodeGenerator, is_valid_short_code};

/// Redraws allowed when a generated code loses an insert race
const INSERT_RACE_RETRIES: usize = 8;

type RecordCell = Arc<Mutex<MappingRecord>>;

pub struct MappingStore {
    records: DashMap<String, RecordCell>,
    generator: CodeGenerator,
    default_validity_minutes: i64,
    clock: Arc<dyn Clock>,
    access_log: Arc<AccessLog>,
}

impl MappingStore {
    /// Store with default settings (6-char codes, 50 attempts, 30 minutes)
    pub fn new(access_log: Arc<AccessLog>) -> Self {
        Self {
            records: DashMap::new(),
            generator: CodeGenerator::default(),
            default_validity_minutes: 30,
            clock: Arc::new(SystemClock),
            access_log,
        }
    }

    pub fn from_config(config: &StoreConfig, access_log: Arc<AccessLog>) -> Self {
        Self::new(access_log)
            .with_generator(CodeGenerator::new(
                config.code_length,
                config.max_generate_attempts,
            ))
            .with_default_validity(config.default_validity_minutes)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_generator(mut self, generator: CodeGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_default_validity(mut self, minutes: i64) -> Self {
        self.default_validity_minutes = minutes;
        self
    }

    /// Current time according to the store's clock
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    // ============ Create ============

    /// Create a mapping
    ///
    /// All validation happens before the insert; on error nothing is stored.
    pub fn create(&self, req: CreateMappingRequest) -> Result<MappingRecord> {
        let audit = json!({
            "longUrl": req.destination_url,
            "validMinutes": req.validity_minutes,
            "shortcode": req.requested_code,
        });

        match self.try_create(req) {
            Ok(record) => {
                info!(
                    "MappingStore: created '{}' -> '{}' (valid {} min)",
                    record.short_code, record.destination_url, record.validity_minutes
                );
                self.access_log.emit(AccessEvent::create(
                    record.created_at,
                    json!({
                        "shortcode": record.short_code,
                        "longUrl": record.destination_url,
                        "validMinutes": record.validity_minutes,
                        "expiresAt": record.expires_at,
                    }),
                ));
                Ok(record)
            }
            Err(e) => {
                if e.is_client_error() {
                    debug!("MappingStore: create rejected: {}", e);
                } else {
                    warn!("MappingStore: create failed: {}", e);
                }
                self.report_error(&e, audit);
                Err(e)
            }
        }
    }

    fn try_create(&self, req: CreateMappingRequest) -> Result<MappingRecord> {
        let destination = req.destination_url.trim();
        validate_url(destination).map_err(|e| {
            SnaplinkError::invalid_url(format!("{} ({})", validation_error_message(&e), e))
        })?;

        let validity = req
            .validity_minutes
            .unwrap_or(self.default_validity_minutes);
        let created_at = self.clock.now();
        // 先构造记录以校验有效期，插入前不持有任何锁
        let template =
            MappingRecord::new(String::new(), destination.to_string(), created_at, validity)?;

        let requested = req
            .requested_code
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        match requested {
            Some(code) => self.insert_requested(code, template),
            None => self.insert_generated(template),
        }
    }

    fn insert_requested(&self, code: String, mut record: MappingRecord) -> Result<MappingRecord> {
        if !is_valid_short_code(&code) {
            return Err(SnaplinkError::invalid_code_format(format!(
                "Short code '{}' must be 4-12 characters of letters, digits, '-' or '_'",
                code
            )));
        }

        match self.records.entry(code) {
            Entry::Occupied(occupied) => Err(SnaplinkError::code_conflict(format!(
                "Short code '{}' is already in use",
                occupied.key()
            ))),
            Entry::Vacant(vacant) => {
                record.short_code = vacant.key().clone();
                vacant.insert(Arc::new(Mutex::new(record.clone())));
                Ok(record)
            }
        }
    }

    fn insert_generated(&self, mut record: MappingRecord) -> Result<MappingRecord> {
        for _ in 0..INSERT_RACE_RETRIES {
            // 生成时只做只读查询；真正的占位由下面的 entry() 完成
            let code = self.generator.generate(|c| self.records.contains_key(c));
            let is_fallback = code.len() > self.generator.length();

            match self.records.entry(code) {
                Entry::Vacant(vacant) => {
                    record.short_code = vacant.key().clone();
                    vacant.insert(Arc::new(Mutex::new(record.clone())));
                    return Ok(record);
                }
                Entry::Occupied(occupied) if is_fallback => {
                    return Err(SnaplinkError::generator_exhausted(format!(
                        "Fallback code '{}' collided",
                        occupied.key()
                    )));
                }
                Entry::Occupied(occupied) => {
                    warn!(
                        "MappingStore: generated code '{}' taken by a concurrent create, redrawing",
                        occupied.key()
                    );
                }
            }
        }

        Err(SnaplinkError::generator_exhausted(format!(
            "Lost {} consecutive insert races",
            INSERT_RACE_RETRIES
        )))
    }

    // ============ Resolve ============

    /// Resolve a code and account one click
    ///
    /// Expiry check, event append and counter increment happen under the
    /// record's lock as one step.
    pub fn resolve(&self, code: &str, ctx: &RequestContext) -> Result<MappingRecord> {
        let Some(cell) = self.cell(code) else {
            let err = SnaplinkError::not_found(format!("Short code '{}' not found", code));
            self.report_error(&err, json!({ "shortcode": code }));
            return Err(err);
        };

        let outcome = {
            let mut record = cell.lock();
            let now = self.clock.now();
            if record.is_expired_at(now) {
                Err(record.expires_at)
            } else {
                record.record_click(now, ctx);
                Ok(record.clone())
            }
        };

        match outcome {
            Ok(record) => {
                trace!(
                    "MappingStore: '{}' resolved, {} clicks",
                    code, record.click_count
                );
                let ts = record
                    .click_events
                    .last()
                    .map(|e| e.timestamp)
                    .unwrap_or_else(|| self.clock.now());
                self.access_log.emit(AccessEvent::click(
                    ts,
                    json!({
                        "shortcode": record.short_code,
                        "clicks": record.click_count,
                        "source": ctx.source,
                        "location": ctx.location,
                    }),
                ));
                Ok(record)
            }
            Err(expires_at) => {
                let err = SnaplinkError::expired(format!(
                    "Short code '{}' expired at {}",
                    code,
                    expires_at.to_rfc3339()
                ));
                self.report_error(
                    &err,
                    json!({ "shortcode": code, "expiresAt": expires_at }),
                );
                Err(err)
            }
        }
    }

    // ============ Read-only views ============

    /// Look up a record without expiry checks or click accounting
    pub fn get(&self, code: &str) -> Option<MappingRecord> {
        self.cell(code).map(|cell| cell.lock().clone())
    }

    /// Snapshot of every record, live and expired, oldest first
    pub fn list(&self) -> Vec<MappingRecord> {
        // 先收集 Arc 再逐条加锁，避免在遍历分片时持有记录锁
        let cells: Vec<RecordCell> = self.records.iter().map(|r| r.value().clone()).collect();

        let mut records: Vec<MappingRecord> = cells.iter().map(|c| c.lock().clone()).collect();
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.short_code.cmp(&b.short_code))
        });
        records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether `record` is past its validity window right now
    pub fn is_expired(&self, record: &MappingRecord) -> bool {
        record.is_expired_at(self.clock.now())
    }

    // ============ Lifecycle ============

    /// Record a rejected request in the access log
    ///
    /// Used by the store itself and by transports that reject input before
    /// it reaches `create`.
    pub fn report_error(&self, err: &SnaplinkError, payload: serde_json::Value) {
        let mut payload = payload;
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("message".to_string(), json!(err.message()));
        }
        self.access_log
            .emit(AccessEvent::error(self.clock.now(), err.event_name(), payload));
    }

    /// Flush and stop the access log writer
    pub fn shutdown(&self) {
        info!("MappingStore: shutting down with {} records", self.len());
        self.access_log.shutdown();
    }

    fn cell(&self, code: &str) -> Option<RecordCell> {
        // 克隆 Arc 后立即释放分片读锁
        self.records.get(code).map(|r| r.value().clone())
    }
}
