//! MappingStore 行为测试
//!
//! 覆盖创建、冲突、校验顺序、过期边界与生成短码格式。

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use snaplink::analytics::AccessLog;
use snaplink::storage::{CreateMappingRequest, MappingStore, RequestContext};
use snaplink::system::ManualClock;
use snaplink::utils::CodeGenerator;
use snaplink::SnaplinkError;

// =============================================================================
// Helpers
// =============================================================================

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-01T08:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn test_store() -> (MappingStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let store = MappingStore::new(Arc::new(AccessLog::disabled())).with_clock(clock.clone());
    (store, clock)
}

fn create_with_code(
    store: &MappingStore,
    url: &str,
    code: &str,
) -> snaplink::Result<snaplink::MappingRecord> {
    store.create(CreateMappingRequest::new(url).with_code(code))
}

// =============================================================================
// Create / resolve round trip
// =============================================================================

#[test]
fn test_create_then_resolve_returns_destination() {
    let (store, _) = test_store();
    let created = store
        .create(
            CreateMappingRequest::new("https://example.com/docs?page=2")
                .with_validity(45)
                .with_code("docs-2"),
        )
        .unwrap();
    assert_eq!(created.created_at, t0());
    assert_eq!(created.expires_at, t0() + TimeDelta::minutes(45));

    let resolved = store
        .resolve("docs-2", &RequestContext::new("curl/8.5", "Europe"))
        .unwrap();
    assert_eq!(resolved.destination_url, "https://example.com/docs?page=2");
    assert_eq!(resolved.click_count, 1);
    assert_eq!(resolved.click_events.len(), 1);
}

#[test]
fn test_get_returns_snapshot_without_click() {
    let (store, _) = test_store();
    create_with_code(&store, "https://example.com", "peek").unwrap();

    let before = store.get("peek").unwrap();
    let after = store.get("peek").unwrap();
    assert_eq!(before, after);
    assert_eq!(after.click_count, 0);
}

#[test]
fn test_snapshot_is_detached_from_store() {
    let (store, _) = test_store();
    create_with_code(&store, "https://example.com", "snap").unwrap();

    let mut snapshot = store.get("snap").unwrap();
    snapshot.destination_url = "https://evil.example".to_string();
    snapshot.click_count = 99;

    let fresh = store.get("snap").unwrap();
    assert_eq!(fresh.destination_url, "https://example.com");
    assert_eq!(fresh.click_count, 0);
}

#[test]
fn test_resolve_unknown_code_is_not_found() {
    let (store, _) = test_store();
    let err = store.resolve("missing", &RequestContext::default()).unwrap_err();
    assert!(matches!(err, SnaplinkError::NotFound(_)));
}

// =============================================================================
// Conflicts
// =============================================================================

#[test]
fn test_requested_code_conflict_keeps_first_record() {
    let (store, _) = test_store();
    create_with_code(&store, "https://first.example", "promo").unwrap();

    let err = create_with_code(&store, "https://second.example", "promo").unwrap_err();
    assert!(matches!(err, SnaplinkError::CodeConflict(_)));

    let record = store.get("promo").unwrap();
    assert_eq!(record.destination_url, "https://first.example");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_expired_code_is_not_recycled() {
    let (store, clock) = test_store();
    store
        .create(
            CreateMappingRequest::new("https://example.com")
                .with_validity(1)
                .with_code("stale"),
        )
        .unwrap();
    clock.advance(TimeDelta::hours(2));

    let err = create_with_code(&store, "https://other.example", "stale").unwrap_err();
    assert!(matches!(err, SnaplinkError::CodeConflict(_)));
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_rejected_requests_leave_store_unchanged() {
    let (store, _) = test_store();
    let bad_requests = [
        CreateMappingRequest::new("not a url"),
        CreateMappingRequest::new("/relative/path"),
        CreateMappingRequest::new("https://example.com").with_validity(0),
        CreateMappingRequest::new("https://example.com").with_validity(-10),
        CreateMappingRequest::new("https://example.com").with_validity(i64::MAX),
        CreateMappingRequest::new("https://example.com").with_code("abc"),
        CreateMappingRequest::new("https://example.com").with_code("thirteen-char"),
        CreateMappingRequest::new("https://example.com").with_code("has space"),
        CreateMappingRequest::new("https://example.com").with_code("slash/code"),
    ];

    for req in bad_requests {
        assert!(store.create(req.clone()).is_err(), "accepted {:?}", req);
    }
    assert!(store.is_empty());
}

#[test]
fn test_validation_is_idempotent() {
    let (store, _) = test_store();
    let req = CreateMappingRequest::new("https://example.com").with_validity(-1);

    let first = store.create(req.clone()).unwrap_err();
    let second = store.create(req).unwrap_err();
    assert_eq!(first, second);
    assert!(matches!(first, SnaplinkError::InvalidValidity(_)));
    assert!(store.is_empty());
}

#[test]
fn test_invalid_url_is_idempotent() {
    let (store, _) = test_store();
    let req = CreateMappingRequest::new("not a url").with_validity(30);

    let first = store.create(req.clone()).unwrap_err();
    let second = store.create(req).unwrap_err();
    assert!(matches!(first, SnaplinkError::InvalidUrl(_)));
    assert_eq!(first, second);
    assert!(store.is_empty());
}

#[test]
fn test_requested_code_is_trimmed() {
    let (store, _) = test_store();
    let record = create_with_code(&store, "https://example.com", " abcd ").unwrap();
    assert_eq!(record.short_code, "abcd");
    assert!(store.get("abcd").is_some());

    // 去掉空白后重复的短码仍然冲突
    let err = create_with_code(&store, "https://example.com", "abcd\t").unwrap_err();
    assert!(matches!(err, SnaplinkError::CodeConflict(_)));
}

#[test]
fn test_blank_requested_code_means_generate() {
    let (store, _) = test_store();
    let record = create_with_code(&store, "https://example.com", "   ").unwrap();
    assert_eq!(record.short_code.len(), 6);
    assert!(record.short_code.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn test_requested_code_length_bounds() {
    let (store, _) = test_store();
    assert!(create_with_code(&store, "https://example.com", "abcd").is_ok());
    assert!(create_with_code(&store, "https://example.com", "abcdefghijkl").is_ok());
    assert!(create_with_code(&store, "https://example.com", "Mixed_Case-9").is_ok());
}

// =============================================================================
// Expiry
// =============================================================================

#[test]
fn test_expiry_boundary() {
    let (store, clock) = test_store();
    store
        .create(
            CreateMappingRequest::new("https://example.com")
                .with_validity(30)
                .with_code("edge"),
        )
        .unwrap();

    clock.set(t0() + TimeDelta::minutes(30));
    let record = store.resolve("edge", &RequestContext::default()).unwrap();
    assert_eq!(record.click_count, 1);

    clock.advance(TimeDelta::milliseconds(1));
    let err = store.resolve("edge", &RequestContext::default()).unwrap_err();
    assert!(matches!(err, SnaplinkError::Expired(_)));

    // 过期后的失败解析不计数
    assert_eq!(store.get("edge").unwrap().click_count, 1);
}

#[test]
fn test_expired_records_stay_listed() {
    let (store, clock) = test_store();
    store
        .create(
            CreateMappingRequest::new("https://a.example")
                .with_validity(5)
                .with_code("gone"),
        )
        .unwrap();
    store
        .create(
            CreateMappingRequest::new("https://b.example")
                .with_validity(600)
                .with_code("live"),
        )
        .unwrap();
    clock.advance(TimeDelta::minutes(10));

    let records = store.list();
    assert_eq!(records.len(), 2);
    let expired: Vec<&str> = records
        .iter()
        .filter(|r| store.is_expired(r))
        .map(|r| r.short_code.as_str())
        .collect();
    assert_eq!(expired, vec!["gone"]);
}

// =============================================================================
// Generated codes
// =============================================================================

#[test]
fn test_generated_codes_are_alphanumeric_and_sized() {
    let (store, _) = test_store();
    for _ in 0..200 {
        let record = store
            .create(CreateMappingRequest::new("https://example.com"))
            .unwrap();
        assert_eq!(record.short_code.len(), 6);
        assert!(record.short_code.chars().all(|c| c.is_ascii_alphanumeric()));
    }
    assert_eq!(store.len(), 200);
}

#[test]
fn test_generated_code_fallback_length() {
    let (store, _) = test_store();
    // 长度为 1 的键空间只有 62 个，占满后只能走 length + 2 的兜底
    let store = store.with_generator(CodeGenerator::new(1, 100_000));
    for _ in 0..62 {
        let record = store
            .create(CreateMappingRequest::new("https://example.com"))
            .unwrap();
        assert_eq!(record.short_code.len(), 1);
    }
    let record = store
        .create(CreateMappingRequest::new("https://example.com"))
        .unwrap();
    assert_eq!(record.short_code.len(), 3);
    assert_eq!(store.len(), 63);
}
