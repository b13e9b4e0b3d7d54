//! 并发测试
//!
//! 多线程同时创建 / 解析时的唯一性与点击计数原子性。

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use snaplink::analytics::{AccessLog, AccessLogSink, MemorySink};
use snaplink::storage::{CreateMappingRequest, MappingStore, RequestContext};
use snaplink::SnaplinkError;

const THREADS: usize = 16;

fn shared_store() -> Arc<MappingStore> {
    Arc::new(MappingStore::new(Arc::new(AccessLog::disabled())))
}

#[test]
fn test_same_requested_code_has_exactly_one_winner() {
    for round in 0..20 {
        let store = shared_store();
        let barrier = Arc::new(Barrier::new(THREADS));
        let code = format!("race{:02}", round);

        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let store = store.clone();
                let barrier = barrier.clone();
                let code = code.clone();
                thread::spawn(move || {
                    barrier.wait();
                    store.create(
                        CreateMappingRequest::new(format!("https://example.com/{}", i))
                            .with_code(code),
                    )
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1, "round {}", round);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| matches!(e, SnaplinkError::CodeConflict(_)))
        );

        // 存储中的记录就是胜者返回的那条
        let stored = store.get(&code).unwrap();
        assert_eq!(&stored, winners[0]);
    }
}

#[test]
fn test_concurrent_generated_codes_are_unique() {
    const PER_THREAD: usize = 250;

    let store = shared_store();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let store = store.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                (0..PER_THREAD)
                    .map(|_| {
                        store
                            .create(CreateMappingRequest::new("https://example.com"))
                            .unwrap()
                            .short_code
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for code in handle.join().unwrap() {
            assert!(seen.insert(code.clone()), "duplicate code {}", code);
        }
    }
    assert_eq!(seen.len(), THREADS * PER_THREAD);
    assert_eq!(store.len(), THREADS * PER_THREAD);
}

#[test]
fn test_concurrent_resolves_count_every_click() {
    const PER_THREAD: usize = 200;

    let store = shared_store();
    store
        .create(CreateMappingRequest::new("https://example.com").with_code("hot1"))
        .unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let store = store.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let ctx = RequestContext::new(format!("agent-{}", i), "Earth");
                barrier.wait();
                for _ in 0..PER_THREAD {
                    store.resolve("hot1", &ctx).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let record = store.get("hot1").unwrap();
    assert_eq!(record.click_count as usize, THREADS * PER_THREAD);
    assert_eq!(record.click_events.len(), THREADS * PER_THREAD);

    for i in 0..THREADS {
        let agent = format!("agent-{}", i);
        let count = record
            .click_events
            .iter()
            .filter(|e| e.source == agent)
            .count();
        assert_eq!(count, PER_THREAD);
    }
}

#[test]
fn test_snapshots_never_observe_torn_counts() {
    let store = shared_store();
    store
        .create(CreateMappingRequest::new("https://example.com").with_code("torn"))
        .unwrap();

    let writer = {
        let store = store.clone();
        thread::spawn(move || {
            for _ in 0..2_000 {
                store.resolve("torn", &RequestContext::default()).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..2_000 {
                    let record = store.get("torn").unwrap();
                    assert_eq!(record.click_count as usize, record.click_events.len());
                    for record in store.list() {
                        assert_eq!(record.click_count as usize, record.click_events.len());
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn test_click_events_reach_access_log_under_contention() {
    const PER_THREAD: usize = 50;

    let memory = Arc::new(MemorySink::new(10_000));
    let sinks: Vec<Arc<dyn AccessLogSink>> = vec![memory.clone() as Arc<dyn AccessLogSink>];
    let access_log = Arc::new(AccessLog::start(sinks, 10_000).unwrap());
    let store = Arc::new(MappingStore::new(access_log));
    store
        .create(CreateMappingRequest::new("https://example.com").with_code("busy"))
        .unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..PER_THREAD {
                    store.resolve("busy", &RequestContext::default()).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    store.shutdown();

    let clicks: Vec<u64> = memory
        .entries()
        .iter()
        .filter(|e| e.event == "increment")
        .filter_map(|e| e.payload["clicks"].as_u64())
        .collect();
    assert_eq!(clicks.len(), THREADS * PER_THREAD);

    // 每个计数值恰好出现一次
    let unique: HashSet<u64> = clicks.iter().copied().collect();
    assert_eq!(unique.len(), THREADS * PER_THREAD);
    assert_eq!(unique.iter().max().copied(), Some((THREADS * PER_THREAD) as u64));
}
