//! Property-Based Tests for Cache Module

use proptest::prelude::*;
use std::collections::HashSet;
use std::thread::sleep;
use std::time::Duration;

use axum::http::HeaderMap;
use bytes::Bytes;

use crate::cache::{CacheEntry, CacheStore};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;
const TEST_MAX_AGE: Duration = Duration::from_secs(300);

// == Strategies ==
/// Generates request targets shaped like real cache keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_=&]{1,48}".prop_map(|q| format!("/entries?{}", q))
}

fn body_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,64}".prop_map(|s| format!(r#"{{"text":"{}"}}"#, s))
}

fn response(body: String) -> CacheEntry {
    CacheEntry::new(200, "OK", HeaderMap::new(), Bytes::from(body))
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, body: String },
    Get { key: String },
    Reset,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), body_strategy()).prop_map(|(key, body)| CacheOp::Set { key, body }),
        4 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => Just(CacheOp::Reset),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // A stored response is returned unchanged until it expires.
    #[test]
    fn prop_set_then_get_returns_body(key in key_strategy(), body in body_strategy()) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_MAX_AGE);

        prop_assert!(!store.has(&key));
        store.set(key.clone(), response(body.clone()));
        prop_assert!(store.has(&key));

        let entry = store.get(&key).unwrap();
        prop_assert_eq!(entry.body, Bytes::from(body));
    }

    // The number of entries never exceeds capacity.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((key_strategy(), body_strategy()), 1..200)
    ) {
        let max_entries = 50;
        let mut store = CacheStore::new(max_entries, TEST_MAX_AGE);

        for (key, body) in entries {
            store.set(key, response(body));
            prop_assert!(store.len() <= max_entries);
        }
    }

    // After a reset no previously cached key is reported present.
    #[test]
    fn prop_reset_all_forgets_every_key(
        keys in prop::collection::vec(key_strategy(), 1..30)
    ) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_MAX_AGE);
        for key in &keys {
            store.set(key.clone(), response("{}".to_string()));
        }

        store.reset_all();

        for key in &keys {
            prop_assert!(!store.has(key), "{} survived reset", key);
        }
        prop_assert!(store.is_empty());
    }

    // Statistics agree with what get() returned.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_MAX_AGE);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, body } => store.set(key, response(body)),
                CacheOp::Get { key } => match store.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Reset => {
                    store.reset_all();
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.total_entries, store.len());
    }

    // Filling a full store evicts the least recently used key, and a get
    // protects a key from being that victim.
    #[test]
    fn prop_lru_access_tracking(
        keys in prop::collection::vec(key_strategy(), 3..8),
        new_key in key_strategy()
    ) {
        let unique_keys: Vec<String> = keys
            .into_iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        prop_assume!(unique_keys.len() >= 3);
        prop_assume!(!unique_keys.contains(&new_key));

        let mut store = CacheStore::new(unique_keys.len(), TEST_MAX_AGE);
        for key in &unique_keys {
            store.set(key.clone(), response("{}".to_string()));
        }

        let accessed_key = &unique_keys[0];
        let expected_evicted = &unique_keys[1];
        let _ = store.get(accessed_key);

        store.set(new_key.clone(), response("{}".to_string()));

        prop_assert!(store.has(accessed_key));
        prop_assert!(!store.has(expected_evicted));
        prop_assert!(store.has(&new_key));
        prop_assert_eq!(store.len(), unique_keys.len());
    }
}

// Fewer cases for the time-sensitive expiry property
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    #[test]
    fn prop_expired_entries_are_absent(key in key_strategy(), body in body_strategy()) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, Duration::from_millis(50));

        store.set(key.clone(), response(body));
        prop_assert!(store.get(&key).is_some());

        sleep(Duration::from_millis(80));

        prop_assert!(!store.has(&key));
        prop_assert!(store.get(&key).is_none());
    }
}

// Concurrent access through the shared lock
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_concurrent_operation_correctness(
        operations in prop::collection::vec(cache_op_strategy(), 10..50)
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();

        rt.block_on(async {
            let cache = crate::cache::shared(CacheStore::new(TEST_MAX_ENTRIES, TEST_MAX_AGE));

            let mut handles = vec![];
            for op in operations {
                let cache = cache.clone();
                handles.push(tokio::spawn(async move {
                    match op {
                        CacheOp::Set { key, body } => {
                            cache.write().await.set(key, response(body));
                        }
                        CacheOp::Get { key } => {
                            // Either absent or a complete JSON body
                            if let Some(entry) = cache.write().await.get(&key) {
                                serde_json::from_slice::<serde_json::Value>(&entry.body)
                                    .map_err(|e| e.to_string())?;
                            }
                        }
                        CacheOp::Reset => {
                            cache.write().await.reset_all();
                        }
                    }
                    Ok::<_, String>(())
                }));
            }

            for handle in handles {
                let result = handle.await.expect("Task should not panic");
                prop_assert!(result.is_ok(), "Concurrent operation failed: {:?}", result);
            }

            let store = cache.read().await;
            prop_assert!(store.len() <= TEST_MAX_ENTRIES);
            Ok(())
        })?;
    }
}
