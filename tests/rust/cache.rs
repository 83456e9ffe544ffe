//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd project team.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use indexmap::IndexMap;
use zipress::{ZiError, ZiLayoutSchemaMap, ZiSchemaCache};

fn schema(digest: Option<&str>) -> ZiLayoutSchemaMap {
    ZiLayoutSchemaMap {
        content_area: "page_sections".into(),
        content_area_key: "field_area".into(),
        layouts: IndexMap::new(),
        source_digest: digest.map(str::to_string),
    }
}

#[test]
fn test_concurrent_first_requests_build_once() {
    let cache = Arc::new(ZiSchemaCache::new());
    let builds = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let builds = Arc::clone(&builds);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache
                    .get_or_build("main", || {
                        builds.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(20));
                        Ok(schema(Some("d1")))
                    })
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_failed_build_is_retried() {
    let cache = ZiSchemaCache::new();
    let err = cache
        .get_or_build("main", || Err(ZiError::internal("boom")))
        .unwrap_err();
    assert!(matches!(err, ZiError::Internal(_)));
    assert!(cache.get("main").is_none());
    assert!(cache.is_empty());

    let built = cache.get_or_build("main", || Ok(schema(None))).unwrap();
    assert_eq!(built.content_area, "page_sections");
}

#[test]
fn test_refresh_replaces_without_touching_holders() {
    let cache = ZiSchemaCache::new();
    let old = cache.get_or_build("main", || Ok(schema(Some("d1")))).unwrap();

    cache.refresh("main", schema(Some("d2")));

    assert_eq!(old.source_digest.as_deref(), Some("d1"));
    assert_eq!(cache.get("main").unwrap().source_digest.as_deref(), Some("d2"));
}

#[test]
fn test_replace_if_changed_compares_digests() {
    let cache = ZiSchemaCache::new();
    cache.refresh("main", schema(Some("d1")));

    assert!(!cache.replace_if_changed("main", schema(Some("d1"))));
    assert!(cache.replace_if_changed("main", schema(Some("d2"))));
    assert!(cache.replace_if_changed("other", schema(Some("d1"))));
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_invalidate_and_clear() {
    let cache = ZiSchemaCache::new();
    cache.refresh("a", schema(None));
    cache.refresh("b", schema(None));

    assert!(cache.invalidate("a"));
    assert!(!cache.invalidate("a"));
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
}
