//! Integration test: concurrent resolvers share one download.

mod common;

use cachedpath_core::lock::LockPolicy;
use cachedpath_core::{ResolveOptions, Resolver};
use common::http_server::TestServer;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn concurrent_resolutions_fetch_once() {
    const THREADS: usize = 8;
    let body: Vec<u8> = (0u8..200).cycle().take(128 * 1024).collect();
    let server = TestServer::start(body.clone());
    server.set_etag(Some("c1"));
    server.set_get_delay(Duration::from_millis(200));
    let cache = tempdir().unwrap();

    let options = ResolveOptions::builder()
        .cache_dir(cache.path())
        .quiet(true)
        .lock_policy(LockPolicy {
            poll_interval: Duration::from_millis(20),
            max_attempts: 500,
        })
        .build();
    let resolver = Arc::new(Resolver::new(options));
    let url = server.url("/shared/blob.bin");
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            let barrier = Arc::clone(&barrier);
            let url = url.clone();
            thread::spawn(move || {
                barrier.wait();
                resolver.resolve(&url).unwrap()
            })
        })
        .collect();
    let paths: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(server.gets(), 1, "exactly one GET expected");
    assert!(paths.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(std::fs::read(&paths[0]).unwrap(), body);
}

#[test]
fn separate_resolvers_fetch_once() {
    let server = TestServer::start(b"two resolvers".to_vec());
    server.set_get_delay(Duration::from_millis(150));
    let cache = tempdir().unwrap();
    let url = server.url("/pair.bin");
    let cache_dir = cache.path().to_path_buf();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let url = url.clone();
            let cache_dir = cache_dir.clone();
            thread::spawn(move || {
                let options = ResolveOptions::builder()
                    .cache_dir(cache_dir)
                    .quiet(true)
                    .lock_policy(LockPolicy {
                        poll_interval: Duration::from_millis(20),
                        max_attempts: 500,
                    })
                    .build();
                cachedpath_core::resolve(&url, &options).unwrap()
            })
        })
        .collect();
    let paths: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(server.gets(), 1);
    assert_eq!(paths[0], paths[1]);
}
