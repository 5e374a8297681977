// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod common;

use common::{fast_config, new_cache, wait_until};
use sprite_cache::{AssetError, CacheError};
use sprite_core::asset::{AssetState, Priority};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn saturated_load_queue_falls_back_to_inline_load() {
    let cache = new_cache(
        fast_config()
            .with_load_queue_capacity(1)
            .with_load_workers(1),
    );
    let _workers = cache.spawn_workers().unwrap();

    cache.loader().hold("blocker");
    let blocker = cache.request_asset("blocker", Priority::Low).unwrap();
    assert!(cache.loader().wait_started("blocker"));

    let queued = cache.request_asset("queued", Priority::Low).unwrap();
    assert_eq!(cache.snapshot("queued").unwrap().state, AssetState::Loading);

    cache.request_asset("urgent", Priority::High).unwrap();
    assert!(cache.get_resource("urgent").is_some());
    assert_eq!(cache.stats().sync_fallbacks, 1);

    cache.loader().release("blocker");
    assert_eq!(blocker.wait(), Ok(()));
    assert_eq!(queued.wait(), Ok(()));
    assert_eq!(cache.stats().loaded, 3);
}

#[test]
fn concurrent_requests_share_a_single_load() {
    let cache = new_cache(fast_config().with_load_workers(2));
    let _workers = cache.spawn_workers().unwrap();
    cache.loader().hold("boss");

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            thread::spawn(move || cache.request_asset("boss", Priority::High))
        })
        .collect();

    assert!(wait_until(|| cache.snapshot("boss").map(|s| s.ref_count) == Some(8)));
    cache.loader().release("boss");
    for thread in threads {
        assert!(thread.join().unwrap().is_ok());
    }
    assert_eq!(cache.loader().load_calls("boss"), 1);
}

#[test]
fn shutdown_abandons_queued_loads() {
    let cache = new_cache(
        fast_config()
            .with_load_queue_capacity(4)
            .with_load_workers(1),
    );
    let mut workers = cache.spawn_workers().unwrap();

    cache.loader().hold("blocker");
    let blocker = cache.request_asset("blocker", Priority::Low).unwrap();
    assert!(cache.loader().wait_started("blocker"));
    let pending = cache.request_asset("pending", Priority::Low).unwrap();

    let opener = {
        let cache = cache.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            cache.loader().release("blocker");
        })
    };
    workers.shutdown();
    opener.join().unwrap();

    assert_eq!(blocker.wait(), Ok(()));
    assert!(matches!(pending.wait(), Err(AssetError::ShutDown { .. })));
    let snapshot = cache.snapshot("pending").unwrap();
    assert_eq!(snapshot.state, AssetState::Unloaded);
    assert_eq!(snapshot.ref_count, 1);

    cache.request_asset("late", Priority::High).unwrap();
    assert!(cache.get_resource("late").is_some());
}

#[test]
fn shutdown_interrupts_the_debounce_wait() {
    let cache = new_cache(fast_config().with_debounce(Duration::from_secs(30)));
    let mut workers = cache.spawn_workers().unwrap();

    cache.request_asset("idle", Priority::High).unwrap();
    cache.release_asset("idle");
    thread::sleep(Duration::from_millis(20));

    let started = Instant::now();
    workers.shutdown();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(cache.snapshot("idle").unwrap().state, AssetState::Loaded);
}

#[test]
fn workers_cannot_be_started_twice() {
    let cache = new_cache(fast_config());
    let mut workers = cache.spawn_workers().unwrap();
    assert_eq!(workers.thread_count(), 3);
    assert!(matches!(cache.spawn_workers(), Err(CacheError::WorkersRunning)));

    workers.shutdown();
    assert!(cache.spawn_workers().is_ok());
}

#[test]
fn full_unload_queue_drops_candidates() {
    let cache = new_cache(
        fast_config()
            .with_debounce(Duration::from_secs(30))
            .with_unload_queue_capacity(1),
    );
    let _workers = cache.spawn_workers().unwrap();

    for id in ["a", "b", "c", "d"] {
        cache.request_asset(id, Priority::High).unwrap();
    }
    for id in ["a", "b", "c", "d"] {
        cache.release_asset(id);
    }

    // The worker holds at most one candidate and the queue one more.
    assert!(cache.stats().unload_candidates_dropped >= 2);
    assert_eq!(cache.stats().loaded, 4);
}

#[test]
fn panicking_loader_fails_the_load_and_keeps_the_worker() {
    let cache = new_cache(fast_config());
    let _workers = cache.spawn_workers().unwrap();
    cache.loader().panic_on("boom");

    let handle = cache.request_asset("boom", Priority::Low).unwrap();
    match handle.wait() {
        Err(AssetError::Load { id, reason }) => {
            assert_eq!(id.as_str(), "boom");
            assert!(reason.contains("decoder crashed on boom"), "{reason}");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    let snapshot = cache.snapshot("boom").unwrap();
    assert_eq!(snapshot.state, AssetState::Unloaded);
    assert_eq!(snapshot.ref_count, 1);
    assert!(snapshot.last_error.is_some());

    // The single load worker survived and still drains the queue.
    let other = cache.request_asset("ok", Priority::Low).unwrap();
    assert_eq!(other.wait_timeout(Duration::from_secs(5)), Some(Ok(())));
    assert_eq!(cache.stats().sync_fallbacks, 0);

    assert!(matches!(
        cache.request_asset("boom", Priority::High),
        Err(AssetError::Load { .. })
    ));
    assert_eq!(cache.snapshot("boom").unwrap().ref_count, 1);
    assert_eq!(cache.stats().load_failures, 2);
}

#[test]
fn panicking_loader_without_workers_fails_inline() {
    let cache = new_cache(fast_config());
    cache.loader().panic_on("boom");

    let err = cache.request_asset("boom", Priority::High).unwrap_err();
    assert!(matches!(err, AssetError::Load { .. }));
    assert_eq!(cache.snapshot("boom").unwrap().state, AssetState::Unloaded);
    assert_eq!(cache.stats().sync_fallbacks, 1);
}
