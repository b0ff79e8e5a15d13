// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use super::*;
use parking_lot::Mutex as PLMutex;
use std::sync::Arc as StdArc;
use std::time::Duration;

fn cleanup_fn(order: StdArc<PLMutex<Vec<&'static str>>>, name: &'static str, fail: bool) -> CleanupFn {
    Box::new(move || {
        Box::pin(async move {
            order.lock().push(name);
            if fail {
                Err(format!("{name} failed"))
            } else {
                Ok(())
            }
        })
    })
}

#[tokio::test]
async fn cleanups_run_in_lifo_order() {
    let manager = ShutdownManager::new(Duration::from_secs(5));
    let order = StdArc::new(PLMutex::new(Vec::new()));
    manager.register_cleanup("first", cleanup_fn(order.clone(), "first", false));
    manager.register_cleanup("second", cleanup_fn(order.clone(), "second", false));
    manager.register_cleanup("third", cleanup_fn(order.clone(), "third", false));

    manager.run_cleanups().await;

    assert_eq!(*order.lock(), vec!["third", "second", "first"]);
}

#[tokio::test]
async fn a_failing_cleanup_does_not_stop_the_rest() {
    let manager = ShutdownManager::new(Duration::from_secs(5));
    let order = StdArc::new(PLMutex::new(Vec::new()));
    manager.register_cleanup("a", cleanup_fn(order.clone(), "a", true));
    manager.register_cleanup("b", cleanup_fn(order.clone(), "b", false));

    manager.run_cleanups().await;

    assert_eq!(*order.lock(), vec!["b", "a"]);
}

#[tokio::test]
async fn shutdown_requested_is_false_until_a_signal_or_manual_trigger() {
    let manager = ShutdownManager::new(Duration::from_secs(5));
    assert!(!manager.shutdown_requested());
    manager.run_cleanups().await;
    // run_cleanups alone (without run_graceful) does not flip shutdown_requested
    // to true in the NotStarted->Initiated sense used by the public flag; it
    // directly advances internal state to InProgress, which does count as
    // "shutdown requested" for consumer loops polling the flag.
    assert!(manager.shutdown_requested());
}
