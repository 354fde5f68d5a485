// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::modules::error::code::ErrorCode;
use crate::modules::scheduler::periodic::PeriodicTask;
use crate::raise_error;

#[tokio::test]
async fn periodic_task_runs_until_cancelled() {
    let runs = Arc::new(AtomicU32::new(0));
    let counter = runs.clone();
    let handle = PeriodicTask::new("counter").start(
        move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        },
        Duration::from_millis(10),
        true,
    );
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.cancel().await;

    let after_cancel = runs.load(Ordering::SeqCst);
    assert!(after_cancel >= 2);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(runs.load(Ordering::SeqCst), after_cancel);
}

#[tokio::test]
async fn failing_runs_do_not_stop_the_task() {
    let runs = Arc::new(AtomicU32::new(0));
    let counter = runs.clone();
    let handle = PeriodicTask::new("failing").start(
        move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(raise_error!(
                    "A poll is already running for this mailbox".into(),
                    ErrorCode::PollInProgress
                ))
            }
        },
        Duration::from_millis(10),
        true,
    );
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.cancel().await;
    assert!(runs.load(Ordering::SeqCst) >= 2);
}
