// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![cfg(feature = "runtime-tokio")]

use backflux_core::BackfluxError;
use backflux_runtime::{Disposable, TokioWorker, Worker};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::yield_now;
use tokio::time::{advance, pause};

async fn settle() {
    for _ in 0..8 {
        yield_now().await;
    }
}

fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let task_count = Arc::clone(&count);
    (count, move || {
        task_count.fetch_add(1, Ordering::SeqCst);
    })
}

#[tokio::test]
async fn test_periodic_task_fires_once_per_period() -> anyhow::Result<()> {
    // Arrange
    pause();
    let worker = TokioWorker::current()?;
    let (count, task) = counter();

    // Act
    let _handle =
        worker.schedule_periodically(Duration::from_millis(100), Duration::from_millis(100), task)?;
    settle().await;

    // Assert
    assert_eq!(count.load(Ordering::SeqCst), 0);

    advance(Duration::from_millis(100)).await;
    settle().await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    advance(Duration::from_millis(100)).await;
    settle().await;
    assert_eq!(count.load(Ordering::SeqCst), 2);

    Ok(())
}

#[tokio::test]
async fn test_disposed_periodic_task_stops_firing() -> anyhow::Result<()> {
    // Arrange
    pause();
    let worker = TokioWorker::current()?;
    let (count, task) = counter();
    let handle =
        worker.schedule_periodically(Duration::from_millis(100), Duration::from_millis(100), task)?;
    settle().await;
    advance(Duration::from_millis(100)).await;
    settle().await;

    // Act
    handle.dispose();
    handle.dispose();
    advance(Duration::from_millis(300)).await;
    settle().await;

    // Assert
    assert!(handle.is_disposed());
    assert_eq!(count.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_one_shot_task_fires_after_delay() -> anyhow::Result<()> {
    // Arrange
    pause();
    let worker = TokioWorker::current()?;
    let (count, mut task) = counter();

    // Act
    let _handle = worker.schedule(Duration::from_millis(50), move || task())?;
    settle().await;
    advance(Duration::from_millis(49)).await;
    settle().await;

    // Assert
    assert_eq!(count.load(Ordering::SeqCst), 0);

    advance(Duration::from_millis(1)).await;
    settle().await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    advance(Duration::from_millis(500)).await;
    settle().await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_disposed_one_shot_never_runs() -> anyhow::Result<()> {
    pause();
    let worker = TokioWorker::current()?;
    let (count, mut task) = counter();

    let handle = worker.schedule(Duration::from_millis(50), move || task())?;
    handle.dispose();
    advance(Duration::from_millis(100)).await;
    settle().await;

    assert_eq!(count.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn test_zero_period_is_rejected() -> anyhow::Result<()> {
    let worker = TokioWorker::current()?;
    let (_count, task) = counter();

    let result = worker.schedule_periodically(Duration::ZERO, Duration::ZERO, task);

    assert!(matches!(result, Err(BackfluxError::SchedulerRejected { .. })));
    Ok(())
}

#[test]
fn test_current_outside_runtime_is_rejected() {
    let result = TokioWorker::current();

    assert!(matches!(result, Err(BackfluxError::SchedulerRejected { .. })));
}

#[test]
fn test_from_handle_schedules_from_foreign_thread() -> anyhow::Result<()> {
    // Arrange
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_time()
        .build()?;
    let worker = TokioWorker::from_handle(runtime.handle().clone());
    let (sender, receiver) = std::sync::mpsc::channel();

    // Act
    let _handle = std::thread::spawn(move || {
        worker.schedule(Duration::from_millis(1), move || {
            let _ = sender.send(42);
        })
    })
    .join()
    .expect("scheduling thread panicked")?;

    // Assert
    assert_eq!(receiver.recv_timeout(Duration::from_secs(5))?, 42);
    Ok(())
}
