// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    create_run, create_site, fetcher, html_page, insert_raw_run, limits, mount_html, pipeline,
    setup,
};
use chrono::Utc;
use serde_json::json;
use siteaudit::domain::models::audit_run::{AuditSettings, AuditStatus};
use siteaudit::workers::audit_worker::AuditWorker;
use siteaudit::workers::manager::WorkerManager;
use siteaudit::workers::stale_run_worker::{StaleRunWorker, INTERRUPTED_MESSAGE};
use std::time::Duration;
use wiremock::MockServer;

fn settings() -> AuditSettings {
    AuditSettings {
        include_sitemap: false,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_poll_once_without_queued_runs() {
    let ctx = setup().await;
    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(1)), limits(), 4);
    let worker = AuditWorker::new(
        ctx.stores.runs.clone(),
        pipeline.orchestrator,
        Duration::from_millis(10),
    );

    assert!(!worker.poll_once().await.unwrap());
}

#[tokio::test]
async fn test_poll_once_processes_one_run_at_a_time() {
    let ctx = setup().await;
    let server = MockServer::start().await;
    mount_html(&server, "/", html_page("Welcome to the test site")).await;
    let site = create_site(&ctx.stores, &server.uri()).await;
    let first = create_run(&ctx.stores, site.id, settings()).await;
    let second = create_run(&ctx.stores, site.id, settings()).await;

    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(5)), limits(), 4);
    let worker = AuditWorker::new(
        ctx.stores.runs.clone(),
        pipeline.orchestrator,
        Duration::from_millis(10),
    );

    assert!(worker.poll_once().await.unwrap());
    let statuses = [
        ctx.stores.runs.find_by_id(first.id).await.unwrap().unwrap().status,
        ctx.stores.runs.find_by_id(second.id).await.unwrap().unwrap().status,
    ];
    assert_eq!(
        statuses.iter().filter(|s| **s == AuditStatus::Completed).count(),
        1
    );
    assert!(statuses.contains(&AuditStatus::Queued));

    assert!(worker.poll_once().await.unwrap());
    assert!(!worker.poll_once().await.unwrap());
}

#[tokio::test]
async fn test_failed_runs_do_not_stop_the_worker() {
    let ctx = setup().await;
    let site = create_site(&ctx.stores, "ftp://files.example.com/").await;
    let run = create_run(&ctx.stores, site.id, settings()).await;

    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(1)), limits(), 4);
    let worker = AuditWorker::new(
        ctx.stores.runs.clone(),
        pipeline.orchestrator,
        Duration::from_millis(10),
    );

    assert!(worker.poll_once().await.unwrap());
    let stored = ctx.stores.runs.find_by_id(run.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AuditStatus::Failed);
}

#[tokio::test]
async fn test_manager_runs_workers_in_background() {
    let ctx = setup().await;
    let server = MockServer::start().await;
    mount_html(&server, "/", html_page("Welcome to the test site")).await;
    let site = create_site(&ctx.stores, &server.uri()).await;
    let run = create_run(&ctx.stores, site.id, settings()).await;

    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(5)), limits(), 4);
    let mut manager = WorkerManager::new();
    manager.start_audit_workers(
        2,
        ctx.stores.runs.clone(),
        pipeline.orchestrator,
        Duration::from_millis(20),
    );
    assert_eq!(manager.worker_count(), 2);

    let mut status = AuditStatus::Queued;
    for _ in 0..250 {
        status = ctx.stores.runs.find_by_id(run.id).await.unwrap().unwrap().status;
        if status.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    manager.shutdown();

    assert_eq!(status, AuditStatus::Completed);
    assert_eq!(manager.worker_count(), 0);
}

#[tokio::test]
async fn test_unreadable_settings_do_not_block_the_queue() {
    let ctx = setup().await;
    let server = MockServer::start().await;
    mount_html(&server, "/", html_page("Welcome to the test site")).await;
    let site = create_site(&ctx.stores, &server.uri()).await;

    let broken = insert_raw_run(
        ctx.db.as_ref(),
        site.id,
        "queued",
        json!({ "crawl_limit": -5 }),
        Utc::now() - chrono::Duration::seconds(60),
        None,
    )
    .await;
    let valid = create_run(&ctx.stores, site.id, settings()).await;

    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(5)), limits(), 4);
    let worker = AuditWorker::new(
        ctx.stores.runs.clone(),
        pipeline.orchestrator,
        Duration::from_millis(10),
    );

    assert!(worker.poll_once().await.unwrap());
    assert!(worker.poll_once().await.unwrap());
    assert!(!worker.poll_once().await.unwrap());

    let broken = ctx.stores.runs.find_by_id(broken).await.unwrap().unwrap();
    assert_eq!(broken.status, AuditStatus::Failed);
    assert!(broken
        .error_message
        .as_deref()
        .unwrap()
        .starts_with("Setup failed: invalid settings: "));
    assert!(broken.finished_at.is_some());

    let valid = ctx.stores.runs.find_by_id(valid.id).await.unwrap().unwrap();
    assert_eq!(valid.status, AuditStatus::Completed);
}

#[tokio::test]
async fn test_sweep_fails_runs_left_running() {
    let ctx = setup().await;
    let site = create_site(&ctx.stores, "https://shop.example.com/").await;
    let an_hour_ago = Utc::now() - chrono::Duration::hours(1);
    let abandoned = insert_raw_run(
        ctx.db.as_ref(),
        site.id,
        "running",
        json!({}),
        an_hour_ago,
        Some(an_hour_ago),
    )
    .await;
    let queued = create_run(&ctx.stores, site.id, settings()).await;

    let worker = StaleRunWorker::new(
        ctx.stores.runs.clone(),
        Duration::from_secs(30 * 60),
        Duration::from_secs(60),
    );
    assert_eq!(worker.sweep_once().await.unwrap(), 1);
    assert_eq!(worker.sweep_once().await.unwrap(), 0);

    let abandoned = ctx.stores.runs.find_by_id(abandoned).await.unwrap().unwrap();
    assert_eq!(abandoned.status, AuditStatus::Failed);
    assert_eq!(abandoned.error_message.as_deref(), Some(INTERRUPTED_MESSAGE));
    let queued = ctx.stores.runs.find_by_id(queued.id).await.unwrap().unwrap();
    assert_eq!(queued.status, AuditStatus::Queued);
}

#[tokio::test]
async fn test_sweeper_runs_on_startup() {
    let ctx = setup().await;
    let site = create_site(&ctx.stores, "https://shop.example.com/").await;
    let an_hour_ago = Utc::now() - chrono::Duration::hours(1);
    let abandoned = insert_raw_run(
        ctx.db.as_ref(),
        site.id,
        "running",
        json!({}),
        an_hour_ago,
        Some(an_hour_ago),
    )
    .await;

    let mut manager = WorkerManager::new();
    manager.start_stale_run_sweeper(
        ctx.stores.runs.clone(),
        Duration::from_secs(30 * 60),
        Duration::from_secs(3600),
    );

    let mut status = AuditStatus::Running;
    for _ in 0..100 {
        status = ctx.stores.runs.find_by_id(abandoned).await.unwrap().unwrap().status;
        if status.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    manager.shutdown();

    assert_eq!(status, AuditStatus::Failed);
}
