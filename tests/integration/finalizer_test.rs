// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    create_run, create_site, fetcher, html_page, limits, mount_html, mount_sitemap, pipeline,
    setup,
};
use siteaudit::domain::models::audit_run::{AuditSettings, AuditStatus};
use siteaudit::domain::models::enrichment_metric::Strategy;
use siteaudit::domain::models::page_result::PageResult;
use siteaudit::domain::services::issue_rules::DUPLICATE_TITLE;
use siteaudit::utils::errors::AuditError;
use std::time::Duration;
use uuid::Uuid;
use wiremock::MockServer;

async fn duplicate_title_site() -> MockServer {
    let server = MockServer::start().await;
    mount_html(&server, "/", html_page("Welcome to the test site")).await;
    mount_html(&server, "/a", html_page("Shared product title")).await;
    mount_html(&server, "/b", html_page("Shared product title")).await;
    mount_html(&server, "/c", html_page("Shared product title")).await;
    mount_sitemap(&server, &["/a", "/b", "/c"]).await;
    server
}

#[tokio::test]
async fn test_duplicate_titles_are_reported_once() {
    let ctx = setup().await;
    let server = duplicate_title_site().await;
    let site = create_site(&ctx.stores, &server.uri()).await;
    let run = create_run(&ctx.stores, site.id, AuditSettings::default()).await;
    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(5)), limits(), 16);

    let report = pipeline.orchestrator.start(run.id).await.unwrap();
    assert_eq!(report.finalize.summary.issues_info, 1);
    assert_eq!(report.finalize.health_score, 99);

    let duplicates: Vec<_> = ctx
        .stores
        .issues
        .find_by_run(run.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|i| i.issue_type == DUPLICATE_TITLE)
        .collect();
    assert_eq!(duplicates.len(), 1);
    assert!(duplicates[0].page_id.is_none());
    assert_eq!(duplicates[0].data["urls"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_refinalize_is_idempotent() {
    let ctx = setup().await;
    let server = duplicate_title_site().await;
    let site = create_site(&ctx.stores, &server.uri()).await;
    let run = create_run(&ctx.stores, site.id, AuditSettings::default()).await;
    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(5)), limits(), 16);

    let first = pipeline.orchestrator.start(run.id).await.unwrap().finalize;
    let second = pipeline.finalizer.finalize(run.id).await.unwrap();

    assert_eq!(first.health_score, second.health_score);
    assert_eq!(first.summary, second.summary);

    let stored = ctx.stores.runs.find_by_id(run.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AuditStatus::Completed);
    assert_eq!(stored.health_score, Some(first.health_score));
    assert!(
        ctx.stores
            .issues
            .exists_by_type(run.id, DUPLICATE_TITLE)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_cwv_tasks_are_enqueued_home_first() {
    let ctx = setup().await;
    let server = MockServer::start().await;
    mount_html(&server, "/", html_page("Welcome to the test site")).await;
    let paths: Vec<String> = (0..8).map(|i| format!("/page-{}", i)).collect();
    for (i, p) in paths.iter().enumerate() {
        mount_html(&server, p, html_page(&format!("Distinct page number {}", i))).await;
    }
    let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
    mount_sitemap(&server, &refs).await;

    let site = create_site(&ctx.stores, &server.uri()).await;
    let settings = AuditSettings {
        include_cwv: true,
        ..Default::default()
    };
    let run = create_run(&ctx.stores, site.id, settings).await;
    let mut pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(5)), limits(), 64);

    let report = pipeline.orchestrator.start(run.id).await.unwrap();
    assert_eq!(report.finalize.enrichment_tasks, 12);

    let mut tasks = Vec::new();
    while let Ok(task) = pipeline.enrichment.try_recv() {
        tasks.push(task);
    }
    assert_eq!(tasks.len(), 12);
    assert!(tasks.iter().all(|t| t.run_id == run.id));

    let home = format!("{}/", server.uri());
    assert_eq!(tasks[0].url, home);
    assert_eq!(tasks[0].strategy, Strategy::Mobile);
    assert_eq!(tasks[1].url, home);
    assert_eq!(tasks[1].strategy, Strategy::Desktop);
    assert_eq!(
        tasks
            .iter()
            .filter(|t| t.strategy == Strategy::Desktop)
            .count(),
        6
    );
}

#[tokio::test]
async fn test_cwv_disabled_enqueues_nothing() {
    let ctx = setup().await;
    let server = duplicate_title_site().await;
    let site = create_site(&ctx.stores, &server.uri()).await;
    let run = create_run(&ctx.stores, site.id, AuditSettings::default()).await;
    let mut pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(5)), limits(), 16);

    let report = pipeline.orchestrator.start(run.id).await.unwrap();
    assert_eq!(report.finalize.enrichment_tasks, 0);
    assert!(pipeline.enrichment.try_recv().is_err());
}

#[tokio::test]
async fn test_full_enrichment_queue_does_not_fail_run() {
    let ctx = setup().await;
    let server = duplicate_title_site().await;
    let site = create_site(&ctx.stores, &server.uri()).await;
    let settings = AuditSettings {
        include_cwv: true,
        ..Default::default()
    };
    let run = create_run(&ctx.stores, site.id, settings).await;
    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(5)), limits(), 1);

    let report = pipeline.orchestrator.start(run.id).await.unwrap();
    assert_eq!(report.finalize.enrichment_tasks, 1);

    let stored = ctx.stores.runs.find_by_id(run.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AuditStatus::Completed);
}

#[tokio::test]
async fn test_finalize_scores_stored_pages() {
    let ctx = setup().await;
    let site = create_site(&ctx.stores, "https://shop.example.com/").await;
    let run = create_run(&ctx.stores, site.id, AuditSettings::default()).await;
    ctx.stores.runs.mark_running(run.id).await.unwrap();

    let mut broken = PageResult::new(run.id, "https://shop.example.com/x", "/x");
    broken.status_code = 500;
    let issues = vec![siteaudit::domain::models::issue::NewIssue::new(
        siteaudit::domain::models::issue::Severity::Critical,
        "server_error",
        "Server responded with HTTP 500",
        serde_json::json!({ "status_code": 500 }),
    )];
    ctx.stores.pages.save_page(&broken, issues).await.unwrap();

    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(1)), limits(), 4);
    let outcome = pipeline.finalizer.finalize(run.id).await.unwrap();

    assert_eq!(outcome.summary.pages_crawled, 1);
    assert_eq!(outcome.summary.issues_critical, 1);
    assert_eq!(outcome.health_score, 92);
}

#[tokio::test]
async fn test_finalize_queued_run_fails_it() {
    let ctx = setup().await;
    let site = create_site(&ctx.stores, "https://shop.example.com/").await;
    let run = create_run(&ctx.stores, site.id, AuditSettings::default()).await;
    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(1)), limits(), 4);

    // A queued run cannot be completed; the failure is recorded on the run
    let err = pipeline.finalizer.finalize(run.id).await.unwrap_err();
    assert!(matches!(err, AuditError::Finalization(_)));

    let stored = ctx.stores.runs.find_by_id(run.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AuditStatus::Failed);
    assert!(stored
        .error_message
        .unwrap()
        .starts_with("Finalization failed: "));
}

#[tokio::test]
async fn test_finalize_unknown_run() {
    let ctx = setup().await;
    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(1)), limits(), 4);

    let err = pipeline.finalizer.finalize(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AuditError::RunNotFound(_)));
}
