// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    create_run, create_site, fetcher, html_page, limits, mount_html, mount_sitemap, pipeline,
    setup,
};
use async_trait::async_trait;
use chrono::Utc;
use siteaudit::config::settings::PipelineLimits;
use siteaudit::domain::models::audit_run::{AuditRun, AuditSettings, AuditStatus, AuditSummary};
use siteaudit::domain::repositories::audit_run_repository::{AuditRunRepository, RepositoryError};
use siteaudit::domain::repositories::stores::AuditStores;
use siteaudit::utils::errors::AuditError;
use siteaudit::workers::batch_coordinator::BatchOutcome;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn five_page_site() -> MockServer {
    let server = MockServer::start().await;
    mount_html(&server, "/", html_page("Welcome to the test site")).await;
    mount_html(&server, "/about", html_page("About the test company")).await;
    mount_html(&server, "/pricing", html_page("Pricing plans and tiers")).await;
    mount_html(&server, "/blog", html_page("Blog posts and articles")).await;
    mount_html(&server, "/contact", html_page("Contact our support team")).await;
    mount_sitemap(&server, &["/", "/about", "/pricing", "/blog", "/contact"]).await;
    server
}

#[tokio::test]
async fn test_full_audit_completes_with_score() {
    let ctx = setup().await;
    let server = five_page_site().await;
    let site = create_site(&ctx.stores, &server.uri()).await;
    let run = create_run(&ctx.stores, site.id, AuditSettings::default()).await;
    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(5)), limits(), 16);

    let report = pipeline.orchestrator.start(run.id).await.unwrap();

    assert_eq!(
        report.batch,
        BatchOutcome {
            total: 5,
            succeeded: 5,
            failed: 0
        }
    );
    assert_eq!(report.finalize.summary.pages_crawled, 5);
    assert_eq!(report.finalize.health_score, 100);

    let stored = ctx.stores.runs.find_by_id(run.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AuditStatus::Completed);
    assert_eq!(stored.health_score, Some(100));
    assert!(stored.started_at.is_some());
    assert!(stored.finished_at.is_some());
    assert!(stored.error_message.is_none());

    let period = Utc::now().format("%Y-%m").to_string();
    let consumed = ctx
        .stores
        .quota
        .total_for_period(site.account_id, "pages_crawled", &period)
        .await
        .unwrap();
    assert_eq!(consumed, 5);

    let events: Vec<String> = ctx
        .stores
        .activity
        .find_by_run_ref(&AuditRun::run_ref(run.id))
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.event)
        .collect();
    assert_eq!(events, vec!["audit.started", "audit.completed"]);
}

#[tokio::test]
async fn test_issues_lower_the_score() {
    let ctx = setup().await;
    let server = MockServer::start().await;
    mount_html(&server, "/", html_page("Welcome to the test site")).await;
    // No title, no description, no h1, thin content
    mount_html(&server, "/bare", "<html><body><p>tiny</p></body></html>".to_string()).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_raw("<html></html>", "text/html"))
        .mount(&server)
        .await;
    mount_sitemap(&server, &["/bare", "/gone"]).await;

    let site = create_site(&ctx.stores, &server.uri()).await;
    let run = create_run(&ctx.stores, site.id, AuditSettings::default()).await;
    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(5)), limits(), 16);

    let report = pipeline.orchestrator.start(run.id).await.unwrap();

    // /bare: missing_title; /gone: client_error
    assert_eq!(report.finalize.summary.issues_critical, 2);
    // /bare: missing_meta_description, missing_h1, thin_content
    assert_eq!(report.finalize.summary.issues_warning, 3);
    // /bare: missing_canonical
    assert_eq!(report.finalize.summary.issues_info, 1);
    assert_eq!(report.finalize.health_score, 100 - 16 - 9 - 1);

    let pages = ctx.stores.pages.find_by_run(run.id).await.unwrap();
    let gone = pages.iter().find(|p| p.path == "/gone").unwrap();
    assert_eq!(gone.status_code, 404);
    assert!(!gone.is_indexable);
}

#[tokio::test]
async fn test_partial_fetch_failure_still_completes() {
    let ctx = setup().await;
    let server = MockServer::start().await;
    mount_html(&server, "/", html_page("Welcome to the test site")).await;
    mount_html(&server, "/a", html_page("First article on the site")).await;
    mount_html(&server, "/b", html_page("Second article on the site")).await;
    mount_html(&server, "/c", html_page("Third article on the site")).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(html_page("Too slow to matter"), "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    mount_sitemap(&server, &["/a", "/b", "/slow", "/c"]).await;

    let site = create_site(&ctx.stores, &server.uri()).await;
    let run = create_run(&ctx.stores, site.id, AuditSettings::default()).await;
    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_millis(300)), limits(), 16);

    let report = pipeline.orchestrator.start(run.id).await.unwrap();

    assert_eq!(
        report.batch,
        BatchOutcome {
            total: 5,
            succeeded: 4,
            failed: 1
        }
    );

    let stored = ctx.stores.runs.find_by_id(run.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AuditStatus::Completed);
    assert_eq!(stored.summary.pages_crawled, 5);

    let pages = ctx.stores.pages.find_by_run(run.id).await.unwrap();
    let slow = pages.iter().find(|p| p.path == "/slow").unwrap();
    assert_eq!(slow.status_code, 0);
    assert!(!slow.is_indexable);
    assert_eq!(slow.issues_count, 0);
}

#[tokio::test]
async fn test_empty_seed_set_fails_run() {
    let ctx = setup().await;
    let site = create_site(&ctx.stores, "ftp://files.example.com/").await;
    let settings = AuditSettings {
        include_sitemap: false,
        ..Default::default()
    };
    let run = create_run(&ctx.stores, site.id, settings).await;
    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(1)), limits(), 16);

    let err = pipeline.orchestrator.start(run.id).await.unwrap_err();
    assert!(matches!(err, AuditError::NoUrlsToCrawl));

    let stored = ctx.stores.runs.find_by_id(run.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AuditStatus::Failed);
    assert_eq!(stored.error_message.as_deref(), Some("No URLs to crawl"));
    assert!(stored.finished_at.is_some());
    assert!(stored.health_score.is_none());
    assert_eq!(ctx.stores.pages.count_by_run(run.id).await.unwrap(), 0);

    let events = ctx
        .stores
        .activity
        .find_by_run_ref(&AuditRun::run_ref(run.id))
        .await
        .unwrap();
    let failure = events.iter().find(|e| e.event == "audit.failed").unwrap();
    assert_eq!(failure.level, "error");
    assert_eq!(failure.domain_id, Some(site.id));
}

async fn seeded_paths(ctx: &super::helpers::TestContext, run_id: Uuid) -> Vec<String> {
    ctx.stores
        .pages
        .find_by_run(run_id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.path)
        .collect()
}

async fn deep_site() -> MockServer {
    let server = MockServer::start().await;
    for route in ["/", "/a", "/b", "/c", "/deep/er/page"] {
        mount_html(&server, route, html_page("Some reasonably long title")).await;
    }
    server
}

#[tokio::test]
async fn test_seed_set_drops_deep_and_duplicate_urls() {
    let ctx = setup().await;
    let server = deep_site().await;
    mount_sitemap(&server, &["/deep/er/page", "/a#team", "/a", "/b", "/c"]).await;

    let site = create_site(&ctx.stores, &server.uri()).await;
    let settings = AuditSettings {
        crawl_limit: 4,
        max_depth: Some(1),
        ..Default::default()
    };
    let run = create_run(&ctx.stores, site.id, settings).await;
    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(5)), limits(), 16);

    let report = pipeline.orchestrator.start(run.id).await.unwrap();
    assert_eq!(report.batch.total, 4);

    // find_by_run orders by url
    assert_eq!(seeded_paths(&ctx, run.id).await, vec!["/", "/a", "/b", "/c"]);
}

#[tokio::test]
async fn test_filtered_candidates_do_not_shrink_seed_set() {
    let ctx = setup().await;
    let server = deep_site().await;
    let xml = format!(
        r#"<?xml version="1.0"?><urlset><url><loc>{0}/deep/er/page</loc></url><url><loc>https://elsewhere.example/x</loc></url><url><loc>{0}/a</loc></url><url><loc>{0}/b</loc></url></urlset>"#,
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(xml, "application/xml"))
        .mount(&server)
        .await;

    let site = create_site(&ctx.stores, &server.uri()).await;
    let settings = AuditSettings {
        crawl_limit: 3,
        max_depth: Some(1),
        ..Default::default()
    };
    let run = create_run(&ctx.stores, site.id, settings).await;
    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(5)), limits(), 16);

    let report = pipeline.orchestrator.start(run.id).await.unwrap();
    assert_eq!(report.batch.total, 3);
    assert_eq!(seeded_paths(&ctx, run.id).await, vec!["/", "/a", "/b"]);
}

#[tokio::test]
async fn test_out_of_range_settings_fail_run() {
    let ctx = setup().await;
    let server = five_page_site().await;
    let site = create_site(&ctx.stores, &server.uri()).await;
    let settings = AuditSettings {
        crawl_limit: 0,
        ..Default::default()
    };
    let run = create_run(&ctx.stores, site.id, settings).await;
    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(5)), limits(), 16);

    let err = pipeline.orchestrator.start(run.id).await.unwrap_err();
    assert!(matches!(err, AuditError::Setup(_)));

    let stored = ctx.stores.runs.find_by_id(run.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AuditStatus::Failed);
    assert!(stored
        .error_message
        .as_deref()
        .unwrap()
        .starts_with("Setup failed: invalid settings: "));
    assert_eq!(ctx.stores.pages.count_by_run(run.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_seed_set_is_truncated_to_crawl_limit() {
    let ctx = setup().await;
    let server = deep_site().await;
    mount_sitemap(&server, &["/a", "/b", "/c"]).await;

    let site = create_site(&ctx.stores, &server.uri()).await;
    let settings = AuditSettings {
        crawl_limit: 2,
        ..Default::default()
    };
    let run = create_run(&ctx.stores, site.id, settings).await;
    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(5)), limits(), 16);

    let report = pipeline.orchestrator.start(run.id).await.unwrap();
    assert_eq!(report.batch.total, 2);
    assert_eq!(seeded_paths(&ctx, run.id).await, vec!["/", "/a"]);
}

#[tokio::test]
async fn test_outer_timeout_fails_run() {
    let ctx = setup().await;
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(html_page("Slow home page"), "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let site = create_site(&ctx.stores, &server.uri()).await;
    let settings = AuditSettings {
        include_sitemap: false,
        ..Default::default()
    };
    let run = create_run(&ctx.stores, site.id, settings).await;
    let limits = PipelineLimits {
        concurrency_limit: 2,
        page_timeout: Duration::from_secs(10),
        outer_run_timeout: Duration::from_secs(1),
    };
    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(10)), limits, 16);

    let err = pipeline.orchestrator.start(run.id).await.unwrap_err();
    assert!(matches!(err, AuditError::Timeout(1)));

    let stored = ctx.stores.runs.find_by_id(run.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AuditStatus::Failed);
    assert_eq!(stored.error_message.as_deref(), Some("Audit timed out after 1s"));
    assert!(stored.finished_at.is_some());
}

#[tokio::test]
async fn test_run_that_is_not_queued_is_not_started() {
    let ctx = setup().await;
    let server = five_page_site().await;
    let site = create_site(&ctx.stores, &server.uri()).await;
    let run = create_run(&ctx.stores, site.id, AuditSettings::default()).await;
    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(5)), limits(), 16);

    pipeline.orchestrator.start(run.id).await.unwrap();
    let err = pipeline.orchestrator.start(run.id).await.unwrap_err();
    assert!(matches!(err, AuditError::InvalidState { .. }));

    let stored = ctx.stores.runs.find_by_id(run.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AuditStatus::Completed);
}

#[tokio::test]
async fn test_unknown_run_is_reported() {
    let ctx = setup().await;
    let pipeline = pipeline(&ctx.stores, fetcher(Duration::from_secs(1)), limits(), 16);

    let missing = Uuid::new_v4();
    let err = pipeline.orchestrator.start(missing).await.unwrap_err();
    assert!(matches!(err, AuditError::RunNotFound(id) if id == missing));
}

/// 在写入完成状态时失败的运行仓库
struct FailingCompletion {
    inner: Arc<dyn AuditRunRepository>,
}

#[async_trait]
impl AuditRunRepository for FailingCompletion {
    async fn create(&self, run: &AuditRun) -> Result<AuditRun, RepositoryError> {
        self.inner.create(run).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuditRun>, RepositoryError> {
        self.inner.find_by_id(id).await
    }

    async fn find_next_queued(&self) -> Result<Option<AuditRun>, RepositoryError> {
        self.inner.find_next_queued().await
    }

    async fn mark_running(&self, id: Uuid) -> Result<bool, RepositoryError> {
        self.inner.mark_running(id).await
    }

    async fn mark_completed(
        &self,
        _id: Uuid,
        _summary: AuditSummary,
        _health_score: u8,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Database(sea_orm::DbErr::Custom(
            "disk full".to_string(),
        )))
    }

    async fn mark_failed(&self, id: Uuid, message: &str) -> Result<bool, RepositoryError> {
        self.inner.mark_failed(id, message).await
    }

    async fn fail_stale_running(
        &self,
        started_before: chrono::DateTime<Utc>,
        message: &str,
    ) -> Result<u64, RepositoryError> {
        self.inner.fail_stale_running(started_before, message).await
    }
}

#[tokio::test]
async fn test_finalization_failure_marks_run_failed() {
    let ctx = setup().await;
    let server = five_page_site().await;
    let site = create_site(&ctx.stores, &server.uri()).await;
    let run = create_run(&ctx.stores, site.id, AuditSettings::default()).await;

    let stores = AuditStores {
        runs: Arc::new(FailingCompletion {
            inner: ctx.stores.runs.clone(),
        }),
        ..ctx.stores.clone()
    };
    let pipeline = pipeline(&stores, fetcher(Duration::from_secs(5)), limits(), 16);

    let err = pipeline.orchestrator.start(run.id).await.unwrap_err();
    assert!(matches!(err, AuditError::Finalization(_)));

    let stored = ctx.stores.runs.find_by_id(run.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AuditStatus::Failed);
    assert!(stored
        .error_message
        .as_deref()
        .unwrap()
        .starts_with("Finalization failed: "));
    assert!(stored.finished_at.is_some());
    assert!(stored.health_score.is_none());
    assert_eq!(ctx.stores.pages.count_by_run(run.id).await.unwrap(), 5);
}
