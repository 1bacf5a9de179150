// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use siteaudit::application::use_cases::audit_orchestrator::AuditOrchestrator;
use siteaudit::application::use_cases::finalizer::Finalizer;
use siteaudit::config::settings::{DatabaseSettings, PipelineLimits};
use siteaudit::domain::models::audit_run::{AuditRun, AuditSettings};
use siteaudit::domain::models::enrichment_metric::EnrichmentTask;
use siteaudit::domain::models::site::Site;
use siteaudit::domain::repositories::stores::AuditStores;
use siteaudit::domain::services::issue_rules::DefaultIssueRules;
use siteaudit::domain::services::sitemap_discovery::SitemapDiscovery;
use siteaudit::engines::reqwest_engine::ReqwestFetcher;
use siteaudit::engines::traits::{FetcherConfig, PageFetcher};
use siteaudit::infrastructure::database::connection::connect_and_migrate;
use siteaudit::infrastructure::database::entities::audit_run as audit_run_entity;
use siteaudit::infrastructure::repositories::sea_orm_stores;
use siteaudit::infrastructure::sitemap::HttpSitemapDiscovery;
use siteaudit::queue::enrichment_queue::ChannelEnrichmentQueue;
use siteaudit::workers::batch_coordinator::BatchCoordinator;
use siteaudit::workers::page_worker::PageWorker;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 已迁移的内存数据库
#[allow(dead_code)]
pub struct TestContext {
    pub db: Arc<DatabaseConnection>,
    pub stores: AuditStores,
}

pub async fn setup() -> TestContext {
    let db = connect_and_migrate(&DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(1),
        min_connections: None,
        connect_timeout: Some(10),
        idle_timeout: None,
    })
    .await
    .expect("in-memory database");
    let db = Arc::new(db);

    TestContext {
        stores: sea_orm_stores(db.clone()),
        db,
    }
}

pub async fn create_site(stores: &AuditStores, canonical_url: &str) -> Site {
    let host = url::Url::parse(canonical_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| canonical_url.to_string());
    let mut site = Site::new(Uuid::new_v4(), host, canonical_url);
    site.user_id = Some(Uuid::new_v4());
    stores.sites.create(&site).await.expect("create site")
}

pub async fn create_run(stores: &AuditStores, site_id: Uuid, settings: AuditSettings) -> AuditRun {
    stores
        .runs
        .create(&AuditRun::new(site_id, settings))
        .await
        .expect("create run")
}

/// 直接写入一行运行记录，绕过领域模型
pub async fn insert_raw_run(
    db: &DatabaseConnection,
    site_id: Uuid,
    status: &str,
    settings: serde_json::Value,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
) -> Uuid {
    let id = Uuid::new_v4();
    audit_run_entity::ActiveModel {
        id: Set(id),
        site_id: Set(site_id),
        status: Set(status.to_string()),
        settings: Set(settings),
        started_at: Set(started_at.map(Into::into)),
        finished_at: Set(None),
        pages_crawled: Set(0),
        issues_critical: Set(0),
        issues_warning: Set(0),
        issues_info: Set(0),
        health_score: Set(None),
        error_message: Set(None),
        created_at: Set(created_at.into()),
        updated_at: Set(created_at.into()),
    }
    .insert(db)
    .await
    .expect("insert run row");
    id
}

/// 生成一个内容充足的 HTML 页面
pub fn html_page(title: &str) -> String {
    let words = "lorem ipsum dolor sit amet ".repeat(60);
    format!(
        r#"<html><head><title>{title}</title>
<meta name="description" content="Description for {title}">
<link rel="canonical" href="/"></head>
<body><h1>{title}</h1><p>{words}</p></body></html>"#
    )
}

pub async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

pub async fn mount_sitemap(server: &MockServer, paths: &[&str]) {
    let urls: String = paths
        .iter()
        .map(|p| format!("<url><loc>{}{}</loc></url>", server.uri(), p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{urls}</urlset>"#
    );
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(xml, "application/xml"))
        .mount(server)
        .await;
}

pub fn fetcher(timeout: Duration) -> Arc<dyn PageFetcher> {
    Arc::new(
        ReqwestFetcher::new(FetcherConfig {
            timeout,
            max_attempts: 2,
            backoff: Duration::from_millis(10),
            max_redirects: 5,
            user_agent: "siteaudit-test".to_string(),
        })
        .expect("fetcher"),
    )
}

pub fn sitemap() -> Arc<dyn SitemapDiscovery> {
    Arc::new(HttpSitemapDiscovery::new("siteaudit-test", Duration::from_secs(5)).expect("sitemap"))
}

/// 装配好的审计管道
#[allow(dead_code)]
pub struct Pipeline {
    pub orchestrator: Arc<AuditOrchestrator>,
    pub finalizer: Arc<Finalizer>,
    pub enrichment: Receiver<EnrichmentTask>,
}

pub fn pipeline(
    stores: &AuditStores,
    fetcher: Arc<dyn PageFetcher>,
    limits: PipelineLimits,
    queue_capacity: usize,
) -> Pipeline {
    let rules = Arc::new(DefaultIssueRules::new());
    let (queue, enrichment) = ChannelEnrichmentQueue::new(queue_capacity);

    let worker = PageWorker::new(fetcher, rules.clone(), stores.pages.clone(), limits.page_timeout);
    let batch = Arc::new(BatchCoordinator::new(Arc::new(worker)));
    let finalizer = Arc::new(Finalizer::new(stores.clone(), rules, Arc::new(queue)));
    let orchestrator = Arc::new(AuditOrchestrator::new(
        stores.clone(),
        sitemap(),
        batch,
        finalizer.clone(),
        limits,
    ));

    Pipeline {
        orchestrator,
        finalizer,
        enrichment,
    }
}

pub fn limits() -> PipelineLimits {
    PipelineLimits {
        concurrency_limit: 3,
        page_timeout: Duration::from_secs(10),
        outer_run_timeout: Duration::from_secs(60),
    }
}
