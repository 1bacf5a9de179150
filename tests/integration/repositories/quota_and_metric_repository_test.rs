// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::{create_run, create_site, setup};
use serde_json::json;
use siteaudit::domain::models::audit_run::AuditSettings;
use siteaudit::domain::models::enrichment_metric::{
    EnrichmentMetric, EnrichmentTask, PageSpeedMetrics, Strategy,
};
use uuid::Uuid;

#[tokio::test]
async fn test_quota_totals_per_period() {
    let ctx = setup().await;
    let account = Uuid::new_v4();

    for (amount, period) in [(5, "2025-01"), (7, "2025-01"), (3, "2025-02")] {
        ctx.stores
            .quota
            .consume(account, "pages_crawled", amount, period, json!({}))
            .await
            .unwrap();
    }

    let quota = &ctx.stores.quota;
    assert_eq!(
        quota
            .total_for_period(account, "pages_crawled", "2025-01")
            .await
            .unwrap(),
        12
    );
    assert_eq!(
        quota
            .total_for_period(account, "pages_crawled", "2025-02")
            .await
            .unwrap(),
        3
    );
    assert_eq!(
        quota
            .total_for_period(Uuid::new_v4(), "pages_crawled", "2025-01")
            .await
            .unwrap(),
        0
    );
}

fn metrics(score: f64) -> PageSpeedMetrics {
    PageSpeedMetrics {
        performance_score: Some(score),
        first_contentful_paint_ms: Some(1000.0),
        largest_contentful_paint_ms: None,
        total_blocking_time_ms: None,
        cumulative_layout_shift: Some(0.1),
        speed_index_ms: None,
        raw: json!({}),
    }
}

/// 测试同一运行、URL和策略只保留一条指标
#[tokio::test]
async fn test_metric_upsert_replaces_existing() {
    let ctx = setup().await;
    let site = create_site(&ctx.stores, "https://shop.example.com/").await;
    let run = create_run(&ctx.stores, site.id, AuditSettings::default()).await;

    let mobile = EnrichmentTask {
        run_id: run.id,
        url: "https://shop.example.com/".to_string(),
        strategy: Strategy::Mobile,
    };
    let desktop = EnrichmentTask {
        strategy: Strategy::Desktop,
        ..mobile.clone()
    };

    let repo = &ctx.stores.metrics;
    repo.upsert(&EnrichmentMetric::from_metrics(&mobile, metrics(40.0)))
        .await
        .unwrap();
    repo.upsert(&EnrichmentMetric::from_metrics(&mobile, metrics(60.0)))
        .await
        .unwrap();
    repo.upsert(&EnrichmentMetric::from_metrics(&desktop, metrics(90.0)))
        .await
        .unwrap();

    let stored = repo.find_by_run(run.id).await.unwrap();
    assert_eq!(stored.len(), 2);
    let mobile = stored
        .iter()
        .find(|m| m.strategy == Strategy::Mobile)
        .unwrap();
    assert_eq!(mobile.performance_score, Some(60.0));
    assert_eq!(mobile.largest_contentful_paint_ms, None);
}
