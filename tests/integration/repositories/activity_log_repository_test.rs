// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::setup;
use serde_json::json;
use siteaudit::domain::models::audit_run::AuditRun;
use uuid::Uuid;

#[tokio::test]
async fn test_activity_is_linked_by_run_ref() {
    let ctx = setup().await;
    let run_id = Uuid::new_v4();
    let run_ref = AuditRun::run_ref(run_id);
    let user_id = Some(Uuid::new_v4());

    ctx.stores
        .activity
        .log_activity(
            "audits",
            "audit.started",
            "Audit started",
            user_id,
            None,
            json!({ "run_ref": run_ref }),
        )
        .await
        .unwrap();
    ctx.stores
        .activity
        .log_job_failure(
            "audits",
            "audit",
            "No URLs to crawl",
            None,
            user_id,
            &run_ref,
            json!({ "stage": "setup" }),
        )
        .await
        .unwrap();

    let entries = ctx.stores.activity.find_by_run_ref(&run_ref).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].event, "audit.started");
    assert_eq!(entries[0].level, "info");
    assert_eq!(entries[1].event, "audit.failed");
    assert_eq!(entries[1].level, "error");
    assert_eq!(entries[1].message, "No URLs to crawl");
    assert_eq!(entries[1].user_id, user_id);
    assert_eq!(entries[1].tags["stage"], "setup");

    assert!(ctx
        .stores
        .activity
        .find_by_run_ref(&AuditRun::run_ref(Uuid::new_v4()))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_find_by_channel() {
    let ctx = setup().await;
    ctx.stores
        .activity
        .log_activity("audits", "audit.started", "a", None, None, json!({}))
        .await
        .unwrap();
    ctx.stores
        .activity
        .log_activity("billing", "invoice.sent", "b", None, None, json!({}))
        .await
        .unwrap();

    let audits = ctx.stores.activity.find_by_channel("audits").await.unwrap();
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].channel, "audits");
}
