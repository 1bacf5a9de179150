// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 初始化指标系统
///
/// 安装 Prometheus 导出器并注册审计管道的指标；
/// 地址无效或端口被占用时只记录警告，指标调用变为空操作
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!(
                "Invalid metrics address {}: {}. Metrics exporter not started.",
                settings.listen_addr, e
            );
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return;
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
}

fn describe_metrics() {
    describe_counter!("audit_runs_started_total", "Total number of audit runs started");
    describe_counter!(
        "audit_runs_completed_total",
        "Total number of audit runs completed with a health score"
    );
    describe_counter!(
        "audit_runs_failed_total",
        "Total number of audit runs failed, labelled by stage"
    );
    describe_counter!(
        "audit_pages_total",
        "Total number of pages processed, labelled by outcome"
    );
    describe_counter!(
        "audit_fetch_retries_total",
        "Total number of fetch retries after transient errors"
    );
    describe_histogram!(
        "audit_page_duration_seconds",
        "Duration of a single page task in seconds"
    );
    describe_gauge!("audit_health_score", "Health score of the last completed run");
    describe_counter!(
        "audit_enrichment_total",
        "Total number of enrichment tasks, labelled by outcome"
    );
}
