// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Default)]
pub(crate) struct RequestMetrics {
    counts: Mutex<HashMap<(String, u16), u64>>,
    latency_ns: Mutex<HashMap<String, Vec<u64>>>,
}

impl RequestMetrics {
    pub(crate) async fn observe_request(&self, route: &str, status: StatusCode, latency: Duration) {
        let mut counts = self.counts.lock().await;
        *counts
            .entry((route.to_string(), status.as_u16()))
            .or_insert(0) += 1;
        drop(counts);
        let mut latency_map = self.latency_ns.lock().await;
        latency_map
            .entry(route.to_string())
            .or_default()
            .push(u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX));
    }

    /// Prometheus text exposition of request counts and p95 latency.
    pub(crate) async fn render_prometheus(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# TYPE regslip_http_requests_total counter");
        let counts = self.counts.lock().await;
        let mut rows: Vec<_> = counts.iter().collect();
        rows.sort();
        for ((route, status), count) in rows {
            let _ = writeln!(
                out,
                "regslip_http_requests_total{{route=\"{route}\",status=\"{status}\"}} {count}"
            );
        }
        drop(counts);

        let _ = writeln!(out, "# TYPE regslip_request_latency_p95_seconds gauge");
        let latency = self.latency_ns.lock().await;
        let mut routes: Vec<_> = latency.iter().collect();
        routes.sort_by_key(|(route, _)| route.clone());
        for (route, samples) in routes {
            let p95 = percentile_ns(samples, 0.95);
            let _ = writeln!(
                out,
                "regslip_request_latency_p95_seconds{{route=\"{route}\"}} {:.6}",
                p95 / 1_000_000_000.0
            );
        }
        out
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percentile_ns(samples: &[u64], quantile: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<u64> = samples.to_vec();
    sorted.sort_unstable();
    let idx = ((sorted.len() as f64) * quantile).ceil() as usize;
    sorted[idx.saturating_sub(1).min(sorted.len() - 1)] as f64
}
