use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static REQUEST_COUNT: AtomicU64 = AtomicU64::new(0);
static ERROR_COUNT: AtomicU64 = AtomicU64::new(0);
static MOTTOS_CREATED: AtomicU64 = AtomicU64::new(0);
static LIKES_RECORDED: AtomicU64 = AtomicU64::new(0);
static QR_CODES_LINKED: AtomicU64 = AtomicU64::new(0);

pub fn increment_request_count() {
    REQUEST_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_error_count() {
    ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_mottos_created() {
    MOTTOS_CREATED.fetch_add(1, Ordering::Relaxed);
}

/// Counts new likes only; repeats are not recorded.
pub fn increment_likes_recorded() {
    LIKES_RECORDED.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_qr_codes_linked() {
    QR_CODES_LINKED.fetch_add(1, Ordering::Relaxed);
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct MetricsResponse {
    pub http_requests_total: u64,
    pub http_errors_total: u64,
    pub mottos_created_total: u64,
    pub motto_likes_total: u64,
    pub qr_codes_linked_total: u64,
}

impl MetricsResponse {
    fn snapshot() -> Self {
        MetricsResponse {
            http_requests_total: REQUEST_COUNT.load(Ordering::Relaxed),
            http_errors_total: ERROR_COUNT.load(Ordering::Relaxed),
            mottos_created_total: MOTTOS_CREATED.load(Ordering::Relaxed),
            motto_likes_total: LIKES_RECORDED.load(Ordering::Relaxed),
            qr_codes_linked_total: QR_CODES_LINKED.load(Ordering::Relaxed),
        }
    }

    fn to_prometheus(&self) -> String {
        let counters = [
            ("http_requests_total", "Total number of HTTP requests", self.http_requests_total),
            ("http_errors_total", "Total number of HTTP errors", self.http_errors_total),
            ("mottos_created_total", "Mottos created", self.mottos_created_total),
            ("motto_likes_total", "New likes recorded", self.motto_likes_total),
            ("qr_codes_linked_total", "QR codes linked to a customer", self.qr_codes_linked_total),
        ];

        counters
            .iter()
            .map(|(name, help, value)| {
                format!(
                    "# HELP {name} {help}\n# TYPE {name} counter\n{name} {value}\n",
                    name = name,
                    help = help,
                    value = value
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Prometheus counters", body = MetricsResponse)
    )
)]
pub async fn get_metrics() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(MetricsResponse::snapshot().to_prometheus())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prometheus_format() {
        let text = MetricsResponse {
            http_requests_total: 7,
            http_errors_total: 1,
            mottos_created_total: 2,
            motto_likes_total: 3,
            qr_codes_linked_total: 0,
        }
        .to_prometheus();

        assert!(text.contains("# TYPE http_requests_total counter\nhttp_requests_total 7\n"));
        assert!(text.contains("motto_likes_total 3"));
        assert!(text.contains("qr_codes_linked_total 0"));
    }
}
