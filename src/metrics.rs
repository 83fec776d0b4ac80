use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse,
};
use chrono::{DateTime, Utc};
use futures_util::future::{ok, Ready};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

/// In-process request counters. Counts reset on restart; this is a
/// low-traffic site and the counters exist to answer "is anyone visiting"
/// rather than to survive redeploys.
#[derive(Clone)]
pub struct MetricsCollector {
    counts: Arc<Mutex<HashMap<(String, String), u64>>>,
    start_time: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct EndpointStats {
    pub method: String,
    pub path: String,
    pub count: u64,
}

#[derive(Serialize)]
pub struct MetricsResponse {
    pub endpoints: Vec<EndpointStats>,
    pub total_calls: u64,
    pub uptime_secs: i64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            counts: Arc::new(Mutex::new(HashMap::new())),
            start_time: Utc::now(),
        }
    }

    pub fn record(&self, method: &str, path: &str) {
        let mut counts = self.counts.lock().unwrap();
        *counts
            .entry((method.to_string(), path.to_string()))
            .or_insert(0) += 1;
    }

    pub fn summary(&self) -> MetricsResponse {
        let counts = self.counts.lock().unwrap();
        let mut endpoints: Vec<EndpointStats> = counts
            .iter()
            .map(|((method, path), count)| EndpointStats {
                method: method.clone(),
                path: path.clone(),
                count: *count,
            })
            .collect();
        endpoints.sort_by(|a, b| b.count.cmp(&a.count).then(a.path.cmp(&b.path)));

        MetricsResponse {
            total_calls: endpoints.iter().map(|e| e.count).sum(),
            endpoints,
            uptime_secs: (Utc::now() - self.start_time).num_seconds(),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsCollector
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MetricsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(MetricsMiddleware {
            service,
            metrics: self.clone(),
        })
    }
}

pub struct MetricsMiddleware<S> {
    service: S,
    metrics: MetricsCollector,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let path = req.path().to_string();
        let method = req.method().to_string();
        let should_track = path.starts_with("/api/") || path == "/health";
        let metrics = self.metrics.clone();

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            if should_track {
                metrics.record(&method, &path);
            }
            Ok(res)
        })
    }
}

pub async fn get_metrics_handler(
    metrics: actix_web::web::Data<MetricsCollector>,
) -> HttpResponse {
    HttpResponse::Ok().json(metrics.summary())
}
