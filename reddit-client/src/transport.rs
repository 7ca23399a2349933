use crate::metrics::{ApiMetrics, MetricsCollector, RequestMetrics};
use crate::rate_limiter::{RateLimitConfig, RateLimitStatus, RateLimiter};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};
use verdict_core::{CoreError, ServiceError};

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Maps a non-success HTTP status to the service error it stands for.
///
/// Returns `None` for 2xx statuses.
pub fn classify_status(
    service: &str,
    status: u16,
    resource: &str,
    retry_after: Option<u64>,
) -> Option<ServiceError> {
    let service = service.to_string();
    match status {
        200..=299 => None,
        401 => Some(ServiceError::AuthenticationFailed {
            service,
            reason: format!("unauthorized for {}", resource),
        }),
        403 => Some(ServiceError::Forbidden {
            service,
            resource: resource.to_string(),
        }),
        404 => Some(ServiceError::NotFound {
            service,
            resource: resource.to_string(),
        }),
        408 => Some(ServiceError::RequestTimeout { service }),
        429 => Some(ServiceError::RateLimitExceeded {
            service,
            retry_after: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        }),
        500..=599 => Some(ServiceError::ServerError {
            service,
            status_code: status,
        }),
        _ => Some(ServiceError::UnexpectedStatus {
            service,
            status_code: status,
        }),
    }
}

/// Rate-limited, metered HTTP access to one remote service.
#[derive(Debug)]
pub struct Transport {
    service: &'static str,
    http_client: Client,
    rate_limiter: RateLimiter,
    metrics: MetricsCollector,
}

impl Transport {
    pub fn new(
        service: &'static str,
        user_agent: &str,
        rate_config: RateLimitConfig,
    ) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            service,
            http_client,
            rate_limiter: RateLimiter::new(rate_config),
            metrics: MetricsCollector::new(),
        })
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn http(&self) -> &Client {
        &self.http_client
    }

    /// Waits for a permit, sends `request` and maps failures to `CoreError`.
    ///
    /// `endpoint` labels the request in logs and metrics.
    pub async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response, CoreError> {
        let permit = self.rate_limiter.acquire_permit().await;
        debug!(
            "Acquired {} permit for {} after {:?}",
            self.service, endpoint, permit.queue_wait_time
        );

        let start_time = Instant::now();
        let outcome = request.send().await;
        let response_time = start_time.elapsed();

        let (result, status_code) = match outcome {
            Ok(response) => {
                let status = response.status().as_u16();
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok());

                match classify_status(self.service, status, endpoint, retry_after) {
                    None => (Ok(response), Some(status)),
                    Some(service_error) => {
                        if status == 429 {
                            warn!("{} rate limited on {}", self.service, endpoint);
                        } else {
                            error!("Request failed with status: {} for {}", status, endpoint);
                        }
                        (Err(CoreError::Service(service_error)), Some(status))
                    }
                }
            }
            Err(e) => {
                error!("Network error for {} {}: {}", self.service, endpoint, e);
                let mapped = if e.is_timeout() {
                    CoreError::Service(ServiceError::RequestTimeout {
                        service: self.service.to_string(),
                    })
                } else {
                    CoreError::Network(e)
                };
                (Err(mapped), None)
            }
        };

        self.metrics
            .record_request(RequestMetrics {
                endpoint: endpoint.to_string(),
                status_code,
                response_time,
                success: result.is_ok(),
                rate_limited: status_code == Some(429),
            })
            .await;

        result
    }

    /// Decodes a JSON body, reporting decode failures as invalid responses.
    pub async fn decode<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        response: Response,
    ) -> Result<T, CoreError> {
        response.json::<T>().await.map_err(|e| {
            error!("Failed to parse {} response from {}: {}", self.service, endpoint, e);
            CoreError::Service(ServiceError::InvalidResponse {
                service: self.service.to_string(),
                details: format!("cannot decode {}: {}", endpoint, e),
            })
        })
    }

    pub async fn get_metrics(&self) -> ApiMetrics {
        self.metrics.get_metrics().await
    }

    pub async fn get_rate_limit_status(&self) -> RateLimitStatus {
        self.rate_limiter.get_rate_limit_status().await
    }
}
