//! Bounded exponential backoff on transient response statuses.

use log::{debug, warn};
use reqwest::StatusCode;
use std::time::Duration;

use super::HttpError;
use super::transport::{Request, Response, Transport};

/// Maximum number of retries after the first attempt.
pub const MAX_RETRIES: u32 = 10;

/// Growth factor of the delay between attempts.
pub const BACKOFF_BASE: f64 = 1.5;

/// Scale of the delay between attempts.
pub const BACKOFF_UNIT: Duration = Duration::from_millis(500);

/// Statuses worth another attempt: 429, 500, 502, 503 and 504.
pub fn is_transient(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// How many times to retry and how long to wait in between.
///
/// Retry `n` (counting from 1) waits `BACKOFF_BASE^n * unit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            unit: BACKOFF_UNIT,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, unit: Duration) -> Self {
        Self { max_retries, unit }
    }

    /// A policy that sends every request exactly once.
    pub fn no_retry() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before retry number `retry`. The first attempt (`0`) never waits.
    pub fn delay(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let factor = BACKOFF_BASE.powi(retry.min(i32::MAX as u32) as i32);
        Duration::try_from_secs_f64(self.unit.as_secs_f64() * factor).unwrap_or(Duration::MAX)
    }

    /// Sends `request` until the response is not transient or the budget runs out.
    ///
    /// The last response is returned as-is, transient or not. A transport
    /// failure ends the loop immediately.
    pub async fn send(
        &self,
        transport: &dyn Transport,
        request: &Request,
    ) -> Result<Response, HttpError> {
        let mut retry = 0;

        loop {
            if retry > 0 {
                tokio::time::sleep(self.delay(retry)).await;
            }

            let response = transport.execute(request).await?;

            if !is_transient(response.status) {
                return Ok(response);
            }

            if retry >= self.max_retries {
                debug!(
                    "{} {}: giving up after {} attempts ({})",
                    request.method,
                    request.url,
                    retry + 1,
                    response.status
                );
                return Ok(response);
            }

            retry += 1;
            warn!(
                "{} {}: attempt {}/{} returned {}, retrying in {}ms...",
                request.method,
                request.url,
                retry,
                self.max_retries + 1,
                response.status,
                self.delay(retry).as_millis()
            );
        }
    }
}
