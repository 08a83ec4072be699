// 📡 Fetch Client - shared blocking HTTP client for source adapters
//
// Retry policy:
//   401 / 403 / other 4xx  → fail immediately (credential or request problem)
//   429 / 5xx / network    → retry with exponential backoff, honouring Retry-After
//   Retry-After > 60s      → fail immediately (the whole run waits on every source)
//   2xx                    → parse JSON body (leading BOM tolerated)

use anyhow::{anyhow, Context, Result};
use std::thread;
use std::time::Duration;
use tracing::warn;

pub const MAX_RETRIES: u32 = 3;
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);
pub const USER_AGENT: &str = concat!("gig-catalog/", env!("CARGO_PKG_VERSION"));

pub struct FetchClient {
    http: reqwest::blocking::Client,
    source_name: String,

    /// Retries after the first attempt (default: 3)
    pub max_retries: u32,

    /// First backoff delay; doubles per retry (default: 1s)
    pub initial_backoff: Duration,

    /// Longest server-requested wait honoured before giving up (default: 60s)
    pub max_retry_after: Duration,
}

impl FetchClient {
    pub fn new(source_name: &str, timeout_secs: u64) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(FetchClient {
            http,
            source_name: source_name.to_string(),
            max_retries: MAX_RETRIES,
            initial_backoff: Duration::from_secs(1),
            max_retry_after: MAX_RETRY_AFTER,
        })
    }

    /// Builder pattern: override retry budget and first backoff delay
    pub fn with_retry_policy(mut self, max_retries: u32, initial_backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.initial_backoff = initial_backoff;
        self
    }

    /// GET `url` with `query` parameters and parse the JSON response.
    pub fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<serde_json::Value> {
        let mut backoff = self.initial_backoff;

        for attempt in 0..=self.max_retries {
            let last_attempt = attempt == self.max_retries;

            let response = match self.http.get(url).query(query).send() {
                Ok(resp) => resp,
                Err(e) => {
                    if last_attempt {
                        return Err(anyhow!(
                            "{} request failed after {} attempts: {}",
                            self.source_name,
                            attempt + 1,
                            e
                        ));
                    }
                    warn!(source = %self.source_name, attempt = attempt + 1, error = %e, "request failed, retrying");
                    thread::sleep(backoff);
                    backoff *= 2;
                    continue;
                }
            };

            let status = response.status().as_u16();

            if status == 429 || status >= 500 {
                if last_attempt {
                    return Err(anyhow!(
                        "{} {} after {} attempts (HTTP {})",
                        self.source_name,
                        if status == 429 { "rate limited" } else { "upstream error" },
                        attempt + 1,
                        status
                    ));
                }

                let wait = if status == 429 {
                    response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .map(Duration::from_secs)
                        .unwrap_or(backoff)
                } else {
                    backoff
                };

                if status == 429 && wait > self.max_retry_after {
                    return Err(anyhow!(
                        "{} rate limited: Retry-After of {}s exceeds the {}s limit",
                        self.source_name,
                        wait.as_secs(),
                        self.max_retry_after.as_secs()
                    ));
                }

                warn!(source = %self.source_name, attempt = attempt + 1, status, wait_ms = wait.as_millis() as u64, "retrying");
                thread::sleep(wait);
                backoff *= 2;
                continue;
            }

            if status == 401 || status == 403 {
                return Err(anyhow!("{} auth failed (HTTP {})", self.source_name, status));
            }

            if status >= 400 {
                let body: String = response.text().unwrap_or_default().chars().take(200).collect();
                return Err(anyhow!(
                    "{} request rejected (HTTP {}): {}",
                    self.source_name,
                    status,
                    body
                ));
            }

            let text = response
                .text()
                .with_context(|| format!("Failed to read {} response body", self.source_name))?;
            let trimmed = text.trim_start_matches('\u{feff}');
            return serde_json::from_str(trimmed)
                .with_context(|| format!("Failed to parse {} JSON response", self.source_name));
        }

        Err(anyhow!("{} retry budget exhausted", self.source_name))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn create_test_client() -> FetchClient {
        FetchClient::new("test", 5)
            .unwrap()
            .with_retry_policy(2, Duration::from_millis(0))
    }

    #[test]
    fn test_get_json_success_with_query() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/events").query_param("app_id", "abc");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!([{ "id": "1" }]));
        });

        let body = create_test_client()
            .get_json(&server.url("/events"), &[("app_id", "abc")])
            .unwrap();

        mock.assert();
        assert_eq!(body[0]["id"], "1");
    }

    #[test]
    fn test_server_errors_exhaust_retries() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/events");
            then.status(503);
        });

        let err = create_test_client().get_json(&server.url("/events"), &[]).unwrap_err();

        // 1 initial + 2 retries
        mock.assert_calls(3);
        assert!(err.to_string().contains("upstream error"), "message: {}", err);
    }

    #[test]
    fn test_long_retry_after_fails_without_waiting() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/events");
            then.status(429).header("retry-after", "3600");
        });

        let started = std::time::Instant::now();
        let err = create_test_client().get_json(&server.url("/events"), &[]).unwrap_err();

        mock.assert_calls(1);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(err.to_string().contains("Retry-After"), "message: {}", err);
    }

    #[test]
    fn test_short_retry_after_is_honoured() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/events");
            then.status(429).header("retry-after", "0");
        });

        let err = create_test_client().get_json(&server.url("/events"), &[]).unwrap_err();

        mock.assert_calls(3);
        assert!(err.to_string().contains("rate limited"), "message: {}", err);
    }

    #[test]
    fn test_auth_failure_is_not_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/events");
            then.status(401);
        });

        let err = create_test_client().get_json(&server.url("/events"), &[]).unwrap_err();

        mock.assert_calls(1);
        assert!(err.to_string().contains("auth failed"), "message: {}", err);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/events");
            then.status(200).body("<html>maintenance</html>");
        });

        let err = create_test_client().get_json(&server.url("/events"), &[]).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"), "message: {}", err);
    }
}
