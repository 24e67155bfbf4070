//! Client for the daily exchange-rates publishing service.

use crate::core::currency::CurrencyCode;
use crate::core::error::RateError;
use crate::core::rate::RateSource;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

pub struct NbpProvider {
    base_url: String,
    timeout: Duration,
}

impl NbpProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        NbpProvider {
            base_url: base_url.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl RateSource for NbpProvider {
    /// One GET with a repeated `currency` query parameter per requested
    /// code, so a pipeline invocation costs exactly one round trip. Retries,
    /// if any, are the caller's policy.
    #[instrument(name = "RateFetch", skip(self), fields(codes = ?codes))]
    async fn fetch_raw(&self, codes: &[CurrencyCode]) -> Result<String, RateError> {
        if codes.is_empty() {
            return Err(RateError::InvalidRequest(
                "no currency codes requested".into(),
            ));
        }

        let url = format!("{}/api/exchangerates/daily", self.base_url);
        let query: Vec<(&str, &str)> = codes.iter().map(|c| ("currency", c.as_str())).collect();
        debug!("Requesting daily rates from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("kursy/0.2")
            .timeout(self.timeout)
            .build()
            .map_err(|e| RateError::upstream(codes, e))?;

        let response = client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| RateError::upstream(codes, e))?;

        if !response.status().is_success() {
            return Err(RateError::upstream(
                codes,
                format!("HTTP status {}", response.status()),
            ));
        }

        response.text().await.map_err(|e| RateError::upstream(codes, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn codes(list: &[&str]) -> Vec<CurrencyCode> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_single_request_carries_every_code() {
        let mock_server = MockServer::start().await;
        let body = r#"{"exchange_rates":[]}"#;

        Mock::given(method("GET"))
            .and(path("/api/exchangerates/daily"))
            .and(query_param("currency", "EUR"))
            .and(query_param("currency", "USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = NbpProvider::new(&mock_server.uri(), Duration::from_secs(5));
        let raw = provider
            .fetch_raw(&codes(&["EUR", "USD"]))
            .await
            .unwrap();
        assert_eq!(raw, body);
    }

    #[tokio::test]
    async fn test_empty_code_set_is_rejected_without_a_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = NbpProvider::new(&mock_server.uri(), Duration::from_secs(5));
        let result = provider.fetch_raw(&[]).await;
        assert!(matches!(result, Err(RateError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_upstream_unavailable() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/exchangerates/daily"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let provider = NbpProvider::new(&mock_server.uri(), Duration::from_secs(5));
        let result = provider.fetch_raw(&codes(&["EUR"])).await;

        match result {
            Err(RateError::UpstreamUnavailable { codes, reason }) => {
                assert_eq!(codes, "EUR");
                assert!(reason.contains("500"));
            }
            other => panic!("Expected UpstreamUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_maps_to_upstream_unavailable() {
        // Nothing listens here; connection is refused immediately.
        let provider = NbpProvider::new("http://127.0.0.1:9", Duration::from_secs(1));
        let result = provider.fetch_raw(&codes(&["EUR"])).await;
        assert!(matches!(
            result,
            Err(RateError::UpstreamUnavailable { .. })
        ));
    }
}
