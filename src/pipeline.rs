//! Orchestration of fetch → normalize → merge.

use crate::core::currency::CurrencyCode;
use crate::core::error::RateError;
use crate::core::rate::{RateSource, RateTable};
use crate::normalize;
use crate::store::RateStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

/// Progress marker logged at each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Fetching,
    Normalizing,
    Merging,
    Done,
}

pub struct RatePipeline {
    source: Arc<dyn RateSource>,
    store: Arc<dyn RateStore>,
    known: Vec<CurrencyCode>,
}

impl RatePipeline {
    pub fn new(
        source: Arc<dyn RateSource>,
        store: Arc<dyn RateStore>,
        known: Vec<CurrencyCode>,
    ) -> Self {
        RatePipeline {
            source,
            store,
            known,
        }
    }

    fn validate(&self, codes: &[CurrencyCode]) -> Result<(), RateError> {
        if codes.is_empty() {
            return Err(RateError::InvalidRequest(
                "no currency codes selected".into(),
            ));
        }
        if let Some(unknown) = codes.iter().find(|c| !self.known.contains(c)) {
            return Err(RateError::InvalidRequest(format!(
                "unknown currency code {unknown}"
            )));
        }
        Ok(())
    }

    /// Runs the pipeline for `codes`. The first failing stage aborts the
    /// rest; the store is only touched once normalization has fully
    /// succeeded. Returns the fetched table, or the full merged table when
    /// `persist` is set.
    pub async fn run(&self, codes: &[CurrencyCode], persist: bool) -> Result<RateTable, RateError> {
        self.validate(codes)?;

        debug!(stage = ?Stage::Fetching, ?codes);
        let raw = self.source.fetch_raw(codes).await?;

        debug!(stage = ?Stage::Normalizing, bytes = raw.len());
        let fetched = normalize::normalize(&raw, Utc::now().date_naive())?;

        let result = if persist {
            debug!(stage = ?Stage::Merging, records = fetched.len());
            self.store.merge_and_save(fetched).await?
        } else {
            fetched
        };

        debug!(stage = ?Stage::Done, records = result.len());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;

    struct StaticSource(String);

    #[async_trait]
    impl RateSource for StaticSource {
        async fn fetch_raw(&self, _codes: &[CurrencyCode]) -> Result<String, RateError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl RateSource for FailingSource {
        async fn fetch_raw(&self, codes: &[CurrencyCode]) -> Result<String, RateError> {
            Err(RateError::upstream(codes, "HTTP status 500 Internal Server Error"))
        }
    }

    fn codes(list: &[&str]) -> Vec<CurrencyCode> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn pipeline_with(source: impl RateSource + 'static) -> (RatePipeline, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let pipeline = RatePipeline::new(
            Arc::new(source),
            Arc::clone(&store) as Arc<dyn RateStore>,
            codes(&["EUR", "USD", "CHF"]),
        );
        (pipeline, store)
    }

    #[tokio::test]
    async fn test_run_without_persist_leaves_store_untouched() {
        let body = r#"{"exchange_rates":[{"currency":"USD","rate":3.95}]}"#;
        let (pipeline, store) = pipeline_with(StaticSource(body.to_string()));

        let table = pipeline.run(&codes(&["USD"]), false).await.unwrap();

        assert_eq!(table.len(), 1);
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_with_persist_merges_into_store() {
        let body = r#"{"exchange_rates":[
            {"currency":"USD","rate":3.95,"date":"2026-08-06"},
            {"currency":"EUR","rate":NaN,"date":"2026-08-06"}
        ]}"#;
        let (pipeline, store) = pipeline_with(StaticSource(body.to_string()));

        let merged = pipeline.run(&codes(&["USD", "EUR"]), true).await.unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(store.load().await.unwrap(), merged);
    }

    #[tokio::test]
    async fn test_upstream_failure_short_circuits_before_the_store() {
        let (pipeline, store) = pipeline_with(FailingSource);

        let result = pipeline.run(&codes(&["USD"]), true).await;

        assert!(matches!(
            result,
            Err(RateError::UpstreamUnavailable { .. })
        ));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_schema_violation_short_circuits_before_the_store() {
        let (pipeline, store) = pipeline_with(StaticSource(r#"{"rates":[]}"#.to_string()));

        let result = pipeline.run(&codes(&["USD"]), true).await;

        assert!(matches!(result, Err(RateError::UnexpectedSchema(_))));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_code_is_rejected_before_fetching() {
        let (pipeline, _store) = pipeline_with(StaticSource(String::new()));

        let result = pipeline.run(&codes(&["JPY"]), false).await;
        assert!(matches!(result, Err(RateError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_empty_selection_is_rejected() {
        let (pipeline, _store) = pipeline_with(StaticSource(String::new()));

        let result = pipeline.run(&[], false).await;
        assert!(matches!(result, Err(RateError::InvalidRequest(_))));
    }
}
