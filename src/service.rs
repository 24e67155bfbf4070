//! Inbound operations served to callers (the CLI today, any front end
//! tomorrow): known-code listing, rate queries, persist requests, export.

use crate::core::currency::CurrencyCode;
use crate::core::error::RateError;
use crate::core::rate::RateRecord;
use crate::pipeline::RatePipeline;
use crate::store::RateStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Structured rates payload returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatesResponse {
    pub exchange_rates: Vec<RateRecord>,
}

pub struct RateService {
    pipeline: RatePipeline,
    store: Arc<dyn RateStore>,
    known: Vec<CurrencyCode>,
}

impl RateService {
    pub fn new(
        pipeline: RatePipeline,
        store: Arc<dyn RateStore>,
        known: Vec<CurrencyCode>,
    ) -> Self {
        RateService {
            pipeline,
            store,
            known,
        }
    }

    /// Currently known codes: the configured list plus whatever the store
    /// already holds, first-seen order, deduplicated.
    pub async fn currency_codes(&self) -> Result<Vec<CurrencyCode>, RateError> {
        let mut codes = self.known.clone();
        for code in self.store.load().await?.codes() {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
        Ok(codes)
    }

    /// Fetches current rates for `codes` without persisting them.
    pub async fn exchange_rates(&self, codes: &[CurrencyCode]) -> Result<RatesResponse, RateError> {
        let table = self.pipeline.run(codes, false).await?;
        Ok(RatesResponse {
            exchange_rates: table.records().to_vec(),
        })
    }

    /// Persist request: fetches, merges into the store, and returns the
    /// resulting full table.
    pub async fn save_rates(&self, codes: &[CurrencyCode]) -> Result<RatesResponse, RateError> {
        let table = self.pipeline.run(codes, true).await?;
        Ok(RatesResponse {
            exchange_rates: table.records().to_vec(),
        })
    }

    /// CSV serialization of the stored history for `codes`.
    pub async fn export(&self, codes: &[CurrencyCode]) -> Result<String, RateError> {
        self.store.export_subset(codes).await
    }
}
