//! In-memory store for tests and ephemeral runs.

use crate::core::currency::CurrencyCode;
use crate::core::error::RateError;
use crate::core::rate::RateTable;
use crate::store::{RateStore, to_csv};
use async_trait::async_trait;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<RateTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateStore for MemoryStore {
    async fn load(&self) -> Result<RateTable, RateError> {
        Ok(self.inner.lock().await.clone())
    }

    async fn merge_and_save(&self, incoming: RateTable) -> Result<RateTable, RateError> {
        let mut table = self.inner.lock().await;
        table.merge(incoming);
        Ok(table.clone())
    }

    async fn export_subset(&self, codes: &[CurrencyCode]) -> Result<String, RateError> {
        let table = self.inner.lock().await;
        to_csv(&table.filter_codes(codes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rate::RateRecord;

    fn record(date: &str, currency: &str, rate: Option<f64>) -> RateRecord {
        RateRecord {
            date: date.parse().unwrap(),
            currency: currency.parse().unwrap(),
            rate,
        }
    }

    #[tokio::test]
    async fn test_starts_empty_and_accumulates_merges() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_empty());

        store
            .merge_and_save([record("2026-08-06", "USD", Some(3.95))].into_iter().collect())
            .await
            .unwrap();
        let merged = store
            .merge_and_save([record("2026-08-06", "USD", Some(4.01))].into_iter().collect())
            .await
            .unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(merged.records()[0].rate, Some(4.01));
    }

    #[tokio::test]
    async fn test_export_subset_filters_by_code() {
        let store = MemoryStore::new();
        store
            .merge_and_save(
                [
                    record("2026-08-06", "USD", Some(3.95)),
                    record("2026-08-06", "EUR", None),
                ]
                .into_iter()
                .collect(),
            )
            .await
            .unwrap();

        let exported = store
            .export_subset(&["EUR".parse().unwrap()])
            .await
            .unwrap();
        assert_eq!(exported, "date,currency,rate\n2026-08-06,EUR,\n");
    }
}
