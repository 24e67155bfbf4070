//! Tabular rate model and the upstream fetch abstraction.

use crate::core::currency::CurrencyCode;
use crate::core::error::RateError;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One published rate. `rate` is `None` when upstream reported an
/// unquantifiable value (no trading, holiday).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    pub date: NaiveDate,
    pub currency: CurrencyCode,
    pub rate: Option<f64>,
}

/// Insertion-ordered set of [`RateRecord`], unique by `(date, currency)`.
///
/// Insertion order is the display and export order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    records: Vec<RateRecord>,
    index: HashMap<(NaiveDate, CurrencyCode), usize>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RateRecord] {
        &self.records
    }

    pub fn get(&self, date: NaiveDate, currency: CurrencyCode) -> Option<&RateRecord> {
        self.index
            .get(&(date, currency))
            .map(|&pos| &self.records[pos])
    }

    /// Merge-insert: an existing `(date, currency)` key keeps its position
    /// and takes the incoming rate; a new key appends.
    pub fn upsert(&mut self, record: RateRecord) {
        let key = (record.date, record.currency);
        match self.index.get(&key) {
            Some(&pos) => self.records[pos] = record,
            None => {
                self.index.insert(key, self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Union with `incoming` keyed by `(date, currency)`; incoming wins on
    /// shared keys.
    pub fn merge(&mut self, incoming: RateTable) {
        for record in incoming.records {
            self.upsert(record);
        }
    }

    /// Distinct currency codes in first-seen order.
    pub fn codes(&self) -> Vec<CurrencyCode> {
        let mut codes = Vec::new();
        for record in &self.records {
            if !codes.contains(&record.currency) {
                codes.push(record.currency);
            }
        }
        codes
    }

    /// Sub-table containing only the requested codes, original order kept.
    pub fn filter_codes(&self, codes: &[CurrencyCode]) -> RateTable {
        self.records
            .iter()
            .filter(|r| codes.contains(&r.currency))
            .cloned()
            .collect()
    }
}

impl FromIterator<RateRecord> for RateTable {
    fn from_iter<T: IntoIterator<Item = RateRecord>>(iter: T) -> Self {
        let mut table = RateTable::new();
        for record in iter {
            table.upsert(record);
        }
        table
    }
}

/// Fetches the raw (possibly non-conformant) response body for a set of
/// currency codes in a single upstream round trip.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_raw(&self, codes: &[CurrencyCode]) -> Result<String, RateError>;
}
