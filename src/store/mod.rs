//! Durable and in-memory rate stores.

pub mod disk;
pub mod memory;

use crate::core::currency::CurrencyCode;
use crate::core::error::RateError;
use crate::core::rate::RateTable;
use async_trait::async_trait;

/// An append/merge-capable tabular persistence layer keyed by
/// `(date, currency)`.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Reads the persisted table. A store with no persisted state yet yields
    /// the empty table; first run is not an error.
    async fn load(&self) -> Result<RateTable, RateError>;

    /// Computes the union of the stored table and `incoming` (incoming wins
    /// on shared keys), writes the result back in full, and returns it.
    async fn merge_and_save(&self, incoming: RateTable) -> Result<RateTable, RateError>;

    /// Tabular serialization of the stored rows for `codes` only. Does not
    /// mutate the store.
    async fn export_subset(&self, codes: &[CurrencyCode]) -> Result<String, RateError>;
}

/// Renders a table in the artifact format: a `date,currency,rate` header and
/// one row per record in table order. A missing rate is an empty field,
/// never the text "null" or "NaN".
pub(crate) fn to_csv(table: &RateTable) -> Result<String, RateError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .write_record(["date", "currency", "rate"])
        .map_err(RateError::persistence)?;
    for record in table.records() {
        writer.serialize(record).map_err(RateError::persistence)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(RateError::persistence)?;
    String::from_utf8(bytes).map_err(RateError::persistence)
}
