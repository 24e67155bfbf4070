//! Pre-parse repair and structural normalization of upstream bodies.
//!
//! Upstream encodes unquantifiable rates as bare `NaN`-family tokens, which
//! is not valid JSON. The repair happens at the text level before structural
//! parsing so the workaround stays auditable and testable in isolation.

use crate::core::currency::CurrencyCode;
use crate::core::error::RateError;
use crate::core::rate::{RateRecord, RateTable};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Replaces the non-standard numeric tokens a Python JSON encoder can emit
/// (`NaN`, `Infinity`, `-Infinity`) with `null`, leaving string literals
/// untouched. Idempotent.
pub fn sanitize_tokens(raw: &str) -> String {
    // Longest token first so `-Infinity` is not half-matched as `Infinity`.
    const TOKENS: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

    let mut out = String::with_capacity(raw.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut prev_word = false;
    let mut rest = raw;

    'outer: while let Some(c) = rest.chars().next() {
        if !in_string && !prev_word {
            for token in TOKENS {
                if rest.starts_with(token)
                    && !rest[token.len()..].starts_with(|c: char| c.is_ascii_alphanumeric())
                {
                    out.push_str("null");
                    rest = &rest[token.len()..];
                    continue 'outer;
                }
            }
        }
        out.push(c);
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else {
            if c == '"' {
                in_string = true;
                escaped = false;
            }
            prev_word = c.is_ascii_alphanumeric();
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}

#[derive(Debug, Deserialize)]
struct RateEntry {
    currency: String,
    #[serde(default)]
    rate: Option<f64>,
    #[serde(default)]
    date: Option<NaiveDate>,
}

/// Normalizes a raw upstream body into a [`RateTable`].
///
/// Entries carrying no explicit date are stamped with `as_of` (the fetch
/// date), so identical `(raw, as_of)` inputs always produce identical tables.
/// Unknown entry fields are ignored; duplicate `(date, currency)` keys within
/// one payload collapse, last entry winning.
pub fn normalize(raw: &str, as_of: NaiveDate) -> Result<RateTable, RateError> {
    let repaired = sanitize_tokens(raw);

    let doc: Value = serde_json::from_str(&repaired)
        .map_err(|e| RateError::MalformedResponse(e.to_string()))?;

    let entries = doc
        .get("exchange_rates")
        .ok_or_else(|| RateError::UnexpectedSchema("missing `exchange_rates` field".into()))?
        .as_array()
        .ok_or_else(|| RateError::UnexpectedSchema("`exchange_rates` is not a sequence".into()))?;

    let mut table = RateTable::new();
    for entry in entries {
        let entry: RateEntry = serde_json::from_value(entry.clone())
            .map_err(|e| RateError::UnexpectedSchema(format!("bad rate entry: {e}")))?;
        let currency: CurrencyCode = entry.currency.parse().map_err(|_| {
            RateError::UnexpectedSchema(format!("bad currency code '{}'", entry.currency))
        })?;
        table.upsert(RateRecord {
            date: entry.date.unwrap_or(as_of),
            currency,
            rate: entry.rate,
        });
    }

    debug!("Normalized {} rate records", table.len());
    Ok(table)
}
