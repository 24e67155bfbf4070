pub mod core;
pub mod normalize;
pub mod pipeline;
pub mod providers;
pub mod service;
pub mod setup;
pub mod store;
pub mod ui;

use crate::core::config::AppConfig;
use crate::core::currency::CurrencyCode;
use crate::pipeline::RatePipeline;
use crate::providers::nbp::NbpProvider;
use crate::service::{RateService, RatesResponse};
use crate::store::RateStore;
use crate::store::disk::CsvStore;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub enum AppCommand {
    Currencies,
    Rates { codes: Vec<String> },
    Sync { codes: Vec<String> },
    Export { codes: Vec<String>, output: Option<PathBuf> },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Rates tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let known = config.known_currencies()?;
    let source = Arc::new(NbpProvider::new(
        &config.upstream.base_url,
        Duration::from_secs(config.upstream.timeout_secs),
    ));
    let store: Arc<dyn RateStore> = Arc::new(CsvStore::new(config.rates_file_path()?));
    let pipeline = RatePipeline::new(source, Arc::clone(&store), known.clone());
    let service = RateService::new(pipeline, store, known.clone());

    match command {
        AppCommand::Currencies => {
            let codes = service.currency_codes().await?;
            println!("{}", ui::style_text("Known currencies", ui::StyleType::Title));
            for code in codes {
                println!("{code}");
            }
        }
        AppCommand::Rates { codes } => {
            let codes = resolve_codes(&codes, &known)?;
            let spinner = ui::new_spinner("Fetching exchange rates...");
            let response = service.exchange_rates(&codes).await;
            spinner.finish_and_clear();
            display_rates(&response?);
        }
        AppCommand::Sync { codes } => {
            let codes = resolve_codes(&codes, &known)?;
            let spinner = ui::new_spinner("Fetching and saving exchange rates...");
            let response = service.save_rates(&codes).await;
            spinner.finish_and_clear();
            let response = response?;
            display_rates(&response);
            println!(
                "{}",
                ui::style_text(
                    &format!("Store now holds {} records", response.exchange_rates.len()),
                    ui::StyleType::TotalValue,
                )
            );
        }
        AppCommand::Export { codes, output } => {
            let codes = resolve_codes(&codes, &known)?;
            let exported = service.export(&codes).await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &exported)
                        .with_context(|| format!("Failed to write export to {}", path.display()))?;
                    println!("Exported stored rates to {}", path.display());
                }
                None => print!("{exported}"),
            }
        }
    }

    Ok(())
}

/// An empty selection falls back to the configured currency universe.
fn resolve_codes(requested: &[String], known: &[CurrencyCode]) -> Result<Vec<CurrencyCode>> {
    if requested.is_empty() {
        return Ok(known.to_vec());
    }
    requested
        .iter()
        .map(|s| s.parse::<CurrencyCode>().map_err(anyhow::Error::from))
        .collect()
}

fn display_rates(response: &RatesResponse) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Currency"),
        ui::header_cell("Rate"),
    ]);
    for record in &response.exchange_rates {
        table.add_row(vec![
            comfy_table::Cell::new(record.date.to_string()),
            comfy_table::Cell::new(record.currency.to_string()),
            ui::rate_cell(record.rate),
        ]);
    }
    println!("{table}");
    println!(
        "{}",
        ui::style_text(
            &format!("{} records", response.exchange_rates.len()),
            ui::StyleType::Subtle,
        )
    );
}
