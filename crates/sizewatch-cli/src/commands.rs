//! Command handlers. Each opens the resources it needs from the config and
//! releases them before returning.

use chrono::{NaiveDate, Utc};
use sizewatch_core::daily::{daily_row, DAILY_HEADERS, DAILY_SHEET};
use sizewatch_core::product_list::{read_product_list, PRODUCTS_HEADERS, PRODUCTS_SHEET};
use sizewatch_core::{AppConfig, AvailabilityMode, MemoryWorksheet, ProbeSettings, Workbook, Worksheet};
use sizewatch_probe::{probe_product, run_batch, ChromiumBrowser, LaunchOptions};
use sizewatch_store::CsvWorkbook;
use tracing::Instrument;

/// CDP commands are evicted after `request_timeout`, so it never drops
/// below the navigation timeout.
pub(crate) fn launch_options(config: &AppConfig) -> LaunchOptions {
    let defaults = LaunchOptions::default();
    let navigation = config.probe_settings().navigation_timeout;
    LaunchOptions {
        headless: config.headless,
        executable: config.chromium_path.clone(),
        request_timeout: defaults.request_timeout.max(navigation),
    }
}

fn settings_for(config: &AppConfig, mode: AvailabilityMode) -> ProbeSettings {
    ProbeSettings {
        mode,
        ..config.probe_settings()
    }
}

/// One monitoring pass over the product list.
///
/// With `dry_run`, daily rows go to an in-memory sheet and are printed, and
/// back-fill writes land in an in-memory copy of the product list.
///
/// # Errors
///
/// Returns an error if the workbook cannot be opened, the browser cannot be
/// launched, or a daily row cannot be written.
pub(crate) async fn run_pass(
    config: &AppConfig,
    mode: AvailabilityMode,
    dry_run: bool,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let run_id = uuid::Uuid::new_v4();
    let run_date = Utc::now().date_naive();
    let span = tracing::info_span!("run", %run_id, %run_date, %mode, dry_run);
    run_pass_inner(config, mode, dry_run, limit, run_date)
        .instrument(span)
        .await
}

async fn run_pass_inner(
    config: &AppConfig,
    mode: AvailabilityMode,
    dry_run: bool,
    limit: Option<usize>,
    run_date: NaiveDate,
) -> anyhow::Result<()> {
    let book = CsvWorkbook::open(&config.workbook_dir)?;
    let mut products = book.worksheet(PRODUCTS_SHEET, &PRODUCTS_HEADERS)?;
    let settings = settings_for(config, mode);

    let browser = ChromiumBrowser::launch(&launch_options(config)).await?;

    let outcome = if dry_run {
        let mut products = MemoryWorksheet::from_rows(PRODUCTS_SHEET, products.rows()?);
        let mut daily = MemoryWorksheet::from_rows(DAILY_SHEET, vec![DAILY_HEADERS
            .iter()
            .map(|h| (*h).to_string())
            .collect()]);
        let outcome = run_batch(
            &browser,
            &mut products,
            &mut daily,
            &settings,
            run_date,
            limit,
        )
        .await;
        if outcome.is_ok() {
            for row in daily.rows()? {
                println!("{}", row.join("\t"));
            }
        }
        outcome
    } else {
        let mut daily = book.worksheet(DAILY_SHEET, &DAILY_HEADERS)?;
        run_batch(
            &browser,
            &mut products,
            &mut daily,
            &settings,
            run_date,
            limit,
        )
        .await
    };

    browser.shutdown().await;
    let summary = outcome?;

    println!(
        "probed {} products: {} ok, {} without size group, {} failed, {} ids back-filled",
        summary.probed, summary.ok, summary.no_size_group, summary.failed, summary.backfilled
    );
    Ok(())
}

/// Probe a single URL and print its daily row or JSON result.
///
/// # Errors
///
/// Returns an error if the browser cannot be launched or the result cannot
/// be serialized.
pub(crate) async fn probe_one(
    config: &AppConfig,
    url: &str,
    mode: AvailabilityMode,
    json: bool,
) -> anyhow::Result<()> {
    let settings = settings_for(config, mode);
    let browser = ChromiumBrowser::launch(&launch_options(config)).await?;
    let result = probe_product(&browser, url, &settings).await;
    browser.shutdown().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let row = daily_row(&result, Utc::now().date_naive());
        for (header, value) in DAILY_HEADERS.iter().zip(row) {
            println!("{header:>12}: {value}");
        }
    }
    Ok(())
}

/// Print the detected product-list layout and the URLs a pass would probe.
///
/// # Errors
///
/// Returns an error if the workbook cannot be opened or read.
pub(crate) fn list_products(config: &AppConfig) -> anyhow::Result<()> {
    let book = CsvWorkbook::open(&config.workbook_dir)?;
    let products = book.worksheet(PRODUCTS_SHEET, &PRODUCTS_HEADERS)?;
    let list = read_product_list(&products)?;

    println!("layout: {}", list.layout);
    for entry in &list.entries {
        if entry.product_id.is_empty() {
            println!("{}", entry.url);
        } else {
            println!("{}\t{}", entry.product_id, entry.url);
        }
    }
    println!("{} products", list.entries.len());
    Ok(())
}
