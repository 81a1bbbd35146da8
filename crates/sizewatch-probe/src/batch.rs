//! One monitoring pass over the product list.

use chrono::NaiveDate;
use sizewatch_core::daily::daily_row;
use sizewatch_core::product_list::{backfill_product_id, read_product_list};
use sizewatch_core::{ProbeSettings, ProbeStatus, StoreError, Worksheet};

use crate::orchestrator::probe_product;
use crate::page::BrowserSession;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub probed: usize,
    pub ok: usize,
    pub no_size_group: usize,
    pub failed: usize,
    pub backfilled: usize,
}

/// Probe every listed product in order, appending one `Daily` row each.
///
/// Product failures are recorded in their row and never stop the pass.
/// Identifiers resolved for rows with an empty identifier cell are written
/// back to the product list.
///
/// # Errors
///
/// Returns [`StoreError`] if the product list cannot be read or a daily row
/// cannot be appended.
pub async fn run_batch<B, S, D>(
    browser: &B,
    products: &mut S,
    daily: &mut D,
    settings: &ProbeSettings,
    run_date: NaiveDate,
    limit: Option<usize>,
) -> Result<BatchSummary, StoreError>
where
    B: BrowserSession + ?Sized,
    S: Worksheet + ?Sized,
    D: Worksheet + ?Sized,
{
    let list = read_product_list(&*products)?;
    let total = limit.map_or(list.entries.len(), |n| n.min(list.entries.len()));
    tracing::info!(layout = %list.layout, total, "starting monitoring pass");

    let mut summary = BatchSummary::default();
    for (index, entry) in list.entries.iter().take(total).enumerate() {
        if index > 0 {
            tokio::time::sleep(settings.inter_product_delay).await;
        }

        let result = probe_product(browser, &entry.url, settings).await;
        tracing::info!(
            n = index + 1,
            total,
            url = %entry.url,
            status = %result.status,
            sizes = ?result.sizes_avail,
            "probed product"
        );

        daily.append_row(&daily_row(&result, run_date))?;

        summary.probed += 1;
        match result.status {
            ProbeStatus::Ok => summary.ok += 1,
            ProbeStatus::NoSizeGroup => summary.no_size_group += 1,
            ProbeStatus::Error(_) => summary.failed += 1,
        }

        if entry.product_id.is_empty() && !result.product_id.is_empty() {
            match backfill_product_id(products, list.layout, &entry.url, &result.product_id) {
                Ok(true) => summary.backfilled += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(url = %entry.url, error = %e, "product id back-fill failed");
                }
            }
        }
    }

    tracing::info!(
        probed = summary.probed,
        ok = summary.ok,
        no_size_group = summary.no_size_group,
        failed = summary.failed,
        backfilled = summary.backfilled,
        "monitoring pass complete"
    );
    Ok(summary)
}
