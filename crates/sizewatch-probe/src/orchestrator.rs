//! Per-product probe: one page, one result, whatever happens.

use sizewatch_core::{ProbeSettings, ProductProbeResult, SizeTally};

use crate::consent::dismiss_consent;
use crate::error::PageError;
use crate::groups::{classify, locate_groups};
use crate::identity::{extract_product_id, extract_product_name};
use crate::page::{BrowserSession, PageSession};
use crate::prober::probe_interactively;
use crate::static_read::read_static_sizes;
use crate::vocab::{DROPDOWN_GROUP_ELEMENT, RADIO_GROUP_ELEMENT};

/// Identity resolved so far; kept when a later step fails.
#[derive(Debug, Default)]
struct Progress {
    product_id: String,
    name: String,
}

enum Outcome {
    Sizes(SizeTally),
    NoSizeGroup,
}

/// Probe one product URL. Always yields exactly one result: faults become an
/// `error:<category>` status. The page is closed on every path.
pub async fn probe_product<B: BrowserSession + ?Sized>(
    browser: &B,
    url: &str,
    settings: &ProbeSettings,
) -> ProductProbeResult {
    let page = match browser.open_page().await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!(url, error = %e, "could not open page");
            return ProductProbeResult::failed(String::new(), url, String::new(), e.category());
        }
    };

    let mut progress = Progress::default();
    let outcome = probe_page(&page, url, settings, &mut progress).await;

    if let Err(e) = page.close().await {
        tracing::debug!(url, error = %e, "page close failed");
    }

    let Progress { product_id, name } = progress;
    match outcome {
        Ok(Outcome::Sizes(tally)) => ProductProbeResult::ok(product_id, url, name, tally),
        Ok(Outcome::NoSizeGroup) => ProductProbeResult::no_size_group(product_id, url, name),
        Err(e) => {
            tracing::warn!(url, error = %e, "probe aborted");
            ProductProbeResult::failed(product_id, url, name, e.category())
        }
    }
}

async fn probe_page<P: PageSession + ?Sized>(
    page: &P,
    url: &str,
    settings: &ProbeSettings,
    progress: &mut Progress,
) -> Result<Outcome, PageError> {
    page.goto(url, settings.navigation_timeout).await?;
    page.wait(settings.page_init_wait).await;

    dismiss_consent(page, settings).await;

    let widget = format!("{RADIO_GROUP_ELEMENT}, {DROPDOWN_GROUP_ELEMENT}");
    let widget_seen = page.wait_for_selector(&widget, settings.variant_wait).await;

    // Titles and ids may be client-rendered; read them after the widget wait.
    progress.product_id = extract_product_id(page, url).await;
    progress.name = extract_product_name(page).await;

    if !widget_seen? {
        tracing::debug!(url, "no variant widget appeared");
    }

    let groups = locate_groups(page).await?;
    let Some(classified) = classify(groups) else {
        tracing::debug!(url, "no size group");
        return Ok(Outcome::NoSizeGroup);
    };

    let tally = read_static_sizes(page, &classified.size).await?;
    if !tally.is_empty() {
        return Ok(Outcome::Sizes(tally));
    }

    let tally = probe_interactively(page, &classified, settings).await?;
    Ok(Outcome::Sizes(tally))
}
