use sizewatch_core::ProbeSettings;

use crate::page::{attribute_or_none, text_or_empty, visible_or_hidden, Node, PageSession};
use crate::vocab::{
    contains_caption, ADD_TO_CART_CAPTIONS, ADD_TO_CART_SELECTOR, STOCK_NOTE_SELECTOR,
    UNAVAILABLE_CAPTIONS, UNAVAILABLE_SELECTOR,
};

/// Judge whether the variant currently selected can be bought.
///
/// After the settle wait, any visible notify-me or out-of-stock caption
/// anywhere on the page means unavailable. Otherwise a visible and enabled add-to-cart control means
/// available. Anything else is unavailable.
pub async fn is_purchasable<P: PageSession + ?Sized>(page: &P, settings: &ProbeSettings) -> bool {
    page.wait(settings.settle).await;

    if has_visible_caption(page, UNAVAILABLE_SELECTOR, UNAVAILABLE_CAPTIONS).await
        || has_visible_stock_note(page).await
    {
        return false;
    }
    has_enabled_add_to_cart(page).await
}

async fn has_visible_caption<P: PageSession + ?Sized>(
    page: &P,
    selector: &str,
    captions: &[&str],
) -> bool {
    let nodes = match page.query_all(None, selector).await {
        Ok(nodes) => nodes,
        Err(e) => {
            tracing::debug!(error = %e, "negative signal lookup failed");
            return false;
        }
    };
    for node in nodes {
        if contains_caption(&caption_of(page, node).await, captions)
            && visible_or_hidden(page, node).await
        {
            return true;
        }
    }
    false
}

/// A negative caption in plain page text, such as a sold-out badge or a
/// note under the price.
async fn has_visible_stock_note<P: PageSession + ?Sized>(page: &P) -> bool {
    let notes = match page
        .leaves_containing(STOCK_NOTE_SELECTOR, UNAVAILABLE_CAPTIONS)
        .await
    {
        Ok(notes) => notes,
        Err(e) => {
            tracing::debug!(error = %e, "stock note lookup failed");
            return false;
        }
    };
    for note in notes {
        if visible_or_hidden(page, note).await {
            return true;
        }
    }
    false
}

async fn has_enabled_add_to_cart<P: PageSession + ?Sized>(page: &P) -> bool {
    let nodes = match page.query_all(None, ADD_TO_CART_SELECTOR).await {
        Ok(nodes) => nodes,
        Err(e) => {
            tracing::debug!(error = %e, "add-to-cart lookup failed");
            return false;
        }
    };
    for node in nodes {
        if !contains_caption(&caption_of(page, node).await, ADD_TO_CART_CAPTIONS) {
            continue;
        }
        if visible_or_hidden(page, node).await && is_enabled(page, node).await {
            return true;
        }
    }
    false
}

/// Text of the control, or its `value` for submit inputs.
async fn caption_of<P: PageSession + ?Sized>(page: &P, node: Node<'_>) -> String {
    let text = text_or_empty(page, node).await;
    if text.is_empty() {
        attribute_or_none(page, node, "value")
            .await
            .unwrap_or_default()
    } else {
        text
    }
}

async fn is_enabled<P: PageSession + ?Sized>(page: &P, node: Node<'_>) -> bool {
    if attribute_or_none(page, node, "disabled").await.is_some() {
        return false;
    }
    !attribute_or_none(page, node, "aria-disabled")
        .await
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}
