//! Availability read straight from markup, without interacting.

use sizewatch_core::SizeTally;

use crate::error::PageError;
use crate::groups::{GroupKind, VariantGroup};
use crate::page::{attribute_or_none, text_or_empty, Node, PageSession};
use crate::vocab::{
    has_unavailable_class, is_placeholder, is_truthy_marker, UNAVAILABLE_ATTRIBUTES,
    USER_VALUE_ATTRIBUTES,
};

const SELECTABLE_INPUT_SELECTOR: &str = "input:not([type='hidden'])";

/// Read sizes and their availability from the size group's attributes.
/// Fallback groups carry no attribute contract and always read as empty.
///
/// # Errors
///
/// Returns [`PageError`] if the page cannot be queried.
pub async fn read_static_sizes<'p, P: PageSession + ?Sized>(
    page: &'p P,
    group: &VariantGroup<'p>,
) -> Result<SizeTally, PageError> {
    let tally = match group.kind {
        GroupKind::RadioTile => read_radio_inputs(page, group.root).await?,
        GroupKind::Dropdown => read_select_options(page, group.root).await?,
        GroupKind::FallbackHeading => SizeTally::new(),
    };
    tracing::debug!(kind = ?group.kind, sizes = tally.len(), "static read");
    Ok(tally)
}

async fn read_radio_inputs<'p, P: PageSession + ?Sized>(
    page: &'p P,
    root: Node<'p>,
) -> Result<SizeTally, PageError> {
    let mut tally = SizeTally::new();
    for input in page.query_all(Some(root), SELECTABLE_INPUT_SELECTOR).await? {
        let label = radio_label(page, input).await?;
        if label.is_empty() {
            continue;
        }
        let unavailable = is_marked_unavailable(page, input).await;
        tally.record(&label, !unavailable);
    }
    Ok(tally)
}

/// The input's user-value attribute, else the text of its `label[for]`.
async fn radio_label<'p, P: PageSession + ?Sized>(
    page: &'p P,
    input: Node<'p>,
) -> Result<String, PageError> {
    for attribute in USER_VALUE_ATTRIBUTES {
        if let Some(value) = attribute_or_none(page, input, attribute).await {
            if !value.trim().is_empty() {
                return Ok(value.trim().to_string());
            }
        }
    }

    let Some(id) = attribute_or_none(page, input, "id").await else {
        return Ok(String::new());
    };
    if id.trim().is_empty() {
        return Ok(String::new());
    }
    let selector = format!("label[for=\"{}\"]", css_string_escape(id.trim()));
    match page.query_all(None, &selector).await?.first() {
        Some(&label) => Ok(text_or_empty(page, label).await),
        None => Ok(String::new()),
    }
}

async fn read_select_options<'p, P: PageSession + ?Sized>(
    page: &'p P,
    root: Node<'p>,
) -> Result<SizeTally, PageError> {
    let mut tally = SizeTally::new();
    let selects = page.query_all(Some(root), "select").await?;
    let Some(&select) = selects.first() else {
        return Ok(tally);
    };
    for option in page.query_all(Some(select), "option").await? {
        let text = text_or_empty(page, option).await;
        if text.is_empty() || is_placeholder(&text) {
            continue;
        }
        let unavailable = is_marked_unavailable(page, option).await;
        tally.record(&text, !unavailable);
    }
    Ok(tally)
}

/// Whether the markup flags `node` as not purchasable: a truthy
/// unavailable marker, `disabled`, `aria-disabled="true"` or a sold-out
/// style class.
pub(crate) async fn is_marked_unavailable<P: PageSession + ?Sized>(
    page: &P,
    node: Node<'_>,
) -> bool {
    for attribute in UNAVAILABLE_ATTRIBUTES {
        if is_truthy_marker(attribute_or_none(page, node, attribute).await.as_deref()) {
            return true;
        }
    }
    attribute_or_none(page, node, "disabled").await.is_some()
        || attribute_or_none(page, node, "aria-disabled")
            .await
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
        || attribute_or_none(page, node, "class")
            .await
            .is_some_and(|class| has_unavailable_class(&class))
}

fn css_string_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
