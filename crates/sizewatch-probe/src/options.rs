//! Option enumeration and selection for the interactive prober.

use sizewatch_core::ProbeSettings;

use crate::error::PageError;
use crate::groups::{GroupKind, VariantGroup};
use crate::page::{attribute_or_none, text_or_empty, visible_or_hidden, Node, PageSession};
use crate::static_read::is_marked_unavailable;
use crate::vocab::{
    contains_caption, is_placeholder, ADD_TO_CART_CAPTIONS, FALLBACK_OPTION_SELECTOR,
    RADIO_OPTION_SELECTOR, UNAVAILABLE_CAPTIONS,
};

/// How an option is put into effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionPayload<'p> {
    Click(Node<'p>),
    /// Native `select` element and the raw option value to choose.
    Select { select: Node<'p>, value: String },
}

/// One selectable value of a variant group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantOption<'p> {
    pub text: String,
    pub payload: OptionPayload<'p>,
    /// `false` when the markup already flags the option as unavailable.
    pub available: bool,
}

/// Accumulates options. Blank, placeholder, over-long and repeated captions
/// are rejected, as are purchase controls caught by a loose selector.
struct OptionCollector<'p> {
    options: Vec<VariantOption<'p>>,
    max_chars: usize,
    cap: Option<usize>,
}

impl<'p> OptionCollector<'p> {
    fn is_full(&self) -> bool {
        self.cap.is_some_and(|cap| self.options.len() >= cap)
    }

    fn push(&mut self, text: String, payload: OptionPayload<'p>) {
        self.push_marked(text, payload, true);
    }

    fn push_marked(&mut self, text: String, payload: OptionPayload<'p>, available: bool) {
        if text.is_empty()
            || is_placeholder(&text)
            || text.chars().count() > self.max_chars
            || contains_caption(&text, ADD_TO_CART_CAPTIONS)
            || contains_caption(&text, UNAVAILABLE_CAPTIONS)
            || self.options.iter().any(|o| o.text == text)
            || self.is_full()
        {
            return;
        }
        self.options.push(VariantOption {
            text,
            payload,
            available,
        });
    }
}

/// Enumerate the options of `group`. `cap` limits the count; the size group
/// is enumerated with `None`.
///
/// # Errors
///
/// Returns [`PageError`] if the page cannot be queried.
pub async fn enumerate_options<'p, P: PageSession + ?Sized>(
    page: &'p P,
    group: &VariantGroup<'p>,
    cap: Option<usize>,
    settings: &ProbeSettings,
) -> Result<Vec<VariantOption<'p>>, PageError> {
    let mut collector = OptionCollector {
        options: Vec::new(),
        max_chars: settings.max_option_chars,
        cap,
    };

    match group.kind {
        GroupKind::RadioTile => {
            let nodes = page.query_all(Some(group.root), RADIO_OPTION_SELECTOR).await?;
            collect_clickable(page, nodes, &mut collector).await;
        }
        GroupKind::FallbackHeading => {
            let nodes = page
                .following(
                    group.root,
                    FALLBACK_OPTION_SELECTOR,
                    settings.fallback_option_limit,
                )
                .await?;
            collect_clickable(page, nodes, &mut collector).await;
        }
        GroupKind::Dropdown => {
            let selects = page.query_all(Some(group.root), "select").await?;
            if let Some(&select) = selects.first() {
                for option in page.query_all(Some(select), "option").await? {
                    if collector.is_full() {
                        break;
                    }
                    let text = text_or_empty(page, option).await;
                    let value = attribute_or_none(page, option, "value")
                        .await
                        .unwrap_or_else(|| text.clone());
                    let available = !is_marked_unavailable(page, option).await;
                    collector.push_marked(text, OptionPayload::Select { select, value }, available);
                }
            }
        }
    }

    tracing::debug!(
        label = %group.label,
        kind = ?group.kind,
        count = collector.options.len(),
        "enumerated options"
    );
    Ok(collector.options)
}

async fn collect_clickable<'p, P: PageSession + ?Sized>(
    page: &'p P,
    nodes: Vec<Node<'p>>,
    collector: &mut OptionCollector<'p>,
) {
    for node in nodes {
        if collector.is_full() {
            break;
        }
        if !visible_or_hidden(page, node).await {
            continue;
        }
        let text = text_or_empty(page, node).await;
        let available = clickable_available(page, node).await;
        collector.push_marked(text, OptionPayload::Click(node), available);
    }
}

/// A tile is unavailable when it or an input inside it carries a marker.
async fn clickable_available<P: PageSession + ?Sized>(page: &P, node: Node<'_>) -> bool {
    if is_marked_unavailable(page, node).await {
        return false;
    }
    let inputs = match page.query_all(Some(node), "input").await {
        Ok(inputs) => inputs,
        Err(e) => {
            tracing::debug!(error = %e, "tile input lookup failed");
            return true;
        }
    };
    for input in inputs {
        if is_marked_unavailable(page, input).await {
            return false;
        }
    }
    true
}

/// Put `option` into effect. Failures are logged and reported as `false`;
/// the caller judges whatever state the page is left in.
pub async fn apply_option<P: PageSession + ?Sized>(
    page: &P,
    option: &VariantOption<'_>,
    settings: &ProbeSettings,
) -> bool {
    let outcome = match &option.payload {
        OptionPayload::Click(node) => page.click(*node, settings.interaction_timeout).await,
        OptionPayload::Select { select, value } => {
            page.select_option(*select, value, settings.interaction_timeout)
                .await
        }
    };
    match outcome {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(option = %option.text, error = %e, "selection had no effect");
            false
        }
    }
}
