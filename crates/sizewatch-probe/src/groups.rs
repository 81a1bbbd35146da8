//! Locating variant-selection widgets and picking out the size group.

use crate::error::PageError;
use crate::page::{attribute_or_none, text_or_empty, visible_or_hidden, Node, PageSession};
use crate::vocab::{
    mentions_size, DROPDOWN_GROUP_ELEMENT, GROUP_LABEL_ATTRIBUTE, MAX_HEADING_CHARS,
    RADIO_GROUP_ELEMENT, SIZE_HEADING_SELECTOR,
};

/// Widget pattern of a variant group. The kind alone decides how options are
/// read and selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// `radio-variant-option`: inputs or tiles inside the element.
    RadioTile,
    /// `select-variant-option`: a native `select` inside the element.
    Dropdown,
    /// A size heading followed by loosely structured clickable options.
    FallbackHeading,
}

/// A located attribute-selection widget. `root` is only valid while the page
/// it came from stays open.
#[derive(Debug, Clone)]
pub struct VariantGroup<'p> {
    pub kind: GroupKind,
    pub root: Node<'p>,
    pub label: String,
}

impl VariantGroup<'_> {
    #[must_use]
    pub fn is_size_group(&self) -> bool {
        mentions_size(&self.label)
    }
}

/// The size group and the other attribute groups of one page.
#[derive(Debug, Clone)]
pub struct ClassifiedGroups<'p> {
    pub size: VariantGroup<'p>,
    pub others: Vec<VariantGroup<'p>>,
}

/// Find every variant group: radio tiles, then dropdowns, then (only when
/// neither custom element is present) a fallback group anchored on the
/// first visible size heading.
///
/// # Errors
///
/// Returns [`PageError`] if the page cannot be queried.
pub async fn locate_groups<'p, P: PageSession + ?Sized>(
    page: &'p P,
) -> Result<Vec<VariantGroup<'p>>, PageError> {
    let mut groups = Vec::new();

    for (element, kind) in [
        (RADIO_GROUP_ELEMENT, GroupKind::RadioTile),
        (DROPDOWN_GROUP_ELEMENT, GroupKind::Dropdown),
    ] {
        for root in page.query_all(None, element).await? {
            let label = match attribute_or_none(page, root, GROUP_LABEL_ATTRIBUTE).await {
                Some(label) if !label.trim().is_empty() => label.trim().to_string(),
                _ => text_or_empty(page, root).await,
            };
            groups.push(VariantGroup { kind, root, label });
        }
    }

    if groups.is_empty() {
        if let Some(heading) = find_size_heading(page).await? {
            groups.push(heading);
        }
    }

    tracing::debug!(count = groups.len(), "located variant groups");
    Ok(groups)
}

async fn find_size_heading<'p, P: PageSession + ?Sized>(
    page: &'p P,
) -> Result<Option<VariantGroup<'p>>, PageError> {
    for node in page.query_all(None, SIZE_HEADING_SELECTOR).await? {
        let text = text_or_empty(page, node).await;
        if text.chars().count() > MAX_HEADING_CHARS || !mentions_size(&text) {
            continue;
        }
        if visible_or_hidden(page, node).await {
            return Ok(Some(VariantGroup {
                kind: GroupKind::FallbackHeading,
                root: node,
                label: text,
            }));
        }
    }
    Ok(None)
}

/// Split groups into the first size group and the other attribute groups.
/// Size groups after the first are dropped. Returns `None` when no group is
/// labelled as size.
#[must_use]
pub fn classify(groups: Vec<VariantGroup<'_>>) -> Option<ClassifiedGroups<'_>> {
    let mut size = None;
    let mut others = Vec::new();
    for group in groups {
        if group.is_size_group() {
            if size.is_none() {
                size = Some(group);
            }
        } else {
            others.push(group);
        }
    }
    size.map(|size| ClassifiedGroups { size, others })
}
