//! The narrow browser capability the engine drives.
//!
//! Element handles are [`Node`]s borrowed from the page that produced them,
//! so a handle can never outlive its page session.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::PageError;
use crate::vocab::contains_caption;

/// Handle to an element of an open page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node<'p> {
    key: usize,
    _page: PhantomData<&'p ()>,
}

impl Node<'_> {
    /// Wrap an adapter-specific element key. Only page adapters should call
    /// this.
    #[must_use]
    pub fn from_key(key: usize) -> Self {
        Self {
            key,
            _page: PhantomData,
        }
    }

    #[must_use]
    pub fn key(self) -> usize {
        self.key
    }
}

/// One open browser tab.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate and wait for the load to finish.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Timeout`] or [`PageError::Navigation`].
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), PageError>;

    /// All elements matching `selector` in document order, page-wide or
    /// among the descendants of `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError`] if the page cannot be queried.
    async fn query_all<'p>(
        &'p self,
        scope: Option<Node<'p>>,
        selector: &str,
    ) -> Result<Vec<Node<'p>>, PageError>;

    /// Up to `limit` elements matching `selector` that come after `anchor` in
    /// document order, excluding the anchor's own descendants.
    ///
    /// # Errors
    ///
    /// Returns [`PageError`] if the page cannot be queried.
    async fn following<'p>(
        &'p self,
        anchor: Node<'p>,
        selector: &str,
        limit: usize,
    ) -> Result<Vec<Node<'p>>, PageError>;

    /// Elements matching `selector` that have no child elements and whose
    /// text contains any of `captions`, case-insensitively, in document
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`PageError`] if the page cannot be queried.
    async fn leaves_containing<'p>(
        &'p self,
        selector: &str,
        captions: &[&str],
    ) -> Result<Vec<Node<'p>>, PageError> {
        let mut found = Vec::new();
        for node in self.query_all(None, selector).await? {
            if !contains_caption(&self.text(node).await?, captions) {
                continue;
            }
            if self.query_all(Some(node), "*").await?.is_empty() {
                found.push(node);
            }
        }
        Ok(found)
    }

    /// # Errors
    ///
    /// Returns [`PageError`] if the element cannot be read.
    async fn attribute(&self, node: Node<'_>, name: &str) -> Result<Option<String>, PageError>;

    /// Rendered text of the element, empty if it has none.
    ///
    /// # Errors
    ///
    /// Returns [`PageError`] if the element cannot be read.
    async fn text(&self, node: Node<'_>) -> Result<String, PageError>;

    /// # Errors
    ///
    /// Returns [`PageError`] if the element cannot be read.
    async fn is_visible(&self, node: Node<'_>) -> Result<bool, PageError>;

    /// # Errors
    ///
    /// Returns [`PageError`] if the click is not delivered within `timeout`.
    async fn click(&self, node: Node<'_>, timeout: Duration) -> Result<(), PageError>;

    /// Choose `value` in a native `select` element and fire its change event.
    ///
    /// # Errors
    ///
    /// Returns [`PageError`] if the selection is not applied within `timeout`.
    async fn select_option(
        &self,
        select: Node<'_>,
        value: &str,
        timeout: Duration,
    ) -> Result<(), PageError>;

    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// Wait until an element matching `selector` exists. Returns `false`
    /// when `timeout` passes first.
    ///
    /// # Errors
    ///
    /// Returns [`PageError`] if the page cannot be queried.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration)
        -> Result<bool, PageError>;

    /// # Errors
    ///
    /// Returns [`PageError`] if the browser refuses to close the tab.
    async fn close(&self) -> Result<(), PageError>;
}

/// Source of fresh pages.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    type Page: PageSession;

    /// # Errors
    ///
    /// Returns [`PageError`] if no tab can be opened.
    async fn open_page(&self) -> Result<Self::Page, PageError>;
}

/// Collapse runs of whitespace into single spaces and trim.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized text of `node`, empty when it cannot be read.
pub(crate) async fn text_or_empty<P: PageSession + ?Sized>(page: &P, node: Node<'_>) -> String {
    match page.text(node).await {
        Ok(text) => normalize_text(&text),
        Err(e) => {
            tracing::debug!(error = %e, "element text unreadable");
            String::new()
        }
    }
}

/// Whether `node` is visible, treating read failures as hidden.
pub(crate) async fn visible_or_hidden<P: PageSession + ?Sized>(page: &P, node: Node<'_>) -> bool {
    page.is_visible(node).await.unwrap_or(false)
}

/// Attribute value, treating read failures as absent.
pub(crate) async fn attribute_or_none<P: PageSession + ?Sized>(
    page: &P,
    node: Node<'_>,
    name: &str,
) -> Option<String> {
    page.attribute(node, name).await.ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_text("  Dodaj\n  do\tkoszyka "), "Dodaj do koszyka");
        assert_eq!(normalize_text("\n\n"), "");
    }

    #[test]
    fn node_round_trips_key() {
        assert_eq!(Node::from_key(7).key(), 7);
    }
}
