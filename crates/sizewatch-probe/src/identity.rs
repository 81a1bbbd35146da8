//! Product identifier and name resolution.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::page::{attribute_or_none, text_or_empty, PageSession};

static PRODUCT_URL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/p/[^/]+/(\d+)").expect("valid regex"));

/// Linked-data blocks inspected before giving up.
const MAX_LINKED_DATA_SCRIPTS: usize = 6;
const LINKED_DATA_KEYS: &[&str] = &["productID", "@id", "id", "sku", "mpn"];

const PRODUCT_NAME_SELECTORS: &[&str] = &["h1.product__title", "h1", "header h1", "title"];

/// Where an identifier may be found, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdSource {
    /// `/p/<slug>/<digits>` in the URL path.
    UrlPath,
    /// `product-id` attribute, on the `product-codes` element first.
    ProductIdAttribute,
    /// Hidden `id` / `product_id` field of a cart or basket form.
    CartFormField,
    DataProductId,
    LinkedData,
}

const ID_CASCADE: [IdSource; 5] = [
    IdSource::UrlPath,
    IdSource::ProductIdAttribute,
    IdSource::CartFormField,
    IdSource::DataProductId,
    IdSource::LinkedData,
];

const PRODUCT_ID_ATTRIBUTE_SELECTORS: &[&str] = &["product-codes[product-id]", "[product-id]"];
const CART_FORM_FIELD_SELECTORS: &[&str] = &[
    "form[action*='cart'] input[name='id']",
    "form[action*='basket'] input[name='id']",
    "form[action*='cart'] input[name='product_id']",
    "form[action*='basket'] input[name='product_id']",
];

fn is_numeric_id(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Numeric identifier from a `/p/<slug>/<digits>` URL.
#[must_use]
pub fn product_id_from_url(url: &str) -> Option<String> {
    PRODUCT_URL_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// First numeric identifier in one linked-data block. Top-level objects,
/// arrays and `@graph` containers are searched in that order.
#[must_use]
pub fn product_id_from_linked_data(json: &str) -> Option<String> {
    let value: Value = serde_json::from_str(json).ok()?;

    let mut candidates: Vec<&Value> = match &value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    let graph: Vec<&Value> = candidates
        .iter()
        .copied()
        .filter_map(|item| item.get("@graph").and_then(Value::as_array))
        .flatten()
        .collect();
    candidates.extend(graph);

    candidates
        .into_iter()
        .filter(|item| item.is_object())
        .find_map(|item| {
            LINKED_DATA_KEYS.iter().find_map(|key| match item.get(*key)? {
                Value::String(s) if is_numeric_id(s.trim()) => Some(s.trim().to_string()),
                Value::Number(n) if n.is_u64() => Some(n.to_string()),
                _ => None,
            })
        })
}

/// Resolve the product identifier, or an empty string when every source
/// misses.
pub async fn extract_product_id<P: PageSession + ?Sized>(page: &P, url: &str) -> String {
    for source in ID_CASCADE {
        if let Some(id) = try_source(page, url, source).await {
            tracing::debug!(?source, product_id = %id, "resolved product id");
            return id;
        }
    }
    tracing::debug!(url, "no product id found");
    String::new()
}

async fn try_source<P: PageSession + ?Sized>(page: &P, url: &str, source: IdSource) -> Option<String> {
    match source {
        IdSource::UrlPath => product_id_from_url(url),
        IdSource::ProductIdAttribute => {
            first_numeric_attribute(page, PRODUCT_ID_ATTRIBUTE_SELECTORS, "product-id").await
        }
        IdSource::CartFormField => {
            first_numeric_attribute(page, CART_FORM_FIELD_SELECTORS, "value").await
        }
        IdSource::DataProductId => {
            first_numeric_attribute(page, &["[data-product-id]"], "data-product-id").await
        }
        IdSource::LinkedData => {
            let scripts = page
                .query_all(None, "script[type='application/ld+json']")
                .await
                .ok()?;
            for script in scripts.into_iter().take(MAX_LINKED_DATA_SCRIPTS) {
                let Ok(json) = page.text(script).await else {
                    continue;
                };
                if let Some(id) = product_id_from_linked_data(&json) {
                    return Some(id);
                }
            }
            None
        }
    }
}

async fn first_numeric_attribute<P: PageSession + ?Sized>(
    page: &P,
    selectors: &[&str],
    attribute: &str,
) -> Option<String> {
    for selector in selectors {
        let Ok(nodes) = page.query_all(None, selector).await else {
            continue;
        };
        for node in nodes {
            if let Some(value) = attribute_or_none(page, node, attribute).await {
                let value = value.trim();
                if is_numeric_id(value) {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Best-effort product title, empty when nothing matches.
pub async fn extract_product_name<P: PageSession + ?Sized>(page: &P) -> String {
    for selector in PRODUCT_NAME_SELECTORS {
        let Ok(nodes) = page.query_all(None, selector).await else {
            continue;
        };
        if let Some(&node) = nodes.first() {
            let text = text_or_empty(page, node).await;
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
