//! Reading the `Products` worksheet and back-filling resolved identifiers.

use std::fmt;

use crate::sheet::{StoreError, Worksheet};

pub const PRODUCTS_SHEET: &str = "Products";
pub const PRODUCTS_HEADERS: [&str; 2] = ["product_id", "url"];

/// Column layout of the product list, detected from its header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductListLayout {
    /// `[identifier, url]`: URLs in the second column, identifiers in the first.
    IdAndUrl,
    /// `[url]`: URLs in the first column, no identifier column.
    UrlOnly,
}

impl ProductListLayout {
    /// Detect the layout from a header row. The identifier layout requires
    /// an identifier-style first header (`product_id` or `id`) followed by a
    /// header starting with `url`, both case-insensitive.
    #[must_use]
    pub fn detect(header: &[String]) -> Self {
        let first = header.first().map(|h| h.trim().to_ascii_lowercase());
        let second = header.get(1).map(|h| h.trim().to_ascii_lowercase());
        match (first.as_deref(), second.as_deref()) {
            (Some("product_id" | "id"), Some(url)) if url.starts_with("url") => Self::IdAndUrl,
            _ => Self::UrlOnly,
        }
    }

    #[must_use]
    pub fn url_column(self) -> usize {
        match self {
            Self::IdAndUrl => 1,
            Self::UrlOnly => 0,
        }
    }

    #[must_use]
    pub fn id_column(self) -> Option<usize> {
        match self {
            Self::IdAndUrl => Some(0),
            Self::UrlOnly => None,
        }
    }
}

impl fmt::Display for ProductListLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdAndUrl => write!(f, "[product_id, url]"),
            Self::UrlOnly => write!(f, "[url]"),
        }
    }
}

/// One product URL to probe, with its position in the worksheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductEntry {
    /// Zero-based row index in the worksheet, header included.
    pub row: usize,
    /// Identifier already present in the sheet, empty if none.
    pub product_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductList {
    pub layout: ProductListLayout,
    pub entries: Vec<ProductEntry>,
}

fn is_http_url(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map_or("", |c| c.trim())
}

/// Read the product list in sheet order. Rows whose URL cell is not an
/// HTTP(S) URL are skipped.
///
/// # Errors
///
/// Returns [`StoreError`] if the worksheet cannot be read.
pub fn read_product_list<S: Worksheet + ?Sized>(sheet: &S) -> Result<ProductList, StoreError> {
    let rows = sheet.rows()?;
    let layout = rows
        .first()
        .map_or(ProductListLayout::UrlOnly, |header| ProductListLayout::detect(header));

    let entries = rows
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(row, cells)| {
            let url = cell(cells, layout.url_column());
            if !is_http_url(url) {
                return None;
            }
            let product_id = layout
                .id_column()
                .map_or(String::new(), |col| cell(cells, col).to_string());
            Some(ProductEntry {
                row,
                product_id,
                url: url.to_string(),
            })
        })
        .collect();

    Ok(ProductList { layout, entries })
}

/// Write `product_id` into the identifier cell of the row holding `url`, but
/// only when the layout has an identifier column and that cell is currently
/// empty. Returns whether a cell was written.
///
/// # Errors
///
/// Returns [`StoreError`] if the worksheet cannot be read or updated.
pub fn backfill_product_id<S: Worksheet + ?Sized>(
    sheet: &mut S,
    layout: ProductListLayout,
    url: &str,
    product_id: &str,
) -> Result<bool, StoreError> {
    let Some(id_col) = layout.id_column() else {
        return Ok(false);
    };
    if product_id.trim().is_empty() {
        return Ok(false);
    }

    let rows = sheet.rows()?;
    let target = rows
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, cells)| cell(cells, layout.url_column()) == url.trim());

    match target {
        Some((row, cells)) if cell(cells, id_col).is_empty() => {
            sheet.update_cell(row, id_col, product_id.trim())?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

#[cfg(test)]
#[path = "product_list_test.rs"]
mod tests;
