use super::*;
use crate::sheet::MemoryWorksheet;

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| (*c).to_string()).collect()
}

fn sheet(rows: &[&[&str]]) -> MemoryWorksheet {
    MemoryWorksheet::from_rows(PRODUCTS_SHEET, rows.iter().map(|r| row(r)).collect())
}

#[test]
fn detects_identifier_layout_case_insensitively() {
    assert_eq!(
        ProductListLayout::detect(&row(&["Product_ID", "URL"])),
        ProductListLayout::IdAndUrl
    );
    assert_eq!(
        ProductListLayout::detect(&row(&["id", "url_produktu"])),
        ProductListLayout::IdAndUrl
    );
}

#[test]
fn falls_back_to_url_only_layout() {
    assert_eq!(ProductListLayout::detect(&row(&["url"])), ProductListLayout::UrlOnly);
    assert_eq!(
        ProductListLayout::detect(&row(&["sku", "url"])),
        ProductListLayout::UrlOnly
    );
    assert_eq!(
        ProductListLayout::detect(&row(&["id", "link"])),
        ProductListLayout::UrlOnly
    );
    assert_eq!(ProductListLayout::detect(&[]), ProductListLayout::UrlOnly);
}

#[test]
fn reads_urls_from_second_column_with_identifiers() {
    let sheet = sheet(&[
        &["product_id", "url"],
        &["", "https://shop.example/pl/p/shoe/12345"],
        &["77", "http://shop.example/item"],
        &["88", "not a url"],
    ]);
    let list = read_product_list(&sheet).unwrap();
    assert_eq!(list.layout, ProductListLayout::IdAndUrl);
    assert_eq!(
        list.entries,
        vec![
            ProductEntry {
                row: 1,
                product_id: String::new(),
                url: "https://shop.example/pl/p/shoe/12345".to_string(),
            },
            ProductEntry {
                row: 2,
                product_id: "77".to_string(),
                url: "http://shop.example/item".to_string(),
            },
        ]
    );
}

#[test]
fn reads_urls_from_first_column_without_identifiers() {
    let sheet = sheet(&[&["url"], &["https://a.example/1"], &[""], &["ftp://x"]]);
    let list = read_product_list(&sheet).unwrap();
    assert_eq!(list.layout, ProductListLayout::UrlOnly);
    assert_eq!(list.entries.len(), 1);
    assert_eq!(list.entries[0].url, "https://a.example/1");
    assert!(list.entries[0].product_id.is_empty());
}

#[test]
fn backfills_empty_identifier_cell() {
    let mut sheet = sheet(&[
        &["product_id", "url"],
        &["", "https://shop.example/pl/p/shoe/12345"],
    ]);
    let written = backfill_product_id(
        &mut sheet,
        ProductListLayout::IdAndUrl,
        "https://shop.example/pl/p/shoe/12345",
        "12345",
    )
    .unwrap();
    assert!(written);
    assert_eq!(sheet.rows().unwrap()[1][0], "12345");
}

#[test]
fn backfill_never_overwrites() {
    let mut sheet = sheet(&[&["product_id", "url"], &["999", "https://a.example/1"]]);
    let written =
        backfill_product_id(&mut sheet, ProductListLayout::IdAndUrl, "https://a.example/1", "1")
            .unwrap();
    assert!(!written);
    assert_eq!(sheet.rows().unwrap()[1][0], "999");
}

#[test]
fn backfill_is_noop_without_identifier_column() {
    let mut sheet = sheet(&[&["url"], &["https://a.example/1"]]);
    let written =
        backfill_product_id(&mut sheet, ProductListLayout::UrlOnly, "https://a.example/1", "1")
            .unwrap();
    assert!(!written);
    assert_eq!(sheet.rows().unwrap()[1], vec!["https://a.example/1"]);
}

#[test]
fn backfill_skips_blank_identifier_and_unknown_url() {
    let mut sheet = sheet(&[&["id", "url"], &["", "https://a.example/1"]]);
    assert!(!backfill_product_id(&mut sheet, ProductListLayout::IdAndUrl, "https://a.example/1", " ")
        .unwrap());
    assert!(!backfill_product_id(&mut sheet, ProductListLayout::IdAndUrl, "https://b.example/2", "5")
        .unwrap());
    assert_eq!(sheet.rows().unwrap()[1][0], "");
}
