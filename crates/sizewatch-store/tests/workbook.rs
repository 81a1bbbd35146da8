use std::fs;

use chrono::NaiveDate;
use sizewatch_core::daily::{daily_row, DAILY_HEADERS, DAILY_SHEET};
use sizewatch_core::product_list::{
    backfill_product_id, read_product_list, ProductListLayout, PRODUCTS_HEADERS, PRODUCTS_SHEET,
};
use sizewatch_core::{ProductProbeResult, SizeTally, Workbook, Worksheet};
use sizewatch_store::CsvWorkbook;

#[test]
fn new_worksheet_starts_with_header_row() {
    let tmp = tempfile::tempdir().unwrap();
    let book = CsvWorkbook::open(tmp.path()).unwrap();
    let sheet = book.worksheet(DAILY_SHEET, &DAILY_HEADERS).unwrap();

    let rows = sheet.rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0], DAILY_HEADERS);
    assert!(tmp.path().join("Daily.csv").is_file());
}

#[test]
fn empty_existing_file_gets_header_row() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("Products.csv"), "").unwrap();
    let book = CsvWorkbook::open(tmp.path()).unwrap();
    let sheet = book.worksheet(PRODUCTS_SHEET, &PRODUCTS_HEADERS).unwrap();
    assert_eq!(sheet.rows().unwrap(), vec![vec!["product_id", "url"]]);
}

#[test]
fn reopening_does_not_duplicate_header() {
    let tmp = tempfile::tempdir().unwrap();
    let book = CsvWorkbook::open(tmp.path()).unwrap();
    book.worksheet(DAILY_SHEET, &DAILY_HEADERS).unwrap();
    let sheet = book.worksheet(DAILY_SHEET, &DAILY_HEADERS).unwrap();
    assert_eq!(sheet.rows().unwrap().len(), 1);
}

#[test]
fn daily_rows_round_trip_through_csv_quoting() {
    let tmp = tempfile::tempdir().unwrap();
    let book = CsvWorkbook::open(tmp.path()).unwrap();
    let mut sheet = book.worksheet(DAILY_SHEET, &DAILY_HEADERS).unwrap();

    let mut tally = SizeTally::new();
    tally.record("S", true);
    tally.record("M", true);
    let result = ProductProbeResult::ok(
        "12345".into(),
        "https://shop.example/pl/p/shoe/12345",
        "Shoe, \"classic\"".into(),
        tally,
    );
    let row = daily_row(&result, NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
    sheet.append_row(&row).unwrap();

    let rows = sheet.rows().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1], row);
    assert_eq!(rows[1][3], "Shoe, \"classic\"");
    assert_eq!(rows[1][5], "S, M");
}

#[test]
fn backfill_rewrites_only_the_identifier_cell() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(
        tmp.path().join("Products.csv"),
        "product_id,url\n,https://shop.example/pl/p/shoe/12345\n7,https://shop.example/other\n",
    )
    .unwrap();
    let book = CsvWorkbook::open(tmp.path()).unwrap();
    let mut sheet = book.worksheet(PRODUCTS_SHEET, &PRODUCTS_HEADERS).unwrap();

    let list = read_product_list(&sheet).unwrap();
    assert_eq!(list.layout, ProductListLayout::IdAndUrl);
    assert_eq!(list.entries.len(), 2);

    let written = backfill_product_id(
        &mut sheet,
        list.layout,
        "https://shop.example/pl/p/shoe/12345",
        "12345",
    )
    .unwrap();
    assert!(written);

    let reopened = book.worksheet(PRODUCTS_SHEET, &PRODUCTS_HEADERS).unwrap();
    let rows = reopened.rows().unwrap();
    assert_eq!(rows[1], vec!["12345", "https://shop.example/pl/p/shoe/12345"]);
    assert_eq!(rows[2], vec!["7", "https://shop.example/other"]);
    assert!(!tmp.path().join("Products.csv.tmp").exists());
}

#[test]
fn url_only_list_is_read_from_first_column() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(
        tmp.path().join("Products.csv"),
        "url\nhttps://a.example/1\n\nhttps://a.example/2\n",
    )
    .unwrap();
    let book = CsvWorkbook::open(tmp.path()).unwrap();
    let sheet = book.worksheet(PRODUCTS_SHEET, &PRODUCTS_HEADERS).unwrap();
    let list = read_product_list(&sheet).unwrap();
    assert_eq!(list.layout, ProductListLayout::UrlOnly);
    let urls: Vec<_> = list.entries.iter().map(|e| e.url.as_str()).collect();
    assert_eq!(urls, vec!["https://a.example/1", "https://a.example/2"]);
}
