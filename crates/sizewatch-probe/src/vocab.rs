//! Storefront vocabulary: captions, selectors and markers the engine looks
//! for. Polish captions come first, English ones are fallbacks.

use std::sync::LazyLock;

use regex::Regex;

/// Consent-banner captions, in click priority order.
pub const CONSENT_CAPTIONS: &[&str] = &[
    "Akceptuj wszystkie",
    "Akceptuj",
    "Zgadzam się",
    "Rozumiem",
    "Accept all",
    "Accept",
];

pub const ADD_TO_CART_CAPTIONS: &[&str] = &["Dodaj do koszyka", "Do koszyka", "Add to cart"];

/// Captions that mean the current variant cannot be bought.
pub const UNAVAILABLE_CAPTIONS: &[&str] = &[
    "Powiadom o dostępności",
    "Powiadom mnie",
    "Powiadom",
    "Niedostępny",
    "Brak w magazynie",
    "Notify me",
    "Out of stock",
    "Sold out",
];

pub const CONSENT_SELECTOR: &str = "button, [role='button'], a.button";
pub const ADD_TO_CART_SELECTOR: &str = "button, [role='button'], input[type='submit']";
pub const UNAVAILABLE_SELECTOR: &str =
    "button, a[role='button'], [class*='notify'], [class*='availability'], [class*='stock']";

/// Plain text elements scanned for stock notes outside any control.
pub const STOCK_NOTE_SELECTOR: &str = "p, span, div, strong, em, small, b, li";

pub const RADIO_GROUP_ELEMENT: &str = "radio-variant-option";
pub const DROPDOWN_GROUP_ELEMENT: &str = "select-variant-option";
pub const GROUP_LABEL_ATTRIBUTE: &str = "validation-name-label";
pub const SIZE_HEADING_SELECTOR: &str = "h2, h3, h4, h5, h6, legend, dt, strong, b, label, span, p";
/// Headings longer than this are section text, not a size caption.
pub const MAX_HEADING_CHARS: usize = 40;

pub const RADIO_OPTION_SELECTOR: &str = "label, button, .radio, .radio_box, .control, .tile";
pub const FALLBACK_OPTION_SELECTOR: &str = "label, button, [class*='radio'], [class*='tile']";

pub const USER_VALUE_ATTRIBUTES: &[&str] = &["user-value", "data-user-value"];
pub const UNAVAILABLE_ATTRIBUTES: &[&str] = &["data-unavailable", "unavailable"];
pub const UNAVAILABLE_CLASS_KEYWORDS: &[&str] =
    &["out-of-stock", "outofstock", "sold", "disabled", "unavailable"];

static SIZE_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:rozmiar|size)\b").expect("valid regex"));

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[\W_]*(?:wybierz|choose|select)\b|^[-\s]*$").expect("valid regex")
});

/// Whether a group caption names the size attribute.
#[must_use]
pub fn mentions_size(label: &str) -> bool {
    SIZE_KEYWORD.is_match(label)
}

/// Generic "choose ..." captions of a select's first option.
#[must_use]
pub fn is_placeholder(text: &str) -> bool {
    PLACEHOLDER.is_match(text.trim())
}

/// Case-insensitive substring match against any caption.
#[must_use]
pub fn contains_caption(text: &str, captions: &[&str]) -> bool {
    let text = text.to_lowercase();
    captions
        .iter()
        .any(|caption| text.contains(&caption.to_lowercase()))
}

/// Marker attributes count as set when present with an empty or `true` value.
#[must_use]
pub fn is_truthy_marker(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        let v = v.trim();
        v.is_empty() || v.eq_ignore_ascii_case("true")
    })
}

#[must_use]
pub fn has_unavailable_class(class: &str) -> bool {
    let class = class.to_ascii_lowercase();
    UNAVAILABLE_CLASS_KEYWORDS
        .iter()
        .any(|keyword| class.contains(keyword))
}

#[cfg(test)]
#[path = "vocab_test.rs"]
mod tests;
