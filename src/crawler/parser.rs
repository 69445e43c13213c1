//! Listing page parser
//!
//! Extracts one [`BookRecord`] per catalog entry (`li.subject-item`) of a
//! listing page. Every field is best-effort: a missing or malformed element
//! leaves that field at its zero value and parsing carries on.

use crate::rating::{BookFields, BookRecord};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static ITEM: LazyLock<Selector> = LazyLock::new(|| selector("li.subject-item"));
static HEADING: LazyLock<Selector> = LazyLock::new(|| selector("h2"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a"));
static SUBTITLE: LazyLock<Selector> = LazyLock::new(|| selector("span"));
static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| selector("p"));
static PICTURE: LazyLock<Selector> = LazyLock::new(|| selector("div.pic"));
static IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static RATING: LazyLock<Selector> = LazyLock::new(|| selector("span.rating_nums"));
static RATING_PEOPLE: LazyLock<Selector> = LazyLock::new(|| selector("span.pl"));

/// "(1234人评价)" and the like; the capture may be empty, e.g. "(少于10人评价)"
static RATING_COUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([0-9]*).*\)").expect("rating count regex is valid"));

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Parses a listing page and returns the books on it
///
/// # Example
///
/// ```
/// use bookrank::crawler::parse_books;
///
/// let html = r#"<ul><li class="subject-item">
///   <h2><a href="https://example.com/1" title="Dune"></a></h2>
///   <span class="rating_nums">8.9</span><span class="pl">(1200人评价)</span>
/// </li></ul>"#;
/// let books = parse_books(html);
/// assert_eq!(books[0].name(), "Dune");
/// assert_eq!(books[0].rating_count(), 1200);
/// ```
pub fn parse_books(html: &str) -> Vec<BookRecord> {
    let document = Html::parse_document(html);
    document
        .select(&ITEM)
        .map(|item| extract_fields(item).into())
        .collect()
}

/// Extracts the raw fields of one catalog entry
fn extract_fields(item: ElementRef<'_>) -> BookFields {
    let (detail_url, cover_url) = extract_picture(item);
    BookFields {
        name: extract_name(item),
        detail_url,
        cover_url,
        rating: extract_rating(item),
        rating_count: extract_rating_count(item),
        synopsis: first_text(item, &PARAGRAPH).unwrap_or_default(),
    }
}

/// Title attribute of the heading link plus its sub-title span, if any
fn extract_name(item: ElementRef<'_>) -> String {
    let Some(link) = item
        .select(&HEADING)
        .next()
        .and_then(|heading| heading.select(&LINK).next())
    else {
        return String::new();
    };

    let mut name = link
        .value()
        .attr("title")
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    if let Some(subtitle) = first_text(link, &SUBTITLE) {
        name.push_str(&subtitle);
    }

    name
}

/// Detail link and cover image from the picture block
fn extract_picture(item: ElementRef<'_>) -> (String, String) {
    let Some(picture) = item.select(&PICTURE).next() else {
        return (String::new(), String::new());
    };

    let attr = |sel: &Selector, name: &str| {
        picture
            .select(sel)
            .next()
            .and_then(|el| el.value().attr(name))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    (attr(&LINK, "href"), attr(&IMAGE, "src"))
}

fn extract_rating(item: ElementRef<'_>) -> f64 {
    first_text(item, &RATING)
        .and_then(|text| text.parse::<f64>().ok())
        .filter(|rating| rating.is_finite())
        .unwrap_or(0.0)
}

fn extract_rating_count(item: ElementRef<'_>) -> u32 {
    first_text(item, &RATING_PEOPLE)
        .and_then(|text| parse_rating_count(&text))
        .unwrap_or(0)
}

/// Pulls the count out of a rating-people label
///
/// The capture is all ASCII digits, so the only parse failure is overflow;
/// such counts saturate at `u32::MAX`.
pub(crate) fn parse_rating_count(text: &str) -> Option<u32> {
    RATING_COUNT_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|digits| !digits.is_empty())
        .map(|digits| digits.parse().unwrap_or(u32::MAX))
}

/// Trimmed text of the first match, `None` when absent or blank
fn first_text(scope: ElementRef<'_>, sel: &Selector) -> Option<String> {
    scope
        .select(sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}
