//! Pagination planner
//!
//! Reads the paginator of the first listing page and produces the tasks for
//! every further page of the listing.

use crate::crawler::parser::selector;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static PAGINATOR_LINK: LazyLock<Selector> = LazyLock::new(|| selector("div.paginator > a"));

/// Upper bound on planned pages; a paginator implying more is malformed
pub const MAX_PLANNED_PAGES: usize = 1000;

static START_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"start=(\d+).*&type=").expect("start offset regex is valid"));

/// One listing page to fetch and parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTask {
    /// Dispatch position, used for logging only
    pub ordinal: usize,

    /// Value of the `start` query parameter
    pub offset: u32,

    /// Absolute URL of the page
    pub url: String,
}

impl PageTask {
    /// Task for the listing page at `offset`
    pub fn new(ordinal: usize, listing_url: &str, offset: u32) -> Self {
        Self {
            ordinal,
            offset,
            url: format!("{}?start={}&type=T", listing_url, offset),
        }
    }
}

/// Plans the remaining pages of a listing from its first page
///
/// The smallest positive `start` offset among the paginator links is the page
/// size and the largest is the last page; tasks cover every multiple of the
/// page size up to and including the last page. Offset 0 is the first page
/// itself and is never scheduled.
///
/// Returns an empty plan when the page has no paginator or no usable links.
/// At most [`MAX_PLANNED_PAGES`] tasks are planned.
///
/// # Example
///
/// ```
/// use bookrank::crawler::plan_pages;
///
/// let html = r#"<div class="paginator">
///   <a href="/tag/x?start=20&type=T">2</a>
///   <a href="/tag/x?start=60&type=T">4</a>
/// </div>"#;
/// let offsets: Vec<u32> = plan_pages(html, "https://example.com/tag/x")
///     .iter()
///     .map(|task| task.offset)
///     .collect();
/// assert_eq!(offsets, vec![20, 40, 60]);
/// ```
pub fn plan_pages(first_page_html: &str, listing_url: &str) -> Vec<PageTask> {
    let offsets = paginator_offsets(first_page_html);

    let Some(step) = offsets.iter().copied().filter(|&o| o > 0).min() else {
        tracing::debug!("No pagination found on {}", listing_url);
        return Vec::new();
    };
    let last = offsets.iter().copied().max().unwrap_or(step);

    let pages = (last / step) as usize;
    if pages > MAX_PLANNED_PAGES {
        tracing::warn!(
            "Paginator on {} implies {} pages (step {}, last {}); planning only the first {}",
            listing_url,
            pages,
            step,
            last,
            MAX_PLANNED_PAGES
        );
    }

    (step..=last)
        .step_by(step as usize)
        .take(MAX_PLANNED_PAGES)
        .enumerate()
        .map(|(i, offset)| PageTask::new(i + 1, listing_url, offset))
        .collect()
}

/// All `start` offsets linked from the paginator
fn paginator_offsets(html: &str) -> Vec<u32> {
    let document = Html::parse_document(html);
    document
        .select(&PAGINATOR_LINK)
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| START_OFFSET.captures(href))
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "https://book.example.com/tag/fiction";

    fn paginator(offsets: &[u32]) -> String {
        let links: String = offsets
            .iter()
            .map(|o| format!(r#"<a href="/tag/fiction?start={o}&amp;type=T">{o}</a>"#))
            .collect();
        format!(
            r#"<html><body><div class="paginator">
                <span class="prev">&lt;前页</span>
                <span class="thispage">1</span>
                {links}
                <span class="next"><link rel="next" href="/tag/fiction?start=20&amp;type=T"/></span>
            </div></body></html>"#
        )
    }

    fn offsets(tasks: &[PageTask]) -> Vec<u32> {
        tasks.iter().map(|t| t.offset).collect()
    }

    #[test]
    fn test_plan_skips_first_page_offset() {
        let tasks = plan_pages(&paginator(&[0, 20, 40, 60]), LISTING);
        assert_eq!(offsets(&tasks), vec![20, 40, 60]);
    }

    #[test]
    fn test_plan_fills_gaps_up_to_last() {
        // Paginators elide middle pages: 1 2 3 ... 49 50
        let tasks = plan_pages(&paginator(&[20, 40, 960, 980]), LISTING);
        assert_eq!(tasks.len(), 49);
        assert_eq!(tasks.first().map(|t| t.offset), Some(20));
        assert_eq!(tasks.last().map(|t| t.offset), Some(980));
    }

    #[test]
    fn test_task_urls_and_ordinals() {
        let tasks = plan_pages(&paginator(&[20, 40]), LISTING);
        assert_eq!(
            tasks,
            vec![
                PageTask {
                    ordinal: 1,
                    offset: 20,
                    url: format!("{LISTING}?start=20&type=T"),
                },
                PageTask {
                    ordinal: 2,
                    offset: 40,
                    url: format!("{LISTING}?start=40&type=T"),
                },
            ]
        );
    }

    #[test]
    fn test_no_paginator() {
        let html = r#"<html><body><a href="/tag/fiction?start=20&type=T">x</a></body></html>"#;
        assert!(plan_pages(html, LISTING).is_empty());
    }

    #[test]
    fn test_paginator_without_matching_links() {
        let html = r#"<div class="paginator"><a href="/tag/fiction">1</a><a href="?start=20">2</a></div>"#;
        assert!(plan_pages(html, LISTING).is_empty());
    }

    #[test]
    fn test_zero_step_is_guarded() {
        assert!(plan_pages(&paginator(&[0]), LISTING).is_empty());
    }

    #[test]
    fn test_implausible_paginator_is_capped() {
        let tasks = plan_pages(&paginator(&[1, 3_000_000]), LISTING);
        assert_eq!(tasks.len(), MAX_PLANNED_PAGES);
        assert_eq!(offsets(&tasks)[..3], [1, 2, 3]);
    }

    #[test]
    fn test_single_next_page() {
        let tasks = plan_pages(&paginator(&[20]), LISTING);
        assert_eq!(offsets(&tasks), vec![20]);
    }
}
