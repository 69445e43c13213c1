//! Book records and the composite rating used to rank them
//!
//! The composite score blends the raw average rating with a saturating
//! function of the number of ratings, so a 9.5 from six readers does not
//! outrank an 8.9 from several thousand.

use std::cmp::Ordering;

/// Lower and upper clamp for the rating count fed into the people weight
const MIN_PEOPLE: u32 = 5;
const MAX_PEOPLE: u32 = 5000;

/// Exponent applied to the clamped rating count
const PEOPLE_EXPONENT: f64 = 0.25;

/// `(upper bound, rating weight, people weight)`, first match wins
const WEIGHT_BUCKETS: [(u32, f64, f64); 5] = [
    (50, 40.0, 60.0),
    (100, 50.0, 50.0),
    (200, 60.0, 40.0),
    (400, 70.0, 30.0),
    (800, 80.0, 20.0),
];

/// Weights used once the rating count reaches the last bucket bound
const SATURATED_WEIGHTS: (f64, f64) = (90.0, 10.0);

/// Computes the composite score for a rating and its rating count
///
/// The blend weights are chosen from the raw `rating_count`, while the
/// people weight uses the count clamped to `[5, 5000]`.
///
/// # Example
///
/// ```
/// use bookrank::composite_score;
///
/// // Below 50 ratings the people weight dominates
/// let sparse = composite_score(9.0, 10);
/// let popular = composite_score(9.0, 10_000);
/// assert!(popular > sparse);
/// ```
pub fn composite_score(rating: f64, rating_count: u32) -> f64 {
    let people = rating_count.clamp(MIN_PEOPLE, MAX_PEOPLE);
    let people_weight = f64::from(people).powf(PEOPLE_EXPONENT);

    let (rating_weight, count_weight) = WEIGHT_BUCKETS
        .iter()
        .find(|(bound, _, _)| rating_count < *bound)
        .map(|&(_, wr, wp)| (wr, wp))
        .unwrap_or(SATURATED_WEIGHTS);

    (rating * rating_weight + people_weight * count_weight) / 100.0
}

/// Raw fields extracted from one listing entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFields {
    pub name: String,
    pub detail_url: String,
    pub cover_url: String,
    pub rating: f64,
    pub rating_count: u32,
    pub synopsis: String,
}

/// A book scraped from a listing page
///
/// Records are immutable; the composite score is computed once in
/// [`BookRecord::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecord {
    fields: BookFields,
    composite_score: f64,
}

impl BookRecord {
    /// Creates a record and computes its composite score
    pub fn new(fields: BookFields) -> Self {
        let composite_score = composite_score(fields.rating, fields.rating_count);
        Self {
            fields,
            composite_score,
        }
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn detail_url(&self) -> &str {
        &self.fields.detail_url
    }

    pub fn cover_url(&self) -> &str {
        &self.fields.cover_url
    }

    pub fn rating(&self) -> f64 {
        self.fields.rating
    }

    pub fn rating_count(&self) -> u32 {
        self.fields.rating_count
    }

    pub fn synopsis(&self) -> &str {
        &self.fields.synopsis
    }

    pub fn composite_score(&self) -> f64 {
        self.composite_score
    }
}

impl From<BookFields> for BookRecord {
    fn from(fields: BookFields) -> Self {
        Self::new(fields)
    }
}

/// Report ordering: composite score descending
///
/// Ties fall back to the larger rating count, then name and detail URL
/// ascending, so the order does not depend on which page arrived first.
pub fn report_order(a: &BookRecord, b: &BookRecord) -> Ordering {
    b.composite_score
        .total_cmp(&a.composite_score)
        .then_with(|| b.rating_count().cmp(&a.rating_count()))
        .then_with(|| a.name().cmp(b.name()))
        .then_with(|| a.detail_url().cmp(b.detail_url()))
}

/// Sorts books into report order
pub fn sort_books(books: &mut [BookRecord]) {
    books.sort_by(report_order);
}
