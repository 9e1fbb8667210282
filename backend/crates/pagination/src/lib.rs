//! Page-based pagination primitives shared by backend endpoints.
//!
//! Provides validated [`PageNumber`] and [`PageSize`] newtypes, the
//! [`paginate`] slicing helper, a serialisable [`PageEnvelope`] response
//! wrapper, an opaque base64 [`Cursor`] token, and [`PageLinks`] for
//! rendering `next`/`prev` URLs.
//!
//! Pages are 1-indexed. Requesting a page past the end of the collection
//! yields an empty page, never an error; clients can probe freely.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use url::Url;

/// Errors raised by pagination constructors and cursor decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// Page numbers are 1-indexed; zero is not addressable.
    #[error("page number must be at least 1")]
    ZeroPage,
    /// A page must hold at least one item.
    #[error("page size must be at least 1")]
    ZeroPageSize,
    /// The cursor token could not be decoded.
    #[error("invalid pagination cursor: {message}")]
    InvalidCursor {
        /// Decoder failure detail, safe to show to callers.
        message: String,
    },
}

/// 1-indexed page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageNumber(u32);

impl PageNumber {
    /// The first page.
    pub const FIRST: Self = Self(1);

    /// Validate and construct a page number.
    ///
    /// # Errors
    /// Returns [`PaginationError::ZeroPage`] for zero.
    pub const fn new(page: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::ZeroPage);
        }
        Ok(Self(page))
    }

    /// Raw page number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

/// Positive number of items per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageSize(u32);

impl PageSize {
    /// Validate and construct a page size.
    ///
    /// # Errors
    /// Returns [`PaginationError::ZeroPageSize`] for zero.
    pub const fn new(size: u32) -> Result<Self, PaginationError> {
        if size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        Ok(Self(size))
    }

    /// Raw page size.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Select the requested page from an ordered slice.
///
/// Slicing past the end returns an empty vector.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page_size: PageSize, page: PageNumber) -> Vec<T> {
    let start = u64::from(page.get() - 1) * u64::from(page_size.get());
    let start = usize::try_from(start).unwrap_or(usize::MAX);
    let take = usize::try_from(page_size.get()).unwrap_or(usize::MAX);
    items.iter().skip(start).take(take).cloned().collect()
}

/// Serialisable wrapper carrying one page plus positioning metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    /// Items on this page, in ranking order.
    pub items: Vec<T>,
    /// 1-indexed page number that was requested.
    pub page: u32,
    /// Page size used for slicing.
    pub page_size: u32,
    /// Total items across all pages.
    pub total_items: u64,
    /// Total number of non-empty pages.
    pub total_pages: u64,
}

impl<T> PageEnvelope<T> {
    /// Build an envelope for `items` cut from a collection of
    /// `total_items` entries.
    #[must_use]
    pub fn new(items: Vec<T>, page: PageNumber, page_size: PageSize, total_items: u64) -> Self {
        let size = u64::from(page_size.get());
        let total_pages =
            total_items.div_euclid(size) + u64::from(total_items.rem_euclid(size) != 0);
        Self {
            items,
            page: page.get(),
            page_size: page_size.get(),
            total_items,
            total_pages,
        }
    }

    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        (self.page as u64) < self.total_pages
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Opaque pagination cursor.
///
/// Encodes the page coordinates as URL-safe base64 over a JSON payload so
/// clients treat the token as opaque while it stays debuggable server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    /// Page the cursor points at.
    pub page: PageNumber,
    /// Page size the cursor was minted with.
    pub page_size: PageSize,
}

impl Cursor {
    /// Construct a cursor from validated coordinates.
    #[must_use]
    pub const fn new(page: PageNumber, page_size: PageSize) -> Self {
        Self { page, page_size }
    }

    /// Render the opaque token.
    #[must_use]
    pub fn encode(&self) -> String {
        // Serialising two integers cannot fail; fall back to the first-page
        // token on the unreachable branch rather than panicking.
        let payload = serde_json::to_vec(self).unwrap_or_else(|_| b"{}".to_vec());
        URL_SAFE_NO_PAD.encode(payload)
    }

    /// Decode an opaque token back into page coordinates.
    ///
    /// # Errors
    /// Returns [`PaginationError::InvalidCursor`] when the token is not
    /// base64, not JSON, or carries zero coordinates.
    pub fn decode(token: &str) -> Result<Self, PaginationError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|err| PaginationError::InvalidCursor {
                message: err.to_string(),
            })?;
        let cursor: Self =
            serde_json::from_slice(&bytes).map_err(|err| PaginationError::InvalidCursor {
                message: err.to_string(),
            })?;
        if cursor.page.get() == 0 {
            return Err(PaginationError::InvalidCursor {
                message: "page number must be at least 1".to_owned(),
            });
        }
        if cursor.page_size.get() == 0 {
            return Err(PaginationError::InvalidCursor {
                message: "page size must be at least 1".to_owned(),
            });
        }
        Ok(cursor)
    }
}

/// `next`/`prev` links for a paginated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLinks {
    /// URL of the following page, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// URL of the preceding page, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

impl PageLinks {
    /// Build links relative to `base` for the envelope's position.
    ///
    /// Existing `page` and `pageSize` query parameters on `base` are
    /// replaced; all other parameters are preserved.
    #[must_use]
    pub fn for_envelope<T>(base: &Url, envelope: &PageEnvelope<T>) -> Self {
        let next = envelope
            .has_next()
            .then(|| Self::with_page(base, envelope.page + 1, envelope.page_size));
        let prev = envelope
            .has_prev()
            .then(|| Self::with_page(base, envelope.page - 1, envelope.page_size));
        Self { next, prev }
    }

    fn with_page(base: &Url, page: u32, page_size: u32) -> String {
        let mut url = base.clone();
        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "page" && key != "pageSize")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (key, value) in &retained {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("page", &page.to_string());
            pairs.append_pair("pageSize", &page_size.to_string());
        }
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    fn page(n: u32) -> PageNumber {
        PageNumber::new(n).expect("non-zero page")
    }

    fn size(n: u32) -> PageSize {
        PageSize::new(n).expect("non-zero size")
    }

    #[rstest]
    #[case(1, 10)]
    #[case(2, 10)]
    #[case(3, 5)]
    fn paginate_returns_expected_slice_lengths(#[case] page_no: u32, #[case] expected: usize) {
        let items: Vec<u32> = (0..25).collect();
        let result = paginate(&items, size(10), page(page_no));
        assert_eq!(result.len(), expected);
    }

    #[rstest]
    fn paginate_past_the_end_is_empty_not_an_error() {
        let items: Vec<u32> = (0..25).collect();
        assert!(paginate(&items, size(10), page(4)).is_empty());
        assert!(paginate(&items, size(10), page(400)).is_empty());
    }

    #[rstest]
    fn paginate_preserves_order_within_a_page() {
        let items: Vec<u32> = (0..25).collect();
        assert_eq!(paginate(&items, size(10), page(2)), (10..20).collect::<Vec<_>>());
    }

    #[rstest]
    fn zero_page_and_zero_size_are_rejected() {
        assert_eq!(PageNumber::new(0), Err(PaginationError::ZeroPage));
        assert_eq!(PageSize::new(0), Err(PaginationError::ZeroPageSize));
    }

    #[rstest]
    #[case(25, 10, 3)]
    #[case(30, 10, 3)]
    #[case(0, 10, 0)]
    #[case(1, 10, 1)]
    fn envelope_computes_total_pages(
        #[case] total: u64,
        #[case] page_size: u32,
        #[case] expected: u64,
    ) {
        let envelope = PageEnvelope::new(Vec::<u32>::new(), page(1), size(page_size), total);
        assert_eq!(envelope.total_pages, expected);
    }

    #[rstest]
    fn envelope_neighbour_flags() {
        let envelope = PageEnvelope::new(vec![1_u32], page(2), size(10), 25);
        assert!(envelope.has_next());
        assert!(envelope.has_prev());

        let last = PageEnvelope::new(vec![1_u32], page(3), size(10), 25);
        assert!(!last.has_next());
        assert!(last.has_prev());
    }

    #[rstest]
    fn cursor_round_trips() {
        let cursor = Cursor::new(page(7), size(25));
        let decoded = Cursor::decode(&cursor.encode()).expect("token round-trips");
        assert_eq!(decoded, cursor);
    }

    #[rstest]
    #[case("not-base64-!!!")]
    #[case("bm90LWpzb24")]
    fn cursor_rejects_garbage_tokens(#[case] token: &str) {
        let err = Cursor::decode(token).expect_err("garbage token fails");
        assert!(matches!(err, PaginationError::InvalidCursor { .. }));
    }

    #[rstest]
    fn links_point_at_neighbouring_pages() {
        let base = Url::parse("https://example.net/api/v1/leaderboard?sortKey=points&page=2&pageSize=10")
            .expect("static url parses");
        let envelope = PageEnvelope::new(vec![1_u32], page(2), size(10), 25);
        let links = PageLinks::for_envelope(&base, &envelope);

        let next = links.next.expect("page 2 of 3 has a next link");
        assert!(next.contains("page=3"));
        assert!(next.contains("sortKey=points"));
        let prev = links.prev.expect("page 2 has a prev link");
        assert!(prev.contains("page=1"));
    }

    #[rstest]
    fn links_are_absent_at_the_edges() {
        let base = Url::parse("https://example.net/api/v1/leaderboard").expect("static url parses");
        let only_page = PageEnvelope::new(vec![1_u32], page(1), size(10), 5);
        let links = PageLinks::for_envelope(&base, &only_page);
        assert!(links.next.is_none());
        assert!(links.prev.is_none());
    }
}
