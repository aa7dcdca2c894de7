//! Query filters for [`Collection::all`](crate::Collection::all).
//!
//! A filter is an ordered list of key/value pairs encoded as a standard
//! `application/x-www-form-urlencoded` query string. Values are sent as
//! given; the server decides how to interpret them.

// ============================================================================
// Imports
// ============================================================================

use url::Url;

// ============================================================================
// Filter
// ============================================================================

/// Key/value pairs appended to a list request as a query string.
///
/// # Example
///
/// ```
/// use thunderbase::Filter;
///
/// let filter = Filter::new().with("name", "John Doe").with("limit", "10");
/// assert_eq!(filter.to_query_string(), "name=John+Doe&limit=10");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pairs: Vec<(String, String)>,
}

impl Filter {
    /// Creates an empty filter.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a key/value pair.
    ///
    /// Repeating a key sends it twice.
    #[inline]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// Appends a key/value pair in place.
    #[inline]
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Returns `true` if the filter has no pairs.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns the pairs in insertion order.
    #[inline]
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Encodes the pairs as a query string, without the leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.pairs)
            .finish()
    }

    /// Sets the query string of `url`. An empty filter leaves no query.
    pub(crate) fn apply_to(&self, url: &mut Url) {
        if self.pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(&self.pairs);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Filter
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Filter
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
