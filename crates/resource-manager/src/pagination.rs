//! List query parameters.
//!
//! Parsed from the query string of a list request:
//!
//! | Parameter | Meaning |
//! |-----------|---------|
//! | `take` | maximum number of items, 0 = unbounded |
//! | `skip` | number of items to skip |
//! | `query` | free-text filter, passed through untouched |
//! | `sortBy` | must be one of the handler's sorting fields |
//! | `sortDirection` | passed through untouched |

use std::borrow::Cow;

use crate::error::PaginationError;

/// Pagination, filter and sort parameters of a list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    take: usize,
    skip: usize,
    query: String,
    sort_by: String,
    sort_direction: String,
}

impl Pagination {
    /// Creates pagination with the given window and no filter or sort.
    pub fn new(take: usize, skip: usize) -> Self {
        Self {
            take,
            skip,
            ..Default::default()
        }
    }

    /// Sets the free-text filter.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Sets the sort field and direction.
    pub fn with_sort(mut self, sort_by: impl Into<String>, direction: impl Into<String>) -> Self {
        self.sort_by = sort_by.into();
        self.sort_direction = direction.into();
        self
    }

    /// Parses a raw query string.
    ///
    /// Only the first occurrence of each parameter counts. Unknown parameters
    /// are ignored.
    pub fn from_query(
        raw: Option<&str>,
        sorting_fields: &[&str],
    ) -> Result<Self, PaginationError> {
        let mut take = None;
        let mut skip = None;
        let mut query = None;
        let mut sort_by = None;
        let mut sort_direction = None;

        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let slot = match key.as_ref() {
                "take" => &mut take,
                "skip" => &mut skip,
                "query" => &mut query,
                "sortBy" => &mut sort_by,
                "sortDirection" => &mut sort_direction,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }

        let take = parse_count("take", take)?;
        let skip = parse_count("skip", skip)?;

        let sort_by = sort_by.map(Cow::into_owned).unwrap_or_default();
        if !sort_by.is_empty() && !sorting_fields.contains(&sort_by.as_str()) {
            return Err(PaginationError::InvalidSortField(sort_by));
        }

        Ok(Self {
            take,
            skip,
            query: query.map(Cow::into_owned).unwrap_or_default(),
            sort_by,
            sort_direction: sort_direction.map(Cow::into_owned).unwrap_or_default(),
        })
    }

    /// Maximum number of items to return; 0 means unbounded.
    pub fn take(&self) -> usize {
        self.take
    }

    /// Number of items to skip.
    pub fn skip(&self) -> usize {
        self.skip
    }

    /// Free-text filter.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Sort field, empty if unsorted.
    pub fn sort_by(&self) -> &str {
        &self.sort_by
    }

    /// Sort direction as sent by the client.
    pub fn sort_direction(&self) -> &str {
        &self.sort_direction
    }

    /// Returns true if the client asked for descending order.
    pub fn is_descending(&self) -> bool {
        self.sort_direction.eq_ignore_ascii_case("desc")
            || self.sort_direction.eq_ignore_ascii_case("descending")
    }

    /// Applies the skip/take window to an already filtered and sorted sequence.
    pub fn window<I>(&self, items: I) -> impl Iterator<Item = I::Item>
    where
        I: IntoIterator,
    {
        let take = if self.take == 0 { usize::MAX } else { self.take };
        items.into_iter().skip(self.skip).take(take)
    }
}

fn parse_count(param: &'static str, value: Option<Cow<'_, str>>) -> Result<usize, PaginationError> {
    match value.as_deref() {
        None | Some("") => Ok(0),
        Some(raw) => raw.parse().map_err(|_| PaginationError::NotANumber {
            param,
            value: raw.to_string(),
        }),
    }
}
