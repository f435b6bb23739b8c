//! Cursor-based slice pagination types.
//!
//! A slice is a page of results plus a `has_next` flag, computed without a
//! COUNT query: the executor fetches one row more than the requested size
//! (the lookahead row) and the assembler trims it off again. The cursor is
//! the identifier of the last row kept, round-tripped by the client as an
//! opaque decimal string.

use serde::Serialize;

use super::error::{MAX_PAGE_SIZE, SliceError};

/// Immutable pagination token: the last-seen identifier plus a page size.
///
/// `cursor == None` means "first page". Construction validates the size, so
/// every value of this type is usable as-is by the query layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPageRequest {
    cursor: Option<i64>,
    size: i64,
}

impl CursorPageRequest {
    /// Request the first page.
    pub fn first(size: i64) -> Result<Self, SliceError> {
        Self::new(None, size)
    }

    /// Request the page after the given identifier.
    pub fn after(cursor: i64, size: i64) -> Result<Self, SliceError> {
        Self::new(Some(cursor), size)
    }

    fn new(cursor: Option<i64>, size: i64) -> Result<Self, SliceError> {
        if size < 1 || size > MAX_PAGE_SIZE {
            return Err(SliceError::InvalidPageSize { size });
        }
        Ok(Self { cursor, size })
    }

    /// Build a page request from raw API parameters.
    ///
    /// A missing cursor means first page; a cursor that does not parse as a
    /// decimal identifier fails fast rather than degrading to "no cursor".
    /// A missing size falls back to `default_size`.
    pub fn from_params(
        cursor: Option<&str>,
        size: Option<i64>,
        default_size: i64,
    ) -> Result<Self, SliceError> {
        let cursor = match cursor {
            Some(raw) => Some(parse_cursor(raw)?),
            None => None,
        };
        Self::new(cursor, size.unwrap_or(default_size))
    }

    pub fn cursor(&self) -> Option<i64> {
        self.cursor
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    /// Number of rows to fetch: one more than the page size, so the
    /// assembler can detect a next page without counting.
    pub fn fetch_size(&self) -> i64 {
        self.size + 1
    }
}

/// Parse an opaque cursor string back into an identifier.
pub fn parse_cursor(raw: &str) -> Result<i64, SliceError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| SliceError::InvalidCursor {
            raw: raw.to_string(),
        })
}

/// One page of a sliced result set.
///
/// `content.len() <= size`; `next_cursor` is set iff `has_next` is true and
/// the page is non-empty; content is ordered by identifier descending, the
/// same key the cursor anchors on.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlicePage<T> {
    pub content: Vec<T>,
    pub size: i64,
    pub has_next: bool,
    pub next_cursor: Option<i64>,
}

impl<T> SlicePage<T> {
    /// Assemble a page from raw executor output.
    ///
    /// `rows` is at most `size + 1` rows long; the extra lookahead row, when
    /// present, only signals that a next page exists and is trimmed off.
    /// Pure function: the same rows and size always produce the same page.
    pub fn assemble(mut rows: Vec<T>, size: i64, id_of: impl Fn(&T) -> i64) -> Self {
        debug_assert!(rows.len() as i64 <= size + 1, "executor overfetched");

        let has_next = rows.len() as i64 > size;
        if has_next {
            rows.truncate(size as usize);
        }
        let next_cursor = if has_next {
            rows.last().map(&id_of)
        } else {
            None
        };

        Self {
            content: rows,
            size,
            has_next,
            next_cursor,
        }
    }

    /// Map page content while keeping the pagination envelope.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> SlicePage<U> {
        SlicePage {
            content: self.content.into_iter().map(f).collect(),
            size: self.size,
            has_next: self.has_next,
            next_cursor: self.next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn ids(n: i64) -> Vec<i64> {
        // Descending identifiers, the executor's output order
        (0..n).map(|i| 1000 - i).collect()
    }

    #[test]
    fn size_is_validated_on_construction() {
        assert_matches!(
            CursorPageRequest::first(0),
            Err(SliceError::InvalidPageSize { size: 0 })
        );
        assert_matches!(
            CursorPageRequest::first(101),
            Err(SliceError::InvalidPageSize { size: 101 })
        );
        assert_matches!(
            CursorPageRequest::after(50, -3),
            Err(SliceError::InvalidPageSize { size: -3 })
        );
        assert!(CursorPageRequest::first(1).is_ok());
        assert!(CursorPageRequest::first(100).is_ok());
    }

    #[test]
    fn fetch_size_adds_the_lookahead_row() {
        let page = CursorPageRequest::first(20).unwrap();
        assert_eq!(page.fetch_size(), 21);
    }

    #[test]
    fn malformed_cursor_fails_fast() {
        let err = CursorPageRequest::from_params(Some("abc"), Some(20), 20);
        assert_matches!(err, Err(SliceError::InvalidCursor { .. }));
    }

    #[test]
    fn from_params_applies_the_default_size() {
        let page = CursorPageRequest::from_params(None, None, 20).unwrap();
        assert_eq!(page.size(), 20);
        assert_eq!(page.cursor(), None);

        let page = CursorPageRequest::from_params(Some("100"), Some(5), 20).unwrap();
        assert_eq!(page.cursor(), Some(100));
        assert_eq!(page.size(), 5);
    }

    #[test]
    fn lookahead_row_is_trimmed_and_sets_has_next() {
        // size + 1 rows: next page exists, lookahead row dropped
        let page = SlicePage::assemble(ids(21), 20, |id| *id);
        assert_eq!(page.content.len(), 20);
        assert!(page.has_next);
        assert_eq!(page.next_cursor, Some(*page.content.last().unwrap()));
    }

    #[test]
    fn exact_size_means_no_next_page() {
        let page = SlicePage::assemble(ids(20), 20, |id| *id);
        assert_eq!(page.content.len(), 20);
        assert!(!page.has_next);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn empty_rows_produce_an_empty_page() {
        let page = SlicePage::assemble(Vec::<i64>::new(), 20, |id| *id);
        assert!(page.content.is_empty());
        assert!(!page.has_next);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn assembly_is_idempotent() {
        let a = SlicePage::assemble(ids(21), 20, |id| *id);
        let b = SlicePage::assemble(ids(21), 20, |id| *id);
        assert_eq!(a, b);
    }
}
