//! Error taxonomy for slice criteria construction.
//!
//! Everything here is detected at criteria-construction time, before any
//! query executes. The query executor and result assembler are pure with
//! respect to these errors: once a criteria value exists, it is valid.

use thiserror::Error;

/// Maximum page size accepted by [`CursorPageRequest`](super::CursorPageRequest).
pub const MAX_PAGE_SIZE: i64 = 100;

/// Validation failures raised while building a cursor page request or
/// slice criteria. All variants map to a client error at the API boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SliceError {
    /// Page size outside `[1, 100]`.
    #[error("page size must be between 1 and {MAX_PAGE_SIZE}, got {size}")]
    InvalidPageSize { size: i64 },

    /// Cursor string that does not parse as an identifier.
    #[error("invalid cursor: {raw:?}")]
    InvalidCursor { raw: String },

    /// A filter value that does not match any known variant (unknown
    /// category, severity, search field, or a malformed id list entry).
    #[error("invalid value {value:?} for filter {filter}")]
    InvalidFilterValue {
        filter: &'static str,
        value: String,
    },
}

impl SliceError {
    pub fn invalid_filter(filter: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidFilterValue {
            filter,
            value: value.into(),
        }
    }
}
