//! Cursor slice pagination and hierarchical read composition.
//!
//! The read path every list endpoint shares: a [`CursorPageRequest`] plus a
//! family-specific filter bag becomes a descending-id query that overfetches
//! by one row, [`SlicePage::assemble`] trims the lookahead row into a
//! `has_next` flag, and the hierarchy endpoints regroup joined or
//! batch-loaded child rows around the page's parents without N+1 queries.

pub mod criteria;
pub mod error;
pub mod executor;
pub mod flatten;
pub mod loader;
mod page;

pub use criteria::{SearchTerm, SliceFilter, SqlValue};
pub use error::{MAX_PAGE_SIZE, SliceError};
pub use executor::{SliceEntity, SliceQuery};
pub use flatten::{Grouped, group_by_preserving_order};
pub use loader::{AssociationSource, ChildEntity, ChildOf, ChildTable, load_children};
pub use page::{CursorPageRequest, SlicePage, parse_cursor};
