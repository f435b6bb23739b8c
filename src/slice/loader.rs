//! Batch association loading.
//!
//! Loads the children for one page of parents in a single `IN (...)` query
//! per child type instead of one query per parent. The data-fetch call sits
//! behind [`AssociationSource`] so grouping stays pure and tests can count
//! how many queries a load issues.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;

/// A row that belongs to exactly one parent.
pub trait ChildOf: Send {
    fn parent_id(&self) -> i64;
}

/// Table metadata for a child entity fetched by parent id.
pub trait ChildEntity:
    ChildOf + Sized + Unpin + for<'r> sqlx::FromRow<'r, SqliteRow>
{
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    /// Foreign key column pointing at the parent table.
    const PARENT_COLUMN: &'static str;
    /// Natural order of children within one parent.
    const ORDER_COLUMN: &'static str = "sequence_order";
}

/// One round trip fetching all children for a set of parents.
#[async_trait]
pub trait AssociationSource<C: ChildOf>: Send + Sync {
    /// Fetch every live child whose parent is in `parent_ids`, ordered by
    /// `(parent_id, natural order)`. One call is one query.
    async fn fetch_children(&self, parent_ids: &[i64]) -> Result<Vec<C>, sqlx::Error>;
}

/// sqlx-backed [`AssociationSource`] for a [`ChildEntity`] table.
pub struct ChildTable<'a, C: ChildEntity> {
    pool: &'a SqlitePool,
    _marker: std::marker::PhantomData<C>,
}

impl<'a, C: ChildEntity> ChildTable<'a, C> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            _marker: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<C: ChildEntity + Send + Sync> AssociationSource<C> for ChildTable<'_, C> {
    async fn fetch_children(&self, parent_ids: &[i64]) -> Result<Vec<C>, sqlx::Error> {
        let placeholders = vec!["?"; parent_ids.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM {} WHERE {} IN ({}) AND deleted = 0 ORDER BY {}, {}, id",
            C::COLUMNS.join(", "),
            C::TABLE,
            C::PARENT_COLUMN,
            placeholders,
            C::PARENT_COLUMN,
            C::ORDER_COLUMN,
        );
        tracing::debug!(
            sql = %sql,
            table = C::TABLE,
            parent_count = parent_ids.len(),
            "batch loading children"
        );

        let mut query = sqlx::query(&sql);
        for id in parent_ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(self.pool).await?;
        rows.iter().map(C::from_row).collect()
    }
}

/// Load the children of `parent_ids`, grouped by parent id.
///
/// Every requested parent id appears in the result, childless parents with
/// an empty vec. An empty parent set short-circuits without touching the
/// source at all, for the same reason criteria never emit `IN ()`.
pub async fn load_children<C, S>(
    source: &S,
    parent_ids: &[i64],
) -> Result<HashMap<i64, Vec<C>>, sqlx::Error>
where
    C: ChildOf,
    S: AssociationSource<C>,
{
    if parent_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = source.fetch_children(parent_ids).await?;
    Ok(group_by_parent(parent_ids, rows))
}

/// Group fetched child rows under their parents in one linear pass.
pub fn group_by_parent<C: ChildOf>(parent_ids: &[i64], rows: Vec<C>) -> HashMap<i64, Vec<C>> {
    let mut grouped: HashMap<i64, Vec<C>> =
        parent_ids.iter().map(|id| (*id, Vec::new())).collect();
    for row in rows {
        if let Some(children) = grouped.get_mut(&row.parent_id()) {
            children.push(row);
        }
    }
    grouped
}
