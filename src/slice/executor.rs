//! Slice query executor.
//!
//! Builds the filtered, descending-id-ordered SELECT for a slice request,
//! fetches `size + 1` rows (the lookahead row), and hands them to the page
//! assembler. All values go through bound parameters; only column names and
//! table names from entity metadata reach the SQL text.

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;

use super::criteria::{SliceFilter, SqlValue};
use super::page::{CursorPageRequest, SlicePage};

/// Table metadata for an entity that can be sliced.
///
/// Tables carry an `i64` auto-increment primary key named `id` and a
/// soft-delete flag named `deleted`; the executor relies on both.
pub trait SliceEntity:
    Sized + Send + Unpin + for<'r> sqlx::FromRow<'r, SqliteRow>
{
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> i64;

    fn select_sql() -> String {
        format!("SELECT {} FROM {}", Self::COLUMNS.join(", "), Self::TABLE)
    }
}

/// A slice query under construction.
pub struct SliceQuery<E: SliceEntity> {
    page: CursorPageRequest,
    where_clauses: Vec<String>,
    values: Vec<SqlValue>,
    _marker: std::marker::PhantomData<E>,
}

impl<E: SliceEntity> SliceQuery<E> {
    pub fn new(page: CursorPageRequest) -> Self {
        Self {
            page,
            // Soft-deleted rows never appear in a slice
            where_clauses: vec!["deleted = 0".to_string()],
            values: Vec::new(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Attach a filter bag. Absent filters contribute nothing.
    pub fn filter<F: SliceFilter>(mut self, filter: &F) -> Self {
        let (conditions, values) = filter.conditions();
        self.where_clauses.extend(conditions);
        self.values.extend(values);
        self
    }

    fn build_sql(&self) -> String {
        let mut sql = E::select_sql();
        sql.push_str(" WHERE ");
        sql.push_str(&self.where_clauses.join(" AND "));
        if self.page.cursor().is_some() {
            // Descending pagination: everything strictly below the cursor
            sql.push_str(" AND id < ?");
        }
        sql.push_str(&format!(
            " ORDER BY id DESC LIMIT {}",
            self.page.fetch_size()
        ));
        sql
    }

    /// Execute the query and assemble the slice page.
    pub async fn fetch_slice(self, pool: &SqlitePool) -> Result<SlicePage<E>, sqlx::Error> {
        let sql = self.build_sql();
        tracing::debug!(sql = %sql, table = E::TABLE, "executing slice query");

        let mut query = sqlx::query(&sql);
        for value in &self.values {
            query = value.bind_to(query);
        }
        if let Some(cursor) = self.page.cursor() {
            query = query.bind(cursor);
        }

        let rows = query.fetch_all(pool).await?;
        let entities = rows
            .iter()
            .map(E::from_row)
            .collect::<Result<Vec<E>, _>>()?;

        Ok(SlicePage::assemble(entities, self.page.size(), E::id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slice::criteria::in_clause;

    struct Fake {
        id: i64,
    }

    impl<'r> sqlx::FromRow<'r, SqliteRow> for Fake {
        fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
            use sqlx::Row;
            Ok(Self {
                id: row.try_get("id")?,
            })
        }
    }

    impl SliceEntity for Fake {
        const TABLE: &'static str = "fakes";
        const COLUMNS: &'static [&'static str] = &["id", "name"];

        fn id(&self) -> i64 {
            self.id
        }
    }

    struct IdFilter(Vec<i64>);

    impl SliceFilter for IdFilter {
        fn conditions(&self) -> (Vec<String>, Vec<SqlValue>) {
            if self.0.is_empty() {
                return (Vec::new(), Vec::new());
            }
            (
                vec![in_clause("id", self.0.len())],
                self.0.iter().map(|id| SqlValue::Int(*id)).collect(),
            )
        }
    }

    #[test]
    fn first_page_sql_has_no_cursor_predicate() {
        let page = CursorPageRequest::first(20).unwrap();
        let sql = SliceQuery::<Fake>::new(page).build_sql();
        assert_eq!(
            sql,
            "SELECT id, name FROM fakes WHERE deleted = 0 ORDER BY id DESC LIMIT 21"
        );
    }

    #[test]
    fn cursor_adds_a_strictly_below_predicate() {
        let page = CursorPageRequest::after(100, 20).unwrap();
        let sql = SliceQuery::<Fake>::new(page).build_sql();
        assert_eq!(
            sql,
            "SELECT id, name FROM fakes WHERE deleted = 0 AND id < ? ORDER BY id DESC LIMIT 21"
        );
    }

    #[test]
    fn present_filters_join_with_and() {
        let page = CursorPageRequest::first(5).unwrap();
        let sql = SliceQuery::<Fake>::new(page)
            .filter(&IdFilter(vec![1, 2]))
            .build_sql();
        assert_eq!(
            sql,
            "SELECT id, name FROM fakes WHERE deleted = 0 AND id IN (?, ?) ORDER BY id DESC LIMIT 6"
        );
    }

    #[test]
    fn empty_filter_contributes_nothing() {
        let page = CursorPageRequest::first(5).unwrap();
        let filtered = SliceQuery::<Fake>::new(page)
            .filter(&IdFilter(Vec::new()))
            .build_sql();
        let unfiltered = SliceQuery::<Fake>::new(page).build_sql();
        assert_eq!(filtered, unfiltered);
    }
}
