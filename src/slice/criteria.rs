//! Building blocks for family-specific slice criteria.
//!
//! A criteria value pairs a [`CursorPageRequest`](super::CursorPageRequest)
//! with a bag of optional filters. The invariant every constructor must
//! uphold: a filter is either absent or carries a non-empty value. Empty
//! collections are normalized to absent here, so the query layer can never
//! emit an always-false `IN ()` predicate by accident.

use super::error::SliceError;

/// A value bound to a parameterized query.
///
/// Filters collect these alongside their SQL fragments so the executor can
/// bind them positionally instead of interpolating values into the SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl SqlValue {
    /// Bind this value onto a sqlx query.
    pub fn bind_to<'q>(
        &'q self,
        query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    ) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
        match self {
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Bool(b) => query.bind(*b),
        }
    }
}

/// Filter bag attached to a slice query.
///
/// Implementations consult their own `has_*` state and only emit fragments
/// for filters that are present; `conditions` on an empty filter returns
/// nothing at all.
pub trait SliceFilter: Send + Sync {
    /// WHERE fragments (using `?` placeholders) and the values to bind, in
    /// matching order. Fragments are combined with AND by the executor.
    fn conditions(&self) -> (Vec<String>, Vec<SqlValue>);

    /// True when no filter is set and the query should run unfiltered.
    fn is_empty(&self) -> bool {
        self.conditions().0.is_empty()
    }
}

/// Normalize an optional collection: empty collapses to absent.
pub fn non_empty<T>(values: Option<Vec<T>>) -> Option<Vec<T>> {
    values.filter(|v| !v.is_empty())
}

/// Parse a comma-separated id list from a query parameter.
///
/// Missing or blank input is "absent"; an entry that is not a decimal
/// identifier fails fast rather than being dropped from the filter.
pub fn parse_id_list(
    filter: &'static str,
    raw: Option<&str>,
) -> Result<Option<Vec<i64>>, SliceError> {
    parse_list(filter, raw, |part| {
        part.parse::<i64>()
            .map_err(|_| SliceError::invalid_filter(filter, part))
    })
}

/// Parse a comma-separated list of enum-like values.
pub fn parse_list<T>(
    _filter: &'static str,
    raw: Option<&str>,
    parse: impl Fn(&str) -> Result<T, SliceError>,
) -> Result<Option<Vec<T>>, SliceError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let mut values = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        values.push(parse(part)?);
    }
    Ok(non_empty(Some(values)))
}

/// A free-text search bound to one column.
///
/// By construction this always carries both sides of the pair; the gate in
/// [`SearchTerm::gate`] is the only way API input becomes a search term.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTerm<F> {
    pub field: F,
    pub word: String,
}

impl<F> SearchTerm<F> {
    /// Two-sided validity gate: a search is only active when both the field
    /// and a non-blank word are present. A lone word or a lone field applies
    /// no predicate at all.
    pub fn gate(field: Option<F>, word: Option<&str>) -> Option<Self> {
        let field = field?;
        let word = word?.trim();
        if word.is_empty() {
            return None;
        }
        Some(Self {
            field,
            word: word.to_string(),
        })
    }

    /// LIKE pattern for a contains-style match.
    pub fn like_pattern(&self) -> String {
        format!("%{}%", self.word)
    }
}

/// `column IN (?, ?, ...)` fragment with one placeholder per value.
///
/// Callers must only reach this with a non-empty length; criteria
/// normalization guarantees that.
pub fn in_clause(column: &str, len: usize) -> String {
    debug_assert!(len > 0, "IN () predicate would match nothing");
    let placeholders = vec!["?"; len].join(", ");
    format!("{} IN ({})", column, placeholders)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn empty_collections_normalize_to_absent() {
        assert_eq!(non_empty::<i64>(Some(vec![])), None);
        assert_eq!(non_empty::<i64>(None), None);
        assert_eq!(non_empty(Some(vec![1])), Some(vec![1]));
    }

    #[test]
    fn id_list_parses_and_normalizes() {
        assert_eq!(parse_id_list("ids", None).unwrap(), None);
        assert_eq!(parse_id_list("ids", Some("")).unwrap(), None);
        assert_eq!(parse_id_list("ids", Some(" , ,")).unwrap(), None);
        assert_eq!(
            parse_id_list("ids", Some("3, 1,2")).unwrap(),
            Some(vec![3, 1, 2])
        );
    }

    #[test]
    fn bad_id_entry_fails_instead_of_dropping_the_filter() {
        assert_matches!(
            parse_id_list("ids", Some("1,x,3")),
            Err(SliceError::InvalidFilterValue { filter: "ids", .. })
        );
    }

    #[test]
    fn search_gate_requires_both_sides() {
        #[derive(Debug, PartialEq)]
        struct Field;

        assert_eq!(SearchTerm::gate(None::<Field>, Some("LOMBOK")), None);
        assert_eq!(SearchTerm::gate(Some(Field), None), None);
        assert_eq!(SearchTerm::gate(Some(Field), Some("   ")), None);

        let term = SearchTerm::gate(Some(Field), Some(" LOMBOK ")).unwrap();
        assert_eq!(term.word, "LOMBOK");
        assert_eq!(term.like_pattern(), "%LOMBOK%");
    }

    #[test]
    fn in_clause_emits_one_placeholder_per_value() {
        assert_eq!(in_clause("id", 1), "id IN (?)");
        assert_eq!(in_clause("id", 3), "id IN (?, ?, ?)");
    }
}
