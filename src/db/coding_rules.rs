//! Coding rule records, slice search, and CRUD.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::conventions::RuleCategory;
use crate::slice::criteria::{in_clause, non_empty};
use crate::slice::{
    CursorPageRequest, SearchTerm, SliceEntity, SliceError, SliceFilter, SlicePage, SliceQuery,
    SqlValue,
};

/// How strongly a rule is enforced. Stored as TEXT.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum RuleSeverity {
    Info,
    Warning,
    Error,
    Blocker,
}

impl RuleSeverity {
    pub fn parse(value: &str) -> Result<Self, SliceError> {
        match value.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "blocker" => Ok(Self::Blocker),
            _ => Err(SliceError::invalid_filter("severities", value)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Blocker => "blocker",
        }
    }
}

/// A coding rule row. The leaf of the convention hierarchy that checklist
/// items, zero-tolerance rules, and examples hang off.
#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CodingRuleRecord {
    pub id: i64,
    pub convention_id: i64,
    pub title: String,
    pub category: RuleCategory,
    pub severity: RuleSeverity,
    pub content: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SliceEntity for CodingRuleRecord {
    const TABLE: &'static str = "coding_rules";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "convention_id",
        "title",
        "category",
        "severity",
        "content",
        "active",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> i64 {
        self.id
    }
}

/// Column a coding-rule text search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodingRuleSearchField {
    Title,
    Content,
}

impl CodingRuleSearchField {
    pub fn parse(value: &str) -> Result<Self, SliceError> {
        match value.to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "content" => Ok(Self::Content),
            _ => Err(SliceError::invalid_filter("searchField", value)),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
        }
    }
}

/// Slice criteria for coding-rule searches.
///
/// Constructed through the `with_*` builders so every filter is either
/// absent or non-empty; the search pair is gated two-sided.
#[derive(Debug, Clone)]
pub struct CodingRuleCriteria {
    pub page: CursorPageRequest,
    ids: Option<Vec<i64>>,
    convention_ids: Option<Vec<i64>>,
    categories: Option<Vec<RuleCategory>>,
    severities: Option<Vec<RuleSeverity>>,
    search: Option<SearchTerm<CodingRuleSearchField>>,
    active: Option<bool>,
}

impl CodingRuleCriteria {
    pub fn new(page: CursorPageRequest) -> Self {
        Self {
            page,
            ids: None,
            convention_ids: None,
            categories: None,
            severities: None,
            search: None,
            active: None,
        }
    }

    pub fn with_ids(mut self, ids: Option<Vec<i64>>) -> Self {
        self.ids = non_empty(ids);
        self
    }

    pub fn with_convention_ids(mut self, ids: Option<Vec<i64>>) -> Self {
        self.convention_ids = non_empty(ids);
        self
    }

    pub fn with_categories(mut self, categories: Option<Vec<RuleCategory>>) -> Self {
        self.categories = non_empty(categories);
        self
    }

    pub fn with_severities(mut self, severities: Option<Vec<RuleSeverity>>) -> Self {
        self.severities = non_empty(severities);
        self
    }

    pub fn with_search(
        mut self,
        field: Option<CodingRuleSearchField>,
        word: Option<&str>,
    ) -> Self {
        self.search = SearchTerm::gate(field, word);
        self
    }

    pub fn with_active(mut self, active: Option<bool>) -> Self {
        self.active = active;
        self
    }

    pub fn has_ids(&self) -> bool {
        self.ids.is_some()
    }

    pub fn has_convention_ids(&self) -> bool {
        self.convention_ids.is_some()
    }

    pub fn has_categories(&self) -> bool {
        self.categories.is_some()
    }

    pub fn has_severities(&self) -> bool {
        self.severities.is_some()
    }

    pub fn has_search(&self) -> bool {
        self.search.is_some()
    }

    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }
}

impl SliceFilter for CodingRuleCriteria {
    fn conditions(&self) -> (Vec<String>, Vec<SqlValue>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();
        if let Some(ids) = &self.ids {
            clauses.push(in_clause("id", ids.len()));
            values.extend(ids.iter().map(|id| SqlValue::Int(*id)));
        }
        if let Some(ids) = &self.convention_ids {
            clauses.push(in_clause("convention_id", ids.len()));
            values.extend(ids.iter().map(|id| SqlValue::Int(*id)));
        }
        if let Some(categories) = &self.categories {
            clauses.push(in_clause("category", categories.len()));
            values.extend(
                categories
                    .iter()
                    .map(|c| SqlValue::Text(c.as_str().to_string())),
            );
        }
        if let Some(severities) = &self.severities {
            clauses.push(in_clause("severity", severities.len()));
            values.extend(
                severities
                    .iter()
                    .map(|s| SqlValue::Text(s.as_str().to_string())),
            );
        }
        if let Some(search) = &self.search {
            clauses.push(format!("{} LIKE ?", search.field.column()));
            values.push(SqlValue::Text(search.like_pattern()));
        }
        if let Some(active) = self.active {
            clauses.push("active = ?".to_string());
            values.push(SqlValue::Bool(active));
        }
        (clauses, values)
    }
}

/// Input for creating a coding rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCodingRule {
    pub convention_id: i64,
    pub title: String,
    pub category: RuleCategory,
    pub severity: RuleSeverity,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCodingRule {
    pub title: Option<String>,
    pub category: Option<RuleCategory>,
    pub severity: Option<RuleSeverity>,
    pub content: Option<String>,
    pub active: Option<bool>,
}

pub struct CodingRuleRepository {
    pool: SqlitePool,
}

impl CodingRuleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: CreateCodingRule) -> Result<CodingRuleRecord> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO coding_rules (convention_id, title, category, severity, content, active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(input.convention_id)
        .bind(&input.title)
        .bind(input.category.as_str())
        .bind(input.severity.as_str())
        .bind(&input.content)
        .bind(input.active)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let record = self
            .get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| anyhow::anyhow!("coding rule vanished after insert"))?;
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> Result<Option<CodingRuleRecord>> {
        let record = sqlx::query_as::<_, CodingRuleRecord>(&format!(
            "{} WHERE id = ? AND deleted = 0",
            CodingRuleRecord::select_sql()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    pub async fn update(
        &self,
        id: i64,
        input: UpdateCodingRule,
    ) -> Result<Option<CodingRuleRecord>> {
        let Some(current) = self.get(id).await? else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE coding_rules
             SET title = ?, category = ?, severity = ?, content = ?, active = ?, updated_at = ?
             WHERE id = ? AND deleted = 0",
        )
        .bind(input.title.as_deref().unwrap_or(&current.title))
        .bind(input.category.unwrap_or(current.category).as_str())
        .bind(input.severity.unwrap_or(current.severity).as_str())
        .bind(input.content.as_deref().unwrap_or(&current.content))
        .bind(input.active.unwrap_or(current.active))
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    /// Soft delete; returns whether a live row was deleted.
    pub async fn soft_delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE coding_rules SET deleted = 1, updated_at = ? WHERE id = ? AND deleted = 0",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Slice search, newest first.
    pub async fn search(
        &self,
        criteria: &CodingRuleCriteria,
    ) -> Result<SlicePage<CodingRuleRecord>> {
        let page = SliceQuery::<CodingRuleRecord>::new(criteria.page)
            .filter(criteria)
            .fetch_slice(&self.pool)
            .await?;
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria() -> CodingRuleCriteria {
        CodingRuleCriteria::new(CursorPageRequest::first(20).unwrap())
    }

    #[test]
    fn empty_collections_leave_the_has_predicates_false() {
        let absent = criteria();
        let emptied = criteria()
            .with_ids(Some(Vec::new()))
            .with_convention_ids(Some(Vec::new()))
            .with_categories(Some(Vec::new()))
            .with_severities(Some(Vec::new()));

        for c in [&absent, &emptied] {
            assert!(!c.has_ids());
            assert!(!c.has_convention_ids());
            assert!(!c.has_categories());
            assert!(!c.has_severities());
            assert!(c.conditions().0.is_empty());
        }
    }

    #[test]
    fn one_sided_search_leaves_has_search_false() {
        assert!(!criteria().with_search(None, Some("LOMBOK")).has_search());
        assert!(
            !criteria()
                .with_search(Some(CodingRuleSearchField::Title), None)
                .has_search()
        );
        assert!(
            criteria()
                .with_search(Some(CodingRuleSearchField::Title), Some("LOMBOK"))
                .has_search()
        );
    }

    #[test]
    fn present_filters_flip_their_predicates() {
        let c = criteria()
            .with_ids(Some(vec![1]))
            .with_severities(Some(vec![RuleSeverity::Blocker]))
            .with_active(Some(true));
        assert!(c.has_ids());
        assert!(c.has_severities());
        assert!(c.has_active());
        assert!(!c.has_categories());
    }
}
