//! Convention records and slice search.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::slice::criteria::{in_clause, non_empty};
use crate::slice::{
    CursorPageRequest, SearchTerm, SliceEntity, SliceError, SliceFilter, SlicePage, SliceQuery,
    SqlValue,
};

/// Category a convention or coding rule belongs to. Stored as TEXT.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum RuleCategory {
    Naming,
    Structure,
    Dependency,
    ErrorHandling,
    Logging,
    Testing,
    Documentation,
    Security,
}

impl RuleCategory {
    pub fn parse(value: &str) -> Result<Self, SliceError> {
        match value.to_ascii_lowercase().as_str() {
            "naming" => Ok(Self::Naming),
            "structure" => Ok(Self::Structure),
            "dependency" => Ok(Self::Dependency),
            "error_handling" => Ok(Self::ErrorHandling),
            "logging" => Ok(Self::Logging),
            "testing" => Ok(Self::Testing),
            "documentation" => Ok(Self::Documentation),
            "security" => Ok(Self::Security),
            _ => Err(SliceError::invalid_filter("categories", value)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Naming => "naming",
            Self::Structure => "structure",
            Self::Dependency => "dependency",
            Self::ErrorHandling => "error_handling",
            Self::Logging => "logging",
            Self::Testing => "testing",
            Self::Documentation => "documentation",
            Self::Security => "security",
        }
    }
}

/// A convention row (one coding guideline grouping under a module).
#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ConventionRecord {
    pub id: i64,
    pub module_id: i64,
    pub title: String,
    pub category: RuleCategory,
    pub content: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SliceEntity for ConventionRecord {
    const TABLE: &'static str = "conventions";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "module_id",
        "title",
        "category",
        "content",
        "active",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> i64 {
        self.id
    }
}

/// Column a convention text search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConventionSearchField {
    Title,
    Content,
}

impl ConventionSearchField {
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

/// Slice criteria for convention searches. Filters AND together; absent
/// filters contribute no predicate.
#[derive(Debug, Clone)]
pub struct ConventionCriteria {
    pub page: CursorPageRequest,
    ids: Option<Vec<i64>>,
    module_ids: Option<Vec<i64>>,
    categories: Option<Vec<RuleCategory>>,
    search: Option<SearchTerm<ConventionSearchField>>,
    active: Option<bool>,
}

impl ConventionCriteria {
    pub fn new(page: CursorPageRequest) -> Self {
        Self {
            page,
            ids: None,
            module_ids: None,
            categories: None,
            search: None,
            active: None,
        }
    }

    pub fn with_ids(mut self, ids: Option<Vec<i64>>) -> Self {
        self.ids = non_empty(ids);
        self
    }

    pub fn with_module_ids(mut self, ids: Option<Vec<i64>>) -> Self {
        self.module_ids = non_empty(ids);
        self
    }

    pub fn with_categories(mut self, categories: Option<Vec<RuleCategory>>) -> Self {
        self.categories = non_empty(categories);
        self
    }

    pub fn with_search(
        mut self,
        field: Option<ConventionSearchField>,
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

    pub fn has_module_ids(&self) -> bool {
        self.module_ids.is_some()
    }

    pub fn has_categories(&self) -> bool {
        self.categories.is_some()
    }

    pub fn has_search(&self) -> bool {
        self.search.is_some()
    }

    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }
}

impl SliceFilter for ConventionCriteria {
    fn conditions(&self) -> (Vec<String>, Vec<SqlValue>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();
        if let Some(ids) = &self.ids {
            clauses.push(in_clause("id", ids.len()));
            values.extend(ids.iter().map(|id| SqlValue::Int(*id)));
        }
        if let Some(ids) = &self.module_ids {
            clauses.push(in_clause("module_id", ids.len()));
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

/// Input for creating a convention.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConvention {
    pub module_id: i64,
    pub title: String,
    pub category: RuleCategory,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

pub struct ConventionRepository {
    pool: SqlitePool,
}

impl ConventionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: CreateConvention) -> Result<ConventionRecord> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO conventions (module_id, title, category, content, active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(input.module_id)
        .bind(&input.title)
        .bind(input.category.as_str())
        .bind(&input.content)
        .bind(input.active)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let record = self
            .get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| anyhow::anyhow!("convention vanished after insert"))?;
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> Result<Option<ConventionRecord>> {
        let record = sqlx::query_as::<_, ConventionRecord>(&format!(
            "{} WHERE id = ? AND deleted = 0",
            ConventionRecord::select_sql()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Slice search, newest first.
    pub async fn search(
        &self,
        criteria: &ConventionCriteria,
    ) -> Result<SlicePage<ConventionRecord>> {
        let page = SliceQuery::<ConventionRecord>::new(criteria.page)
            .filter(criteria)
            .fetch_slice(&self.pool)
            .await?;
        Ok(page)
    }
}
