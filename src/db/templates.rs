//! Code/document templates served to tooling.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::slice::criteria::{in_clause, non_empty};
use crate::slice::{
    CursorPageRequest, SearchTerm, SliceEntity, SliceError, SliceFilter, SlicePage, SliceQuery,
    SqlValue,
};

/// Template flavor. Stored as TEXT.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TemplateKind {
    Code,
    Document,
    Snippet,
}

impl TemplateKind {
    pub fn parse(value: &str) -> Result<Self, SliceError> {
        match value.to_ascii_lowercase().as_str() {
            "code" => Ok(Self::Code),
            "document" => Ok(Self::Document),
            "snippet" => Ok(Self::Snippet),
            _ => Err(SliceError::invalid_filter("kinds", value)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Document => "document",
            Self::Snippet => "snippet",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub id: i64,
    pub name: String,
    pub kind: TemplateKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SliceEntity for TemplateRecord {
    const TABLE: &'static str = "templates";
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "kind", "content", "created_at", "updated_at"];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSearchField {
    Name,
    Content,
}

impl TemplateSearchField {
    pub fn parse(value: &str) -> Result<Self, SliceError> {
        match value.to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "content" => Ok(Self::Content),
            _ => Err(SliceError::invalid_filter("searchField", value)),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Content => "content",
        }
    }
}

/// Slice criteria for template searches.
#[derive(Debug, Clone)]
pub struct TemplateCriteria {
    pub page: CursorPageRequest,
    ids: Option<Vec<i64>>,
    kinds: Option<Vec<TemplateKind>>,
    search: Option<SearchTerm<TemplateSearchField>>,
}

impl TemplateCriteria {
    pub fn new(page: CursorPageRequest) -> Self {
        Self {
            page,
            ids: None,
            kinds: None,
            search: None,
        }
    }

    pub fn with_ids(mut self, ids: Option<Vec<i64>>) -> Self {
        self.ids = non_empty(ids);
        self
    }

    pub fn with_kinds(mut self, kinds: Option<Vec<TemplateKind>>) -> Self {
        self.kinds = non_empty(kinds);
        self
    }

    pub fn with_search(mut self, field: Option<TemplateSearchField>, word: Option<&str>) -> Self {
        self.search = SearchTerm::gate(field, word);
        self
    }

    pub fn has_ids(&self) -> bool {
        self.ids.is_some()
    }

    pub fn has_kinds(&self) -> bool {
        self.kinds.is_some()
    }

    pub fn has_search(&self) -> bool {
        self.search.is_some()
    }
}

impl SliceFilter for TemplateCriteria {
    fn conditions(&self) -> (Vec<String>, Vec<SqlValue>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();
        if let Some(ids) = &self.ids {
            clauses.push(in_clause("id", ids.len()));
            values.extend(ids.iter().map(|id| SqlValue::Int(*id)));
        }
        if let Some(kinds) = &self.kinds {
            clauses.push(in_clause("kind", kinds.len()));
            values.extend(kinds.iter().map(|k| SqlValue::Text(k.as_str().to_string())));
        }
        if let Some(search) = &self.search {
            clauses.push(format!("{} LIKE ?", search.field.column()));
            values.push(SqlValue::Text(search.like_pattern()));
        }
        (clauses, values)
    }
}

/// Input for creating a template.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplate {
    pub name: String,
    pub kind: TemplateKind,
    #[serde(default)]
    pub content: String,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplate {
    pub name: Option<String>,
    pub kind: Option<TemplateKind>,
    pub content: Option<String>,
}

pub struct TemplateRepository {
    pool: SqlitePool,
}

impl TemplateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: CreateTemplate) -> Result<TemplateRecord> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO templates (name, kind, content, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(input.kind.as_str())
        .bind(&input.content)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let record = self
            .get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| anyhow::anyhow!("template vanished after insert"))?;
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> Result<Option<TemplateRecord>> {
        let record = sqlx::query_as::<_, TemplateRecord>(&format!(
            "{} WHERE id = ? AND deleted = 0",
            TemplateRecord::select_sql()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    pub async fn update(&self, id: i64, input: UpdateTemplate) -> Result<Option<TemplateRecord>> {
        let Some(current) = self.get(id).await? else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE templates SET name = ?, kind = ?, content = ?, updated_at = ?
             WHERE id = ? AND deleted = 0",
        )
        .bind(input.name.as_deref().unwrap_or(&current.name))
        .bind(input.kind.unwrap_or(current.kind).as_str())
        .bind(input.content.as_deref().unwrap_or(&current.content))
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    /// Soft delete; returns whether a live row was deleted.
    pub async fn soft_delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE templates SET deleted = 1, updated_at = ? WHERE id = ? AND deleted = 0",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Slice search, newest first.
    pub async fn search(&self, criteria: &TemplateCriteria) -> Result<SlicePage<TemplateRecord>> {
        let page = SliceQuery::<TemplateRecord>::new(criteria.page)
            .filter(criteria)
            .fetch_slice(&self.pool)
            .await?;
        Ok(page)
    }
}
