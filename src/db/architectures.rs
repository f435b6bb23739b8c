//! Architecture records (the root of the convention hierarchy).

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::slice::criteria::{in_clause, non_empty};
use crate::slice::{
    CursorPageRequest, SearchTerm, SliceEntity, SliceError, SliceFilter, SlicePage, SliceQuery,
    SqlValue,
};

#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SliceEntity for ArchitectureRecord {
    const TABLE: &'static str = "architectures";
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "description", "created_at", "updated_at"];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchitectureSearchField {
    Name,
    Description,
}

impl ArchitectureSearchField {
    pub fn parse(value: &str) -> Result<Self, SliceError> {
        match value.to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "description" => Ok(Self::Description),
            _ => Err(SliceError::invalid_filter("searchField", value)),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
        }
    }
}

/// Slice criteria for architecture searches.
#[derive(Debug, Clone)]
pub struct ArchitectureCriteria {
    pub page: CursorPageRequest,
    ids: Option<Vec<i64>>,
    search: Option<SearchTerm<ArchitectureSearchField>>,
}

impl ArchitectureCriteria {
    pub fn new(page: CursorPageRequest) -> Self {
        Self {
            page,
            ids: None,
            search: None,
        }
    }

    pub fn with_ids(mut self, ids: Option<Vec<i64>>) -> Self {
        self.ids = non_empty(ids);
        self
    }

    pub fn with_search(
        mut self,
        field: Option<ArchitectureSearchField>,
        word: Option<&str>,
    ) -> Self {
        self.search = SearchTerm::gate(field, word);
        self
    }

    pub fn has_ids(&self) -> bool {
        self.ids.is_some()
    }

    pub fn has_search(&self) -> bool {
        self.search.is_some()
    }
}

impl SliceFilter for ArchitectureCriteria {
    fn conditions(&self) -> (Vec<String>, Vec<SqlValue>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();
        if let Some(ids) = &self.ids {
            clauses.push(in_clause("id", ids.len()));
            values.extend(ids.iter().map(|id| SqlValue::Int(*id)));
        }
        if let Some(search) = &self.search {
            clauses.push(format!("{} LIKE ?", search.field.column()));
            values.push(SqlValue::Text(search.like_pattern()));
        }
        (clauses, values)
    }
}

/// Input for creating an architecture.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArchitecture {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

pub struct ArchitectureRepository {
    pool: SqlitePool,
}

impl ArchitectureRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: CreateArchitecture) -> Result<ArchitectureRecord> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO architectures (name, description, created_at, updated_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let record = self
            .get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| anyhow::anyhow!("architecture vanished after insert"))?;
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> Result<Option<ArchitectureRecord>> {
        let record = sqlx::query_as::<_, ArchitectureRecord>(&format!(
            "{} WHERE id = ? AND deleted = 0",
            ArchitectureRecord::select_sql()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Slice search, newest first.
    pub async fn search(
        &self,
        criteria: &ArchitectureCriteria,
    ) -> Result<SlicePage<ArchitectureRecord>> {
        let page = SliceQuery::<ArchitectureRecord>::new(criteria.page)
            .filter(criteria)
            .fetch_slice(&self.pool)
            .await?;
        Ok(page)
    }
}
