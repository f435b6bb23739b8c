//! Layer records; the driving entity of the layer tree endpoint.

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
pub struct LayerRecord {
    pub id: i64,
    pub architecture_id: i64,
    pub name: String,
    pub description: String,
    pub sequence_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SliceEntity for LayerRecord {
    const TABLE: &'static str = "layers";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "architecture_id",
        "name",
        "description",
        "sequence_order",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerSearchField {
    Name,
    Description,
}

impl LayerSearchField {
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

/// Slice criteria for layer searches.
#[derive(Debug, Clone)]
pub struct LayerCriteria {
    pub page: CursorPageRequest,
    ids: Option<Vec<i64>>,
    architecture_ids: Option<Vec<i64>>,
    search: Option<SearchTerm<LayerSearchField>>,
}

impl LayerCriteria {
    pub fn new(page: CursorPageRequest) -> Self {
        Self {
            page,
            ids: None,
            architecture_ids: None,
            search: None,
        }
    }

    pub fn with_ids(mut self, ids: Option<Vec<i64>>) -> Self {
        self.ids = non_empty(ids);
        self
    }

    pub fn with_architecture_ids(mut self, ids: Option<Vec<i64>>) -> Self {
        self.architecture_ids = non_empty(ids);
        self
    }

    pub fn with_search(mut self, field: Option<LayerSearchField>, word: Option<&str>) -> Self {
        self.search = SearchTerm::gate(field, word);
        self
    }

    pub fn has_ids(&self) -> bool {
        self.ids.is_some()
    }

    pub fn has_architecture_ids(&self) -> bool {
        self.architecture_ids.is_some()
    }

    pub fn has_search(&self) -> bool {
        self.search.is_some()
    }
}

impl SliceFilter for LayerCriteria {
    fn conditions(&self) -> (Vec<String>, Vec<SqlValue>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();
        if let Some(ids) = &self.ids {
            clauses.push(in_clause("id", ids.len()));
            values.extend(ids.iter().map(|id| SqlValue::Int(*id)));
        }
        if let Some(ids) = &self.architecture_ids {
            clauses.push(in_clause("architecture_id", ids.len()));
            values.extend(ids.iter().map(|id| SqlValue::Int(*id)));
        }
        if let Some(search) = &self.search {
            clauses.push(format!("{} LIKE ?", search.field.column()));
            values.push(SqlValue::Text(search.like_pattern()));
        }
        (clauses, values)
    }
}

/// Input for creating a layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLayer {
    pub architecture_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sequence_order: i64,
}

pub struct LayerRepository {
    pool: SqlitePool,
}

impl LayerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: CreateLayer) -> Result<LayerRecord> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO layers (architecture_id, name, description, sequence_order, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(input.architecture_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.sequence_order)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let record = self
            .get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| anyhow::anyhow!("layer vanished after insert"))?;
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> Result<Option<LayerRecord>> {
        let record = sqlx::query_as::<_, LayerRecord>(&format!(
            "{} WHERE id = ? AND deleted = 0",
            LayerRecord::select_sql()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Slice search, newest first.
    pub async fn search(&self, criteria: &LayerCriteria) -> Result<SlicePage<LayerRecord>> {
        let page = SliceQuery::<LayerRecord>::new(criteria.page)
            .filter(criteria)
            .fetch_slice(&self.pool)
            .await?;
        Ok(page)
    }
}
