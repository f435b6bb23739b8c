//! Good/bad code examples attached to coding rules.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::slice::{ChildEntity, ChildOf, ChildTable, SliceError, load_children};

/// Whether an example shows the right way or the wrong way.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ExampleKind {
    Good,
    Bad,
}

impl ExampleKind {
    pub fn parse(value: &str) -> Result<Self, SliceError> {
        match value.to_ascii_lowercase().as_str() {
            "good" => Ok(Self::Good),
            "bad" => Ok(Self::Bad),
            _ => Err(SliceError::invalid_filter("kind", value)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Bad => "bad",
        }
    }
}

/// One code example under a coding rule.
#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RuleExampleRecord {
    pub id: i64,
    pub coding_rule_id: i64,
    pub kind: ExampleKind,
    pub language: String,
    pub snippet: String,
    pub sequence_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChildOf for RuleExampleRecord {
    fn parent_id(&self) -> i64 {
        self.coding_rule_id
    }
}

impl ChildEntity for RuleExampleRecord {
    const TABLE: &'static str = "rule_examples";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "coding_rule_id",
        "kind",
        "language",
        "snippet",
        "sequence_order",
        "created_at",
        "updated_at",
    ];
    const PARENT_COLUMN: &'static str = "coding_rule_id";
}

/// Input for creating a rule example.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRuleExample {
    pub coding_rule_id: i64,
    pub kind: ExampleKind,
    pub language: String,
    pub snippet: String,
    #[serde(default)]
    pub sequence_order: i64,
}

pub struct RuleExampleRepository {
    pool: SqlitePool,
}

impl RuleExampleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: CreateRuleExample) -> Result<i64> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO rule_examples (coding_rule_id, kind, language, snippet, sequence_order, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(input.coding_rule_id)
        .bind(input.kind.as_str())
        .bind(&input.language)
        .bind(&input.snippet)
        .bind(input.sequence_order)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// All live examples for a page of rules, keyed by rule id.
    pub async fn for_rules(
        &self,
        rule_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<RuleExampleRecord>>> {
        let source = ChildTable::<RuleExampleRecord>::new(&self.pool);
        Ok(load_children(&source, rule_ids).await?)
    }
}
