//! Checklist items attached to coding rules.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::slice::{ChildEntity, ChildOf, ChildTable, load_children};

/// One review-checklist entry under a coding rule.
#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItemRecord {
    pub id: i64,
    pub coding_rule_id: i64,
    pub content: String,
    pub sequence_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChildOf for ChecklistItemRecord {
    fn parent_id(&self) -> i64 {
        self.coding_rule_id
    }
}

impl ChildEntity for ChecklistItemRecord {
    const TABLE: &'static str = "checklist_items";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "coding_rule_id",
        "content",
        "sequence_order",
        "created_at",
        "updated_at",
    ];
    const PARENT_COLUMN: &'static str = "coding_rule_id";
}

/// Input for creating a checklist item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChecklistItem {
    pub coding_rule_id: i64,
    pub content: String,
    #[serde(default)]
    pub sequence_order: i64,
}

pub struct ChecklistItemRepository {
    pool: SqlitePool,
}

impl ChecklistItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: CreateChecklistItem) -> Result<i64> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO checklist_items (coding_rule_id, content, sequence_order, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(input.coding_rule_id)
        .bind(&input.content)
        .bind(input.sequence_order)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// All live items for a page of rules, one query, keyed by rule id.
    pub async fn for_rules(
        &self,
        rule_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<ChecklistItemRecord>>> {
        let source = ChildTable::<ChecklistItemRecord>::new(&self.pool);
        Ok(load_children(&source, rule_ids).await?)
    }
}
