//! Zero-tolerance rules attached to coding rules.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::coding_rules::RuleSeverity;
use crate::slice::{ChildEntity, ChildOf, ChildTable, load_children};

/// A violation that always blocks, regardless of the parent rule's severity.
#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ZeroToleranceRecord {
    pub id: i64,
    pub coding_rule_id: i64,
    pub content: String,
    pub severity: RuleSeverity,
    pub sequence_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChildOf for ZeroToleranceRecord {
    fn parent_id(&self) -> i64 {
        self.coding_rule_id
    }
}

impl ChildEntity for ZeroToleranceRecord {
    const TABLE: &'static str = "zero_tolerance_rules";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "coding_rule_id",
        "content",
        "severity",
        "sequence_order",
        "created_at",
        "updated_at",
    ];
    const PARENT_COLUMN: &'static str = "coding_rule_id";
}

/// Input for creating a zero-tolerance rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateZeroTolerance {
    pub coding_rule_id: i64,
    pub content: String,
    pub severity: RuleSeverity,
    #[serde(default)]
    pub sequence_order: i64,
}

pub struct ZeroToleranceRepository {
    pool: SqlitePool,
}

impl ZeroToleranceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: CreateZeroTolerance) -> Result<i64> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO zero_tolerance_rules (coding_rule_id, content, severity, sequence_order, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(input.coding_rule_id)
        .bind(&input.content)
        .bind(input.severity.as_str())
        .bind(input.sequence_order)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// All live zero-tolerance rules for a page of rules, keyed by rule id.
    pub async fn for_rules(
        &self,
        rule_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<ZeroToleranceRecord>>> {
        let source = ChildTable::<ZeroToleranceRecord>::new(&self.pool);
        Ok(load_children(&source, rule_ids).await?)
    }
}
