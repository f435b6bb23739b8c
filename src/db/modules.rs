//! Module records, plus the joined module+convention fetch used by the
//! layer tree endpoint.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::db::conventions::{ConventionRecord, RuleCategory};
use crate::slice::{Grouped, SliceEntity, group_by_preserving_order};

#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRecord {
    pub id: i64,
    pub layer_id: i64,
    pub name: String,
    pub description: String,
    pub sequence_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SliceEntity for ModuleRecord {
    const TABLE: &'static str = "modules";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "layer_id",
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

/// Input for creating a module.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateModule {
    pub layer_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sequence_order: i64,
}

/// One flat row of the module LEFT JOIN convention query. The convention
/// side is `None` on the outer join's "no match" rows.
struct ModuleConventionRow {
    module: ModuleRecord,
    convention: Option<ConventionRecord>,
}

impl ModuleConventionRow {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let module = ModuleRecord {
            id: row.try_get("m_id")?,
            layer_id: row.try_get("m_layer_id")?,
            name: row.try_get("m_name")?,
            description: row.try_get("m_description")?,
            sequence_order: row.try_get("m_sequence_order")?,
            created_at: row.try_get("m_created_at")?,
            updated_at: row.try_get("m_updated_at")?,
        };
        let convention = match row.try_get::<Option<i64>, _>("c_id")? {
            Some(id) => Some(ConventionRecord {
                id,
                module_id: row.try_get("c_module_id")?,
                title: row.try_get("c_title")?,
                category: row.try_get::<RuleCategory, _>("c_category")?,
                content: row.try_get("c_content")?,
                active: row.try_get("c_active")?,
                created_at: row.try_get("c_created_at")?,
                updated_at: row.try_get("c_updated_at")?,
            }),
            None => None,
        };
        Ok(Self { module, convention })
    }
}

pub struct ModuleRepository {
    pool: SqlitePool,
}

impl ModuleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: CreateModule) -> Result<ModuleRecord> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO modules (layer_id, name, description, sequence_order, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(input.layer_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.sequence_order)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let record = sqlx::query_as::<_, ModuleRecord>(&format!(
            "{} WHERE id = ?",
            ModuleRecord::select_sql()
        ))
        .bind(result.last_insert_rowid())
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    /// Modules for a set of layers with their conventions, from one flat
    /// LEFT JOIN query regrouped in memory.
    ///
    /// Modules with no live conventions still appear, with an empty
    /// convention list. Module order follows `(layer, sequence_order)`.
    pub async fn with_conventions_for_layers(
        &self,
        layer_ids: &[i64],
    ) -> Result<Vec<Grouped<ModuleRecord, ConventionRecord>>> {
        if layer_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; layer_ids.len()].join(", ");
        let sql = format!(
            "SELECT m.id AS m_id, m.layer_id AS m_layer_id, m.name AS m_name, \
                    m.description AS m_description, m.sequence_order AS m_sequence_order, \
                    m.created_at AS m_created_at, m.updated_at AS m_updated_at, \
                    c.id AS c_id, c.module_id AS c_module_id, c.title AS c_title, \
                    c.category AS c_category, c.content AS c_content, c.active AS c_active, \
                    c.created_at AS c_created_at, c.updated_at AS c_updated_at \
             FROM modules m \
             LEFT JOIN conventions c ON c.module_id = m.id AND c.deleted = 0 \
             WHERE m.layer_id IN ({placeholders}) AND m.deleted = 0 \
             ORDER BY m.layer_id, m.sequence_order, m.id, c.id"
        );
        tracing::debug!(sql = %sql, layer_count = layer_ids.len(), "fetching module tree rows");

        let mut query = sqlx::query(&sql);
        for id in layer_ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        let flat = rows
            .iter()
            .map(ModuleConventionRow::from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(group_by_preserving_order(
            flat,
            |row| row.module.id,
            |row| row.module.clone(),
            |row| row.convention.map(|c| (c.id, c)),
        ))
    }
}
