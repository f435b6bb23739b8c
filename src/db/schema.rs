//! Idempotent schema initialization.
//!
//! Run at startup (and by tests against in-memory pools). Every table gets
//! an `i64` auto-increment `id`, a soft-delete flag, and timestamps; child
//! tables carry a `sequence_order` for their natural in-parent order.

use sqlx::SqlitePool;
use tracing::debug;

const TABLES: &[(&str, &str)] = &[
    (
        "architectures",
        "CREATE TABLE IF NOT EXISTS architectures (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "layers",
        "CREATE TABLE IF NOT EXISTS layers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            architecture_id INTEGER NOT NULL REFERENCES architectures(id),
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            sequence_order INTEGER NOT NULL DEFAULT 0,
            deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "modules",
        "CREATE TABLE IF NOT EXISTS modules (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            layer_id INTEGER NOT NULL REFERENCES layers(id),
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            sequence_order INTEGER NOT NULL DEFAULT 0,
            deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "conventions",
        "CREATE TABLE IF NOT EXISTS conventions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            module_id INTEGER NOT NULL REFERENCES modules(id),
            title TEXT NOT NULL,
            category TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            active INTEGER NOT NULL DEFAULT 1,
            deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "coding_rules",
        "CREATE TABLE IF NOT EXISTS coding_rules (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            convention_id INTEGER NOT NULL REFERENCES conventions(id),
            title TEXT NOT NULL,
            category TEXT NOT NULL,
            severity TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            active INTEGER NOT NULL DEFAULT 1,
            deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "checklist_items",
        "CREATE TABLE IF NOT EXISTS checklist_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            coding_rule_id INTEGER NOT NULL REFERENCES coding_rules(id),
            content TEXT NOT NULL,
            sequence_order INTEGER NOT NULL DEFAULT 0,
            deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "zero_tolerance_rules",
        "CREATE TABLE IF NOT EXISTS zero_tolerance_rules (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            coding_rule_id INTEGER NOT NULL REFERENCES coding_rules(id),
            content TEXT NOT NULL,
            severity TEXT NOT NULL,
            sequence_order INTEGER NOT NULL DEFAULT 0,
            deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "rule_examples",
        "CREATE TABLE IF NOT EXISTS rule_examples (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            coding_rule_id INTEGER NOT NULL REFERENCES coding_rules(id),
            kind TEXT NOT NULL,
            language TEXT NOT NULL,
            snippet TEXT NOT NULL,
            sequence_order INTEGER NOT NULL DEFAULT 0,
            deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "templates",
        "CREATE TABLE IF NOT EXISTS templates (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_layers_architecture ON layers(architecture_id)",
    "CREATE INDEX IF NOT EXISTS idx_modules_layer ON modules(layer_id)",
    "CREATE INDEX IF NOT EXISTS idx_conventions_module ON conventions(module_id)",
    "CREATE INDEX IF NOT EXISTS idx_coding_rules_convention ON coding_rules(convention_id)",
    "CREATE INDEX IF NOT EXISTS idx_checklist_items_rule ON checklist_items(coding_rule_id)",
    "CREATE INDEX IF NOT EXISTS idx_zero_tolerance_rule ON zero_tolerance_rules(coding_rule_id)",
    "CREATE INDEX IF NOT EXISTS idx_rule_examples_rule ON rule_examples(coding_rule_id)",
];

/// Create any missing tables and indexes.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for (name, ddl) in TABLES {
        debug!(table = name, "ensuring table exists");
        sqlx::query(ddl).execute(pool).await?;
    }
    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}
