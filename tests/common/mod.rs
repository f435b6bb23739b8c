//! Shared helpers for integration tests: an in-memory database plus
//! seeding for the architecture → layer → module → convention → rule chain.

use rulebook::db::{
    CreateArchitecture, CreateChecklistItem, CreateCodingRule, CreateConvention, CreateLayer,
    CreateModule, CreateRuleExample, CreateZeroTolerance, Database, ExampleKind, RuleCategory,
    RuleSeverity,
};
use sqlx::sqlite::SqlitePoolOptions;

/// Fresh in-memory database with the schema applied.
///
/// One connection max: every connection to `sqlite::memory:` is its own
/// database, so the pool must not open a second one.
pub async fn test_db() -> Database {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    let db = Database::new(pool);
    db.init_schema().await.expect("schema init");
    db
}

/// Seed the chain above coding rules; returns the convention id.
pub async fn seed_convention(db: &Database) -> i64 {
    let architecture = db
        .architectures()
        .create(CreateArchitecture {
            name: "layered".into(),
            description: "classic layered architecture".into(),
        })
        .await
        .expect("architecture");
    let layer = db
        .layers()
        .create(CreateLayer {
            architecture_id: architecture.id,
            name: "domain".into(),
            description: String::new(),
            sequence_order: 1,
        })
        .await
        .expect("layer");
    let module = db
        .modules()
        .create(CreateModule {
            layer_id: layer.id,
            name: "orders".into(),
            description: String::new(),
            sequence_order: 1,
        })
        .await
        .expect("module");
    db.conventions()
        .create(CreateConvention {
            module_id: module.id,
            title: "service conventions".into(),
            category: RuleCategory::Structure,
            content: String::new(),
            active: true,
        })
        .await
        .expect("convention")
        .id
}

/// Seed `count` coding rules under one convention; returns ids in insert order.
pub async fn seed_rules(db: &Database, convention_id: i64, count: usize) -> Vec<i64> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let rule = db
            .coding_rules()
            .create(CreateCodingRule {
                convention_id,
                title: format!("rule {i}"),
                category: RuleCategory::Naming,
                severity: RuleSeverity::Warning,
                content: format!("content {i}"),
                active: true,
            })
            .await
            .expect("rule");
        ids.push(rule.id);
    }
    ids
}

pub async fn seed_checklist_item(db: &Database, rule_id: i64, order: i64, content: &str) -> i64 {
    db.checklist_items()
        .create(CreateChecklistItem {
            coding_rule_id: rule_id,
            content: content.into(),
            sequence_order: order,
        })
        .await
        .expect("checklist item")
}

pub async fn seed_zero_tolerance(db: &Database, rule_id: i64, order: i64, content: &str) -> i64 {
    db.zero_tolerance()
        .create(CreateZeroTolerance {
            coding_rule_id: rule_id,
            content: content.into(),
            severity: RuleSeverity::Blocker,
            sequence_order: order,
        })
        .await
        .expect("zero tolerance rule")
}

pub async fn seed_example(db: &Database, rule_id: i64, order: i64, snippet: &str) -> i64 {
    db.rule_examples()
        .create(CreateRuleExample {
            coding_rule_id: rule_id,
            kind: ExampleKind::Good,
            language: "rust".into(),
            snippet: snippet.into(),
            sequence_order: order,
        })
        .await
        .expect("rule example")
}
