//! Integration tests for hierarchical read composition: batch association
//! loading for the rule tree and joined-row flattening for the layer tree.

mod common;

use pretty_assertions::assert_eq;

use rulebook::db::{
    CreateArchitecture, CreateConvention, CreateLayer, CreateModule, RuleCategory,
};

use common::{
    seed_checklist_item, seed_convention, seed_example, seed_rules, seed_zero_tolerance, test_db,
};

#[tokio::test]
async fn batch_loader_keys_every_requested_rule() {
    let db = test_db().await;
    let convention = seed_convention(&db).await;
    let rules = seed_rules(&db, convention, 3).await;

    seed_checklist_item(&db, rules[0], 1, "uses constructor injection").await;
    seed_checklist_item(&db, rules[0], 2, "no field injection").await;
    // rules[1] deliberately has no checklist items
    seed_checklist_item(&db, rules[2], 1, "one public method per use case").await;

    let grouped = db.checklist_items().for_rules(&rules).await.unwrap();

    assert_eq!(grouped.len(), 3);
    assert_eq!(grouped[&rules[0]].len(), 2);
    assert!(grouped[&rules[1]].is_empty());
    assert_eq!(grouped[&rules[2]].len(), 1);
}

#[tokio::test]
async fn batch_loader_orders_children_by_sequence() {
    let db = test_db().await;
    let convention = seed_convention(&db).await;
    let rules = seed_rules(&db, convention, 1).await;

    // Inserted out of order on purpose
    seed_checklist_item(&db, rules[0], 3, "third").await;
    seed_checklist_item(&db, rules[0], 1, "first").await;
    seed_checklist_item(&db, rules[0], 2, "second").await;

    let grouped = db.checklist_items().for_rules(&rules).await.unwrap();
    let contents: Vec<&str> = grouped[&rules[0]]
        .iter()
        .map(|i| i.content.as_str())
        .collect();

    assert_eq!(contents, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn empty_rule_page_loads_no_children() {
    let db = test_db().await;

    let grouped = db.checklist_items().for_rules(&[]).await.unwrap();

    assert!(grouped.is_empty());
}

#[tokio::test]
async fn all_three_child_families_load_for_one_page() {
    let db = test_db().await;
    let convention = seed_convention(&db).await;
    let rules = seed_rules(&db, convention, 2).await;

    seed_checklist_item(&db, rules[0], 1, "check").await;
    seed_zero_tolerance(&db, rules[0], 1, "never swallow exceptions").await;
    seed_example(&db, rules[1], 1, "fn good() {}").await;

    let checklist = db.checklist_items().for_rules(&rules).await.unwrap();
    let zero_tolerance = db.zero_tolerance().for_rules(&rules).await.unwrap();
    let examples = db.rule_examples().for_rules(&rules).await.unwrap();

    assert_eq!(checklist[&rules[0]].len(), 1);
    assert!(checklist[&rules[1]].is_empty());
    assert_eq!(zero_tolerance[&rules[0]].len(), 1);
    assert!(examples[&rules[0]].is_empty());
    assert_eq!(examples[&rules[1]].len(), 1);
}

#[tokio::test]
async fn joined_module_fetch_keeps_conventionless_modules() {
    let db = test_db().await;
    let architecture = db
        .architectures()
        .create(CreateArchitecture {
            name: "hexagonal".into(),
            description: String::new(),
        })
        .await
        .unwrap();
    let layer = db
        .layers()
        .create(CreateLayer {
            architecture_id: architecture.id,
            name: "application".into(),
            description: String::new(),
            sequence_order: 1,
        })
        .await
        .unwrap();

    let with_conventions = db
        .modules()
        .create(CreateModule {
            layer_id: layer.id,
            name: "billing".into(),
            description: String::new(),
            sequence_order: 1,
        })
        .await
        .unwrap();
    let without_conventions = db
        .modules()
        .create(CreateModule {
            layer_id: layer.id,
            name: "shipping".into(),
            description: String::new(),
            sequence_order: 2,
        })
        .await
        .unwrap();

    db.conventions()
        .create(CreateConvention {
            module_id: with_conventions.id,
            title: "billing naming".into(),
            category: RuleCategory::Naming,
            content: String::new(),
            active: true,
        })
        .await
        .unwrap();
    db.conventions()
        .create(CreateConvention {
            module_id: with_conventions.id,
            title: "billing logging".into(),
            category: RuleCategory::Logging,
            content: String::new(),
            active: true,
        })
        .await
        .unwrap();

    let grouped = db
        .modules()
        .with_conventions_for_layers(&[layer.id])
        .await
        .unwrap();

    // Both modules present, in sequence order; the outer join's null rows
    // became an empty convention list rather than dropping the module
    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped[0].parent.id, with_conventions.id);
    assert_eq!(grouped[0].children.len(), 2);
    assert_eq!(grouped[1].parent.id, without_conventions.id);
    assert!(grouped[1].children.is_empty());
}

#[tokio::test]
async fn joined_module_fetch_short_circuits_on_no_layers() {
    let db = test_db().await;

    let grouped = db.modules().with_conventions_for_layers(&[]).await.unwrap();

    assert!(grouped.is_empty());
}
