//! Integration tests for the slice pagination protocol against a real
//! (in-memory) database: page bounds, lookahead-driven hasNext, cursor
//! monotonicity, and filter behavior.

mod common;

use pretty_assertions::assert_eq;

use rulebook::db::{CodingRuleCriteria, CodingRuleSearchField, RuleCategory, RuleSeverity};
use rulebook::slice::CursorPageRequest;

use common::{seed_convention, seed_rules, test_db};

#[tokio::test]
async fn first_page_of_25_rows_at_size_20_has_lookahead_trimmed() {
    let db = test_db().await;
    let convention = seed_convention(&db).await;
    seed_rules(&db, convention, 25).await;

    let criteria = CodingRuleCriteria::new(CursorPageRequest::first(20).unwrap());
    let page = db.coding_rules().search(&criteria).await.unwrap();

    assert_eq!(page.content.len(), 20);
    assert!(page.has_next);
    assert_eq!(page.next_cursor, Some(page.content[19].id));
}

#[tokio::test]
async fn exactly_size_rows_means_no_next_page() {
    let db = test_db().await;
    let convention = seed_convention(&db).await;
    seed_rules(&db, convention, 20).await;

    let criteria = CodingRuleCriteria::new(CursorPageRequest::first(20).unwrap());
    let page = db.coding_rules().search(&criteria).await.unwrap();

    assert_eq!(page.content.len(), 20);
    assert!(!page.has_next);
    assert_eq!(page.next_cursor, None);
}

#[tokio::test]
async fn content_is_ordered_by_id_descending() {
    let db = test_db().await;
    let convention = seed_convention(&db).await;
    seed_rules(&db, convention, 10).await;

    let criteria = CodingRuleCriteria::new(CursorPageRequest::first(20).unwrap());
    let page = db.coding_rules().search(&criteria).await.unwrap();

    let ids: Vec<i64> = page.content.iter().map(|r| r.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(ids, sorted);
}

#[tokio::test]
async fn cursor_returns_only_rows_strictly_below_it() {
    let db = test_db().await;
    let convention = seed_convention(&db).await;
    let ids = seed_rules(&db, convention, 30).await;
    let cursor = ids[15];

    let criteria = CodingRuleCriteria::new(CursorPageRequest::after(cursor, 20).unwrap());
    let page = db.coding_rules().search(&criteria).await.unwrap();

    assert!(!page.content.is_empty());
    assert!(page.content.iter().all(|r| r.id < cursor));
}

#[tokio::test]
async fn pages_chain_without_overlap_or_gaps() {
    let db = test_db().await;
    let convention = seed_convention(&db).await;
    let mut expected = seed_rules(&db, convention, 45).await;
    expected.sort_unstable_by(|a, b| b.cmp(a));

    let mut collected = Vec::new();
    let mut cursor: Option<i64> = None;
    loop {
        let page = match cursor {
            None => CursorPageRequest::first(20).unwrap(),
            Some(c) => CursorPageRequest::after(c, 20).unwrap(),
        };
        let slice = db
            .coding_rules()
            .search(&CodingRuleCriteria::new(page))
            .await
            .unwrap();

        // every item sits strictly below the previous page's cursor
        if let Some(c) = cursor {
            assert!(slice.content.iter().all(|r| r.id < c));
        }
        collected.extend(slice.content.iter().map(|r| r.id));

        match slice.next_cursor {
            Some(next) if slice.has_next => cursor = Some(next),
            _ => break,
        }
    }

    assert_eq!(collected, expected);
}

#[tokio::test]
async fn first_page_is_idempotent_without_writes() {
    let db = test_db().await;
    let convention = seed_convention(&db).await;
    seed_rules(&db, convention, 12).await;

    let a = db
        .coding_rules()
        .search(&CodingRuleCriteria::new(CursorPageRequest::first(5).unwrap()))
        .await
        .unwrap();
    let b = db
        .coding_rules()
        .search(&CodingRuleCriteria::new(CursorPageRequest::first(5).unwrap()))
        .await
        .unwrap();

    assert_eq!(a, b);
}

#[tokio::test]
async fn empty_and_absent_id_filters_behave_identically() {
    let db = test_db().await;
    let convention = seed_convention(&db).await;
    seed_rules(&db, convention, 8).await;

    let page = CursorPageRequest::first(20).unwrap();
    let absent = db
        .coding_rules()
        .search(&CodingRuleCriteria::new(page).with_ids(None))
        .await
        .unwrap();
    let empty = db
        .coding_rules()
        .search(&CodingRuleCriteria::new(page).with_ids(Some(Vec::new())))
        .await
        .unwrap();

    assert_eq!(absent, empty);
    assert_eq!(absent.content.len(), 8);
}

#[tokio::test]
async fn search_word_without_field_applies_no_predicate() {
    let db = test_db().await;
    let convention = seed_convention(&db).await;
    seed_rules(&db, convention, 6).await;

    let page = CursorPageRequest::first(20).unwrap();
    let unfiltered = db
        .coding_rules()
        .search(&CodingRuleCriteria::new(page))
        .await
        .unwrap();
    let lone_word = db
        .coding_rules()
        .search(&CodingRuleCriteria::new(page).with_search(None, Some("LOMBOK")))
        .await
        .unwrap();

    assert_eq!(unfiltered, lone_word);
}

#[tokio::test]
async fn two_sided_search_filters_by_the_chosen_column() {
    let db = test_db().await;
    let convention = seed_convention(&db).await;
    seed_rules(&db, convention, 5).await;

    let page = CursorPageRequest::first(20).unwrap();
    let hits = db
        .coding_rules()
        .search(
            &CodingRuleCriteria::new(page)
                .with_search(Some(CodingRuleSearchField::Title), Some("rule 3")),
        )
        .await
        .unwrap();

    assert_eq!(hits.content.len(), 1);
    assert_eq!(hits.content[0].title, "rule 3");
}

#[tokio::test]
async fn category_and_severity_filters_combine_with_and() {
    let db = test_db().await;
    let convention = seed_convention(&db).await;
    seed_rules(&db, convention, 4).await;

    let page = CursorPageRequest::first(20).unwrap();

    // Seeded rules are all naming/warning
    let matching = db
        .coding_rules()
        .search(
            &CodingRuleCriteria::new(page)
                .with_categories(Some(vec![RuleCategory::Naming]))
                .with_severities(Some(vec![RuleSeverity::Warning])),
        )
        .await
        .unwrap();
    assert_eq!(matching.content.len(), 4);

    let mismatched = db
        .coding_rules()
        .search(
            &CodingRuleCriteria::new(page)
                .with_categories(Some(vec![RuleCategory::Naming]))
                .with_severities(Some(vec![RuleSeverity::Blocker])),
        )
        .await
        .unwrap();
    assert!(mismatched.content.is_empty());
}

#[tokio::test]
async fn soft_deleted_rules_never_appear_in_a_slice() {
    let db = test_db().await;
    let convention = seed_convention(&db).await;
    let ids = seed_rules(&db, convention, 3).await;

    assert!(db.coding_rules().soft_delete(ids[1]).await.unwrap());

    let page = db
        .coding_rules()
        .search(&CodingRuleCriteria::new(CursorPageRequest::first(20).unwrap()))
        .await
        .unwrap();

    assert_eq!(page.content.len(), 2);
    assert!(page.content.iter().all(|r| r.id != ids[1]));
}
