//! Coding rule endpoints: slice search, tree assembly, and CRUD.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::db::checklist_items::ChecklistItemRecord;
use crate::db::coding_rules::{
    CodingRuleCriteria, CodingRuleRecord, CodingRuleSearchField, CreateCodingRule, RuleSeverity,
    UpdateCodingRule,
};
use crate::db::conventions::RuleCategory;
use crate::db::rule_examples::RuleExampleRecord;
use crate::db::zero_tolerance::ZeroToleranceRecord;
use crate::slice::CursorPageRequest;
use crate::slice::criteria::{parse_id_list, parse_list};

use super::{ApiError, SliceResponse};

/// Query parameters shared by the search and tree endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSearchParams {
    pub cursor: Option<String>,
    pub size: Option<i64>,
    /// Comma-separated id list
    pub ids: Option<String>,
    /// Comma-separated id list
    pub convention_ids: Option<String>,
    /// Comma-separated category list
    pub categories: Option<String>,
    /// Comma-separated severity list
    pub severities: Option<String>,
    pub search_field: Option<String>,
    pub search_word: Option<String>,
    pub active: Option<bool>,
}

impl RuleSearchParams {
    /// Build validated criteria; any malformed input fails here, before a
    /// query runs.
    fn into_criteria(self, default_size: i64) -> Result<CodingRuleCriteria, ApiError> {
        let page =
            CursorPageRequest::from_params(self.cursor.as_deref(), self.size, default_size)?;
        let field = self
            .search_field
            .as_deref()
            .map(CodingRuleSearchField::parse)
            .transpose()?;
        Ok(CodingRuleCriteria::new(page)
            .with_ids(parse_id_list("ids", self.ids.as_deref())?)
            .with_convention_ids(parse_id_list(
                "conventionIds",
                self.convention_ids.as_deref(),
            )?)
            .with_categories(parse_list(
                "categories",
                self.categories.as_deref(),
                RuleCategory::parse,
            )?)
            .with_severities(parse_list(
                "severities",
                self.severities.as_deref(),
                RuleSeverity::parse,
            )?)
            .with_search(field, self.search_word.as_deref())
            .with_active(self.active))
    }
}

/// A coding rule with all of its children, as served by the tree endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingRuleTree {
    #[serde(flatten)]
    pub rule: CodingRuleRecord,
    pub checklist_items: Vec<ChecklistItemRecord>,
    pub zero_tolerance_rules: Vec<ZeroToleranceRecord>,
    pub examples: Vec<RuleExampleRecord>,
}

/// Slice search over coding rules.
async fn search_rules(
    State(state): State<AppState>,
    Query(params): Query<RuleSearchParams>,
) -> Result<Json<SliceResponse<CodingRuleRecord>>, ApiError> {
    let criteria = params.into_criteria(state.config.default_page_size)?;
    let page = state.db.coding_rules().search(&criteria).await?;
    Ok(Json(page.into()))
}

/// Slice search over coding rules with children batch-loaded per page.
///
/// Children are fetched with one query per child table for the whole page,
/// never per rule; a rule with no children appears with empty lists.
async fn rule_tree(
    State(state): State<AppState>,
    Query(params): Query<RuleSearchParams>,
) -> Result<Json<SliceResponse<CodingRuleTree>>, ApiError> {
    let criteria = params.into_criteria(state.config.default_page_size)?;
    let page = state.db.coding_rules().search(&criteria).await?;

    let rule_ids: Vec<i64> = page.content.iter().map(|r| r.id).collect();
    let mut checklist = state.db.checklist_items().for_rules(&rule_ids).await?;
    let mut zero_tolerance = state.db.zero_tolerance().for_rules(&rule_ids).await?;
    let mut examples = state.db.rule_examples().for_rules(&rule_ids).await?;

    let tree = page.map(|rule| {
        let id = rule.id;
        CodingRuleTree {
            rule,
            checklist_items: checklist.remove(&id).unwrap_or_default(),
            zero_tolerance_rules: zero_tolerance.remove(&id).unwrap_or_default(),
            examples: examples.remove(&id).unwrap_or_default(),
        }
    });
    Ok(Json(tree.into()))
}

async fn create_rule(
    State(state): State<AppState>,
    Json(input): Json<CreateCodingRule>,
) -> Result<(StatusCode, Json<CodingRuleRecord>), ApiError> {
    let record = state.db.coding_rules().create(input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CodingRuleRecord>, ApiError> {
    let record = state
        .db
        .coding_rules()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("coding rule {id} not found")))?;
    Ok(Json(record))
}

async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateCodingRule>,
) -> Result<Json<CodingRuleRecord>, ApiError> {
    let record = state
        .db
        .coding_rules()
        .update(id, input)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("coding rule {id} not found")))?;
    Ok(Json(record))
}

async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.db.coding_rules().soft_delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("coding rule {id} not found")))
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/coding-rules", get(search_rules).post(create_rule))
        .route("/coding-rules/tree", get(rule_tree))
        .route(
            "/coding-rules/{id}",
            get(get_rule).put(update_rule).delete(delete_rule),
        )
}
