//! Convention slice search endpoint.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::AppState;
use crate::db::conventions::{
    ConventionCriteria, ConventionRecord, ConventionSearchField, RuleCategory,
};
use crate::slice::CursorPageRequest;
use crate::slice::criteria::{parse_id_list, parse_list};

use super::{ApiError, SliceResponse};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConventionSearchParams {
    pub cursor: Option<String>,
    pub size: Option<i64>,
    pub ids: Option<String>,
    pub module_ids: Option<String>,
    pub categories: Option<String>,
    pub search_field: Option<String>,
    pub search_word: Option<String>,
    pub active: Option<bool>,
}

impl ConventionSearchParams {
    fn into_criteria(self, default_size: i64) -> Result<ConventionCriteria, ApiError> {
        let page =
            CursorPageRequest::from_params(self.cursor.as_deref(), self.size, default_size)?;
        let field = self
            .search_field
            .as_deref()
            .map(ConventionSearchField::parse)
            .transpose()?;
        Ok(ConventionCriteria::new(page)
            .with_ids(parse_id_list("ids", self.ids.as_deref())?)
            .with_module_ids(parse_id_list("moduleIds", self.module_ids.as_deref())?)
            .with_categories(parse_list(
                "categories",
                self.categories.as_deref(),
                RuleCategory::parse,
            )?)
            .with_search(field, self.search_word.as_deref())
            .with_active(self.active))
    }
}

/// Slice search over conventions.
async fn search_conventions(
    State(state): State<AppState>,
    Query(params): Query<ConventionSearchParams>,
) -> Result<Json<SliceResponse<ConventionRecord>>, ApiError> {
    let criteria = params.into_criteria(state.config.default_page_size)?;
    let page = state.db.conventions().search(&criteria).await?;
    Ok(Json(page.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/conventions", get(search_conventions))
}
