//! Architecture slice search endpoint.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::AppState;
use crate::db::architectures::{
    ArchitectureCriteria, ArchitectureRecord, ArchitectureSearchField,
};
use crate::slice::CursorPageRequest;
use crate::slice::criteria::parse_id_list;

use super::{ApiError, SliceResponse};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureSearchParams {
    pub cursor: Option<String>,
    pub size: Option<i64>,
    pub ids: Option<String>,
    pub search_field: Option<String>,
    pub search_word: Option<String>,
}

impl ArchitectureSearchParams {
    fn into_criteria(self, default_size: i64) -> Result<ArchitectureCriteria, ApiError> {
        let page =
            CursorPageRequest::from_params(self.cursor.as_deref(), self.size, default_size)?;
        let field = self
            .search_field
            .as_deref()
            .map(ArchitectureSearchField::parse)
            .transpose()?;
        Ok(ArchitectureCriteria::new(page)
            .with_ids(parse_id_list("ids", self.ids.as_deref())?)
            .with_search(field, self.search_word.as_deref()))
    }
}

/// Slice search over architectures.
async fn search_architectures(
    State(state): State<AppState>,
    Query(params): Query<ArchitectureSearchParams>,
) -> Result<Json<SliceResponse<ArchitectureRecord>>, ApiError> {
    let criteria = params.into_criteria(state.config.default_page_size)?;
    let page = state.db.architectures().search(&criteria).await?;
    Ok(Json(page.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/architectures", get(search_architectures))
}
