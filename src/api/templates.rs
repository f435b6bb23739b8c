//! Template endpoints: slice search and CRUD.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::AppState;
use crate::db::templates::{
    CreateTemplate, TemplateCriteria, TemplateKind, TemplateRecord, TemplateSearchField,
    UpdateTemplate,
};
use crate::slice::CursorPageRequest;
use crate::slice::criteria::{parse_id_list, parse_list};

use super::{ApiError, SliceResponse};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSearchParams {
    pub cursor: Option<String>,
    pub size: Option<i64>,
    pub ids: Option<String>,
    pub kinds: Option<String>,
    pub search_field: Option<String>,
    pub search_word: Option<String>,
}

impl TemplateSearchParams {
    fn into_criteria(self, default_size: i64) -> Result<TemplateCriteria, ApiError> {
        let page =
            CursorPageRequest::from_params(self.cursor.as_deref(), self.size, default_size)?;
        let field = self
            .search_field
            .as_deref()
            .map(TemplateSearchField::parse)
            .transpose()?;
        Ok(TemplateCriteria::new(page)
            .with_ids(parse_id_list("ids", self.ids.as_deref())?)
            .with_kinds(parse_list(
                "kinds",
                self.kinds.as_deref(),
                TemplateKind::parse,
            )?)
            .with_search(field, self.search_word.as_deref()))
    }
}

/// Slice search over templates.
async fn search_templates(
    State(state): State<AppState>,
    Query(params): Query<TemplateSearchParams>,
) -> Result<Json<SliceResponse<TemplateRecord>>, ApiError> {
    let criteria = params.into_criteria(state.config.default_page_size)?;
    let page = state.db.templates().search(&criteria).await?;
    Ok(Json(page.into()))
}

async fn create_template(
    State(state): State<AppState>,
    Json(input): Json<CreateTemplate>,
) -> Result<(StatusCode, Json<TemplateRecord>), ApiError> {
    let record = state.db.templates().create(input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TemplateRecord>, ApiError> {
    let record = state
        .db
        .templates()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("template {id} not found")))?;
    Ok(Json(record))
}

async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateTemplate>,
) -> Result<Json<TemplateRecord>, ApiError> {
    let record = state
        .db
        .templates()
        .update(id, input)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("template {id} not found")))?;
    Ok(Json(record))
}

async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.db.templates().soft_delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("template {id} not found")))
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/templates", get(search_templates).post(create_template))
        .route(
            "/templates/{id}",
            get(get_template).put(update_template).delete(delete_template),
        )
}
