//! Layer endpoints: slice search and the three-level layer tree.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::db::conventions::ConventionRecord;
use crate::db::layers::{LayerCriteria, LayerRecord, LayerSearchField};
use crate::db::modules::ModuleRecord;
use crate::slice::CursorPageRequest;
use crate::slice::criteria::parse_id_list;

use super::{ApiError, SliceResponse};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSearchParams {
    pub cursor: Option<String>,
    pub size: Option<i64>,
    pub ids: Option<String>,
    pub architecture_ids: Option<String>,
    pub search_field: Option<String>,
    pub search_word: Option<String>,
}

impl LayerSearchParams {
    fn into_criteria(self, default_size: i64) -> Result<LayerCriteria, ApiError> {
        let page =
            CursorPageRequest::from_params(self.cursor.as_deref(), self.size, default_size)?;
        let field = self
            .search_field
            .as_deref()
            .map(LayerSearchField::parse)
            .transpose()?;
        Ok(LayerCriteria::new(page)
            .with_ids(parse_id_list("ids", self.ids.as_deref())?)
            .with_architecture_ids(parse_id_list(
                "architectureIds",
                self.architecture_ids.as_deref(),
            )?)
            .with_search(field, self.search_word.as_deref()))
    }
}

/// A module with its conventions, nested under a layer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleTreeNode {
    #[serde(flatten)]
    pub module: ModuleRecord,
    pub conventions: Vec<ConventionRecord>,
}

/// One layer of the tree endpoint's response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerTreeNode {
    #[serde(flatten)]
    pub layer: LayerRecord,
    pub modules: Vec<ModuleTreeNode>,
}

/// Slice search over layers.
async fn search_layers(
    State(state): State<AppState>,
    Query(params): Query<LayerSearchParams>,
) -> Result<Json<SliceResponse<LayerRecord>>, ApiError> {
    let criteria = params.into_criteria(state.config.default_page_size)?;
    let page = state.db.layers().search(&criteria).await?;
    Ok(Json(page.into()))
}

/// Layer → module → convention tree for one slice of layers.
///
/// The driving slice paginates layers; modules and conventions come from a
/// single flat joined query regrouped in memory. Layers without modules and
/// modules without conventions stay in the output with empty child lists.
async fn layer_tree(
    State(state): State<AppState>,
    Query(params): Query<LayerSearchParams>,
) -> Result<Json<SliceResponse<LayerTreeNode>>, ApiError> {
    let criteria = params.into_criteria(state.config.default_page_size)?;
    let page = state.db.layers().search(&criteria).await?;

    let layer_ids: Vec<i64> = page.content.iter().map(|l| l.id).collect();
    let grouped = state
        .db
        .modules()
        .with_conventions_for_layers(&layer_ids)
        .await?;

    let mut by_layer: HashMap<i64, Vec<ModuleTreeNode>> = HashMap::new();
    for group in grouped {
        by_layer
            .entry(group.parent.layer_id)
            .or_default()
            .push(ModuleTreeNode {
                module: group.parent,
                conventions: group.children,
            });
    }

    let tree = page.map(|layer| {
        let modules = by_layer.remove(&layer.id).unwrap_or_default();
        LayerTreeNode { layer, modules }
    });
    Ok(Json(tree.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/layers", get(search_layers))
        .route("/layers/tree", get(layer_tree))
}
