use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use retailmap_core::{FeatureCollection, SearchOrigin};
use retailmap_widget::{MapCommand, SearchOutcome};

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct SearchParams {
    q: Option<String>,
}

/// What the browser applies after a search: panel markup, the result rows
/// and the map calls in order.
#[derive(Debug, Serialize)]
pub(super) struct SearchView {
    pub outcome: &'static str,
    pub origin: Option<SearchOrigin>,
    pub html: String,
    pub results: FeatureCollection,
    pub commands: Vec<MapCommand>,
}

fn outcome_label(outcome: &SearchOutcome) -> &'static str {
    match outcome {
        SearchOutcome::Ignored => "ignored",
        SearchOutcome::Prompted => "prompt",
        SearchOutcome::Found { .. } => "found",
        SearchOutcome::NoMatch => "no_match",
        SearchOutcome::Failed => "failed",
        SearchOutcome::Stale => "stale",
    }
}

pub(super) async fn search_retailers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<SearchParams>,
) -> Json<ApiResponse<SearchView>> {
    let mut controller = state.controller(None);
    controller.map_mut().surface_mut().take_commands();

    controller.set_input(params.q.as_deref().unwrap_or_default());
    let outcome = controller.submit().await;
    tracing::debug!(request_id = %req_id.0, outcome = outcome_label(&outcome), "search handled");

    let origin = match &outcome {
        SearchOutcome::Found { origin, .. } => Some(origin.clone()),
        _ => None,
    };

    Json(ApiResponse {
        data: SearchView {
            outcome: outcome_label(&outcome),
            origin,
            html: controller.panel_html().unwrap_or_default().to_owned(),
            results: FeatureCollection::new(controller.rows().to_vec()),
            commands: controller.map_mut().surface_mut().take_commands(),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}
