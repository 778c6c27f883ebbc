use axum::{extract::State, Extension, Json};
use serde::Serialize;

use retailmap_widget::{render, MapCommand};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// Initial widget view: every pin, the camera fit, and the full list.
#[derive(Debug, Serialize)]
pub(super) struct RetailersView {
    pub count: usize,
    pub html: String,
    pub commands: Vec<MapCommand>,
}

pub(super) async fn list_retailers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<RetailersView>>, ApiError> {
    let Some(collection) = state.collection.clone() else {
        return Err(ApiError::new(
            req_id.0,
            "service_unavailable",
            "retailer collection is not loaded",
        ));
    };

    let mut controller = state.controller(None);
    let commands = controller.map_mut().surface_mut().take_commands();

    Ok(Json(ApiResponse {
        data: RetailersView {
            count: collection.len(),
            html: render::render_results(collection.features()).into_string(),
            commands,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
