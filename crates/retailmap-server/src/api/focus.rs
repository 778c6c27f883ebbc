use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use retailmap_core::{LngLat, RetailerFeature};
use retailmap_widget::MapCommand;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// How far a requested position may sit from a pin and still select it.
const PIN_TOLERANCE_MI: f64 = 0.05;

#[derive(Debug, Deserialize)]
pub(super) struct FocusParams {
    lng: Option<f64>,
    lat: Option<f64>,
    /// The browser map's current zoom.
    zoom: Option<f64>,
}

/// A row or pin click: the fly-to and the popup that replaces any open one.
#[derive(Debug, Serialize)]
pub(super) struct FocusView {
    pub retailer: RetailerFeature,
    pub commands: Vec<MapCommand>,
}

pub(super) async fn focus_retailer(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<FocusParams>,
) -> Result<Json<ApiResponse<FocusView>>, ApiError> {
    let Some(collection) = state.collection.clone() else {
        return Err(ApiError::new(
            req_id.0,
            "service_unavailable",
            "retailer collection is not loaded",
        ));
    };

    let position = match (params.lng, params.lat) {
        (Some(lng), Some(lat)) if lng.is_finite() && lat.is_finite() => LngLat::new(lng, lat),
        _ => {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                "lng and lat must both be finite numbers",
            ));
        }
    };

    let Some(retailer) = collection.find_at(position, PIN_TOLERANCE_MI).cloned() else {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("no retailer at {},{}", position.lng, position.lat),
        ));
    };

    let mut controller = state.controller(params.zoom);
    controller.map_mut().surface_mut().take_commands();
    controller.select_pin(&retailer);
    let commands = controller.map_mut().surface_mut().take_commands();
    tracing::debug!(request_id = %req_id.0, retailer = retailer.display_name(), "focus handled");

    Ok(Json(ApiResponse {
        data: FocusView { retailer, commands },
        meta: ResponseMeta::new(req_id.0),
    }))
}
