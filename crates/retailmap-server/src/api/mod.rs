mod focus;
mod retailers;
mod search;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use retailmap_client::MapboxGeocoder;
use retailmap_core::RetailerCollection;
use retailmap_widget::{CameraSettings, LocatorController, PageElements, RecordingSurface};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

pub type ServerController = LocatorController<RecordingSurface, Arc<MapboxGeocoder>>;

#[derive(Clone)]
pub struct AppState {
    pub collection: Option<Arc<RetailerCollection>>,
    pub geocoder: Arc<MapboxGeocoder>,
    pub radius_mi: f64,
    pub camera: CameraSettings,
}

impl AppState {
    pub fn new(
        collection: Option<Arc<RetailerCollection>>,
        geocoder: Arc<MapboxGeocoder>,
        radius_mi: f64,
    ) -> Self {
        Self {
            collection,
            geocoder,
            radius_mi,
            camera: CameraSettings::default(),
        }
    }

    /// A controller for one request, with the collection already on the map.
    ///
    /// `zoom` is the browser's current zoom. It replaces whatever camera the
    /// install fit left behind, so focusing honors the visitor's zoom.
    pub(super) fn controller(&self, zoom: Option<f64>) -> ServerController {
        let mut controller = LocatorController::new(
            RecordingSurface::new(self.camera.initial_zoom),
            Arc::clone(&self.geocoder),
            PageElements::all(),
            self.camera,
        )
        .with_radius(self.radius_mi);
        if let Some(collection) = &self.collection {
            controller.install_collection(Arc::clone(collection));
        }
        if let Some(zoom) = zoom.filter(|z| z.is_finite()) {
            controller
                .map_mut()
                .surface_mut()
                .set_zoom(zoom.clamp(0.0, 22.0));
        }
        controller
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    retailers: Option<usize>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn search_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/search", get(search::search_retailers))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/retailers", get(retailers::list_retailers))
        .route("/api/v1/focus", get(focus::focus_retailer));

    Router::new()
        .merge(public_routes)
        .merge(search_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match &state.collection {
        Some(collection) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    retailers: Some(collection.len()),
                },
                meta,
            }),
        ),
        None => {
            tracing::warn!("health check: retailer collection unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        retailers: None,
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use retailmap_core::{LngLat, RetailerFeature, RetailerProperties};
    use retailmap_widget::MapSurface;
    use tower::ServiceExt;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn collection() -> Arc<RetailerCollection> {
        let retailer = |name: &str, lng: f64, lat: f64| {
            RetailerFeature::new(
                LngLat::new(lng, lat),
                RetailerProperties {
                    retailer: Some(name.to_string()),
                    address1: Some(format!("{name} Blvd")),
                    ..RetailerProperties::default()
                },
            )
        };
        Arc::new(RetailerCollection::new(vec![
            retailer("Valley Smoke", -119.0, 36.0),
            retailer("Bay Leaf", -122.0, 38.0),
        ]))
    }

    fn state(collection: Option<Arc<RetailerCollection>>, geocoder_url: &str) -> AppState {
        let geocoder = MapboxGeocoder::with_base_url("pk.test", 5, "retailmap-test", geocoder_url)
            .expect("geocoder");
        AppState::new(collection, Arc::new(geocoder), 50.0)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        assert!(response.headers().contains_key("x-request-id"));
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&body).expect("json parse"))
    }

    #[test]
    fn api_error_service_unavailable_maps_to_503() {
        let response =
            ApiError::new("req-1", "service_unavailable", "not loaded").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn controller_clamps_client_zoom() {
        let s = state(None, "http://geocoder.invalid");
        assert!((s.controller(Some(99.0)).map().surface().zoom() - 22.0).abs() < f64::EPSILON);
        assert!((s.controller(Some(f64::NAN)).map().surface().zoom() - 5.4).abs() < f64::EPSILON);
        assert!((s.controller(None).map().surface().zoom() - 5.4).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn health_reports_loaded_collection() {
        let app = build_app(
            state(Some(collection()), "http://geocoder.invalid"),
            default_rate_limit_state(),
        );
        let (status, json) = get_json(app, "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["retailers"], 2);
    }

    #[tokio::test]
    async fn health_is_degraded_without_collection() {
        let app = build_app(state(None, "http://geocoder.invalid"), default_rate_limit_state());
        let (status, json) = get_json(app, "/api/v1/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["data"]["status"], "degraded");
    }

    #[tokio::test]
    async fn retailers_returns_pins_list_and_camera() {
        let app = build_app(
            state(Some(collection()), "http://geocoder.invalid"),
            default_rate_limit_state(),
        );
        let (status, json) = get_json(app, "/api/v1/retailers").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["count"], 2);
        let commands = json["data"]["commands"].as_array().expect("commands");
        assert_eq!(commands[0]["op"], "set_pins");
        assert_eq!(commands[0]["data"]["features"].as_array().map(Vec::len), Some(2));
        assert_eq!(commands[1]["op"], "fit_bounds");
        let html = json["data"]["html"].as_str().expect("html");
        assert!(html.contains("Valley Smoke") && html.contains("Bay Leaf"));
    }

    #[tokio::test]
    async fn retailers_without_collection_is_unavailable() {
        let app = build_app(state(None, "http://geocoder.invalid"), default_rate_limit_state());
        let (status, json) = get_json(app, "/api/v1/retailers").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"]["code"], "service_unavailable");
    }

    #[test]
    fn controller_zoom_overrides_install_fit() {
        let s = state(Some(collection()), "http://geocoder.invalid");
        assert!((s.controller(Some(14.0)).map().surface().zoom() - 14.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn focus_respects_browser_zoom() {
        let state = state(Some(collection()), "http://geocoder.invalid");

        let (status, wide) = get_json(
            build_app(state.clone(), default_rate_limit_state()),
            "/api/v1/focus?lng=-119.0&lat=36.0&zoom=5",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let commands = wide["data"]["commands"].as_array().expect("commands");
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0]["op"], "fly_to");
        assert_eq!(commands[0]["zoom"], 11.0);
        assert_eq!(commands[1]["op"], "open_popup");
        assert!(commands[1]["html"]
            .as_str()
            .expect("popup html")
            .contains("Valley Smoke"));
        assert_eq!(wide["data"]["retailer"]["properties"]["retailer"], "Valley Smoke");

        let (_, close) = get_json(
            build_app(state, default_rate_limit_state()),
            "/api/v1/focus?lng=-119.0&lat=36.0&zoom=14",
        )
        .await;
        assert_eq!(close["data"]["commands"][0]["zoom"], 14.0);
        assert_ne!(wide["data"]["commands"], close["data"]["commands"]);
    }

    #[tokio::test]
    async fn focus_without_retailer_at_position_is_not_found() {
        let app = build_app(
            state(Some(collection()), "http://geocoder.invalid"),
            default_rate_limit_state(),
        );
        let (status, json) = get_json(app, "/api/v1/focus?lng=-100.0&lat=40.0").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn focus_requires_position() {
        let app = build_app(
            state(Some(collection()), "http://geocoder.invalid"),
            default_rate_limit_state(),
        );
        let (status, json) = get_json(app, "/api/v1/focus?lng=-119.0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn blank_search_prompts_without_geocoding() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = build_app(state(Some(collection()), &server.uri()), default_rate_limit_state());
        let (status, json) = get_json(app, "/api/v1/search?q=%20%20").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["outcome"], "prompt");
        assert_eq!(
            json["data"]["html"],
            r#"<div class="no-results">Type a city or zip code...</div>"#
        );
        assert_eq!(json["data"]["commands"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn search_filters_around_geocoded_origin() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "features": [{ "center": [-119.0, 36.1], "place_name": "Visalia, California" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let app = build_app(state(Some(collection()), &server.uri()), default_rate_limit_state());
        let (status, json) = get_json(app, "/api/v1/search?q=Visalia").await;

        assert_eq!(status, StatusCode::OK);
        let data = &json["data"];
        assert_eq!(data["outcome"], "found");
        assert_eq!(data["origin"]["label"], "Visalia, California");
        let results = data["results"]["features"].as_array().expect("features");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["properties"]["retailer"], "Valley Smoke");
        assert!(data["html"].as_str().expect("html").contains("6.9 mi"));
        assert_eq!(data["commands"][0]["op"], "set_pins");
        assert_eq!(data["commands"][1]["op"], "fit_bounds");
    }

    #[tokio::test]
    async fn geocoder_outage_reads_as_no_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let app = build_app(state(Some(collection()), &server.uri()), default_rate_limit_state());
        let (status, json) = get_json(app, "/api/v1/search?q=Fresno").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["outcome"], "no_match");
        assert_eq!(json["data"]["results"]["features"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn search_is_rate_limited() {
        let app = build_app(
            state(Some(collection()), "http://geocoder.invalid"),
            RateLimitState::new(1, Duration::from_secs(60)),
        );

        let (first, _) = get_json(app.clone(), "/api/v1/search?q=").await;
        assert_eq!(first, StatusCode::OK);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/search?q=")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
