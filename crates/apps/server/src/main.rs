use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Query params the region-info endpoint requires: the four viewport
/// corners, latitude and longitude each.
const CORNER_PARAMS: [&str; 8] = [
    "top_left_lat",
    "top_left_lon",
    "top_right_lat",
    "top_right_lon",
    "bottom_left_lat",
    "bottom_left_lon",
    "bottom_right_lat",
    "bottom_right_lon",
];

#[derive(Clone)]
struct AppState {
    cfg: Arc<ProxyConfig>,
    http: reqwest::Client,
}

#[derive(Debug, Clone)]
struct ProxyConfig {
    geocoder_url: String,
    geocoder_limit: u32,
    region_info_url: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let addr: SocketAddr = env::var("APP_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
        .parse()
        .expect("invalid APP_ADDR");

    let cfg = ProxyConfig {
        geocoder_url: env::var("GEOCODER_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org/search".to_string()),
        geocoder_limit: env::var("GEOCODER_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5),
        region_info_url: env::var("REGION_INFO_URL").ok(),
    };

    let state = AppState {
        cfg: Arc::new(cfg),
        http: reqwest::Client::builder()
            .user_agent("globe-viewer-proxy/0.1")
            .build()
            .expect("http client"),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::OPTIONS]);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/search/", get(search))
        .route("/api/ask_gemini/", get(region_info))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("proxy listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), app)
        .await
        .unwrap();
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

/// Geocoder response rows: numbers arrive as strings, bounding box as
/// `[south, north, west, east]` strings.
#[derive(Debug, Deserialize)]
struct GeocoderPlace {
    display_name: String,
    lat: String,
    lon: String,
    #[serde(default)]
    boundingbox: Option<[String; 4]>,
}

async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let query = params.q.trim();
    if query.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "missing query");
    }

    let limit = state.cfg.geocoder_limit.to_string();
    let upstream = state
        .http
        .get(&state.cfg.geocoder_url)
        .query(&[("format", "json"), ("limit", limit.as_str()), ("q", query)])
        .send()
        .await;

    let places: Vec<GeocoderPlace> = match upstream {
        Ok(resp) => match resp.json().await {
            Ok(places) => places,
            Err(err) => {
                warn!("geocoder returned malformed body: {err}");
                return error_response(StatusCode::BAD_GATEWAY, "search upstream failed");
            }
        },
        Err(err) => {
            warn!("geocoder request failed: {err}");
            return error_response(StatusCode::BAD_GATEWAY, "search upstream failed");
        }
    };

    let results: Vec<serde_json::Value> = places
        .iter()
        .filter_map(|place| {
            let lat: f64 = place.lat.parse().ok()?;
            let lon: f64 = place.lon.parse().ok()?;
            let boundingbox = place.boundingbox.as_ref().and_then(|bb| {
                let parsed: Vec<f64> = bb.iter().filter_map(|v| v.parse().ok()).collect();
                (parsed.len() == 4).then_some(parsed)
            });
            Some(json!({
                "name": place.display_name,
                "lat": lat,
                "lon": lon,
                "boundingbox": boundingbox,
            }))
        })
        .collect();

    if results.is_empty() {
        return error_response(StatusCode::NOT_FOUND, "Location not found");
    }
    (StatusCode::OK, Json(json!({ "results": results }))).into_response()
}

async fn region_info(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    for name in CORNER_PARAMS {
        if !params.contains_key(name) {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("missing query param: {name}"),
            );
        }
    }

    let Some(upstream_url) = state.cfg.region_info_url.as_deref() else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "region info upstream not configured",
        );
    };

    let forwarded: Vec<(&str, &str)> = CORNER_PARAMS
        .iter()
        .map(|&name| (name, params[name].as_str()))
        .collect();

    let upstream = state
        .http
        .get(upstream_url)
        .query(&forwarded)
        .send()
        .await;

    match upstream {
        Ok(resp) => match resp.json::<serde_json::Value>().await {
            // The upstream already speaks {historical_info}/{error}; relay
            // its body untouched.
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(err) => {
                warn!("region info upstream returned malformed body: {err}");
                error_response(StatusCode::BAD_GATEWAY, "region info upstream failed")
            }
        },
        Err(err) => {
            warn!("region info request failed: {err}");
            error_response(StatusCode::BAD_GATEWAY, "region info upstream failed")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
