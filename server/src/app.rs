use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

use crate::routes;
use crate::state::AppState;

pub(crate) fn build_app(state: AppState, static_dir: &str) -> Router {
    let static_assets = Router::new()
        .fallback_service(
            ServeDir::new(static_dir)
                .precompressed_br()
                .precompressed_gzip(),
        )
        .layer(middleware::from_fn(set_static_cache_control));

    let app = Router::new()
        .route("/api/worldmap", get(routes::worldmap::get_worldmap))
        .route(
            "/api/worldmap/tiles/{q}/{r}/{radius}",
            get(routes::worldmap::get_tiles_around),
        )
        .route("/api/worldmap/tile", put(routes::worldmap::update_tile))
        .route("/api/worldmap/save", post(routes::worldmap::save))
        .route("/api/worldmap/generate", post(routes::worldmap::generate))
        .route("/api/health", get(routes::api::health));

    app.layer(CompressionLayer::new())
        .fallback_service(static_assets)
        .with_state(state)
}

async fn set_static_cache_control(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    if response.status().is_success()
        && let Some(cache_control) = cache_control_for_path(&path)
    {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(cache_control),
        );
    }

    response
}

const IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Bundles are content-addressed and cached forever; the HTML shell is
/// revalidated so a new deploy picks up the new bundle names.
fn cache_control_for_path(path: &str) -> Option<&'static str> {
    if is_hashed_bundle_asset(path) {
        Some(IMMUTABLE)
    } else if path == "/" || path.ends_with(".html") {
        Some("no-cache")
    } else {
        None
    }
}

/// Trunk names bundles `<crate>-<16 hex digits>[_bg].<ext>`.
fn is_hashed_bundle_asset(path: &str) -> bool {
    let file = path.rsplit('/').next().unwrap_or(path);
    let Some((stem, ext)) = file.rsplit_once('.') else {
        return false;
    };
    if !matches!(ext, "wasm" | "js" | "css") {
        return false;
    }
    let stem = stem.strip_suffix("_bg").unwrap_or(stem);
    stem.rsplit_once('-').is_some_and(|(_, hash)| {
        hash.len() == 16 && hash.bytes().all(|b| b.is_ascii_hexdigit())
    })
}
