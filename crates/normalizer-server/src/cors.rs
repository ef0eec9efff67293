//! CORS layer driven by configuration, grounded on `control::cors`.

use axum::http::Method;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::CorsSettings;

pub fn cors_layer(settings: &CorsSettings) -> CorsLayer {
    CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
        .allow_origin(allowed_origins(&settings.allowed_origins))
}

fn allowed_origins(configured: &[String]) -> AllowOrigin {
    if configured.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<_> = configured.iter().filter_map(|o| o.parse().ok()).collect();
        AllowOrigin::list(origins)
    }
}
