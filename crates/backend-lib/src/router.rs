// ============================
// linkbranch-backend/src/router.rs
// ============================
//! HTTP router.
use std::sync::Arc;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::{Settings, UPLOADS_DIR};
use crate::handlers::{auth, links, user};
use crate::middleware::require_session;
use crate::storage::Storage;
use crate::AppState;

/// Create the API router, with avatars served under `/uploads`
pub fn create_router<S: Storage + Clone + 'static>(state: Arc<AppState<S>>) -> Router {
    let session = from_fn_with_state(state.clone(), require_session::<S>);

    let auth_routes = Router::new()
        .route("/register", post(auth::register::<S>))
        .route("/login", post(auth::login::<S>))
        .route("/logout", post(auth::logout::<S>));

    let user_routes = Router::new()
        .route("/me", get(user::me::<S>))
        .route("/user-up", put(user::update_user::<S>))
        .route("/upload-image", post(user::upload_image::<S>))
        .route("/links", post(user::add_link::<S>))
        .route("/links/order", put(user::reorder_links::<S>))
        .route("/{key}", delete(user::delete_link::<S>))
        .route_layer(session.clone())
        // Registered after the layer so it stays public
        .route("/{key}/visit", patch(user::record_visit::<S>));

    let link_routes = Router::new()
        .route("/", get(links::own_links::<S>).route_layer(session.clone()))
        .route(
            "/{key}",
            put(links::update_link::<S>)
                .route_layer(session)
                .get(links::public_links::<S>),
        );

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/user", user_routes)
        .nest("/links", link_routes)
        .with_state(state.clone());

    let prefix = state.settings.server.api_prefix.trim_end_matches('/');
    let app = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(prefix, api)
    };

    app.nest_service(
        &format!("/{UPLOADS_DIR}"),
        ServeDir::new(state.settings.uploads_dir()),
    )
    .layer(cors_layer(&state.settings))
    .layer(TraceLayer::new_for_http())
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            },
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
