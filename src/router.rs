use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::shared::{handle_panic, AppState};
use crate::{auth, country, state};

/// Builds the full HTTP surface.
///
/// Country and state routes require a bearer token; login and health are public.
pub fn build_router(app_state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/country",
            get(country::list_countries)
                .post(country::add_country)
                .put(country::update_country),
        )
        .route(
            "/api/country/:id",
            get(country::get_country).delete(country::delete_country),
        )
        .route(
            "/api/country/:id/states",
            get(state::list_states_for_country),
        )
        .route(
            "/api/state",
            get(state::list_states)
                .post(state::add_state)
                .put(state::update_state),
        )
        .route(
            "/api/state/:id",
            get(state::get_state).delete(state::delete_state),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::jwt_auth,
        ));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(auth::login))
        .merge(protected)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
