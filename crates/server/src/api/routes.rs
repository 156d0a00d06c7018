use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, middleware::metrics_middleware, podcasts};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/", get(handlers::root))
        // Discovery (fetch from iTunes, store, respond)
        .route("/search", get(podcasts::search))
        .route("/trending", get(podcasts::trending))
        // Stored podcasts
        .route("/podcasts/{collection_id}", get(podcasts::get_podcast))
        .route(
            "/podcasts/{collection_id}/similar",
            get(podcasts::similar_podcasts),
        )
        .route("/episodes/trending", get(podcasts::trending_episodes))
        // Observability
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
