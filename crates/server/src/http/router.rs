use super::handlers::{authors, health, members, posts, records};
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

const METHODS: [Method; 3] = [Method::GET, Method::POST, Method::DELETE];

fn cors_layer(allowed_origins: &str) -> CorsLayer {
    let any = || {
        CorsLayer::new()
            .allow_methods(METHODS)
            .allow_origin(Any)
            .allow_headers(Any)
    };
    if allowed_origins == "*" {
        return any();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
        any()
    } else {
        tracing::info!("CORS enabled for origins: {:?}", origins);
        CorsLayer::new()
            .allow_methods(METHODS)
            .allow_origin(origins)
            .allow_headers(Any)
    }
}

pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // Ghost webhooks
        .route("/posts", post(posts::enrich_post).get(posts::batch_metadata))
        .route("/posts/embed", post(posts::embed_post).get(posts::batch_embed))
        .route("/posts/alt", get(posts::batch_alt))
        .route("/posts/backup", get(posts::backup))
        .route("/authors/post/created", post(authors::post_created))
        .route("/authors/post/updated", post(authors::post_updated))
        .route("/members", post(members::new_member))
        // 本地记录
        .route(
            "/donations",
            post(records::create_donation),
        )
        .route("/donations/:coffee_id", get(records::get_donation))
        .route(
            "/comments",
            post(records::create_comment).get(records::list_comments),
        )
        .route(
            "/comments/upvote",
            post(records::submit_upvote)
                .delete(records::remove_upvote)
                .get(records::get_upvote),
        )
        .route("/comments/:id", get(records::get_comment))
        .route(
            "/accounts",
            post(records::create_account).get(records::get_account),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}
