use adapter::services::authors::AuthorNotifier;
use adapter::services::lynx::LynxGenerator;
use adapter::services::members::NewsletterService;
use adapter::services::posts::PostEnricher;
use axum::extract::FromRef;
use std::sync::Arc;
use storage::Db;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub enricher: Arc<PostEnricher>,
    pub lynx: Arc<LynxGenerator>,
    pub authors: Arc<AuthorNotifier>,
    pub newsletter: Arc<NewsletterService>,
}

impl FromRef<AppState> for Db {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
