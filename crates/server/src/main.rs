mod config;
mod http;
mod state;

use adapter::services::authors::AuthorNotifier;
use adapter::services::lynx::LynxGenerator;
use adapter::services::members::{NewsletterService, WelcomeTemplate};
use adapter::services::posts::PostEnricher;
use adapter::{
    CmsClient, GcsConfig, GcsImageStore, GhostClient, GhostConfig, HttpPageFetcher,
    MailgunClient, MailgunConfig, TwilioClient, TwilioConfig,
};
use anyhow::Context;
use domain::SystemClock;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::http::router::build_router;
use crate::state::AppState;
use storage::Db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::new().context("Failed to load configuration")?;
    let db = Db::new(&settings.database.url).await?;
    let state = build_state(&settings, db)?;

    let app = build_router(state, &settings.server.cors_origins);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn build_state(settings: &Settings, db: Db) -> anyhow::Result<AppState> {
    let client = adapter::http_client(Duration::from_secs(settings.http.timeout_secs))?;

    let cms: Arc<dyn CmsClient> = Arc::new(GhostClient::new(
        client.clone(),
        GhostConfig {
            api_url: settings.ghost.api_url.clone(),
            admin_key: settings.ghost.admin_key.clone(),
        },
    ));
    let images = Arc::new(GcsImageStore::new(
        client.clone(),
        GcsConfig {
            bucket: settings.gcs.bucket.clone(),
            prefix: settings.gcs.prefix.clone(),
            public_base_url: settings.gcs.public_base_url.clone(),
            access_token: settings.gcs.access_token.clone(),
        },
    ));
    let sms = Arc::new(TwilioClient::new(
        client.clone(),
        TwilioConfig {
            account_sid: settings.twilio.account_sid.clone(),
            auth_token: settings.twilio.auth_token.clone(),
            sender: settings.twilio.sender.clone(),
            recipient: settings.twilio.recipient.clone(),
        },
    ));
    let email = Arc::new(MailgunClient::new(
        client,
        MailgunConfig {
            api_key: settings.mailgun.api_key.clone(),
            domain: settings.mailgun.domain.clone(),
            base_url: settings.mailgun.base_url.clone(),
        },
    ));

    let lynx_timeout = Duration::from_secs(settings.lynx.timeout_secs);
    let pages = Arc::new(HttpPageFetcher::new(lynx_timeout)?);

    let enricher = PostEnricher::new(cms.clone(), images, Arc::new(SystemClock))
        .with_debounce_secs(settings.ghost.debounce_secs)
        .with_settle_delay(Duration::from_millis(settings.ghost.settle_delay_ms));
    let lynx = LynxGenerator::new(pages, cms).with_limits(
        settings.lynx.concurrency,
        lynx_timeout,
        settings.lynx.max_retries,
    );
    let owner_ids = settings.notifications.owner_ids();
    if owner_ids.is_empty() {
        tracing::warn!("No owner ids configured, every post will trigger an SMS.");
    }
    let newsletter = NewsletterService::new(
        email,
        WelcomeTemplate {
            from_email: settings.mailgun.from_email.clone(),
            subject: settings.mailgun.subject.clone(),
            template: settings.mailgun.template.clone(),
        },
    );

    Ok(AppState {
        db,
        enricher: Arc::new(enricher),
        lynx: Arc::new(lynx),
        authors: Arc::new(AuthorNotifier::new(sms, owner_ids)),
        newsletter: Arc::new(newsletter),
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
