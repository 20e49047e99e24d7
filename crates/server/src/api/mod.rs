pub mod health;
pub mod interactions;

use std::sync::Arc;

use archivist_crypto::InteractionVerifier;
use archivist_discord::DiscordClient;
use archivist_gateway::ArchiveRunner;
use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::auth::RoleGate;
use crate::config::ArchivistConfig;
use crate::error::ServerError;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Verifies inbound interaction signatures.
    pub verifier: Arc<InteractionVerifier>,
    /// Runs accepted archive jobs in the background.
    pub runner: ArchiveRunner,
    /// Who may run `/archive`.
    pub gate: Arc<RoleGate>,
}

impl AppState {
    /// Build the state from a validated configuration.
    pub fn from_config(config: &ArchivistConfig) -> Result<Self, ServerError> {
        let public_key = config
            .discord
            .public_key
            .as_deref()
            .ok_or_else(|| ServerError::Config("discord.public_key is not set".into()))?;
        let verifier = InteractionVerifier::from_hex(public_key)
            .map_err(|e| ServerError::Config(format!("discord.public_key: {e}")))?;

        let client = DiscordClient::new(config.discord.client_config()?)?;
        let runner = ArchiveRunner::new(Arc::new(client), config.archive.settings()?);
        let gate = RoleGate::new(
            config.archive.required_role_id.clone(),
            config.archive.required_role_name.as_str(),
        );

        Ok(Self {
            verifier: Arc::new(verifier),
            runner,
            gate: Arc::new(gate),
        })
    }
}

/// Build the Axum router.
///
/// Interactions are accepted on `interactions_path` and on `/`; other
/// methods on those paths get 405.
pub fn router(state: AppState, interactions_path: &str) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics))
        .route("/", post(interactions::interactions));

    if interactions_path != "/" {
        router = router.route(interactions_path, post(interactions::interactions));
    }

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
