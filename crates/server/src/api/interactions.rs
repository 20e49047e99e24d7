//! Discord interaction endpoint.

use archivist_core::ArchiveJob;
use archivist_discord::{CommandInteraction, Interaction, InteractionResponse};
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{debug, info, warn};

use super::AppState;
use crate::error::ServerError;

/// Hex Ed25519 signature of `timestamp ‖ body`.
pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
/// Timestamp the signature covers.
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

const INVALID_SIGNATURE: &str = "invalid request signature";

/// `POST /interactions` -- verify, decode and route one interaction.
///
/// The signature is checked against the raw body before it is parsed.
pub async fn interactions(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServerError> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let (Some(signature), Some(timestamp)) = (header(SIGNATURE_HEADER), header(TIMESTAMP_HEADER))
    else {
        debug!("interaction without signature headers");
        return Err(ServerError::Unauthorized(INVALID_SIGNATURE.into()));
    };

    if let Err(e) = state.verifier.verify(&body, signature, timestamp) {
        warn!(error = %e, "rejected interaction with invalid signature");
        return Err(ServerError::Unauthorized(INVALID_SIGNATURE.into()));
    }

    let interaction = Interaction::from_slice(&body).map_err(|e| {
        debug!(error = %e, "undecodable interaction body");
        ServerError::BadRequest("invalid JSON".into())
    })?;

    let response = match interaction {
        Interaction::Ping => Json(InteractionResponse::pong()).into_response(),
        Interaction::Command(command) => match command.name.as_str() {
            "ping" => Json(InteractionResponse::message("PONG!")).into_response(),
            "archive" => Json(archive(&state, &command)).into_response(),
            other => {
                debug!(command = other, "ignoring unknown command");
                StatusCode::NO_CONTENT.into_response()
            }
        },
        Interaction::Other { kind } => {
            debug!(kind, "ignoring interaction type");
            StatusCode::NO_CONTENT.into_response()
        }
    };
    Ok(response)
}

/// Gate, accept and hand off an `archive` command.
///
/// The job is spawned before this returns, but nothing here waits on it.
fn archive(state: &AppState, command: &CommandInteraction) -> InteractionResponse {
    if !state.gate.permits(command) {
        info!(
            user_id = command.user_id().unwrap_or("-"),
            "archive rejected: missing role"
        );
        return InteractionResponse::ephemeral(state.gate.rejection());
    }

    let Some(channel_id) = command.channel_id.as_deref() else {
        return InteractionResponse::ephemeral(
            "⚠️ Error archiving channel: this command must be used in a channel",
        );
    };

    let mut job = ArchiveJob::new(channel_id, command.token.as_str())
        .with_limit(command.integer_option("limit"));
    if let Some(user_id) = command.user_id() {
        job = job.with_requested_by(user_id);
    }

    state.runner.spawn(job);
    InteractionResponse::ephemeral(state.runner.acknowledgment())
}
