// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Card and social link routes for the authenticated owner.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Card, CardInput, DraftLink, SocialLink};
use crate::services::LinkDraft;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Card routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/cards", get(list_cards).post(create_card))
        .route(
            "/api/cards/{card_id}",
            get(get_card).put(update_card).delete(delete_card),
        )
        .route("/api/cards/{card_id}/publish", post(toggle_publish))
        .route("/api/cards/{card_id}/links", get(list_links).put(save_links))
        .route("/api/cards/{card_id}/links/auto-sync", post(auto_sync_links))
}

// ─── Cards ───────────────────────────────────────────────────

/// Card plus its public address.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CardResponse {
    #[serde(flatten)]
    pub card: Card,
    /// `{PUBLIC_BASE_URL}/c/{slug}` when the card has a slug
    pub public_url: Option<String>,
}

impl CardResponse {
    fn new(state: &AppState, card: Card) -> Self {
        let public_url = card
            .slug
            .as_deref()
            .map(|slug| state.config.public_card_url(slug));
        Self { card, public_url }
    }
}

/// List the owner's cards, most recently updated first.
async fn list_cards(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<CardResponse>>> {
    let cards = state.cards.fetch_cards_for_owner(&user.owner_id).await?;
    tracing::debug!(owner_id = %user.owner_id, count = cards.len(), "Listed cards");

    Ok(Json(
        cards
            .into_iter()
            .map(|card| CardResponse::new(&state, card))
            .collect(),
    ))
}

async fn create_card(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<CardInput>,
) -> Result<(StatusCode, Json<CardResponse>)> {
    let card = state.cards.save_card(&user.owner_id, None, input).await?;
    Ok((StatusCode::CREATED, Json(CardResponse::new(&state, card))))
}

async fn get_card(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(card_id): Path<String>,
) -> Result<Json<CardResponse>> {
    let card = state
        .cards
        .fetch_card(&card_id, &user.owner_id)
        .await?
        .found_or(format!("Card {} not found", card_id))?;
    Ok(Json(CardResponse::new(&state, card)))
}

async fn update_card(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(card_id): Path<String>,
    Json(input): Json<CardInput>,
) -> Result<Json<CardResponse>> {
    let card = state
        .cards
        .save_card(&user.owner_id, Some(&card_id), input)
        .await?;
    Ok(Json(CardResponse::new(&state, card)))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteCardResponse {
    pub success: bool,
    pub message: String,
}

/// Delete a card and all of its social links.
///
/// The dashboard asks the user to confirm before calling this.
async fn delete_card(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(card_id): Path<String>,
) -> Result<Json<DeleteCardResponse>> {
    state.cards.delete_card(&card_id, &user.owner_id).await?;
    Ok(Json(DeleteCardResponse {
        success: true,
        message: "Card deleted".to_string(),
    }))
}

async fn toggle_publish(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(card_id): Path<String>,
) -> Result<Json<CardResponse>> {
    let card = state.cards.toggle_publish(&card_id, &user.owner_id).await?;
    Ok(Json(CardResponse::new(&state, card)))
}

// ─── Social Links ────────────────────────────────────────────

/// Fail with 404 unless the card exists and belongs to `user`.
async fn ensure_owned(state: &AppState, user: &AuthUser, card_id: &str) -> Result<Card> {
    state
        .cards
        .fetch_card(card_id, &user.owner_id)
        .await?
        .found_or(format!("Card {} not found", card_id))
}

async fn list_links(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(card_id): Path<String>,
) -> Result<Json<Vec<SocialLink>>> {
    ensure_owned(&state, &user, &card_id).await?;
    Ok(Json(state.links.list_links(&card_id).await?))
}

/// Replace the card's links with the posted draft.
async fn save_links(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(card_id): Path<String>,
    Json(entries): Json<Vec<DraftLink>>,
) -> Result<Json<Vec<SocialLink>>> {
    ensure_owned(&state, &user, &card_id).await?;
    let draft = LinkDraft::new(entries);
    Ok(Json(state.links.persist_all(&card_id, &draft).await?))
}

#[derive(Deserialize)]
struct AutoSyncRequest {
    /// Current unsaved draft to append to
    #[serde(default)]
    links: Vec<DraftLink>,
    /// Overrides the profile's global username
    #[serde(default)]
    username: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AutoSyncResponse {
    pub added: usize,
    pub links: Vec<DraftLink>,
}

/// Append generated links for every URL-deriving platform to a draft.
///
/// Nothing is stored; the caller saves the returned draft.
async fn auto_sync_links(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(card_id): Path<String>,
    Json(request): Json<AutoSyncRequest>,
) -> Result<Json<AutoSyncResponse>> {
    ensure_owned(&state, &user, &card_id).await?;

    let username = match request.username.filter(|u| !u.trim().is_empty()) {
        Some(username) => username,
        None => state
            .db
            .get_profile(&user.owner_id)
            .await?
            .and_then(|p| p.global_username)
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                AppError::BadRequest("No global username set on the profile".to_string())
            })?,
    };

    let mut draft = LinkDraft::new(request.links);
    let added = draft.auto_sync(&username);
    tracing::debug!(card_id = %card_id, added, "Auto-synced social links into draft");

    Ok(Json(AutoSyncResponse {
        added,
        links: draft.entries().to_vec(),
    }))
}
