//! Public read-only card view.

use crate::error::Result;
use crate::models::{Layout, Platform, Shape, Theme};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/c/{slug}", get(view_card))
}

/// A published card as visitors see it (no owner details).
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PublicCardResponse {
    pub slug: String,
    pub title: String,
    pub company: Option<String>,
    pub position: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub map_link: Option<String>,
    pub theme: Theme,
    pub shape: Shape,
    pub layout: Layout,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub view_count: u64,
    pub updated_at: String,
    pub links: Vec<PublicLink>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PublicLink {
    pub platform: Platform,
    pub username: String,
    pub url: String,
}

/// Resolve a published card by slug and count the view.
async fn view_card(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<PublicCardResponse>> {
    let card = state
        .cards
        .fetch_published_by_slug(&slug)
        .await?
        .found_or(format!("Card '{}' not found", slug))?;

    // A failed counter update should not hide the card.
    let view_count = match state.cards.record_view(&card).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(card_id = %card.id, error = %e, "Failed to record card view");
            card.view_count
        }
    };

    let links = state
        .links
        .list_links(&card.id)
        .await?
        .into_iter()
        .map(|l| PublicLink {
            platform: l.platform,
            username: l.username,
            url: l.url,
        })
        .collect();

    Ok(Json(PublicCardResponse {
        slug,
        title: card.title,
        company: card.company,
        position: card.position,
        bio: card.bio,
        avatar_url: card.avatar_url,
        phone: card.phone,
        whatsapp: card.whatsapp,
        email: card.email,
        website: card.website,
        address: card.address,
        map_link: card.map_link,
        theme: card.theme,
        shape: card.shape,
        layout: card.layout,
        view_count,
        updated_at: format_utc_rfc3339(card.updated_at),
        links,
    }))
}
