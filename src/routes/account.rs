// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account-level routes: profile and dashboard summary.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{DashboardSummary, Profile};
use crate::time_utils::format_utc_date;
use crate::AppState;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/profile", get(get_profile).put(update_profile))
        .route("/api/analytics/summary", get(get_summary))
        .route("/api/analytics/export", get(export_summary))
}

// ─── Profile ─────────────────────────────────────────────────

/// Get the account profile; accounts without one get an empty profile.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Profile>> {
    let profile = state
        .db
        .get_profile(&user.owner_id)
        .await?
        .unwrap_or_else(|| Profile::empty(&user.owner_id));
    Ok(Json(profile))
}

#[derive(Debug, Deserialize, Validate)]
struct ProfileInput {
    #[validate(length(max = 120))]
    #[serde(default)]
    full_name: Option<String>,
    #[validate(length(max = 64))]
    #[serde(default)]
    global_username: Option<String>,
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<Profile>> {
    input.validate()?;

    let global_username = input
        .global_username
        .map(|u| u.trim().trim_start_matches('@').to_string())
        .filter(|u| !u.is_empty());
    if global_username
        .as_deref()
        .is_some_and(|u| u.chars().any(char::is_whitespace))
    {
        return Err(AppError::Validation(
            "global_username: must not contain whitespace".to_string(),
        ));
    }

    let profile = Profile {
        owner_id: user.owner_id.clone(),
        full_name: input
            .full_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        global_username,
        updated_at: chrono::Utc::now(),
    };
    state.db.put_profile(&profile).await?;

    tracing::info!(owner_id = %user.owner_id, "Profile updated");
    Ok(Json(profile))
}

// ─── Dashboard Summary ───────────────────────────────────────

async fn get_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DashboardSummary>> {
    let cards = state.cards.fetch_cards_for_owner(&user.owner_id).await?;
    Ok(Json(DashboardSummary::from_cards(&cards)))
}

/// Download the summary as CSV.
async fn export_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response> {
    let cards = state.cards.fetch_cards_for_owner(&user.owner_id).await?;
    let csv = DashboardSummary::from_cards(&cards).to_csv();
    let filename = format!("analytics-{}.csv", format_utc_date(chrono::Utc::now()));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    )
        .into_response())
}
