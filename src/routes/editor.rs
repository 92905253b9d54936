//! Editor routes: load and save the whole edit screen at once.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::services::EditorState;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/editor", get(load_editor).post(save_editor))
}

#[derive(Deserialize)]
struct EditorQuery {
    card_id: Option<String>,
}

async fn load_editor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<EditorQuery>,
) -> Result<Json<EditorState>> {
    let editor = state.editor();
    Ok(Json(
        editor
            .load(&user.owner_id, params.card_id.as_deref())
            .await?,
    ))
}

async fn save_editor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(editor_state): Json<EditorState>,
) -> Result<Json<EditorState>> {
    let editor = state.editor();
    Ok(Json(editor.save(&user.owner_id, editor_state).await?))
}
