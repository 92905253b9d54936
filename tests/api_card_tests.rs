// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end API tests against the in-memory store.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use card_dashboard::db::RecordStore;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{body_json, body_text, send};

fn token_for(state: &card_dashboard::AppState, owner_id: &str) -> String {
    common::create_test_jwt(owner_id, &state.config.jwt_signing_key)
}

// ═══════════════════════════════════════════════════════════════════════════
// CARD CRUD
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_create_list_get_card() {
    let (app, state) = common::create_test_app();
    let token = token_for(&state, "owner-1");

    let response = send(
        &app,
        &token,
        "POST",
        "/api/cards",
        Some(json!({
            "title": "Jane Doe",
            "company": "Acme",
            "email": "jane@example.com",
            "website": ""
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    let card_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["slug"], "jane-doe");
    assert_eq!(created["public_url"], "https://cards.example.com/c/jane-doe");
    assert_eq!(created["is_published"], false);
    assert_eq!(created["owner_id"], "owner-1");
    assert!(created["website"].is_null());
    assert_eq!(created["theme"]["name"], "modern");

    let response = send(&app, &token, "GET", "/api/cards", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cards = body_json(response).await;
    assert_eq!(cards.as_array().unwrap().len(), 1);
    assert_eq!(cards[0]["id"], card_id.as_str());

    let response = send(&app, &token, "GET", &format!("/api/cards/{}", card_id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["company"], "Acme");
}

#[tokio::test]
async fn test_update_card_keeps_id_and_slug() {
    let (app, state) = common::create_test_app();
    let token = token_for(&state, "owner-1");

    let created = body_json(
        send(&app, &token, "POST", "/api/cards", Some(json!({ "title": "Jane" }))).await,
    )
    .await;
    let card_id = created["id"].as_str().unwrap();

    let response = send(
        &app,
        &token,
        "PUT",
        &format!("/api/cards/{}", card_id),
        Some(json!({ "title": "Jane Q. Doe", "position": "Engineer" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = body_json(response).await;
    assert_eq!(updated["id"], card_id);
    assert_eq!(updated["title"], "Jane Q. Doe");
    assert_eq!(updated["slug"], "jane");
    assert_eq!(updated["position"], "Engineer");

    let cards = body_json(send(&app, &token, "GET", "/api/cards", None).await).await;
    assert_eq!(cards.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_card_validation_error() {
    let (app, state) = common::create_test_app();
    let token = token_for(&state, "owner-1");

    let response = send(
        &app,
        &token,
        "POST",
        "/api/cards",
        Some(json!({ "title": "   ", "email": "not-an-email" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
    let details = body["details"].as_str().unwrap();
    assert!(details.contains("title"), "details: {}", details);
    assert!(details.contains("email"), "details: {}", details);

    let cards = body_json(send(&app, &token, "GET", "/api/cards", None).await).await;
    assert!(cards.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_explicit_slug_rejected() {
    let (app, state) = common::create_test_app();
    let token = token_for(&state, "owner-1");

    let response = send(
        &app,
        &token,
        "POST",
        "/api/cards",
        Some(json!({ "title": "Jane", "slug": "Jane Doe!" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_explicit_slug_conflict() {
    let (app, state) = common::create_test_app();
    let token_a = token_for(&state, "owner-a");
    let token_b = token_for(&state, "owner-b");

    let response = send(
        &app,
        &token_a,
        "POST",
        "/api/cards",
        Some(json!({ "title": "Jane", "slug": "jane" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        &app,
        &token_b,
        "POST",
        "/api/cards",
        Some(json!({ "title": "Other Jane", "slug": "jane" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "conflict");
}

#[tokio::test]
async fn test_other_owners_card_is_not_found() {
    let (app, state) = common::create_test_app();
    let owner = token_for(&state, "owner-a");
    let intruder = token_for(&state, "owner-b");

    let created = body_json(
        send(&app, &owner, "POST", "/api/cards", Some(json!({ "title": "Jane" }))).await,
    )
    .await;
    let uri = format!("/api/cards/{}", created["id"].as_str().unwrap());

    let response = send(&app, &intruder, "GET", &uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, &intruder, "PUT", &uri, Some(json!({ "title": "Mine" }))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, &intruder, "DELETE", &uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, &intruder, "PUT", &format!("{}/links", uri), Some(json!([]))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Still intact for the owner
    let response = send(&app, &owner, "GET", &uri, None).await;
    assert_eq!(body_json(response).await["title"], "Jane");
}

#[tokio::test]
async fn test_delete_card_removes_links() {
    let (app, state) = common::create_test_app();
    let token = token_for(&state, "owner-1");

    let created = body_json(
        send(&app, &token, "POST", "/api/cards", Some(json!({ "title": "Jane" }))).await,
    )
    .await;
    let card_id = created["id"].as_str().unwrap().to_string();

    send(
        &app,
        &token,
        "PUT",
        &format!("/api/cards/{}/links", card_id),
        Some(json!([{ "platform": "github", "username": "jane", "url": "https://github.com/jane" }])),
    )
    .await;

    let response = send(&app, &token, "DELETE", &format!("/api/cards/{}", card_id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    let cards = body_json(send(&app, &token, "GET", "/api/cards", None).await).await;
    assert!(cards.as_array().unwrap().is_empty());
    assert!(state.db.list_links(&card_id).await.unwrap().is_empty());

    let response = send(&app, &token, "DELETE", &format!("/api/cards/{}", card_id), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ═══════════════════════════════════════════════════════════════════════════
// PUBLISHING AND PUBLIC VIEW
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_publish_and_public_view() {
    let (app, state) = common::create_test_app();
    let token = token_for(&state, "owner-1");

    let created = body_json(
        send(
            &app,
            &token,
            "POST",
            "/api/cards",
            Some(json!({ "title": "Jane Doe", "bio": "Hello" })),
        )
        .await,
    )
    .await;
    let card_id = created["id"].as_str().unwrap().to_string();

    send(
        &app,
        &token,
        "PUT",
        &format!("/api/cards/{}/links", card_id),
        Some(json!([
            { "platform": "github", "username": "jane", "url": "https://github.com/jane" },
            { "platform": "twitter", "username": "jd", "url": "https://twitter.com/jd", "is_active": false }
        ])),
    )
    .await;

    // Unpublished cards are hidden
    let public = Request::builder()
        .uri("/c/jane-doe")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(public).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        &token,
        "POST",
        &format!("/api/cards/{}/publish", card_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["is_published"], true);

    let public = Request::builder()
        .uri("/c/jane-doe")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(public).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let card = body_json(response).await;
    assert_eq!(card["title"], "Jane Doe");
    assert_eq!(card["view_count"], 1);
    assert!(card.get("owner_id").is_none());
    let links = card["links"].as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["platform"], "github");

    // Unpublish hides it again
    send(
        &app,
        &token,
        "POST",
        &format!("/api/cards/{}/publish", card_id),
        None,
    )
    .await;
    let public = Request::builder()
        .uri("/c/jane-doe")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(public).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ═══════════════════════════════════════════════════════════════════════════
// SOCIAL LINKS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_save_links_replaces_set_and_drops_incomplete() {
    let (app, state) = common::create_test_app();
    let token = token_for(&state, "owner-1");

    let created = body_json(
        send(&app, &token, "POST", "/api/cards", Some(json!({ "title": "Jane" }))).await,
    )
    .await;
    let links_uri = format!("/api/cards/{}/links", created["id"].as_str().unwrap());

    let response = send(
        &app,
        &token,
        "PUT",
        &links_uri,
        Some(json!([
            { "platform": "github", "username": "jane", "url": "https://github.com/jane" },
            { "platform": "website", "username": "" },
            { "platform": "linkedin", "username": "jane", "url": "https://www.linkedin.com/in/jane" }
        ])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let saved = body_json(response).await;
    assert_eq!(saved.as_array().unwrap().len(), 2);
    assert_eq!(saved[1]["display_order"], 1);

    let response = send(
        &app,
        &token,
        "PUT",
        &links_uri,
        Some(json!([
            { "platform": "instagram", "username": "jane", "url": "https://instagram.com/jane" }
        ])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let listed = body_json(send(&app, &token, "GET", &links_uri, None).await).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["platform"], "instagram");
    assert_eq!(listed[0]["display_order"], 0);
}

#[tokio::test]
async fn test_save_links_derives_urls_from_usernames() {
    let (app, state) = common::create_test_app();
    let token = token_for(&state, "owner-1");
    let created = body_json(
        send(&app, &token, "POST", "/api/cards", Some(json!({ "title": "Jane" }))).await,
    )
    .await;
    let links_uri = format!("/api/cards/{}/links", created["id"].as_str().unwrap());

    let response = send(
        &app,
        &token,
        "PUT",
        &links_uri,
        Some(json!([
            { "platform": "github", "username": "jane" },
            { "platform": "twitter", "username": "jane", "url": "https://evil.example/x" },
            { "platform": "website", "username": "", "url": " https://jane.dev " }
        ])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let listed = body_json(send(&app, &token, "GET", &links_uri, None).await).await;
    let urls: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["url"].as_str().unwrap())
        .collect();
    assert_eq!(
        urls,
        ["https://github.com/jane", "https://twitter.com/jane", "https://jane.dev"]
    );
}

#[tokio::test]
async fn test_editor_save_derives_link_urls() {
    let (app, state) = common::create_test_app();
    let token = token_for(&state, "owner-1");

    let response = send(
        &app,
        &token,
        "POST",
        "/api/editor",
        Some(json!({
            "form": { "title": "Jane" },
            "links": [
                { "platform": "github", "username": "@jane" },
                { "platform": "instagram", "username": "jane", "url": "https://evil.example/x" }
            ]
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let saved = body_json(response).await;

    let card_id = saved["card_id"].as_str().unwrap();
    let stored = state.db.list_links(card_id).await.unwrap();
    let mut urls: Vec<String> = stored.into_iter().map(|l| l.url).collect();
    urls.sort();
    assert_eq!(
        urls,
        ["https://github.com/jane", "https://www.instagram.com/jane"]
    );
}

#[tokio::test]
async fn test_auto_sync_uses_profile_username() {
    let (app, state) = common::create_test_app();
    let token = token_for(&state, "owner-1");

    let created = body_json(
        send(&app, &token, "POST", "/api/cards", Some(json!({ "title": "Jane" }))).await,
    )
    .await;
    let sync_uri = format!(
        "/api/cards/{}/links/auto-sync",
        created["id"].as_str().unwrap()
    );

    // No username anywhere
    let response = send(&app, &token, "POST", &sync_uri, Some(json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        &token,
        "PUT",
        "/api/profile",
        Some(json!({ "full_name": "Jane Doe", "global_username": "@janedoe" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["global_username"], "janedoe");

    let response = send(
        &app,
        &token,
        "POST",
        &sync_uri,
        Some(json!({
            "links": [{ "platform": "github", "username": "jane", "url": "https://github.com/jane" }]
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let added = body["added"].as_u64().unwrap() as usize;
    let links = body["links"].as_array().unwrap();
    assert!(added > 0);
    assert_eq!(links.len(), added + 1);
    // The existing github entry is kept and a second one is appended
    let github = links.iter().filter(|l| l["platform"] == "github").count();
    assert_eq!(github, 2);
    assert!(links[1..].iter().all(|l| l["auto_synced"] == true));
    assert!(links[1..].iter().all(|l| l["username"] == "janedoe"));

    // Nothing was stored
    let listed = body_json(
        send(
            &app,
            &token,
            "GET",
            &format!("/api/cards/{}/links", created["id"].as_str().unwrap()),
            None,
        )
        .await,
    )
    .await;
    assert!(listed.as_array().unwrap().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// EDITOR
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_editor_save_then_load() {
    let (app, state) = common::create_test_app();
    let token = token_for(&state, "owner-1");

    let response = send(&app, &token, "GET", "/api/editor", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let blank = body_json(response).await;
    assert!(blank["card_id"].is_null());
    assert_eq!(blank["active_tab"], "profile");

    let response = send(
        &app,
        &token,
        "POST",
        "/api/editor",
        Some(json!({
            "active_tab": "social",
            "form": { "title": "Jane Doe", "company": "Acme" },
            "links": [
                { "platform": "github", "username": "jane", "url": "https://github.com/jane" },
                { "platform": "website", "username": "" }
            ]
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let saved = body_json(response).await;
    let card_id = saved["card_id"].as_str().unwrap().to_string();
    assert_eq!(saved["active_tab"], "social");
    assert_eq!(saved["form"]["slug"], "jane-doe");
    assert_eq!(saved["links"].as_array().unwrap().len(), 1);

    let response = send(
        &app,
        &token,
        "GET",
        &format!("/api/editor?card_id={}", card_id),
        None,
    )
    .await;
    let loaded = body_json(response).await;
    assert_eq!(loaded["card_id"], card_id.as_str());
    assert_eq!(loaded["form"]["company"], "Acme");
    assert_eq!(loaded["links"][0]["url"], "https://github.com/jane");
}

#[tokio::test]
async fn test_editor_unknown_card_starts_new_draft() {
    let (app, state) = common::create_test_app();
    let token = token_for(&state, "owner-1");

    let response = send(&app, &token, "GET", "/api/editor?card_id=missing", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let loaded = body_json(response).await;
    assert!(loaded["card_id"].is_null());
    assert_eq!(loaded["form"]["title"], "");
}

// ═══════════════════════════════════════════════════════════════════════════
// PROFILE AND ANALYTICS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_profile_defaults_and_rejects_spaces() {
    let (app, state) = common::create_test_app();
    let token = token_for(&state, "owner-1");

    let profile = body_json(send(&app, &token, "GET", "/api/profile", None).await).await;
    assert_eq!(profile["owner_id"], "owner-1");
    assert!(profile["global_username"].is_null());

    let response = send(
        &app,
        &token,
        "PUT",
        "/api/profile",
        Some(json!({ "global_username": "jane doe" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_analytics_summary_and_export() {
    let (app, state) = common::create_test_app();
    let token = token_for(&state, "owner-1");

    for title in ["First", "Second", "Third"] {
        send(&app, &token, "POST", "/api/cards", Some(json!({ "title": title }))).await;
    }
    let cards = body_json(send(&app, &token, "GET", "/api/cards", None).await).await;
    let first_id = cards[0]["id"].as_str().unwrap();
    send(
        &app,
        &token,
        "POST",
        &format!("/api/cards/{}/publish", first_id),
        None,
    )
    .await;

    let summary = body_json(send(&app, &token, "GET", "/api/analytics/summary", None).await).await;
    assert_eq!(summary["total_cards"], 3);
    assert_eq!(summary["published_cards"], 1);
    assert_eq!(summary["draft_cards"], 2);
    assert_eq!(summary["total_views"], 0);

    let response = send(&app, &token, "GET", "/api/analytics/export", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"analytics-"));
    assert!(disposition.ends_with(".csv\""));

    let csv = body_text(response).await;
    assert!(csv.contains("Total Cards,3"), "csv: {}", csv);
}

// ═══════════════════════════════════════════════════════════════════════════
// STORE FAILURES
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_store_failure_is_database_error() {
    let (app, state) = common::create_offline_test_app();
    let token = token_for(&state, "owner-1");

    let response = send(&app, &token, "GET", "/api/cards", None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], "database_error");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_validation_runs_before_store() {
    let (app, state) = common::create_offline_test_app();
    let token = token_for(&state, "owner-1");

    // The offline store would fail, so a 422 means no store call was made
    let response = send(&app, &token, "POST", "/api/cards", Some(json!({ "title": "" }))).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
