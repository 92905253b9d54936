// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Card Dashboard: manage digital business cards and their social links.
//!
//! This crate provides the backend API behind the card dashboard and the
//! public `/c/{slug}` card view.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod slug;
pub mod time_utils;

use config::Config;
use db::RecordStore;
use services::{CardEditor, CardRepository, SocialLinkManager};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn RecordStore>,
    pub cards: CardRepository,
    pub links: SocialLinkManager,
}

impl AppState {
    pub fn new(config: Config, db: Arc<dyn RecordStore>) -> Self {
        Self {
            config,
            cards: CardRepository::new(db.clone()),
            links: SocialLinkManager::new(db.clone()),
            db,
        }
    }

    pub fn editor(&self) -> CardEditor<'_> {
        CardEditor::new(&self.cards, &self.links)
    }
}
