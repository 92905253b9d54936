// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Card repository: owner-scoped reads and writes of card records.

use crate::db::RecordStore;
use crate::error::AppError;
use crate::models::{Card, CardInput};
use crate::slug;
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

/// Highest numeric suffix tried when a generated slug is taken.
const MAX_SLUG_ATTEMPTS: u32 = 50;

/// Outcome of a single-row fetch that completed without a store failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Found(T),
    NotFound,
}

impl<T> Fetched<T> {
    /// Convert into a value, mapping `NotFound` to a 404 error.
    pub fn found_or(self, what: impl Into<String>) -> Result<T, AppError> {
        match self {
            Fetched::Found(value) => Ok(value),
            Fetched::NotFound => Err(AppError::NotFound(what.into())),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Fetched::Found(value) => Some(value),
            Fetched::NotFound => None,
        }
    }
}

/// Reads and writes cards on behalf of their owners.
#[derive(Clone)]
pub struct CardRepository {
    store: Arc<dyn RecordStore>,
}

impl CardRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// All cards for an owner, most recently updated first.
    pub async fn fetch_cards_for_owner(&self, owner_id: &str) -> Result<Vec<Card>, AppError> {
        self.store.list_cards(owner_id).await
    }

    /// Fetch one card. Cards owned by someone else are reported as not found.
    pub async fn fetch_card(&self, card_id: &str, owner_id: &str) -> Result<Fetched<Card>, AppError> {
        Ok(match self.store.get_card(card_id).await? {
            Some(card) if card.owner_id == owner_id => Fetched::Found(card),
            Some(_) => {
                tracing::warn!(card_id, owner_id, "Card requested by non-owner");
                Fetched::NotFound
            }
            None => Fetched::NotFound,
        })
    }

    /// Insert a new card (`card_id` is `None`) or update an existing one.
    ///
    /// Input is validated before any store call. On insert a slug is
    /// generated from the title unless one was given. On update the
    /// stored slug is kept unless a new one was given.
    pub async fn save_card(
        &self,
        owner_id: &str,
        card_id: Option<&str>,
        input: CardInput,
    ) -> Result<Card, AppError> {
        let input = input.normalized();
        input.validate()?;
        if let Some(requested) = input.slug.as_deref() {
            if !slug::is_valid_slug(requested) {
                return Err(AppError::Validation(format!(
                    "slug: '{}' must be lowercase letters, digits and single hyphens",
                    requested
                )));
            }
        }

        let now = Utc::now();
        let (card, claimed, previous) = match card_id {
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                let slug = match input.slug.clone() {
                    Some(requested) => Some(self.claim_slug(&requested, &id).await?),
                    None => self.generate_slug(&input.title, &id).await?,
                };
                let mut card = Card::new(id, owner_id, input, now);
                card.slug = slug.clone();
                (card, slug, None)
            }
            Some(card_id) => {
                let mut card = self
                    .fetch_card(card_id, owner_id)
                    .await?
                    .found_or(format!("Card {} not found", card_id))?;
                let mut claimed = None;
                let mut previous = None;
                if let Some(requested) = input.slug.clone() {
                    if card.slug.as_deref() != Some(requested.as_str()) {
                        let slug = self.claim_slug(&requested, &card.id).await?;
                        previous = card.slug.replace(slug.clone());
                        claimed = Some(slug);
                    }
                }
                card.apply(input);
                card.updated_at = now;
                (card, claimed, previous)
            }
        };

        self.store_card(&card, claimed.as_deref(), previous.as_deref())
            .await?;

        tracing::info!(
            card_id = %card.id,
            owner_id,
            created = card_id.is_none(),
            slug = ?card.slug,
            "Card saved"
        );
        Ok(card)
    }

    /// Delete a card and its social links.
    pub async fn delete_card(&self, card_id: &str, owner_id: &str) -> Result<(), AppError> {
        self.fetch_card(card_id, owner_id)
            .await?
            .found_or(format!("Card {} not found", card_id))?;

        let deleted = self.store.delete_card(card_id).await?;
        tracing::info!(card_id, owner_id, deleted, "Card deleted");
        Ok(())
    }

    /// Flip the published flag and stamp the update time.
    ///
    /// A card published without a slug gets one generated from its title
    /// so it is reachable at `/c/{slug}`.
    pub async fn toggle_publish(&self, card_id: &str, owner_id: &str) -> Result<Card, AppError> {
        let mut card = self
            .fetch_card(card_id, owner_id)
            .await?
            .found_or(format!("Card {} not found", card_id))?;

        card.is_published = !card.is_published;
        card.updated_at = Utc::now();
        let mut claimed = None;
        if card.is_published && card.slug.is_none() {
            let slug = match self.generate_slug(&card.title, &card.id).await? {
                Some(slug) => slug,
                // Titles like "!!!" have no slug characters; fall back to the UUID.
                None => self.claim_slug(&card.id, &card.id).await?,
            };
            card.slug = Some(slug.clone());
            claimed = Some(slug);
        }

        self.store_card(&card, claimed.as_deref(), None).await?;
        tracing::info!(
            card_id,
            owner_id,
            published = card.is_published,
            "Card publish state changed"
        );
        Ok(card)
    }

    /// Resolve a published card for the public view.
    pub async fn fetch_published_by_slug(&self, slug: &str) -> Result<Fetched<Card>, AppError> {
        Ok(match self.store.find_card_by_slug(slug).await? {
            Some(card) if card.is_published => Fetched::Found(card),
            _ => Fetched::NotFound,
        })
    }

    /// Count one public view of a card.
    ///
    /// The store increments the counter in place, and owner saves never
    /// write it, so views and edits do not overwrite each other.
    pub async fn record_view(&self, card: &Card) -> Result<u64, AppError> {
        self.store
            .increment_view_count(&card.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Card {} not found", card.id)))
    }

    /// Write the card, then settle slug claims: a claim made for this save
    /// is dropped if the write fails, and the slug the card gave up is
    /// released once the write succeeds.
    async fn store_card(
        &self,
        card: &Card,
        claimed: Option<&str>,
        previous: Option<&str>,
    ) -> Result<(), AppError> {
        if let Err(e) = self.store.put_card(card).await {
            if let Some(slug) = claimed {
                self.release_quietly(slug, &card.id).await;
            }
            return Err(e);
        }

        if let Some(old) = previous {
            if card.slug.as_deref() != Some(old) {
                self.release_quietly(old, &card.id).await;
            }
        }
        Ok(())
    }

    async fn release_quietly(&self, slug: &str, card_id: &str) {
        if let Err(e) = self.store.release_slug(slug, card_id).await {
            tracing::warn!(slug, card_id, error = %e, "Failed to release slug claim");
        }
    }

    // ─── Slug Helpers ──────────────────────────────────────────────

    /// Try to take `candidate` for `card_id`.
    ///
    /// The store claim decides races between saves. A card stored before
    /// claims existed may still hold the slug, so that is checked while the
    /// claim is held.
    async fn try_claim(&self, candidate: &str, card_id: &str) -> Result<bool, AppError> {
        if !self.store.claim_slug(candidate, card_id).await? {
            return Ok(false);
        }
        match self.store.find_card_by_slug(candidate).await? {
            Some(other) if other.id != card_id => {
                self.release_quietly(candidate, card_id).await;
                Ok(false)
            }
            _ => Ok(true),
        }
    }

    /// Reserve an explicitly requested slug, failing if another card has it.
    async fn claim_slug(&self, requested: &str, card_id: &str) -> Result<String, AppError> {
        if self.try_claim(requested, card_id).await? {
            Ok(requested.to_string())
        } else {
            Err(AppError::Conflict(format!(
                "Slug '{}' is already in use",
                requested
            )))
        }
    }

    /// Generate and claim a free slug from `title`, adding `-2`, `-3`, … on
    /// collision. Long titles are cut to [`slug::MAX_SLUG_LEN`].
    ///
    /// Returns `None` when the title has no usable characters.
    async fn generate_slug(&self, title: &str, card_id: &str) -> Result<Option<String>, AppError> {
        let base = slug::truncate(&slug::slugify(title), slug::MAX_SLUG_LEN);
        if base.is_empty() {
            return Ok(None);
        }

        for n in 1..=MAX_SLUG_ATTEMPTS {
            let candidate = if n == 1 {
                base.clone()
            } else {
                slug::with_suffix(&base, n)
            };
            if self.try_claim(&candidate, card_id).await? {
                return Ok(Some(candidate));
            }
        }

        Err(AppError::Conflict(format!(
            "No free slug derived from '{}'",
            base
        )))
    }
}
