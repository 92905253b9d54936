// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Social link management: the editor's in-memory draft and replace-all
//! persistence.

use crate::db::RecordStore;
use crate::error::AppError;
use crate::models::{DraftLink, Platform, SocialLink};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Most links a single card may store.
pub const MAX_LINKS_PER_CARD: usize = 100;

/// Ordered, unsaved collection of link entries for one card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkDraft {
    entries: Vec<DraftLink>,
}

impl LinkDraft {
    /// Build a draft from client-sent entries, in the order given.
    ///
    /// Each entry goes through [`LinkDraft::upsert`], so URL-deriving
    /// platforms carry the URL their username implies.
    pub fn new(entries: Vec<DraftLink>) -> Self {
        let mut draft = Self::default();
        for entry in entries {
            draft.upsert(None, entry);
        }
        draft
    }

    /// Build a draft from stored links, in display order.
    pub fn from_links(mut links: Vec<SocialLink>) -> Self {
        links.sort_by_key(|l| l.display_order);
        Self {
            entries: links.into_iter().map(DraftLink::from).collect(),
        }
    }

    pub fn entries(&self) -> &[DraftLink] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add an entry (`index` is `None` or past the end) or replace one.
    ///
    /// Platforms that derive a URL always get it from the username. For
    /// other platforms, changing the platform or username without also
    /// changing the URL clears it. Returns the entry's position.
    pub fn upsert(&mut self, index: Option<usize>, mut link: DraftLink) -> usize {
        let previous = index.and_then(|i| self.entries.get(i));

        match link.platform.filter(|p| p.derives_url()) {
            Some(platform) => link.url = platform.profile_url(&link.username),
            None => {
                let stale_url = previous.is_some_and(|prev| {
                    (prev.platform != link.platform || prev.username != link.username)
                        && prev.url == link.url
                });
                if stale_url {
                    link.url = None;
                }
            }
        }

        match index {
            Some(i) if i < self.entries.len() => {
                self.entries[i] = link;
                i
            }
            _ => {
                link.display_order = self.entries.len() as u32;
                self.entries.push(link);
                self.entries.len() - 1
            }
        }
    }

    /// Remove the entry at `index`.
    ///
    /// Remaining `display_order` values are left as they are; they are
    /// made dense again on save.
    pub fn remove(&mut self, index: usize) -> Option<DraftLink> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Append one auto-synced entry per URL-deriving platform.
    ///
    /// Existing entries for the same platform are not merged, so calling
    /// this twice yields two entries per platform. Returns how many
    /// entries were added.
    pub fn auto_sync(&mut self, global_username: &str) -> usize {
        let mut added = 0;
        for platform in Platform::ALL {
            let Some(url) = platform.profile_url(global_username) else {
                continue;
            };
            self.entries.push(DraftLink {
                id: None,
                platform: Some(platform),
                username: global_username.trim().trim_start_matches('@').to_string(),
                url: Some(url),
                display_order: self.entries.len() as u32,
                is_active: true,
                auto_synced: true,
            });
            added += 1;
        }
        added
    }

    /// Records to store: complete entries only, numbered densely from 0 in
    /// their current order. Entries without an ID get a fresh one.
    pub fn to_records(&self, card_id: &str) -> Vec<SocialLink> {
        let now = Utc::now();
        self.entries
            .iter()
            .filter(|entry| entry.is_complete())
            .enumerate()
            .filter_map(|(order, entry)| {
                Some(SocialLink {
                    id: entry
                        .id
                        .clone()
                        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                    card_id: card_id.to_string(),
                    platform: entry.platform?,
                    username: entry.username.trim().to_string(),
                    url: entry.resolved_url()?,
                    display_order: order as u32,
                    is_active: entry.is_active,
                    auto_synced: entry.auto_synced,
                    created_at: now,
                })
            })
            .collect()
    }
}

/// Stores and loads the link collection of a card.
#[derive(Clone)]
pub struct SocialLinkManager {
    store: Arc<dyn RecordStore>,
}

impl SocialLinkManager {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Active links of a card, in display order.
    pub async fn list_links(&self, card_id: &str) -> Result<Vec<SocialLink>, AppError> {
        let mut links: Vec<SocialLink> = self
            .store
            .list_links(card_id)
            .await?
            .into_iter()
            .filter(|l| l.is_active)
            .collect();
        links.sort_by_key(|l| l.display_order);
        Ok(links)
    }

    /// All links of a card, active or not, as an editable draft.
    pub async fn load_draft(&self, card_id: &str) -> Result<LinkDraft, AppError> {
        Ok(LinkDraft::from_links(self.store.list_links(card_id).await?))
    }

    /// Replace the card's stored links with the complete entries of `draft`.
    ///
    /// The store swaps the whole set in one operation, so a failure leaves
    /// the previous links in place.
    pub async fn persist_all(
        &self,
        card_id: &str,
        draft: &LinkDraft,
    ) -> Result<Vec<SocialLink>, AppError> {
        let mut records = draft.to_records(card_id);
        if records.len() > MAX_LINKS_PER_CARD {
            return Err(AppError::Validation(format!(
                "links: at most {} links per card",
                MAX_LINKS_PER_CARD
            )));
        }

        // Only IDs already stored for this card are reused, once each.
        let existing = self.store.list_links(card_id).await?;
        let mut seen = HashSet::new();
        for record in &mut records {
            match existing.iter().find(|old| old.id == record.id) {
                Some(old) if seen.insert(record.id.clone()) => record.created_at = old.created_at,
                _ => record.id = uuid::Uuid::new_v4().to_string(),
            }
        }

        self.store.replace_links(card_id, &records).await?;

        tracing::info!(
            card_id,
            stored = records.len(),
            dropped = draft.len() - records.len(),
            "Social links persisted"
        );
        Ok(records)
    }
}
