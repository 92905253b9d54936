//! In-process record store.
//!
//! Used for local runs (`STORE_BACKEND=memory`) and tests. Links are kept
//! as one vector per card so replacing them is a single map insert. Slug
//! claims go through `DashMap::entry`, which holds the shard lock while
//! the claim is decided.

use crate::db::RecordStore;
use crate::error::AppError;
use crate::models::{Card, Profile, SocialLink};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Default)]
struct Tables {
    cards: DashMap<String, Card>,
    links: DashMap<String, Vec<SocialLink>>,
    profiles: DashMap<String, Profile>,
    /// slug -> card ID
    slug_claims: DashMap<String, String>,
}

/// Memory-backed store. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryDb {
    tables: Arc<Tables>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored cards across all owners.
    pub fn card_count(&self) -> usize {
        self.tables.cards.len()
    }
}

#[async_trait]
impl RecordStore for MemoryDb {
    async fn list_cards(&self, owner_id: &str) -> Result<Vec<Card>, AppError> {
        let mut cards: Vec<Card> = self
            .tables
            .cards
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect();
        cards.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(cards)
    }

    async fn get_card(&self, card_id: &str) -> Result<Option<Card>, AppError> {
        Ok(self.tables.cards.get(card_id).map(|c| c.value().clone()))
    }

    async fn find_card_by_slug(&self, slug: &str) -> Result<Option<Card>, AppError> {
        Ok(self
            .tables
            .cards
            .iter()
            .find(|entry| entry.slug.as_deref() == Some(slug))
            .map(|entry| entry.value().clone()))
    }

    async fn put_card(&self, card: &Card) -> Result<(), AppError> {
        let mut card = card.clone();
        match self.tables.cards.entry(card.id.clone()) {
            Entry::Occupied(mut stored) => {
                card.view_count = stored.get().view_count;
                stored.insert(card);
            }
            Entry::Vacant(slot) => {
                card.view_count = 0;
                slot.insert(card);
            }
        }
        Ok(())
    }

    async fn increment_view_count(&self, card_id: &str) -> Result<Option<u64>, AppError> {
        Ok(self.tables.cards.get_mut(card_id).map(|mut card| {
            card.view_count = card.view_count.saturating_add(1);
            card.view_count
        }))
    }

    async fn delete_card(&self, card_id: &str) -> Result<usize, AppError> {
        let links = self
            .tables
            .links
            .remove(card_id)
            .map(|(_, links)| links.len())
            .unwrap_or(0);
        let removed = self.tables.cards.remove(card_id);
        if let Some(slug) = removed.as_ref().and_then(|(_, card)| card.slug.as_deref()) {
            self.tables
                .slug_claims
                .remove_if(slug, |_, holder| holder == card_id);
        }
        Ok(links + usize::from(removed.is_some()))
    }

    async fn list_links(&self, card_id: &str) -> Result<Vec<SocialLink>, AppError> {
        Ok(self
            .tables
            .links
            .get(card_id)
            .map(|links| links.value().clone())
            .unwrap_or_default())
    }

    async fn replace_links(&self, card_id: &str, links: &[SocialLink]) -> Result<(), AppError> {
        self.tables
            .links
            .insert(card_id.to_string(), links.to_vec());
        Ok(())
    }

    async fn claim_slug(&self, slug: &str, card_id: &str) -> Result<bool, AppError> {
        Ok(match self.tables.slug_claims.entry(slug.to_string()) {
            Entry::Occupied(holder) => holder.get() == card_id,
            Entry::Vacant(slot) => {
                slot.insert(card_id.to_string());
                true
            }
        })
    }

    async fn release_slug(&self, slug: &str, card_id: &str) -> Result<(), AppError> {
        self.tables
            .slug_claims
            .remove_if(slug, |_, holder| holder == card_id);
        Ok(())
    }

    async fn get_profile(&self, owner_id: &str) -> Result<Option<Profile>, AppError> {
        Ok(self.tables.profiles.get(owner_id).map(|p| p.value().clone()))
    }

    async fn put_profile(&self, profile: &Profile) -> Result<(), AppError> {
        self.tables
            .profiles
            .insert(profile.owner_id.clone(), profile.clone());
        Ok(())
    }
}
