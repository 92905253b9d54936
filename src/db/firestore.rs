// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides the record store operations for:
//! - Cards (one document per card, keyed by card ID)
//! - Social links (one document per link, queried by card ID)
//! - Profiles (one document per account, keyed by owner ID)
//! - Slug claims (one document per slug, created only if absent)
//!
//! Multi-document writes read their current state through a client bound
//! to the same transaction, so a concurrent writer makes the commit fail
//! instead of being silently overwritten.

use crate::db::{collections, RecordStore};
use crate::error::AppError;
use crate::models::{Card, Profile, SocialLink};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use firestore::errors::FirestoreError;
use firestore::{FirestoreConsistencySelector, FirestoreTransaction, FirestoreWritePrecondition};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Card fields written by `put_card`. `view_count` is left out so owner
/// saves never overwrite views counted in the meantime.
const CARD_WRITE_FIELDS: [&str; 20] = [
    "id",
    "owner_id",
    "title",
    "slug",
    "company",
    "position",
    "bio",
    "avatar_url",
    "phone",
    "whatsapp",
    "email",
    "website",
    "address",
    "map_link",
    "theme",
    "shape",
    "layout",
    "is_published",
    "created_at",
    "updated_at",
];

/// Document stored under `card_slugs/{slug}`.
#[derive(Debug, Serialize, Deserialize)]
struct SlugClaim {
    card_id: String,
    claimed_at: DateTime<Utc>,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a disconnected client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    async fn begin(client: &firestore::FirestoreDb) -> Result<FirestoreTransaction<'_>, AppError> {
        client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))
    }

    async fn commit(transaction: FirestoreTransaction<'_>) -> Result<(), AppError> {
        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;
        Ok(())
    }

    async fn rollback(transaction: FirestoreTransaction<'_>) {
        if let Err(e) = transaction.rollback().await {
            tracing::warn!(error = %e, "Transaction rollback failed");
        }
    }

    /// A client whose reads run inside `transaction`.
    fn reader(
        client: &firestore::FirestoreDb,
        transaction: &FirestoreTransaction<'_>,
    ) -> firestore::FirestoreDb {
        client.clone_with_consistency_selector(FirestoreConsistencySelector::Transaction(
            transaction.transaction_id().clone(),
        ))
    }

    async fn query_links(
        client: &firestore::FirestoreDb,
        card_id: &str,
    ) -> Result<Vec<SocialLink>, AppError> {
        client
            .fluent()
            .select()
            .from(collections::SOCIAL_LINKS)
            .filter(|q| q.for_all([q.field("card_id").eq(card_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn read_slug_claim(
        client: &firestore::FirestoreDb,
        slug: &str,
    ) -> Result<Option<SlugClaim>, AppError> {
        client
            .fluent()
            .select()
            .by_id_in(collections::SLUG_CLAIMS)
            .obj()
            .one(slug)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for FirestoreDb {
    // ─── Card Operations ─────────────────────────────────────────

    async fn list_cards(&self, owner_id: &str) -> Result<Vec<Card>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CARDS)
            .filter(|q| q.for_all([q.field("owner_id").eq(owner_id)]))
            .order_by([("updated_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn get_card(&self, card_id: &str) -> Result<Option<Card>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CARDS)
            .obj()
            .one(card_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_card_by_slug(&self, slug: &str) -> Result<Option<Card>, AppError> {
        let cards: Vec<Card> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::CARDS)
            .filter(|q| q.for_all([q.field("slug").eq(slug)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(cards.into_iter().next())
    }

    async fn put_card(&self, card: &Card) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(CARD_WRITE_FIELDS)
            .in_col(collections::CARDS)
            .document_id(&card.id)
            .object(card)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Reads the card and its links, then deletes them and the card's slug
    /// claim, all inside one transaction.
    async fn delete_card(&self, card_id: &str) -> Result<usize, AppError> {
        let client = self.get_client()?;
        let mut transaction = Self::begin(client).await?;
        let reader = Self::reader(client, &transaction);

        let card: Option<Card> = reader
            .fluent()
            .select()
            .by_id_in(collections::CARDS)
            .obj()
            .one(card_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let links = Self::query_links(&reader, card_id).await?;
        let claimed_slug = match card.as_ref().and_then(|c| c.slug.as_deref()) {
            Some(slug) => Self::read_slug_claim(&reader, slug)
                .await?
                .filter(|claim| claim.card_id == card_id)
                .map(|_| slug.to_string()),
            None => None,
        };

        if links.len() + 2 > BATCH_SIZE {
            Self::rollback(transaction).await;
            return Err(AppError::Database(format!(
                "Card {} has too many links to delete atomically ({})",
                card_id,
                links.len()
            )));
        }

        for link in &links {
            client
                .fluent()
                .delete()
                .from(collections::SOCIAL_LINKS)
                .document_id(&link.id)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add link deletion to transaction: {}", e))
                })?;
        }

        if let Some(slug) = &claimed_slug {
            client
                .fluent()
                .delete()
                .from(collections::SLUG_CLAIMS)
                .document_id(slug)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add slug release to transaction: {}", e))
                })?;
        }

        client
            .fluent()
            .delete()
            .from(collections::CARDS)
            .document_id(card_id)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add card deletion to transaction: {}", e))
            })?;

        Self::commit(transaction).await?;

        let deleted = links.len() + usize::from(card.is_some());
        tracing::debug!(card_id, deleted, slug = ?claimed_slug, "Deleted card and links");
        Ok(deleted)
    }

    /// Reads the card and applies a server-side increment in one
    /// transaction, so the returned count is exact.
    async fn increment_view_count(&self, card_id: &str) -> Result<Option<u64>, AppError> {
        let client = self.get_client()?;
        let mut transaction = Self::begin(client).await?;

        let card: Option<Card> = Self::reader(client, &transaction)
            .fluent()
            .select()
            .by_id_in(collections::CARDS)
            .obj()
            .one(card_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let Some(card) = card else {
            Self::rollback(transaction).await;
            return Ok(None);
        };

        client
            .fluent()
            .update()
            .in_col(collections::CARDS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .transforms(|t| t.fields([t.field("view_count").increment(1)]))
            .document_id(card_id)
            .only_transform()
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add view increment to transaction: {}", e))
            })?;

        Self::commit(transaction).await?;
        Ok(Some(card.view_count.saturating_add(1)))
    }

    // ─── Social Link Operations ──────────────────────────────────

    async fn list_links(&self, card_id: &str) -> Result<Vec<SocialLink>, AppError> {
        Self::query_links(self.get_client()?, card_id).await
    }

    /// Reads the stored set, writes the new one and deletes stored links
    /// whose IDs are not in it, all inside one transaction.
    async fn replace_links(&self, card_id: &str, links: &[SocialLink]) -> Result<(), AppError> {
        let client = self.get_client()?;
        let mut transaction = Self::begin(client).await?;
        let existing = Self::query_links(&Self::reader(client, &transaction), card_id).await?;

        let keep: HashSet<&str> = links.iter().map(|l| l.id.as_str()).collect();
        let stale: Vec<&SocialLink> = existing
            .iter()
            .filter(|l| !keep.contains(l.id.as_str()))
            .collect();

        if links.len() + stale.len() > BATCH_SIZE {
            Self::rollback(transaction).await;
            return Err(AppError::Database(format!(
                "Too many link writes for one transaction ({})",
                links.len() + stale.len()
            )));
        }

        for link in links {
            client
                .fluent()
                .update()
                .in_col(collections::SOCIAL_LINKS)
                .document_id(&link.id)
                .object(link)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add link to transaction: {}", e))
                })?;
        }

        for link in &stale {
            client
                .fluent()
                .delete()
                .from(collections::SOCIAL_LINKS)
                .document_id(&link.id)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add link deletion to transaction: {}", e))
                })?;
        }

        Self::commit(transaction).await?;

        tracing::debug!(
            card_id,
            written = links.len(),
            removed = stale.len(),
            "Replaced social links"
        );
        Ok(())
    }

    // ─── Slug Claim Operations ───────────────────────────────────

    /// Creates `card_slugs/{slug}`; the insert fails if the document exists,
    /// in which case the stored holder decides.
    async fn claim_slug(&self, slug: &str, card_id: &str) -> Result<bool, AppError> {
        let client = self.get_client()?;
        let claim = SlugClaim {
            card_id: card_id.to_string(),
            claimed_at: Utc::now(),
        };

        let inserted: Result<SlugClaim, FirestoreError> = client
            .fluent()
            .insert()
            .into(collections::SLUG_CLAIMS)
            .document_id(slug)
            .object(&claim)
            .execute()
            .await;

        match inserted {
            Ok(_) => Ok(true),
            Err(FirestoreError::DataConflictError(_)) => {
                let holder = Self::read_slug_claim(client, slug).await?;
                Ok(holder.is_some_and(|claim| claim.card_id == card_id))
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    async fn release_slug(&self, slug: &str, card_id: &str) -> Result<(), AppError> {
        let client = self.get_client()?;
        let mut transaction = Self::begin(client).await?;

        let holder = Self::read_slug_claim(&Self::reader(client, &transaction), slug).await?;
        if !holder.is_some_and(|claim| claim.card_id == card_id) {
            Self::rollback(transaction).await;
            return Ok(());
        }

        client
            .fluent()
            .delete()
            .from(collections::SLUG_CLAIMS)
            .document_id(slug)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add slug release to transaction: {}", e))
            })?;

        Self::commit(transaction).await
    }

    // ─── Profile Operations ──────────────────────────────────────

    async fn get_profile(&self, owner_id: &str) -> Result<Option<Profile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PROFILES)
            .obj()
            .one(owner_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn put_profile(&self, profile: &Profile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PROFILES)
            .document_id(&profile.owner_id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
