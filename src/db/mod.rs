//! Database layer: the record store behind the repositories.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{Card, Profile, SocialLink};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const CARDS: &str = "business_cards";
    pub const SOCIAL_LINKS: &str = "social_links";
    pub const PROFILES: &str = "profiles";
    /// One document per claimed slug, keyed by the slug itself.
    pub const SLUG_CLAIMS: &str = "card_slugs";
}

/// Table-oriented store for cards, their links and account profiles.
///
/// Lookups are by document ID or field equality. The two multi-document
/// writes (`replace_links`, `delete_card`) must be all-or-nothing, and
/// slug claims must be decided by the store, not by a prior read.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All cards owned by `owner_id`, most recently updated first.
    async fn list_cards(&self, owner_id: &str) -> Result<Vec<Card>, AppError>;

    async fn get_card(&self, card_id: &str) -> Result<Option<Card>, AppError>;

    /// The card holding `slug`, if any.
    async fn find_card_by_slug(&self, slug: &str) -> Result<Option<Card>, AppError>;

    /// Insert or overwrite a card by ID.
    ///
    /// The stored view counter is left as it is; a new card starts at zero.
    async fn put_card(&self, card: &Card) -> Result<(), AppError>;

    /// Add one to a card's view counter in a single store-side step.
    ///
    /// Returns the new count, or `None` if the card does not exist.
    async fn increment_view_count(&self, card_id: &str) -> Result<Option<u64>, AppError>;

    /// Delete a card together with its social links and its slug claim.
    ///
    /// Returns the number of card and link documents removed.
    async fn delete_card(&self, card_id: &str) -> Result<usize, AppError>;

    /// Every link stored for a card, in no particular order.
    async fn list_links(&self, card_id: &str) -> Result<Vec<SocialLink>, AppError>;

    /// Make `links` the complete stored set for `card_id`.
    async fn replace_links(&self, card_id: &str, links: &[SocialLink]) -> Result<(), AppError>;

    /// Claim `slug` for `card_id` if nobody holds it.
    ///
    /// Returns `true` when the slug is now held by `card_id` (including when
    /// it already was) and `false` when another card holds it.
    async fn claim_slug(&self, slug: &str, card_id: &str) -> Result<bool, AppError>;

    /// Drop the claim on `slug` if `card_id` holds it.
    async fn release_slug(&self, slug: &str, card_id: &str) -> Result<(), AppError>;

    async fn get_profile(&self, owner_id: &str) -> Result<Option<Profile>, AppError>;

    async fn put_profile(&self, profile: &Profile) -> Result<(), AppError>;
}
