//! Card editor: the single view-state object behind the dashboard's edit
//! screen, and the controller that loads and saves it.

use crate::error::AppError;
use crate::models::{Card, CardInput};
use crate::services::cards::{CardRepository, Fetched};
use crate::services::links::{LinkDraft, SocialLinkManager, MAX_LINKS_PER_CARD};
use serde::{Deserialize, Serialize};

/// Section of the editor the user is looking at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorTab {
    #[default]
    Profile,
    Design,
    Social,
    Settings,
}

/// Everything the edit screen holds for one card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorState {
    /// `None` until the card has been saved once
    pub card_id: Option<String>,
    pub is_published: bool,
    pub active_tab: EditorTab,
    pub form: CardInput,
    pub links: LinkDraft,
}

impl EditorState {
    /// Blank state for a card that does not exist yet.
    pub fn new_card() -> Self {
        Self::default()
    }

    fn from_saved(card: &Card, links: LinkDraft, active_tab: EditorTab) -> Self {
        Self {
            card_id: Some(card.id.clone()),
            is_published: card.is_published,
            active_tab,
            form: CardInput::from(card),
            links,
        }
    }
}

/// Loads and saves [`EditorState`] through the card and link services.
pub struct CardEditor<'a> {
    cards: &'a CardRepository,
    links: &'a SocialLinkManager,
}

impl<'a> CardEditor<'a> {
    pub fn new(cards: &'a CardRepository, links: &'a SocialLinkManager) -> Self {
        Self { cards, links }
    }

    /// Load the editor for `card_id`, or a blank one.
    ///
    /// An unknown card is not an error here: the editor starts a new draft.
    pub async fn load(&self, owner_id: &str, card_id: Option<&str>) -> Result<EditorState, AppError> {
        let Some(card_id) = card_id else {
            return Ok(EditorState::new_card());
        };

        let (card, links) = futures_util::future::try_join(
            self.cards.fetch_card(card_id, owner_id),
            self.links.load_draft(card_id),
        )
        .await?;

        match card {
            Fetched::Found(card) => Ok(EditorState::from_saved(&card, links, EditorTab::default())),
            Fetched::NotFound => {
                tracing::info!(card_id, owner_id, "Card not found, starting new draft");
                Ok(EditorState::new_card())
            }
        }
    }

    /// Save the card, then its links.
    ///
    /// If the link write fails after the card write succeeded the card
    /// change stays stored and the error is returned.
    pub async fn save(&self, owner_id: &str, state: EditorState) -> Result<EditorState, AppError> {
        let complete = state.links.entries().iter().filter(|l| l.is_complete()).count();
        if complete > MAX_LINKS_PER_CARD {
            return Err(AppError::Validation(format!(
                "links: at most {} links per card",
                MAX_LINKS_PER_CARD
            )));
        }

        let card = self
            .cards
            .save_card(owner_id, state.card_id.as_deref(), state.form)
            .await?;

        let links = match self.links.persist_all(&card.id, &state.links).await {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!(
                    card_id = %card.id,
                    owner_id,
                    error = %e,
                    "Card saved but social links were not"
                );
                return Err(e);
            }
        };

        Ok(EditorState::from_saved(
            &card,
            LinkDraft::from_links(links),
            state.active_tab,
        ))
    }
}
