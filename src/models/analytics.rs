//! Dashboard summary computed from an owner's stored cards.
//!
//! Only figures that follow from stored data are reported; there is no
//! per-event tracking behind these numbers.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Card;

/// How many cards the "top cards" list holds.
pub const TOP_CARDS: usize = 5;

/// Aggregate figures for the dashboard overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DashboardSummary {
    // ─── Card Counts ─────────────────────────────────────────────
    pub total_cards: u32,
    pub published_cards: u32,
    pub draft_cards: u32,

    // ─── Views ───────────────────────────────────────────────────
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_views: u64,
    /// Most viewed cards, highest first
    pub top_cards: Vec<TopCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TopCard {
    pub id: String,
    pub title: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub views: u64,
}

impl DashboardSummary {
    /// Summarize a set of cards belonging to one owner.
    pub fn from_cards(cards: &[Card]) -> Self {
        let total_cards = cards.len() as u32;
        let published_cards = cards.iter().filter(|c| c.is_published).count() as u32;
        let total_views = cards.iter().map(|c| c.view_count).sum();

        let mut ranked: Vec<&Card> = cards.iter().collect();
        ranked.sort_by(|a, b| {
            b.view_count
                .cmp(&a.view_count)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        });

        let top_cards = ranked
            .into_iter()
            .take(TOP_CARDS)
            .map(|c| TopCard {
                id: c.id.clone(),
                title: if c.title.is_empty() {
                    "Untitled Card".to_string()
                } else {
                    c.title.clone()
                },
                views: c.view_count,
            })
            .collect();

        Self {
            total_cards,
            published_cards,
            draft_cards: total_cards - published_cards,
            total_views,
            top_cards,
        }
    }

    /// Render the summary as `Metric,Value` CSV rows.
    pub fn to_csv(&self) -> String {
        let rows = [
            ("Total Views", self.total_views),
            ("Total Cards", self.total_cards as u64),
            ("Published Cards", self.published_cards as u64),
            ("Draft Cards", self.draft_cards as u64),
        ];

        let mut csv = String::from("Metric,Value\n");
        for (metric, value) in rows {
            csv.push_str(&format!("{},{}\n", metric, value));
        }
        csv
    }
}
