// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Social link records attached to a card.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Supported social platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linkedin,
    Twitter,
    Instagram,
    Facebook,
    Github,
    Youtube,
    Tiktok,
    Telegram,
    Pinterest,
    Snapchat,
    Website,
    Other,
}

impl Platform {
    /// Every platform, in the order auto-sync generates them.
    pub const ALL: [Platform; 12] = [
        Platform::Linkedin,
        Platform::Twitter,
        Platform::Instagram,
        Platform::Facebook,
        Platform::Github,
        Platform::Youtube,
        Platform::Tiktok,
        Platform::Telegram,
        Platform::Pinterest,
        Platform::Snapchat,
        Platform::Website,
        Platform::Other,
    ];

    /// Profile URL prefix, for platforms whose URL follows from a username.
    fn url_prefix(self) -> Option<&'static str> {
        match self {
            Platform::Linkedin => Some("https://www.linkedin.com/in/"),
            Platform::Twitter => Some("https://twitter.com/"),
            Platform::Instagram => Some("https://www.instagram.com/"),
            Platform::Facebook => Some("https://www.facebook.com/"),
            Platform::Github => Some("https://github.com/"),
            Platform::Youtube => Some("https://www.youtube.com/@"),
            Platform::Tiktok => Some("https://www.tiktok.com/@"),
            Platform::Telegram => Some("https://t.me/"),
            Platform::Pinterest => Some("https://www.pinterest.com/"),
            Platform::Snapchat => Some("https://www.snapchat.com/add/"),
            Platform::Website | Platform::Other => None,
        }
    }

    pub fn derives_url(self) -> bool {
        self.url_prefix().is_some()
    }

    /// Build the profile URL for `username`.
    ///
    /// Returns `None` for platforms without a fixed URL scheme and for
    /// usernames that are empty once a leading `@` is stripped.
    pub fn profile_url(self, username: &str) -> Option<String> {
        let prefix = self.url_prefix()?;
        let handle = username.trim().trim_start_matches('@');
        if handle.is_empty() {
            return None;
        }
        Some(format!("{}{}", prefix, urlencoding::encode(handle)))
    }
}

/// Stored social link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SocialLink {
    /// Link ID (UUID, also used as document ID)
    pub id: String,
    /// Owning card ID
    pub card_id: String,
    pub platform: Platform,
    pub username: String,
    pub url: String,
    /// Render position, dense from 0 per card
    pub display_order: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Generated by auto-sync from the account's global username
    #[serde(default)]
    pub auto_synced: bool,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// Editor-side link entry, not yet persisted.
///
/// Platform and URL may still be missing while the user is typing; such
/// entries are dropped on save. For platforms that derive a URL, `url` is
/// only a preview; the stored URL always comes from the username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DraftLink {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub display_order: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub auto_synced: bool,
}

impl DraftLink {
    pub fn new(platform: Platform, username: &str) -> Self {
        Self {
            id: None,
            platform: Some(platform),
            username: username.to_string(),
            url: None,
            display_order: 0,
            is_active: true,
            auto_synced: false,
        }
    }

    /// The URL this entry would be stored with.
    ///
    /// Derived from the username when the platform has a URL scheme,
    /// otherwise the entered URL, trimmed.
    pub fn resolved_url(&self) -> Option<String> {
        let platform = self.platform?;
        if platform.derives_url() {
            return platform.profile_url(&self.username);
        }
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
    }

    /// True when the entry has everything a stored link needs.
    pub fn is_complete(&self) -> bool {
        self.resolved_url().is_some()
    }
}

impl From<SocialLink> for DraftLink {
    fn from(link: SocialLink) -> Self {
        Self {
            id: Some(link.id),
            platform: Some(link.platform),
            username: link.username,
            url: Some(link.url),
            display_order: link.display_order,
            is_active: link.is_active,
            auto_synced: link.auto_synced,
        }
    }
}
