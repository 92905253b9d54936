// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Business card model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Stored card record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Card {
    /// Card ID (UUID, also used as document ID)
    pub id: String,
    /// Owning account ID (session subject)
    pub owner_id: String,
    /// Display title
    pub title: String,
    /// Public path segment, unique across all cards
    pub slug: Option<String>,
    pub company: Option<String>,
    /// Position or profession
    pub position: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub map_link: Option<String>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub shape: Shape,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Build a new unpublished card from validated form input.
    pub fn new(id: String, owner_id: &str, input: CardInput, now: DateTime<Utc>) -> Self {
        let mut card = Self {
            id,
            owner_id: owner_id.to_string(),
            title: String::new(),
            slug: None,
            company: None,
            position: None,
            bio: None,
            avatar_url: None,
            phone: None,
            whatsapp: None,
            email: None,
            website: None,
            address: None,
            map_link: None,
            theme: Theme::default(),
            shape: Shape::default(),
            layout: Layout::default(),
            is_published: false,
            view_count: 0,
            created_at: now,
            updated_at: now,
        };
        card.apply(input);
        card
    }

    /// Copy form fields onto the record.
    ///
    /// Unset theme/shape/layout keep their current values. The slug is
    /// handled by the repository since it needs a uniqueness check.
    pub fn apply(&mut self, input: CardInput) {
        self.title = input.title.trim().to_string();
        self.company = input.company;
        self.position = input.position;
        self.bio = input.bio;
        self.avatar_url = input.avatar_url;
        self.phone = input.phone;
        self.whatsapp = input.whatsapp;
        self.email = input.email;
        self.website = input.website;
        self.address = input.address;
        self.map_link = input.map_link;
        if let Some(theme) = input.theme {
            self.theme = theme;
        }
        if let Some(shape) = input.shape {
            self.shape = shape;
        }
        if let Some(layout) = input.layout {
            self.layout = layout;
        }
    }
}

/// Named colour set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Theme {
    pub name: String,
    pub primary: String,
    pub secondary: String,
    pub background: String,
    pub text: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "modern".to_string(),
            primary: "#2563eb".to_string(),
            secondary: "#7c3aed".to_string(),
            background: "#ffffff".to_string(),
            text: "#111827".to_string(),
        }
    }
}

/// Card outline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Rectangle,
    #[default]
    Rounded,
    Circle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStyle {
    Classic,
    #[default]
    Modern,
    Minimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Layout {
    pub style: LayoutStyle,
    pub alignment: Alignment,
    pub font: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            style: LayoutStyle::default(),
            alignment: Alignment::default(),
            font: "Inter".to_string(),
        }
    }
}

/// Editable card fields as submitted by the dashboard form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(default)]
pub struct CardInput {
    #[validate(length(min = 1, max = 120, message = "Title is required"))]
    pub title: String,
    #[validate(length(max = 80))]
    pub slug: Option<String>,
    #[validate(length(max = 120))]
    pub company: Option<String>,
    #[validate(length(max = 120))]
    pub position: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(length(max = 40))]
    pub whatsapp: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(length(max = 300))]
    pub address: Option<String>,
    #[validate(url)]
    pub map_link: Option<String>,
    pub theme: Option<Theme>,
    pub shape: Option<Shape>,
    pub layout: Option<Layout>,
}

impl CardInput {
    /// Turn blank optional fields into `None` and trim the title.
    ///
    /// HTML forms post empty strings for untouched inputs.
    pub fn normalized(mut self) -> Self {
        fn blank_to_none(field: &mut Option<String>) {
            if let Some(value) = field.take() {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    *field = Some(trimmed.to_string());
                }
            }
        }

        self.title = self.title.trim().to_string();
        for field in [
            &mut self.slug,
            &mut self.company,
            &mut self.position,
            &mut self.bio,
            &mut self.avatar_url,
            &mut self.phone,
            &mut self.whatsapp,
            &mut self.email,
            &mut self.website,
            &mut self.address,
            &mut self.map_link,
        ] {
            blank_to_none(field);
        }
        self
    }
}

impl From<&Card> for CardInput {
    fn from(card: &Card) -> Self {
        Self {
            title: card.title.clone(),
            slug: card.slug.clone(),
            company: card.company.clone(),
            position: card.position.clone(),
            bio: card.bio.clone(),
            avatar_url: card.avatar_url.clone(),
            phone: card.phone.clone(),
            whatsapp: card.whatsapp.clone(),
            email: card.email.clone(),
            website: card.website.clone(),
            address: card.address.clone(),
            map_link: card.map_link.clone(),
            theme: Some(card.theme.clone()),
            shape: Some(card.shape),
            layout: Some(card.layout.clone()),
        }
    }
}
