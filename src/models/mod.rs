// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod analytics;
pub mod card;
pub mod profile;
pub mod social_link;

pub use analytics::DashboardSummary;
pub use card::{Alignment, Card, CardInput, Layout, LayoutStyle, Shape, Theme};
pub use profile::Profile;
pub use social_link::{DraftLink, Platform, SocialLink};
