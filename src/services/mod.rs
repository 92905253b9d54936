// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod cards;
pub mod editor;
pub mod links;

pub use cards::{CardRepository, Fetched};
pub use editor::{CardEditor, EditorState, EditorTab};
pub use links::{LinkDraft, SocialLinkManager};
