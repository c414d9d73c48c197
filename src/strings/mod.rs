//! # Strings Module
//!
//! Centralizes user-facing strings, log lines and bundled templates.
//! Ensures consistency in messaging and easier updates.

pub mod logs;
pub mod messages;
pub mod templates;
