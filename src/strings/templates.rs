//! # Templates
//!
//! Exposes the bundled files from the `templates/` directory.

/// Reaction rules used by sources that do not configure their own.
pub const DEFAULT_REACTIONS: &str = include_str!("../../templates/reactions.yaml");
