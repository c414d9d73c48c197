//! # Application Layer
//!
//! Contains the core moderation logic of the bot.
//! This includes source streams and deduplication, handler dispatch with backoff,
//! and the reaction rule engine.

pub mod backoff;
pub mod dedup;
pub mod dispatcher;
pub mod engine;
pub mod filter;
pub mod handler;
pub mod item;
pub mod locator;
pub mod logging;
pub mod reaction;
pub mod relay;
pub mod source;
pub mod stream;
