//! # Banhammer
//!
//! Moderation bot core for Reddit-style communities. Polls the streams of every
//! monitored source, forwards unseen items to registered handlers and applies
//! emoji-keyed reaction rules to items.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod strings;

#[cfg(test)]
mod test_support;

pub use application::dispatcher::{Dispatcher, TickReport};
pub use application::engine::{ReactionEngine, ReactionHandler, ReactionPayload};
pub use application::filter::{Attribute, EventFilter};
pub use application::handler::{HandlerBuilder, HandlerId};
pub use application::item::Item;
pub use application::reaction::{ReactionRule, ReactionType};
pub use application::source::Source;
pub use domain::config::BanhammerConfig;
pub use domain::error::{ReactionError, RegistrationError, RuleParseError, SourceError};
pub use domain::traits::{ChatProvider, ContentSource, Presence};
pub use domain::types::{Category, ItemKind, RawItem};
