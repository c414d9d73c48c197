//! # Domain Traits
//!
//! Abstract interfaces for the collaborators the core depends on (content source,
//! presence indicator, chat). Concrete implementations live in the Infrastructure layer.

use async_trait::async_trait;

use crate::domain::error::SourceError;
use crate::domain::types::{Author, BanRequest, Category, ItemLocator, RawItem};

/// Abstract interface for a moderated content source (e.g., a Reddit client).
///
/// Batches are returned newest first. Every call may fail; failures are reported as
/// `SourceError` and never panic.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the most recent `limit` entries of one category for a community.
    async fn fetch(
        &self,
        source: &str,
        category: Category,
        limit: usize,
    ) -> Result<Vec<RawItem>, SourceError>;

    /// Resolve the author of an item. `None` means the account is gone.
    async fn resolve_author(&self, item: &RawItem) -> Result<Option<Author>, SourceError>;

    /// Look up a single item referenced by URL.
    async fn fetch_item(&self, locator: &ItemLocator) -> Result<Option<RawItem>, SourceError>;

    async fn approve(&self, item: &RawItem) -> Result<(), SourceError>;

    async fn remove(&self, item: &RawItem) -> Result<(), SourceError>;

    async fn lock(&self, item: &RawItem) -> Result<(), SourceError>;

    async fn unlock(&self, item: &RawItem) -> Result<(), SourceError>;

    async fn flair(&self, item: &RawItem, text: &str) -> Result<(), SourceError>;

    async fn mark_nsfw(&self, item: &RawItem) -> Result<(), SourceError>;

    /// Reply to a submission or comment, returning the created reply.
    async fn reply(&self, item: &RawItem, text: &str) -> Result<RawItem, SourceError>;

    async fn distinguish(&self, reply: &RawItem, sticky: bool) -> Result<(), SourceError>;

    async fn ban(&self, source: &str, author: &str, ban: &BanRequest) -> Result<(), SourceError>;

    async fn archive(&self, conversation_id: &str) -> Result<(), SourceError>;

    async fn mute(&self, conversation_id: &str) -> Result<(), SourceError>;

    async fn reply_conversation(&self, conversation_id: &str, text: &str)
    -> Result<(), SourceError>;
}

/// Best-effort "currently polling" indicator of a connected bot.
#[async_trait]
pub trait Presence: Send + Sync {
    async fn set_active(&self) -> Result<(), String>;

    async fn clear_active(&self) -> Result<(), String>;
}

/// Abstract interface for a Chat Provider (e.g., Matrix)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a message to the room
    async fn send_message(&self, content: &str) -> Result<String, String>;

    /// Send a notification (not tracked/editable)
    async fn send_notification(&self, content: &str) -> Result<(), String>;

    /// Get the current room ID
    fn room_id(&self) -> String;
}
