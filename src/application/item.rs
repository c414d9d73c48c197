//! # Item
//!
//! Wraps one fetched unit of content together with the source it came from and
//! the category it was polled under. The author is resolved lazily and memoized.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::application::reaction::ReactionRule;
use crate::application::source::Source;
use crate::domain::traits::ContentSource;
use crate::domain::types::{Author, Category, ItemKind, RawItem};
use crate::strings::{logs, messages};

/// Longest body excerpt, in characters, before it is cut off with "...".
pub const BODY_LIMIT: usize = 1021;

pub struct Item {
    raw: RawItem,
    category: Category,
    source: Arc<Source>,
    capability: Arc<dyn ContentSource>,
    author: OnceCell<Option<Author>>,
    fetched_at: DateTime<Utc>,
}

impl Item {
    pub fn new(
        raw: RawItem,
        category: Category,
        source: Arc<Source>,
        capability: Arc<dyn ContentSource>,
    ) -> Self {
        Self {
            raw,
            category,
            source,
            capability,
            author: OnceCell::new(),
            fetched_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.raw.id
    }

    pub fn raw(&self) -> &RawItem {
        &self.raw
    }

    pub fn kind(&self) -> ItemKind {
        self.raw.kind
    }

    /// "submission", "comment", "modmail" or "mod action".
    pub fn type_label(&self) -> &'static str {
        self.raw.kind.label()
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn source(&self) -> &Arc<Source> {
        &self.source
    }

    /// The content source this item was fetched from; moderation actions go here.
    pub fn capability(&self) -> &Arc<dyn ContentSource> {
        &self.capability
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn is_removed(&self) -> bool {
        self.raw.removed
    }

    /// Resolves the author once. Failed lookups are logged and retried on the next call.
    pub async fn author(&self) -> Option<Author> {
        let resolved = self
            .author
            .get_or_try_init(|| async { self.capability.resolve_author(&self.raw).await })
            .await;

        match resolved {
            Ok(author) => author.clone(),
            Err(e) => {
                tracing::warn!("{}", logs::author_failed(self.id(), &e.to_string()));
                None
            }
        }
    }

    pub async fn is_author_removed(&self) -> bool {
        self.author()
            .await
            .is_none_or(|author| author.deleted || author.name.is_empty())
    }

    /// Author name, or `[deleted]` when the account is gone.
    pub async fn author_name(&self) -> String {
        match self.author().await {
            Some(author) if !author.deleted && !author.name.is_empty() => author.name,
            _ => messages::DELETED_AUTHOR.to_string(),
        }
    }

    /// Moderator behind a mod action; other items report their author.
    pub async fn actor_name(&self) -> String {
        match &self.raw.actor {
            Some(actor) => actor.clone(),
            None => self.author_name().await,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.raw.text("title")
    }

    pub fn url(&self) -> String {
        let source = self.source.name();
        match self.raw.kind {
            ItemKind::Submission => {
                format!("https://www.reddit.com/r/{source}/comments/{}", self.raw.id)
            }
            ItemKind::Comment => {
                let link = self.raw.link_id.as_deref().unwrap_or_default();
                let link = link.strip_prefix("t3_").unwrap_or(link);
                format!("https://www.reddit.com/r/{source}/comments/{link}/_/{}", self.raw.id)
            }
            ItemKind::MailMessage | ItemKind::MailConversation => {
                format!("https://mod.reddit.com/mail/all/{}", self.raw.conversation())
            }
            ItemKind::ModAction => format!("https://www.reddit.com/r/{source}/about/log"),
        }
    }

    /// Text content, truncated for display.
    pub fn body(&self) -> String {
        let field = match self.raw.kind {
            ItemKind::Submission => "selftext",
            ItemKind::Comment => "body",
            ItemKind::MailMessage | ItemKind::MailConversation => "body_md",
            ItemKind::ModAction => "action",
        };
        let text = self.raw.text(field).unwrap_or_default();

        if self.raw.kind == ItemKind::ModAction {
            return text.to_string();
        }
        if text.is_empty() && self.raw.kind == ItemKind::Submission {
            return "Empty".to_string();
        }
        truncate(text, BODY_LIMIT)
    }

    /// Reply text followed by the bot disclaimer pointing at this item's source.
    pub fn format_reply(&self, reply: &str) -> String {
        messages::reply_with_disclaimer(reply, &self.source.contact_url())
    }

    /// Reactions of the source that apply to this item.
    pub fn reactions(&self) -> Vec<ReactionRule> {
        self.source.reactions_for(self.raw.kind)
    }

    pub fn reaction(&self, emoji: &str) -> Option<ReactionRule> {
        self.source.reaction(self.raw.kind, emoji)
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("id", &self.raw.id)
            .field("kind", &self.raw.kind)
            .field("category", &self.category)
            .field("source", &self.source.name())
            .finish()
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
