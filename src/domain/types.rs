//! # Domain Types
//!
//! Common data structures and enums shared by the stream, dispatch and reaction logic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::RegistrationError;

/// The six kinds of content polled from every source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    New,
    Comments,
    Reports,
    Mail,
    Queue,
    ModActions,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::New,
        Category::Comments,
        Category::Reports,
        Category::Mail,
        Category::Queue,
        Category::ModActions,
    ];

    /// Stable string identifier, also used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::New => "new",
            Category::Comments => "comments",
            Category::Reports => "reports",
            Category::Mail => "mail",
            Category::Queue => "queue",
            Category::ModActions => "mod_actions",
        }
    }

    /// Slot of this category in per-source arrays.
    pub fn index(&self) -> usize {
        match self {
            Category::New => 0,
            Category::Comments => 1,
            Category::Reports => 2,
            Category::Mail => 3,
            Category::Queue => 4,
            Category::ModActions => 5,
        }
    }

    /// Category an item looked up outside of a stream is filed under.
    pub fn for_kind(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Submission => Category::New,
            ItemKind::Comment => Category::Comments,
            ItemKind::MailMessage | ItemKind::MailConversation => Category::Mail,
            ItemKind::ModAction => Category::ModActions,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| RegistrationError::UnknownCategory(s.to_string()))
    }
}

/// Concrete type of a fetched item, computed once when the item is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Submission,
    Comment,
    MailMessage,
    MailConversation,
    ModAction,
}

impl ItemKind {
    /// Human-readable label used in messages and audit summaries.
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Submission => "submission",
            ItemKind::Comment => "comment",
            ItemKind::MailMessage | ItemKind::MailConversation => "modmail",
            ItemKind::ModAction => "mod action",
        }
    }

    pub fn is_mail(&self) -> bool {
        matches!(self, ItemKind::MailMessage | ItemKind::MailConversation)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One unit of content exactly as the content source returned it.
///
/// `data` is the opaque payload; the crate only reads a handful of well-known
/// text fields from it (`title`, `selftext`, `body`, `body_md`, `action`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub id: String,
    pub kind: ItemKind,
    /// Name of the community the item belongs to.
    pub source: String,
    #[serde(default)]
    pub removed: bool,
    /// Moderator who performed a mod action.
    #[serde(default)]
    pub actor: Option<String>,
    /// Submission id a comment belongs to.
    #[serde(default)]
    pub link_id: Option<String>,
    /// Conversation a mail message belongs to.
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl RawItem {
    pub fn new(id: impl Into<String>, kind: ItemKind, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            source: source.into(),
            removed: false,
            actor: None,
            link_id: None,
            conversation_id: None,
            data: serde_json::Value::Null,
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_link(mut self, link_id: impl Into<String>) -> Self {
        self.link_id = Some(link_id.into());
        self
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    pub fn removed(mut self) -> Self {
        self.removed = true;
        self
    }

    /// Reads a string field out of the opaque payload.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(|v| v.as_str())
    }

    /// Id of the conversation a mail item lives in.
    pub fn conversation(&self) -> &str {
        match self.kind {
            ItemKind::MailMessage => self.conversation_id.as_deref().unwrap_or(&self.id),
            _ => &self.id,
        }
    }
}

/// Resolved author of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub deleted: bool,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deleted: false,
        }
    }
}

/// Parameters of a ban issued against an item's author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanRequest {
    /// Ban length in days, `None` for a permanent ban.
    pub duration: Option<u32>,
    pub message: String,
    pub reason: String,
    pub note: String,
}

/// Reference to an item parsed out of a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemLocator {
    Submission { id: String },
    Comment { link_id: String, id: String },
    Conversation { id: String },
}
