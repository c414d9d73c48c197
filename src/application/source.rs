//! # Source
//!
//! A monitored community: owns one stream per category, the reaction rules and the
//! mod action allow-list. Reaction rules are only ever replaced as a whole.

use futures::stream::BoxStream;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::application::dedup::DEFAULT_CAPACITY;
use crate::application::engine::{ReactionHandler, ReactionPayload};
use crate::application::item::Item;
use crate::application::reaction::{self, ReactionRule, ReactionSet};
use crate::application::stream::{DrawOptions, SourceStream};
use crate::domain::config::{SourceConfig, StreamToggles};
use crate::domain::error::{ReactionError, RuleParseError, SourceError};
use crate::domain::traits::ContentSource;
use crate::domain::types::{Category, ItemKind};
use crate::strings::{logs, templates};

pub struct Source {
    name: String,
    streams: [SourceStream; 6],
    toggles: StreamToggles,
    moderators: Vec<String>,
    reactions: RwLock<ReactionSet>,
}

impl Source {
    /// A source with the default streams and no reactions.
    pub fn new(name: &str) -> Self {
        Self::with_capacity(name, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(name: &str, capacity: usize) -> Self {
        Self {
            name: normalize_name(name),
            streams: Category::ALL.map(|category| SourceStream::new(category, capacity)),
            toggles: StreamToggles::default(),
            moderators: Vec::new(),
            reactions: RwLock::new(ReactionSet::default()),
        }
    }

    /// Builds a source from config, falling back to the bundled reactions.
    pub fn from_config(config: &SourceConfig, capacity: usize) -> Result<Self, RuleParseError> {
        let source = Self::with_capacity(&config.name, capacity)
            .with_streams(config.streams)
            .with_moderators(config.moderators.iter().map(String::as_str));

        let rules = config.reactions.as_deref().unwrap_or(templates::DEFAULT_REACTIONS);
        source.load_reactions(rules)?;
        Ok(source)
    }

    pub fn with_streams(mut self, toggles: StreamToggles) -> Self {
        self.toggles = toggles;
        self
    }

    /// Restricts the mod action stream to these moderators.
    pub fn with_moderators<'a>(mut self, moderators: impl IntoIterator<Item = &'a str>) -> Self {
        self.moderators = moderators
            .into_iter()
            .map(|m| m.trim().to_lowercase())
            .filter(|m| !m.is_empty())
            .collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compares against a user-supplied name such as `r/Pics` or `/r/pics/`.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name == normalize_name(name)
    }

    pub fn is_streaming(&self, category: Category) -> bool {
        self.toggles.is_enabled(category)
    }

    pub fn stream(&self, category: Category) -> &SourceStream {
        &self.streams[category.index()]
    }

    pub fn accepts_actor(&self, actor: Option<&str>) -> bool {
        if self.moderators.is_empty() {
            return true;
        }
        actor.is_some_and(|a| self.moderators.contains(&a.to_lowercase()))
    }

    /// Lazily fetches one category and yields the unseen items, oldest first.
    pub fn draw(
        self: &Arc<Self>,
        category: Category,
        capability: Arc<dyn ContentSource>,
        options: DrawOptions,
    ) -> BoxStream<'static, Result<Arc<Item>, SourceError>> {
        let source = Arc::clone(self);
        Box::pin(async_stream::try_stream! {
            let fresh = source
                .stream(category)
                .collect(&source, capability.as_ref(), options)
                .await?;
            for raw in fresh {
                yield Arc::new(Item::new(raw, category, source.clone(), capability.clone()));
            }
        })
    }

    /// Replaces the rule list with the rules parsed from `text`.
    pub fn load_reactions(&self, text: &str) -> Result<usize, RuleParseError> {
        let set = reaction::parse_reactions(text)?;
        let count = set.rules.len();
        tracing::info!("{}", logs::reactions_loaded(&self.name, count, set.ignore.len()));
        self.set_reactions(set);
        Ok(count)
    }

    pub fn set_reactions(&self, set: ReactionSet) {
        *self.reactions.write().unwrap_or_else(|e| e.into_inner()) = set;
    }

    /// Drops the rules with the given emoji and remembers them as ignored.
    pub fn ignore_reactions<'a>(&self, emoji: impl IntoIterator<Item = &'a str>) {
        let mut set = self.reactions.write().unwrap_or_else(|e| e.into_inner());
        for e in emoji {
            let e = e.trim();
            set.rules.retain(|r| r.emoji != e);
            if !set.ignore.iter().any(|i| i == e) {
                set.ignore.push(e.to_string());
            }
        }
    }

    pub fn reactions(&self) -> Vec<ReactionRule> {
        self.reactions.read().unwrap_or_else(|e| e.into_inner()).rules.clone()
    }

    pub fn ignored(&self) -> Vec<String> {
        self.reactions.read().unwrap_or_else(|e| e.into_inner()).ignore.clone()
    }

    pub fn reactions_for(&self, kind: ItemKind) -> Vec<ReactionRule> {
        self.reactions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .rules
            .iter()
            .filter(|r| r.eligible(kind))
            .cloned()
            .collect()
    }

    pub fn reaction(&self, kind: ItemKind, emoji: &str) -> Option<ReactionRule> {
        let set = self.reactions.read().unwrap_or_else(|e| e.into_inner());
        reaction::select(&set.rules, kind, emoji).cloned()
    }

    /// Selects the rule for `emoji` and applies it to `item`.
    pub async fn react(
        &self,
        item: &Arc<Item>,
        emoji: &str,
        user: &str,
        handler: &dyn ReactionHandler,
    ) -> Result<ReactionPayload, ReactionError> {
        let rule = self
            .reaction(item.kind(), emoji)
            .ok_or_else(|| ReactionError::MissingRule {
                emoji: emoji.trim().to_string(),
                kind: item.kind().label().to_string(),
                source_name: self.name.clone(),
            })?;

        rule.handle(Some(item.clone()), user, handler).await
    }

    /// One-line summary of the enabled streams.
    pub fn status(&self) -> String {
        let mut status = format!("/r/{}", self.name);
        let labels = [
            (Category::New, "New Posts"),
            (Category::Comments, "Comments"),
            (Category::Reports, "Reports"),
            (Category::Mail, "Mod-Mail"),
            (Category::Queue, "Mod-Queue"),
            (Category::ModActions, "Mod-Log"),
        ];
        for (category, label) in labels {
            if self.is_streaming(category) {
                status.push_str(" | ");
                status.push_str(label);
            }
        }
        status
    }

    pub fn contact_url(&self) -> String {
        format!("https://www.reddit.com/message/compose/?to=/r/{}", self.name)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Lower-cases a community name and strips `r/` prefixes and slashes.
pub fn normalize_name(name: &str) -> String {
    let name = name.trim().trim_matches('/').to_lowercase();
    let name = name.strip_prefix("r/").unwrap_or(&name);
    name.trim_matches('/').to_string()
}
