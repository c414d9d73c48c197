//! # Reaction Engine
//!
//! Applies a reaction rule to an item in a fixed order and records what happened
//! on a fresh payload. Every moderation action is attempted on its own: a failing
//! action is collected on the payload and the remaining ones still run.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::application::item::Item;
use crate::application::reaction::ReactionRule;
use crate::domain::error::SourceError;
use crate::domain::types::{BanRequest, ItemKind};
use crate::strings::{logs, messages};

/// Tag recorded when a reaction changed nothing.
pub const DISMISSED: &str = "dismissed";

/// A moderation action that the content source rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionFailure {
    pub action: String,
    pub error: SourceError,
}

/// Outcome of one reaction execution.
#[derive(Debug, Clone)]
pub struct ReactionPayload {
    pub item: Arc<Item>,
    pub user: String,
    pub approved: bool,
    pub reply: String,
    pub emoji: String,
    pub actions: Vec<String>,
    pub failures: Vec<ActionFailure>,
    pub created_at: DateTime<Utc>,
}

impl ReactionPayload {
    pub fn new(item: Arc<Item>, user: &str, rule: &ReactionRule) -> Self {
        let user = match user.trim() {
            "" => messages::BOT_USER.to_string(),
            user => user.to_string(),
        };
        Self {
            item,
            user,
            approved: rule.approve,
            reply: rule.reply.clone(),
            emoji: rule.emoji.clone(),
            actions: Vec::new(),
            failures: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn actions_or_dismissed(&self) -> Vec<&str> {
        if self.actions.is_empty() {
            return vec![DISMISSED];
        }
        self.actions.iter().map(String::as_str).collect()
    }

    pub fn is_dismissed(&self) -> bool {
        self.actions.is_empty() || self.actions.iter().all(|a| a == DISMISSED)
    }

    /// Markdown report of the reaction, e.g. "**Submission removed and locked by mod!**".
    pub async fn summary(&self) -> String {
        messages::payload_summary(
            self.item.kind().label(),
            &self.actions_or_dismissed(),
            &self.user,
            &self.item.author_name().await,
            &self.item.url(),
        )
    }

    fn record(&mut self, action: &str, tag: Option<String>, result: Result<(), SourceError>) -> bool {
        match result {
            Ok(()) => {
                if let Some(tag) = tag {
                    self.actions.push(tag);
                }
                true
            }
            Err(error) => {
                tracing::warn!("{}", logs::action_failed(action, self.item.id(), &error.to_string()));
                self.failures.push(ActionFailure {
                    action: action.to_string(),
                    error,
                });
                false
            }
        }
    }
}

/// Applies a reaction rule to an item. Implementations replace the built-in behaviour.
#[async_trait]
pub trait ReactionHandler: Send + Sync {
    async fn handle(&self, rule: &ReactionRule, item: &Item, payload: ReactionPayload) -> ReactionPayload;
}

/// Built-in handler for submissions, comments and modmail.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReactionEngine;

impl ReactionEngine {
    async fn handle_mail(&self, rule: &ReactionRule, item: &Item, payload: &mut ReactionPayload) {
        let capability = item.capability();
        let conversation = item.raw().conversation();

        if rule.archive {
            let result = capability.archive(conversation).await;
            payload.record("archive", Some("archived".to_string()), result);
        }
        if rule.mute {
            let result = capability.mute(conversation).await;
            payload.record("mute", Some("muted".to_string()), result);
        }
        if !rule.reply.is_empty() {
            let result = capability.reply_conversation(conversation, &rule.reply).await;
            payload.record("reply", Some("replied to".to_string()), result);
        }
    }

    async fn handle_post(&self, rule: &ReactionRule, item: &Item, payload: &mut ReactionPayload) {
        let capability = item.capability();
        let raw = item.raw();

        if item.is_removed() || item.is_author_removed().await {
            let result = capability.remove(raw).await;
            payload.record("remove", Some("removed".to_string()), result);
            let result = capability.lock(raw).await;
            payload.record("lock", Some("locked".to_string()), result);

            payload.approved = false;
            payload.user = messages::BOT_USER.to_string();
            return;
        }

        if rule.approve {
            let result = capability.approve(raw).await;
            payload.record("approve", Some("approved".to_string()), result);
        } else {
            let result = capability.remove(raw).await;
            payload.record("remove", Some("removed".to_string()), result);
        }

        if rule.lock || !rule.approve {
            let result = capability.lock(raw).await;
            payload.record("lock", Some("locked".to_string()), result);
        } else {
            let result = capability.unlock(raw).await;
            payload.record("unlock", None, result);
        }

        if item.kind() == ItemKind::Submission {
            if !rule.flair.is_empty() {
                let result = capability.flair(raw, &rule.flair).await;
                payload.record("flair", Some("flaired".to_string()), result);
            }
            if rule.mark_nsfw {
                let result = capability.mark_nsfw(raw).await;
                payload.record("mark NSFW", Some("marked NSFW".to_string()), result);
            }
        }

        if !rule.reply.is_empty() {
            match capability.reply(raw, &rule.reply).await {
                Ok(reply) => {
                    if rule.distinguishes() {
                        let result = capability.distinguish(&reply, rule.sticky_reply).await;
                        payload.record("distinguish", None, result);
                    }
                    payload.actions.push("replied to".to_string());
                }
                Err(e) => {
                    payload.record("reply", None, Err(e));
                }
            }
        }

        if let Some(days) = rule.ban {
            let author = item.author_name().await;
            let permanent = days == 0;
            let request = BanRequest {
                duration: (!permanent).then_some(days),
                message: messages::ban_message(&item.url(), permanent, &item.source().contact_url()),
                reason: messages::BAN_REASON.to_string(),
                note: messages::BAN_NOTE.to_string(),
            };
            let tag = if permanent {
                messages::permanently_banned(&author)
            } else {
                messages::banned_for_days(&author, days)
            };
            let result = capability.ban(item.source().name(), &author, &request).await;
            payload.record("ban", Some(tag), result);
        }
    }
}

#[async_trait]
impl ReactionHandler for ReactionEngine {
    async fn handle(&self, rule: &ReactionRule, item: &Item, mut payload: ReactionPayload) -> ReactionPayload {
        if item.kind().is_mail() {
            self.handle_mail(rule, item, &mut payload).await;
        } else {
            self.handle_post(rule, item, &mut payload).await;
        }

        if payload.actions.is_empty() && payload.failures.is_empty() {
            payload.actions.push(DISMISSED.to_string());
        }

        tracing::info!("{}", logs::reaction_applied(&rule.emoji, item.id(), &payload.actions));
        payload
    }
}
