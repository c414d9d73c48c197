//! # Reaction Rules
//!
//! Declarative moderation bundles keyed by emoji, parsed from YAML. A rule file is
//! either a stream of YAML documents (one rule per document) or a single document
//! holding a list of rules. A record with an `ignore` key lists emoji to drop.

use serde::Deserialize;
use serde_yaml::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::application::engine::{ReactionHandler, ReactionPayload};
use crate::application::item::Item;
use crate::domain::error::{ReactionError, RuleParseError};
use crate::domain::types::ItemKind;

/// Item type a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReactionType {
    /// Unset: applies to every item type that can be reacted to.
    #[default]
    Any,
    Submission,
    Comment,
    Mail,
}

impl ReactionType {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "" => Some(ReactionType::Any),
            "submission" => Some(ReactionType::Submission),
            "comment" => Some(ReactionType::Comment),
            "mail" => Some(ReactionType::Mail),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Any => "",
            ReactionType::Submission => "submission",
            ReactionType::Comment => "comment",
            ReactionType::Mail => "mail",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReactionRule {
    pub emoji: String,
    pub kind: ReactionType,
    pub approve: bool,
    pub lock: bool,
    pub flair: String,
    pub mark_nsfw: bool,
    pub reply: String,
    pub distinguish_reply: bool,
    pub sticky_reply: bool,
    /// Ban length in days; `Some(0)` is permanent.
    pub ban: Option<u32>,
    pub archive: bool,
    pub mute: bool,
    pub min_votes: u32,
}

impl ReactionRule {
    /// A rule with every option at its default: remove, no reply, no ban.
    pub fn new(emoji: impl Into<String>) -> Self {
        Self {
            emoji: emoji.into().trim().to_string(),
            kind: ReactionType::Any,
            approve: false,
            lock: false,
            flair: String::new(),
            mark_nsfw: false,
            reply: String::new(),
            distinguish_reply: true,
            sticky_reply: true,
            ban: None,
            archive: false,
            mute: false,
            min_votes: 1,
        }
    }

    pub fn eligible(&self, kind: ItemKind) -> bool {
        match kind {
            ItemKind::Submission => {
                matches!(self.kind, ReactionType::Any | ReactionType::Submission)
            }
            ItemKind::Comment => matches!(self.kind, ReactionType::Any | ReactionType::Comment),
            ItemKind::MailMessage | ItemKind::MailConversation => {
                matches!(self.kind, ReactionType::Any | ReactionType::Mail)
            }
            ItemKind::ModAction => false,
        }
    }

    /// Sticky replies are always distinguished.
    pub fn distinguishes(&self) -> bool {
        self.distinguish_reply || self.sticky_reply
    }

    /// Whether enough votes were collected to apply the rule.
    pub fn is_triggered(&self, votes: u32) -> bool {
        votes >= self.min_votes
    }

    /// Applies the rule to an item with a fresh payload.
    pub async fn handle(
        &self,
        item: Option<Arc<Item>>,
        user: &str,
        handler: &dyn ReactionHandler,
    ) -> Result<ReactionPayload, ReactionError> {
        let item = item.ok_or(ReactionError::NoItem)?;
        if !self.eligible(item.kind()) {
            return Err(ReactionError::NotEligible {
                emoji: self.emoji.clone(),
                kind: item.kind().label().to_string(),
            });
        }

        let payload = ReactionPayload::new(item.clone(), user, self);
        Ok(handler.handle(self, &item, payload).await)
    }
}

impl fmt::Display for ReactionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.emoji)?;

        if self.kind == ReactionType::Mail {
            if self.archive {
                write!(f, " | archive")?;
            }
            if self.mute {
                write!(f, " | mute")?;
            }
        } else {
            match self.kind {
                ReactionType::Any => write!(f, " | submissions + comments")?,
                kind => write!(f, " | {}", kind.as_str())?,
            }
            if !self.flair.is_empty() {
                write!(f, " | flair: {}", self.flair)?;
            }
            write!(f, " | {}", if self.approve { "approve" } else { "remove" })?;
            if self.mark_nsfw {
                write!(f, " | mark NSFW")?;
            }
            if self.lock || !self.approve {
                write!(f, " | lock")?;
            }
            match self.ban {
                Some(0) => write!(f, " | permanent ban")?,
                Some(days) => write!(f, " | {days} day ban")?,
                None => {}
            }
        }

        if !self.reply.is_empty() {
            write!(f, " | reply")?;
        }
        write!(f, " | min votes: {}", self.min_votes)
    }
}

/// Returns the first eligible rule for `emoji`, in list order.
pub fn select<'a>(rules: &'a [ReactionRule], kind: ItemKind, emoji: &str) -> Option<&'a ReactionRule> {
    let emoji = emoji.trim();
    rules.iter().find(|r| r.eligible(kind) && r.emoji == emoji)
}

/// Result of parsing a rule file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReactionSet {
    pub rules: Vec<ReactionRule>,
    pub ignore: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RuleRecord {
    #[serde(default)]
    emoji: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    flair: Option<String>,
    #[serde(default)]
    approve: Option<bool>,
    #[serde(default)]
    mark_nsfw: Option<bool>,
    #[serde(default)]
    lock: Option<bool>,
    #[serde(default)]
    reply: Option<String>,
    #[serde(default)]
    distinguish_reply: Option<bool>,
    #[serde(default)]
    sticky_reply: Option<bool>,
    #[serde(default)]
    ban: Option<u32>,
    #[serde(default)]
    archive: Option<bool>,
    #[serde(default)]
    mute: Option<bool>,
    #[serde(default)]
    min_votes: Option<u32>,
}

impl RuleRecord {
    fn into_rule(self, emoji: String) -> Result<ReactionRule, RuleParseError> {
        let defaults = ReactionRule::new(emoji.as_str());

        let kind_text = self.kind.unwrap_or_default();
        let kind = ReactionType::parse(&kind_text).ok_or_else(|| RuleParseError::UnknownType {
            emoji: defaults.emoji.clone(),
            value: kind_text.clone(),
        })?;

        let min_votes = self.min_votes.unwrap_or(defaults.min_votes);
        if min_votes == 0 {
            return Err(RuleParseError::MinVotes {
                emoji: defaults.emoji,
            });
        }

        let sticky_reply = self.sticky_reply.unwrap_or(defaults.sticky_reply);
        let distinguish_reply =
            sticky_reply || self.distinguish_reply.unwrap_or(defaults.distinguish_reply);

        Ok(ReactionRule {
            kind,
            approve: self.approve.unwrap_or(defaults.approve),
            lock: self.lock.unwrap_or(defaults.lock),
            flair: self.flair.unwrap_or_default(),
            mark_nsfw: self.mark_nsfw.unwrap_or(defaults.mark_nsfw),
            reply: self.reply.unwrap_or_default(),
            distinguish_reply,
            sticky_reply,
            ban: self.ban,
            archive: self.archive.unwrap_or(defaults.archive),
            mute: self.mute.unwrap_or(defaults.mute),
            min_votes,
            ..defaults
        })
    }
}

/// Parses rule text into an ordered rule list, applying the `ignore` record.
pub fn parse_reactions(text: &str) -> Result<ReactionSet, RuleParseError> {
    let mut records = Vec::new();
    for document in serde_yaml::Deserializer::from_str(text) {
        match Value::deserialize(document)? {
            Value::Null => {}
            Value::Sequence(seq) => records.extend(seq),
            other => records.push(other),
        }
    }

    let mut ignore = Vec::new();
    if let Some(pos) = records
        .iter()
        .position(|r| r.as_mapping().is_some_and(|m| m.contains_key("ignore")))
    {
        let record = records.remove(pos);
        ignore = parse_ignore(record.get("ignore"));
    }

    let mut rules = Vec::new();
    let mut seen = HashSet::new();
    for (index, record) in records.into_iter().enumerate() {
        if !record.is_mapping() {
            return Err(RuleParseError::NotAMapping { index });
        }

        let record: RuleRecord = serde_yaml::from_value(record)?;
        let Some(emoji) = record.emoji.clone().map(|e| e.trim().to_string()) else {
            tracing::warn!("Skipping reaction record #{} without an emoji", index);
            continue;
        };
        if emoji.is_empty() {
            tracing::warn!("Skipping reaction record #{} with an empty emoji", index);
            continue;
        }
        if ignore.contains(&emoji) {
            continue;
        }

        let rule = record.into_rule(emoji)?;
        if !seen.insert((rule.emoji.clone(), rule.kind)) {
            return Err(RuleParseError::Duplicate {
                emoji: rule.emoji,
                kind: match rule.kind {
                    ReactionType::Any => "any item".to_string(),
                    kind => kind.as_str().to_string(),
                },
            });
        }
        rules.push(rule);
    }

    Ok(ReactionSet { rules, ignore })
}

fn parse_ignore(value: Option<&Value>) -> Vec<String> {
    let entries: Vec<String> = match value {
        Some(Value::String(list)) => list.split(',').map(str::to_string).collect(),
        Some(Value::Sequence(seq)) => seq
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strings::templates::DEFAULT_REACTIONS;

    #[test]
    fn test_parse_documents() {
        let text = r#"
emoji: ✅
approve: true
---
emoji: ❌
type: comment
reply: Removed for rule 1.
distinguish_reply: false
sticky_reply: false
---
emoji: 🔨
ban: 7
min_votes: 2
"#;
        let set = parse_reactions(text).unwrap();
        assert_eq!(set.rules.len(), 3);

        let approve = &set.rules[0];
        assert!(approve.approve);
        assert_eq!(approve.kind, ReactionType::Any);
        assert!(approve.distinguish_reply && approve.sticky_reply);

        let remove = &set.rules[1];
        assert_eq!(remove.kind, ReactionType::Comment);
        assert_eq!(remove.reply, "Removed for rule 1.");
        assert!(!remove.distinguishes());

        let ban = &set.rules[2];
        assert_eq!(ban.ban, Some(7));
        assert!(!ban.is_triggered(1));
        assert!(ban.is_triggered(2));
    }

    #[test]
    fn test_parse_list_and_ignore() {
        let text = r#"
- emoji: ✅
  approve: true
- ignore: "💣, 🔞"
- emoji: 💣
  ban: 0
- emoji: 🔞
  mark_nsfw: true
- flair: orphan
"#;
        let set = parse_reactions(text).unwrap();
        assert_eq!(set.ignore, vec!["💣".to_string(), "🔞".to_string()]);
        let emoji: Vec<&str> = set.rules.iter().map(|r| r.emoji.as_str()).collect();
        assert_eq!(emoji, vec!["✅"]);
    }

    #[test]
    fn test_sticky_implies_distinguish() {
        let set = parse_reactions("emoji: 📌\ndistinguish_reply: false\nsticky_reply: true\n").unwrap();
        assert!(set.rules[0].distinguish_reply);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_reactions("emoji: ✅\ntype: wiki\n"),
            Err(RuleParseError::UnknownType { .. })
        ));
        assert!(matches!(
            parse_reactions("emoji: ✅\nmin_votes: 0\n"),
            Err(RuleParseError::MinVotes { .. })
        ));
        assert!(matches!(
            parse_reactions("emoji: ✅\n---\nemoji: ✅\n"),
            Err(RuleParseError::Duplicate { .. })
        ));
        assert!(matches!(
            parse_reactions("- just text\n"),
            Err(RuleParseError::NotAMapping { index: 0 })
        ));
        assert!(parse_reactions("emoji: [unterminated").is_err());
    }

    #[test]
    fn test_select_first_eligible() {
        let rules = vec![
            ReactionRule {
                approve: true,
                ..ReactionRule::new("✅")
            },
            ReactionRule {
                kind: ReactionType::Comment,
                ..ReactionRule::new("✅")
            },
        ];

        let picked = select(&rules, ItemKind::Submission, "✅").unwrap();
        assert!(picked.approve);
        let picked = select(&rules, ItemKind::Comment, "✅").unwrap();
        assert!(picked.approve);
        assert!(select(&rules, ItemKind::ModAction, "✅").is_none());
        assert!(select(&rules, ItemKind::Submission, "❌").is_none());

        let comment_only = vec![rules[1].clone()];
        assert!(select(&comment_only, ItemKind::Submission, "✅").is_none());
    }

    #[test]
    fn test_eligibility() {
        let any = ReactionRule::new("✅");
        assert!(any.eligible(ItemKind::Submission));
        assert!(any.eligible(ItemKind::Comment));
        assert!(any.eligible(ItemKind::MailMessage));
        assert!(!any.eligible(ItemKind::ModAction));

        let mail = ReactionRule {
            kind: ReactionType::Mail,
            ..ReactionRule::new("📁")
        };
        assert!(mail.eligible(ItemKind::MailConversation));
        assert!(!mail.eligible(ItemKind::Submission));
    }

    #[test]
    fn test_display() {
        let rule = ReactionRule {
            flair: "Spam".to_string(),
            ban: Some(0),
            ..ReactionRule::new("💣")
        };
        assert_eq!(
            rule.to_string(),
            "💣 | submissions + comments | flair: Spam | remove | lock | permanent ban | min votes: 1"
        );

        let rule = ReactionRule {
            kind: ReactionType::Mail,
            archive: true,
            reply: "Thanks".to_string(),
            ..ReactionRule::new("📁")
        };
        assert_eq!(rule.to_string(), "📁 | archive | reply | min votes: 1");
    }

    #[test]
    fn test_default_reactions_parse() {
        let set = parse_reactions(DEFAULT_REACTIONS).unwrap();
        assert!(set.rules.len() >= 5);
        assert!(set.ignore.is_empty());
    }
}
