//! In-memory collaborators for unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::domain::error::SourceError;
use crate::domain::traits::{ChatProvider, ContentSource, Presence};
use crate::domain::types::{Author, BanRequest, Category, ItemKind, ItemLocator, RawItem};

#[derive(Default)]
struct MemoryState {
    batches: HashMap<(String, Category), Vec<RawItem>>,
    authors: HashMap<String, Option<Author>>,
    items: HashMap<ItemLocator, RawItem>,
    failures: HashSet<String>,
    actions: Vec<String>,
    fetches: Vec<String>,
    bans: Vec<BanRequest>,
    author_lookups: usize,
    delay: Option<Duration>,
}

/// Content source backed by maps. Every successful moderation call is recorded
/// as `operation:target`; operations listed with `fail_on` return an error instead.
#[derive(Default)]
pub struct MemorySource {
    state: Mutex<MemoryState>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap()
    }

    /// Batch returned for a (source, category) fetch, newest first.
    pub fn set_batch(&self, source: &str, category: Category, batch: Vec<RawItem>) {
        self.state().batches.insert((source.to_string(), category), batch);
    }

    pub fn set_author(&self, item_id: &str, author: Option<Author>) {
        self.state().authors.insert(item_id.to_string(), author);
    }

    pub fn set_item(&self, locator: ItemLocator, raw: RawItem) {
        self.state().items.insert(locator, raw);
    }

    /// Makes an operation fail, e.g. `lock`, `fetch new` or `fetch pics new`.
    pub fn fail_on(&self, operation: &str) {
        self.state().failures.insert(operation.to_string());
    }

    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state().delay = Some(delay);
    }

    pub fn actions(&self) -> Vec<String> {
        self.state().actions.clone()
    }

    /// Fetches made so far as `source/category`.
    pub fn fetches(&self) -> Vec<String> {
        self.state().fetches.clone()
    }

    pub fn bans(&self) -> Vec<BanRequest> {
        self.state().bans.clone()
    }

    pub fn author_lookups(&self) -> usize {
        self.state().author_lookups
    }

    fn check(&self, operation: &str) -> Result<(), SourceError> {
        if self.state().failures.contains(operation) {
            return Err(SourceError::request(operation, "simulated failure"));
        }
        Ok(())
    }

    fn act(&self, operation: &str, target: &str) -> Result<(), SourceError> {
        self.check(operation)?;
        self.state().actions.push(format!("{operation}:{target}"));
        Ok(())
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn fetch(
        &self,
        source: &str,
        category: Category,
        _limit: usize,
    ) -> Result<Vec<RawItem>, SourceError> {
        let delay = {
            let mut state = self.state();
            state.fetches.push(format!("{source}/{category}"));
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.check(&format!("fetch {category}"))?;
        self.check(&format!("fetch {source} {category}"))?;
        Ok(self
            .state()
            .batches
            .get(&(source.to_string(), category))
            .cloned()
            .unwrap_or_default())
    }

    async fn resolve_author(&self, item: &RawItem) -> Result<Option<Author>, SourceError> {
        self.state().author_lookups += 1;
        self.check("resolve_author")?;
        Ok(self.state().authors.get(&item.id).cloned().flatten())
    }

    async fn fetch_item(&self, locator: &ItemLocator) -> Result<Option<RawItem>, SourceError> {
        self.check("fetch_item")?;
        Ok(self.state().items.get(locator).cloned())
    }

    async fn approve(&self, item: &RawItem) -> Result<(), SourceError> {
        self.act("approve", &item.id)
    }

    async fn remove(&self, item: &RawItem) -> Result<(), SourceError> {
        self.act("remove", &item.id)
    }

    async fn lock(&self, item: &RawItem) -> Result<(), SourceError> {
        self.act("lock", &item.id)
    }

    async fn unlock(&self, item: &RawItem) -> Result<(), SourceError> {
        self.act("unlock", &item.id)
    }

    async fn flair(&self, item: &RawItem, text: &str) -> Result<(), SourceError> {
        self.act("flair", &format!("{}:{text}", item.id))
    }

    async fn mark_nsfw(&self, item: &RawItem) -> Result<(), SourceError> {
        self.act("nsfw", &item.id)
    }

    async fn reply(&self, item: &RawItem, _text: &str) -> Result<RawItem, SourceError> {
        self.act("reply", &item.id)?;
        Ok(RawItem::new(format!("reply-{}", item.id), ItemKind::Comment, item.source.clone()))
    }

    async fn distinguish(&self, reply: &RawItem, sticky: bool) -> Result<(), SourceError> {
        self.act("distinguish", &format!("{}:{sticky}", reply.id))
    }

    async fn ban(&self, source: &str, author: &str, ban: &BanRequest) -> Result<(), SourceError> {
        let length = match ban.duration {
            Some(days) => format!("{days}d"),
            None => "permanent".to_string(),
        };
        self.act("ban", &format!("{source}:{author}:{length}"))?;
        self.state().bans.push(ban.clone());
        Ok(())
    }

    async fn archive(&self, conversation_id: &str) -> Result<(), SourceError> {
        self.act("archive", conversation_id)
    }

    async fn mute(&self, conversation_id: &str) -> Result<(), SourceError> {
        self.act("mute", conversation_id)
    }

    async fn reply_conversation(&self, conversation_id: &str, _text: &str) -> Result<(), SourceError> {
        self.act("reply_conversation", conversation_id)
    }
}

/// Presence that records `active`/`idle` calls and can be told to fail.
#[derive(Default)]
pub struct RecordingPresence {
    calls: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingPresence {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::default(),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) -> Result<(), String> {
        self.calls.lock().unwrap().push(call.to_string());
        if self.fail {
            return Err(format!("{call} rejected"));
        }
        Ok(())
    }
}

#[async_trait]
impl Presence for RecordingPresence {
    async fn set_active(&self) -> Result<(), String> {
        self.record("active")
    }

    async fn clear_active(&self) -> Result<(), String> {
        self.record("idle")
    }
}

#[derive(Default)]
pub struct RecordingChat {
    sent: Mutex<Vec<String>>,
}

impl RecordingChat {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for RecordingChat {
    async fn send_message(&self, content: &str) -> Result<String, String> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(content.to_string());
        Ok(format!("$event{}", sent.len()))
    }

    async fn send_notification(&self, content: &str) -> Result<(), String> {
        self.sent.lock().unwrap().push(content.to_string());
        Ok(())
    }

    fn room_id(&self) -> String {
        "!test:example.org".to_string()
    }
}
