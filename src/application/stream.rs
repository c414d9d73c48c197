//! # Source Stream
//!
//! Per source and category: fetch the latest batch, drop ids already in the dedup
//! window and hand back the rest oldest first. The first successful fetch only primes
//! the window so a freshly attached source does not replay its whole backlog.

use std::time::Duration;
use tokio::sync::Mutex;

use crate::application::dedup::DedupWindow;
use crate::application::source::Source;
use crate::domain::error::SourceError;
use crate::domain::traits::ContentSource;
use crate::domain::types::{Category, RawItem};
use crate::strings::logs;

/// Per-draw fetch parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOptions {
    pub limit: usize,
    pub timeout: Option<Duration>,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            limit: 100,
            timeout: None,
        }
    }
}

#[derive(Debug)]
struct StreamState {
    window: DedupWindow,
    primed: bool,
}

/// Dedup bookkeeping of one (source, category) pair.
///
/// The state lock is held for the whole draw so a stream never runs concurrently
/// with itself.
#[derive(Debug)]
pub struct SourceStream {
    category: Category,
    state: Mutex<StreamState>,
}

impl SourceStream {
    pub fn new(category: Category, capacity: usize) -> Self {
        Self {
            category,
            state: Mutex::new(StreamState {
                window: DedupWindow::new(capacity),
                primed: false,
            }),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub async fn is_primed(&self) -> bool {
        self.state.lock().await.primed
    }

    /// Number of ids currently remembered.
    pub async fn seen(&self) -> usize {
        self.state.lock().await.window.len()
    }

    /// Fetches a batch and returns the entries not seen before, oldest first.
    /// Returns nothing while priming.
    pub async fn collect(
        &self,
        source: &Source,
        capability: &dyn ContentSource,
        options: DrawOptions,
    ) -> Result<Vec<RawItem>, SourceError> {
        let mut state = self.state.lock().await;

        let fetch = capability.fetch(source.name(), self.category, options.limit);
        let mut batch = match options.timeout {
            Some(limit) => tokio::time::timeout(limit, fetch).await.map_err(|_| {
                SourceError::Timeout {
                    operation: format!("fetch {}", self.category),
                    millis: limit.as_millis(),
                }
            })??,
            None => fetch.await?,
        };
        batch.reverse();

        let mut fresh = Vec::new();
        for raw in batch {
            if !state.window.insert(&raw.id) {
                continue;
            }
            // Mod actions by other moderators still occupy their dedup slot.
            if self.category == Category::ModActions && !source.accepts_actor(raw.actor.as_deref()) {
                continue;
            }
            fresh.push(raw);
        }

        if !state.primed {
            state.primed = true;
            tracing::debug!(
                "{}",
                logs::stream_primed(source.name(), self.category.as_str(), state.window.len())
            );
            return Ok(Vec::new());
        }

        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ItemKind;
    use crate::test_support::MemorySource;

    fn raw(id: &str) -> RawItem {
        RawItem::new(id, ItemKind::Submission, "pics")
    }

    /// Batches come back newest first, like the real API.
    fn batch(ids: &[&str]) -> Vec<RawItem> {
        ids.iter().rev().map(|id| raw(id)).collect()
    }

    fn ids(items: &[RawItem]) -> Vec<&str> {
        items.iter().map(|r| r.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_priming_then_unseen_oldest_first() {
        let memory = MemorySource::new();
        let source = Source::new("pics");
        let stream = SourceStream::new(Category::New, 10);

        memory.set_batch("pics", Category::New, batch(&["a", "b", "c"]));
        let first = stream.collect(&source, &memory, DrawOptions::default()).await.unwrap();
        assert!(first.is_empty());
        assert!(stream.is_primed().await);
        assert_eq!(stream.seen().await, 3);

        memory.set_batch("pics", Category::New, batch(&["b", "c", "d", "e"]));
        let second = stream.collect(&source, &memory, DrawOptions::default()).await.unwrap();
        assert_eq!(ids(&second), vec!["d", "e"]);

        let third = stream.collect(&source, &memory, DrawOptions::default()).await.unwrap();
        assert!(third.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_does_not_prime() {
        let memory = MemorySource::new();
        let source = Source::new("pics");
        let stream = SourceStream::new(Category::New, 10);

        memory.fail_on("fetch new");
        assert!(stream.collect(&source, &memory, DrawOptions::default()).await.is_err());
        assert!(!stream.is_primed().await);

        memory.clear_failures();
        memory.set_batch("pics", Category::New, batch(&["a"]));
        assert!(stream.collect(&source, &memory, DrawOptions::default()).await.unwrap().is_empty());
        assert!(stream.is_primed().await);
    }

    #[tokio::test]
    async fn test_mod_actions_consume_slot_for_other_actors() {
        let memory = MemorySource::new();
        let source = Source::new("pics").with_moderators(["AutoModerator"]);
        let stream = SourceStream::new(Category::ModActions, 10);
        let action = |id: &str, mod_name: &str| {
            RawItem::new(id, ItemKind::ModAction, "pics").with_actor(mod_name)
        };

        memory.set_batch("pics", Category::ModActions, vec![]);
        stream.collect(&source, &memory, DrawOptions::default()).await.unwrap();

        memory.set_batch(
            "pics",
            Category::ModActions,
            vec![action("2", "automoderator"), action("1", "someone")],
        );
        let fresh = stream.collect(&source, &memory, DrawOptions::default()).await.unwrap();
        assert_eq!(ids(&fresh), vec!["2"]);
        assert_eq!(stream.seen().await, 2);

        // Widening the allow-list never resurfaces an action already seen.
        let everyone = Source::new("pics");
        let again = stream.collect(&everyone, &memory, DrawOptions::default()).await.unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let memory = MemorySource::new();
        memory.set_delay(Duration::from_millis(200));
        let source = Source::new("pics");
        let stream = SourceStream::new(Category::New, 10);

        let options = DrawOptions {
            limit: 10,
            timeout: Some(Duration::from_millis(10)),
        };
        let err = stream.collect(&source, &memory, options).await.unwrap_err();
        assert!(matches!(err, SourceError::Timeout { millis: 10, .. }));
        assert_eq!(err.to_string(), "fetch new timed out after 10ms");
    }
}
