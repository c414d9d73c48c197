//! # Dispatcher
//!
//! Owns the registered sources and handlers and drives the poll loop:
//! every tick drains each needed (source, category) stream once, forwards the new
//! items to the handlers of that category in registration order, then sleeps for an
//! exponentially growing wait while nothing turns up.

use futures::StreamExt;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::application::backoff::ExponentialCounter;
use crate::application::engine::{ReactionEngine, ReactionHandler, ReactionPayload};
use crate::application::handler::{EventHandler, HandlerBuilder, HandlerId};
use crate::application::item::Item;
use crate::application::locator;
use crate::application::source::Source;
use crate::application::stream::DrawOptions;
use crate::domain::config::{BanhammerConfig, PollConfig};
use crate::domain::error::{ReactionError, RegistrationError, RuleParseError};
use crate::domain::traits::{ContentSource, Presence};
use crate::domain::types::Category;
use crate::strings::logs;

/// What a single tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Unseen items drawn from all streams.
    pub items: usize,
    /// Handler invocations whose filters accepted the item.
    pub dispatched: usize,
    pub failed_streams: usize,
    pub handler_errors: usize,
}

impl TickReport {
    pub fn found(&self) -> bool {
        self.items > 0
    }
}

pub struct Dispatcher {
    capability: Arc<dyn ContentSource>,
    sources: Vec<Arc<Source>>,
    handlers: Vec<(HandlerId, EventHandler)>,
    next_id: u64,
    counter: ExponentialCounter,
    presence: Option<Arc<dyn Presence>>,
    reaction_handler: Arc<dyn ReactionHandler>,
    config: PollConfig,
    shutdown: Arc<watch::Sender<bool>>,
}

impl Dispatcher {
    pub fn new(capability: Arc<dyn ContentSource>) -> Self {
        let (shutdown, _) = watch::channel(false);
        let config = PollConfig::default();
        Self {
            capability,
            sources: Vec::new(),
            handlers: Vec::new(),
            next_id: 0,
            counter: ExponentialCounter::new(config.backoff_floor_secs, config.backoff_ceiling_secs),
            presence: None,
            reaction_handler: Arc::new(ReactionEngine),
            config,
            shutdown: Arc::new(shutdown),
        }
    }

    /// Builds a dispatcher with the poll settings and sources of `config`.
    pub fn from_config(
        capability: Arc<dyn ContentSource>,
        config: &BanhammerConfig,
    ) -> Result<Self, RuleParseError> {
        let mut dispatcher = Self::new(capability).with_poll_config(config.poll.clone());
        for source in &config.sources {
            let source = Source::from_config(source, config.poll.dedup_capacity)?;
            dispatcher.add_source(source);
        }
        Ok(dispatcher)
    }

    pub fn with_poll_config(mut self, config: PollConfig) -> Self {
        self.counter = ExponentialCounter::new(config.backoff_floor_secs, config.backoff_ceiling_secs);
        self.config = config;
        self
    }

    pub fn with_presence(mut self, presence: Arc<dyn Presence>) -> Self {
        self.presence = Some(presence);
        self
    }

    /// Replaces the built-in [`ReactionEngine`].
    pub fn with_reaction_handler(mut self, handler: Arc<dyn ReactionHandler>) -> Self {
        self.reaction_handler = handler;
        self
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Adds a source, replacing a registered one with the same name.
    pub fn add_source(&mut self, source: Source) -> Arc<Source> {
        let source = Arc::new(source);
        tracing::info!("{}", logs::source_added(source.name(), source.reactions().len()));

        match self.sources.iter_mut().find(|s| s.name() == source.name()) {
            Some(existing) => *existing = source.clone(),
            None => self.sources.push(source.clone()),
        }
        source
    }

    /// Removes a source by name; `r/Name` and `/r/name/` refer to the same source.
    pub fn remove_source(&mut self, name: &str) -> bool {
        let Some(pos) = self.sources.iter().position(|s| s.matches_name(name)) else {
            return false;
        };
        let removed = self.sources.remove(pos);
        tracing::info!("{}", logs::source_removed(removed.name()));
        true
    }

    pub fn sources(&self) -> &[Arc<Source>] {
        &self.sources
    }

    pub fn source(&self, name: &str) -> Option<&Arc<Source>> {
        self.sources.iter().find(|s| s.matches_name(name))
    }

    pub fn register(&mut self, builder: HandlerBuilder) -> Result<HandlerId, RegistrationError> {
        let handler = builder.build()?;
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, handler));
        Ok(id)
    }

    pub fn remove_handler(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    pub fn handlers(&self) -> impl Iterator<Item = &EventHandler> {
        self.handlers.iter().map(|(_, handler)| handler)
    }

    /// Sending `true` stops [`Dispatcher::run`] between ticks, interrupting its sleep.
    pub fn shutdown_handle(&self) -> Arc<watch::Sender<bool>> {
        self.shutdown.clone()
    }

    /// The (source, category) pairs one tick polls, each at most once.
    fn pairs(&self) -> Vec<(Arc<Source>, Category)> {
        let mut seen = HashSet::new();
        let mut pairs = Vec::new();
        for (_, handler) in &self.handlers {
            for source in handler.stream_selector(&self.sources) {
                if seen.insert((source.name().to_string(), handler.category())) {
                    pairs.push((source.clone(), handler.category()));
                }
            }
        }
        pairs
    }

    async fn set_presence(&self, active: bool) {
        if !self.config.change_presence {
            return;
        }
        let Some(presence) = &self.presence else {
            return;
        };
        let result = if active {
            presence.set_active().await
        } else {
            presence.clear_active().await
        };
        if let Err(e) = result {
            tracing::error!("{}", logs::presence_failed(&e));
        }
    }

    /// Polls every needed stream once and dispatches what it finds.
    pub async fn tick(&self) -> TickReport {
        self.set_presence(true).await;

        let mut report = TickReport::default();
        for (source, category) in self.pairs() {
            let options = DrawOptions {
                limit: self.config.limits.get(category),
                timeout: self.config.fetch_timeout(),
            };
            let mut stream = source.draw(category, self.capability.clone(), options);

            while let Some(next) = stream.next().await {
                let item = match next {
                    Ok(item) => item,
                    Err(e) => {
                        tracing::warn!(
                            "{}",
                            logs::fetch_failed(source.name(), category.as_str(), &e.to_string())
                        );
                        report.failed_streams += 1;
                        continue;
                    }
                };
                report.items += 1;
                self.dispatch(item, &mut report).await;
            }
        }

        self.set_presence(false).await;
        report
    }

    async fn dispatch(&self, item: Arc<Item>, report: &mut TickReport) {
        for (_, handler) in &self.handlers {
            if handler.category() != item.category() {
                continue;
            }
            match handler.invoke(item.clone()).await {
                Ok(true) => report.dispatched += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(
                        "{}",
                        logs::handler_failed(item.category().as_str(), item.id(), &format!("{e:#}"))
                    );
                    report.handler_errors += 1;
                }
            }
        }
    }

    /// Runs one tick and advances the backoff. Returns the wait before the next tick.
    pub async fn poll_once(&mut self) -> Duration {
        let report = self.tick().await;
        let wait = self.counter.advance(report.found());
        tracing::debug!("{}", logs::tick_finished(report.items, report.failed_streams, wait));
        wait
    }

    /// Polls until shutdown is requested through [`Dispatcher::shutdown_handle`].
    pub async fn run(&mut self) {
        let mut rx = self.shutdown.subscribe();
        tracing::info!("{}", logs::POLL_LOOP_START);

        loop {
            if *rx.borrow_and_update() {
                break;
            }
            let wait = self.poll_once().await;

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = rx.changed() => {}
            }
        }

        tracing::info!("{}", logs::SHUTDOWN);
    }

    /// Looks up the first Reddit link in `text` that resolves to an item.
    pub async fn find_item(&self, text: &str) -> Option<Arc<Item>> {
        for (url, locator) in locator::find_locators(text) {
            let raw = match self.capability.fetch_item(&locator).await {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!("{}", logs::lookup_failed(&url, &e.to_string()));
                    continue;
                }
            };

            let source = match self.source(&raw.source) {
                Some(source) => source.clone(),
                None => Arc::new(Source::new(&raw.source)),
            };
            let category = Category::for_kind(raw.kind);
            return Some(Arc::new(Item::new(raw, category, source, self.capability.clone())));
        }
        None
    }

    /// Applies the source's reaction for `emoji` to `item`.
    pub async fn react(
        &self,
        item: &Arc<Item>,
        emoji: &str,
        user: &str,
    ) -> Result<ReactionPayload, ReactionError> {
        item.source()
            .react(item, emoji, user, self.reaction_handler.as_ref())
            .await
    }
}
