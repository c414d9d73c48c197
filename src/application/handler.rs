//! # Event Handlers
//!
//! A handler binds an async callback to one category plus a list of filters.
//! Handlers are assembled with [`HandlerBuilder`] and registered on the dispatcher,
//! which hands back an opaque [`HandlerId`].

use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::application::filter::{Attribute, EventFilter};
use crate::application::item::Item;
use crate::application::source::Source;
use crate::domain::error::RegistrationError;
use crate::domain::types::Category;

pub type Callback = Arc<dyn Fn(Arc<Item>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub(crate) u64);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler#{}", self.0)
    }
}

pub struct HandlerBuilder {
    category: Category,
    filters: Vec<EventFilter>,
    callback: Option<Callback>,
}

impl HandlerBuilder {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            filters: Vec::new(),
            callback: None,
        }
    }

    /// Same as [`HandlerBuilder::new`] with the category given by name.
    pub fn for_category(name: &str) -> Result<Self, RegistrationError> {
        Ok(Self::new(name.parse()?))
    }

    pub fn filter(mut self, filter: EventFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Only items of these sources.
    pub fn sources<S: AsRef<str>>(self, names: impl IntoIterator<Item = S>) -> Self {
        self.filter(EventFilter::new(Attribute::Source, names))
    }

    pub fn authors<S: AsRef<str>>(self, names: impl IntoIterator<Item = S>) -> Self {
        self.filter(EventFilter::new(Attribute::Author, names))
    }

    /// Only mod actions taken by these moderators.
    pub fn moderators<S: AsRef<str>>(self, names: impl IntoIterator<Item = S>) -> Self {
        self.filter(EventFilter::new(Attribute::Actor, names))
    }

    pub fn callback<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn(Arc<Item>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.callback = Some(Arc::new(move |item| -> BoxFuture<'static, anyhow::Result<()>> {
            Box::pin(callback(item))
        }));
        self
    }

    pub fn build(self) -> Result<EventHandler, RegistrationError> {
        let Some(callback) = self.callback else {
            return Err(RegistrationError::MissingCallback(self.category.to_string()));
        };

        for filter in &self.filters {
            if filter.attribute() == Attribute::Actor && self.category != Category::ModActions {
                return Err(RegistrationError::ActorFilterOnCategory(self.category.to_string()));
            }
            if filter.values().iter().any(|v| v.is_empty()) {
                return Err(RegistrationError::EmptyFilterValue(filter.attribute().to_string()));
            }
        }

        Ok(EventHandler {
            category: self.category,
            filters: self.filters,
            callback,
        })
    }
}

pub struct EventHandler {
    category: Category,
    filters: Vec<EventFilter>,
    callback: Callback,
}

impl EventHandler {
    pub fn category(&self) -> Category {
        self.category
    }

    pub fn filters(&self) -> &[EventFilter] {
        &self.filters
    }

    pub async fn accepts(&self, item: &Item) -> bool {
        if item.category() != self.category {
            return false;
        }
        for filter in &self.filters {
            if !filter.accepts(item).await {
                return false;
            }
        }
        true
    }

    /// Runs the callback if the item passes. Returns whether it ran.
    pub async fn invoke(&self, item: Arc<Item>) -> anyhow::Result<bool> {
        if !self.accepts(&item).await {
            return Ok(false);
        }
        (self.callback)(item).await?;
        Ok(true)
    }

    /// Sources whose stream for this handler's category has to be polled.
    pub fn stream_selector<'a>(&self, sources: &'a [Arc<Source>]) -> Vec<&'a Arc<Source>> {
        sources
            .iter()
            .filter(|s| s.is_streaming(self.category))
            .filter(|s| self.filters.iter().all(|f| f.accepts_source(s)))
            .collect()
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("category", &self.category)
            .field("filters", &self.filters)
            .finish()
    }
}
