//! # Event Filters
//!
//! Predicates attached to handlers. Values are compared case-insensitively against
//! one attribute of an item; an inverted filter turns a match into a rejection.

use std::fmt;
use std::str::FromStr;

use crate::application::item::Item;
use crate::application::source::{Source, normalize_name};
use crate::domain::error::RegistrationError;
use crate::domain::types::Category;

/// The item attribute a filter looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Source,
    Author,
    /// Moderator behind a mod action.
    Actor,
}

impl Attribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Source => "source",
            Attribute::Author => "author",
            Attribute::Actor => "actor",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "source" | "subreddit" => Ok(Attribute::Source),
            "author" => Ok(Attribute::Author),
            "actor" | "mod" => Ok(Attribute::Actor),
            other => Err(RegistrationError::UnknownAttribute(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    attribute: Attribute,
    values: Vec<String>,
    invert: bool,
}

impl EventFilter {
    pub fn new<S: AsRef<str>>(attribute: Attribute, values: impl IntoIterator<Item = S>) -> Self {
        let values = values
            .into_iter()
            .map(|v| match attribute {
                Attribute::Source => normalize_name(v.as_ref()),
                _ => v.as_ref().trim().to_lowercase(),
            })
            .collect();
        Self {
            attribute,
            values,
            invert: false,
        }
    }

    pub fn inverted(mut self) -> Self {
        self.invert = !self.invert;
        self
    }

    pub fn attribute(&self) -> Attribute {
        self.attribute
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    /// Whether the item passes. Author and actor lookups may hit the content source.
    pub async fn accepts(&self, item: &Item) -> bool {
        if self.values.is_empty() {
            return true;
        }

        let value = match self.attribute {
            Attribute::Source => item.source().name().to_string(),
            Attribute::Author => item.author_name().await.to_lowercase(),
            Attribute::Actor => {
                if item.category() != Category::ModActions {
                    return false;
                }
                item.actor_name().await.to_lowercase()
            }
        };

        self.matches(&value) && !self.invert
    }

    /// Pre-fetch check: can items of this source pass at all?
    pub fn accepts_source(&self, source: &Source) -> bool {
        if self.attribute != Attribute::Source || self.values.is_empty() {
            return true;
        }
        self.matches(source.name()) && !self.invert
    }

    fn matches(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}
