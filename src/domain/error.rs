//! # Error Types
//!
//! Typed failures for every boundary of the crate. Runtime I/O failures
//! (`SourceError`) are recoverable and isolated to the stream or action that
//! raised them; registration and rule errors surface to the caller immediately.

use thiserror::Error;

/// Failure reported by the content-source capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("{operation} failed: {message}")]
    Request { operation: String, message: String },

    #[error("{operation} timed out after {millis}ms")]
    Timeout { operation: String, millis: u128 },

    #[error("not found: {0}")]
    NotFound(String),
}

impl SourceError {
    pub fn request(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Request {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Errors raised when a reaction cannot be applied to an item.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReactionError {
    #[error("no item was given to react to")]
    NoItem,

    #[error("{kind} items are not eligible for reaction {emoji}")]
    NotEligible { emoji: String, kind: String },

    #[error("no reaction {emoji} is configured for {kind} items on {source_name}")]
    MissingRule {
        emoji: String,
        kind: String,
        source_name: String,
    },
}

/// Errors raised while registering a handler or building one of its filters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("unknown filter attribute '{0}'")]
    UnknownAttribute(String),

    #[error("handler for {0} has no callback")]
    MissingCallback(String),

    #[error("actor filters only apply to mod_actions handlers, not {0}")]
    ActorFilterOnCategory(String),

    #[error("{0} filter contains an empty value")]
    EmptyFilterValue(String),
}

/// Errors raised while parsing declarative reaction rules.
#[derive(Debug, Error)]
pub enum RuleParseError {
    #[error("invalid reaction yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("reaction record #{index} is not a mapping")]
    NotAMapping { index: usize },

    #[error("reaction {emoji}: unknown type '{value}'")]
    UnknownType { emoji: String, value: String },

    #[error("reaction {emoji}: min_votes must be at least 1")]
    MinVotes { emoji: String },

    #[error("reaction {emoji} is defined twice for {kind}")]
    Duplicate { emoji: String, kind: String },
}
