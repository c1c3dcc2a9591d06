//! Console error types

use std::fmt;

/// What kind of entity a lookup failed to find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Channel,
    Bus,
    Preset,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Channel => "Channel",
            EntityKind::Bus => "Bus",
            EntityKind::Preset => "Preset",
        };
        f.write_str(name)
    }
}

/// Errors raised by console, preset and serializer operations
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConsoleError {
    pub fn channel_not_found(id: &str) -> Self {
        ConsoleError::NotFound {
            kind: EntityKind::Channel,
            id: id.to_string(),
        }
    }

    pub fn bus_not_found(id: &str) -> Self {
        ConsoleError::NotFound {
            kind: EntityKind::Bus,
            id: id.to_string(),
        }
    }

    pub fn preset_not_found(id: &str) -> Self {
        ConsoleError::NotFound {
            kind: EntityKind::Preset,
            id: id.to_string(),
        }
    }

    /// Check if this is a `NotFound` for the given entity kind
    pub fn is_not_found(&self, kind: EntityKind) -> bool {
        matches!(self, ConsoleError::NotFound { kind: k, .. } if *k == kind)
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_entity() {
        let err = ConsoleError::bus_not_found("ghost-bus");
        assert_eq!(err.to_string(), "Bus not found: ghost-bus");
        assert!(err.is_not_found(EntityKind::Bus));
        assert!(!err.is_not_found(EntityKind::Channel));
    }
}
