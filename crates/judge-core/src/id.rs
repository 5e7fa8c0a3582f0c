//! Newtype identifiers, generated the way `oj-core::id` builds its ids: a
//! macro that stamps out the Display/From/Borrow boilerplate once, plus a
//! `ShortId` helper for log-friendly truncation.

use std::borrow::Borrow;
use std::fmt;

/// Defines a newtype wrapping a `String`, with the usual identity-type
/// trait impls. Kept deliberately small: an id is a label, not a value.
#[macro_export]
macro_rules! define_id {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Identifies this agent process to the dispatcher. Generated once at
    /// startup and attached to every outbound message.
    pub struct AgentId;
}

define_id! {
    /// The dispatcher-assigned job identifier, echoed verbatim in results.
    pub struct JobId;
}

impl AgentId {
    /// A fresh random agent identity, textual form of a v4 UUID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_id_round_trips_through_string() {
        let id = AgentId::from("abc-123");
        assert_eq!(id, "abc-123");
        assert_eq!(id.to_string(), "abc-123");
    }

    #[test]
    fn generated_agent_ids_are_distinct() {
        assert_ne!(AgentId::generate(), AgentId::generate());
    }
}
