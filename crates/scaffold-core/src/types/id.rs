//! Identifier types and the opaque unique-ID source.
//!
//! Identifiers are newtype wrappers around time-ordered UUIDv7 values so
//! that log lines and database keys sort by creation time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a newtype ID wrapper around `Uuid`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new time-ordered identifier.
            pub fn new() -> Self {
                Self::generate(&UuidGenerator)
            }

            /// Create an identifier from `generator`.
            pub fn generate(generator: &dyn IdGenerator) -> Self {
                Self(generator.next_id())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a database session.
    SessionId
);

/// Source of unique identifiers, e.g. for session identities.
pub trait IdGenerator: Send + Sync + fmt::Debug + 'static {
    /// Produce a new identifier, unique for the lifetime of the process.
    fn next_id(&self) -> Uuid;
}

/// Default generator producing UUIDv7 values.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> Uuid {
        Uuid::now_v7()
    }
}
