// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Campaign and report identifiers.
//!
//! IDs are `{prefix}{nanoid}` strings: a 4-character type indicator
//! followed by a 19-character random suffix. The prefix makes an ID
//! self-describing in logs and journal files.

/// Length of the random suffix generated for new IDs.
const SUFFIX_LEN: usize = 19;

/// Define a newtype ID wrapper with a fixed type prefix.
///
/// Generates `new()` for random generation, `from_string()` for parsing,
/// `as_str()`, `suffix()`, and the usual `Display`/`From`/`PartialEq<str>`/
/// `Borrow<str>` implementations.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($prefix:literal);
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Generate a new random ID with the type prefix.
            pub fn new() -> Self {
                Self(format!("{}{}", Self::PREFIX, nanoid::nanoid!(SUFFIX_LEN)))
            }

            /// Create an ID from an existing string (parsing/deserialization).
            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The ID without its type prefix.
            pub fn suffix(&self) -> &str {
                self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_string(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::from_string(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
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

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a campaign session.
    ///
    /// One session tracks one end-to-end campaign across a worker fleet;
    /// the ID keys the active-sessions registry, the per-campaign pub/sub
    /// topic, and every journal artifact path.
    pub struct SessionId("cmp-");
}

define_id! {
    /// Unique identifier for a persisted report.
    pub struct ReportId("rpt-");
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
