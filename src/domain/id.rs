use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// The identifier assigned to the first record of an empty collection.
            pub const FIRST: Self = Self(1);

            /// Wraps a raw identifier.
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw identifier.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }

            /// The identifier following this one, or `None` once the id space
            /// is used up.
            #[must_use]
            pub(crate) const fn next(self) -> Option<Self> {
                match self.0.checked_add(1) {
                    Some(value) => Some(Self(value)),
                    None => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

record_id!(
    /// Identifies an issue.
    IssueId
);

record_id!(
    /// Identifies a version.
    VersionId
);

record_id!(
    /// Identifies a checklist.
    ChecklistId
);

record_id!(
    /// Identifies a single checklist item.
    ChecklistItemId
);

/// Returns the identifier after the largest one in `ids`, or the first
/// identifier if there are none.
///
/// Identifiers are not reserved, so an id freed by a delete can be handed out
/// again. Returns `None` if the largest id is already `u64::MAX`.
pub(crate) fn next_id<T>(
    ids: impl IntoIterator<Item = T>,
    first: T,
    next: fn(T) -> Option<T>,
) -> Option<T>
where
    T: Ord,
{
    ids.into_iter().max().map_or(Some(first), next)
}
