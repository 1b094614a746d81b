//! ULID-backed identifiers for stored documents.

use ulid::Ulid;

/// Error returned when an identifier string is not a valid ULID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier: {0}")]
pub struct InvalidId(pub String);

macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Ulid);

        impl $name {
            /// Create a new unique identifier.
            pub fn new() -> Self {
                Self(Ulid::new())
            }

            /// Parse an identifier from its string form.
            pub fn parse(s: &str) -> Result<Self, InvalidId> {
                Ulid::from_string(s.trim())
                    .map(Self)
                    .map_err(|_| InvalidId(s.to_string()))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidId;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

document_id!(
    /// Identifier of a job posting. ULIDs sort by creation time.
    JobId
);
document_id!(
    /// Identifier of a student account.
    StudentId
);
document_id!(
    /// Identifier of a company account.
    CompanyId
);
