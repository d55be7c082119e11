//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different ID types (e.g., passing a
//! head SHA where a repository name is expected) and make the code more self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A GitHub App installation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstallationId(pub u64);

impl fmt::Display for InstallationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for InstallationId {
    fn from(n: u64) -> Self {
        InstallationId(n)
    }
}

/// A git commit SHA.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sha(pub String);

impl Sha {
    /// Creates a new Sha from a string.
    ///
    /// Note: This does not validate the format. Valid SHAs are 40 hex characters.
    pub fn new(s: impl Into<String>) -> Self {
        Sha(s.into())
    }

    /// Returns the SHA as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a short (7-character) version of the SHA for display.
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for Sha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Sha {
    fn from(s: &str) -> Self {
        Sha(s.to_string())
    }
}

/// A repository's `owner/name` as GitHub reports it in `full_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoFullName(pub String);

impl RepoFullName {
    pub fn new(s: impl Into<String>) -> Self {
        RepoFullName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoFullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RepoFullName {
    fn from(s: &str) -> Self {
        RepoFullName(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod installation_id {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn deserializes_from_bare_number(n: u64) {
                let parsed: InstallationId = serde_json::from_str(&n.to_string()).unwrap();
                prop_assert_eq!(parsed, InstallationId(n));
            }

            #[test]
            fn display_is_plain_number(n: u64) {
                prop_assert_eq!(InstallationId(n).to_string(), n.to_string());
            }
        }
    }

    mod sha {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn short_returns_7_chars(s in "[0-9a-f]{40}") {
                let sha = Sha::new(&s);
                prop_assert_eq!(sha.short().len(), 7);
                prop_assert_eq!(sha.short(), &s[..7]);
            }
        }

        #[test]
        fn short_handles_short_input() {
            let sha = Sha::new("abc");
            assert_eq!(sha.short(), "abc");
        }
    }

    mod repo_full_name {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn display_is_verbatim(
                owner in "[a-zA-Z][a-zA-Z0-9-]{0,38}",
                repo in "[a-zA-Z][a-zA-Z0-9_-]{0,99}"
            ) {
                let name = RepoFullName::new(format!("{owner}/{repo}"));
                prop_assert_eq!(name.to_string(), format!("{}/{}", owner, repo));
            }
        }
    }
}
