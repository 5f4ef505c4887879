//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for bucket identifiers and values.
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

// ============================================================================
// Path types
// ============================================================================

/// A path inside a bucket (must start with `/`, no trailing slash)
///
/// Represents entries in the remote tree, e.g. `/docs/readme.md`.
/// Two paths are equal iff their strings are byte-identical; no case
/// folding or Unicode normalization is applied.
///
/// The bucket root itself is not a `BucketPath`: it is addressed by the
/// store adapters directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BucketPath(String);

impl BucketPath {
    /// Create a new BucketPath
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if the path is not absolute, ends
    /// with a slash, or contains empty, `.` or `..` segments
    pub fn new(path: String) -> Result<Self, DomainError> {
        if !path.starts_with('/') {
            return Err(DomainError::InvalidPath(format!(
                "Bucket path must start with '/': {path}"
            )));
        }

        if path.ends_with('/') {
            return Err(DomainError::InvalidPath(format!(
                "Bucket path must not end with '/': {path}"
            )));
        }

        for segment in path[1..].split('/') {
            match segment {
                "" => {
                    return Err(DomainError::InvalidPath(format!(
                        "Bucket path contains an empty segment: {path}"
                    )))
                }
                "." | ".." => {
                    return Err(DomainError::InvalidPath(format!(
                        "Bucket path contains invalid traversal: {path}"
                    )))
                }
                _ => {}
            }
        }

        Ok(Self(path))
    }

    /// Create a BucketPath from a path relative to the sync source
    ///
    /// `docs/readme.md` becomes `/docs/readme.md`.
    ///
    /// # Errors
    /// Returns error if the resulting path is invalid
    pub fn from_relative(relative: &str) -> Result<Self, DomainError> {
        Self::new(format!("/{relative}"))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the path segments, shallowest first
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0[1..].split('/')
    }

    /// Get the parent path, or `None` for top-level entries
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        match self.0.rfind('/') {
            Some(0) | None => None,
            Some(idx) => Some(Self(self.0[..idx].to_string())),
        }
    }

    /// All strict ancestors, deepest first
    ///
    /// `/a/b/c.txt` yields `/a/b` then `/a`.
    pub fn ancestors(&self) -> impl Iterator<Item = BucketPath> {
        std::iter::successors(self.parent(), |p| p.parent())
    }
}

impl Display for BucketPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BucketPath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for BucketPath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BucketPath> for String {
    fn from(path: BucketPath) -> Self {
        path.0
    }
}

impl AsRef<str> for BucketPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Bucket identity types
// ============================================================================

/// Store-assigned bucket key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BucketKey(String);

impl BucketKey {
    /// Create a new BucketKey
    ///
    /// # Errors
    /// Returns error if the key is empty or contains whitespace or slashes
    pub fn new(key: String) -> Result<Self, DomainError> {
        if key.is_empty() {
            return Err(DomainError::InvalidBucketKey(
                "Bucket key cannot be empty".to_string(),
            ));
        }

        if key.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(DomainError::InvalidBucketKey(format!(
                "Bucket key contains invalid characters: {key}"
            )));
        }

        Ok(Self(key))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BucketKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BucketKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for BucketKey {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BucketKey> for String {
    fn from(key: BucketKey) -> Self {
        key.0
    }
}

/// Human-facing bucket name
///
/// Names are not unique on the store side; resolution picks the first
/// bucket whose name matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BucketName(String);

impl BucketName {
    /// Length of generated names
    pub const GENERATED_LEN: usize = 8;

    const ALPHABET: &'static [u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    /// Create a new BucketName
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    /// Returns error if the name is blank
    pub fn new(name: String) -> Result<Self, DomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidBucketName(
                "Bucket name cannot be blank".to_string(),
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Generate a random 8-character alphanumeric name
    ///
    /// The characters are base-62 digits of a v4 UUID taken as one integer.
    /// Its low 62 bits are random, well above the 48 bits eight digits need.
    #[must_use]
    pub fn generate() -> Self {
        let mut random = Uuid::new_v4().as_u128();
        let base = Self::ALPHABET.len() as u128;
        let mut name = String::with_capacity(Self::GENERATED_LEN);
        for _ in 0..Self::GENERATED_LEN {
            name.push(char::from(Self::ALPHABET[(random % base) as usize]));
            random /= base;
        }
        Self(name)
    }

    /// Use the given name if present and non-blank, otherwise generate one
    #[must_use]
    pub fn or_generate(name: Option<&str>) -> Self {
        name.and_then(|n| Self::new(n.to_string()).ok())
            .unwrap_or_else(Self::generate)
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BucketName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BucketName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for BucketName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BucketName> for String {
    fn from(name: BucketName) -> Self {
        name.0
    }
}

// ============================================================================
// Session types
// ============================================================================

/// Consistency token ("root") returned by the store after every write
///
/// Opaque to the client. Each push supplies the most recent root as a
/// precondition so writes within a run form a single causal chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RootToken(String);

impl RootToken {
    /// Create a new RootToken
    ///
    /// # Errors
    /// Returns error if the token is empty
    pub fn new(token: String) -> Result<Self, DomainError> {
        if token.is_empty() {
            return Err(DomainError::InvalidRootToken(
                "Root token cannot be empty".to_string(),
            ));
        }

        Ok(Self(token))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RootToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RootToken {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RootToken> for String {
    fn from(token: RootToken) -> Self {
        token.0
    }
}

/// Thread identifier scoping every store request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ThreadId(String);

impl ThreadId {
    /// Create a new ThreadId
    ///
    /// # Errors
    /// Returns error if the id is blank
    pub fn new(id: String) -> Result<Self, DomainError> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidThreadId(
                "Thread ID cannot be blank".to_string(),
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ThreadId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ThreadId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for ThreadId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ThreadId> for String {
    fn from(id: ThreadId) -> Self {
        id.0
    }
}

// ============================================================================
// Tests
// ============================================================================
