//! Knowledge domain identifier

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Maximum length for domain names
pub const MAX_DOMAIN_NAME_LENGTH: usize = 64;

/// Lowercase alphanumeric plus `-` and `_`, starting with an alphanumeric
static DOMAIN_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").unwrap());

/// Domain name validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum DomainNameError {
    /// Name is empty
    Empty,
    /// Name exceeds maximum length
    TooLong { length: usize, max: usize },
    /// Name contains invalid characters
    InvalidFormat { name: String },
}

impl fmt::Display for DomainNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Domain name cannot be empty"),
            Self::TooLong { length, max } => {
                write!(f, "Domain name too long: {} characters (max {})", length, max)
            }
            Self::InvalidFormat { name } => write!(
                f,
                "Invalid domain name '{}': must be lowercase alphanumeric with '-' or '_', starting with a letter or digit",
                name
            ),
        }
    }
}

impl std::error::Error for DomainNameError {}

impl From<DomainNameError> for DomainError {
    fn from(err: DomainNameError) -> Self {
        DomainError::validation(err.to_string())
    }
}

/// Validate a domain name
pub fn validate_domain_name(name: &str) -> Result<(), DomainNameError> {
    if name.is_empty() {
        return Err(DomainNameError::Empty);
    }

    if name.len() > MAX_DOMAIN_NAME_LENGTH {
        return Err(DomainNameError::TooLong {
            length: name.len(),
            max: MAX_DOMAIN_NAME_LENGTH,
        });
    }

    if !DOMAIN_NAME_PATTERN.is_match(name) {
        return Err(DomainNameError::InvalidFormat {
            name: name.to_string(),
        });
    }

    Ok(())
}

/// Name of a knowledge domain (e.g. `law`, `medical`). Doubles as a directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

impl DomainName {
    /// Create a new DomainName after validation
    pub fn new(name: impl Into<String>) -> Result<Self, DomainNameError> {
        let name = name.into();
        validate_domain_name(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DomainName {
    type Error = DomainNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DomainName> for String {
    fn from(name: DomainName) -> Self {
        name.0
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
