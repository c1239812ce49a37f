//! Credential check seam for record use-cases.
//!
//! # Responsibility
//! - Declare the capability the service layer asks before touching storage.
//! - Keep credential storage and verification outside core.
//!
//! # Invariants
//! - A blank subject is never authorized.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller identity presented with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Stable subject (user name or service id).
    pub subject: String,
}

impl Credential {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }
}

/// Access level requested by a use-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl Access {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Authorization failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Subject is empty or whitespace.
    MissingCredential,
    /// Checker refused the subject for the requested access.
    Rejected { subject: String, access: Access },
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "credential subject must not be empty"),
            Self::Rejected { subject, access } => {
                write!(f, "`{subject}` is not allowed {} access", access.as_str())
            }
        }
    }
}

impl Error for AuthError {}

/// Pluggable authorization capability.
pub trait CredentialCheck {
    fn authorize(&self, credential: &Credential, access: Access) -> Result<(), AuthError>;
}

impl<F> CredentialCheck for F
where
    F: Fn(&Credential, Access) -> Result<(), AuthError>,
{
    fn authorize(&self, credential: &Credential, access: Access) -> Result<(), AuthError> {
        self(credential, access)
    }
}

/// Trusts any non-blank subject. For local tooling where the operator owns
/// the database file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOperator;

impl CredentialCheck for LocalOperator {
    fn authorize(&self, credential: &Credential, _access: Access) -> Result<(), AuthError> {
        if credential.subject.trim().is_empty() {
            return Err(AuthError::MissingCredential);
        }
        Ok(())
    }
}
