//! Caller identity.
//!
//! Every service operation receives the caller explicitly; nothing reads
//! ambient session state.

use std::{fmt, str::FromStr};

use folio::pricing::UnknownVariant;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::UserUuid;

/// Shortest accepted guest session key.
pub const SESSION_KEY_MIN_LEN: usize = 16;

/// Longest accepted guest session key.
pub const SESSION_KEY_MAX_LEN: usize = 128;

/// What an authenticated user may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Editor,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Editor => "editor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "customer" => Ok(Self::Customer),
            "editor" => Ok(Self::Editor),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownVariant(value.to_string())),
        }
    }
}

/// An authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user: UserUuid,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub const fn new(user: UserUuid, role: Role) -> Self {
        Self { user, role }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    #[must_use]
    pub const fn is_editor(&self) -> bool {
        matches!(self.role, Role::Editor)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("session key must be {SESSION_KEY_MIN_LEN}-{SESSION_KEY_MAX_LEN} characters of [A-Za-z0-9_-]")]
pub struct InvalidSessionKey;

/// Opaque key identifying an anonymous shopper.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    /// Validates and wraps a raw session key.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSessionKey`] when the key has the wrong length or characters.
    pub fn parse(raw: &str) -> Result<Self, InvalidSessionKey> {
        let valid_len = (SESSION_KEY_MIN_LEN..=SESSION_KEY_MAX_LEN).contains(&raw.len());
        let valid_chars = raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');

        if valid_len && valid_chars {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidSessionKey)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whoever is making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    User(Actor),
    Guest(SessionKey),
}

impl Identity {
    #[must_use]
    pub const fn actor(&self) -> Option<&Actor> {
        match self {
            Self::User(actor) => Some(actor),
            Self::Guest(_) => None,
        }
    }

    #[must_use]
    pub fn user_uuid(&self) -> Option<UserUuid> {
        self.actor().map(|actor| actor.user)
    }

    #[must_use]
    pub const fn session_key(&self) -> Option<&SessionKey> {
        match self {
            Self::User(_) => None,
            Self::Guest(key) => Some(key),
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.actor().is_some_and(Actor::is_admin)
    }
}

impl From<Actor> for Identity {
    fn from(actor: Actor) -> Self {
        Self::User(actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_keys_are_validated() {
        assert!(SessionKey::parse("abcdefgh-1234_XYZ").is_ok());
        assert!(SessionKey::parse("short").is_err());
        assert!(SessionKey::parse("has spaces in the key!").is_err());
        assert!(SessionKey::parse(&"a".repeat(SESSION_KEY_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn guest_identity_has_no_actor() {
        let identity = Identity::Guest(SessionKey("guest-session-0001".to_string()));

        assert!(identity.actor().is_none());
        assert!(identity.user_uuid().is_none());
        assert!(!identity.is_admin());
    }
}
