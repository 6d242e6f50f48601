//! Session domain model.
//!
//! Represents the authentication state of the application. The profile is an
//! opaque, caller-supplied serializable value; the core never inspects its
//! structure.

use serde::{Deserialize, Serialize};

/// Opaque user profile supplied by the caller at login.
///
/// `serde_json::Value` keeps the core agnostic about what a profile contains.
pub type Profile = serde_json::Value;

/// Authentication state of the application.
///
/// Invariant: `is_authenticated == user.is_some()`. All states are produced
/// through the constructors below, which uphold this by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The logged-in user's profile, if any.
    pub user: Option<Profile>,
    /// Derived flag, true iff `user` is present.
    pub is_authenticated: bool,
}

impl Session {
    /// The logged-out state. Also the initial state at process start.
    pub fn logged_out() -> Self {
        Self {
            user: None,
            is_authenticated: false,
        }
    }

    /// A logged-in state holding the given profile.
    pub fn logged_in(profile: Profile) -> Self {
        Self {
            user: Some(profile),
            is_authenticated: true,
        }
    }

    /// A state hydrated from durable storage. `is_authenticated` is always
    /// derived from the presence of the profile, never read from storage.
    pub fn hydrated(profile: Option<Profile>) -> Self {
        Self {
            is_authenticated: profile.is_some(),
            user: profile,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::logged_out()
    }
}
