//! Pure state transitions for the session.
//!
//! The reducer never performs I/O. Mirroring committed changes to durable
//! storage is the persistence gateway's job, observing committed actions
//! through the store's effect seam.

use serde::{Deserialize, Serialize};

use crate::session::model::{Profile, Session};

/// Actions the session reducer responds to.
///
/// `Hydrate` is part of the internal bootstrap protocol and is not reachable
/// through the public [`Action`](crate::action::Action) vocabulary; only
/// [`Store::hydrate`](crate::store::Store::hydrate) produces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionAction {
    /// A login that already succeeded upstream. The profile is a fact, not
    /// something the store verifies.
    Login(Profile),
    /// Clear the session. Idempotent.
    Logout,
    /// One-time bootstrap injection of the durably stored profile, or of the
    /// logged-out state when storage holds nothing.
    Hydrate(Option<Profile>),
}

/// Computes the next session state. Total for all well-formed actions;
/// payload validation happens at the dispatch boundary, not here.
///
/// Every current transition replaces the session wholesale, so the prior
/// state is unused. The (state, action) -> state shape is kept so that
/// transitions depending on prior state slot in without an API change.
pub fn reduce(_state: &Session, action: &SessionAction) -> Session {
    match action {
        SessionAction::Login(profile) => Session::logged_in(profile.clone()),
        SessionAction::Logout => Session::logged_out(),
        SessionAction::Hydrate(profile) => Session::hydrated(profile.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_sets_user_and_flag() {
        let next = reduce(
            &Session::logged_out(),
            &SessionAction::Login(json!({"id": 7})),
        );
        assert_eq!(next, Session::logged_in(json!({"id": 7})));
    }

    #[test]
    fn test_logout_is_idempotent() {
        let once = reduce(&Session::logged_in(json!("u")), &SessionAction::Logout);
        let twice = reduce(&once, &SessionAction::Logout);
        assert_eq!(once, twice);
        assert_eq!(twice, Session::logged_out());
    }

    #[test]
    fn test_hydrate_with_profile() {
        let next = reduce(
            &Session::logged_out(),
            &SessionAction::Hydrate(Some(json!({"name": "mai"}))),
        );
        assert!(next.is_authenticated);
        assert_eq!(next.user, Some(json!({"name": "mai"})));
    }

    #[test]
    fn test_hydrate_with_absent_profile_resets() {
        let next = reduce(
            &Session::logged_in(json!("stale")),
            &SessionAction::Hydrate(None),
        );
        assert_eq!(next, Session::logged_out());
    }
}
