//! Auth gate - decides whether a navigation may proceed.

use std::sync::Arc;
use tracing::debug;

use crate::routes::Route;
use crate::services::SessionStore;

/// Outcome of one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Render the requested route unmodified.
    Allow(Route),
    /// No session: show the login view instead.
    Deny { redirect: Route },
}

impl GateDecision {
    /// The route that should actually be shown.
    pub fn target(self) -> Route {
        match self {
            Self::Allow(route) => route,
            Self::Deny { redirect } => redirect,
        }
    }
}

/// Guard in front of protected routes.
///
/// Only checks that a session is stored; token validity is left to the
/// backend.
pub struct AuthGate {
    session_store: Arc<SessionStore>,
}

impl AuthGate {
    pub fn new(session_store: Arc<SessionStore>) -> Self {
        Self { session_store }
    }

    /// Decide whether `route` may be shown right now.
    pub fn check(&self, route: Route) -> GateDecision {
        if !route.is_protected() || self.session_store.is_authenticated() {
            return GateDecision::Allow(route);
        }
        debug!("Denied {} without a session", route);
        GateDecision::Deny {
            redirect: Route::Login,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Session;
    use crate::routes::{Protection, ROUTE_TABLE};

    fn table_routes() -> Vec<Route> {
        ROUTE_TABLE
            .iter()
            .filter_map(|entry| Route::parse(&entry.pattern.replace(":id", "7")))
            .collect()
    }

    #[test]
    fn test_denies_every_protected_route_without_session() {
        let gate = AuthGate::new(Arc::new(SessionStore::in_memory().unwrap()));

        for route in table_routes() {
            let protected = route.protection() == Protection::Protected;
            let decision = gate.check(route.clone());
            if protected {
                assert_eq!(
                    decision,
                    GateDecision::Deny {
                        redirect: Route::Login
                    }
                );
            } else {
                assert_eq!(decision, GateDecision::Allow(route));
            }
        }
    }

    #[test]
    fn test_allows_everything_with_session() {
        let store = Arc::new(SessionStore::in_memory().unwrap());
        store
            .set_session(&Session::new("Ada", "ada@example.com", "tok").unwrap())
            .unwrap();
        let gate = AuthGate::new(store.clone());

        for route in table_routes() {
            assert_eq!(gate.check(route.clone()), GateDecision::Allow(route));
        }

        store.clear_session().unwrap();
        assert_eq!(gate.check(Route::Profile).target(), Route::Login);
    }
}
