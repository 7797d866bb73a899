//! Session and role resolution
//!
//! The resolver asks the control plane who we are and the pure `route`
//! function turns the answer into a routing decision. Every failure path
//! lands in `Unauthenticated`; there is no retry.

use crate::api::RemoteApi;
use crate::error::LoginError;
use podium_common::auth::{LoginRequest, Role};
use tracing::{info, warn};

/// Authentication state of the current client session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unknown,
    Authenticated(Role),
    Unauthenticated,
}

/// Client session, alive for one process at most
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub state: SessionState,
    pub display_name: Option<String>,
}

impl Session {
    pub fn unauthenticated() -> Self {
        Self {
            state: SessionState::Unauthenticated,
            display_name: None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self.state {
            SessionState::Authenticated(role) => Some(role),
            _ => None,
        }
    }
}

/// Screens the client can mount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Login,
    User,
    Admin,
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::Login => write!(f, "login"),
            View::User => write!(f, "user"),
            View::Admin => write!(f, "admin"),
        }
    }
}

/// What to do with a request for a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session still unknown: show nothing protected
    Placeholder,
    Render(View),
    RedirectTo(View),
}

/// Decide how a requested view is served for a session state.
///
/// Non-admins asking for the admin view are sent to login, never downgraded
/// to the user view. Admins asking for the user view are sent to the admin view.
/// Redirect targets always render for the same state, so one hop is final.
pub fn route(requested: View, state: SessionState) -> RouteDecision {
    match (requested, state) {
        (View::Login, _) => RouteDecision::Render(View::Login),
        (_, SessionState::Unknown) => RouteDecision::Placeholder,
        (_, SessionState::Unauthenticated) => RouteDecision::RedirectTo(View::Login),
        (View::Admin, SessionState::Authenticated(Role::Admin)) => RouteDecision::Render(View::Admin),
        (View::Admin, SessionState::Authenticated(Role::User)) => {
            RouteDecision::RedirectTo(View::Login)
        }
        (View::User, SessionState::Authenticated(Role::Admin)) => {
            RouteDecision::RedirectTo(View::Admin)
        }
        (View::User, SessionState::Authenticated(Role::User)) => RouteDecision::Render(View::User),
    }
}

/// Resolves the session against the control plane
pub struct SessionResolver<'a, A: RemoteApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: RemoteApi + ?Sized> SessionResolver<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Validate the session, then fetch the profile. Either failing means unauthenticated.
    pub async fn resolve(&self) -> Session {
        let check = match self.api.session().await {
            Ok(check) => check,
            Err(e) => {
                warn!("Session check failed: {}", e);
                return Session::unauthenticated();
            }
        };

        let profile = match self.api.profile().await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Profile fetch failed: {}", e);
                return Session::unauthenticated();
            }
        };

        let role = check.role();
        info!(role = %role, "Session resolved");

        Session {
            state: SessionState::Authenticated(role),
            display_name: Some(profile.message),
        }
    }

    /// Submit credentials. Blank fields are rejected without touching the network.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), LoginError> {
        if username.is_empty() || password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        self.api.login(&request).await.map_err(|e| {
            warn!("Login failed for {}: {}", username, e);
            LoginError::from(e)
        })?;

        info!("Logged in as {}", username);
        Ok(())
    }

    /// Clear the server session; the local session is dropped whatever the outcome
    pub async fn logout(&self, session: &mut Session) {
        if let Err(e) = self.api.logout().await {
            warn!("Logout call failed: {}", e);
        }
        *session = Session::unauthenticated();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: SessionState = SessionState::Authenticated(Role::User);
    const ADMIN: SessionState = SessionState::Authenticated(Role::Admin);

    #[test]
    fn test_unknown_renders_placeholder() {
        assert_eq!(route(View::User, SessionState::Unknown), RouteDecision::Placeholder);
        assert_eq!(route(View::Admin, SessionState::Unknown), RouteDecision::Placeholder);
    }

    #[test]
    fn test_unauthenticated_goes_to_login() {
        assert_eq!(
            route(View::User, SessionState::Unauthenticated),
            RouteDecision::RedirectTo(View::Login)
        );
        assert_eq!(
            route(View::Admin, SessionState::Unauthenticated),
            RouteDecision::RedirectTo(View::Login)
        );
    }

    #[test]
    fn test_user_on_admin_view_fails_closed() {
        assert_eq!(route(View::Admin, USER), RouteDecision::RedirectTo(View::Login));
    }

    #[test]
    fn test_admin_on_user_view_is_redirected() {
        assert_eq!(route(View::User, ADMIN), RouteDecision::RedirectTo(View::Admin));
        assert_eq!(route(View::Admin, ADMIN), RouteDecision::Render(View::Admin));
        assert_eq!(route(View::User, USER), RouteDecision::Render(View::User));
    }

    #[test]
    fn test_login_always_renders() {
        assert_eq!(route(View::Login, ADMIN), RouteDecision::Render(View::Login));
        assert_eq!(
            route(View::Login, SessionState::Unknown),
            RouteDecision::Render(View::Login)
        );
    }
}
