//! Route-level access rules shared by the page middleware and the API guard.
//!
//! There is one decision table ([`AccessPolicy::evaluate`]). Page requests
//! project its verdict into redirects, API handlers into 401/403 responses.

use crate::auth::session::Session;
use axum::http::StatusCode;

pub const LOGIN_PATH: &str = "/login";
pub const ADMIN_PREFIX: &str = "/admin";
/// The one non-admin path administrators may reach.
pub const LOGTAIL_PATH: &str = "/api/logtail";

pub const UNAUTHENTICATED_MESSAGE: &str = "Authentication required";
pub const FORBIDDEN_MESSAGE: &str = "Forbidden";

/// Mode-independent outcome of the decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    /// No usable session and the path is not public.
    Unauthenticated,
    /// A logged-in user asked for the login page.
    AlreadyLoggedIn { home: &'static str },
    /// Authenticated, but the path lies outside the role's area.
    OutOfBounds { home: &'static str },
}

/// Verdict projected onto a response shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    RedirectTo(&'static str),
    Deny {
        status: StatusCode,
        message: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    public_assets: Vec<String>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(vec!["/logo.png".to_string()])
    }
}

impl AccessPolicy {
    pub fn new(public_assets: Vec<String>) -> Self {
        Self { public_assets }
    }

    pub fn is_public_asset(&self, path: &str) -> bool {
        self.public_assets.iter().any(|asset| asset == path)
    }

    /// First matching rule wins; the order is significant.
    pub fn evaluate(&self, path: &str, session: Option<&Session>) -> Verdict {
        if self.is_public_asset(path) {
            return Verdict::Allow;
        }

        let Some(session) = session else {
            return if path == LOGIN_PATH {
                Verdict::Allow
            } else {
                Verdict::Unauthenticated
            };
        };

        let home = session.role.home_path();

        if path == LOGIN_PATH {
            return Verdict::AlreadyLoggedIn { home };
        }

        let in_admin_area = path.starts_with(ADMIN_PREFIX);

        if session.is_admin() {
            if in_admin_area || path == LOGTAIL_PATH {
                Verdict::Allow
            } else {
                Verdict::OutOfBounds { home }
            }
        } else if in_admin_area {
            Verdict::OutOfBounds { home }
        } else {
            Verdict::Allow
        }
    }

    /// Browser navigation: everything that is not allowed becomes a redirect.
    pub fn page(&self, path: &str, session: Option<&Session>) -> AccessDecision {
        match self.evaluate(path, session) {
            Verdict::Allow => AccessDecision::Allow,
            Verdict::Unauthenticated => AccessDecision::RedirectTo(LOGIN_PATH),
            Verdict::AlreadyLoggedIn { home } | Verdict::OutOfBounds { home } => {
                AccessDecision::RedirectTo(home)
            }
        }
    }

    /// Programmatic clients: 401 without a session, 403 outside the role's
    /// area. Re-authenticating while logged in is permitted.
    pub fn api(&self, path: &str, session: Option<&Session>) -> AccessDecision {
        match self.evaluate(path, session) {
            Verdict::Allow | Verdict::AlreadyLoggedIn { .. } => AccessDecision::Allow,
            Verdict::Unauthenticated => AccessDecision::Deny {
                status: StatusCode::UNAUTHORIZED,
                message: UNAUTHENTICATED_MESSAGE,
            },
            Verdict::OutOfBounds { .. } => AccessDecision::Deny {
                status: StatusCode::FORBIDDEN,
                message: FORBIDDEN_MESSAGE,
            },
        }
    }
}
