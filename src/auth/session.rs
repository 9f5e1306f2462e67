use crate::auth::rbac::Role;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

/// Name of the cookie carrying the serialized [`Session`].
pub const SESSION_COOKIE: &str = "auth-session";

/// Identity and role claim carried client-side in the `auth-session` cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Session {
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Converts between [`Session`] and the cookie value.
///
/// Decoding never fails outward: anything that is not a well-formed
/// `{username, role}` record decodes to `None`, exactly like a missing cookie.
pub struct SessionCodec;

impl SessionCodec {
    pub fn encode(session: &Session) -> Result<String, serde_json::Error> {
        serde_json::to_string(session)
    }

    pub fn decode(raw: Option<&str>) -> Option<Session> {
        let raw = raw?;

        match serde_json::from_str::<Session>(raw) {
            Ok(session) if !session.username.trim().is_empty() => Some(session),
            Ok(_) => {
                tracing::error!("Rejected auth-session cookie: empty username");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse auth-session cookie");
                None
            }
        }
    }

    /// Decode the session carried by a request's cookie jar, if any.
    pub fn from_jar(jar: &CookieJar) -> Option<Session> {
        Self::decode(jar.get(SESSION_COOKIE).map(|cookie| cookie.value()))
    }
}

/// Cookie set on successful login.
pub fn session_cookie(value: String, max_age_seconds: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(time::Duration::seconds(max_age_seconds))
        .build()
}

/// Cookie that overwrites the session on logout.
pub fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}
