//! Server-side sessions addressed by a signed cookie.
//!
//! A session record (user id, display name, expiry) lives in memory on the
//! server. The browser only holds a `session` cookie whose value is a JWT
//! naming the record's id, so a forged or tampered cookie never resolves.
//! Handlers never look at cookies directly; they take one of the
//! extractors below.

use crate::{
    auth::{create_token, validate_token},
    errors::ApiError,
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
    response::Redirect,
};
use chrono::{DateTime, Duration, Utc};
use cookie::{Cookie, SameSite};
use dashmap::DashMap;
use std::{convert::Infallible, sync::Arc};
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";

/// The projection of a signed-in user carried by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: i64,
    pub name: String,
}

#[derive(Debug)]
struct SessionRecord {
    user: SessionUser,
    expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionStore {
    records: Arc<DashMap<Uuid, SessionRecord>>,
    secret: Arc<str>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            secret: Arc::from(secret),
            ttl,
        }
    }

    /// Start a session and return the `Set-Cookie` value that carries it.
    /// Expired records left behind by abandoned sessions are pruned here.
    pub fn establish(&self, user_id: i64, name: &str) -> Result<String, ApiError> {
        let now = Utc::now();
        self.records.retain(|_, record| record.expires_at > now);

        let id = Uuid::new_v4();
        let expires_at = now + self.ttl;
        let token = create_token(&id, expires_at, &self.secret)?;

        self.records.insert(
            id,
            SessionRecord {
                user: SessionUser {
                    user_id,
                    name: name.to_string(),
                },
                expires_at,
            },
        );

        let cookie = Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(cookie::time::Duration::seconds(self.ttl.num_seconds()))
            .build();
        Ok(cookie.to_string())
    }

    /// The signed-in user for these request headers, if any.
    pub fn current(&self, headers: &HeaderMap) -> Option<SessionUser> {
        let id = self.session_id(headers)?;

        let expired = match self.records.get(&id) {
            Some(record) if record.expires_at > Utc::now() => return Some(record.user.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            debug!("Dropping expired session {}", id);
            self.records.remove(&id);
        }
        None
    }

    /// Forget the session named by these headers and return a `Set-Cookie`
    /// value that deletes the cookie client-side.
    pub fn clear(&self, headers: &HeaderMap) -> String {
        if let Some(id) = self.session_id(headers) {
            self.records.remove(&id);
        }

        let mut cookie = Cookie::build((SESSION_COOKIE, "")).path("/").build();
        cookie.make_removal();
        cookie.to_string()
    }

    fn session_id(&self, headers: &HeaderMap) -> Option<Uuid> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|raw| Cookie::split_parse(raw))
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == SESSION_COOKIE)
            .and_then(|cookie| validate_token(cookie.value(), &self.secret))
    }
}

/// The session, if the caller is signed in. Never rejects.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for CurrentSession
where
    SessionStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = SessionStore::from_ref(state);
        Ok(Self(sessions.current(&parts.headers)))
    }
}

/// A signed-in caller. Anonymous requests are redirected to `/login`
/// before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthSession(pub SessionUser);

impl<S> FromRequestParts<S> for AuthSession
where
    SessionStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = SessionStore::from_ref(state);
        sessions
            .current(&parts.headers)
            .map(Self)
            .ok_or_else(|| Redirect::to("/login"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn request_headers(set_cookie: &str) -> HeaderMap {
        let cookie = Cookie::parse(set_cookie.to_string()).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}={}", cookie.name(), cookie.value()))
                .unwrap(),
        );
        headers
    }

    #[test]
    fn established_session_is_current() {
        let store = SessionStore::new("secret", Duration::hours(1));
        let set_cookie = store.establish(7, "Ann").unwrap();

        assert!(set_cookie.starts_with("session="));
        assert!(set_cookie.contains("HttpOnly"));

        let user = store.current(&request_headers(&set_cookie)).unwrap();
        assert_eq!(
            user,
            SessionUser {
                user_id: 7,
                name: "Ann".into()
            }
        );
    }

    #[test]
    fn no_cookie_means_anonymous() {
        let store = SessionStore::new("secret", Duration::hours(1));
        assert_eq!(store.current(&HeaderMap::new()), None);
    }

    #[test]
    fn cookie_signed_by_another_key_is_ignored() {
        let other = SessionStore::new("other", Duration::hours(1));
        let store = SessionStore::new("secret", Duration::hours(1));
        let set_cookie = other.establish(7, "Ann").unwrap();

        assert_eq!(store.current(&request_headers(&set_cookie)), None);
    }

    #[test]
    fn clear_ends_the_session() {
        let store = SessionStore::new("secret", Duration::hours(1));
        let headers = request_headers(&store.establish(7, "Ann").unwrap());

        let removal = store.clear(&headers);

        assert!(removal.starts_with("session=;"));
        assert!(removal.contains("Max-Age=0"));
        assert_eq!(store.current(&headers), None);
    }

    #[test]
    fn new_login_prunes_abandoned_expired_sessions() {
        let store = SessionStore::new("secret", Duration::hours(1));
        for user_id in 0..1000 {
            store.establish(user_id, "someone").unwrap();
        }
        for mut record in store.records.iter_mut() {
            record.expires_at = Utc::now() - Duration::seconds(1);
        }

        let headers = request_headers(&store.establish(7, "Ann").unwrap());

        assert_eq!(store.records.len(), 1);
        assert_eq!(store.current(&headers).unwrap().user_id, 7);
    }

    #[test]
    fn expired_record_is_dropped() {
        let store = SessionStore::new("secret", Duration::hours(1));
        let headers = request_headers(&store.establish(7, "Ann").unwrap());

        for mut record in store.records.iter_mut() {
            record.expires_at = Utc::now() - Duration::seconds(1);
        }

        assert_eq!(store.current(&headers), None);
        assert!(store.records.is_empty());
    }
}
