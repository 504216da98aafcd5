//! HTTP Basic authentication.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use axum::http::header::{self, HeaderValue};
use base64::Engine as _;

use crate::auth::{Authenticator, Principal};
use crate::http::{ApiResponse, HandlerError, HttpError, RequestHead};

/// Checks a username/password pair.
///
/// Implemented for async closures `Fn(String, String) -> impl Future<Output = bool>`;
/// wrap a plain predicate in [`SyncCheck`].
#[async_trait]
pub trait CredentialCheck: Send + Sync + 'static {
    async fn check(&self, username: String, password: String) -> bool;
}

#[async_trait]
impl<F, Fut> CredentialCheck for F
where
    F: Fn(String, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    async fn check(&self, username: String, password: String) -> bool {
        (self)(username, password).await
    }
}

/// Adapter for synchronous credential predicates.
pub struct SyncCheck<F>(pub F);

#[async_trait]
impl<F> CredentialCheck for SyncCheck<F>
where
    F: Fn(&str, &str) -> bool + Send + Sync + 'static,
{
    async fn check(&self, username: String, password: String) -> bool {
        (self.0)(&username, &password)
    }
}

/// `Authorization: Basic` strategy.
///
/// No header or another scheme yields `Unauthorized` (and a challenge);
/// rejected credentials yield `Forbidden`.
pub struct HttpBasic<C> {
    realm: String,
    check: C,
}

impl<C: CredentialCheck> HttpBasic<C> {
    pub fn new(realm: impl Into<String>, check: C) -> Self {
        Self {
            realm: realm.into(),
            check,
        }
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    fn challenge(&self) -> String {
        format!("Basic realm=\"{}\"", self.realm.replace('"', "'"))
    }
}

impl<C> fmt::Debug for HttpBasic<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpBasic").field("realm", &self.realm).finish_non_exhaustive()
    }
}

/// Split `Basic <base64(user:password)>` into its parts.
fn parse_credentials(value: &str) -> Option<(String, String)> {
    let mut parts = value.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let raw = base64::engine::general_purpose::STANDARD.decode(token).ok()?;
    let decoded = String::from_utf8(raw).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[async_trait]
impl<C: CredentialCheck> Authenticator for HttpBasic<C> {
    async fn authenticate(&self, head: &RequestHead) -> Result<Principal, HandlerError> {
        let Some((username, password)) = head.header("authorization").and_then(parse_credentials) else {
            return Err(HttpError::unauthorized().into());
        };

        if self.check.check(username.clone(), password).await {
            tracing::debug!(user = %username, "Basic credentials accepted");
            Ok(Principal::new(username))
        } else {
            tracing::info!(user = %username, "Basic credentials rejected");
            Err(HttpError::forbidden().into())
        }
    }

    fn auth_failed(&self, error: &HttpError) -> ApiResponse {
        let mut response = ApiResponse::text(401, error.content.clone().unwrap_or_default());
        if let Ok(value) = HeaderValue::from_str(&self.challenge()) {
            response.headers.insert(header::WWW_AUTHENTICATE, value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    fn head(authorization: Option<&str>) -> RequestHead {
        let mut head = RequestHead::new(Method::GET, "/secret");
        if let Some(value) = authorization {
            head.headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        }
        head
    }

    fn basic(user: &str, password: &str) -> String {
        let token = base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", user, password));
        format!("Basic {}", token)
    }

    fn jedi_only() -> HttpBasic<SyncCheck<impl Fn(&str, &str) -> bool + Send + Sync>> {
        HttpBasic::new("restmux", SyncCheck(|user: &str, password: &str| user == "jedi" && password == "jedixx"))
    }

    fn kind(result: Result<Principal, HandlerError>) -> Option<crate::http::ErrorKind> {
        match result {
            Err(HandlerError::Http(e)) => Some(e.kind),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        let principal = jedi_only().authenticate(&head(Some(&basic("jedi", "jedixx")))).await.unwrap();
        assert_eq!(principal, Principal::new("jedi"));
    }

    #[tokio::test]
    async fn test_wrong_password_is_forbidden() {
        let result = jedi_only().authenticate(&head(Some(&basic("jedi", "jedi")))).await;
        assert_eq!(kind(result), Some(crate::http::ErrorKind::Forbidden));
    }

    #[tokio::test]
    async fn test_missing_or_foreign_scheme_is_unauthorized() {
        for value in [None, Some("Bearer abc"), Some("Basic !!!"), Some("Basic")] {
            let result = jedi_only().authenticate(&head(value)).await;
            assert_eq!(kind(result), Some(crate::http::ErrorKind::Unauthorized), "{:?}", value);
        }
    }

    #[tokio::test]
    async fn test_async_check() {
        let auth = HttpBasic::new("restmux", |user: String, _password: String| async move {
            tokio::task::yield_now().await;
            user == "sith"
        });
        assert!(auth.authenticate(&head(Some(&basic("sith", "x")))).await.is_ok());
    }

    #[test]
    fn test_challenge() {
        let response = jedi_only().auth_failed(&HttpError::unauthorized());
        assert_eq!(response.status, 401);
        assert_eq!(response.headers[header::WWW_AUTHENTICATE], "Basic realm=\"restmux\"");
    }

    #[test]
    fn test_password_may_contain_colon() {
        let (user, password) = parse_credentials(&basic("a", "b:c")).unwrap();
        assert_eq!((user.as_str(), password.as_str()), ("a", "b:c"));
    }
}
