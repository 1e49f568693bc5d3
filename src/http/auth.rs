use std::{fmt, sync::Arc};

use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{NotiflowError, Result};

use super::{Dispatcher, models::*};

const ACCESS_TOKEN_KEY: &str = "access_token";

/// Bearer token from a client-credentials exchange, scoped to one invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Performs the client-credentials exchange. Tokens are never cached: each
/// call to [`Authenticator::authenticate`] is a fresh exchange.
#[derive(Clone)]
pub struct Authenticator {
    dispatcher: Arc<Dispatcher>,
}

impl Authenticator {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
        }
    }

    pub async fn authenticate(
        &self,
        auth_url: &str,
        client_secret: &str,
    ) -> Result<AuthToken> {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, "content-type", CONTENT_TYPE_FORM)?;
        insert_header(&mut headers, "accept", "application/json")?;

        let request = HttpRequest::post(
            auth_url,
            headers,
            RequestBody::Form(vec![
                ("grant_type".to_string(), "client_credentials".to_string()),
                ("client_secret".to_string(), client_secret.to_string()),
            ]),
        );

        debug!("requesting client-credentials token from {}", auth_url);
        let response = self.dispatcher.send(request).await.map_err(|err| match err {
            NotiflowError::Http {
                status,
                body,
            } => NotiflowError::Auth(format!("HTTP status {}: {}", status, body)),
            NotiflowError::Transport(message) => NotiflowError::Auth(message),
            other => other,
        })?;

        let data = match response.body {
            ResponseBody::Json(value) => value,
            ResponseBody::Raw(raw) => {
                let reason = serde_json::from_str::<Value>(&raw).err().map(|e| e.to_string()).unwrap_or_default();
                return Err(NotiflowError::Auth(format!("failed to parse auth response ({}): {}", reason, raw)));
            }
        };

        match data.get(ACCESS_TOKEN_KEY).and_then(Value::as_str).filter(|t| !t.is_empty()) {
            Some(token) => Ok(AuthToken::new(token)),
            None => {
                warn!("auth response from {} has no {}", auth_url, ACCESS_TOKEN_KEY);
                Err(NotiflowError::AuthFailure(format!("token not found in response: {}", data)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    use super::*;

    fn authenticator() -> Authenticator {
        Authenticator::new(Arc::new(Dispatcher::new()))
    }

    #[tokio::test]
    async fn test_authenticate_returns_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/external/auth")
                    .header("content-type", CONTENT_TYPE_FORM)
                    .body("grant_type=client_credentials&client_secret=s3cret");
                then.status(200).json_body(json!({"access_token": "tok-1", "token_type": "bearer"}));
            })
            .await;

        let token = authenticator().authenticate(&server.url("/api/external/auth"), "s3cret").await.unwrap();
        mock.assert_calls_async(1).await;
        assert_eq!(token.secret(), "tok-1");
        assert_eq!(format!("{:?}", token), "AuthToken(***)");
    }

    #[tokio::test]
    async fn test_authenticate_string_body_is_parsed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth");
                then.status(200).header("content-type", "text/plain").body(r#"{"access_token":"tok-2"}"#);
            })
            .await;

        let token = authenticator().authenticate(&server.url("/auth"), "s").await.unwrap();
        assert_eq!(token.secret(), "tok-2");
    }

    #[tokio::test]
    async fn test_authenticate_unparsable_body_is_auth_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth");
                then.status(200).body("<html>login</html>");
            })
            .await;

        let err = authenticator().authenticate(&server.url("/auth"), "s").await.unwrap_err();
        assert!(matches!(err, NotiflowError::Auth(_)));
    }

    #[tokio::test]
    async fn test_authenticate_without_token_is_auth_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth");
                then.status(200).json_body(json!({"error": "invalid_client"}));
            })
            .await;

        let err = authenticator().authenticate(&server.url("/auth"), "s").await.unwrap_err();
        assert!(matches!(err, NotiflowError::AuthFailure(_)));
        assert!(err.to_string().contains("invalid_client"));
    }

    #[tokio::test]
    async fn test_authenticate_http_error_keeps_details() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth");
                then.status(401).json_body(json!({"message": "bad secret"}));
            })
            .await;

        let err = authenticator().authenticate(&server.url("/auth"), "s").await.unwrap_err();
        match err {
            NotiflowError::Auth(message) => {
                assert!(message.contains("401"));
                assert!(message.contains("bad secret"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_authenticate_without_server_is_auth_error() {
        let err = authenticator().authenticate("http://127.0.0.1:1/auth", "s").await.unwrap_err();
        assert!(matches!(err, NotiflowError::Auth(_)));
    }
}
