//! Bearer-token verification against the external identity provider.
//!
//! The service never issues or refreshes sessions itself; it only resolves
//! the caller's token to a user id and fails closed on anything else.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use reqwest::Client;
use tracing::warn;

use crate::errors::AppError;
use crate::models::user::AuthUser;

#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolves a bearer token to the authenticated user.
    /// Any transport or provider failure is treated as `Unauthorized`.
    pub async fn verify(&self, token: &str) -> Result<AuthUser, AppError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                warn!("Identity provider unreachable: {e}");
                AppError::Unauthorized
            })?;

        if !response.status().is_success() {
            warn!("Token rejected by identity provider: {}", response.status());
            return Err(AppError::Unauthorized);
        }

        response.json::<AuthUser>().await.map_err(|e| {
            warn!("Malformed identity response: {e}");
            AppError::Unauthorized
        })
    }
}

/// Extracts the bearer token from the `Authorization` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extracts_value() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_bearer_token_empty_value() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
