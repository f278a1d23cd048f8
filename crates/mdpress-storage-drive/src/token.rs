//! OAuth 2 token exchange for Drive.
//!
//! Handles the two credential exchanges this backend needs:
//!
//! 1. Bootstrap (operator-driven, once): authorization code for a
//!    long-lived refresh token, via [`consent_url`] and
//!    [`TokenClient::exchange_code`].
//! 2. Use time (per process lifetime): refresh token for a short-lived
//!    access token, via [`TokenClient::exchange_refresh_token`].

use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use ureq::Agent;

use crate::error::DriveError;

/// Token endpoint for both exchange flows.
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Consent screen base URL.
const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Scope limited to files this application creates.
const SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

/// HTTP timeout for token exchanges in seconds.
const DEFAULT_TIMEOUT: u64 = 8;

/// Characters left verbatim by form/query encoding (RFC 3986 unreserved).
const FORM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Long-lived credential returned by the bootstrap exchange.
#[derive(Debug, Clone)]
pub struct RefreshCredential {
    /// Refresh token for operator configuration.
    pub refresh_token: String,
    /// Access token issued alongside it (usable immediately).
    pub access_token: String,
}

/// Token response from the OAuth endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Build the consent-flow URL an operator opens in a browser.
///
/// Requests offline access so the authorization code can be exchanged for
/// a refresh token.
#[must_use]
pub fn consent_url(client_id: &str, redirect_uri: &str) -> String {
    format!(
        "{AUTH_URL}?{}",
        form_encode(&[
            ("response_type", "code"),
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("scope", SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ])
    )
}

/// OAuth 2 token exchange client.
pub struct TokenClient {
    agent: Agent,
    client_id: String,
    client_secret: String,
    token_url: String,
}

impl TokenClient {
    /// Create a token client for an OAuth client registration.
    #[must_use]
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            token_url: TOKEN_URL.to_owned(),
        }
    }

    /// Exchange a long-lived refresh token for a short-lived access token.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Auth`] if the exchange fails (network error,
    /// revoked refresh token, or malformed response).
    pub fn exchange_refresh_token(&self, refresh_token: &str) -> Result<String, DriveError> {
        let response = self.post_form(&[
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])?;
        Ok(response.access_token)
    }

    /// Exchange an authorization code for a refresh credential.
    ///
    /// `redirect_uri` must match the one used to build the consent URL.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Auth`] if the exchange fails or the provider
    /// did not issue a refresh token (consent not granted offline).
    pub fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<RefreshCredential, DriveError> {
        let response = self.post_form(&[
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])?;

        let refresh_token = response.refresh_token.ok_or_else(|| {
            DriveError::Auth("provider did not issue a refresh token".to_owned())
        })?;

        Ok(RefreshCredential {
            refresh_token,
            access_token: response.access_token,
        })
    }

    /// POST a form-encoded body to the token endpoint and parse the reply.
    fn post_form(&self, fields: &[(&str, &str)]) -> Result<TokenResponse, DriveError> {
        let body = form_encode(fields);

        let response = self
            .agent
            .post(&self.token_url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Accept", "application/json")
            .send(body.as_bytes())
            .map_err(|e| DriveError::Auth(format!("token request failed: {e}")))?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(DriveError::Auth(format!(
                "token exchange failed ({status}): {error_body}"
            )));
        }

        body_reader
            .read_json()
            .map_err(|e| DriveError::Auth(format!("malformed token response: {e}")))
    }
}

/// Encode key/value pairs as `application/x-www-form-urlencoded`.
fn form_encode(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{key}={}", utf8_percent_encode(value, FORM)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_form_encode_plain() {
        let encoded = form_encode(&[("a", "1"), ("b", "2")]);

        assert_eq!(encoded, "a=1&b=2");
    }

    #[test]
    fn test_form_encode_reserved_characters() {
        let encoded = form_encode(&[("redirect_uri", "http://localhost:8080/cb?x=1")]);

        assert_eq!(
            encoded,
            "redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fcb%3Fx%3D1"
        );
    }

    #[test]
    fn test_consent_url_contains_offline_access() {
        let url = consent_url("client-123", "http://localhost:8080/api/auth/callback");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fdrive.file"));
    }

    #[test]
    fn test_token_client_uses_token_endpoint() {
        let client = TokenClient::new("id", "secret");

        assert_eq!(client.token_url, "https://oauth2.googleapis.com/token");
    }
}
