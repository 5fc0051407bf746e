//! OAuth authorization-code flow with PKCE.
//!
//! A terminal has no redirect target, so the app is registered with the
//! out-of-band redirect URI and the user pastes the code back in.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use log::debug;
use reqwest::{Client, Url};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::{Credentials, PendingAuth, instance_url, normalize_instance};
use crate::error::{MastodonError, Result};
use crate::providers::mastodon::{parse_json, request_failed};

pub const CLIENT_NAME: &str = "threadsmith";
pub const REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
pub const SCOPES: &str = "read write";
const WEBSITE: &str = "https://github.com/threadsmith/threadsmith";

/// Length of the generated code verifier, in hex characters
const VERIFIER_LEN: usize = 56;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredApp {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Random hex string used as the PKCE code verifier.
pub fn generate_code_verifier() -> String {
    let mut verifier = String::with_capacity(VERIFIER_LEN + 32);
    while verifier.len() < VERIFIER_LEN {
        verifier.push_str(&Uuid::new_v4().simple().to_string());
    }
    verifier.truncate(VERIFIER_LEN);
    verifier
}

/// S256 challenge for `verifier`: base64url (no padding) of its SHA-256.
pub fn code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Page the user opens to approve the app.
pub fn authorization_url(instance: &str, client_id: &str, challenge: &str) -> Result<Url> {
    let base = format!("{}/oauth/authorize", instance_url(instance));
    Url::parse_with_params(
        &base,
        &[
            ("client_id", client_id),
            ("redirect_uri", REDIRECT_URI),
            ("response_type", "code"),
            ("scope", SCOPES),
            ("code_challenge", challenge),
            ("code_challenge_method", "S256"),
        ],
    )
    .map_err(|e| MastodonError::OAuth(format!("Invalid instance {}: {}", instance, e)))
}

/// Drives registration and token exchange against one instance.
pub struct OAuthClient {
    instance: String,
    base_url: String,
    client: Client,
}

impl OAuthClient {
    pub fn new(instance: &str) -> Self {
        Self {
            instance: normalize_instance(instance),
            base_url: instance_url(instance),
            client: Client::new(),
        }
    }

    /// `POST /api/v1/apps`
    pub async fn register_app(&self) -> Result<RegisteredApp> {
        debug!("registering app on {}", self.instance);
        let response = self
            .client
            .post(format!("{}/api/v1/apps", self.base_url))
            .form(&[
                ("client_name", CLIENT_NAME),
                ("redirect_uris", REDIRECT_URI),
                ("scopes", SCOPES),
                ("website", WEBSITE),
            ])
            .send()
            .await
            .map_err(request_failed)?;

        parse_json(response)
            .await
            .map_err(|e| MastodonError::OAuth(format!("Failed to register app: {}", e)))
    }

    /// Register the app and prepare a PKCE verifier. Returns the pending
    /// state to persist and the URL to send the user to.
    pub async fn start(&self) -> Result<(PendingAuth, Url)> {
        let app = self.register_app().await?;
        let code_verifier = generate_code_verifier();
        let url = authorization_url(&self.instance, &app.client_id, &code_challenge(&code_verifier))?;

        let pending = PendingAuth {
            instance: self.instance.clone(),
            client_id: app.client_id,
            client_secret: app.client_secret,
            code_verifier,
        };
        Ok((pending, url))
    }

    /// `POST /oauth/token`: trade the pasted code for an access token.
    pub async fn exchange_code(&self, pending: &PendingAuth, code: &str) -> Result<Credentials> {
        let code = code.trim();
        if code.is_empty() {
            return Err(MastodonError::OAuth("No authorization code given".to_string()));
        }

        let response = self
            .client
            .post(format!("{}/oauth/token", self.base_url))
            .form(&[
                ("client_id", pending.client_id.as_str()),
                ("client_secret", pending.client_secret.as_str()),
                ("redirect_uri", REDIRECT_URI),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("code_verifier", pending.code_verifier.as_str()),
                ("scope", SCOPES),
            ])
            .send()
            .await
            .map_err(request_failed)?;

        let token: TokenResponse = parse_json(response)
            .await
            .map_err(|e| MastodonError::OAuth(format!("Failed to exchange code for token: {}", e)))?;

        Ok(Credentials {
            instance: pending.instance.clone(),
            client_id: pending.client_id.clone(),
            client_secret: pending.client_secret.clone(),
            access_token: token.access_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_verifier_shape() {
        let verifier = generate_code_verifier();
        assert_eq!(verifier.len(), VERIFIER_LEN);
        assert!(verifier.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(verifier, generate_code_verifier());
    }

    #[test]
    fn test_code_challenge_rfc7636_vector() {
        // RFC 7636, appendix B
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            code_challenge(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_authorization_url() {
        let url = authorization_url("https://Mastodon.Social/", "abc", "xyz").unwrap();
        assert_eq!(url.host_str(), Some("mastodon.social"));
        assert_eq!(url.path(), "/oauth/authorize");

        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(params.contains(&("client_id".to_string(), "abc".to_string())));
        assert!(params.contains(&("code_challenge".to_string(), "xyz".to_string())));
        assert!(params.contains(&("code_challenge_method".to_string(), "S256".to_string())));
        assert!(params.contains(&("redirect_uri".to_string(), REDIRECT_URI.to_string())));
        assert!(params.contains(&("scope".to_string(), SCOPES.to_string())));
    }

    #[tokio::test]
    async fn test_exchange_requires_code() {
        let client = OAuthClient::new("mastodon.social");
        let pending = PendingAuth {
            instance: "mastodon.social".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            code_verifier: generate_code_verifier(),
        };
        let result = client.exchange_code(&pending, "   ").await;
        assert!(matches!(result, Err(MastodonError::OAuth(_))));
    }
}
