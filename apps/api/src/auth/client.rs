/// Auth client — the single point of entry for all calls to the external
/// auth service.
///
/// ARCHITECTURAL RULE: no other module may talk to the auth service directly.
/// Handlers exchange credentials and look up identities only through this
/// client, so the wire format stays in one place.
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const AUTH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Auth service error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Identity record as the auth service reports it. Metadata blobs are kept
/// as raw JSON; role extraction happens in `role::metadata_role`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
    #[serde(default)]
    pub app_metadata: Value,
}

/// Successful credential exchange: an access token plus the identity it
/// belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: AuthUser,
}

#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AuthClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(AUTH_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Exchanges email/password credentials for an access token.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let response = self
            .client
            .post(format!("{}/token?grant_type=password", self.base_url))
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let response = check(response).await?;
        let session: AuthSession = response.json().await?;
        debug!("Sign-in succeeded for user {}", session.user.id);
        Ok(session)
    }

    /// Registers a new identity. The auth service sends its own confirmation
    /// email; no session is established here.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(format!("{}/signup", self.base_url))
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Revokes the access token on the auth service.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(format!("{}/logout", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Triggers a password-recovery email for the address.
    pub async fn recover(&self, email: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(format!("{}/recover", self.base_url))
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Looks up the identity behind an access token. A rejected or expired
    /// token surfaces as an `Api` error with a 4xx status.
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .client
            .get(format!("{}/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = check(response).await?;
        Ok(response.json().await?)
    }

    /// Sets a new password for the identity behind the token. Used by the
    /// recovery flow after the emailed link established a session.
    pub async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let response = self
            .client
            .put(format!("{}/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "password": new_password }))
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }
}

/// Maps a non-2xx response to an `Api` error with the most useful message
/// the body offers.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = parse_error_message(&body).unwrap_or_else(|| body.clone());
    Err(AuthError::Api {
        status: status.as_u16(),
        message,
    })
}

/// The auth service reports errors in several shapes depending on the
/// endpoint. Checked in order of specificity.
fn parse_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    for key in ["error_description", "msg", "message", "error"] {
        if let Some(message) = value.get(key).and_then(Value::as_str) {
            return Some(message.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_description_shape() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(
            parse_error_message(body),
            Some("Invalid login credentials".to_string())
        );
    }

    #[test]
    fn test_parse_msg_shape() {
        let body = r#"{"code":422,"msg":"Password should be at least 6 characters"}"#;
        assert_eq!(
            parse_error_message(body),
            Some("Password should be at least 6 characters".to_string())
        );
    }

    #[test]
    fn test_parse_bare_error_shape() {
        let body = r#"{"error":"invalid_token"}"#;
        assert_eq!(parse_error_message(body), Some("invalid_token".to_string()));
    }

    #[test]
    fn test_unparseable_body_yields_none() {
        assert_eq!(parse_error_message("<html>502</html>"), None);
        assert_eq!(parse_error_message(""), None);
    }
}
