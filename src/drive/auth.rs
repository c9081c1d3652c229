//! Installed-application OAuth flow for the Drive API.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

use super::DriveError;
use crate::utils::prompt;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const OOB_REDIRECT: &str = "urn:ietf:wg:oauth:2.0:oob";
// Refresh a little before the token actually runs out.
const EXPIRY_MARGIN_MS: i64 = 60_000;

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub installed: InstalledApp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstalledApp {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Token document, stored in the same shape other Google client libraries use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Milliseconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
}

impl Token {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        match self.expiry_date {
            Some(expiry) => expiry <= now_ms + EXPIRY_MARGIN_MS,
            None => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    scope: Option<String>,
    token_type: Option<String>,
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_token(self, previous_refresh: Option<String>) -> Token {
        Token {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            scope: self.scope,
            token_type: self.token_type,
            expiry_date: self
                .expires_in
                .map(|secs| Utc::now().timestamp_millis() + secs * 1000),
        }
    }
}

pub fn load_credentials(path: &Path) -> Result<Credentials, DriveError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(DriveError::Auth(format!(
                "credentials file {} not found",
                path.display()
            )))
        }
        Err(err) => return Err(err.into()),
    };
    Ok(serde_json::from_str(&text)?)
}

pub struct OAuth2 {
    http: reqwest::Client,
    app: InstalledApp,
}

impl OAuth2 {
    pub fn new(credentials: Credentials) -> Result<Self, DriveError> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            app: credentials.installed,
        })
    }

    fn redirect_uri(&self) -> &str {
        self.app
            .redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or(OOB_REDIRECT)
    }

    pub fn auth_url(&self, scopes: &[String]) -> Result<String, DriveError> {
        let url = reqwest::Url::parse_with_params(
            &self.app.auth_uri,
            &[
                ("access_type", "offline"),
                ("response_type", "code"),
                ("client_id", self.app.client_id.as_str()),
                ("redirect_uri", self.redirect_uri()),
                ("scope", scopes.join(" ").as_str()),
            ],
        )
        .map_err(|e| DriveError::Auth(format!("invalid auth uri: {}", e)))?;
        Ok(url.into())
    }

    pub async fn exchange_code(&self, code: &str) -> Result<Token, DriveError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.app.client_id.as_str()),
            ("client_secret", self.app.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri()),
        ];
        Ok(self.request_token(&form).await?.into_token(None))
    }

    pub async fn refresh(&self, token: &Token) -> Result<Token, DriveError> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| DriveError::Auth("token has no refresh token".to_string()))?;
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.app.client_id.as_str()),
            ("client_secret", self.app.client_secret.as_str()),
        ];
        Ok(self
            .request_token(&form)
            .await?
            .into_token(token.refresh_token.clone()))
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, DriveError> {
        let response = self.http.post(&self.app.token_uri).form(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DriveError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    /// Produce a usable token: the stored one, a refreshed one, or a new one obtained by
    /// asking the operator to visit the consent page.
    pub async fn authorize(
        &self,
        scopes: &[String],
        stored_path: &Path,
        save_path: &Path,
    ) -> Result<Token, DriveError> {
        if let Some(token) = read_token(stored_path) {
            if !token.is_expired(Utc::now().timestamp_millis()) {
                return Ok(token);
            }
            if token.refresh_token.is_some() {
                debug!("Refreshing expired access token");
                match self.refresh(&token).await {
                    Ok(fresh) => {
                        save_token(save_path, &fresh)?;
                        return Ok(fresh);
                    }
                    Err(err) => warn!("Cannot refresh token: {}", err),
                }
            }
        }

        let url = self.auth_url(scopes)?;
        println!("Authorize this app by visiting this url: {}", url);
        let code = prompt::prompt_line("Enter the code from that page here: ")?;
        let token = self.exchange_code(code.trim()).await?;
        save_token(save_path, &token)?;
        info!("Token stored to {}", save_path.display());
        Ok(token)
    }
}

fn read_token(path: &Path) -> Option<Token> {
    let text = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(token) => Some(token),
        Err(err) => {
            warn!("Ignoring unreadable token {}: {}", path.display(), err);
            None
        }
    }
}

fn save_token(path: &Path, token: &Token) -> Result<(), DriveError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, serde_json::to_string(token)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        serde_json::from_str(
            r#"{"installed": {
                "client_id": "cid",
                "client_secret": "secret",
                "redirect_uris": ["http://localhost"]
            }}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_credentials_defaults() {
        let creds = credentials();
        assert_eq!(creds.installed.auth_uri, DEFAULT_AUTH_URI);
        assert_eq!(creds.installed.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn test_auth_url_carries_client_and_scopes() {
        let auth = OAuth2::new(credentials()).unwrap();
        let url = auth
            .auth_url(&["scope-a".to_string(), "scope-b".to_string()])
            .unwrap();
        assert!(url.starts_with(DEFAULT_AUTH_URI));
        assert!(url.contains("client_id=cid"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("scope=scope-a+scope-b"));
    }

    #[test]
    fn test_token_expiry() {
        let mut token = Token {
            access_token: "a".to_string(),
            refresh_token: None,
            scope: None,
            token_type: None,
            expiry_date: None,
        };
        assert!(!token.is_expired(1_000));
        token.expiry_date = Some(100_000);
        assert!(token.is_expired(50_000));
        assert!(!token.is_expired(10_000));
    }

    #[test]
    fn test_token_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("token.json");
        let token = Token {
            access_token: "a".to_string(),
            refresh_token: Some("r".to_string()),
            scope: None,
            token_type: Some("Bearer".to_string()),
            expiry_date: Some(42),
        };
        save_token(&path, &token).unwrap();
        assert_eq!(read_token(&path), Some(token));
    }

    #[test]
    fn test_missing_credentials_is_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_credentials(&dir.path().join("credentials.json")).unwrap_err();
        assert!(matches!(err, DriveError::Auth(_)));
    }
}
