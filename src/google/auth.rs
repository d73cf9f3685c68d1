//! Access tokens from an authorized-user token file
//!
//! The token file is the JSON written by Google's client libraries after the
//! consent flow (`client_id`, `client_secret`, `refresh_token`, and optionally
//! the last `token` with its `expiry`). Running the consent flow itself is out
//! of scope: the file has to exist.

use chrono::{DateTime, Duration, Utc};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens this close to expiry are refreshed anyway
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    /// Last access token handed out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    /// Anything else in the file, written back untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AuthorizedUser {
    /// The stored access token, if it is still good at `now`
    pub fn valid_token(&self, now: DateTime<Utc>) -> Option<&str> {
        let expiry = self.expiry?;
        if expiry - Duration::seconds(EXPIRY_MARGIN_SECS) <= now {
            return None;
        }
        self.token.as_deref()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

pub struct GoogleAuth {
    http: Client,
    token_path: PathBuf,
    user: RefCell<AuthorizedUser>,
}

impl GoogleAuth {
    pub fn from_token_file<P: AsRef<Path>>(path: P, http: Client) -> Result<Self> {
        let token_path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&token_path).map_err(|e| {
            Error::NotFound(format!(
                "Google token file {}: {}",
                token_path.display(),
                e
            ))
        })?;
        let user: AuthorizedUser = serde_json::from_str(&content)?;
        Ok(Self {
            http,
            token_path,
            user: RefCell::new(user),
        })
    }

    /// A bearer token, refreshing it through the token endpoint when needed
    pub fn access_token(&self) -> Result<String> {
        if let Some(token) = self.user.borrow().valid_token(Utc::now()) {
            return Ok(token.to_string());
        }

        let (uri, params) = {
            let user = self.user.borrow();
            let uri = user.token_uri.clone().unwrap_or_else(|| TOKEN_URI.to_string());
            let params = [
                ("client_id", user.client_id.clone()),
                ("client_secret", user.client_secret.clone()),
                ("refresh_token", user.refresh_token.clone()),
                ("grant_type", "refresh_token".to_string()),
            ];
            (uri, params)
        };

        tracing::info!("Refreshing Google access token");
        let response = self.http.post(uri).form(&params).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(Error::Api {
                service: "Google OAuth",
                status: status.as_u16(),
                body,
            });
        }

        let refreshed: TokenResponse = serde_json::from_str(&body)?;
        {
            let mut user = self.user.borrow_mut();
            user.token = Some(refreshed.access_token.clone());
            user.expiry = refreshed
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs));
        }

        if let Err(e) = self.save() {
            tracing::warn!(
                path = %self.token_path.display(),
                error = %e,
                "Could not save refreshed token"
            );
        }

        Ok(refreshed.access_token)
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&*self.user.borrow())?;
        fs::write(&self.token_path, json)?;
        Ok(())
    }
}
