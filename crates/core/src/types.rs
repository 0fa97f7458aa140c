use crate::error::{CallbackError, CallbackResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use url::Url;

/// Message value the backend returns when the exchange linked an external
/// identity to an account that was already logged in.
pub const BIND_SENTINEL: &str = "bind";

pub const AFF_KEY: &str = "aff";
pub const USER_KEY: &str = "user";

/// Query parameters the identity provider appends to the redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationResponse {
    pub code: String,
    pub state: String,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl AuthorizationResponse {
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut response = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "code" => response.code = value.into_owned(),
                "state" => response.state = value.into_owned(),
                "error" if !value.is_empty() => response.error = Some(value.into_owned()),
                "error_description" => response.error_description = Some(value.into_owned()),
                _ => {}
            }
        }
        response
    }

    /// Accepts either a full redirect URL or a bare query string.
    pub fn from_redirect(input: &str) -> CallbackResult<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(CallbackError::InvalidRedirect("empty input".to_string()));
        }

        let query = match Url::parse(input) {
            Ok(url) => url.query().map(str::to_string).ok_or_else(|| {
                CallbackError::InvalidRedirect(format!("{} has no query string", url.path()))
            })?,
            Err(_) if input.starts_with('?') || input.contains('=') => input.to_string(),
            Err(e) => return Err(CallbackError::InvalidRedirect(e.to_string())),
        };

        let response = Self::from_query(&query);
        if response.error.is_none() && response.code.is_empty() {
            return Err(CallbackError::InvalidRedirect(
                "missing both code and error".to_string(),
            ));
        }
        Ok(response)
    }
}

/// Envelope returned by `GET /api/oauth/<provider>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

impl ExchangeResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: Value::Null,
        }
    }

    pub fn is_bind(&self) -> bool {
        self.message == BIND_SENTINEL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Settings,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Settings => "/setting",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    Login(Value),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_code_and_state_from_full_redirect() {
        let response =
            AuthorizationResponse::from_redirect("http://localhost:3000/oauth/github?code=abc&state=xyz")
                .expect("valid redirect");
        assert_eq!(response.code, "abc");
        assert_eq!(response.state, "xyz");
        assert!(response.error.is_none());
    }

    #[test]
    fn decodes_provider_error_description() {
        let response =
            AuthorizationResponse::from_query("?error=access_denied&error_description=User%20cancelled");
        assert_eq!(response.error.as_deref(), Some("access_denied"));
        assert_eq!(response.error_description.as_deref(), Some("User cancelled"));
    }

    #[test]
    fn rejects_redirect_without_code_or_error() {
        assert!(AuthorizationResponse::from_redirect("http://localhost/oauth/github?state=1").is_err());
        assert!(AuthorizationResponse::from_redirect("http://localhost/oauth/github").is_err());
        assert!(AuthorizationResponse::from_redirect("   ").is_err());
    }

    #[test]
    fn exchange_response_tolerates_missing_fields() {
        let response: ExchangeResponse =
            serde_json::from_value(json!({ "success": false })).expect("decode");
        assert_eq!(response, ExchangeResponse::failure(""));

        let bind: ExchangeResponse =
            serde_json::from_value(json!({ "success": true, "message": "bind" })).expect("decode");
        assert!(bind.is_bind());
    }
}
