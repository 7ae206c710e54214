//! API credentials and their `authenticate` header rendering.

use std::fmt;

use softlayer_core::Value;

/// Credentials sent in the `authenticate` header of every call.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// Username and API key.
    ApiKey { username: String, api_key: String },
    /// Session token obtained from a password login.
    Token { user_id: i64, auth_token: String },
}

impl Auth {
    pub fn api_key<U: Into<String>, K: Into<String>>(username: U, api_key: K) -> Self {
        Auth::ApiKey {
            username: username.into(),
            api_key: api_key.into(),
        }
    }

    pub fn token<T: Into<String>>(user_id: i64, auth_token: T) -> Self {
        Auth::Token {
            user_id,
            auth_token: auth_token.into(),
        }
    }

    /// Render the body of the `authenticate` header.
    ///
    /// Usernames and API keys are sent trimmed of surrounding whitespace.
    pub fn render(&self) -> Value {
        match self {
            Auth::ApiKey { username, api_key } => [
                ("username", Value::from(username.trim())),
                ("apiKey", Value::from(api_key.trim())),
            ]
            .into_iter()
            .collect(),
            Auth::Token {
                user_id,
                auth_token,
            } => [
                ("userId", Value::Int(*user_id)),
                ("authToken", Value::from(auth_token.as_str())),
            ]
            .into_iter()
            .collect(),
        }
    }

    /// Whether every field holds a non-blank value.
    pub(crate) fn is_complete(&self) -> bool {
        match self {
            Auth::ApiKey { username, api_key } => {
                !username.trim().is_empty() && !api_key.trim().is_empty()
            }
            Auth::Token { auth_token, .. } => !auth_token.trim().is_empty(),
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::ApiKey { username, .. } => f
                .debug_struct("ApiKey")
                .field("username", username)
                .field("api_key", &"<redacted>")
                .finish(),
            Auth::Token { user_id, .. } => f
                .debug_struct("Token")
                .field("user_id", user_id)
                .field("auth_token", &"<redacted>")
                .finish(),
        }
    }
}
