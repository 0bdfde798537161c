//! Authentication for the REST API client

use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION};

/// Authentication methods supported by the Node-RED admin API
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthMethod {
    /// Bearer token (`Authorization: Bearer <token>`)
    Bearer(String),
    /// No authentication
    #[default]
    None,
}

impl AuthMethod {
    /// Bearer auth for a non-empty token, no auth otherwise
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some(token) if !token.is_empty() => Self::bearer(token),
            _ => Self::None,
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Bearer(token) => Some(token),
            Self::None => None,
        }
    }

    /// Apply authentication headers to a request
    pub fn apply_to_headers(&self, headers: &mut HeaderMap) -> Result<(), InvalidHeaderValue> {
        if let AuthMethod::Bearer(token) = self {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(())
    }

    pub fn headers(&self) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        self.apply_to_headers(&mut headers)?;
        Ok(headers)
    }
}
