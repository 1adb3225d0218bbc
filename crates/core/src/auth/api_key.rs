//! API Key authentication.

use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// User id for the single shared `auth.api_key`.
pub const SHARED_KEY_USER: &str = "default";

/// Authenticator that maps configured API keys to user ids.
///
/// Accepts the key in either:
/// - `Authorization: Bearer <key>` header
/// - `X-API-Key: <key>` header
pub struct ApiKeyAuthenticator {
    keys: Vec<(String, String)>,
}

impl ApiKeyAuthenticator {
    /// Build from `(user_id, api_key)` pairs.
    pub fn new(keys: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// A single key authenticating as [`SHARED_KEY_USER`].
    pub fn single(api_key: impl Into<String>) -> Self {
        Self::new([(SHARED_KEY_USER.to_string(), api_key.into())])
    }

    pub fn user_count(&self) -> usize {
        self.keys.len()
    }

    fn extract_key<'a>(&self, request: &'a AuthRequest) -> Option<&'a str> {
        if let Some(auth_header) = request.header("authorization") {
            if let Some((scheme, key)) = auth_header.split_once(' ') {
                if scheme.eq_ignore_ascii_case("bearer") {
                    return Some(key.trim());
                }
            }
        }

        request.header("x-api-key").map(str::trim)
    }
}

#[async_trait]
impl Authenticator for ApiKeyAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let provided = self
            .extract_key(request)
            .filter(|k| !k.is_empty())
            .ok_or(AuthError::NotAuthenticated)?;

        // Compare against every key so timing does not reveal which one matched.
        let mut matched: Option<&str> = None;
        for (user_id, key) in &self.keys {
            if constant_time_eq(provided.as_bytes(), key.as_bytes()) && matched.is_none() {
                matched = Some(user_id.as_str());
            }
        }

        match matched {
            Some(user_id) => Ok(Identity::for_user(user_id, "api_key")),
            None => Err(AuthError::InvalidCredentials("Invalid API key".to_string())),
        }
    }

    fn method_name(&self) -> &'static str {
        "api_key"
    }
}

/// Constant-time byte comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
