mod api_key;
mod none;
mod traits;
mod types;

pub use api_key::*;
pub use none::*;
pub use traits::*;
pub use types::*;

use crate::config::{AuthConfig, AuthMethod};

/// Factory function to create authenticator from config
pub fn create_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    match config.method {
        AuthMethod::None => Ok(Box::new(NoneAuthenticator::new())),
        AuthMethod::ApiKey => {
            let mut keys: Vec<(String, String)> = config
                .users
                .iter()
                .filter(|u| !u.api_key.trim().is_empty())
                .map(|u| (u.user_id.clone(), u.api_key.clone()))
                .collect();

            if let Some(shared) = config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
                keys.push((SHARED_KEY_USER.to_string(), shared.to_string()));
            }

            if keys.is_empty() {
                return Err(AuthError::ConfigurationError(
                    "api_key or users must be set when using ApiKey auth method".to_string(),
                ));
            }
            Ok(Box::new(ApiKeyAuthenticator::new(keys)))
        }
    }
}
