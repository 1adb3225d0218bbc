use super::{
    types::{AuthMethod, Config},
    ConfigError,
};

/// Largest accepted poll backoff multiplier.
const MAX_BACKOFF_MULTIPLIER: f64 = 10.0;

/// Validate configuration
/// Currently validates:
/// - Auth section exists (enforced by serde)
/// - API key auth has at least one key, and no key or user id is reused
/// - Server port is not 0 and the upload limit is positive
/// - Job service timeouts and backoff are usable
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    validate_auth(config)?;

    // Server validation
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }
    if config.server.max_upload_bytes == 0 {
        return Err(invalid("server.max_upload_bytes must be greater than 0"));
    }

    // Job service validation
    let js = &config.job_service;
    if js.base_url.trim().is_empty() {
        return Err(invalid("job_service.base_url cannot be empty"));
    }
    if js.request_timeout_secs == 0 {
        return Err(invalid(
            "job_service.request_timeout_secs must be greater than 0",
        ));
    }
    if js.wait_timeout_secs == 0 {
        return Err(invalid("job_service.wait_timeout_secs must be greater than 0"));
    }
    if js.max_attempts == 0 {
        return Err(invalid("job_service.max_attempts must be at least 1"));
    }
    if !(1.0..=MAX_BACKOFF_MULTIPLIER).contains(&js.poll.backoff_multiplier) {
        return Err(invalid(&format!(
            "job_service.poll.backoff_multiplier must be between 1.0 and {}",
            MAX_BACKOFF_MULTIPLIER
        )));
    }
    if js.poll.initial_delay_ms > js.poll.max_delay_ms {
        return Err(invalid(
            "job_service.poll.initial_delay_ms cannot exceed max_delay_ms",
        ));
    }

    Ok(())
}

fn validate_auth(config: &Config) -> Result<(), ConfigError> {
    let auth = &config.auth;
    if auth.method != AuthMethod::ApiKey {
        return Ok(());
    }

    let shared_key = auth.api_key.as_deref().filter(|k| !k.trim().is_empty());
    if shared_key.is_none() && auth.users.is_empty() {
        return Err(invalid(
            "auth.api_key or auth.users must be set when method = \"api_key\"",
        ));
    }

    let mut keys: Vec<&str> = shared_key.into_iter().collect();
    let mut user_ids: Vec<&str> = Vec::new();
    for user in &auth.users {
        if user.user_id.trim().is_empty() {
            return Err(invalid("auth.users entries need a user_id"));
        }
        if user.api_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "auth.users entry '{}' has an empty api_key",
                user.user_id
            )));
        }
        if keys.contains(&user.api_key.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "auth.users entry '{}' reuses an api_key",
                user.user_id
            )));
        }
        if user_ids.contains(&user.user_id.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "auth.users lists '{}' more than once",
                user.user_id
            )));
        }
        keys.push(&user.api_key);
        user_ids.push(&user.user_id);
    }

    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}
