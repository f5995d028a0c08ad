use std::env;

/// Read a required environment variable.
///
/// An unset or empty value is a startup error; the server must not come up
/// without credentials for its upstream services.
pub fn require_var(name: &str) -> Result<String, Box<dyn std::error::Error>> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(format!("{name} environment variable is required").into()),
    }
}

/// Validate the synthesis retry policy.
///
/// The retry driver makes `max_retries` attempts total, so zero would mean
/// the synthesis client never calls its upstream at all.
pub fn validate_retry_policy(max_retries: u32) -> Result<(), Box<dyn std::error::Error>> {
    if max_retries == 0 {
        return Err("MAX_RETRIES must be at least 1".into());
    }
    Ok(())
}

/// Validate the completion sampling temperature.
pub fn validate_temperature(temperature: f32) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=2.0).contains(&temperature) {
        return Err(format!("TEMPERATURE must be between 0.0 and 2.0, got {temperature}").into());
    }
    Ok(())
}
