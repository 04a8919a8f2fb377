//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use vidvault_core::Config;

/// Validate critical configuration values
///
/// Field-level checks live in `Config::validate`; this adds the checks that
/// depend on the runtime environment.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production - this is a security risk. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    if config.db_max_connections() == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.jwt_expiry_hours() <= 0 {
        return Err(anyhow::anyhow!("JWT_EXPIRY_HOURS must be greater than 0"));
    }

    if config.tmdb().api_key.is_none() {
        tracing::warn!("TMDB_API_KEY not set - movies keep filename titles and episode uploads will fail");
    }

    Ok(())
}
