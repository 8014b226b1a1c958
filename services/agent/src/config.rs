//! Environment configuration for the interview agent.
//!
//! The workflow and assistant ids are optional at load time: their
//! absence is a guard condition checked when a call is requested, not
//! a startup failure. The gateway web token and endpoint are read by
//! the client accessor (`crate::client::shared`), not here.

use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Workflow id for generate-mode sessions.
    pub workflow_id: Option<String>,
    /// Preconfigured assistant id for generate-mode sessions.
    pub assistant_id: Option<String>,
    /// Endpoint of the feedback-creation collaborator.
    pub feedback_url: String,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let workflow_id = std::env::var("INTERVIEW_WORKFLOW_ID").ok();
        let assistant_id = std::env::var("INTERVIEW_ASSISTANT_ID").ok();

        let feedback_url = std::env::var("FEEDBACK_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000/api/feedback".to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            workflow_id,
            assistant_id,
            feedback_url,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("INTERVIEW_WORKFLOW_ID");
            env::remove_var("INTERVIEW_ASSISTANT_ID");
            env::remove_var("FEEDBACK_API_URL");
            env::remove_var("RUST_LOG");
        }
    }

    #[test]
    fn test_config_error_display() {
        let missing_var = ConfigError::MissingVar("TEST_VAR".to_string());
        assert_eq!(
            format!("{}", missing_var),
            "Missing environment variable: TEST_VAR"
        );

        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    #[serial]
    fn test_config_defaults_without_ids() {
        clear_env_vars();

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.workflow_id, None);
        assert_eq!(config.assistant_id, None);
        assert_eq!(config.feedback_url, "http://localhost:3000/api/feedback");
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    #[serial]
    fn test_config_custom_values() {
        clear_env_vars();
        unsafe {
            env::set_var("INTERVIEW_WORKFLOW_ID", "wf_123");
            env::set_var("INTERVIEW_ASSISTANT_ID", "asst_456");
            env::set_var("FEEDBACK_API_URL", "https://prep.example.com/api/feedback");
            env::set_var("RUST_LOG", "debug");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.workflow_id.as_deref(), Some("wf_123"));
        assert_eq!(config.assistant_id.as_deref(), Some("asst_456"));
        assert_eq!(config.feedback_url, "https://prep.example.com/api/feedback");
        assert_eq!(config.log_level, Level::DEBUG);

        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_config_invalid_log_level() {
        clear_env_vars();
        unsafe {
            env::set_var("RUST_LOG", "not-a-level");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "RUST_LOG"),
            _ => panic!("Expected InvalidValue for RUST_LOG"),
        }

        clear_env_vars();
    }
}
