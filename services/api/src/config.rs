use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;
use voicebot_core::{
    BrightnessPolicy, DispatchPolicy,
    dispatcher::DEFAULT_MOVE_STEP,
    gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiConfig},
};

/// Value shipped in sample configs that must be replaced before running.
const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY";
const DEFAULT_INTERPRET_TIMEOUT_SECS: u64 = 30;

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
    pub bind_address: SocketAddr,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub log_level: Level,
    /// `None` disables the interpretation timeout.
    pub interpret_timeout: Option<Duration>,
    pub move_step: f32,
    pub brightness_policy: BrightnessPolicy,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ConfigError::MissingVar("GEMINI_API_KEY".to_string()))?;
        if gemini_api_key.trim().is_empty() || gemini_api_key == API_KEY_PLACEHOLDER {
            return Err(ConfigError::InvalidValue(
                "GEMINI_API_KEY".to_string(),
                "replace the placeholder with a real Gemini API key".to_string(),
            ));
        }

        let gemini_model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let gemini_base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let interpret_timeout = match std::env::var("INTERPRET_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| {
                    ConfigError::InvalidValue(
                        "INTERPRET_TIMEOUT_SECS".to_string(),
                        format!("'{}' is not a whole number of seconds", raw),
                    )
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            Err(_) => Some(Duration::from_secs(DEFAULT_INTERPRET_TIMEOUT_SECS)),
        };

        let move_step = match std::env::var("MOVE_STEP") {
            Ok(raw) => match raw.parse::<f32>() {
                Ok(step) if step.is_finite() && step > 0.0 => step,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "MOVE_STEP".to_string(),
                        format!("'{}' is not a positive number", raw),
                    ));
                }
            },
            Err(_) => DEFAULT_MOVE_STEP,
        };

        let brightness_policy =
            match std::env::var("BRIGHTNESS_POLICY").map(|s| s.to_lowercase()) {
                Ok(policy) if policy == "scale" => BrightnessPolicy::Scale,
                Ok(policy) if policy == "ignore" => BrightnessPolicy::Ignore,
                Ok(other) => {
                    return Err(ConfigError::InvalidValue(
                        "BRIGHTNESS_POLICY".to_string(),
                        format!("'{}' is not one of 'ignore' or 'scale'", other),
                    ));
                }
                Err(_) => BrightnessPolicy::Ignore,
            };

        Ok(Self {
            bind_address,
            gemini_api_key,
            gemini_model,
            gemini_base_url,
            log_level,
            interpret_timeout,
            move_step,
            brightness_policy,
        })
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.gemini_api_key.clone(),
            model: self.gemini_model.clone(),
            base_url: self.gemini_base_url.clone(),
        }
    }

    pub fn dispatch_policy(&self) -> DispatchPolicy {
        DispatchPolicy {
            move_step: self.move_step,
            brightness: self.brightness_policy,
            ..DispatchPolicy::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("BIND_ADDRESS");
            env::remove_var("GEMINI_API_KEY");
            env::remove_var("GEMINI_MODEL");
            env::remove_var("GEMINI_BASE_URL");
            env::remove_var("RUST_LOG");
            env::remove_var("INTERPRET_TIMEOUT_SECS");
            env::remove_var("MOVE_STEP");
            env::remove_var("BRIGHTNESS_POLICY");
        }
    }

    fn set_minimal_env() {
        unsafe {
            env::set_var("GEMINI_API_KEY", "test-gemini-key");
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
    fn test_config_from_env_minimal() {
        clear_env_vars();
        set_minimal_env();

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "0.0.0.0:3000");
        assert_eq!(config.gemini_api_key, "test-gemini-key");
        assert_eq!(config.gemini_model, DEFAULT_MODEL);
        assert_eq!(config.gemini_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.interpret_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.move_step, DEFAULT_MOVE_STEP);
        assert_eq!(config.brightness_policy, BrightnessPolicy::Ignore);
        assert_eq!(config.dispatch_policy(), DispatchPolicy::default());
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom_values() {
        clear_env_vars();
        unsafe {
            env::set_var("BIND_ADDRESS", "127.0.0.1:8080");
            env::set_var("GEMINI_API_KEY", "custom-key");
            env::set_var("GEMINI_MODEL", "gemini-1.5-pro");
            env::set_var("GEMINI_BASE_URL", "http://localhost:9000/v1beta");
            env::set_var("RUST_LOG", "debug");
            env::set_var("INTERPRET_TIMEOUT_SECS", "0");
            env::set_var("MOVE_STEP", "1.25");
            env::set_var("BRIGHTNESS_POLICY", "Scale");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.interpret_timeout, None);
        assert_eq!(config.brightness_policy, BrightnessPolicy::Scale);

        let gemini = config.gemini_config();
        assert_eq!(gemini.api_key, "custom-key");
        assert_eq!(gemini.model, "gemini-1.5-pro");
        assert_eq!(gemini.base_url, "http://localhost:9000/v1beta");

        let policy = config.dispatch_policy();
        assert_eq!(policy.move_step, 1.25);
        assert_eq!(policy.brightness, BrightnessPolicy::Scale);
    }

    #[test]
    #[serial]
    fn test_config_missing_api_key() {
        clear_env_vars();

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(var) => assert_eq!(var, "GEMINI_API_KEY"),
            _ => panic!("Expected MissingVar for GEMINI_API_KEY"),
        }
    }

    #[test]
    #[serial]
    fn test_config_rejects_placeholder_key() {
        clear_env_vars();
        unsafe {
            env::set_var("GEMINI_API_KEY", "YOUR_API_KEY");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "GEMINI_API_KEY"),
            _ => panic!("Expected InvalidValue for GEMINI_API_KEY"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_values() {
        let cases = [
            ("BIND_ADDRESS", "not-a-valid-address"),
            ("RUST_LOG", "not-a-level"),
            ("INTERPRET_TIMEOUT_SECS", "soon"),
            ("MOVE_STEP", "-1"),
            ("BRIGHTNESS_POLICY", "dazzle"),
        ];

        for (var, value) in cases {
            clear_env_vars();
            set_minimal_env();
            unsafe {
                env::set_var(var, value);
            }

            match Config::from_env().unwrap_err() {
                ConfigError::InvalidValue(name, _) => assert_eq!(name, var),
                other => panic!("Expected InvalidValue for {}, got {:?}", var, other),
            }
        }
    }
}
