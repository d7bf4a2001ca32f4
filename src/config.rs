//! Runtime configuration from the environment.
//!
//! All settings come from environment variables (optionally seeded from
//! a `.env` file). Structural problems are caught by [`Config::validate`]
//! before the monitor loop starts.

use crate::error::{Result, SentinelError};
use std::fs;
use std::path::{Path, PathBuf};

/// Load environment variables from .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
pub fn load_dotenv() {
    let env_path = Path::new(".env");
    if !env_path.exists() {
        return;
    }

    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Find the first '=' and split there
        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let mut value = line[eq_pos + 1..].trim();

            // Remove surrounding quotes if present
            if (value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\''))
            {
                value = &value[1..value.len() - 1];
            }

            // Only set if not already set (env vars take precedence)
            if std::env::var(key).is_err() {
                // SAFETY: We're single-threaded at this point (called before any async runtime)
                unsafe { std::env::set_var(key, value) };
            }
        }
    }
}

/// Parse the boolean spellings accepted in the environment.
pub fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Ok(true),
        "0" | "false" | "no" | "n" => Ok(false),
        other => Err(SentinelError::Config(format!(
            "invalid boolean value: {other:?}"
        ))),
    }
}

/// Environment keys for the per-weekday business-hours windows,
/// Monday first.
pub const BUSINESS_HOURS_KEYS: [&str; 7] = [
    "BUSINESS_HOURS_MONDAY",
    "BUSINESS_HOURS_TUESDAY",
    "BUSINESS_HOURS_WEDNESDAY",
    "BUSINESS_HOURS_THURSDAY",
    "BUSINESS_HOURS_FRIDAY",
    "BUSINESS_HOURS_SATURDAY",
    "BUSINESS_HOURS_SUNDAY",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub camera: CameraAccount,
    pub signal: SignalConfig,
    pub email: EmailConfig,
    pub schedule: ScheduleConfig,
    /// Path to the camera inventory JSON file.
    pub inventory_path: PathBuf,
    /// Locale for operator-facing message text.
    pub language: String,
}

/// Operator account shared by every camera in the fleet.
#[derive(Debug, Clone)]
pub struct CameraAccount {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SignalConfig {
    /// BCM pin carrying the "system armed" signal.
    pub armed_pin: u8,
    /// BCM pin carrying the "alarm active" signal.
    pub alarm_pin: u8,
    /// Seconds between signal polls.
    pub poll_interval_secs: u64,
    /// Pin-state file consumed by the simulated signal source.
    pub pin_state_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub enabled: bool,
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub enabled: bool,
    /// Seconds between schedule re-evaluations.
    pub refresh_interval_secs: u64,
    /// Raw `"H:MM-H:MM"` strings per weekday, Monday first.
    pub hours: [Option<String>; 7],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera: CameraAccount {
                username: String::new(),
                password: String::new(),
            },
            signal: SignalConfig {
                armed_pin: 16,
                alarm_pin: 20,
                poll_interval_secs: 1,
                pin_state_file: PathBuf::from("simulated_pins.json"),
            },
            email: EmailConfig {
                enabled: false,
                server: String::new(),
                port: 465,
                username: String::new(),
                password: String::new(),
                from: String::new(),
                to: String::new(),
            },
            schedule: ScheduleConfig {
                enabled: false,
                refresh_interval_secs: 60,
                hours: Default::default(),
            },
            inventory_path: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("cameras.json"),
            language: "en".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(username) = std::env::var("CAMERA_USERNAME") {
            config.camera.username = username;
        }
        if let Ok(password) = std::env::var("CAMERA_PASSWORD") {
            config.camera.password = password;
        }

        if let Ok(path) = std::env::var("CAMERAS_FILE") {
            config.inventory_path = PathBuf::from(path);
        }
        if let Ok(language) = std::env::var("LANGUAGE") {
            config.language = language;
        }

        // Signal polling
        if let Ok(pin) = std::env::var("SIGNAL_ARMED_PIN") {
            config.signal.armed_pin = parse_number(&pin, "SIGNAL_ARMED_PIN")?;
        }
        if let Ok(pin) = std::env::var("SIGNAL_ALARM_PIN") {
            config.signal.alarm_pin = parse_number(&pin, "SIGNAL_ALARM_PIN")?;
        }
        if let Ok(secs) = std::env::var("POLL_INTERVAL_SECS") {
            config.signal.poll_interval_secs = parse_number(&secs, "POLL_INTERVAL_SECS")?;
        }
        if let Ok(path) = std::env::var("SIMULATED_PINS_FILE") {
            config.signal.pin_state_file = PathBuf::from(path);
        }

        // Email notifications
        if let Ok(enable) = std::env::var("EMAIL_ENABLE") {
            config.email.enabled = parse_bool(&enable)?;
        }
        if let Ok(server) = std::env::var("EMAIL_SERVER") {
            config.email.server = server;
        }
        if let Ok(port) = std::env::var("EMAIL_PORT") {
            config.email.port = parse_number(&port, "EMAIL_PORT")?;
        }
        if let Ok(username) = std::env::var("EMAIL_USER") {
            config.email.username = username;
        }
        if let Ok(password) = std::env::var("EMAIL_PASSWORD") {
            config.email.password = password;
        }
        if let Ok(from) = std::env::var("FROM_ADDRESS") {
            config.email.from = from;
        }
        if let Ok(to) = std::env::var("TO_ADDRESS") {
            config.email.to = to;
        }

        // Business-hours schedule
        if let Ok(enable) = std::env::var("SCHEDULE_ENABLE") {
            config.schedule.enabled = parse_bool(&enable)?;
        }
        if let Ok(secs) = std::env::var("SCHEDULE_INTERVAL_SECS") {
            config.schedule.refresh_interval_secs = parse_number(&secs, "SCHEDULE_INTERVAL_SECS")?;
        }
        for (slot, key) in config.schedule.hours.iter_mut().zip(BUSINESS_HOURS_KEYS) {
            if let Ok(hours) = std::env::var(key) {
                *slot = Some(hours);
            }
        }

        Ok(config)
    }

    /// Reject configurations that cannot run: missing camera credentials,
    /// or notifications enabled without a complete transport setup.
    pub fn validate(&self) -> Result<()> {
        if self.camera.username.is_empty() || self.camera.password.is_empty() {
            return Err(SentinelError::Config(
                "CAMERA_USERNAME and CAMERA_PASSWORD must be set".to_string(),
            ));
        }

        if self.email.enabled {
            let missing = [
                ("EMAIL_SERVER", &self.email.server),
                ("EMAIL_USER", &self.email.username),
                ("EMAIL_PASSWORD", &self.email.password),
                ("FROM_ADDRESS", &self.email.from),
                ("TO_ADDRESS", &self.email.to),
            ]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(key, _)| key)
            .collect::<Vec<_>>();

            if !missing.is_empty() {
                return Err(SentinelError::Config(format!(
                    "EMAIL_ENABLE is set but {} missing",
                    missing.join(", ")
                )));
            }
        }

        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, key: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| SentinelError::Config(format!("invalid value for {key}: {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_spellings() {
        for value in ["1", "true", "True", "YES", "y"] {
            assert!(parse_bool(value).unwrap(), "{value} should be true");
        }
        for value in ["0", "false", "False", "NO", "n"] {
            assert!(!parse_bool(value).unwrap(), "{value} should be false");
        }
        assert!(parse_bool("maybe").is_err());
        assert!(parse_bool("").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.signal.armed_pin, 16);
        assert_eq!(config.signal.alarm_pin, 20);
        assert_eq!(config.signal.poll_interval_secs, 1);
        assert_eq!(config.schedule.refresh_interval_secs, 60);
        assert!(!config.email.enabled);
        assert!(!config.schedule.enabled);
    }

    #[test]
    fn test_validate_requires_camera_account() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.camera.username = "admin".to_string();
        config.camera.password = "secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_email_transport_complete() {
        let mut config = Config::default();
        config.camera.username = "admin".to_string();
        config.camera.password = "secret".to_string();
        config.email.enabled = true;
        config.email.server = "smtp.example.com".to_string();
        assert!(config.validate().is_err());

        config.email.username = "mailer".to_string();
        config.email.password = "hunter2".to_string();
        config.email.from = "sentinel@example.com".to_string();
        config.email.to = "operator@example.com".to_string();
        assert!(config.validate().is_ok());
    }
}
