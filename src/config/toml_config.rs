use crate::domain::model::{FramingTiming, DEFAULT_BAUD_RATE, DEFAULT_MIN_CONFIDENCE};
use crate::domain::ports::LinkSettings;
use crate::utils::error::{LinkError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_port_name, validate_positive_number, validate_range,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub serial: SerialConfig,
    pub framing: Option<FramingConfig>,
    pub detection: Option<DetectionConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    pub port: Option<String>,
    pub baud_rate: Option<u32>,
    pub read_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramingConfig {
    pub settle_delay_ms: Option<u64>,
    pub reset_delay_ms: Option<u64>,
    pub inter_byte_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub min_confidence: Option<f32>,
    /// Detector output file read when no input is given on the command line.
    pub input: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LinkError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| LinkError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PLATE_LINK_PORT})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(port) = &self.serial.port {
            if env_var_pattern().is_match(port) {
                return Err(LinkError::InvalidConfigValueError {
                    field: "serial.port".to_string(),
                    value: port.clone(),
                    reason: "Environment variable is not set".to_string(),
                });
            }
            validate_port_name("serial.port", port)?;
        }

        validate_positive_number("serial.baud_rate", self.baud_rate() as u64, 1)?;
        validate_positive_number(
            "serial.read_timeout_ms",
            self.timing().read_timeout.as_millis() as u64,
            1,
        )?;
        validate_range("detection.min_confidence", self.min_confidence(), 0.0, 1.0)?;

        if let Some(input) = self.detection.as_ref().and_then(|d| d.input.as_deref()) {
            validate_non_empty_string("detection.input", input)?;
        }

        if let Some(level) = self.log_level() {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level) {
                return Err(LinkError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }

    pub fn detection_input(&self) -> Option<&str> {
        self.detection.as_ref().and_then(|d| d.input.as_deref())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl LinkSettings for TomlConfig {
    fn port(&self) -> Option<&str> {
        self.serial.port.as_deref()
    }

    fn baud_rate(&self) -> u32 {
        self.serial.baud_rate.unwrap_or(DEFAULT_BAUD_RATE)
    }

    fn timing(&self) -> FramingTiming {
        let defaults = FramingTiming::default();
        let framing = self.framing.as_ref();
        let ms = |value: Option<u64>, fallback: Duration| {
            value.map(Duration::from_millis).unwrap_or(fallback)
        };

        FramingTiming {
            read_timeout: ms(self.serial.read_timeout_ms, defaults.read_timeout),
            settle_delay: ms(framing.and_then(|f| f.settle_delay_ms), defaults.settle_delay),
            reset_delay: ms(framing.and_then(|f| f.reset_delay_ms), defaults.reset_delay),
            inter_byte_delay: ms(
                framing.and_then(|f| f.inter_byte_delay_ms),
                defaults.inter_byte_delay,
            ),
        }
    }

    fn min_confidence(&self) -> f32 {
        self.detection
            .as_ref()
            .and_then(|d| d.min_confidence)
            .unwrap_or(DEFAULT_MIN_CONFIDENCE)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[serial]
port = "COM5"
baud_rate = 115200
read_timeout_ms = 500

[framing]
settle_delay_ms = 20
reset_delay_ms = 40
inter_byte_delay_ms = 5

[detection]
min_confidence = 0.6
input = "detections.json"

[logging]
level = "debug"
json = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.port(), Some("COM5"));
        assert_eq!(config.baud_rate(), 115200);
        assert_eq!(config.timing().reset_delay, Duration::from_millis(40));
        assert_eq!(config.timing().read_timeout, Duration::from_millis(500));
        assert_eq!(config.min_confidence(), 0.6);
        assert_eq!(config.detection_input(), Some("detections.json"));
        assert!(config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("[serial]\n").unwrap();

        assert!(config.port().is_none());
        assert_eq!(config.baud_rate(), 9600);
        assert_eq!(config.timing(), FramingTiming::default());
        assert_eq!(config.min_confidence(), 0.4);
        assert!(!config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PLATE_LINK_TEST_PORT", "/dev/ttyUSB3");

        let config = TomlConfig::from_toml_str(
            r#"
[serial]
port = "${PLATE_LINK_TEST_PORT}"
"#,
        )
        .unwrap();
        assert_eq!(config.port(), Some("/dev/ttyUSB3"));

        std::env::remove_var("PLATE_LINK_TEST_PORT");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
[serial]
port = "${PLATE_LINK_TEST_UNSET_PORT}"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        let bad_confidence = TomlConfig::from_toml_str(
            r#"
[serial]
port = "COM5"

[detection]
min_confidence = 2.0
"#,
        )
        .unwrap();
        assert!(bad_confidence.validate().is_err());

        let bad_level = TomlConfig::from_toml_str(
            r#"
[serial]

[logging]
level = "loud"
"#,
        )
        .unwrap();
        assert!(bad_level.validate().is_err());
    }

    #[test]
    fn test_missing_serial_table_is_parse_error() {
        let err = TomlConfig::from_toml_str("[detection]\nmin_confidence = 0.5\n").unwrap_err();
        assert!(matches!(err, LinkError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[serial]\nport = \"/dev/ttyACM0\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.port(), Some("/dev/ttyACM0"));
    }
}
