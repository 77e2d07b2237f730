use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the traffic inspector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Live capture configuration
    pub capture: CaptureConfig,
}

/// Live capture configuration
///
/// The command line never selects the interface or promiscuity; those
/// live here so the detection surface stays fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Interface to capture on
    pub interface: String,
    /// Capture in promiscuous mode
    pub promiscuous: bool,
    /// Snapshot length in bytes
    pub snaplen: i32,
    /// Read timeout in milliseconds; bounds how long a stop request
    /// can go unnoticed on a quiet interface
    pub timeout_ms: i32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            capture: CaptureConfig {
                interface: "eth0".to_string(),
                promiscuous: true,
                snaplen: 65535,
                timeout_ms: 1000,
            },
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.capture.interface, "eth0");
        assert!(config.capture.promiscuous);
        assert_eq!(config.capture.snaplen, 65535);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.capture.interface, config.capture.interface);
        assert_eq!(parsed.capture.timeout_ms, config.capture.timeout_ms);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netalarm.toml");

        let mut config = Config::default();
        config.capture.interface = "lo".to_string();
        config.to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.capture.interface, "lo");
    }

    #[test]
    fn test_parse_custom_interface() {
        let parsed: Config = toml::from_str(
            "[capture]\ninterface = \"wlan0\"\npromiscuous = false\nsnaplen = 1500\ntimeout_ms = 250\n",
        )
        .unwrap();
        assert_eq!(parsed.capture.interface, "wlan0");
        assert!(!parsed.capture.promiscuous);
    }
}
