use crate::detector::FirePolicy;
use crate::error::{ConfigError, HostsentryError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Global configuration loaded from ~/.hostsentry/config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostsentryConfig {
    /// Directories watched recursively for filesystem events
    pub watch_paths: Vec<PathBuf>,

    /// Glob patterns excluded from processing. `*` crosses path separators,
    /// so `*/logs/*` suppresses anything under a logs directory.
    pub ignore_patterns: Vec<String>,

    /// Durable event log destination; parent directory is created on demand
    pub log_file: String,

    /// Default alert channels: stdout, desktop, null
    pub default_alerts: Vec<String>,

    #[serde(default)]
    pub detector: DetectorConfig,

    #[serde(default)]
    pub poller: PollerConfig,
}

/// Sliding-window detector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Events inside the window needed to raise an anomaly
    pub threshold: u64,

    /// Trailing window length in seconds
    pub window_secs: u64,

    /// "every-call" re-fires while the rate stays above threshold (the
    /// historical behavior); "once" fires a single time per crossing.
    pub fire_policy: FirePolicy,
}

/// Network/process poller settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for HostsentryConfig {
    fn default() -> Self {
        Self {
            watch_paths: Vec::new(),
            ignore_patterns: default_ignore_patterns(),
            log_file: "logs/file_log.txt".to_string(),
            default_alerts: vec!["stdout".to_string()],
            detector: DetectorConfig::default(),
            poller: PollerConfig::default(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: 10,
            window_secs: 60,
            fire_policy: FirePolicy::EveryCall,
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 5,
        }
    }
}

pub fn default_ignore_patterns() -> Vec<String> {
    vec![
        "*.tmp".to_string(),
        "*.log".to_string(),
        "*/logs/*".to_string(),
    ]
}

impl HostsentryConfig {
    /// Reject configurations that cannot produce a working session. Called
    /// before any monitoring starts.
    pub fn validate(&self) -> Result<(), HostsentryError> {
        if self.detector.threshold == 0 {
            return Err(ConfigError::InvalidThreshold(0).into());
        }
        if self.detector.window_secs == 0 {
            return Err(ConfigError::InvalidWindow(0).into());
        }
        if self.watch_paths.is_empty() {
            return Err(ConfigError::NoWatchPaths.into());
        }
        for path in &self.watch_paths {
            if !path.exists() {
                return Err(ConfigError::MissingWatchPath(path.clone()).into());
            }
        }
        // Surface bad globs now rather than on the first event.
        for pattern in &self.ignore_patterns {
            glob::Pattern::new(pattern).map_err(|e| ConfigError::IgnorePattern {
                pattern: pattern.clone(),
                source: e,
            })?;
        }
        // A misspelled channel silently falling back to stdout would hide
        // the misconfiguration until the first missed alert.
        for channel in &self.default_alerts {
            if crate::alert::parse_alert_channel(channel).is_none() {
                return Err(ConfigError::UnknownAlertChannel(channel.clone()).into());
            }
        }
        Ok(())
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.detector.window_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poller.interval_secs.max(1))
    }
}

/// Load config from ~/.hostsentry/config.toml, falling back to defaults.
pub fn load_config() -> HostsentryConfig {
    load_config_from(&config_path())
}

/// Load a config the user asked for by path. Unlike the default-location
/// loader there is no silent fallback: a missing or malformed file is a
/// configuration error surfaced to the caller.
pub fn try_load_config_from(path: &Path) -> Result<HostsentryConfig, HostsentryError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.display().to_string(),
        source: e,
    })?;
    let config = toml::from_str(&content).map_err(ConfigError::Parse)?;
    Ok(config)
}

pub fn load_config_from(path: &Path) -> HostsentryConfig {
    if !path.exists() {
        return HostsentryConfig::default();
    }
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                HostsentryConfig::default()
            }
        },
        Err(e) => {
            log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
            HostsentryConfig::default()
        }
    }
}

/// Returns the path to ~/.hostsentry/config.toml
pub fn config_path() -> PathBuf {
    hostsentry_dir().join("config.toml")
}

/// Returns the path to ~/.hostsentry/
pub fn hostsentry_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".hostsentry")
}

/// Expand ~ to $HOME in a path string
pub fn expand_tilde(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    if path_str.starts_with("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(format!("{}{}", home, &path_str[1..]));
        }
    }
    path.to_path_buf()
}

/// Generate the default config.toml content
pub fn default_config_toml() -> String {
    let config = HostsentryConfig::default();

    let mut toml = String::from("# Hostsentry configuration\n\n");

    toml.push_str("# Directories watched recursively for filesystem events.\n");
    toml.push_str("# Empty by default: monitoring refuses to start until one is set.\n");
    toml.push_str("watch_paths = []\n");
    toml.push_str("# watch_paths = [\"/home\", \"/srv\"]\n\n");

    toml.push_str("# Paths matching any of these globs are ignored.\n");
    toml.push_str("ignore_patterns = [\n");
    for pattern in &config.ignore_patterns {
        toml.push_str(&format!("  {:?},\n", pattern));
    }
    toml.push_str("]\n\n");

    toml.push_str("# Durable event log (parent directory created on demand)\n");
    toml.push_str(&format!("log_file = {:?}\n\n", config.log_file));

    toml.push_str("# Alert channels: stdout, desktop, null\n");
    toml.push_str("default_alerts = [\"stdout\"]\n\n");

    toml.push_str("[detector]\n");
    toml.push_str(&format!("threshold = {}\n", config.detector.threshold));
    toml.push_str(&format!("window_secs = {}\n", config.detector.window_secs));
    toml.push_str("# \"every-call\" re-fires while the rate stays high; \"once\" fires per crossing\n");
    toml.push_str("fire_policy = \"every-call\"\n\n");

    toml.push_str("[poller]\n");
    toml.push_str(&format!("enabled = {}\n", config.poller.enabled));
    toml.push_str(&format!("interval_secs = {}\n", config.poller.interval_secs));

    toml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_observed_defaults() {
        let config = HostsentryConfig::default();
        assert_eq!(config.detector.threshold, 10);
        assert_eq!(config.detector.window_secs, 60);
        assert_eq!(config.detector.fire_policy, FirePolicy::EveryCall);
        assert_eq!(
            config.ignore_patterns,
            vec!["*.tmp", "*.log", "*/logs/*"]
        );
        assert_eq!(config.log_file, "logs/file_log.txt");
        assert_eq!(config.default_alerts, vec!["stdout"]);
    }

    #[test]
    fn config_toml_roundtrip() {
        let toml_str = default_config_toml();
        let parsed: HostsentryConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.detector.threshold, 10);
        assert_eq!(parsed.detector.window_secs, 60);
        assert_eq!(parsed.poller.interval_secs, 5);
        assert!(parsed.poller.enabled);
        assert!(parsed.watch_paths.is_empty());
    }

    #[test]
    fn partial_config_deserialize() {
        // Only override the detector, everything else defaults
        let toml_str = r#"
[detector]
threshold = 3
window_secs = 5
fire_policy = "once"
"#;
        let config: HostsentryConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.detector.threshold, 3);
        assert_eq!(config.detector.window_secs, 5);
        assert_eq!(config.detector.fire_policy, FirePolicy::Once);
        assert_eq!(config.log_file, "logs/file_log.txt");
        assert!(!config.ignore_patterns.is_empty());
    }

    #[test]
    fn validate_rejects_zero_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = HostsentryConfig::default();
        config.watch_paths = vec![dir.path().to_path_buf()];
        config.detector.threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_watch_paths() {
        let config = HostsentryConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            HostsentryError::Config(ConfigError::NoWatchPaths)
        ));
    }

    #[test]
    fn validate_rejects_missing_watch_path() {
        let mut config = HostsentryConfig::default();
        config.watch_paths = vec![PathBuf::from("/no/such/directory/exists")];
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            HostsentryError::Config(ConfigError::MissingWatchPath(_))
        ));
    }

    #[test]
    fn validate_rejects_bad_ignore_glob() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = HostsentryConfig::default();
        config.watch_paths = vec![dir.path().to_path_buf()];
        config.ignore_patterns.push("[".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_alert_channel() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = HostsentryConfig::default();
        config.watch_paths = vec![dir.path().to_path_buf()];
        config.default_alerts = vec!["pager".to_string()];
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            HostsentryError::Config(ConfigError::UnknownAlertChannel(_))
        ));
    }

    #[test]
    fn validate_accepts_defaults_with_a_real_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = HostsentryConfig::default();
        config.watch_paths = vec![dir.path().to_path_buf()];
        config.validate().unwrap();
    }

    #[test]
    fn expand_tilde_rewrites_home_prefix() {
        std::env::set_var("HOME", "/home/testuser");
        let result = expand_tilde(Path::new("~/.hostsentry/config.toml"));
        assert_eq!(
            result,
            PathBuf::from("/home/testuser/.hostsentry/config.toml")
        );
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let config = load_config_from(Path::new("/no/such/config.toml"));
        assert_eq!(config.detector.threshold, 10);
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let err = try_load_config_from(Path::new("/no/such/config.toml")).unwrap_err();
        assert!(matches!(
            err,
            HostsentryError::Config(ConfigError::FileRead { .. })
        ));
    }

    #[test]
    fn explicit_config_must_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "watch_paths = not-toml").unwrap();
        let err = try_load_config_from(&path).unwrap_err();
        assert!(matches!(
            err,
            HostsentryError::Config(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn explicit_config_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[detector]\nthreshold = 7\n").unwrap();
        let config = try_load_config_from(&path).unwrap();
        assert_eq!(config.detector.threshold, 7);
    }
}
