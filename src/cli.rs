use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hostsentry")]
#[command(about = "Host-based intrusion detection: filesystem watcher with sliding-window anomaly alerts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch filesystem roots and raise anomaly alerts on activity bursts
    Watch(WatchArgs),

    /// Initialize ~/.hostsentry/ with a default config
    Init(InitArgs),
}

#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Config file (default: ~/.hostsentry/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Watch root (repeatable, overrides config watch_paths)
    #[arg(long = "paths", value_name = "PATH")]
    pub watch_paths: Vec<PathBuf>,

    /// Alert channels: stdout, desktop, null (overrides config)
    #[arg(long = "alert", value_name = "CHANNEL")]
    pub alert_channels: Vec<String>,

    /// Detector threshold override (events per window)
    #[arg(long, value_name = "N")]
    pub threshold: Option<u64>,

    /// Detector window override in seconds
    #[arg(long, value_name = "SECS")]
    pub window: Option<u64>,

    /// Log file override
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Disable the network/process pollers
    #[arg(long)]
    pub no_pollers: bool,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config
    #[arg(long)]
    pub force: bool,
}

impl WatchArgs {
    pub fn validate(&self) -> anyhow::Result<()> {
        for path in &self.watch_paths {
            if !path.exists() {
                anyhow::bail!("Watch path does not exist: {}", path.display());
            }
        }
        for channel in &self.alert_channels {
            if crate::alert::parse_alert_channel(channel).is_none() {
                anyhow::bail!("Unknown alert channel: {}", channel);
            }
        }
        Ok(())
    }

    /// Fold CLI overrides into a loaded config.
    pub fn apply_to(&self, config: &mut crate::config::HostsentryConfig) {
        if !self.watch_paths.is_empty() {
            config.watch_paths = self.watch_paths.clone();
        }
        if !self.alert_channels.is_empty() {
            config.default_alerts = self.alert_channels.clone();
        }
        if let Some(threshold) = self.threshold {
            config.detector.threshold = threshold;
        }
        if let Some(window) = self.window {
            config.detector.window_secs = window;
        }
        if let Some(ref log_file) = self.log_file {
            config.log_file = log_file.to_string_lossy().to_string();
        }
        if self.no_pollers {
            config.poller.enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostsentryConfig;

    fn watch_args(extra: &[&str]) -> WatchArgs {
        let mut argv = vec!["hostsentry", "watch"];
        argv.extend_from_slice(extra);
        let cli = Cli::parse_from(argv);
        match cli.command {
            Commands::Watch(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn overrides_fold_into_config() {
        let args = watch_args(&[
            "--paths", "/tmp",
            "--alert", "null",
            "--threshold", "3",
            "--window", "5",
            "--no-pollers",
        ]);
        args.validate().unwrap();

        let mut config = HostsentryConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config.watch_paths, vec![PathBuf::from("/tmp")]);
        assert_eq!(config.default_alerts, vec!["null"]);
        assert_eq!(config.detector.threshold, 3);
        assert_eq!(config.detector.window_secs, 5);
        assert!(!config.poller.enabled);
    }

    #[test]
    fn no_overrides_leave_config_untouched() {
        let args = watch_args(&[]);
        let mut config = HostsentryConfig::default();
        config.watch_paths = vec![PathBuf::from("/srv")];
        args.apply_to(&mut config);
        assert_eq!(config.watch_paths, vec![PathBuf::from("/srv")]);
        assert_eq!(config.detector.threshold, 10);
        assert!(config.poller.enabled);
    }

    #[test]
    fn unknown_alert_channel_is_rejected() {
        let args = watch_args(&["--alert", "pager"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn missing_watch_path_is_rejected() {
        let args = watch_args(&["--paths", "/no/such/dir/anywhere"]);
        assert!(args.validate().is_err());
    }
}
