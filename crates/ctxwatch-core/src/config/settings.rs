use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Command line arguments
#[derive(Parser, Debug, Default)]
#[command(
    author,
    version,
    about = "Context budget advisories for agent sessions (stop hook)"
)]
pub struct Config {
    /// Enable debug logging (written to stderr)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Context window capacity in tokens
    #[arg(long, global = true)]
    pub max_context_tokens: Option<u64>,

    /// Number of trailing transcript lines to scan
    #[arg(long, global = true)]
    pub tail_window_size: Option<usize>,

    /// Percentage at which the soft advisory fires
    #[arg(long, global = true)]
    pub soft_threshold: Option<u64>,

    /// Percentage at which the strong advisory fires
    #[arg(long, global = true)]
    pub strong_threshold: Option<u64>,

    /// Subcommand (hook mode when omitted)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print a usage report for a transcript instead of running as a hook
    Inspect {
        /// Path to the session transcript (.jsonl)
        transcript: PathBuf,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Monitor settings (from config file)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Context window capacity in tokens
    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: u64,

    /// Number of trailing transcript lines scanned for usage
    #[serde(default = "default_tail_window_size")]
    pub tail_window_size: usize,

    /// Soft advisory threshold (percent)
    #[serde(default = "default_soft_threshold_pct")]
    pub soft_threshold_pct: u64,

    /// Strong advisory threshold (percent)
    #[serde(default = "default_strong_threshold_pct")]
    pub strong_threshold_pct: u64,

    /// Custom advisory texts
    #[serde(default)]
    pub messages: MessageSettings,
}

fn default_max_context_tokens() -> u64 {
    200_000
}

fn default_tail_window_size() -> usize {
    200
}

fn default_soft_threshold_pct() -> u64 {
    80
}

fn default_strong_threshold_pct() -> u64 {
    90
}

/// Advisory text overrides
///
/// Templates may use `{percent}`, `{used}` and `{capacity}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSettings {
    /// Text for the soft tier
    #[serde(default)]
    pub soft: Option<String>,

    /// Text for the strong tier
    #[serde(default)]
    pub strong: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_context_tokens: default_max_context_tokens(),
            tail_window_size: default_tail_window_size(),
            soft_threshold_pct: default_soft_threshold_pct(),
            strong_threshold_pct: default_strong_threshold_pct(),
            messages: MessageSettings::default(),
        }
    }
}

/// Settings that cannot drive a meaningful evaluation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("max_context_tokens must be greater than zero")]
    ZeroCapacity,

    #[error("tail_window_size must be greater than zero")]
    ZeroWindow,

    #[error("soft threshold ({soft}%) must be below strong threshold ({strong}%)")]
    ThresholdOrder { soft: u64, strong: u64 },
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        // Try custom path first
        if let Some(p) = path {
            if p.exists() {
                return Self::read_file(p);
            }
        }

        // Try default config locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("ctxwatch/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/ctxwatch/config.toml")),
            dirs::home_dir().map(|p| p.join(".ctxwatch.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::read_file(path);
            }
        }

        Ok(Self::default())
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if let Some(tokens) = cli.max_context_tokens {
            self.max_context_tokens = tokens;
        }
        if let Some(window) = cli.tail_window_size {
            self.tail_window_size = window;
        }
        if let Some(soft) = cli.soft_threshold {
            self.soft_threshold_pct = soft;
        }
        if let Some(strong) = cli.strong_threshold {
            self.strong_threshold_pct = strong;
        }
    }

    /// Reject settings that would divide by zero, never scan anything, or
    /// make the soft tier unreachable.
    ///
    /// Thresholds above 100 are allowed: usage can exceed capacity.
    pub fn validate(&self) -> std::result::Result<(), SettingsError> {
        if self.max_context_tokens == 0 {
            return Err(SettingsError::ZeroCapacity);
        }
        if self.tail_window_size == 0 {
            return Err(SettingsError::ZeroWindow);
        }
        if self.soft_threshold_pct >= self.strong_threshold_pct {
            return Err(SettingsError::ThresholdOrder {
                soft: self.soft_threshold_pct,
                strong: self.strong_threshold_pct,
            });
        }
        Ok(())
    }
}
