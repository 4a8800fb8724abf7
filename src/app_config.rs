/*!
 * Configuration: scoring thresholds, rehearsal spacing, database location.
 *
 * Loaded from `conf.json`, validated, and written back with defaults on
 * first run.
 */

use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::recall::{AligningScorer, SimilarityResolver, SynonymTable};

/// Everything `conf.json` can set
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Recall scoring settings
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Rehearsal scheduling settings
    #[serde(default)]
    pub scheduling: SchedulingConfig,

    /// Persistence settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Recall scoring configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Minimum similarity for accepting a typo-tolerant match (0.0-1.0)
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f32,

    /// Accuracy (0-100) at which a practice attempt counts as passed
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: u8,

    /// Whether the built-in devotional synonym table is loaded
    #[serde(default = "default_true")]
    pub use_default_synonyms: bool,

    /// Extra synonym entries, canonical key to interchangeable terms
    #[serde(default)]
    pub extra_synonyms: HashMap<String, Vec<String>>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
            pass_threshold: default_pass_threshold(),
            use_default_synonyms: default_true(),
            extra_synonyms: HashMap::new(),
        }
    }
}

impl ScoringConfig {
    /// Build the synonym table described by this configuration
    pub fn synonym_table(&self) -> SynonymTable {
        let mut table = if self.use_default_synonyms {
            SynonymTable::with_defaults()
        } else {
            SynonymTable::empty()
        };
        table.extend_from(&self.extra_synonyms);
        table
    }

    /// Build a scorer from this configuration
    pub fn build_scorer(&self) -> AligningScorer {
        AligningScorer::new(SimilarityResolver::new(self.synonym_table()), self.fuzzy_threshold)
    }
}

/// Rehearsal scheduling configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SchedulingConfig {
    /// Adaptive interval table in days, indexed by prior completions
    #[serde(default = "default_intervals_days")]
    pub intervals_days: Vec<u32>,

    /// Number of records created for a recurring schedule
    #[serde(default = "default_recurring_batch_size")]
    pub recurring_batch_size: usize,

    /// Delay in days before the first rehearsal of a newly added passage
    #[serde(default = "default_initial_delay_days")]
    pub initial_delay_days: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            intervals_days: default_intervals_days(),
            recurring_batch_size: default_recurring_batch_size(),
            initial_delay_days: default_initial_delay_days(),
        }
    }
}

impl SchedulingConfig {
    /// Interval for the next adaptive rehearsal, clamped at the last entry
    pub fn adaptive_interval(&self, completed_count: usize) -> u32 {
        let last = self.intervals_days.len().saturating_sub(1);
        self.intervals_days
            .get(completed_count.min(last))
            .copied()
            .unwrap_or_else(default_initial_delay_days)
    }

    /// First entry of the interval table
    pub fn first_adaptive_interval(&self) -> u32 {
        self.adaptive_interval(0)
    }
}

/// Persistence configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct DatabaseConfig {
    /// SQLite file path; the user data directory is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_fuzzy_threshold() -> f32 {
    crate::recall::scorer::DEFAULT_FUZZY_THRESHOLD
}

fn default_pass_threshold() -> u8 {
    90
}

fn default_true() -> bool {
    true
}

fn default_intervals_days() -> Vec<u32> {
    vec![1, 3, 7, 14, 30, 90]
}

fn default_recurring_batch_size() -> usize {
    12
}

fn default_initial_delay_days() -> u32 {
    1
}

impl Config {
    /// Load configuration from a JSON file, creating a default one if missing
    pub fn load_or_create<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        if config_path.exists() {
            let file = File::open(config_path)
                .with_context(|| format!("Failed to open config file: {}", config_path.display()))?;

            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", config_path.display());

        let config = Config::default();
        config.save(config_path)?;
        Ok(config)
    }

    /// Write configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, config_path: P) -> Result<()> {
        let config_path = config_path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(config_path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", config_path.display()))?;

        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.scoring.fuzzy_threshold) {
            return Err(anyhow!(
                "Fuzzy threshold must be between 0.0 and 1.0, got {}",
                self.scoring.fuzzy_threshold
            ));
        }

        if self.scoring.pass_threshold > 100 {
            return Err(anyhow!(
                "Pass threshold must be a percentage (0-100), got {}",
                self.scoring.pass_threshold
            ));
        }

        let intervals = &self.scheduling.intervals_days;
        if intervals.is_empty() {
            return Err(anyhow!("Interval table must contain at least one entry"));
        }
        if intervals.iter().any(|days| *days == 0) {
            return Err(anyhow!("Interval table entries must be positive: {:?}", intervals));
        }
        if intervals.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(anyhow!("Interval table must not decrease: {:?}", intervals));
        }

        if self.scheduling.recurring_batch_size == 0 {
            return Err(anyhow!("Recurring batch size must be at least 1"));
        }

        Ok(())
    }
}
