#![forbid(unsafe_code)]

//! JSON stage options from the host.
//!
//! Every field is optional; missing fields keep the [`StageConfig`] default.
//! Durations are integer milliseconds. Field names are camelCase so the JS
//! side can pass a plain object through `JSON.stringify`.
//!
//! ```json
//! { "seed": 42, "matrixMs": 8000, "word": "neo", "preloaderMs": 0 }
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sitefx_core::key_sequence::SequenceConfig;

use crate::stage::StageConfig;

/// Why host options were rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// The payload was not valid JSON for [`StageOptions`].
    Parse(String),
    /// A field parsed but its value is unusable.
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "invalid stage options: {msg}"),
            Self::Invalid { field, reason } => write!(f, "invalid stage option `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for OptionsError {}

/// Host-facing stage options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct StageOptions {
    /// Rain PRNG seed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub celebratory_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_ms: Option<u64>,
    /// Idle timeout of the typed word.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_timeout_ms: Option<u64>,
    /// Replacement for the typed word (ASCII letters).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_clicks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_gap_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preloader_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rain_cell_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave_columns: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave_rows: Option<u32>,
}

impl StageOptions {
    /// Parse options from a JSON string. An empty string means all defaults.
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(|err| OptionsError::Parse(err.to_string()))
    }

    /// Validate and apply over [`StageConfig::default`].
    pub fn into_config(self) -> Result<StageConfig, OptionsError> {
        let mut config = StageConfig::default();

        if let Some(seed) = self.seed {
            config.rain.seed = seed;
        }
        if let Some(ms) = self.celebratory_ms {
            config.durations.celebratory = positive_ms("celebratoryMs", ms)?;
        }
        if let Some(ms) = self.matrix_ms {
            config.durations.matrix = positive_ms("matrixMs", ms)?;
        }
        if let Some(ms) = self.logo_ms {
            config.durations.logo = positive_ms("logoMs", ms)?;
        }
        if let Some(ms) = self.word_timeout_ms {
            config.sequences.word_idle_timeout = positive_ms("wordTimeoutMs", ms)?;
        }
        if let Some(word) = self.word {
            if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(OptionsError::Invalid {
                    field: "word",
                    reason: "must be one or more ASCII letters",
                });
            }
            config.sequences = SequenceConfig {
                word_idle_timeout: config.sequences.word_idle_timeout,
                ..SequenceConfig::default().with_word(&word)
            };
        }
        if let Some(clicks) = self.logo_clicks {
            if clicks == 0 {
                return Err(OptionsError::Invalid {
                    field: "logoClicks",
                    reason: "must be at least 1",
                });
            }
            config.logo.clicks = clicks;
        }
        if let Some(ms) = self.logo_gap_ms {
            config.logo.max_gap = positive_ms("logoGapMs", ms)?;
        }
        if let Some(ms) = self.preloader_ms {
            config.preloader = Duration::from_millis(ms);
        }
        if let Some(cell) = self.rain_cell_size {
            if !cell.is_finite() || cell < 1.0 {
                return Err(OptionsError::Invalid {
                    field: "rainCellSize",
                    reason: "must be a finite size of at least 1px",
                });
            }
            config.rain.cell_size = cell;
        }
        if let Some(columns) = self.wave_columns {
            config.wave.columns = grid_side("waveColumns", columns)?;
        }
        if let Some(rows) = self.wave_rows {
            config.wave.rows = grid_side("waveRows", rows)?;
        }

        Ok(config)
    }
}

fn positive_ms(field: &'static str, ms: u64) -> Result<Duration, OptionsError> {
    if ms == 0 {
        return Err(OptionsError::Invalid {
            field,
            reason: "must be greater than zero",
        });
    }
    Ok(Duration::from_millis(ms))
}

fn grid_side(field: &'static str, n: u32) -> Result<u32, OptionsError> {
    if !(2..=1000).contains(&n) {
        return Err(OptionsError::Invalid {
            field,
            reason: "must be between 2 and 1000",
        });
    }
    Ok(n)
}

/// Parse and validate in one go.
pub fn parse_config(json: &str) -> Result<StageConfig, OptionsError> {
    StageOptions::from_json(json)?.into_config()
}
