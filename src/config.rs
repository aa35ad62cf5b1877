//! Loading backend configuration from TOML.
//!
//! See `AppConfig` and `Timings` for the expected schema. Every key is optional.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Directory holding the SPA build (index.html + assets).
  pub static_dir: String,
  /// TOML catalog replacing the built-in games.
  pub content_path: Option<String>,
  /// JSON file for the roster; in-memory when absent.
  pub roster_path: Option<String>,
  /// Insert the demo students on an empty roster.
  pub seed_roster: bool,
  /// Upper bound on a single result-sink call.
  pub submit_timeout_ms: u64,
  pub timings: Timings,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      static_dir: "./static".into(),
      content_path: None,
      roster_path: None,
      seed_roster: false,
      submit_timeout_ms: 5000,
      timings: Timings::default(),
    }
  }
}

/// UI feedback delays, in milliseconds.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Timings {
  pub word_success_ms: u64,
  pub word_flash_ms: u64,
  pub auditory_correct_ms: u64,
  pub auditory_incorrect_ms: u64,
  pub story_success_ms: u64,
  pub bingo_double_click_ms: u64,
}

impl Default for Timings {
  fn default() -> Self {
    Self {
      word_success_ms: 300,
      word_flash_ms: 600,
      auditory_correct_ms: 1500,
      auditory_incorrect_ms: 600,
      story_success_ms: 2000,
      bingo_double_click_ms: 300,
    }
  }
}

/// Load `AppConfig` from PHONICS_CONFIG_PATH. Missing variable or any IO/parse error falls
/// back to defaults (errors are logged).
pub fn load_config_from_env() -> AppConfig {
  let Ok(path) = std::env::var("PHONICS_CONFIG_PATH") else {
    info!(target: "phonics_backend", "PHONICS_CONFIG_PATH not set; using default config");
    return AppConfig::default();
  };
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "phonics_backend", %path, "Loaded config (TOML)");
        cfg
      }
      Err(e) => {
        error!(target: "phonics_backend", %path, error = %e, "Failed to parse TOML config");
        AppConfig::default()
      }
    },
    Err(e) => {
      error!(target: "phonics_backend", %path, error = %e, "Failed to read TOML config file");
      AppConfig::default()
    }
  }
}

pub fn parse_config(raw: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(raw)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_config_keeps_defaults() {
    let cfg = parse_config(
      r#"
        seed_roster = true
        [timings]
        story_success_ms = 1000
      "#,
    )
    .unwrap();
    assert!(cfg.seed_roster);
    assert_eq!(cfg.static_dir, "./static");
    assert_eq!(cfg.timings.story_success_ms, 1000);
    assert_eq!(cfg.timings.word_flash_ms, 600);
    assert_eq!(cfg.submit_timeout_ms, 5000);
  }

  #[test]
  fn empty_config_is_default() {
    let cfg = parse_config("").unwrap();
    assert_eq!(cfg.timings, Timings::default());
    assert!(cfg.content_path.is_none());
  }
}
