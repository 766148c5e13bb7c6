// SYNOID Hype Configuration
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Tunables for alignment, scoring, candidate generation and selection.
// Loaded from JSON the same way the smart editor loads its strategy file.

use crate::engine::text_boost::TextBoostConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const CONFIG_ENV_VAR: &str = "SYNOID_HYPE_CONFIG";
pub const CONFIG_FILE_NAME: &str = "hype_config.json";

/// Per-channel weights used by the hype scorer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChannelWeights {
    pub energy: f64,
    pub text: f64,
    pub motion: f64,
    pub scene: f64,
}

impl Default for ChannelWeights {
    fn default() -> Self {
        Self {
            energy: 1.0,
            text: 1.5,
            motion: 1.2,
            scene: 0.8,
        }
    }
}

impl ChannelWeights {
    fn as_array(&self) -> [(&'static str, f64); 4] {
        [
            ("energy", self.energy),
            ("text", self.text),
            ("motion", self.motion),
            ("scene", self.scene),
        ]
    }
}

/// How scored windows turn into candidates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CandidateMode {
    /// Each window is its own candidate.
    Window,
    /// Each window seeds a clip of `clip_length_seconds`.
    #[default]
    Grid,
    /// Top-K peaks with temporal non-max suppression.
    Peaks,
}

/// Unit of incoming energy samples.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnergyScale {
    #[default]
    Linear,
    /// dBFS, mapped onto `[0, 1]` over a -60..0 dB range.
    Decibels,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub window_width_seconds: f64,
    pub clip_length_seconds: f64,
    pub min_gap_seconds: f64,
    pub budget_seconds: f64,
    pub min_segment_seconds: f64,
    pub channel_weights: ChannelWeights,
    pub candidate_mode: CandidateMode,
    pub top_k: usize,
    /// Peaks mode: when set, every source keeps up to this many peaks
    /// (suppressed within the source) instead of one global `top_k`.
    pub top_k_per_source: Option<usize>,
    pub scene_bonus: f64,
    pub energy_scale: EnergyScale,
    pub normalize_per_source: bool,
    pub early_stop_slack_seconds: f64,
    pub text: TextBoostConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_width_seconds: 5.0,
            clip_length_seconds: 60.0,
            min_gap_seconds: 60.0,
            budget_seconds: 3600.0,
            min_segment_seconds: 2.0,
            channel_weights: ChannelWeights::default(),
            candidate_mode: CandidateMode::Grid,
            top_k: 20,
            top_k_per_source: None,
            scene_bonus: 1.0,
            energy_scale: EnergyScale::Linear,
            normalize_per_source: false,
            early_stop_slack_seconds: 1.0,
            text: TextBoostConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Coarse preset: five-minute windows scored as whole chunks, each VOD
    /// normalized on its own.
    pub fn chunked() -> Self {
        Self {
            window_width_seconds: 300.0,
            candidate_mode: CandidateMode::Window,
            normalize_per_source: true,
            channel_weights: ChannelWeights {
                energy: 1.2,
                text: 1.5,
                motion: 0.0,
                scene: 0.8,
            },
            ..Self::default()
        }
    }

    /// Resolve a config file: explicit path, then `$SYNOID_HYPE_CONFIG`,
    /// then `./hype_config.json`, then the user config dir. Falls back to
    /// defaults when nothing is found.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let config = Self::from_file(path)?;
            info!("[CONFIG] Loaded hype config from {:?}", path);
            return Ok(config);
        }

        for path in Self::search_paths() {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    info!("[CONFIG] Loaded hype config from {:?}", path);
                    return Ok(config);
                }
                Err(e) => warn!("[CONFIG] Ignoring {:?}: {:#}", path, e),
            }
        }

        info!("[CONFIG] Using default hype config");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            paths.push(PathBuf::from(env_path));
        }
        paths.push(PathBuf::from(CONFIG_FILE_NAME));
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("synoid").join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// Reject values the engine cannot work with. A non-positive budget is
    /// allowed: it simply yields an empty plan.
    pub fn validate(&self) -> Result<()> {
        if !(self.window_width_seconds.is_finite() && self.window_width_seconds > 0.0) {
            bail!(
                "window_width_seconds must be positive, got {}",
                self.window_width_seconds
            );
        }
        if !(self.clip_length_seconds.is_finite() && self.clip_length_seconds > 0.0) {
            bail!(
                "clip_length_seconds must be positive, got {}",
                self.clip_length_seconds
            );
        }
        if self.budget_seconds.is_nan() {
            bail!("budget_seconds must be a number");
        }
        for (name, value) in [
            ("min_gap_seconds", self.min_gap_seconds),
            ("min_segment_seconds", self.min_segment_seconds),
            ("scene_bonus", self.scene_bonus),
            ("early_stop_slack_seconds", self.early_stop_slack_seconds),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                bail!("{} must be finite and non-negative, got {}", name, value);
            }
        }
        for (name, weight) in self.channel_weights.as_array() {
            if !(weight.is_finite() && weight >= 0.0) {
                bail!(
                    "channel weight '{}' must be finite and non-negative, got {}",
                    name,
                    weight
                );
            }
        }
        self.text.validate()
    }
}
