//! Layout configuration
//!
//! Loaded from genestruct.toml; every field falls back to the defaults of the
//! classic gene structure plots.

use anyhow::{Context, Result};
use genestruct_core::{CompressionParams, GenomicPos, PromoterWindow};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub compression: CompressionParams,
    #[serde(default)]
    pub promoter: PromoterWindow,
    #[serde(default)]
    pub enhancers: EnhancerConfig,
    #[serde(default)]
    pub axis: AxisConfig,
    #[serde(default)]
    pub style: StyleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancerConfig {
    /// Draw proximal/distal enhancer tracks
    #[serde(default)]
    pub enabled: bool,

    /// Bases added on each side of the gene span when collecting enhancers
    #[serde(default = "default_enhancer_window")]
    pub window: GenomicPos,

    /// Minimum drawn width on the [0, 1] axis
    #[serde(default = "default_enhancer_min_width")]
    pub min_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    /// Desired number of ticks before spacing cleanup
    #[serde(default = "default_target_ticks")]
    pub target_ticks: i64,

    /// Ticks closer than this (axis units) to the previous one are dropped
    #[serde(default = "default_min_tick_distance")]
    pub min_tick_distance: f64,

    /// Exons at least this long get a length label
    #[serde(default = "default_label_min_exon_len")]
    pub label_min_exon_len: GenomicPos,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default = "default_exon_fill")]
    pub exon_fill: String,
    #[serde(default = "default_exon_edge")]
    pub exon_edge: String,
    #[serde(default = "default_intron")]
    pub intron: String,
    #[serde(default = "default_promoter")]
    pub promoter: String,
    #[serde(default = "default_tss")]
    pub tss: String,
    #[serde(default = "default_proximal_fill")]
    pub proximal_fill: String,
    #[serde(default = "default_proximal_edge")]
    pub proximal_edge: String,
    #[serde(default = "default_distal_fill")]
    pub distal_fill: String,
    #[serde(default = "default_distal_edge")]
    pub distal_edge: String,
    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
}

// Default value functions
fn default_enhancer_window() -> GenomicPos { genestruct_core::gene::DEFAULT_ENHANCER_WINDOW }
fn default_enhancer_min_width() -> f64 { 0.005 }
fn default_target_ticks() -> i64 { 8 }
fn default_min_tick_distance() -> f64 { 0.1 }
fn default_label_min_exon_len() -> GenomicPos { 1000 }
fn default_exon_fill() -> String { "#4472C4".to_string() }
fn default_exon_edge() -> String { "#2F528F".to_string() }
fn default_intron() -> String { "#D3D3D3".to_string() }
fn default_promoter() -> String { "#FFB6C1".to_string() }
fn default_tss() -> String { "#FF4500".to_string() }
fn default_proximal_fill() -> String { "#FFA500".to_string() }
fn default_proximal_edge() -> String { "#FF8C00".to_string() }
fn default_distal_fill() -> String { "#32CD32".to_string() }
fn default_distal_edge() -> String { "#228B22".to_string() }
fn default_label() -> String { "#666666".to_string() }
fn default_subtitle() -> String { "gray".to_string() }

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            window: default_enhancer_window(),
            min_width: default_enhancer_min_width(),
        }
    }
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            target_ticks: default_target_ticks(),
            min_tick_distance: default_min_tick_distance(),
            label_min_exon_len: default_label_min_exon_len(),
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            exon_fill: default_exon_fill(),
            exon_edge: default_exon_edge(),
            intron: default_intron(),
            promoter: default_promoter(),
            tss: default_tss(),
            proximal_fill: default_proximal_fill(),
            proximal_edge: default_proximal_edge(),
            distal_fill: default_distal_fill(),
            distal_edge: default_distal_edge(),
            label: default_label(),
            subtitle: default_subtitle(),
        }
    }
}

impl LayoutConfig {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from("genestruct.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: genestruct.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::info!("Using default configuration");
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: LayoutConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to serialize default configuration")
    }

    pub fn validate(&self) -> Result<()> {
        self.compression.validate()?;
        if self.promoter.upstream < 0 || self.promoter.downstream < 0 {
            anyhow::bail!("promoter upstream/downstream must be non-negative");
        }
        if self.enhancers.window < 0 {
            anyhow::bail!("enhancer window must be non-negative, got {}", self.enhancers.window);
        }
        if self.axis.target_ticks < 1 {
            anyhow::bail!("axis.target_ticks must be at least 1, got {}", self.axis.target_ticks);
        }
        if !(self.axis.min_tick_distance >= 0.0) {
            anyhow::bail!("axis.min_tick_distance must be non-negative");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayoutConfig::default();
        assert_eq!(config.compression.threshold, 5000);
        assert_eq!(config.compression.budget, 300);
        assert_eq!(config.promoter.upstream, 200);
        assert_eq!(config.enhancers.window, 500);
        assert_eq!(config.axis.target_ticks, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() -> Result<()> {
        let config = LayoutConfig::from_toml_str(
            r#"
            [compression]
            threshold = 2000

            [enhancers]
            enabled = true
            "#,
        )?;
        assert_eq!(config.compression.threshold, 2000);
        assert_eq!(config.compression.budget, 300);
        assert!(config.enhancers.enabled);
        assert_eq!(config.enhancers.min_width, 0.005);
        assert_eq!(config.style.exon_fill, "#4472C4");
        Ok(())
    }

    #[test]
    fn test_config_roundtrip() -> Result<()> {
        let mut config = LayoutConfig::default();
        config.compression.budget = 150;
        let temp_file = NamedTempFile::new()?;

        config.save_to_file(temp_file.path())?;
        let loaded = LayoutConfig::load(Some(temp_file.path()))?;

        assert_eq!(config, loaded);
        Ok(())
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = LayoutConfig::from_toml_str("[axis]\ntarget_ticks = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = LayoutConfig::from_toml_str("[compression]\nbudget = -1\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("budget"));
    }

    #[test]
    fn test_example_toml_generation() {
        let example = LayoutConfig::example_toml().unwrap();
        assert!(example.contains("[compression]"));
        assert!(example.contains("[axis]"));
        assert!(example.contains("[style]"));
    }
}
