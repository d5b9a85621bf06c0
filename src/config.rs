//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//! TOML support is behind the `toml` feature.

use crate::compute::nearest::{FAULT_FALLBACK_KM, VOLCANO_FALLBACK_KM};
use crate::compute::quadtree::{DEFAULT_CAPACITY, DEFAULT_MAX_DEPTH};
use crate::compute::risk::{RiskWeights, WeightTable};
use crate::error::{QuakeError, Result};
use std::path::Path;

/// Quadtree, scoring and fallback settings.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Points a quadtree leaf holds before subdividing
    #[serde(default = "Config::default_quadtree_capacity")]
    pub quadtree_capacity: usize,

    /// Depth at which quadtree nodes stop subdividing
    #[serde(default = "Config::default_max_depth")]
    pub max_depth: usize,

    /// Multiplier applied to the data extent when deriving the root boundary
    #[serde(default = "Config::default_bounds_padding")]
    pub bounds_padding: f64,

    #[serde(default)]
    pub weights: WeightTable,

    #[serde(default = "Config::default_fault_fallback_km")]
    pub fault_fallback_km: f64,

    #[serde(default = "Config::default_volcano_fallback_km")]
    pub volcano_fallback_km: f64,
}

impl Config {
    const fn default_quadtree_capacity() -> usize {
        DEFAULT_CAPACITY
    }

    const fn default_max_depth() -> usize {
        DEFAULT_MAX_DEPTH
    }

    const fn default_bounds_padding() -> f64 {
        1.2
    }

    const fn default_fault_fallback_km() -> f64 {
        FAULT_FALLBACK_KM
    }

    const fn default_volcano_fallback_km() -> f64 {
        VOLCANO_FALLBACK_KM
    }

    pub fn with_quadtree_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Quadtree capacity must be greater than zero");
        self.quadtree_capacity = capacity;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        assert!(max_depth > 0, "Max depth must be greater than zero");

        if max_depth > 64 {
            log::warn!(
                "Max depth of {} exceeds f64 resolution for most extents; \
                coincident points will still share a leaf",
                max_depth
            );
        }

        self.max_depth = max_depth;
        self
    }

    pub fn with_bounds_padding(mut self, padding: f64) -> Self {
        assert!(
            padding.is_finite() && padding >= 1.0,
            "Bounds padding must be finite and at least 1.0"
        );
        self.bounds_padding = padding;
        self
    }

    pub fn with_weights(mut self, weights: WeightTable) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_fallbacks(mut self, fault_km: f64, volcano_km: f64) -> Self {
        self.fault_fallback_km = fault_km;
        self.volcano_fallback_km = volcano_km;
        self
    }

    /// Active weight table.
    pub fn risk_weights(&self) -> RiskWeights {
        self.weights.weights()
    }

    pub fn validate(&self) -> Result<()> {
        if self.quadtree_capacity == 0 {
            return Err(QuakeError::InvalidConfig(
                "Quadtree capacity must be greater than zero".to_string(),
            ));
        }

        if self.max_depth == 0 {
            return Err(QuakeError::InvalidConfig(
                "Max depth must be greater than zero".to_string(),
            ));
        }

        if !self.bounds_padding.is_finite() || self.bounds_padding < 1.0 {
            return Err(QuakeError::InvalidConfig(format!(
                "Bounds padding must be finite and at least 1.0, got {}",
                self.bounds_padding
            )));
        }

        for (name, value) in [
            ("fault_fallback_km", self.fault_fallback_km),
            ("volcano_fallback_km", self.volcano_fallback_km),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(QuakeError::InvalidConfig(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }

        self.risk_weights().validate()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(toml_str).map_err(|e| QuakeError::Toml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| QuakeError::Toml(e.to_string()))
    }

    /// Load from a file. `.toml` files need the `toml` feature; anything else is read as JSON.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            #[cfg(feature = "toml")]
            return Self::from_toml(&contents);

            #[cfg(not(feature = "toml"))]
            return Err(QuakeError::InvalidConfig(format!(
                "{} is TOML but the `toml` feature is disabled",
                path.display()
            )));
        }

        Self::from_json(&contents)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quadtree_capacity: Self::default_quadtree_capacity(),
            max_depth: Self::default_max_depth(),
            bounds_padding: Self::default_bounds_padding(),
            weights: WeightTable::default(),
            fault_fallback_km: Self::default_fault_fallback_km(),
            volcano_fallback_km: Self::default_volcano_fallback_km(),
        }
    }
}
