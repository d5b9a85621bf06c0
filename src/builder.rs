//! Builder for [`RiskZoner`].
//!
//! Collects reference feature sets and configuration, then validates and
//! builds both nearest-feature indexes in one step.

use crate::compute::risk::WeightTable;
use crate::config::Config;
use crate::error::Result;
use crate::zoning::RiskZoner;
use quakezone_types::point::GeoCoord;
use std::path::PathBuf;

/// Builder for a zoner with reference features and settings.
#[derive(Debug, Default)]
pub struct ZonerBuilder {
    config: Config,
    config_path: Option<PathBuf>,
    weights: Option<WeightTable>,
    faults: Vec<GeoCoord>,
    volcanoes: Vec<GeoCoord>,
}

impl ZonerBuilder {
    /// Default configuration, no reference features.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration. Cleared by a later [`config_path`](Self::config_path).
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self.config_path = None;
        self
    }

    /// Load configuration from a JSON (or, with the `toml` feature, TOML) file at build time.
    pub fn config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Select the weight table. Applied after any configuration file is
    /// loaded, so it wins regardless of call order.
    pub fn weights(mut self, weights: WeightTable) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Fault coordinates (degrees). Replaces any previously set.
    pub fn faults<I>(mut self, coords: I) -> Self
    where
        I: IntoIterator<Item = GeoCoord>,
    {
        self.faults = coords.into_iter().collect();
        self
    }

    /// Volcano coordinates (degrees). Replaces any previously set.
    pub fn volcanoes<I>(mut self, coords: I) -> Self
    where
        I: IntoIterator<Item = GeoCoord>,
    {
        self.volcanoes = coords.into_iter().collect();
        self
    }

    /// Validate configuration and coordinates and build the indexes.
    pub fn build(self) -> Result<RiskZoner> {
        let config = match self.config_path {
            Some(path) => {
                let loaded = Config::from_file(&path)?;
                log::debug!("Loaded configuration from {}", path.display());
                loaded
            }
            None => self.config,
        };
        let config = match self.weights {
            Some(weights) => config.with_weights(weights),
            None => config,
        };

        RiskZoner::new(config, self.faults, self.volcanoes)
    }
}
