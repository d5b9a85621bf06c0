//! Deterministic multi-factor earthquake risk scoring.
//!
//! Each raw factor is normalized to `[0, 1]` by a fixed rule, multiplied by
//! its weight and summed; the sum is scaled to `[0, 100]`. Scoring never
//! looks at other records, so it can be run per event in any order or on
//! any thread.
//!
//! Two weight tables exist. [`RiskWeights::seven_factor`] is the default
//! and gives population density no weight. [`RiskWeights::eight_factor`]
//! includes population. Pick one per run; the tables are never blended.
//!
//! # Example
//!
//! ```rust
//! use quakezone::compute::risk::{RiskWeights, score_risk};
//! use quakezone::{PlateZone, RiskFactors, RiskLevel};
//!
//! let factors = RiskFactors::new(7.5, 5.0, 10.0, 10.0, 5.0, 5.0, PlateZone::Subduction);
//! let result = score_risk(&factors, &RiskWeights::seven_factor());
//! assert!(result.score > 70.0);
//! assert!(result.level >= RiskLevel::High);
//! ```

use crate::error::{QuakeError, Result};
use quakezone_types::risk::{PlateZone, RiskFactors, RiskLevel};
use serde::{Deserialize, Serialize};

/// Richter ceiling for magnitude normalization.
pub const MAGNITUDE_CEILING: f64 = 9.0;
/// Depth (km) at which depth stops contributing.
pub const DEPTH_FLOOR_KM: f64 = 300.0;
/// Events per year treated as maximum frequency.
pub const FREQUENCY_CEILING: f64 = 50.0;
/// Fault distance (km) beyond which faults stop contributing.
pub const FAULT_CEILING_KM: f64 = 200.0;
/// Volcano distance (km) beyond which volcanoes stop contributing.
pub const VOLCANO_CEILING_KM: f64 = 150.0;
/// People per km² treated as maximum density.
pub const POPULATION_CEILING: f64 = 100_000.0;
/// Normalized value for an unrecognized plate-zone code.
pub const UNKNOWN_PLATE_ZONE_RISK: f64 = 0.5;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

pub fn normalize_magnitude(magnitude: f64) -> f64 {
    (magnitude / MAGNITUDE_CEILING).clamp(0.0, 1.0)
}

/// Shallow events are riskier: 1.0 at or above the surface, 0.0 at 300 km and deeper.
pub fn normalize_depth(depth_km: f64) -> f64 {
    if depth_km <= 0.0 {
        return 1.0;
    }
    (1.0 - depth_km / DEPTH_FLOOR_KM).clamp(0.0, 1.0)
}

/// Modified Mercalli intensity I-XII mapped linearly; below I is zero.
pub fn normalize_intensity(intensity: f64) -> f64 {
    if intensity < 1.0 {
        return 0.0;
    }
    ((intensity - 1.0) / 11.0).clamp(0.0, 1.0)
}

pub fn normalize_frequency(events_per_year: f64) -> f64 {
    (events_per_year / FREQUENCY_CEILING).clamp(0.0, 1.0)
}

pub fn normalize_fault_distance(distance_km: f64) -> f64 {
    inverse_distance(distance_km, FAULT_CEILING_KM)
}

pub fn normalize_volcano_distance(distance_km: f64) -> f64 {
    inverse_distance(distance_km, VOLCANO_CEILING_KM)
}

#[inline]
fn inverse_distance(distance_km: f64, ceiling_km: f64) -> f64 {
    if distance_km <= 0.0 {
        return 1.0;
    }
    (1.0 - distance_km / ceiling_km).clamp(0.0, 1.0)
}

pub fn normalize_plate_zone(zone: PlateZone) -> f64 {
    match zone {
        PlateZone::Stable => 0.1,
        PlateZone::Boundary => 0.6,
        PlateZone::Subduction => 1.0,
        PlateZone::Unrecognized(code) => {
            log::warn!(
                "Unrecognized plate zone code {}; using default risk {}",
                code,
                UNKNOWN_PLATE_ZONE_RISK
            );
            UNKNOWN_PLATE_ZONE_RISK
        }
    }
}

/// Missing density contributes nothing.
pub fn normalize_population_density(density: Option<f64>) -> f64 {
    density.map_or(0.0, |d| (d / POPULATION_CEILING).clamp(0.0, 1.0))
}

/// Every factor mapped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFactors {
    pub magnitude: f64,
    pub depth: f64,
    pub intensity: f64,
    pub frequency: f64,
    pub fault_distance: f64,
    pub volcano_distance: f64,
    pub plate_zone: f64,
    pub population_density: f64,
}

impl NormalizedFactors {
    pub fn from_factors(factors: &RiskFactors) -> Self {
        Self {
            magnitude: normalize_magnitude(factors.magnitude),
            depth: normalize_depth(factors.depth),
            intensity: normalize_intensity(factors.intensity),
            frequency: normalize_frequency(factors.frequency),
            fault_distance: normalize_fault_distance(factors.fault_distance_km),
            volcano_distance: normalize_volcano_distance(factors.volcano_distance_km),
            plate_zone: normalize_plate_zone(factors.plate_zone),
            population_density: normalize_population_density(factors.population_density),
        }
    }
}

/// Named weight table selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightTable {
    /// Magnitude, depth, intensity, frequency, fault, volcano, plate zone.
    #[default]
    SevenFactor,
    /// The seven factors plus population density.
    EightFactor,
    /// Caller-supplied weights; must sum to 1.0.
    Custom(RiskWeights),
}

impl WeightTable {
    pub fn weights(&self) -> RiskWeights {
        match self {
            WeightTable::SevenFactor => RiskWeights::seven_factor(),
            WeightTable::EightFactor => RiskWeights::eight_factor(),
            WeightTable::Custom(weights) => *weights,
        }
    }
}

/// Per-factor weights. Scores stay in `[0, 100]` only while these sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskWeights {
    pub magnitude: f64,
    pub depth: f64,
    pub intensity: f64,
    pub frequency: f64,
    pub fault_distance: f64,
    pub volcano_distance: f64,
    pub plate_zone: f64,
    #[serde(default)]
    pub population_density: f64,
}

impl RiskWeights {
    /// Default table: `{0.25, 0.10, 0.20, 0.15, 0.15, 0.10, 0.05}`, no population.
    pub const fn seven_factor() -> Self {
        Self {
            magnitude: 0.25,
            depth: 0.10,
            intensity: 0.20,
            frequency: 0.15,
            fault_distance: 0.15,
            volcano_distance: 0.10,
            plate_zone: 0.05,
            population_density: 0.0,
        }
    }

    /// Population-aware table: `{0.20, 0.10, 0.15, 0.13, 0.14, 0.10, 0.08, 0.10}`.
    pub const fn eight_factor() -> Self {
        Self {
            magnitude: 0.20,
            depth: 0.10,
            intensity: 0.15,
            frequency: 0.13,
            fault_distance: 0.14,
            volcano_distance: 0.10,
            plate_zone: 0.08,
            population_density: 0.10,
        }
    }

    fn as_array(&self) -> [f64; 8] {
        [
            self.magnitude,
            self.depth,
            self.intensity,
            self.frequency,
            self.fault_distance,
            self.volcano_distance,
            self.plate_zone,
            self.population_density,
        ]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// Weights must be finite, non-negative and sum to 1.0.
    pub fn validate(&self) -> Result<()> {
        if self.as_array().iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(QuakeError::InvalidConfig(format!(
                "Risk weights must be finite and non-negative: {:?}",
                self
            )));
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(QuakeError::InvalidConfig(format!(
                "Risk weights must sum to 1.0, got {}",
                sum
            )));
        }

        Ok(())
    }

    /// Weighted sum of normalized factors scaled to `[0, 100]`.
    pub fn weighted_score(&self, n: &NormalizedFactors) -> f64 {
        let sum = self.magnitude * n.magnitude
            + self.depth * n.depth
            + self.intensity * n.intensity
            + self.frequency * n.frequency
            + self.fault_distance * n.fault_distance
            + self.volcano_distance * n.volcano_distance
            + self.plate_zone * n.plate_zone
            + self.population_density * n.population_density;
        // Absorbs rounding past 100 on all-maximal inputs.
        (sum * 100.0).clamp(0.0, 100.0)
    }

    pub fn score(&self, factors: &RiskFactors) -> RiskScore {
        score_risk(factors, self)
    }
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self::seven_factor()
    }
}

/// Composite score and its classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    /// In `[0, 100]`.
    pub score: f64,
    pub level: RiskLevel,
}

impl RiskScore {
    pub fn from_score(score: f64) -> Self {
        Self {
            score,
            level: RiskLevel::from_score(score),
        }
    }
}

/// Score one event.
pub fn score_risk(factors: &RiskFactors, weights: &RiskWeights) -> RiskScore {
    let normalized = NormalizedFactors::from_factors(factors);
    RiskScore::from_score(weights.weighted_score(&normalized))
}
