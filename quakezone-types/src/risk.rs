use serde::{Deserialize, Serialize};
use std::fmt;

/// Proximity of an event to tectonic plate boundaries.
///
/// Catalogs encode this as an integer `0..=2`. Codes outside that range are
/// kept as [`PlateZone::Unrecognized`] so scoring can fall back to a neutral
/// value instead of rejecting the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlateZone {
    /// Stable continental interior (code 0)
    Stable,
    /// Plate boundary (code 1)
    Boundary,
    /// Subduction zone (code 2)
    Subduction,
    /// Any other code
    Unrecognized(i64),
}

impl PlateZone {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => PlateZone::Stable,
            1 => PlateZone::Boundary,
            2 => PlateZone::Subduction,
            other => PlateZone::Unrecognized(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            PlateZone::Stable => 0,
            PlateZone::Boundary => 1,
            PlateZone::Subduction => 2,
            PlateZone::Unrecognized(code) => *code,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, PlateZone::Unrecognized(_))
    }
}

impl From<i64> for PlateZone {
    fn from(code: i64) -> Self {
        Self::from_code(code)
    }
}

/// Discrete risk classification derived from a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    /// All levels from lowest to highest.
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::VeryLow,
        RiskLevel::Low,
        RiskLevel::Moderate,
        RiskLevel::High,
        RiskLevel::VeryHigh,
    ];

    /// Classify a score. Lower bounds are inclusive: 80, 60, 40, 20.
    ///
    /// ```
    /// use quakezone_types::risk::RiskLevel;
    ///
    /// assert_eq!(RiskLevel::from_score(80.0), RiskLevel::VeryHigh);
    /// assert_eq!(RiskLevel::from_score(79.99), RiskLevel::High);
    /// assert_eq!(RiskLevel::from_score(0.0), RiskLevel::VeryLow);
    /// ```
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            RiskLevel::VeryHigh
        } else if score >= 60.0 {
            RiskLevel::High
        } else if score >= 40.0 {
            RiskLevel::Moderate
        } else if score >= 20.0 {
            RiskLevel::Low
        } else {
            RiskLevel::VeryLow
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "Very Low",
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw physical and contextual inputs to the risk score.
///
/// Distances are in kilometers, depth in kilometers, intensity on the
/// Modified Mercalli scale (1-12) and frequency in events per year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub magnitude: f64,
    pub depth: f64,
    pub intensity: f64,
    pub frequency: f64,
    pub fault_distance_km: f64,
    pub volcano_distance_km: f64,
    pub plate_zone: PlateZone,
    /// People per km². `None` contributes nothing to the score.
    #[serde(default)]
    pub population_density: Option<f64>,
}

impl RiskFactors {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        magnitude: f64,
        depth: f64,
        intensity: f64,
        frequency: f64,
        fault_distance_km: f64,
        volcano_distance_km: f64,
        plate_zone: PlateZone,
    ) -> Self {
        Self {
            magnitude,
            depth,
            intensity,
            frequency,
            fault_distance_km,
            volcano_distance_km,
            plate_zone,
            population_density: None,
        }
    }

    pub fn with_population_density(mut self, density: f64) -> Self {
        self.population_density = Some(density);
        self
    }
}
