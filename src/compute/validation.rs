//! Validation for geographic coordinates and query geometry.
//!
//! The index types panic on malformed geometry; these helpers let callers
//! holding untrusted input reject it with a [`QuakeError`] instead.

use crate::error::{QuakeError, Result};
use quakezone_types::point::GeoCoord;
use quakezone_types::rect::Rectangle;
use quakezone_types::risk::RiskFactors;

/// Validates latitude in [-90, 90] and longitude in [-180, 180].
///
/// # Examples
///
/// ```
/// use quakezone::compute::validation::validate_geo_coord;
/// use quakezone::GeoCoord;
///
/// assert!(validate_geo_coord(&GeoCoord::new(-7.0, 110.0)).is_ok());
/// assert!(validate_geo_coord(&GeoCoord::new(95.0, 110.0)).is_err());
/// ```
pub fn validate_geo_coord(coord: &GeoCoord) -> Result<()> {
    let (lat, lon) = (coord.lat, coord.lon);

    if !lat.is_finite() {
        return Err(QuakeError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            lat
        )));
    }

    if !lon.is_finite() {
        return Err(QuakeError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            lon
        )));
    }

    if !(-90.0..=90.0).contains(&lat) {
        return Err(QuakeError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            lat
        )));
    }

    if !(-180.0..=180.0).contains(&lon) {
        return Err(QuakeError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            lon
        )));
    }

    Ok(())
}

/// Validates every coordinate, reporting the index of the first bad one.
pub fn validate_coords(coords: &[GeoCoord]) -> Result<()> {
    for (idx, coord) in coords.iter().enumerate() {
        validate_geo_coord(coord)
            .map_err(|e| QuakeError::InvalidInput(format!("Coordinate at index {}: {}", idx, e)))?;
    }
    Ok(())
}

/// Radius must be finite and non-negative.
pub fn validate_radius(radius: f64) -> Result<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(QuakeError::InvalidInput(format!(
            "Radius must be finite and non-negative, got: {}",
            radius
        )));
    }
    Ok(())
}

/// Rectangle must have a finite center and finite, non-negative half extents.
pub fn validate_rectangle(rect: &Rectangle) -> Result<()> {
    if ![rect.cx, rect.cy, rect.half_width, rect.half_height]
        .iter()
        .all(|v| v.is_finite())
    {
        return Err(QuakeError::InvalidInput(format!(
            "Rectangle values must be finite: {:?}",
            rect
        )));
    }

    if rect.half_width < 0.0 || rect.half_height < 0.0 {
        return Err(QuakeError::InvalidInput(format!(
            "Rectangle half extents must be non-negative: ({}, {})",
            rect.half_width, rect.half_height
        )));
    }

    Ok(())
}

/// All numeric risk factors must be finite. Population density may be absent.
pub fn validate_factors(factors: &RiskFactors) -> Result<()> {
    let named = [
        ("magnitude", factors.magnitude),
        ("depth", factors.depth),
        ("intensity", factors.intensity),
        ("frequency", factors.frequency),
        ("fault_distance_km", factors.fault_distance_km),
        ("volcano_distance_km", factors.volcano_distance_km),
    ];

    for (name, value) in named {
        if !value.is_finite() {
            return Err(QuakeError::InvalidInput(format!(
                "Risk factor {} must be finite, got: {}",
                name, value
            )));
        }
    }

    if let Some(density) = factors.population_density
        && !density.is_finite()
    {
        return Err(QuakeError::InvalidInput(format!(
            "Population density must be finite, got: {}",
            density
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quakezone_types::risk::PlateZone;

    #[test]
    fn test_coord_bounds() {
        assert!(validate_geo_coord(&GeoCoord::new(90.0, 180.0)).is_ok());
        assert!(validate_geo_coord(&GeoCoord::new(-90.0, -180.0)).is_ok());
        assert!(validate_geo_coord(&GeoCoord::new(0.0, 180.5)).is_err());
        assert!(validate_geo_coord(&GeoCoord::new(f64::NAN, 0.0)).is_err());
    }

    #[test]
    fn test_coords_reports_index() {
        let coords = vec![GeoCoord::new(-7.0, 110.0), GeoCoord::new(-7.0, 999.0)];
        let err = validate_coords(&coords).unwrap_err().to_string();
        assert!(err.contains("index 1"), "{}", err);
    }

    #[test]
    fn test_radius() {
        assert!(validate_radius(0.0).is_ok());
        assert!(validate_radius(2.5).is_ok());
        assert!(validate_radius(-1.0).is_err());
        assert!(validate_radius(f64::INFINITY).is_err());
    }

    #[test]
    fn test_rectangle() {
        assert!(validate_rectangle(&Rectangle::new(0.0, 0.0, 1.0, 1.0)).is_ok());
        let bad = Rectangle {
            cx: 0.0,
            cy: 0.0,
            half_width: -1.0,
            half_height: 1.0,
        };
        assert!(validate_rectangle(&bad).is_err());
        let nan = Rectangle {
            cx: f64::NAN,
            ..Rectangle::new(0.0, 0.0, 1.0, 1.0)
        };
        assert!(validate_rectangle(&nan).is_err());
    }

    #[test]
    fn test_factors() {
        let ok = RiskFactors::new(5.0, 10.0, 6.0, 2.0, 30.0, 40.0, PlateZone::Boundary);
        assert!(validate_factors(&ok).is_ok());
        assert!(validate_factors(&ok.with_population_density(f64::NAN)).is_err());

        let bad = RiskFactors {
            depth: f64::NAN,
            ..ok
        };
        let err = validate_factors(&bad).unwrap_err().to_string();
        assert!(err.contains("depth"));
    }
}
