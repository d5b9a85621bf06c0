//! Risk zoning pipeline.
//!
//! Records flow through the engine in one direction:
//!
//! 1. fault and volcano distances from the two [`NearestFeatureIndex`]es,
//! 2. a [`RiskScore`] from the active weight table,
//! 3. insertion into a [`QuadTree`] keyed by (lon, lat) with the scored
//!    event as payload,
//!
//! after which the resulting [`RiskMap`] answers range and radius queries.
//!
//! ```rust
//! use quakezone::{EarthquakeRecord, GeoCoord, RiskZoner, Rectangle};
//!
//! let zoner = RiskZoner::builder()
//!     .faults(vec![GeoCoord::new(-7.0, 110.0)])
//!     .volcanoes(vec![GeoCoord::new(-7.54, 110.44)])
//!     .build()?;
//!
//! let records = vec![
//!     EarthquakeRecord::new(-7.9, 110.4, 6.3, 10.0, 8.0, 5.0, 2),
//!     EarthquakeRecord::new(-6.9, 107.6, 4.1, 60.0, 4.0, 2.0, 1),
//! ];
//! let map = zoner.zone(&records)?;
//! assert_eq!(map.len(), 2);
//!
//! let near_yogya = map.query_radius(110.4, -7.9, 0.5)?;
//! assert_eq!(near_yogya.len(), 1);
//! # Ok::<(), quakezone::QuakeError>(())
//! ```

use crate::builder::ZonerBuilder;
use crate::compute::distance::euclidean_distance;
use crate::compute::nearest::{FeatureKind, NearestFeatureIndex};
use crate::compute::quadtree::QuadTree;
use crate::compute::risk::{RiskScore, RiskWeights, score_risk};
use crate::compute::validation::{
    validate_factors, validate_geo_coord, validate_radius, validate_rectangle,
};
use crate::config::Config;
use crate::error::{QuakeError, Result};
use geo::{BoundingRect, MultiPoint, Point};
use quakezone_types::point::{GeoCoord, IndexedPoint};
use quakezone_types::rect::Rectangle;
use quakezone_types::risk::{PlateZone, RiskFactors, RiskLevel};
use serde::{Deserialize, Serialize};

/// Smallest half extent of a derived root boundary, so a single event (or
/// events on one meridian) still gets an insertable region.
const MIN_HALF_EXTENT: f64 = 1e-6;

/// One earthquake as delivered by an external loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarthquakeRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub magnitude: f64,
    /// Kilometers
    pub depth: f64,
    /// Modified Mercalli (1-12)
    pub intensity: f64,
    /// Events per year in the area
    pub frequency: f64,
    /// 0 = stable, 1 = boundary, 2 = subduction
    pub plate_zone: i64,
    #[serde(default)]
    pub population_density: Option<f64>,
    #[serde(default)]
    pub region_name: Option<String>,
}

impl EarthquakeRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        latitude: f64,
        longitude: f64,
        magnitude: f64,
        depth: f64,
        intensity: f64,
        frequency: f64,
        plate_zone: i64,
    ) -> Self {
        Self {
            latitude,
            longitude,
            magnitude,
            depth,
            intensity,
            frequency,
            plate_zone,
            population_density: None,
            region_name: None,
        }
    }

    pub fn with_population_density(mut self, density: f64) -> Self {
        self.population_density = Some(density);
        self
    }

    pub fn with_region_name(mut self, name: impl Into<String>) -> Self {
        self.region_name = Some(name.into());
        self
    }

    pub fn coord(&self) -> GeoCoord {
        GeoCoord::new(self.latitude, self.longitude)
    }

    /// Risk factors for this record at the given feature distances.
    pub fn factors_with(&self, fault_distance_km: f64, volcano_distance_km: f64) -> RiskFactors {
        RiskFactors {
            magnitude: self.magnitude,
            depth: self.depth,
            intensity: self.intensity,
            frequency: self.frequency,
            fault_distance_km,
            volcano_distance_km,
            plate_zone: PlateZone::from_code(self.plate_zone),
            population_density: self.population_density,
        }
    }
}

/// A scored record; this is the payload stored in the quadtree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredEvent {
    /// Position of the record in the input slice
    pub index: usize,
    pub latitude: f64,
    pub longitude: f64,
    pub magnitude: f64,
    pub fault_distance_km: f64,
    pub volcano_distance_km: f64,
    pub risk: RiskScore,
}

impl ScoredEvent {
    #[inline]
    pub fn score(&self) -> f64 {
        self.risk.score
    }

    #[inline]
    pub fn level(&self) -> RiskLevel {
        self.risk.level
    }
}

/// Scores records against fixed fault and volcano reference sets.
#[derive(Debug, Clone)]
pub struct RiskZoner {
    config: Config,
    weights: RiskWeights,
    faults: NearestFeatureIndex,
    volcanoes: NearestFeatureIndex,
}

impl RiskZoner {
    pub fn builder() -> ZonerBuilder {
        ZonerBuilder::new()
    }

    /// Validate `config` and build both feature indexes.
    pub fn new(config: Config, faults: Vec<GeoCoord>, volcanoes: Vec<GeoCoord>) -> Result<Self> {
        config.validate()?;

        let faults = NearestFeatureIndex::build(FeatureKind::Fault, faults)?
            .with_fallback_km(config.fault_fallback_km);
        let volcanoes = NearestFeatureIndex::build(FeatureKind::Volcano, volcanoes)?
            .with_fallback_km(config.volcano_fallback_km);

        Ok(Self {
            weights: config.risk_weights(),
            config,
            faults,
            volcanoes,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn weights(&self) -> &RiskWeights {
        &self.weights
    }

    pub fn faults(&self) -> &NearestFeatureIndex {
        &self.faults
    }

    pub fn volcanoes(&self) -> &NearestFeatureIndex {
        &self.volcanoes
    }

    pub fn fault_distance_km(&self, lat: f64, lon: f64) -> f64 {
        self.faults.nearest_distance_km(lat, lon)
    }

    pub fn volcano_distance_km(&self, lat: f64, lon: f64) -> f64 {
        self.volcanoes.nearest_distance_km(lat, lon)
    }

    /// Raw factors for a record, with distances looked up from the indexes.
    pub fn factors_for(&self, record: &EarthquakeRecord) -> RiskFactors {
        record.factors_with(
            self.fault_distance_km(record.latitude, record.longitude),
            self.volcano_distance_km(record.latitude, record.longitude),
        )
    }

    /// Score precomputed factors with the active weights, rejecting non-finite inputs.
    pub fn score_factors(&self, factors: &RiskFactors) -> Result<RiskScore> {
        validate_factors(factors)?;
        Ok(score_risk(factors, &self.weights))
    }

    /// Score a single record. Assumes its coordinates are valid.
    pub fn score_event(&self, index: usize, record: &EarthquakeRecord) -> ScoredEvent {
        let factors = self.factors_for(record);
        ScoredEvent {
            index,
            latitude: record.latitude,
            longitude: record.longitude,
            magnitude: record.magnitude,
            fault_distance_km: factors.fault_distance_km,
            volcano_distance_km: factors.volcano_distance_km,
            risk: score_risk(&factors, &self.weights),
        }
    }

    /// Score every record in input order.
    pub fn score_all(&self, records: &[EarthquakeRecord]) -> Result<Vec<ScoredEvent>> {
        validate_records(records)?;
        Ok(records
            .iter()
            .enumerate()
            .map(|(i, record)| self.score_event(i, record))
            .collect())
    }

    /// Score records on `workers` scoped threads. Output order matches input order.
    pub fn score_all_parallel(
        &self,
        records: &[EarthquakeRecord],
        workers: usize,
    ) -> Result<Vec<ScoredEvent>> {
        validate_records(records)?;

        let workers = workers.max(1);
        if workers == 1 || records.len() < 2 {
            return Ok(self.score_chunk(0, records));
        }

        let chunk_size = records.len().div_ceil(workers);
        let scored = std::thread::scope(|scope| {
            let handles: Vec<_> = records
                .chunks(chunk_size)
                .enumerate()
                .map(|(n, chunk)| scope.spawn(move || self.score_chunk(n * chunk_size, chunk)))
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        });
        Ok(scored)
    }

    fn score_chunk(&self, offset: usize, chunk: &[EarthquakeRecord]) -> Vec<ScoredEvent> {
        chunk
            .iter()
            .enumerate()
            .map(|(i, record)| self.score_event(offset + i, record))
            .collect()
    }

    /// Index scored events in a quadtree whose root covers their padded extent.
    pub fn build_quadtree(&self, events: &[ScoredEvent]) -> Result<QuadTree<ScoredEvent>> {
        let boundary = derive_bounds(events, self.config.bounds_padding).ok_or_else(|| {
            QuakeError::InvalidInput("Cannot derive quadtree bounds from zero events".to_string())
        })?;
        self.build_quadtree_within(boundary, events)
    }

    /// Index scored events under an explicit root boundary. Events outside it are skipped.
    pub fn build_quadtree_within(
        &self,
        boundary: Rectangle,
        events: &[ScoredEvent],
    ) -> Result<QuadTree<ScoredEvent>> {
        validate_rectangle(&boundary)?;

        let mut tree = QuadTree::with_max_depth(
            boundary,
            self.config.quadtree_capacity,
            self.config.max_depth,
        );
        let accepted = tree.insert_all(
            events
                .iter()
                .map(|event| IndexedPoint::new(event.longitude, event.latitude, *event)),
        );

        if accepted < events.len() {
            log::warn!(
                "{} of {} events fell outside the quadtree boundary",
                events.len() - accepted,
                events.len()
            );
        }
        log::debug!(
            "Quadtree built with {} nodes over {} events (height {})",
            tree.count_nodes(),
            accepted,
            tree.height()
        );

        Ok(tree)
    }

    /// Score all records and index them.
    pub fn zone(&self, records: &[EarthquakeRecord]) -> Result<RiskMap> {
        let events = self.score_all(records)?;
        let tree = self.build_quadtree(&events)?;
        if tree.len() != events.len() {
            return Err(QuakeError::InvalidInput(format!(
                "Quadtree indexed {} of {} events",
                tree.len(),
                events.len()
            )));
        }
        Ok(RiskMap { events, tree })
    }
}

fn validate_records(records: &[EarthquakeRecord]) -> Result<()> {
    for (idx, record) in records.iter().enumerate() {
        validate_geo_coord(&record.coord())
            .and_then(|()| validate_factors(&record.factors_with(0.0, 0.0)))
            .map_err(|e| QuakeError::InvalidInput(format!("Record at index {}: {}", idx, e)))?;
    }
    Ok(())
}

/// Root boundary covering all events: the midpoint of the lon/lat extents,
/// with half extents scaled by `padding`. `None` when `events` is empty.
///
/// Every event satisfies [`Rectangle::contains`] on the result, including
/// the extremes when `padding` is 1.0.
pub fn derive_bounds(events: &[ScoredEvent], padding: f64) -> Option<Rectangle> {
    let extent = MultiPoint::from(
        events
            .iter()
            .map(|e| Point::new(e.longitude, e.latitude))
            .collect::<Vec<_>>(),
    )
    .bounding_rect()?;
    let data = Rectangle::from_rect(extent);

    let half_width = cover(
        data.cx,
        (data.half_width * padding).max(MIN_HALF_EXTENT),
        extent.min().x,
        extent.max().x,
    );
    let half_height = cover(
        data.cy,
        (data.half_height * padding).max(MIN_HALF_EXTENT),
        extent.min().y,
        extent.max().y,
    );
    Some(Rectangle::new(data.cx, data.cy, half_width, half_height))
}

/// Widen `half` until `center - half <= lo` and `center + half >= hi` hold
/// in floating point.
fn cover(center: f64, mut half: f64, lo: f64, hi: f64) -> f64 {
    let mut slack = f64::EPSILON * center.abs().max(lo.abs()).max(hi.abs()).max(f64::MIN_POSITIVE);
    while center - half > lo || center + half < hi {
        half += slack;
        slack *= 2.0;
    }
    half
}

/// Indices of events within planar `radius` (degrees) of `(lon, lat)`, by
/// scanning every event. Baseline for checking and benchmarking the quadtree.
pub fn linear_radius_search(events: &[ScoredEvent], lon: f64, lat: f64, radius: f64) -> Vec<usize> {
    events
        .iter()
        .filter(|e| euclidean_distance(lon, lat, e.longitude, e.latitude) <= radius)
        .map(|e| e.index)
        .collect()
}

/// Scored events together with their quadtree.
#[derive(Debug, Clone)]
pub struct RiskMap {
    events: Vec<ScoredEvent>,
    tree: QuadTree<ScoredEvent>,
}

impl RiskMap {
    /// Events in input order.
    pub fn events(&self) -> &[ScoredEvent] {
        &self.events
    }

    pub fn tree(&self) -> &QuadTree<ScoredEvent> {
        &self.tree
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn count_nodes(&self) -> usize {
        self.tree.count_nodes()
    }

    /// Events inside a lon/lat rectangle.
    pub fn query_range(&self, range: &Rectangle) -> Result<Vec<&ScoredEvent>> {
        validate_rectangle(range)?;
        Ok(self.tree.query(range).into_iter().map(|p| &p.payload).collect())
    }

    /// Events within planar `radius` degrees of `(lon, lat)`.
    pub fn query_radius(&self, lon: f64, lat: f64, radius: f64) -> Result<Vec<&ScoredEvent>> {
        validate_radius(radius)?;
        Ok(self
            .tree
            .query_radius(lon, lat, radius)
            .into_iter()
            .map(|p| &p.payload)
            .collect())
    }

    pub fn linear_radius_search(&self, lon: f64, lat: f64, radius: f64) -> Vec<usize> {
        linear_radius_search(&self.events, lon, lat, radius)
    }

    /// Events at or above `level`.
    pub fn at_least(&self, level: RiskLevel) -> impl Iterator<Item = &ScoredEvent> {
        self.events.iter().filter(move |e| e.level() >= level)
    }

    pub fn summary(&self) -> Option<RiskSummary> {
        RiskSummary::from_events(&self.events)
    }
}

/// Score statistics over a set of events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Counts in [`RiskLevel::ALL`] order
    pub level_counts: [usize; 5],
    pub mean_fault_distance_km: f64,
    pub mean_volcano_distance_km: f64,
}

impl RiskSummary {
    /// `None` for an empty slice.
    pub fn from_events(events: &[ScoredEvent]) -> Option<Self> {
        if events.is_empty() {
            return None;
        }

        let n = events.len() as f64;
        let mut level_counts = [0; 5];
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let (mut total, mut fault_total, mut volcano_total) = (0.0, 0.0, 0.0);

        for e in events {
            total += e.score();
            fault_total += e.fault_distance_km;
            volcano_total += e.volcano_distance_km;
            min = min.min(e.score());
            max = max.max(e.score());
            level_counts[level_slot(e.level())] += 1;
        }

        Some(Self {
            count: events.len(),
            mean: total / n,
            min,
            max,
            level_counts,
            mean_fault_distance_km: fault_total / n,
            mean_volcano_distance_km: volcano_total / n,
        })
    }

    pub fn count_at(&self, level: RiskLevel) -> usize {
        self.level_counts[level_slot(level)]
    }
}

fn level_slot(level: RiskLevel) -> usize {
    match level {
        RiskLevel::VeryLow => 0,
        RiskLevel::Low => 1,
        RiskLevel::Moderate => 2,
        RiskLevel::High => 3,
        RiskLevel::VeryHigh => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::risk::WeightTable;

    fn zoner() -> RiskZoner {
        RiskZoner::new(
            Config::default(),
            vec![GeoCoord::new(-7.0, 110.0), GeoCoord::new(-8.0, 111.0)],
            vec![GeoCoord::new(-7.54, 110.44)],
        )
        .unwrap()
    }

    fn records() -> Vec<EarthquakeRecord> {
        vec![
            EarthquakeRecord::new(-7.0, 110.0, 7.5, 5.0, 10.0, 10.0, 2),
            EarthquakeRecord::new(-6.2, 106.8, 3.0, 100.0, 2.0, 1.0, 0),
            EarthquakeRecord::new(-7.8, 110.4, 5.5, 30.0, 6.0, 4.0, 1),
            EarthquakeRecord::new(-8.3, 112.6, 4.8, 45.0, 5.0, 3.0, 9),
        ]
    }

    #[test]
    fn test_factors_use_index_distances() {
        let z = zoner();
        let f = z.factors_for(&records()[0]);
        assert!(f.fault_distance_km < 1.0);
        assert!(f.volcano_distance_km > 50.0 && f.volcano_distance_km < 100.0);
        assert_eq!(f.plate_zone, PlateZone::Subduction);
    }

    #[test]
    fn test_empty_feature_sets_use_fallbacks() {
        let z = RiskZoner::new(Config::default(), Vec::new(), Vec::new()).unwrap();
        let e = z.score_event(0, &records()[0]);
        assert_eq!(e.fault_distance_km, 200.0);
        assert_eq!(e.volcano_distance_km, 150.0);
    }

    #[test]
    fn test_score_all_keeps_order() {
        let events = zoner().score_all(&records()).unwrap();
        let indices: Vec<_> = events.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert!(events[0].score() > events[1].score());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let z = zoner();
        let many: Vec<_> = records().into_iter().cycle().take(103).collect();
        let sequential = z.score_all(&many).unwrap();
        for workers in [0, 1, 3, 8, 200] {
            assert_eq!(z.score_all_parallel(&many, workers).unwrap(), sequential);
        }
    }

    #[test]
    fn test_invalid_record_rejected() {
        let mut bad = records();
        bad[2].latitude = 123.0;
        let err = zoner().score_all(&bad).unwrap_err().to_string();
        assert!(err.contains("index 2"), "{}", err);

        let mut nan = records();
        nan[1].magnitude = f64::NAN;
        let err = zoner().zone(&nan).unwrap_err().to_string();
        assert!(err.contains("index 1") && err.contains("magnitude"), "{}", err);
    }

    #[test]
    fn test_score_factors_checks_input() {
        let z = zoner();
        let factors = records()[0].factors_with(5.0, 5.0);
        let risk = z.score_factors(&factors).unwrap();
        assert!(risk.score > 70.0);

        let bad = RiskFactors {
            fault_distance_km: f64::INFINITY,
            ..factors
        };
        assert!(matches!(z.score_factors(&bad), Err(QuakeError::InvalidInput(_))));
    }

    #[test]
    fn test_derive_bounds_pads_extent() {
        let events = zoner().score_all(&records()).unwrap();
        let b = derive_bounds(&events, 1.2).unwrap();
        for e in &events {
            assert!(b.contains(e.longitude, e.latitude));
        }
        assert!((b.half_width - (112.6 - 106.8) / 2.0 * 1.2).abs() < 1e-9);
        assert!(derive_bounds(&[], 1.2).is_none());
    }

    #[test]
    fn test_single_event_bounds_are_insertable() {
        let events = zoner().score_all(&records()[..1]).unwrap();
        let tree = zoner().build_quadtree(&events).unwrap();
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_unpadded_bounds_keep_extreme_events() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let z = RiskZoner::new(
            Config::default().with_bounds_padding(1.0),
            Vec::new(),
            Vec::new(),
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..2_000 {
            let records: Vec<_> = (0..10)
                .map(|_| {
                    EarthquakeRecord::new(
                        rng.gen_range(-11.0..6.0),
                        rng.gen_range(95.0..141.0),
                        5.0,
                        10.0,
                        6.0,
                        2.0,
                        1,
                    )
                })
                .collect();

            let map = z.zone(&records).unwrap();
            assert_eq!(map.tree().len(), records.len());
            let root = map.tree().boundary();
            for e in map.events() {
                assert!(root.contains(e.longitude, e.latitude));
            }
        }
    }

    #[test]
    fn test_zone_empty_records_is_error() {
        assert!(zoner().zone(&[]).is_err());
    }

    #[test]
    fn test_quadtree_matches_linear_search() {
        let map = zoner().zone(&records()).unwrap();
        for radius in [0.1, 0.5, 1.0, 3.0, 10.0] {
            let mut fast: Vec<_> = map
                .query_radius(110.0, -7.5, radius)
                .unwrap()
                .iter()
                .map(|e| e.index)
                .collect();
            fast.sort_unstable();
            let mut slow = map.linear_radius_search(110.0, -7.5, radius);
            slow.sort_unstable();
            assert_eq!(fast, slow, "radius {}", radius);
        }
    }

    #[test]
    fn test_query_rejects_bad_geometry() {
        let map = zoner().zone(&records()).unwrap();
        assert!(map.query_radius(110.0, -7.0, -1.0).is_err());
        let bad = Rectangle {
            cx: 0.0,
            cy: 0.0,
            half_width: f64::NAN,
            half_height: 1.0,
        };
        assert!(map.query_range(&bad).is_err());
    }

    #[test]
    fn test_summary() {
        let map = zoner().zone(&records()).unwrap();
        let summary = map.summary().unwrap();
        assert_eq!(summary.count, 4);
        assert!(summary.min <= summary.mean && summary.mean <= summary.max);
        assert_eq!(summary.level_counts.iter().sum::<usize>(), 4);
        let high = map.at_least(RiskLevel::High).count();
        assert_eq!(
            high,
            summary.count_at(RiskLevel::High) + summary.count_at(RiskLevel::VeryHigh)
        );
        assert!(RiskSummary::from_events(&[]).is_none());
    }

    #[test]
    fn test_eight_factor_uses_population() {
        let config = Config::default().with_weights(WeightTable::EightFactor);
        let z = RiskZoner::new(config, Vec::new(), Vec::new()).unwrap();
        let plain = EarthquakeRecord::new(-7.0, 110.0, 5.0, 10.0, 5.0, 5.0, 1);
        let dense = plain.clone().with_population_density(40_000.0);
        assert!(z.score_event(0, &dense).score() > z.score_event(0, &plain).score());
    }
}
