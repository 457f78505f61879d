//! Direction of travel for sampled points
//!
//! Two strategies are available and they are deliberately not equivalent:
//! `Compass` measures the great-circle bearing from true north on WGS84
//! coordinates, `Planar` measures the angle of the step in the metric grid
//! (counter-clockwise from grid east) plus a configurable rotation. Away from
//! a zone's central meridian grid north and true north diverge, so the two
//! disagree by more than the rotation alone.

use geo::Coord;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Heading formula, chosen in configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeadingStrategy {
    /// Initial great-circle bearing, clockwise from true north, in [0, 360)
    #[default]
    Compass,
    /// `atan2(dy, dx)` in the metric CRS plus `rotation_deg`, in [0, 360)
    Planar { rotation_deg: f64 },
}

fn normalize(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Initial bearing from `from` to `to`, both (lon, lat) in degrees
pub fn compass_bearing(from: Coord<f64>, to: Coord<f64>) -> f64 {
    let lat1 = from.y.to_radians();
    let lat2 = to.y.to_radians();
    let delta_lon = (to.x - from.x).to_radians();

    let x = delta_lon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    normalize(x.atan2(y).to_degrees())
}

/// Grid angle of the step `from -> to` plus `rotation_deg`
pub fn planar_bearing(from: Coord<f64>, to: Coord<f64>, rotation_deg: f64) -> f64 {
    normalize((to.y - from.y).atan2(to.x - from.x).to_degrees() + rotation_deg)
}

/// Headings of one continuous run of samples.
///
/// Point `i >= 1` takes the bearing of the step `i-1 -> i`; point 0 copies
/// point 1. Returns `None` for a single point.
fn run_headings(metric: &[Coord<f64>], geographic: &[Coord<f64>], strategy: HeadingStrategy) -> Option<Vec<f64>> {
    if metric.len() < 2 {
        return None;
    }

    let steps: Vec<f64> = match strategy {
        HeadingStrategy::Compass => geographic
            .iter()
            .tuple_windows()
            .map(|(a, b)| compass_bearing(*a, *b))
            .collect(),
        HeadingStrategy::Planar { rotation_deg } => metric
            .iter()
            .tuple_windows()
            .map(|(a, b)| planar_bearing(*a, *b, rotation_deg))
            .collect(),
    };

    let mut headings = Vec::with_capacity(metric.len());
    headings.push(steps[0]);
    headings.extend(steps);
    Some(headings)
}

/// Headings for all samples of one street, flattened across its parts.
///
/// `metric` and `geographic` hold the same samples per part. Parts are
/// handled independently so no bearing spans the gap between two parts. A
/// single-sample part copies the nearest heading after it, else before it,
/// else gets 0.
pub fn compute_headings(
    metric: &[Vec<Coord<f64>>],
    geographic: &[Vec<Coord<f64>>],
    strategy: HeadingStrategy,
) -> Vec<f64> {
    let mut slots: Vec<Option<f64>> = Vec::new();
    for (metric_part, geographic_part) in metric.iter().zip(geographic) {
        match run_headings(metric_part, geographic_part, strategy) {
            Some(headings) => slots.extend(headings.into_iter().map(Some)),
            None => slots.extend(std::iter::repeat_n(None, metric_part.len())),
        }
    }

    (0..slots.len())
        .map(|i| {
            slots[i]
                .or_else(|| slots[i + 1..].iter().find_map(|h| *h))
                .or_else(|| slots[..i].iter().rev().find_map(|h| *h))
                .unwrap_or(0.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn compass_cardinal_directions() {
        let origin = c(0.0, 0.0);
        assert!((compass_bearing(origin, c(0.0, 1.0)) - 0.0).abs() < 1e-9);
        assert!((compass_bearing(origin, c(1.0, 0.0)) - 90.0).abs() < 1e-9);
        assert!((compass_bearing(origin, c(0.0, -1.0)) - 180.0).abs() < 1e-9);
        assert!((compass_bearing(origin, c(-1.0, 0.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn compass_bearing_is_in_range() {
        for (from, to) in [
            (c(-73.6, 45.5), c(-73.6 - 1e-6, 45.5 + 1e-9)),
            (c(179.9, -10.0), c(-179.9, -10.0)),
            (c(10.0, 10.0), c(10.0, 10.0)),
        ] {
            let bearing = compass_bearing(from, to);
            assert!((0.0..360.0).contains(&bearing), "{bearing}");
        }
    }

    #[test]
    fn planar_applies_rotation() {
        let origin = c(0.0, 0.0);
        assert!((planar_bearing(origin, c(1.0, 0.0), 0.0) - 0.0).abs() < 1e-12);
        assert!((planar_bearing(origin, c(0.0, 1.0), 0.0) - 90.0).abs() < 1e-12);
        assert!((planar_bearing(origin, c(1.0, 0.0), 180.0) - 180.0).abs() < 1e-12);
        assert!((planar_bearing(origin, c(-1.0, 0.0), 180.0) - 0.0).abs() < 1e-12);
        assert!((planar_bearing(origin, c(0.0, -1.0), 90.0) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn first_heading_duplicates_second() {
        let metric = vec![vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 1.0)]];
        let strategy = HeadingStrategy::Planar { rotation_deg: 0.0 };
        let headings = compute_headings(&metric, &metric, strategy);
        assert_eq!(headings.len(), 4);
        assert_eq!(headings[0], headings[1]);
        assert!((headings[1] - 0.0).abs() < 1e-12);
        assert!((headings[2] - 90.0).abs() < 1e-12);
        assert!((headings[3] - 180.0).abs() < 1e-12);
    }

    #[test]
    fn single_point_gets_zero() {
        let metric = vec![vec![c(5.0, 5.0)]];
        assert_eq!(
            compute_headings(&metric, &metric, HeadingStrategy::Compass),
            vec![0.0]
        );
    }

    #[test]
    fn parts_do_not_share_a_step() {
        let metric = vec![
            vec![c(0.0, 0.0), c(1.0, 0.0)],
            vec![c(100.0, 100.0), c(100.0, 101.0)],
        ];
        let headings =
            compute_headings(&metric, &metric, HeadingStrategy::Planar { rotation_deg: 0.0 });
        assert_eq!(headings.len(), 4);
        assert!((headings[1] - 0.0).abs() < 1e-12);
        assert!((headings[2] - 90.0).abs() < 1e-12);
        assert_eq!(headings[2], headings[3]);
    }

    #[test]
    fn single_point_part_copies_neighbour() {
        let metric = vec![
            vec![c(0.0, 0.0)],
            vec![c(10.0, 0.0), c(10.0, 1.0), c(10.0, 2.0)],
            vec![c(50.0, 0.0)],
        ];
        let headings =
            compute_headings(&metric, &metric, HeadingStrategy::Planar { rotation_deg: 0.0 });
        assert_eq!(headings.len(), 5);
        assert_eq!(headings[0], headings[1]);
        assert_eq!(headings[4], headings[3]);
    }

    #[test]
    fn strategy_deserializes_from_tagged_table() {
        let compass: HeadingStrategy = serde_json::from_str(r#"{"kind":"compass"}"#).unwrap();
        assert_eq!(compass, HeadingStrategy::Compass);
        let planar: HeadingStrategy =
            serde_json::from_str(r#"{"kind":"planar","rotation_deg":180.0}"#).unwrap();
        assert_eq!(planar, HeadingStrategy::Planar { rotation_deg: 180.0 });
    }
}
