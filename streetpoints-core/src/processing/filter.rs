//! Road class and area filtering, then duplicate removal

use geo::{Intersects, LineString, MultiPolygon, Point, Relate};
use hashbrown::HashSet;
use log::{debug, info};
use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::model::{RoadClass, StreetSegment};

type StartPoint = GeomWithData<[f64; 2], usize>;

/// Keeps segments whose class is allowed and that touch `small`, then drops
/// repeated geometries.
///
/// Two segments are duplicates when they have the same number of vertices
/// and every vertex pair differs by at most `epsilon` on both axes. The
/// first occurrence wins.
pub fn filter_segments(
    segments: Vec<StreetSegment>,
    allowed: &HashSet<RoadClass>,
    small: &MultiPolygon<f64>,
    epsilon: f64,
) -> Vec<StreetSegment> {
    let total = segments.len();

    let in_scope: Vec<StreetSegment> = segments
        .into_iter()
        .filter(|segment| allowed.contains(&segment.class))
        .filter(|segment| touches_region(&segment.geometry, small))
        .collect();

    let filtered = in_scope.len();
    let kept = dedup_geometries(in_scope, epsilon);

    info!(
        "Filtered street segments: {total} fetched, {filtered} in scope, {} after removing duplicates",
        kept.len()
    );
    kept
}

fn touches_region(line: &LineString<f64>, region: &MultiPolygon<f64>) -> bool {
    match line.0.as_slice() {
        [] => false,
        // zero-length street
        [first, rest @ ..] if rest.iter().all(|c| c == first) => {
            Point::from(*first).intersects(region)
        }
        _ => line.intersects(region) || line.relate(region).is_within(),
    }
}

fn dedup_geometries(segments: Vec<StreetSegment>, epsilon: f64) -> Vec<StreetSegment> {
    let mut starts: RTree<StartPoint> = RTree::new();
    let mut kept: Vec<StreetSegment> = Vec::with_capacity(segments.len());

    for segment in segments {
        let Some(first) = segment.geometry.0.first() else {
            continue;
        };
        let query = [first.x, first.y];

        // Squared radius covering the per-axis epsilon box
        let radius_2 = 2.0 * epsilon * epsilon;
        let duplicate = starts
            .locate_within_distance(query, radius_2)
            .any(|candidate| same_geometry(&kept[candidate.data].geometry, &segment.geometry, epsilon));

        if duplicate {
            debug!("Dropping duplicate geometry of street {}", segment.id);
            continue;
        }

        starts.insert(StartPoint::new(query, kept.len()));
        kept.push(segment);
    }

    kept
}

fn same_geometry(a: &LineString<f64>, b: &LineString<f64>, epsilon: f64) -> bool {
    a.0.len() == b.0.len()
        && a
            .coords()
            .zip(b.coords())
            .all(|(p, q)| (p.x - q.x).abs() <= epsilon && (p.y - q.y).abs() <= epsilon)
}
