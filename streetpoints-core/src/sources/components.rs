//! Connected components over segment endpoints

use geo::Coord;
use hashbrown::HashMap;
use petgraph::unionfind::UnionFind;

use crate::model::StreetSegment;

/// Keeps only the segments of the largest connected component.
///
/// Two segments are connected when they share an endpoint coordinate
/// (bit-exact, as adapters cut segments at shared OSM nodes). Component size
/// is the number of segments; ties keep the component seen first.
pub fn retain_largest_component(segments: Vec<StreetSegment>) -> Vec<StreetSegment> {
    if segments.len() < 2 {
        return segments;
    }

    let mut node_ids: HashMap<(u64, u64), usize> = HashMap::new();
    let mut endpoints = Vec::with_capacity(segments.len());
    for segment in &segments {
        let (Some(first), Some(last)) = (segment.geometry.0.first(), segment.geometry.0.last())
        else {
            endpoints.push(None);
            continue;
        };
        let mut node_of = |c: &Coord<f64>| {
            let next = node_ids.len();
            *node_ids.entry((c.x.to_bits(), c.y.to_bits())).or_insert(next)
        };
        let start = node_of(first);
        let end = node_of(last);
        endpoints.push(Some((start, end)));
    }

    let mut sets = UnionFind::<usize>::new(node_ids.len());
    for (start, end) in endpoints.iter().flatten() {
        sets.union(*start, *end);
    }

    let mut component_sizes: HashMap<usize, usize> = HashMap::new();
    let mut first_seen: Vec<usize> = Vec::new();
    for (start, _) in endpoints.iter().flatten() {
        let root = sets.find(*start);
        let size = component_sizes.entry(root).or_insert(0);
        if *size == 0 {
            first_seen.push(root);
        }
        *size += 1;
    }

    let Some(largest) = first_seen
        .iter()
        .copied()
        .reduce(|best, root| {
            if component_sizes[&root] > component_sizes[&best] {
                root
            } else {
                best
            }
        })
    else {
        return Vec::new();
    };

    let before = segments.len();
    let kept: Vec<StreetSegment> = segments
        .into_iter()
        .zip(endpoints)
        .filter_map(|(segment, ends)| {
            ends.filter(|(start, _)| sets.find(*start) == largest)
                .map(|_| segment)
        })
        .collect();

    log::debug!(
        "Largest component keeps {} of {before} segments",
        kept.len()
    );
    kept
}
