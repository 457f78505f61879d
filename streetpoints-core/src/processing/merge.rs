//! Grouping segments by street id and chaining them into lines

use geo::{Coord, LineString, MultiLineString};
use hashbrown::HashMap;
use log::{debug, info, warn};

use crate::model::{MergedStreet, RoadClass, StreetSegment};
use crate::projection::Projection;
use crate::Warning;

struct StreetGroup {
    id: String,
    name: Option<String>,
    class: RoadClass,
    lines: Vec<Vec<Coord<f64>>>,
}

/// Groups segments by id (first-seen order), projects them to meters and
/// chains each group into as few lines as possible.
///
/// Name and class come from the first segment of each id. Groups that do
/// not chain into one line keep all their sub-lines and produce a
/// [`Warning::MergeAmbiguity`].
pub fn merge_streets(
    segments: Vec<StreetSegment>,
    projection: &Projection,
    tolerance: f64,
) -> (Vec<MergedStreet>, Vec<Warning>) {
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<StreetGroup> = Vec::new();

    for segment in segments {
        if segment.geometry.0.is_empty() {
            debug!("Skipping empty geometry of street {}", segment.id);
            continue;
        }
        let metric: Vec<Coord<f64>> = segment
            .geometry
            .coords()
            .map(|c| projection.forward(*c))
            .collect();

        match group_index.get(&segment.id) {
            Some(&idx) => groups[idx].lines.push(metric),
            None => {
                group_index.insert(segment.id.clone(), groups.len());
                groups.push(StreetGroup {
                    id: segment.id,
                    name: segment.name,
                    class: segment.class,
                    lines: vec![metric],
                });
            }
        }
    }

    let mut warnings = Vec::new();
    let merged: Vec<MergedStreet> = groups
        .into_iter()
        .map(|group| {
            let parts = chain_lines(group.lines, tolerance);
            if parts.len() > 1 {
                warn!(
                    "Street {} does not merge into a single line, keeping {} sub-lines",
                    group.id,
                    parts.len()
                );
                warnings.push(Warning::MergeAmbiguity {
                    street_id: group.id.clone(),
                    parts: parts.len(),
                });
            }
            MergedStreet {
                id: group.id,
                name: group.name,
                class: group.class,
                geometry: MultiLineString::new(parts.into_iter().map(LineString::new).collect()),
            }
        })
        .collect();

    info!("Merged street segments into {} streets", merged.len());
    (merged, warnings)
}

fn close(a: Coord<f64>, b: Coord<f64>, tolerance: f64) -> bool {
    (a.x - b.x).hypot(a.y - b.y) <= tolerance
}

fn is_reverse_of(a: &[Coord<f64>], b: &[Coord<f64>], tolerance: f64) -> bool {
    a.len() == b.len()
        && a.len() > 1
        && a.iter()
            .zip(b.iter().rev())
            .all(|(p, q)| close(*p, *q, tolerance))
}

/// Undirected line merge: lines are joined end to end wherever endpoints
/// coincide within `tolerance`, reversing them when needed. The joining
/// vertex is kept once.
pub(crate) fn chain_lines(lines: Vec<Vec<Coord<f64>>>, tolerance: f64) -> Vec<Vec<Coord<f64>>> {
    // A two-way edge and its reverse describe the same centreline
    let mut remaining: Vec<Option<Vec<Coord<f64>>>> = Vec::with_capacity(lines.len());
    for line in lines {
        let twin = remaining
            .iter()
            .flatten()
            .any(|kept| is_reverse_of(kept, &line, tolerance));
        if !twin {
            remaining.push(Some(line));
        }
    }

    let mut parts = Vec::new();
    while let Some(mut chain) = remaining.iter_mut().find_map(Option::take) {
        // extend at the tail
        while let Some(tail) = chain.last().copied() {
            let Some(next) = take_touching(&mut remaining, tail, tolerance) else {
                break;
            };
            chain.extend(next.into_iter().skip(1));
        }
        // extend at the head
        while let Some(head) = chain.first().copied() {
            let Some(mut previous) = take_touching(&mut remaining, head, tolerance) else {
                break;
            };
            previous.reverse();
            previous.pop();
            previous.extend(chain);
            chain = previous;
        }
        parts.push(chain);
    }
    parts
}

/// Removes the first line with an endpoint at `at` and returns it oriented
/// to start there.
fn take_touching(
    remaining: &mut [Option<Vec<Coord<f64>>>],
    at: Coord<f64>,
    tolerance: f64,
) -> Option<Vec<Coord<f64>>> {
    let slot = remaining.iter_mut().find(|slot| {
        slot.as_ref().is_some_and(|line| {
            line.first().is_some_and(|c| close(*c, at, tolerance))
                || line.last().is_some_and(|c| close(*c, at, tolerance))
        })
    })?;
    let mut line = slot.take()?;
    if !line.first().is_some_and(|c| close(*c, at, tolerance)) {
        line.reverse();
    }
    Some(line)
}
