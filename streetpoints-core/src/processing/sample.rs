//! Uniform arc-length sampling of metric lines

use geo::{Coord, LineString};

use crate::model::MergedStreet;

/// Euclidean length of a coordinate sequence
pub fn line_length(coords: &[Coord<f64>]) -> f64 {
    coords
        .windows(2)
        .map(|pair| (pair[1].x - pair[0].x).hypot(pair[1].y - pair[0].y))
        .sum()
}

/// Positions closer than this to the end of a line count as lying on it.
///
/// Projected lengths carry rounding noise well below a micrometre, so a
/// nominal 70 m line may measure 70.000000001 m.
pub const LENGTH_TOLERANCE_M: f64 = 1e-6;

/// Number of positions `0, S, 2S, ...` strictly below `length` (within
/// [`LENGTH_TOLERANCE_M`]), at least one
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sample_count(length: f64, spacing: f64) -> usize {
    let effective = length - LENGTH_TOLERANCE_M;
    if !(effective > 0.0 && effective.is_finite() && spacing > 0.0) {
        return 1;
    }
    // saturating cast; the pipeline bounds the spacing from below
    ((effective / spacing).floor() + 1.0) as usize
}

/// Samples a metric line every `spacing` meters starting at its first vertex.
///
/// Coordinates are interpolated linearly within the segment that contains
/// each arc-length position. An empty line yields no samples, a single
/// vertex (or zero length line) yields exactly one. One sample is produced
/// per `spacing`, so `spacing` should respect
/// [`MIN_SAMPLING_DISTANCE_M`](crate::pipeline::MIN_SAMPLING_DISTANCE_M).
#[allow(clippy::cast_precision_loss)]
pub fn sample_line(line: &LineString<f64>, spacing: f64) -> Vec<Coord<f64>> {
    let Some(&start) = line.0.first() else {
        return Vec::new();
    };

    let length = line_length(&line.0);
    let count = sample_count(length, spacing);
    let mut samples = vec![start];

    let mut segments = line.lines().filter(|l| l.dx() != 0.0 || l.dy() != 0.0);
    let mut current = segments.next();
    // arc length at the start of `current`
    let mut travelled = 0.0;

    for k in 1..count {
        let position = k as f64 * spacing;
        while let Some(segment) = current {
            let segment_length = segment.dx().hypot(segment.dy());
            if position <= travelled + segment_length {
                let t = (position - travelled) / segment_length;
                samples.push(Coord {
                    x: segment.start.x + segment.dx() * t,
                    y: segment.start.y + segment.dy() * t,
                });
                break;
            }
            travelled += segment_length;
            current = segments.next();
        }
        if current.is_none() {
            // Rounding pushed the position past the last vertex
            if let Some(&end) = line.0.last() {
                samples.push(end);
            }
            break;
        }
    }

    samples
}

/// Samples every part of a street independently; indices are assigned later
/// across the concatenation of the returned parts.
pub fn sample_street(street: &MergedStreet, spacing: f64) -> Vec<Vec<Coord<f64>>> {
    street
        .geometry
        .iter()
        .map(|part| sample_line(part, spacing))
        .filter(|samples| !samples.is_empty())
        .collect()
}
