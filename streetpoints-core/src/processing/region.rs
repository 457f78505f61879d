//! Search and inclusion regions around a place boundary

use geo::{BoundingRect, Buffer, Geometry, MultiPolygon, unary_union};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::projection::Projection;

/// Buffer radii in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferRadii {
    /// Street search radius
    pub large: f64,
    /// Street inclusion radius
    pub small: f64,
}

impl Default for BufferRadii {
    fn default() -> Self {
        Self {
            large: 200.0,
            small: 5.0,
        }
    }
}

impl BufferRadii {
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] unless `large > small > 0`
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.small.is_finite() && self.large.is_finite()) || self.small <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "buffer radii must be positive, got large={} small={}",
                self.large, self.small
            )));
        }
        if self.large <= self.small {
            return Err(Error::InvalidConfig(format!(
                "large buffer ({}) must exceed small buffer ({})",
                self.large, self.small
            )));
        }
        Ok(())
    }
}

/// The two WGS84 regions derived from a place boundary
#[derive(Debug, Clone)]
pub struct BufferedRegion {
    /// Area the network source is queried with
    pub large: MultiPolygon<f64>,
    /// Area a street must touch to be kept
    pub small: MultiPolygon<f64>,
}

/// Expands `boundary` (WGS84) by both radii in the metric CRS and projects
/// the results back.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] for invalid radii and
/// [`Error::InvalidData`] for an empty boundary
pub fn build_region(
    boundary: &Geometry<f64>,
    projection: &Projection,
    radii: BufferRadii,
) -> Result<BufferedRegion, Error> {
    radii.validate()?;
    if boundary.bounding_rect().is_none() {
        return Err(Error::InvalidData("place boundary is empty".to_string()));
    }

    let metric_boundary = projection.to_metric(boundary);

    let expand = |radius: f64| {
        let expanded = metric_boundary.buffer(radius);
        let geographic = projection.to_geographic(&expanded);
        unary_union(geographic.iter())
    };

    let large = expand(radii.large);
    let small = expand(radii.small);

    debug!(
        "Buffered boundary into {} large and {} small parts",
        large.0.len(),
        small.0.len()
    );

    Ok(BufferedRegion { large, small })
}
