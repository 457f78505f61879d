//! Place identifiers and resolved places

use std::fmt;
use std::str::FromStr;

use geo::{Geometry, Point};

use crate::Error;
use crate::projection::{Crs, Projection, UtmZone};

/// How a place is identified to the geocoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceQuery {
    /// Free-text search, e.g. "Hampstead, Quebec, Canada"
    Name(String),
    /// OSM administrative relation id
    Relation(u64),
}

impl FromStr for PlaceQuery {
    type Err = Error;

    /// `R123` and `relation/123` select a relation, anything else is a name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidConfig("place identifier is empty".to_string()));
        }

        let relation = trimmed
            .strip_prefix("relation/")
            .or_else(|| trimmed.strip_prefix('R'))
            .and_then(|id| id.parse::<u64>().ok());

        Ok(match relation {
            Some(id) => PlaceQuery::Relation(id),
            None => PlaceQuery::Name(trimmed.to_string()),
        })
    }
}

impl fmt::Display for PlaceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceQuery::Name(name) => f.write_str(name),
            PlaceQuery::Relation(id) => write!(f, "R{id}"),
        }
    }
}

/// Geocoder answer: representative point and boundary geometry (WGS84).
///
/// The boundary is usually a (multi)polygon but places mapped as nodes or
/// ways come back as points or lines; all of them can be buffered.
#[derive(Debug, Clone)]
pub struct GeocodedPlace {
    pub name: String,
    pub centroid: Point<f64>,
    pub boundary: Geometry<f64>,
}

/// A resolved place with its metric projection choice
#[derive(Debug, Clone)]
pub struct Place {
    name: String,
    centroid: Point<f64>,
    zone: UtmZone,
}

impl Place {
    /// # Errors
    ///
    /// Returns [`Error::ProjectionError`] if no UTM zone fits the centroid
    pub fn new(name: impl Into<String>, centroid: Point<f64>) -> Result<Self, Error> {
        let zone = UtmZone::from_lon_lat(centroid.x(), centroid.y())?;
        Ok(Self {
            name: name.into(),
            centroid,
            zone,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn centroid(&self) -> Point<f64> {
        self.centroid
    }

    pub fn zone(&self) -> UtmZone {
        self.zone
    }

    /// EPSG:326xx in the northern hemisphere, EPSG:327xx in the southern
    pub fn metric_crs(&self) -> Crs {
        Crs::Utm(self.zone)
    }

    pub fn projection(&self) -> Projection {
        Projection::new(self.zone)
    }
}
