//! Coordinate reference systems and the geographic <-> metric transform
//! used by every stage that crosses between the two.

mod utm;

use std::fmt;
use std::str::FromStr;

use geo::{Coord, MapCoords};

pub use utm::{Hemisphere, TransverseMercator, UtmZone};

use crate::Error;

pub const WGS84_EPSG: u32 = 4326;

/// Coordinate reference systems the pipeline understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
    /// WGS84 longitude / latitude in degrees
    Wgs84,
    /// WGS84 / UTM, meters
    Utm(UtmZone),
}

impl Crs {
    /// # Errors
    ///
    /// Returns [`Error::ProjectionError`] for codes other than 4326 and the
    /// 326xx / 327xx UTM families
    pub fn from_epsg(code: u32) -> Result<Self, Error> {
        match code {
            WGS84_EPSG => Ok(Crs::Wgs84),
            32601..=32660 => Ok(Crs::Utm(UtmZone::new(
                u8::try_from(code - 32600).map_err(|e| Error::ProjectionError(e.to_string()))?,
                Hemisphere::North,
            )?)),
            32701..=32760 => Ok(Crs::Utm(UtmZone::new(
                u8::try_from(code - 32700).map_err(|e| Error::ProjectionError(e.to_string()))?,
                Hemisphere::South,
            )?)),
            _ => Err(Error::ProjectionError(format!(
                "unsupported CRS EPSG:{code}"
            ))),
        }
    }

    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => WGS84_EPSG,
            Crs::Utm(zone) => zone.epsg(),
        }
    }
}

impl FromStr for Crs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s
            .trim()
            .strip_prefix("EPSG:")
            .or_else(|| s.trim().strip_prefix("epsg:"))
            .unwrap_or(s.trim());
        let code = code
            .parse::<u32>()
            .map_err(|_| Error::ProjectionError(format!("invalid CRS identifier '{s}'")))?;
        Self::from_epsg(code)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// Stateless transform between WGS84 and one UTM zone.
///
/// Cheap to clone; the series coefficients are computed once in [`Projection::new`].
#[derive(Debug, Clone)]
pub struct Projection {
    tm: TransverseMercator,
}

impl Projection {
    pub fn new(zone: UtmZone) -> Self {
        Self {
            tm: TransverseMercator::new(zone),
        }
    }

    pub fn zone(&self) -> UtmZone {
        self.tm.zone()
    }

    pub fn metric_crs(&self) -> Crs {
        Crs::Utm(self.tm.zone())
    }

    /// (lon, lat) -> (x, y) meters
    pub fn forward(&self, coord: Coord<f64>) -> Coord<f64> {
        self.tm.forward(coord)
    }

    /// (x, y) meters -> (lon, lat)
    pub fn inverse(&self, coord: Coord<f64>) -> Coord<f64> {
        self.tm.inverse(coord)
    }

    /// Projects any geo geometry from WGS84 into the metric CRS
    pub fn to_metric<G>(&self, geometry: &G) -> G::Output
    where
        G: MapCoords<f64, f64>,
    {
        geometry.map_coords(|c| self.tm.forward(c))
    }

    /// Projects any geo geometry from the metric CRS back to WGS84
    pub fn to_geographic<G>(&self, geometry: &G) -> G::Output
    where
        G: MapCoords<f64, f64>,
    {
        geometry.map_coords(|c| self.tm.inverse(c))
    }
}
