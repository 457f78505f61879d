//! Collaborator boundaries: geocoding and street network retrieval.
//!
//! The pipeline only consumes these contracts. Adapters (HTTP clients, files,
//! in-memory fixtures) live with the caller.

mod components;

use std::fmt;
use std::str::FromStr;

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

pub use components::retain_largest_component;

use crate::Error;
use crate::model::{GeocodedPlace, PlaceQuery, StreetSegment};

/// Resolves a place identifier into a centroid and boundary
pub trait Geocoder {
    /// # Errors
    ///
    /// [`Error::PlaceNotFound`] when nothing matches,
    /// [`Error::CollaboratorUnavailable`] on transport failures and timeouts
    fn geocode(&self, query: &PlaceQuery) -> Result<GeocodedPlace, Error>;
}

/// Supplies street graph edges for an area
pub trait StreetNetworkSource {
    /// Returns the edges intersecting `request.polygon`.
    ///
    /// # Errors
    ///
    /// [`Error::CollaboratorUnavailable`] on transport failures and timeouts
    fn fetch_segments(&self, request: &NetworkRequest) -> Result<Vec<StreetSegment>, Error>;
}

/// Street network flavour, following the usual OSM network definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    #[default]
    Drive,
    DriveService,
    Walk,
    Bike,
    All,
}

impl FromStr for NetworkType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drive" => Ok(NetworkType::Drive),
            "drive_service" => Ok(NetworkType::DriveService),
            "walk" => Ok(NetworkType::Walk),
            "bike" => Ok(NetworkType::Bike),
            "all" => Ok(NetworkType::All),
            other => Err(Error::InvalidConfig(format!("unknown network type '{other}'"))),
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NetworkType::Drive => "drive",
            NetworkType::DriveService => "drive_service",
            NetworkType::Walk => "walk",
            NetworkType::Bike => "bike",
            NetworkType::All => "all",
        })
    }
}

/// What the pipeline asks a [`StreetNetworkSource`] for
#[derive(Debug, Clone)]
pub struct NetworkRequest {
    /// Search area in WGS84
    pub polygon: MultiPolygon<f64>,
    pub network_type: NetworkType,
    /// Keep disconnected sub-networks instead of only the largest component
    pub retain_all: bool,
}
