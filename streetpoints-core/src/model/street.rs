//! Street segments as delivered by the network source, and merged streets

use std::fmt;
use std::str::FromStr;

use geo::{LineString, MultiLineString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// OSM `highway` classification of a street
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoadClass {
    Motorway,
    MotorwayLink,
    Trunk,
    TrunkLink,
    Primary,
    PrimaryLink,
    Secondary,
    SecondaryLink,
    Tertiary,
    TertiaryLink,
    Unclassified,
    Residential,
    LivingStreet,
    Service,
    Road,
    Other(String),
}

impl RoadClass {
    pub fn as_str(&self) -> &str {
        match self {
            RoadClass::Motorway => "motorway",
            RoadClass::MotorwayLink => "motorway_link",
            RoadClass::Trunk => "trunk",
            RoadClass::TrunkLink => "trunk_link",
            RoadClass::Primary => "primary",
            RoadClass::PrimaryLink => "primary_link",
            RoadClass::Secondary => "secondary",
            RoadClass::SecondaryLink => "secondary_link",
            RoadClass::Tertiary => "tertiary",
            RoadClass::TertiaryLink => "tertiary_link",
            RoadClass::Unclassified => "unclassified",
            RoadClass::Residential => "residential",
            RoadClass::LivingStreet => "living_street",
            RoadClass::Service => "service",
            RoadClass::Road => "road",
            RoadClass::Other(tag) => tag,
        }
    }
}

impl FromStr for RoadClass {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "motorway" => RoadClass::Motorway,
            "motorway_link" => RoadClass::MotorwayLink,
            "trunk" => RoadClass::Trunk,
            "trunk_link" => RoadClass::TrunkLink,
            "primary" => RoadClass::Primary,
            "primary_link" => RoadClass::PrimaryLink,
            "secondary" => RoadClass::Secondary,
            "secondary_link" => RoadClass::SecondaryLink,
            "tertiary" => RoadClass::Tertiary,
            "tertiary_link" => RoadClass::TertiaryLink,
            "unclassified" => RoadClass::Unclassified,
            "residential" => RoadClass::Residential,
            "living_street" => RoadClass::LivingStreet,
            "service" => RoadClass::Service,
            "road" => RoadClass::Road,
            other => RoadClass::Other(other.to_string()),
        })
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RoadClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RoadClass {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        let Ok(class) = tag.parse::<RoadClass>();
        Ok(class)
    }
}

/// Street graph edge as returned by a network source (WGS84 geometry)
#[derive(Debug, Clone, PartialEq)]
pub struct StreetSegment {
    /// OSM way id, shared by all edges cut from the same way
    pub id: String,
    pub name: Option<String>,
    pub class: RoadClass,
    pub geometry: LineString<f64>,
}

/// All segments of one street id, chained and projected to meters.
///
/// `geometry` holds one line when the segments chain cleanly and several
/// when they don't.
#[derive(Debug, Clone)]
pub struct MergedStreet {
    pub id: String,
    pub name: Option<String>,
    pub class: RoadClass,
    pub geometry: MultiLineString<f64>,
}

impl MergedStreet {
    pub fn is_split(&self) -> bool {
        self.geometry.0.len() > 1
    }
}
