//! Data model for the street sampling pipeline
//!
//! Every value here is produced once per run and never mutated afterwards.

pub mod place;
pub mod points;
pub mod street;

pub use place::{GeocodedPlace, Place, PlaceQuery};
pub use points::{PointTable, PointTableBuilder, SampledPoint};
pub use street::{MergedStreet, RoadClass, StreetSegment};
