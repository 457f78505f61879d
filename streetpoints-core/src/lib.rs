//! Evenly spaced, oriented sample points along the streets of a place.
//!
//! The crate covers the geometric core: buffering a place boundary,
//! filtering and merging street segments, arc-length sampling in UTM meters
//! and heading computation. Geocoding and street network retrieval are
//! consumed through the traits in [`sources`].

pub mod error;
pub mod model;
pub mod pipeline;
pub mod prelude;
pub mod processing;
pub mod projection;
pub mod sources;

pub use error::{Error, Warning};
pub use model::{
    GeocodedPlace, MergedStreet, Place, PlaceQuery, PointTable, PointTableBuilder, RoadClass,
    SampledPoint, StreetSegment,
};
pub use pipeline::{PipelineConfig, PipelineOutput, extract_street_points, process_segments};
