// Re-export key components
pub use crate::error::{Error, Warning};
pub use crate::pipeline::{
    PipelineConfig, PipelineOutput, extract_street_points, process_segments,
};

// Data model
pub use crate::model::{
    GeocodedPlace, MergedStreet, Place, PlaceQuery, PointTable, SampledPoint, RoadClass,
    StreetSegment,
};

// Stages and collaborators
pub use crate::processing::{BufferRadii, BufferedRegion, HeadingStrategy};
pub use crate::projection::{Crs, Hemisphere, Projection, UtmZone};
pub use crate::sources::{Geocoder, NetworkRequest, NetworkType, StreetNetworkSource};
