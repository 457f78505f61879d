//! Geometric stages of the pipeline, in the order they run

pub mod filter;
pub mod heading;
pub mod merge;
pub mod region;
pub mod sample;

pub use filter::filter_segments;
pub use heading::{HeadingStrategy, compute_headings};
pub use merge::merge_streets;
pub use region::{BufferRadii, BufferedRegion, build_region};
pub use sample::{sample_line, sample_street};
