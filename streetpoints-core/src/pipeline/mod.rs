//! The end-to-end pipeline: place -> regions -> segments -> points.

mod config;
mod run;

pub use config::{MIN_SAMPLING_DISTANCE_M, PipelineConfig};
pub use run::{PipelineOutput, extract_street_points, process_segments};
