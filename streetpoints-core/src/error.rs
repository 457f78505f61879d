use thiserror::Error;

/// Fatal pipeline failures. Any of these aborts the run without partial output.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Place not found: {0}")]
    PlaceNotFound(String),
    #[error("Projection error: {0}")]
    ProjectionError(String),
    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}

/// Conditions that are reported but do not stop the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// No segments survived filtering; the output table is empty.
    EmptyNetwork,
    /// Segments sharing `street_id` could not be chained into one line and
    /// were kept as `parts` separate sub-lines.
    MergeAmbiguity { street_id: String, parts: usize },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::EmptyNetwork => write!(f, "no street segments left after filtering"),
            Warning::MergeAmbiguity { street_id, parts } => write!(
                f,
                "street {street_id} does not merge into a single line, kept {parts} sub-lines"
            ),
        }
    }
}
