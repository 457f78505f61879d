use geo::Coord;
use log::{info, warn};
use rayon::prelude::*;

use super::PipelineConfig;
use crate::model::{MergedStreet, Place, PointTable, PointTableBuilder};
use crate::processing::{
    BufferedRegion, build_region, compute_headings, filter_segments, merge_streets,
    sample_street,
};
use crate::projection::Projection;
use crate::sources::{Geocoder, NetworkRequest, StreetNetworkSource};
use crate::{Error, StreetSegment, Warning};

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub place: Place,
    pub region: BufferedRegion,
    pub table: PointTable,
    /// Non-fatal conditions met along the way, each also logged
    pub warnings: Vec<Warning>,
}

/// Runs the whole pipeline for `config.place`.
///
/// Collaborator failures are returned as-is; nothing is retried here.
///
/// # Errors
///
/// Returns an error for invalid configuration, unknown places, projection
/// problems and unavailable collaborators
pub fn extract_street_points<G, N>(
    config: &PipelineConfig,
    geocoder: &G,
    network: &N,
) -> Result<PipelineOutput, Error>
where
    G: Geocoder + ?Sized,
    N: StreetNetworkSource + ?Sized,
{
    config.validate()?;
    let query = config.place_query()?;

    info!("Resolving place: {query}");
    let geocoded = geocoder.geocode(&query)?;
    let place = Place::new(geocoded.name.clone(), geocoded.centroid)?;
    info!(
        "Resolved '{}' at ({:.6}, {:.6}), metric CRS {} (UTM {})",
        place.name(),
        place.centroid().x(),
        place.centroid().y(),
        place.metric_crs(),
        place.zone()
    );

    let projection = place.projection();
    let region = build_region(&geocoded.boundary, &projection, config.buffers)?;

    info!(
        "Fetching {} network (retain_all={})",
        config.network_type, config.retain_all
    );
    let request = NetworkRequest {
        polygon: region.large.clone(),
        network_type: config.network_type,
        retain_all: config.retain_all,
    };
    let segments = network.fetch_segments(&request)?;
    info!("Network source returned {} segments", segments.len());

    let (table, warnings) = process_segments(config, &projection, &region, segments);

    Ok(PipelineOutput {
        place,
        region,
        table,
        warnings,
    })
}

/// Filter, merge, sample and orient already fetched segments.
pub fn process_segments(
    config: &PipelineConfig,
    projection: &Projection,
    region: &BufferedRegion,
    segments: Vec<StreetSegment>,
) -> (PointTable, Vec<Warning>) {
    let allowed = config.allowed_set();
    let filtered = filter_segments(segments, &allowed, &region.small, config.dedup_epsilon_deg);

    if filtered.is_empty() {
        warn!("{}", Warning::EmptyNetwork);
        return (PointTableBuilder::new().finish(), vec![Warning::EmptyNetwork]);
    }

    let (streets, warnings) = merge_streets(filtered, projection, config.merge_tolerance_m);

    let sampled: Vec<StreetSamples> = streets
        .par_iter()
        .map(|street| StreetSamples::compute(street, projection, config))
        .collect();

    let total: usize = sampled.iter().map(|s| s.metric.len()).sum();
    let mut builder = PointTableBuilder::with_capacity(total);
    for (street, samples) in streets.iter().zip(sampled) {
        builder.push_street(
            &street.id,
            street.name.as_deref(),
            &street.class,
            samples
                .metric
                .into_iter()
                .zip(samples.geographic)
                .zip(samples.headings)
                .map(|((metric, geographic), heading)| (metric, geographic, heading)),
        );
    }
    let table = builder.finish();

    info!(
        "Sampled {} points on {} streets every {} m",
        table.len(),
        table.street_count(),
        config.sampling_distance
    );
    (table, warnings)
}

/// Flattened samples of one street, all three vectors the same length
struct StreetSamples {
    metric: Vec<Coord<f64>>,
    geographic: Vec<Coord<f64>>,
    headings: Vec<f64>,
}

impl StreetSamples {
    fn compute(street: &MergedStreet, projection: &Projection, config: &PipelineConfig) -> Self {
        let metric_parts = sample_street(street, config.sampling_distance);
        let geographic_parts: Vec<Vec<Coord<f64>>> = metric_parts
            .iter()
            .map(|part| part.iter().map(|c| projection.inverse(*c)).collect())
            .collect();
        let headings = compute_headings(&metric_parts, &geographic_parts, config.heading);

        Self {
            metric: metric_parts.into_iter().flatten().collect(),
            geographic: geographic_parts.into_iter().flatten().collect(),
            headings,
        }
    }
}
