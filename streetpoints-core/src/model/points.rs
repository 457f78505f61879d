//! Sampled points and the output table

use std::io::Write;

use geo::{Coord, Point};
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde::Serialize;
use serde_json::json;

use super::street::RoadClass;
use crate::Error;

/// One output record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampledPoint {
    pub street_id: String,
    pub index: usize,
    pub name: Option<String>,
    pub class: RoadClass,
    pub x_m: f64,
    pub y_m: f64,
    pub heading_deg: f64,
    pub lon: f64,
    pub lat: f64,
}

/// Accumulates points street by street and finalizes into a [`PointTable`].
///
/// Indices are assigned here, so every street gets exactly `0..n`.
#[derive(Debug, Default)]
pub struct PointTableBuilder {
    points: Vec<SampledPoint>,
    streets: usize,
}

impl PointTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(points: usize) -> Self {
        Self {
            points: Vec::with_capacity(points),
            streets: 0,
        }
    }

    /// Appends all samples of one street in order.
    ///
    /// Each sample is `(metric, geographic, heading_deg)`.
    pub fn push_street<I>(&mut self, id: &str, name: Option<&str>, class: &RoadClass, samples: I)
    where
        I: IntoIterator<Item = (Coord<f64>, Coord<f64>, f64)>,
    {
        let before = self.points.len();
        self.points.extend(samples.into_iter().enumerate().map(
            |(index, (metric, geographic, heading_deg))| SampledPoint {
                street_id: id.to_string(),
                index,
                name: name.map(str::to_string),
                class: class.clone(),
                x_m: metric.x,
                y_m: metric.y,
                heading_deg,
                lon: geographic.x,
                lat: geographic.y,
            },
        ));
        if self.points.len() > before {
            self.streets += 1;
        }
    }

    pub fn finish(mut self) -> PointTable {
        self.points.shrink_to_fit();
        PointTable {
            points: self.points,
            streets: self.streets,
        }
    }
}

/// Finalized, immutable output table.
///
/// Records are grouped by street in processing order with ascending index.
#[derive(Debug, Clone, Default)]
pub struct PointTable {
    points: Vec<SampledPoint>,
    streets: usize,
}

impl PointTable {
    pub fn points(&self) -> &[SampledPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn street_count(&self) -> usize {
        self.streets
    }

    /// Points of one street, in index order
    pub fn street(&self, id: &str) -> impl Iterator<Item = &SampledPoint> {
        self.points.iter().filter(move |p| p.street_id == id)
    }

    /// Writes the table as CSV with a header row
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying writer fails
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        if self.points.is_empty() {
            csv_writer.write_record([
                "street_id",
                "index",
                "name",
                "class",
                "x_m",
                "y_m",
                "heading_deg",
                "lon",
                "lat",
            ])?;
        }
        for point in &self.points {
            csv_writer.serialize(point)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Converts the table to a `GeoJSON` `FeatureCollection` of WGS84 points.
    ///
    /// # Errors
    ///
    /// [`Error::GeoJsonError`] if a record does not form a valid feature
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let features = self
            .points
            .iter()
            .map(point_feature)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    /// # Errors
    ///
    /// Returns an error if serialization or the underlying writer fails
    pub fn write_geojson<W: Write>(&self, writer: W) -> Result<(), Error> {
        serde_json::to_writer(writer, &self.to_geojson()?)?;
        Ok(())
    }
}

fn point_feature(point: &SampledPoint) -> Result<Feature, Error> {
    let geometry = Geometry::new(GeoJsonValue::from(&Point::new(point.lon, point.lat)));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "street_id": point.street_id,
            "index": point.index,
            "name": point.name,
            "class": point.class,
            "x_m": point.x_m,
            "y_m": point.y_m,
            "heading_deg": point.heading_deg,
        }
    });

    Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}
