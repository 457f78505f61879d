use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::model::{PlaceQuery, RoadClass};
use crate::processing::{BufferRadii, HeadingStrategy};
use crate::projection::Crs;
use crate::sources::NetworkType;

/// Smallest accepted sampling distance, meters
pub const MIN_SAMPLING_DISTANCE_M: f64 = 0.01;

/// Everything a pipeline run needs besides its collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Free-text place name or `R<relation id>`
    pub place: String,
    pub buffers: BufferRadii,
    /// Distance between consecutive samples, meters
    pub sampling_distance: f64,
    pub allowed_classes: Vec<RoadClass>,
    /// CRS of the collaborator geometries; only WGS84 is accepted
    pub source_crs: String,
    pub network_type: NetworkType,
    pub retain_all: bool,
    pub heading: HeadingStrategy,
    /// Endpoint distance under which segments of a street are joined, meters
    pub merge_tolerance_m: f64,
    /// Per-axis tolerance for duplicate geometries, degrees
    pub dedup_epsilon_deg: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            place: "Hampstead, Urban agglomeration of Montreal, Montreal (administrative region), Quebec, Canada".to_string(),
            buffers: BufferRadii::default(),
            sampling_distance: 1.0,
            allowed_classes: vec![
                RoadClass::Residential,
                RoadClass::Tertiary,
                RoadClass::Secondary,
                RoadClass::Primary,
                RoadClass::Unclassified,
            ],
            source_crs: "EPSG:4326".to_string(),
            network_type: NetworkType::Drive,
            retain_all: true,
            heading: HeadingStrategy::Compass,
            merge_tolerance_m: 0.01,
            dedup_epsilon_deg: 1e-9,
        }
    }
}

impl PipelineConfig {
    /// Checks every invariant the pipeline relies on.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] for bad values, [`Error::ProjectionError`]
    /// for an unusable source CRS
    pub fn validate(&self) -> Result<(), Error> {
        self.place_query()?;
        self.buffers.validate()?;

        if !(self.sampling_distance.is_finite()
            && self.sampling_distance >= MIN_SAMPLING_DISTANCE_M)
        {
            return Err(Error::InvalidConfig(format!(
                "sampling distance must be at least {MIN_SAMPLING_DISTANCE_M} m, got {}",
                self.sampling_distance
            )));
        }
        if self.allowed_classes.is_empty() {
            return Err(Error::InvalidConfig(
                "allow-list of road classes is empty".to_string(),
            ));
        }
        if !(self.merge_tolerance_m.is_finite() && self.merge_tolerance_m >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "merge tolerance must be non-negative, got {}",
                self.merge_tolerance_m
            )));
        }
        if !(self.dedup_epsilon_deg.is_finite() && self.dedup_epsilon_deg >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "dedup epsilon must be non-negative, got {}",
                self.dedup_epsilon_deg
            )));
        }
        if let HeadingStrategy::Planar { rotation_deg } = self.heading
            && !rotation_deg.is_finite()
        {
            return Err(Error::InvalidConfig(
                "planar heading rotation must be finite".to_string(),
            ));
        }

        let source: Crs = self.source_crs.parse()?;
        if source != Crs::Wgs84 {
            return Err(Error::ProjectionError(format!(
                "source CRS must be EPSG:4326, got {source}"
            )));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// [`Error::InvalidConfig`] for an empty identifier
    pub fn place_query(&self) -> Result<PlaceQuery, Error> {
        self.place.parse()
    }

    pub fn allowed_set(&self) -> HashSet<RoadClass> {
        self.allowed_classes.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.buffers.large, 200.0);
        assert_eq!(config.buffers.small, 5.0);
        assert_eq!(config.allowed_set().len(), 5);
    }

    #[test]
    fn rejects_bad_values() {
        let base = PipelineConfig::default();

        let spacing = PipelineConfig {
            sampling_distance: 0.0,
            ..base.clone()
        };
        assert!(matches!(spacing.validate(), Err(Error::InvalidConfig(_))));

        let tiny_spacing = PipelineConfig {
            sampling_distance: 1e-300,
            ..base.clone()
        };
        assert!(matches!(tiny_spacing.validate(), Err(Error::InvalidConfig(_))));

        let smallest = PipelineConfig {
            sampling_distance: MIN_SAMPLING_DISTANCE_M,
            ..base.clone()
        };
        smallest.validate().unwrap();

        let classes = PipelineConfig {
            allowed_classes: vec![],
            ..base.clone()
        };
        assert!(matches!(classes.validate(), Err(Error::InvalidConfig(_))));

        let radii = PipelineConfig {
            buffers: BufferRadii {
                large: 5.0,
                small: 5.0,
            },
            ..base.clone()
        };
        assert!(matches!(radii.validate(), Err(Error::InvalidConfig(_))));

        let place = PipelineConfig {
            place: "  ".to_string(),
            ..base.clone()
        };
        assert!(matches!(place.validate(), Err(Error::InvalidConfig(_))));

        let rotation = PipelineConfig {
            heading: HeadingStrategy::Planar {
                rotation_deg: f64::NAN,
            },
            ..base.clone()
        };
        assert!(matches!(rotation.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_non_geographic_source_crs() {
        let utm = PipelineConfig {
            source_crs: "EPSG:32618".to_string(),
            ..PipelineConfig::default()
        };
        assert!(matches!(utm.validate(), Err(Error::ProjectionError(_))));

        let unknown = PipelineConfig {
            source_crs: "EPSG:3857".to_string(),
            ..PipelineConfig::default()
        };
        assert!(matches!(unknown.validate(), Err(Error::ProjectionError(_))));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{"place": "R8508277", "sampling_distance": 5.0, "heading": {"kind": "planar", "rotation_deg": 180.0}}"#,
        )
        .unwrap();
        assert_eq!(config.place_query().unwrap(), PlaceQuery::Relation(8_508_277));
        assert_eq!(config.sampling_distance, 5.0);
        assert_eq!(config.heading, HeadingStrategy::Planar { rotation_deg: 180.0 });
        assert!(config.retain_all);
        assert_eq!(config.network_type, NetworkType::Drive);
    }
}
