use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use streetpoints_core::Error;
use streetpoints_core::processing::HeadingStrategy;
use streetpoints_core::sources::NetworkType;

use crate::config::{AppConfig, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HeadingArg {
    Compass,
    Planar,
}

#[derive(Parser, Debug)]
#[command(
    name = "streetpoints",
    version,
    about = "Sample evenly spaced points with headings along the streets of a place"
)]
pub struct Cli {
    /// Place name, or an OSM relation as `R<id>` / `relation/<id>`
    pub place: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Distance between samples in meters
    #[arg(long)]
    pub spacing: Option<f64>,

    /// Network search buffer in meters
    #[arg(long)]
    pub large_buffer: Option<f64>,

    /// Street inclusion buffer in meters
    #[arg(long)]
    pub small_buffer: Option<f64>,

    /// drive, drive_service, walk, bike or all
    #[arg(long)]
    pub network_type: Option<NetworkType>,

    /// Keep only the largest connected part of the network
    #[arg(long)]
    pub largest_component: bool,

    #[arg(long, value_enum)]
    pub heading: Option<HeadingArg>,

    /// Rotation added to planar headings, degrees; needs a planar heading from
    /// `--heading planar` or the configuration file
    #[arg(long, allow_negative_numbers = true)]
    pub rotation: Option<f64>,

    /// More logging (-v debug, -vv trace); overrides RUST_LOG
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Overlays the flags that were given onto `config`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] for `--rotation` when headings end up compass
    pub fn apply(&self, config: &mut AppConfig) -> Result<(), Error> {
        let pipeline = &mut config.pipeline;
        if let Some(place) = &self.place {
            pipeline.place.clone_from(place);
        }
        if let Some(spacing) = self.spacing {
            pipeline.sampling_distance = spacing;
        }
        if let Some(large) = self.large_buffer {
            pipeline.buffers.large = large;
        }
        if let Some(small) = self.small_buffer {
            pipeline.buffers.small = small;
        }
        if let Some(network_type) = self.network_type {
            pipeline.network_type = network_type;
        }
        if self.largest_component {
            pipeline.retain_all = false;
        }
        match self.heading {
            Some(HeadingArg::Compass) => pipeline.heading = HeadingStrategy::Compass,
            Some(HeadingArg::Planar) => {
                if pipeline.heading == HeadingStrategy::Compass {
                    pipeline.heading = HeadingStrategy::Planar { rotation_deg: 0.0 };
                }
            }
            None => {}
        }
        if let Some(rotation) = self.rotation {
            let HeadingStrategy::Planar { rotation_deg } = &mut pipeline.heading else {
                return Err(Error::InvalidConfig(
                    "--rotation only applies to planar headings".to_string(),
                ));
            };
            *rotation_deg = rotation;
        }

        if let Some(path) = &self.output {
            config.output.path.clone_from(path);
        }
        if self.format.is_some() {
            config.output.format = self.format;
        }
        Ok(())
    }

    pub fn log_level(&self) -> Option<&'static str> {
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}
