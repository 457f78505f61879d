mod cli;
mod config;
mod http;
mod nominatim;
mod overpass;

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use streetpoints_core::{Error, PointTable, extract_street_points};
use tempfile::NamedTempFile;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::{AppConfig, OutputConfig, OutputFormat};
use crate::nominatim::NominatimGeocoder;
use crate::overpass::OverpassSource;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config)?;

    let client = http::client(&config.services)?;
    let geocoder = NominatimGeocoder::new(client.clone(), &config.services.nominatim_url);
    let network = OverpassSource::new(
        client,
        &config.services.overpass_url,
        config.services.timeout_secs,
    );

    let started = Instant::now();
    let output = extract_street_points(&config.pipeline, &geocoder, &network)?;
    write_table(&output.table, &config.output)?;

    info!(
        "Projected {} to {}; wrote {} points on {} streets to {} ({} warnings, {:.1}s)",
        output.place.name(),
        output.place.metric_crs(),
        output.table.len(),
        output.table.street_count(),
        config.output.path.display(),
        output.warnings.len(),
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

fn write_table(table: &PointTable, output: &OutputConfig) -> Result<(), Error> {
    let format = output.resolved_format();
    write_atomically(&output.path, |writer| match format {
        OutputFormat::Csv => table.write_csv(writer),
        OutputFormat::Geojson => table.write_geojson(writer),
    })
}

/// Writes into a temporary sibling of `path` and moves it into place only once
/// `write` succeeded; on failure `path` is left as it was.
fn write_atomically<F>(path: &Path, write: F) -> Result<(), Error>
where
    F: FnOnce(&mut dyn Write) -> Result<(), Error>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
