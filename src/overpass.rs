//! Street network download from an Overpass API endpoint

use std::fmt::Write as _;

use geo::{Coord, LineString, MultiPolygon};
use hashbrown::HashMap;
use reqwest::blocking::Client;
use serde::Deserialize;
use streetpoints_core::Error;
use streetpoints_core::model::{RoadClass, StreetSegment};
use streetpoints_core::sources::{
    NetworkRequest, NetworkType, StreetNetworkSource, retain_largest_component,
};
use tracing::{debug, info, warn};

pub struct OverpassSource {
    client: Client,
    url: String,
    timeout_secs: u64,
}

impl OverpassSource {
    pub fn new(client: Client, url: &str, timeout_secs: u64) -> Self {
        Self {
            client,
            url: url.to_string(),
            timeout_secs,
        }
    }
}

impl StreetNetworkSource for OverpassSource {
    fn fetch_segments(&self, request: &NetworkRequest) -> Result<Vec<StreetSegment>, Error> {
        let query = build_query(&request.polygon, request.network_type, self.timeout_secs);
        debug!("Overpass query:\n{query}");

        let body = crate::http::fetch_text(self.client.post(&self.url).form(&[("data", query)]))?;
        let ways = parse_ways(&body)?;
        let way_count = ways.len();

        let mut segments = split_at_shared_nodes(ways);
        if !request.retain_all {
            segments = retain_largest_component(segments);
        }

        info!(
            "Downloaded {way_count} {} ways, {} segments",
            request.network_type,
            segments.len()
        );
        Ok(segments)
    }
}

/// Tag filters for each network type, after the common OSM network definitions
fn network_filter(network_type: NetworkType) -> &'static str {
    match network_type {
        NetworkType::Drive => concat!(
            r#"["highway"]["area"!~"yes"]"#,
            r#"["highway"!~"abandoned|bridleway|bus_guideway|construction|corridor|cycleway|elevator|escalator|footway|no|path|pedestrian|planned|platform|proposed|raceway|razed|service|steps|track"]"#,
            r#"["motor_vehicle"!~"no"]["motorcar"!~"no"]"#,
            r#"["service"!~"alley|driveway|emergency_access|parking|parking_aisle|private"]"#,
        ),
        NetworkType::DriveService => concat!(
            r#"["highway"]["area"!~"yes"]"#,
            r#"["highway"!~"abandoned|bridleway|bus_guideway|construction|corridor|cycleway|elevator|escalator|footway|no|path|pedestrian|planned|platform|proposed|raceway|razed|steps|track"]"#,
            r#"["motor_vehicle"!~"no"]["motorcar"!~"no"]"#,
            r#"["service"!~"emergency_access|parking|parking_aisle|private"]"#,
        ),
        NetworkType::Walk => concat!(
            r#"["highway"]["area"!~"yes"]"#,
            r#"["highway"!~"abandoned|bus_guideway|construction|cycleway|motor|no|planned|platform|proposed|raceway|razed"]"#,
            r#"["foot"!~"no"]["service"!~"private"]"#,
        ),
        NetworkType::Bike => concat!(
            r#"["highway"]["area"!~"yes"]"#,
            r#"["highway"!~"abandoned|bus_guideway|construction|corridor|elevator|escalator|footway|motor|no|planned|platform|proposed|raceway|razed|steps"]"#,
            r#"["bicycle"!~"no"]["service"!~"private"]"#,
        ),
        NetworkType::All => concat!(
            r#"["highway"]["area"!~"yes"]"#,
            r#"["highway"!~"abandoned|construction|no|planned|platform|proposed|raceway|razed"]"#,
        ),
    }
}

/// One `way` statement per polygon part, filtered by the polygon's outer ring.
///
/// Holes are ignored; the result is a superset that later filtering trims.
fn build_query(polygon: &MultiPolygon<f64>, network_type: NetworkType, timeout_secs: u64) -> String {
    let filter = network_filter(network_type);
    let mut query = format!("[out:json][timeout:{timeout_secs}];\n(\n");
    for part in polygon {
        let ring = part
            .exterior()
            .coords()
            .map(|c| format!("{:.7} {:.7}", c.y, c.x))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(query, "  way{filter}(poly:\"{ring}\");");
    }
    query.push_str(");\nout geom;");
    query
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(default)]
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Element {
    #[serde(rename = "type")]
    kind: String,
    id: u64,
    #[serde(default)]
    nodes: Vec<u64>,
    #[serde(default)]
    geometry: Vec<Option<LatLon>>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

/// A way with its node ids and coordinates in matching order
#[derive(Debug)]
struct Way {
    id: u64,
    nodes: Vec<u64>,
    coords: Vec<Coord<f64>>,
    name: Option<String>,
    class: RoadClass,
}

fn parse_ways(body: &str) -> Result<Vec<Way>, Error> {
    let response: OverpassResponse = serde_json::from_str(body)?;
    if let Some(remark) = response.remark.as_deref()
        && remark.contains("runtime error")
    {
        return Err(Error::CollaboratorUnavailable(format!("Overpass: {remark}")));
    }

    let mut ways = Vec::with_capacity(response.elements.len());
    for element in response.elements {
        if element.kind != "way" {
            continue;
        }
        let Some(highway) = element.tags.get("highway") else {
            debug!("Skipping way {} without a highway tag", element.id);
            continue;
        };
        let coords: Option<Vec<Coord<f64>>> = element
            .geometry
            .iter()
            .map(|p| p.map(|p| Coord { x: p.lon, y: p.lat }))
            .collect();
        let Some(coords) = coords.filter(|c| c.len() == element.nodes.len() && c.len() >= 2)
        else {
            warn!("Skipping way {} with incomplete geometry", element.id);
            continue;
        };

        let Ok(class) = highway.parse::<RoadClass>();
        ways.push(Way {
            id: element.id,
            nodes: element.nodes,
            coords,
            name: element.tags.get("name").cloned(),
            class,
        });
    }
    Ok(ways)
}

/// Cuts ways at nodes used more than once so each piece runs between
/// intersections, like the edges of a street graph. Pieces keep the way id.
fn split_at_shared_nodes(ways: Vec<Way>) -> Vec<StreetSegment> {
    let mut usage: HashMap<u64, u32> = HashMap::new();
    for way in &ways {
        for node in &way.nodes {
            *usage.entry(*node).or_insert(0) += 1;
        }
    }

    let mut segments = Vec::new();
    for way in ways {
        let id = way.id.to_string();
        let last = way.nodes.len() - 1;
        let mut start = 0;
        for (i, node) in way.nodes.iter().enumerate().skip(1) {
            if i == last || usage[node] > 1 {
                segments.push(StreetSegment {
                    id: id.clone(),
                    name: way.name.clone(),
                    class: way.class.clone(),
                    geometry: LineString::from(way.coords[start..=i].to_vec()),
                });
                start = i;
            }
        }
    }
    segments
}
