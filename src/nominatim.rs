//! Place lookup against a Nominatim instance

use geo::{Geometry, Point};
use reqwest::blocking::Client;
use serde::Deserialize;
use streetpoints_core::Error;
use streetpoints_core::model::{GeocodedPlace, PlaceQuery};
use streetpoints_core::sources::Geocoder;
use tracing::{debug, info};

use crate::http;

/// Candidates requested per free-text search; the first areal one wins
const SEARCH_LIMIT: &str = "5";

pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode(&self, query: &PlaceQuery) -> Result<GeocodedPlace, Error> {
        let request = match query {
            PlaceQuery::Name(name) => self
                .client
                .get(format!("{}/search", self.base_url))
                .query(&[
                    ("q", name.as_str()),
                    ("format", "jsonv2"),
                    ("polygon_geojson", "1"),
                    ("limit", SEARCH_LIMIT),
                ]),
            PlaceQuery::Relation(id) => self
                .client
                .get(format!("{}/lookup", self.base_url))
                .query(&[
                    ("osm_ids", format!("R{id}").as_str()),
                    ("format", "jsonv2"),
                    ("polygon_geojson", "1"),
                ]),
        };

        debug!("Geocoding {query}");
        let body = http::fetch_text(request)?;
        let place = parse_places(&body, query)?;
        info!(
            "Geocoded {query} to {} ({:.6}, {:.6})",
            place.name,
            place.centroid.x(),
            place.centroid.y()
        );
        Ok(place)
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    geojson: Option<geojson::Geometry>,
}

impl NominatimPlace {
    fn is_areal(&self) -> bool {
        matches!(
            self.geojson.as_ref().map(|g| &g.value),
            Some(geojson::Value::Polygon(_) | geojson::Value::MultiPolygon(_))
        )
    }
}

fn parse_places(body: &str, query: &PlaceQuery) -> Result<GeocodedPlace, Error> {
    let candidates: Vec<NominatimPlace> = serde_json::from_str(body)?;
    let chosen = candidates
        .iter()
        .find(|c| c.is_areal())
        .or_else(|| candidates.first())
        .ok_or_else(|| Error::PlaceNotFound(query.to_string()))?;

    let lon = parse_degrees(&chosen.lon)?;
    let lat = parse_degrees(&chosen.lat)?;
    let centroid = Point::new(lon, lat);

    // Results without an outline are buffered around their centroid
    let boundary = match &chosen.geojson {
        Some(geometry) => Geometry::<f64>::try_from(geometry.clone())
            .map_err(|e| Error::GeoJsonError(e.to_string()))?,
        None => Geometry::Point(centroid),
    };

    Ok(GeocodedPlace {
        name: chosen.display_name.clone(),
        centroid,
        boundary,
    })
}

fn parse_degrees(value: &str) -> Result<f64, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidData(format!("bad coordinate '{value}' from geocoder")))
}
