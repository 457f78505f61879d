use std::cell::{Cell, RefCell};

use geo::{Coord, Geometry, LineString, MultiPolygon, Point, Polygon};
use streetpoints_core::prelude::*;

pub const ORIGIN_X: f64 = 600_000.0;
pub const ORIGIN_Y: f64 = 5_036_000.0;

/// Zone 18N, the zone of the fixture place
pub fn projection() -> Projection {
    Projection::new(UtmZone::new(18, Hemisphere::North).unwrap())
}

/// WGS84 line from metric offsets relative to the fixture origin
pub fn street_line(offsets: &[(f64, f64)]) -> LineString<f64> {
    let projection = projection();
    offsets
        .iter()
        .map(|&(dx, dy)| {
            projection.inverse(Coord {
                x: ORIGIN_X + dx,
                y: ORIGIN_Y + dy,
            })
        })
        .collect()
}

pub fn segment(id: &str, name: Option<&str>, class: RoadClass, offsets: &[(f64, f64)]) -> StreetSegment {
    StreetSegment {
        id: id.to_string(),
        name: name.map(str::to_string),
        class,
        geometry: street_line(offsets),
    }
}

/// A 400 m square place whose south-west corner is the fixture origin
pub struct FakeGeocoder {
    pub calls: Cell<usize>,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self { calls: Cell::new(0) }
    }
}

impl Geocoder for FakeGeocoder {
    fn geocode(&self, query: &PlaceQuery) -> Result<GeocodedPlace, Error> {
        self.calls.set(self.calls.get() + 1);
        if let PlaceQuery::Name(name) = query
            && name == "Atlantis"
        {
            return Err(Error::PlaceNotFound(name.clone()));
        }

        let ring = street_line(&[(0.0, 0.0), (400.0, 0.0), (400.0, 400.0), (0.0, 400.0), (0.0, 0.0)]);
        let projection = projection();
        let centroid = projection.inverse(Coord {
            x: ORIGIN_X + 200.0,
            y: ORIGIN_Y + 200.0,
        });

        Ok(GeocodedPlace {
            name: query.to_string(),
            centroid: Point::from(centroid),
            boundary: Geometry::MultiPolygon(MultiPolygon::new(vec![Polygon::new(ring, vec![])])),
        })
    }
}

/// Serves a fixed segment list and records what it was asked for
pub struct FakeNetwork {
    pub segments: Vec<StreetSegment>,
    pub fail: bool,
    pub requests: RefCell<Vec<NetworkRequest>>,
}

impl FakeNetwork {
    pub fn new(segments: Vec<StreetSegment>) -> Self {
        Self {
            segments,
            fail: false,
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }
}

impl StreetNetworkSource for FakeNetwork {
    fn fetch_segments(&self, request: &NetworkRequest) -> Result<Vec<StreetSegment>, Error> {
        self.requests.borrow_mut().push(request.clone());
        if self.fail {
            return Err(Error::CollaboratorUnavailable(
                "graph provider timed out".to_string(),
            ));
        }
        Ok(self.segments.clone())
    }
}

pub fn config(spacing: f64, heading: HeadingStrategy) -> PipelineConfig {
    PipelineConfig {
        place: "Testville".to_string(),
        sampling_distance: spacing,
        heading,
        ..PipelineConfig::default()
    }
}
