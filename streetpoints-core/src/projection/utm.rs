//! Universal Transverse Mercator on the WGS84 ellipsoid.
//!
//! Uses the 6th-order Krüger series (Karney 2011), which keeps forward and
//! inverse projections consistent to a few nanometres inside a zone.

use std::fmt;

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::Error;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hemisphere {
    North,
    South,
}

impl Hemisphere {
    pub fn from_latitude(lat: f64) -> Self {
        if lat >= 0.0 {
            Hemisphere::North
        } else {
            Hemisphere::South
        }
    }

    pub fn letter(self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
        }
    }
}

/// A UTM zone: strip number (1-60) and hemisphere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UtmZone {
    number: u8,
    hemisphere: Hemisphere,
}

impl UtmZone {
    /// # Errors
    ///
    /// Returns [`Error::ProjectionError`] if `number` is outside 1..=60
    pub fn new(number: u8, hemisphere: Hemisphere) -> Result<Self, Error> {
        if !(1..=60).contains(&number) {
            return Err(Error::ProjectionError(format!(
                "UTM zone number {number} is outside 1..=60"
            )));
        }
        Ok(Self { number, hemisphere })
    }

    /// Zone containing a geographic point, including the Norway and
    /// Svalbard exceptions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProjectionError`] for non-finite or out of range coordinates
    pub fn from_lon_lat(lon: f64, lat: f64) -> Result<Self, Error> {
        if !lon.is_finite() || !lat.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
            return Err(Error::ProjectionError(format!(
                "cannot derive a UTM zone for ({lon}, {lat})"
            )));
        }

        let number = if (56.0..64.0).contains(&lat) && (3.0..12.0).contains(&lon) {
            32
        } else if (72.0..=84.0).contains(&lat) && lon >= 0.0 && lon < 42.0 {
            match lon {
                l if l < 9.0 => 31,
                l if l < 21.0 => 33,
                l if l < 33.0 => 35,
                _ => 37,
            }
        } else {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let strip = ((lon + 180.0) / 6.0).floor() as u8;
            strip % 60 + 1
        };

        Self::new(number, Hemisphere::from_latitude(lat))
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    /// EPSG code of the WGS84 / UTM CRS for this zone
    pub fn epsg(&self) -> u32 {
        match self.hemisphere {
            Hemisphere::North => 32600 + u32::from(self.number),
            Hemisphere::South => 32700 + u32::from(self.number),
        }
    }

    /// Longitude of the zone's central meridian in degrees
    pub fn central_meridian(&self) -> f64 {
        f64::from(self.number) * 6.0 - 183.0
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.hemisphere.letter())
    }
}

/// Transverse Mercator projection fixed to one UTM zone
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    zone: UtmZone,
    lon0: f64,
    e: f64,
    a_scaled: f64,
    alpha: [f64; 6],
    beta: [f64; 6],
}

impl TransverseMercator {
    pub fn new(zone: UtmZone) -> Self {
        let n = WGS84_F / (2.0 - WGS84_F);
        let (n2, n3) = (n * n, n * n * n);
        let (n4, n5, n6) = (n3 * n, n3 * n2, n3 * n3);

        let a = WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0 + n6 / 256.0);

        let alpha = [
            n / 2.0 - 2.0 / 3.0 * n2 + 5.0 / 16.0 * n3 + 41.0 / 180.0 * n4 - 127.0 / 288.0 * n5
                + 7891.0 / 37800.0 * n6,
            13.0 / 48.0 * n2 - 3.0 / 5.0 * n3 + 557.0 / 1440.0 * n4 + 281.0 / 630.0 * n5
                - 1_983_433.0 / 1_935_360.0 * n6,
            61.0 / 240.0 * n3 - 103.0 / 140.0 * n4 + 15061.0 / 26880.0 * n5
                + 167_603.0 / 181_440.0 * n6,
            49561.0 / 161_280.0 * n4 - 179.0 / 168.0 * n5 + 6_601_661.0 / 7_257_600.0 * n6,
            34729.0 / 80640.0 * n5 - 3_418_889.0 / 1_995_840.0 * n6,
            212_378_941.0 / 319_334_400.0 * n6,
        ];
        let beta = [
            n / 2.0 - 2.0 / 3.0 * n2 + 37.0 / 96.0 * n3 - 1.0 / 360.0 * n4 - 81.0 / 512.0 * n5
                + 96199.0 / 604_800.0 * n6,
            1.0 / 48.0 * n2 + 1.0 / 15.0 * n3 - 437.0 / 1440.0 * n4 + 46.0 / 105.0 * n5
                - 1_118_711.0 / 3_870_720.0 * n6,
            17.0 / 480.0 * n3 - 37.0 / 840.0 * n4 - 209.0 / 4480.0 * n5 + 5569.0 / 90720.0 * n6,
            4397.0 / 161_280.0 * n4 - 11.0 / 504.0 * n5 - 830_251.0 / 7_257_600.0 * n6,
            4583.0 / 161_280.0 * n5 - 108_847.0 / 3_991_680.0 * n6,
            20_648_693.0 / 638_668_800.0 * n6,
        ];

        Self {
            zone,
            lon0: zone.central_meridian().to_radians(),
            e: (WGS84_F * (2.0 - WGS84_F)).sqrt(),
            a_scaled: K0 * a,
            alpha,
            beta,
        }
    }

    pub fn zone(&self) -> UtmZone {
        self.zone
    }

    /// (lon, lat) in degrees to (easting, northing) in meters
    pub fn forward(&self, geographic: Coord<f64>) -> Coord<f64> {
        let phi = geographic.y.to_radians();
        let lambda = geographic.x.to_radians() - self.lon0;

        let tau = phi.tan();
        let tau_prime = self.conformal_tan(tau);

        let (sin_l, cos_l) = lambda.sin_cos();
        let xi_prime = tau_prime.atan2(cos_l);
        let eta_prime = (sin_l / tau_prime.hypot(cos_l)).asinh();

        let mut xi = xi_prime;
        let mut eta = eta_prime;
        for (j, alpha) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi += alpha * (k * xi_prime).sin() * (k * eta_prime).cosh();
            eta += alpha * (k * xi_prime).cos() * (k * eta_prime).sinh();
        }

        let mut northing = self.a_scaled * xi;
        if self.zone.hemisphere == Hemisphere::South {
            northing += FALSE_NORTHING_SOUTH;
        }

        Coord {
            x: self.a_scaled * eta + FALSE_EASTING,
            y: northing,
        }
    }

    /// (easting, northing) in meters to (lon, lat) in degrees
    pub fn inverse(&self, metric: Coord<f64>) -> Coord<f64> {
        let mut northing = metric.y;
        if self.zone.hemisphere == Hemisphere::South {
            northing -= FALSE_NORTHING_SOUTH;
        }
        let eta = (metric.x - FALSE_EASTING) / self.a_scaled;
        let xi = northing / self.a_scaled;

        let mut xi_prime = xi;
        let mut eta_prime = eta;
        for (j, beta) in self.beta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi_prime -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_prime -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let sinh_eta = eta_prime.sinh();
        let (sin_xi, cos_xi) = xi_prime.sin_cos();
        let tau_prime = sin_xi / sinh_eta.hypot(cos_xi);

        // Newton-Raphson for tau given tau'
        let e2 = self.e * self.e;
        let mut tau = tau_prime;
        for _ in 0..10 {
            let tau_i_prime = self.conformal_tan(tau);
            let delta = (tau_prime - tau_i_prime) / (1.0 + tau_i_prime * tau_i_prime).sqrt()
                * (1.0 + (1.0 - e2) * tau * tau)
                / ((1.0 - e2) * (1.0 + tau * tau).sqrt());
            tau += delta;
            if delta.abs() <= 1e-15 * (1.0 + tau.abs()) {
                break;
            }
        }

        Coord {
            x: (sinh_eta.atan2(cos_xi) + self.lon0).to_degrees(),
            y: tau.atan().to_degrees(),
        }
    }

    fn conformal_tan(&self, tau: f64) -> f64 {
        let root = (1.0 + tau * tau).sqrt();
        let sigma = (self.e * (self.e * tau / root).atanh()).sinh();
        tau * (1.0 + sigma * sigma).sqrt() - sigma * root
    }
}
