//! Coordinates, bounding boxes and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MI: f64 = 3958.7613;

/// Search area used by the geocoder: the state of California.
pub const CALIFORNIA_BBOX: Bounds = Bounds {
    min: LngLat {
        lng: -124.48,
        lat: 32.53,
    },
    max: LngLat {
        lng: -114.13,
        lat: 42.01,
    },
};

/// A WGS84 position. Serialized the GeoJSON way, as `[lng, lat]`.
///
/// Deserialization accepts longer positions (altitude) and ignores the extra
/// members, but rejects fewer than two or non-finite numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    #[must_use]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl TryFrom<Vec<f64>> for LngLat {
    type Error = String;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        match value.as_slice() {
            [lng, lat, ..] if lng.is_finite() && lat.is_finite() => Ok(Self::new(*lng, *lat)),
            [_, _, ..] => Err("position contains a non-finite number".to_string()),
            _ => Err(format!(
                "position needs at least 2 numbers, got {}",
                value.len()
            )),
        }
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(value: LngLat) -> Self {
        [value.lng, value.lat]
    }
}

/// Great-circle distance between two positions in miles (haversine).
#[must_use]
pub fn haversine_miles(a: LngLat, b: LngLat) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let sin_lat = (d_lat / 2.0).sin();
    let sin_lng = (d_lng / 2.0).sin();
    let h = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;

    2.0 * EARTH_RADIUS_MI * h.sqrt().min(1.0).asin()
}

/// Axis-aligned lng/lat box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: LngLat,
    pub max: LngLat,
}

impl Bounds {
    /// Smallest box holding every point, or `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LngLat>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, p: LngLat) {
        self.min.lng = self.min.lng.min(p.lng);
        self.min.lat = self.min.lat.min(p.lat);
        self.max.lng = self.max.lng.max(p.lng);
        self.max.lat = self.max.lat.max(p.lat);
    }

    #[must_use]
    pub fn contains(&self, p: LngLat) -> bool {
        (self.min.lng..=self.max.lng).contains(&p.lng)
            && (self.min.lat..=self.max.lat).contains(&p.lat)
    }

    /// `minLng,minLat,maxLng,maxLat`, the geocoder's `bbox` parameter format.
    #[must_use]
    pub fn to_query_value(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min.lng, self.min.lat, self.max.lng, self.max.lat
        )
    }

    /// Parses the `minLng,minLat,maxLng,maxLat` form.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the value does not hold four
    /// finite numbers or the minimum corner is not below the maximum.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let parts = raw
            .split(',')
            .map(|s| s.trim().parse::<f64>().map_err(|e| format!("'{s}': {e}")))
            .collect::<Result<Vec<_>, _>>()?;

        let [min_lng, min_lat, max_lng, max_lat] = parts.as_slice() else {
            return Err(format!("expected 4 comma-separated numbers, got {}", parts.len()));
        };
        if parts.iter().any(|v| !v.is_finite()) {
            return Err("bbox contains a non-finite number".to_string());
        }
        if min_lng > max_lng || min_lat > max_lat {
            return Err("bbox minimum corner must not exceed maximum corner".to_string());
        }

        Ok(Self {
            min: LngLat::new(*min_lng, *min_lat),
            max: LngLat::new(*max_lng, *max_lat),
        })
    }
}
