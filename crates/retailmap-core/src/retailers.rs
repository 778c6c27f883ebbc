//! Retailer GeoJSON model and the radius filter.

use serde::{Deserialize, Serialize};

use crate::geo::{haversine_miles, Bounds, LngLat};

const DEFAULT_RETAILER_NAME: &str = "Retailer";

/// GeoJSON `Point` geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: LngLat,
}

impl PointGeometry {
    #[must_use]
    pub fn point(coordinates: LngLat) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetailerProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retailer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(
        rename = "directionUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub direction_url: Option<String>,
    /// Any other properties the source carries, passed through to the pin layer.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A single retailer pin.
///
/// `distance_mi` is only set on copies produced by
/// [`RetailerCollection::within_radius`]; loaded features never carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetailerFeature {
    #[serde(rename = "type", default = "feature_kind")]
    pub kind: String,
    pub geometry: PointGeometry,
    #[serde(default)]
    pub properties: RetailerProperties,
    #[serde(rename = "distanceMi", skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub distance_mi: Option<f64>,
}

fn feature_kind() -> String {
    "Feature".to_string()
}

impl RetailerFeature {
    #[must_use]
    pub fn new(coordinates: LngLat, properties: RetailerProperties) -> Self {
        Self {
            kind: feature_kind(),
            geometry: PointGeometry::point(coordinates),
            properties,
            distance_mi: None,
        }
    }

    #[must_use]
    pub fn coordinates(&self) -> LngLat {
        self.geometry.coordinates
    }

    /// Display name, falling back to a generic label when the source has none.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.properties
            .retailer
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_RETAILER_NAME)
    }

    #[must_use]
    pub fn address(&self) -> &str {
        self.properties.address1.as_deref().unwrap_or("")
    }

    /// Directions link, if it is present, not a placeholder, and uses http(s).
    #[must_use]
    pub fn directions_url(&self) -> Option<&str> {
        let url = self.properties.direction_url.as_deref()?.trim();
        if url.is_empty() || url == "#" {
            return None;
        }
        let lower = url.to_ascii_lowercase();
        (lower.starts_with("https://") || lower.starts_with("http://")).then_some(url)
    }
}

/// Wire shape of a GeoJSON `FeatureCollection` of retailers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<RetailerFeature>,
}

impl FeatureCollection {
    #[must_use]
    pub fn new(features: Vec<RetailerFeature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }
}

/// A geocoded search center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOrigin {
    pub lng: f64,
    pub lat: f64,
    pub label: String,
}

impl SearchOrigin {
    #[must_use]
    pub fn position(&self) -> LngLat {
        LngLat::new(self.lng, self.lat)
    }
}

/// The full, unfiltered retailer set.
///
/// Never mutated after construction; every filtered view is a copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetailerCollection {
    features: Vec<RetailerFeature>,
}

impl RetailerCollection {
    #[must_use]
    pub fn new(features: Vec<RetailerFeature>) -> Self {
        Self { features }
    }

    #[must_use]
    pub fn features(&self) -> &[RetailerFeature] {
        &self.features
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.features.iter().map(RetailerFeature::coordinates))
    }

    #[must_use]
    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection::new(self.features.clone())
    }

    /// Retailers within `radius_mi` of `origin`, nearest first.
    ///
    /// Each returned feature is a copy with `distance_mi` set. Equal distances
    /// keep their collection order.
    #[must_use]
    pub fn within_radius(&self, origin: LngLat, radius_mi: f64) -> Vec<RetailerFeature> {
        let mut within: Vec<RetailerFeature> = self
            .features
            .iter()
            .filter_map(|f| {
                let d = haversine_miles(origin, f.coordinates());
                (d <= radius_mi).then(|| RetailerFeature {
                    distance_mi: Some(d),
                    ..f.clone()
                })
            })
            .collect();

        within.sort_by(|a, b| {
            a.distance_mi
                .unwrap_or(f64::INFINITY)
                .total_cmp(&b.distance_mi.unwrap_or(f64::INFINITY))
        });
        within
    }

    /// The retailer pinned at `position`, if one lies within `tolerance_mi`.
    ///
    /// The nearest wins; equally near retailers resolve to the first one.
    #[must_use]
    pub fn find_at(&self, position: LngLat, tolerance_mi: f64) -> Option<&RetailerFeature> {
        self.features
            .iter()
            .map(|f| (f, haversine_miles(position, f.coordinates())))
            .filter(|(_, d)| *d <= tolerance_mi)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(f, _)| f)
    }
}

impl From<FeatureCollection> for RetailerCollection {
    fn from(value: FeatureCollection) -> Self {
        Self::new(value.features)
    }
}
