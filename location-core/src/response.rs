//! Read-only wrappers around decoded response bodies.
//!
//! Each wrapper keeps the raw JSON and exposes the commonly used parts,
//! plus a GeoJSON rendering built with `serde_json`.

use serde_json::{Map, Value, json};

use crate::{
    error::{Error, Result},
    polyline,
};

macro_rules! items_response {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            pub items: Vec<Value>,
            pub raw: Value,
        }

        impl $name {
            pub fn from_json(raw: Value) -> Result<Self> {
                let items = items_of(&raw, stringify!($name))?;
                Ok(Self { items, raw })
            }

            /// `FeatureCollection` of `Point`s, one per item that has a `position`.
            pub fn to_geojson(&self) -> Value {
                feature_collection(self.items.iter().filter_map(point_feature).collect())
            }
        }
    };
}

items_response!(
    /// Result of forward geocoding.
    GeocoderResponse
);
items_response!(
    /// Result of reverse geocoding.
    ReverseGeocoderResponse
);
items_response!(
    /// Result of a free-text place search.
    DiscoverResponse
);
items_response!(
    /// Result of browsing places by category or name.
    BrowseResponse
);

fn items_of(raw: &Value, what: &str) -> Result<Vec<Value>> {
    match raw.get("items") {
        Some(Value::Array(items)) => Ok(items.clone()),
        None => Ok(Vec::new()),
        Some(_) => Err(Error::Decode(format!("{what}: `items` is not an array"))),
    }
}

/// A single place.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResponse {
    pub response: Value,
}

impl LookupResponse {
    pub fn from_json(raw: Value) -> Result<Self> {
        if !raw.is_object() {
            return Err(Error::Decode("LookupResponse: expected a JSON object".to_string()));
        }
        Ok(Self { response: raw })
    }

    pub fn title(&self) -> Option<&str> {
        self.response.get("title").and_then(Value::as_str)
    }

    pub fn to_geojson(&self) -> Option<Value> {
        point_feature(&self.response)
    }
}

/// Body of an isoline calculation (the upstream `response` object).
#[derive(Debug, Clone, PartialEq)]
pub struct IsolineResponse {
    pub isoline: Vec<Value>,
    pub center: Option<Value>,
    pub raw: Value,
}

impl IsolineResponse {
    pub fn from_json(raw: Value) -> Result<Self> {
        let isoline = match raw.get("isoline") {
            Some(Value::Array(i)) => i.clone(),
            Some(_) => return Err(Error::Decode("IsolineResponse: `isoline` is not an array".into())),
            None => Vec::new(),
        };
        let center = raw.get("center").cloned();
        Ok(Self { isoline, center, raw })
    }

    /// `Feature` with a `Polygon` built from the first component shape.
    pub fn to_geojson(&self) -> Result<Value> {
        let shape = self
            .isoline
            .first()
            .and_then(|i| i.pointer("/component/0/shape"))
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Decode("isoline has no component shape".to_string()))?;

        let mut ring = shape
            .iter()
            .map(|p| {
                p.as_str()
                    .and_then(parse_lat_lng)
                    .map(|(lat, lng)| json!([lng, lat]))
                    .ok_or_else(|| Error::Decode(format!("bad isoline shape point: {p}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let closing = match (ring.first(), ring.last()) {
            (Some(first), Some(last)) if first != last => Some(first.clone()),
            _ => None,
        };
        ring.extend(closing);

        Ok(json!({
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [ring] },
            "properties": {},
        }))
    }
}

fn parse_lat_lng(s: &str) -> Option<(f64, f64)> {
    let (lat, lng) = s.split_once(',')?;
    Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?))
}

/// Routing result.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingResponse {
    pub response: Value,
}

impl RoutingResponse {
    pub fn from_json(raw: Value) -> Result<Self> {
        match raw.get("routes") {
            Some(Value::Array(_)) | None => Ok(Self { response: raw }),
            Some(_) => Err(Error::Decode("RoutingResponse: `routes` is not an array".into())),
        }
    }

    pub fn routes(&self) -> &[Value] {
        self.response.get("routes").and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `FeatureCollection` with one `LineString` per section that carries a polyline.
    pub fn to_geojson(&self) -> Result<Value> {
        let mut features = Vec::new();

        for (route_idx, route) in self.routes().iter().enumerate() {
            let sections = route.get("sections").and_then(Value::as_array);
            for section in sections.into_iter().flatten() {
                let Some(encoded) = section.get("polyline").and_then(Value::as_str) else {
                    continue;
                };

                let coordinates: Vec<Value> = polyline::decode(encoded)?
                    .into_iter()
                    .map(|p| match p.z {
                        Some(z) => json!([p.lng, p.lat, z]),
                        None => json!([p.lng, p.lat]),
                    })
                    .collect();

                let mut properties = section.as_object().cloned().unwrap_or_else(Map::new);
                properties.remove("polyline");
                properties.insert("route".to_string(), json!(route_idx));

                features.push(json!({
                    "type": "Feature",
                    "geometry": { "type": "LineString", "coordinates": coordinates },
                    "properties": properties,
                }));
            }
        }

        Ok(feature_collection(features))
    }
}

fn point_feature(item: &Value) -> Option<Value> {
    let pos = item.get("position")?;
    let lat = pos.get("lat")?.as_f64()?;
    let lng = pos.get("lng")?.as_f64()?;

    Some(json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [lng, lat] },
        "properties": item,
    }))
}

fn feature_collection(features: Vec<Value>) -> Value {
    json!({ "type": "FeatureCollection", "features": features })
}
