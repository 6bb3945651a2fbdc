use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_LANG: &str = "en-US";

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Fails when latitude is outside [-90, 90] or longitude outside [-180, 180].
    pub fn validate(&self) -> Result<()> {
        check_lat_lng(self.lat, self.lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

impl FromStr for Coordinate {
    type Err = Error;

    /// Parses `"lat,lng"`.
    fn from_str(s: &str) -> Result<Self> {
        let parts = parse_floats(s)?;
        match parts.as_slice() {
            [lat, lng] => Ok(Self::new(*lat, *lng)),
            _ => Err(Error::invalid(format!(
                "Expected coordinate as 'lat,lng', got '{s}'"
            ))),
        }
    }
}

/// Rectangle given as west longitude, south latitude, east longitude, north latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self { west, south, east, north }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

impl FromStr for BoundingBox {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts = parse_floats(s)?;
        match parts.as_slice() {
            [w, s_, e, n] => Ok(Self::new(*w, *s_, *e, *n)),
            _ => Err(Error::invalid(format!(
                "Expected bounding box as 'west,south,east,north', got '{s}'"
            ))),
        }
    }
}

fn parse_floats(s: &str) -> Result<Vec<f64>> {
    s.split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .map_err(|_| Error::invalid(format!("'{}' is not a number", p.trim())))
        })
        .collect()
}

pub(crate) fn check_lat_lng(lat: f64, lng: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(Error::invalid("Latitude must be in range -90 to 90."));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(Error::invalid("Longitude must be in range -180 to 180."));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeRequest {
    pub query: String,
    pub limit: u32,
    pub lang: String,
}

impl GeocodeRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), limit: 20, lang: DEFAULT_LANG.to_string() }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(Error::invalid(format!("Invalid input query: {:?}", self.query)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReverseGeocodeRequest {
    pub lat: f64,
    pub lng: f64,
    pub limit: u32,
    pub lang: String,
}

impl ReverseGeocodeRequest {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng, limit: 1, lang: DEFAULT_LANG.to_string() }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_lat_lng(self.lat, self.lng)
    }
}

/// Unit of an isoline `range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeType {
    /// Meters.
    Distance,
    /// Seconds.
    Time,
    /// Defined by the consumption model.
    Consumption,
}

impl RangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeType::Distance => "distance",
            RangeType::Time => "time",
            RangeType::Consumption => "consumption",
        }
    }
}

impl fmt::Display for RangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for RangeType {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "distance" => Ok(RangeType::Distance),
            "time" => Ok(RangeType::Time),
            "consumption" => Ok(RangeType::Consumption),
            _ => Err(Error::invalid(format!(
                "Unknown range type '{value}'. Supported: distance, time, consumption."
            ))),
        }
    }
}

/// Isoline calculation around a center point.
///
/// `mode` follows the upstream `Type;TransportModes;TrafficMode;Feature` syntax,
/// e.g. `fastest;car;traffic:disabled`. `range` may list several values
/// separated by commas (`"1000,2000"`).
///
/// Exactly one of `start`/`destination` must be set. `departure` only makes
/// sense together with `start`, `arrival` only with `destination`.
#[derive(Debug, Clone, PartialEq)]
pub struct IsolineRequest {
    pub mode: String,
    pub range: String,
    pub range_type: RangeType,
    pub start: Option<Coordinate>,
    pub destination: Option<Coordinate>,
    pub arrival: Option<String>,
    pub departure: Option<String>,
}

impl IsolineRequest {
    pub fn new(mode: impl Into<String>, range: impl Into<String>, range_type: RangeType) -> Self {
        Self {
            mode: mode.into(),
            range: range.into(),
            range_type,
            start: None,
            destination: None,
            arrival: None,
            departure: None,
        }
    }

    pub fn start(mut self, start: impl Into<Coordinate>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn destination(mut self, destination: impl Into<Coordinate>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn arrival(mut self, arrival: impl Into<String>) -> Self {
        self.arrival = Some(arrival.into());
        self
    }

    pub fn departure(mut self, departure: impl Into<String>) -> Self {
        self.departure = Some(departure.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        match (self.start, self.destination) {
            (Some(_), Some(_)) => {
                return Err(Error::invalid(
                    "`start` and `destination` can not be provided together.",
                ));
            }
            (None, None) => {
                return Err(Error::invalid("Please provide either `start` or `destination`."));
            }
            _ => {}
        }
        if non_blank(&self.departure).is_some() && self.start.is_none() {
            return Err(Error::invalid("`departure` must be provided with `start`."));
        }
        if non_blank(&self.arrival).is_some() && self.destination.is_none() {
            return Err(Error::invalid("`arrival` must be provided with `destination`."));
        }
        Ok(())
    }
}

/// Blank strings count as unset.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Free-text place search.
///
/// Typical combinations: `center` + `country_codes`, `center` + `radius`,
/// or `bounding_box` alone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiscoverRequest {
    pub query: String,
    pub center: Option<Coordinate>,
    /// Meters around `center`.
    pub radius: Option<u32>,
    /// ISO 3166-1 alpha-3 codes.
    pub country_codes: Vec<String>,
    pub bounding_box: Option<BoundingBox>,
    pub limit: Option<u32>,
    pub lang: Option<String>,
}

impl DiscoverRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), ..Default::default() }
    }

    pub fn center(mut self, center: impl Into<Coordinate>) -> Self {
        self.center = Some(center.into());
        self
    }

    pub fn radius(mut self, radius: u32) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn country_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.country_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn bounding_box(mut self, bbox: BoundingBox) -> Self {
        self.bounding_box = Some(bbox);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(center), Some(bbox)) = (&self.center, &self.bounding_box) {
            return Err(Error::invalid(format!(
                "Params: center:{center} and bounding_box:{bbox} can not be provided together."
            )));
        }
        Ok(())
    }
}

/// Category / name filtered browsing around a center point.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseRequest {
    pub center: Coordinate,
    pub radius: Option<u32>,
    pub country_codes: Vec<String>,
    pub bounding_box: Option<BoundingBox>,
    /// Category ids, e.g. `100-1000-0000`.
    pub categories: Vec<String>,
    pub limit: Option<u32>,
    /// Full-text filter on place names.
    pub name: Option<String>,
    pub lang: Option<String>,
}

impl BrowseRequest {
    pub fn new(center: impl Into<Coordinate>) -> Self {
        Self {
            center: center.into(),
            radius: None,
            country_codes: Vec::new(),
            bounding_box: None,
            categories: Vec::new(),
            limit: None,
            name: None,
            lang: None,
        }
    }

    pub fn radius(mut self, radius: u32) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn country_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.country_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn bounding_box(mut self, bbox: BoundingBox) -> Self {
        self.bounding_box = Some(bbox);
        self
    }

    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupRequest {
    pub location_id: String,
    pub lang: Option<String>,
}

impl LookupRequest {
    pub fn new(location_id: impl Into<String>) -> Self {
        Self { location_id: location_id.into(), lang: None }
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.location_id.trim().is_empty() {
            return Err(Error::invalid("`location_id` must not be empty."));
        }
        Ok(())
    }
}
