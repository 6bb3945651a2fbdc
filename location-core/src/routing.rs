//! Routing request types: transport modes, per-waypoint hints and the shared
//! [`RouteRequest`] every `*_route` call forwards.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{
    error::{Error, Result},
    model::{Coordinate, DEFAULT_LANG},
};

pub const MAX_ALTERNATIVES: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportMode {
    Car,
    Bicycle,
    Truck,
    Scooter,
    Pedestrian,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Car => "car",
            TransportMode::Bicycle => "bicycle",
            TransportMode::Truck => "truck",
            TransportMode::Scooter => "scooter",
            TransportMode::Pedestrian => "pedestrian",
        }
    }

    pub const fn all() -> &'static [TransportMode] {
        &[
            TransportMode::Car,
            TransportMode::Bicycle,
            TransportMode::Truck,
            TransportMode::Scooter,
            TransportMode::Pedestrian,
        ]
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransportMode {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "car" => Ok(TransportMode::Car),
            "bicycle" => Ok(TransportMode::Bicycle),
            "truck" => Ok(TransportMode::Truck),
            "scooter" => Ok(TransportMode::Scooter),
            "pedestrian" => Ok(TransportMode::Pedestrian),
            _ => Err(Error::invalid(format!(
                "Unknown transport mode '{value}'. Supported modes: car, bicycle, truck, scooter, pedestrian."
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingMode {
    #[default]
    Fast,
    Short,
}

impl RoutingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingMode::Fast => "fast",
            RoutingMode::Short => "short",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

/// Heading at a waypoint, in degrees clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteCourse {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    Degrees(u16),
}

impl RouteCourse {
    pub fn degrees(&self) -> u16 {
        match self {
            RouteCourse::North => 0,
            RouteCourse::NorthEast => 45,
            RouteCourse::East => 90,
            RouteCourse::SouthEast => 135,
            RouteCourse::South => 180,
            RouteCourse::SouthWest => 225,
            RouteCourse::West => 270,
            RouteCourse::NorthWest => 315,
            RouteCourse::Degrees(d) => *d % 360,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSideOfStreet {
    Always,
    OnlyIfDivided,
}

impl MatchSideOfStreet {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchSideOfStreet::Always => "always",
            MatchSideOfStreet::OnlyIfDivided => "onlyIfDivided",
        }
    }
}

/// Hints on how a location should be matched to the road network.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaceOptions {
    pub course: Option<RouteCourse>,
    pub side_of_street_hint: Option<Coordinate>,
    pub match_side_of_street: Option<MatchSideOfStreet>,
    pub name_hint: Option<String>,
    /// Meters.
    pub radius: Option<u32>,
    /// Meters.
    pub min_course_distance: Option<u32>,
}

impl PlaceOptions {
    /// Renders the `;key=value` suffix appended to a waypoint.
    pub fn to_suffix(&self) -> String {
        let mut out = String::new();
        if let Some(course) = self.course {
            out.push_str(&format!(";course={}", course.degrees()));
        }
        if let Some(hint) = self.side_of_street_hint {
            out.push_str(&format!(";sideOfStreetHint={hint}"));
        }
        if let Some(m) = self.match_side_of_street {
            out.push_str(&format!(";matchSideOfStreet={}", m.as_str()));
        }
        if let Some(name) = &self.name_hint {
            out.push_str(&format!(";nameHint={name}"));
        }
        if let Some(radius) = self.radius {
            out.push_str(&format!(";radius={radius}"));
        }
        if let Some(d) = self.min_course_distance {
            out.push_str(&format!(";minCourseDistance={d}"));
        }
        out
    }
}

/// Per-stop behaviour for `via` and `destination`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WayPointOptions {
    /// Seconds spent at the stop.
    pub stop_duration: Option<u32>,
    pub pass_through: Option<bool>,
}

impl WayPointOptions {
    /// Renders the `!key=value` suffix appended to a waypoint.
    pub fn to_suffix(&self) -> String {
        let mut out = String::new();
        if let Some(d) = self.stop_duration {
            out.push_str(&format!("!stopDuration={d}"));
        }
        if let Some(p) = self.pass_through {
            out.push_str(&format!("!passThrough={p}"));
        }
        out
    }
}

/// Scooter-only attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scooter {
    pub allow_highway: bool,
}

/// Attributes that can be requested in the `return` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingReturn {
    Polyline,
    Actions,
    Instructions,
    Summary,
    TravelSummary,
    TurnByTurnActions,
    Elevation,
    RouteHandle,
    Passthrough,
    Incidents,
    RoutingZones,
    TruckRoadTypes,
    Tolls,
}

impl RoutingReturn {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingReturn::Polyline => "polyline",
            RoutingReturn::Actions => "actions",
            RoutingReturn::Instructions => "instructions",
            RoutingReturn::Summary => "summary",
            RoutingReturn::TravelSummary => "travelSummary",
            RoutingReturn::TurnByTurnActions => "turnByTurnActions",
            RoutingReturn::Elevation => "elevation",
            RoutingReturn::RouteHandle => "routeHandle",
            RoutingReturn::Passthrough => "passthrough",
            RoutingReturn::Incidents => "incidents",
            RoutingReturn::RoutingZones => "routingZones",
            RoutingReturn::TruckRoadTypes => "truckRoadTypes",
            RoutingReturn::Tolls => "tolls",
        }
    }
}

impl TryFrom<&str> for RoutingReturn {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        const ALL: [RoutingReturn; 13] = [
            RoutingReturn::Polyline,
            RoutingReturn::Actions,
            RoutingReturn::Instructions,
            RoutingReturn::Summary,
            RoutingReturn::TravelSummary,
            RoutingReturn::TurnByTurnActions,
            RoutingReturn::Elevation,
            RoutingReturn::RouteHandle,
            RoutingReturn::Passthrough,
            RoutingReturn::Incidents,
            RoutingReturn::RoutingZones,
            RoutingReturn::TruckRoadTypes,
            RoutingReturn::Tolls,
        ];
        ALL.into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| Error::invalid(format!("Unknown return attribute '{value}'")))
    }
}

/// Attributes that can be requested in the `spans` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingSpan {
    WalkAttributes,
    StreetAttributes,
    CarAttributes,
    TruckAttributes,
    ScooterAttributes,
    Names,
    Length,
    Duration,
    BaseDuration,
    CountryCode,
    FunctionalClass,
    RouteNumbers,
    SpeedLimit,
    MaxSpeed,
    DynamicSpeedInfo,
    SegmentId,
    SegmentRef,
    Consumption,
}

impl RoutingSpan {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingSpan::WalkAttributes => "walkAttributes",
            RoutingSpan::StreetAttributes => "streetAttributes",
            RoutingSpan::CarAttributes => "carAttributes",
            RoutingSpan::TruckAttributes => "truckAttributes",
            RoutingSpan::ScooterAttributes => "scooterAttributes",
            RoutingSpan::Names => "names",
            RoutingSpan::Length => "length",
            RoutingSpan::Duration => "duration",
            RoutingSpan::BaseDuration => "baseDuration",
            RoutingSpan::CountryCode => "countryCode",
            RoutingSpan::FunctionalClass => "functionalClass",
            RoutingSpan::RouteNumbers => "routeNumbers",
            RoutingSpan::SpeedLimit => "speedLimit",
            RoutingSpan::MaxSpeed => "maxSpeed",
            RoutingSpan::DynamicSpeedInfo => "dynamicSpeedInfo",
            RoutingSpan::SegmentId => "segmentId",
            RoutingSpan::SegmentRef => "segmentRef",
            RoutingSpan::Consumption => "consumption",
        }
    }
}

impl TryFrom<&str> for RoutingSpan {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        const ALL: [RoutingSpan; 18] = [
            RoutingSpan::WalkAttributes,
            RoutingSpan::StreetAttributes,
            RoutingSpan::CarAttributes,
            RoutingSpan::TruckAttributes,
            RoutingSpan::ScooterAttributes,
            RoutingSpan::Names,
            RoutingSpan::Length,
            RoutingSpan::Duration,
            RoutingSpan::BaseDuration,
            RoutingSpan::CountryCode,
            RoutingSpan::FunctionalClass,
            RoutingSpan::RouteNumbers,
            RoutingSpan::SpeedLimit,
            RoutingSpan::MaxSpeed,
            RoutingSpan::DynamicSpeedInfo,
            RoutingSpan::SegmentId,
            RoutingSpan::SegmentRef,
            RoutingSpan::Consumption,
        ];
        ALL.into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| Error::invalid(format!("Unknown span attribute '{value}'")))
    }
}

/// Parameters shared by every transport mode.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub via: Vec<Coordinate>,
    pub origin_place_options: Option<PlaceOptions>,
    pub destination_place_options: Option<PlaceOptions>,
    pub via_place_options: Option<PlaceOptions>,
    pub destination_waypoint_options: Option<WayPointOptions>,
    pub via_waypoint_options: Option<WayPointOptions>,
    pub departure_time: Option<DateTime<Utc>>,
    pub routing_mode: RoutingMode,
    /// Alternative routes besides the optimal one, `0..=6`.
    pub alternatives: u8,
    pub units: Units,
    pub lang: String,
    pub return_results: Vec<RoutingReturn>,
    pub spans: Vec<RoutingSpan>,
}

impl RouteRequest {
    pub fn new(origin: impl Into<Coordinate>, destination: impl Into<Coordinate>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            via: Vec::new(),
            origin_place_options: None,
            destination_place_options: None,
            via_place_options: None,
            destination_waypoint_options: None,
            via_waypoint_options: None,
            departure_time: None,
            routing_mode: RoutingMode::default(),
            alternatives: 0,
            units: Units::default(),
            lang: DEFAULT_LANG.to_string(),
            return_results: Vec::new(),
            spans: Vec::new(),
        }
    }

    pub fn via<I, C>(mut self, via: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Coordinate>,
    {
        self.via = via.into_iter().map(Into::into).collect();
        self
    }

    pub fn origin_place_options(mut self, options: PlaceOptions) -> Self {
        self.origin_place_options = Some(options);
        self
    }

    pub fn destination_place_options(mut self, options: PlaceOptions) -> Self {
        self.destination_place_options = Some(options);
        self
    }

    pub fn via_place_options(mut self, options: PlaceOptions) -> Self {
        self.via_place_options = Some(options);
        self
    }

    pub fn destination_waypoint_options(mut self, options: WayPointOptions) -> Self {
        self.destination_waypoint_options = Some(options);
        self
    }

    pub fn via_waypoint_options(mut self, options: WayPointOptions) -> Self {
        self.via_waypoint_options = Some(options);
        self
    }

    pub fn departure_time(mut self, when: DateTime<Utc>) -> Self {
        self.departure_time = Some(when);
        self
    }

    pub fn routing_mode(mut self, mode: RoutingMode) -> Self {
        self.routing_mode = mode;
        self
    }

    pub fn alternatives(mut self, alternatives: u8) -> Self {
        self.alternatives = alternatives;
        self
    }

    pub fn units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn return_results(mut self, results: impl Into<Vec<RoutingReturn>>) -> Self {
        self.return_results = results.into();
        self
    }

    pub fn spans(mut self, spans: impl Into<Vec<RoutingSpan>>) -> Self {
        self.spans = spans.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.alternatives > MAX_ALTERNATIVES {
            return Err(Error::invalid(format!(
                "`alternatives` must be between 0 and {MAX_ALTERNATIVES}, got {}.",
                self.alternatives
            )));
        }
        Ok(())
    }

    /// `origin` value including place options.
    pub fn origin_param(&self) -> String {
        waypoint(self.origin, self.origin_place_options.as_ref(), None)
    }

    /// `destination` value including place and waypoint options.
    pub fn destination_param(&self) -> String {
        waypoint(
            self.destination,
            self.destination_place_options.as_ref(),
            self.destination_waypoint_options.as_ref(),
        )
    }

    /// One `via` value per intermediate stop, each carrying the shared via options.
    pub fn via_params(&self) -> Vec<String> {
        self.via
            .iter()
            .map(|c| {
                waypoint(*c, self.via_place_options.as_ref(), self.via_waypoint_options.as_ref())
            })
            .collect()
    }

    pub fn departure_time_param(&self) -> Option<String> {
        self.departure_time.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

fn waypoint(
    at: Coordinate,
    place: Option<&PlaceOptions>,
    stop: Option<&WayPointOptions>,
) -> String {
    let mut out = at.to_string();
    if let Some(p) = place {
        out.push_str(&p.to_suffix());
    }
    if let Some(w) = stop {
        out.push_str(&w.to_suffix());
    }
    out
}
