//! Core library for the `ls` CLI.
//!
//! This crate defines:
//! - Request types and their argument validation (geocoding, place search,
//!   isolines, routing)
//! - [`LocationServices`], the facade that validates and dispatches every call
//! - The HTTP collaborator ([`RestLocationApi`]) behind the [`LocationApi`] trait
//! - Typed response wrappers with GeoJSON conversion
//! - Credential and configuration resolution
//!
//! ```rust,ignore
//! use location_core::{ClientConfig, GeocodeRequest, LocationServices};
//!
//! let ls = LocationServices::new(&ClientConfig::from_env()?)?;
//! let resp = ls.geocode(GeocodeRequest::new("200 S Mathilda Sunnyvale CA").limit(2)).await?;
//! println!("{}", resp.to_geojson());
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod polyline;
pub mod response;
pub mod routing;
pub mod services;

pub use api::{Country, Endpoints, LocationApi, RestLocationApi};
pub use config::{API_KEY_ENV, ClientConfig, Config};
pub use error::{Error, Result};
pub use model::{
    BoundingBox, BrowseRequest, Coordinate, DiscoverRequest, GeocodeRequest, IsolineRequest,
    LookupRequest, RangeType, ReverseGeocodeRequest,
};
pub use response::{
    BrowseResponse, DiscoverResponse, GeocoderResponse, IsolineResponse, LookupResponse,
    ReverseGeocoderResponse, RoutingResponse,
};
pub use routing::{
    MatchSideOfStreet, PlaceOptions, RouteCourse, RouteRequest, RoutingMode, RoutingReturn,
    RoutingSpan, Scooter, TransportMode, Units, WayPointOptions,
};
pub use services::LocationServices;
