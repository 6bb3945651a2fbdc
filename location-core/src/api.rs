use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::{
    BrowseRequest, DiscoverRequest, GeocodeRequest, IsolineRequest, LookupRequest,
    ReverseGeocodeRequest,
    error::{Error, Result},
    routing::{RouteRequest, Scooter, TransportMode},
};

pub mod rest;

pub use rest::RestLocationApi;

/// Which regional deployment of the services to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Country {
    /// Rest of world.
    #[default]
    Row,
    China,
}

impl Country {
    pub fn as_str(&self) -> &'static str {
        match self {
            Country::Row => "row",
            Country::China => "china",
        }
    }

    fn domain(&self) -> &'static str {
        match self {
            Country::Row => "hereapi.com",
            Country::China => "hereapi.cn",
        }
    }
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Country {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "row" => Ok(Country::Row),
            "china" | "cn" => Ok(Country::China),
            _ => Err(Error::invalid(format!(
                "Unknown country '{value}'. Supported values: row, china."
            ))),
        }
    }
}

/// Full URL of every upstream endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub geocode: String,
    pub reverse_geocode: String,
    pub discover: String,
    pub browse: String,
    pub lookup: String,
    pub isoline: String,
    pub routes: String,
}

impl Endpoints {
    pub fn for_country(country: Country) -> Self {
        let d = country.domain();
        Self {
            geocode: format!("https://geocode.search.{d}/v1/geocode"),
            reverse_geocode: format!("https://revgeocode.search.{d}/v1/revgeocode"),
            discover: format!("https://discover.search.{d}/v1/discover"),
            browse: format!("https://browse.search.{d}/v1/browse"),
            lookup: format!("https://lookup.search.{d}/v1/lookup"),
            isoline: format!("https://isoline.route.ls.{d}/routing/7.2/calculateisoline.json"),
            routes: format!("https://router.{d}/v8/routes"),
        }
    }

    /// Every service under one host, e.g. `http://127.0.0.1:1234/geocode`.
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            geocode: format!("{base}/geocode"),
            reverse_geocode: format!("{base}/revgeocode"),
            discover: format!("{base}/discover"),
            browse: format!("{base}/browse"),
            lookup: format!("{base}/lookup"),
            isoline: format!("{base}/calculateisoline.json"),
            routes: format!("{base}/routes"),
        }
    }
}

/// The HTTP side of every operation: takes an already validated request,
/// performs one call and hands back the decoded JSON body.
#[async_trait]
pub trait LocationApi: Send + Sync + Debug {
    async fn geocode(&self, request: &GeocodeRequest) -> Result<Value>;

    async fn reverse_geocode(&self, request: &ReverseGeocodeRequest) -> Result<Value>;

    async fn isoline(&self, request: &IsolineRequest) -> Result<Value>;

    async fn discover(&self, request: &DiscoverRequest) -> Result<Value>;

    async fn browse(&self, request: &BrowseRequest) -> Result<Value>;

    async fn lookup(&self, request: &LookupRequest) -> Result<Value>;

    /// `scooter` is only meaningful for [`TransportMode::Scooter`].
    async fn route(
        &self,
        transport_mode: TransportMode,
        request: &RouteRequest,
        scooter: Option<&Scooter>,
    ) -> Result<Value>;
}
