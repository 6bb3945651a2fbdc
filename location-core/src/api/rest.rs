use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{
    BrowseRequest, DiscoverRequest, GeocodeRequest, IsolineRequest, LookupRequest,
    ReverseGeocodeRequest,
    config::ClientConfig,
    error::{Error, Result},
    model::{BoundingBox, Coordinate, non_blank},
    routing::{RouteRequest, Scooter, TransportMode},
};

use super::{Endpoints, LocationApi};

type Params = Vec<(&'static str, String)>;

/// [`LocationApi`] over HTTPS with an `apiKey` query credential.
#[derive(Debug, Clone)]
pub struct RestLocationApi {
    api_key: String,
    endpoints: Endpoints,
    http: Client,
}

impl RestLocationApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs()))
            .user_agent(concat!("location-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: config.api_key().to_owned(),
            endpoints: config.endpoints().clone(),
            http,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn get_json(&self, service: &'static str, url: &str, mut params: Params) -> Result<Value> {
        params.push(("apiKey", self.api_key.clone()));

        debug!(service, url, "Sending request");

        let res = self.http.get(url).query(&params).send().await.map_err(|e| {
            Error::Transport(format!("Failed to send {service} request: {}", without_query(&e)))
        })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read {service} response body: {e}")))?;

        if !status.is_success() {
            warn!(service, status = status.as_u16(), "Upstream returned an error");
            return Err(Error::Api { status: status.as_u16(), message: error_message(&body) });
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::Decode(format!("Failed to parse {service} JSON: {e}")))
    }
}

#[async_trait]
impl LocationApi for RestLocationApi {
    #[instrument(skip(self, request), fields(query = %request.query))]
    async fn geocode(&self, request: &GeocodeRequest) -> Result<Value> {
        let params = vec![
            ("q", request.query.clone()),
            ("limit", request.limit.to_string()),
            ("lang", request.lang.clone()),
        ];
        self.get_json("geocode", &self.endpoints.geocode, params).await
    }

    #[instrument(skip(self, request), fields(lat = request.lat, lng = request.lng))]
    async fn reverse_geocode(&self, request: &ReverseGeocodeRequest) -> Result<Value> {
        let params = vec![
            ("at", Coordinate::new(request.lat, request.lng).to_string()),
            ("limit", request.limit.to_string()),
            ("lang", request.lang.clone()),
        ];
        self.get_json("revgeocode", &self.endpoints.reverse_geocode, params).await
    }

    #[instrument(skip(self, request), fields(mode = %request.mode, range = %request.range))]
    async fn isoline(&self, request: &IsolineRequest) -> Result<Value> {
        let mut params = vec![
            ("mode", request.mode.clone()),
            ("range", request.range.clone()),
            ("rangetype", request.range_type.as_str().to_string()),
        ];
        if let Some(start) = request.start {
            params.push(("start", format!("geo!{start}")));
        }
        if let Some(destination) = request.destination {
            params.push(("destination", format!("geo!{destination}")));
        }
        if let Some(arrival) = non_blank(&request.arrival) {
            params.push(("arrival", arrival.to_string()));
        }
        if let Some(departure) = non_blank(&request.departure) {
            params.push(("departure", departure.to_string()));
        }
        self.get_json("isoline", &self.endpoints.isoline, params).await
    }

    #[instrument(skip(self, request), fields(query = %request.query))]
    async fn discover(&self, request: &DiscoverRequest) -> Result<Value> {
        let mut params = vec![("q", request.query.clone())];
        params.extend(area_params(
            request.center,
            request.radius,
            &request.country_codes,
            request.bounding_box,
        ));
        push_opt(&mut params, "limit", request.limit);
        push_opt(&mut params, "lang", request.lang.as_ref());
        self.get_json("discover", &self.endpoints.discover, params).await
    }

    #[instrument(skip(self, request), fields(center = %request.center))]
    async fn browse(&self, request: &BrowseRequest) -> Result<Value> {
        let mut params = area_params(
            Some(request.center),
            request.radius,
            &request.country_codes,
            request.bounding_box,
        );
        if !request.categories.is_empty() {
            params.push(("categories", request.categories.join(",")));
        }
        push_opt(&mut params, "name", request.name.as_ref());
        push_opt(&mut params, "limit", request.limit);
        push_opt(&mut params, "lang", request.lang.as_ref());
        self.get_json("browse", &self.endpoints.browse, params).await
    }

    #[instrument(skip(self, request), fields(id = %request.location_id))]
    async fn lookup(&self, request: &LookupRequest) -> Result<Value> {
        let mut params = vec![("id", request.location_id.clone())];
        push_opt(&mut params, "lang", request.lang.as_ref());
        self.get_json("lookup", &self.endpoints.lookup, params).await
    }

    #[instrument(skip(self, request, scooter), fields(mode = %transport_mode))]
    async fn route(
        &self,
        transport_mode: TransportMode,
        request: &RouteRequest,
        scooter: Option<&Scooter>,
    ) -> Result<Value> {
        let mut params = vec![
            ("transportMode", transport_mode.as_str().to_string()),
            ("origin", request.origin_param()),
            ("destination", request.destination_param()),
        ];
        params.extend(request.via_params().into_iter().map(|v| ("via", v)));
        push_opt(&mut params, "departureTime", request.departure_time_param());
        params.push(("routingMode", request.routing_mode.as_str().to_string()));
        params.push(("alternatives", request.alternatives.to_string()));
        params.push(("units", request.units.as_str().to_string()));
        params.push(("lang", request.lang.clone()));
        if !request.return_results.is_empty() {
            let names: Vec<_> = request.return_results.iter().map(|r| r.as_str()).collect();
            params.push(("return", names.join(",")));
        }
        if !request.spans.is_empty() {
            let names: Vec<_> = request.spans.iter().map(|s| s.as_str()).collect();
            params.push(("spans", names.join(",")));
        }
        if let (TransportMode::Scooter, Some(s)) = (transport_mode, scooter) {
            params.push(("scooter[allowHighway]", s.allow_highway.to_string()));
        }
        self.get_json("routes", &self.endpoints.routes, params).await
    }
}

/// Builds `at` / `in` for the search endpoints.
///
/// `in` precedence: bounding box, then country codes, then a circle from
/// center + radius. `at` carries the center unless the circle already does.
fn area_params(
    center: Option<Coordinate>,
    radius: Option<u32>,
    country_codes: &[String],
    bounding_box: Option<BoundingBox>,
) -> Params {
    let area = match (bounding_box, country_codes.is_empty(), center.zip(radius)) {
        (Some(bbox), _, _) => Some(format!("bbox:{bbox}")),
        (None, false, _) => Some(format!("countryCode:{}", country_codes.join(","))),
        (None, true, Some((c, r))) => Some(format!("circle:{c};r={r}")),
        (None, true, None) => None,
    };
    let is_circle = area.as_deref().is_some_and(|a| a.starts_with("circle:"));

    let mut params = Params::new();
    if let Some(c) = center.filter(|_| !is_circle) {
        params.push(("at", c.to_string()));
    }
    if let Some(a) = area {
        params.push(("in", a));
    }
    params
}

fn push_opt<T: ToString>(params: &mut Params, key: &'static str, value: Option<T>) {
    if let Some(v) = value {
        params.push((key, v.to_string()));
    }
}

/// Prefer the structured message upstream puts in error bodies.
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        for key in ["title", "error_description", "message", "error", "Message"] {
            if let Some(msg) = json.get(key).and_then(Value::as_str) {
                return msg.to_string();
            }
        }
    }
    truncate_body(body)
}

/// reqwest includes the full URL in errors; the query holds the API key.
fn without_query(err: &reqwest::Error) -> String {
    let mut msg = err.to_string();
    if let Some(query) = err.url().and_then(|u| u.query()) {
        msg = msg.replace(query, "<redacted>");
    }
    msg
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
