//! [`LocationServices`]: one entry point for every operation.
//!
//! Each method validates its request, hands it to the [`LocationApi`]
//! collaborator and wraps the decoded body. Rejected requests never reach
//! the collaborator; collaborator errors are returned as they are.

use tracing::{debug, instrument, warn};

use crate::{
    api::{LocationApi, RestLocationApi},
    config::ClientConfig,
    error::{Error, Result},
    model::{
        BrowseRequest, DiscoverRequest, GeocodeRequest, IsolineRequest, LookupRequest,
        ReverseGeocodeRequest,
    },
    response::{
        BrowseResponse, DiscoverResponse, GeocoderResponse, IsolineResponse, LookupResponse,
        ReverseGeocoderResponse, RoutingResponse,
    },
    routing::{RouteRequest, Scooter, TransportMode},
};

#[derive(Debug)]
pub struct LocationServices<A = RestLocationApi> {
    api: A,
}

impl LocationServices<RestLocationApi> {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self { api: RestLocationApi::new(config)? })
    }

    /// Build from `LS_API_KEY`; fails right away when it is not set.
    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env()?)
    }
}

impl<A: LocationApi> LocationServices<A> {
    pub fn with_api(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    #[instrument(skip_all, fields(query = %request.query, limit = request.limit))]
    pub async fn geocode(&self, request: GeocodeRequest) -> Result<GeocoderResponse> {
        request.validate().inspect_err(|e| rejected("geocode", e))?;

        debug!("Dispatching geocode");
        let raw = self.api.geocode(&request).await?;
        GeocoderResponse::from_json(raw)
    }

    #[instrument(skip_all, fields(lat = request.lat, lng = request.lng))]
    pub async fn reverse_geocode(
        &self,
        request: ReverseGeocodeRequest,
    ) -> Result<ReverseGeocoderResponse> {
        request.validate().inspect_err(|e| rejected("reverse_geocode", e))?;

        debug!("Dispatching reverse geocode");
        let raw = self.api.reverse_geocode(&request).await?;
        ReverseGeocoderResponse::from_json(raw)
    }

    #[instrument(skip_all, fields(mode = %request.mode, range = %request.range))]
    pub async fn calculate_isoline(&self, request: IsolineRequest) -> Result<IsolineResponse> {
        request.validate().inspect_err(|e| rejected("calculate_isoline", e))?;

        debug!(has_start = request.start.is_some(), "Dispatching isoline");
        let mut raw = self.api.isoline(&request).await?;
        let body = raw
            .get_mut("response")
            .map(serde_json::Value::take)
            .ok_or_else(|| Error::Decode("isoline body has no `response` object".to_string()))?;
        IsolineResponse::from_json(body)
    }

    #[instrument(skip_all, fields(query = %request.query))]
    pub async fn discover(&self, request: DiscoverRequest) -> Result<DiscoverResponse> {
        request.validate().inspect_err(|e| rejected("discover", e))?;

        debug!("Dispatching discover");
        let raw = self.api.discover(&request).await?;
        DiscoverResponse::from_json(raw)
    }

    #[instrument(skip_all, fields(center = %request.center))]
    pub async fn browse(&self, request: BrowseRequest) -> Result<BrowseResponse> {
        debug!("Dispatching browse");
        let raw = self.api.browse(&request).await?;
        BrowseResponse::from_json(raw)
    }

    #[instrument(skip_all, fields(id = %request.location_id))]
    pub async fn lookup(&self, request: LookupRequest) -> Result<LookupResponse> {
        request.validate().inspect_err(|e| rejected("lookup", e))?;

        debug!("Dispatching lookup");
        let raw = self.api.lookup(&request).await?;
        LookupResponse::from_json(raw)
    }

    /// Shared routing call behind the per-mode helpers.
    ///
    /// `scooter` is forwarded only for [`TransportMode::Scooter`].
    #[instrument(skip_all, fields(mode = %transport_mode))]
    pub async fn route(
        &self,
        transport_mode: TransportMode,
        request: RouteRequest,
        scooter: Option<Scooter>,
    ) -> Result<RoutingResponse> {
        request.validate().inspect_err(|e| rejected("route", e))?;

        let scooter = scooter.filter(|_| transport_mode == TransportMode::Scooter);
        debug!(via = request.via.len(), "Dispatching route");
        let raw = self.api.route(transport_mode, &request, scooter.as_ref()).await?;
        RoutingResponse::from_json(raw)
    }

    pub async fn car_route(&self, request: RouteRequest) -> Result<RoutingResponse> {
        self.route(TransportMode::Car, request, None).await
    }

    pub async fn bicycle_route(&self, request: RouteRequest) -> Result<RoutingResponse> {
        self.route(TransportMode::Bicycle, request, None).await
    }

    pub async fn truck_route(&self, request: RouteRequest) -> Result<RoutingResponse> {
        self.route(TransportMode::Truck, request, None).await
    }

    pub async fn scooter_route(
        &self,
        request: RouteRequest,
        scooter: Option<Scooter>,
    ) -> Result<RoutingResponse> {
        self.route(TransportMode::Scooter, request, scooter).await
    }

    pub async fn pedestrian_route(&self, request: RouteRequest) -> Result<RoutingResponse> {
        self.route(TransportMode::Pedestrian, request, None).await
    }
}

fn rejected(operation: &'static str, err: &Error) {
    warn!(operation, error = %err, "Rejected request");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, RangeType};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Geocode(GeocodeRequest),
        ReverseGeocode(ReverseGeocodeRequest),
        Isoline(IsolineRequest),
        Discover(DiscoverRequest),
        Browse(BrowseRequest),
        Lookup(LookupRequest),
        Route { mode: TransportMode, request: RouteRequest, scooter: Option<Scooter> },
    }

    /// Records every dispatched request and answers with a canned body.
    #[derive(Debug)]
    struct RecordingApi {
        calls: Mutex<Vec<Call>>,
        reply: std::result::Result<Value, u16>,
    }

    impl RecordingApi {
        fn replying(reply: Value) -> Self {
            Self { calls: Mutex::new(Vec::new()), reply: Ok(reply) }
        }

        fn failing(status: u16) -> Self {
            Self { calls: Mutex::new(Vec::new()), reply: Err(status) }
        }

        fn record(&self, call: Call) -> Result<Value> {
            self.calls.lock().unwrap().push(call);
            match &self.reply {
                Ok(v) => Ok(v.clone()),
                Err(status) => {
                    Err(Error::Api { status: *status, message: "Unauthorized".to_string() })
                }
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LocationApi for RecordingApi {
        async fn geocode(&self, request: &GeocodeRequest) -> Result<Value> {
            self.record(Call::Geocode(request.clone()))
        }

        async fn reverse_geocode(&self, request: &ReverseGeocodeRequest) -> Result<Value> {
            self.record(Call::ReverseGeocode(request.clone()))
        }

        async fn isoline(&self, request: &IsolineRequest) -> Result<Value> {
            self.record(Call::Isoline(request.clone()))
        }

        async fn discover(&self, request: &DiscoverRequest) -> Result<Value> {
            self.record(Call::Discover(request.clone()))
        }

        async fn browse(&self, request: &BrowseRequest) -> Result<Value> {
            self.record(Call::Browse(request.clone()))
        }

        async fn lookup(&self, request: &LookupRequest) -> Result<Value> {
            self.record(Call::Lookup(request.clone()))
        }

        async fn route(
            &self,
            transport_mode: TransportMode,
            request: &RouteRequest,
            scooter: Option<&Scooter>,
        ) -> Result<Value> {
            self.record(Call::Route {
                mode: transport_mode,
                request: request.clone(),
                scooter: scooter.copied(),
            })
        }
    }

    fn services(reply: Value) -> LocationServices<RecordingApi> {
        LocationServices::with_api(RecordingApi::replying(reply))
    }

    #[tokio::test]
    async fn geocode_blank_query_never_dispatches() {
        let ls = services(json!({ "items": [] }));

        for query in ["", "   "] {
            let err = ls.geocode(GeocodeRequest::new(query)).await.unwrap_err();
            assert!(err.is_invalid_argument());
        }
        assert!(ls.api().calls().is_empty());
    }

    #[tokio::test]
    async fn geocode_forwards_defaults() {
        let ls = services(json!({ "items": [{ "title": "x" }] }));

        let resp = ls.geocode(GeocodeRequest::new("200 S Mathilda Sunnyvale CA").limit(2)).await;
        assert_eq!(resp.unwrap().items.len(), 1);

        let calls = ls.api().calls();
        assert_eq!(calls.len(), 1);
        let Call::Geocode(req) = &calls[0] else { panic!("unexpected call {calls:?}") };
        assert_eq!(req.limit, 2);
        assert_eq!(req.lang, "en-US");
    }

    #[tokio::test]
    async fn reverse_geocode_range_checks() {
        let ls = services(json!({ "items": [] }));

        assert!(ls.reverse_geocode(ReverseGeocodeRequest::new(91.0, 90.0)).await.is_err());
        assert!(ls.reverse_geocode(ReverseGeocodeRequest::new(19.0, 190.0)).await.is_err());
        assert!(ls.api().calls().is_empty());

        for (lat, lng) in [(-90.0, -180.0), (90.0, 180.0)] {
            ls.reverse_geocode(ReverseGeocodeRequest::new(lat, lng)).await.unwrap();
        }
        assert_eq!(ls.api().calls().len(), 2);
    }

    #[tokio::test]
    async fn isoline_start_with_departure_dispatches() {
        let ls = services(json!({
            "response": {
                "isoline": [{ "component": [{ "shape": ["52.5,13.4", "52.6,13.4", "52.6,13.5"] }] }]
            }
        }));

        let request = IsolineRequest::new("fastest;car;", "900", RangeType::Time)
            .start((52.5, 13.4))
            .departure("2020-05-04T17:00:00+02");
        let resp = ls.calculate_isoline(request.clone()).await.unwrap();
        assert_eq!(resp.isoline.len(), 1);

        let calls = ls.api().calls();
        assert_eq!(calls, vec![Call::Isoline(request)]);
        let Call::Isoline(sent) = &calls[0] else { unreachable!() };
        assert!(sent.start.is_some());
        assert!(sent.destination.is_none());
    }

    #[tokio::test]
    async fn isoline_both_centers_rejected() {
        let ls = services(json!({ "response": {} }));

        let request = IsolineRequest::new("fastest;car;", "900", RangeType::Time)
            .start((52.5, 13.4))
            .destination((52.5, 13.4));
        let err = ls.calculate_isoline(request).await.unwrap_err();

        assert!(err.is_invalid_argument());
        assert!(ls.api().calls().is_empty());
    }

    #[tokio::test]
    async fn isoline_missing_response_object_is_decode_error() {
        let ls = services(json!({ "isoline": [] }));

        let request =
            IsolineRequest::new("fastest;car;", "900", RangeType::Time).destination((52.5, 13.4));
        let err = ls.calculate_isoline(request).await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn discover_center_xor_bbox() {
        let ls = services(json!({ "items": [] }));
        let bbox = BoundingBox::new(13.08836, 52.33812, 13.761, 52.6755);

        let both = DiscoverRequest::new("starbucks").center((52.5, 13.4)).bounding_box(bbox);
        assert!(ls.discover(both).await.unwrap_err().is_invalid_argument());
        assert!(ls.api().calls().is_empty());

        ls.discover(DiscoverRequest::new("starbucks").bounding_box(bbox)).await.unwrap();
        ls.discover(DiscoverRequest::new("starbucks").center((19.1663, 72.8526)).radius(10_000))
            .await
            .unwrap();
        assert_eq!(ls.api().calls().len(), 2);
    }

    #[tokio::test]
    async fn browse_forwards_without_cross_checks() {
        let ls = services(json!({ "items": [] }));
        let request = BrowseRequest::new((19.1663, 72.8526))
            .name("starbucks")
            .bounding_box(BoundingBox::new(13.08836, 52.33812, 13.761, 52.6755))
            .categories(["100-1000-0000"])
            .lang("en");

        ls.browse(request.clone()).await.unwrap();
        assert_eq!(ls.api().calls(), vec![Call::Browse(request)]);
    }

    #[tokio::test]
    async fn lookup_requires_id() {
        let ls = services(json!({ "title": "Frankfurt-Hahn Airport" }));

        assert!(ls.lookup(LookupRequest::new("")).await.is_err());
        let resp = ls.lookup(LookupRequest::new("here:pds:place:276u0vhj").lang("en")).await;
        assert_eq!(resp.unwrap().title(), Some("Frankfurt-Hahn Airport"));
    }

    #[tokio::test]
    async fn route_variants_differ_only_by_mode() {
        let ls = services(json!({ "routes": [] }));
        let request = RouteRequest::new((52.51375, 13.42462), (52.52332, 13.428))
            .via([(52.52426, 13.43)])
            .alternatives(2);

        ls.car_route(request.clone()).await.unwrap();
        ls.bicycle_route(request.clone()).await.unwrap();
        ls.truck_route(request.clone()).await.unwrap();
        ls.scooter_route(request.clone(), None).await.unwrap();
        ls.pedestrian_route(request.clone()).await.unwrap();

        let calls = ls.api().calls();
        let modes: Vec<_> = calls
            .iter()
            .map(|c| match c {
                Call::Route { mode, request: sent, scooter } => {
                    assert_eq!(sent, &request);
                    assert!(scooter.is_none());
                    *mode
                }
                other => panic!("unexpected call {other:?}"),
            })
            .collect();
        assert_eq!(modes, TransportMode::all());
    }

    #[tokio::test]
    async fn scooter_options_only_reach_scooter_mode() {
        let ls = services(json!({ "routes": [] }));
        let request = RouteRequest::new((52.5, 13.4), (52.6, 13.5));
        let scooter = Scooter { allow_highway: true };

        ls.scooter_route(request.clone(), Some(scooter)).await.unwrap();
        ls.route(TransportMode::Car, request, Some(scooter)).await.unwrap();

        let calls = ls.api().calls();
        assert!(matches!(&calls[0], Call::Route { scooter: Some(s), .. } if s.allow_highway));
        assert!(matches!(&calls[1], Call::Route { mode: TransportMode::Car, scooter: None, .. }));
    }

    #[tokio::test]
    async fn too_many_alternatives_rejected() {
        let ls = services(json!({ "routes": [] }));
        let request = RouteRequest::new((52.5, 13.4), (52.6, 13.5)).alternatives(7);

        assert!(ls.car_route(request).await.unwrap_err().is_invalid_argument());
        assert!(ls.api().calls().is_empty());
    }

    #[tokio::test]
    async fn api_errors_pass_through() {
        let ls = LocationServices::with_api(RecordingApi::failing(401));

        let err = ls.geocode(GeocodeRequest::new("Goregaon West, Mumbai")).await.unwrap_err();
        assert_eq!(err.status(), Some(401));

        let err = ls.pedestrian_route(RouteRequest::new((0.0, 0.0), (1.0, 1.0))).await;
        assert!(matches!(err, Err(Error::Api { status: 401, .. })));
    }

    #[test]
    fn new_builds_rest_client() {
        let cfg = ClientConfig::new("KEY").unwrap();
        assert!(LocationServices::new(&cfg).is_ok());
    }
}
