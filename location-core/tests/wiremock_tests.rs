//! Integration tests for the REST client (wiremock-based)

use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use location_core::{
    BoundingBox, BrowseRequest, ClientConfig, DiscoverRequest, Endpoints, Error, GeocodeRequest,
    IsolineRequest, LocationServices, LookupRequest, RangeType, ReverseGeocodeRequest,
    RouteRequest, RoutingReturn, RoutingSpan, Scooter,
};

fn services_for_mock(server: &MockServer) -> LocationServices {
    let config = ClientConfig::new("TEST_KEY")
        .unwrap()
        .with_endpoints(Endpoints::with_base_url(&server.uri()))
        .with_timeout_secs(5)
        .unwrap();
    LocationServices::new(&config).unwrap()
}

const fn sample_geocode_json() -> &'static str {
    r#"{
        "items": [
            {
                "title": "200 S Mathilda Ave, Sunnyvale, CA 94086-6135, United States",
                "resultType": "houseNumber",
                "position": { "lat": 37.37634, "lng": -122.03405 }
            },
            {
                "title": "Mathilda Ave, Sunnyvale, CA, United States",
                "resultType": "street",
                "position": { "lat": 37.38, "lng": -122.03 }
            }
        ]
    }"#
}

#[tokio::test]
async fn test_geocode_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode"))
        .and(query_param("q", "200 S Mathilda Sunnyvale CA"))
        .and(query_param("limit", "2"))
        .and(query_param("lang", "en-US"))
        .and(query_param("apiKey", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_geocode_json()))
        .expect(1)
        .mount(&server)
        .await;

    let ls = services_for_mock(&server);
    let resp = ls.geocode(GeocodeRequest::new("200 S Mathilda Sunnyvale CA").limit(2)).await.unwrap();

    assert_eq!(resp.items.len(), 2);
    assert_eq!(resp.items[0]["position"], json!({ "lat": 37.37634, "lng": -122.03405 }));

    let geo_json = resp.to_geojson();
    assert_eq!(geo_json["type"], "FeatureCollection");
    assert_eq!(geo_json["features"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_geocode_unauthorized_maps_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Unauthorized",
            "error_description": "apiKey invalid. apiKey not found."
        })))
        .mount(&server)
        .await;

    let ls = services_for_mock(&server);
    let err = ls.geocode(GeocodeRequest::new("Goregaon West, Mumbai 400062, India")).await.unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 401);
            assert!(message.contains("apiKey invalid"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_arguments_never_reach_server() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let ls = services_for_mock(&server);

    assert!(ls.geocode(GeocodeRequest::new("   ")).await.unwrap_err().is_invalid_argument());
    assert!(ls.reverse_geocode(ReverseGeocodeRequest::new(91.0, 90.0)).await.is_err());
    assert!(
        ls.calculate_isoline(IsolineRequest::new("fastest;car;", "900", RangeType::Time))
            .await
            .is_err()
    );
    let both = DiscoverRequest::new("starbucks")
        .center((52.5, 13.4))
        .bounding_box(BoundingBox::new(13.08836, 52.33812, 13.761, 52.6755));
    assert!(ls.discover(both).await.is_err());
}

#[tokio::test]
async fn test_reverse_geocode_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/revgeocode"))
        .and(query_param("at", "19.1646,72.8493"))
        .and(query_param("limit", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "address": { "label": "Goregaon West, Mumbai 400062, India" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ls = services_for_mock(&server);
    let resp = ls.reverse_geocode(ReverseGeocodeRequest::new(19.1646, 72.8493).limit(4)).await.unwrap();

    assert_eq!(resp.items[0]["address"]["label"], "Goregaon West, Mumbai 400062, India");
}

#[tokio::test]
async fn test_isoline_unwraps_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calculateisoline.json"))
        .and(query_param("mode", "fastest;car;"))
        .and(query_param("range", "900"))
        .and(query_param("rangetype", "time"))
        .and(query_param("start", "geo!52.5,13.4"))
        .and(query_param("departure", "2020-05-04T17:00:00+02"))
        .and(query_param_is_missing("destination"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "center": { "latitude": 52.5, "longitude": 13.4 },
                "isoline": [{
                    "range": 900,
                    "component": [{ "id": 0, "shape": ["52.51,13.39", "52.52,13.41", "52.49,13.42"] }]
                }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ls = services_for_mock(&server);
    let request = IsolineRequest::new("fastest;car;", "900", RangeType::Time)
        .start((52.5, 13.4))
        .departure("2020-05-04T17:00:00+02");
    let resp = ls.calculate_isoline(request).await.unwrap();

    assert_eq!(resp.isoline[0]["component"][0]["shape"][0], "52.51,13.39");
    let geo_json = resp.to_geojson().unwrap();
    assert_eq!(geo_json["type"], "Feature");
    assert_eq!(geo_json["geometry"]["type"], "Polygon");
}

#[tokio::test]
async fn test_isoline_blank_departure_not_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calculateisoline.json"))
        .and(query_param("destination", "geo!52.5,13.4"))
        .and(query_param_is_missing("departure"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "isoline": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ls = services_for_mock(&server);
    let request = IsolineRequest::new("fastest;car;", "900", RangeType::Time)
        .destination((52.5, 13.4))
        .departure("");
    let resp = ls.calculate_isoline(request).await.unwrap();

    assert!(resp.isoline.is_empty());
}

#[tokio::test]
async fn test_discover_with_circle() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/discover"))
        .and(query_param("q", "starbucks"))
        .and(query_param("in", "circle:19.1663,72.8526;r=10000"))
        .and(query_param("lang", "en"))
        .and(query_param_is_missing("at"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [{}, {}] })))
        .expect(1)
        .mount(&server)
        .await;

    let ls = services_for_mock(&server);
    let request = DiscoverRequest::new("starbucks").center((19.1663, 72.8526)).radius(10_000).lang("en");
    let resp = ls.discover(request).await.unwrap();

    assert_eq!(resp.items.len(), 2);
}

#[tokio::test]
async fn test_browse_categories_and_country() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/browse"))
        .and(query_param("at", "19.1663,72.8526"))
        .and(query_param("in", "countryCode:IND"))
        .and(query_param("categories", "100-1000-0000,300-3000-0025"))
        .and(query_param("name", "starbucks"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let ls = services_for_mock(&server);
    let request = BrowseRequest::new((19.1663, 72.8526))
        .name("starbucks")
        .country_codes(["IND"])
        .limit(10)
        .categories(["100-1000-0000", "300-3000-0025"]);

    assert!(ls.browse(request).await.unwrap().items.is_empty());
}

#[tokio::test]
async fn test_lookup() {
    let server = MockServer::start().await;
    let id = "here:pds:place:276u0vhj-b0bace6448ae4b0fbc1d5e323998a7d2";

    Mock::given(method("GET"))
        .and(path("/lookup"))
        .and(query_param("id", id))
        .and(query_param("lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Frankfurt-Hahn Airport",
            "position": { "lat": 49.94686, "lng": 7.26386 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ls = services_for_mock(&server);
    let resp = ls.lookup(LookupRequest::new(id).lang("en")).await.unwrap();

    assert_eq!(resp.title(), Some("Frankfurt-Hahn Airport"));
    assert!(resp.to_geojson().is_some());
}

fn sample_routes_json() -> serde_json::Value {
    json!({
        "routes": [{
            "id": "r1",
            "sections": [
                { "id": "s1", "type": "vehicle", "polyline": "BlB-ywgK8_9xC4EwhCyiBI" }
            ]
        }]
    })
}

#[tokio::test]
async fn test_car_route_query_shape() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/routes"))
        .and(query_param("transportMode", "car"))
        .and(query_param("origin", "52.51375,13.42462"))
        .and(query_param("destination", "52.52332,13.428"))
        .and(query_param("via", "52.52426,13.43"))
        .and(query_param("via", "52.123,13.22"))
        .and(query_param("routingMode", "fast"))
        .and(query_param("alternatives", "0"))
        .and(query_param("units", "metric"))
        .and(query_param("lang", "en-US"))
        .and(query_param("return", "polyline,elevation"))
        .and(query_param("spans", "names"))
        .and(query_param_is_missing("scooter[allowHighway]"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_routes_json()))
        .expect(1)
        .mount(&server)
        .await;

    let ls = services_for_mock(&server);
    let request = RouteRequest::new((52.51375, 13.42462), (52.52332, 13.428))
        .via([(52.52426, 13.43), (52.123, 13.22)])
        .return_results([RoutingReturn::Polyline, RoutingReturn::Elevation])
        .spans([RoutingSpan::Names]);
    let resp = ls.car_route(request).await.unwrap();

    assert_eq!(resp.routes().len(), 1);
    let geo_json = resp.to_geojson().unwrap();
    assert_eq!(geo_json["features"][0]["geometry"]["coordinates"][0], json!([13.42462, 52.51375, 76.0]));
}

#[tokio::test]
async fn test_scooter_route_sends_scooter_attributes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/routes"))
        .and(query_param("transportMode", "scooter"))
        .and(query_param("scooter[allowHighway]", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_routes_json()))
        .expect(1)
        .mount(&server)
        .await;

    let ls = services_for_mock(&server);
    let request = RouteRequest::new((52.51375, 13.42462), (52.52332, 13.428));
    ls.scooter_route(request, Some(Scooter { allow_highway: true })).await.unwrap();
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let ls = services_for_mock(&server);
    let err = ls.lookup(LookupRequest::new("here:pds:place:x")).await.unwrap_err();

    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn test_server_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/routes"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let ls = services_for_mock(&server);
    let err = ls.truck_route(RouteRequest::new((0.0, 0.0), (1.0, 1.0))).await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().contains("Service Unavailable"));
}
