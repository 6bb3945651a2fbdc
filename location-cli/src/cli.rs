use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use serde_json::Value;
use tracing::{debug, warn};

use location_core::{
    API_KEY_ENV, BoundingBox, BrowseRequest, ClientConfig, Config, Coordinate, Country, DiscoverRequest,
    GeocodeRequest, IsolineRequest, LocationServices, LookupRequest, RangeType,
    ReverseGeocodeRequest, RouteRequest, RoutingMode, RoutingReturn, RoutingSpan, Scooter,
    TransportMode, Units,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "ls", version, about = "Geocoding, place search, isoline and routing from the terminal")]
pub struct Cli {
    /// API key; falls back to LS_API_KEY, then the stored configuration.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Print the GeoJSON rendering instead of the raw response.
    #[arg(long, global = true)]
    pub geojson: bool,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store an API key (and optionally a region) in the config file.
    Configure {
        /// "row" (rest of world) or "china".
        #[arg(long)]
        country: Option<String>,
    },

    /// Coordinates for a free-form address.
    Geocode {
        query: String,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long, default_value = "en-US")]
        lang: String,
    },

    /// Address for a position.
    Reverse {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,
        #[arg(long, default_value_t = 1)]
        limit: u32,
        #[arg(long, default_value = "en-US")]
        lang: String,
    },

    /// Free-text place search.
    Discover {
        query: String,
        /// "lat,lng"
        #[arg(long, allow_hyphen_values = true)]
        center: Option<Coordinate>,
        /// Meters around --center.
        #[arg(long)]
        radius: Option<u32>,
        /// ISO 3166-1 alpha-3 codes, comma separated.
        #[arg(long = "country", value_delimiter = ',')]
        country_codes: Vec<String>,
        /// "west,south,east,north"
        #[arg(long, allow_hyphen_values = true)]
        bbox: Option<BoundingBox>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        lang: Option<String>,
    },

    /// Places around a center, filtered by category or name.
    Browse {
        #[arg(long, allow_hyphen_values = true)]
        center: Coordinate,
        #[arg(long)]
        radius: Option<u32>,
        #[arg(long = "country", value_delimiter = ',')]
        country_codes: Vec<String>,
        #[arg(long, allow_hyphen_values = true)]
        bbox: Option<BoundingBox>,
        /// Category id; repeat for several.
        #[arg(long = "category")]
        categories: Vec<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        lang: Option<String>,
    },

    /// A place by its location id.
    Lookup {
        id: String,
        #[arg(long)]
        lang: Option<String>,
    },

    /// Area reachable from (or to) a point.
    Isoline {
        /// e.g. "fastest;car;"
        #[arg(long)]
        mode: String,
        /// One or more comma separated values.
        #[arg(long)]
        range: String,
        /// distance, time or consumption.
        #[arg(long, default_value = "time")]
        range_type: String,
        #[arg(long, allow_hyphen_values = true)]
        start: Option<Coordinate>,
        #[arg(long, allow_hyphen_values = true)]
        destination: Option<Coordinate>,
        #[arg(long)]
        arrival: Option<String>,
        #[arg(long)]
        departure: Option<String>,
    },

    /// Route between two points.
    Route {
        /// car, bicycle, truck, scooter or pedestrian.
        mode: String,
        #[arg(long, allow_hyphen_values = true)]
        origin: Coordinate,
        #[arg(long, allow_hyphen_values = true)]
        destination: Coordinate,
        /// Intermediate stop; repeat for several.
        #[arg(long, allow_hyphen_values = true)]
        via: Vec<Coordinate>,
        /// RFC 3339 timestamp.
        #[arg(long)]
        departure: Option<String>,
        /// Prefer the shortest instead of the fastest route.
        #[arg(long)]
        short: bool,
        #[arg(long, default_value_t = 0)]
        alternatives: u8,
        #[arg(long)]
        imperial: bool,
        #[arg(long, default_value = "en-US")]
        lang: String,
        /// Attributes to return, e.g. polyline,summary.
        #[arg(long = "return", value_delimiter = ',')]
        return_results: Vec<String>,
        /// Span attributes, e.g. names,length.
        #[arg(long = "span", value_delimiter = ',')]
        spans: Vec<String>,
        /// Scooter only: allow highways.
        #[arg(long)]
        allow_highway: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let Cli { api_key, geojson, command, .. } = self;

        match command {
            Command::Configure { country } => configure(country),
            query => {
                let ls = connect(api_key)?;
                let output = execute(&ls, query, geojson).await?;
                print_json(&output)
            }
        }
    }
}

fn connect(api_key: Option<String>) -> Result<LocationServices> {
    let env_key = std::env::var(API_KEY_ENV).ok();
    let key_given = [api_key.as_deref(), env_key.as_deref()]
        .into_iter()
        .flatten()
        .any(|k| !k.trim().is_empty());

    let file = load_config_file(key_given, Config::load)?;
    let config = ClientConfig::resolve(api_key, |k| std::env::var(k).ok(), &file)?;
    debug!(country = %config.country(), timeout_secs = config.timeout_secs(), "Resolved client configuration");
    Ok(LocationServices::new(&config)?)
}

/// The file is only mandatory when it is the sole source of the API key.
fn load_config_file<F>(key_given: bool, load: F) -> Result<Config>
where
    F: FnOnce() -> Result<Config>,
{
    match load() {
        Ok(file) => Ok(file),
        Err(err) if key_given => {
            warn!(error = %err, "Ignoring unreadable config file");
            Ok(Config::default())
        }
        Err(err) => Err(err),
    }
}

async fn execute(ls: &LocationServices, command: Command, geojson: bool) -> Result<Value> {
    let output = match command {
        Command::Configure { .. } => {
            return Err(anyhow!("`configure` does not query the service"));
        }
        Command::Geocode { query, limit, lang } => {
            let resp = ls.geocode(GeocodeRequest::new(query).limit(limit).lang(lang)).await?;
            if geojson { resp.to_geojson() } else { resp.raw }
        }
        Command::Reverse { lat, lng, limit, lang } => {
            let req = ReverseGeocodeRequest::new(lat, lng).limit(limit).lang(lang);
            let resp = ls.reverse_geocode(req).await?;
            if geojson { resp.to_geojson() } else { resp.raw }
        }
        Command::Discover { query, center, radius, country_codes, bbox, limit, lang } => {
            let req = DiscoverRequest {
                query,
                center,
                radius,
                country_codes,
                bounding_box: bbox,
                limit,
                lang,
            };
            let resp = ls.discover(req).await?;
            if geojson { resp.to_geojson() } else { resp.raw }
        }
        Command::Browse {
            center,
            radius,
            country_codes,
            bbox,
            categories,
            limit,
            name,
            lang,
        } => {
            let req = BrowseRequest {
                center,
                radius,
                country_codes,
                bounding_box: bbox,
                categories,
                limit,
                name,
                lang,
            };
            let resp = ls.browse(req).await?;
            if geojson { resp.to_geojson() } else { resp.raw }
        }
        Command::Lookup { id, lang } => {
            let req = LookupRequest { location_id: id, lang };
            let resp = ls.lookup(req).await?;
            match (geojson, resp.to_geojson()) {
                (true, Some(feature)) => feature,
                (true, None) => return Err(anyhow!("Place has no position to render")),
                (false, _) => resp.response,
            }
        }
        Command::Isoline { mode, range, range_type, start, destination, arrival, departure } => {
            let req = IsolineRequest {
                mode,
                range,
                range_type: RangeType::try_from(range_type.as_str())?,
                start,
                destination,
                arrival,
                departure,
            };
            let resp = ls.calculate_isoline(req).await?;
            if geojson { resp.to_geojson()? } else { resp.raw }
        }
        Command::Route {
            mode,
            origin,
            destination,
            via,
            departure,
            short,
            alternatives,
            imperial,
            lang,
            return_results,
            spans,
            allow_highway,
        } => {
            let transport_mode = TransportMode::try_from(mode.as_str())?;

            let mut req = RouteRequest::new(origin, destination)
                .via(via)
                .alternatives(alternatives)
                .lang(lang)
                .return_results(parse_all(&return_results, |s| RoutingReturn::try_from(s))?)
                .spans(parse_all(&spans, |s| RoutingSpan::try_from(s))?);
            if short {
                req = req.routing_mode(RoutingMode::Short);
            }
            if imperial {
                req = req.units(Units::Imperial);
            }
            if let Some(dep) = departure {
                req = req.departure_time(parse_departure(&dep)?);
            }
            let scooter = allow_highway.then_some(Scooter { allow_highway });

            let resp = ls.route(transport_mode, req, scooter).await?;
            if geojson { resp.to_geojson()? } else { resp.response }
        }
    };

    Ok(output)
}

fn configure(country: Option<String>) -> Result<()> {
    let mut cfg = Config::load()?;

    if let Some(c) = country {
        let parsed = Country::try_from(c.as_str())?;
        cfg.country = Some(parsed.as_str().to_string());
    }

    let api_key = Password::new("API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }

    cfg.set_api_key(api_key.trim().to_string());
    let path = cfg.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

fn parse_all<T, F>(values: &[String], parse: F) -> Result<Vec<T>>
where
    F: Fn(&str) -> location_core::Result<T>,
{
    values
        .iter()
        .map(|v| parse(v.trim()).map_err(anyhow::Error::from))
        .collect()
}

fn parse_departure(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid departure time '{value}', expected RFC 3339"))
}

fn print_json(value: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to render JSON")?;
    println!("{text}");
    Ok(())
}
