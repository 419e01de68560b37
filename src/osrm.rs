//! OSRM HTTP client: Table API for cost matrices, Route API for road-snapped polylines.

use crate::error::{Error, Result};
use crate::presenter::RoutePresenter;
use crate::problem::{Coordinate, CostMatrix, RouteModel};
use crate::provider::{sanitize_matrix, CostMatrixProvider, Metric};
use itertools::Itertools;
use log::debug;
use serde::Deserialize;
use std::time::Duration;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TableResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f64>>>>,
    #[serde(default)]
    durations: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<RouteEntry>,
}

#[derive(Debug, Deserialize)]
struct RouteEntry {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    /// `[lon, lat]` pairs
    coordinates: Vec<[f64; 2]>,
}

fn service_error(code: &str, message: Option<String>) -> Error {
    Error::Provider(format!(
        "OSRM returned {}: {}",
        code,
        message.unwrap_or_else(|| "no message".to_string())
    ))
}

/// Parse a Table API response body into a cost matrix for `expected` points.
pub fn parse_table_response(body: &str, expected: usize, metric: Metric) -> Result<CostMatrix> {
    let response: TableResponse = serde_json::from_str(body)
        .map_err(|err| Error::Provider(format!("malformed table response: {}", err)))?;

    if response.code != "Ok" {
        return Err(service_error(&response.code, response.message));
    }

    let raw = match metric {
        Metric::Distance => response.distances,
        Metric::Duration => response.durations,
    }
    .ok_or_else(|| Error::Provider(format!("table response has no {:?} matrix", metric)))?;

    sanitize_matrix(&raw, expected)
}

/// Parse a Route API response body (GeoJSON geometry) into a polyline.
pub fn parse_route_response(body: &str) -> Result<Vec<Coordinate>> {
    let response: RouteResponse = serde_json::from_str(body)
        .map_err(|err| Error::Provider(format!("malformed route response: {}", err)))?;

    if response.code != "Ok" {
        return Err(service_error(&response.code, response.message));
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| Error::Provider("route response has no routes".to_string()))?;

    Ok(route
        .geometry
        .coordinates
        .into_iter()
        .map(|[lon, lat]| Coordinate::new(lat, lon))
        .collect())
}

/// Blocking client for an OSRM server.
pub struct OsrmClient {
    base_url: String,
    profile: String,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    /// Create a client for `base_url` (e.g. `http://localhost:5000`) using the `driving` profile.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;

        Ok(OsrmClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            profile: "driving".to_string(),
            client,
        })
    }

    /// Use another routing profile.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    fn coordinate_list(coordinates: &[Coordinate]) -> String {
        coordinates
            .iter()
            .map(|c| format!("{},{}", c.lon, c.lat))
            .join(";")
    }

    /// Table API URL for `coordinates`.
    pub fn table_url(&self, coordinates: &[Coordinate]) -> String {
        format!(
            "{}/table/v1/{}/{}",
            self.base_url,
            self.profile,
            Self::coordinate_list(coordinates)
        )
    }

    /// Route API URL for `coordinates`.
    pub fn route_url(&self, coordinates: &[Coordinate]) -> String {
        format!(
            "{}/route/v1/{}/{}",
            self.base_url,
            self.profile,
            Self::coordinate_list(coordinates)
        )
    }

    fn fetch(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        debug!("GET {}", url);
        let body = self
            .client
            .get(url)
            .query(query)
            .send()?
            .error_for_status()?
            .text()?;
        Ok(body)
    }
}

impl CostMatrixProvider for OsrmClient {
    fn get_matrix(&self, coordinates: &[Coordinate], metric: Metric) -> Result<CostMatrix> {
        let body = self.fetch(
            &self.table_url(coordinates),
            &[("annotations", "distance,duration")],
        )?;
        parse_table_response(&body, coordinates.len(), metric)
    }
}

impl RoutePresenter for OsrmClient {
    fn render_route(&self, model: &RouteModel, nodes: &[usize]) -> Result<Vec<Coordinate>> {
        let coordinates: Vec<Coordinate> = nodes
            .iter()
            .map(|&node| model.node(node).location)
            .collect();
        let body = self.fetch(
            &self.route_url(&coordinates),
            &[
                ("overview", "full"),
                ("geometries", "geojson"),
                ("steps", "false"),
            ],
        )?;
        parse_route_response(&body)
    }
}
