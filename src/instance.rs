//! Instance files: the depot, the stops and the fleet, as JSON.

use crate::error::{Error, Result};
use crate::problem::{Coordinate, CostMatrix, Node, NodeRole, RouteModel};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// A named location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub label: String,
    pub lat: f64,
    pub lon: f64,
}

impl Site {
    pub fn new(label: impl Into<String>, lat: f64, lon: f64) -> Self {
        Site {
            label: label.into(),
            lat,
            lon,
        }
    }
}

fn default_name() -> String {
    "instance".to_string()
}

/// A routing instance as stored on disk.
///
/// Stop counts are either uniform (`stops_per_vehicle`) or given per vehicle
/// (`required_stops`). They are read as signed integers so that negative
/// values are reported as configuration errors rather than parse failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    #[serde(default = "default_name")]
    pub name: String,
    pub depot: Site,
    pub stops: Vec<Site>,
    pub vehicles: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stops_per_vehicle: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_stops: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_labels: Option<Vec<String>>,
}

impl Instance {
    /// Load an instance from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parse an instance from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the instance as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Nodes in model order: the depot first, then the stops.
    pub fn nodes(&self) -> Vec<Node> {
        let depot = Node::new(
            0,
            self.depot.label.clone(),
            self.depot.lat,
            self.depot.lon,
            NodeRole::Depot,
        );
        let stops = self
            .stops
            .iter()
            .enumerate()
            .map(|(i, site)| Node::new(i + 1, site.label.clone(), site.lat, site.lon, NodeRole::Stop));

        std::iter::once(depot).chain(stops).collect()
    }

    /// Coordinates in model order, as handed to a cost-matrix provider.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        std::iter::once(&self.depot)
            .chain(&self.stops)
            .map(|site| Coordinate::new(site.lat, site.lon))
            .collect()
    }

    /// Required stop count of every vehicle.
    pub fn required_stops(&self) -> Result<Vec<usize>> {
        let counts = match (&self.required_stops, self.stops_per_vehicle) {
            (Some(_), Some(_)) => {
                return Err(Error::Configuration(
                    "give either stops_per_vehicle or required_stops, not both".to_string(),
                ))
            }
            (Some(counts), None) => counts.clone(),
            (None, Some(count)) => vec![count; self.vehicles],
            (None, None) => {
                return Err(Error::Configuration(
                    "stops_per_vehicle or required_stops is required".to_string(),
                ))
            }
        };

        counts
            .into_iter()
            .enumerate()
            .map(|(vehicle, count)| {
                usize::try_from(count).map_err(|_| {
                    Error::Configuration(format!(
                        "vehicle {} has a negative required stop count ({})",
                        vehicle, count
                    ))
                })
            })
            .collect()
    }

    /// Validate the instance against `matrix` and build the routing model.
    pub fn build_model(&self, matrix: CostMatrix) -> Result<RouteModel> {
        let model = RouteModel::build(
            self.nodes(),
            matrix,
            self.vehicles,
            self.required_stops()?,
        )?
        .with_name(self.name.clone());

        match &self.vehicle_labels {
            Some(labels) => model.with_vehicle_labels(labels.clone()),
            None => Ok(model),
        }
    }

    /// Generate a reproducible instance with `stops` stops scattered around a depot.
    ///
    /// Stops are spread as evenly as possible; the first vehicles take one
    /// extra stop when `stops` is not a multiple of `vehicles`.
    pub fn random(stops: usize, vehicles: usize, seed: u64) -> Result<Self> {
        if vehicles == 0 {
            return Err(Error::Configuration(
                "at least one vehicle is required".to_string(),
            ));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let depot = Site::new("Depot", 35.638633, 139.759828);
        let sites = (1..=stops)
            .map(|i| {
                Site::new(
                    format!("Stop {}", i),
                    depot.lat + rng.gen_range(-0.06..0.06),
                    depot.lon + rng.gen_range(-0.08..0.08),
                )
            })
            .collect();

        let (stops_per_vehicle, required_stops) = if stops % vehicles == 0 {
            (Some((stops / vehicles) as i64), None)
        } else {
            let counts = (0..vehicles)
                .map(|v| (stops / vehicles + usize::from(v < stops % vehicles)) as i64)
                .collect();
            (None, Some(counts))
        };

        Ok(Instance {
            name: format!("random-{}-{}-{}", stops, vehicles, seed),
            depot,
            stops: sites,
            vehicles,
            stops_per_vehicle,
            required_stops,
            vehicle_labels: None,
        })
    }
}
