//! Route presentation: polylines for each vehicle and a GeoJSON rendering of the plan.

use crate::error::Result;
use crate::extract::RoutePlan;
use crate::problem::{Coordinate, RouteModel};
use log::warn;
use serde_json::{json, Value};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Line colours cycled over vehicles.
pub const ROUTE_COLORS: [&str; 5] = ["red", "blue", "purple", "orange", "darkgreen"];

/// Turns a node sequence into a drawable polyline.
pub trait RoutePresenter {
    fn render_route(&self, model: &RouteModel, nodes: &[usize]) -> Result<Vec<Coordinate>>;
}

/// Presenter joining node locations with straight segments.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLinePresenter;

impl RoutePresenter for StraightLinePresenter {
    fn render_route(&self, model: &RouteModel, nodes: &[usize]) -> Result<Vec<Coordinate>> {
        Ok(nodes.iter().map(|&node| model.node(node).location).collect())
    }
}

/// Render one polyline per vehicle.
///
/// A presenter failure only affects that vehicle's drawing: it falls back to
/// straight lines and the plan stays valid.
pub fn render_polylines(
    model: &RouteModel,
    plan: &RoutePlan,
    presenter: &dyn RoutePresenter,
) -> Vec<Vec<Coordinate>> {
    plan.routes
        .iter()
        .map(|route| match presenter.render_route(model, &route.nodes) {
            Ok(polyline) => polyline,
            Err(err) => {
                warn!(
                    "Could not render route of {}: {}; drawing straight lines",
                    route.label, err
                );
                route
                    .nodes
                    .iter()
                    .map(|&node| model.node(node).location)
                    .collect()
            }
        })
        .collect()
}

fn point(coordinate: Coordinate) -> Value {
    json!({ "type": "Point", "coordinates": [coordinate.lon, coordinate.lat] })
}

/// Build a GeoJSON `FeatureCollection` with the depot, numbered stops and route lines.
pub fn to_geojson(model: &RouteModel, plan: &RoutePlan, polylines: &[Vec<Coordinate>]) -> Value {
    let depot = model.node(model.depot());
    let mut features = vec![json!({
        "type": "Feature",
        "geometry": point(depot.location),
        "properties": { "role": "depot", "label": depot.label, "marker-color": "green" },
    })];

    for (route, polyline) in plan.routes.iter().zip(polylines) {
        let color = ROUTE_COLORS[route.vehicle % ROUTE_COLORS.len()];

        features.push(json!({
            "type": "Feature",
            "geometry": {
                "type": "LineString",
                "coordinates": polyline.iter().map(|c| [c.lon, c.lat]).collect::<Vec<_>>(),
            },
            "properties": {
                "vehicle": route.label,
                "cost": route.cost,
                "stroke": color,
            },
        }));

        for (step, &stop) in route.stops().iter().enumerate() {
            let node = model.node(stop);
            features.push(json!({
                "type": "Feature",
                "geometry": point(node.location),
                "properties": {
                    "role": "stop",
                    "label": node.label,
                    "vehicle": route.label,
                    "step": step + 1,
                    "marker-color": color,
                },
            }));
        }
    }

    json!({ "type": "FeatureCollection", "features": features })
}

/// Write a GeoJSON document to `path`.
pub fn save_geojson<P: AsRef<Path>>(geojson: &Value, path: P) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, geojson)?;
    Ok(())
}
