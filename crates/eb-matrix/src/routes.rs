//! Shortest-route geometries between stations.
//!
//! A route is stored per *ordered* pair: one-way streets make the way back
//! differ from the way there, so `(a, b)` and `(b, a)` are computed
//! independently.  The dashboard draws both, the return leg fainter.

use std::collections::BTreeMap;

use geojson::{Feature, Geometry, JsonObject, Value};
use tracing::{info, warn};

use eb_core::{BoundingBox, EdgeId, GeoPoint, StationId};
use eb_spatial::{RoadNetwork, Route, Router, ShortestPathTree, SpatialError};
use eb_stations::{StationNodes, StationTable};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::builder::check_nodes;
use crate::{RouteError, RouteResult};

/// Key of a pair in the persisted route catalog: `"12 to 345"`.
pub fn route_key(origin: StationId, destination: StationId) -> String {
    format!("{origin} to {destination}")
}

// ── RouteGeometry ─────────────────────────────────────────────────────────────

/// Coordinates along the shortest street route from `origin` to
/// `destination`, in traversal order.
///
/// The first and last coordinates are the positions of the two stations'
/// located nodes.  A pair sharing one node has a single coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    pub origin:      StationId,
    pub destination: StationId,
    pub coords:      Vec<GeoPoint>,
    pub length_m:    f64,
}

impl RouteGeometry {
    fn from_route(origin: StationId, destination: StationId, route: &Route, network: &RoadNetwork) -> Self {
        Self {
            origin,
            destination,
            coords: route.coordinates(network),
            length_m: route.total_length_m,
        }
    }

    pub fn key(&self) -> String {
        route_key(self.origin, self.destination)
    }

    /// Smallest lat/lon box containing the whole route.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(self.coords.iter().copied())
    }

    /// Street edges inside the route's bounding box, for drawing the route
    /// over its immediate surroundings rather than the whole city.
    pub fn street_context(&self, network: &RoadNetwork) -> Vec<EdgeId> {
        self.bounding_box()
            .map(|bb| network.edges_in_bbox(&bb, false))
            .unwrap_or_default()
    }

    /// GeoJSON `Feature` with a `LineString` geometry.
    ///
    /// Positions are `[lon, lat]` per RFC 7946.  A one-point route repeats
    /// its point, since a LineString needs two positions.
    pub fn to_feature(&self) -> Feature {
        let mut line: Vec<Vec<f64>> = self.coords.iter().map(|p| vec![p.lon, p.lat]).collect();
        if line.len() == 1 {
            line.push(line[0].clone());
        }

        let mut properties = JsonObject::new();
        properties.insert("origin".into(), self.origin.0.into());
        properties.insert("destination".into(), self.destination.0.into());
        properties.insert("length_m".into(), self.length_m.into());

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::LineString(line))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }

    /// Inverse of [`to_feature`](Self::to_feature).
    pub fn from_feature(feature: &Feature) -> Option<Self> {
        let props = feature.properties.as_ref()?;
        let origin = StationId(u32::try_from(props.get("origin")?.as_u64()?).ok()?);
        let destination = StationId(u32::try_from(props.get("destination")?.as_u64()?).ok()?);
        let length_m = props.get("length_m")?.as_f64()?;

        let Value::LineString(line) = &feature.geometry.as_ref()?.value else {
            return None;
        };
        let mut coords: Vec<GeoPoint> = line
            .iter()
            .map(|p| (p.len() >= 2).then(|| GeoPoint::new(p[1], p[0])))
            .collect::<Option<_>>()?;
        if coords.len() == 2 && coords[0] == coords[1] && length_m == 0.0 {
            coords.pop();
        }
        Some(Self { origin, destination, coords, length_m })
    }
}

// ── Single pair ───────────────────────────────────────────────────────────────

/// Shortest route geometry from `origin` to `destination`.
///
/// # Errors
///
/// [`RouteError::NoRoute`] when the destination node is unreachable;
/// [`RouteError::InvalidInput`] for unknown stations or nodes outside the
/// network.
pub fn route_between<R: Router + ?Sized>(
    origin: StationId,
    destination: StationId,
    nodes: &StationNodes,
    network: &RoadNetwork,
    router: &R,
) -> RouteResult<RouteGeometry> {
    let from = nodes
        .node(origin)
        .ok_or_else(|| RouteError::InvalidInput(format!("unknown origin station {origin}")))?;
    let to = nodes
        .node(destination)
        .ok_or_else(|| RouteError::InvalidInput(format!("unknown destination station {destination}")))?;

    let route = router
        .route(network, from, to)
        .map_err(|e| classify(e, origin, destination))?;
    Ok(RouteGeometry::from_route(origin, destination, &route, network))
}

fn classify(err: SpatialError, origin: StationId, destination: StationId) -> RouteError {
    match err {
        SpatialError::NoRoute { .. } => RouteError::NoRoute { origin, destination },
        SpatialError::NodeNotFound(node) => {
            RouteError::InvalidInput(format!("node {node} is not in the road network"))
        }
        other => RouteError::Internal(other.to_string()),
    }
}

// ── Bulk catalog ──────────────────────────────────────────────────────────────

/// Route geometries for every ordered pair of distinct stations.
///
/// Unreachable pairs have no entry; they are listed in
/// [`unreachable`](Self::unreachable) instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteCatalog {
    routes: BTreeMap<(StationId, StationId), RouteGeometry>,
    unreachable: Vec<(StationId, StationId)>,
}

impl RouteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, route: RouteGeometry) {
        self.routes.insert((route.origin, route.destination), route);
    }

    pub fn get(&self, origin: StationId, destination: StationId) -> Option<&RouteGeometry> {
        self.routes.get(&(origin, destination))
    }

    /// Like [`get`](Self::get), but an absent pair is [`RouteError::NoRoute`].
    pub fn lookup(&self, origin: StationId, destination: StationId) -> RouteResult<&RouteGeometry> {
        self.get(origin, destination)
            .ok_or(RouteError::NoRoute { origin, destination })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes ordered by `(origin, destination)`.
    pub fn iter(&self) -> impl Iterator<Item = &RouteGeometry> + '_ {
        self.routes.values()
    }

    pub fn unreachable(&self) -> &[(StationId, StationId)] {
        &self.unreachable
    }
}

/// Build the catalog for all ordered pairs `i ≠ j`, one shortest-path tree
/// per origin.
///
/// # Errors
///
/// Fails fast with [`RouteError::InvalidInput`] when `nodes` does not match
/// `stations` or references nodes outside the network.
pub fn build_route_catalog<R: Router + ?Sized>(
    stations: &StationTable,
    nodes: &StationNodes,
    network: &RoadNetwork,
    router: &R,
) -> RouteResult<RouteCatalog> {
    check_nodes(stations, nodes, network).map_err(|e| RouteError::InvalidInput(e.to_string()))?;

    let origins: Vec<StationId> = stations.ids().collect();

    #[cfg(feature = "parallel")]
    let per_origin: Vec<OriginRoutes> = origins
        .par_iter()
        .map(|&o| origin_routes(o, nodes, network, router))
        .collect::<RouteResult<_>>()?;

    #[cfg(not(feature = "parallel"))]
    let per_origin: Vec<OriginRoutes> = origins
        .iter()
        .map(|&o| origin_routes(o, nodes, network, router))
        .collect::<RouteResult<_>>()?;

    let mut catalog = RouteCatalog::new();
    for (routes, unreachable) in per_origin {
        for route in routes {
            catalog.insert(route);
        }
        catalog.unreachable.extend(unreachable);
    }

    if !catalog.unreachable.is_empty() {
        warn!(pairs = catalog.unreachable.len(), "some station pairs have no street route");
    }
    info!(routes = catalog.len(), "built route catalog");
    Ok(catalog)
}

type OriginRoutes = (Vec<RouteGeometry>, Vec<(StationId, StationId)>);

fn origin_routes<R: Router + ?Sized>(
    origin: StationId,
    nodes: &StationNodes,
    network: &RoadNetwork,
    router: &R,
) -> RouteResult<OriginRoutes> {
    let source = nodes.as_slice()[origin.slot()];
    let tree: ShortestPathTree = router
        .tree(network, source)
        .map_err(|e| RouteError::Internal(e.to_string()))?;

    let mut routes = Vec::with_capacity(nodes.len().saturating_sub(1));
    let mut unreachable = Vec::new();
    for (destination, target) in nodes.iter() {
        if destination == origin {
            continue;
        }
        match tree.route_to(network, target) {
            Ok(route) => routes.push(RouteGeometry::from_route(origin, destination, &route, network)),
            Err(SpatialError::NoRoute { .. }) => unreachable.push((origin, destination)),
            Err(e) => return Err(classify(e, origin, destination)),
        }
    }
    Ok((routes, unreachable))
}
